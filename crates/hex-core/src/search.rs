use std::ops::{AddAssign, SubAssign};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::enums::Direction;
use crate::errors::{HexError, HexResult};

/// Streaming byte-pattern search over a [`crate::buffer::Buffer`].
///
/// The buffer is read in `chunk_size` steps; the last `pattern.len() - 1`
/// bytes of each step are carried into the next one so matches straddling a
/// step (or page) boundary are still found. Memory use is bounded by one
/// chunk plus the pattern, whatever the file size.
#[derive(Debug)]
pub struct SearchEngine {
    chunk_size: usize,
    wrap: bool,
    last_pattern: Option<Vec<u8>>,
    cancel: Arc<AtomicBool>,
}

impl SearchEngine {
    #[must_use]
    pub fn new(config: &crate::config::EngineConfig) -> Self {
        Self::with_options(config.search_chunk, config.search_wrap)
    }

    #[must_use]
    pub fn with_options(chunk_size: usize, wrap: bool) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            wrap,
            last_pattern: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn wrap(&self) -> bool {
        self.wrap
    }

    #[inline]
    pub fn set_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }

    #[inline]
    pub fn last_pattern(&self) -> Option<&[u8]> {
        self.last_pattern.as_deref()
    }

    /// Flag checked before every chunk read. Setting it stops the running
    /// search with [`HexError::Cancelled`]; it is cleared when the next
    /// search starts.
    #[inline]
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Finds the next match strictly after (forward) or strictly before
    /// (backward) `from`.
    ///
    /// # Errors
    ///
    /// - [`HexError::Argument`] if `pattern` is empty.
    /// - [`HexError::Cancelled`] if the cancel flag was raised.
    /// - [`HexError::Io`] if a page cannot be loaded.
    pub fn find_next(
        &mut self,
        buffer: &mut crate::buffer::Buffer,
        pattern: &[u8],
        from: u64,
        direction: Direction,
    ) -> HexResult<Option<u64>> {
        let start = match direction {
            Direction::Forward => Some(from.saturating_add(1)),
            Direction::Backward => from.checked_sub(1),
        };

        self.search(buffer, pattern, start, direction)
    }

    /// Like [`SearchEngine::find_next`], but a match at `from` itself counts.
    /// Used for an initial search from the cursor.
    ///
    /// # Errors
    ///
    /// Same as [`SearchEngine::find_next`].
    pub fn find_from(
        &mut self,
        buffer: &mut crate::buffer::Buffer,
        pattern: &[u8],
        from: u64,
        direction: Direction,
    ) -> HexResult<Option<u64>> {
        self.search(buffer, pattern, Some(from), direction)
    }

    /// Searches again for the last pattern.
    ///
    /// # Errors
    ///
    /// - [`HexError::Argument`] if no search has been run yet.
    /// - Otherwise as [`SearchEngine::find_next`].
    pub fn repeat(
        &mut self,
        buffer: &mut crate::buffer::Buffer,
        from: u64,
        direction: Direction,
    ) -> HexResult<Option<u64>> {
        let pattern = self
            .last_pattern
            .clone()
            .ok_or_else(|| HexError::Argument("no previous search pattern".into()))?;

        self.find_next(buffer, &pattern, from, direction)
    }

    /// `start` is the first candidate match offset in scan order; `None`
    /// means there is none before wrapping (backward search from 0).
    fn search(
        &mut self,
        buffer: &mut crate::buffer::Buffer,
        pattern: &[u8],
        start: Option<u64>,
        direction: Direction,
    ) -> HexResult<Option<u64>> {
        if pattern.is_empty() {
            return Err(HexError::Argument("search pattern is empty".into()));
        }

        self.cancel.store(false, Ordering::Relaxed);
        self.last_pattern = Some(pattern.to_vec());

        let len = buffer.len();
        let reach = pattern.len() as u64 - 1;

        tracing::debug!(
            pattern_len = pattern.len(),
            ?start,
            ?direction,
            wrap = self.wrap,
            "searching"
        );

        let found = match direction {
            Direction::Forward => {
                let start = start.unwrap_or(0);
                let hit = self.scan_forward(buffer, pattern, start, len)?;

                if hit.is_none() && self.wrap {
                    // Matches starting before `start`; may overlap it.
                    self.scan_forward(buffer, pattern, 0, start.saturating_add(reach).min(len))?
                } else {
                    hit
                }
            }
            Direction::Backward => match start {
                Some(start) => {
                    let hit = self.scan_backward(
                        buffer,
                        pattern,
                        0,
                        start.saturating_add(reach).saturating_add(1).min(len),
                    )?;

                    if hit.is_none() && self.wrap {
                        self.scan_backward(buffer, pattern, start.saturating_add(1), len)?
                    } else {
                        hit
                    }
                }
                None if self.wrap => self.scan_backward(buffer, pattern, 0, len)?,
                None => None,
            },
        };

        tracing::debug!(?found, "search finished");

        Ok(found)
    }

    /// First match lying entirely inside `lo..hi`.
    fn scan_forward(
        &self,
        buffer: &mut crate::buffer::Buffer,
        pattern: &[u8],
        lo: u64,
        hi: u64,
    ) -> HexResult<Option<u64>> {
        if hi <= lo || hi - lo < pattern.len() as u64 {
            return Ok(None);
        }

        let finder = memchr::memmem::Finder::new(pattern);
        let carry = pattern.len() - 1;
        let chunk = self.chunk_size as u64;
        let mut window: Vec<u8> = Vec::with_capacity(self.chunk_size + carry);
        let mut window_start = lo;
        let mut pos = lo;

        while pos < hi {
            self.check_cancelled()?;

            let take = chunk.min(hi - pos);
            let filled = window.len();

            window.resize(filled + take as usize, 0);
            buffer.read_into(pos, &mut window[filled..])?;
            pos.add_assign(take);

            if let Some(index) = finder.find(&window) {
                return Ok(Some(window_start + index as u64));
            }

            if window.len() > carry {
                let drop = window.len() - carry;

                window.drain(..drop);
                window_start.add_assign(drop as u64);
            }
        }

        Ok(None)
    }

    /// Last match lying entirely inside `lo..hi`.
    fn scan_backward(
        &self,
        buffer: &mut crate::buffer::Buffer,
        pattern: &[u8],
        lo: u64,
        hi: u64,
    ) -> HexResult<Option<u64>> {
        if hi <= lo || hi - lo < pattern.len() as u64 {
            return Ok(None);
        }

        let finder = memchr::memmem::FinderRev::new(pattern);
        let carry = pattern.len() - 1;
        let chunk = self.chunk_size as u64;
        let mut window: Vec<u8> = Vec::new();
        let mut next: Vec<u8> = Vec::with_capacity(self.chunk_size + carry);
        let mut pos = hi;

        while pos > lo {
            self.check_cancelled()?;

            let take = chunk.min(pos - lo);

            pos.sub_assign(take);
            next.clear();
            next.resize(take as usize, 0);
            buffer.read_into(pos, &mut next)?;
            next.extend_from_slice(&window[..carry.min(window.len())]);
            std::mem::swap(&mut window, &mut next);

            if let Some(index) = finder.rfind(&window) {
                return Ok(Some(pos + index as u64));
            }
        }

        Ok(None)
    }

    #[inline]
    fn check_cancelled(&self) -> HexResult<()> {
        if self.cancel.load(Ordering::Relaxed) {
            Err(HexError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn buffer_with(content: &[u8]) -> (tempfile::NamedTempFile, crate::buffer::Buffer) {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(content).unwrap();
        temp.as_file().sync_all().unwrap();

        let config = crate::config::EngineConfig {
            page_size: 16,
            cache_pages: 2,
            ..Default::default()
        };
        let buffer = crate::buffer::Buffer::open(temp.path(), config).unwrap();

        (temp, buffer)
    }

    #[test]
    fn forward_finds_in_order() {
        let (_temp, mut buffer) = buffer_with(b"..ab....ab....ab");
        let mut engine = SearchEngine::with_options(4, false);

        assert_eq!(engine.find_from(&mut buffer, b"ab", 0, Direction::Forward).unwrap(), Some(2));
        assert_eq!(engine.find_next(&mut buffer, b"ab", 2, Direction::Forward).unwrap(), Some(8));
        assert_eq!(engine.find_next(&mut buffer, b"ab", 8, Direction::Forward).unwrap(), Some(14));
        assert_eq!(engine.find_next(&mut buffer, b"ab", 14, Direction::Forward).unwrap(), None);
    }

    #[test]
    fn forward_wraps() {
        let (_temp, mut buffer) = buffer_with(b"ab..............");
        let mut engine = SearchEngine::with_options(3, true);

        assert_eq!(engine.find_next(&mut buffer, b"ab", 5, Direction::Forward).unwrap(), Some(0));
        assert_eq!(engine.find_next(&mut buffer, b"ab", 0, Direction::Forward).unwrap(), Some(0));
    }

    #[test]
    fn backward_finds_highest_at_or_before() {
        let (_temp, mut buffer) = buffer_with(b"..ab....ab....ab");
        let mut engine = SearchEngine::with_options(5, false);

        assert_eq!(
            engine.find_from(&mut buffer, b"ab", 15, Direction::Backward).unwrap(),
            Some(14)
        );
        assert_eq!(engine.find_next(&mut buffer, b"ab", 14, Direction::Backward).unwrap(), Some(8));
        assert_eq!(engine.find_from(&mut buffer, b"ab", 8, Direction::Backward).unwrap(), Some(8));
        assert_eq!(engine.find_next(&mut buffer, b"ab", 2, Direction::Backward).unwrap(), None);
        assert_eq!(engine.find_next(&mut buffer, b"ab", 0, Direction::Backward).unwrap(), None);
    }

    #[test]
    fn backward_wraps_to_end() {
        let (_temp, mut buffer) = buffer_with(b"..........ab....");
        let mut engine = SearchEngine::with_options(4, true);

        assert_eq!(engine.find_next(&mut buffer, b"ab", 3, Direction::Backward).unwrap(), Some(10));
        assert_eq!(engine.find_next(&mut buffer, b"ab", 0, Direction::Backward).unwrap(), Some(10));
    }

    #[test]
    fn match_across_chunk_and_page_boundary() {
        let mut content = vec![0u8; 64];
        content[15..19].copy_from_slice(b"WXYZ");
        let (_temp, mut buffer) = buffer_with(&content);
        let mut engine = SearchEngine::with_options(16, false);

        assert_eq!(
            engine.find_from(&mut buffer, b"WXYZ", 0, Direction::Forward).unwrap(),
            Some(15)
        );
        assert_eq!(
            engine.find_from(&mut buffer, b"WXYZ", 63, Direction::Backward).unwrap(),
            Some(15)
        );
    }

    #[test]
    fn sees_pending_edits() {
        let (_temp, mut buffer) = buffer_with(&[0u8; 40]);
        let mut engine = SearchEngine::with_options(8, false);

        buffer.overwrite(30, b"hit").unwrap();

        assert_eq!(engine.find_from(&mut buffer, b"hit", 0, Direction::Forward).unwrap(), Some(30));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let (_temp, mut buffer) = buffer_with(b"abc");
        let mut engine = SearchEngine::with_options(8, true);
        let err = engine.find_next(&mut buffer, b"", 0, Direction::Forward).unwrap_err();

        assert_eq!(err.kind(), crate::errors::ErrorKind::ArgumentError);
    }

    #[test]
    fn pattern_longer_than_file() {
        let (_temp, mut buffer) = buffer_with(b"abc");
        let mut engine = SearchEngine::with_options(8, true);

        assert_eq!(engine.find_next(&mut buffer, b"abcd", 0, Direction::Forward).unwrap(), None);
        assert_eq!(engine.find_next(&mut buffer, b"abcd", 2, Direction::Backward).unwrap(), None);
    }

    #[test]
    fn repeat_uses_last_pattern() {
        let (_temp, mut buffer) = buffer_with(b"x.x.x");
        let mut engine = SearchEngine::with_options(2, false);

        assert!(engine.repeat(&mut buffer, 0, Direction::Forward).is_err());
        engine.find_from(&mut buffer, b"x", 0, Direction::Forward).unwrap();
        assert_eq!(engine.last_pattern(), Some(&b"x"[..]));
        assert_eq!(engine.repeat(&mut buffer, 0, Direction::Forward).unwrap(), Some(2));
        assert_eq!(engine.repeat(&mut buffer, 4, Direction::Backward).unwrap(), Some(2));
    }

    #[test]
    fn cancelled_before_first_chunk() {
        let (_temp, mut buffer) = buffer_with(&[0u8; 64]);
        let mut engine = SearchEngine::with_options(8, false);
        let handle = engine.cancel_handle();

        // A flag raised from another thread is seen between chunks; simulate
        // by raising it and scanning directly.
        handle.store(true, Ordering::Relaxed);
        let err = engine.scan_forward(&mut buffer, b"zz", 0, 64).unwrap_err();
        assert!(matches!(err, HexError::Cancelled));

        // Starting a new search clears the flag.
        assert_eq!(engine.find_from(&mut buffer, b"zz", 0, Direction::Forward).unwrap(), None);
    }
}
