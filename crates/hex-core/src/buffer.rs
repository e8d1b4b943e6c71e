use std::io::Write;
use std::ops::AddAssign;

/// Chunk size used when streaming the merged view out to a new file.
pub const SAVE_CHUNK: u64 = 1024 * 1024;

/// What a flush wrote to disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub runs: usize,
    pub bytes: u64,
}

/// # The Logical Byte View
///
/// - Fixed length: every edit is an overwrite; `len()` never changes.
/// - Reads merge the edit overlay over raw pages, so callers always see the
///   latest bytes written to each offset.
/// - The backing file is only touched by [`Buffer::flush`] and
///   [`Buffer::save_as`]; everything before that is reversible.
#[derive(Debug)]
pub struct Buffer {
    store: crate::page_store::store::PageStore,
    overlay: crate::overlay::table::EditOverlay,
    history: crate::history::History,
    config: crate::config::EngineConfig,
    path: std::path::PathBuf,
}

/*

==================================
===== CREATION, OPEN, & SAVE =====
==================================

*/

impl Buffer {
    /// Opens `path` with its length fixed for the lifetime of the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened for reading or if the
    /// config is invalid.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        config: crate::config::EngineConfig,
    ) -> crate::errors::HexResult<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let store = crate::page_store::store::PageStore::open(&path_buf, &config)?;
        let overlay = crate::overlay::table::EditOverlay::new(store.len());

        tracing::debug!(
            path = %path_buf.display(),
            len = store.len(),
            writable = config.writable,
            "opened buffer"
        );

        Ok(Self {
            store,
            overlay,
            history: crate::history::History::default(),
            config,
            path: path_buf,
        })
    }

    /// Writes every pending run into the backing file at its offset.
    ///
    /// With nothing pending this returns an empty report without opening the
    /// file, even for a read-only buffer. On success the overlay is empty and
    /// affected pages are reloaded on next access, so reads match a freshly
    /// opened file.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::ReadOnly`] for a read-only buffer with
    ///   pending edits.
    /// - [`crate::errors::HexError::Io`] if the file cannot be opened for
    ///   writing or its length changed; nothing was written.
    /// - [`crate::errors::HexError::PartialFlush`] if a write or the final sync
    ///   fails. Earlier runs may be on disk; the overlay is left intact so the
    ///   flush can be retried or redirected with [`Buffer::save_as`].
    pub fn flush(&mut self) -> crate::errors::HexResult<FlushReport> {
        if self.overlay.is_empty() {
            return Ok(FlushReport::default());
        }

        self.ensure_writable()?;

        let mut patch = io::patch::PatchFile::open(&self.path, self.len())?;

        self.write_runs(&mut patch)
    }

    /// Writes every run into `sink`, then syncs it and drops the overlay.
    fn write_runs(
        &mut self,
        sink: &mut dyn io::patch::WriteAt,
    ) -> crate::errors::HexResult<FlushReport> {
        let total = self.overlay.run_count();
        let mut report = FlushReport::default();

        for slice in self.overlay.runs() {
            if let Err(source) = sink.write_all_at(slice.offset, slice.bytes) {
                self.store.invalidate_all();

                tracing::error!(
                    path = %self.path.display(),
                    written = report.runs,
                    total,
                    error = %source,
                    "flush failed partway"
                );

                return Err(crate::errors::HexError::PartialFlush {
                    written: report.runs,
                    total,
                    source,
                });
            }

            report.runs.add_assign(1);
            report.bytes.add_assign(slice.bytes.len() as u64);
        }

        if let Err(source) = sink.sync() {
            self.store.invalidate_all();

            return Err(crate::errors::HexError::PartialFlush {
                written: report.runs,
                total,
                source,
            });
        }

        for slice in self.overlay.runs() {
            self.store.invalidate(slice.offset, slice.bytes.len() as u64);
        }

        self.overlay.clear_all();

        tracing::debug!(
            path = %self.path.display(),
            runs = report.runs,
            bytes = report.bytes,
            "flushed edits"
        );

        Ok(report)
    }

    /// Streams the merged view into `path`, then rebinds the buffer to it.
    ///
    /// The copy goes to a temporary file in the destination directory first
    /// and is atomically renamed into place. An existing destination keeps
    /// its permissions. The original file is never
    /// modified. Undo history stays usable: entries hold absolute bytes and
    /// the length is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the current view, writing the temporary
    /// file, the rename, or reopening the destination fails. The buffer keeps
    /// its previous file and overlay in that case.
    pub fn save_as(&mut self, path: impl AsRef<std::path::Path>) -> crate::errors::HexResult<()> {
        let dest = path.as_ref();
        let parent_dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        let mut temp_save_file = tempfile::Builder::new()
            .prefix(".save_tmp_")
            .tempfile_in(parent_dir)?;
        let len = self.len();
        let mut chunk = vec![0u8; to_usize(SAVE_CHUNK.min(len))?];
        let mut pos = 0u64;

        while pos < len {
            let take = to_usize(SAVE_CHUNK.min(len - pos))?;

            self.read_into(pos, &mut chunk[..take])?;
            temp_save_file.write_all(&chunk[..take])?;
            pos.add_assign(take as u64);
        }

        if let Ok(existing) = std::fs::metadata(dest) {
            temp_save_file
                .as_file()
                .set_permissions(existing.permissions())?;
        }

        temp_save_file.as_file().sync_all()?;
        temp_save_file.persist(dest).map_err(|e| e.error)?;

        let store = crate::page_store::store::PageStore::open(dest, &self.config)?;

        self.store = store;
        self.overlay.clear_all();
        self.path = dest.to_path_buf();

        tracing::debug!(path = %self.path.display(), len, "saved buffer to new path");

        Ok(())
    }

    /// Drops the page cache and reopens the backing file. Pending edits are
    /// kept.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Io`] if the file cannot be reopened or its
    ///   length no longer matches; the old handle stays in use.
    pub fn reload(&mut self) -> crate::errors::HexResult<()> {
        let store = crate::page_store::store::PageStore::open(&self.path, &self.config)?;

        if store.len() != self.len() {
            return Err(crate::errors::HexError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "file length changed on disk: expected {}, found {}",
                    self.len(),
                    store.len()
                ),
            )));
        }

        self.store = store;

        Ok(())
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl Buffer {
    /// Logical length in bytes, fixed at open time.
    #[inline]
    pub fn len(&self) -> u64 {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Whether there are edits not yet flushed.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.overlay.is_empty()
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.config.writable
    }

    #[inline]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    #[inline]
    pub fn config(&self) -> &crate::config::EngineConfig {
        &self.config
    }

    #[inline]
    pub fn overlay(&self) -> &crate::overlay::table::EditOverlay {
        &self.overlay
    }

    #[inline]
    pub fn history(&self) -> &crate::history::History {
        &self.history
    }

    #[inline]
    pub fn page_stats(&self) -> crate::page_store::stats::PageStoreStats {
        self.store.stats()
    }

    #[inline]
    pub fn page_store(&self) -> &crate::page_store::store::PageStore {
        &self.store
    }

    fn ensure_writable(&self) -> crate::errors::HexResult<()> {
        if self.config.writable {
            Ok(())
        } else {
            Err(crate::errors::HexError::ReadOnly)
        }
    }
}

/*

===========================
========= READING =========
===========================

*/

impl Buffer {
    /// Merged bytes for `offset..offset + length`.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Range`] if the range is outside the file.
    /// - [`crate::errors::HexError::Io`] if a page cannot be loaded.
    pub fn read(&mut self, offset: u64, length: u64) -> crate::errors::HexResult<Vec<u8>> {
        crate::errors::check_range(offset, length, self.len())?;

        let mut out = vec![0u8; to_usize(length)?];

        self.read_into(offset, &mut out)?;

        Ok(out)
    }

    /// Fills `out` with merged bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Same as [`Buffer::read`].
    pub fn read_into(&mut self, offset: u64, out: &mut [u8]) -> crate::errors::HexResult<()> {
        self.store.read_into(offset, out)?;
        self.overlay.apply(offset, out);

        Ok(())
    }

    /// Like [`Buffer::read`], but returns fewer bytes (possibly none) instead
    /// of failing when the range runs past the end of the file.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::Io`] if a page cannot be loaded.
    pub fn read_clamped(&mut self, offset: u64, length: u64) -> crate::errors::HexResult<Vec<u8>> {
        if offset >= self.len() {
            return Ok(Vec::new());
        }

        let length = length.min(self.len() - offset);

        self.read(offset, length)
    }
}

/*

===========================
========= EDITING =========
===========================

*/

impl Buffer {
    /// Overwrites `bytes.len()` bytes at `offset` in the overlay and records
    /// an undo entry holding the bytes it replaced.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::ReadOnly`] for a read-only buffer.
    /// - [`crate::errors::HexError::Range`] if the write runs past the end.
    /// - [`crate::errors::HexError::Io`] if the bytes being replaced cannot be
    ///   read. Nothing is modified on any error.
    pub fn overwrite(&mut self, offset: u64, bytes: &[u8]) -> crate::errors::HexResult<()> {
        self.ensure_writable()?;
        crate::errors::check_range(offset, bytes.len() as u64, self.len())?;

        if bytes.is_empty() {
            return Ok(());
        }

        let previous = self.read(offset, bytes.len() as u64)?;

        self.overlay.write(offset, bytes)?;
        self.history.record(crate::history::UndoEntry {
            offset,
            previous,
            new: bytes.to_vec(),
        });

        Ok(())
    }

    /// Reverts the most recent overwrite. Returns its offset, or `None` when
    /// there is nothing to undo.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::ReadOnly`] for a read-only buffer.
    pub fn undo(&mut self) -> crate::errors::HexResult<Option<u64>> {
        self.ensure_writable()?;

        let Some(entry) = self.history.undo() else {
            return Ok(None);
        };

        if let Err(e) = self.overlay.write(entry.offset, &entry.previous) {
            self.history.revert_undo();
            return Err(e);
        }

        Ok(Some(entry.offset))
    }

    /// Re-applies the most recently undone overwrite.
    ///
    /// # Errors
    ///
    /// - [`crate::errors::HexError::ReadOnly`] for a read-only buffer.
    pub fn redo(&mut self) -> crate::errors::HexResult<Option<u64>> {
        self.ensure_writable()?;

        let Some(entry) = self.history.redo() else {
            return Ok(None);
        };

        if let Err(e) = self.overlay.write(entry.offset, &entry.new) {
            self.history.revert_redo();
            return Err(e);
        }

        Ok(Some(entry.offset))
    }

    /// Drops all pending edits and the undo history.
    pub fn discard(&mut self) {
        self.overlay.clear_all();
        self.history.clear();
    }
}

#[inline]
fn to_usize(value: u64) -> Result<usize, crate::enums::MathError> {
    Ok(<u64 as TryInto<usize>>::try_into(value)?)
}
