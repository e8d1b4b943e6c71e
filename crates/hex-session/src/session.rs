use hex_core::buffer::{Buffer, FlushReport};
use hex_core::config::EngineConfig;
use hex_core::errors::{HexError, HexResult};
use hex_core::marks::MarkTable;
use hex_core::search::SearchEngine;

use crate::command::{ClosePolicy, Command, Motion, Outcome};
use crate::cursor::{Cursor, clamp_offset};

#[derive(Debug)]
pub struct Session {
    pub buffer: Buffer,
    pub marks: MarkTable,
    pub search: SearchEngine,
    pub cursor: Cursor,
}

impl Session {
    /// # Errors
    ///
    /// Same as [`Buffer::open`].
    pub fn open(path: impl AsRef<std::path::Path>, config: EngineConfig) -> HexResult<Self> {
        let search = SearchEngine::new(&config);
        let jump_history = config.jump_history;
        let buffer = Buffer::open(path, config)?;
        let marks = MarkTable::new(buffer.len(), jump_history);

        Ok(Self {
            buffer,
            marks,
            search,
            cursor: Cursor::default(),
        })
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.cursor.head
    }

    /// Merged bytes for a display window; short or empty past the end.
    ///
    /// # Errors
    ///
    /// - [`HexError::Io`] if a page cannot be loaded.
    pub fn view(&mut self, offset: u64, length: u64) -> HexResult<Vec<u8>> {
        self.buffer.read_clamped(offset, length)
    }

    /// Runs one command. On error the cursor, marks and buffer are as they
    /// were before the call.
    ///
    /// # Errors
    ///
    /// Whatever the underlying buffer, mark or search operation returns.
    pub fn execute(&mut self, command: Command) -> HexResult<Outcome> {
        tracing::trace!(?command, offset = self.cursor.head, "execute");

        match command {
            Command::Move(motion) => {
                let target = self.resolve(motion);
                Ok(self.move_to(target))
            }
            Command::Select(anchor) => {
                let len = self.buffer.len();
                self.cursor
                    .set_anchor(anchor.map(|anchor| clamp_offset(anchor, len)));
                Ok(Outcome::Moved(self.cursor.head))
            }
            Command::SetMark(name) => {
                self.marks.set_mark(self.cursor.head, name.as_deref())?;
                Ok(Outcome::MarkSet)
            }
            Command::JumpToMark(name) => {
                let target = self
                    .marks
                    .get_mark(&name)
                    .ok_or_else(|| HexError::Argument(format!("no mark named `{name}`")))?;
                self.jump(target)
            }
            Command::JumpBack => match self.marks.pop_jump() {
                Some(target) => Ok(self.move_to(target)),
                None => Ok(Outcome::Unchanged),
            },
            Command::ToggleBookmark => {
                let offset = self.cursor.head;
                let set = self.marks.toggle(offset)?;
                Ok(Outcome::Bookmark { offset, set })
            }
            Command::NextBookmark => match self.marks.next_after(self.cursor.head) {
                Some(target) => Ok(self.move_to(target)),
                None => Ok(Outcome::Unchanged),
            },
            Command::PrevBookmark => match self.marks.prev_before(self.cursor.head) {
                Some(target) => Ok(self.move_to(target)),
                None => Ok(Outcome::Unchanged),
            },
            Command::Search { pattern, direction } => {
                let found =
                    self.search
                        .find_next(&mut self.buffer, &pattern, self.cursor.head, direction)?;
                self.found(found)
            }
            Command::SearchAgain(direction) => {
                let found = self
                    .search
                    .repeat(&mut self.buffer, self.cursor.head, direction)?;
                self.found(found)
            }
            Command::Overwrite(bytes) => {
                let offset = self.cursor.head;
                self.buffer.overwrite(offset, &bytes)?;
                Ok(Outcome::Edited {
                    offset,
                    len: bytes.len(),
                })
            }
            Command::DecodeAt { kind, endianness } => {
                let bytes = self
                    .buffer
                    .read(self.cursor.head, kind.size() as u64)?;
                Ok(Outcome::Decoded(hex_core::codec::decode(
                    &bytes, kind, endianness,
                )?))
            }
            Command::DecodeSummary(endianness) => {
                let bytes = self.buffer.read_clamped(self.cursor.head, 8)?;
                Ok(Outcome::Summary(hex_core::codec::decode_summary(
                    &bytes, endianness,
                )))
            }
            Command::Undo => match self.buffer.undo()? {
                Some(offset) => Ok(self.move_to(offset)),
                None => Ok(Outcome::Unchanged),
            },
            Command::Redo => match self.buffer.redo()? {
                Some(offset) => Ok(self.move_to(offset)),
                None => Ok(Outcome::Unchanged),
            },
            Command::Flush => Ok(Outcome::Flushed(self.buffer.flush()?)),
        }
    }

    /// Re-reads the backing file, dropping cached pages. Pending edits stay.
    ///
    /// # Errors
    ///
    /// Same as [`Buffer::reload`].
    pub fn reload(&mut self) -> HexResult<()> {
        self.buffer.reload()?;
        self.cursor.clamp(self.buffer.len());
        Ok(())
    }

    /// Ends the session. Returns the flush report under [`ClosePolicy::Flush`].
    ///
    /// # Errors
    ///
    /// - [`HexError::Unsaved`] under [`ClosePolicy::RequireClean`] with edits
    ///   pending. Nothing is written.
    /// - Flush errors under [`ClosePolicy::Flush`].
    pub fn close(mut self, policy: ClosePolicy) -> HexResult<Option<FlushReport>> {
        let report = match policy {
            ClosePolicy::Flush => Some(self.buffer.flush()?),
            ClosePolicy::Discard => {
                self.buffer.discard();
                None
            }
            ClosePolicy::RequireClean => {
                if self.buffer.is_dirty() {
                    return Err(HexError::Unsaved(self.buffer.overlay().run_count()));
                }
                None
            }
        };

        tracing::debug!(path = %self.buffer.path().display(), ?policy, "closed session");

        Ok(report)
    }

    fn resolve(&self, motion: Motion) -> u64 {
        let len = self.buffer.len();

        match motion {
            Motion::Relative(delta) => self.cursor.head.saturating_add_signed(delta),
            Motion::Absolute(offset) => offset,
            Motion::FromEnd(back) => len.saturating_sub(back),
            Motion::Start => 0,
            Motion::End => len.saturating_sub(1),
        }
    }

    fn move_to(&mut self, offset: u64) -> Outcome {
        self.cursor.set_head(clamp_offset(offset, self.buffer.len()));
        Outcome::Moved(self.cursor.head)
    }

    /// Moves to `target`, leaving the current offset in the jump history.
    fn jump(&mut self, target: u64) -> HexResult<Outcome> {
        if !self.buffer.is_empty() {
            self.marks.set_mark(self.cursor.head, None)?;
        }
        Ok(self.move_to(target))
    }

    fn found(&mut self, found: Option<u64>) -> HexResult<Outcome> {
        match found {
            Some(offset) => self.jump(offset),
            None => Ok(Outcome::NotFound),
        }
    }
}
