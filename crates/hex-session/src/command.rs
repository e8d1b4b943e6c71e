use hex_core::buffer::FlushReport;
use hex_core::codec::{DecodeSummary, Number, NumberKind};
use hex_core::enums::{Direction, Endianness};

/// Cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Signed step from the current offset.
    Relative(i64),
    Absolute(u64),
    /// `n` bytes back from the end; `FromEnd(1)` is the last byte.
    FromEnd(u64),
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Move(Motion),
    /// Sets the selection anchor, or clears it with `None`.
    Select(Option<u64>),
    /// Named mark at the cursor, or a jump-history entry with `None`.
    SetMark(Option<String>),
    JumpToMark(String),
    JumpBack,
    ToggleBookmark,
    NextBookmark,
    PrevBookmark,
    Search {
        pattern: Vec<u8>,
        direction: Direction,
    },
    SearchAgain(Direction),
    /// Overwrites bytes starting at the cursor.
    Overwrite(Vec<u8>),
    DecodeAt {
        kind: NumberKind,
        endianness: Endianness,
    },
    DecodeSummary(Endianness),
    Undo,
    Redo,
    Flush,
}

/// What a command did, for the status line.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The cursor is now at this offset.
    Moved(u64),
    /// The command had nothing to act on.
    Unchanged,
    MarkSet,
    Bookmark { offset: u64, set: bool },
    NotFound,
    Edited { offset: u64, len: usize },
    Decoded(Number),
    Summary(DecodeSummary),
    Flushed(FlushReport),
}

/// How [`crate::session::Session::close`] treats pending edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    Flush,
    Discard,
    /// Fail with `Unsaved` while edits are pending.
    RequireClean,
}
