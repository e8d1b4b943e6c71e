pub type HexResult<T> = Result<T, HexError>;

/// Broad category of a [`HexError`], for status-line rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    IoError,
    RangeError,
    ArgumentError,
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum HexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("range {offset:#x}+{len:#x} is outside file of length {file_len:#x}")]
    Range { offset: u64, len: u64, file_len: u64 },
    #[error("value {value} does not fit in {kind}")]
    ValueRange {
        value: String,
        kind: crate::codec::NumberKind,
    },
    #[error("invalid argument: {0}")]
    Argument(String),
    #[error("buffer is read-only")]
    ReadOnly,
    /// Some runs reached the file before the failure. The overlay is kept
    /// intact, so retrying rewrites them with the same bytes.
    #[error("flush failed after writing {written} of {total} edit runs: {source}")]
    PartialFlush {
        written: usize,
        total: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("search cancelled")]
    Cancelled,
    #[error("{0} unsaved edit run(s) pending")]
    Unsaved(usize),
    #[error(transparent)]
    Math(#[from] crate::enums::MathError),
}

impl HexError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            HexError::Io(_) | HexError::PartialFlush { .. } => ErrorKind::IoError,
            HexError::Range { .. } | HexError::ValueRange { .. } | HexError::Math(_) => {
                ErrorKind::RangeError
            }
            HexError::Argument(_) | HexError::ReadOnly | HexError::Unsaved(_) => {
                ErrorKind::ArgumentError
            }
            HexError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Builds a [`HexError::Range`] for `offset..offset + len`.
    #[inline]
    #[must_use]
    pub fn range(offset: u64, len: u64, file_len: u64) -> Self {
        HexError::Range {
            offset,
            len,
            file_len,
        }
    }
}

/// Checks that `offset..offset + len` lies inside `0..file_len`.
///
/// # Errors
///
/// - [`HexError::Range`] if the range overflows or runs past `file_len`.
#[inline]
pub fn check_range(offset: u64, len: u64, file_len: u64) -> HexResult<()> {
    match offset.checked_add(len) {
        Some(end) if end <= file_len => Ok(()),
        _ => Err(HexError::range(offset, len, file_len)),
    }
}
