/// Scan order for searches and bookmark navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Byte order used by the number codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl std::fmt::Display for Endianness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Endianness::Little => "little",
            Endianness::Big => "big",
        })
    }
}

impl std::str::FromStr for Endianness {
    type Err = crate::errors::HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "le" | "little" | "<" => Ok(Endianness::Little),
            "be" | "big" | ">" => Ok(Endianness::Big),
            other => Err(crate::errors::HexError::Argument(format!(
                "unknown endianness `{other}`"
            ))),
        }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MathError {
    /// Wraps the specific error TryInto generates
    #[error("integer conversion failed: {0}")]
    ConversionFailed(#[from] std::num::TryFromIntError),
    /// Represents the `None` case from checked math
    #[error("arithmetic overflow")]
    Overflow,
    #[error("index out of bounds (len={0})")]
    OutOfBounds(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endianness_parses_aliases() {
        assert_eq!("LE".parse::<Endianness>().unwrap(), Endianness::Little);
        assert_eq!("big".parse::<Endianness>().unwrap(), Endianness::Big);
        assert_eq!(">".parse::<Endianness>().unwrap(), Endianness::Big);
        assert!("middle".parse::<Endianness>().is_err());
    }

    #[test]
    fn direction_reverses() {
        assert_eq!(Direction::Forward.reversed(), Direction::Backward);
        assert_eq!(Direction::Backward.reversed(), Direction::Forward);
    }
}
