use crate::enums::Endianness;
use crate::errors::{HexError, HexResult};

/// Fixed-width numeric interpretations of a byte window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl NumberKind {
    pub const ALL: [NumberKind; 10] = [
        NumberKind::I8,
        NumberKind::U8,
        NumberKind::I16,
        NumberKind::U16,
        NumberKind::I32,
        NumberKind::U32,
        NumberKind::I64,
        NumberKind::U64,
        NumberKind::F32,
        NumberKind::F64,
    ];

    /// Encoded width in bytes.
    #[inline]
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            NumberKind::I8 | NumberKind::U8 => 1,
            NumberKind::I16 | NumberKind::U16 => 2,
            NumberKind::I32 | NumberKind::U32 | NumberKind::F32 => 4,
            NumberKind::I64 | NumberKind::U64 | NumberKind::F64 => 8,
        }
    }

    /// Inclusive integer bounds; `None` for float kinds.
    #[must_use]
    pub fn int_bounds(self) -> Option<(i128, i128)> {
        Some(match self {
            NumberKind::I8 => (i8::MIN.into(), i8::MAX.into()),
            NumberKind::U8 => (0, u8::MAX.into()),
            NumberKind::I16 => (i16::MIN.into(), i16::MAX.into()),
            NumberKind::U16 => (0, u16::MAX.into()),
            NumberKind::I32 => (i32::MIN.into(), i32::MAX.into()),
            NumberKind::U32 => (0, u32::MAX.into()),
            NumberKind::I64 => (i64::MIN.into(), i64::MAX.into()),
            NumberKind::U64 => (0, u64::MAX.into()),
            NumberKind::F32 | NumberKind::F64 => return None,
        })
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            NumberKind::I8 => "i8",
            NumberKind::U8 => "u8",
            NumberKind::I16 => "i16",
            NumberKind::U16 => "u16",
            NumberKind::I32 => "i32",
            NumberKind::U32 => "u32",
            NumberKind::I64 => "i64",
            NumberKind::U64 => "u64",
            NumberKind::F32 => "f32",
            NumberKind::F64 => "f64",
        }
    }
}

impl std::fmt::Display for NumberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for NumberKind {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "i8" | "int8" => NumberKind::I8,
            "u8" | "uint8" => NumberKind::U8,
            "i16" | "int16" => NumberKind::I16,
            "u16" | "uint16" => NumberKind::U16,
            "i32" | "int32" => NumberKind::I32,
            "u32" | "uint32" => NumberKind::U32,
            "i64" | "int64" => NumberKind::I64,
            "u64" | "uint64" => NumberKind::U64,
            "f32" | "float32" | "float" => NumberKind::F32,
            "f64" | "float64" | "double" => NumberKind::F64,
            other => return Err(HexError::Argument(format!("unknown number kind `{other}`"))),
        };

        Ok(kind)
    }
}

/// A decoded value, or a literal to encode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Signed(v) => write!(f, "{v}"),
            Number::Unsigned(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Signed(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::Unsigned(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/*

============================
========= DECODING =========
============================

*/

/// Interprets `bytes` as one value of `kind`.
///
/// # Errors
///
/// - [`HexError::Argument`] if `bytes.len()` differs from `kind.size()`.
pub fn decode(bytes: &[u8], kind: NumberKind, endianness: Endianness) -> HexResult<Number> {
    if bytes.len() != kind.size() {
        return Err(HexError::Argument(format!(
            "{kind} needs {} bytes, got {}",
            kind.size(),
            bytes.len()
        )));
    }

    let value = match kind {
        NumberKind::I8 => Number::Signed(i8::from_ne_bytes(array(bytes)?).into()),
        NumberKind::U8 => Number::Unsigned(bytes[0].into()),
        NumberKind::I16 => {
            let raw = array(bytes)?;
            Number::Signed(match endianness {
                Endianness::Little => i16::from_le_bytes(raw),
                Endianness::Big => i16::from_be_bytes(raw),
            }
            .into())
        }
        NumberKind::U16 => {
            let raw = array(bytes)?;
            Number::Unsigned(match endianness {
                Endianness::Little => u16::from_le_bytes(raw),
                Endianness::Big => u16::from_be_bytes(raw),
            }
            .into())
        }
        NumberKind::I32 => {
            let raw = array(bytes)?;
            Number::Signed(match endianness {
                Endianness::Little => i32::from_le_bytes(raw),
                Endianness::Big => i32::from_be_bytes(raw),
            }
            .into())
        }
        NumberKind::U32 => {
            let raw = array(bytes)?;
            Number::Unsigned(match endianness {
                Endianness::Little => u32::from_le_bytes(raw),
                Endianness::Big => u32::from_be_bytes(raw),
            }
            .into())
        }
        NumberKind::I64 => {
            let raw = array(bytes)?;
            Number::Signed(match endianness {
                Endianness::Little => i64::from_le_bytes(raw),
                Endianness::Big => i64::from_be_bytes(raw),
            })
        }
        NumberKind::U64 => {
            let raw = array(bytes)?;
            Number::Unsigned(match endianness {
                Endianness::Little => u64::from_le_bytes(raw),
                Endianness::Big => u64::from_be_bytes(raw),
            })
        }
        NumberKind::F32 => {
            let raw = array(bytes)?;
            Number::Float(
                match endianness {
                    Endianness::Little => f32::from_le_bytes(raw),
                    Endianness::Big => f32::from_be_bytes(raw),
                }
                .into(),
            )
        }
        NumberKind::F64 => {
            let raw = array(bytes)?;
            Number::Float(match endianness {
                Endianness::Little => f64::from_le_bytes(raw),
                Endianness::Big => f64::from_be_bytes(raw),
            })
        }
    };

    Ok(value)
}

#[inline]
fn array<const N: usize>(bytes: &[u8]) -> HexResult<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| HexError::Argument(format!("expected {N} bytes, got {}", bytes.len())))
}

/*

============================
========= ENCODING =========
============================

*/

/// Encodes `value` as `kind`, the inverse of [`decode`].
///
/// # Errors
///
/// - [`HexError::ValueRange`] if `value` is outside the range of `kind`, is a
///   float with a fractional part bound for an integer kind, or is an
///   integer that `kind` cannot represent exactly.
pub fn encode(value: Number, kind: NumberKind, endianness: Endianness) -> HexResult<Vec<u8>> {
    let out_of_range = || HexError::ValueRange {
        value: value.to_string(),
        kind,
    };

    if let Some((min, max)) = kind.int_bounds() {
        let wide = match value {
            Number::Signed(v) => i128::from(v),
            Number::Unsigned(v) => i128::from(v),
            Number::Float(v) if v.is_finite() && v.fract() == 0.0 => v as i128,
            Number::Float(_) => return Err(out_of_range()),
        };

        if wide < min || wide > max {
            return Err(out_of_range());
        }

        return Ok(encode_int(wide, kind, endianness));
    }

    let bytes = match kind {
        NumberKind::F32 => {
            let narrow = match value {
                Number::Float(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
                    return Err(out_of_range());
                }
                Number::Float(v) => {
                    let narrow = v as f32;
                    if v != 0.0 && narrow == 0.0 {
                        return Err(out_of_range());
                    }
                    narrow
                }
                Number::Signed(v) => exact_f32(i128::from(v)).ok_or_else(out_of_range)?,
                Number::Unsigned(v) => exact_f32(i128::from(v)).ok_or_else(out_of_range)?,
            };
            match endianness {
                Endianness::Little => narrow.to_le_bytes().to_vec(),
                Endianness::Big => narrow.to_be_bytes().to_vec(),
            }
        }
        _ => {
            let wide = match value {
                Number::Float(v) => v,
                Number::Signed(v) => exact_f64(i128::from(v)).ok_or_else(out_of_range)?,
                Number::Unsigned(v) => exact_f64(i128::from(v)).ok_or_else(out_of_range)?,
            };
            match endianness {
                Endianness::Little => wide.to_le_bytes().to_vec(),
                Endianness::Big => wide.to_be_bytes().to_vec(),
            }
        }
    };

    Ok(bytes)
}

fn encode_int(value: i128, kind: NumberKind, endianness: Endianness) -> Vec<u8> {
    // `value` is already range-checked for `kind`; two's complement
    // truncation of the little-endian form yields the right bytes.
    let mut bytes = value.to_le_bytes()[..kind.size()].to_vec();

    if endianness == Endianness::Big {
        bytes.reverse();
    }

    bytes
}

#[inline]
fn exact_f32(value: i128) -> Option<f32> {
    let narrow = value as f32;
    (narrow as i128 == value).then_some(narrow)
}

#[inline]
fn exact_f64(value: i128) -> Option<f64> {
    let wide = value as f64;
    (wide as i128 == value).then_some(wide)
}

/*

===========================
========= SUMMARY =========
===========================

*/

/// Every interpretation of the bytes under the cursor at once.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeSummary {
    pub first_byte: u8,
    pub endianness: Endianness,
    pub values: Vec<(NumberKind, Number)>,
}

impl std::fmt::Display for DecodeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08b}", self.first_byte)?;

        for (kind, value) in &self.values {
            write!(f, " {kind}:{value}")?;
        }

        Ok(())
    }
}

/// Decodes up to 8 bytes as every [`NumberKind`]; short input (near the end
/// of the file) is padded with zeros.
#[must_use]
pub fn decode_summary(bytes: &[u8], endianness: Endianness) -> DecodeSummary {
    let mut window = [0u8; 8];
    let take = bytes.len().min(8);

    window[..take].copy_from_slice(&bytes[..take]);

    let values = NumberKind::ALL
        .iter()
        .filter_map(|kind| {
            decode(&window[..kind.size()], *kind, endianness)
                .ok()
                .map(|value| (*kind, value))
        })
        .collect();

    DecodeSummary {
        first_byte: window[0],
        endianness,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_known_values() {
        assert_eq!(
            decode(&[0xff], NumberKind::I8, Endianness::Little).unwrap(),
            Number::Signed(-1)
        );
        assert_eq!(
            decode(&[0x01, 0x02], NumberKind::U16, Endianness::Little).unwrap(),
            Number::Unsigned(0x0201)
        );
        assert_eq!(
            decode(&[0x01, 0x02], NumberKind::U16, Endianness::Big).unwrap(),
            Number::Unsigned(0x0102)
        );
        assert_eq!(
            decode(&1.5f32.to_be_bytes(), NumberKind::F32, Endianness::Big).unwrap(),
            Number::Float(1.5)
        );
    }

    #[test]
    fn wrong_length_is_argument_error() {
        let err = decode(&[0, 0, 0], NumberKind::I32, Endianness::Little).unwrap_err();

        assert_eq!(err.kind(), crate::errors::ErrorKind::ArgumentError);
    }

    #[test]
    fn encode_rejects_out_of_range() {
        for (value, kind) in [
            (Number::Signed(128), NumberKind::I8),
            (Number::Signed(-1), NumberKind::U64),
            (Number::Unsigned(u64::MAX), NumberKind::I64),
            (Number::Unsigned(70_000), NumberKind::U16),
            (Number::Float(1.5), NumberKind::I32),
            (Number::Float(f64::NAN), NumberKind::U8),
            (Number::Float(1e300), NumberKind::F32),
            (Number::Float(1e-60), NumberKind::F32),
            (Number::Float(-1e-60), NumberKind::F32),
            (Number::Signed((1 << 24) + 1), NumberKind::F32),
        ] {
            let err = encode(value, kind, Endianness::Little).unwrap_err();
            assert_eq!(err.kind(), crate::errors::ErrorKind::RangeError, "{value} as {kind}");
        }
    }

    #[test]
    fn encode_accepts_integral_floats_and_exact_ints() {
        assert_eq!(
            encode(Number::Float(-2.0), NumberKind::I16, Endianness::Big).unwrap(),
            vec![0xff, 0xfe]
        );
        assert_eq!(
            encode(Number::Signed(1 << 24), NumberKind::F32, Endianness::Little).unwrap(),
            16_777_216f32.to_le_bytes().to_vec()
        );
        assert_eq!(
            encode(Number::Unsigned(255), NumberKind::U8, Endianness::Big).unwrap(),
            vec![0xff]
        );
        assert_eq!(
            encode(Number::Float(0.0), NumberKind::F32, Endianness::Little).unwrap(),
            vec![0, 0, 0, 0]
        );
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("int32".parse::<NumberKind>().unwrap(), NumberKind::I32);
        assert_eq!("F64".parse::<NumberKind>().unwrap(), NumberKind::F64);
        assert!("i128".parse::<NumberKind>().is_err());
    }

    #[test]
    fn summary_pads_and_formats() {
        let summary = decode_summary(&[0x80], Endianness::Little);

        assert_eq!(summary.values.len(), NumberKind::ALL.len());
        assert!(summary.to_string().starts_with(
            "10000000 i8:-128 u8:128 i16:128 u16:128 i32:128 u32:128 i64:128 u64:128 f32:"
        ));

        let zeros = decode_summary(&[], Endianness::Big);
        assert!(zeros.to_string().ends_with("f32:0.0 f64:0.0"));
    }

    fn endianness() -> impl Strategy<Value = Endianness> {
        prop_oneof![Just(Endianness::Little), Just(Endianness::Big)]
    }

    fn representable() -> impl Strategy<Value = (Number, NumberKind)> {
        prop_oneof![
            any::<i8>().prop_map(|v| (Number::Signed(v.into()), NumberKind::I8)),
            any::<u8>().prop_map(|v| (Number::Unsigned(v.into()), NumberKind::U8)),
            any::<i16>().prop_map(|v| (Number::Signed(v.into()), NumberKind::I16)),
            any::<u16>().prop_map(|v| (Number::Unsigned(v.into()), NumberKind::U16)),
            any::<i32>().prop_map(|v| (Number::Signed(v.into()), NumberKind::I32)),
            any::<u32>().prop_map(|v| (Number::Unsigned(v.into()), NumberKind::U32)),
            any::<i64>().prop_map(|v| (Number::Signed(v), NumberKind::I64)),
            any::<u64>().prop_map(|v| (Number::Unsigned(v), NumberKind::U64)),
            proptest::num::f32::NORMAL.prop_map(|v| (Number::Float(v.into()), NumberKind::F32)),
            proptest::num::f64::NORMAL.prop_map(|v| (Number::Float(v), NumberKind::F64)),
        ]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode((value, kind) in representable(), e in endianness()) {
            let bytes = encode(value, kind, e).unwrap();

            prop_assert_eq!(bytes.len(), kind.size());
            prop_assert_eq!(decode(&bytes, kind, e).unwrap(), value);
        }
    }
}
