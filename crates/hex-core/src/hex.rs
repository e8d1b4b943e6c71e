/// Parses a string of hex digit pairs, ignoring spaces: `"de ad BE EF"`.
///
/// # Errors
///
/// - [`crate::errors::HexError::Argument`] if the string is empty, has an odd
///   number of digits, or contains a non-hex character.
pub fn parse_hex(text: &str) -> crate::errors::HexResult<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| *b != b' ').collect();

    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(crate::errors::HexError::Argument(format!(
            "could not parse hex string `{text}`"
        )));
    }

    digits
        .chunks_exact(2)
        .map(|pair| match (nibble(pair[0]), nibble(pair[1])) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(crate::errors::HexError::Argument(format!(
                "could not parse hex string `{text}`"
            ))),
        })
        .collect()
}

#[inline]
fn nibble(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Glyph shown for a byte in the text column of a hex view.
#[inline]
#[must_use]
pub fn display_char(byte: u8) -> char {
    match byte {
        0 => ' ',
        32..=126 => byte as char,
        _ => '\u{b7}',
    }
}

/// Lowercase hex with a space between bytes, as rendered in the hex column.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);

    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{b:02x}"));
    }

    out
}
