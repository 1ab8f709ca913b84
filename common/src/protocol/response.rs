//! Byte extraction from raw adapter responses.
//!
//! A mode 01 answer looks like `"41 0C 0F A0"`, possibly preceded by a
//! `SEARCHING...` banner. The data region starts a fixed six characters after
//! the first `41` (acknowledgement, PID and separators). From there the text
//! is read as consecutive two-character hex tokens, whitespace skipped.

/// Mode 01 acknowledgement token.
pub const MODE01_ACK: &str = "41";

/// Characters between the start of the acknowledgement and the first data byte.
const DATA_OFFSET: usize = 6;

/// Substrings the adapter prints instead of data when something is wrong.
const ADAPTER_ERRORS: [&str; 3] = ["ERROR", "UNABLE", "?"];

/// Two-character tokens of `text`, whitespace skipped.
///
/// Yields `Some(byte)` for a valid hex pair and `None` for a token that is
/// not hex (a prompt, a letter of `NO DATA`, ...). A dangling single
/// character ends the sequence.
pub fn hex_pairs(text: &str) -> impl Iterator<Item = Option<u8>> + '_ {
    let mut bytes = text.bytes().filter(|b| !b.is_ascii_whitespace());
    core::iter::from_fn(move || {
        let hi = bytes.next()?;
        let lo = bytes.next()?;
        Some(hex_value(hi).zip(hex_value(lo)).map(|(h, l)| (h << 4) | l))
    })
}

/// Data byte `index` of a mode 01 response, or `None` if the
/// acknowledgement is missing or the response is too short.
pub fn data_byte(
    response: &str,
    index: usize,
) -> Option<u8> {
    let start = response.find(MODE01_ACK)?;
    let data = response.get(start + DATA_OFFSET..)?;
    hex_pairs(data).nth(index).flatten()
}

/// Whether `token` appears as a whole whitespace-separated word.
pub fn contains_token(
    response: &str,
    token: &str,
) -> bool {
    response.split_ascii_whitespace().any(|t| t.eq_ignore_ascii_case(token))
}

/// Whether the adapter answered with one of its error strings.
pub fn has_adapter_error(response: &str) -> bool { ADAPTER_ERRORS.iter().any(|e| response.contains(e)) }

/// Value of one ASCII hex digit.
pub(crate) const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Parse a whitespace-free two-character hex token.
pub(crate) fn parse_hex_token(token: &str) -> Option<u8> {
    match token.as_bytes() {
        [hi, lo] => Some((hex_value(*hi)? << 4) | hex_value(*lo)?),
        _ => None,
    }
}
