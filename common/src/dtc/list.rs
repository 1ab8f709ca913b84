//! Bounded list of stored trouble codes.
//!
//! A mode 03 answer is an acknowledgement token followed by high/low byte
//! pairs:
//!
//! ```text
//! 43 01 33 03 00 00 00
//! ```
//!
//! Parsing stops at the first `00 00` pair, at a non-hex token, or once
//! [`MAX_DTCS`] codes were collected. When several ECUs answer, each
//! `43` line is read in turn.

use heapless::{String, Vec};

use super::Severity;
use super::catalog;
use super::code::DtcCode;
use crate::protocol::response::parse_hex_token;

/// Capacity of the code list.
pub const MAX_DTCS: usize = 12;

/// Maximum description length kept per code.
pub const DESCRIPTION_LEN: usize = 79;

/// Mode 03 acknowledgement token.
const MODE03_ACK: &str = "43";

/// A decoded code with its catalog data.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DiagnosticCode {
    pub code: DtcCode,
    pub description: String<DESCRIPTION_LEN>,
    pub severity: Severity,
}

impl DiagnosticCode {
    /// Look up description and severity for `code`.
    pub fn from_code(code: DtcCode) -> Self {
        Self {
            code,
            description: crate::text::truncated(catalog::describe(code)),
            severity: catalog::classify(code),
        }
    }
}

/// Why a mode 03 response could not be read.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DtcParseError {
    /// No `43` line and no `NO DATA` either.
    MissingAck,
}

/// Stored codes, at most [`MAX_DTCS`].
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DtcList {
    codes: Vec<DiagnosticCode, MAX_DTCS>,
}

impl DtcList {
    pub const fn new() -> Self { Self { codes: Vec::new() } }

    #[inline]
    pub fn len(&self) -> usize { self.codes.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.codes.is_empty() }

    #[inline]
    pub fn get(
        &self,
        index: usize,
    ) -> Option<&DiagnosticCode> {
        self.codes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticCode> { self.codes.iter() }

    pub fn clear(&mut self) { self.codes.clear(); }

    /// Append a code. Returns it back when the list is full.
    pub fn push(
        &mut self,
        code: DiagnosticCode,
    ) -> Result<(), DiagnosticCode> {
        self.codes.push(code)
    }

    /// Highest severity present, `None` when empty.
    pub fn max_severity(&self) -> Option<Severity> { self.codes.iter().map(|c| c.severity).max() }

    pub fn has_critical(&self) -> bool { self.max_severity() == Some(Severity::Critical) }

    /// Stable sort, most severe first. Equal severities keep query order.
    pub fn sort_by_severity(&mut self) {
        // core only offers unstable slice sorts
        let codes: &mut [DiagnosticCode] = &mut self.codes;
        for i in 1..codes.len() {
            let mut j = i;
            while j > 0 && codes[j - 1].severity < codes[j].severity {
                codes.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    /// Cheap fingerprint of the listed codes, used to spot content changes.
    pub fn signature(&self) -> u32 {
        self.codes.iter().fold(self.codes.len() as u32, |acc, c| {
            acc.rotate_left(5) ^ u32::from(c.code.raw())
        })
    }

    /// Parse a mode 03 response in query order (not yet sorted).
    ///
    /// `NO DATA` means the vehicle stores no codes and yields an empty list.
    pub fn parse_response(response: &str) -> Result<Self, DtcParseError> {
        let mut list = Self::new();
        let mut saw_ack = false;

        'lines: for line in response.split(['\r', '\n']) {
            let mut tokens = line.split_ascii_whitespace();
            if tokens.next() != Some(MODE03_ACK) {
                continue;
            }
            saw_ack = true;

            loop {
                let (Some(hi), Some(lo)) = (tokens.next(), tokens.next()) else {
                    continue 'lines;
                };
                let (Some(hi), Some(lo)) = (parse_hex_token(hi), parse_hex_token(lo)) else {
                    continue 'lines;
                };
                let code = DtcCode::from_bytes(hi, lo);
                if code.is_terminator() {
                    continue 'lines;
                }
                if list.push(DiagnosticCode::from_code(code)).is_err() {
                    break 'lines;
                }
            }
        }

        if saw_ack || response.contains("NO DATA") {
            Ok(list)
        } else {
            Err(DtcParseError::MissingAck)
        }
    }
}
