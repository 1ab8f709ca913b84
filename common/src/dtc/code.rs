//! Two-byte DTC encoding.
//!
//! ```text
//!  15 14 | 13 12 | 11..8 | 7..4 | 3..0
//!  cat   | digit | hex1  | hex2 | hex3
//! ```
//!
//! Category `00` is P (powertrain), `01` C (chassis), `10` B (body) and
//! `11` U (network), so `0x0133` formats as `P0133`.

use core::fmt;

use heapless::String;

use crate::protocol::response::hex_value;

/// DTC system category (top two bits).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DtcCategory {
    Powertrain,
    Chassis,
    Body,
    Network,
}

impl DtcCategory {
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0 => Self::Powertrain,
            1 => Self::Chassis,
            2 => Self::Body,
            _ => Self::Network,
        }
    }

    pub const fn bits(self) -> u16 {
        match self {
            Self::Powertrain => 0,
            Self::Chassis => 1,
            Self::Body => 2,
            Self::Network => 3,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Self::Powertrain => 'P',
            Self::Chassis => 'C',
            Self::Body => 'B',
            Self::Network => 'U',
        }
    }

    pub const fn from_letter(c: char) -> Option<Self> {
        match c {
            'P' | 'p' => Some(Self::Powertrain),
            'C' | 'c' => Some(Self::Chassis),
            'B' | 'b' => Some(Self::Body),
            'U' | 'u' => Some(Self::Network),
            _ => None,
        }
    }
}

/// Raw 16-bit trouble code.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DtcCode(u16);

impl DtcCode {
    #[inline]
    pub const fn from_raw(raw: u16) -> Self { Self(raw) }

    /// Build from the high and low byte of a mode 03 pair.
    #[inline]
    pub const fn from_bytes(
        hi: u8,
        lo: u8,
    ) -> Self {
        Self(((hi as u16) << 8) | lo as u16)
    }

    #[inline]
    pub const fn raw(self) -> u16 { self.0 }

    #[inline]
    pub const fn category(self) -> DtcCategory { DtcCategory::from_bits(self.0 >> 14) }

    /// `0000` marks the end of a mode 03 list.
    #[inline]
    pub const fn is_terminator(self) -> bool { self.0 == 0 }

    /// Five-character form, e.g. `"P0133"`.
    pub fn format(self) -> String<5> {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        let raw = self.0;
        let digits = [
            self.category().letter(),
            char::from(b'0' + ((raw >> 12) & 0x3) as u8),
            char::from(HEX[usize::from((raw >> 8) & 0xF)]),
            char::from(HEX[usize::from((raw >> 4) & 0xF)]),
            char::from(HEX[usize::from(raw & 0xF)]),
        ];
        // Five ASCII chars into a `String<5>`
        digits.into_iter().collect()
    }

    /// Parse a five-character code such as `"U0100"`.
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let [letter, digit, h1, h2, h3] = bytes else {
            return None;
        };
        let category = DtcCategory::from_letter(char::from(*letter))?;
        let digit = match digit {
            b'0'..=b'3' => u16::from(digit - b'0'),
            _ => return None,
        };
        let mut raw = (category.bits() << 14) | (digit << 12);
        for (shift, c) in [(8, h1), (4, h2), (0, h3)] {
            raw |= u16::from(hex_value(*c)?) << shift;
        }
        Some(Self(raw))
    }
}

impl fmt::Display for DtcCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.format())
    }
}
