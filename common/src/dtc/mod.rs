//! Diagnostic trouble codes.
//!
//! - `code`: the 16-bit DTC encoding and its five-character form
//! - `catalog`: static description and severity tables
//! - `list`: the bounded, severity-sorted list read with mode 03

pub mod catalog;
pub mod code;
pub mod list;

use embedded_graphics::pixelcolor::Rgb565;

pub use code::{DtcCategory, DtcCode};
pub use list::{DESCRIPTION_LEN, DiagnosticCode, DtcList, DtcParseError, MAX_DTCS};

use crate::colors::{DARK_TEAL, ORANGE, RED};

/// How urgently a code needs attention. Ordered `Info < Warning < Critical`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Four-letter badge text.
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Critical => "CRIT",
        }
    }

    /// Badge background color.
    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Info => DARK_TEAL,
            Self::Warning => ORANGE,
            Self::Critical => RED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(Severity::default(), Severity::Info);
    }

    #[test]
    fn test_badges() {
        assert_eq!(Severity::Critical.badge(), "CRIT");
        assert_eq!(Severity::Warning.badge(), "WARN");
        assert_eq!(Severity::Info.badge(), "INFO");
    }
}
