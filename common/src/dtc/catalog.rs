//! Static description and severity tables for common trouble codes.
//!
//! Codes that are not listed fall back to "Unknown DTC" and [`Severity::Info`].
//! Critical is reserved for faults that can damage the engine or catalyst
//! if driving continues (misfires, overheating, oil pressure, lost ECU).

use super::Severity;
use super::Severity::{Critical, Info, Warning};
use super::code::DtcCode;

/// Description used for codes missing from [`CATALOG`].
pub const UNKNOWN_DESCRIPTION: &str = "Unknown DTC";

/// One catalog row.
#[derive(Clone, Copy, Debug)]
pub struct CatalogEntry {
    pub code: &'static str,
    pub description: &'static str,
    pub severity: Severity,
}

const fn entry(
    code: &'static str,
    description: &'static str,
    severity: Severity,
) -> CatalogEntry {
    CatalogEntry {
        code,
        description,
        severity,
    }
}

/// Known codes.
pub static CATALOG: &[CatalogEntry] = &[
    // Fuel and air metering
    entry("P0100", "Mass air flow circuit malfunction", Warning),
    entry("P0101", "Mass air flow circuit range/performance", Info),
    entry("P0102", "Mass air flow circuit low input", Warning),
    entry("P0103", "Mass air flow circuit high input", Warning),
    entry("P0106", "Manifold pressure sensor range/performance", Info),
    entry("P0110", "Intake air temperature sensor circuit", Info),
    entry("P0113", "Intake air temperature sensor high input", Info),
    entry("P0115", "Engine coolant temperature sensor circuit", Warning),
    entry("P0117", "Engine coolant temperature sensor low input", Warning),
    entry("P0118", "Engine coolant temperature sensor high input", Warning),
    entry("P0121", "Throttle position sensor range/performance", Warning),
    entry("P0128", "Coolant thermostat below regulating temperature", Info),
    entry("P0130", "O2 sensor circuit (bank 1 sensor 1)", Info),
    entry("P0133", "O2 sensor slow response (bank 1 sensor 1)", Info),
    entry("P0135", "O2 sensor heater circuit (bank 1 sensor 1)", Info),
    entry("P0171", "System too lean (bank 1)", Warning),
    entry("P0172", "System too rich (bank 1)", Warning),
    entry("P0174", "System too lean (bank 2)", Warning),
    entry("P0175", "System too rich (bank 2)", Warning),
    entry("P0217", "Engine overtemperature condition", Critical),
    entry("P0219", "Engine overspeed condition", Critical),
    entry("P0234", "Turbocharger overboost condition", Critical),
    entry("P0299", "Turbocharger underboost condition", Warning),
    // Ignition and misfire
    entry("P0300", "Random/multiple cylinder misfire detected", Critical),
    entry("P0301", "Cylinder 1 misfire detected", Critical),
    entry("P0302", "Cylinder 2 misfire detected", Critical),
    entry("P0303", "Cylinder 3 misfire detected", Critical),
    entry("P0304", "Cylinder 4 misfire detected", Critical),
    entry("P0325", "Knock sensor 1 circuit (bank 1)", Warning),
    entry("P0335", "Crankshaft position sensor A circuit", Critical),
    entry("P0340", "Camshaft position sensor A circuit (bank 1)", Warning),
    // Emission controls
    entry("P0401", "EGR flow insufficient", Warning),
    entry("P0420", "Catalyst efficiency below threshold (bank 1)", Warning),
    entry("P0430", "Catalyst efficiency below threshold (bank 2)", Warning),
    entry("P0440", "Evaporative emission system malfunction", Info),
    entry("P0442", "Evaporative emission system small leak", Info),
    entry("P0455", "Evaporative emission system large leak", Info),
    entry("P0456", "Evaporative emission system very small leak", Info),
    // Speed, idle and electrical
    entry("P0500", "Vehicle speed sensor malfunction", Warning),
    entry("P0505", "Idle air control system malfunction", Info),
    entry("P0520", "Oil pressure sensor/switch circuit", Critical),
    entry("P0524", "Engine oil pressure too low", Critical),
    entry("P0562", "System voltage low", Warning),
    entry("P0563", "System voltage high", Warning),
    entry("P0601", "Control module memory checksum error", Critical),
    // Transmission
    entry("P0700", "Transmission control system malfunction", Warning),
    entry("P0715", "Input/turbine speed sensor circuit", Warning),
    // Network
    entry("U0100", "Lost communication with ECM/PCM", Critical),
    entry("U0101", "Lost communication with TCM", Warning),
    entry("U0121", "Lost communication with ABS module", Warning),
    entry("U0140", "Lost communication with body control module", Info),
    // Chassis and body
    entry("C0035", "Left front wheel speed sensor circuit", Warning),
    entry("C0040", "Right front wheel speed sensor circuit", Warning),
    entry("B0001", "Driver frontal deployment control", Critical),
];

/// Catalog row for `code`, if listed.
pub fn find(code: DtcCode) -> Option<&'static CatalogEntry> {
    let text = code.format();
    CATALOG.iter().find(|e| e.code == text.as_str())
}

/// Description for `code`, "Unknown DTC" if not listed.
pub fn describe(code: DtcCode) -> &'static str { find(code).map_or(UNKNOWN_DESCRIPTION, |e| e.description) }

/// Severity for `code`, [`Severity::Info`] if not listed.
pub fn classify(code: DtcCode) -> Severity { find(code).map_or(Severity::Info, |e| e.severity) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(classify(DtcCode::parse("P0300").unwrap()), Severity::Critical);
        assert_eq!(classify(DtcCode::parse("P0401").unwrap()), Severity::Warning);
        assert_eq!(classify(DtcCode::parse("P0101").unwrap()), Severity::Info);
        assert_eq!(describe(DtcCode::from_raw(0x0133)), "O2 sensor slow response (bank 1 sensor 1)");
    }

    #[test]
    fn test_unknown_code_defaults() {
        let code = DtcCode::parse("P1ABC").unwrap();
        assert_eq!(describe(code), UNKNOWN_DESCRIPTION);
        assert_eq!(classify(code), Severity::Info);
    }

    #[test]
    fn test_catalog_codes_are_valid() {
        for entry in CATALOG {
            let code = DtcCode::parse(entry.code);
            assert!(code.is_some(), "{} does not parse", entry.code);
            assert_eq!(code.map(DtcCode::format).as_deref(), Some(entry.code));
        }
    }

    #[test]
    fn test_catalog_has_no_duplicates() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.code != a.code), "{} listed twice", a.code);
        }
    }

    #[test]
    fn test_descriptions_fit_display() {
        for entry in CATALOG {
            assert!(entry.description.len() <= crate::dtc::DESCRIPTION_LEN);
        }
    }
}
