//! The six mode 01 sensors the dashboard polls.
//!
//! | PID  | Sensor          | Bytes | Formula            |
//! |------|-----------------|-------|--------------------|
//! | 0x05 | Coolant temp    | 1     | A - 40             |
//! | 0x0C | Engine RPM      | 2     | (A*256 + B) / 4    |
//! | 0x0D | Vehicle speed   | 1     | A                  |
//! | 0x0F | Intake air temp | 1     | A - 40             |
//! | 0x11 | Throttle        | 1     | A * 100 / 255      |
//! | 0x42 | Module voltage  | 2     | (A*256 + B) / 1000 |

use core::fmt;

use heapless::String;

use super::response::data_byte;
use crate::store::TelemetrySnapshot;

/// Sensor parameter IDs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pid {
    CoolantTemp = 0x05,
    Rpm = 0x0C,
    Speed = 0x0D,
    IntakeTemp = 0x0F,
    Throttle = 0x11,
    BatteryVoltage = 0x42,
}

impl Pid {
    /// Poll order: one PID per cycle, then wrap around.
    pub const ROTATION: [Self; 6] = [
        Self::CoolantTemp,
        Self::Rpm,
        Self::Speed,
        Self::Throttle,
        Self::IntakeTemp,
        Self::BatteryVoltage,
    ];

    #[inline]
    pub const fn code(self) -> u8 { self as u8 }

    /// Short name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CoolantTemp => "coolant",
            Self::Rpm => "rpm",
            Self::Speed => "speed",
            Self::IntakeTemp => "intake",
            Self::Throttle => "throttle",
            Self::BatteryVoltage => "battery",
        }
    }

    /// Mode 01 request, e.g. `"010C"`.
    pub fn command(self) -> String<4> {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        let code = self.code();
        // Four ASCII chars into a `String<4>`
        ['0', '1', HEX[usize::from(code >> 4)] as char, HEX[usize::from(code & 0x0F)] as char]
            .into_iter()
            .collect()
    }

    /// Decode a raw response. `None` is a parse failure.
    pub fn decode(
        self,
        response: &str,
    ) -> Option<SensorReading> {
        let a = data_byte(response, 0)?;
        let reading = match self {
            Self::CoolantTemp => SensorReading::CoolantTemp(f32::from(a) - 40.0),
            Self::IntakeTemp => SensorReading::IntakeTemp(f32::from(a) - 40.0),
            Self::Speed => SensorReading::Speed(a),
            Self::Throttle => SensorReading::Throttle(f32::from(a) * 100.0 / 255.0),
            Self::Rpm => {
                let b = data_byte(response, 1)?;
                SensorReading::Rpm(word(a, b) / 4)
            }
            Self::BatteryVoltage => {
                let b = data_byte(response, 1)?;
                let volts = f32::from(word(a, b)) / 1000.0;
                // 0 V means the module voltage is not reported
                if volts <= 0.0 {
                    return None;
                }
                SensorReading::BatteryVoltage(volts)
            }
        };
        Some(reading)
    }
}

impl fmt::Display for Pid {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
const fn word(
    a: u8,
    b: u8,
) -> u16 {
    ((a as u16) << 8) | b as u16
}

/// One decoded sensor value.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SensorReading {
    CoolantTemp(f32),
    Rpm(u16),
    Speed(u8),
    IntakeTemp(f32),
    Throttle(f32),
    BatteryVoltage(f32),
}

impl SensorReading {
    /// Store the value in its snapshot field.
    pub fn apply(
        self,
        snapshot: &mut TelemetrySnapshot,
    ) {
        match self {
            Self::CoolantTemp(v) => snapshot.coolant_temp = v,
            Self::Rpm(v) => snapshot.rpm = v,
            Self::Speed(v) => snapshot.speed = v,
            Self::IntakeTemp(v) => snapshot.intake_temp = v,
            Self::Throttle(v) => snapshot.throttle_pct = v,
            Self::BatteryVoltage(v) => snapshot.battery_voltage = v,
        }
    }
}

/// Cursor over [`Pid::ROTATION`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PidRotation {
    next: usize,
}

impl PidRotation {
    pub const fn new() -> Self { Self { next: 0 } }

    /// PID for the current cycle; moves the cursor to the following one.
    pub fn advance(&mut self) -> Pid {
        let pid = Pid::ROTATION[self.next];
        self.next = (self.next + 1) % Pid::ROTATION.len();
        pid
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
