//! ELM327 text protocol: request building and response parsing.
//!
//! Requests are hex strings such as `"010C"`; the transport appends the
//! carriage return. Responses are whatever the adapter printed before its
//! `>` prompt, including search banners and echoed acknowledgement tokens.

pub mod pid;
pub mod response;
pub mod vin;

pub use pid::{Pid, PidRotation, SensorReading};
pub use response::{contains_token, data_byte, has_adapter_error, hex_pairs};
pub use vin::{VIN_LEN, Vin, parse_vin};

/// Mode 03 request: read stored trouble codes.
pub const READ_DTCS: &str = "03";

/// Mode 04 request: clear trouble codes and the MIL.
pub const CLEAR_DTCS: &str = "04";

/// Mode 09 PID 02 request: vehicle identification number.
pub const READ_VIN: &str = "0902";

/// Positive acknowledgement of a mode 04 request.
pub const CLEAR_ACK: &str = "44";
