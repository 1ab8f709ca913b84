//! Vehicle identification number (mode 09, PID 02).
//!
//! CAN adapters answer with a multi-frame block:
//!
//! ```text
//! 014
//! 0: 49 02 01 57 50 30
//! 1: 5A 5A 5A 39 39 5A 54
//! 2: 53 33 39 32 31 32 34
//! ```
//!
//! while older protocols send five `49 02 <n>` lines of four bytes each,
//! padded with `00`. Both are handled by skipping every `49 02 <n>` header,
//! ignoring tokens that are not a single hex byte (frame counters, byte
//! counts) and keeping alphanumeric data bytes.

use heapless::String;

use super::response::parse_hex_token;

/// Characters in a VIN.
pub const VIN_LEN: usize = 17;

pub type Vin = String<VIN_LEN>;

/// Mode 09 acknowledgement byte.
const MODE09_ACK: u8 = 0x49;

/// Info type for the VIN.
const VIN_INFO_TYPE: u8 = 0x02;

/// Extract the VIN, or `None` unless exactly 17 characters were found.
pub fn parse_vin(response: &str) -> Option<Vin> {
    let mut bytes = response.split_ascii_whitespace().filter_map(parse_hex_token).peekable();
    let mut vin = Vin::new();
    let mut saw_header = false;

    while let Some(byte) = bytes.next() {
        if byte == MODE09_ACK && bytes.peek() == Some(&VIN_INFO_TYPE) {
            // Skip info type and sequence number
            bytes.next();
            bytes.next();
            saw_header = true;
            continue;
        }
        if !saw_header || !byte.is_ascii_alphanumeric() {
            continue;
        }
        // More than 17 characters is not a VIN
        vin.push(byte as char).ok()?;
    }

    (vin.len() == VIN_LEN).then_some(vin)
}
