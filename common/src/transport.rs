//! Byte-stream session to an ELM327-compatible adapter.
//!
//! Implementations: a UART link on the firmware, an emulated adapter in the
//! simulator, and a scripted fake in tests.

use heapless::String;

pub use crate::error::TransportError;

/// Prompt the adapter prints when it is ready for the next request.
pub const PROMPT: u8 = b'>';

/// Capacity of one response. Longer responses are truncated.
pub const RESPONSE_CAPACITY: usize = 256;

/// Text of one adapter response, prompt excluded.
pub type Response = String<RESPONSE_CAPACITY>;

/// Request/response access to the adapter.
///
/// The worker owns the transport exclusively and never calls it while holding
/// the telemetry lock.
#[allow(async_fn_in_trait)]
pub trait ObdTransport {
    /// Open (or reopen) the session.
    async fn open(&mut self) -> Result<(), TransportError>;

    /// Tear the session down. Never fails.
    async fn close(&mut self);

    /// Discard stale input, then write `command` followed by `\r`.
    async fn send(
        &mut self,
        command: &str,
    ) -> Result<(), TransportError>;

    /// Clear `response`, then collect printable ASCII until `terminator`
    /// arrives or `timeout_ms` elapses (`Err(Timeout)`). Characters beyond
    /// the buffer capacity are dropped while waiting for the terminator.
    ///
    /// On `Err(Timeout)` the text received so far stays in `response`.
    async fn read_until(
        &mut self,
        terminator: u8,
        timeout_ms: u32,
        response: &mut Response,
    ) -> Result<(), TransportError>;
}

/// Append one received byte to `response` following the
/// [`ObdTransport::read_until`] rules. Returns `true` on the terminator.
pub fn accept_byte(
    response: &mut Response,
    terminator: u8,
    byte: u8,
) -> bool {
    if byte == terminator {
        return true;
    }
    if byte.is_ascii_graphic() || byte == b' ' || byte == b'\r' || byte == b'\n' {
        // Full buffer: keep draining until the prompt
        let _ = response.push(char::from(byte));
    }
    false
}
