//! obdeck core - everything that does not touch a pin.
//!
//! The firmware (`obdeck-pico2`) and the desktop simulator (`obdeck-simulator`)
//! both link this crate and supply three collaborators:
//!
//! - an [`transport::ObdTransport`] talking to an ELM327-compatible adapter,
//! - a [`render::DrawPrimitives`] surface,
//! - an `embedded_hal_async::delay::DelayNs` used for protocol sleeps and
//!   display settle delays.
//!
//! # Modules
//!
//! - `protocol`: mode 01/09 request building and response parsing
//! - `dtc`: trouble-code decoding, catalog lookup, list parsing and sorting
//! - `store`: the lock-guarded telemetry store and the DTC command queue
//! - `worker`: connect / poll / reconnect state machine
//! - `render`: pacing policy, frame diffing and screen widgets
//! - `state`: pages, buttons and the input dispatcher
//! - `log_buffer`: on-device log ring with `log_*!` macros
//!
//! # Testing
//!
//! ```bash
//! cargo test -p obdeck-common
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), while the firmware links the
//! crate as `no_std`.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod log_buffer;

pub mod colors;
pub mod config;
pub mod dtc;
pub mod error;
pub mod protocol;
pub mod render;
pub mod state;
pub mod store;
pub mod text;
pub mod transport;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{CommandError, LinkError, TransportError};
pub use state::{ButtonId, InputDispatcher, InputEvent, Page, ViewState};
pub use store::{SharedTelemetry, TelemetrySnapshot, TelemetryStore};
pub use worker::{LinkState, TelemetryWorker};
