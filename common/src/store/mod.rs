//! Telemetry state shared by the worker and the render loop.
//!
//! [`SharedTelemetry`] is created once by the entry point and handed to both
//! loops by reference. One blocking mutex guards the whole
//! [`TelemetryStore`]; access goes through closures, so the lock can never be
//! held across an `.await`, a transport call or a sleep. Readers take a full
//! copy with [`SharedTelemetry::snapshot`] and never see a half-updated store.

mod commands;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::String;

pub use commands::{COMMAND_QUEUE_CAPACITY, CommandAck, CommandQueue, DtcCommand};

use crate::dtc::DtcList;
use crate::error::CommandError;
use crate::protocol::{SensorReading, Vin};

/// Maximum length of the user-visible error text.
pub const ERROR_TEXT_LEN: usize = 63;

/// Latest sensor values and link status.
#[derive(Clone, PartialEq, Debug)]
pub struct TelemetrySnapshot {
    pub rpm: u16,
    /// km/h
    pub speed: u8,
    /// °C
    pub coolant_temp: f32,
    /// °C
    pub intake_temp: f32,
    pub throttle_pct: f32,
    pub battery_voltage: f32,
    pub connected: bool,
    pub last_error: String<ERROR_TEXT_LEN>,
}

impl TelemetrySnapshot {
    pub const fn new() -> Self {
        Self {
            rpm: 0,
            speed: 0,
            coolant_temp: 0.0,
            intake_temp: 0.0,
            throttle_pct: 0.0,
            battery_voltage: 0.0,
            connected: false,
            last_error: String::new(),
        }
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self { Self::new() }
}

/// Everything behind the lock.
#[derive(Clone, Debug)]
pub struct TelemetryStore {
    pub telemetry: TelemetrySnapshot,
    /// Codes from the last successful mode 03 query, most severe first.
    pub dtcs: DtcList,
    /// At least one mode 03 query succeeded since boot.
    pub dtcs_read: bool,
    pub vin: Option<Vin>,
    pub commands: CommandQueue,
}

impl TelemetryStore {
    pub const fn new() -> Self {
        Self {
            telemetry: TelemetrySnapshot::new(),
            dtcs: DtcList::new(),
            dtcs_read: false,
            vin: None,
            commands: CommandQueue::new(),
        }
    }

    #[inline]
    pub fn refresh_requested(&self) -> bool { self.commands.is_pending(DtcCommand::Refresh) }

    #[inline]
    pub fn clear_requested(&self) -> bool { self.commands.is_pending(DtcCommand::Clear) }
}

impl Default for TelemetryStore {
    fn default() -> Self { Self::new() }
}

/// Lock-guarded [`TelemetryStore`], shared by reference.
pub struct SharedTelemetry<M: RawMutex> {
    inner: Mutex<M, RefCell<TelemetryStore>>,
}

impl<M: RawMutex> SharedTelemetry<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(TelemetryStore::new())),
        }
    }

    /// Run `f` with exclusive access. Keep `f` short and free of I/O.
    pub fn update<R>(
        &self,
        f: impl FnOnce(&mut TelemetryStore) -> R,
    ) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Run `f` with shared access.
    pub fn read<R>(
        &self,
        f: impl FnOnce(&TelemetryStore) -> R,
    ) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    /// Consistent copy of the whole store.
    pub fn snapshot(&self) -> TelemetryStore { self.read(TelemetryStore::clone) }

    // =========================================================================
    // Worker side
    // =========================================================================

    /// Link is up: `connected=true`, error text cleared.
    pub fn mark_connected(&self) {
        self.update(|s| {
            s.telemetry.connected = true;
            s.telemetry.last_error.clear();
        });
    }

    /// Link is down with a user-visible reason.
    pub fn mark_disconnected(
        &self,
        reason: &str,
    ) {
        let text = crate::text::truncated(reason);
        self.update(|s| {
            s.telemetry.connected = false;
            s.telemetry.last_error = text;
        });
    }

    pub fn apply_reading(
        &self,
        reading: SensorReading,
    ) {
        self.update(|s| reading.apply(&mut s.telemetry));
    }

    /// Replace the code list with a fresh query result.
    pub fn replace_dtcs(
        &self,
        dtcs: DtcList,
    ) {
        self.update(|s| {
            s.dtcs = dtcs;
            s.dtcs_read = true;
        });
    }

    /// Empty the list after a confirmed clear, before the re-query.
    pub fn clear_dtcs(&self) { self.update(|s| s.dtcs.clear()); }

    pub fn set_vin(
        &self,
        vin: Vin,
    ) {
        self.update(|s| s.vin = Some(vin));
    }

    /// Take the oldest waiting command and mark it in flight.
    pub fn begin_command(&self) -> Option<DtcCommand> { self.update(|s| s.commands.begin_next()) }

    /// Acknowledge the in-flight command.
    pub fn complete_command(
        &self,
        command: DtcCommand,
        succeeded: bool,
    ) -> CommandAck {
        self.update(|s| s.commands.complete(command, succeeded))
    }

    // =========================================================================
    // Dispatcher side
    // =========================================================================

    /// Queue a DTC command for the worker.
    pub fn request(
        &self,
        command: DtcCommand,
    ) -> Result<(), CommandError> {
        self.update(|s| s.commands.request(command))
    }

    pub fn refresh_requested(&self) -> bool { self.read(TelemetryStore::refresh_requested) }

    pub fn clear_requested(&self) -> bool { self.read(TelemetryStore::clear_requested) }
}

impl<M: RawMutex> Default for SharedTelemetry<M> {
    fn default() -> Self { Self::new() }
}
