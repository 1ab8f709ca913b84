//! Timing constants for the simulator.
//!
//! These constants use `std::time::Duration` which is not available in `no_std`
//! environments, so they are defined here rather than in the common crate.

use std::time::Duration;

use obdeck_common::config::link::RENDER_PERIOD_MS;

/// Event-loop tick. The window is polled for key presses at this rate.
pub const FRAME_TIME: Duration = Duration::from_millis(20);

/// Redraw cadence, same as the firmware.
pub const RENDER_PERIOD: Duration = Duration::from_millis(RENDER_PERIOD_MS);

/// Simulated adapter turnaround per request.
pub const ADAPTER_LATENCY: Duration = Duration::from_millis(30);
