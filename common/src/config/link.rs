//! Diagnostic-link timing and worker configuration.
//!
//! The defaults reproduce the fixed delays of the ELM327 dashboards this
//! firmware replaces. They live in [`WorkerConfig`] so a board can tune them
//! without touching the state machine.

// =============================================================================
// Protocol Timing (milliseconds)
// =============================================================================

/// Pause between two sensor queries.
pub const POLL_INTERVAL_MS: u32 = 200;

/// Maximum wait for the adapter's `>` prompt.
pub const RESPONSE_TIMEOUT_MS: u32 = 2000;

/// Wait after the first successful handshake before the DTC and VIN queries.
pub const SETTLE_MS: u32 = 3000;

/// Wait after reopening the transport, before the reconnect handshake.
pub const RECONNECT_DELAY_MS: u32 = 5000;

/// Pause after a failed reconnect attempt.
pub const RETRY_DELAY_MS: u32 = 2000;

/// Consecutive query failures that drop the connection.
pub const FAILURE_THRESHOLD: u8 = 3;

/// Render loop period.
pub const RENDER_PERIOD_MS: u64 = 500;

/// Adapter initialisation sequence: reset, echo off, linefeeds off,
/// spaces on, automatic protocol, then a supported-PIDs probe that forces
/// the protocol search to finish.
pub const HANDSHAKE: &[&str] = &["ATZ", "ATE0", "ATL0", "ATS1", "ATSP0", "0100"];

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Delays applied when the link drops.
///
/// Both delays are fixed; there is no backoff.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RetryPolicy {
    /// Sleep between reopening the transport and the reconnect handshake.
    pub reconnect_delay_ms: u32,
    /// Sleep after a failed reconnect handshake.
    pub retry_delay_ms: u32,
}

impl RetryPolicy {
    pub const DEFAULT: Self = Self {
        reconnect_delay_ms: RECONNECT_DELAY_MS,
        retry_delay_ms: RETRY_DELAY_MS,
    };
}

impl Default for RetryPolicy {
    fn default() -> Self { Self::DEFAULT }
}

/// Everything the telemetry worker needs to know about timing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct WorkerConfig {
    pub poll_interval_ms: u32,
    pub response_timeout_ms: u32,
    pub settle_ms: u32,
    pub failure_threshold: u8,
    pub retry: RetryPolicy,
    pub handshake: &'static [&'static str],
}

impl WorkerConfig {
    pub const DEFAULT: Self = Self {
        poll_interval_ms: POLL_INTERVAL_MS,
        response_timeout_ms: RESPONSE_TIMEOUT_MS,
        settle_ms: SETTLE_MS,
        failure_threshold: FAILURE_THRESHOLD,
        retry: RetryPolicy::DEFAULT,
        handshake: HANDSHAKE,
    };
}

impl Default for WorkerConfig {
    fn default() -> Self { Self::DEFAULT }
}
