//! Telemetry worker: the connect / poll / reconnect state machine.
//!
//! ```text
//!  Disconnected ──start──> Connecting ──handshake ok──> Connected <──> Degraded(n)
//!       ^                      │                                         │
//!       └──── handshake fail ──┘<───────── n reaches threshold ──────────┘
//! ```
//!
//! - A cold-start failure is fatal: [`TelemetryWorker::run`] returns the error
//!   and the store shows "Connection failed".
//! - While connected, one PID of [`Pid::ROTATION`] is queried per cycle,
//!   followed by the queued DTC commands and the poll interval.
//! - Failed queries (timeout, write error, unparsable answer) count up;
//!   success resets the count. At the threshold the transport is closed and
//!   reopened, the worker sleeps the reconnect delay and repeats the
//!   handshake. A failed reconnect resets the count, sleeps the retry delay
//!   and leaves the worker disconnected; every later cycle tries again.
//!
//! The worker only touches the store through short [`SharedTelemetry`] calls,
//! never while a transport call or a sleep is pending.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::config::WorkerConfig;
use crate::dtc::DtcList;
use crate::error::LinkError;
use crate::protocol::{self, Pid, PidRotation, SensorReading, contains_token, has_adapter_error, parse_vin};
use crate::store::{DtcCommand, SharedTelemetry};
use crate::transport::{ObdTransport, PROMPT, Response, TransportError};
use crate::{log_debug, log_error, log_info, log_warn};

/// Link state as seen by the worker.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    /// Connected, with this many consecutive failed queries.
    Degraded { failures: u8 },
}

impl LinkState {
    /// Whether the store reports `connected=true` in this state.
    #[inline]
    pub const fn is_connected(self) -> bool { matches!(self, Self::Connected | Self::Degraded { .. }) }
}

pub struct TelemetryWorker<'a, M: RawMutex, T, D> {
    store: &'a SharedTelemetry<M>,
    transport: T,
    delay: D,
    config: WorkerConfig,
    state: LinkState,
    failures: u8,
    rotation: PidRotation,
    response: Response,
}

impl<'a, M, T, D> TelemetryWorker<'a, M, T, D>
where
    M: RawMutex,
    T: ObdTransport,
    D: DelayNs,
{
    pub fn new(
        store: &'a SharedTelemetry<M>,
        transport: T,
        delay: D,
        config: WorkerConfig,
    ) -> Self {
        Self {
            store,
            transport,
            delay,
            config,
            state: LinkState::Disconnected,
            failures: 0,
            rotation: PidRotation::new(),
            response: Response::new(),
        }
    }

    #[inline]
    pub const fn state(&self) -> LinkState { self.state }

    /// Consecutive failed queries.
    #[inline]
    pub const fn failures(&self) -> u8 { self.failures }

    #[inline]
    pub const fn config(&self) -> &WorkerConfig { &self.config }

    /// Connect, then poll forever. Returns only if the cold start fails.
    pub async fn run(mut self) -> LinkError {
        if let Err(err) = self.start().await {
            return err;
        }
        loop {
            self.cycle().await;
        }
    }

    /// Cold start: open, handshake, settle, then read DTCs and the VIN once.
    pub async fn start(&mut self) -> Result<(), LinkError> {
        self.state = LinkState::Connecting;
        log_info!("Connecting to OBD adapter");

        let connected = match self.transport.open().await {
            Ok(()) => self.handshake().await,
            Err(_) => Err(LinkError::TransportOpen),
        };
        if let Err(err) = connected {
            self.state = LinkState::Disconnected;
            self.store.mark_disconnected(err.user_message());
            log_error!("Adapter connection failed: {}", err);
            return Err(err);
        }

        self.enter_connected();
        self.delay.delay_ms(self.config.settle_ms).await;
        self.refresh_dtcs().await;
        self.query_vin().await;
        Ok(())
    }

    /// One iteration of the main loop.
    pub async fn cycle(&mut self) {
        if self.state == LinkState::Disconnected {
            self.retry_connect().await;
            return;
        }

        let pid = self.rotation.advance();
        match self.poll(pid).await {
            Ok(reading) => {
                self.store.apply_reading(reading);
                self.record_success();
            }
            Err(err) => {
                if self.record_failure(pid, err) {
                    self.drop_link().await;
                    return;
                }
            }
        }

        self.service_commands().await;
        self.delay.delay_ms(self.config.poll_interval_ms).await;
    }

    // =========================================================================
    // Link management
    // =========================================================================

    /// Send the handshake commands in order, stopping at the first failure.
    async fn handshake(&mut self) -> Result<(), LinkError> {
        let commands = self.config.handshake;
        for command in commands {
            self.exchange(command).await.map_err(|_| LinkError::Handshake)?;
            if has_adapter_error(&self.response) {
                log_warn!("Adapter rejected {}", *command);
                return Err(LinkError::Handshake);
            }
        }
        Ok(())
    }

    fn enter_connected(&mut self) {
        self.state = LinkState::Connected;
        self.failures = 0;
        self.store.mark_connected();
        log_info!("Adapter connected");
    }

    fn record_success(&mut self) {
        if self.failures > 0 {
            log_info!("Link recovered after {} failed queries", self.failures);
        }
        self.failures = 0;
        self.state = LinkState::Connected;
    }

    /// Count a failed query. Returns `true` when the threshold is reached.
    fn record_failure(
        &mut self,
        pid: Pid,
        err: LinkError,
    ) -> bool {
        self.failures = self.failures.saturating_add(1);
        log_warn!("Query {} failed: {} ({} in a row)", pid, err, self.failures);
        if self.failures >= self.config.failure_threshold {
            return true;
        }
        self.state = LinkState::Degraded {
            failures: self.failures,
        };
        false
    }

    /// Threshold reached: tear down, reopen, wait, then try the handshake.
    async fn drop_link(&mut self) {
        let err = LinkError::ThresholdExceeded;
        log_error!("Link lost: {}", err);
        self.state = LinkState::Disconnected;
        self.store.mark_disconnected(err.user_message());

        self.transport.close().await;
        let reopened = self.transport.open().await;
        self.delay.delay_ms(self.config.retry.reconnect_delay_ms).await;
        self.failures = 0;

        match reopened {
            Ok(()) => self.reconnect().await,
            Err(_) => self.reconnect_failed(LinkError::TransportOpen).await,
        }
    }

    /// Later cycles while disconnected: reopen and handshake again.
    async fn retry_connect(&mut self) {
        self.transport.close().await;
        match self.transport.open().await {
            Ok(()) => self.reconnect().await,
            Err(_) => self.reconnect_failed(LinkError::TransportOpen).await,
        }
    }

    async fn reconnect(&mut self) {
        self.state = LinkState::Connecting;
        log_info!("Reconnecting to adapter");
        match self.handshake().await {
            Ok(()) => self.enter_connected(),
            Err(err) => self.reconnect_failed(err).await,
        }
    }

    async fn reconnect_failed(
        &mut self,
        err: LinkError,
    ) {
        self.state = LinkState::Disconnected;
        self.failures = 0;
        log_warn!("Reconnect failed: {}, retry in {} ms", err, self.config.retry.retry_delay_ms);
        self.delay.delay_ms(self.config.retry.retry_delay_ms).await;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Send `command` and wait for the prompt. The answer is left in
    /// `self.response`.
    async fn exchange(
        &mut self,
        command: &str,
    ) -> Result<(), LinkError> {
        self.transport.send(command).await?;
        self.transport
            .read_until(PROMPT, self.config.response_timeout_ms, &mut self.response)
            .await?;
        Ok(())
    }

    /// Like [`Self::exchange`], but an answer whose prompt never arrived is
    /// still handed to the parser. Only a timeout with nothing received is
    /// an error.
    async fn query(
        &mut self,
        command: &str,
    ) -> Result<(), LinkError> {
        self.transport.send(command).await?;
        match self
            .transport
            .read_until(PROMPT, self.config.response_timeout_ms, &mut self.response)
            .await
        {
            Ok(()) => Ok(()),
            Err(TransportError::Timeout) if !self.response.trim().is_empty() => {
                log_debug!("No prompt after {}, parsing partial answer", command);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn poll(
        &mut self,
        pid: Pid,
    ) -> Result<SensorReading, LinkError> {
        self.query(&pid.command()).await?;
        pid.decode(&self.response).ok_or(LinkError::Parse)
    }

    /// Read stored codes (mode 03) into the store, most severe first.
    async fn refresh_dtcs(&mut self) -> bool {
        if let Err(err) = self.query(protocol::READ_DTCS).await {
            log_warn!("DTC query failed: {}", err);
            return false;
        }
        match DtcList::parse_response(&self.response) {
            Ok(mut list) => {
                list.sort_by_severity();
                log_info!("{} DTC(s) stored", list.len());
                self.store.replace_dtcs(list);
                true
            }
            Err(_) => {
                log_warn!("Unreadable DTC response");
                false
            }
        }
    }

    /// Clear codes (mode 04). On acknowledgement the local list is emptied
    /// at once and then re-read from the vehicle.
    async fn clear_dtcs(&mut self) -> bool {
        if let Err(err) = self.query(protocol::CLEAR_DTCS).await {
            log_warn!("DTC clear failed: {}", err);
            return false;
        }
        if !contains_token(&self.response, protocol::CLEAR_ACK) {
            log_warn!("DTC clear not acknowledged");
            return false;
        }
        self.store.clear_dtcs();
        log_info!("DTCs cleared, re-reading");
        self.refresh_dtcs().await;
        true
    }

    async fn query_vin(&mut self) {
        if let Err(err) = self.query(protocol::READ_VIN).await {
            log_warn!("VIN query failed: {}", err);
            return;
        }
        match parse_vin(&self.response) {
            Some(vin) => {
                log_info!("VIN {}", vin.as_str());
                self.store.set_vin(vin);
            }
            None => log_warn!("VIN not reported"),
        }
    }

    /// Service queued DTC commands in arrival order.
    async fn service_commands(&mut self) {
        while let Some(command) = self.store.begin_command() {
            let succeeded = match command {
                DtcCommand::Refresh => self.refresh_dtcs().await,
                DtcCommand::Clear => self.clear_dtcs().await,
            };
            let ack = self.store.complete_command(command, succeeded);
            log_info!("DTC {} #{} done, ok={}", command.name(), ack.sequence, succeeded);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    use super::*;
    use crate::test_support::{FakeAdapter, Op, OpLog, RecordingDelay};

    type Store = SharedTelemetry<CriticalSectionRawMutex>;
    type Worker<'a> = TelemetryWorker<'a, CriticalSectionRawMutex, FakeAdapter, RecordingDelay>;

    fn worker<'a>(
        store: &'a Store,
        adapter: &FakeAdapter,
        log: &OpLog,
    ) -> Worker<'a> {
        TelemetryWorker::new(store, adapter.clone(), log.delay(), WorkerConfig::DEFAULT)
    }

    fn delays(log: &OpLog) -> std::vec::Vec<u32> {
        log.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Delay(ms) => Some(ms),
                _ => None,
            })
            .collect()
    }

    const POLL_COMMANDS: [&str; 6] = ["0105", "010C", "010D", "0111", "010F", "0142"];

    #[test]
    fn test_cold_start_success() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);

        assert_eq!(block_on(w.start()), Ok(()));
        assert_eq!(w.state(), LinkState::Connected);
        assert_eq!(adapter.sent(), ["ATZ", "ATE0", "ATL0", "ATS1", "ATSP0", "0100", "03", "0902"]);
        assert_eq!(delays(&log), [3000]);

        let snap = store.snapshot();
        assert!(snap.telemetry.connected);
        assert!(snap.dtcs_read);
        assert_eq!(snap.vin.as_deref(), Some("WP0ZZZ99ZTS392124"));
    }

    #[test]
    fn test_cold_start_open_failure_is_fatal() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        adapter.state().open_fails = true;
        let log = OpLog::new();

        let err = block_on(worker(&store, &adapter, &log).run());
        assert_eq!(err, LinkError::TransportOpen);
        let snap = store.snapshot();
        assert!(!snap.telemetry.connected);
        assert_eq!(snap.telemetry.last_error.as_str(), "Connection failed");
        assert!(adapter.sent().is_empty());
    }

    #[test]
    fn test_handshake_stops_at_rejection() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        adapter.state().rejected.push("ATSP0".into());
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);

        assert_eq!(block_on(w.start()), Err(LinkError::Handshake));
        assert_eq!(adapter.sent(), ["ATZ", "ATE0", "ATL0", "ATS1", "ATSP0"]);
        assert_eq!(w.state(), LinkState::Disconnected);
    }

    #[test]
    fn test_poll_rotation_and_decoding() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();
        adapter.state().sent.clear();
        log.clear();

        for _ in 0..6 {
            block_on(w.cycle());
        }
        assert_eq!(adapter.sent(), POLL_COMMANDS);
        assert_eq!(delays(&log), [200; 6]);

        let t = store.snapshot().telemetry;
        assert_eq!(t.coolant_temp, 83.0);
        assert_eq!(t.rpm, 1726);
        assert_eq!(t.speed, 50);
        assert_eq!(t.throttle_pct, 20.0);
        assert_eq!(t.intake_temp, 25.0);
        assert_eq!(t.battery_voltage, 14.3);
    }

    #[test]
    fn test_answer_without_prompt_is_parsed() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();

        adapter.state().link_down = true;
        block_on(w.cycle());
        assert_eq!(w.failures(), 1);

        {
            let mut state = adapter.state();
            state.link_down = false;
            state.prompt_lost = true;
            state.stored_codes = vec![0x0133];
        }
        block_on(w.cycle());
        assert_eq!(w.failures(), 0);
        assert_eq!(w.state(), LinkState::Connected);
        assert_eq!(store.snapshot().telemetry.rpm, 1726);

        store.request(DtcCommand::Refresh).unwrap();
        block_on(w.cycle());
        assert_eq!(w.failures(), 0);
        assert_eq!(store.snapshot().dtcs.len(), 1);
    }

    #[test]
    fn test_unparsable_partial_answer_counts() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();

        adapter.state().rejected.push("0105".into());
        adapter.state().prompt_lost = true;
        block_on(w.cycle());
        assert_eq!(w.failures(), 1);
        assert_eq!(store.snapshot().telemetry.coolant_temp, 0.0);
    }

    #[test]
    fn test_two_failures_keep_connection() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();

        adapter.state().link_down = true;
        block_on(w.cycle());
        block_on(w.cycle());
        assert_eq!(w.state(), LinkState::Degraded { failures: 2 });
        assert!(store.snapshot().telemetry.connected);
    }

    #[test]
    fn test_success_resets_counter() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();

        adapter.state().link_down = true;
        block_on(w.cycle());
        block_on(w.cycle());
        adapter.state().link_down = false;
        block_on(w.cycle());
        assert_eq!(w.failures(), 0);
        assert_eq!(w.state(), LinkState::Connected);
        adapter.state().link_down = true;
        block_on(w.cycle());
        block_on(w.cycle());
        assert!(store.snapshot().telemetry.connected);
    }

    #[test]
    fn test_three_timeouts_drop_connection() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();
        log.clear();

        adapter.state().link_down = true;
        for _ in 0..3 {
            block_on(w.cycle());
        }

        let snap = store.snapshot();
        assert!(!snap.telemetry.connected);
        assert_eq!(snap.telemetry.last_error.as_str(), "Connection lost (timeout)");
        assert_eq!(w.state(), LinkState::Disconnected);
        assert_eq!(w.failures(), 0);
        // Two poll intervals, then reconnect delay and retry pause
        assert_eq!(delays(&log), [200, 200, 5000, 2000]);
        assert_eq!(adapter.state().closes, 1);
        assert_eq!(adapter.state().opens, 2);
    }

    #[test]
    fn test_parse_failures_count_and_reconnect_succeeds() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();
        log.clear();

        adapter.state().rejected = POLL_COMMANDS.iter().map(|c| (*c).into()).collect();
        for _ in 0..3 {
            block_on(w.cycle());
        }

        // Handshake still works, so the link comes straight back
        assert_eq!(w.state(), LinkState::Connected);
        let snap = store.snapshot();
        assert!(snap.telemetry.connected);
        assert!(snap.telemetry.last_error.is_empty());
        assert_eq!(delays(&log), [200, 200, 5000]);
    }

    #[test]
    fn test_retry_while_disconnected() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();

        adapter.state().link_down = true;
        for _ in 0..3 {
            block_on(w.cycle());
        }
        log.clear();

        // Still down: one handshake attempt per cycle, 2 s apart
        block_on(w.cycle());
        assert_eq!(w.state(), LinkState::Disconnected);
        assert_eq!(delays(&log), [2000]);

        adapter.state().link_down = false;
        adapter.state().sent.clear();
        block_on(w.cycle());
        assert_eq!(w.state(), LinkState::Connected);
        assert!(store.snapshot().telemetry.connected);
        assert_eq!(adapter.sent().first().map(std::string::String::as_str), Some("ATZ"));
    }

    #[test]
    fn test_dtcs_sorted_on_start() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        adapter.state().stored_codes = std::vec![0x0401, 0x0300, 0x0101];
        let log = OpLog::new();
        block_on(worker(&store, &adapter, &log).start()).unwrap();

        let codes: std::vec::Vec<std::string::String> =
            store.snapshot().dtcs.iter().map(|c| std::format!("{}", c.code)).collect();
        assert_eq!(codes, ["P0300", "P0401", "P0101"]);
    }

    #[test]
    fn test_commands_serviced_in_order() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        adapter.state().stored_codes = std::vec![0x0300, 0x0401];
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();
        adapter.state().sent.clear();

        store.request(DtcCommand::Refresh).unwrap();
        store.request(DtcCommand::Clear).unwrap();
        block_on(w.cycle());

        assert_eq!(adapter.sent(), ["0105", "03", "04", "03"]);
        let snap = store.snapshot();
        assert!(snap.dtcs.is_empty());
        assert!(!snap.refresh_requested());
        assert!(!snap.clear_requested());
        let ack = snap.commands.last_ack().unwrap();
        assert_eq!(ack.command, DtcCommand::Clear);
        assert!(ack.succeeded);
        assert_eq!(ack.sequence, 2);
    }

    #[test]
    fn test_clear_twice_is_idempotent() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        adapter.state().stored_codes = std::vec![0x0133];
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();
        assert_eq!(store.snapshot().dtcs.len(), 1);

        for _ in 0..2 {
            store.request(DtcCommand::Clear).unwrap();
            block_on(w.cycle());
            let snap = store.snapshot();
            assert_eq!(snap.dtcs.len(), 0);
            assert!(snap.commands.last_ack().unwrap().succeeded);
        }
    }

    #[test]
    fn test_unacknowledged_clear_keeps_codes() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        adapter.state().stored_codes = std::vec![0x0300];
        adapter.state().clear_acks = false;
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();

        store.request(DtcCommand::Clear).unwrap();
        block_on(w.cycle());
        let snap = store.snapshot();
        assert_eq!(snap.dtcs.len(), 1);
        assert!(!snap.commands.last_ack().unwrap().succeeded);
    }

    #[test]
    fn test_commands_wait_while_disconnected() {
        let store = Store::new();
        let adapter = FakeAdapter::new();
        let log = OpLog::new();
        let mut w = worker(&store, &adapter, &log);
        block_on(w.start()).unwrap();
        adapter.state().link_down = true;
        for _ in 0..3 {
            block_on(w.cycle());
        }

        store.request(DtcCommand::Refresh).unwrap();
        block_on(w.cycle());
        assert!(store.refresh_requested());
    }

    #[test]
    fn test_link_state_connected_flag() {
        assert!(LinkState::Connected.is_connected());
        assert!(LinkState::Degraded { failures: 2 }.is_connected());
        assert!(!LinkState::Connecting.is_connected());
        assert!(!LinkState::Disconnected.is_connected());
    }
}
