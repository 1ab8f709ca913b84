//! Blocking delay for the desktop threads.

use std::thread;
use std::time::Duration;

use embedded_hal_async::delay::DelayNs;

/// Sleeps the calling thread. Futures using it are driven by
/// `embassy_futures::block_on`, so blocking is fine.
#[derive(Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    async fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    async fn delay_ms(
        &mut self,
        ms: u32,
    ) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
