//! ELM327 adapter on UART0.

use embassy_rp::uart::{Async, Error as UartError, Uart};
use embassy_time::{Duration, Instant, with_deadline, with_timeout};
use obdeck_common::log_debug;
use obdeck_common::transport::{ObdTransport, Response, TransportError, accept_byte};

/// Quiet time that ends the stale-input drain before a request.
const DRAIN_QUIET_MS: u64 = 5;

/// Upper bound on bytes discarded per drain.
const DRAIN_MAX_BYTES: usize = 512;

pub struct Elm327Uart<'d> {
    uart: Uart<'d, Async>,
    open: bool,
}

impl<'d> Elm327Uart<'d> {
    pub const fn new(uart: Uart<'d, Async>) -> Self { Self { uart, open: false } }

    /// Read and discard whatever the adapter sent since the last response.
    async fn drain(&mut self) {
        let mut byte = [0u8; 1];
        for _ in 0..DRAIN_MAX_BYTES {
            match with_timeout(Duration::from_millis(DRAIN_QUIET_MS), self.uart.read(&mut byte)).await {
                Ok(_) => {}
                Err(_) => return,
            }
        }
    }
}

impl ObdTransport for Elm327Uart<'_> {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.drain().await;
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) { self.open = false; }

    async fn send(
        &mut self,
        command: &str,
    ) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        self.drain().await;
        self.uart.write(command.as_bytes()).await.map_err(|_| TransportError::Write)?;
        self.uart.write(b"\r").await.map_err(|_| TransportError::Write)
    }

    async fn read_until(
        &mut self,
        terminator: u8,
        timeout_ms: u32,
        response: &mut Response,
    ) -> Result<(), TransportError> {
        response.clear();
        if !self.open {
            return Err(TransportError::Closed);
        }
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
        let mut byte = [0u8; 1];
        loop {
            match with_deadline(deadline, self.uart.read(&mut byte)).await {
                Err(_) => return Err(TransportError::Timeout),
                Ok(Err(UartError::Break)) => return Err(TransportError::Closed),
                Ok(Err(_)) => log_debug!("UART rx error, byte dropped"),
                Ok(Ok(())) => {
                    if accept_byte(response, terminator, byte[0]) {
                        return Ok(());
                    }
                }
            }
        }
    }
}
