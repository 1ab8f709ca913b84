//! Emulated ELM327 adapter attached to a synthetic vehicle.
//!
//! The vehicle idles, revs up and cruises on slow sine waves, warms its
//! coolant from cold and carries a handful of stored trouble codes. Keyboard
//! controls in the window flip the [`Controls`] flags to exercise the
//! reconnect and failure paths.

use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use obdeck_common::protocol::Pid;
use obdeck_common::transport::{ObdTransport, PROMPT, Response, TransportError, accept_byte};

use crate::timing::ADAPTER_LATENCY;

/// Codes stored at power-up (and after a restock).
const INITIAL_CODES: [u16; 5] = [0x0171, 0x0300, 0x0133, 0x0420, 0x0401];

/// VIN reported by mode 09 PID 02.
const VIN: &str = "WVWZZZAUZHW123456";

/// Shared switches between the window and the emulator.
#[derive(Clone, Default)]
pub struct Controls {
    link_down: Arc<AtomicBool>,
    garbled: Arc<AtomicBool>,
    restock: Arc<AtomicBool>,
}

impl Controls {
    /// Unplug or replug the adapter. Returns the new "down" state.
    pub fn toggle_link(&self) -> bool { !self.link_down.fetch_xor(true, Ordering::Relaxed) }

    /// Start or stop answering sensor requests with `?`.
    pub fn toggle_garbled(&self) -> bool { !self.garbled.fetch_xor(true, Ordering::Relaxed) }

    /// Put the initial trouble codes back on the next request.
    pub fn restock_codes(&self) { self.restock.store(true, Ordering::Relaxed); }

    fn link_down(&self) -> bool { self.link_down.load(Ordering::Relaxed) }

    fn garbled(&self) -> bool { self.garbled.load(Ordering::Relaxed) }

    fn take_restock(&self) -> bool { self.restock.swap(false, Ordering::Relaxed) }
}

/// Sensor values of the synthetic vehicle at one instant.
#[derive(Clone, Copy, Debug)]
struct VehicleSample {
    rpm: f32,
    speed: f32,
    coolant: f32,
    intake: f32,
    throttle: f32,
    battery: f32,
}

impl VehicleSample {
    fn at(t: f32) -> Self {
        let load = 0.5 + 0.5 * (t * 0.4).sin();
        Self {
            rpm: 800.0 + 2600.0 * load,
            speed: 110.0 * load,
            coolant: (20.0 + t * 1.5).min(88.0) + 2.0 * (t * 0.05).sin(),
            intake: 24.0 + 6.0 * (t * 0.1).sin(),
            throttle: 8.0 + 60.0 * load,
            battery: 14.1 + 0.3 * (t * 0.2).sin(),
        }
    }

    /// Mode 01 data bytes for `pid`.
    fn encode(
        self,
        pid: u8,
    ) -> Option<Vec<u8>> {
        let pid = Pid::ROTATION.into_iter().find(|p| p.code() == pid)?;
        let bytes = match pid {
            Pid::CoolantTemp => vec![(self.coolant + 40.0).clamp(0.0, 255.0) as u8],
            Pid::IntakeTemp => vec![(self.intake + 40.0).clamp(0.0, 255.0) as u8],
            Pid::Speed => vec![self.speed.clamp(0.0, 255.0) as u8],
            Pid::Throttle => vec![(self.throttle * 255.0 / 100.0).clamp(0.0, 255.0) as u8],
            Pid::Rpm => ((self.rpm * 4.0) as u16).to_be_bytes().to_vec(),
            Pid::BatteryVoltage => ((self.battery * 1000.0) as u16).to_be_bytes().to_vec(),
        };
        Some(bytes)
    }
}

pub struct Elm327Emulator {
    controls: Controls,
    started: Instant,
    open: bool,
    stored_codes: Vec<u16>,
    pending: Option<String>,
}

impl Elm327Emulator {
    pub fn new(controls: Controls) -> Self {
        Self {
            controls,
            started: Instant::now(),
            open: false,
            stored_codes: INITIAL_CODES.to_vec(),
            pending: None,
        }
    }

    fn hex_line(
        prefix: &str,
        bytes: &[u8],
    ) -> String {
        let mut line = prefix.to_string();
        for b in bytes {
            let _ = write!(line, " {b:02X}");
        }
        line
    }

    /// Mode 03 answer: three codes per `43` line, zero-padded.
    fn stored_codes_answer(&self) -> String {
        if self.stored_codes.is_empty() {
            return "NO DATA".to_string();
        }
        let mut lines = Vec::new();
        for chunk in self.stored_codes.chunks(3) {
            let mut bytes: Vec<u8> = chunk.iter().flat_map(|c| c.to_be_bytes()).collect();
            bytes.resize(6, 0);
            lines.push(Self::hex_line("43", &bytes));
        }
        lines.join("\r")
    }

    fn answer(
        &mut self,
        command: &str,
    ) -> String {
        if self.controls.take_restock() {
            self.stored_codes = INITIAL_CODES.to_vec();
        }
        match command {
            "ATZ" => "ELM327 v1.5".to_string(),
            c if c.starts_with("AT") => "OK".to_string(),
            "0100" => "SEARCHING...\r41 00 BE 3E B8 11".to_string(),
            "03" => self.stored_codes_answer(),
            "04" => {
                self.stored_codes.clear();
                "44".to_string()
            }
            "0902" => Self::hex_line("49 02 01", VIN.as_bytes()),
            c if c.len() == 4 && c.starts_with("01") => {
                if self.controls.garbled() {
                    return "?".to_string();
                }
                let sample = VehicleSample::at(self.started.elapsed().as_secs_f32());
                u8::from_str_radix(&c[2..], 16)
                    .ok()
                    .and_then(|pid| Some((pid, sample.encode(pid)?)))
                    .map_or_else(|| "NO DATA".to_string(), |(pid, data)| {
                        Self::hex_line(&format!("41 {pid:02X}"), &data)
                    })
            }
            _ => "?".to_string(),
        }
    }
}

impl ObdTransport for Elm327Emulator {
    async fn open(&mut self) -> Result<(), TransportError> {
        if self.controls.link_down() {
            return Err(TransportError::Open);
        }
        self.open = true;
        self.pending = None;
        Ok(())
    }

    async fn close(&mut self) {
        self.open = false;
        self.pending = None;
    }

    async fn send(
        &mut self,
        command: &str,
    ) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        self.pending = Some(command.to_string());
        Ok(())
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
        let Some(command) = self.pending.take() else {
            thread::sleep(Duration::from_millis(u64::from(timeout_ms)));
            return Err(TransportError::Timeout);
        };
        if self.controls.link_down() {
            thread::sleep(Duration::from_millis(u64::from(timeout_ms)));
            return Err(TransportError::Timeout);
        }

        thread::sleep(ADAPTER_LATENCY);
        let text = self.answer(&command);
        for byte in text.bytes().chain(*b"\r\r").chain([PROMPT]) {
            if accept_byte(response, terminator, byte) {
                return Ok(());
            }
        }
        Err(TransportError::Timeout)
    }
}
