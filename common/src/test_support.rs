//! Recording fakes for the transport, delay and draw collaborators.

use std::cell::RefCell;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_async::delay::DelayNs;

use crate::render::{DrawPrimitives, TextSize};
use crate::transport::{ObdTransport, Response, TransportError};

// =============================================================================
// Draw and delay recording
// =============================================================================

#[derive(Clone, PartialEq, Debug)]
pub enum Op {
    Fill(Rectangle, Rgb565),
    Outline(Rectangle, Rgb565),
    Line(Point, Point, Rgb565),
    Text(String, Point, Rgb565, TextSize),
    Delay(u32),
}

/// Ordered log shared by a [`RecordingCanvas`] and a [`RecordingDelay`].
#[derive(Clone, Default)]
pub struct OpLog(Rc<RefCell<Vec<Op>>>);

impl OpLog {
    pub fn new() -> Self { Self::default() }

    pub fn canvas(&self) -> RecordingCanvas { RecordingCanvas(self.clone()) }

    pub fn delay(&self) -> RecordingDelay { RecordingDelay(self.clone()) }

    pub fn push(
        &self,
        op: Op,
    ) {
        self.0.borrow_mut().push(op);
    }

    pub fn ops(&self) -> Vec<Op> { self.0.borrow().clone() }

    pub fn clear(&self) { self.0.borrow_mut().clear(); }

    /// All text drawn so far.
    pub fn texts(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|op| match op {
                Op::Text(text, ..) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Total recorded delay in milliseconds.
    pub fn delay_total_ms(&self) -> u32 {
        self.0
            .borrow()
            .iter()
            .map(|op| match op {
                Op::Delay(ms) => *ms,
                _ => 0,
            })
            .sum()
    }
}

pub struct RecordingCanvas(OpLog);

impl DrawPrimitives for RecordingCanvas {
    fn fill_region(
        &mut self,
        area: Rectangle,
        color: Rgb565,
    ) {
        self.0.push(Op::Fill(area, color));
    }

    fn draw_outline(
        &mut self,
        area: Rectangle,
        color: Rgb565,
    ) {
        self.0.push(Op::Outline(area, color));
    }

    fn draw_line(
        &mut self,
        start: Point,
        end: Point,
        color: Rgb565,
    ) {
        self.0.push(Op::Line(start, end, color));
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        color: Rgb565,
        size: TextSize,
    ) {
        self.0.push(Op::Text(text.to_string(), position, color, size));
    }
}

/// Records every delay in milliseconds and returns immediately.
pub struct RecordingDelay(OpLog);

impl DelayNs for RecordingDelay {
    async fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        self.0.push(Op::Delay(ns / 1_000_000));
    }

    async fn delay_us(
        &mut self,
        us: u32,
    ) {
        self.0.push(Op::Delay(us / 1_000));
    }

    async fn delay_ms(
        &mut self,
        ms: u32,
    ) {
        self.0.push(Op::Delay(ms));
    }
}

// =============================================================================
// Fake adapter
// =============================================================================

/// Behaviour and observations of a [`FakeAdapter`].
pub struct AdapterState {
    /// Every request, in order.
    pub sent: Vec<String>,
    pub opens: u32,
    pub closes: u32,
    pub open_fails: bool,
    /// Every request times out.
    pub link_down: bool,
    /// Requests answered with `?`.
    pub rejected: Vec<String>,
    /// Stored codes as mode 03 byte pairs.
    pub stored_codes: Vec<u16>,
    /// Mode 04 answers `44`.
    pub clear_acks: bool,
    /// Answers arrive but the `>` prompt never does.
    pub prompt_lost: bool,
    pending: Option<String>,
}

/// Scripted ELM327 that answers like a healthy car unless told otherwise.
#[derive(Clone)]
pub struct FakeAdapter(Rc<RefCell<AdapterState>>);

impl FakeAdapter {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(AdapterState {
            sent: Vec::new(),
            opens: 0,
            closes: 0,
            open_fails: false,
            link_down: false,
            rejected: Vec::new(),
            stored_codes: Vec::new(),
            clear_acks: true,
            prompt_lost: false,
            pending: None,
        })))
    }

    pub fn state(&self) -> std::cell::RefMut<'_, AdapterState> { self.0.borrow_mut() }

    pub fn sent(&self) -> Vec<String> { self.0.borrow().sent.clone() }

    fn answer(
        state: &AdapterState,
        command: &str,
    ) -> Option<String> {
        if state.link_down {
            return None;
        }
        if state.rejected.iter().any(|c| c == command) {
            return Some("?".to_string());
        }
        let text = match command {
            "ATZ" => "ELM327 v1.5".to_string(),
            c if c.starts_with("AT") => "OK".to_string(),
            "0100" => "41 00 BE 3E B8 11".to_string(),
            "0105" => "41 05 7B".to_string(),
            "010C" => "41 0C 1A F8".to_string(),
            "010D" => "41 0D 32".to_string(),
            "010F" => "41 0F 41".to_string(),
            "0111" => "41 11 33".to_string(),
            "0142" => "41 42 37 DC".to_string(),
            "03" if state.stored_codes.is_empty() => "NO DATA".to_string(),
            "03" => {
                let mut text = "43".to_string();
                for code in &state.stored_codes {
                    text.push_str(&std::format!(" {:02X} {:02X}", code >> 8, code & 0xFF));
                }
                text.push_str(" 00 00");
                text
            }
            "04" if state.clear_acks => "44".to_string(),
            "04" => "NO DATA".to_string(),
            "0902" => "49 02 01 57 50 30 5A 5A 5A 39 39 5A 54 53 33 39 32 31 32 34".to_string(),
            _ => "NO DATA".to_string(),
        };
        Some(text)
    }
}

impl ObdTransport for FakeAdapter {
    async fn open(&mut self) -> Result<(), TransportError> {
        let mut state = self.0.borrow_mut();
        state.opens += 1;
        if state.open_fails { Err(TransportError::Open) } else { Ok(()) }
    }

    async fn close(&mut self) { self.0.borrow_mut().closes += 1; }

    async fn send(
        &mut self,
        command: &str,
    ) -> Result<(), TransportError> {
        let mut state = self.0.borrow_mut();
        state.sent.push(command.to_string());
        state.pending = Some(command.to_string());
        Ok(())
    }

    async fn read_until(
        &mut self,
        _terminator: u8,
        _timeout_ms: u32,
        response: &mut Response,
    ) -> Result<(), TransportError> {
        response.clear();
        let mut state = self.0.borrow_mut();
        let command = state.pending.take().ok_or(TransportError::Timeout)?;
        let text = Self::answer(&state, &command).ok_or(TransportError::Timeout)?;
        *response = crate::text::truncated(&text);
        // Stored codes go away once the clear is acknowledged
        if command == "04" && state.clear_acks && !state.link_down {
            state.stored_codes.clear();
        }
        if state.prompt_lost {
            return Err(TransportError::Timeout);
        }
        Ok(())
    }
}
