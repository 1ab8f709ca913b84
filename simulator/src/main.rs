//! obdeck desktop simulator.
//!
//! Runs the same worker, store, dispatcher and renderer as the firmware,
//! against an emulated ELM327 adapter, in an embedded-graphics-simulator
//! window.
//!
//! # Keys
//!
//! - **Left / Right**: highlight previous / next button
//! - **Enter / Space**: press the highlighted button
//! - **D**: unplug / replug the adapter
//! - **F**: adapter answers sensor requests with `?`
//! - **C**: restore the stored trouble codes

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod delay;
mod emulator;
mod timing;

use std::thread;
use std::time::Instant;

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use heapless::Vec;
use obdeck_common::colors::BLACK;
use obdeck_common::config::{SCREEN_HEIGHT, SCREEN_WIDTH, WorkerConfig};
use obdeck_common::render::{GraphicsCanvas, PacedCanvas, PacingPolicy, Renderer};
use obdeck_common::{InputDispatcher, InputEvent, SharedTelemetry, TelemetryWorker, log_error, log_info};

use crate::delay::StdDelay;
use crate::emulator::{Controls, Elm327Emulator};
use crate::timing::{FRAME_TIME, RENDER_PERIOD};

static STORE: SharedTelemetry<CriticalSectionRawMutex> = SharedTelemetry::new();

/// Presses handled per window tick.
const MAX_PRESSES: usize = 8;

/// Keyboard stand-ins for the three firmware buttons.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Press {
    Previous,
    Next,
    Select,
}

fn spawn_worker(controls: Controls) -> std::io::Result<()> {
    let emulator = Elm327Emulator::new(controls);
    thread::Builder::new().name("telemetry".into()).spawn(move || {
        let worker = TelemetryWorker::new(&STORE, emulator, StdDelay, WorkerConfig::DEFAULT);
        let err = block_on(worker.run());
        log_error!("Telemetry stopped: {}", err);
    })?;
    Ok(())
}

fn main() {
    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("obdeck simulator", &output_settings);

    display.clear(BLACK).ok();
    window.update(&display);

    let controls = Controls::default();
    if let Err(err) = spawn_worker(controls.clone()) {
        eprintln!("failed to start telemetry thread: {err}");
        return;
    }

    let mut canvas = PacedCanvas::new(GraphicsCanvas::new(display), StdDelay, PacingPolicy::DEFAULT);
    let mut renderer = Renderer::new();
    let mut dispatcher = InputDispatcher::new();
    let mut last_render: Option<Instant> = None;

    log_info!("Simulator started");

    loop {
        let frame_start = Instant::now();

        let mut presses: Vec<Press, MAX_PRESSES> = Vec::new();
        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => return,
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    if repeat {
                        continue;
                    }
                    let press = match keycode {
                        Keycode::Left => Some(Press::Previous),
                        Keycode::Right => Some(Press::Next),
                        Keycode::Return | Keycode::Space => Some(Press::Select),
                        Keycode::D => {
                            let down = controls.toggle_link();
                            log_info!("Adapter {}", if down { "unplugged" } else { "plugged in" });
                            None
                        }
                        Keycode::F => {
                            let garbled = controls.toggle_garbled();
                            log_info!("Garbled answers {}", if garbled { "on" } else { "off" });
                            None
                        }
                        Keycode::C => {
                            controls.restock_codes();
                            log_info!("Trouble codes restored");
                            None
                        }
                        _ => None,
                    };
                    if let Some(press) = press {
                        presses.push(press).ok();
                    }
                }
                _ => {}
            }
        }

        let due = last_render.is_none_or(|at| at.elapsed() >= RENDER_PERIOD);
        if due || !presses.is_empty() {
            let dtc_count = STORE.read(|s| s.dtcs.len());
            dispatcher.sync(dtc_count);
            for press in presses {
                let event = match press {
                    Press::Previous => InputEvent::NavigatePrevious,
                    Press::Next => InputEvent::NavigateNext,
                    Press::Select => InputEvent::Activate(dispatcher.view().highlighted),
                };
                dispatcher.handle(event, dtc_count, &STORE);
            }

            let snapshot = STORE.snapshot();
            block_on(renderer.render(&mut canvas, &snapshot, &dispatcher.view()));
            window.update(canvas.canvas().target());
            last_render = Some(Instant::now());
        }

        if let Some(remaining) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}
