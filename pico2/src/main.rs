//! obdeck firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Shows live OBD-II telemetry and stored trouble codes from an ELM327
//! adapter on the Pimoroni PIM715 Display Pack 2.8".
//!
//! # Architecture
//!
//! - `telemetry_task`: owns the UART adapter and runs the connect / poll /
//!   reconnect worker, writing into the shared store
//! - `input_task`: debounces the buttons and queues presses
//! - main task: applies presses to the view, then redraws whatever changed
//!   every 500 ms (or right after a press), with paced fills
//!
//! # Button Controls
//!
//! - **X**: Highlight previous button
//! - **Y**: Highlight next button
//! - **A**: Press the highlighted button

#![no_std]
#![no_main]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod button;
mod display;
mod elm327;
mod st7789;

use defmt::{debug, info};
use embassy_executor::Spawner;
use embassy_futures::select::select;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::Spi;
use embassy_rp::uart::{InterruptHandler as UartInterruptHandler, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Duration, Ticker, Timer};
use obdeck_common::config::WorkerConfig;
use obdeck_common::config::link::RENDER_PERIOD_MS;
use obdeck_common::render::{GraphicsCanvas, PacedCanvas, PacingPolicy, Renderer};
use obdeck_common::{InputDispatcher, SharedTelemetry, TelemetryWorker, log_error, log_info, log_warn};
use {defmt_rtt as _, panic_probe as _};

use crate::button::{ButtonState, Press};
use crate::display::{display_spi_config, elm327_uart_config};
use crate::elm327::Elm327Uart;
use crate::st7789::St7789;

bind_interrupts!(struct Irqs {
    UART0_IRQ => UartInterruptHandler<UART0>;
});

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"obdeck"),
    embassy_rp::binary_info::rp_program_description!(c"OBD-II telemetry and DTC viewer on PIM715 Display"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// Telemetry shared between the worker and the render loop.
static STORE: SharedTelemetry<CriticalSectionRawMutex> = SharedTelemetry::new();

/// Button presses waiting for the render loop.
static PRESSES: Channel<CriticalSectionRawMutex, Press, 8> = Channel::new();

/// Button poll period.
const BUTTON_POLL_MS: u64 = 10;

#[embassy_executor::task]
async fn telemetry_task(worker: TelemetryWorker<'static, CriticalSectionRawMutex, Elm327Uart<'static>, Delay>) {
    info!("Telemetry task started");
    let err = worker.run().await;
    log_error!("Telemetry stopped: {}", err);
}

#[embassy_executor::task]
async fn input_task(
    btn_x: Input<'static>,
    btn_y: Input<'static>,
    btn_a: Input<'static>,
) {
    let mut x = ButtonState::new();
    let mut y = ButtonState::new();
    let mut a = ButtonState::new();

    loop {
        let pressed = [
            (x.just_pressed(btn_x.is_low()), Press::Previous),
            (y.just_pressed(btn_y.is_low()), Press::Next),
            (a.just_pressed(btn_a.is_low()), Press::Select),
        ];
        for (_, press) in pressed.into_iter().filter(|(hit, _)| *hit) {
            if PRESSES.try_send(press).is_err() {
                log_warn!("Input queue full, press dropped");
            }
        }
        Timer::after_millis(BUTTON_POLL_MS).await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("obdeck starting...");

    // cpu250-spi62-1v10: 250 MHz @ 1.10V for 62.5 MHz SPI (250/4)
    #[cfg(feature = "cpu250-spi62-1v10")]
    let p = {
        use embassy_rp::clocks::{ClockConfig, CoreVoltage};
        use embassy_rp::config::Config;

        const FREQ_HZ: u32 = 250_000_000;

        let mut config = Config::default();
        config.clocks = ClockConfig::system_freq(FREQ_HZ).expect("Invalid overclock frequency");
        config.clocks.core_voltage = CoreVoltage::V1_10;
        info!("Overclock: 250 MHz @ 1.10V (SPI 62.5 MHz)");
        embassy_rp::init(config)
    };

    #[cfg(not(feature = "cpu250-spi62-1v10"))]
    let p = embassy_rp::init(Default::default());

    // PIM715 pinout: CS=17, DC=16, CLK=18, MOSI=19, Backlight=20
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let _backlight = Output::new(p.PIN_20, Level::High);
    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, display_spi_config());

    let mut display = St7789::new(spi, dc, cs);
    display.init().await;
    log_info!("Display initialized");

    let uart = Uart::new(p.UART0, p.PIN_0, p.PIN_1, Irqs, p.DMA_CH1, p.DMA_CH2, elm327_uart_config());
    let worker = TelemetryWorker::new(&STORE, Elm327Uart::new(uart), Delay, WorkerConfig::DEFAULT);
    spawner.spawn(telemetry_task(worker)).unwrap();

    // PIM715: A=12, X=14, Y=15 (active-low with internal pull-up)
    let btn_a = Input::new(p.PIN_12, Pull::Up);
    let btn_x = Input::new(p.PIN_14, Pull::Up);
    let btn_y = Input::new(p.PIN_15, Pull::Up);
    spawner.spawn(input_task(btn_x, btn_y, btn_a)).unwrap();

    let mut canvas = PacedCanvas::new(GraphicsCanvas::new(display), Delay, PacingPolicy::DEFAULT);
    let mut renderer = Renderer::new();
    let mut dispatcher = InputDispatcher::new();
    let mut ticker = Ticker::every(Duration::from_millis(RENDER_PERIOD_MS));

    log_info!("Render loop starting");

    loop {
        let dtc_count = STORE.read(|s| s.dtcs.len());
        dispatcher.sync(dtc_count);
        while let Ok(press) = PRESSES.try_receive() {
            let outcome = dispatcher.handle(press.event(dispatcher.view()), dtc_count, &STORE);
            debug!("{} -> {}", press, outcome);
        }

        let snapshot = STORE.snapshot();
        let report = renderer.render(&mut canvas, &snapshot, &dispatcher.view()).await;
        if report.full_redraw {
            debug!("Full redraw: {}", dispatcher.view().page);
        }

        select(ticker.next(), PRESSES.ready_to_receive()).await;
    }
}
