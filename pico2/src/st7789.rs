//! ST7789 driver for embassy-rp that draws straight to panel RAM.
//!
//! There is no framebuffer: every fill or glyph opens an address window and
//! streams pixels over SPI. Large back-to-back fills can glitch on the PIM715,
//! which is why all fills from the renderer go through the pacing layer in
//! `obdeck_common::render`.
//!
//! # Transfers
//!
//! - `init()` uses async SPI writes with the datasheet delays.
//! - `DrawTarget` operations are synchronous and use `blocking_write`, with
//!   fills streamed from a small repeated-pixel chunk.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Spi};
use embassy_time::Timer;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Display dimensions (landscape mode after 90° rotation).
pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 240;

/// Pixels per SPI burst during fills.
const FILL_CHUNK_PIXELS: usize = 64;

// ST7789 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// MADCTL flags
const MADCTL_MX: u8 = 0x40; // Column address order
const MADCTL_MV: u8 = 0x20; // Row/column exchange

#[inline]
fn pixel_bytes(color: Rgb565) -> [u8; 2] {
    let raw: RawU16 = color.into();
    raw.into_inner().to_be_bytes()
}

pub struct St7789<'d> {
    spi: Spi<'d, SPI0, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
}

impl<'d> St7789<'d> {
    pub fn new(
        spi: Spi<'d, SPI0, Async>,
        dc: Output<'d>,
        cs: Output<'d>,
    ) -> Self {
        Self { spi, dc, cs }
    }

    /// Reset and configure the panel: RGB565, landscape, inverted, on.
    pub async fn init(&mut self) {
        self.command(SWRESET).await;
        Timer::after_millis(150).await;

        self.command(SLPOUT).await;
        Timer::after_millis(10).await;

        self.command(COLMOD).await;
        self.data(&[0x55]).await;

        // MV=1 (row/col exchange), MX=1 (mirror X) = 0x60
        self.command(MADCTL).await;
        self.data(&[MADCTL_MV | MADCTL_MX]).await;

        // Inversion on (required for PIM715)
        self.command(INVON).await;
        Timer::after_millis(10).await;

        self.command(NORON).await;
        Timer::after_millis(10).await;

        self.command(DISPON).await;
        Timer::after_millis(10).await;
    }

    async fn command(
        &mut self,
        cmd: u8,
    ) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.write(&[cmd]).await.ok();
        self.cs.set_high();
    }

    async fn data(
        &mut self,
        data: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_high();
        self.spi.write(data).await.ok();
        self.cs.set_high();
    }

    fn blocking_command(
        &mut self,
        cmd: u8,
        data: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.blocking_write(&[cmd]).ok();
        self.dc.set_high();
        self.spi.blocking_write(data).ok();
        self.cs.set_high();
    }

    /// Open an address window over `area` (already clipped) and leave the
    /// panel in RAMWR with CS low, ready for pixel data.
    fn begin_window(
        &mut self,
        area: &Rectangle,
    ) {
        let x0 = area.top_left.x as u16;
        let y0 = area.top_left.y as u16;
        let x1 = x0 + area.size.width as u16 - 1;
        let y1 = y0 + area.size.height as u16 - 1;
        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.blocking_command(CASET, &[x0h, x0l, x1h, x1l]);
        self.blocking_command(RASET, &[y0h, y0l, y1h, y1l]);

        self.cs.set_low();
        self.dc.set_low();
        self.spi.blocking_write(&[RAMWR]).ok();
        self.dc.set_high();
    }

    #[inline]
    fn end_window(&mut self) { self.cs.set_high(); }

    fn clip(
        &self,
        area: &Rectangle,
    ) -> Option<Rectangle> {
        let clipped = area.intersection(&self.bounding_box());
        (clipped.size.width > 0 && clipped.size.height > 0).then_some(clipped)
    }
}

impl OriginDimensions for St7789<'_> {
    fn size(&self) -> Size { Size::new(WIDTH, HEIGHT) }
}

impl DrawTarget for St7789<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    /// One window per pixel; only glyphs and outlines come through here.
    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let Some(area) = self.clip(&Rectangle::new(point, Size::new(1, 1))) else {
                continue;
            };
            self.begin_window(&area);
            self.spi.blocking_write(&pixel_bytes(color)).ok();
            self.end_window();
        }
        Ok(())
    }

    fn fill_contiguous<I>(
        &mut self,
        area: &Rectangle,
        colors: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Partially visible areas fall back to per-pixel drawing.
        if self.clip(area) != Some(*area) {
            return self.draw_iter(area.points().zip(colors).map(|(p, c)| Pixel(p, c)));
        }
        self.begin_window(area);
        for color in colors.into_iter().take(area.size.width as usize * area.size.height as usize) {
            self.spi.blocking_write(&pixel_bytes(color)).ok();
        }
        self.end_window();
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let Some(area) = self.clip(area) else {
            return Ok(());
        };
        let [hi, lo] = pixel_bytes(color);
        let mut chunk = [0u8; FILL_CHUNK_PIXELS * 2];
        for pair in chunk.chunks_exact_mut(2) {
            pair[0] = hi;
            pair[1] = lo;
        }

        self.begin_window(&area);
        let mut remaining = area.size.width as usize * area.size.height as usize;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK_PIXELS);
            self.spi.blocking_write(&chunk[..n * 2]).ok();
            remaining -= n;
        }
        self.end_window();
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.fill_solid(&self.bounding_box(), color)
    }
}
