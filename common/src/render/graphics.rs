//! [`DrawPrimitives`] over any embedded-graphics `DrawTarget`.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, StrokeAlignment};
use embedded_graphics::text::{Baseline, Text};

use super::canvas::{DrawPrimitives, TextSize};

/// Draws straight into `T`. Draw errors are dropped: the panel driver and
/// the simulator window never report one.
pub struct GraphicsCanvas<T> {
    target: T,
}

impl<T: DrawTarget<Color = Rgb565>> GraphicsCanvas<T> {
    pub const fn new(target: T) -> Self { Self { target } }

    #[inline]
    pub const fn target(&self) -> &T { &self.target }

    #[inline]
    pub fn target_mut(&mut self) -> &mut T { &mut self.target }
}

impl<T: DrawTarget<Color = Rgb565>> DrawPrimitives for GraphicsCanvas<T> {
    fn fill_region(
        &mut self,
        area: Rectangle,
        color: Rgb565,
    ) {
        self.target.fill_solid(&area, color).ok();
    }

    fn draw_outline(
        &mut self,
        area: Rectangle,
        color: Rgb565,
    ) {
        let style = PrimitiveStyleBuilder::new()
            .stroke_color(color)
            .stroke_width(1)
            .stroke_alignment(StrokeAlignment::Inside)
            .build();
        area.into_styled(style).draw(&mut self.target).ok();
    }

    fn draw_line(
        &mut self,
        start: Point,
        end: Point,
        color: Rgb565,
    ) {
        Line::new(start, end)
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(&mut self.target)
            .ok();
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        color: Rgb565,
        size: TextSize,
    ) {
        Text::with_baseline(text, position, MonoTextStyle::new(size.font(), color), Baseline::Top)
            .draw(&mut self.target)
            .ok();
    }
}
