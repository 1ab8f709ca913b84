//! Draw-primitive capability consumed by the renderer.
//!
//! Implementations draw immediately and cannot fail. Settle delays are not
//! their concern; every fill reaches them through
//! [`PacedCanvas`](super::pacing::PacedCanvas).

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use profont::{PROFONT_14_POINT, PROFONT_24_POINT};

/// Font size classes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TextSize {
    /// 6x10 mono.
    Small,
    /// ProFont 14 pt.
    Medium,
    /// ProFont 24 pt.
    Large,
}

impl TextSize {
    pub const fn font(self) -> &'static MonoFont<'static> {
        match self {
            Self::Small => &FONT_6X10,
            Self::Medium => &PROFONT_14_POINT,
            Self::Large => &PROFONT_24_POINT,
        }
    }

    /// Horizontal advance per character.
    pub const fn char_width(self) -> u32 {
        let font = self.font();
        font.character_size.width + font.character_spacing
    }

    /// Glyph cell height.
    pub const fn line_height(self) -> u32 { self.font().character_size.height }

    /// Width of `text` when drawn at this size.
    pub fn text_width(
        self,
        text: &str,
    ) -> u32 {
        text.chars().count() as u32 * self.char_width()
    }
}

/// Immediate-mode drawing surface.
pub trait DrawPrimitives {
    /// Fill `area` with `color`.
    fn fill_region(
        &mut self,
        area: Rectangle,
        color: Rgb565,
    );

    /// One-pixel border along the inside edge of `area`.
    fn draw_outline(
        &mut self,
        area: Rectangle,
        color: Rgb565,
    );

    fn draw_line(
        &mut self,
        start: Point,
        end: Point,
        color: Rgb565,
    );

    /// Text with its top-left corner at `position`, transparent background.
    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        color: Rgb565,
        size: TextSize,
    );
}

/// Shorthand for a rectangle from coordinates.
#[inline]
pub const fn rect(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(width, height))
}

/// `area` shrunk by `by` pixels on every side.
pub const fn inset(
    area: Rectangle,
    by: u32,
) -> Rectangle {
    let width = area.size.width.saturating_sub(2 * by);
    let height = area.size.height.saturating_sub(2 * by);
    rect(area.top_left.x + by as i32, area.top_left.y + by as i32, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(TextSize::Small.text_width("P0133"), 30);
        assert_eq!(TextSize::Large.text_width(""), 0);
    }

    #[test]
    fn test_inset() {
        assert_eq!(inset(rect(10, 20, 100, 40), 2), rect(12, 22, 96, 36));
        assert_eq!(inset(rect(0, 0, 3, 3), 2), rect(2, 2, 0, 0));
    }
}
