//! Display pacing policy.
//!
//! The panel corrupts its frame memory when large fills arrive back to back,
//! so every fill is paced:
//!
//! - a fill above [`PacingPolicy::stripe_threshold_px`] is split into
//!   horizontal stripes, each followed by `stripe_settle_ms`;
//! - a smaller fill is issued whole and followed by `fill_settle_ms`;
//! - outlines, lines and text pass through with no delay.
//!
//! [`PacedCanvas`] is the only path from the renderer to
//! [`DrawPrimitives::fill_region`], so the rules hold on every target.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_async::delay::DelayNs;

use super::canvas::{DrawPrimitives, TextSize, rect};

/// Pacing thresholds and delays.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PacingPolicy {
    /// Fills covering more pixels than this are striped.
    pub stripe_threshold_px: u32,
    /// Preferred stripe height in rows.
    pub stripe_height: u32,
    /// Delay after each stripe.
    pub stripe_settle_ms: u32,
    /// Delay after a single unstriped fill.
    pub fill_settle_ms: u32,
}

impl PacingPolicy {
    pub const DEFAULT: Self = Self {
        stripe_threshold_px: 10_000,
        stripe_height: 10,
        stripe_settle_ms: 10,
        fill_settle_ms: 20,
    };

    #[inline]
    pub const fn area_px(area: &Rectangle) -> u32 { area.size.width.saturating_mul(area.size.height) }

    #[inline]
    pub const fn needs_stripes(
        &self,
        area: &Rectangle,
    ) -> bool {
        Self::area_px(area) > self.stripe_threshold_px
    }

    /// Rows per stripe for a fill `width` pixels wide. Never zero, and a
    /// stripe never exceeds the threshold itself unless it is one row.
    pub const fn stripe_rows(
        &self,
        width: u32,
    ) -> u32 {
        let width = if width == 0 { 1 } else { width };
        let by_threshold = self.stripe_threshold_px / width;
        let rows = if by_threshold < self.stripe_height { by_threshold } else { self.stripe_height };
        if rows == 0 { 1 } else { rows }
    }

    /// Stripes covering `area` top to bottom.
    pub const fn stripes(
        &self,
        area: Rectangle,
    ) -> Stripes {
        Stripes {
            area,
            rows: self.stripe_rows(area.size.width),
            offset: 0,
        }
    }
}

impl Default for PacingPolicy {
    fn default() -> Self { Self::DEFAULT }
}

/// Iterator over the stripes of one fill.
#[derive(Clone, Debug)]
pub struct Stripes {
    area: Rectangle,
    rows: u32,
    offset: u32,
}

impl Iterator for Stripes {
    type Item = Rectangle;

    fn next(&mut self) -> Option<Rectangle> {
        if self.offset >= self.area.size.height {
            return None;
        }
        let height = self.rows.min(self.area.size.height - self.offset);
        let stripe = rect(
            self.area.top_left.x,
            self.area.top_left.y + self.offset as i32,
            self.area.size.width,
            height,
        );
        self.offset += height;
        Some(stripe)
    }
}

/// A draw surface with the pacing rules applied.
pub struct PacedCanvas<C, D> {
    canvas: C,
    delay: D,
    policy: PacingPolicy,
}

impl<C: DrawPrimitives, D: DelayNs> PacedCanvas<C, D> {
    pub const fn new(
        canvas: C,
        delay: D,
        policy: PacingPolicy,
    ) -> Self {
        Self {
            canvas,
            delay,
            policy,
        }
    }

    /// Fill `area`, striped and settled per the policy.
    pub async fn fill(
        &mut self,
        area: Rectangle,
        color: Rgb565,
    ) {
        if PacingPolicy::area_px(&area) == 0 {
            return;
        }
        if self.policy.needs_stripes(&area) {
            for stripe in self.policy.stripes(area) {
                self.canvas.fill_region(stripe, color);
                self.delay.delay_ms(self.policy.stripe_settle_ms).await;
            }
        } else {
            self.canvas.fill_region(area, color);
            self.delay.delay_ms(self.policy.fill_settle_ms).await;
        }
    }

    #[inline]
    pub fn outline(
        &mut self,
        area: Rectangle,
        color: Rgb565,
    ) {
        self.canvas.draw_outline(area, color);
    }

    #[inline]
    pub fn line(
        &mut self,
        start: Point,
        end: Point,
        color: Rgb565,
    ) {
        self.canvas.draw_line(start, end, color);
    }

    #[inline]
    pub fn text(
        &mut self,
        text: &str,
        position: Point,
        color: Rgb565,
        size: TextSize,
    ) {
        self.canvas.draw_text(text, position, color, size);
    }

    #[inline]
    pub const fn policy(&self) -> &PacingPolicy { &self.policy }

    #[inline]
    pub const fn canvas(&self) -> &C { &self.canvas }

    #[inline]
    pub fn canvas_mut(&mut self) -> &mut C { &mut self.canvas }
}
