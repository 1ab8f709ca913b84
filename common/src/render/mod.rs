//! Display rendering.
//!
//! - `canvas`: the draw-primitive capability and text metrics
//! - `pacing`: striped fills and settle delays for the SPI panel
//! - `graphics`: embedded-graphics adapter
//! - `frame`: last-drawn state used for diffing
//! - `widgets`: screen regions
//! - `renderer`: per-frame full or partial redraw

mod canvas;
mod frame;
mod graphics;
mod pacing;
mod renderer;
mod widgets;

pub use canvas::{DrawPrimitives, TextSize, inset, rect};
pub use frame::{Field, FieldSet, FieldText, RenderFrameState, StatusBadge, StatusLevel};
pub use graphics::GraphicsCanvas;
pub use pacing::{PacedCanvas, PacingPolicy, Stripes};
pub use renderer::{FrameReport, Renderer};
