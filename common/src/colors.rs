//! Color constants for the obdeck screens.
//!
//! Standard colors come from the `RgbColor` trait constants so the values are
//! the exact RGB565 extremes; the remaining shades are tuned for a 2.8" IPS
//! panel viewed in a dark cabin.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors
// =============================================================================

/// Screen background.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Primary text.
pub const WHITE: Rgb565 = Rgb565::WHITE;

/// Disconnected status and Critical severity.
pub const RED: Rgb565 = Rgb565::RED;

/// Healthy connection status.
pub const GREEN: Rgb565 = Rgb565::GREEN;

/// Highlight outline around the focused button.
pub const YELLOW: Rgb565 = Rgb565::YELLOW;

/// Metric values.
pub const CYAN: Rgb565 = Rgb565::CYAN;

// =============================================================================
// Custom Colors
// =============================================================================

/// Warning severity badge. RGB565: (31, 32, 0).
pub const ORANGE: Rgb565 = Rgb565::new(31, 32, 0);

/// Divider lines, labels and idle button borders. RGB565: (8, 16, 8).
pub const GRAY: Rgb565 = Rgb565::new(8, 16, 8);

/// Light gray for secondary text. RGB565: (20, 40, 20).
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(20, 40, 20);

/// Stripes of the connection-lost box. RGB565: (4, 8, 4).
pub const DARK_GRAY: Rgb565 = Rgb565::new(4, 8, 4);

/// Metric box and header background. RGB565: (2, 6, 6).
pub const PANEL: Rgb565 = Rgb565::new(2, 6, 6);

/// Action buttons and the active navigation tab. RGB565: (0, 12, 20).
pub const BUTTON: Rgb565 = Rgb565::new(0, 12, 20);

/// Info severity badge. RGB565: (0, 20, 10).
pub const DARK_TEAL: Rgb565 = Rgb565::new(0, 20, 10);
