//! Display and layout configuration constants.
//!
//! Everything is `const` so widget code never recomputes geometry per frame.
//! The screen is split into a header bar, a content area and a bottom
//! navigation bar with one tab per page.

// =============================================================================
// Display Configuration
// =============================================================================

/// Display width in pixels (ST7789 on Pimoroni PIM715: 320x240, landscape).
pub const SCREEN_WIDTH: u32 = 320;

/// Display height in pixels.
pub const SCREEN_HEIGHT: u32 = 240;

// =============================================================================
// Screen Regions
// =============================================================================

/// Header bar height (page title, status dot, DTC count).
pub const HEADER_HEIGHT: u32 = 26;

/// Bottom navigation bar height.
pub const NAV_HEIGHT: u32 = 24;

/// Top of the content area.
pub const CONTENT_Y: i32 = HEADER_HEIGHT as i32;

/// Height of the content area between header and navigation bar.
pub const CONTENT_HEIGHT: u32 = SCREEN_HEIGHT - HEADER_HEIGHT - NAV_HEIGHT;

/// Top of the bottom navigation bar.
pub const NAV_Y: i32 = (SCREEN_HEIGHT - NAV_HEIGHT) as i32;

/// Width of one navigation tab (three pages).
pub const NAV_TAB_WIDTH: u32 = SCREEN_WIDTH / 3;

/// Generic spacing between boxes.
pub const MARGIN: u32 = 4;

// =============================================================================
// Dashboard Grid (2 columns x 3 rows)
// =============================================================================

/// Number of metric columns.
pub const METRIC_COLUMNS: u32 = 2;

/// Number of metric rows.
pub const METRIC_ROWS: u32 = 3;

/// Width of one metric box.
pub const METRIC_WIDTH: u32 = (SCREEN_WIDTH - (METRIC_COLUMNS + 1) * MARGIN) / METRIC_COLUMNS;

/// Height of one metric box.
pub const METRIC_HEIGHT: u32 = (CONTENT_HEIGHT - (METRIC_ROWS + 1) * MARGIN) / METRIC_ROWS;

/// Offset of the value area from the top of a metric box.
pub const METRIC_VALUE_OFFSET: u32 = 20;

/// Height of the value area inside a metric box.
pub const METRIC_VALUE_HEIGHT: u32 = 32;

// =============================================================================
// DTC Page
// =============================================================================

/// Codes shown per DTC page.
pub const DTC_ITEMS_PER_PAGE: usize = 4;

/// Height of one DTC row.
pub const DTC_ROW_HEIGHT: u32 = 33;

/// Top of the DTC list.
pub const DTC_LIST_Y: i32 = CONTENT_Y + 28;

/// Height of the DTC action buttons (REFRESH / CLEAR / UP / DOWN).
pub const DTC_BUTTON_HEIGHT: u32 = 22;

/// Width of the REFRESH and CLEAR buttons.
pub const DTC_ACTION_WIDTH: u32 = 64;

/// Width of the UP and DOWN scroll buttons.
pub const DTC_SCROLL_WIDTH: u32 = 30;

// =============================================================================
// Connection-Lost Box
// =============================================================================

/// Width of the connection-lost box.
pub const LOST_BOX_WIDTH: u32 = 260;

/// Height of the connection-lost box.
pub const LOST_BOX_HEIGHT: u32 = 120;

/// Height of one stripe inside the connection-lost box.
pub const LOST_STRIPE_HEIGHT: u32 = 8;

/// Number of animated dots after "Reconnecting".
pub const RECONNECT_DOTS: u8 = 4;

// =============================================================================
// Unit Tests
// =============================================================================
