//! What is currently on screen, so the next frame can draw only the
//! difference.
//!
//! Dashboard values are compared on their formatted text, not on the raw
//! number: 90.04 and 90.01 both show as "90.0" and must not cause a redraw.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::Rectangle;
use heapless::String;

use super::canvas::rect;
use crate::colors::{GREEN, RED, YELLOW};
use crate::config::layout::{
    CONTENT_Y,
    MARGIN,
    METRIC_HEIGHT,
    METRIC_VALUE_HEIGHT,
    METRIC_VALUE_OFFSET,
    METRIC_WIDTH,
};
use crate::protocol::Vin;
use crate::state::{ButtonId, Page, ViewState};
use crate::store::{ERROR_TEXT_LEN, TelemetrySnapshot, TelemetryStore};

/// Formatted dashboard value.
pub type FieldText = String<12>;

// =============================================================================
// Dashboard Fields
// =============================================================================

/// Dashboard metrics in grid order (left to right, top to bottom).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Field {
    Rpm,
    Speed,
    Coolant,
    Throttle,
    Battery,
    Intake,
}

impl Field {
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Rpm,
        Self::Speed,
        Self::Coolant,
        Self::Throttle,
        Self::Battery,
        Self::Intake,
    ];

    #[inline]
    pub const fn index(self) -> usize { self as usize }

    /// Box caption, unit included.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rpm => "RPM",
            Self::Speed => "SPEED km/h",
            Self::Coolant => "COOLANT C",
            Self::Throttle => "THROTTLE",
            Self::Battery => "BATTERY",
            Self::Intake => "INTAKE C",
        }
    }

    /// Displayed text for this field.
    pub fn format(
        self,
        t: &TelemetrySnapshot,
    ) -> FieldText {
        let text = crate::text::truncated_fmt::<12>;
        match self {
            Self::Rpm => text(format_args!("{}", t.rpm)),
            Self::Speed => text(format_args!("{}", t.speed)),
            Self::Coolant => text(format_args!("{:.1}", t.coolant_temp)),
            Self::Throttle => text(format_args!("{:.0}%", t.throttle_pct)),
            Self::Battery => text(format_args!("{:.1}V", t.battery_voltage)),
            Self::Intake => text(format_args!("{:.1}", t.intake_temp)),
        }
    }

    /// Whole metric box.
    pub const fn area(self) -> Rectangle {
        let i = self.index() as u32;
        let col = i % 2;
        let row = i / 2;
        rect(
            (MARGIN + col * (METRIC_WIDTH + MARGIN)) as i32,
            CONTENT_Y + (MARGIN + row * (METRIC_HEIGHT + MARGIN)) as i32,
            METRIC_WIDTH,
            METRIC_HEIGHT,
        )
    }

    /// Part of the box repainted when the value changes.
    pub const fn value_area(self) -> Rectangle {
        let area = self.area();
        rect(
            area.top_left.x + MARGIN as i32,
            area.top_left.y + METRIC_VALUE_OFFSET as i32,
            METRIC_WIDTH - 2 * MARGIN,
            METRIC_VALUE_HEIGHT,
        )
    }
}

/// Set of dashboard fields.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct FieldSet(u8);

impl FieldSet {
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub fn insert(
        &mut self,
        field: Field,
    ) {
        self.0 |= 1 << field.index();
    }

    #[inline]
    pub const fn contains(
        self,
        field: Field,
    ) -> bool {
        self.0 & (1 << field.index()) != 0
    }

    #[inline]
    pub const fn len(self) -> usize { self.0.count_ones() as usize }

    #[inline]
    pub const fn is_empty(self) -> bool { self.0 == 0 }

    pub fn iter(self) -> impl Iterator<Item = Field> { Field::ALL.into_iter().filter(move |f| self.contains(*f)) }
}

// =============================================================================
// Status Badge
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StatusLevel {
    Ok,
    Warning,
    Error,
}

impl StatusLevel {
    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Ok => GREEN,
            Self::Warning => YELLOW,
            Self::Error => RED,
        }
    }
}

/// Header status: red when disconnected or any code is Critical, yellow
/// with any stored code, green otherwise.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StatusBadge {
    pub level: StatusLevel,
    pub dtc_count: usize,
}

impl StatusBadge {
    pub fn of(store: &TelemetryStore) -> Self {
        let level = if !store.telemetry.connected || store.dtcs.has_critical() {
            StatusLevel::Error
        } else if !store.dtcs.is_empty() {
            StatusLevel::Warning
        } else {
            StatusLevel::Ok
        };
        Self {
            level,
            dtc_count: store.dtcs.len(),
        }
    }
}

// =============================================================================
// Frame State
// =============================================================================

/// Last rendered state. `None` means "unknown, draw on next frame".
pub struct RenderFrameState {
    force_full_redraw: bool,
    page: Page,
    connected: bool,
    dtcs_read: bool,
    dtc_count: usize,
    dtc_signature: u32,
    scroll: usize,
    pub(super) status: Option<StatusBadge>,
    pub(super) values: [Option<FieldText>; Field::COUNT],
    pub(super) error: Option<String<ERROR_TEXT_LEN>>,
    pub(super) highlight: Option<ButtonId>,
    pub(super) busy: Option<bool>,
    pub(super) vin: Option<Option<Vin>>,
    pub(super) info_codes: Option<Option<usize>>,
    pub(super) log_sequence: Option<u32>,
    pub(super) dots: u8,
}

impl RenderFrameState {
    pub const fn new() -> Self {
        Self {
            force_full_redraw: true,
            page: Page::Dashboard,
            connected: false,
            dtcs_read: false,
            dtc_count: 0,
            dtc_signature: 0,
            scroll: 0,
            status: None,
            values: [const { None }; Field::COUNT],
            error: None,
            highlight: None,
            busy: None,
            vin: None,
            info_codes: None,
            log_sequence: None,
            dots: 0,
        }
    }

    /// Redraw everything on the next frame.
    #[inline]
    pub fn force_full_redraw(&mut self) { self.force_full_redraw = true; }

    /// Page change, connection change, or (on the DTC page) the first code
    /// read, a different code list or scroll position.
    pub fn needs_full_redraw(
        &self,
        store: &TelemetryStore,
        view: &ViewState,
    ) -> bool {
        if self.force_full_redraw || view.page != self.page || store.telemetry.connected != self.connected {
            return true;
        }
        view.page == Page::Dtc
            && (store.dtcs_read != self.dtcs_read
                || store.dtcs.len() != self.dtc_count
                || store.dtcs.signature() != self.dtc_signature
                || view.scroll != self.scroll)
    }

    /// Record the new baseline and forget everything drawn before.
    pub fn begin_full_redraw(
        &mut self,
        store: &TelemetryStore,
        view: &ViewState,
    ) {
        *self = Self {
            force_full_redraw: false,
            page: view.page,
            connected: store.telemetry.connected,
            dtcs_read: store.dtcs_read,
            dtc_count: store.dtcs.len(),
            dtc_signature: store.dtcs.signature(),
            scroll: view.scroll,
            dots: self.dots,
            ..Self::new()
        };
    }

    /// Whether `text` differs from what `field` currently shows.
    pub fn value_changed(
        &self,
        field: Field,
        text: &FieldText,
    ) -> bool {
        self.values[field.index()].as_ref() != Some(text)
    }

    pub fn record_value(
        &mut self,
        field: Field,
        text: FieldText,
    ) {
        self.values[field.index()] = Some(text);
    }

    /// Advance the reconnect animation; returns the dot count to show.
    pub fn next_dots(
        &mut self,
        max: u8,
    ) -> u8 {
        self.dots = if self.dots >= max { 0 } else { self.dots + 1 };
        self.dots
    }
}

impl Default for RenderFrameState {
    fn default() -> Self { Self::new() }
}
