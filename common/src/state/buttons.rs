//! On-screen buttons.
//!
//! The navigation tabs are always available. On the DTC page:
//!
//! - REFRESH is always available,
//! - CLEAR only when at least one code is stored,
//! - UP / DOWN only when more codes exist than fit one page and the list can
//!   move in that direction.

use embedded_graphics::primitives::Rectangle;
use heapless::Vec;

use super::Page;
use crate::config::layout::{
    CONTENT_Y,
    DTC_ACTION_WIDTH,
    DTC_BUTTON_HEIGHT,
    DTC_ITEMS_PER_PAGE,
    DTC_SCROLL_WIDTH,
    MARGIN,
    NAV_HEIGHT,
    NAV_TAB_WIDTH,
    NAV_Y,
    SCREEN_WIDTH,
};
use crate::render::rect;

/// Every button, in navigation order.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    #[default]
    NavDashboard,
    NavDtc,
    NavInfo,
    DtcRefresh,
    DtcClear,
    DtcUp,
    DtcDown,
}

/// Top of the DTC action row.
const ACTION_Y: i32 = CONTENT_Y + 3;
const CLEAR_X: i32 = (SCREEN_WIDTH - MARGIN - DTC_ACTION_WIDTH) as i32;
const REFRESH_X: i32 = CLEAR_X - (MARGIN + DTC_ACTION_WIDTH) as i32;
const DOWN_X: i32 = REFRESH_X - (MARGIN + DTC_SCROLL_WIDTH) as i32;
const UP_X: i32 = DOWN_X - (MARGIN + DTC_SCROLL_WIDTH) as i32;

impl ButtonId {
    pub const ALL: [Self; 7] = [
        Self::NavDashboard,
        Self::NavDtc,
        Self::NavInfo,
        Self::DtcRefresh,
        Self::DtcClear,
        Self::DtcUp,
        Self::DtcDown,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::NavDashboard => "DASH",
            Self::NavDtc => "DTC",
            Self::NavInfo => "INFO",
            Self::DtcRefresh => "REFRESH",
            Self::DtcClear => "CLEAR",
            Self::DtcUp => "UP",
            Self::DtcDown => "DN",
        }
    }

    #[inline]
    pub const fn is_nav(self) -> bool { matches!(self, Self::NavDashboard | Self::NavDtc | Self::NavInfo) }

    /// Page a navigation tab opens.
    pub const fn target_page(self) -> Option<Page> {
        match self {
            Self::NavDashboard => Some(Page::Dashboard),
            Self::NavDtc => Some(Page::Dtc),
            Self::NavInfo => Some(Page::Info),
            _ => None,
        }
    }

    /// Screen area of the button.
    pub const fn area(self) -> Rectangle {
        match self {
            Self::NavDashboard => rect(0, NAV_Y, NAV_TAB_WIDTH, NAV_HEIGHT),
            Self::NavDtc => rect(NAV_TAB_WIDTH as i32, NAV_Y, NAV_TAB_WIDTH, NAV_HEIGHT),
            Self::NavInfo => rect(
                2 * NAV_TAB_WIDTH as i32,
                NAV_Y,
                SCREEN_WIDTH - 2 * NAV_TAB_WIDTH,
                NAV_HEIGHT,
            ),
            Self::DtcRefresh => rect(REFRESH_X, ACTION_Y, DTC_ACTION_WIDTH, DTC_BUTTON_HEIGHT),
            Self::DtcClear => rect(CLEAR_X, ACTION_Y, DTC_ACTION_WIDTH, DTC_BUTTON_HEIGHT),
            Self::DtcUp => rect(UP_X, ACTION_Y, DTC_SCROLL_WIDTH, DTC_BUTTON_HEIGHT),
            Self::DtcDown => rect(DOWN_X, ACTION_Y, DTC_SCROLL_WIDTH, DTC_BUTTON_HEIGHT),
        }
    }
}

#[inline]
pub const fn can_scroll_up(scroll: usize) -> bool { scroll > 0 }

#[inline]
pub const fn can_scroll_down(
    scroll: usize,
    dtc_count: usize,
) -> bool {
    scroll + DTC_ITEMS_PER_PAGE < dtc_count
}

/// Whether `button` is shown and activatable.
pub const fn is_enabled(
    button: ButtonId,
    page: Page,
    dtc_count: usize,
    scroll: usize,
) -> bool {
    let on_dtc = matches!(page, Page::Dtc);
    let scrollable = dtc_count > DTC_ITEMS_PER_PAGE;
    match button {
        ButtonId::NavDashboard | ButtonId::NavDtc | ButtonId::NavInfo => true,
        ButtonId::DtcRefresh => on_dtc,
        ButtonId::DtcClear => on_dtc && dtc_count > 0,
        ButtonId::DtcUp => on_dtc && scrollable && can_scroll_up(scroll),
        ButtonId::DtcDown => on_dtc && scrollable && can_scroll_down(scroll, dtc_count),
    }
}

/// Enabled buttons in navigation order.
pub fn enabled_buttons(
    page: Page,
    dtc_count: usize,
    scroll: usize,
) -> Vec<ButtonId, 7> {
    ButtonId::ALL
        .into_iter()
        .filter(|b| is_enabled(*b, page, dtc_count, scroll))
        .collect()
}
