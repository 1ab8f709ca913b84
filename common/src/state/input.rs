//! Input dispatcher.
//!
//! Turns discrete input events into view changes and DTC commands. The
//! firmware maps its three physical buttons to
//! `NavigatePrevious` / `NavigateNext` / `Activate(highlighted)`; the
//! simulator does the same with arrow keys and Enter.

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::buttons::{ButtonId, enabled_buttons, is_enabled};
use super::pages::Page;
use crate::config::layout::DTC_ITEMS_PER_PAGE;
use crate::error::CommandError;
use crate::store::{DtcCommand, SharedTelemetry};
use crate::{log_info, log_warn};

/// A discrete user action.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Move the highlight to the previous enabled button.
    NavigatePrevious,
    /// Move the highlight to the next enabled button.
    NavigateNext,
    /// Press a button.
    Activate(ButtonId),
}

/// What the renderer needs to know about the UI.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ViewState {
    pub page: Page,
    pub highlighted: ButtonId,
    /// Index of the first code shown on the DTC page.
    pub scroll: usize,
}

/// Result of one event.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputOutcome {
    /// Highlight moved.
    Highlighted(ButtonId),
    PageChanged(Page),
    Scrolled(usize),
    /// A DTC command was queued for the worker.
    Requested(DtcCommand),
    /// The command queue refused the request.
    Rejected(CommandError),
    /// The button is not enabled in the current view.
    Ignored,
}

pub struct InputDispatcher {
    view: ViewState,
}

impl InputDispatcher {
    pub const fn new() -> Self {
        Self {
            view: ViewState {
                page: Page::Dashboard,
                highlighted: ButtonId::NavDashboard,
                scroll: 0,
            },
        }
    }

    #[inline]
    pub const fn view(&self) -> ViewState { self.view }

    /// Keep scroll and highlight valid after the code count changed.
    pub fn sync(
        &mut self,
        dtc_count: usize,
    ) {
        let last_page_start = dtc_count.saturating_sub(1) / DTC_ITEMS_PER_PAGE * DTC_ITEMS_PER_PAGE;
        if self.view.scroll > last_page_start {
            self.view.scroll = last_page_start;
        }
        if !self.enabled(self.view.highlighted, dtc_count) {
            self.view.highlighted = self.fallback(self.view.highlighted, dtc_count);
        }
    }

    /// Apply one event. `dtc_count` is the number of stored codes in the
    /// latest snapshot.
    pub fn handle<M: RawMutex>(
        &mut self,
        event: InputEvent,
        dtc_count: usize,
        store: &SharedTelemetry<M>,
    ) -> InputOutcome {
        self.sync(dtc_count);
        match event {
            InputEvent::NavigatePrevious => self.step(dtc_count, false),
            InputEvent::NavigateNext => self.step(dtc_count, true),
            InputEvent::Activate(button) => self.activate(button, dtc_count, store),
        }
    }

    fn enabled(
        &self,
        button: ButtonId,
        dtc_count: usize,
    ) -> bool {
        is_enabled(button, self.view.page, dtc_count, self.view.scroll)
    }

    /// Nearest sensible button when `button` disappeared.
    fn fallback(
        &self,
        button: ButtonId,
        dtc_count: usize,
    ) -> ButtonId {
        let sibling = match button {
            ButtonId::DtcDown => ButtonId::DtcUp,
            ButtonId::DtcUp => ButtonId::DtcDown,
            ButtonId::DtcClear => ButtonId::DtcRefresh,
            _ => self.view.page.nav_button(),
        };
        if self.enabled(sibling, dtc_count) { sibling } else { self.view.page.nav_button() }
    }

    fn step(
        &mut self,
        dtc_count: usize,
        forward: bool,
    ) -> InputOutcome {
        let buttons = enabled_buttons(self.view.page, dtc_count, self.view.scroll);
        let len = buttons.len();
        let current = buttons.iter().position(|b| *b == self.view.highlighted).unwrap_or(0);
        let next = if forward { (current + 1) % len } else { (current + len - 1) % len };
        self.view.highlighted = buttons[next];
        InputOutcome::Highlighted(self.view.highlighted)
    }

    fn activate<M: RawMutex>(
        &mut self,
        button: ButtonId,
        dtc_count: usize,
        store: &SharedTelemetry<M>,
    ) -> InputOutcome {
        if !self.enabled(button, dtc_count) {
            return InputOutcome::Ignored;
        }
        self.view.highlighted = button;

        let outcome = match button {
            ButtonId::NavDashboard | ButtonId::NavDtc | ButtonId::NavInfo => {
                let page = button.target_page().unwrap_or_default();
                if page != self.view.page {
                    self.view.page = page;
                    self.view.scroll = 0;
                }
                InputOutcome::PageChanged(page)
            }
            ButtonId::DtcRefresh => request(store, DtcCommand::Refresh),
            ButtonId::DtcClear => request(store, DtcCommand::Clear),
            ButtonId::DtcUp => {
                self.view.scroll = self.view.scroll.saturating_sub(DTC_ITEMS_PER_PAGE);
                InputOutcome::Scrolled(self.view.scroll)
            }
            ButtonId::DtcDown => {
                self.view.scroll += DTC_ITEMS_PER_PAGE;
                InputOutcome::Scrolled(self.view.scroll)
            }
        };

        if !self.enabled(self.view.highlighted, dtc_count) {
            self.view.highlighted = self.fallback(self.view.highlighted, dtc_count);
        }
        outcome
    }
}

impl Default for InputDispatcher {
    fn default() -> Self { Self::new() }
}

fn request<M: RawMutex>(
    store: &SharedTelemetry<M>,
    command: DtcCommand,
) -> InputOutcome {
    match store.request(command) {
        Ok(()) => {
            log_info!("DTC {} requested", command.name());
            InputOutcome::Requested(command)
        }
        Err(err) => {
            log_warn!("DTC {} dropped: {}", command.name(), err);
            InputOutcome::Rejected(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    use super::*;

    type Store = SharedTelemetry<CriticalSectionRawMutex>;

    fn open_dtc_page(
        dispatcher: &mut InputDispatcher,
        store: &Store,
        count: usize,
    ) {
        dispatcher.handle(InputEvent::Activate(ButtonId::NavDtc), count, store);
    }

    #[test]
    fn test_initial_view() {
        let view = InputDispatcher::new().view();
        assert_eq!(view.page, Page::Dashboard);
        assert_eq!(view.highlighted, ButtonId::NavDashboard);
        assert_eq!(view.scroll, 0);
    }

    #[test]
    fn test_navigation_wraps() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        assert_eq!(d.handle(InputEvent::NavigatePrevious, 0, &store), InputOutcome::Highlighted(ButtonId::NavInfo));
        assert_eq!(d.handle(InputEvent::NavigateNext, 0, &store), InputOutcome::Highlighted(ButtonId::NavDashboard));
        assert_eq!(d.handle(InputEvent::NavigateNext, 0, &store), InputOutcome::Highlighted(ButtonId::NavDtc));
    }

    #[test]
    fn test_activate_nav_changes_page() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        open_dtc_page(&mut d, &store, 0);
        assert_eq!(d.view().page, Page::Dtc);
        assert_eq!(d.view().highlighted, ButtonId::NavDtc);
    }

    #[test]
    fn test_dtc_page_navigation_order() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        open_dtc_page(&mut d, &store, 2);
        let mut seen = std::vec::Vec::new();
        for _ in 0..5 {
            if let InputOutcome::Highlighted(b) = d.handle(InputEvent::NavigateNext, 2, &store) {
                seen.push(b);
            }
        }
        assert_eq!(
            seen,
            [ButtonId::NavInfo, ButtonId::DtcRefresh, ButtonId::DtcClear, ButtonId::NavDashboard, ButtonId::NavDtc]
        );
    }

    #[test]
    fn test_refresh_and_clear_queue_commands() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        open_dtc_page(&mut d, &store, 3);

        assert_eq!(
            d.handle(InputEvent::Activate(ButtonId::DtcRefresh), 3, &store),
            InputOutcome::Requested(DtcCommand::Refresh)
        );
        assert_eq!(
            d.handle(InputEvent::Activate(ButtonId::DtcClear), 3, &store),
            InputOutcome::Requested(DtcCommand::Clear)
        );
        assert!(store.refresh_requested());
        assert!(store.clear_requested());
        assert_eq!(
            d.handle(InputEvent::Activate(ButtonId::DtcClear), 3, &store),
            InputOutcome::Rejected(CommandError::QueueFull)
        );
    }

    #[test]
    fn test_clear_ignored_without_codes() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        open_dtc_page(&mut d, &store, 0);
        assert_eq!(d.handle(InputEvent::Activate(ButtonId::DtcClear), 0, &store), InputOutcome::Ignored);
        assert!(!store.clear_requested());
    }

    #[test]
    fn test_dtc_buttons_ignored_on_other_pages() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        assert_eq!(d.handle(InputEvent::Activate(ButtonId::DtcRefresh), 3, &store), InputOutcome::Ignored);
    }

    #[test]
    fn test_scrolling() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        open_dtc_page(&mut d, &store, 10);

        assert_eq!(d.handle(InputEvent::Activate(ButtonId::DtcDown), 10, &store), InputOutcome::Scrolled(4));
        assert_eq!(d.handle(InputEvent::Activate(ButtonId::DtcDown), 10, &store), InputOutcome::Scrolled(8));
        // Last page: DOWN is gone, highlight moves to UP
        assert_eq!(d.view().highlighted, ButtonId::DtcUp);
        assert_eq!(d.handle(InputEvent::Activate(ButtonId::DtcDown), 10, &store), InputOutcome::Ignored);
        assert_eq!(d.handle(InputEvent::Activate(ButtonId::DtcUp), 10, &store), InputOutcome::Scrolled(4));
    }

    #[test]
    fn test_sync_after_clear() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        open_dtc_page(&mut d, &store, 10);
        d.handle(InputEvent::Activate(ButtonId::DtcDown), 10, &store);
        d.handle(InputEvent::Activate(ButtonId::DtcClear), 10, &store);

        d.sync(0);
        assert_eq!(d.view().scroll, 0);
        assert_eq!(d.view().highlighted, ButtonId::DtcRefresh);
    }

    #[test]
    fn test_page_change_resets_scroll() {
        let store = Store::new();
        let mut d = InputDispatcher::new();
        open_dtc_page(&mut d, &store, 10);
        d.handle(InputEvent::Activate(ButtonId::DtcDown), 10, &store);
        d.handle(InputEvent::Activate(ButtonId::NavInfo), 10, &store);
        assert_eq!(d.view().page, Page::Info);
        assert_eq!(d.view().scroll, 0);
    }
}
