//! Button debounce and the mapping from physical buttons to input events.

use embassy_time::{Duration, Instant};
use obdeck_common::{InputEvent, ViewState};

/// Debounce duration in milliseconds.
pub const DEBOUNCE_MS: u64 = 50;

/// Debounced edge detector for one active-low button.
pub struct ButtonState {
    was_pressed: bool,
    last_change: Option<Instant>,
}

impl ButtonState {
    pub const fn new() -> Self {
        Self {
            was_pressed: false,
            last_change: None,
        }
    }

    /// True only on the press edge. Changes within [`DEBOUNCE_MS`] of the
    /// previous one are contact bounce and ignored.
    pub fn just_pressed(
        &mut self,
        is_low: bool,
    ) -> bool {
        if is_low == self.was_pressed {
            return false;
        }
        if let Some(last) = self.last_change
            && last.elapsed() < Duration::from_millis(DEBOUNCE_MS)
        {
            return false;
        }
        self.was_pressed = is_low;
        self.last_change = Some(Instant::now());
        is_low
    }
}

impl Default for ButtonState {
    fn default() -> Self { Self::new() }
}

/// A physical button press, before the highlight is known.
#[derive(Clone, Copy, PartialEq, Eq, Debug, defmt::Format)]
pub enum Press {
    /// X
    Previous,
    /// Y
    Next,
    /// A
    Select,
}

impl Press {
    /// `Select` activates whatever is highlighted in `view`.
    pub const fn event(
        self,
        view: ViewState,
    ) -> InputEvent {
        match self {
            Self::Previous => InputEvent::NavigatePrevious,
            Self::Next => InputEvent::NavigateNext,
            Self::Select => InputEvent::Activate(view.highlighted),
        }
    }
}
