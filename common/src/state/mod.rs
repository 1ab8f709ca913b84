//! UI state: which page is shown, which button is highlighted, and how
//! input events turn into page changes and DTC commands.
//!
//! - `pages`: page enum and cycling
//! - `buttons`: button ids, geometry and visibility rules
//! - `input`: the input dispatcher

mod buttons;
mod input;
mod pages;

pub use buttons::{ButtonId, can_scroll_down, can_scroll_up, enabled_buttons, is_enabled};
pub use input::{InputDispatcher, InputEvent, InputOutcome, ViewState};
pub use pages::Page;
