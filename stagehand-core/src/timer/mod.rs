//! Countdown timer with milestone and completion notifications.

mod countdown;
mod display;
mod listeners;

pub use countdown::{CountdownTimer, TimerState};
pub use display::{format_remaining, DisplayPort};
pub use listeners::ListenerId;
