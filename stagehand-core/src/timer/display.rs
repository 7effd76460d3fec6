//! Remaining-time formatting and the display port it renders to.

use crate::config::DisplayMode;

/// Surface that shows the formatted remaining time (a text label, a HUD widget...).
pub trait DisplayPort {
    fn show(&mut self, text: &str);
}

impl<F: FnMut(&str)> DisplayPort for F {
    fn show(&mut self, text: &str) {
        self(text)
    }
}

/// Formats `seconds` for display, rounded to the nearest millisecond.
pub fn format_remaining(seconds: f64, mode: DisplayMode) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let centis = (total_ms % 1000) / 10;
    let secs = (total_ms / 1000) % 60;
    let mins = (total_ms / 60_000) % 60;

    match mode {
        DisplayMode::Minutes => format!("{}:{:02}", mins * 60 + secs, centis),
        DisplayMode::Seconds => format!("{}", secs),
        DisplayMode::Milli => format!("{}:{:02}", secs, centis),
    }
}
