//! Frame-loop host for Stagehand.
//!
//! Loads configuration, installs logging (stderr plus the debug log overlay)
//! and drives the countdown timer and audio registry once per frame.

mod commands;
mod log_overlay;

pub use commands::*;
pub use log_overlay::*;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Installs the global tracing subscriber and returns the overlay it feeds.
///
/// Console output goes to stderr so the countdown display owns stdout.
pub fn init_logging(max_chars: usize) -> LogOverlay {
    let overlay = LogOverlay::new(max_chars);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(overlay.layer())
        .init();

    overlay
}
