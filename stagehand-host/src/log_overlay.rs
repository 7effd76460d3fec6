//! In-memory debug log overlay fed by tracing.
//!
//! Every event is appended as a `-message` line. When the buffered text grows
//! past the character cap it is cleared before the next line goes in, so the
//! overlay always shows the most recent burst of logging.

use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Default character cap for the overlay text.
pub const DEFAULT_MAX_CHARS: usize = 100_000;

#[derive(Default)]
struct OverlayText {
    text: String,
    chars: usize,
}

/// Shared, capped debug log text.
#[derive(Clone)]
pub struct LogOverlay {
    inner: Arc<Mutex<OverlayText>>,
    max_chars: usize,
}

impl LogOverlay {
    pub fn new(max_chars: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(OverlayText::default())),
            max_chars,
        }
    }

    /// Appends `message` as a `-message` line.
    pub fn append(&self, message: &str) {
        self.push_line(&format!("-{}", message));
    }

    fn push_line(&self, line: &str) {
        let Ok(mut overlay) = self.inner.lock() else {
            return;
        };
        if overlay.chars > self.max_chars {
            overlay.text.clear();
            overlay.chars = 0;
        }
        overlay.text.push_str(line);
        overlay.text.push('\n');
        overlay.chars += line.chars().count() + 1;
    }

    /// Returns the current overlay text.
    pub fn contents(&self) -> String {
        self.inner
            .lock()
            .map(|overlay| overlay.text.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut overlay) = self.inner.lock() {
            overlay.text.clear();
            overlay.chars = 0;
        }
    }

    /// Tracing layer that writes every event into this overlay.
    pub fn layer(&self) -> OverlayLayer {
        OverlayLayer {
            overlay: self.clone(),
        }
    }
}

impl Default for LogOverlay {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

/// A tracing layer that captures event messages into a [`LogOverlay`].
pub struct OverlayLayer {
    overlay: LogOverlay,
}

impl<S: tracing::Subscriber> Layer<S> for OverlayLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.overlay.push_line(&visitor.into_line());
    }
}

/// Builds one overlay line from an event: `-message key=value ...`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: Vec<String>,
}

impl LineVisitor {
    fn into_line(self) -> String {
        let mut line = format!("-{}", self.message);
        for field in self.fields {
            line.push(' ');
            line.push_str(&field);
        }
        line
    }
}

impl tracing::field::Visit for LineVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_append_prefixes_lines() {
        let overlay = LogOverlay::new(1000);
        overlay.append("first");
        overlay.append("second");
        assert_eq!(overlay.contents(), "-first\n-second\n");
    }

    #[test]
    fn test_clears_when_over_cap() {
        let overlay = LogOverlay::new(10);
        overlay.append("0123456789");
        assert_eq!(overlay.contents(), "-0123456789\n");

        overlay.append("next");
        assert_eq!(overlay.contents(), "-next\n");
    }

    #[test]
    fn test_clear() {
        let overlay = LogOverlay::default();
        overlay.append("something");
        overlay.clear();
        assert!(overlay.contents().is_empty());
    }

    #[test]
    fn test_layer_captures_events() {
        let overlay = LogOverlay::new(1000);
        let subscriber = tracing_subscriber::registry().with(overlay.layer());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Timer started");
            tracing::warn!("Playback failed: {}", "no device");
        });

        assert_eq!(
            overlay.contents(),
            "-Timer started\n-Playback failed: no device\n"
        );
    }

    #[test]
    fn test_layer_appends_structured_fields() {
        let overlay = LogOverlay::new(1000);
        let subscriber = tracing_subscriber::registry().with(overlay.layer());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(instance = 3, category = "fx", "Released");
        });

        assert_eq!(overlay.contents(), "-Released instance=3 category=fx\n");
    }

    #[test]
    fn test_clones_share_text() {
        let overlay = LogOverlay::new(1000);
        let other = overlay.clone();
        other.append("shared");
        assert_eq!(overlay.contents(), "-shared\n");
    }
}
