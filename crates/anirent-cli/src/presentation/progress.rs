//! Progress bar for a single download.

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

/// Byte progress of one ticket, driven by its lifecycle events.
pub struct DownloadBar {
    bar: ProgressBar,
}

impl DownloadBar {
    /// Create a bar of unknown length until `Started` arrives.
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        bar.set_message("waiting for metadata");
        Self { bar }
    }

    /// Metadata is known; the transfer is about to begin.
    pub fn start(&self, total_bytes: u64, location: &str) {
        self.bar.set_length(total_bytes);
        self.bar.set_message(location.to_string());
    }

    /// Cumulative bytes downloaded.
    pub fn update(&self, downloaded_bytes: u64, total_bytes: u64) {
        self.bar.set_length(total_bytes);
        self.bar.set_position(downloaded_bytes);
    }

    /// All bytes fetched.
    pub fn finish(&self) {
        self.bar.finish_with_message("downloaded");
    }

    /// Stop drawing, leaving `message` on screen.
    pub fn abandon(&self, message: impl Into<String>) {
        self.bar.abandon_with_message(message.into());
    }
}

impl Default for DownloadBar {
    fn default() -> Self {
        Self::new()
    }
}
