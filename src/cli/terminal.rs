//! Terminal capability detection and utilities

use std::{future::Future, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, colors::css};
use planner::domain::CoverageLabel;

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Detects terminal width, returning None if not available
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Check if terminal is narrow (< 60 columns)
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 60)
}

/// Shortens `text` to the terminal width minus `indent`, marking the cut.
pub fn fit(text: &str, indent: usize) -> String {
    let Some(width) = terminal_width() else {
        return text.to_string();
    };
    let room = usize::from(width).saturating_sub(indent).max(10);
    if text.chars().count() <= room {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(room - 1).collect();
    cut.push('…');
    cut
}

/// Runs `future` behind a spinner on stderr.
///
/// The spinner is hidden when stderr is not a terminal.
pub async fn spinner<F: Future>(message: &'static str, future: F) -> F::Output {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(120));
    let output = future.await;
    bar.finish_and_clear();
    output
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as info (blue)
    fn info(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;

    /// Color by coverage: covered is success, partial is warning, none is dim
    fn coverage(&self, label: CoverageLabel) -> String {
        match label {
            CoverageLabel::Covered => self.success(),
            CoverageLabel::PartiallyCovered => self.warning(),
            CoverageLabel::NotCovered => self.dim(),
        }
    }
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn info(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}
