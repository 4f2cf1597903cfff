//! In-place progress line for digesting many files.

use crate::utils::format_size;
use colored::Colorize;
use std::io::{self, IsTerminal, Write};

/// Progress line of the form `Hashing files: 40% (4/10), 1.20 MB`.
///
/// Only drawn when stderr is a terminal and output is not quiet; otherwise all
/// updates are tracked but nothing is printed.
pub struct Progress {
    title: String,
    total: usize,
    current: usize,
    bytes: u64,
    enabled: bool,
    last_percent: u8,
    drawn: bool,
}

impl Progress {
    /// Creates a progress line. `visible` gates drawing in addition to the TTY check.
    #[must_use]
    pub fn new(title: &str, total: usize, visible: bool) -> Self {
        Self {
            title: title.to_string(),
            total,
            current: 0,
            bytes: 0,
            enabled: visible && io::stderr().is_terminal(),
            last_percent: 0,
            drawn: false,
        }
    }

    /// Records that `current` of `total` items are done.
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);
        let percent = self.percent();
        if percent != self.last_percent || !self.drawn {
            self.last_percent = percent;
            self.draw();
        }
    }

    /// Adds to the running byte count shown after the item count.
    pub fn add_bytes(&mut self, bytes: u64) {
        self.bytes = self.bytes.saturating_add(bytes);
    }

    /// Marks the work complete and ends the line.
    pub fn finish(mut self) {
        self.current = self.total;
        self.last_percent = 100;
        if self.enabled && self.total > 0 {
            eprintln!("\r{}, done.", self.line());
        }
        self.drawn = false;
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.current as f64 / self.total as f64) * 100.0) as u8
    }

    fn line(&self) -> String {
        let mut line = format!(
            "{}: {}% ({}/{})",
            self.title.dimmed(),
            self.percent(),
            self.current,
            self.total
        );
        if self.bytes > 0 {
            line.push_str(&format!(", {}", format_size(self.bytes)));
        }
        line
    }

    fn draw(&mut self) {
        if !self.enabled || self.total == 0 {
            return;
        }
        eprint!("\r{}", self.line());
        let _ = io::stderr().flush();
        self.drawn = true;
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if self.drawn {
            eprintln!();
        }
    }
}
