//! Append-only log shown in the main pane.

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Time the view gets to lay out a new entry before scrolling to it.
pub const SCROLL_DELAY: Duration = Duration::from_millis(100);

/// One line in the log. Never mutated once appended.
#[derive(Clone, Debug)]
pub struct LogEntry {
    text: String,
    created_at: DateTime<Local>,
}

impl LogEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn formatted_time(&self) -> String {
        self.created_at.format("%H:%M:%S").to_string()
    }
}

#[derive(Debug, Default)]
pub struct LogView {
    entries: Vec<LogEntry>,
    scroll_due: Option<Instant>,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(LogEntry::text)
    }

    /// Add a line to the end and schedule a scroll to it.
    pub fn append(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!("log: {}", text);
        self.entries.push(LogEntry {
            text,
            created_at: Local::now(),
        });
        self.scroll_due = Some(Instant::now() + SCROLL_DELAY);
    }

    /// Drop every entry, then record the deletion.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.append("Logs deleted.");
    }

    /// True once per scheduled scroll, after its delay has passed.
    pub fn take_scroll(&mut self, now: Instant) -> bool {
        match self.scroll_due {
            Some(due) if now >= due => {
                self.scroll_due = None;
                true
            }
            _ => false,
        }
    }

    pub fn scroll_pending(&self) -> bool {
        self.scroll_due.is_some()
    }
}
