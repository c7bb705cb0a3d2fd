//! Message log and banner
//!
//! Every message goes into the scrollback log. The newest one is also shown
//! as a banner until its time-to-live runs out. The banner timer is purely
//! cosmetic and never touches run state.

use std::time::{Duration, Instant};

use crate::dungeon::Severity;

/// Oldest entries are dropped past this many
const MAX_LOG_ENTRIES: usize = 200;

/// A message to display in the game log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub text: String,
    pub severity: Severity,
}

#[derive(Debug, Clone)]
struct Banner {
    text: String,
    shown_at: Instant,
}

#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: Vec<LogEntry>,
    banner: Option<Banner>,
    ttl: Duration,
}

impl MessageLog {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Vec::new(),
            banner: None,
            ttl,
        }
    }

    /// Log a message and show it as the banner
    pub fn push(&mut self, text: impl Into<String>, severity: Severity, now: Instant) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.banner = Some(Banner { text: text.clone(), shown_at: now });
        self.log(text, severity);
    }

    /// Log a message without touching the banner
    pub fn log(&mut self, text: impl Into<String>, severity: Severity) {
        self.entries.push(LogEntry { text: text.into(), severity });
        if self.entries.len() > MAX_LOG_ENTRIES {
            let excess = self.entries.len() - MAX_LOG_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    /// Clear the banner once it has expired
    pub fn tick(&mut self, now: Instant) {
        let expired = self
            .banner
            .as_ref()
            .is_some_and(|b| now.saturating_duration_since(b.shown_at) >= self.ttl);
        if expired {
            self.banner = None;
        }
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_ref().map(|b| b.text.as_str())
    }

    /// Entries, oldest first
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries, newest first
    pub fn recent(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_expires() {
        let start = Instant::now();
        let mut log = MessageLog::new(Duration::from_secs(3));
        log.push("Found potion!", Severity::Safe, start);
        assert_eq!(log.banner(), Some("Found potion!"));

        log.tick(start + Duration::from_secs(2));
        assert_eq!(log.banner(), Some("Found potion!"));

        log.tick(start + Duration::from_secs(3));
        assert_eq!(log.banner(), None);
        assert_eq!(log.entries().len(), 1);
    }

    #[test]
    fn test_new_message_restarts_banner() {
        let start = Instant::now();
        let mut log = MessageLog::new(Duration::from_secs(3));
        log.push("first", Severity::Info, start);
        log.push("second", Severity::Battle, start + Duration::from_secs(2));

        log.tick(start + Duration::from_secs(4));
        assert_eq!(log.banner(), Some("second"));
        let recent: Vec<&str> = log.recent().map(|e| e.text.as_str()).collect();
        assert_eq!(recent, vec!["second", "first"]);
    }

    #[test]
    fn test_plain_log_and_empty_text() {
        let mut log = MessageLog::new(Duration::from_secs(3));
        log.log("A new descent begins.", Severity::Info);
        log.push("", Severity::Info, Instant::now());
        assert_eq!(log.banner(), None);
        assert_eq!(log.entries().len(), 1);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut log = MessageLog::new(Duration::from_secs(3));
        for i in 0..(MAX_LOG_ENTRIES + 10) {
            log.log(format!("msg {}", i), Severity::Info);
        }
        assert_eq!(log.entries().len(), MAX_LOG_ENTRIES);
        assert_eq!(log.entries()[0].text, "msg 10");
    }
}
