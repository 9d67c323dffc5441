//! Transient toasts, blocking alerts and the capped activity log.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Maximum number of log lines kept; older lines are evicted first.
pub const LOG_CAPACITY: usize = 400;

/// How long a toast stays visible.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

/// Severity shared by toasts and log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Success,
    Warning,
    /// The engine spells this `danger`.
    #[serde(alias = "danger")]
    Error,
    /// Also covers levels this client does not know (e.g. `secondary`).
    #[default]
    #[serde(other)]
    Info,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: LogLevel,
    pub expires_at: Instant,
}

/// A modal message that blocks input until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct NotificationChannel {
    toasts: Vec<Toast>,
    alerts: VecDeque<Alert>,
    log: VecDeque<LogLine>,
}

impl NotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toast(&mut self, message: impl Into<String>, level: LogLevel, now: Instant) {
        self.toasts.push(Toast {
            message: message.into(),
            level,
            expires_at: now + TOAST_TTL,
        });
    }

    /// Drop expired toasts. Returns true if any were removed.
    pub fn expire_toasts(&mut self, now: Instant) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.expires_at > now);
        self.toasts.len() != before
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.alerts.push_back(Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    /// The alert currently blocking input, if any.
    pub fn current_alert(&self) -> Option<&Alert> {
        self.alerts.front()
    }

    pub fn dismiss_alert(&mut self) -> Option<Alert> {
        self.alerts.pop_front()
    }

    /// Append a log line stamped with the local time.
    pub fn log(&mut self, message: impl Into<String>, level: LogLevel) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        self.push_line(LogLine {
            time,
            level,
            message: message.into(),
        });
    }

    pub fn push_line(&mut self, line: LogLine) {
        self.log.push_back(line);
        while self.log.len() > LOG_CAPACITY {
            self.log.pop_front();
        }
    }

    pub fn log_lines(&self) -> &VecDeque<LogLine> {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_keeps_most_recent_400() {
        let mut n = NotificationChannel::new();
        for i in 0..401 {
            n.log(format!("line {i}"), LogLevel::Info);
        }
        assert_eq!(n.log_lines().len(), LOG_CAPACITY);
        assert_eq!(n.log_lines().front().unwrap().message, "line 1");
        assert_eq!(n.log_lines().back().unwrap().message, "line 400");
    }

    #[test]
    fn log_lines_carry_clock_time() {
        let mut n = NotificationChannel::new();
        n.log("hello", LogLevel::Success);
        let line = n.log_lines().back().unwrap();
        assert_eq!(line.time.len(), 8);
        assert_eq!(line.time.matches(':').count(), 2);
    }

    #[test]
    fn toasts_expire_after_ttl() {
        let mut n = NotificationChannel::new();
        let t0 = Instant::now();
        n.toast("saved", LogLevel::Success, t0);

        assert!(!n.expire_toasts(t0 + Duration::from_secs(2)));
        assert_eq!(n.toasts().len(), 1);
        assert!(n.expire_toasts(t0 + TOAST_TTL));
        assert!(n.toasts().is_empty());
    }

    #[test]
    fn alerts_are_fifo() {
        let mut n = NotificationChannel::new();
        n.alert("Login failed", "timeout");
        n.alert("Export failed", "not logged in");
        assert_eq!(n.current_alert().unwrap().title, "Login failed");
        n.dismiss_alert();
        assert_eq!(n.current_alert().unwrap().title, "Export failed");
        n.dismiss_alert();
        assert!(n.current_alert().is_none());
    }

    #[test]
    fn unknown_level_is_info() {
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Info);
    }

    #[test]
    fn engine_level_spellings_decode() {
        let decode = |s: &str| serde_json::from_str::<LogLevel>(&format!("\"{s}\"")).unwrap();
        assert_eq!(decode("danger"), LogLevel::Error);
        assert_eq!(decode("error"), LogLevel::Error);
        assert_eq!(decode("warning"), LogLevel::Warning);
        assert_eq!(decode("success"), LogLevel::Success);
        assert_eq!(decode("secondary"), LogLevel::Info);
    }

    #[test]
    fn clear_log_empties() {
        let mut n = NotificationChannel::new();
        n.log("x", LogLevel::Error);
        n.clear_log();
        assert!(n.log_lines().is_empty());
    }
}
