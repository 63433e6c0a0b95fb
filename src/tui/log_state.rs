use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use log::Level;
use parking_lot::Mutex;

const MAX_LOG_ENTRIES: usize = 1000;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub timestamp: Instant,
}

/// Thread-safe ring buffer of the most recent log entries.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    start: Instant,
}

impl LogBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES))),
            start: Instant::now(),
        }
    }

    /// When the buffer was created; entry times are shown relative to it.
    #[must_use]
    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.entries.lock();
        if entries.len() >= MAX_LOG_ENTRIES {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The newest `count` entries, oldest first, skipping the newest `skip`.
    #[must_use]
    pub fn window(&self, count: usize, skip: usize) -> Vec<LogEntry> {
        let entries = self.entries.lock();
        let end = entries.len().saturating_sub(skip);
        let start = end.saturating_sub(count);
        entries.range(start..end).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            level: Level::Info,
            target: "cmdtab".to_string(),
            message: message.to_string(),
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_buffer_is_bounded() {
        let buffer = LogBuffer::new();
        for i in 0..MAX_LOG_ENTRIES + 5 {
            buffer.push(entry(&i.to_string()));
        }
        assert_eq!(buffer.len(), MAX_LOG_ENTRIES);
        assert_eq!(buffer.window(1, MAX_LOG_ENTRIES - 1)[0].message, "5");
    }

    #[test]
    fn test_window_scrolls_from_newest() {
        let buffer = LogBuffer::new();
        for m in ["a", "b", "c", "d"] {
            buffer.push(entry(m));
        }
        let messages = |w: Vec<LogEntry>| w.into_iter().map(|e| e.message).collect::<Vec<_>>();
        assert_eq!(messages(buffer.window(2, 0)), vec!["c", "d"]);
        assert_eq!(messages(buffer.window(2, 1)), vec!["b", "c"]);
        assert_eq!(messages(buffer.window(10, 3)), vec!["a"]);
        assert!(buffer.window(2, 10).is_empty());
    }
}
