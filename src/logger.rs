use std::io::Write;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::tui::app::AppEvent;
use crate::tui::log_state::{LogBuffer, LogEntry};

/// Slot for the app event sender, connected after `App` is created.
type EventSlot = Arc<Mutex<Option<mpsc::Sender<AppEvent>>>>;

static EVENT_SLOT: OnceLock<EventSlot> = OnceLock::new();

/// Connect the logger to the app event loop so new entries trigger a redraw.
pub fn connect_event_sender(tx: mpsc::Sender<AppEvent>) {
    if let Some(slot) = EVENT_SLOT.get() {
        *slot.lock() = Some(tx);
    }
}

/// Records from other crates are capped at this level.
const DEPENDENCY_LEVEL: LevelFilter = LevelFilter::Warn;

struct CmdtabLogger {
    buffer: LogBuffer,
    file: Option<Mutex<std::fs::File>>,
    filter: LevelFilter,
}

impl CmdtabLogger {
    fn level_for(&self, target: &str) -> LevelFilter {
        if target == "cmdtab" || target.starts_with("cmdtab::") {
            self.filter
        } else {
            self.filter.min(DEPENDENCY_LEVEL)
        }
    }
}

impl Log for CmdtabLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            level: record.level(),
            target: record.target().to_string(),
            message: format!("{}", record.args()),
            timestamp: Instant::now(),
        };

        if let Some(ref file) = self.file {
            let elapsed = entry
                .timestamp
                .duration_since(self.buffer.start())
                .as_secs_f64();
            let _ = writeln!(
                file.lock(),
                "[{elapsed:.3}s] [{}] {}: {}",
                entry.level,
                entry.target,
                entry.message
            );
        }

        self.buffer.push(entry);

        if let Some(slot) = EVENT_SLOT.get()
            && let Some(ref tx) = *slot.lock()
        {
            let _ = tx.try_send(AppEvent::LogUpdated);
        }
    }

    fn flush(&self) {
        if let Some(ref file) = self.file {
            let _ = file.lock().flush();
        }
    }
}

/// Parse a `RUST_LOG` value. Only a bare level is understood; anything else
/// falls back to `Info`.
fn parse_filter(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the global logger, writing into `buffer` and optionally `log_file`.
///
/// # Errors
///
/// Returns an error if a logger is already installed.
pub fn init(buffer: LogBuffer, log_file: Option<std::fs::File>) -> Result<(), SetLoggerError> {
    EVENT_SLOT.get_or_init(|| Arc::new(Mutex::new(None)));

    let filter = parse_filter(std::env::var("RUST_LOG").ok().as_deref());
    let logger = CmdtabLogger {
        buffer,
        file: log_file.map(Mutex::new),
        filter,
    };

    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(filter);
    Ok(())
}

/// Map a log level to a ratatui color for display.
#[must_use]
pub fn level_color(level: Level) -> ratatui::style::Color {
    match level {
        Level::Error => crate::theme::FAILURE,
        Level::Warn => crate::theme::WARNING,
        Level::Info => ratatui::style::Color::Blue,
        Level::Debug | Level::Trace => crate::theme::DIM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger(filter: LevelFilter) -> CmdtabLogger {
        CmdtabLogger {
            buffer: LogBuffer::new(),
            file: None,
            filter,
        }
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_filter(Some(" TRACE ")), LevelFilter::Trace);
        assert_eq!(parse_filter(Some("cmdtab=debug")), LevelFilter::Info);
        assert_eq!(parse_filter(None), LevelFilter::Info);
    }

    #[test]
    fn test_dependencies_capped_at_warn() {
        let logger = logger(LevelFilter::Debug);
        assert_eq!(logger.level_for("cmdtab::session"), LevelFilter::Debug);
        assert_eq!(logger.level_for("cmdtab"), LevelFilter::Debug);
        assert_eq!(logger.level_for("cmdtabx"), LevelFilter::Warn);
        assert_eq!(logger.level_for("mio::poll"), LevelFilter::Warn);

        let quiet = self::logger(LevelFilter::Error);
        assert_eq!(quiet.level_for("mio::poll"), LevelFilter::Error);
    }

    #[test]
    fn test_log_pushes_enabled_records() {
        let logger = logger(LevelFilter::Info);
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("cmdtab::config_file")
                .args(format_args!("saved"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("glob")
                .args(format_args!("noise"))
                .build(),
        );
        assert_eq!(logger.buffer.len(), 1);
    }
}
