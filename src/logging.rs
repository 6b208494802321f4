use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, OnceLock, PoisonError, RwLock},
    time::Instant,
};

use log::{Log, Metadata, Record, SetLoggerError};

static LOGGER: OnceLock<AppLogger> = OnceLock::new();

pub fn get_logger() -> &'static AppLogger {
    // default configuration
    const DEFAULT_MAX_KEPT: usize = 256;

    LOGGER.get_or_init(|| AppLogger::new(log::Level::Warn, DEFAULT_MAX_KEPT))
}

/// Installs the in-memory logger. While a menu owns the terminal nothing can
/// be printed, so records are kept until [`AppLogger::drain`] is called.
pub fn init(level: log::Level) -> Result<(), SetLoggerError> {
    let logger = get_logger();
    logger.set_min_level(level);
    log::set_logger(logger)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Message {
    pub level: log::Level,
    pub pushed: Instant,
    pub message: String,
    pub source: String,
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:<5}] {} -> {}", self.level, self.source, self.message)
    }
}

struct Logs {
    logs: VecDeque<Message>,
    max_kept: usize,
}

impl Logs {
    fn push(&mut self, message: Message) {
        if self.logs.len() == self.max_kept {
            self.logs.pop_front();
        }
        self.logs.push_back(message);
    }
}

pub struct AppLogger {
    min_level: RwLock<log::Level>,
    logs: Mutex<Logs>,
}

impl AppLogger {
    fn new(min_level: log::Level, max_kept: usize) -> Self {
        Self {
            min_level: RwLock::new(min_level),
            logs: Mutex::new(Logs {
                logs: VecDeque::with_capacity(max_kept),
                max_kept: max_kept.max(1),
            }),
        }
    }

    pub fn min_level(&self) -> log::Level {
        *self.min_level.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_min_level(&self, level: log::Level) {
        *self.min_level.write().unwrap_or_else(PoisonError::into_inner) = level;
    }

    fn borrow_mut_logs(&self) -> MutexGuard<Logs> {
        // a thread that panicked while pushing can't leave `Logs` half-written
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes and returns every kept record, oldest first.
    pub fn drain(&self) -> Vec<Message> {
        self.borrow_mut_logs().logs.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.borrow_mut_logs().logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.min_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.borrow_mut_logs().push(Message {
                level: record.level(),
                pushed: Instant::now(),
                message: record.args().to_string(),
                source: record.module_path().unwrap_or("unknown").to_string(),
            });
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: log::Level, text: &str, f: impl FnOnce(&Record)) {
        f(&Record::builder()
            .level(level)
            .module_path(Some("tmenu::tests"))
            .args(format_args!("{}", text))
            .build());
    }

    #[test]
    fn filters_by_level_and_drains_in_order() {
        let logger = AppLogger::new(log::Level::Info, 8);

        record(log::Level::Info, "first", |r| logger.log(r));
        record(log::Level::Debug, "hidden", |r| logger.log(r));
        record(log::Level::Warn, "second", |r| logger.log(r));

        let drained = logger.drain();
        let texts: Vec<_> = drained.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_eq!(drained[0].source, "tmenu::tests");
        assert!(logger.is_empty());
    }

    #[test]
    fn keeps_only_newest_records() {
        let logger = AppLogger::new(log::Level::Trace, 2);

        for text in ["a", "b", "c"] {
            record(log::Level::Error, text, |r| logger.log(r));
        }

        let texts: Vec<_> = logger.drain().into_iter().map(|m| m.message).collect();
        assert_eq!(texts, ["b", "c"]);
    }
}
