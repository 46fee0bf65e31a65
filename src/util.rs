// Browser logging: routes the `log` macros to the devtools console
use log::{Level, LevelFilter, Log, Metadata, Record};

pub struct ConsoleLogger {
    level: Level,
}

impl ConsoleLogger {
    pub const fn new(level: Level) -> Self {
        Self { level }
    }
}

fn format_record(record: &Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format_record(record);
        match record.level() {
            Level::Error => web_sys::console::error_1(&msg.into()),
            Level::Warn => web_sys::console::warn_1(&msg.into()),
            Level::Info => web_sys::console::info_1(&msg.into()),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&msg.into()),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger::new(if cfg!(debug_assertions) {
    Level::Debug
} else {
    Level::Info
});

/// Installs the console logger. Safe to call more than once.
pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
}
