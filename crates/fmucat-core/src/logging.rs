//! env_logger setup that cooperates with the stage lines

use std::io::Write;

use indicatif::MultiProgress;
use log::Level;

/// Default log filter; `RUST_LOG` overrides it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet,
    Normal,
    /// Per-item activity
    Debug,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (_, true) => Self::Debug,
            (true, false) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }

    fn filter(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Debug => "debug",
        }
    }
}

fn label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

fn color(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m",
        Level::Warn => "\x1b[33m",
        Level::Info => "\x1b[32m",
        Level::Debug => "\x1b[36m",
        Level::Trace => "\x1b[35m",
    }
}

/// Terminal logger: suspends the stage lines while it writes.
struct SpinnerAwareLogger {
    filter: env_logger::Logger,
    multi: MultiProgress,
}

impl log::Log for SpinnerAwareLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.filter.matches(record) {
            return;
        }
        let level = record.level();
        let line = format!("[{}{}\x1b[0m] {}", color(level), label(level), record.args());
        self.multi.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {}
}

/// Install the global logger.
///
/// With `multi` (a terminal) lines are colored and printed above the stage
/// lines; without it they are plain, one record per line.
pub fn init_logging(verbosity: Verbosity, multi: Option<&MultiProgress>) {
    let env = env_logger::Env::default().default_filter_or(verbosity.filter());
    let mut builder = env_logger::Builder::from_env(env);

    match multi {
        Some(multi) => {
            let filter = builder.build();
            let max_level = filter.filter();
            let logger = SpinnerAwareLogger {
                filter,
                multi: multi.clone(),
            };
            if log::set_boxed_logger(Box::new(logger)).is_ok() {
                log::set_max_level(max_level);
            }
        }
        None => {
            let _ = builder
                .format(|buf, record| writeln!(buf, "[{}] {}", label(record.level()), record.args()))
                .try_init();
        }
    }
}
