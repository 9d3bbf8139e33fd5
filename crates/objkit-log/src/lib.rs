//! Leveled logging for the `objkit` runtime crates.
//!
//! Messages carry the module path they were emitted from and are written to
//! stderr with a coloured level tag. The level is process-wide and can be set
//! programmatically or from the `OBJKIT_LOG` environment variable.
//!
//! # Example
//!
//! ```
//! use objkit_log::{Level, debug, info, trace};
//!
//! objkit_log::set_level(Level::Debug);
//!
//! let class = "Person";
//! info!("registered class {}", class);
//! debug!("instance size: {}", 40);
//! trace!("not shown at debug level");
//! ```

use std::fmt::{self, Arguments};
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable read by [`init_from_env`].
pub const ENV_VAR: &str = "OBJKIT_LOG";

/// Severity of a log message, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Unrecoverable conditions, logged right before the runtime gives up
    Error = 0,
    /// Suspicious but survivable situations
    Warn = 1,
    /// High-level lifecycle events
    Info = 2,
    /// Class registration, builder finalization
    Debug = 3,
    /// Individual message sends and retain/release traffic
    Trace = 4,
}

impl Level {
    const ALL: [Level; 5] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    const fn color_code(self) -> &'static str {
        match self {
            Level::Error => "\x1b[31m",
            Level::Warn => "\x1b[33m",
            Level::Info => "\x1b[32m",
            Level::Debug => "\x1b[36m",
            Level::Trace => "\x1b[35m",
        }
    }

    /// Returns the upper-case tag for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    const fn from_u8(raw: u8) -> Level {
        match raw {
            0 => Level::Error,
            1 => Level::Warn,
            2 => Level::Info,
            3 => Level::Debug,
            _ => Level::Trace,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError {
    input: String,
}

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid log level `{}` (expected error, warn, info, debug or trace)",
            self.input
        )
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses a level name, ignoring case and surrounding whitespace.
    ///
    /// ```
    /// use objkit_log::Level;
    ///
    /// assert_eq!("trace".parse::<Level>(), Ok(Level::Trace));
    /// assert_eq!(" Warn ".parse::<Level>(), Ok(Level::Warn));
    /// assert!("loud".parse::<Level>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLevelError {
                input: s.to_string(),
            })
    }
}

/// Process-wide log filter.
pub struct Logger {
    level: AtomicU8,
}

impl Logger {
    const fn new(level: Level) -> Self {
        Logger {
            level: AtomicU8::new(level as u8),
        }
    }

    /// Sets the most verbose level that will be emitted.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Returns the current level.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Returns `true` if a message at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        level as u8 <= self.level.load(Ordering::Relaxed)
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the process-wide logger, starting at [`Level::Info`].
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(Level::Info))
}

/// Sets the process-wide level.
pub fn set_level(level: Level) {
    get_logger().set_level(level);
}

/// Sets the process-wide level from a level name.
///
/// # Errors
///
/// Returns [`ParseLevelError`] if `s` is not a level name; the level is left
/// unchanged in that case.
pub fn set_level_from_str(s: &str) -> Result<(), ParseLevelError> {
    set_level(s.parse()?);
    Ok(())
}

/// Applies an optional configuration value, as read from [`ENV_VAR`].
///
/// `None` and empty strings leave the level unchanged and return `Ok(None)`.
///
/// # Errors
///
/// Returns [`ParseLevelError`] if the value is not a level name.
pub fn init_from_value(value: Option<&str>) -> Result<Option<Level>, ParseLevelError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => {
            let level: Level = raw.parse()?;
            set_level(level);
            Ok(Some(level))
        }
    }
}

/// Configures the level from the `OBJKIT_LOG` environment variable.
///
/// An unset variable keeps the current level. An invalid value is reported
/// once on stderr and otherwise ignored.
pub fn init_from_env() -> Option<Level> {
    let value = std::env::var(ENV_VAR).ok();
    match init_from_value(value.as_deref()) {
        Ok(level) => level,
        Err(err) => {
            eprintln!("{ENV_VAR}: {err}");
            None
        }
    }
}

#[doc(hidden)]
pub fn __log_with_target(level: Level, target: &str, args: Arguments<'_>) {
    const RESET: &str = "\x1b[0m";

    if !get_logger().enabled(level) {
        return;
    }

    eprintln!("{}[{}]{RESET} {target}: {args}", level.color_code(), level.as_str());
}

/// Logs a message at an explicit level.
///
/// ```
/// use objkit_log::{Level, log};
///
/// log!(level: Level::Warn, "retain count is {}", 0);
/// ```
#[macro_export]
macro_rules! log {
    (level: $level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::get_logger().enabled(level) {
            $crate::__log_with_target(level, module_path!(), format_args!($($arg)*));
        }
    }};
}

/// Logs at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Error, $($arg)*)
    };
}

/// Logs at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Warn, $($arg)*)
    };
}

/// Logs at [`Level::Info`](crate::Level::Info).
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Info, $($arg)*)
    };
}

/// Logs at [`Level::Debug`](crate::Level::Debug).
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Debug, $($arg)*)
    };
}

/// Logs at [`Level::Trace`](crate::Level::Trace).
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::log!(level: $crate::Level::Trace, $($arg)*)
    };
}
