//! Log writer module
//!
//! Thread-safe log writing to files or stdout/stderr, with a level threshold.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!(
                "Unknown log level '{other}' (expected error, warn, info or debug)"
            )),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        f.write_str(name)
    }
}

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&str>, fallback: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_log_file(p)?))),
            None => Ok(fallback),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Thread-safe log writer
pub struct LogWriter {
    level: Level,
    /// Access and info lines
    access: LogTarget,
    /// Warnings and errors
    error: LogTarget,
}

impl LogWriter {
    /// Create a new log writer with optional file paths
    pub fn new(
        level: Level,
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
    ) -> io::Result<Self> {
        Ok(Self {
            level,
            access: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
        })
    }

    pub const fn level(&self) -> Level {
        self.level
    }

    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    pub fn write_info(&self, message: &str) {
        self.access.write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(
    level: Level,
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
) -> io::Result<()> {
    let writer = LogWriter::new(level, access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, `None` before `init()`
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse() {
        assert_eq!("info".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!(" debug ".parse::<Level>().unwrap(), Level::Debug);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Error < Level::Warn);
        assert!(Level::Warn < Level::Info);
        assert!(Level::Info < Level::Debug);
        assert_eq!(Level::Warn.to_string(), "warn");
    }

    #[test]
    fn test_file_targets() {
        let dir = tempfile::TempDir::new().unwrap();
        let access = dir.path().join("logs").join("access.log");
        let error = dir.path().join("logs").join("error.log");

        let writer = LogWriter::new(
            Level::Debug,
            Some(access.to_str().unwrap()),
            Some(error.to_str().unwrap()),
        )
        .unwrap();
        writer.write_access("GET /other 404");
        writer.write_info("started");
        writer.write_error("[ERROR] disk full");

        let access_text = std::fs::read_to_string(&access).unwrap();
        assert_eq!(access_text, "GET /other 404\nstarted\n");
        let error_text = std::fs::read_to_string(&error).unwrap();
        assert_eq!(error_text, "[ERROR] disk full\n");
    }

    #[test]
    fn test_file_target_appends() {
        let dir = tempfile::TempDir::new().unwrap();
        let access = dir.path().join("access.log");
        std::fs::write(&access, "earlier\n").unwrap();

        let writer = LogWriter::new(Level::Info, Some(access.to_str().unwrap()), None).unwrap();
        writer.write_access("later");

        assert_eq!(std::fs::read_to_string(&access).unwrap(), "earlier\nlater\n");
    }
}
