//! Optional line-oriented debug logging.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// The file name the debug log is written to.
pub const LOG_FILE: &str = "LOG.txt";

/// A line logger backed by a file, or by nothing when logging is
/// disabled.
#[derive(Debug)]
pub struct Logger {
    /// The log file, if logging is enabled.
    file: Option<File>,
}

impl Logger {
    /// Returns a disabled [`Logger`] whose [`Logger::line()`] is a no-op.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    /// Creates a [`Logger`] writing to the file at `path`, truncating any
    /// previous log.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(&path).with_context(|| {
            format!("failed to create log file \"{}\"", path.as_ref().display())
        })?;

        Ok(Self { file: Some(file) })
    }

    /// Appends one line to the log.
    ///
    /// A logging failure must not take down the shell, so write errors are
    /// swallowed here.
    pub fn line(&mut self, text: &str) {
        if let Some(file) = self.file.as_mut() {
            let _ = writeln!(file, "{text}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::Logger;

    #[test]
    fn disabled_logger_is_a_noop() {
        let mut logger = Logger::disabled();
        logger.line("nothing should happen");
    }

    #[test]
    fn lines_are_written() {
        let path =
            std::env::temp_dir().join(format!("elfin-log-test-{}", std::process::id()));

        let mut logger = Logger::create(&path).unwrap();
        logger.line("first");
        logger.line("second");
        drop(logger);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");

        std::fs::remove_file(&path).unwrap();
    }
}
