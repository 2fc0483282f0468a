use std::fmt;

/// Custom error type for the tree engines and the shell, including specific
/// error codes.
///
/// Each variant represents a distinct error condition with a unique error code
/// for easier debugging and error handling in applications.
#[derive(Debug)]
pub enum Error {
    /// I/O-related error (e.g., history file operations).
    /// Error code: 1000
    Io(std::io::Error),
    /// Configuration error (e.g., B-tree degree below 2).
    /// Error code: 2000
    Config(String),
    /// Corrupted tree invariant (e.g., key/child counts out of sync).
    /// No recovery path exists once node indices are invalid.
    /// Error code: 3000
    Corrupt(String),
    /// Shell command syntax error.
    /// Error code: 4000
    Syntax(String),
    /// Miscellaneous uncategorized error.
    /// Error code: 9000
    Other(String),
}

impl Error {
    /// Returns the error code associated with this error variant.
    ///
    /// # Examples
    /// ```
    /// let err = Error::Config("Degree must be at least 2".to_string());
    /// assert_eq!(err.code(), 2000);
    /// ```
    pub fn code(&self) -> u32 {
        match self {
            Error::Io(_) => 1000,
            Error::Config(_) => 2000,
            Error::Corrupt(_) => 3000,
            Error::Syntax(_) => 4000,
            Error::Other(_) => 9000,
        }
    }

    /// Returns a human-readable error category for this error variant.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Io(_) => "I/O",
            Error::Config(_) => "Config",
            Error::Corrupt(_) => "Corruption",
            Error::Syntax(_) => "Syntax",
            Error::Other(_) => "Other",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "[{}] I/O Error: {}", self.code(), e),
            Error::Config(msg) => write!(f, "[{}] Config Error: {}", self.code(), msg),
            Error::Corrupt(msg) => write!(f, "[{}] Corruption Error: {}", self.code(), msg),
            Error::Syntax(msg) => write!(f, "[{}] Syntax Error: {}", self.code(), msg),
            Error::Other(msg) => write!(f, "[{}] Unknown Error: {}", self.code(), msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::Syntax(format!("Integer parsing error: {}", err))
    }
}

/// Convenience macro to create an `Error` with a formatted message.
///
/// # Examples
/// ```
/// use crate::errors::{Error, err};
/// let err = err!(Config, "Degree must be at least 2");
/// assert_eq!(err.code(), 2000);
///
/// let err = err!(Corrupt, "Node holds {} keys, expected at most {}", 9, 5);
/// assert_eq!(err.code(), 3000);
/// ```
#[macro_export]
macro_rules! err {
    ($variant:ident, $msg:expr) => {
        $crate::errors::Error::$variant($msg.to_string())
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        $crate::errors::Error::$variant(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_and_display() {
        let err = Error::Syntax("Unknown command".to_string());
        assert_eq!(err.code(), 4000);
        assert_eq!(err.to_string(), "[4000] Syntax Error: Unknown command");
        assert_eq!(err.category(), "Syntax");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = Error::from(io_err);
        assert_eq!(err.code(), 1000);
        assert_eq!(err.to_string(), "[1000] I/O Error: File not found");
    }

    #[test]
    fn test_error_from_parse_int() {
        let parse_err = "abc".parse::<i64>().unwrap_err();
        let err = Error::from(parse_err);
        assert_eq!(err.code(), 4000);
        assert_eq!(err.category(), "Syntax");
    }

    #[test]
    fn test_error_macro() {
        let err = err!(Config, "Degree must be at least 2");
        assert_eq!(err.code(), 2000);
        assert_eq!(
            err.to_string(),
            "[2000] Config Error: Degree must be at least 2"
        );

        let err = err!(Corrupt, "Node holds {} keys, expected at most {}", 9, 5);
        assert_eq!(err.code(), 3000);
        assert_eq!(
            err.to_string(),
            "[3000] Corruption Error: Node holds 9 keys, expected at most 5"
        );
    }
}
