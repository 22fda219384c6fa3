//! Exit codes for the topic2csv CLI.
//!
//! Exit codes communicate outcome without requiring output parsing.

use t2c_common::Error;

/// Exit codes for topic2csv runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Clean shutdown, including user-initiated interrupt.
    Clean = 0,

    /// Setup error (bad topic type, unusable destination).
    ConfigError = 10,

    /// I/O error while recording.
    IoError = 13,

    /// Internal/unknown error.
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidTopicType(_) | Error::Setup(_) => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
            Error::RecorderClosed => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ExitCode::from(&Error::InvalidTopicType("x".into())),
            ExitCode::ConfigError
        );
        let io = Error::Io(std::io::Error::other("disk full"));
        assert_eq!(ExitCode::from(&io), ExitCode::IoError);
        assert_eq!(ExitCode::from(&Error::RecorderClosed), ExitCode::InternalError);
    }

    #[test]
    fn test_clean_is_zero() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
    }
}
