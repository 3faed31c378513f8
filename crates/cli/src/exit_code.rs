//! Exit codes of the sd CLI
//!
//! Scripts branch on these values; changing one is a breaking change.
//! 4 is unused on purpose so the codes stay aligned with the core error
//! classification.

use sd_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Anything without a more specific code, including local I/O failures
    GeneralError = 1,

    /// Invalid arguments, a malformed drive path or a bad configuration
    UsageError = 2,

    /// The repository behind a drive could not be reached or read
    BackendError = 3,

    /// The drive or an object on it does not exist
    NotFound = 5,

    /// A name clash or a placement the hierarchy does not allow
    Conflict = 6,

    /// The object lacks the capability the command needs
    UnsupportedOperation = 7,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a core error
    pub fn from_error(error: &Error) -> Self {
        Self::try_from(error.exit_code()).unwrap_or(Self::GeneralError)
    }
}

impl TryFrom<i32> for ExitCode {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, i32> {
        Ok(match code {
            0 => Self::Success,
            1 => Self::GeneralError,
            2 => Self::UsageError,
            3 => Self::BackendError,
            5 => Self::NotFound,
            6 => Self::Conflict,
            7 => Self::UnsupportedOperation,
            other => return Err(other),
        })
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_i32() {
        for code in [
            ExitCode::Success,
            ExitCode::GeneralError,
            ExitCode::UsageError,
            ExitCode::BackendError,
            ExitCode::NotFound,
            ExitCode::Conflict,
            ExitCode::UnsupportedOperation,
        ] {
            assert_eq!(ExitCode::try_from(i32::from(code)), Ok(code));
        }
        assert_eq!(ExitCode::try_from(4), Err(4));
    }

    #[test]
    fn test_exit_code_from_error() {
        let cases = [
            (Error::ObjectNotFound("a".into()), ExitCode::NotFound),
            (Error::DriveNotFound("d".into()), ExitCode::NotFound),
            (Error::InvalidHierarchy("a".into()), ExitCode::Conflict),
            (Error::Conflict("a".into()), ExitCode::Conflict),
            (Error::UnsupportedOperation("a".into()), ExitCode::UnsupportedOperation),
            (Error::InvalidArgument("a".into()), ExitCode::UsageError),
            (Error::InvalidPath("a".into()), ExitCode::UsageError),
            (Error::BackendUnavailable("a".into()), ExitCode::BackendError),
            (Error::Io(std::io::Error::other("disk")), ExitCode::GeneralError),
        ];
        for (error, expected) in cases {
            assert_eq!(ExitCode::from_error(&error), expected, "{error}");
        }
    }
}
