//! Process exit codes
//!
//! | code | meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | general error |
//! | 2 | usage error (bad arguments or names) |
//! | 3 | network error |
//! | 4 | authentication error |
//! | 5 | container or object not found |
//! | 6 | conflict (container not empty) |

/// Exit codes returned by `selctl`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    UsageError = 2,
    NetworkError = 3,
    AuthError = 4,
    NotFound = 5,
    Conflict = 6,
}

impl ExitCode {
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::Conflict),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a library error
    pub fn from_error(error: &sel_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}
