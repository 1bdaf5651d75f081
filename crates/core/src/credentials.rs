//! Account credentials

use std::fmt;

use crate::error::{Error, Result};

/// Environment variable holding the storage user name
pub const ENV_USER: &str = "SELECTEL_USER";

/// Environment variable holding the storage key
pub const ENV_KEY: &str = "SELECTEL_KEY";

/// User name and key used to obtain a bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    key: String,
}

impl Credentials {
    /// Create credentials, rejecting an empty user or key
    pub fn new(user: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let user = user.into();
        let key = key.into();
        if user.is_empty() || key.is_empty() {
            return Err(Error::BadCredentials);
        }
        Ok(Self { user, key })
    }

    /// Read credentials from `SELECTEL_USER` and `SELECTEL_KEY`
    pub fn from_env() -> Result<Self> {
        let user = std::env::var(ENV_USER).unwrap_or_default();
        let key = std::env::var(ENV_KEY).unwrap_or_default();
        Self::new(user, key)
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("key", &"<redacted>")
            .finish()
    }
}
