//! Command implementations
//!
//! Each command resolves its positional arguments against the global
//! `--container`, connects a [`Client`] and reports through the
//! [`Formatter`]. Errors are mapped to [`ExitCode`]s here.

pub mod completions;
pub mod create;
pub mod download;
pub mod info;
pub mod list;
pub mod remove;
pub mod upload;

use sel_core::{Config, ConfigManager, Credentials};
use sel_storage::{Client, ClientBuilder};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Options shared by every command that talks to the storage
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub user: Option<String>,
    pub key: Option<String>,
    pub container: Option<String>,
}

/// Loaded settings plus the global flags
#[derive(Debug, Clone)]
pub struct Context {
    pub globals: GlobalArgs,
    pub config: Config,
}

impl Context {
    /// Read the config file. A missing file gives defaults.
    pub fn load(globals: GlobalArgs, formatter: &Formatter) -> Result<Self, ExitCode> {
        let config = ConfigManager::new().and_then(|manager| manager.load());
        match config {
            Ok(config) => Ok(Self { globals, config }),
            Err(e) => {
                formatter.error(&format!("Failed to load config: {e}"));
                Err(ExitCode::GeneralError)
            }
        }
    }

    /// Container from `--container` / `SELECTEL_CONTAINER`, else from config
    pub fn default_container(&self) -> Option<&str> {
        self.globals
            .container
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.config.default_container.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// Authenticate and return a ready client
    pub async fn connect(&self, formatter: &Formatter) -> Result<Client, ExitCode> {
        let credentials = Credentials::new(
            self.globals.user.as_deref().unwrap_or_default(),
            self.globals.key.as_deref().unwrap_or_default(),
        )
        .map_err(|e| fail(formatter, "Missing credentials (set --user/--key)", &e))?;

        ClientBuilder::from_config(&self.config)
            .credentials(credentials)
            .connect()
            .await
            .map_err(|e| fail(formatter, "Failed to connect", &e))
    }
}

/// Report `error` with some context and pick the exit code for it
pub fn fail(formatter: &Formatter, context: &str, error: &sel_core::Error) -> ExitCode {
    formatter.error(&format!("{context}: {error}"));
    ExitCode::from_error(error)
}

/// Report a missing positional argument
pub fn not_enough(formatter: &Formatter, usage: &str) -> ExitCode {
    formatter.error(&format!("Not enough arguments, usage: {usage}"));
    ExitCode::UsageError
}

/// Split `[container] <item>` style arguments.
///
/// One argument names the item and the container comes from `default`; two
/// arguments name both.
pub fn container_and_item(args: &[String], default: Option<&str>) -> Option<(String, String)> {
    match args {
        [item] => default.map(|c| (c.to_string(), item.clone())),
        [container, item] => Some((container.clone(), item.clone())),
        _ => None,
    }
    .filter(|(c, i)| !c.is_empty() && !i.is_empty())
}
