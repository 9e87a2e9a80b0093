//! Unified error type for the bot.
//!
//! Startup errors (configuration, client construction) bubble out of `main`.
//! Errors returned by command handlers are classified by the interaction
//! dispatcher and never terminate the process.

use crate::core::{failure::FailureKind, lifecycle::HostState};
use thiserror::Error;

/// Every error the bot can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (config files, log files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Malformed TOML configuration
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The registration target guild id is missing or not a snowflake
    #[error("Invalid guild id: {0}")]
    GuildId(String),

    /// A host state change that the lifecycle does not allow
    #[error("Illegal lifecycle transition: {from} -> {to}")]
    Lifecycle {
        /// State the host was in
        from: HostState,
        /// State that was requested
        to: HostState,
    },

    /// A command ran but could not complete its work
    #[error("{0}")]
    Unsuccessful(String),

    /// Error raised by serenity or poise
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Classification of this error when it escapes a command handler.
    #[must_use]
    pub const fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Unsuccessful(_) => FailureKind::Unsuccessful,
            _ => FailureKind::Exception,
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsuccessful_maps_to_unsuccessful_kind() {
        let error = Error::Unsuccessful("nothing to do".to_string());
        assert_eq!(error.failure_kind(), FailureKind::Unsuccessful);
        assert_eq!(error.to_string(), "nothing to do");
    }

    #[test]
    fn test_other_errors_map_to_exception_kind() {
        let errors = [
            Error::Config("missing token".to_string()),
            Error::GuildId("abc".to_string()),
            Error::Io(std::io::Error::other("disk gone")),
        ];
        for error in errors {
            assert_eq!(error.failure_kind(), FailureKind::Exception);
        }
    }

    #[test]
    fn test_lifecycle_error_message() {
        let error = Error::Lifecycle {
            from: HostState::Stopped,
            to: HostState::Running,
        };
        assert_eq!(
            error.to_string(),
            "Illegal lifecycle transition: Stopped -> Running"
        );
    }
}
