//! Command failure taxonomy.
//!
//! Every unsuccessful command execution is reduced to one [`FailureKind`] and a
//! human readable reason. The kind drives logging; the reason is shown to the
//! invoking user in an ephemeral reply.

use std::fmt;

/// Prefix of the user-visible failure reply ("failed").
pub const FAILURE_PREFIX: &str = "失敗";

/// Closed set of outcomes for a command execution that did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A check, permission, cooldown or channel restriction was not met
    UnmetPrecondition,
    /// The invocation did not carry the arguments the command expects
    BadArgs,
    /// An argument could not be converted to its parameter type
    ConvertFailed,
    /// The handler returned an error or panicked
    Exception,
    /// The interaction payload did not match the command's structure
    ParseFailed,
    /// The handler ran but reported that it could not do its work
    Unsuccessful,
}

impl FailureKind {
    /// Name used in log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnmetPrecondition => "UnmetPrecondition",
            Self::BadArgs => "BadArgs",
            Self::ConvertFailed => "ConvertFailed",
            Self::Exception => "Exception",
            Self::ParseFailed => "ParseFailed",
            Self::Unsuccessful => "Unsuccessful",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified command failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// What went wrong
    pub kind: FailureKind,
    /// Why, in words suitable for the invoking user
    pub reason: String,
}

impl Failure {
    /// Creates a failure of the given kind.
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// The ephemeral message sent back to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        format!("{FAILURE_PREFIX}: {}", self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_format() {
        let failure = Failure::new(FailureKind::Exception, "Object reference not set");
        assert_eq!(failure.user_message(), "失敗: Object reference not set");
    }

    #[test]
    fn test_user_message_with_empty_reason() {
        let failure = Failure::new(FailureKind::Unsuccessful, "");
        assert_eq!(failure.user_message(), "失敗: ");
    }

    #[test]
    fn test_kind_names() {
        let kinds = [
            (FailureKind::UnmetPrecondition, "UnmetPrecondition"),
            (FailureKind::BadArgs, "BadArgs"),
            (FailureKind::ConvertFailed, "ConvertFailed"),
            (FailureKind::Exception, "Exception"),
            (FailureKind::ParseFailed, "ParseFailed"),
            (FailureKind::Unsuccessful, "Unsuccessful"),
        ];
        for (kind, name) in kinds {
            assert_eq!(kind.to_string(), name);
        }
    }
}
