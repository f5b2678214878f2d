use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Error type shared by the transport client, the entity stores and the
/// subscription service. `Display` for the first three variants is the
/// message itself, so callers can surface it to a user verbatim.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Backend answered with a non-success status. Carries the best-effort
    /// human message extracted from the `{ "error": ... }` envelope, or the
    /// `<status> <reason>` fallback when the body was not usable.
    #[error("{message}")]
    Transport { message: String },

    /// Input rejected locally, before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// The match quota is exhausted for the current billing period.
    #[error("{0}")]
    Quota(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ConsoleError {
    pub fn transport(message: impl Into<String>) -> Self {
        ConsoleError::Transport {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConsoleError::Validation(message.into())
    }

    /// True when the error should be presented as an upgrade prompt rather
    /// than a failure.
    pub fn is_quota(&self) -> bool {
        matches!(self, ConsoleError::Quota(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_display_is_the_bare_message() {
        let err = ConsoleError::transport("resume not found");
        assert_eq!(err.to_string(), "resume not found");
    }

    #[test]
    fn quota_errors_are_distinguishable() {
        assert!(ConsoleError::Quota("limit reached".into()).is_quota());
        assert!(!ConsoleError::validation("missing field").is_quota());
    }
}
