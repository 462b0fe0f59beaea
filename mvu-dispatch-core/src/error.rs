//! Error types for binding and dispatch

use thiserror::Error;

/// Errors raised synchronously by dispatch and by [`AsyncResult`](crate::AsyncResult).
///
/// The first three variants are caller-configuration defects: they are raised
/// before the action touches any model and are never retried. `InvalidState`
/// is a programming defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// An async action was dispatched while the session has no push channel.
    #[error("asynchronous action `{action}` requires an active push/refresh channel")]
    PushInactive { action: &'static str },

    /// An async action was sent to a sink that does not own a model.
    #[error("asynchronous action `{action}` was sent to a sink with no bound model")]
    Unbound { action: &'static str },

    /// An async action was dispatched but no runtime is available to run it.
    #[error("asynchronous action `{action}` requires a tokio runtime to perform on")]
    NoRuntime { action: &'static str },

    /// A value was requested from the unpopulated side of an `AsyncResult`.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

impl BindError {
    /// Whether this error stems from how the session was configured.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, BindError::InvalidState(_))
    }
}

/// Errors raised while loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown push mode `{0}` (expected disabled, manual or automatic)")]
    UnknownPushMode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(BindError::PushInactive { action: "Load" }.is_configuration());
        assert!(BindError::Unbound { action: "Load" }.is_configuration());
        assert!(BindError::NoRuntime { action: "Load" }.is_configuration());
        assert!(!BindError::InvalidState("left").is_configuration());
    }

    #[test]
    fn test_push_inactive_message() {
        let err = BindError::PushInactive { action: "Load" };
        assert_eq!(
            err.to_string(),
            "asynchronous action `Load` requires an active push/refresh channel"
        );
    }
}
