//! Session configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::session::PushMode;

/// Environment variable that overrides [`SessionConfig::push`].
pub const PUSH_ENV: &str = "MVU_PUSH";

/// How a rendering session delivers models.
///
/// ```json
/// { "push": "automatic" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub push: PushMode,
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading session config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Apply `MVU_PUSH` if it is set.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(PUSH_ENV) {
            self.push = value.parse()?;
            debug!(push = %self.push, "Push mode overridden from environment");
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_disabled() {
        assert_eq!(SessionConfig::default().push, PushMode::Disabled);
        assert_eq!(
            SessionConfig::from_json_str("{}").unwrap(),
            SessionConfig::default()
        );
    }

    #[test]
    fn test_parse_json() {
        let config = SessionConfig::from_json_str(r#"{ "push": "manual" }"#).unwrap();
        assert_eq!(config.push, PushMode::Manual);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = SessionConfig::from_json_str(r#"{ "pusher": "manual" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = SessionConfig::from_json_str(r#"{ "push": "eventually" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!("mvu-session-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{ "push": "automatic" }"#).unwrap();
        drop(file);

        let config = SessionConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.push, PushMode::Automatic);
    }

    #[test]
    fn test_missing_file() {
        let err = SessionConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_overrides() {
        let config = SessionConfig::default()
            .with_overrides_from(|key| (key == PUSH_ENV).then(|| "auto".to_string()))
            .unwrap();
        assert_eq!(config.push, PushMode::Automatic);

        let untouched = SessionConfig { push: PushMode::Manual }
            .with_overrides_from(|_| None)
            .unwrap();
        assert_eq!(untouched.push, PushMode::Manual);

        let err = SessionConfig::default()
            .with_overrides_from(|_| Some("sideways".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPushMode(m) if m == "sideways"));
    }
}
