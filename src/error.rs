use thiserror::Error;

/// Boxed error returned by callbacks, callables and argument sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Callback for '{key}' failed: {source}")]
    Callback { key: String, source: BoxError },

    #[error("Failed to read command-line arguments: {0}")]
    ArgSource(#[source] BoxError),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to convert JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a table at the top level, found {found}")]
    NotATable { found: &'static str },

    #[error("Argument '{key}' is a nested {found}; command-line arguments must be flat")]
    NestedArgument { key: String, found: &'static str },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),
}

impl MergeError {
    /// The key whose callback failed, if this is a callback error.
    pub fn key(&self) -> Option<&str> {
        match self {
            MergeError::Callback { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_error_formats_key_and_cause() {
        let err = MergeError::Callback {
            key: "proxy".into(),
            source: "missing port".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("proxy"));
        assert!(msg.contains("missing port"));
        assert_eq!(err.key(), Some("proxy"));
    }

    #[test]
    fn callback_error_keeps_source() {
        let err = MergeError::Callback {
            key: "files".into(),
            source: "bad glob".into(),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "bad glob");
    }

    #[test]
    fn arg_source_error_formats() {
        let err = MergeError::ArgSource("argv unavailable".into());
        assert!(err.to_string().contains("argv unavailable"));
        assert_eq!(err.key(), None);
    }

    #[test]
    fn nested_argument_formats() {
        let err = MergeError::NestedArgument {
            key: "server".into(),
            found: "table",
        };
        let msg = err.to_string();
        assert!(msg.contains("server"));
        assert!(msg.contains("table"));
    }

    #[test]
    fn not_a_table_formats() {
        let err = MergeError::NotATable { found: "array" };
        assert!(err.to_string().contains("array"));
    }
}
