// Runtime configuration
//
// Limits and defaults for a `Context`. Every field has a default, so an empty
// JSON object is a valid configuration.

use serde::de::{Error as _, Unexpected};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid runtime configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("gensym prefix must not be empty")]
    EmptyGensymPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Largest number of elements, and of array nodes, a single
    /// `create-array` may allocate.
    pub max_array_elements: usize,
    /// Buffer size of writer-backed output streams. Zero writes through.
    pub stream_buffer_capacity: usize,
    /// Name prefix of symbols minted by `gensym`.
    pub gensym_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_array_elements: 16 * 1024 * 1024,
            stream_buffer_capacity: 8 * 1024,
            gensym_prefix: "#:".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a JSON object. Positional (array) input is refused even though
    /// the derived deserializer would map it onto the fields in order.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let unexpected = match &value {
            serde_json::Value::Object(_) => None,
            serde_json::Value::Array(_) => Some(Unexpected::Seq),
            serde_json::Value::Null => Some(Unexpected::Unit),
            serde_json::Value::Bool(b) => Some(Unexpected::Bool(*b)),
            serde_json::Value::Number(_) => Some(Unexpected::Other("number")),
            serde_json::Value::String(s) => Some(Unexpected::Str(s)),
        };
        if let Some(unexpected) = unexpected {
            return Err(serde_json::Error::invalid_type(unexpected, &"a JSON object").into());
        }
        let config = RuntimeConfig::deserialize(value)?;
        if config.gensym_prefix.is_empty() {
            return Err(ConfigError::EmptyGensymPrefix);
        }
        log::debug!("loaded runtime config: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = RuntimeConfig::from_json("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = RuntimeConfig::from_json(r#"{"max_array_elements": 10}"#).unwrap();
        assert_eq!(config.max_array_elements, 10);
        assert_eq!(config.gensym_prefix, "#:");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            RuntimeConfig::from_json("[1, 2]"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(RuntimeConfig::from_json("7"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            RuntimeConfig::from_json(r#"{"max_array_elements": "many"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_json(r#"{"gensym_prefix": ""}"#),
            Err(ConfigError::EmptyGensymPrefix)
        ));
    }
}
