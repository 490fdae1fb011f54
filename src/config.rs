//! Per-session limits.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::types::{
    TuringMachineError, DEFAULT_MAX_HISTORY, DEFAULT_MAX_STEPS, DEFAULT_TAPE_PADDING,
    MAX_TAPE_PADDING,
};

/// Limits applied by a [`crate::session::Session`].
///
/// Every field is optional in serialized form and falls back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of snapshots kept for undo. Must be at least 1.
    pub max_history: usize,
    /// Step budget used by `run` when the caller does not give one.
    pub max_steps: usize,
    /// Blank cells shown on each side of the tape window, at most [`MAX_TAPE_PADDING`].
    pub tape_padding: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            max_steps: DEFAULT_MAX_STEPS,
            tape_padding: DEFAULT_TAPE_PADDING,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a configuration from JSON.
    pub fn from_json(input: &str) -> Result<Self, TuringMachineError> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| TuringMachineError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every limit is in range.
    pub fn validate(&self) -> Result<(), TuringMachineError> {
        if self.max_history == 0 {
            return Err(TuringMachineError::ConfigError(
                "max_history must be at least 1".to_string(),
            ));
        }
        if self.tape_padding > MAX_TAPE_PADDING {
            return Err(TuringMachineError::ConfigError(format!(
                "tape_padding must be at most {}, got {}",
                MAX_TAPE_PADDING, self.tape_padding
            )));
        }
        Ok(())
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = SessionConfig::from_json(r#"{"max_steps": 50}"#).unwrap();

        assert_eq!(config.max_steps, 50);
        assert_eq!(config.max_history, DEFAULT_MAX_HISTORY);
        assert_eq!(config.tape_padding, DEFAULT_TAPE_PADDING);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"max_history": 10, "tape_padding": 0}"#)
            .unwrap();

        let config = SessionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_history, 10);
        assert_eq!(config.tape_padding, 0);
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn test_zero_history_is_rejected() {
        let result = SessionConfig::from_json(r#"{"max_history": 0}"#);
        assert!(matches!(result, Err(TuringMachineError::ConfigError(_))));
    }

    #[test]
    fn test_padding_is_bounded() {
        let at_limit = format!(r#"{{"tape_padding": {}}}"#, MAX_TAPE_PADDING);
        assert!(SessionConfig::from_json(&at_limit).is_ok());

        let config = SessionConfig {
            tape_padding: usize::MAX,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TuringMachineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        let result = SessionConfig::from_json(r#"{"max_steps": "many"}"#);
        assert!(matches!(result, Err(TuringMachineError::ConfigError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SessionConfig::from_file(Path::new("/nonexistent/tutor.json"));
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }
}
