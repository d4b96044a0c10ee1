//! Tunables for a plan's channels.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result, ResultExt};

/// Default number of undelivered messages buffered per subscriber.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;

/// Default number of emitted messages waiting for the broadcast loop.
pub const DEFAULT_INTAKE_CAPACITY: usize = 64;

/// Largest accepted subscriber capacity. Every subscriber allocates its
/// whole buffer up front.
pub const MAX_SUBSCRIBER_CAPACITY: usize = 1 << 16;

/// Largest accepted intake capacity.
pub const MAX_INTAKE_CAPACITY: usize = 1 << 16;

/// Channel sizing for an [`crate::ActivePlan`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlanConfig {
    /// Messages buffered per subscriber before the oldest is dropped
    pub subscriber_capacity: usize,
    /// Messages buffered between producers and the broadcast loop before
    /// `emit` applies backpressure
    pub intake_capacity: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
        }
    }
}

impl PlanConfig {
    /// Reads a JSON config file. Missing fields fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::FileSystem` if the file cannot be read,
    /// `PlanError::Configuration` if it is not valid JSON and
    /// `PlanError::InvalidInput` if a capacity is zero.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PlanError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: PlanConfig =
            serde_json::from_str(&raw).with_context(format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `$XDG_CONFIG_HOME/plancast/config.json` if it exists, otherwise
    /// returns the defaults.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Location of the user config file following the XDG Base Directory
    /// specification, if one exists.
    pub fn default_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("plancast").find_config_file("config.json")
    }

    /// Checks that both capacities are within `1..=MAX_*_CAPACITY`.
    pub fn validate(&self) -> Result<()> {
        check_capacity(
            "subscriber_capacity",
            self.subscriber_capacity,
            MAX_SUBSCRIBER_CAPACITY,
        )?;
        check_capacity("intake_capacity", self.intake_capacity, MAX_INTAKE_CAPACITY)
    }

    /// Overrides the subscriber capacity.
    pub fn with_subscriber_capacity(mut self, capacity: usize) -> Self {
        self.subscriber_capacity = capacity;
        self
    }

    /// Overrides the intake capacity.
    pub fn with_intake_capacity(mut self, capacity: usize) -> Self {
        self.intake_capacity = capacity;
        self
    }
}

fn check_capacity(field: &str, value: usize, max: usize) -> Result<()> {
    if value == 0 {
        return Err(PlanError::invalid_input(field).with_reason("must be at least 1"));
    }
    if value > max {
        return Err(PlanError::invalid_input(field).with_reason(format!("must be at most {max}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"subscriber_capacity": 8}"#).unwrap();

        let config = PlanConfig::load(&path).expect("Failed to load config");
        assert_eq!(config.subscriber_capacity, 8);
        assert_eq!(config.intake_capacity, DEFAULT_INTAKE_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"intake_capacity": 0}"#).unwrap();

        let result = PlanConfig::load(&path);
        assert!(matches!(result, Err(PlanError::InvalidInput { ref field, .. }) if field == "intake_capacity"));
    }

    #[test]
    fn test_oversized_capacity_is_rejected() {
        let intake = PlanConfig::default().with_intake_capacity(usize::MAX / 2);
        assert!(matches!(
            intake.validate(),
            Err(PlanError::InvalidInput { ref field, .. }) if field == "intake_capacity"
        ));

        let subscriber = PlanConfig::default().with_subscriber_capacity(MAX_SUBSCRIBER_CAPACITY + 1);
        assert!(matches!(
            subscriber.validate(),
            Err(PlanError::InvalidInput { ref field, .. }) if field == "subscriber_capacity"
        ));

        let largest = PlanConfig::default()
            .with_subscriber_capacity(MAX_SUBSCRIBER_CAPACITY)
            .with_intake_capacity(MAX_INTAKE_CAPACITY);
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_a_configuration_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            PlanConfig::load(&path),
            Err(PlanError::Configuration { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_a_file_system_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = PlanConfig::load(&temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(PlanError::FileSystem { .. })));
    }
}
