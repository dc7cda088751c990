use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bounds an image must satisfy before the heuristic tier will score it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationLimits {
    /// Minimum width and height in pixels.
    pub min_dimension: u32,
    /// Maximum encoded size in bytes.
    pub max_file_size: usize,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        ValidationLimits {
            min_dimension: 200,
            max_file_size: 10 * 1024 * 1024,
            min_aspect_ratio: 0.333,
            max_aspect_ratio: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Upper bound on the extractor's one-time initialization.
    pub warmup_timeout_ms: u64,
    /// Upper bound on a single landmark extraction.
    pub extraction_timeout_ms: u64,
    pub limits: ValidationLimits,
    /// Report heuristic validation failures to the caller instead of
    /// answering with the safe default.
    pub strict_validation: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            warmup_timeout_ms: 10_000,
            extraction_timeout_ms: 30_000,
            limits: ValidationLimits::default(),
            strict_validation: false,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn warmup_timeout(&self) -> Duration {
        Duration::from_millis(self.warmup_timeout_ms)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_millis(self.extraction_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.warmup_timeout_ms == 0 || self.extraction_timeout_ms == 0 {
            return Err(Error::InvalidConfig("timeouts must be non-zero".into()));
        }
        let limits = &self.limits;
        if limits.min_dimension == 0 {
            return Err(Error::InvalidConfig("min_dimension must be non-zero".into()));
        }
        if !(limits.min_aspect_ratio > 0.0 && limits.min_aspect_ratio < limits.max_aspect_ratio) {
            return Err(Error::InvalidConfig(format!(
                "aspect ratio bounds [{}, {}] are not an increasing positive range",
                limits.min_aspect_ratio, limits.max_aspect_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.warmup_timeout(), Duration::from_secs(10));
        assert_eq!(config.extraction_timeout(), Duration::from_secs(30));
        assert_eq!(config.limits.max_file_size, 10_485_760);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{"strict_validation": true, "limits": {"min_dimension": 300}}"#)
                .unwrap();
        assert!(config.strict_validation);
        assert_eq!(config.limits.min_dimension, 300);
        assert_eq!(config.limits.max_aspect_ratio, 3.0);
        assert_eq!(config.extraction_timeout_ms, 30_000);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AnalyzerConfig::default();
        config.extraction_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = AnalyzerConfig::default();
        config.limits.min_aspect_ratio = 4.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join("face_shape_config_test.json");
        std::fs::write(&path, r#"{"warmup_timeout_ms": 15000}"#).unwrap();
        let config = AnalyzerConfig::from_json_file(&path).unwrap();
        assert_eq!(config.warmup_timeout_ms, 15_000);
        std::fs::remove_file(path).ok();
    }
}
