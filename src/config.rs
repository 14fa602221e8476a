//! Detector Configuration
//!
//! Configuration for the detector, the synthesizer, and the HTTP
//! service. Loadable from a kebab-case JSON file; every section and
//! field has an explicit default so a partial file works.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DetectorError, Result};

/// Top-level detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetectorConfig {
    /// Path the trained model artifact is persisted to and loaded from
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Dataset CSV the train endpoint prefers when the file exists
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,
    /// Training hyperparameters
    #[serde(default)]
    pub training: TrainingConfig,
    /// Synthetic dataset defaults
    #[serde(default)]
    pub synth: SynthConfig,
    /// HTTP service settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            dataset_path: default_dataset_path(),
            training: TrainingConfig::default(),
            synth: SynthConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| DetectorError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DetectorError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Training hyperparameters for the random forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrainingConfig {
    /// Number of bootstrap trees
    #[serde(default = "default_trees")]
    pub trees: usize,
    /// Maximum depth per tree
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Minimum samples each side of a split must retain
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Fraction of rows held out for the accuracy report
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 12,
            min_samples_leaf: 2,
            test_fraction: 0.2,
        }
    }
}

/// Defaults for synthesized datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SynthConfig {
    /// Number of URLs to synthesize
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Fraction of phishing URLs (0.0 - 1.0)
    #[serde(default = "default_phishing_ratio")]
    pub phishing_ratio: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            samples: 2000,
            phishing_ratio: 0.5,
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address the API server binds to
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("phishing_model.json")
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("phishing_dataset.csv")
}

fn default_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    12
}

fn default_min_samples_leaf() -> usize {
    2
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_samples() -> usize {
    2000
}

fn default_phishing_ratio() -> f64 {
    0.5
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_body_size() -> usize {
    64 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: DetectorConfig =
            serde_json::from_str(r#"{"model-path": "custom.json", "training": {"trees": 5}}"#)
                .unwrap();
        assert_eq!(config.model_path, PathBuf::from("custom.json"));
        assert_eq!(config.training.trees, 5);
        assert_eq!(config.training.max_depth, 12);
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn defaults_round_trip_through_json() {
        let config = DetectorConfig::default();
        let raw = serde_json::to_string(&config).unwrap();
        let back: DetectorConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.synth.samples, config.synth.samples);
        assert_eq!(back.training.test_fraction, config.training.test_fraction);
    }
}
