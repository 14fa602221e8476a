//! URL Detector
//!
//! The train/load/predict wrapper around the feature extractor and the
//! random forest. The loaded model is an immutable [`ModelArtifact`]
//! behind an atomically swapped `Arc` handle: a prediction clones the
//! handle out and can never observe a half-written model, and a retrain
//! replaces the handle in one swap.
//!
//! Predicting without a model is a structured [`DetectorError::ModelNotLoaded`]
//! rather than an implicit retrain; callers decide when training happens.

use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::config::DetectorConfig;
use crate::dataset::Dataset;
use crate::error::{DetectorError, Result};
use crate::features::{self, FeatureSchema, UrlFeatures};
use crate::ml::{train_test_split, ForestParams, RandomForest};

/// Model artifact format version this build reads and writes.
pub const ARTIFACT_VERSION: u32 = 1;

/// Classification verdict for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Legitimate,
    Phishing,
}

impl Verdict {
    pub fn is_phishing(self) -> bool {
        matches!(self, Verdict::Phishing)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Phishing => write!(f, "Phishing URL"),
            Verdict::Legitimate => write!(f, "Legitimate URL"),
        }
    }
}

/// Prediction for a single URL.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub verdict: Verdict,
    /// Winning-class probability, always in [0.5, 1.0]
    pub confidence: f64,
    /// Features the verdict was computed from
    pub features: UrlFeatures,
}

/// Training provenance recorded inside the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Unix timestamp of the training run
    pub trained_at: u64,
    /// Total samples in the training dataset
    pub samples: usize,
    /// Hold-out accuracy reported at training time
    pub accuracy: f64,
}

/// Persisted model: versioned forest plus the schema it was trained
/// with. Loading validates the version and schema before the artifact
/// can serve predictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema: FeatureSchema,
    pub forest: RandomForest,
    pub metadata: ModelMetadata,
}

/// Report returned by a training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Accuracy on the held-out rows (training rows when the dataset is
    /// too small to hold any out)
    pub accuracy: f64,
    pub model_path: PathBuf,
}

/// URL phishing detector with an atomically swappable model handle.
pub struct UrlDetector {
    config: DetectorConfig,
    model: RwLock<Option<Arc<ModelArtifact>>>,
}

impl UrlDetector {
    /// Create an unloaded detector.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            model: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// True when a model is loaded and predictions are available.
    pub fn is_loaded(&self) -> bool {
        self.model.read().is_some()
    }

    /// Clone out the current model handle, if any.
    pub fn model(&self) -> Option<Arc<ModelArtifact>> {
        self.model.read().clone()
    }

    /// Load and validate a model artifact from disk.
    ///
    /// On any failure the previous state is left untouched.
    pub fn load(&self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path).map_err(|source| DetectorError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(DetectorError::ModelFormat)?;

        validate_artifact(&artifact)?;

        info!(
            path = %path.display(),
            samples = artifact.metadata.samples,
            accuracy = artifact.metadata.accuracy,
            trees = artifact.forest.tree_count(),
            "model loaded"
        );
        *self.model.write() = Some(Arc::new(artifact));
        Ok(())
    }

    /// Write the current artifact to disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        let artifact = self.model().ok_or(DetectorError::ModelNotLoaded)?;
        write_artifact(&artifact, path)
    }

    /// Train a forest on the dataset, persist the artifact to the
    /// configured model path, and swap it in.
    pub fn train<R: Rng>(&self, dataset: &Dataset, rng: &mut R) -> Result<TrainingReport> {
        if dataset.is_empty() {
            return Err(DetectorError::EmptyDataset);
        }

        let schema = FeatureSchema::canonical();
        let (x, y) = dataset.matrix(&schema);
        let (train_idx, test_idx) =
            train_test_split(x.len(), self.config.training.test_fraction, rng);

        let train_x: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
        let train_y: Vec<u8> = train_idx.iter().map(|&i| y[i]).collect();

        let params = ForestParams {
            trees: self.config.training.trees,
            max_depth: self.config.training.max_depth,
            min_samples_leaf: self.config.training.min_samples_leaf,
        };
        let forest = RandomForest::fit(&train_x, &train_y, &params, rng);

        let accuracy = if test_idx.is_empty() {
            warn!("dataset too small to hold out test rows, reporting training accuracy");
            forest.accuracy(&train_x, &train_y)
        } else {
            let test_x: Vec<Vec<f64>> = test_idx.iter().map(|&i| x[i].clone()).collect();
            let test_y: Vec<u8> = test_idx.iter().map(|&i| y[i]).collect();
            forest.accuracy(&test_x, &test_y)
        };

        info!(
            samples = dataset.len(),
            train_samples = train_x.len(),
            test_samples = test_idx.len(),
            accuracy,
            trees = params.trees,
            "model trained"
        );

        let artifact = ModelArtifact {
            format_version: ARTIFACT_VERSION,
            schema,
            forest,
            metadata: ModelMetadata {
                trained_at: unix_now(),
                samples: dataset.len(),
                accuracy,
            },
        };

        write_artifact(&artifact, &self.config.model_path)?;
        *self.model.write() = Some(Arc::new(artifact));

        Ok(TrainingReport {
            samples: dataset.len(),
            train_samples: train_x.len(),
            test_samples: test_idx.len(),
            accuracy,
            model_path: self.config.model_path.clone(),
        })
    }

    /// Classify a URL.
    ///
    /// Requires a loaded model; the URL is scheme-normalized, features
    /// are extracted and projected through the trained schema, and the
    /// confidence is the winning class's averaged probability.
    pub fn predict(&self, url: &str) -> Result<Prediction> {
        let model = self.model().ok_or(DetectorError::ModelNotLoaded)?;

        let normalized = features::normalize_url(url);
        let extracted = features::extract(&normalized);
        let row = model.schema.project(&extracted);

        let p_phishing = model.forest.predict_proba(&row);
        let (verdict, confidence) = if p_phishing >= 0.5 {
            (Verdict::Phishing, p_phishing)
        } else {
            (Verdict::Legitimate, 1.0 - p_phishing)
        };

        Ok(Prediction {
            verdict,
            confidence,
            features: extracted,
        })
    }
}

fn validate_artifact(artifact: &ModelArtifact) -> Result<()> {
    if artifact.format_version != ARTIFACT_VERSION {
        return Err(DetectorError::ModelVersion {
            expected: ARTIFACT_VERSION,
            found: artifact.format_version,
        });
    }
    if artifact.schema.is_empty() {
        return Err(DetectorError::EmptySchema);
    }
    if artifact.schema != FeatureSchema::canonical() {
        warn!("artifact schema differs from the canonical order; projections follow the artifact");
    }
    Ok(())
}

fn write_artifact(artifact: &ModelArtifact, path: &Path) -> Result<()> {
    let raw = serde_json::to_string(artifact).map_err(DetectorError::ModelFormat)?;
    fs::write(path, raw).map_err(|source| DetectorError::ModelIo {
        path: path.to_path_buf(),
        source,
    })
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn temp_model_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("phishguard-{}-{}.json", name, std::process::id()))
    }

    fn small_config(name: &str) -> DetectorConfig {
        let mut config = DetectorConfig::default();
        config.model_path = temp_model_path(name);
        config.training.trees = 15;
        config
    }

    fn seeded_dataset(samples: usize) -> Dataset {
        let mut rng = StdRng::seed_from_u64(17);
        Dataset::from_labeled_urls(crate::synth::generate(samples, 0.5, &mut rng))
    }

    #[test]
    fn predict_without_model_is_a_structured_error() {
        let detector = UrlDetector::new(small_config("unloaded"));
        let err = detector.predict("http://example.com").unwrap_err();
        assert!(matches!(err, DetectorError::ModelNotLoaded));
    }

    #[test]
    fn train_then_predict_reports_confident_verdicts() {
        let detector = UrlDetector::new(small_config("train-predict"));
        let mut rng = StdRng::seed_from_u64(23);
        let report = detector.train(&seeded_dataset(300), &mut rng).unwrap();

        assert_eq!(report.samples, 300);
        assert!((0.0..=1.0).contains(&report.accuracy));

        let prediction = detector.predict("http://192.168.1.1/login.php").unwrap();
        assert!((0.5..=1.0).contains(&prediction.confidence));
        assert_eq!(prediction.features.has_ip_address, 1);

        let _ = fs::remove_file(&detector.config().model_path);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let path = temp_model_path("bad-version");
        let detector = UrlDetector::new(small_config("bad-version-detector"));
        let mut rng = StdRng::seed_from_u64(29);
        detector.train(&seeded_dataset(100), &mut rng).unwrap();

        let artifact = detector.model().unwrap();
        let mut doctored = serde_json::to_value(&*artifact).unwrap();
        doctored["format_version"] = serde_json::json!(99);
        fs::write(&path, serde_json::to_string(&doctored).unwrap()).unwrap();

        let fresh = UrlDetector::new(small_config("bad-version-fresh"));
        let err = fresh.load(&path).unwrap_err();
        assert!(matches!(
            err,
            DetectorError::ModelVersion {
                expected: ARTIFACT_VERSION,
                found: 99
            }
        ));
        assert!(!fresh.is_loaded());

        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(&detector.config().model_path);
    }

    #[test]
    fn failed_load_keeps_previous_model() {
        let detector = UrlDetector::new(small_config("keep-previous"));
        let mut rng = StdRng::seed_from_u64(31);
        detector.train(&seeded_dataset(100), &mut rng).unwrap();
        assert!(detector.is_loaded());

        let missing = temp_model_path("no-such-model");
        assert!(detector.load(&missing).is_err());
        assert!(detector.is_loaded());
        assert!(detector.predict("http://example.com").is_ok());

        let _ = fs::remove_file(&detector.config().model_path);
    }
}
