//! Phishguard Library
//!
//! A lexical phishing-URL detector: a deterministic feature extractor,
//! a synthetic dataset generator, and a trainable random-forest
//! classifier, exposed through a CLI and a small JSON-over-HTTP service.
//!
//! # Features
//!
//! - **Ten lexical features**: IP hosts, `@` tricks, redirect slashes,
//!   dashed domains, subdomain stacking, suspicious words, shorteners
//! - **Explicit feature schema**: column order is recorded in the model
//!   artifact and validated on load, never implied
//! - **Atomic model swap**: predictions hold an immutable artifact
//!   handle; retraining replaces it in one swap
//! - **Seedable synthesis**: every random decision flows through an
//!   injected RNG, so datasets and training runs reproduce exactly
//!
//! # Example
//!
//! ```ignore
//! use phishguard::config::DetectorConfig;
//! use phishguard::dataset::Dataset;
//! use phishguard::detector::UrlDetector;
//! use phishguard::synth;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let detector = UrlDetector::new(DetectorConfig::default());
//! let mut rng = StdRng::seed_from_u64(7);
//! let dataset = Dataset::from_labeled_urls(synth::generate(2000, 0.5, &mut rng));
//! detector.train(&dataset, &mut rng)?;
//! let prediction = detector.predict("http://paypal-secure-login.example.com")?;
//! println!("{} ({:.2})", prediction.verdict, prediction.confidence);
//! ```

pub mod config;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod features;
pub mod ml;
pub mod server;
pub mod synth;

// Re-exports for convenience
pub use config::DetectorConfig;
pub use detector::{ModelArtifact, Prediction, TrainingReport, UrlDetector, Verdict};
pub use error::{DetectorError, Result};
pub use features::{FeatureSchema, UrlFeatures, FEATURE_NAMES};
