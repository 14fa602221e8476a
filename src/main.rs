//! Phishguard CLI
//!
//! Command-line interface for the phishing URL detector.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use phishguard::config::DetectorConfig;
use phishguard::dataset::Dataset;
use phishguard::detector::UrlDetector;
use phishguard::features;
use phishguard::server::ApiServer;
use phishguard::synth;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "phishguard")]
#[command(about = "Lexical phishing URL detector", version)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true, env = "PHISHGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging and detailed output
    #[arg(short, long, global = true, env = "PHISHGUARD_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model from a labeled dataset CSV
    Train {
        /// Path to the dataset CSV file
        #[arg(short, long)]
        dataset: PathBuf,
        /// Output model file path
        #[arg(short, long, default_value = "phishing_model.json")]
        output: PathBuf,
        /// RNG seed for a reproducible split and forest
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check a single URL
    Check {
        /// URL to check
        #[arg(short, long)]
        url: String,
        /// Path to the model file
        #[arg(short, long, default_value = "phishing_model.json")]
        model: PathBuf,
    },
    /// Check multiple URLs from a file, one per line
    Batch {
        /// Input file with one URL per line
        #[arg(short, long)]
        input: PathBuf,
        /// Output CSV file for results
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,
        /// Path to the model file
        #[arg(short, long, default_value = "phishing_model.json")]
        model: PathBuf,
    },
    /// Generate a synthetic labeled dataset
    Generate {
        /// Number of samples to generate
        #[arg(short, long, default_value = "2000")]
        samples: usize,
        /// Ratio of phishing URLs (0.0-1.0)
        #[arg(short, long, default_value = "0.5")]
        ratio: f64,
        /// Output CSV file
        #[arg(short, long, default_value = "phishing_dataset.csv")]
        output: PathBuf,
        /// RNG seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Serve the JSON API and web frontend
    Serve {
        /// Address to bind, overrides the config file
        #[arg(short, long, env = "PHISHGUARD_BIND")]
        bind: Option<String>,
        /// Path to the model file, overrides the config file
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

/// Install panic hook for crash diagnostics
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());
        eprintln!("PANIC: phishguard panicked at {location}");
        default_hook(panic_info);
    }));
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_panic_hook();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .init();

    let config = match &cli.config {
        Some(path) => DetectorConfig::from_file(path)?,
        None => DetectorConfig::default(),
    };

    match cli.command {
        Command::Train {
            dataset,
            output,
            seed,
        } => cmd_train(config, dataset, output, seed),
        Command::Check { url, model } => cmd_check(config, url, model, cli.verbose),
        Command::Batch {
            input,
            output,
            model,
        } => cmd_batch(config, input, output, model),
        Command::Generate {
            samples,
            ratio,
            output,
            seed,
        } => cmd_generate(samples, ratio, output, seed),
        Command::Serve { bind, model } => cmd_serve(config, bind, model).await,
    }
}

fn cmd_train(
    mut config: DetectorConfig,
    dataset: PathBuf,
    output: PathBuf,
    seed: Option<u64>,
) -> Result<()> {
    config.model_path = output;

    let data = Dataset::read_csv(&dataset)
        .with_context(|| format!("loading dataset {}", dataset.display()))?;
    info!(
        samples = data.len(),
        phishing = data.phishing_count(),
        "dataset loaded"
    );

    let detector = UrlDetector::new(config);
    let mut rng = seeded_rng(seed);
    let report = detector.train(&data, &mut rng)?;

    println!("Model trained with accuracy: {:.2}", report.accuracy);
    println!("Model saved to {}", report.model_path.display());
    Ok(())
}

fn cmd_check(
    mut config: DetectorConfig,
    url: String,
    model: PathBuf,
    verbose: bool,
) -> Result<()> {
    config.model_path = model.clone();
    let detector = UrlDetector::new(config);
    detector.load(&model)?;

    let normalized = features::normalize_url(&url);
    println!("Checking URL: {normalized}");

    let prediction = detector.predict(&url)?;
    println!(
        "Result: {} (Confidence: {:.2})",
        prediction.verdict, prediction.confidence
    );

    if verbose {
        println!("\nFeatures:");
        for (name, value) in prediction.features.named() {
            println!("- {name}: {value}");
        }
    }
    Ok(())
}

fn cmd_batch(
    mut config: DetectorConfig,
    input: PathBuf,
    output: PathBuf,
    model: PathBuf,
) -> Result<()> {
    config.model_path = model.clone();
    let detector = UrlDetector::new(config);
    detector.load(&model)?;

    let raw =
        fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
    let urls: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    info!(count = urls.len(), "processing URLs");

    let mut out = String::from("url,is_phishing,confidence\n");
    let mut phishing = 0usize;
    for url in &urls {
        let normalized = features::normalize_url(url);
        let prediction = detector.predict(url)?;
        if prediction.verdict.is_phishing() {
            phishing += 1;
        }
        out.push_str(&format!(
            "{},{},{:.4}\n",
            phishguard::dataset::csv_escape(&normalized),
            u8::from(prediction.verdict.is_phishing()),
            prediction.confidence
        ));
    }
    fs::write(&output, out).with_context(|| format!("writing {}", output.display()))?;

    println!("Results saved to {}", output.display());
    println!(
        "Summary: {} phishing, {} legitimate",
        phishing,
        urls.len() - phishing
    );
    Ok(())
}

fn cmd_generate(samples: usize, ratio: f64, output: PathBuf, seed: Option<u64>) -> Result<()> {
    let mut rng = seeded_rng(seed);
    let data = Dataset::from_labeled_urls(synth::generate(samples, ratio, &mut rng));
    data.write_csv(&output)?;

    println!(
        "Generated dataset with {} URLs ({} phishing, {} legitimate)",
        data.len(),
        data.phishing_count(),
        data.len() - data.phishing_count()
    );
    println!("Dataset saved to {}", output.display());
    Ok(())
}

async fn cmd_serve(
    mut config: DetectorConfig,
    bind: Option<String>,
    model: Option<PathBuf>,
) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(model) = model {
        config.model_path = model;
    }

    let bind = config.server.bind.clone();
    let model_path = config.model_path.clone();
    let detector = Arc::new(UrlDetector::new(config));

    if model_path.exists() {
        if let Err(e) = detector.load(&model_path) {
            error!(error = %e, "failed to load model, starting unloaded");
        }
    } else {
        info!(
            path = %model_path.display(),
            "no model on disk, predictions unavailable until POST /api/train"
        );
    }

    ApiServer::new(detector).run(&bind).await
}
