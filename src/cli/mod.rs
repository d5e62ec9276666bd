//! IncomeLens CLI
//!
//! `train` runs the full selection protocol and writes the artifact pair;
//! `serve` starts the HTTP shell over a previously written pair.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::bundle::{ArtifactBundle, Metadata};
use crate::data::{clean_strings, load_csv, split_target};
use crate::explain::{top_factors, TRAINING_TOP_K};
use crate::server::{run_server, ServerConfig};
use crate::training::{TrainEngine, TrainingConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "incomelens")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve an income classifier for census-like tabular data")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train both model families and persist the winning bundle
    Train {
        /// Path to the CSV dataset file
        #[arg(long)]
        csv: PathBuf,

        /// Target column name
        #[arg(long, default_value = "income")]
        target: String,

        /// Positive class label text
        #[arg(long, default_value = ">50K")]
        positive_label: String,

        /// Held-out test split fraction
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Decision threshold for the positive-class probability
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,

        /// Directory for the artifact pair
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
    },

    /// Serve predictions from a trained bundle
    Serve {
        /// Server host
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Server port
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Directory holding the artifact pair
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_train(
    csv: &PathBuf,
    target: &str,
    positive_label: &str,
    test_size: f64,
    seed: u64,
    threshold: f64,
    artifacts: &PathBuf,
) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("threshold must be within [0, 1], got {}", threshold);
    }

    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = load_csv(csv)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        df.height(),
        df.width(),
        start.elapsed()
    ));

    step_run("Cleaning strings");
    let df = clean_strings(&df)?;
    let (features, y) = split_target(&df, target, positive_label)?;
    step_done(&format!("{} rows with target present", features.height()));

    let config = TrainingConfig {
        test_fraction: test_size,
        seed,
        cv_folds: 3,
    };
    let engine = TrainEngine::new(config);

    step_run("Searching both model families");
    let start = Instant::now();
    let outcome = engine.fit(&features, &y)?;
    step_done(&format!("in {:?}", start.elapsed()));

    println!();
    println!(
        "  Test F1 — LogisticRegression: {}",
        format!("{:.4}", outcome.linear_f1).white()
    );
    println!(
        "  Test F1 — RandomForest:       {}",
        format!("{:.4}", outcome.ensemble_f1).white()
    );
    step_ok(&format!("Winner: {}", outcome.model_name.bold()));

    let factors = top_factors(&outcome.pipeline, TRAINING_TOP_K);

    let schema = outcome
        .pipeline
        .preprocessor
        .schema()
        .ok_or_else(|| anyhow::anyhow!("winning pipeline has no fitted schema"))?;

    let meta = Metadata {
        project: "IncomeLens".to_string(),
        model_name: outcome.model_name.clone(),
        test_f1: outcome.test_f1,
        target_column: target.to_string(),
        positive_label: positive_label.to_string(),
        threshold,
        expected_features: schema.column_names(),
        numeric_features: schema.numeric_names(),
        categorical_features: schema.categorical_names(),
        label_mapping: Metadata::label_mapping_for(positive_label),
        top_factors: factors,
        trained_at: chrono::Utc::now().to_rfc3339(),
    };

    let (model_path, meta_path) = ArtifactBundle::save(artifacts, &outcome.pipeline, &meta)?;

    println!();
    step_ok("Saved:");
    println!("    {} {}", dim("model:   "), model_path.display());
    println!("    {} {}", dim("metadata:"), meta_path.display());
    println!();
    println!(
        "  {}",
        dim("Next: run `incomelens serve` and query /schema and /predict.")
    );

    Ok(())
}

pub async fn cmd_serve(host: &str, port: u16, artifacts: &PathBuf) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: host.to_string(),
        port,
        artifacts_dir: artifacts.display().to_string(),
    };
    run_server(config).await
}
