//! perfpredict CLI Module
//!
//! Command-line interface for listing, generating and fitting predictor sweeps.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use ndarray::{Array1, Array2};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Dataset, PredictorSuite};
use crate::predictor::{train_all, Predictor, PredictorKind, ResultRecord};
use crate::preprocessing::ScaleMode;
use crate::training::r2_score;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "perfpredict")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate and fit sweeps of regression predictors")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the registered predictor types
    List,

    /// Expand a predictor suite into its instances
    Generate {
        /// Suite file (JSON with a "predictor" list)
        #[arg(short, long)]
        config: PathBuf,

        /// Write one JSON result record per line to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train every instance of a suite and optionally predict
    Fit {
        /// Suite file (JSON with a "predictor" list)
        #[arg(short, long)]
        config: PathBuf,

        /// Training data (JSON with "features" and "responses")
        #[arg(short, long)]
        train: PathBuf,

        /// Data to predict; responses, if present, are used for scoring
        #[arg(short, long)]
        predict: Option<PathBuf>,

        /// Where predict-time scaling bounds come from
        #[arg(long, value_enum, default_value = "per-batch")]
        scale_mode: ScaleModeArg,

        /// Number of repetitions; instances are reinitialized before each
        #[arg(long, default_value = "1")]
        repetitions: usize,

        /// Write one JSON result record per line to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScaleModeArg {
    PerBatch,
    TrainBounds,
}

impl From<ScaleModeArg> for ScaleMode {
    fn from(arg: ScaleModeArg) -> Self {
        match arg {
            ScaleModeArg::PerBatch => ScaleMode::PerBatch,
            ScaleModeArg::TrainBounds => ScaleMode::TrainBounds,
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_list() -> anyhow::Result<()> {
    section("Predictors");
    println!("  {:<36} {}", muted("Name"), muted("Short"));
    for kind in PredictorKind::ALL {
        println!("  {:<36} {}", kind.name().white(), accent(kind.short_name()));
    }
    println!();
    Ok(())
}

pub fn cmd_generate(config_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    section("Generate");

    step_run("Loading suite");
    let suite = PredictorSuite::load(config_path)?;
    step_done(&format!("{} entries", suite.predictor.len()));

    let predictors = suite.generate()?;
    step_ok(&format!("{} instances", predictors.len()));

    println!();
    for predictor in &predictors {
        println!("  {}", predictor.short_config());
    }

    if let Some(path) = output {
        let records: Vec<ResultRecord> = predictors.iter().map(Predictor::get_results).collect();
        write_records(path, &records)?;
        step_ok(&format!("wrote {}", path.display()));
    }

    println!();
    Ok(())
}

pub fn cmd_fit(
    config_path: &Path,
    train_path: &Path,
    predict_path: Option<&Path>,
    scale_mode: ScaleMode,
    repetitions: usize,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Fit");

    step_run("Loading suite");
    let suite = PredictorSuite::load(config_path)?;
    let mut predictors: Vec<Predictor> = suite
        .generate()?
        .into_iter()
        .map(|p| p.with_scale_mode(scale_mode))
        .collect();
    step_done(&format!("{} instances", predictors.len()));

    step_run("Loading training data");
    let train = Dataset::load(train_path)?;
    let x_train = train.features()?;
    let y_train = train.responses()?;
    step_done(&format!("{} rows × {} cols", x_train.nrows(), x_train.ncols()));

    let eval = match predict_path {
        Some(path) => Some(Dataset::load(path)?),
        None => None,
    };
    let x_eval = match &eval {
        Some(data) => data.features()?,
        None => x_train.clone(),
    };
    let y_eval = match &eval {
        Some(data) if data.responses.is_empty() => None,
        Some(data) => Some(data.responses()?),
        None => Some(y_train.clone()),
    };

    let mut records = Vec::new();

    for repetition in 0..repetitions.max(1) {
        for predictor in predictors.iter_mut() {
            predictor.reinitialize(repetition);
        }

        println!();
        println!(
            "  {} {}",
            muted("repetition"),
            format!("{}", repetition).white().bold()
        );
        println!("  {:<44} {:>10} {:>10}", muted("Predictor"), muted("R²"), muted("Time"));
        println!("  {}", dim(&"─".repeat(66)));

        let start = Instant::now();
        let outcomes = train_all(&mut predictors, &x_train, &y_train);
        let batch_time = start.elapsed();

        for (predictor, outcome) in predictors.iter().zip(outcomes) {
            let label = predictor.short_config();
            if let Err(e) = outcome {
                println!("  {:<44} {:>10}", label, format!("err: {}", e).red());
                continue;
            }

            match evaluate(predictor, repetition, &x_eval, y_eval.as_ref()) {
                Ok((record, score)) => {
                    let time = predictor.training_time().unwrap_or_default();
                    match score {
                        Some(s) => println!("  {:<44} {:>10.4} {:>10.2?}", label, s, time),
                        None => println!("  {:<44} {:>10} {:>10.2?}", label, "-", time),
                    }
                    records.push(record);
                }
                Err(e) => {
                    println!("  {:<44} {:>10}", label, format!("err: {}", e).red());
                }
            }
        }

        println!("  {}", dim(&"─".repeat(66)));
        println!(
            "  {} {}",
            muted(&format!("{} instances trained in parallel in", predictors.len())),
            format!("{:.2?}", batch_time).white()
        );
    }

    if let Some(path) = output {
        write_records(path, &records)?;
        println!();
        step_ok(&format!("wrote {}", path.display()));
    }

    println!();
    Ok(())
}

/// Result record of one trained predictor with its predictions, its own
/// training time and, when responses are known, its R²
fn evaluate(
    predictor: &Predictor,
    repetition: usize,
    x_eval: &Array2<f64>,
    y_eval: Option<&Array1<f64>>,
) -> crate::Result<(ResultRecord, Option<f64>)> {
    let predictions = predictor.predict(x_eval)?;
    let score = y_eval.map(|y| r2_score(y, &predictions));

    let mut record = predictor.get_results();
    record.insert("repetition", repetition);
    if let Some(time) = predictor.training_time() {
        record.insert("train_seconds", time.as_secs_f64());
    }
    if let Some(s) = score {
        record.insert("r2", s);
    }
    record.insert("predictions", predictions.to_vec());
    Ok((record, score))
}

/// One JSON object per line
fn write_records(path: &Path, records: &[ResultRecord]) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
