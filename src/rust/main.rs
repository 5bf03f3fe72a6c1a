use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use pyq_predictor::{
    ArtifactStore, BatchPolicy, Dataset, PipelineConfig, PipelineError, PredictionPipeline,
    PredictionResult,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding model.json and topic_encoder.json (defaults to $PYQ_ARTIFACTS)
    #[arg(short, long, global = true)]
    artifacts: Option<PathBuf>,

    /// How rows that cannot be predicted are handled: "partial" or "all-or-nothing"
    #[arg(long, global = true, default_value = "partial")]
    policy: BatchPolicy,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict every question of an uploaded CSV
    Batch {
        /// CSV with Topic, Marks and RepetitionCount columns
        dataset: PathBuf,
        /// Write the table with its Prediction column here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Predict a single question from its full text
    Ask {
        /// Question set used for topic matching and repetition estimates
        #[arg(short, long)]
        dataset: Option<PathBuf>,
        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=20))]
        marks: u32,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        question: String,
    },
    /// Record the SHA-256 digests of the current artifacts
    Checksum,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    let store = match &args.artifacts {
        Some(dir) => ArtifactStore::new(dir),
        None => ArtifactStore::new_default(),
    };

    let outcome = match args.command {
        Command::Checksum => return write_checksums(&store),
        Command::Batch { dataset, output } => {
            let pipeline = load_pipeline(&store, args.policy)?;
            run_batch(&pipeline, dataset, output)
        }
        Command::Ask { dataset, marks, json, question } => {
            let pipeline = load_pipeline(&store, args.policy)?;
            match run_ask(&pipeline, dataset, marks, &question) {
                Ok(result) => {
                    println!("{}", render_result(&result, json)?);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn write_checksums(store: &ArtifactStore) -> anyhow::Result<ExitCode> {
    let checksums = store.write_checksums()
        .with_context(|| format!("Failed to checksum artifacts in {:?}", store.artifacts_dir()))?;
    for (file, digest) in checksums {
        println!("{}  {}", digest, file);
    }
    Ok(ExitCode::SUCCESS)
}

fn load_pipeline(store: &ArtifactStore, policy: BatchPolicy) -> anyhow::Result<PredictionPipeline> {
    if !store.is_available() {
        anyhow::bail!(
            "No trained artifacts in {:?}. Pass --artifacts or set PYQ_ARTIFACTS.",
            store.artifacts_dir()
        );
    }
    let classifier = store.load_classifier()
        .with_context(|| format!("Failed to load the model from {:?}", store.get_model_path()))?;
    let encoder = store.load_encoder()
        .with_context(|| format!("Failed to load the topic encoder from {:?}", store.get_encoder_path()))?;

    let start_time = Instant::now();
    let pipeline = PredictionPipeline::builder()
        .with_classifier(classifier)
        .with_encoder(encoder)
        .with_config(PipelineConfig::default().with_batch_policy(policy))
        .build()?;
    info!("Pipeline built in {:.2?}", start_time.elapsed());
    Ok(pipeline)
}

fn run_batch(pipeline: &PredictionPipeline, path: PathBuf, output: Option<PathBuf>) -> Result<(), PipelineError> {
    let dataset = Dataset::from_path(&path)?;
    let report = pipeline.predict_dataset(&dataset)?;

    for (row, error) in report.failures() {
        eprintln!("Row {}: {}", row, error.user_message());
    }

    match output {
        Some(output) => {
            let file = File::create(&output).map_err(csv::Error::from)?;
            report.table().write_csv(file)?;
            println!("Predictions written to {}", output.display());
        }
        None => report.table().write_csv(io::stdout().lock())?,
    }
    println!(
        "Predicted {}/{} questions (1 - Will Appear, 0 - Won't Appear)",
        report.predicted_count(),
        report.outcomes().len()
    );
    Ok(())
}

fn run_ask(
    pipeline: &PredictionPipeline,
    dataset: Option<PathBuf>,
    marks: u32,
    question: &str,
) -> Result<PredictionResult, PipelineError> {
    let records = match dataset {
        Some(path) => Some(Dataset::from_path(&path)?.topic_records(pipeline.config().marks_range())?),
        None => None,
    };

    pipeline.predict_from_text(records.as_deref(), question, marks)
}

fn render_result(result: &PredictionResult, json: bool) -> anyhow::Result<String> {
    if json {
        return serde_json::to_string_pretty(result).context("Failed to serialize the prediction");
    }
    let mut text = result.to_string();
    if let Some(repetition_count) = result.estimated_repetition_count {
        text.push_str(&format!("\nEstimated repetition count used: {}", repetition_count));
    }
    Ok(text)
}
