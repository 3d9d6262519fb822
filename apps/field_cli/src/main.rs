use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use shared::domain::SensorReading;
use soil_pipeline::{
    config::{load_settings_from, normalize_base_url, timeout_from_secs},
    load_settings, Feedback, HttpCollaborators, PipelineError, PipelineSettings, SoilPipeline,
    SubmissionExtras,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Read a soil sensor and ask the prediction service for a crop")]
struct Args {
    /// Overrides the configured collaborator base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Settings file used instead of `agro.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    timeout_secs: Option<f64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Acquire one reading from the sensor gateway.
    Read,
    /// Acquire a reading and submit it for a recommendation.
    Recommend {
        #[command(flatten)]
        extras: ExtraArgs,
    },
    /// Submit a reading given as flat JSON.
    Submit {
        #[arg(long)]
        reading: String,
        #[command(flatten)]
        extras: ExtraArgs,
    },
    /// Show the collaborator's service status.
    Status,
    /// List serial ports visible to the sensor gateway.
    Ports,
}

#[derive(clap::Args, Debug, Default)]
struct ExtraArgs {
    #[arg(long)]
    crop_type: Option<String>,
    #[arg(long)]
    soil_type: Option<String>,
    #[arg(long)]
    humidity: Option<f64>,
    #[arg(long)]
    rainfall: Option<f64>,
}

impl From<ExtraArgs> for SubmissionExtras {
    fn from(args: ExtraArgs) -> Self {
        Self {
            crop_type: args.crop_type,
            soil_type: args.soil_type,
            humidity: args.humidity,
            rainfall: args.rainfall,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let settings = resolve_settings(&args)?;
    info!(base_url = %settings.base_url, "field_cli: using collaborators");

    match args.command {
        Command::Read => {
            let pipeline = SoilPipeline::from_settings(&settings)?;
            let outcome = pipeline.acquire().await;
            emit(&pipeline, outcome.map(|reading| json!({ "reading": reading })))
        }
        Command::Recommend { extras } => {
            let pipeline = SoilPipeline::from_settings(&settings)?;
            if let Err(err) = pipeline.acquire().await {
                return emit(&pipeline, Err(err));
            }
            let outcome = pipeline.submit_current(&extras.into()).await;
            emit(
                &pipeline,
                outcome.map(|recommendation| json!({ "recommendation": recommendation })),
            )
        }
        Command::Submit { reading, extras } => {
            let reading: SensorReading =
                serde_json::from_str(&reading).context("--reading must be a flat JSON object")?;
            let pipeline = SoilPipeline::from_settings(&settings)?;
            let outcome = pipeline.submit_with(&reading, &extras.into()).await;
            emit(
                &pipeline,
                outcome.map(|recommendation| json!({ "recommendation": recommendation })),
            )
        }
        Command::Status => {
            let http = collaborators(&settings)?;
            print_diagnostic(http.service_status().await.map(|status| json!(status)))
        }
        Command::Ports => {
            let http = collaborators(&settings)?;
            print_diagnostic(http.list_ports().await.map(|ports| json!({ "ports": ports })))
        }
    }
}

fn resolve_settings(args: &Args) -> Result<PipelineSettings> {
    let mut settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(timeout) = args.timeout_secs.and_then(timeout_from_secs) {
        settings.request_timeout = timeout;
    }
    Ok(settings)
}

fn collaborators(settings: &PipelineSettings) -> Result<HttpCollaborators> {
    let base_url = normalize_base_url(&settings.base_url)?;
    HttpCollaborators::new(base_url, settings.request_timeout)
}

fn emit(
    pipeline: &SoilPipeline,
    outcome: Result<serde_json::Value, PipelineError>,
) -> Result<ExitCode> {
    let feedback = Feedback::for_outcome(&outcome);
    let (result, code) = match outcome {
        Ok(value) => (value, ExitCode::SUCCESS),
        Err(err) => (json!({ "failure": err.report() }), ExitCode::FAILURE),
    };
    let output = json!({
        "feedback": feedback,
        "result": result,
        "state": pipeline.snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}

fn print_diagnostic(outcome: Result<serde_json::Value, PipelineError>) -> Result<ExitCode> {
    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "error": err.user_message(),
                    "failure": err.report(),
                }))?
            );
            Ok(ExitCode::FAILURE)
        }
    }
}
