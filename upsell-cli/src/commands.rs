use crate::cli::Commands;
use crate::config::AppConfig;
use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use upsell_core::{
    AnalysisRequest, AnalysisRunner, AnalysisStatus, FileStatusStore, StatusStore,
    TranscriptAnalyst, UpsellError, extract_opportunities, import_events_file, load_events,
};
use upsell_posthog::PostHogClient;
use upsell_telemetry::{Instrument, command_span, fetch_span};

pub async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let span = command_span(command_name(&command));
    dispatch(command, config).instrument(span).await
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Load { .. } => "load",
        Commands::Extract { .. } => "extract",
        Commands::Analyze { .. } => "analyze",
        Commands::Fetch { .. } => "fetch",
        Commands::Import { .. } => "import",
        Commands::Status { .. } => "status",
        Commands::Sample => "sample",
    }
}

async fn dispatch(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Load { file } => {
            let events = load_events(&file)?;
            print_json(&serde_json::json!({
                "file_path": file,
                "total_events": events.len(),
            }))
        }
        Commands::Extract { file } => {
            let text = match file {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read '{}'", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            print_json(&extract_opportunities(&text))
        }
        Commands::Analyze { events, sample, posthog, limit, report, tasks_out } => {
            analyze(config, events, sample, posthog, limit, &report, tasks_out).await
        }
        Commands::Fetch { limit, out } => {
            let mut client = PostHogClient::new(config.posthog())?;
            if let Some(limit) = limit {
                client = client.with_limit(limit);
            }
            let project = client.config().project_id.clone();
            let events = client
                .fetch_events(client.limit())
                .instrument(fetch_span(&project))
                .await?;

            let body = serde_json::to_string_pretty(&events)?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, body)
                        .await
                        .with_context(|| format!("Failed to write '{}'", path.display()))?;
                    tracing::info!(path = %path.display(), total_events = events.len(), "events saved");
                    Ok(())
                }
                None => {
                    println!("{}", body);
                    Ok(())
                }
            }
        }
        Commands::Import { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read '{}'", file.display()))?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("Not a file name: '{}'", file.display()))?;
            let receipt = import_events_file(&config.upload_dir, name, &bytes).await?;
            print_json(&receipt)
        }
        Commands::Status { job_id } => {
            let store = FileStatusStore::new(&config.status_file);
            let status = match &job_id {
                Some(id) => store.get(id).await?,
                None => store.latest().await?,
            };
            match (status, job_id) {
                (Some(status), _) => print_json(&status),
                (None, Some(id)) => bail!("No analysis job with id '{}'", id),
                (None, None) => print_json(&AnalysisStatus::new("")),
            }
        }
        Commands::Sample => sample_info(&config.sample_events_file),
    }
}

async fn analyze(
    config: &AppConfig,
    events: Option<PathBuf>,
    sample: bool,
    posthog: bool,
    limit: Option<u32>,
    report: &Path,
    tasks_out: Option<PathBuf>,
) -> Result<()> {
    let analyst = Arc::new(TranscriptAnalyst::new(report));
    let store = Arc::new(FileStatusStore::new(&config.status_file));
    let tasks_path = tasks_out.unwrap_or_else(|| config.tasks_file.clone());
    let runner = AnalysisRunner::new(analyst, store)
        .with_sample_events(&config.sample_events_file)
        .with_tasks_file(tasks_path);

    let result = if posthog {
        let mut client = PostHogClient::new(config.posthog())?;
        if let Some(limit) = limit {
            client = client.with_limit(limit);
        }
        runner.run_source(&client).await?
    } else {
        let request = AnalysisRequest {
            events_file_path: events.or_else(|| config.events_file.clone()),
            use_sample_data: sample,
        };
        runner.run(&request).await?
    };

    print_json(&result)
}

#[derive(Serialize)]
struct SampleInfo<'a> {
    success: bool,
    total_events: usize,
    file_path: &'a Path,
    description: &'static str,
}

fn sample_info(path: &Path) -> Result<()> {
    let events = load_events(path).map_err(|e| match e {
        UpsellError::NotFound(_) => anyhow!("Sample data file not found: {}", path.display()),
        other => other.into(),
    })?;

    print_json(&SampleInfo {
        success: true,
        total_events: events.len(),
        file_path: path,
        description: "Sample dataset of PostHog events",
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
