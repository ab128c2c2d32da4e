use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "upsell")]
#[command(version, about = "Find upsell opportunities in user-behaviour events", long_about = None)]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load an events file and report how many events it holds
    Load {
        /// Events file (array, {"results": [...]} or {"events": [...]})
        file: PathBuf,
    },

    /// Extract opportunity records from an agent report
    Extract {
        /// Report file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Run an analysis job against an agent report
    #[command(group(ArgGroup::new("source").args(["events", "sample", "posthog"])))]
    Analyze {
        /// Events file to analyse (defaults to `events_file` from the config)
        #[arg(short, long)]
        events: Option<PathBuf>,

        /// Use the sample events file
        #[arg(long)]
        sample: bool,

        /// Fetch events from the PostHog API
        #[arg(long)]
        posthog: bool,

        /// Number of events to fetch from PostHog
        #[arg(long, requires = "posthog")]
        limit: Option<u32>,

        /// Report produced by the agent for these events
        #[arg(short, long)]
        report: PathBuf,

        /// Where to keep a copy of the raw report (defaults to `tasks_file`)
        #[arg(long)]
        tasks_out: Option<PathBuf>,
    },

    /// Fetch recent events from the PostHog API
    Fetch {
        /// Number of events to fetch
        #[arg(short, long)]
        limit: Option<u32>,

        /// Write events to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Validate an events file and copy it into the upload directory
    Import {
        /// Events file; must be a JSON array
        file: PathBuf,
    },

    /// Show the status of the latest (or a given) analysis job
    Status {
        /// Job id printed by `analyze`
        job_id: Option<String>,
    },

    /// Describe the sample events file
    Sample,
}
