mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::event::{DetailArgs, ScheduleArgs};
use hearth_core::config::HearthConfig;
use hearth_core::settings::SettingsPatch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Show and edit the household dashboard calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the events of a day, three days or a week
    Show {
        /// Date to show (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// day, 3day or week (defaults to `view` from config.toml)
        #[arg(short, long)]
        view: Option<String>,

        /// Don't fetch events from Google Calendar
        #[arg(long)]
        no_google: bool,
    },
    /// Add a local event
    Add {
        title: String,

        #[command(flatten)]
        schedule: ScheduleArgs,

        #[command(flatten)]
        details: DetailArgs,
    },
    /// Change a local event or a whole series
    Edit {
        event_id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        schedule: ScheduleArgs,

        #[command(flatten)]
        details: DetailArgs,
    },
    /// Delete a local event or a whole series
    Delete { event_id: String },
    /// Remove one occurrence of a recurring event
    Exclude {
        event_id: String,
        /// Date of the occurrence (YYYY-MM-DD)
        date: String,
    },
    /// Turn one occurrence of a recurring event into a separate event
    Detach {
        event_id: String,
        /// Date of the occurrence (YYYY-MM-DD)
        date: String,

        /// Title of the detached event
        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        details: DetailArgs,
    },
    /// Google Calendar utilities
    Google {
        #[command(subcommand)]
        command: GoogleCommands,
    },
    /// Show paths and display settings, or change settings
    Config {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        start_hour: Option<u32>,

        #[arg(long)]
        end_hour: Option<u32>,

        /// Google calendar id to show alongside local events
        #[arg(long)]
        calendar_id: Option<String>,

        /// API key for reading a public Google calendar
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[derive(Subcommand)]
enum GoogleCommands {
    /// Check that the configured calendar can be read
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = HearthConfig::load()?;

    match cli.command {
        Commands::Show {
            date,
            view,
            no_google,
        } => commands::show::run(&config, date.as_deref(), view.as_deref(), !no_google).await,
        Commands::Add {
            title,
            schedule,
            details,
        } => {
            let changes = commands::event::changes(Some(title), details, schedule)?;
            commands::event::add(&config, changes)
        }
        Commands::Edit {
            event_id,
            title,
            schedule,
            details,
        } => {
            let changes = commands::event::changes(title, details, schedule)?;
            commands::event::edit(&config, &event_id, changes)
        }
        Commands::Delete { event_id } => commands::event::delete(&config, &event_id),
        Commands::Exclude { event_id, date } => {
            commands::occurrence::exclude(&config, &event_id, &date)
        }
        Commands::Detach {
            event_id,
            date,
            title,
            details,
        } => {
            let changes = commands::event::changes(title, details, ScheduleArgs::default())?;
            commands::occurrence::detach(&config, &event_id, &date, changes)
        }
        Commands::Google {
            command: GoogleCommands::Test,
        } => commands::google::test(&config).await,
        Commands::Config {
            title,
            start_hour,
            end_hour,
            calendar_id,
            api_key,
        } => {
            let patch = SettingsPatch {
                calendar_title: title,
                calendar_start_hour: start_hour,
                calendar_end_hour: end_hour,
                google_calendar_id: calendar_id,
                google_api_key: api_key,
            };
            commands::config::run(&config, patch)
        }
    }
}
