//! # Wardpost — scheduled notification dispatcher for the ward portal
//!
//! Reads announcements and pending leadership tasks from the portal
//! database and delivers them over WhatsApp on a fixed daily schedule.
//!
//! Usage:
//!   wardpost run                       # Start the scheduler loop
//!   wardpost send-group                # Fire the group announcement job once
//!   wardpost send-tasks --dry-run      # Preview the task reminders on stdout

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wardpost_channels::{ConsoleMessenger, WhatsAppMessenger};
use wardpost_core::WardpostConfig;
use wardpost_core::messenger::Messenger;
use wardpost_dispatch::{Directory, Dispatcher, JobKind, RunReport};
use wardpost_scheduler::Timetable;
use wardpost_store::PortalStore;

#[derive(Parser)]
#[command(
    name = "wardpost",
    version,
    about = "⛪ Wardpost — ward portal notification dispatcher"
)]
struct Cli {
    /// Config file path (default: ~/.wardpost/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the scheduler loop (runs until killed)
    Run,
    /// Run the group announcement job once and exit
    SendGroup {
        /// Print to stdout instead of sending
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the task reminder job once and exit
    SendTasks {
        /// Print to stdout instead of sending
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "wardpost=debug"
    } else {
        "wardpost=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Load and validate config — malformed schedule or directory entries
    // stop the process here, before any loop starts.
    let config = match &cli.config {
        Some(path) => {
            let expanded = shellexpand::tilde(path).to_string();
            WardpostConfig::load_from(Path::new(&expanded))?
        }
        None => WardpostConfig::load()?,
    };

    match cli.command {
        Command::Run => {
            let timetable = Timetable::from_entries(&config.schedule)?;
            let tick = Duration::from_secs(config.scheduler.tick_secs);
            let dispatcher = build_dispatcher(&config, false).await?;
            tracing::info!("⛪ Wardpost started — {} schedule entries", timetable.len());
            wardpost_scheduler::run_loop(timetable, dispatcher, tick).await;
            Ok(())
        }
        Command::SendGroup { dry_run } => {
            let dispatcher = build_dispatcher(&config, dry_run).await?;
            let report = dispatcher.run(JobKind::GroupAnnouncement).await;
            print_report(&report);
            Ok(())
        }
        Command::SendTasks { dry_run } => {
            let dispatcher = build_dispatcher(&config, dry_run).await?;
            let report = dispatcher.run(JobKind::TaskReminders).await;
            print_report(&report);
            Ok(())
        }
    }
}

/// Wire store, directory, and channel into a dispatcher.
async fn build_dispatcher(config: &WardpostConfig, dry_run: bool) -> Result<Dispatcher> {
    let db_path = shellexpand::tilde(&config.db_path).to_string();
    let store = PortalStore::new(Path::new(&db_path));
    let directory = Directory::from_config(&config.directory);
    if directory.is_empty() {
        tracing::warn!("⚠️ Recipient directory is empty; all reminders will be skipped");
    }

    let messenger: Box<dyn Messenger> = if dry_run {
        Box::new(ConsoleMessenger::new())
    } else {
        let mut channel = WhatsAppMessenger::new(config.whatsapp.clone());
        channel.connect().await?;
        Box::new(channel)
    };

    Ok(Dispatcher::new(
        Box::new(store),
        messenger,
        directory,
        config.group_id.clone(),
        Duration::from_millis(config.dispatch.recipient_pause_ms),
    ))
}

fn print_report(report: &RunReport) {
    println!(
        "{}: {} sent / {} outcomes",
        report.job.as_str(),
        report.sent_count(),
        report.outcomes.len()
    );
    for outcome in &report.outcomes {
        println!("  {outcome:?}");
    }
}
