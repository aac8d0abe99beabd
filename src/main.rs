//! Taskflow CLI - scripted agent task-run simulator

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::time::Duration;

use taskflow::client::{TaskRequest, TaskflowClient};
use taskflow::controller::RunController;
use taskflow::demo::DemoModeSettings;
use taskflow::error::{FixSuggestion, TaskflowError};
use taskflow::state::LogEntryType;

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Taskflow - scripted agent task-run simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulated agent for a prompt (TUI dashboard by default)
    Run {
        /// Task prompt
        prompt: String,

        /// Print log entries to stdout instead of opening the dashboard
        #[arg(long)]
        plain: bool,

        /// Disable demo mode (simulated markers are dropped; the engine
        /// still performs no real external calls)
        #[arg(long)]
        live: bool,
    },

    /// Submit a task to a real backend and poll until it finishes
    Remote {
        /// Task prompt
        prompt: String,

        /// Backend base URL
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
    },

    /// Check backend health
    Health {
        /// Backend base URL
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { prompt, plain, live } => {
            let demo = if live {
                DemoModeSettings::live()
            } else {
                DemoModeSettings::default()
            };
            if plain {
                run_plain(&prompt, demo).await
            } else {
                taskflow::tui::run(&prompt, demo)
                    .await
                    .map_err(|e| TaskflowError::Io(std::io::Error::other(e.to_string())))
            }
        }
        Commands::Remote {
            prompt,
            url,
            interval_ms,
        } => run_remote(&prompt, &url, Duration::from_millis(interval_ms)).await,
        Commands::Health { url } => check_health(&url).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

/// Run the simulation and stream log entries to stdout.
async fn run_plain(prompt: &str, demo: DemoModeSettings) -> Result<(), TaskflowError> {
    if prompt.trim().is_empty() {
        return Ok(());
    }
    let controller = RunController::new(demo);
    let mut rx = controller.subscribe();
    controller.submit(prompt);

    let mut printed = 0usize;
    loop {
        if rx.changed().await.is_err() {
            break;
        }
        let snap = rx.borrow_and_update().clone();

        for entry in snap.log.entries.iter().skip(printed) {
            let line = format!("{} {}", entry.emoji, entry.message);
            let line = match entry.kind {
                LogEntryType::Success => line.green().to_string(),
                LogEntryType::Error => line.red().bold().to_string(),
                LogEntryType::Warning => line.yellow().to_string(),
                LogEntryType::Action => line.blue().to_string(),
                LogEntryType::Reflection => line.purple().to_string(),
                LogEntryType::Info => line,
            };
            println!("[{:>6}ms] {}", entry.timestamp_ms, line);
            if let Some(details) = &entry.details {
                for detail_line in details.lines() {
                    println!("           {}", detail_line.dimmed());
                }
            }
        }
        printed = snap.log.entries.len();

        if snap.status.is_terminal() {
            println!();
            println!(
                "{} status: {} | progress: {}%",
                "→".cyan(),
                snap.status.to_string().cyan().bold(),
                snap.progress
            );
            if let Some(usage) = snap.token_usage {
                println!(
                    "{} tokens: {} prompt + {} completion = {} (${:.4})",
                    "→".cyan(),
                    usage.prompt_tokens,
                    usage.completion_tokens,
                    usage.total_tokens,
                    usage.estimated_cost
                );
            }
            for tool in &snap.tools {
                println!(
                    "{} {} {}: {}/{} calls ok",
                    "→".cyan(),
                    tool.id.icon(),
                    tool.id.name(),
                    tool.success_count,
                    tool.call_count
                );
            }
            break;
        }
    }

    Ok(())
}

/// Submit to a real backend through the transport client and poll.
async fn run_remote(
    prompt: &str,
    url: &str,
    interval: Duration,
) -> Result<(), TaskflowError> {
    let client = TaskflowClient::new(url)?;
    let created = client.create_task(&TaskRequest::new(prompt)).await?;
    println!(
        "{} Task {} created ({})",
        "→".cyan(),
        created.id.cyan().bold(),
        created.message.as_deref().unwrap_or("accepted")
    );

    let mut last_progress = None;
    let report = client
        .poll_until_terminal(&created.id, interval, |status| {
            if last_progress != Some(status.progress) {
                last_progress = Some(status.progress);
                println!(
                    "{} {}% {}",
                    "→".cyan(),
                    status.progress,
                    status.message.as_deref().unwrap_or("")
                );
            }
        })
        .await?;

    match report.error {
        Some(error) => {
            println!("{} Task failed: {}", "✗".red(), error);
        }
        None => {
            println!("{} Task completed", "✓".green());
            if let Some(usage) = report.token_usage {
                println!(
                    "  tokens: {} (${:.4})",
                    usage.total_tokens, usage.estimated_cost
                );
            }
        }
    }
    Ok(())
}

async fn check_health(url: &str) -> Result<(), TaskflowError> {
    let client = TaskflowClient::new(url)?;
    let health = client.health().await?;
    println!("{} Backend is {}", "✓".green(), health.status);
    println!("  api:         {}", health.services.api);
    println!("  database:    {}", health.services.database);
    println!("  ai_services: {}", health.services.ai_services);
    Ok(())
}
