//! Dependency Health Agent entry point
//!
//! Serves health reports over HTTP or builds one report from the command line.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dependency_health::client::DependencyHealthClient;
use dependency_health::config::{load_config, AgentConfig};
use dependency_health::contracts::*;
use dependency_health::engine::DependencyHealthEngine;
use dependency_health::handler::{create_router, AppState};
use dependency_health::query::{LogAnalyticsQuery, StaticTelemetry, TelemetryQuery};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dependency-health")]
#[command(about = "Dependency Health Agent - per-component health from dependency telemetry")]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value = "json", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to agent config file (JSON/YAML/TOML)
        #[arg(short, long, env = "DEPENDENCY_HEALTH_CONFIG")]
        config: PathBuf,

        /// Log Analytics workspace, overrides the config file
        #[arg(long, env = "LOG_ANALYTICS_WORKSPACE_ID")]
        workspace_id: Option<String>,

        /// Port to listen on
        #[arg(short, long, default_value = "8083", env = "PORT")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Build one report against Log Analytics
    Report {
        /// Path to agent config file (JSON/YAML/TOML)
        #[arg(short, long, env = "DEPENDENCY_HEALTH_CONFIG")]
        config: PathBuf,

        /// Log Analytics workspace, overrides the config file
        #[arg(long, env = "LOG_ANALYTICS_WORKSPACE_ID")]
        workspace_id: Option<String>,

        /// Instance name (suffix of a configured instance URI)
        #[arg(short, long)]
        instance: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build one report from saved query results
    Evaluate {
        /// Path to agent config file (JSON/YAML/TOML)
        #[arg(short, long, env = "DEPENDENCY_HEALTH_CONFIG")]
        config: PathBuf,

        /// Instance name (suffix of a configured instance URI)
        #[arg(short, long)]
        instance: String,

        /// Saved baseline window result (JSON)
        #[arg(long)]
        baseline: PathBuf,

        /// Saved recent window result (JSON)
        #[arg(long)]
        recent: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a report from a running agent
    Fetch {
        /// Agent base URL
        #[arg(short, long, default_value = "http://localhost:8083")]
        url: String,

        /// Instance name
        #[arg(short, long)]
        instance: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Serve {
            config,
            workspace_id,
            port,
            host,
        } => {
            let config = load(&config, workspace_id)?;
            let query: Arc<dyn TelemetryQuery> = Arc::new(LogAnalyticsQuery::from_config(&config));
            let engine = DependencyHealthEngine::from_config(&config, query);
            let state = Arc::new(AppState::new(engine)?);
            let router = create_router(state);

            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
            tracing::info!(
                agent_id = dependency_health::AGENT_ID,
                version = dependency_health::AGENT_VERSION,
                instances = config.instances.len(),
                precedence = %config.status_precedence,
                "Starting Dependency Health Agent on {}",
                addr
            );

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await?;
        }

        Commands::Report {
            config,
            workspace_id,
            instance,
            json,
        } => {
            let config = load(&config, workspace_id)?;
            let query: Arc<dyn TelemetryQuery> = Arc::new(LogAnalyticsQuery::from_config(&config));
            let engine = DependencyHealthEngine::from_config(&config, query);

            let report = engine.report(&instance).await?;
            finish(&report, json)?;
        }

        Commands::Evaluate {
            config,
            instance,
            baseline,
            recent,
            json,
        } => {
            let config = load(&config, None)?;
            let query: Arc<dyn TelemetryQuery> =
                Arc::new(StaticTelemetry::from_files(&baseline, &recent)?);
            let engine = DependencyHealthEngine::from_config(&config, query);

            let report = engine.report(&instance).await?;
            finish(&report, json)?;
        }

        Commands::Fetch {
            url,
            instance,
            json,
        } => {
            let client = DependencyHealthClient::new(url);
            let report = client.report(&instance).await?;
            finish(&report, json)?;
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so report output on stdout stays machine-readable
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn load(path: &Path, workspace_id: Option<String>) -> anyhow::Result<AgentConfig> {
    let mut config = load_config(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    if let Some(workspace_id) = workspace_id {
        config.workspace_id = workspace_id;
    }
    Ok(config)
}

/// Print the report and exit non-zero unless it is healthy
fn finish(report: &HealthReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_summary(report);
    }

    if !report.is_healthy() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(report: &HealthReport) {
    println!("{} {}", report.instance.bold(), paint(report.status));

    for (name, entry) in &report.entries {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        println!(
            "  {:<28} {:<10} {:>6.2}% failed ({}/{})  {}  [{}]",
            name,
            paint(entry.status),
            entry.failed_rate(),
            entry.failed,
            entry.total,
            timespan::format(&entry.duration).dimmed(),
            tags.join(", "),
        );
    }

    if report.entries.is_empty() {
        println!("  {}", "no critical dependencies observed".dimmed());
    }
}

fn paint(status: HealthStatus) -> colored::ColoredString {
    match status {
        HealthStatus::Healthy => status.as_str().green(),
        HealthStatus::Degraded => status.as_str().yellow(),
        HealthStatus::Unhealthy => status.as_str().red(),
    }
}
