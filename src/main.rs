//! agentpage - settlement-aware semantic page mapping for browser-driving agents
//!
//! Main entry point: loads the configuration, hosts the browser tools
//! extension and exposes it over stdin/stdout.

mod cli;
mod serve;

use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agentpage_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};
use agentpage_core::Host;
use agentpage_tools_browser::BrowserToolsExtension;

use cli::{Cli, Commands};

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_dir = Path::new(&logging.dir);
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("agentpage")
        .filename_suffix("log")
        .max_log_files(14)
        .build(log_dir)
        .context("Failed to create log file appender")?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Dropping the guard stops the writer thread.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries tool results, so the console layer writes to stderr.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if cli.command == Some(Commands::CheckConfig) {
        return check_config(&config);
    }

    init_tracing(&config.logging)?;
    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config: {}", warning);
    }
    if !validation.is_valid() {
        for error in &validation.errors {
            eprintln!("config error: {}", error);
        }
        bail!("Invalid configuration ({} errors)", validation.errors.len());
    }

    info!("Starting agentpage v{}", env!("CARGO_PKG_VERSION"));
    let work_dir = std::env::current_dir().context("Failed to get current directory")?;
    let host = Host::new(work_dir);
    host.load_extension(Box::new(BrowserToolsExtension::from_config(&config)), json!({}))
        .await
        .context("Failed to load browser tools")?;

    let outcome = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            serve::serve(&host, stdin, tokio::io::stdout()).await
        }
        Commands::Map { url } => map(&host, &url).await,
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&host.list_tools())?);
            Ok(())
        }
        Commands::CheckConfig => Ok(()),
    };

    host.shutdown().await;
    info!("agentpage stopped");
    outcome
}

/// Open `url` in a fresh page and print its manifest.
async fn map(host: &Host, url: &str) -> anyhow::Result<()> {
    let result = host
        .call_tool("browser_open", json!({ "url": url }), host.tool_context("cli"))
        .await?;
    if !result.success {
        bail!("{}", result.error.unwrap_or_else(|| "browser_open failed".to_string()));
    }
    println!("{}", result.content);
    Ok(())
}

fn check_config(config: &Config) -> anyhow::Result<()> {
    let validation = ConfigValidator::validate(config);
    for warning in &validation.warnings {
        println!("warning: {}", warning);
    }
    for error in &validation.errors {
        println!("error: {}", error);
    }
    if !validation.is_valid() {
        bail!("Invalid configuration ({} errors)", validation.errors.len());
    }
    println!("Configuration OK");
    Ok(())
}
