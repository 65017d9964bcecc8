use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use tokio::time::Instant;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use cli::run::{RunOptions, print_summary, run_cycles};
use config::Config;

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cycler")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("cycler.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        // Default: run with configured duration and speed
        None => handle_run_command(None, None, config).await,
        Some(Commands::Run { duration, speed }) => handle_run_command(*duration, *speed, config).await,
        Some(Commands::Config) => handle_config_command(config),
    }
}

async fn handle_run_command(duration: Option<f32>, speed: Option<f64>, config: &Config) -> Result<()> {
    let options = RunOptions::resolve(config, duration, speed);
    info!("Running cycles with {:?}", options);

    println!(
        "{} {} cycles for {:.2}s at {}x",
        "Running:".green(),
        config.cycles.len(),
        options.duration_secs,
        options.speed
    );

    let started = Instant::now();
    let reports = run_cycles(config, options).await.context("Cycle run failed")?;
    print_summary(&reports, started.elapsed());
    Ok(())
}

fn handle_config_command(config: &Config) -> Result<()> {
    info!("Printing effective configuration");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging before anything else can log
    setup_logging(cli.is_verbose()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
