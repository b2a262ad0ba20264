use cadence::{CampaignPlan, CampaignPlanner};
use cadence::domain::CampaignInput;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

const START_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

fn setup_logging(level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cadence")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("cadence.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let mut builder = env_logger::Builder::new();
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn parse_start(raw: &str) -> Result<NaiveDateTime> {
    for format in START_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(at);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(at) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(at);
    }
    Err(eyre!("Invalid start '{}', expected e.g. 2026-04-06T09:00", raw))
}

fn read_input(path: &Path) -> Result<CampaignInput> {
    let content = fs::read_to_string(path).context(format!("Failed to read input {}", path.display()))?;
    let input: CampaignInput =
        serde_json::from_str(&content).context(format!("Failed to parse input {}", path.display()))?;
    info!(
        "Read {} items, {} personas, {} channels from {}",
        input.items.len(),
        input.roster.personas.len(),
        input.roster.channels.len(),
        path.display()
    );
    Ok(input)
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize output")
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        eprintln!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Capacity { input } => handle_capacity_command(input, config),
        Commands::Plan {
            input,
            start,
            output,
            nested,
        } => handle_plan_command(input, start.as_deref(), output.as_deref(), *nested, cli.is_verbose(), config),
    }
}

fn handle_capacity_command(input: &Path, config: &Config) -> Result<()> {
    let input = read_input(input)?;
    let planner = CampaignPlanner::new(config.engine());
    let result = planner.capacity(&input).context("Capacity planning failed")?;

    println!("{}", to_json(&result, config.output.pretty)?);

    let verdict = if result.target_was_capped {
        "capped".yellow()
    } else {
        "within capacity".green()
    };
    eprintln!(
        "{} {} posts/week ({}, limited by {})",
        "Capacity:".cyan(),
        result.feasible_posts_per_week,
        verdict,
        result
            .capacities
            .limiting_factors
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

fn handle_plan_command(
    input: &Path,
    start: Option<&str>,
    output: Option<&Path>,
    nested: bool,
    verbose: bool,
    config: &Config,
) -> Result<()> {
    let input = read_input(input)?;
    let start = match start {
        Some(raw) => parse_start(raw)?,
        None => chrono::Local::now().naive_local(),
    };
    info!("Planning campaign starting {}", start);

    let planner = CampaignPlanner::new(config.engine());
    let plan = planner.plan(&input, start).context("Campaign planning failed")?;

    let json = if nested || config.output.nested {
        to_json(&plan.threads(), config.output.pretty)?
    } else {
        to_json(&plan, config.output.pretty)?
    };

    match output {
        Some(path) => {
            fs::write(path, json).context(format!("Failed to write plan to {}", path.display()))?;
            info!("Wrote plan to {}", path.display());
            eprintln!("{} {}", "Wrote:".green(), path.display());
        }
        None => println!("{}", json),
    }

    print_summary(&plan, verbose);
    Ok(())
}

fn print_summary(plan: &CampaignPlan, verbose: bool) {
    let report = &plan.report;
    eprintln!(
        "{} {} posts over {} weeks, {} comments ({})",
        "Plan:".green(),
        report.scheduled_items,
        report.weeks,
        report.comments,
        plan.fingerprint
    );
    if verbose {
        for week in &plan.weeks {
            eprintln!(
                "  week {}: {} items from {}, day targets {:?}",
                week.week,
                week.items.len(),
                week.week_start.format("%Y-%m-%d %H:%M"),
                week.day_targets
            );
        }
    }
    if !report.is_fully_compliant() {
        eprintln!(
            "{} {} relaxed picks, {} fallback placements ({} forced)",
            "Review:".yellow(),
            report.relaxed_picks,
            report.fallback_placements,
            report.forced_placements
        );
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging at the configured level
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
