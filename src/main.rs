// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use valuation_agents::config::DEFAULT_CONFIG_PATH;
use valuation_agents::utils::logging::{format_artifact, format_error, format_success};
use valuation_agents::{
    Config, PipelineCoordinator, ProgressTracker, ProviderRegistry, StageKind, Validator,
};

#[derive(Parser)]
#[command(name = "valuation_agents")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Agent-based workflow engine for vehicle valuation", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "VALUATION_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the decompose -> search -> extract -> summarize -> export pipeline
    Run {
        /// Free-text query, e.g. "Find the price of a 2017 Roadtrek CS Adventurous XL in Texas"
        query: String,

        /// Where to write the exported table (defaults to export.output_path)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Also write the full run report as JSON
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,

        /// Hide intermediate artifacts
        #[arg(short, long)]
        quiet: bool,
    },

    /// List recognized model providers and whether they are configured
    Providers,

    /// Load and validate the configuration, then show stage bindings
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    colored::control::set_override(cli.color);
    valuation_agents::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());
    let config = Config::load(&cli.config).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            query,
            output,
            report,
            quiet,
        } => {
            cmd_run(&config, &query, output, report.as_deref(), quiet, cli.color).await?;
        }
        Commands::Providers => {
            cmd_providers(&config);
        }
        Commands::Check => {
            cmd_check(&config);
        }
    }

    Ok(())
}

async fn cmd_run(
    config: &Config,
    query: &str,
    output: Option<PathBuf>,
    report_path: Option<&Path>,
    quiet: bool,
    color: bool,
) -> Result<()> {
    Validator::validate_query(query)?;

    let coordinator = PipelineCoordinator::from_config(config, output)
        .context("Failed to build pipeline")?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received; cancelling the run (press Ctrl-C again to exit)");
        signal_token.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", format_error("Second interrupt; exiting"));
            std::process::exit(130);
        }
    });

    let tracker = ProgressTracker::with_color(!quiet, color);

    let report = coordinator
        .run_with(query, &tracker, &cancel)
        .await
        .context("Pipeline run failed")?;
    drop(tracker);

    println!();
    println!("{}", format_artifact("Summary", &report.summary.text));
    println!(
        "{}",
        format_success(&format!(
            "Results exported to {} ({} rows)",
            report.artifact.path.display(),
            report.artifact.rows
        ))
    );

    if let Some((stage, millis)) = report.stats.slowest_stage() {
        info!(
            "Run {} finished in {} ms (slowest stage: {} at {:.1}%, {} ms)",
            report.run_id,
            report.stats.total_millis,
            stage,
            report.stats.share(stage),
            millis
        );
    }

    if let Some(path) = report_path {
        let json = report.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Run report written to {}", path.display());
    }

    Ok(())
}

fn cmd_providers(config: &Config) {
    let registry = ProviderRegistry::new(config.clone());

    println!("\n{}", "Model providers".bold());
    for status in registry.available() {
        let kind = if status.hosted { "hosted" } else { "local" };
        let model = status.model.as_deref().unwrap_or("-");
        let line = format!("{:<8} {:<7} {}", status.id.as_str(), kind, model);

        if status.configured {
            println!("  {}", format_success(&line));
        } else {
            println!("  {} {}", format_error(&line), "(not configured)".dimmed());
        }
    }
    println!();
}

fn cmd_check(config: &Config) {
    println!("\n{}", format_success("Configuration is valid"));

    for stage in StageKind::ALL {
        let provider = config.stages.provider_for(stage).unwrap_or("(no model)");
        println!("  {:<10} -> {}", stage.name(), provider);
    }

    println!(
        "  {:<10} -> {}",
        "output",
        config.export.output_path.display()
    );
    println!("  {:<10} -> {}s\n", "timeout", config.http.timeout_secs);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_config_path_reads_environment_variable() {
        let command = Cli::command();
        let config = command
            .get_arguments()
            .find(|arg| arg.get_id() == "config")
            .unwrap();

        assert_eq!(
            config.get_env().and_then(|name| name.to_str()),
            Some("VALUATION_CONFIG")
        );
    }

    #[test]
    fn test_run_parses_output_and_report() {
        let cli = Cli::try_parse_from([
            "valuation_agents",
            "run",
            "Find the price of a 2017 Roadtrek",
            "--output",
            "out.csv",
            "--report",
            "run.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Run { query, output, report, quiet } => {
                assert_eq!(query, "Find the price of a 2017 Roadtrek");
                assert_eq!(output, Some(PathBuf::from("out.csv")));
                assert_eq!(report, Some(PathBuf::from("run.json")));
                assert!(!quiet);
            }
            _ => panic!("expected run command"),
        }
    }
}
