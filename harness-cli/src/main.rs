//! Plan Harness CLI - Drive a coding agent through a plan document
//!
//! Repeatedly runs Claude Code with a fixed execution prompt until every
//! `#### Phase N-M` heading in the plan carries a completion mark.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use harness_core::{Config, ConfigOverrides};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::RunArgs;

/// Plan Harness: execute plan.md phases with Claude Code
#[derive(Parser, Debug)]
#[command(name = "plan-harness")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to claude executable (overrides config and env)
    #[arg(long, global = true, env = "PLAN_HARNESS_CLAUDE_PATH")]
    claude_path: Option<String>,

    /// Model to use (overrides config and env)
    #[arg(long, global = true, env = "PLAN_HARNESS_MODEL")]
    model: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run arguments used when no subcommand is given
    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Work through the pending phases of the plan
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for agent output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(
        cli.config.as_deref(),
        ConfigOverrides {
            claude_path: cli.claude_path.clone(),
            model: cli.model.clone(),
            ..Default::default()
        },
    )?;

    if cli.verbose {
        tracing::info!(
            claude_path = %config.agent.claude_path,
            model = ?config.agent.model,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("plan-harness {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Run(args)) => {
            args.execute(cli.verbose, config).await?;
        }
        Some(Commands::Config) => print_config(&config, cli.config.as_deref()),
        None => {
            cli.run.execute(cli.verbose, config).await?;
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit: Option<&std::path::Path>) {
    println!("Plan Harness Configuration");
    println!("==========================");
    println!();
    println!("Agent Settings:");
    println!("  claude_path: {}", config.agent.claude_path);
    println!(
        "  model: {}",
        config.agent.model.as_deref().unwrap_or("(default)")
    );
    println!(
        "  permission_mode: {}",
        config.agent.permission_mode.as_deref().unwrap_or("(default)")
    );
    println!("  allowed_tools: {}", config.agent.allowed_tools.join(", "));
    println!();
    println!("Harness Settings:");
    println!("  plan_path: {}", config.harness.plan_path.display());
    println!("  prompt_path: {}", config.harness.prompt_path.display());
    println!("  max_iterations: {}", config.harness.max_iterations);
    println!();

    let path = explicit
        .map(|p| p.to_path_buf())
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_top_level_run_args() {
        let cli = Cli::try_parse_from(["plan-harness", "-n", "5", "--status"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.max, Some(5));
        assert!(cli.run.status);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["plan-harness"]).unwrap();
        assert_eq!(cli.run.max, None);
        assert!(!cli.run.status);
        assert_eq!(cli.run.root, PathBuf::from("."));
    }

    #[test]
    fn test_run_subcommand() {
        let cli = Cli::try_parse_from(["plan-harness", "run", "--max", "2", "-d", "/work"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.max, Some(2));
                assert_eq!(args.root, PathBuf::from("/work"));
            }
            other => panic!("Expected run subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_numeric_max() {
        assert!(Cli::try_parse_from(["plan-harness", "--max", "lots"]).is_err());
    }
}
