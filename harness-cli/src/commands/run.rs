//! Run command - Work through the pending phases of a plan

use std::path::PathBuf;

use clap::Args;
use harness_core::{
    run_harness, Backend, ClaudeBackend, Config, ConfigOverrides, ConsoleReporter,
    HarnessOptions, StdinPrompt,
};

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Maximum number of agent iterations [default: 20]
    #[arg(short = 'n', long = "max")]
    pub max: Option<u32>,

    /// Show pending phases only, without running the agent
    #[arg(short, long)]
    pub status: bool,

    /// Project root; documents are resolved and the agent runs here
    #[arg(short = 'd', long, default_value = ".")]
    pub root: PathBuf,

    /// Plan document (defaults to plan.md)
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Execution prompt document (defaults to .claude/commands/execute.md)
    #[arg(long)]
    pub prompt: Option<PathBuf>,
}

impl RunArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            plan_path: self.plan.clone(),
            prompt_path: self.prompt.clone(),
            max_iterations: self.max,
            ..Default::default()
        }
    }

    /// Execute the run command
    pub async fn execute(&self, verbose: bool, config: Config) -> anyhow::Result<()> {
        // Resolve to absolute path
        let root = if self.root.is_absolute() {
            self.root.clone()
        } else {
            std::env::current_dir()?.join(&self.root)
        };

        let config = config.with_cli_overrides(self.overrides());
        let paths = config.harness.resolve_paths(&root);

        if verbose {
            tracing::info!(
                root = %root.display(),
                plan = %paths.plan.display(),
                prompt = %paths.prompt.display(),
                max_iterations = config.harness.max_iterations,
                status_only = self.status,
                "Starting plan harness"
            );
        }

        println!("============================================================");
        println!("Execute Harness ({})", config.agent.claude_path);
        println!("============================================================");

        let backend = ClaudeBackend::from_config(&config.agent).with_workdir(root.clone());
        if !self.status && !backend.is_available() {
            tracing::warn!(
                claude_path = %config.agent.claude_path,
                "Agent executable did not respond to --version"
            );
        }

        let options = HarnessOptions {
            paths,
            max_iterations: config.harness.max_iterations,
            status_only: self.status,
        };

        let mut operator = StdinPrompt::new();
        let mut reporter = ConsoleReporter::new(verbose);
        run_harness(&options, &backend, &mut operator, &mut reporter).await?;

        Ok(())
    }
}
