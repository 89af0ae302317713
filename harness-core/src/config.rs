//! Configuration management for the plan harness
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (PLAN_HARNESS_*)
//! 3. Config file (~/.config/plan-harness/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tools the agent may use without asking, unless configured otherwise
pub const DEFAULT_ALLOWED_TOOLS: &[&str] = &["Read", "Write", "Edit", "Bash", "Glob", "Grep", "Task"];

/// Agent-related configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Path to the claude executable
    pub claude_path: String,

    /// Model to use for Claude
    pub model: Option<String>,

    /// Permission mode passed through to the agent
    pub permission_mode: Option<String>,

    /// Tools the agent is allowed to use
    pub allowed_tools: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            claude_path: "claude".to_string(),
            model: None, // Let claude use its default
            permission_mode: None,
            allowed_tools: DEFAULT_ALLOWED_TOOLS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Execution loop configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Plan document, relative to the project root unless absolute
    pub plan_path: PathBuf,

    /// Execution prompt document, relative to the project root unless absolute
    pub prompt_path: PathBuf,

    /// Maximum number of agent invocations per run
    pub max_iterations: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            plan_path: PathBuf::from("plan.md"),
            prompt_path: PathBuf::from(".claude").join("commands").join("execute.md"),
            max_iterations: 20,
        }
    }
}

/// Plan and prompt document locations, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessPaths {
    pub plan: PathBuf,
    pub prompt: PathBuf,
}

impl HarnessConfig {
    /// Resolve the document paths against a project root
    pub fn resolve_paths(&self, root: &Path) -> HarnessPaths {
        HarnessPaths {
            plan: root.join(&self.plan_path),
            prompt: root.join(&self.prompt_path),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub claude_path: Option<String>,
    pub model: Option<String>,
    pub plan_path: Option<PathBuf>,
    pub prompt_path: Option<PathBuf>,
    pub max_iterations: Option<u32>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Agent configuration
    pub agent: AgentConfig,

    /// Execution loop configuration
    pub harness: HarnessConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/plan-harness/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plan-harness").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - PLAN_HARNESS_CLAUDE_PATH: Path to claude executable
    /// - PLAN_HARNESS_MODEL: Model to use
    /// - PLAN_HARNESS_PLAN: Plan document path
    /// - PLAN_HARNESS_PROMPT: Prompt document path
    /// - PLAN_HARNESS_MAX_ITERATIONS: Iteration budget
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(claude_path) = std::env::var("PLAN_HARNESS_CLAUDE_PATH") {
            self.agent.claude_path = claude_path;
        }

        if let Ok(model) = std::env::var("PLAN_HARNESS_MODEL") {
            self.agent.model = Some(model);
        }

        if let Ok(plan) = std::env::var("PLAN_HARNESS_PLAN") {
            self.harness.plan_path = PathBuf::from(plan);
        }

        if let Ok(prompt) = std::env::var("PLAN_HARNESS_PROMPT") {
            self.harness.prompt_path = PathBuf::from(prompt);
        }

        if let Ok(max) = std::env::var("PLAN_HARNESS_MAX_ITERATIONS") {
            self.harness.max_iterations = max.trim().parse().map_err(|_| {
                Error::Config(format!("PLAN_HARNESS_MAX_ITERATIONS is not a number: {}", max))
            })?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(path) = overrides.claude_path {
            self.agent.claude_path = path;
        }

        if let Some(m) = overrides.model {
            self.agent.model = Some(m);
        }

        if let Some(plan) = overrides.plan_path {
            self.harness.plan_path = plan;
        }

        if let Some(prompt) = overrides.prompt_path {
            self.harness.prompt_path = prompt;
        }

        if let Some(max) = overrides.max_iterations {
            self.harness.max_iterations = max;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults. An explicit `config_file`
    /// replaces the default location and must exist.
    pub fn load_with_overrides(
        config_file: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };

        Ok(base.with_env_overrides()?.with_cli_overrides(overrides))
    }
}
