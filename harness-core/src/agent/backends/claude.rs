//! Claude Code backend implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdout, Command};

use crate::config::AgentConfig;
use crate::{Error, Result};

use super::super::output::{OutputStreamer, ResponseUnit};
use super::super::spawn::AgentHandle;
use super::{Backend, ResponseStream};

/// Claude Code backend implementation
#[derive(Debug, Clone)]
pub struct ClaudeBackend {
    pub claude_path: String,
    pub model: Option<String>,
    pub permission_mode: Option<String>,
    pub allowed_tools: Vec<String>,
    pub workdir: PathBuf,
}

impl ClaudeBackend {
    /// Create a new Claude backend with default settings
    pub fn new() -> Self {
        Self {
            claude_path: "claude".to_string(),
            model: None,
            permission_mode: None,
            allowed_tools: Vec::new(),
            workdir: PathBuf::from("."),
        }
    }

    /// Create a Claude backend from the agent section of the config
    pub fn from_config(config: &AgentConfig) -> Self {
        let mut backend = Self::new()
            .with_path(&config.claude_path)
            .with_allowed_tools(config.allowed_tools.clone());
        backend.model = config.model.clone();
        backend.permission_mode = config.permission_mode.clone();
        backend
    }

    /// Create a Claude backend with custom path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.claude_path = path.into();
        self
    }

    /// Create a Claude backend with a specific model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set allowed tools
    pub fn with_allowed_tools(mut self, tools: Vec<String>) -> Self {
        self.allowed_tools = tools;
        self
    }

    /// Set the directory the agent runs in
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Build the command to spawn this backend
    pub fn build_command(&self, workdir: &Path) -> Command {
        let mut cmd = Command::new(&self.claude_path);
        cmd.arg("--print")
            .arg("--verbose")
            .arg("--output-format")
            .arg("stream-json");

        if let Some(ref model) = self.model {
            cmd.arg("--model").arg(model);
        }

        if let Some(ref mode) = self.permission_mode {
            cmd.arg("--permission-mode").arg(mode);
        }

        if !self.allowed_tools.is_empty() {
            cmd.arg("--allowedTools").arg(self.allowed_tools.join(","));
        }

        cmd.current_dir(workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }

    async fn spawn(&self, prompt: &str) -> Result<AgentHandle> {
        let workdir = self.workdir.as_path();
        let workdir_str = workdir
            .to_str()
            .ok_or_else(|| Error::Agent("Invalid working directory path".to_string()))?
            .to_string();

        if !workdir.exists() {
            return Err(Error::Agent(format!(
                "Working directory does not exist: {}",
                workdir_str
            )));
        }

        // Prompt goes over stdin; `--allowedTools` is variadic and would
        // consume a trailing positional argument
        let mut cmd = self.build_command(workdir);

        tracing::debug!(
            claude_path = %self.claude_path,
            workdir = %workdir_str,
            prompt_len = prompt.len(),
            "Spawning claude"
        );

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Agent(format!(
                    "Claude executable not found at '{}'. Is Claude Code installed?",
                    self.claude_path
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Agent("Failed to capture agent stdin".to_string()))?;
        let prompt = prompt.to_string();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                tracing::warn!(error = %e, "Failed to write prompt to agent stdin");
            }
            // Dropping stdin closes the pipe so the agent sees EOF
        });

        Ok(AgentHandle::new(child, workdir_str))
    }
}

impl Default for ClaudeBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for ClaudeBackend {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn execute(&self, prompt: &str) -> Result<Box<dyn ResponseStream>> {
        let mut handle = self.spawn(prompt).await?;
        let stdout = handle.take_stdout()?;

        Ok(Box::new(ClaudeStream {
            streamer: OutputStreamer::new(stdout),
            handle,
            finished: false,
        }))
    }

    fn is_available(&self) -> bool {
        std::process::Command::new(&self.claude_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

/// Output of a running claude process
///
/// Yields one unit per stream-json line, then checks the exit status once
/// stdout closes.
pub struct ClaudeStream {
    streamer: OutputStreamer<ChildStdout>,
    handle: AgentHandle,
    finished: bool,
}

#[async_trait]
impl ResponseStream for ClaudeStream {
    async fn next_unit(&mut self) -> Result<Option<ResponseUnit>> {
        if self.finished {
            return Ok(None);
        }

        match self.streamer.next_unit().await? {
            Some(unit) => Ok(Some(unit)),
            None => {
                self.finished = true;
                self.handle.finish().await?;
                Ok(None)
            }
        }
    }
}
