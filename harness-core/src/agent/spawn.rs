//! Handle to a spawned agent subprocess

use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout};
use tokio::task::JoinHandle;

use crate::{Error, Result};

/// Handle to a running agent process
pub struct AgentHandle {
    /// The child process (not Debug, so we skip it)
    child: Child,
    /// Background task collecting stderr
    stderr: Option<JoinHandle<String>>,
    /// Working directory for the agent
    workdir: String,
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("workdir", &self.workdir)
            .field("pid", &self.child.id())
            .field("child", &"<Child>")
            .finish()
    }
}

impl AgentHandle {
    /// Wrap a freshly spawned child, draining its stderr in the background
    pub fn new(mut child: Child, workdir: String) -> Self {
        let stderr = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = String::new();
                // Partial output is still useful if the pipe breaks
                let _ = pipe.read_to_string(&mut buf).await;
                buf
            })
        });

        Self {
            child,
            stderr,
            workdir,
        }
    }

    /// Take the child's stdout for streaming
    pub fn take_stdout(&mut self) -> Result<ChildStdout> {
        self.child
            .stdout
            .take()
            .ok_or_else(|| Error::Agent("Failed to capture agent stdout".to_string()))
    }

    /// Wait for the process to exit and fail unless it exited successfully
    pub async fn finish(&mut self) -> Result<()> {
        let status = self.child.wait().await.map_err(Error::Io)?;
        let stderr = match self.stderr.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            return Ok(());
        }

        let stderr = stderr.trim();
        if stderr.is_empty() {
            Err(Error::Agent(format!("Agent exited with status: {}", status)))
        } else {
            Err(Error::Agent(format!(
                "Agent exited with status: {}: {}",
                status, stderr
            )))
        }
    }
}
