//! Build Runner
//!
//! Executes the configured bundler command as a child process and turns the
//! result into a `BuildOutcome`. The bundler itself stays an external
//! collaborator: this crate never resolves modules or writes bundles, it
//! only runs the command and reads back the metafile the bundler wrote.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::{BuildMessage, BuildOutcome, Metafile};
use crate::config::BuildConfig;

/// Runs an external bundler build and collects its outcome
pub struct BuildRunner {
    config: BuildConfig,
    working_dir: PathBuf,
}

impl BuildRunner {
    pub fn new(config: BuildConfig, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            working_dir: working_dir.into(),
        }
    }

    /// Execute the build command and assemble its `BuildOutcome`.
    ///
    /// A non-zero exit turns the captured stderr into one diagnostic; a
    /// timeout is reported the same way. On success the configured metafile
    /// path is parsed; a missing or unparsable metafile leaves the outcome
    /// with `metafile: None` so the post-build hooks can report it.
    pub async fn run(&self) -> Result<BuildOutcome> {
        let timeout = tokio::time::Duration::from_secs(self.config.timeout_secs);

        tracing::debug!(
            "Running build command with {}s timeout: {}",
            self.config.timeout_secs,
            &self.config.command
        );

        // The bundler's stdout passes through; stderr is captured so a
        // failed build can be turned into diagnostics.
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.config.command)
            .current_dir(&self.working_dir)
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn build command")?;

        let mut stderr = child.stderr.take().context("Failed to capture stderr")?;
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(result) => result.context("Failed to wait for build command")?,
            Err(_) => {
                tracing::warn!(
                    "Build command timed out after {}s, killing it",
                    self.config.timeout_secs
                );
                if let Err(kill_err) = child.kill().await {
                    tracing::error!("Failed to kill timed-out build: {kill_err}");
                }
                return Ok(BuildOutcome::failure(vec![BuildMessage::new(format!(
                    "Build command timed out after {}s",
                    self.config.timeout_secs
                ))]));
            }
        };

        if !status.success() {
            let stderr_text = stderr_task.await.unwrap_or_default();
            let text = if stderr_text.trim().is_empty() {
                format!("Build command exited with {status}")
            } else {
                stderr_text.trim_end().to_string()
            };
            return Ok(BuildOutcome::failure(vec![BuildMessage::new(text)]));
        }

        Ok(BuildOutcome {
            errors: Vec::new(),
            metafile: self.read_metafile(),
        })
    }

    fn read_metafile(&self) -> Option<Metafile> {
        let path = self.metafile_path();
        if !path.exists() {
            tracing::debug!("No metafile at {}", path.display());
            return None;
        }

        match Metafile::load(&path) {
            Ok(metafile) => Some(metafile),
            Err(e) => {
                tracing::warn!("Ignoring unreadable metafile at {}: {e:#}", path.display());
                None
            }
        }
    }

    fn metafile_path(&self) -> PathBuf {
        let configured = Path::new(&self.config.metafile);
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.working_dir.join(configured)
        }
    }
}
