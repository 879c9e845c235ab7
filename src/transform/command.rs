//! Subprocess Transformer
//!
//! Delegates transformation to an external obfuscator program. The program
//! contract is narrow: source arrives on stdin, the options object is passed
//! as a single JSON argument, transformed source comes back on stdout. The
//! stock `javascript-obfuscator` CLI wants one flag per option, which would
//! force this crate to interpret option keys; a thin wrapper script adapts
//! it to this contract instead.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{TransformError, Transformer};

/// Default external obfuscator program
pub const DEFAULT_PROGRAM: &str = "javascript-obfuscator";

/// `Transformer` backed by an external command
pub struct CommandTransformer {
    program: String,
}

impl CommandTransformer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CommandTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

#[async_trait]
impl Transformer for CommandTransformer {
    async fn transform(
        &self,
        source: &str,
        options: &serde_json::Value,
    ) -> Result<String, TransformError> {
        let program = which::which(&self.program)
            .map_err(|_| TransformError::ProgramNotFound(self.program.clone()))?;

        tracing::debug!("Invoking transformer {}", program.display());

        let mut child = Command::new(program)
            .arg(options.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            TransformError::Io(std::io::Error::other("Failed to open transformer stdin"))
        })?;

        // Feed stdin from a separate task so a program that fills its stdout
        // pipe before draining stdin cannot deadlock the call. A write error
        // here means the program exited early; its exit status is the signal
        // that matters, so the error itself is dropped.
        let source = source.to_string();
        let writer = tokio::spawn(async move {
            let _ = stdin.write_all(source.as_bytes()).await;
        });

        let output = child.wait_with_output().await?;
        let _ = writer.await;

        if !output.status.success() {
            return Err(TransformError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}
