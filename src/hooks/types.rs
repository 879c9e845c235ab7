//! Hook Types
//!
//! Core types for the post-build hook system: the hook trait and the
//! context hooks act in.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::build::BuildOutcome;

/// Context passed to hooks when a build finishes
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Absolute directory that metafile output paths are resolved against
    pub working_dir: PathBuf,
}

impl HookContext {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// Resolve a metafile output path to an absolute filesystem path
    pub fn resolve(&self, output_path: &str) -> PathBuf {
        let path = Path::new(output_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

/// A callback run once per completed build attempt.
///
/// Returning `Err` fails the enclosing build step; "nothing to do" states
/// are a successful no-op, not an error.
#[async_trait]
pub trait BuildHook: Send + Sync {
    /// Get the name of this hook
    fn name(&self) -> &str;

    /// Get a description of what this hook does
    fn description(&self) -> &str {
        "No description available"
    }

    /// Run after a build attempt completes
    async fn on_build_end(&self, outcome: &BuildOutcome, ctx: &HookContext) -> Result<()>;
}
