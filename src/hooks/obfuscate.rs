//! Obfuscation Hook
//!
//! The post-build hook this crate exists for. After a successful build it
//! rewrites every `.js` output listed in the metafile through the external
//! transformer, all files concurrently, each one in place.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::path::PathBuf;
use std::sync::Arc;

use super::types::{BuildHook, HookContext};
use crate::build::BuildOutcome;
use crate::transform::Transformer;

/// Outputs whose path ends with this suffix get transformed
const SOURCE_SUFFIX: &str = ".js";

/// Diagnostic emitted when a build completes without a metafile
pub const METAFILE_REQUIRED: &str = "Metafile is required for the obfuscator plugin to work.";

/// Rewrites `.js` build outputs through an external transformer
pub struct ObfuscateHook {
    transformer: Arc<dyn Transformer>,
    /// Forwarded verbatim to every transform call; owned by the external
    /// transformer, never inspected here
    options: serde_json::Value,
}

impl ObfuscateHook {
    pub fn new(transformer: Arc<dyn Transformer>, options: serde_json::Value) -> Self {
        Self {
            transformer,
            options,
        }
    }

    /// Read, transform, and overwrite one output file.
    ///
    /// The overwrite is destructive and not atomic; a crash mid-write can
    /// leave a partial file behind.
    async fn process_file(&self, path: PathBuf) -> Result<()> {
        let source = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read build output {}", path.display()))?;

        let transformed = self
            .transformer
            .transform(&source, &self.options)
            .await
            .with_context(|| format!("Failed to transform {}", path.display()))?;

        tokio::fs::write(&path, transformed)
            .await
            .with_context(|| format!("Failed to write build output {}", path.display()))?;

        tracing::debug!("Obfuscated {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl BuildHook for ObfuscateHook {
    fn name(&self) -> &str {
        "obfuscate"
    }

    fn description(&self) -> &str {
        "Rewrites .js build outputs in place through the external obfuscator"
    }

    async fn on_build_end(&self, outcome: &BuildOutcome, ctx: &HookContext) -> Result<()> {
        // A failed build already reports its own errors; nothing to do here.
        if outcome.failed() {
            return Ok(());
        }

        let Some(metafile) = &outcome.metafile else {
            tracing::error!("{METAFILE_REQUIRED}");
            return Ok(());
        };

        let tasks: Vec<_> = metafile
            .outputs
            .keys()
            .filter(|path| path.ends_with(SOURCE_SUFFIX))
            .map(|path| self.process_file(ctx.resolve(path)))
            .collect();

        tracing::debug!("Obfuscating {} of {} outputs", tasks.len(), metafile.outputs.len());

        // All files at once; the first failure aborts the wait and fails the
        // build step. Files whose tasks already finished stay rewritten.
        try_join_all(tasks).await?;

        Ok(())
    }
}
