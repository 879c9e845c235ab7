//! Hook Manager
//!
//! Manages registration and execution of post-build hooks.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::{BuildHook, HookContext};
use crate::build::BuildOutcome;

/// Manages build lifecycle hooks
pub struct HookManager {
    /// Registered hooks, run in registration order
    hooks: RwLock<Vec<Arc<dyn BuildHook>>>,
}

impl HookManager {
    /// Create a new hook manager with no hooks
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Register a hook to run after each build
    pub async fn register(&self, hook: Arc<dyn BuildHook>) {
        let mut hooks = self.hooks.write().await;
        hooks.push(hook);
    }

    /// Run every registered hook against a finished build.
    ///
    /// Hooks run sequentially in registration order; the first hook error
    /// stops the pass and propagates to the caller as a build-step failure.
    pub async fn run_build_end(&self, outcome: &BuildOutcome, ctx: &HookContext) -> Result<()> {
        let hooks = self.hooks.read().await;

        for hook in hooks.iter() {
            tracing::debug!("Running build-end hook '{}'", hook.name());
            hook.on_build_end(outcome, ctx)
                .await
                .with_context(|| format!("Hook '{}' failed", hook.name()))?;
        }

        Ok(())
    }

    /// List registered hooks as (name, description) pairs
    pub async fn list_hooks(&self) -> Vec<(String, String)> {
        let hooks = self.hooks.read().await;
        hooks
            .iter()
            .map(|h| (h.name().to_string(), h.description().to_string()))
            .collect()
    }
}

impl Default for HookManager {
    fn default() -> Self {
        Self::new()
    }
}
