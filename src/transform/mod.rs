//! Transformer Seam
//!
//! The obfuscation itself is delegated to an external routine behind the
//! `Transformer` trait: source text and an opaque options object in,
//! transformed text out. No option key is interpreted anywhere in this
//! crate; the set of recognized options belongs to the external program and
//! changes independently of it.

use async_trait::async_trait;
use thiserror::Error;

pub mod command;

pub use command::CommandTransformer;

/// Errors from invoking a transformer
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Transformer program '{0}' not found on PATH")]
    ProgramNotFound(String),

    #[error("Failed to run transformer: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transformer exited with {status}: {stderr}")]
    Failed {
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Transformer produced invalid UTF-8 output")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

/// An opaque source-to-source transformation
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Transform `source`, forwarding `options` verbatim.
    ///
    /// Implementations must treat `options` as a black box owned by the
    /// external transformation routine.
    async fn transform(
        &self,
        source: &str,
        options: &serde_json::Value,
    ) -> Result<String, TransformError>;
}
