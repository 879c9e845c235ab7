//! Build Outcome Model
//!
//! Transient records describing one completed build attempt: the bundler's
//! error diagnostics and the metafile listing every output it wrote. A
//! `BuildOutcome` is produced once per build, handed to the post-build
//! hooks, and discarded; nothing here persists across builds.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub mod runner;

pub use runner::BuildRunner;

/// One error diagnostic reported by the bundler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildMessage {
    /// Human-readable message text
    pub text: String,
    /// Source file the message points at, when the bundler knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl BuildMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file: None,
        }
    }
}

/// Metadata the bundler records for a single output file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputInfo {
    /// Size of the output in bytes
    #[serde(default)]
    pub bytes: u64,
    /// Entry point this output was built from, if it is an entry chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

/// An esbuild-style metafile: which files the build actually wrote.
///
/// Output paths are relative to the build's working directory. The map is
/// ordered so that enumeration is deterministic, though hooks make no
/// ordering promises between outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metafile {
    /// Produced output path -> metadata
    #[serde(default)]
    pub outputs: BTreeMap<String, OutputInfo>,
}

impl Metafile {
    /// Parse a metafile from its JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse metafile JSON")
    }

    /// Read and parse a metafile from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read metafile at {}", path.display()))?;
        Self::from_json(&content)
    }
}

/// The result record of one build attempt
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    /// Error diagnostics; non-empty means the build failed
    pub errors: Vec<BuildMessage>,
    /// Output manifest, when the bundler produced one
    pub metafile: Option<Metafile>,
}

impl BuildOutcome {
    /// A successful outcome carrying the given metafile
    pub fn success(metafile: Metafile) -> Self {
        Self {
            errors: Vec::new(),
            metafile: Some(metafile),
        }
    }

    /// A failed outcome carrying the given diagnostics
    pub fn failure(errors: Vec<BuildMessage>) -> Self {
        Self {
            errors,
            metafile: None,
        }
    }

    /// Whether the build reported any errors
    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}
