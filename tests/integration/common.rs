use anyhow::Result;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use shroud::build::{Metafile, OutputInfo};
use shroud::transform::{TransformError, Transformer};

/// Test utilities for integration tests
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub project_path: PathBuf,
    pub config_dir: TempDir,
}

impl TestEnvironment {
    /// Create a new test environment with a temporary project directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let config_dir = TempDir::new()?;
        let project_path = temp_dir.path().to_path_buf();

        // Point the config layer at a throwaway directory
        env::set_var("XDG_CONFIG_HOME", config_dir.path());

        Ok(Self {
            temp_dir,
            project_path,
            config_dir,
        })
    }

    /// Write a build output file under the project directory
    pub fn write_output(&self, rel_path: &str, content: &str) -> Result<PathBuf> {
        let child = self.temp_dir.child(rel_path);
        child.write_str(content)?;
        Ok(child.path().to_path_buf())
    }

    /// Build a metafile listing the given output paths
    pub fn metafile_for(&self, paths: &[&str]) -> Metafile {
        let mut metafile = Metafile::default();
        for path in paths {
            metafile
                .outputs
                .insert(path.to_string(), OutputInfo::default());
        }
        metafile
    }
}

/// Deterministic stand-in for the external obfuscator: renames every
/// declared function and all references to it. Non-identity for any input
/// that declares a function, identity for empty input.
pub struct RenameTransformer;

#[async_trait]
impl Transformer for RenameTransformer {
    async fn transform(
        &self,
        source: &str,
        _options: &serde_json::Value,
    ) -> Result<String, TransformError> {
        let decl = Regex::new(r"function\s+([A-Za-z_$][A-Za-z0-9_$]*)").unwrap();

        let mut renames: HashMap<String, String> = HashMap::new();
        for caps in decl.captures_iter(source) {
            let count = renames.len();
            renames
                .entry(caps[1].to_string())
                .or_insert_with(|| format!("_0x{:04x}", 0x1a2b + count));
        }

        let mut result = source.to_string();
        for (from, to) in &renames {
            let word = Regex::new(&format!(r"\b{}\b", regex::escape(from))).unwrap();
            result = word.replace_all(&result, to.as_str()).into_owned();
        }

        Ok(result)
    }
}
