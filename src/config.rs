use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::transform::command::DEFAULT_PROGRAM;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub obfuscator: ObfuscatorConfig,
}

/// Configuration for running the external bundler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Shell command that performs the build (default: esbuild with a metafile)
    #[serde(default = "default_build_command")]
    pub command: String,

    /// Metafile path the build writes, relative to the working directory
    #[serde(default = "default_metafile")]
    pub metafile: String,

    /// Timeout for the build command in seconds (default: 300)
    #[serde(default = "default_build_timeout")]
    pub timeout_secs: u64,
}

fn default_build_command() -> String {
    "npx esbuild src/index.js --bundle --outdir=dist --metafile=meta.json".to_string()
}

fn default_metafile() -> String {
    "meta.json".to_string()
}

fn default_build_timeout() -> u64 {
    300
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: default_build_command(),
            metafile: default_metafile(),
            timeout_secs: default_build_timeout(),
        }
    }
}

/// Configuration for the external obfuscator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscatorConfig {
    /// Program invoked to transform each output
    #[serde(default = "default_program")]
    pub program: String,

    /// Options forwarded verbatim to the transformer. Every key belongs to
    /// the external program; nothing here names, defaults, or validates one.
    #[serde(default = "default_options")]
    pub options: serde_json::Value,
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

fn default_options() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for ObfuscatorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            options: default_options(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            obfuscator: ObfuscatorConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;
        Ok(config_dir.join("shroud").join("config.toml"))
    }
}
