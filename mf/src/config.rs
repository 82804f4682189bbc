//! Configuration for modfix

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::anchors::{LinkScope, TemplateAnchors};

/// Placeholder in `file-pattern` replaced by the module number
pub const NUMBER_PLACEHOLDER: &str = "{number}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub log_level: Option<String>,

    /// Directory holding the module pages
    pub modules_dir: PathBuf,

    /// File name of a module page; `{number}` is replaced by the module number
    pub file_pattern: String,

    /// Fail a module when an anchor does not match exactly as expected
    pub strict: bool,

    /// How the forward link is rewritten
    pub next_link_scope: LinkScope,

    /// Optional catalog file replacing the built-in module table
    pub catalog: Option<PathBuf>,

    /// Literal pieces of the module-1 page
    pub anchors: TemplateAnchors,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            modules_dir: PathBuf::from("src/pages/modules"),
            file_pattern: format!("m{}.js", NUMBER_PLACEHOLDER),
            strict: true,
            next_link_scope: LinkScope::default(),
            catalog: None,
            anchors: TemplateAnchors::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// 1. Explicit `--config` path
    /// 2. `./modfix.yml`
    /// 3. `~/.config/modfix/modfix.yml`
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let default_paths = [
            Some(PathBuf::from("modfix.yml")),
            dirs::config_dir().map(|p| p.join("modfix").join("modfix.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(p) => p.clone(),
            None => PathBuf::from("modfix.yml"),
        };
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Path of the page for module `number`
    pub fn page_path(&self, number: u32) -> PathBuf {
        let name = self.file_pattern.replace(NUMBER_PLACEHOLDER, &number.to_string());
        self.modules_dir.join(name)
    }
}
