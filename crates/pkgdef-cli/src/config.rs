use anyhow::{Context, Result};
use pkgdef::ErrorCode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_true")]
    pub colored: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub deny_warnings: bool,

    #[serde(default = "default_true")]
    pub show_suggestions: bool,

    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    pkgdef::EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            colored: true,
            verbose: false,
            deny_warnings: false,
            show_suggestions: true,
            ignore: Vec::new(),
            extensions: default_extensions(),
        }
    }
}

pub const DEFAULT_CONFIG: &str = r#"# pkgdef configuration file

# Enable colored output in terminal
colored = true

# Log what the checker is doing
verbose = false

# Treat warnings as failures
deny_warnings = false

# Print suggestions (e.g. duplicate keys)
show_suggestions = true

# Rule codes to hide, e.g. ["PL008"]
ignore = []

# File extensions picked up when checking a directory
extensions = ["pkgdef", "pkgundef"]
"#;

impl Config {
    /// Loads `.pkgdefrc` from the working directory, then `~/.pkgdefrc`.
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from(".pkgdefrc"),
            PathBuf::from(".pkgdefrc.toml"),
        ];
        if let Some(home) = dirs::home_dir() {
            config_paths.push(home.join(".pkgdefrc"));
        }

        for path in config_paths {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Config::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Writes the commented default config to `path`.
    pub fn create_default(path: &Path) -> Result<()> {
        fs::write(path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn merge_cli_args(
        &mut self,
        no_color: bool,
        verbose: bool,
        deny_warnings: bool,
        ignore: Vec<String>,
    ) {
        if no_color {
            self.colored = false;
        }
        if verbose {
            self.verbose = true;
        }
        if deny_warnings {
            self.deny_warnings = true;
        }
        self.ignore.extend(ignore);
    }

    /// The `ignore` list as rule codes. Unknown codes are logged and skipped.
    pub fn ignored_codes(&self) -> HashSet<ErrorCode> {
        self.ignore
            .iter()
            .filter_map(|code| match code.parse::<ErrorCode>() {
                Ok(code) => Some(code),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            })
            .collect()
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}
