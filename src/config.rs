//! Configuration file handling.
//!
//! Settings come from `podium.toml`; command-line flags override them.

use crate::cli::Args;
use crate::filters::FilterSelection;
use crate::report::ReportSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "podium.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub report: ReportConfig,

    /// Filters applied when nothing is given on the command line.
    #[serde(default)]
    pub filters: FilterSelection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Folder holding the CSV files.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Report generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Chart image width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Chart image height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Countries shown in the standings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Bundle the report into a ZIP archive.
    #[serde(default)]
    pub archive: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            width: default_width(),
            height: default_height(),
            top_n: default_top_n(),
            archive: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("report")
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    700
}

fn default_top_n() -> usize {
    10
}

impl ReportConfig {
    pub fn settings(&self) -> ReportSettings {
        ReportSettings {
            width: self.width,
            height: self.height,
            top_n: self.top_n,
            archive: self.archive,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `podium.toml` from `dir` if it exists.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// The explicit `--config` file, else `./podium.toml`, else defaults.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::load_from_dir(Path::new("."))?.unwrap_or_default(),
        };
        config.merge_with_args(args);
        Ok(config)
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(dir) = &args.data_dir {
            self.data.dir = dir.clone();
        }
        if args.has_filters() {
            self.filters = args.filters_over(&self.filters);
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Write the defaults to `dir/podium.toml`, refusing to overwrite.
    pub fn init(dir: &Path) -> Result<PathBuf> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            anyhow::bail!("{} already exists. Remove it first or edit it manually.", path.display());
        }
        std::fs::write(&path, Self::default_toml())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MedalType;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.dir, PathBuf::from("data"));
        assert_eq!(config.report.width, 1200);
        assert_eq!(config.report.top_n, 10);
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[data]
dir = "/srv/paris"

[report]
output_dir = "out"
width = 800
archive = true

[filters]
continents = ["Europe"]
medal_types = ["gold"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.data.dir, PathBuf::from("/srv/paris"));
        assert_eq!(config.report.width, 800);
        assert_eq!(config.report.height, 700);
        assert!(config.report.settings().archive);
        assert_eq!(config.filters.continents, vec!["Europe"]);
        assert_eq!(config.filters.medal_types, vec![MedalType::Gold]);
        assert!(config.filters.sports.is_empty());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[report]"));
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config {
            filters: FilterSelection {
                sports: vec!["Judo".into()],
                ..FilterSelection::default()
            },
            ..Config::default()
        };
        let args = Args::try_parse_from(["podium", "--data-dir", "/tmp/games", "--country", "KEN"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.data.dir, PathBuf::from("/tmp/games"));
        assert_eq!(config.filters.countries, vec!["KEN"]);
        assert_eq!(config.filters.sports, vec!["Judo"]);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = Config::init(dir.path()).unwrap();
        assert!(path.exists());
        assert!(Config::load_from_dir(dir.path()).unwrap().is_some());
        assert!(Config::init(dir.path()).is_err());
    }
}
