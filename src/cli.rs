//! Command-line interface argument parsing.
//!
//! Global flags pick the data folder, config file, verbosity and filters;
//! subcommands choose between the desktop dashboard and the terminal/report
//! outputs.

use crate::data::MedalType;
use crate::filters::FilterSelection;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Podium - Paris 2024 Olympic Games dashboard
///
/// Explore the Games' CSV datasets in a desktop window, or print summaries
/// and export a static chart report from the terminal.
///
/// Examples:
///   podium --data-dir ./data
///   podium summary --format json
///   podium --continent Europe report --output ./report --archive
///   podium head-to-head USA CHN
///   podium daily 2024-07-27
#[derive(Parser, Debug, Clone)]
#[command(name = "podium", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Folder holding the CSV files
    #[arg(short, long, value_name = "DIR", env = "PODIUM_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for podium.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Countries to keep, as NOC codes (comma-separated)
    #[arg(long = "country", value_name = "CODES", value_delimiter = ',', global = true)]
    pub countries: Vec<String>,

    /// Continents to keep (comma-separated)
    #[arg(long = "continent", value_name = "NAMES", value_delimiter = ',', global = true)]
    pub continents: Vec<String>,

    /// Sports to keep (comma-separated)
    #[arg(long = "sport", value_name = "NAMES", value_delimiter = ',', global = true)]
    pub sports: Vec<String>,

    /// Medal types to keep: gold, silver, bronze (comma-separated)
    #[arg(long = "medal", value_name = "TYPES", value_delimiter = ',', global = true)]
    pub medals: Vec<MedalType>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open the desktop dashboard (default)
    Gui,

    /// Print the headline numbers and medal standings
    Summary {
        /// Output format
        #[arg(long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Render every chart and write a static HTML report
    Report {
        /// Output directory (defaults to the config's report.output_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Also bundle the report into report.zip
        #[arg(long)]
        archive: bool,

        /// Open index.html when done
        #[arg(long)]
        open: bool,

        /// Image width in pixels
        #[arg(long, value_name = "PX")]
        width: Option<u32>,

        /// Image height in pixels
        #[arg(long, value_name = "PX")]
        height: Option<u32>,
    },

    /// Compare two countries side by side
    HeadToHead {
        /// First NOC code
        a: String,
        /// Second NOC code
        b: String,
    },

    /// Show one day's events, medals and top countries
    Daily {
        /// Day as YYYY-MM-DD
        date: String,

        /// Only list medal events in the schedule
        #[arg(long)]
        medal_events: bool,
    },

    /// Show an athlete's profile
    Athlete {
        /// Athlete name as written in athletes.csv
        name: String,
    },

    /// List the loaded tables with row and column counts
    Tables,

    /// Write a default podium.toml to the current directory
    InitConfig,
}

/// Output format for terminal summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand, defaulting to the dashboard.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Gui)
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// True when any filter flag was given.
    pub fn has_filters(&self) -> bool {
        !self.countries.is_empty()
            || !self.continents.is_empty()
            || !self.sports.is_empty()
            || !self.medals.is_empty()
    }

    /// Overlay the filter flags on `base`. Each flag given replaces that
    /// dimension, the others keep the base value.
    pub fn filters_over(&self, base: &FilterSelection) -> FilterSelection {
        let mut selection = base.clone();
        if !self.countries.is_empty() {
            selection.countries = self.countries.iter().map(|c| c.trim().to_uppercase()).collect();
        }
        if !self.continents.is_empty() {
            selection.continents = self.continents.clone();
        }
        if !self.sports.is_empty() {
            selection.sports = self.sports.clone();
        }
        if !self.medals.is_empty() {
            selection.medal_types = self.medals.clone();
        }
        selection
    }
}
