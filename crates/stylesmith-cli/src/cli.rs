//! Command-line arguments.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use stylesmith::AnalysisOptions;

#[derive(Parser, Debug)]
#[command(
    name = "stylesmith",
    version,
    about = "Compile nested YAML style definitions to CSS and analyze them",
    propagate_version = true
)]
pub struct Args {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a style file and print its findings
    Check {
        /// YAML style file
        file: PathBuf,
    },

    /// Compile a style file to CSS
    Compile {
        /// YAML style file
        file: PathBuf,

        /// Write CSS here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze a style file for repeated patterns and naming problems
    Analyze {
        /// YAML style file
        file: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        #[command(flatten)]
        tuning: Tuning,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Yaml,
}

#[derive(clap::Args, Debug, Default)]
pub struct Tuning {
    /// YAML file with analysis options (minimum_cohesion, minimum_frequency, max_depth)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum similarity for patterns to share a cluster, 0.0 to 1.0
    #[arg(long, value_name = "RATIO")]
    pub min_cohesion: Option<f64>,

    /// Minimum occurrences before a pattern is reported
    #[arg(long, value_name = "N")]
    pub min_frequency: Option<usize>,

    /// Deepest nesting level compared by the sibling detector
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Number of analysis reports kept in memory
    #[arg(long, value_name = "N", default_value_t = 64)]
    pub cache_capacity: usize,
}

impl Tuning {
    /// Config file first, then flag overrides.
    pub fn options(&self) -> Result<AnalysisOptions> {
        let base = match &self.config {
            Some(path) => load_options(path)?,
            None => AnalysisOptions::default(),
        };

        let mut builder = base.to_builder();
        if let Some(value) = self.min_cohesion {
            builder = builder.minimum_cohesion(value);
        }
        if let Some(value) = self.min_frequency {
            builder = builder.minimum_frequency(value);
        }
        if let Some(value) = self.max_depth {
            builder = builder.max_depth(value);
        }
        builder.build().context("invalid analysis options")
    }
}

fn load_options(path: &Path) -> Result<AnalysisOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}
