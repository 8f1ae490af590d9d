use clap::Parser;
use std::path::PathBuf;

use crate::config::IdStrategy;

/// GRC Schema Builder - headless editor for GRC schema documents
#[derive(Parser, Debug, Clone)]
#[command(name = "grc-schema-builder", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "GRC_SCHEMA_CONFIG", default_value = "grc-schema.toml")]
    pub config: PathBuf,

    /// Command script to replay (YAML or JSON)
    #[arg(short, long, env = "GRC_SCHEMA_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Schema document to start from instead of an empty one
    #[arg(short, long, env = "GRC_SCHEMA_INPUT")]
    pub input: Option<PathBuf>,

    /// Write the exported document here instead of stdout
    #[arg(short, long, env = "GRC_SCHEMA_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Identifier strategy for new entities
    #[arg(long, value_enum, env = "GRC_SCHEMA_IDS")]
    pub ids: Option<IdStrategy>,

    /// Log filter (e.g. "debug", "grc_schema_builder=trace")
    #[arg(long, env = "GRC_SCHEMA_LOG")]
    pub log_level: Option<String>,
}
