use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;

use crate::cli::Cli;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub editor: EditorSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditorSettings {
    /// First position handed out when modules are reordered (0 or 1)
    #[serde(default)]
    pub reorder_base: i64,
    #[serde(default)]
    pub id_strategy: IdStrategy,
    /// Prefix for `sequential` ids
    #[serde(default = "default_sequential_prefix")]
    pub sequential_prefix: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            reorder_base: 0,
            id_strategy: IdStrategy::default(),
            sequential_prefix: default_sequential_prefix(),
        }
    }
}

fn default_sequential_prefix() -> String {
    "id".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Uuid,
    Sequential,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExportSettings {
    #[serde(default)]
    pub clipboard: ClipboardTarget,
    /// Required when `clipboard = "file"`
    #[serde(default)]
    pub clipboard_path: Option<PathBuf>,
}

/// Where "copy to clipboard" sends the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardTarget {
    #[default]
    Stdout,
    File,
    Discard,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file, env, then CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(cli.config.clone())?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    /// Loads `grc-schema.{toml,yaml,json}` from `root`, if present.
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let settings = Self::load(Path::new(root).join("grc-schema"))?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(config_path: PathBuf) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix("GRC_SCHEMA")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("editor.reorder_base", 0)?
            .set_default("editor.id_strategy", "uuid")?
            .set_default("editor.sequential_prefix", "id")?
            .set_default("logging.level", "info")?
            .set_default("export.clipboard", "stdout")?
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(ids) = cli.ids {
            self.editor.id_strategy = ids;
        }
        if let Some(level) = &cli.log_level {
            self.logging.level = level.clone();
        }
        // Without --output the exported document owns stdout.
        if cli.output.is_none() && self.export.clipboard == ClipboardTarget::Stdout {
            tracing::debug!("stdout carries the exported document; clipboard copies are discarded");
            self.export.clipboard = ClipboardTarget::Discard;
        }
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!("Configuration validation failed:\n{}", error_messages.join("\n"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.editor.reorder_base, 0);
        assert_eq!(settings.editor.id_strategy, IdStrategy::Uuid);
        assert_eq!(settings.editor.sequential_prefix, "id");
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.export.clipboard, ClipboardTarget::Stdout);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["grc-schema-builder", "--ids", "sequential", "--log-level", "warn"]);
        let mut settings = Settings::default();
        settings.apply_cli_overrides(&cli);
        assert_eq!(settings.editor.id_strategy, IdStrategy::Sequential);
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn test_stdout_clipboard_yields_to_document() {
        let cli = Cli::parse_from(["grc-schema-builder"]);
        let mut settings = Settings::default();
        settings.apply_cli_overrides(&cli);
        assert_eq!(settings.export.clipboard, ClipboardTarget::Discard);

        let cli = Cli::parse_from(["grc-schema-builder", "--output", "schema.json"]);
        let mut settings = Settings::default();
        settings.apply_cli_overrides(&cli);
        assert_eq!(settings.export.clipboard, ClipboardTarget::Stdout);

        let cli = Cli::parse_from(["grc-schema-builder"]);
        let mut settings = Settings::default();
        settings.export.clipboard = ClipboardTarget::File;
        settings.export.clipboard_path = Some(PathBuf::from("clip.json"));
        settings.apply_cli_overrides(&cli);
        assert_eq!(settings.export.clipboard, ClipboardTarget::File);
    }
}
