use clap::Parser;
use grc_schema_builder::cli::Cli;
use grc_schema_builder::config::{ClipboardTarget, IdStrategy, Settings};
use grc_schema_builder::domain::IdGenerator;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_toml_config() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let config_toml = r#"
[editor]
reorder_base = 1
id_strategy = "sequential"
sequential_prefix = "grc"

[logging]
level = "debug"

[export]
clipboard = "file"
clipboard_path = "schema.json"
"#;
    fs::write(root.join("grc-schema.toml"), config_toml)?;

    let settings = Settings::from_root(root.to_str().unwrap())?;
    assert_eq!(settings.editor.reorder_base, 1);
    assert_eq!(settings.editor.id_strategy, IdStrategy::Sequential);
    assert_eq!(settings.editor.sequential_prefix, "grc");
    assert_eq!(settings.logging.level, "debug");
    assert_eq!(settings.export.clipboard, ClipboardTarget::File);
    assert_eq!(settings.export.clipboard_path.as_deref(), Some(std::path::Path::new("schema.json")));

    Ok(())
}

#[test]
fn test_missing_config_uses_defaults() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let settings = Settings::from_root(temp_dir.path().to_str().unwrap())?;

    assert_eq!(settings.editor.reorder_base, 0);
    assert_eq!(settings.editor.id_strategy, IdStrategy::Uuid);
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.export.clipboard, ClipboardTarget::Stdout);

    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();

    let config_toml = r#"
[editor]
reorder_base = 7

[export]
clipboard = "file"
"#;
    fs::write(root.join("grc-schema.toml"), config_toml)?;

    let err = Settings::from_root(root.to_str().unwrap()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Configuration validation failed"));
    assert!(message.contains("editor.reorder_base"));
    assert!(message.contains("export.clipboard_path"));

    Ok(())
}

#[test]
fn test_cli_overrides_config_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "[editor]\nid_strategy = \"uuid\"\nsequential_prefix = \"node\"\n")?;

    let cli = Cli::parse_from([
        "grc-schema-builder",
        "--config",
        config_path.to_str().unwrap(),
        "--ids",
        "sequential",
    ]);
    let settings = Settings::new_with_cli(&cli)?;
    assert_eq!(settings.editor.id_strategy, IdStrategy::Sequential);
    assert_eq!(settings.editor.sequential_prefix, "node");

    Ok(())
}

#[test]
fn test_session_from_settings() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let clipboard_path = temp_dir.path().join("clipboard.json");

    let mut settings = Settings::default();
    settings.editor.id_strategy = IdStrategy::Sequential;
    settings.editor.sequential_prefix = "grc".to_string();
    settings.editor.reorder_base = 1;
    settings.export.clipboard = ClipboardTarget::File;
    settings.export.clipboard_path = Some(clipboard_path.clone());

    let mut session = grc_schema_builder::create_session(&settings)?;
    assert_eq!(session.ids().generate(), "grc-1");

    let a = session.add_module();
    let b = session.add_module();
    assert_eq!(a, "grc-2");
    session.reorder_modules(&[b.as_str(), a.as_str()]);
    assert_eq!(session.tree().module(&b).unwrap().order, 1);

    session.copy_to_clipboard();
    assert_eq!(fs::read_to_string(&clipboard_path)?, session.preview_json()?);

    Ok(())
}
