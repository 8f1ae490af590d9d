use anyhow::Context;
use clap::Parser;
use grc_schema_builder::adapters::script::{Script, ScriptRunner};
use grc_schema_builder::cli::Cli;
use grc_schema_builder::config::Settings;
use grc_schema_builder::domain::SchemaTree;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new_with_cli(&cli)?;

    // Initialize tracing; stdout is reserved for the exported document
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting GRC Schema Builder (config: {})", cli.config.display());

    let mut session = grc_schema_builder::create_session(&settings)?;

    if let Some(input) = &cli.input {
        let text = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read input document {}", input.display()))?;
        let tree = SchemaTree::from_json(&text)
            .with_context(|| format!("Failed to parse input document {}", input.display()))?;
        info!("Loaded {} modules from {}", tree.modules.len(), input.display());
        session = session.with_tree(tree);
    }

    if let Some(path) = &cli.script {
        let script = Script::from_path(path)?;
        if script.is_empty() {
            warn!("Script {} has no commands", path.display());
        }
        info!("Running {} commands from {}", script.len(), path.display());
        let report = ScriptRunner::new(&mut session).run(&script)?;
        info!("Applied {} commands, ignored {}", report.applied, report.ignored);
    }

    let document = session.preview_json()?;
    match &cli.output {
        Some(output) => {
            std::fs::write(output, &document)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Schema written to {}", output.display());
        }
        None => println!("{}", document),
    }

    Ok(())
}
