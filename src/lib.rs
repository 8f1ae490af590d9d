//! # GRC Schema Builder
//!
//! Core of a schema builder for Governance, Risk & Compliance forms. A
//! document is a tree of modules, forms and fields; the editor applies every
//! change as an immutable update and can export the result as pretty JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grc_schema_builder::config::Settings;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let mut session = grc_schema_builder::create_session(&settings)?;
//!
//!     let module_id = session.add_module();
//!     let form_id = session.module(&module_id).add_form();
//!     println!("{}", session.preview_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema types, copy-on-write mutations, ports
//! - **Editor**: the session (snapshot, selection, drafts) and scoped handles
//! - **Adapters**: id generators, clocks, clipboard sinks, command scripts
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod editor;

use std::sync::Arc;

use crate::adapters::clipboard::{DiscardSink, FileSink, StdoutSink};
use crate::adapters::clock::SystemClock;
use crate::adapters::ids::{SequentialGenerator, UuidGenerator};
use crate::config::{ClipboardTarget, IdStrategy, Settings};
use crate::domain::{ClipboardSink, IdGenerator};
use crate::editor::EditorSession;

/// Builds an empty editor session wired to the configured adapters.
pub fn create_session(settings: &Settings) -> anyhow::Result<EditorSession> {
    let ids: Arc<dyn IdGenerator> = match settings.editor.id_strategy {
        IdStrategy::Uuid => Arc::new(UuidGenerator),
        IdStrategy::Sequential => Arc::new(SequentialGenerator::new(settings.editor.sequential_prefix.clone())),
    };

    let clipboard: Arc<dyn ClipboardSink> = match settings.export.clipboard {
        ClipboardTarget::Stdout => Arc::new(StdoutSink),
        ClipboardTarget::Discard => Arc::new(DiscardSink),
        ClipboardTarget::File => {
            let path = settings
                .export
                .clipboard_path
                .clone()
                .ok_or_else(|| anyhow::anyhow!("export.clipboard_path is required for the file clipboard"))?;
            Arc::new(FileSink::new(path))
        }
    };

    tracing::debug!(
        ids = ?settings.editor.id_strategy,
        clipboard = ?settings.export.clipboard,
        reorder_base = settings.editor.reorder_base,
        "creating editor session"
    );

    Ok(EditorSession::new(ids, Arc::new(SystemClock), clipboard).with_reorder_base(settings.editor.reorder_base))
}
