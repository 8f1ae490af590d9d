//! Scripted editing sessions.
//!
//! A script is a list of commands, written in YAML or JSON, replayed against an
//! [`EditorSession`]. `add_*` commands can bind an alias (`as: risk`) so later
//! commands refer to generated ids without knowing them up front.
//!
//! ```yaml
//! - op: add_module
//!   as: risk
//! - op: update_module
//!   module: risk
//!   set: { name: Risk Register }
//! - op: add_form
//!   module: risk
//!   as: intake
//! ```
//!
//! The editor itself treats a missing id as a no-op. The runner is stricter
//! about names: a reference that is neither a bound alias nor an id present in
//! the document is an error, since it is almost always a typo.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{FieldPatch, FormPatch, ModulePatch};
use crate::editor::{EditState, EditorSession};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML script: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON script: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported script format '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("Unknown alias or id '{0}'")]
    UnknownAlias(String),

    #[error("Alias '{0}' is already bound")]
    DuplicateAlias(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddModule {
        #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    UpdateModule {
        module: String,
        set: ModulePatch,
    },
    DeleteModule {
        module: String,
    },
    ToggleModule {
        module: String,
    },
    ReorderModules {
        modules: Vec<String>,
    },
    SelectModule {
        #[serde(default)]
        module: Option<String>,
    },
    AddForm {
        module: String,
        #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    UpdateForm {
        module: String,
        form: String,
        set: FormPatch,
    },
    DeleteForm {
        module: String,
        form: String,
    },
    ToggleForm {
        module: String,
        form: String,
    },
    SelectForm {
        #[serde(default)]
        form: Option<String>,
    },
    AddField {
        module: String,
        form: String,
        #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
    UpdateField {
        module: String,
        form: String,
        field: String,
        set: FieldPatch,
    },
    DeleteField {
        module: String,
        form: String,
        field: String,
    },
    ToggleField {
        module: String,
        form: String,
        field: String,
    },
    /// Opens the field editor, applies `set` to the draft, appends one option
    /// per `add_options` label, drops options labelled in `remove_options`, saves.
    EditField {
        module: String,
        form: String,
        field: String,
        #[serde(default)]
        set: FieldPatch,
        #[serde(default)]
        add_options: Vec<String>,
        #[serde(default)]
        remove_options: Vec<String>,
    },
    Copy,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddModule { .. } => "add_module",
            Command::UpdateModule { .. } => "update_module",
            Command::DeleteModule { .. } => "delete_module",
            Command::ToggleModule { .. } => "toggle_module",
            Command::ReorderModules { .. } => "reorder_modules",
            Command::SelectModule { .. } => "select_module",
            Command::AddForm { .. } => "add_form",
            Command::UpdateForm { .. } => "update_form",
            Command::DeleteForm { .. } => "delete_form",
            Command::ToggleForm { .. } => "toggle_form",
            Command::SelectForm { .. } => "select_form",
            Command::AddField { .. } => "add_field",
            Command::UpdateField { .. } => "update_field",
            Command::DeleteField { .. } => "delete_field",
            Command::ToggleField { .. } => "toggle_field",
            Command::EditField { .. } => "edit_field",
            Command::Copy => "copy",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub commands: Vec<Command>,
}

impl Script {
    /// Loads a script, picking the parser from the file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let read = || {
            std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&read()?),
            "json" => Self::from_json(&read()?),
            other => Err(ScriptError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Outcome counts of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// Commands that changed the document, the selection, or the clipboard
    pub applied: usize,
    /// Commands whose target no longer existed
    pub ignored: usize,
}

/// Replays commands against a session, keeping the alias table between them.
pub struct ScriptRunner<'a> {
    session: &'a mut EditorSession,
    aliases: HashMap<String, String>,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(session: &'a mut EditorSession) -> Self {
        Self {
            session,
            aliases: HashMap::new(),
        }
    }

    /// Id bound to `alias`, if any.
    pub fn alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Runs every command in order, stopping at the first error.
    pub fn run(&mut self, script: &Script) -> Result<ScriptReport, ScriptError> {
        let mut report = ScriptReport::default();
        for (index, command) in script.commands.iter().enumerate() {
            debug!(step = index + 1, op = command.name(), "running script command");
            if self.apply(command)? {
                report.applied += 1;
            } else {
                report.ignored += 1;
            }
        }
        info!(
            applied = report.applied,
            ignored = report.ignored,
            "Script finished: {} commands",
            script.len()
        );
        Ok(report)
    }

    /// Applies one command. `Ok(false)` means the editor ignored it.
    pub fn apply(&mut self, command: &Command) -> Result<bool, ScriptError> {
        let applied = match command {
            Command::AddModule { alias } => {
                self.check_unbound(alias.as_deref())?;
                let id = self.session.add_module();
                self.bind(alias.as_deref(), id);
                true
            }
            Command::UpdateModule { module, set } => {
                let module = self.resolve(module)?;
                self.session.update_module(&module, set)
            }
            Command::DeleteModule { module } => {
                let module = self.resolve(module)?;
                self.session.delete_module(&module)
            }
            Command::ToggleModule { module } => {
                let module = self.resolve(module)?;
                self.session.toggle_module_enabled(&module)
            }
            Command::ReorderModules { modules } => {
                let ids = modules
                    .iter()
                    .map(|m| self.resolve(m))
                    .collect::<Result<Vec<_>, _>>()?;
                self.session.reorder_modules(&ids)
            }
            Command::SelectModule { module } => {
                let module = module.as_deref().map(|m| self.resolve(m)).transpose()?;
                self.session.select_module(module.as_deref());
                true
            }
            Command::AddForm { module, alias } => {
                self.check_unbound(alias.as_deref())?;
                let module = self.resolve(module)?;
                match self.session.module(&module).add_form() {
                    Some(id) => {
                        self.bind(alias.as_deref(), id);
                        true
                    }
                    None => false,
                }
            }
            Command::UpdateForm { module, form, set } => {
                let (module, form) = (self.resolve(module)?, self.resolve(form)?);
                self.session.module(&module).update_form(&form, set)
            }
            Command::DeleteForm { module, form } => {
                let (module, form) = (self.resolve(module)?, self.resolve(form)?);
                self.session.module(&module).delete_form(&form)
            }
            Command::ToggleForm { module, form } => {
                let (module, form) = (self.resolve(module)?, self.resolve(form)?);
                self.session.module(&module).toggle_form_enabled(&form)
            }
            Command::SelectForm { form } => {
                let form = form.as_deref().map(|f| self.resolve(f)).transpose()?;
                self.session.select_form(form.as_deref());
                true
            }
            Command::AddField { module, form, alias } => {
                self.check_unbound(alias.as_deref())?;
                let (module, form) = (self.resolve(module)?, self.resolve(form)?);
                match self.session.module(&module).form(&form).add_field() {
                    Some(id) => {
                        self.bind(alias.as_deref(), id);
                        true
                    }
                    None => false,
                }
            }
            Command::UpdateField { module, form, field, set } => {
                let (module, form, field) = (self.resolve(module)?, self.resolve(form)?, self.resolve(field)?);
                let set = self.resolve_patch(set);
                self.session.module(&module).form(&form).update_field(&field, &set)
            }
            Command::DeleteField { module, form, field } => {
                let (module, form, field) = (self.resolve(module)?, self.resolve(form)?, self.resolve(field)?);
                self.session.module(&module).form(&form).delete_field(&field)
            }
            Command::ToggleField { module, form, field } => {
                let (module, form, field) = (self.resolve(module)?, self.resolve(form)?, self.resolve(field)?);
                self.session.module(&module).form(&form).toggle_field_enabled(&field)
            }
            Command::EditField {
                module,
                form,
                field,
                set,
                add_options,
                remove_options,
            } => {
                let (module, form, field) = (self.resolve(module)?, self.resolve(form)?, self.resolve(field)?);
                let set = self.resolve_patch(set);
                let mut module = self.session.module(&module);
                let mut form = module.form(&form);
                let mut editor = form.field(&field);
                if editor.state() == EditState::Viewing && editor.edit() == EditState::Viewing {
                    false
                } else {
                    if let Some(draft) = editor.draft_mut() {
                        draft.apply(&set);
                    }
                    for label in add_options {
                        if let Some(option_id) = editor.add_option() {
                            editor.update_option(&option_id, label.clone());
                        }
                    }
                    if let Some(draft) = editor.draft_mut() {
                        draft.options.retain(|o| !remove_options.contains(&o.label));
                    }
                    editor.save()
                }
            }
            Command::Copy => {
                self.session.copy_to_clipboard();
                true
            }
        };
        if !applied {
            debug!(op = command.name(), "script command matched nothing");
        }
        Ok(applied)
    }

    /// Alias first, then a raw id present in the document.
    fn resolve(&self, key: &str) -> Result<String, ScriptError> {
        if let Some(id) = self.aliases.get(key) {
            return Ok(id.clone());
        }
        if self.session.tree().contains_id(key) {
            return Ok(key.to_string());
        }
        Err(ScriptError::UnknownAlias(key.to_string()))
    }

    /// A conditional's `dependsOn` may name a field alias. Anything else is
    /// kept verbatim, dangling ids included.
    fn resolve_patch(&self, patch: &FieldPatch) -> FieldPatch {
        let mut patch = patch.clone();
        if let Some(conditional) = patch.conditional.as_mut() {
            if let Some(id) = self.aliases.get(&conditional.depends_on) {
                conditional.depends_on = id.clone();
            }
        }
        patch
    }

    fn check_unbound(&self, alias: Option<&str>) -> Result<(), ScriptError> {
        match alias {
            Some(alias) if self.aliases.contains_key(alias) => Err(ScriptError::DuplicateAlias(alias.to_string())),
            _ => Ok(()),
        }
    }

    fn bind(&mut self, alias: Option<&str>, id: String) {
        if let Some(alias) = alias {
            self.aliases.insert(alias.to_string(), id);
        }
    }
}
