//! The root document and its mutation channel.
//!
//! Every change, at any depth, is expressed as a rebuild of one module through
//! [`SchemaTree::with_module_mapped`]. The result is a new tree; the receiver is
//! never modified, so a snapshot handed out earlier stays consistent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::error::SchemaResult;
use super::field::Field;
use super::form::Form;
use super::module::{Module, ModulePatch};
use super::{display_order, remove_first, replace_first};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTree {
    #[serde(default)]
    pub modules: Vec<Arc<Module>>,
    #[serde(default)]
    pub organizational_hierarchy: Vec<Value>,
    #[serde(default)]
    pub risk_type: Vec<Value>,
}

impl SchemaTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty-printed export; identical to what the preview shows.
    pub fn to_json_pretty(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn module(&self, module_id: &str) -> Option<&Arc<Module>> {
        self.modules.iter().find(|m| m.module_id == module_id)
    }

    pub fn form(&self, module_id: &str, form_id: &str) -> Option<&Arc<Form>> {
        self.module(module_id)?.form(form_id)
    }

    pub fn field(&self, module_id: &str, form_id: &str, form_field_id: &str) -> Option<&Arc<Field>> {
        self.form(module_id, form_id)?.field(form_field_id)
    }

    pub fn modules_in_display_order(&self) -> Vec<&Arc<Module>> {
        display_order(&self.modules)
    }

    /// Whether any module, form, field or option carries this id.
    pub fn contains_id(&self, id: &str) -> bool {
        self.modules.iter().any(|m| {
            m.module_id == id
                || m.forms.iter().any(|f| {
                    f.form_id == id
                        || f.form_fields
                            .iter()
                            .any(|x| x.form_field_id == id || x.options.iter().any(|o| o.option_id == id))
                })
        })
    }

    /// Appends a default module with the given id; its order is the current module count.
    pub fn with_module_added(&self, module_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let module = Module::new(module_id, self.modules.len() as i64, now);
        let mut modules = self.modules.clone();
        modules.push(Arc::new(module));
        self.with_modules(modules)
    }

    /// Rebuilds the module matching `module_id`. `None` when either the module
    /// is missing or `rebuild` declines.
    pub fn with_module_mapped<F>(&self, module_id: &str, rebuild: F) -> Option<Self>
    where
        F: FnOnce(&Module) -> Option<Module>,
    {
        let modules = replace_first(&self.modules, |m| m.module_id == module_id, rebuild)?;
        Some(self.with_modules(modules))
    }

    pub fn with_module_updated(&self, module_id: &str, patch: &ModulePatch, now: DateTime<Utc>) -> Option<Self> {
        self.with_module_mapped(module_id, |module| Some(module.with_patch(patch, now)))
    }

    pub fn with_module_toggled(&self, module_id: &str, now: DateTime<Utc>) -> Option<Self> {
        self.with_module_mapped(module_id, |module| Some(module.with_enabled_toggled(now)))
    }

    pub fn with_module_removed(&self, module_id: &str) -> Option<Self> {
        let modules = remove_first(&self.modules, |m| m.module_id == module_id)?;
        Some(self.with_modules(modules))
    }

    /// Assigns `order = position + base` to each listed module.
    ///
    /// Unknown ids are skipped and unlisted modules keep their order. Storage
    /// order is left alone; display order follows the new `order` values.
    /// `None` when none of the ids matched.
    pub fn with_modules_reordered<S: AsRef<str>>(&self, module_ids: &[S], base: i64) -> Option<Self> {
        let mut modules = self.modules.clone();
        let mut touched = false;
        for (position, module_id) in module_ids.iter().enumerate() {
            let module_id = module_id.as_ref();
            let Some(slot) = modules.iter_mut().find(|m| m.module_id == module_id) else {
                continue;
            };
            *slot = Arc::new(Module {
                order: position as i64 + base,
                ..(**slot).clone()
            });
            touched = true;
        }
        touched.then(|| self.with_modules(modules))
    }

    fn with_modules(&self, modules: Vec<Arc<Module>>) -> Self {
        Self {
            modules,
            organizational_hierarchy: self.organizational_hierarchy.clone(),
            risk_type: self.risk_type.clone(),
        }
    }
}
