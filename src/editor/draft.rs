//! Draft buffers for in-progress edits.
//!
//! A draft is a detached copy of an entity's editable fields. It is seeded
//! from the live entity when editing starts, changed freely, and either turned
//! into a single patch on save or dropped on cancel. Nothing in here touches
//! the schema tree.

use std::collections::HashMap;

use crate::domain::{
    Conditional, Field, FieldOption, FieldPatch, FieldType, Form, FormPatch, IdGenerator, Module, ModulePatch,
    Tooltip,
};

/// Per-entity edit state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    Editing,
}

/// Open drafts of one entity kind, keyed by entity id.
///
/// An id with a draft is Editing; every other id is Viewing.
#[derive(Debug, Clone)]
pub struct EditBuffers<D> {
    drafts: HashMap<String, D>,
}

impl<D> Default for EditBuffers<D> {
    fn default() -> Self {
        Self { drafts: HashMap::new() }
    }
}

impl<D> EditBuffers<D> {
    pub fn state(&self, id: &str) -> EditState {
        if self.drafts.contains_key(id) {
            EditState::Editing
        } else {
            EditState::Viewing
        }
    }

    /// The Edit action: Viewing starts a fresh draft from `seed`, Editing drops the draft.
    pub fn toggle(&mut self, id: &str, seed: impl FnOnce() -> D) -> EditState {
        if self.drafts.remove(id).is_some() {
            return EditState::Viewing;
        }
        self.drafts.insert(id.to_string(), seed());
        EditState::Editing
    }

    pub fn draft(&self, id: &str) -> Option<&D> {
        self.drafts.get(id)
    }

    pub fn draft_mut(&mut self, id: &str) -> Option<&mut D> {
        self.drafts.get_mut(id)
    }

    /// Ends the edit, handing back the draft for commit.
    pub fn finish(&mut self, id: &str) -> Option<D> {
        self.drafts.remove(id)
    }

    pub fn cancel(&mut self, id: &str) {
        self.drafts.remove(id);
    }

    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDraft {
    pub name: String,
    pub order: i64,
}

impl From<&Module> for ModuleDraft {
    fn from(module: &Module) -> Self {
        Self {
            name: module.name.clone(),
            order: module.order,
        }
    }
}

impl ModuleDraft {
    pub fn into_patch(self) -> ModulePatch {
        ModulePatch {
            name: Some(self.name),
            order: Some(self.order),
            enabled: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormDraft {
    pub title: String,
    pub description: String,
    pub order: i64,
}

impl From<&Form> for FormDraft {
    fn from(form: &Form) -> Self {
        Self {
            title: form.title.clone(),
            description: form.description.clone(),
            order: form.order,
        }
    }
}

impl FormDraft {
    pub fn into_patch(self) -> FormPatch {
        FormPatch {
            title: Some(self.title),
            description: Some(self.description),
            order: Some(self.order),
            enabled: None,
        }
    }
}

/// Everything the field editor can change, including the option list and
/// the tooltip and conditional sub-editors.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDraft {
    pub name: String,
    pub placeholder: String,
    pub field_type: FieldType,
    pub required: bool,
    pub order: i64,
    pub tooltip: Tooltip,
    pub conditional: Conditional,
    pub options: Vec<FieldOption>,
}

impl From<&Field> for FieldDraft {
    fn from(field: &Field) -> Self {
        Self {
            name: field.name.clone(),
            placeholder: field.placeholder.clone(),
            field_type: field.field_type,
            required: field.required,
            order: field.order,
            tooltip: field.tooltip.clone(),
            conditional: field.conditional.clone(),
            options: field.options.clone(),
        }
    }
}

impl FieldDraft {
    /// Overlays the editable parts of `patch`. `enabled` is not part of a draft and is ignored.
    pub fn apply(&mut self, patch: &FieldPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(placeholder) = &patch.placeholder {
            self.placeholder = placeholder.clone();
        }
        if let Some(field_type) = patch.field_type {
            self.field_type = field_type;
        }
        if let Some(required) = patch.required {
            self.required = required;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
        if let Some(tooltip) = &patch.tooltip {
            self.tooltip = tooltip.clone();
        }
        if let Some(conditional) = &patch.conditional {
            self.conditional = conditional.clone();
        }
        if let Some(options) = &patch.options {
            self.options = options.clone();
        }
    }

    /// Options are only shown for choice types; hidden options are still kept.
    pub fn options_visible(&self) -> bool {
        self.field_type.is_choice()
    }

    /// Appends `Option {n}` with a fresh id and returns that id.
    pub fn add_option(&mut self, ids: &dyn IdGenerator) -> String {
        let option_id = ids.generate();
        self.options.push(FieldOption {
            option_id: option_id.clone(),
            label: format!("Option {}", self.options.len() + 1),
        });
        option_id
    }

    pub fn update_option(&mut self, option_id: &str, label: impl Into<String>) -> bool {
        match self.options.iter_mut().find(|o| o.option_id == option_id) {
            Some(option) => {
                option.label = label.into();
                true
            }
            None => false,
        }
    }

    pub fn delete_option(&mut self, option_id: &str) -> bool {
        let before = self.options.len();
        self.options.retain(|o| o.option_id != option_id);
        self.options.len() != before
    }

    pub fn set_tooltip_enabled(&mut self, status: bool) {
        self.tooltip.status = status;
    }

    pub fn set_tooltip_message(&mut self, message: impl Into<String>) {
        self.tooltip.message = message.into();
    }

    pub fn set_conditional_enabled(&mut self, status: bool) {
        self.conditional.status = status;
    }

    /// Picks the sibling this field depends on. Not checked against the form.
    pub fn set_depends_on(&mut self, form_field_id: impl Into<String>) {
        self.conditional.depends_on = form_field_id.into();
    }

    pub fn set_trigger_value(&mut self, value: impl Into<String>) {
        self.conditional.trigger_value = value.into();
    }

    pub fn into_patch(self) -> FieldPatch {
        FieldPatch {
            name: Some(self.name),
            placeholder: Some(self.placeholder),
            field_type: Some(self.field_type),
            required: Some(self.required),
            enabled: None,
            order: Some(self.order),
            tooltip: Some(self.tooltip),
            conditional: Some(self.conditional),
            options: Some(self.options),
        }
    }
}
