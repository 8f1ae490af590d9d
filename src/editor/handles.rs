//! Scoped editor handles.
//!
//! A handle borrows the session mutably and remembers the ids of the entity it
//! edits, so nested editors only ever pass the one id they own. Every mutation
//! still lands on the session's snapshot.

use std::sync::Arc;

use super::{EditState, EditorSession, FieldDraft, FormDraft, ModuleDraft};
use crate::domain::{display_order, Field, FieldPatch, Form, FormPatch, Module, ModulePatch};

pub struct ModuleEditor<'s> {
    session: &'s mut EditorSession,
    module_id: String,
}

impl<'s> ModuleEditor<'s> {
    pub(crate) fn new(session: &'s mut EditorSession, module_id: &str) -> Self {
        Self {
            session,
            module_id: module_id.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.module_id
    }

    pub fn get(&self) -> Option<Arc<Module>> {
        self.session.tree().module(&self.module_id).cloned()
    }

    pub fn is_expanded(&self) -> bool {
        self.session.selection().is_module_expanded(&self.module_id)
    }

    /// Header click: expands this module, or collapses it when already expanded.
    pub fn toggle_expanded(&mut self) {
        let target = (!self.is_expanded()).then_some(self.module_id.as_str());
        self.session.select_module(target);
    }

    pub fn update(&mut self, patch: &ModulePatch) -> bool {
        self.session.update_module(&self.module_id, patch)
    }

    pub fn toggle_enabled(&mut self) -> bool {
        self.session.toggle_module_enabled(&self.module_id)
    }

    pub fn delete(self) -> bool {
        self.session.delete_module(&self.module_id)
    }

    // ---- draft ----

    pub fn state(&self) -> EditState {
        self.session.module_edits_ref().state(&self.module_id)
    }

    /// Viewing → Editing with a fresh draft; Editing → Viewing, dropping the draft.
    pub fn edit(&mut self) -> EditState {
        let Some(module) = self.get() else {
            return EditState::Viewing;
        };
        self.session
            .module_edits()
            .toggle(&self.module_id, || ModuleDraft::from(module.as_ref()))
    }

    pub fn draft_mut(&mut self) -> Option<&mut ModuleDraft> {
        self.session.module_edits().draft_mut(&self.module_id)
    }

    /// Commits the draft as one patch. No-op while Viewing.
    pub fn save(&mut self) -> bool {
        match self.session.module_edits().finish(&self.module_id) {
            Some(draft) => self.session.update_module(&self.module_id, &draft.into_patch()),
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.session.module_edits().cancel(&self.module_id);
    }

    // ---- forms ----

    /// Appends `New Form {n}` and expands it. `None` when the module is gone.
    pub fn add_form(&mut self) -> Option<String> {
        self.session.add_form(&self.module_id)
    }

    pub fn update_form(&mut self, form_id: &str, patch: &FormPatch) -> bool {
        self.session.update_form(&self.module_id, form_id, patch)
    }

    pub fn delete_form(&mut self, form_id: &str) -> bool {
        self.session.delete_form(&self.module_id, form_id)
    }

    pub fn toggle_form_enabled(&mut self, form_id: &str) -> bool {
        self.session.toggle_form_enabled(&self.module_id, form_id)
    }

    pub fn form(&mut self, form_id: &str) -> FormEditor<'_> {
        FormEditor {
            session: &mut *self.session,
            module_id: self.module_id.clone(),
            form_id: form_id.to_string(),
        }
    }
}

pub struct FormEditor<'s> {
    session: &'s mut EditorSession,
    module_id: String,
    form_id: String,
}

impl<'s> FormEditor<'s> {
    pub fn id(&self) -> &str {
        &self.form_id
    }

    pub fn get(&self) -> Option<Arc<Form>> {
        self.session.tree().form(&self.module_id, &self.form_id).cloned()
    }

    pub fn is_expanded(&self) -> bool {
        self.session.selection().is_form_expanded(&self.form_id)
    }

    pub fn toggle_expanded(&mut self) {
        let target = (!self.is_expanded()).then_some(self.form_id.as_str());
        self.session.select_form(target);
    }

    pub fn update(&mut self, patch: &FormPatch) -> bool {
        self.session.update_form(&self.module_id, &self.form_id, patch)
    }

    pub fn toggle_enabled(&mut self) -> bool {
        self.session.toggle_form_enabled(&self.module_id, &self.form_id)
    }

    pub fn delete(self) -> bool {
        self.session.delete_form(&self.module_id, &self.form_id)
    }

    pub fn state(&self) -> EditState {
        self.session.form_edits_ref().state(&self.form_id)
    }

    pub fn edit(&mut self) -> EditState {
        let Some(form) = self.get() else {
            return EditState::Viewing;
        };
        self.session
            .form_edits()
            .toggle(&self.form_id, || FormDraft::from(form.as_ref()))
    }

    pub fn draft_mut(&mut self) -> Option<&mut FormDraft> {
        self.session.form_edits().draft_mut(&self.form_id)
    }

    pub fn save(&mut self) -> bool {
        match self.session.form_edits().finish(&self.form_id) {
            Some(draft) => self
                .session
                .update_form(&self.module_id, &self.form_id, &draft.into_patch()),
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.session.form_edits().cancel(&self.form_id);
    }

    // ---- fields ----

    /// Appends `field_{n}` (text, required, enabled). `None` when the form is gone.
    pub fn add_field(&mut self) -> Option<String> {
        self.session.add_form_field(&self.module_id, &self.form_id)
    }

    pub fn update_field(&mut self, field_id: &str, patch: &FieldPatch) -> bool {
        self.session
            .update_form_field(&self.module_id, &self.form_id, field_id, patch)
    }

    pub fn delete_field(&mut self, field_id: &str) -> bool {
        self.session
            .delete_form_field(&self.module_id, &self.form_id, field_id)
    }

    pub fn toggle_field_enabled(&mut self, field_id: &str) -> bool {
        self.session
            .toggle_form_field_enabled(&self.module_id, &self.form_id, field_id)
    }

    pub fn field(&mut self, field_id: &str) -> FieldEditor<'_> {
        FieldEditor {
            session: &mut *self.session,
            module_id: self.module_id.clone(),
            form_id: self.form_id.clone(),
            field_id: field_id.to_string(),
        }
    }
}

pub struct FieldEditor<'s> {
    session: &'s mut EditorSession,
    module_id: String,
    form_id: String,
    field_id: String,
}

impl<'s> FieldEditor<'s> {
    pub fn id(&self) -> &str {
        &self.field_id
    }

    pub fn get(&self) -> Option<Arc<Field>> {
        self.session
            .tree()
            .field(&self.module_id, &self.form_id, &self.field_id)
            .cloned()
    }

    pub fn update(&mut self, patch: &FieldPatch) -> bool {
        self.session
            .update_form_field(&self.module_id, &self.form_id, &self.field_id, patch)
    }

    pub fn toggle_enabled(&mut self) -> bool {
        self.session
            .toggle_form_field_enabled(&self.module_id, &self.form_id, &self.field_id)
    }

    pub fn delete(self) -> bool {
        self.session
            .delete_form_field(&self.module_id, &self.form_id, &self.field_id)
    }

    pub fn state(&self) -> EditState {
        self.session.field_edits_ref().state(&self.field_id)
    }

    pub fn edit(&mut self) -> EditState {
        let Some(field) = self.get() else {
            return EditState::Viewing;
        };
        self.session
            .field_edits()
            .toggle(&self.field_id, || FieldDraft::from(field.as_ref()))
    }

    pub fn draft_mut(&mut self) -> Option<&mut FieldDraft> {
        self.session.field_edits().draft_mut(&self.field_id)
    }

    pub fn save(&mut self) -> bool {
        match self.session.field_edits().finish(&self.field_id) {
            Some(draft) => self.session.update_form_field(
                &self.module_id,
                &self.form_id,
                &self.field_id,
                &draft.into_patch(),
            ),
            None => false,
        }
    }

    pub fn cancel(&mut self) {
        self.session.field_edits().cancel(&self.field_id);
    }

    /// Adds `Option {n}` to the draft. `None` while Viewing.
    pub fn add_option(&mut self) -> Option<String> {
        let (draft, ids) = self.session.field_draft_with_ids(&self.field_id)?;
        Some(draft.add_option(ids))
    }

    pub fn update_option(&mut self, option_id: &str, label: impl Into<String>) -> bool {
        self.draft_mut()
            .map(|draft| draft.update_option(option_id, label))
            .unwrap_or(false)
    }

    pub fn delete_option(&mut self, option_id: &str) -> bool {
        self.draft_mut()
            .map(|draft| draft.delete_option(option_id))
            .unwrap_or(false)
    }

    /// Whether the option editor shows: follows the draft's type while editing.
    pub fn options_visible(&self) -> bool {
        match self.session.field_edits_ref().draft(&self.field_id) {
            Some(draft) => draft.options_visible(),
            None => self.get().map(|f| f.field_type.is_choice()).unwrap_or(false),
        }
    }

    /// Fields this one may depend on: its siblings in display order, itself excluded.
    pub fn dependency_candidates(&self) -> Vec<Arc<Field>> {
        let Some(form) = self.session.tree().form(&self.module_id, &self.form_id) else {
            return Vec::new();
        };
        display_order(&form.form_fields)
            .into_iter()
            .filter(|f| f.form_field_id != self.field_id)
            .cloned()
            .collect()
    }
}
