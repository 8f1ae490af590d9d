//! Editor session: the single owner of the schema snapshot.
//!
//! The session holds the current [`SchemaTree`] behind an `Arc` and replaces
//! it wholesale on every mutation. Callers that grabbed a snapshot earlier keep
//! a consistent view. Selection (which module and which form are expanded) and
//! open drafts live next to the tree, never inside it.
//!
//! Mutations are reached either directly (module-level operations) or through
//! the handles returned by [`EditorSession::module`], which bind the ids of the
//! entity being edited the way a nested editor component would.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::adapters::clipboard::DiscardSink;
use crate::adapters::clock::SystemClock;
use crate::adapters::ids::UuidGenerator;
use crate::domain::{
    ClipboardSink, Clock, FieldPatch, Form, FormPatch, IdGenerator, Module, ModulePatch, SchemaResult,
    SchemaTree,
};

pub mod draft;
pub mod handles;

pub use draft::{EditBuffers, EditState, FieldDraft, FormDraft, ModuleDraft};
pub use handles::{FieldEditor, FormEditor, ModuleEditor};

/// At most one expanded module and one expanded form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    active_module_id: Option<String>,
    active_form_id: Option<String>,
}

impl Selection {
    pub fn active_module(&self) -> Option<&str> {
        self.active_module_id.as_deref()
    }

    pub fn active_form(&self) -> Option<&str> {
        self.active_form_id.as_deref()
    }

    pub fn is_module_expanded(&self, module_id: &str) -> bool {
        self.active_module() == Some(module_id)
    }

    pub fn is_form_expanded(&self, form_id: &str) -> bool {
        self.active_form() == Some(form_id)
    }
}

pub struct EditorSession {
    tree: Arc<SchemaTree>,
    selection: Selection,
    module_edits: EditBuffers<ModuleDraft>,
    form_edits: EditBuffers<FormDraft>,
    field_edits: EditBuffers<FieldDraft>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    clipboard: Arc<dyn ClipboardSink>,
    reorder_base: i64,
}

impl EditorSession {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>, clipboard: Arc<dyn ClipboardSink>) -> Self {
        Self {
            tree: Arc::new(SchemaTree::new()),
            selection: Selection::default(),
            module_edits: EditBuffers::default(),
            form_edits: EditBuffers::default(),
            field_edits: EditBuffers::default(),
            ids,
            clock,
            clipboard,
            reorder_base: 0,
        }
    }

    /// First position assigned by [`EditorSession::reorder_modules`].
    pub fn with_reorder_base(mut self, base: i64) -> Self {
        self.reorder_base = base;
        self
    }

    pub fn with_tree(mut self, tree: SchemaTree) -> Self {
        self.load(tree);
        self
    }

    /// Replaces the whole document, dropping selection and open drafts.
    pub fn load(&mut self, tree: SchemaTree) {
        debug!(modules = tree.modules.len(), "loading schema document");
        self.tree = Arc::new(tree);
        self.selection = Selection::default();
        self.module_edits.clear();
        self.form_edits.clear();
        self.field_edits.clear();
    }

    /// The current snapshot. Later edits never change what it points at.
    pub fn snapshot(&self) -> Arc<SchemaTree> {
        Arc::clone(&self.tree)
    }

    pub fn tree(&self) -> &SchemaTree {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    pub fn select_module(&mut self, module_id: Option<&str>) {
        self.selection.active_module_id = module_id.map(str::to_string);
    }

    pub fn select_form(&mut self, form_id: Option<&str>) {
        self.selection.active_form_id = form_id.map(str::to_string);
    }

    // ---- modules ----

    /// Appends `New Module {n}` and expands it. Returns the new id.
    pub fn add_module(&mut self) -> String {
        let module_id = self.ids.generate();
        let next = self.tree.with_module_added(module_id.clone(), self.clock.now());
        self.commit(Some(next), "add_module", &module_id);
        self.selection.active_module_id = Some(module_id.clone());
        module_id
    }

    pub fn update_module(&mut self, module_id: &str, patch: &ModulePatch) -> bool {
        let next = self.tree.with_module_updated(module_id, patch, self.clock.now());
        self.commit(next, "update_module", module_id)
    }

    pub fn delete_module(&mut self, module_id: &str) -> bool {
        let removed = self.tree.module(module_id).cloned();
        let next = self.tree.with_module_removed(module_id);
        if !self.commit(next, "delete_module", module_id) {
            return false;
        }
        if self.selection.is_module_expanded(module_id) {
            self.selection = Selection::default();
        }
        self.module_edits.cancel(module_id);
        if let Some(module) = removed {
            for form in &module.forms {
                self.drop_form_buffers(form);
            }
        }
        true
    }

    pub fn toggle_module_enabled(&mut self, module_id: &str) -> bool {
        let next = self.tree.with_module_toggled(module_id, self.clock.now());
        self.commit(next, "toggle_module_enabled", module_id)
    }

    /// Gives each listed module `order = position + reorder_base`.
    pub fn reorder_modules<S: AsRef<str>>(&mut self, module_ids: &[S]) -> bool {
        let next = self.tree.with_modules_reordered(module_ids, self.reorder_base);
        self.commit(next, "reorder_modules", &format!("{} ids", module_ids.len()))
    }

    /// Handle bound to one module; forms and fields are reached through it.
    pub fn module(&mut self, module_id: &str) -> ModuleEditor<'_> {
        ModuleEditor::new(self, module_id)
    }

    // ---- export ----

    /// Pretty JSON of the current snapshot, exactly as exported.
    pub fn preview_json(&self) -> SchemaResult<String> {
        self.tree.to_json_pretty()
    }

    /// Sends the preview to the clipboard sink. Failures are logged and otherwise ignored.
    pub fn copy_to_clipboard(&self) {
        let text = match self.preview_json() {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to render schema for clipboard: {}", e);
                return;
            }
        };
        match self.clipboard.write_text(&text) {
            Ok(()) => debug!(bytes = text.len(), "schema copied to clipboard"),
            Err(e) => warn!("Failed to copy schema to clipboard: {}", e),
        }
    }

    // ---- forms (reached through ModuleEditor) ----

    pub(crate) fn add_form(&mut self, module_id: &str) -> Option<String> {
        let form_id = self.ids.generate();
        let now = self.clock.now();
        let next = self
            .tree
            .with_module_mapped(module_id, |module| Some(module.with_form_added(form_id.clone(), now)));
        if !self.commit(next, "add_form", module_id) {
            return None;
        }
        self.selection.active_form_id = Some(form_id.clone());
        Some(form_id)
    }

    pub(crate) fn update_form(&mut self, module_id: &str, form_id: &str, patch: &FormPatch) -> bool {
        let now = self.clock.now();
        let next = self
            .tree
            .with_module_mapped(module_id, |module| module.with_form_updated(form_id, patch, now));
        self.commit(next, "update_form", form_id)
    }

    pub(crate) fn delete_form(&mut self, module_id: &str, form_id: &str) -> bool {
        let removed = self.tree.form(module_id, form_id).cloned();
        let now = self.clock.now();
        let next = self
            .tree
            .with_module_mapped(module_id, |module| module.with_form_removed(form_id, now));
        if !self.commit(next, "delete_form", form_id) {
            return false;
        }
        if self.selection.is_form_expanded(form_id) {
            self.selection.active_form_id = None;
        }
        if let Some(form) = removed {
            self.drop_form_buffers(&form);
        }
        true
    }

    pub(crate) fn toggle_form_enabled(&mut self, module_id: &str, form_id: &str) -> bool {
        let now = self.clock.now();
        let next = self
            .tree
            .with_module_mapped(module_id, |module| module.with_form_toggled(form_id, now));
        self.commit(next, "toggle_form_enabled", form_id)
    }

    // ---- fields (reached through FormEditor) ----

    pub(crate) fn add_form_field(&mut self, module_id: &str, form_id: &str) -> Option<String> {
        let field_id = self.ids.generate();
        let now = self.clock.now();
        let next = self.map_form(module_id, form_id, now, |form| {
            Some(form.with_field_added(field_id.clone(), now))
        });
        self.commit(next, "add_form_field", form_id).then_some(field_id)
    }

    pub(crate) fn update_form_field(
        &mut self,
        module_id: &str,
        form_id: &str,
        field_id: &str,
        patch: &FieldPatch,
    ) -> bool {
        if patch.is_empty() {
            debug!(field = field_id, "empty field patch, only timestamps change");
        }
        if let Some(field_type) = patch.field_type {
            debug!(field = field_id, %field_type, "setting field type");
        }
        let now = self.clock.now();
        let next = self.map_form(module_id, form_id, now, |form| {
            form.with_field_updated(field_id, patch, now)
        });
        self.commit(next, "update_form_field", field_id)
    }

    /// Siblings whose conditional points at the deleted field keep the stale id.
    pub(crate) fn delete_form_field(&mut self, module_id: &str, form_id: &str, field_id: &str) -> bool {
        let now = self.clock.now();
        let next = self.map_form(module_id, form_id, now, |form| form.with_field_removed(field_id, now));
        if !self.commit(next, "delete_form_field", field_id) {
            return false;
        }
        self.field_edits.cancel(field_id);
        true
    }

    pub(crate) fn toggle_form_field_enabled(&mut self, module_id: &str, form_id: &str, field_id: &str) -> bool {
        let now = self.clock.now();
        let next = self.map_form(module_id, form_id, now, |form| form.with_field_toggled(field_id, now));
        self.commit(next, "toggle_form_field_enabled", field_id)
    }

    // ---- draft buffers (reached through the handles) ----

    pub(crate) fn module_edits(&mut self) -> &mut EditBuffers<ModuleDraft> {
        &mut self.module_edits
    }

    pub(crate) fn form_edits(&mut self) -> &mut EditBuffers<FormDraft> {
        &mut self.form_edits
    }

    pub(crate) fn field_edits(&mut self) -> &mut EditBuffers<FieldDraft> {
        &mut self.field_edits
    }

    pub(crate) fn module_edits_ref(&self) -> &EditBuffers<ModuleDraft> {
        &self.module_edits
    }

    pub(crate) fn form_edits_ref(&self) -> &EditBuffers<FormDraft> {
        &self.form_edits
    }

    pub(crate) fn field_edits_ref(&self) -> &EditBuffers<FieldDraft> {
        &self.field_edits
    }

    /// Field draft plus the id source, borrowed together for the option editor.
    pub(crate) fn field_draft_with_ids(&mut self, field_id: &str) -> Option<(&mut FieldDraft, &dyn IdGenerator)> {
        let draft = self.field_edits.draft_mut(field_id)?;
        Some((draft, self.ids.as_ref()))
    }

    fn map_form<F>(&self, module_id: &str, form_id: &str, now: DateTime<Utc>, rebuild: F) -> Option<SchemaTree>
    where
        F: FnOnce(&Form) -> Option<Form>,
    {
        self.tree
            .with_module_mapped(module_id, |module: &Module| module.with_form_mapped(form_id, now, rebuild))
    }

    fn drop_form_buffers(&mut self, form: &Form) {
        self.form_edits.cancel(&form.form_id);
        for field in &form.form_fields {
            self.field_edits.cancel(&field.form_field_id);
        }
    }

    /// Swaps in `next` when the mutation matched something.
    fn commit(&mut self, next: Option<SchemaTree>, action: &'static str, entity: &str) -> bool {
        match next {
            Some(tree) => {
                self.tree = Arc::new(tree);
                debug!(action, entity, "schema updated");
                true
            }
            None => {
                debug!(action, entity, "no matching entity, ignored");
                false
            }
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Arc::new(UuidGenerator), Arc::new(SystemClock), Arc::new(DiscardSink))
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("modules", &self.tree.modules.len())
            .field("selection", &self.selection)
            .field("reorder_base", &self.reorder_base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clipboard::MemorySink;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::ids::SequentialGenerator;
    use crate::domain::{ClipboardError, FieldType};
    use chrono::{Duration, TimeZone};

    fn session() -> (EditorSession, Arc<FixedClock>, Arc<MemorySink>) {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
        let sink = Arc::new(MemorySink::new());
        let session = EditorSession::new(Arc::new(SequentialGenerator::new("id")), clock.clone(), sink.clone());
        (session, clock, sink)
    }

    #[test]
    fn test_add_module_selects_it() {
        let (mut session, _, _) = session();
        let id = session.add_module();
        assert_eq!(id, "id-1");
        assert!(session.selection().is_module_expanded(&id));

        let second = session.add_module();
        assert!(!session.selection().is_module_expanded(&id));
        assert!(session.selection().is_module_expanded(&second));
        assert_eq!(session.tree().module(&second).unwrap().order, 1);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_edits() {
        let (mut session, _, _) = session();
        let id = session.add_module();
        let before = session.snapshot();

        session.update_module(&id, &ModulePatch { name: Some("Risks".into()), ..Default::default() });

        assert_eq!(before.module(&id).unwrap().name, "New Module 1");
        assert_eq!(session.tree().module(&id).unwrap().name, "Risks");
    }

    #[test]
    fn test_update_stamps_updated_at_only() {
        let (mut session, clock, _) = session();
        let id = session.add_module();
        let created = clock.now();
        clock.advance(Duration::minutes(5));

        session.update_module(&id, &ModulePatch { order: Some(-3), ..Default::default() });
        let module = session.tree().module(&id).unwrap();
        assert_eq!(module.order, -3);
        assert_eq!(module.created_at, created);
        assert_eq!(module.updated_at, created + Duration::minutes(5));
    }

    #[test]
    fn test_field_patches_stamp_form_and_module() {
        let (mut session, clock, _) = session();
        let module_id = session.add_module();
        let form_id = session.add_form(&module_id).unwrap();
        let field_id = session.add_form_field(&module_id, &form_id).unwrap();
        let created = clock.now();

        clock.advance(Duration::minutes(1));
        assert!(session.update_form_field(&module_id, &form_id, &field_id, &FieldPatch::default()));
        let form = session.tree().form(&module_id, &form_id).unwrap();
        assert_eq!(form.updated_at, created + Duration::minutes(1));
        assert_eq!(form.field(&field_id).unwrap().field_type, FieldType::Text);

        clock.advance(Duration::minutes(1));
        let patch = FieldPatch { field_type: Some(FieldType::Radiogroup), ..Default::default() };
        assert!(session.update_form_field(&module_id, &form_id, &field_id, &patch));
        let module = session.tree().module(&module_id).unwrap();
        assert_eq!(module.updated_at, created + Duration::minutes(2));
        assert_eq!(
            session.tree().field(&module_id, &form_id, &field_id).unwrap().field_type,
            FieldType::Radiogroup
        );
    }

    #[test]
    fn test_missing_ids_leave_tree_identical() {
        let (mut session, _, _) = session();
        session.add_module();
        let before = session.preview_json().unwrap();
        let snapshot = session.snapshot();

        assert!(!session.update_module("nope", &ModulePatch::default()));
        assert!(!session.toggle_module_enabled("nope"));
        assert!(!session.delete_module("nope"));
        assert!(!session.reorder_modules(&["nope"]));

        assert!(Arc::ptr_eq(&snapshot, &session.snapshot()));
        assert_eq!(before, session.preview_json().unwrap());
    }

    #[test]
    fn test_delete_active_module_clears_selection() {
        let (mut session, _, _) = session();
        let keep = session.add_module();
        let doomed = session.add_module();
        session.module(&doomed).add_form().unwrap();
        assert!(session.selection().active_form().is_some());

        assert!(session.delete_module(&doomed));
        assert_eq!(session.selection(), &Selection::default());
        assert_eq!(session.tree().modules.len(), 1);
        assert!(session.tree().module(&keep).is_some());
    }

    #[test]
    fn test_delete_inactive_module_keeps_selection() {
        let (mut session, _, _) = session();
        let first = session.add_module();
        let second = session.add_module();
        assert!(session.delete_module(&first));
        assert!(session.selection().is_module_expanded(&second));
    }

    #[test]
    fn test_reorder_uses_configured_base() {
        let (session, _, _) = session();
        let mut session = session.with_reorder_base(1);
        let a = session.add_module();
        let b = session.add_module();

        assert!(session.reorder_modules(&[b.as_str(), a.as_str()]));
        assert_eq!(session.tree().module(&b).unwrap().order, 1);
        assert_eq!(session.tree().module(&a).unwrap().order, 2);
    }

    #[test]
    fn test_copy_sends_exact_preview() {
        let (mut session, _, sink) = session();
        session.add_module();
        session.copy_to_clipboard();
        assert_eq!(sink.last(), Some(session.preview_json().unwrap()));
    }

    struct FailingSink;

    impl ClipboardSink for FailingSink {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("denied".into()))
        }
    }

    #[test]
    fn test_clipboard_failure_does_not_touch_tree() {
        let mut session = EditorSession::new(
            Arc::new(SequentialGenerator::default()),
            Arc::new(SystemClock),
            Arc::new(FailingSink),
        );
        session.add_module();
        let snapshot = session.snapshot();
        session.copy_to_clipboard();
        assert!(Arc::ptr_eq(&snapshot, &session.snapshot()));
    }

    #[test]
    fn test_with_tree_seeds_document() {
        let (session, _, _) = session();
        let seed = SchemaTree::new().with_module_added("seed", Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap());
        let mut session = session.with_tree(seed.clone());

        assert_eq!(session.tree(), &seed);
        assert!(session.selection().active_module().is_none());
        let id = session.add_module();
        assert_eq!(session.tree().module(&id).unwrap().order, 1);
    }

    #[test]
    fn test_load_resets_selection_and_drafts() {
        let (mut session, _, _) = session();
        let id = session.add_module();
        session.module(&id).edit();
        assert_eq!(session.module(&id).state(), EditState::Editing);

        session.load(SchemaTree::new());
        assert!(session.selection().active_module().is_none());
        assert_eq!(session.module(&id).state(), EditState::Viewing);
        assert!(session.tree().modules.is_empty());
    }
}
