//! Modules: top-level named containers of forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::form::{Form, FormPatch};
use super::{display_order, remove_first, replace_first, Ordered};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub module_id: String,
    pub name: String,
    #[serde(deserialize_with = "crate::domain::order_or_zero")]
    pub order: i64,
    pub enabled: bool,
    #[serde(default)]
    pub forms: Vec<Arc<Form>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Module {
    /// Builds the default module appended at position `order` (0-based sibling count).
    pub fn new(module_id: impl Into<String>, order: i64, now: DateTime<Utc>) -> Self {
        Self {
            module_id: module_id.into(),
            name: format!("New Module {}", order + 1),
            order,
            enabled: true,
            forms: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn form(&self, form_id: &str) -> Option<&Arc<Form>> {
        self.forms.iter().find(|f| f.form_id == form_id)
    }

    pub fn forms_in_display_order(&self) -> Vec<&Arc<Form>> {
        display_order(&self.forms)
    }

    pub fn with_patch(&self, patch: &ModulePatch, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        patch.apply_to(&mut next);
        next.updated_at = now;
        next
    }

    pub fn with_enabled_toggled(&self, now: DateTime<Utc>) -> Self {
        Self {
            enabled: !self.enabled,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Appends a default form with the given id; its order is the current form count.
    pub fn with_form_added(&self, form_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let form = Form::new(form_id, self.module_id.clone(), self.forms.len() as i64, now);
        let mut forms = self.forms.clone();
        forms.push(Arc::new(form));
        self.with_forms(forms, now)
    }

    /// Rebuilds the form matching `form_id` through `rebuild` and stamps this module.
    ///
    /// `rebuild` may itself decline (for a missing field further down), in which
    /// case nothing changes and `None` is returned.
    pub fn with_form_mapped<F>(&self, form_id: &str, now: DateTime<Utc>, rebuild: F) -> Option<Self>
    where
        F: FnOnce(&Form) -> Option<Form>,
    {
        let forms = replace_first(&self.forms, |f| f.form_id == form_id, rebuild)?;
        Some(self.with_forms(forms, now))
    }

    pub fn with_form_updated(&self, form_id: &str, patch: &FormPatch, now: DateTime<Utc>) -> Option<Self> {
        self.with_form_mapped(form_id, now, |form| Some(form.with_patch(patch, now)))
    }

    pub fn with_form_toggled(&self, form_id: &str, now: DateTime<Utc>) -> Option<Self> {
        self.with_form_mapped(form_id, now, |form| Some(form.with_enabled_toggled(now)))
    }

    pub fn with_form_removed(&self, form_id: &str, now: DateTime<Utc>) -> Option<Self> {
        let forms = remove_first(&self.forms, |f| f.form_id == form_id)?;
        Some(self.with_forms(forms, now))
    }

    fn with_forms(&self, forms: Vec<Arc<Form>>, now: DateTime<Utc>) -> Self {
        Self {
            forms,
            updated_at: now,
            ..self.clone()
        }
    }
}

impl Ordered for Module {
    fn order(&self) -> i64 {
        self.order
    }
}

/// Partial update for a [`Module`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ModulePatch {
    pub fn apply_to(&self, module: &mut Module) {
        if let Some(name) = &self.name {
            module.name = name.clone();
        }
        if let Some(order) = self.order {
            module.order = order;
        }
        if let Some(enabled) = self.enabled {
            module.enabled = enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_forms_append_with_owner_id() {
        let module = Module::new("mod-1", 0, t(0))
            .with_form_added("form-1", t(1))
            .with_form_added("form-2", t(2));

        assert_eq!(module.forms.len(), 2);
        assert_eq!(module.forms[1].title, "New Form 2");
        assert_eq!(module.forms[1].order, 1);
        assert_eq!(module.forms[1].module_id, "mod-1");
        assert_eq!(module.forms[1].created_at, t(2));
        assert_eq!(module.updated_at, t(2));
        assert_eq!(module.created_at, t(0));
    }

    #[test]
    fn test_form_toggle_stamps_both_levels() {
        let module = Module::new("mod-1", 0, t(0)).with_form_added("form-1", t(0));
        let next = module.with_form_toggled("form-1", t(7)).unwrap();

        assert!(!next.forms[0].enabled);
        assert_eq!(next.forms[0].updated_at, t(7));
        assert_eq!(next.updated_at, t(7));
        assert!(module.forms[0].enabled);
    }

    #[test]
    fn test_declined_rebuild_leaves_module_untouched() {
        let module = Module::new("mod-1", 0, t(0)).with_form_added("form-1", t(0));
        assert!(module.with_form_mapped("form-1", t(3), |_| None).is_none());
        assert!(module.with_form_removed("missing", t(3)).is_none());
    }

    #[test]
    fn test_patch_merge_is_shallow() {
        let module = Module::new("mod-1", 0, t(0));
        let next = module.with_patch(&ModulePatch { name: Some("Incidents".into()), ..Default::default() }, t(4));

        assert_eq!(next.name, "Incidents");
        assert_eq!(next.order, 0);
        assert!(next.enabled);
        assert_eq!(next.updated_at, t(4));
    }
}
