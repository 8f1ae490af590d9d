//! Forms: ordered containers of fields, owned by one module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::field::{Field, FieldPatch};
use super::{display_order, remove_first, replace_first, Ordered};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub form_id: String,
    /// Owning module at creation time; informational only
    pub module_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "crate::domain::order_or_zero")]
    pub order: i64,
    pub enabled: bool,
    #[serde(default)]
    pub form_fields: Vec<Arc<Field>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Form {
    /// Builds the default form appended at position `order` (0-based sibling count).
    pub fn new(form_id: impl Into<String>, module_id: impl Into<String>, order: i64, now: DateTime<Utc>) -> Self {
        Self {
            form_id: form_id.into(),
            module_id: module_id.into(),
            title: format!("New Form {}", order + 1),
            description: String::new(),
            order,
            enabled: true,
            form_fields: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn field(&self, form_field_id: &str) -> Option<&Arc<Field>> {
        self.form_fields.iter().find(|f| f.form_field_id == form_field_id)
    }

    pub fn fields_in_display_order(&self) -> Vec<&Arc<Field>> {
        display_order(&self.form_fields)
    }

    pub fn with_patch(&self, patch: &FormPatch, now: DateTime<Utc>) -> Self {
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

    /// Appends a default field with the given id; its order is the current field count.
    pub fn with_field_added(&self, form_field_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let field = Field::new(form_field_id, self.form_id.clone(), self.form_fields.len() as i64);
        let mut form_fields = self.form_fields.clone();
        form_fields.push(Arc::new(field));
        self.with_fields(form_fields, now)
    }

    /// Rebuilds the field matching `form_field_id`; `None` when there is no such field.
    pub fn with_field_mapped<F>(&self, form_field_id: &str, now: DateTime<Utc>, rebuild: F) -> Option<Self>
    where
        F: FnOnce(&Field) -> Field,
    {
        let form_fields = replace_first(&self.form_fields, |f| f.form_field_id == form_field_id, |f| Some(rebuild(f)))?;
        Some(self.with_fields(form_fields, now))
    }

    pub fn with_field_updated(&self, form_field_id: &str, patch: &FieldPatch, now: DateTime<Utc>) -> Option<Self> {
        self.with_field_mapped(form_field_id, now, |field| field.with_patch(patch))
    }

    pub fn with_field_toggled(&self, form_field_id: &str, now: DateTime<Utc>) -> Option<Self> {
        self.with_field_mapped(form_field_id, now, Field::with_enabled_toggled)
    }

    /// Removes the field. References to it from siblings' conditionals are left in place.
    pub fn with_field_removed(&self, form_field_id: &str, now: DateTime<Utc>) -> Option<Self> {
        let form_fields = remove_first(&self.form_fields, |f| f.form_field_id == form_field_id)?;
        Some(self.with_fields(form_fields, now))
    }

    fn with_fields(&self, form_fields: Vec<Arc<Field>>, now: DateTime<Utc>) -> Self {
        Self {
            form_fields,
            updated_at: now,
            ..self.clone()
        }
    }
}

impl Ordered for Form {
    fn order(&self) -> i64 {
        self.order
    }
}

/// Partial update for a [`Form`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl FormPatch {
    pub fn apply_to(&self, form: &mut Form) {
        if let Some(title) = &self.title {
            form.title = title.clone();
        }
        if let Some(description) = &self.description {
            form.description = description.clone();
        }
        if let Some(order) = self.order {
            form.order = order;
        }
        if let Some(enabled) = self.enabled {
            form.enabled = enabled;
        }
    }
}
