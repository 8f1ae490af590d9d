//! Fields: the leaf entries of a form.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Ordered;

/// Input control a field renders as
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Number,
    Select,
    Multiselect,
    Checkbox,
    Radio,
    Radiogroup,
    File,
    Date,
    Nodeselect,
}

impl FieldType {
    /// Every field type, in the order an editor offers them
    pub const ALL: [FieldType; 11] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Select,
        FieldType::Multiselect,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Radiogroup,
        FieldType::File,
        FieldType::Date,
        FieldType::Nodeselect,
    ];

    /// Whether the field's `options` list is meaningful for this type
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Multiselect | FieldType::Radio)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::Multiselect => "multiselect",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Radiogroup => "radiogroup",
            FieldType::File => "file",
            FieldType::Date => "date",
            FieldType::Nodeselect => "nodeselect",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Help text shown next to a field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tooltip {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub message: String,
}

/// Conditional-visibility rule pointing at a sibling field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditional {
    #[serde(default)]
    pub status: bool,
    /// `formFieldId` of the sibling this field depends on; empty when unset.
    /// Not cleared when that sibling is deleted.
    #[serde(default)]
    pub depends_on: String,
    #[serde(default)]
    pub trigger_value: String,
}

impl Conditional {
    /// The referenced sibling id, if one has been chosen
    pub fn depends_on(&self) -> Option<&str> {
        if self.depends_on.is_empty() {
            None
        } else {
            Some(&self.depends_on)
        }
    }
}

/// A labeled choice of a choice-type field. Ids are unique within the field only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub option_id: String,
    pub label: String,
}

/// A single schema entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub form_field_id: String,
    pub form_id: String,
    pub name: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    pub enabled: bool,
    #[serde(deserialize_with = "crate::domain::order_or_zero")]
    pub order: i64,
    #[serde(default)]
    pub tooltip: Tooltip,
    #[serde(default)]
    pub conditional: Conditional,
    /// Kept as-is when `field_type` moves away from a choice type
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl Field {
    /// Builds the default field appended at position `order` (0-based sibling count).
    pub fn new(form_field_id: impl Into<String>, form_id: impl Into<String>, order: i64) -> Self {
        let n = order + 1;
        Self {
            form_field_id: form_field_id.into(),
            form_id: form_id.into(),
            name: format!("field_{}", n),
            placeholder: format!("Enter {}", n),
            field_type: FieldType::Text,
            required: true,
            enabled: true,
            order,
            tooltip: Tooltip::default(),
            conditional: Conditional::default(),
            options: Vec::new(),
        }
    }

    /// Shallow merge: every `Some` in the patch replaces the whole value.
    pub fn with_patch(&self, patch: &FieldPatch) -> Self {
        let mut next = self.clone();
        patch.apply_to(&mut next);
        next
    }

    pub fn with_enabled_toggled(&self) -> Self {
        Self {
            enabled: !self.enabled,
            ..self.clone()
        }
    }

    pub fn option(&self, option_id: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.option_id == option_id)
    }
}

impl Ordered for Field {
    fn order(&self) -> i64 {
        self.order
    }
}

/// Partial update for a [`Field`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
}

impl FieldPatch {
    pub fn apply_to(&self, field: &mut Field) {
        if let Some(name) = &self.name {
            field.name = name.clone();
        }
        if let Some(placeholder) = &self.placeholder {
            field.placeholder = placeholder.clone();
        }
        if let Some(field_type) = self.field_type {
            field.field_type = field_type;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(enabled) = self.enabled {
            field.enabled = enabled;
        }
        if let Some(order) = self.order {
            field.order = order;
        }
        if let Some(tooltip) = &self.tooltip {
            field.tooltip = tooltip.clone();
        }
        if let Some(conditional) = &self.conditional {
            field.conditional = conditional.clone();
        }
        if let Some(options) = &self.options {
            field.options = options.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FieldPatch::default()
    }
}
