use thiserror::Error;

use crate::config::{ClipboardTarget, EditorSettings, ExportSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_editor(&settings.editor) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_export(&settings.export) {
            errors.extend(e);
        }

        if settings.logging.level.trim().is_empty() {
            errors.push(ValidationError::MissingField("logging.level".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_editor(editor: &EditorSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !matches!(editor.reorder_base, 0 | 1) {
            errors.push(ValidationError::InvalidValue {
                field: "editor.reorder_base".to_string(),
                reason: format!("must be 0 or 1, got {}", editor.reorder_base),
            });
        }

        if editor.sequential_prefix.trim().is_empty() {
            errors.push(ValidationError::MissingField("editor.sequential_prefix".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_export(export: &ExportSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if export.clipboard == ClipboardTarget::File && export.clipboard_path.is_none() {
            errors.push(ValidationError::MissingField(
                "export.clipboard_path (required when export.clipboard = \"file\")".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let settings = Settings::default();
        assert!(ConfigValidator::validate(&settings).is_ok());
    }

    #[test]
    fn test_invalid_reorder_base() {
        let mut settings = Settings::default();
        settings.editor.reorder_base = 5;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn test_file_clipboard_needs_path() {
        let mut settings = Settings::default();
        settings.export.clipboard = ClipboardTarget::File;
        assert!(ConfigValidator::validate(&settings).is_err());

        settings.export.clipboard_path = Some("schema.json".into());
        assert!(ConfigValidator::validate(&settings).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut settings = Settings::default();
        settings.editor.reorder_base = -1;
        settings.editor.sequential_prefix = String::new();
        settings.export.clipboard = ClipboardTarget::File;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
