use grc_schema_builder::adapters::clipboard::MemorySink;
use grc_schema_builder::adapters::clock::SystemClock;
use grc_schema_builder::adapters::ids::SequentialGenerator;
use grc_schema_builder::adapters::script::{Script, ScriptError, ScriptReport, ScriptRunner};
use grc_schema_builder::domain::{FieldType, SchemaTree};
use grc_schema_builder::editor::EditorSession;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn session() -> EditorSession {
    EditorSession::new(
        Arc::new(SequentialGenerator::new("id")),
        Arc::new(SystemClock),
        Arc::new(MemorySink::new()),
    )
}

#[test]
fn test_yaml_script_from_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("build.yaml");
    let script_yaml = r#"
- op: add_module
  as: vendors
- op: add_module
  as: controls
- op: update_module
  module: controls
  set:
    name: Controls
- op: reorder_modules
  modules: [controls, vendors]
- op: add_form
  module: controls
  as: review
- op: update_form
  module: controls
  form: review
  set:
    title: Quarterly review
    description: Evidence collected each quarter
- op: add_field
  module: controls
  form: review
  as: outcome
- op: edit_field
  module: controls
  form: review
  field: outcome
  set:
    name: outcome
    type: radio
    required: false
  add_options: [Pass, Fail]
- op: toggle_form
  module: controls
  form: review
"#;
    fs::write(&path, script_yaml)?;

    let mut session = session();
    let script = Script::from_path(&path)?;
    let report = ScriptRunner::new(&mut session).run(&script)?;
    assert_eq!(report, ScriptReport { applied: 9, ignored: 0 });

    let tree = session.tree();
    let names: Vec<&str> = tree
        .modules_in_display_order()
        .into_iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, vec!["Controls", "New Module 1"]);

    let controls = Arc::clone(tree.modules_in_display_order()[0]);
    let review = &controls.forms[0];
    assert_eq!(review.title, "Quarterly review");
    assert!(!review.enabled);

    let outcome = &review.form_fields[0];
    assert_eq!(outcome.name, "outcome");
    assert_eq!(outcome.field_type, FieldType::Radio);
    assert!(!outcome.required);
    let labels: Vec<&str> = outcome.options.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["Pass", "Fail"]);

    Ok(())
}

#[test]
fn test_json_script_against_loaded_document() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("edit.json");
    fs::write(
        &path,
        r#"[
            {"op": "update_module", "module": "mod-1", "set": {"name": "Renamed"}},
            {"op": "delete_form", "module": "mod-1", "form": "form-1"},
            {"op": "copy"}
        ]"#,
    )?;

    let seed = r#"{
        "modules": [{
            "moduleId": "mod-1",
            "name": "Incidents",
            "order": 0,
            "enabled": true,
            "forms": [{
                "formId": "form-1",
                "moduleId": "mod-1",
                "title": "Only form",
                "description": "",
                "order": 0,
                "enabled": true,
                "formFields": [],
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-01-01T00:00:00Z"
            }],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }],
        "organizationalHierarchy": [{"level": "Business Unit"}],
        "riskType": []
    }"#;

    let mut session = session();
    session.load(SchemaTree::from_json(seed)?);
    let report = ScriptRunner::new(&mut session).run(&Script::from_path(&path)?)?;
    assert_eq!(report.applied, 3);

    let module = session.tree().module("mod-1").unwrap();
    assert_eq!(module.name, "Renamed");
    assert!(module.forms.is_empty());
    assert_eq!(session.tree().organizational_hierarchy.len(), 1);

    Ok(())
}

#[test]
fn test_malformed_script_is_reported() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("bad.yaml");
    fs::write(&path, "- op: launch_rockets\n")?;

    assert!(matches!(Script::from_path(&path), Err(ScriptError::Yaml(_))));
    Ok(())
}

#[test]
fn test_missing_script_file() {
    let err = Script::from_path("/no/such/script.yaml").unwrap_err();
    assert!(matches!(err, ScriptError::Io { .. }));
}
