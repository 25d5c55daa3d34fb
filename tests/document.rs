//! Tests for the form document envelope, the triage questionnaire and configuration.
mod common;
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use shinsei::error::StructureError;
use shinsei::prelude::*;

#[test]
fn test_bare_element_map_gets_defaults() {
    let json = wizard_structure_json().to_string();
    let document = WebformDocument::from_json("theft_report", &json, &TypeRegistry::default())
        .unwrap();

    assert_eq!(document.id, "theft_report");
    assert_eq!(document.title, "Form");
    assert_eq!(document.status, "open");
    assert!(!document.has_triage());
    assert_eq!(document.elements, wizard_model());
}

#[test]
fn test_wrapped_document() {
    let json = json!({
        "id": "theft_report",
        "title": "Report a theft",
        "description": "Tell us what happened",
        "status": "open",
        "elements": wizard_structure_json(),
        "triage": {
            "questions": {
                "category": {
                    "id": "category",
                    "type": "select",
                    "title": "What was stolen?",
                    "required": 1,
                    "options": { "car": "A car", "bike": "A bike" },
                    "weight": "0"
                },
                "urgent": {
                    "id": "urgent",
                    "type": "radios",
                    "title": "Is it urgent?",
                    "required": 0
                }
            }
        }
    })
    .to_string();
    let document = WebformDocument::from_json("fallback", &json, &TypeRegistry::default()).unwrap();

    assert_eq!(document.id, "theft_report");
    assert_eq!(document.title, "Report a theft");
    assert_eq!(document.description.as_deref(), Some("Tell us what happened"));
    assert!(document.has_triage());

    let questions = document.triage_descriptors(&TypeRegistry::default());
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].kind, FieldKind::Select);
    assert!(questions[0].required);
    assert_eq!(questions[0].display_title(), "What was stolen?");
    assert_eq!(questions[0].options.len(), 2);
    assert!(!questions[1].required);
}

#[test]
fn test_closed_form_is_rejected() {
    let json = json!({ "id": "x", "status": "closed", "elements": {} }).to_string();
    let err = WebformDocument::from_json("x", &json, &TypeRegistry::default()).unwrap_err();

    match err {
        StructureError::FormClosed { status } => assert_eq!(status, "closed"),
        other => panic!("expected FormClosed, got {:?}", other),
    }
}

#[test]
fn test_triage_answers_validation() {
    let json = json!({
        "elements": {},
        "triage": { "questions": {
            "category": { "id": "category", "type": "select", "title": "Category", "required": 1 },
            "extra": { "id": "extra", "type": "select", "title": "Extra", "required": 0 }
        }}
    })
    .to_string();
    let document = WebformDocument::from_json("x", &json, &TypeRegistry::default()).unwrap();
    let triage = document.triage.as_ref().unwrap();

    let mut answers = TriageAnswers::new();
    let errors = triage.validate_answers(&answers);
    assert_eq!(
        errors,
        vec![ValidationError::new("category", "Category is required")]
    );

    answers.insert("category".to_string(), Scalar::from("   "));
    assert_eq!(triage.validate_answers(&answers).len(), 1);

    answers.insert("category".to_string(), Scalar::from("car"));
    assert!(triage.validate_answers(&answers).is_empty());
}

#[test]
fn test_config_from_json() {
    let config = EngineConfig::from_json(
        r#"{
            "additional_step_title": "Other",
            "type_mappings": { "legacy_name": "webform_composite_plus:full_name", "bogus": "nope" }
        }"#,
    )
    .unwrap();

    assert_eq!(config.additional_step_id, "additional_fields");
    assert_eq!(config.additional_step_title, "Other");

    let registry = config.type_registry();
    assert_eq!(registry.resolve("legacy_name"), FieldKind::FullName);
    assert_eq!(registry.resolve("bogus"), FieldKind::Other("bogus".to_string()));
}

#[test]
fn test_empty_php_lists_read_as_empty_maps() {
    let json = json!({
        "id": "theft_report",
        "status": "open",
        "elements": wizard_structure_json(),
        "triage": { "questions": [] }
    })
    .to_string();
    let document = WebformDocument::from_json("x", &json, &TypeRegistry::default()).unwrap();
    assert!(!document.has_triage());
    assert!(document.triage.as_ref().unwrap().questions.is_empty());

    let json = json!({
        "elements": {},
        "triage": { "questions": {
            "category": { "id": "category", "type": "select", "title": "Category", "options": [] },
            "other": { "id": "other", "type": "select", "title": "Other", "options": null }
        }}
    })
    .to_string();
    let document = WebformDocument::from_json("x", &json, &TypeRegistry::default()).unwrap();
    let questions = &document.triage.as_ref().unwrap().questions;
    assert!(questions["category"].options.is_empty());
    assert!(questions["other"].options.is_empty());
}
