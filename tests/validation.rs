//! Tests for field, step and whole-form validation.
mod common;
use common::*;
use pretty_assertions::assert_eq;
use shinsei::prelude::*;
use shinsei::validation::{group_errors_by_field, has_value, validate_field, validate_step};

fn check(descriptor: &FieldDescriptor, value: &FieldValue) -> Vec<ValidationError> {
    validate_field(
        descriptor,
        value,
        &descriptor.key,
        &FormValues::new(),
        &TriageAnswers::new(),
    )
}

fn email_confirm_field() -> FieldDescriptor {
    FieldDescriptor::new("email", FieldKind::EmailConfirm).with_title("Email")
}

#[test]
fn test_required_text_field() {
    let field = FieldDescriptor::new("name", FieldKind::TextField)
        .with_title("Name")
        .required();

    assert_eq!(
        check(&field, &FieldValue::text("")),
        vec![ValidationError::new("name", "Name is required")]
    );
    assert_eq!(check(&field, &FieldValue::text("  ")).len(), 1);
    assert_eq!(check(&field, &FieldValue::Empty).len(), 1);
    assert!(check(&field, &FieldValue::text("Ada")).is_empty());
}

#[test]
fn test_title_falls_back_to_admin_title_then_key() {
    let mut field = FieldDescriptor::new("name", FieldKind::TextField).required();
    assert_eq!(check(&field, &FieldValue::Empty)[0].message, "name is required");

    field.admin_title = Some("Full name".to_string());
    assert_eq!(check(&field, &FieldValue::Empty)[0].message, "Full name is required");
}

#[test]
fn test_inaccessible_fields_are_skipped() {
    let mut field = FieldDescriptor::new("secret", FieldKind::TextField).required();
    field.access = false;
    assert!(check(&field, &FieldValue::Empty).is_empty());
}

#[test]
fn test_required_checkbox_and_files() {
    let checkbox = FieldDescriptor::new("agree", FieldKind::Checkbox)
        .with_title("Agreement")
        .required();
    assert_eq!(check(&checkbox, &FieldValue::bool(false)).len(), 1);
    assert!(check(&checkbox, &FieldValue::bool(true)).is_empty());

    let files = FieldDescriptor::new("evidence", FieldKind::ManagedFile)
        .with_title("Evidence")
        .required();
    assert_eq!(check(&files, &FieldValue::Files(vec![])).len(), 1);
    assert_eq!(check(&files, &FieldValue::Empty).len(), 1);
    assert!(check(&files, &FieldValue::Files(vec![pending_file("a.png")])).is_empty());
}

#[test]
fn test_plain_email_format() {
    let field = FieldDescriptor::new("contact", FieldKind::Email);
    assert!(check(&field, &FieldValue::text("")).is_empty());
    assert!(check(&field, &FieldValue::text("ada@example.org")).is_empty());
    assert_eq!(
        check(&field, &FieldValue::text("ada@example")),
        vec![ValidationError::new("contact", "Please enter a valid email address")]
    );
}

#[test]
fn test_email_confirm_matching_pair() {
    let field = email_confirm_field().required();
    assert!(check(&field, &email_pair("ada@example.org", "ada@example.org")).is_empty());
}

#[test]
fn test_email_confirm_mismatch() {
    let field = email_confirm_field();
    assert_eq!(
        check(&field, &email_pair("ada@example.org", "bob@example.org")),
        vec![ValidationError::new("email", "Email addresses do not match")]
    );
}

#[test]
fn test_email_confirm_malformed_primary() {
    let field = email_confirm_field();

    let errors = check(&field, &email_pair("not-an-email", "not-an-email"));
    assert_eq!(
        errors,
        vec![ValidationError::new("email", "Please enter a valid email address")]
    );

    let errors = check(&field, &email_pair("not-an-email", "ada@example.org"));
    let format_errors = errors
        .iter()
        .filter(|e| e.message == "Please enter a valid email address")
        .count();
    assert_eq!(format_errors, 1);
    assert!(errors.iter().any(|e| e.message == "Email addresses do not match"));
}

#[test]
fn test_email_confirm_malformed_confirm_value() {
    let field = email_confirm_field();
    let errors = check(&field, &email_pair("ada@example.org", "ada@"));

    assert_eq!(errors[0], ValidationError::new("email.email_confirm", "Please enter a valid email address"));
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_required_email_confirm_needs_primary() {
    let field = email_confirm_field().required();
    assert_eq!(
        check(&field, &email_pair("", "ada@example.org")),
        vec![ValidationError::new("email", "Email is required")]
    );
}

#[test]
fn test_address_parts() {
    let model = wizard_model();
    let home = &model.entries["details"].children["home"];
    let address = |parts: &[(&str, &str)]| {
        FieldValue::Composite(
            parts
                .iter()
                .fold(CompositeValue::new(CompositeKind::Address), |c, (k, v)| {
                    c.with_part(k, *v)
                }),
        )
    };

    assert_eq!(
        check(home, &address(&[])),
        vec![ValidationError::new("home", "Home address is required")]
    );
    assert_eq!(
        check(home, &address(&[("postal_code", "12345")])),
        vec![
            ValidationError::new("home.address", "Address is required"),
            ValidationError::new("home.city", "City is required"),
        ]
    );
    assert!(check(home, &address(&[("address", "1 Main St"), ("city", "Springfield")])).is_empty());
}

#[test]
fn test_full_name_parts() {
    let mut field = FieldDescriptor::new("name", FieldKind::FullName).with_title("Name");
    field.required_parts = vec!["last_name".to_string()];
    let value = FieldValue::Composite(
        CompositeValue::new(CompositeKind::FullName).with_part("first_name", "Ada"),
    );

    assert_eq!(
        check(&field, &value),
        vec![ValidationError::new("name.last_name", "Last name is required")]
    );
}

#[test]
fn test_generic_composite_required_elements() {
    let field = FieldDescriptor::new("vehicle", FieldKind::Other("webform_vehicle".to_string()))
        .with_element(
            FieldDescriptor::new("make", FieldKind::TextField)
                .with_title("Make")
                .required(),
        )
        .with_element(FieldDescriptor::new("model", FieldKind::TextField));
    let value = FieldValue::Composite(
        CompositeValue::new(CompositeKind::Generic).with_part("model", "T"),
    );

    assert_eq!(
        check(&field, &value),
        vec![ValidationError::new("vehicle.make", "Make is required")]
    );
}

#[test]
fn test_generic_composite_presence() {
    let field = FieldDescriptor::new("vehicle", FieldKind::Other("webform_composite".to_string()));
    let empty = FieldValue::Composite(
        CompositeValue::new(CompositeKind::Generic).with_part("make", ""),
    );
    let zero = FieldValue::Composite(
        CompositeValue::new(CompositeKind::Generic).with_part("doors", 0.0),
    );

    assert!(!has_value(&field, &empty));
    assert!(has_value(&field, &zero));
}

#[test]
fn test_validate_step_in_declaration_order() {
    let store = ready_store(&wizard_model());
    let errors = validate_step(&store.steps()[0], store.values(), store.triage_answers());

    assert_eq!(
        errors,
        vec![
            ValidationError::new("first_name", "First name is required"),
            ValidationError::new("email", "Email is required"),
        ]
    );
}

#[test]
fn test_whole_form_reports_first_step_with_errors() {
    let mut store = ready_store(&three_step_model());
    store.set_field_value("a", FieldValue::text("x")).unwrap();
    store.set_field_value("c", FieldValue::text("z")).unwrap();

    let report = store.validate();
    assert!(!report.is_valid());
    assert_eq!(report.errors, vec![ValidationError::new("b", "B is required")]);
    assert_eq!(report.first_error_step, Some(1));

    store.set_field_value("b", FieldValue::text("y")).unwrap();
    let report = store.validate();
    assert!(report.is_valid());
    assert_eq!(report.first_error_step, None);
}

#[test]
fn test_group_errors_keeps_first_message() {
    let errors = vec![
        ValidationError::new("email", "Please enter a valid email address"),
        ValidationError::new("email", "Email addresses do not match"),
        ValidationError::new("home.city", "City is required"),
    ];
    let grouped = group_errors_by_field(&errors);

    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped["email"], "Please enter a valid email address");
    assert_eq!(grouped["home.city"], "City is required");
}

#[test]
fn test_validation_error_display() {
    let error = ValidationError::new("home.city", "City is required");
    assert_eq!(error.to_string(), "home.city: City is required");
}

#[test]
fn test_generic_composite_parts_flagged_on_parent() {
    let structure = serde_json::json!({
        "vehicle": {
            "#type": "webform_composite_plus:vehicle",
            "#make__required": true,
            "#plate__required": true,
            "#webform_composite_elements": {
                "make": { "#type": "textfield", "#title": "Make" },
                "model": { "#type": "textfield", "#title": "Model" }
            }
        }
    });
    let model = DescriptorModel::from_value(&structure, &TypeRegistry::default()).unwrap();
    let vehicle = &model.entries["vehicle"];
    let value = FieldValue::Composite(
        CompositeValue::new(CompositeKind::Generic).with_part("model", "T"),
    );

    assert_eq!(
        check(vehicle, &value),
        vec![
            ValidationError::new("vehicle.make", "Make is required"),
            ValidationError::new("vehicle.plate", "plate is required"),
        ]
    );
}
