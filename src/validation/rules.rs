use super::ValidationError;
use crate::descriptor::{CompositeKind, FieldDescriptor, FieldKind};
use crate::value::{CompositeValue, FieldValue};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

const INVALID_EMAIL: &str = "Please enter a valid email address";
const EMAILS_DIFFER: &str = "Email addresses do not match";

const ADDRESS_CHECKS: [(&str, &str); 3] = [
    ("address", "Address"),
    ("city", "City"),
    ("postal_code", "Postal code"),
];
const NAME_CHECKS: [(&str, &str); 3] = [
    ("title", "Title"),
    ("first_name", "First name"),
    ("last_name", "Last name"),
];

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Checks that run once the required check has passed.
pub(super) fn type_specific(
    descriptor: &FieldDescriptor,
    value: &FieldValue,
    key: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(kind) = descriptor.composite {
        if let Some(composite) = value.as_composite() {
            match kind {
                CompositeKind::EmailConfirm => email_confirm(composite, key, errors),
                CompositeKind::Address => named_parts(descriptor, composite, key, &ADDRESS_CHECKS, errors),
                CompositeKind::FullName => named_parts(descriptor, composite, key, &NAME_CHECKS, errors),
                CompositeKind::Generic => generic_parts(descriptor, composite, key, errors),
            }
        }
        return;
    }

    if descriptor.kind == FieldKind::Email {
        if let Some(email) = value.as_scalar().and_then(|s| s.as_str()) {
            if !email.is_empty() && !is_valid_email(email) {
                errors.push(ValidationError::new(key, INVALID_EMAIL));
            }
        }
    }
}

/// At most one format error, primary address first, then the mismatch check on its own.
fn email_confirm(composite: &CompositeValue, key: &str, errors: &mut Vec<ValidationError>) {
    let email = composite.text("email");
    let confirm = composite.text("email_confirm");

    if !email.is_empty() && !is_valid_email(email) {
        errors.push(ValidationError::new(key, INVALID_EMAIL));
    } else if !confirm.is_empty() && !is_valid_email(confirm) {
        errors.push(ValidationError::new(
            format!("{}.email_confirm", key),
            INVALID_EMAIL,
        ));
    }

    if !email.is_empty() && !confirm.is_empty() && email != confirm {
        errors.push(ValidationError::new(key, EMAILS_DIFFER));
    }
}

fn named_parts(
    descriptor: &FieldDescriptor,
    composite: &CompositeValue,
    key: &str,
    checks: &[(&str, &str)],
    errors: &mut Vec<ValidationError>,
) {
    for (part, label) in checks {
        if descriptor.is_part_required(part) && !composite.is_part_filled(part) {
            errors.push(ValidationError::required(format!("{}.{}", key, part), label));
        }
    }
}

fn generic_parts(
    descriptor: &FieldDescriptor,
    composite: &CompositeValue,
    key: &str,
    errors: &mut Vec<ValidationError>,
) {
    let declared = descriptor
        .composite_elements
        .iter()
        .map(|(part, element)| (part.as_str(), element.display_title()));
    let flagged_only = descriptor
        .required_parts
        .iter()
        .filter(|part| !descriptor.composite_elements.contains_key(part.as_str()))
        .map(|part| (part.as_str(), part.as_str()));

    for (part, label) in declared.chain(flagged_only) {
        if descriptor.is_part_required(part) && !composite.is_part_filled(part) {
            errors.push(ValidationError::required(format!("{}.{}", key, part), label));
        }
    }
}
