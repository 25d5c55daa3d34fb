use crate::descriptor::{CompositeKind, FieldDescriptor, FieldKind};
use crate::value::{CompositeValue, FieldValue, Scalar};

pub(crate) const ADDRESS_PRESENCE_PARTS: [&str; 3] = ["address", "city", "postal_code"];
pub(crate) const NAME_PRESENCE_PARTS: [&str; 2] = ["first_name", "last_name"];

/// Whether `value` counts as filled in for a field described by `descriptor`.
///
/// The check depends on the field type: text needs non-blank content, a checkbox
/// must be ticked, a file field needs at least one file, and composites need their
/// meaningful parts filled.
pub fn has_value(descriptor: &FieldDescriptor, value: &FieldValue) -> bool {
    if let Some(kind) = descriptor.composite {
        return value
            .as_composite()
            .is_some_and(|composite| composite_has_value(kind, composite));
    }

    match (&descriptor.kind, value) {
        (_, FieldValue::Empty) => false,
        (kind, FieldValue::Scalar(s)) if kind.is_text_like() => {
            s.as_str().is_some_and(|text| !text.trim().is_empty())
        }
        (FieldKind::Checkbox, FieldValue::Scalar(s)) => s.is_truthy(),
        (FieldKind::ManagedFile, FieldValue::Files(files)) => !files.is_empty(),
        (FieldKind::ManagedFile, _) => false,
        (_, FieldValue::Scalar(s)) => s.is_truthy(),
        (_, FieldValue::Files(files)) => !files.is_empty(),
        (_, FieldValue::Composite(c)) => !c.parts.is_empty(),
    }
}

fn composite_has_value(kind: CompositeKind, composite: &CompositeValue) -> bool {
    match kind {
        CompositeKind::EmailConfirm => composite.is_part_filled("email"),
        CompositeKind::Address => ADDRESS_PRESENCE_PARTS
            .iter()
            .any(|part| composite.is_part_filled(part)),
        CompositeKind::FullName => NAME_PRESENCE_PARTS
            .iter()
            .any(|part| composite.is_part_filled(part)),
        CompositeKind::Generic => composite
            .parts
            .values()
            .any(|v| !matches!(v, Scalar::Text(s) if s.is_empty())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_empty() {
        let field = FieldDescriptor::new("name", FieldKind::TextField);
        assert!(!has_value(&field, &FieldValue::text("   ")));
        assert!(has_value(&field, &FieldValue::text(" Ada ")));
        assert!(!has_value(&field, &FieldValue::number(3.0)));
    }

    #[test]
    fn unknown_kinds_fall_back_to_truthiness() {
        let field = FieldDescriptor::new("rating", FieldKind::Other("number".into()));
        assert!(has_value(&field, &FieldValue::number(3.0)));
        assert!(!has_value(&field, &FieldValue::number(0.0)));
        assert!(!has_value(&field, &FieldValue::Scalar(Scalar::Text(String::new()))));
    }

    #[test]
    fn name_composite_needs_first_or_last_name() {
        let field = FieldDescriptor::new("who", FieldKind::FullName);
        let title_only =
            FieldValue::Composite(CompositeValue::new(CompositeKind::FullName).with_part("title", "Dr"));
        let with_last = FieldValue::Composite(
            CompositeValue::new(CompositeKind::FullName).with_part("last_name", "Lovelace"),
        );
        assert!(!has_value(&field, &title_only));
        assert!(has_value(&field, &with_last));
    }
}
