use ahash::AHashMap;
use std::fmt;

/// The kind of composite a field's value is, decided from the field's type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Address,
    FullName,
    EmailConfirm,
    Generic,
}

/// Master macro to define every field kind, its backend tag and the default registry.
macro_rules! define_field_kinds {
    ( $( ($variant:ident, $tag:literal) ),* $(,)? ) => {
        /// The canonical field types understood by the engine.
        ///
        /// Backend tags that are not registered resolve to `Other`, which keeps the
        /// original tag so composite detection and plain truthiness still work.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum FieldKind {
            $( $variant, )*
            Other(String),
        }

        impl FieldKind {
            /// The backend type tag of this kind.
            pub fn tag(&self) -> &str {
                match self {
                    $( FieldKind::$variant => $tag, )*
                    FieldKind::Other(tag) => tag,
                }
            }

            /// Looks up a canonical kind by its backend tag.
            pub fn from_canonical_tag(tag: &str) -> Option<Self> {
                match tag {
                    $( $tag => Some(FieldKind::$variant), )*
                    _ => None,
                }
            }
        }

        fn register_default_kinds(registry: &mut AHashMap<String, FieldKind>) {
            $( registry.insert($tag.to_string(), FieldKind::$variant); )*
        }
    };
}

define_field_kinds! {
    (TextField, "textfield"),
    (TextArea, "textarea"),
    (Select, "select"),
    (Radios, "radios"),
    (DateList, "datelist"),
    (Date, "date"),
    (Email, "email"),
    (Checkbox, "checkbox"),
    (Checkboxes, "checkboxes"),
    (ManagedFile, "managed_file"),
    (EmailConfirm, "webform_email_confirm"),
    (Address, "webform_address"),
    (FullName, "webform_composite_plus:full_name"),
    (WizardPage, "webform_wizard_page"),
}

impl FieldKind {
    /// Kinds whose value is a single string that must be non-blank to count as filled.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            FieldKind::TextField
                | FieldKind::TextArea
                | FieldKind::Select
                | FieldKind::Radios
                | FieldKind::DateList
                | FieldKind::Date
                | FieldKind::Email
        )
    }

    pub fn is_wizard_page(&self) -> bool {
        matches!(self, FieldKind::WizardPage)
    }

    /// The composite kind implied by the tag alone, if any.
    pub fn composite_kind(&self) -> Option<CompositeKind> {
        match self {
            FieldKind::Address => Some(CompositeKind::Address),
            FieldKind::FullName => Some(CompositeKind::FullName),
            FieldKind::EmailConfirm => Some(CompositeKind::EmailConfirm),
            FieldKind::Other(tag) if tag.contains("composite") => Some(CompositeKind::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Maps backend type tags to field kinds.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    kinds: AHashMap<String, FieldKind>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut kinds = AHashMap::new();
        register_default_kinds(&mut kinds);
        Self { kinds }
    }
}

impl TypeRegistry {
    /// Registers `user_tag` as another name for the canonical `canonical_tag`.
    /// Returns `false` and leaves the registry unchanged when `canonical_tag` is unknown.
    pub fn map(&mut self, user_tag: &str, canonical_tag: &str) -> bool {
        match FieldKind::from_canonical_tag(canonical_tag) {
            Some(kind) => {
                self.kinds.insert(user_tag.to_string(), kind);
                true
            }
            None => false,
        }
    }

    pub fn resolve(&self, tag: &str) -> FieldKind {
        self.kinds
            .get(tag)
            .cloned()
            .unwrap_or_else(|| FieldKind::Other(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_default_and_mapped_tags() {
        let mut registry = TypeRegistry::default();
        assert_eq!(registry.resolve("textfield"), FieldKind::TextField);
        assert_eq!(
            registry.resolve("my_page"),
            FieldKind::Other("my_page".to_string())
        );

        assert!(registry.map("my_page", "webform_wizard_page"));
        assert_eq!(registry.resolve("my_page"), FieldKind::WizardPage);
        assert!(!registry.map("mystery", "not_a_kind"));
    }

    #[test]
    fn composite_tags_are_generic_composites() {
        let kind = TypeRegistry::default().resolve("webform_composite_plus:vehicle");
        assert_eq!(kind.composite_kind(), Some(CompositeKind::Generic));
        assert_eq!(FieldKind::FullName.composite_kind(), Some(CompositeKind::FullName));
    }
}
