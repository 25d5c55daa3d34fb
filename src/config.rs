use crate::descriptor::TypeRegistry;
use crate::error::StructureError;
use ahash::AHashMap;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_ADDITIONAL_STEP_ID: &str = "additional_fields";
pub const DEFAULT_ADDITIONAL_STEP_TITLE: &str = "Additional Information";

/// Engine settings shared by the parser and the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Id of the synthetic step collecting top-level fields outside any wizard page.
    pub additional_step_id: String,
    /// Title of that synthetic step.
    pub additional_step_title: String,
    /// Backend type tag → canonical type tag.
    pub type_mappings: AHashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            additional_step_id: DEFAULT_ADDITIONAL_STEP_ID.to_string(),
            additional_step_title: DEFAULT_ADDITIONAL_STEP_TITLE.to_string(),
            type_mappings: AHashMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn from_json(json: &str) -> Result<Self, StructureError> {
        serde_json::from_str(json).map_err(|e| StructureError::JsonParseError(e.to_string()))
    }

    /// The default type registry extended with this config's mappings.
    pub fn type_registry(&self) -> TypeRegistry {
        let mut registry = TypeRegistry::default();
        for (user_tag, canonical_tag) in &self.type_mappings {
            if !registry.map(user_tag, canonical_tag) {
                warn!(
                    "Ignoring type mapping '{}' -> '{}': unknown canonical type",
                    user_tag, canonical_tag
                );
            }
        }
        registry
    }
}

#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn with_type_mapping(mut self, user_tag: &str, canonical_tag: &str) -> Self {
        self.config
            .type_mappings
            .insert(user_tag.to_string(), canonical_tag.to_string());
        self
    }

    pub fn with_additional_step(mut self, id: &str, title: &str) -> Self {
        self.config.additional_step_id = id.to_string();
        self.config.additional_step_title = title.to_string();
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldKind;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json(r#"{"type_mappings": {"page": "webform_wizard_page"}}"#)
                .unwrap();
        assert_eq!(config.additional_step_id, DEFAULT_ADDITIONAL_STEP_ID);
        assert_eq!(config.type_registry().resolve("page"), FieldKind::WizardPage);
    }
}
