use indexmap::IndexMap;
use serde_json::Value;

use super::{FieldsComposer, TypeComposer};
use crate::{EnumTypeId, EnumValueConfig, EnumValueDefinition, FieldPatch, Result, SchemaComposer};

/// Enum values are managed with the [FieldsComposer] methods, a value being a field of the enum.
#[derive(Debug)]
pub struct EnumTypeComposer<'a> {
    sc: &'a mut SchemaComposer,
    id: EnumTypeId,
}

impl<'a> EnumTypeComposer<'a> {
    pub(crate) fn new(sc: &'a mut SchemaComposer, id: EnumTypeId) -> Self {
        EnumTypeComposer { sc, id }
    }

    /// The value name whose internal value is `value`.
    pub fn get_value_name(&self, value: &Value) -> Option<&str> {
        self.get_fields()
            .iter()
            .find(|(_, config)| config.value == *value)
            .map(|(name, _)| name.as_str())
    }
}

impl TypeComposer for EnumTypeComposer<'_> {
    type Id = EnumTypeId;

    fn id(&self) -> EnumTypeId {
        self.id
    }

    fn schema(&self) -> &SchemaComposer {
        self.sc
    }

    fn schema_mut(&mut self) -> &mut SchemaComposer {
        self.sc
    }
}

impl FieldsComposer for EnumTypeComposer<'_> {
    type Field = EnumValueConfig;
    type Definition = EnumValueDefinition;

    fn field_map(&self) -> &IndexMap<String, EnumValueConfig> {
        &self.sc.registry.records[self.id].kind.values
    }

    fn field_map_mut(&mut self) -> &mut IndexMap<String, EnumValueConfig> {
        &mut self.sc.registry.records[self.id].kind.values
    }

    fn convert_field(&mut self, name: &str, definition: EnumValueDefinition) -> Result<EnumValueConfig> {
        let EnumValueDefinition { value, meta } = definition;
        Ok(EnumValueConfig {
            value: value.unwrap_or_else(|| Value::String(name.to_owned())),
            meta,
        })
    }

    fn patch_field(&mut self, _: &str, mut field: EnumValueConfig, patch: FieldPatch) -> Result<EnumValueConfig> {
        let FieldPatch { value, meta, .. } = patch;
        if let Some(value) = value {
            field.value = value;
        }
        field.meta.merge(meta);
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn values_default_to_their_name() {
        let mut sc = SchemaComposer::new();
        let mut sort = sc.create_enum("Sort").unwrap();
        sort.set_fields([
            ("ASC", EnumValueDefinition::new()),
            ("DESC", EnumValueDefinition::new().value(-1)),
        ])
        .unwrap();

        assert_eq!(sort.get_field("ASC").unwrap().value, json!("ASC"));
        assert_eq!(sort.get_value_name(&json!(-1)), Some("DESC"));

        sort.deprecate_fields("DESC").unwrap();
        sort.extend_field("DESC", FieldPatch::new().value(json!("desc")).description("Newest first"))
            .unwrap();
        let desc = sort.get_field("DESC").unwrap();
        assert_eq!(desc.value, json!("desc"));
        assert_eq!(desc.meta.description.as_deref(), Some("Newest first"));
        assert_eq!(desc.meta.deprecation_reason.as_deref(), Some("deprecated"));
    }
}
