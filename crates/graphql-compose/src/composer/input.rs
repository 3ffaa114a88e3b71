use indexmap::IndexMap;

use super::{FieldsComposer, TypeComposer, TypedFieldsComposer};
use crate::{
    FieldPatch, InputFieldConfig, InputFieldDefinition, InputTypeId, Result, SchemaComposer, SchemaLocation,
    TypePosition,
};

#[derive(Debug)]
pub struct InputTypeComposer<'a> {
    sc: &'a mut SchemaComposer,
    id: InputTypeId,
}

impl<'a> InputTypeComposer<'a> {
    pub(crate) fn new(sc: &'a mut SchemaComposer, id: InputTypeId) -> Self {
        InputTypeComposer { sc, id }
    }

    /// Whether the field is required: non-null and without a default value.
    pub fn is_field_required(&self, name: &str) -> Result<bool> {
        let field = self.get_field(name)?;
        Ok(field.default_value.is_none() && field.ty.is_non_null(&self.sc.registry))
    }
}

impl TypeComposer for InputTypeComposer<'_> {
    type Id = InputTypeId;

    fn id(&self) -> InputTypeId {
        self.id
    }

    fn schema(&self) -> &SchemaComposer {
        self.sc
    }

    fn schema_mut(&mut self) -> &mut SchemaComposer {
        self.sc
    }
}

impl FieldsComposer for InputTypeComposer<'_> {
    type Field = InputFieldConfig;
    type Definition = InputFieldDefinition;

    fn field_map(&self) -> &IndexMap<String, InputFieldConfig> {
        &self.sc.registry.records[self.id].kind.fields
    }

    fn field_map_mut(&mut self) -> &mut IndexMap<String, InputFieldConfig> {
        &mut self.sc.registry.records[self.id].kind.fields
    }

    fn convert_field(&mut self, name: &str, definition: InputFieldDefinition) -> Result<InputFieldConfig> {
        let location = SchemaLocation::field(self.type_name(), name);
        self.sc.convert_input_value(location, definition)
    }

    fn patch_field(&mut self, name: &str, mut field: InputFieldConfig, patch: FieldPatch) -> Result<InputFieldConfig> {
        let FieldPatch {
            ty,
            default_value,
            meta,
            ..
        } = patch;
        if let Some(ty) = ty {
            let location = SchemaLocation::field(self.type_name(), name);
            field.ty = self.sc.convert(ty, TypePosition::Input, &location)?;
        }
        if default_value.is_some() {
            field.default_value = default_value;
        }
        field.meta.merge(meta);
        Ok(field)
    }
}

impl TypedFieldsComposer for InputTypeComposer<'_> {}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ComposeError, InputValueDefinition, Polarity};

    #[test]
    fn input_fields() {
        let mut sc = SchemaComposer::new();
        sc.create_object("User").unwrap();
        sc.create_enum("Sort").unwrap();

        let mut filter = sc.create_input("UserFilter").unwrap();
        filter
            .set_fields([
                ("name", InputValueDefinition::new("String!")),
                ("sort", InputValueDefinition::new("Sort!").default_value("ASC")),
            ])
            .unwrap();
        assert!(filter.is_field_required("name").unwrap());
        assert!(!filter.is_field_required("sort").unwrap());

        filter
            .extend_field("name", FieldPatch::new().default_value("anonymous"))
            .unwrap();
        assert_eq!(filter.get_field("name").unwrap().default_value, Some(json!("anonymous")));

        let err = filter.set_field("owner", "User").unwrap_err();
        assert!(matches!(
            err,
            ComposeError::WrongPolarity {
                expected: Polarity::Input,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "UserFilter.owner: type 'User' is object type and cannot be used in input position"
        );
    }
}
