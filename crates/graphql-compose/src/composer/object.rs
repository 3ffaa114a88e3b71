use indexmap::IndexMap;

use super::{
    convert_output_field, patch_output_field, ArgumentsComposer, ComposerExt, FieldsComposer, InterfacesComposer,
    RelationsComposer, TypeComposer, TypedFieldsComposer,
};
use crate::{
    FieldConfig, FieldDefinition, FieldPatch, IsTypeOfFn, ObjectTypeId, RelationConfig, Result, SchemaComposer, TypeRef,
};

#[derive(Debug)]
pub struct ObjectTypeComposer<'a> {
    sc: &'a mut SchemaComposer,
    id: ObjectTypeId,
}

impl<'a> ObjectTypeComposer<'a> {
    pub(crate) fn new(sc: &'a mut SchemaComposer, id: ObjectTypeId) -> Self {
        ObjectTypeComposer { sc, id }
    }

    pub fn get_is_type_of(&self) -> Option<&IsTypeOfFn> {
        self.sc.registry.records[self.id].kind.is_type_of.as_ref()
    }

    pub fn set_is_type_of(&mut self, is_type_of: Option<IsTypeOfFn>) {
        self.sc.registry.records[self.id].kind.is_type_of = is_type_of;
        self.touch();
    }
}

impl TypeComposer for ObjectTypeComposer<'_> {
    type Id = ObjectTypeId;

    fn id(&self) -> ObjectTypeId {
        self.id
    }

    fn schema(&self) -> &SchemaComposer {
        self.sc
    }

    fn schema_mut(&mut self) -> &mut SchemaComposer {
        self.sc
    }
}

impl FieldsComposer for ObjectTypeComposer<'_> {
    type Field = FieldConfig;
    type Definition = FieldDefinition;

    fn field_map(&self) -> &IndexMap<String, FieldConfig> {
        &self.sc.registry.records[self.id].kind.fields
    }

    fn field_map_mut(&mut self) -> &mut IndexMap<String, FieldConfig> {
        &mut self.sc.registry.records[self.id].kind.fields
    }

    fn convert_field(&mut self, name: &str, definition: FieldDefinition) -> Result<FieldConfig> {
        let type_name = self.type_name().to_owned();
        convert_output_field(self.sc, &type_name, name, definition)
    }

    fn patch_field(&mut self, name: &str, field: FieldConfig, patch: FieldPatch) -> Result<FieldConfig> {
        let type_name = self.type_name().to_owned();
        patch_output_field(self.sc, &type_name, name, field, patch)
    }
}

impl TypedFieldsComposer for ObjectTypeComposer<'_> {}

impl ArgumentsComposer for ObjectTypeComposer<'_> {}

impl InterfacesComposer for ObjectTypeComposer<'_> {
    fn interface_list(&self) -> &Vec<TypeRef> {
        &self.sc.registry.records[self.id].kind.interfaces
    }

    fn interface_list_mut(&mut self) -> &mut Vec<TypeRef> {
        &mut self.sc.registry.records[self.id].kind.interfaces
    }
}

impl RelationsComposer for ObjectTypeComposer<'_> {
    fn relation_map(&self) -> &IndexMap<String, RelationConfig> {
        &self.sc.registry.records[self.id].kind.relations
    }

    fn relation_map_mut(&mut self) -> &mut IndexMap<String, RelationConfig> {
        &mut self.sc.registry.records[self.id].kind.relations
    }
}
