use indexmap::IndexMap;

use super::{
    convert_output_field, patch_output_field, AbstractTypeComposer, ArgumentsComposer, FieldsComposer,
    InterfacesComposer, RelationsComposer, TypeComposer, TypedFieldsComposer,
};
use crate::{
    FieldConfig, FieldDefinition, FieldPatch, InterfaceTypeId, RelationConfig, Result, SchemaComposer, TypeRef,
    TypeResolvers,
};

#[derive(Debug)]
pub struct InterfaceTypeComposer<'a> {
    sc: &'a mut SchemaComposer,
    id: InterfaceTypeId,
}

impl<'a> InterfaceTypeComposer<'a> {
    pub(crate) fn new(sc: &'a mut SchemaComposer, id: InterfaceTypeId) -> Self {
        InterfaceTypeComposer { sc, id }
    }
}

impl TypeComposer for InterfaceTypeComposer<'_> {
    type Id = InterfaceTypeId;

    fn id(&self) -> InterfaceTypeId {
        self.id
    }

    fn schema(&self) -> &SchemaComposer {
        self.sc
    }

    fn schema_mut(&mut self) -> &mut SchemaComposer {
        self.sc
    }
}

impl FieldsComposer for InterfaceTypeComposer<'_> {
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

impl TypedFieldsComposer for InterfaceTypeComposer<'_> {}

impl ArgumentsComposer for InterfaceTypeComposer<'_> {}

impl InterfacesComposer for InterfaceTypeComposer<'_> {
    fn interface_list(&self) -> &Vec<TypeRef> {
        &self.sc.registry.records[self.id].kind.interfaces
    }

    fn interface_list_mut(&mut self) -> &mut Vec<TypeRef> {
        &mut self.sc.registry.records[self.id].kind.interfaces
    }
}

impl RelationsComposer for InterfaceTypeComposer<'_> {
    fn relation_map(&self) -> &IndexMap<String, RelationConfig> {
        &self.sc.registry.records[self.id].kind.relations
    }

    fn relation_map_mut(&mut self) -> &mut IndexMap<String, RelationConfig> {
        &mut self.sc.registry.records[self.id].kind.relations
    }
}

impl AbstractTypeComposer for InterfaceTypeComposer<'_> {
    fn type_resolvers(&self) -> &TypeResolvers {
        &self.sc.registry.records[self.id].kind.type_resolvers
    }

    fn type_resolvers_mut(&mut self) -> &mut TypeResolvers {
        &mut self.sc.registry.records[self.id].kind.type_resolvers
    }
}
