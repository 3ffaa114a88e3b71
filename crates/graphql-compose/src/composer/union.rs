use super::{AbstractTypeComposer, ComposerExt, FieldNames, TypeComposer};
use crate::{
    Result, SchemaComposer, TypeInput, TypeKind, TypePosition, TypeRef, TypeResolvers, UnionTypeId,
};

#[derive(Debug)]
pub struct UnionTypeComposer<'a> {
    sc: &'a mut SchemaComposer,
    id: UnionTypeId,
}

impl<'a> UnionTypeComposer<'a> {
    pub(crate) fn new(sc: &'a mut SchemaComposer, id: UnionTypeId) -> Self {
        UnionTypeComposer { sc, id }
    }

    pub fn get_types(&self) -> &[TypeRef] {
        &self.sc.registry.records[self.id].kind.types
    }

    /// Member names, provisional for members that were never resolved.
    pub fn get_type_names(&self) -> Result<Vec<String>> {
        self.get_types()
            .iter()
            .map(|ty| ty.type_name(&self.sc.registry))
            .collect()
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.get_types()
            .iter()
            .any(|ty| ty.type_name(&self.sc.registry).is_ok_and(|member| member == name))
    }

    /// Members are object types. Forward references are checked at finalization.
    pub fn add_type(&mut self, ty: impl Into<TypeInput>) -> Result<()> {
        self.add_types([ty])
    }

    /// Members already present are skipped.
    pub fn add_types(&mut self, types: impl IntoIterator<Item = impl Into<TypeInput>>) -> Result<()> {
        let types = self.convert_members(types)?;
        for ty in types {
            let name = ty.type_name(&self.sc.registry)?;
            if !self.has_type(&name) {
                self.sc.registry.records[self.id].kind.types.push(ty);
            }
        }
        self.touch();
        Ok(())
    }

    pub fn set_types(&mut self, types: impl IntoIterator<Item = impl Into<TypeInput>>) -> Result<()> {
        let types = self.convert_members(types)?;
        self.sc.registry.records[self.id].kind.types = types;
        self.touch();
        Ok(())
    }

    pub fn remove_type(&mut self, names: impl Into<FieldNames>) {
        let names: FieldNames = names.into();
        self.retain_types(|name| !names.contains(name));
    }

    pub fn remove_other_types(&mut self, keep: impl Into<FieldNames>) {
        let keep: FieldNames = keep.into();
        self.retain_types(|name| keep.contains(name));
    }

    pub fn clear_types(&mut self) {
        self.sc.registry.records[self.id].kind.types.clear();
        self.touch();
    }

    fn retain_types(&mut self, keep: impl Fn(&str) -> bool) {
        let registry = &self.sc.registry;
        let types = registry.records[self.id]
            .kind
            .types
            .iter()
            .filter(|ty| ty.type_name(registry).map_or(true, |name| keep(&name)))
            .cloned()
            .collect::<Vec<_>>();
        self.sc.registry.records[self.id].kind.types = types;
        self.touch();
    }

    fn convert_members(&mut self, types: impl IntoIterator<Item = impl Into<TypeInput>>) -> Result<Vec<TypeRef>> {
        let location = self.location();
        types
            .into_iter()
            .map(|ty| self.sc.convert(ty.into(), TypePosition::Kind(TypeKind::Object), &location))
            .collect()
    }
}

impl TypeComposer for UnionTypeComposer<'_> {
    type Id = UnionTypeId;

    fn id(&self) -> UnionTypeId {
        self.id
    }

    fn schema(&self) -> &SchemaComposer {
        self.sc
    }

    fn schema_mut(&mut self) -> &mut SchemaComposer {
        self.sc
    }
}

impl AbstractTypeComposer for UnionTypeComposer<'_> {
    fn type_resolvers(&self) -> &TypeResolvers {
        &self.sc.registry.records[self.id].kind.type_resolvers
    }

    fn type_resolvers_mut(&mut self) -> &mut TypeResolvers {
        &mut self.sc.registry.records[self.id].kind.type_resolvers
    }
}
