//! Copying types, within a session or into another one.
//!
//! Cloning into another session copies the whole reachable graph. The [CloneMap] records every
//! type cloned so far and gets its entry before the type's members are visited, so cycles
//! terminate and a type reached through several paths is cloned once.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    registry::CommonRecord, scalars::is_builtin_scalar, ArgumentConfig, ComposeError, Deferred, FieldConfig, KindId,
    NamedTypeId, ObjectTypeId, RelationConfig, Result, SchemaComposer, SchemaLocation, TypeRef, TypeResolvers,
};

/// Where `clone_type` copies a type to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneTarget {
    /// A new type with this name. The name must be free.
    NewName(String),
    /// An existing type of the same kind, whose definition is overwritten.
    Existing(NamedTypeId),
}

impl From<&str> for CloneTarget {
    fn from(name: &str) -> Self {
        CloneTarget::NewName(name.to_owned())
    }
}

impl From<String> for CloneTarget {
    fn from(name: String) -> Self {
        CloneTarget::NewName(name)
    }
}

macro_rules! clone_target_from_ids {
    ($($id:ty),*) => {
        $(
            impl From<$id> for CloneTarget {
                fn from(id: $id) -> Self {
                    CloneTarget::Existing(id.into())
                }
            }
        )*
    };
}

clone_target_from_ids!(
    NamedTypeId,
    crate::ObjectTypeId,
    crate::InputTypeId,
    crate::InterfaceTypeId,
    crate::UnionTypeId,
    crate::EnumTypeId,
    crate::ScalarTypeId
);

/// Source type to cloned type, for one source session.
///
/// Reusing a map across several `clone_to` calls from the same source shares the types cloned
/// by earlier calls.
#[derive(Debug, Clone, Default)]
pub struct CloneMap(HashMap<NamedTypeId, NamedTypeId>);

impl CloneMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: impl Into<NamedTypeId>) -> Option<NamedTypeId> {
        self.0.get(&source.into()).copied()
    }

    pub fn get_object(&self, source: ObjectTypeId) -> Option<ObjectTypeId> {
        self.get(source).and_then(NamedTypeId::as_object)
    }

    pub fn contains(&self, source: impl Into<NamedTypeId>) -> bool {
        self.0.contains_key(&source.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub(crate) fn clone_within<I: KindId>(sc: &mut SchemaComposer, id: I, target: CloneTarget) -> Result<I> {
    let source: NamedTypeId = sc.registry.check(id)?.into();
    let name = sc.registry.name_of(source).to_owned();

    let target = match target {
        CloneTarget::NewName(new_name) => {
            if sc.registry.has(new_name.as_str()) {
                return Err(ComposeError::Validation {
                    location: SchemaLocation::definition(&name),
                    message: format!("cannot clone into '{new_name}', the name is already taken"),
                });
            }
            sc.create_kind(&new_name, I::KIND)?
        }
        CloneTarget::Existing(existing) => {
            let existing = sc.registry.check(existing)?;
            if existing.kind() != I::KIND {
                return Err(ComposeError::kind_mismatch(
                    sc.registry.name_of(existing),
                    I::KIND,
                    existing.kind(),
                ));
            }
            existing
        }
    };

    if target != source {
        copy_record(sc, source, target)?;
    }
    tracing::debug!(from = name.as_str(), to = sc.registry.name_of(target), "cloned type");
    I::narrow(target).ok_or_else(|| ComposeError::kind_mismatch(sc.registry.name_of(target), I::KIND, target.kind()))
}

/// Copies metadata and members of `source` over `target`, both of the same kind. References to
/// other types are shared.
fn copy_record(sc: &mut SchemaComposer, source: NamedTypeId, target: NamedTypeId) -> Result<()> {
    let registry = &mut sc.registry;
    let CommonRecord {
        description,
        extensions,
        directives,
        ..
    } = registry.common(source);
    let (description, extensions, directives) = (description.clone(), extensions.clone(), directives.clone());

    match (source, target) {
        (NamedTypeId::Object(from), NamedTypeId::Object(to)) => registry.records[to].kind = registry.records[from].kind.clone(),
        (NamedTypeId::Input(from), NamedTypeId::Input(to)) => registry.records[to].kind = registry.records[from].kind.clone(),
        (NamedTypeId::Interface(from), NamedTypeId::Interface(to)) => {
            registry.records[to].kind = registry.records[from].kind.clone();
        }
        (NamedTypeId::Union(from), NamedTypeId::Union(to)) => registry.records[to].kind = registry.records[from].kind.clone(),
        (NamedTypeId::Enum(from), NamedTypeId::Enum(to)) => registry.records[to].kind = registry.records[from].kind.clone(),
        (NamedTypeId::Scalar(from), NamedTypeId::Scalar(to)) => registry.records[to].kind = registry.records[from].kind.clone(),
        (source, target) => {
            return Err(ComposeError::kind_mismatch(
                registry.name_of(target),
                source.kind(),
                target.kind(),
            ))
        }
    }

    let common = registry.common_mut(target);
    common.description = description;
    common.extensions = extensions;
    common.directives = directives;
    common.modified = true;
    Ok(())
}

#[tracing::instrument(skip_all, fields(source = ?id))]
pub(crate) fn clone_to<I: KindId>(
    source: &SchemaComposer,
    id: I,
    target: &mut SchemaComposer,
    map: &mut CloneMap,
) -> Result<I> {
    let id = source.registry.check(id)?;
    let cloned = Cloner {
        source,
        target: &mut *target,
        map,
    }
    .clone_type(id.into())?;
    I::narrow(cloned).ok_or_else(|| {
        ComposeError::kind_mismatch(target.registry.name_of(cloned), I::KIND, cloned.kind())
    })
}

struct Cloner<'a> {
    source: &'a SchemaComposer,
    target: &'a mut SchemaComposer,
    map: &'a mut CloneMap,
}

impl Cloner<'_> {
    fn clone_type(&mut self, id: NamedTypeId) -> Result<NamedTypeId> {
        if let Some(cloned) = self.map.get(id) {
            tracing::trace!(?id, "already cloned");
            return Ok(cloned);
        }

        let registry = &self.source.registry;
        let name = registry.name_of(id);
        let builtin = id.kind() == crate::TypeKind::Scalar && is_builtin_scalar(name);
        if builtin {
            // Registers the target's own built-in scalar when enabled there.
            self.target.lookup_named(name);
        }
        let cloned = self.target.create_kind(name, id.kind())?;
        self.map.0.insert(id, cloned);
        tracing::debug!(name, "cloning type");
        if builtin {
            return Ok(cloned);
        }

        self.populate(id, cloned)?;

        let common = registry.common(id);
        let target = self.target.registry.common_mut(cloned);
        target.description = common.description.clone();
        target.extensions = common.extensions.clone();
        target.directives = common.directives.clone();
        target.modified = true;
        Ok(cloned)
    }

    fn populate(&mut self, id: NamedTypeId, cloned: NamedTypeId) -> Result<()> {
        let registry = &self.source.registry;
        match (id, cloned) {
            (NamedTypeId::Object(from), NamedTypeId::Object(to)) => {
                let record = &registry.records[from].kind;
                let fields = self.fields(&record.fields)?;
                let interfaces = self.type_refs(&record.interfaces)?;
                let relations = self.relations(&record.relations)?;
                let kind = &mut self.target.registry.records[to].kind;
                kind.fields = fields;
                kind.interfaces = interfaces;
                kind.relations = relations;
                kind.is_type_of = record.is_type_of.clone();
            }
            (NamedTypeId::Interface(from), NamedTypeId::Interface(to)) => {
                let record = &registry.records[from].kind;
                let fields = self.fields(&record.fields)?;
                let interfaces = self.type_refs(&record.interfaces)?;
                let relations = self.relations(&record.relations)?;
                let type_resolvers = self.type_resolvers(&record.type_resolvers, registry.name_of(from))?;
                let kind = &mut self.target.registry.records[to].kind;
                kind.fields = fields;
                kind.interfaces = interfaces;
                kind.relations = relations;
                kind.type_resolvers = type_resolvers;
            }
            (NamedTypeId::Union(from), NamedTypeId::Union(to)) => {
                let record = &registry.records[from].kind;
                let types = self.type_refs(&record.types)?;
                let type_resolvers = self.type_resolvers(&record.type_resolvers, registry.name_of(from))?;
                let kind = &mut self.target.registry.records[to].kind;
                kind.types = types;
                kind.type_resolvers = type_resolvers;
            }
            (NamedTypeId::Input(from), NamedTypeId::Input(to)) => {
                let fields = self.args(&registry.records[from].kind.fields)?;
                self.target.registry.records[to].kind.fields = fields;
            }
            (NamedTypeId::Enum(from), NamedTypeId::Enum(to)) => {
                self.target.registry.records[to].kind = registry.records[from].kind.clone();
            }
            (NamedTypeId::Scalar(from), NamedTypeId::Scalar(to)) => {
                self.target.registry.records[to].kind = registry.records[from].kind.clone();
            }
            (id, cloned) => {
                return Err(ComposeError::kind_mismatch(
                    self.target.registry.name_of(cloned),
                    id.kind(),
                    cloned.kind(),
                ))
            }
        }
        Ok(())
    }

    fn type_ref(&mut self, ty: &TypeRef) -> Result<TypeRef> {
        Ok(match ty {
            TypeRef::Named(id) => TypeRef::Named(self.clone_type(*id)?),
            TypeRef::List(inner) => TypeRef::List(Box::new(self.type_ref(inner)?)),
            TypeRef::NonNull(inner) => TypeRef::NonNull(Box::new(self.type_ref(inner)?)),
            TypeRef::Deferred(deferred) => match deferred.of_type(&self.source.registry) {
                Ok(resolved) => self.type_ref(&resolved)?,
                // Still dangling in the source: stays a forward reference by name in the target.
                Err(err) => match deferred.provisional_name() {
                    Some(name) => TypeRef::Deferred(Deferred::forward(name)),
                    None => return Err(err),
                },
            },
        })
    }

    fn type_refs(&mut self, types: &[TypeRef]) -> Result<Vec<TypeRef>> {
        types.iter().map(|ty| self.type_ref(ty)).collect()
    }

    fn fields(&mut self, fields: &IndexMap<String, FieldConfig>) -> Result<IndexMap<String, FieldConfig>> {
        fields
            .iter()
            .map(|(name, field)| {
                let cloned = FieldConfig {
                    ty: self.type_ref(&field.ty)?,
                    args: self.args(&field.args)?,
                    resolve: field.resolve.clone(),
                    meta: field.meta.clone(),
                };
                Ok((name.clone(), cloned))
            })
            .collect()
    }

    fn args(&mut self, args: &IndexMap<String, ArgumentConfig>) -> Result<IndexMap<String, ArgumentConfig>> {
        args.iter()
            .map(|(name, arg)| {
                let mut cloned = arg.clone();
                cloned.ty = self.type_ref(&arg.ty)?;
                Ok((name.clone(), cloned))
            })
            .collect()
    }

    fn relations(
        &mut self,
        relations: &IndexMap<String, RelationConfig>,
    ) -> Result<IndexMap<String, RelationConfig>> {
        relations
            .iter()
            .map(|(name, relation)| {
                let mut cloned = relation.clone();
                cloned.ty = self.type_ref(&relation.ty)?;
                cloned.args = self.args(&relation.args)?;
                Ok((name.clone(), cloned))
            })
            .collect()
    }

    fn type_resolvers(&mut self, resolvers: &TypeResolvers, type_name: &str) -> Result<TypeResolvers> {
        let mut candidates = HashMap::new();
        for candidate in resolvers.table().keys().copied().chain(resolvers.fallback()) {
            let cloned = self.clone_type(candidate.into())?;
            candidates.insert(candidate, cloned);
        }
        let mut cloned = resolvers.remap(|candidate| {
            candidates
                .get(&candidate)
                .copied()
                .and_then(NamedTypeId::as_object)
                .unwrap_or(candidate)
        });
        cloned.compile(type_name);
        Ok(cloned)
    }
}
