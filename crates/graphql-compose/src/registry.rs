//! The session-scoped store of every named type known to a [SchemaComposer](crate::SchemaComposer).
//!
//! Types live in one arena per kind and are addressed with kind-narrowed ids. Keys (type names,
//! SDL snippets, external output types) map to those ids. Clearing the registry bumps its
//! generation so that ids handed out before the clear are rejected instead of aliasing new types.

use std::{collections::HashMap, fmt, sync::Arc};

use indexmap::IndexMap;

use crate::{
    ids::KindRecord, ComposeError, Directive, EnumValueConfig, Extensions, FieldConfig, InputFieldConfig,
    IsTypeOfFn, NamedTypeId, OutputType, RelationConfig, Result, ScalarFn, TypeKind, TypeRef, TypeResolvers,
};

/// Identity of an externally supplied output type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExternalKey(usize);

impl ExternalKey {
    pub fn of(ty: &Arc<OutputType>) -> Self {
        ExternalKey(Arc::as_ptr(ty) as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RegistryKey {
    /// A type name.
    Name(String),
    /// The literal text of an SDL snippet a type was built from.
    Literal(String),
    /// An output type handed to the composer from the outside.
    External(ExternalKey),
}

impl RegistryKey {
    fn describe(&self) -> String {
        match self {
            RegistryKey::Name(name) => name.clone(),
            RegistryKey::Literal(sdl) => sdl.trim().to_owned(),
            RegistryKey::External(key) => format!("external type {:#x}", key.0),
        }
    }
}

impl From<&str> for RegistryKey {
    fn from(name: &str) -> Self {
        RegistryKey::Name(name.to_owned())
    }
}

impl From<String> for RegistryKey {
    fn from(name: String) -> Self {
        RegistryKey::Name(name)
    }
}

impl From<&String> for RegistryKey {
    fn from(name: &String) -> Self {
        RegistryKey::Name(name.clone())
    }
}

impl From<ExternalKey> for RegistryKey {
    fn from(key: ExternalKey) -> Self {
        RegistryKey::External(key)
    }
}

/// Metadata shared by all kinds of named types.
#[derive(Debug)]
pub(crate) struct CommonRecord {
    pub name: String,
    pub description: Option<String>,
    pub extensions: Extensions,
    pub directives: Vec<Directive>,
    pub modified: bool,
    /// Allocated once; finalization rewrites its contents but never moves it.
    pub output: Box<OutputType>,
}

#[derive(Debug)]
pub(crate) struct Record<K> {
    pub common: CommonRecord,
    pub kind: K,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectRecord {
    pub fields: IndexMap<String, FieldConfig>,
    pub interfaces: Vec<TypeRef>,
    pub relations: IndexMap<String, RelationConfig>,
    pub is_type_of: Option<IsTypeOfFn>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InterfaceRecord {
    pub fields: IndexMap<String, FieldConfig>,
    pub interfaces: Vec<TypeRef>,
    pub relations: IndexMap<String, RelationConfig>,
    pub type_resolvers: TypeResolvers,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UnionRecord {
    pub types: Vec<TypeRef>,
    pub type_resolvers: TypeResolvers,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InputRecord {
    pub fields: IndexMap<String, InputFieldConfig>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct EnumRecord {
    pub values: IndexMap<String, EnumValueConfig>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScalarRecord {
    pub specified_by_url: Option<String>,
    pub serialize: Option<ScalarFn>,
    pub parse_value: Option<ScalarFn>,
}

/// One arena per kind, indexed by the matching id.
#[derive(Default)]
pub(crate) struct Records {
    pub objects: Vec<Record<ObjectRecord>>,
    pub inputs: Vec<Record<InputRecord>>,
    pub interfaces: Vec<Record<InterfaceRecord>>,
    pub unions: Vec<Record<UnionRecord>>,
    pub enums: Vec<Record<EnumRecord>>,
    pub scalars: Vec<Record<ScalarRecord>>,
}

#[derive(Default)]
pub struct Registry {
    generation: u32,
    pub(crate) records: Records,
    keys: HashMap<RegistryKey, NamedTypeId>,
    // Keeps external types alive so their addresses stay unique while keyed.
    pinned: Vec<Arc<OutputType>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("generation", &self.generation)
            .field("types", &self.len())
            .field("keys", &self.keys.len())
            .finish_non_exhaustive()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: impl Into<RegistryKey>) -> bool {
        self.keys.contains_key(&key.into())
    }

    pub fn get(&self, key: impl Into<RegistryKey>) -> Result<NamedTypeId> {
        let key = key.into();
        self.keys
            .get(&key)
            .copied()
            .ok_or_else(|| ComposeError::TypeNotFound { key: key.describe() })
    }

    pub fn lookup(&self, key: impl Into<RegistryKey>) -> Option<NamedTypeId> {
        self.keys.get(&key.into()).copied()
    }

    /// Maps `key` to `id`, replacing any previous entry.
    pub fn set(&mut self, key: impl Into<RegistryKey>, id: impl Into<NamedTypeId>) {
        let key = key.into();
        let id = id.into();
        tracing::trace!(key = %key.describe(), ?id, "registry set");
        self.keys.insert(key, id);
    }

    /// Returns the entry for `key`, or evaluates `init`, stores its result under `key` and returns it.
    ///
    /// `init` only runs when the key is absent. Registering a type through this before populating
    /// its fields is what lets a type refer to itself.
    pub fn get_or_set(
        &mut self,
        key: impl Into<RegistryKey>,
        init: impl FnOnce(&mut Registry) -> Result<NamedTypeId>,
    ) -> Result<NamedTypeId> {
        let key = key.into();
        if let Some(id) = self.keys.get(&key) {
            return Ok(*id);
        }
        let id = init(self)?;
        self.keys.insert(key, id);
        Ok(id)
    }

    /// Whether `key` exists and resolves to a type of the given kind.
    pub fn has_instance(&self, key: impl Into<RegistryKey>, kind: TypeKind) -> bool {
        self.lookup(key).is_some_and(|id| id.kind() == kind)
    }

    pub fn delete(&mut self, key: impl Into<RegistryKey>) -> Option<NamedTypeId> {
        let key = key.into();
        if let RegistryKey::External(external) = &key {
            self.pinned.retain(|ty| ExternalKey::of(ty) != *external);
        }
        self.keys.remove(&key)
    }

    /// Drops every key and every type. Ids handed out before are invalidated.
    pub fn clear(&mut self) {
        tracing::debug!(types = self.len(), "clearing registry");
        self.keys.clear();
        self.pinned.clear();
        self.records.objects.clear();
        self.records.inputs.clear();
        self.records.interfaces.clear();
        self.records.unions.clear();
        self.records.enums.clear();
        self.records.scalars.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of types, whether or not they are still reachable through a key.
    pub fn len(&self) -> usize {
        self.records.objects.len()
            + self.records.inputs.len()
            + self.records.interfaces.len()
            + self.records.unions.len()
            + self.records.enums.len()
            + self.records.scalars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type names that currently have an entry.
    pub fn names(&self) -> impl Iterator<Item = (&str, NamedTypeId)> {
        self.keys.iter().filter_map(|(key, id)| match key {
            RegistryKey::Name(name) => Some((name.as_str(), *id)),
            _ => None,
        })
    }

    /// Every type of the registry, in creation order per kind.
    pub fn types(&self) -> impl Iterator<Item = NamedTypeId> + '_ {
        let generation = self.generation;
        (0..self.records.objects.len())
            .map(move |ix| ObjectRecord::make_id(ix, generation).into())
            .chain((0..self.records.inputs.len()).map(move |ix| InputRecord::make_id(ix, generation).into()))
            .chain((0..self.records.interfaces.len()).map(move |ix| InterfaceRecord::make_id(ix, generation).into()))
            .chain((0..self.records.unions.len()).map(move |ix| UnionRecord::make_id(ix, generation).into()))
            .chain((0..self.records.enums.len()).map(move |ix| EnumRecord::make_id(ix, generation).into()))
            .chain((0..self.records.scalars.len()).map(move |ix| ScalarRecord::make_id(ix, generation).into()))
    }

    pub fn contains(&self, id: impl Into<NamedTypeId>) -> bool {
        let id = id.into();
        if id.generation() != self.generation {
            return false;
        }
        let len = match id {
            NamedTypeId::Object(_) => self.records.objects.len(),
            NamedTypeId::Input(_) => self.records.inputs.len(),
            NamedTypeId::Interface(_) => self.records.interfaces.len(),
            NamedTypeId::Union(_) => self.records.unions.len(),
            NamedTypeId::Enum(_) => self.records.enums.len(),
            NamedTypeId::Scalar(_) => self.records.scalars.len(),
        };
        id.index() < len
    }

    pub(crate) fn check<I: Into<NamedTypeId>>(&self, id: I) -> Result<I>
    where
        I: Copy,
    {
        if self.contains(id) {
            Ok(id)
        } else {
            Err(ComposeError::StaleHandle {
                handle: format!("{:?}", id.into()),
            })
        }
    }

    /// Name of a type, or a stale handle error for ids this registry did not hand out.
    pub fn type_name(&self, id: impl Into<NamedTypeId>) -> Result<&str> {
        let id = self.check(id.into())?;
        Ok(self.name_of(id))
    }

    /// Name of a type whose id has been checked against this registry.
    pub(crate) fn name_of(&self, id: impl Into<NamedTypeId>) -> &str {
        &self.common(id.into()).name
    }

    /// Points the materialized references to `id` at its current name.
    pub(crate) fn refresh_references(&mut self, id: NamedTypeId) {
        let name = self.name_of(id).to_owned();
        for referrer in self.types().collect::<Vec<_>>() {
            self.common_mut(referrer).output.for_each_type_ref_mut(|ty| {
                if ty.id == id {
                    ty.name.clone_from(&name);
                }
            });
        }
    }

    pub(crate) fn push<K: KindRecord>(&mut self, name: impl Into<String>) -> K::Id {
        let name = name.into();
        let generation = self.generation;
        let output = Box::new(K::empty_output(&name));
        tracing::debug!(name = %name, kind = %K::KIND, "new type");
        let arena = K::arena_mut(self);
        arena.push(Record {
            common: CommonRecord {
                name,
                description: None,
                extensions: Extensions::new(),
                directives: Vec::new(),
                modified: false,
                output,
            },
            kind: K::default(),
        });
        K::make_id(arena.len() - 1, generation)
    }

    pub(crate) fn pin(&mut self, ty: Arc<OutputType>) -> ExternalKey {
        let key = ExternalKey::of(&ty);
        if !self.pinned.iter().any(|pinned| Arc::ptr_eq(pinned, &ty)) {
            self.pinned.push(ty);
        }
        key
    }

    pub(crate) fn common(&self, id: NamedTypeId) -> &CommonRecord {
        match id {
            NamedTypeId::Object(id) => &self.records[id].common,
            NamedTypeId::Input(id) => &self.records[id].common,
            NamedTypeId::Interface(id) => &self.records[id].common,
            NamedTypeId::Union(id) => &self.records[id].common,
            NamedTypeId::Enum(id) => &self.records[id].common,
            NamedTypeId::Scalar(id) => &self.records[id].common,
        }
    }

    pub(crate) fn common_mut(&mut self, id: NamedTypeId) -> &mut CommonRecord {
        match id {
            NamedTypeId::Object(id) => &mut self.records[id].common,
            NamedTypeId::Input(id) => &mut self.records[id].common,
            NamedTypeId::Interface(id) => &mut self.records[id].common,
            NamedTypeId::Union(id) => &mut self.records[id].common,
            NamedTypeId::Enum(id) => &mut self.records[id].common,
            NamedTypeId::Scalar(id) => &mut self.records[id].common,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::ObjectTypeId;

    #[test]
    fn get_or_set_evaluates_init_once() {
        let mut registry = Registry::new();
        let calls = Cell::new(0);

        let first = registry
            .get_or_set("User", |registry| {
                calls.set(calls.get() + 1);
                Ok(registry.push::<ObjectRecord>("User").into())
            })
            .unwrap();
        let second = registry
            .get_or_set("User", |registry| {
                calls.set(calls.get() + 1);
                Ok(registry.push::<ObjectRecord>("User").into())
            })
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_reports_missing_keys() {
        let registry = Registry::new();
        let err = registry.get("Missing").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Type with key 'Missing' does not exist in the registry");
    }

    #[test]
    fn has_instance_narrows_by_kind() {
        let mut registry = Registry::new();
        let id: ObjectTypeId = registry.push::<ObjectRecord>("User");
        registry.set("User", id);

        assert!(registry.has("User"));
        assert!(registry.has_instance("User", TypeKind::Object));
        assert!(!registry.has_instance("User", TypeKind::Input));
        assert!(!registry.has_instance("Nope", TypeKind::Object));
    }

    #[test]
    fn clear_invalidates_previous_ids() {
        let mut registry = Registry::new();
        let id: ObjectTypeId = registry.push::<ObjectRecord>("User");
        registry.set("User", id);
        assert!(registry.contains(id));

        registry.clear();
        assert!(!registry.contains(id));
        assert!(!registry.has("User"));
        assert!(registry.check(id).is_err());

        let fresh: ObjectTypeId = registry.push::<ObjectRecord>("User");
        assert_ne!(fresh, id);
        assert!(registry.contains(fresh));
        assert_eq!(registry.type_name(fresh).unwrap(), "User");
        assert!(matches!(
            registry.type_name(id),
            Err(crate::ComposeError::StaleHandle { .. })
        ));
    }

    #[test]
    fn delete_only_drops_the_key() {
        let mut registry = Registry::new();
        let id: ObjectTypeId = registry.push::<ObjectRecord>("User");
        registry.set("User", id);

        assert_eq!(registry.delete("User"), Some(id.into()));
        assert!(!registry.has("User"));
        assert!(registry.contains(id));
        assert_eq!(registry.type_name(id).unwrap(), "User");
    }
}
