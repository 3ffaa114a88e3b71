use crate::{
    composer::{
        EnumTypeComposer, InputTypeComposer, InterfaceTypeComposer, ObjectTypeComposer, ScalarTypeComposer,
        UnionTypeComposer,
    },
    convert::is_valid_name,
    ids::KindRecord,
    registry::{EnumRecord, InputRecord, InterfaceRecord, ObjectRecord, ScalarRecord, UnionRecord},
    ComposeError, ComposerConfig, EnumTypeId, InputTypeId, InterfaceTypeId, KindId, NamedTypeId, ObjectTypeId,
    Registry, RegistryKey, Result, ScalarTypeId, SchemaLocation, TypeInput, TypePosition, TypeRef, UnionTypeId,
};

/// A schema composition session: the registry of every type built so far and the settings used
/// to build them.
#[derive(Debug, Default)]
pub struct SchemaComposer {
    pub(crate) registry: Registry,
    pub(crate) config: ComposerConfig,
}

macro_rules! kind_accessors {
    ($($create:ident, $walker:ident, $get:ident: $record:ident => $id:ident, $composer:ident;)*) => {
        $(
            /// Returns the type named `name`, creating it when missing.
            pub fn $create(&mut self, name: &str) -> Result<$composer<'_>> {
                let id = self.create::<$record>(name)?;
                Ok($composer::new(self, id))
            }

            pub fn $walker(&mut self, id: $id) -> Result<$composer<'_>> {
                let id = self.registry.check(id)?;
                Ok($composer::new(self, id))
            }

            pub fn $get(&mut self, key: impl Into<RegistryKey>) -> Result<$composer<'_>> {
                let id = self.get_kind::<$id>(key)?;
                Ok($composer::new(self, id))
            }
        )*
    };
}

impl SchemaComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ComposerConfig) -> Self {
        SchemaComposer {
            registry: Registry::new(),
            config,
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    kind_accessors! {
        create_object, object, get_otc: ObjectRecord => ObjectTypeId, ObjectTypeComposer;
        create_input, input, get_itc: InputRecord => InputTypeId, InputTypeComposer;
        create_interface, interface, get_iftc: InterfaceRecord => InterfaceTypeId, InterfaceTypeComposer;
        create_union, union, get_utc: UnionRecord => UnionTypeId, UnionTypeComposer;
        create_enum, enum_type, get_etc: EnumRecord => EnumTypeId, EnumTypeComposer;
        create_scalar, scalar, get_stc: ScalarRecord => ScalarTypeId, ScalarTypeComposer;
    }

    /// Get-or-create by name. A type of another kind under that name is an error.
    pub(crate) fn create<K: KindRecord>(&mut self, name: &str) -> Result<K::Id> {
        if let Some(existing) = self.registry.lookup(name) {
            return K::Id::narrow(existing).ok_or_else(|| ComposeError::kind_mismatch(name, K::KIND, existing.kind()));
        }
        if !is_valid_name(name) {
            return Err(ComposeError::Validation {
                location: SchemaLocation::definition(name),
                message: format!("'{name}' is not a valid type name"),
            });
        }
        let id = self.registry.push::<K>(name);
        self.registry.set(name, id);
        Ok(id)
    }

    fn get_kind<I: KindId>(&self, key: impl Into<RegistryKey>) -> Result<I> {
        let id = self.registry.get(key)?;
        I::narrow(id).ok_or_else(|| ComposeError::kind_mismatch(self.registry.name_of(id), I::KIND, id.kind()))
    }

    /// The type registered under `key`, of any kind.
    pub fn get(&self, key: impl Into<RegistryKey>) -> Result<NamedTypeId> {
        self.registry.get(key)
    }

    pub fn has(&self, key: impl Into<RegistryKey>) -> bool {
        self.registry.has(key)
    }

    pub fn delete(&mut self, key: impl Into<RegistryKey>) -> Option<NamedTypeId> {
        self.registry.delete(key)
    }

    /// Registers whatever `input` stands for and returns its named type.
    ///
    /// Wrappers are ignored: `add("[User!]")` returns `User`.
    pub fn add(&mut self, input: impl Into<TypeInput>) -> Result<NamedTypeId> {
        let ty = self.type_ref(input, TypePosition::Any)?;
        ty.unwrap_named(&self.registry)
    }

    /// Converts `input` for use at `position`.
    pub fn type_ref(&mut self, input: impl Into<TypeInput>, position: TypePosition) -> Result<TypeRef> {
        self.convert(input.into(), position, &SchemaLocation::definition("<input>"))
    }

    /// Drops every type. Composers and ids obtained before are invalidated.
    pub fn clear(&mut self) {
        self.registry.clear();
    }
}
