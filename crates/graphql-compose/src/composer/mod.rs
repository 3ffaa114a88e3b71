//! Composers are short-lived walkers over one type of a [SchemaComposer]: a typed id plus a mutable
//! borrow of the session. All editing goes through them.
//!
//! Behavior shared between kinds lives in the traits of this module. Every mutation marks the
//! type as modified so that the next [TypeComposer::get_type] rebuilds its output.

mod enums;
mod input;
mod interface;
mod object;
mod scalar;
mod union;

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    convert::is_valid_name,
    metadata::{directive_by_name, remove_directives_by_name},
    registry::CommonRecord,
    ArgumentConfig, ArgumentDefinition, CloneMap, CloneTarget, ComposeError, Directive, Extensions, FieldLike,
    FieldPatch, KindId, Metadata, NamedTypeId, ObjectTypeId, OutputType, RelationConfig, RelationOpts, Result,
    SchemaComposer, SchemaLocation, TypeInput, TypeKind, TypePosition, TypeRef, TypeResolveFn, TypeResolverPredicate,
    TypeResolvers, TypedField,
};

pub use self::{
    enums::EnumTypeComposer, input::InputTypeComposer, interface::InterfaceTypeComposer, object::ObjectTypeComposer,
    scalar::ScalarTypeComposer, union::UnionTypeComposer,
};

/// Reason used by [FieldsComposer::deprecate_fields] when none is given.
pub const DEFAULT_DEPRECATION_REASON: &str = "deprecated";

/// One or several field names. Field removal also accepts dotted paths into nested types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldNames(Vec<String>);

impl FieldNames {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|candidate| candidate == name)
    }
}

impl IntoIterator for FieldNames {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<&str> for FieldNames {
    fn from(name: &str) -> Self {
        FieldNames(vec![name.to_owned()])
    }
}

impl From<String> for FieldNames {
    fn from(name: String) -> Self {
        FieldNames(vec![name])
    }
}

impl<const N: usize> From<[&str; N]> for FieldNames {
    fn from(names: [&str; N]) -> Self {
        FieldNames(names.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for FieldNames {
    fn from(names: &[&str]) -> Self {
        FieldNames(names.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl From<Vec<&str>> for FieldNames {
    fn from(names: Vec<&str>) -> Self {
        FieldNames(names.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for FieldNames {
    fn from(names: Vec<String>) -> Self {
        FieldNames(names)
    }
}

/// Argument of [FieldsComposer::deprecate_fields].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeprecatedFields {
    /// Deprecated with [DEFAULT_DEPRECATION_REASON].
    Names(FieldNames),
    Reasons(IndexMap<String, String>),
}

macro_rules! deprecated_from_names {
    ($($source:ty),*) => {
        $(
            impl From<$source> for DeprecatedFields {
                fn from(names: $source) -> Self {
                    DeprecatedFields::Names(names.into())
                }
            }
        )*
    };
}

deprecated_from_names!(FieldNames, &str, String, &[&str], Vec<&str>, Vec<String>);

impl<const N: usize> From<[&str; N]> for DeprecatedFields {
    fn from(names: [&str; N]) -> Self {
        DeprecatedFields::Names(names.into())
    }
}

impl From<IndexMap<String, String>> for DeprecatedFields {
    fn from(reasons: IndexMap<String, String>) -> Self {
        DeprecatedFields::Reasons(reasons)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for DeprecatedFields {
    fn from(reasons: [(&str, &str); N]) -> Self {
        DeprecatedFields::Reasons(
            reasons
                .into_iter()
                .map(|(name, reason)| (name.to_owned(), reason.to_owned()))
                .collect(),
        )
    }
}

/// Operations available on every kind of type.
pub trait TypeComposer {
    type Id: KindId;

    fn id(&self) -> Self::Id;
    fn schema(&self) -> &SchemaComposer;
    fn schema_mut(&mut self) -> &mut SchemaComposer;

    fn named_id(&self) -> NamedTypeId {
        self.id().into()
    }

    fn kind(&self) -> TypeKind {
        <Self::Id as KindId>::KIND
    }

    fn type_name(&self) -> &str {
        &self.common().name
    }

    /// Renames the type. The old name stops resolving to it.
    fn set_type_name(&mut self, name: &str) -> Result<()> {
        let id = self.named_id();
        let location = SchemaLocation::definition(self.type_name());
        if !is_valid_name(name) {
            return Err(ComposeError::Validation {
                location,
                message: format!("'{name}' is not a valid type name"),
            });
        }

        let registry = &mut self.schema_mut().registry;
        if registry.lookup(name).is_some_and(|existing| existing != id) {
            return Err(ComposeError::Validation {
                location,
                message: format!("type name '{name}' is already taken"),
            });
        }

        let common = registry.common_mut(id);
        let previous = std::mem::replace(&mut common.name, name.to_owned());
        common.modified = true;
        if registry.lookup(previous.as_str()) == Some(id) {
            registry.delete(previous.as_str());
        }
        registry.set(name, id);
        registry.refresh_references(id);
        tracing::debug!(from = %previous, to = name, "renamed type");
        Ok(())
    }

    fn description(&self) -> Option<&str> {
        self.common().description.as_deref()
    }

    fn set_description(&mut self, description: impl Into<String>) {
        self.common_mut().description = Some(description.into());
    }

    fn get_extensions(&self) -> &Extensions {
        &self.common().extensions
    }

    fn set_extensions(&mut self, extensions: Extensions) {
        self.common_mut().extensions = extensions;
    }

    fn extend_extensions(&mut self, extensions: impl IntoIterator<Item = (String, Value)>) {
        self.common_mut().extensions.extend(extensions);
    }

    fn clear_extensions(&mut self) {
        self.common_mut().extensions.clear();
    }

    fn get_extension(&self, key: &str) -> Option<&Value> {
        self.common().extensions.get(key)
    }

    fn has_extension(&self, key: &str) -> bool {
        self.common().extensions.contains_key(key)
    }

    fn set_extension(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.common_mut().extensions.insert(key.into(), value.into());
    }

    fn remove_extension(&mut self, key: &str) -> Option<Value> {
        self.common_mut().extensions.shift_remove(key)
    }

    fn get_directives(&self) -> &[Directive] {
        &self.common().directives
    }

    fn get_directive_names(&self) -> Vec<&str> {
        self.common().directives.iter().map(|d| d.name.as_str()).collect()
    }

    fn set_directives(&mut self, directives: Vec<Directive>) {
        self.common_mut().directives = directives;
    }

    fn add_directive(&mut self, directive: Directive) {
        self.common_mut().directives.push(directive);
    }

    /// Removes every directive with this name.
    fn remove_directive_by_name(&mut self, name: &str) -> bool {
        remove_directives_by_name(&mut self.common_mut().directives, name)
    }

    fn get_directive_by_name(&self, name: &str) -> Option<&Directive> {
        directive_by_name(&self.common().directives, name)
    }

    fn get_directive_by_index(&self, index: usize) -> Option<&Directive> {
        self.common().directives.get(index)
    }

    fn has_directive(&self, name: &str) -> bool {
        self.get_directive_by_name(name).is_some()
    }

    fn is_modified(&self) -> bool {
        self.common().modified
    }

    /// The materialized type, rebuilt first if the type changed since the last call.
    ///
    /// The returned reference always points to the same allocation for a given type.
    fn get_type(&mut self) -> Result<&OutputType> {
        let id = self.named_id();
        self.schema_mut().get_type(id)
    }

    fn type_ref(&self) -> TypeRef {
        TypeRef::Named(self.named_id())
    }

    fn non_null(&self) -> TypeRef {
        TypeRef::non_null(self.type_ref())
    }

    fn list(&self) -> TypeRef {
        TypeRef::list(self.type_ref())
    }

    /// Copies this type into a new type of the same registry, or over an existing one of the same
    /// kind. Referenced types are shared, not copied.
    fn clone_type(&mut self, target: impl Into<CloneTarget>) -> Result<Self::Id> {
        let id = self.id();
        crate::clone::clone_within(self.schema_mut(), id, target.into())
    }

    /// Copies this type and everything it references into another session.
    fn clone_to(&self, target: &mut SchemaComposer, map: &mut CloneMap) -> Result<Self::Id> {
        crate::clone::clone_to(self.schema(), self.id(), target, map)
    }

    /// Copies the members of another type of this session into this one.
    fn merge(&mut self, other: impl Into<TypeInput>) -> Result<()> {
        let id = self.named_id();
        crate::merge::merge(self.schema_mut(), id, other.into())
    }

    /// Copies the members of a type of another session into this one.
    fn merge_from(&mut self, other: &SchemaComposer, other_id: impl Into<NamedTypeId>) -> Result<()> {
        let id = self.named_id();
        crate::merge::merge_from(self.schema_mut(), id, other, other_id.into())
    }
}

pub(crate) trait ComposerExt: TypeComposer {
    fn common(&self) -> &CommonRecord {
        self.schema().registry.common(self.named_id())
    }

    /// Mutable access to the shared record. Marks the type as modified.
    fn common_mut(&mut self) -> &mut CommonRecord {
        let id = self.named_id();
        let common = self.schema_mut().registry.common_mut(id);
        common.modified = true;
        common
    }

    fn touch(&mut self) {
        self.common_mut();
    }

    fn location(&self) -> SchemaLocation {
        SchemaLocation::definition(self.type_name())
    }

    fn field_location(&self, field: &str) -> SchemaLocation {
        SchemaLocation::field(self.type_name(), field)
    }
}

impl<T: TypeComposer + ?Sized> ComposerExt for T {}

/// Field table management, shared by objects, interfaces, input objects and enums (whose values
/// are their fields).
pub trait FieldsComposer: TypeComposer {
    type Field: FieldLike + Clone;
    type Definition;

    #[doc(hidden)]
    fn field_map(&self) -> &IndexMap<String, Self::Field>;
    /// Does not mark the type as modified.
    #[doc(hidden)]
    fn field_map_mut(&mut self) -> &mut IndexMap<String, Self::Field>;
    #[doc(hidden)]
    fn convert_field(&mut self, name: &str, definition: Self::Definition) -> Result<Self::Field>;
    #[doc(hidden)]
    fn patch_field(&mut self, name: &str, field: Self::Field, patch: FieldPatch) -> Result<Self::Field>;

    fn has_field(&self, name: &str) -> bool {
        self.field_map().contains_key(name)
    }

    fn get_fields(&self) -> &IndexMap<String, Self::Field> {
        self.field_map()
    }

    fn get_field_names(&self) -> Vec<&str> {
        self.field_map().keys().map(String::as_str).collect()
    }

    fn get_field(&self, name: &str) -> Result<&Self::Field> {
        self.field_map()
            .get(name)
            .ok_or_else(|| ComposeError::field_not_found(self.type_name(), name))
    }

    /// Replaces the whole field table. Nothing changes if any field fails to convert.
    fn set_fields<I, K, D>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Self::Definition>,
    {
        let fields = self.convert_fields(fields)?;
        *self.field_map_mut() = fields;
        self.touch();
        Ok(())
    }

    /// Adds fields, replacing existing fields with the same name in place.
    fn add_fields<I, K, D>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Self::Definition>,
    {
        let fields = self.convert_fields(fields)?;
        self.field_map_mut().extend(fields);
        self.touch();
        Ok(())
    }

    fn set_field(&mut self, name: &str, definition: impl Into<Self::Definition>) -> Result<()> {
        let field = self.convert_field(name, definition.into())?;
        self.field_map_mut().insert(name.to_owned(), field);
        self.touch();
        Ok(())
    }

    #[doc(hidden)]
    fn convert_fields<I, K, D>(&mut self, fields: I) -> Result<IndexMap<String, Self::Field>>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Self::Definition>,
    {
        fields
            .into_iter()
            .map(|(name, definition)| {
                let name = name.into();
                let field = self.convert_field(&name, definition.into())?;
                Ok((name, field))
            })
            .collect()
    }

    /// Removes fields. A dotted path such as `author.address.city` removes the field of the type
    /// of a nested field. Unknown plain names are ignored.
    fn remove_field(&mut self, names: impl Into<FieldNames>) -> Result<()> {
        let names: FieldNames = names.into();
        for name in names {
            match name.split_once('.') {
                None => {
                    if self.field_map_mut().shift_remove(&name).is_some() {
                        self.touch();
                    }
                }
                Some((head, rest)) => {
                    let nested = self.field_named_type(head)?;
                    remove_field_path(self.schema_mut(), nested, rest)?;
                }
            }
        }
        Ok(())
    }

    fn remove_other_fields(&mut self, keep: impl Into<FieldNames>) {
        let keep = keep.into();
        let before = self.field_map().len();
        self.field_map_mut().retain(|name, _| keep.contains(name));
        if self.field_map().len() != before {
            self.touch();
        }
    }

    /// Moves the listed fields to the front, in that order. Unknown names are ignored.
    fn reorder_fields(&mut self, order: impl Into<FieldNames>) {
        let order = order.into();
        let fields = self.field_map_mut();
        let mut reordered = IndexMap::with_capacity(fields.len());
        for name in order.iter() {
            if let Some((name, field)) = fields.shift_remove_entry(name) {
                reordered.insert(name, field);
            }
        }
        reordered.extend(fields.drain(..));
        *fields = reordered;
        self.touch();
    }

    /// Applies a partial update to an existing field.
    fn extend_field(&mut self, name: &str, patch: FieldPatch) -> Result<()> {
        let field = self.get_field(name)?.clone();
        let field = self.patch_field(name, field, patch)?;
        self.field_map_mut().insert(name.to_owned(), field);
        self.touch();
        Ok(())
    }

    /// Every listed field must exist, otherwise nothing is deprecated.
    fn deprecate_fields(&mut self, fields: impl Into<DeprecatedFields>) -> Result<()> {
        let reasons: Vec<(String, String)> = match fields.into() {
            DeprecatedFields::Names(names) => names
                .into_iter()
                .map(|name| (name, DEFAULT_DEPRECATION_REASON.to_owned()))
                .collect(),
            DeprecatedFields::Reasons(reasons) => reasons.into_iter().collect(),
        };

        if let Some((missing, _)) = reasons.iter().find(|(name, _)| !self.has_field(name)) {
            return Err(ComposeError::field_not_found(self.type_name(), missing));
        }

        for (name, reason) in reasons {
            if let Some(field) = self.field_map_mut().get_mut(&name) {
                field.meta_mut().deprecation_reason = Some(reason);
            }
        }
        self.touch();
        Ok(())
    }

    fn get_field_extensions(&self, name: &str) -> Result<&Extensions> {
        Ok(&self.get_field(name)?.meta().extensions)
    }

    fn set_field_extensions(&mut self, name: &str, extensions: Extensions) -> Result<()> {
        self.field_meta_mut(name)?.extensions = extensions;
        Ok(())
    }

    fn extend_field_extensions(
        &mut self,
        name: &str,
        extensions: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<()> {
        self.field_meta_mut(name)?.extensions.extend(extensions);
        Ok(())
    }

    fn clear_field_extensions(&mut self, name: &str) -> Result<()> {
        self.field_meta_mut(name)?.extensions.clear();
        Ok(())
    }

    fn get_field_extension(&self, name: &str, key: &str) -> Result<Option<&Value>> {
        Ok(self.get_field_extensions(name)?.get(key))
    }

    fn has_field_extension(&self, name: &str, key: &str) -> bool {
        self.get_field_extension(name, key).ok().flatten().is_some()
    }

    fn set_field_extension(&mut self, name: &str, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.field_meta_mut(name)?.extensions.insert(key.into(), value.into());
        Ok(())
    }

    fn remove_field_extension(&mut self, name: &str, key: &str) -> Result<Option<Value>> {
        Ok(self.field_meta_mut(name)?.extensions.shift_remove(key))
    }

    fn get_field_directives(&self, name: &str) -> Result<&[Directive]> {
        Ok(&self.get_field(name)?.meta().directives)
    }

    fn set_field_directives(&mut self, name: &str, directives: Vec<Directive>) -> Result<()> {
        self.field_meta_mut(name)?.directives = directives;
        Ok(())
    }

    fn add_field_directive(&mut self, name: &str, directive: Directive) -> Result<()> {
        self.field_meta_mut(name)?.directives.push(directive);
        Ok(())
    }

    fn remove_field_directive_by_name(&mut self, name: &str, directive: &str) -> Result<bool> {
        Ok(remove_directives_by_name(
            &mut self.field_meta_mut(name)?.directives,
            directive,
        ))
    }

    fn get_field_directive_by_name(&self, name: &str, directive: &str) -> Result<Option<&Directive>> {
        Ok(directive_by_name(self.get_field_directives(name)?, directive))
    }

    fn get_field_directive_by_index(&self, name: &str, index: usize) -> Result<Option<&Directive>> {
        Ok(self.get_field_directives(name)?.get(index))
    }

    fn has_field_directive(&self, name: &str, directive: &str) -> bool {
        self.get_field_directive_by_name(name, directive)
            .ok()
            .flatten()
            .is_some()
    }
}

pub(crate) trait FieldsExt: FieldsComposer {
    /// Mutable access to an existing field. Marks the type as modified.
    fn field_mut(&mut self, name: &str) -> Result<&mut Self::Field> {
        let type_name = self.type_name().to_owned();
        if !self.has_field(name) {
            return Err(ComposeError::field_not_found(&type_name, name));
        }
        self.touch();
        self.field_map_mut()
            .get_mut(name)
            .ok_or_else(|| ComposeError::field_not_found(&type_name, name))
    }

    fn field_meta_mut(&mut self, name: &str) -> Result<&mut Metadata> {
        self.field_mut(name).map(FieldLike::meta_mut)
    }

    /// The named type of a field, through every wrapper.
    fn field_named_type(&self, name: &str) -> Result<NamedTypeId> {
        let field = self.get_field(name)?;
        let Some(ty) = field.type_ref() else {
            return Err(ComposeError::Validation {
                location: self.field_location(name),
                message: "enum values have no type".to_owned(),
            });
        };
        ty.unwrap_named(&self.schema().registry)
    }
}

impl<T: FieldsComposer + ?Sized> FieldsExt for T {}

fn remove_field_path(sc: &mut SchemaComposer, id: NamedTypeId, path: &str) -> Result<()> {
    match id {
        NamedTypeId::Object(id) => sc.object(id)?.remove_field(path),
        NamedTypeId::Interface(id) => sc.interface(id)?.remove_field(path),
        NamedTypeId::Input(id) => sc.input(id)?.remove_field(path),
        NamedTypeId::Enum(id) => sc.enum_type(id)?.remove_field(path),
        NamedTypeId::Union(_) | NamedTypeId::Scalar(_) => Err(ComposeError::kind_mismatch(
            sc.registry.name_of(id),
            "object, interface, input or enum",
            id.kind(),
        )),
    }
}

/// Wrapping helpers for fields that have a type: object, interface and input object fields.
pub trait TypedFieldsComposer: FieldsComposer<Field: TypedField> {
    /// The field type with deferred references resolved. The resolved type replaces the deferred
    /// one in the field table.
    fn get_field_type(&mut self, name: &str) -> Result<TypeRef> {
        let ty = self.get_field(name)?.ty().clone();
        if !ty.has_deferred() {
            return Ok(ty);
        }
        let realized = ty.realize(&self.schema().registry)?;
        if let Some(field) = self.field_map_mut().get_mut(name) {
            field.set_ty(realized.clone());
        }
        Ok(realized)
    }

    /// Type name with wrappers, such as `[Post!]!`.
    fn get_field_type_name(&self, name: &str) -> Result<String> {
        self.get_field(name)?.ty().type_name(&self.schema().registry)
    }

    /// The named type of a field.
    fn get_field_tc(&mut self, name: &str) -> Result<NamedTypeId> {
        let ty = self.get_field_type(name)?;
        ty.unwrap_named(&self.schema().registry)
    }

    fn get_field_otc(&mut self, name: &str) -> Result<ObjectTypeComposer<'_>> {
        let id = self.get_field_tc(name)?;
        let Some(object) = id.as_object() else {
            return Err(ComposeError::kind_mismatch(
                self.schema().registry.name_of(id),
                TypeKind::Object,
                id.kind(),
            ));
        };
        self.schema_mut().object(object)
    }

    fn is_field_non_null(&self, name: &str) -> Result<bool> {
        Ok(self.get_field(name)?.ty().is_non_null(&self.schema().registry))
    }

    fn make_field_non_null(&mut self, names: impl Into<FieldNames>) -> Result<()> {
        self.map_field_types(names.into(), TypeRef::into_non_null)
    }

    fn make_field_nullable(&mut self, names: impl Into<FieldNames>) -> Result<()> {
        self.map_field_types(names.into(), TypeRef::into_nullable)
    }

    fn is_field_plural(&self, name: &str) -> Result<bool> {
        Ok(self.get_field(name)?.ty().is_plural(&self.schema().registry))
    }

    fn make_field_plural(&mut self, names: impl Into<FieldNames>) -> Result<()> {
        self.map_field_types(names.into(), TypeRef::into_plural)
    }

    fn make_field_non_plural(&mut self, names: impl Into<FieldNames>) -> Result<()> {
        self.map_field_types(names.into(), TypeRef::into_non_plural)
    }
}

pub(crate) trait TypedFieldsExt: TypedFieldsComposer {
    /// Rewrites the type of every listed field. Every field must exist, otherwise nothing changes.
    fn map_field_types(&mut self, names: FieldNames, map: impl Fn(TypeRef, &crate::Registry) -> TypeRef) -> Result<()> {
        if let Some(missing) = names.iter().find(|name| !self.has_field(name)) {
            return Err(ComposeError::field_not_found(self.type_name(), missing));
        }
        for name in names {
            let ty = self.get_field(&name)?.ty().clone();
            let ty = map(ty, &self.schema().registry);
            if let Some(field) = self.field_map_mut().get_mut(&name) {
                field.set_ty(ty);
            }
        }
        self.touch();
        Ok(())
    }
}

impl<T: TypedFieldsComposer + ?Sized> TypedFieldsExt for T {}

/// Argument management for object and interface fields.
pub trait ArgumentsComposer: TypedFieldsComposer + FieldsComposer<Field = crate::FieldConfig> {
    fn has_field_arg(&self, field: &str, arg: &str) -> bool {
        self.field_map()
            .get(field)
            .is_some_and(|field| field.args.contains_key(arg))
    }

    fn get_field_args(&self, field: &str) -> Result<&IndexMap<String, ArgumentConfig>> {
        Ok(&self.get_field(field)?.args)
    }

    fn get_field_arg_names(&self, field: &str) -> Result<Vec<&str>> {
        Ok(self.get_field_args(field)?.keys().map(String::as_str).collect())
    }

    fn get_field_arg(&self, field: &str, arg: &str) -> Result<&ArgumentConfig> {
        self.get_field_args(field)?
            .get(arg)
            .ok_or_else(|| ComposeError::ArgumentNotFound {
                ty: self.type_name().to_owned(),
                field: field.to_owned(),
                arg: arg.to_owned(),
            })
    }

    fn set_field_args<I, K, D>(&mut self, field: &str, args: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<ArgumentDefinition>,
    {
        let args = self.convert_field_args(field, args)?;
        self.field_mut(field)?.args = args;
        Ok(())
    }

    fn add_field_args<I, K, D>(&mut self, field: &str, args: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<ArgumentDefinition>,
    {
        let args = self.convert_field_args(field, args)?;
        self.field_mut(field)?.args.extend(args);
        Ok(())
    }

    #[doc(hidden)]
    fn convert_field_args<I, K, D>(&mut self, field: &str, args: I) -> Result<IndexMap<String, ArgumentConfig>>
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<ArgumentDefinition>,
    {
        self.get_field(field)?;
        let type_name = self.type_name().to_owned();
        let args = args.into_iter().map(|(name, arg)| (name.into(), arg.into())).collect();
        self.schema_mut().convert_args(&type_name, field, args)
    }

    /// Unknown argument names are ignored.
    fn remove_field_arg(&mut self, field: &str, args: impl Into<FieldNames>) -> Result<()> {
        let args: FieldNames = args.into();
        let field = self.field_mut(field)?;
        for arg in args {
            field.args.shift_remove(&arg);
        }
        Ok(())
    }

    fn remove_field_other_args(&mut self, field: &str, keep: impl Into<FieldNames>) -> Result<()> {
        let keep = keep.into();
        self.field_mut(field)?.args.retain(|name, _| keep.contains(name));
        Ok(())
    }

    fn reorder_field_args(&mut self, field: &str, order: impl Into<FieldNames>) -> Result<()> {
        let order: FieldNames = order.into();
        let args = &mut self.field_mut(field)?.args;
        let mut reordered = IndexMap::with_capacity(args.len());
        for name in order {
            if let Some((name, arg)) = args.shift_remove_entry(&name) {
                reordered.insert(name, arg);
            }
        }
        reordered.extend(args.drain(..));
        *args = reordered;
        Ok(())
    }

    /// The argument type with deferred references resolved and memoized.
    fn get_field_arg_type(&mut self, field: &str, arg: &str) -> Result<TypeRef> {
        let ty = self.get_field_arg(field, arg)?.ty.clone();
        if !ty.has_deferred() {
            return Ok(ty);
        }
        let realized = ty.realize(&self.schema().registry)?;
        if let Some(config) = self
            .field_map_mut()
            .get_mut(field)
            .and_then(|field| field.args.get_mut(arg))
        {
            config.ty = realized.clone();
        }
        Ok(realized)
    }

    fn get_field_arg_type_name(&self, field: &str, arg: &str) -> Result<String> {
        self.get_field_arg(field, arg)?.ty.type_name(&self.schema().registry)
    }

    fn is_field_arg_non_null(&self, field: &str, arg: &str) -> Result<bool> {
        Ok(self.get_field_arg(field, arg)?.ty.is_non_null(&self.schema().registry))
    }

    fn make_field_arg_non_null(&mut self, field: &str, args: impl Into<FieldNames>) -> Result<()> {
        self.map_arg_types(field, args.into(), TypeRef::into_non_null)
    }

    fn make_field_arg_nullable(&mut self, field: &str, args: impl Into<FieldNames>) -> Result<()> {
        self.map_arg_types(field, args.into(), TypeRef::into_nullable)
    }

    fn get_field_arg_extensions(&self, field: &str, arg: &str) -> Result<&Extensions> {
        Ok(&self.get_field_arg(field, arg)?.meta.extensions)
    }

    fn set_field_arg_extensions(&mut self, field: &str, arg: &str, extensions: Extensions) -> Result<()> {
        self.arg_mut(field, arg)?.meta.extensions = extensions;
        Ok(())
    }

    fn get_field_arg_extension(&self, field: &str, arg: &str, key: &str) -> Result<Option<&Value>> {
        Ok(self.get_field_arg_extensions(field, arg)?.get(key))
    }

    fn set_field_arg_extension(
        &mut self,
        field: &str,
        arg: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<()> {
        self.arg_mut(field, arg)?.meta.extensions.insert(key.into(), value.into());
        Ok(())
    }

    fn remove_field_arg_extension(&mut self, field: &str, arg: &str, key: &str) -> Result<Option<Value>> {
        Ok(self.arg_mut(field, arg)?.meta.extensions.shift_remove(key))
    }

    fn get_field_arg_directives(&self, field: &str, arg: &str) -> Result<&[Directive]> {
        Ok(&self.get_field_arg(field, arg)?.meta.directives)
    }

    fn set_field_arg_directives(&mut self, field: &str, arg: &str, directives: Vec<Directive>) -> Result<()> {
        self.arg_mut(field, arg)?.meta.directives = directives;
        Ok(())
    }

    fn add_field_arg_directive(&mut self, field: &str, arg: &str, directive: Directive) -> Result<()> {
        self.arg_mut(field, arg)?.meta.directives.push(directive);
        Ok(())
    }

    fn remove_field_arg_directive_by_name(&mut self, field: &str, arg: &str, directive: &str) -> Result<bool> {
        Ok(remove_directives_by_name(
            &mut self.arg_mut(field, arg)?.meta.directives,
            directive,
        ))
    }

    fn get_field_arg_directive_by_name(&self, field: &str, arg: &str, directive: &str) -> Result<Option<&Directive>> {
        Ok(directive_by_name(self.get_field_arg_directives(field, arg)?, directive))
    }
}

pub(crate) trait ArgumentsExt: ArgumentsComposer {
    fn arg_mut(&mut self, field: &str, arg: &str) -> Result<&mut ArgumentConfig> {
        let ty = self.type_name().to_owned();
        self.get_field_arg(field, arg)?;
        self.field_mut(field)?
            .args
            .get_mut(arg)
            .ok_or_else(|| ComposeError::ArgumentNotFound {
                ty,
                field: field.to_owned(),
                arg: arg.to_owned(),
            })
    }

    fn map_arg_types(
        &mut self,
        field: &str,
        args: FieldNames,
        map: impl Fn(TypeRef, &crate::Registry) -> TypeRef,
    ) -> Result<()> {
        for arg in args.iter() {
            self.get_field_arg(field, arg)?;
        }
        for arg in args {
            let ty = self.get_field_arg(field, &arg)?.ty.clone();
            let ty = map(ty, &self.schema().registry);
            self.arg_mut(field, &arg)?.ty = ty;
        }
        Ok(())
    }
}

impl<T: ArgumentsComposer + ?Sized> ArgumentsExt for T {}

/// Interface lists of objects and interfaces.
pub trait InterfacesComposer: TypeComposer {
    #[doc(hidden)]
    fn interface_list(&self) -> &Vec<TypeRef>;
    #[doc(hidden)]
    fn interface_list_mut(&mut self) -> &mut Vec<TypeRef>;

    fn get_interfaces(&self) -> &[TypeRef] {
        self.interface_list()
    }

    fn get_interface_names(&self) -> Result<Vec<String>> {
        let registry = &self.schema().registry;
        self.interface_list().iter().map(|ty| ty.type_name(registry)).collect()
    }

    fn has_interface(&self, name: &str) -> bool {
        let registry = &self.schema().registry;
        self.interface_list()
            .iter()
            .any(|ty| ty.type_name(registry).is_ok_and(|candidate| candidate == name))
    }

    fn add_interface(&mut self, interface: impl Into<TypeInput>) -> Result<()> {
        self.add_interfaces([interface])
    }

    /// Interfaces already implemented are skipped.
    fn add_interfaces(&mut self, interfaces: impl IntoIterator<Item = impl Into<TypeInput>>) -> Result<()> {
        let interfaces = self.convert_interfaces(interfaces)?;
        for interface in interfaces {
            let name = interface.type_name(&self.schema().registry)?;
            if !self.has_interface(&name) {
                self.interface_list_mut().push(interface);
            }
        }
        self.touch();
        Ok(())
    }

    fn set_interfaces(&mut self, interfaces: impl IntoIterator<Item = impl Into<TypeInput>>) -> Result<()> {
        let interfaces = self.convert_interfaces(interfaces)?;
        *self.interface_list_mut() = interfaces;
        self.touch();
        Ok(())
    }

    fn remove_interface(&mut self, name: &str) {
        let registry = &self.schema().registry;
        let kept: Vec<TypeRef> = self
            .interface_list()
            .iter()
            .filter(|ty| !ty.type_name(registry).is_ok_and(|candidate| candidate == name))
            .cloned()
            .collect();
        if kept.len() != self.interface_list().len() {
            *self.interface_list_mut() = kept;
            self.touch();
        }
    }

    #[doc(hidden)]
    fn convert_interfaces(&mut self, interfaces: impl IntoIterator<Item = impl Into<TypeInput>>) -> Result<Vec<TypeRef>> {
        let location = self.location();
        interfaces
            .into_iter()
            .map(|interface| {
                self.schema_mut()
                    .convert(interface.into(), TypePosition::Kind(TypeKind::Interface), &location)
            })
            .collect()
    }
}

/// Relations of objects and interfaces: fields synthesized from a resolver.
pub trait RelationsComposer: ArgumentsComposer {
    #[doc(hidden)]
    fn relation_map(&self) -> &IndexMap<String, RelationConfig>;
    #[doc(hidden)]
    fn relation_map_mut(&mut self) -> &mut IndexMap<String, RelationConfig>;

    /// Adds a field named `name` backed by a resolver. Replaces a field with the same name.
    fn add_relation(&mut self, name: &str, opts: RelationOpts) -> Result<()> {
        let type_name = self.type_name().to_owned();
        let (field, relation) = crate::relation::build_relation(self.schema_mut(), &type_name, name, opts)?;
        self.field_map_mut().insert(name.to_owned(), field);
        self.relation_map_mut().insert(name.to_owned(), relation);
        self.touch();
        Ok(())
    }

    fn get_relations(&self) -> &IndexMap<String, RelationConfig> {
        self.relation_map()
    }

    fn get_relation(&self, name: &str) -> Result<&RelationConfig> {
        self.relation_map()
            .get(name)
            .ok_or_else(|| ComposeError::RelationNotFound {
                ty: self.type_name().to_owned(),
                relation: name.to_owned(),
            })
    }

    fn has_relation(&self, name: &str) -> bool {
        self.relation_map().contains_key(name)
    }

    /// Removes the relation and its field.
    fn remove_relation(&mut self, name: &str) -> Result<()> {
        self.get_relation(name)?;
        self.relation_map_mut().shift_remove(name);
        self.field_map_mut().shift_remove(name);
        self.touch();
        Ok(())
    }
}

/// Type resolution of interfaces and unions.
pub trait AbstractTypeComposer: TypeComposer {
    #[doc(hidden)]
    fn type_resolvers(&self) -> &TypeResolvers;
    #[doc(hidden)]
    fn type_resolvers_mut(&mut self) -> &mut TypeResolvers;

    fn get_type_resolvers(&self) -> &IndexMap<ObjectTypeId, TypeResolverPredicate> {
        self.type_resolvers().table()
    }

    fn get_type_resolver_types(&self) -> Vec<ObjectTypeId> {
        self.type_resolvers().table().keys().copied().collect()
    }

    fn get_type_resolver_names(&self) -> Vec<&str> {
        let registry = &self.schema().registry;
        self.type_resolvers()
            .table()
            .keys()
            .map(|id| registry.name_of(*id))
            .collect()
    }

    fn has_type_resolver(&self, candidate: ObjectTypeId) -> bool {
        self.type_resolvers().table().contains_key(&candidate)
    }

    /// Replaces the whole table. Every candidate must be an object type, otherwise nothing changes.
    fn set_type_resolvers<I, C>(&mut self, resolvers: I) -> Result<()>
    where
        I: IntoIterator<Item = (C, TypeResolverPredicate)>,
        C: Into<TypeInput>,
    {
        let table = resolvers
            .into_iter()
            .map(|(candidate, predicate)| Ok((self.resolve_candidate(candidate.into())?, predicate)))
            .collect::<Result<IndexMap<_, _>>>()?;
        self.type_resolvers_mut().table = table;
        self.recompile_type_resolvers();
        Ok(())
    }

    fn add_type_resolver(&mut self, candidate: impl Into<TypeInput>, predicate: TypeResolverPredicate) -> Result<()> {
        let candidate = self.resolve_candidate(candidate.into())?;
        self.type_resolvers_mut().table.insert(candidate, predicate);
        self.recompile_type_resolvers();
        Ok(())
    }

    fn remove_type_resolver(&mut self, candidate: impl Into<TypeInput>) -> Result<()> {
        let candidate = self.resolve_candidate(candidate.into())?;
        if self.type_resolvers_mut().table.shift_remove(&candidate).is_some() {
            self.recompile_type_resolvers();
        }
        Ok(())
    }

    fn clear_type_resolvers(&mut self) {
        self.type_resolvers_mut().table.clear();
        self.recompile_type_resolvers();
    }

    /// Type returned when no predicate matches.
    fn set_type_resolver_fallback(&mut self, fallback: impl Into<TypeInput>) -> Result<()> {
        let fallback = self.resolve_candidate(fallback.into())?;
        self.type_resolvers_mut().fallback = Some(fallback);
        self.recompile_type_resolvers();
        Ok(())
    }

    fn clear_type_resolver_fallback(&mut self) {
        self.type_resolvers_mut().fallback = None;
        self.recompile_type_resolvers();
    }

    fn get_type_resolver_fallback(&self) -> Option<ObjectTypeId> {
        self.type_resolvers().fallback()
    }

    /// Installs a hand-written `resolveType`, used instead of the table.
    fn set_resolve_type(&mut self, resolve_type: Option<TypeResolveFn>) {
        self.type_resolvers_mut().custom = resolve_type;
        self.touch();
    }

    fn get_resolve_type(&self) -> Option<TypeResolveFn> {
        self.type_resolvers().resolve_type()
    }
}

pub(crate) trait AbstractTypeExt: AbstractTypeComposer {
    fn resolve_candidate(&mut self, candidate: TypeInput) -> Result<ObjectTypeId> {
        let location = self.location();
        let ty = self.schema_mut().convert(candidate, TypePosition::Any, &location)?;
        let registry = &self.schema().registry;
        let id = ty.unwrap_named(registry)?;
        id.as_object().ok_or_else(|| ComposeError::InvalidTypeResolver {
            location,
            name: registry.name_of(id).to_owned(),
            actual: id.kind(),
        })
    }

    fn recompile_type_resolvers(&mut self) {
        let name = self.type_name().to_owned();
        self.type_resolvers_mut().compile(&name);
        self.touch();
    }
}

impl<T: AbstractTypeComposer + ?Sized> AbstractTypeExt for T {}

/// Builds an object or interface field from its definition.
pub(crate) fn convert_output_field(
    sc: &mut SchemaComposer,
    type_name: &str,
    name: &str,
    definition: crate::FieldDefinition,
) -> Result<crate::FieldConfig> {
    let location = SchemaLocation::field(type_name, name);
    let crate::FieldDefinition { ty, args, resolve, meta } = definition;
    let ty = ty.ok_or_else(|| ComposeError::MissingType {
        location: location.clone(),
    })?;
    let ty = sc.convert(ty, TypePosition::Output, &location)?;
    let args = sc.convert_args(type_name, name, args)?;
    Ok(crate::FieldConfig { ty, args, resolve, meta })
}

/// Applies a patch to an object or interface field.
pub(crate) fn patch_output_field(
    sc: &mut SchemaComposer,
    type_name: &str,
    name: &str,
    mut field: crate::FieldConfig,
    patch: FieldPatch,
) -> Result<crate::FieldConfig> {
    let FieldPatch {
        ty, args, resolve, meta, ..
    } = patch;
    if let Some(ty) = ty {
        field.ty = sc.convert(ty, TypePosition::Output, &SchemaLocation::field(type_name, name))?;
    }
    if let Some(args) = args {
        field.args = sc.convert_args(type_name, name, args)?;
    }
    if resolve.is_some() {
        field.resolve = resolve;
    }
    field.meta.merge(meta);
    Ok(field)
}
