//! Field, argument and enum value descriptors.
//!
//! `*Config` structs are what the composers store, with types already converted to [TypeRef].
//! `*Definition` structs are what callers hand in, with types in any form [TypeInput] accepts.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    Deferred, Directive, EnumTypeId, FieldResolveFn, InputTypeId, InterfaceTypeId, Metadata, NamedTypeId, ObjectTypeId,
    OutputType, ScalarTypeId, TypeInput, TypeRef, UnionTypeId,
};

#[derive(Debug, Clone)]
pub struct FieldConfig {
    pub ty: TypeRef,
    pub args: IndexMap<String, ArgumentConfig>,
    pub resolve: Option<FieldResolveFn>,
    pub meta: Metadata,
}

impl FieldConfig {
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        FieldConfig {
            ty: ty.into(),
            args: IndexMap::new(),
            resolve: None,
            meta: Metadata::default(),
        }
    }
}

/// An argument or an input object field.
#[derive(Debug, Clone)]
pub struct InputValueConfig {
    pub ty: TypeRef,
    pub default_value: Option<Value>,
    pub meta: Metadata,
}

pub type ArgumentConfig = InputValueConfig;
pub type InputFieldConfig = InputValueConfig;

impl InputValueConfig {
    pub fn new(ty: impl Into<TypeRef>) -> Self {
        InputValueConfig {
            ty: ty.into(),
            default_value: None,
            meta: Metadata::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueConfig {
    /// The internal value the enum value maps to.
    pub value: Value,
    pub meta: Metadata,
}

/// Anything carrying [Metadata]: fields, arguments, input fields and enum values.
pub trait FieldLike {
    fn meta(&self) -> &Metadata;
    fn meta_mut(&mut self) -> &mut Metadata;

    fn type_ref(&self) -> Option<&TypeRef> {
        None
    }
}

/// Fields and arguments, which have a type.
pub trait TypedField: FieldLike {
    fn ty(&self) -> &TypeRef;
    fn set_ty(&mut self, ty: TypeRef);
}

impl FieldLike for FieldConfig {
    fn meta(&self) -> &Metadata {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }

    fn type_ref(&self) -> Option<&TypeRef> {
        Some(&self.ty)
    }
}

impl TypedField for FieldConfig {
    fn ty(&self) -> &TypeRef {
        &self.ty
    }

    fn set_ty(&mut self, ty: TypeRef) {
        self.ty = ty;
    }
}

impl FieldLike for InputValueConfig {
    fn meta(&self) -> &Metadata {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }

    fn type_ref(&self) -> Option<&TypeRef> {
        Some(&self.ty)
    }
}

impl TypedField for InputValueConfig {
    fn ty(&self) -> &TypeRef {
        &self.ty
    }

    fn set_ty(&mut self, ty: TypeRef) {
        self.ty = ty;
    }
}

impl FieldLike for EnumValueConfig {
    fn meta(&self) -> &Metadata {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldDefinition {
    pub ty: Option<TypeInput>,
    pub args: IndexMap<String, ArgumentDefinition>,
    pub resolve: Option<FieldResolveFn>,
    pub meta: Metadata,
}

impl FieldDefinition {
    pub fn new(ty: impl Into<TypeInput>) -> Self {
        FieldDefinition {
            ty: Some(ty.into()),
            ..Default::default()
        }
    }

    pub fn arg(mut self, name: impl Into<String>, arg: impl Into<ArgumentDefinition>) -> Self {
        self.args.insert(name.into(), arg.into());
        self
    }

    pub fn resolve(mut self, resolve: FieldResolveFn) -> Self {
        self.resolve = Some(resolve);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputValueDefinition {
    pub ty: Option<TypeInput>,
    pub default_value: Option<Value>,
    pub meta: Metadata,
}

pub type ArgumentDefinition = InputValueDefinition;
pub type InputFieldDefinition = InputValueDefinition;

impl InputValueDefinition {
    pub fn new(ty: impl Into<TypeInput>) -> Self {
        InputValueDefinition {
            ty: Some(ty.into()),
            ..Default::default()
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// An enum value. Without an explicit value, the value name is used.
#[derive(Debug, Clone, Default)]
pub struct EnumValueDefinition {
    pub value: Option<Value>,
    pub meta: Metadata,
}

impl EnumValueDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl From<Value> for EnumValueDefinition {
    fn from(value: Value) -> Self {
        EnumValueDefinition {
            value: Some(value),
            meta: Metadata::default(),
        }
    }
}

/// Partial update applied by `extend_field`.
///
/// Properties that are set replace the field's, extensions are merged and directives appended.
/// Properties that make no sense for the extended field (a `value` on an object field) are ignored.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    pub ty: Option<TypeInput>,
    pub args: Option<IndexMap<String, ArgumentDefinition>>,
    pub resolve: Option<FieldResolveFn>,
    pub default_value: Option<Value>,
    pub value: Option<Value>,
    pub meta: Metadata,
}

impl FieldPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ty(mut self, ty: impl Into<TypeInput>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = (String, ArgumentDefinition)>) -> Self {
        self.args = Some(args.into_iter().collect());
        self
    }

    pub fn resolve(mut self, resolve: FieldResolveFn) -> Self {
        self.resolve = Some(resolve);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

macro_rules! metadata_builders {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub fn description(mut self, description: impl Into<String>) -> Self {
                    self.meta.description = Some(description.into());
                    self
                }

                pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
                    self.meta.deprecation_reason = Some(reason.into());
                    self
                }

                pub fn extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
                    self.meta.extensions.insert(key.into(), value.into());
                    self
                }

                pub fn directive(mut self, directive: Directive) -> Self {
                    self.meta.directives.push(directive);
                    self
                }
            }
        )*
    };
}

metadata_builders!(FieldDefinition, InputValueDefinition, EnumValueDefinition, FieldPatch);

macro_rules! from_type_input {
    (@one $definition:ident: $($source:ty),*) => {
        $(
            impl From<$source> for $definition {
                fn from(ty: $source) -> Self {
                    $definition::new(ty)
                }
            }
        )*
    };
    ($($definition:ident),*) => {
        $(
            from_type_input!(@one $definition: &str, String, TypeRef, TypeInput, Deferred, Arc<OutputType>, NamedTypeId,
                ObjectTypeId, InputTypeId, InterfaceTypeId, UnionTypeId, EnumTypeId, ScalarTypeId);

            impl<T: Into<TypeInput>, const N: usize> From<[T; N]> for $definition {
                fn from(ty: [T; N]) -> Self {
                    $definition::new(ty)
                }
            }

            impl<T: Into<TypeInput>> From<Vec<T>> for $definition {
                fn from(ty: Vec<T>) -> Self {
                    $definition::new(ty)
                }
            }
        )*
    };
}

from_type_input!(FieldDefinition, InputValueDefinition);
