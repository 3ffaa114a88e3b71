//! The materialized, read-only schema types produced by finalization.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    Directive, Extensions, FieldResolveFn, IsTypeOfFn, NamedTypeId, ScalarFn, TypeKind, TypeResolveFn, Wrapping,
};

/// A reference from one materialized type to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTypeRef {
    pub id: NamedTypeId,
    pub name: String,
    pub wrapping: Wrapping,
}

impl OutputTypeRef {
    pub fn is_required(&self) -> bool {
        self.wrapping.is_required()
    }

    pub fn is_list(&self) -> bool {
        self.wrapping.is_list()
    }
}

impl fmt::Display for OutputTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.wrapping.type_display(&self.name).fmt(f)
    }
}

#[derive(Debug, Clone)]
pub enum OutputType {
    Object(ObjectType),
    Input(InputObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    Scalar(ScalarType),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, OutputField>,
    pub interfaces: Vec<OutputTypeRef>,
    pub is_type_of: Option<IsTypeOfFn>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, OutputField>,
    pub interfaces: Vec<OutputTypeRef>,
    pub resolve_type: Option<TypeResolveFn>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub types: Vec<OutputTypeRef>,
    pub resolve_type: Option<TypeResolveFn>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputValue>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: IndexMap<String, EnumValue>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub specified_by_url: Option<String>,
    pub serialize: Option<ScalarFn>,
    pub parse_value: Option<ScalarFn>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone)]
pub struct OutputField {
    pub name: String,
    pub description: Option<String>,
    pub ty: OutputTypeRef,
    pub args: IndexMap<String, InputValue>,
    pub resolve: Option<FieldResolveFn>,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

/// An argument or an input object field.
#[derive(Debug, Clone)]
pub struct InputValue {
    pub name: String,
    pub description: Option<String>,
    pub ty: OutputTypeRef,
    pub default_value: Option<Value>,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub value: Value,
    pub deprecation_reason: Option<String>,
    pub directives: Vec<Directive>,
    pub extensions: Extensions,
}

impl OutputType {
    /// A definition without members, the state of a type before its first finalization.
    pub(crate) fn empty(kind: TypeKind, name: &str) -> Self {
        let name = name.to_owned();
        match kind {
            TypeKind::Object => OutputType::Object(ObjectType {
                name,
                ..Default::default()
            }),
            TypeKind::Input => OutputType::Input(InputObjectType {
                name,
                ..Default::default()
            }),
            TypeKind::Interface => OutputType::Interface(InterfaceType {
                name,
                ..Default::default()
            }),
            TypeKind::Union => OutputType::Union(UnionType {
                name,
                ..Default::default()
            }),
            TypeKind::Enum => OutputType::Enum(EnumType {
                name,
                ..Default::default()
            }),
            TypeKind::Scalar => OutputType::Scalar(ScalarType {
                name,
                ..Default::default()
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            OutputType::Object(ty) => &ty.name,
            OutputType::Input(ty) => &ty.name,
            OutputType::Interface(ty) => &ty.name,
            OutputType::Union(ty) => &ty.name,
            OutputType::Enum(ty) => &ty.name,
            OutputType::Scalar(ty) => &ty.name,
        }
    }

    /// Visits every reference to a type: field, argument and input field types, interfaces and
    /// union members.
    pub(crate) fn for_each_type_ref_mut(&mut self, mut visit: impl FnMut(&mut OutputTypeRef)) {
        fn fields(fields: &mut IndexMap<String, OutputField>, visit: &mut impl FnMut(&mut OutputTypeRef)) {
            for field in fields.values_mut() {
                visit(&mut field.ty);
                for arg in field.args.values_mut() {
                    visit(&mut arg.ty);
                }
            }
        }

        match self {
            OutputType::Object(ty) => {
                fields(&mut ty.fields, &mut visit);
                ty.interfaces.iter_mut().for_each(visit);
            }
            OutputType::Interface(ty) => {
                fields(&mut ty.fields, &mut visit);
                ty.interfaces.iter_mut().for_each(visit);
            }
            OutputType::Input(ty) => ty.fields.values_mut().for_each(|field| visit(&mut field.ty)),
            OutputType::Union(ty) => ty.types.iter_mut().for_each(visit),
            OutputType::Enum(_) | OutputType::Scalar(_) => {}
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            OutputType::Object(ty) => ty.description.as_deref(),
            OutputType::Input(ty) => ty.description.as_deref(),
            OutputType::Interface(ty) => ty.description.as_deref(),
            OutputType::Union(ty) => ty.description.as_deref(),
            OutputType::Enum(ty) => ty.description.as_deref(),
            OutputType::Scalar(ty) => ty.description.as_deref(),
        }
    }

    pub fn directives(&self) -> &[Directive] {
        match self {
            OutputType::Object(ty) => &ty.directives,
            OutputType::Input(ty) => &ty.directives,
            OutputType::Interface(ty) => &ty.directives,
            OutputType::Union(ty) => &ty.directives,
            OutputType::Enum(ty) => &ty.directives,
            OutputType::Scalar(ty) => &ty.directives,
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            OutputType::Object(_) => TypeKind::Object,
            OutputType::Input(_) => TypeKind::Input,
            OutputType::Interface(_) => TypeKind::Interface,
            OutputType::Union(_) => TypeKind::Union,
            OutputType::Enum(_) => TypeKind::Enum,
            OutputType::Scalar(_) => TypeKind::Scalar,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            OutputType::Object(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_input(&self) -> Option<&InputObjectType> {
        match self {
            OutputType::Input(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceType> {
        match self {
            OutputType::Interface(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            OutputType::Union(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            OutputType::Enum(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarType> {
        match self {
            OutputType::Scalar(ty) => Some(ty),
            _ => None,
        }
    }

    /// Output fields of objects and interfaces.
    pub fn output_fields(&self) -> Option<&IndexMap<String, OutputField>> {
        match self {
            OutputType::Object(ty) => Some(&ty.fields),
            OutputType::Interface(ty) => Some(&ty.fields),
            _ => None,
        }
    }
}
