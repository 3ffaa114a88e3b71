//! Turns anything accepted as a type (names with modifiers, SDL snippets, external output types,
//! one-element arrays, references) into a [TypeRef] of the session registry.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::{
    registry::{EnumRecord, InputRecord, InterfaceRecord, ObjectRecord, ScalarRecord, UnionRecord},
    scalars, ArgumentConfig, ArgumentDefinition, ComposeError, Deferred, EnumTypeId, ExternalKey, InputTypeId,
    InputValueConfig, InputValueDefinition, InterfaceTypeId, NamedTypeId, ObjectTypeId, OutputType, Polarity,
    RegistryKey, Result, ScalarTypeId, SchemaComposer, SchemaLocation, TypeKind, TypeRef, UnionTypeId, Wrapping,
};

/// Every form a type can be given in.
#[derive(Debug, Clone)]
pub enum TypeInput {
    /// A type name with optional modifiers (`[Post!]!`) or an SDL snippet (`type Post { id: ID }`).
    Name(String),
    /// An output type built elsewhere, imported on first use.
    External(Arc<OutputType>),
    Ref(TypeRef),
    /// `[T]` shorthand for a list of `T`. Must hold exactly one element.
    Array(Vec<TypeInput>),
}

impl From<&str> for TypeInput {
    fn from(name: &str) -> Self {
        TypeInput::Name(name.to_owned())
    }
}

impl From<String> for TypeInput {
    fn from(name: String) -> Self {
        TypeInput::Name(name)
    }
}

impl From<Arc<OutputType>> for TypeInput {
    fn from(ty: Arc<OutputType>) -> Self {
        TypeInput::External(ty)
    }
}

impl From<OutputType> for TypeInput {
    fn from(ty: OutputType) -> Self {
        TypeInput::External(Arc::new(ty))
    }
}

impl From<TypeRef> for TypeInput {
    fn from(ty: TypeRef) -> Self {
        TypeInput::Ref(ty)
    }
}

impl From<Deferred> for TypeInput {
    fn from(deferred: Deferred) -> Self {
        TypeInput::Ref(TypeRef::Deferred(deferred))
    }
}

impl<T: Into<TypeInput>, const N: usize> From<[T; N]> for TypeInput {
    fn from(items: [T; N]) -> Self {
        TypeInput::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<TypeInput>> From<Vec<T>> for TypeInput {
    fn from(items: Vec<T>) -> Self {
        TypeInput::Array(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! type_input_from_ids {
    ($($id:ty),*) => {
        $(
            impl From<$id> for TypeInput {
                fn from(id: $id) -> Self {
                    TypeInput::Ref(TypeRef::Named(id.into()))
                }
            }
        )*
    };
}

type_input_from_ids!(NamedTypeId, ObjectTypeId, InputTypeId, InterfaceTypeId, UnionTypeId, EnumTypeId, ScalarTypeId);

/// Where a converted type is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePosition {
    /// Field types: objects, interfaces, unions, enums and scalars.
    Output,
    /// Argument and input field types: input objects, enums and scalars.
    Input,
    Kind(TypeKind),
    Any,
}

/// Whether `name` is a GraphQL name: `[_A-Za-z][_0-9A-Za-z]*`.
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Whether `text` starts like a type definition, ignoring a leading description.
pub(crate) fn looks_like_type_definition(text: &str) -> bool {
    let mut rest = text.trim_start();
    if let Some(after) = rest.strip_prefix("\"\"\"") {
        rest = after.split_once("\"\"\"").map_or("", |(_, rest)| rest);
    } else if let Some(after) = rest.strip_prefix('"') {
        rest = after.split_once('"').map_or("", |(_, rest)| rest);
    }
    rest.trim_start()
        .split_once(char::is_whitespace)
        .is_some_and(|(keyword, _)| {
            matches!(keyword, "type" | "input" | "interface" | "union" | "enum" | "scalar")
        })
}

/// Whether a type of `kind` may be used at `position`.
pub(crate) fn check_kind_at(
    name: &str,
    kind: TypeKind,
    position: TypePosition,
    location: &SchemaLocation,
) -> Result<()> {
    let wrong_polarity = |expected| ComposeError::WrongPolarity {
        location: location.clone(),
        name: name.to_owned(),
        expected,
        actual: kind,
    };
    match position {
        TypePosition::Output if !kind.is_output() => Err(wrong_polarity(Polarity::Output)),
        TypePosition::Input if !kind.is_input() => Err(wrong_polarity(Polarity::Input)),
        TypePosition::Kind(expected) if kind != expected => Err(ComposeError::kind_mismatch(name, expected, kind)),
        _ => Ok(()),
    }
}

impl SchemaComposer {
    /// Converts a type input for use at `position`. `location` is only used for error reporting.
    pub(crate) fn convert(
        &mut self,
        input: TypeInput,
        position: TypePosition,
        location: &SchemaLocation,
    ) -> Result<TypeRef> {
        match input {
            TypeInput::Array(items) => {
                let len = items.len();
                let Ok([item]) = <[TypeInput; 1]>::try_from(items) else {
                    return Err(ComposeError::ArrayShorthand {
                        location: location.clone(),
                        len,
                    });
                };
                Ok(TypeRef::list(self.convert(item, position, location)?))
            }
            TypeInput::Ref(ty) => {
                if let Some(id) = ty.named() {
                    self.registry.check(id)?;
                    self.check_position(id, position, location)?;
                }
                Ok(ty)
            }
            TypeInput::External(ty) => {
                check_kind_at(ty.name(), ty.kind(), position, location)?;
                let id = self.import_external(ty)?;
                Ok(TypeRef::Named(id))
            }
            TypeInput::Name(text) => self.convert_text(&text, position, location),
        }
    }

    fn convert_text(&mut self, text: &str, position: TypePosition, location: &SchemaLocation) -> Result<TypeRef> {
        let text = text.trim();
        if looks_like_type_definition(text) {
            let id = self.type_from_literal(text, position, location)?;
            return Ok(TypeRef::Named(id));
        }

        let Some((name, wrapping)) = Wrapping::parse(text).filter(|(name, _)| is_valid_name(name)) else {
            return Err(ComposeError::UnknownTypeInput {
                location: location.clone(),
                value: text.to_owned(),
            });
        };

        let named = match self.lookup_named(name) {
            Some(id) => {
                self.check_position(id, position, location)?;
                TypeRef::Named(id)
            }
            None if self.config.forward_references => {
                tracing::debug!(%location, name, "forward reference to unknown type");
                TypeRef::Deferred(Deferred::forward(name))
            }
            None => {
                return Err(ComposeError::TypeNotFound { key: name.to_owned() });
            }
        };
        Ok(named.wrapped(&wrapping))
    }

    /// A registered type, or a built-in scalar.
    pub(crate) fn lookup_named(&mut self, name: &str) -> Option<NamedTypeId> {
        if self.config.builtin_scalars {
            if let Some(id) = scalars::builtin_scalar(&mut self.registry, name) {
                return Some(id);
            }
        }
        self.registry.lookup(name)
    }

    fn type_from_literal(
        &mut self,
        sdl: &str,
        position: TypePosition,
        location: &SchemaLocation,
    ) -> Result<NamedTypeId> {
        let key = RegistryKey::Literal(sdl.to_owned());
        if let Some(id) = self.registry.lookup(key.clone()) {
            self.check_position(id, position, location)?;
            return Ok(id);
        }
        let id = self.type_from_sdl(sdl, position, location)?;
        if self.config.register_sdl_literals {
            self.registry.set(key, id);
        }
        Ok(id)
    }

    pub(crate) fn check_position(
        &self,
        id: NamedTypeId,
        position: TypePosition,
        location: &SchemaLocation,
    ) -> Result<()> {
        check_kind_at(self.registry.name_of(id), id.kind(), position, location)
    }

    /// The session type standing for an external output type.
    ///
    /// The same allocation always maps to the same type. Otherwise a type registered under the same
    /// name and kind is reused, and only then is a new type created from the definition.
    pub(crate) fn import_external(&mut self, ty: Arc<OutputType>) -> Result<NamedTypeId> {
        if let Some(id) = self.registry.lookup(ExternalKey::of(&ty)) {
            return Ok(id);
        }

        let name = ty.name().to_owned();
        if let Some(existing) = self.registry.lookup(name.as_str()) {
            if existing.kind() != ty.kind() {
                return Err(ComposeError::kind_mismatch(&name, ty.kind(), existing.kind()));
            }
            let key = self.registry.pin(ty);
            self.registry.set(key, existing);
            return Ok(existing);
        }

        let id = self.create_kind(&name, ty.kind())?;
        let key = self.registry.pin(ty.clone());
        self.registry.set(key, id);
        tracing::debug!(name, kind = %ty.kind(), "importing external type");
        crate::merge::import_output(self, id, &ty)?;
        Ok(id)
    }

    pub(crate) fn convert_input_value(
        &mut self,
        location: SchemaLocation,
        definition: InputValueDefinition,
    ) -> Result<InputValueConfig> {
        let InputValueDefinition {
            ty,
            default_value,
            meta,
        } = definition;
        let ty = ty.ok_or_else(|| ComposeError::MissingType {
            location: location.clone(),
        })?;
        Ok(InputValueConfig {
            ty: self.convert(ty, TypePosition::Input, &location)?,
            default_value,
            meta,
        })
    }

    pub(crate) fn convert_args(
        &mut self,
        type_name: &str,
        field: &str,
        args: IndexMap<String, ArgumentDefinition>,
    ) -> Result<IndexMap<String, ArgumentConfig>> {
        args.into_iter()
            .map(|(name, definition)| {
                let location = SchemaLocation::argument(type_name, field, &name);
                Ok((name, self.convert_input_value(location, definition)?))
            })
            .collect()
    }

    pub(crate) fn create_kind(&mut self, name: &str, kind: TypeKind) -> Result<NamedTypeId> {
        Ok(match kind {
            TypeKind::Object => self.create::<ObjectRecord>(name)?.into(),
            TypeKind::Input => self.create::<InputRecord>(name)?.into(),
            TypeKind::Interface => self.create::<InterfaceRecord>(name)?.into(),
            TypeKind::Union => self.create::<UnionRecord>(name)?.into(),
            TypeKind::Enum => self.create::<EnumRecord>(name)?.into(),
            TypeKind::Scalar => self.create::<ScalarRecord>(name)?.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_definitions_are_told_apart_from_names() {
        assert!(looks_like_type_definition("type User { id: ID }"));
        assert!(looks_like_type_definition("\"\"\"A user\"\"\" type User { id: ID }"));
        assert!(looks_like_type_definition("\"Sort order\"\nenum Sort { ASC DESC }"));
        assert!(looks_like_type_definition("scalar Date"));
        assert!(!looks_like_type_definition("[User!]!"));
        assert!(!looks_like_type_definition("typeUser"));
        assert!(!looks_like_type_definition("type"));
    }

    #[test]
    fn names() {
        assert!(is_valid_name("_Private1"));
        assert!(!is_valid_name("1User"));
        assert!(!is_valid_name("User-Name"));
        assert!(!is_valid_name(""));
    }
}
