//! Types from SDL: single-definition snippets and whole documents.

use cynic_parser::type_system as ast;
use itertools::Itertools;
use serde_json::Value;

use crate::{
    convert::check_kind_at, ComposeError, Directive, EnumValueDefinition, FieldDefinition, FieldsComposer, InputValueDefinition,
    InterfacesComposer, Metadata, NamedTypeId, Result, SchemaComposer, SchemaLocation, TypeInput, TypeKind, TypePosition, Wrapping,
    WrappingType,
};

/// Reason given to `@deprecated` without arguments.
pub const DEFAULT_SDL_DEPRECATION_REASON: &str = "No longer supported";

impl SchemaComposer {
    /// Creates the type defined by an SDL snippet holding exactly one type definition.
    ///
    /// When a type of the same name and kind already exists it is returned unchanged.
    pub fn create_from_sdl(&mut self, sdl: &str) -> Result<NamedTypeId> {
        self.type_from_sdl(sdl, TypePosition::Any, &SchemaLocation::definition("<sdl>"))
    }

    /// Nothing is registered when the definition cannot be used at `position`.
    pub(crate) fn type_from_sdl(
        &mut self,
        sdl: &str,
        position: TypePosition,
        location: &SchemaLocation,
    ) -> Result<NamedTypeId> {
        let document = parse(sdl, location)?;
        let mut definitions = type_definitions(&document);
        let (Some(definition), None) = (definitions.next(), definitions.next()) else {
            return Err(ComposeError::InvalidSdl {
                location: location.clone(),
                message: "expected exactly one type definition".to_owned(),
            });
        };

        check_kind_at(definition.name(), definition_kind(definition), position, location)?;
        if let Some(existing) = self.registry.lookup(definition.name()) {
            if existing.kind() == definition_kind(definition) {
                return Ok(existing);
            }
        }
        let id = self.create_kind(definition.name(), definition_kind(definition))?;
        self.populate(id, definition)?;
        Ok(id)
    }

    /// Adds every type definition and type extension of an SDL document.
    ///
    /// Types are declared before any of them is populated, so definitions may reference each other
    /// in any order. Members of types that already exist are added to theirs.
    #[tracing::instrument(skip_all)]
    pub fn add_type_defs(&mut self, sdl: &str) -> Result<Vec<NamedTypeId>> {
        let location = SchemaLocation::definition("<sdl>");
        let document = parse(sdl, &location)?;

        let ids = type_definitions(&document)
            .map(|definition| self.create_kind(definition.name(), definition_kind(definition)))
            .collect::<Result<Vec<_>>>()?;
        for (id, definition) in ids.iter().zip(type_definitions(&document)) {
            self.populate(*id, definition)?;
        }

        tracing::debug!(
            types = %type_definitions(&document).map(|definition| definition.name()).join(", "),
            "added type definitions"
        );
        Ok(ids)
    }

    fn populate(&mut self, id: NamedTypeId, definition: ast::TypeDefinition<'_>) -> Result<()> {
        let meta = metadata(
            definition.description().map(|description| description.to_cow().into_owned()),
            definition.directives(),
        );

        match (id, definition) {
            (NamedTypeId::Object(id), ast::TypeDefinition::Object(object)) => {
                let fields = object.fields().map(field_definition).collect::<Vec<_>>();
                let mut composer = self.object(id)?;
                composer.add_fields(fields)?;
                composer.add_interfaces(object.implements_interfaces().map(str::to_owned))?;
            }
            (NamedTypeId::Interface(id), ast::TypeDefinition::Interface(interface)) => {
                let fields = interface.fields().map(field_definition).collect::<Vec<_>>();
                let mut composer = self.interface(id)?;
                composer.add_fields(fields)?;
                composer.add_interfaces(interface.implements_interfaces().map(str::to_owned))?;
            }
            (NamedTypeId::Input(id), ast::TypeDefinition::InputObject(input)) => {
                let fields = input.fields().map(input_value_definition).collect::<Vec<_>>();
                self.input(id)?.add_fields(fields)?;
            }
            (NamedTypeId::Enum(id), ast::TypeDefinition::Enum(enm)) => {
                let values = enm
                    .values()
                    .map(|value| {
                        let meta = metadata(
                            value.description().map(|description| description.to_cow().into_owned()),
                            value.directives(),
                        );
                        (value.value().to_owned(), EnumValueDefinition { value: None, meta })
                    })
                    .collect::<Vec<_>>();
                self.enum_type(id)?.add_fields(values)?;
            }
            (NamedTypeId::Union(id), ast::TypeDefinition::Union(union)) => {
                let members = union
                    .members()
                    .map(|member| member.name().to_owned())
                    .collect::<Vec<_>>();
                self.union(id)?.add_types(members)?;
            }
            (NamedTypeId::Scalar(id), ast::TypeDefinition::Scalar(_)) => {
                let url = meta
                    .directives
                    .iter()
                    .find(|directive| directive.name == "specifiedBy")
                    .and_then(|directive| directive.args.get("url"))
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                if url.is_some() {
                    self.registry.records[id].kind.specified_by_url = url;
                }
            }
            (id, definition) => {
                return Err(ComposeError::kind_mismatch(
                    definition.name(),
                    id.kind(),
                    definition_kind(definition),
                ));
            }
        }

        let common = self.registry.common_mut(id);
        if meta.description.is_some() {
            common.description = meta.description;
        }
        common.directives.extend(
            meta.directives
                .into_iter()
                .filter(|directive| directive.name != "specifiedBy"),
        );
        common.modified = true;
        Ok(())
    }
}

fn parse(sdl: &str, location: &SchemaLocation) -> Result<ast::TypeSystemDocument> {
    cynic_parser::parse_type_system_document(sdl).map_err(|err| ComposeError::InvalidSdl {
        location: location.clone(),
        message: err.to_string(),
    })
}

fn type_definitions(document: &ast::TypeSystemDocument) -> impl Iterator<Item = ast::TypeDefinition<'_>> {
    document.definitions().filter_map(|definition| match definition {
        ast::Definition::Type(definition) | ast::Definition::TypeExtension(definition) => Some(definition),
        _ => None,
    })
}

fn definition_kind(definition: ast::TypeDefinition<'_>) -> TypeKind {
    match definition {
        ast::TypeDefinition::Object(_) => TypeKind::Object,
        ast::TypeDefinition::Interface(_) => TypeKind::Interface,
        ast::TypeDefinition::Union(_) => TypeKind::Union,
        ast::TypeDefinition::InputObject(_) => TypeKind::Input,
        ast::TypeDefinition::Enum(_) => TypeKind::Enum,
        ast::TypeDefinition::Scalar(_) => TypeKind::Scalar,
    }
}

fn field_definition(field: ast::FieldDefinition<'_>) -> (String, FieldDefinition) {
    let definition = FieldDefinition {
        ty: Some(type_input(field.ty())),
        args: field.arguments().map(input_value_definition).collect(),
        resolve: None,
        meta: metadata(
            field.description().map(|description| description.to_cow().into_owned()),
            field.directives(),
        ),
    };
    (field.name().to_owned(), definition)
}

fn input_value_definition(value: ast::InputValueDefinition<'_>) -> (String, InputValueDefinition) {
    let definition = InputValueDefinition {
        ty: Some(type_input(value.ty())),
        default_value: value.default_value().map(const_value_to_json),
        meta: metadata(
            value.description().map(|description| description.to_cow().into_owned()),
            value.directives(),
        ),
    };
    (value.name().to_owned(), definition)
}

fn type_input(ty: ast::Type<'_>) -> TypeInput {
    use cynic_parser::common::WrappingType as AstWrapping;

    let wrapping = Wrapping::from_outermost(ty.wrappers().map(|wrapper| match wrapper {
        AstWrapping::NonNull => WrappingType::NonNull,
        AstWrapping::List => WrappingType::List,
    }));
    let name = wrapping.type_display(ty.name()).to_string();
    TypeInput::Name(name)
}

/// `@deprecated` becomes the deprecation reason, other directives are kept.
fn metadata<'a>(description: Option<String>, directives: impl Iterator<Item = ast::Directive<'a>>) -> Metadata {
    let mut meta = Metadata {
        description,
        ..Default::default()
    };
    for directive in directives.map(convert_directive) {
        if directive.name == "deprecated" {
            let reason = directive
                .args
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_SDL_DEPRECATION_REASON);
            meta.deprecation_reason = Some(reason.to_owned());
        } else {
            meta.directives.push(directive);
        }
    }
    meta
}

fn convert_directive(directive: ast::Directive<'_>) -> Directive {
    Directive {
        name: directive.name().to_owned(),
        args: directive
            .arguments()
            .map(|argument| (argument.name().to_owned(), const_value_to_json(argument.value())))
            .collect(),
    }
}

/// Enum values become strings, non-finite floats and variables become null.
pub(crate) fn const_value_to_json(value: ast::Value<'_>) -> Value {
    match value {
        ast::Value::Null | ast::Value::Variable(_) => Value::Null,
        ast::Value::Int(n) => Value::from(n.as_i64()),
        ast::Value::Float(n) => serde_json::Number::from_f64(f64::from(n)).map_or(Value::Null, Value::Number),
        ast::Value::String(s) | ast::Value::BlockString(s) => Value::String(s.to_owned()),
        ast::Value::Boolean(b) => Value::Bool(b),
        ast::Value::Enum(name) => Value::String(name.to_owned()),
        ast::Value::List(items) => Value::Array(items.into_iter().map(const_value_to_json).collect()),
        ast::Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_owned(), const_value_to_json(value)))
                .collect(),
        ),
    }
}
