//! Merging the members of one type into another, and importing external output types.
//!
//! Types of merged members are re-expressed as type names, so they resolve against the receiving
//! session instead of aliasing the source's type references.

use indexmap::IndexMap;

use crate::{
    ArgumentDefinition, ComposeError, EnumValueDefinition, FieldDefinition, FieldsComposer, InputValue,
    InputValueDefinition, InterfacesComposer, Metadata, NamedTypeId, OutputField, OutputType, Registry, Result,
    SchemaComposer, SchemaLocation, TypeInput, TypeKind, TypePosition, TypeRef,
};

/// Members of a type, in the form the composers accept.
enum Members {
    Fields {
        fields: Vec<(String, FieldDefinition)>,
        interfaces: Vec<TypeInput>,
    },
    InputFields(Vec<(String, InputValueDefinition)>),
    Values(Vec<(String, EnumValueDefinition)>),
    Types(Vec<TypeInput>),
    None,
}

pub(crate) fn merge(sc: &mut SchemaComposer, id: NamedTypeId, other: TypeInput) -> Result<()> {
    let id = sc.registry.check(id)?;
    let location = SchemaLocation::definition(sc.registry.name_of(id));
    let other = sc.convert(other, TypePosition::Any, &location)?.unwrap_named(&sc.registry)?;
    check_compatible(&sc.registry, id, &sc.registry, other)?;

    let members = members(&sc.registry, other)?;
    tracing::debug!(into = %location, from = sc.registry.name_of(other), "merging type");
    apply(sc, id, members)
}

pub(crate) fn merge_from(
    sc: &mut SchemaComposer,
    id: NamedTypeId,
    other: &SchemaComposer,
    other_id: NamedTypeId,
) -> Result<()> {
    let id = sc.registry.check(id)?;
    let other_id = other.registry.check(other_id)?;
    check_compatible(&sc.registry, id, &other.registry, other_id)?;

    let members = members(&other.registry, other_id)?;
    tracing::debug!(
        into = sc.registry.name_of(id),
        from = other.registry.name_of(other_id),
        "merging type from another session"
    );
    apply(sc, id, members)
}

fn check_compatible(registry: &Registry, id: NamedTypeId, other_registry: &Registry, other: NamedTypeId) -> Result<()> {
    let (expected, compatible) = match id.kind() {
        TypeKind::Object | TypeKind::Interface => (
            "object or interface",
            matches!(other.kind(), TypeKind::Object | TypeKind::Interface),
        ),
        TypeKind::Input => ("input", other.kind() == TypeKind::Input),
        TypeKind::Union => ("union", other.kind() == TypeKind::Union),
        TypeKind::Enum => ("enum", other.kind() == TypeKind::Enum),
        TypeKind::Scalar => ("scalar", other.kind() == TypeKind::Scalar),
    };
    if compatible {
        Ok(())
    } else {
        tracing::trace!(into = registry.name_of(id), "incompatible merge");
        Err(ComposeError::kind_mismatch(
            other_registry.name_of(other),
            expected,
            other.kind(),
        ))
    }
}

fn members(registry: &Registry, id: NamedTypeId) -> Result<Members> {
    let type_input = |ty: &TypeRef, registry: &Registry| ty.type_name(registry).map(TypeInput::Name);
    let args = |args: &IndexMap<String, crate::ArgumentConfig>| -> Result<IndexMap<String, ArgumentDefinition>> {
        args.iter()
            .map(|(name, arg)| {
                let definition = InputValueDefinition {
                    ty: Some(type_input(&arg.ty, registry)?),
                    default_value: arg.default_value.clone(),
                    meta: arg.meta.clone(),
                };
                Ok((name.clone(), definition))
            })
            .collect()
    };
    let fields = |fields: &IndexMap<String, crate::FieldConfig>| -> Result<Vec<(String, FieldDefinition)>> {
        fields
            .iter()
            .map(|(name, field)| {
                let definition = FieldDefinition {
                    ty: Some(type_input(&field.ty, registry)?),
                    args: args(&field.args)?,
                    resolve: field.resolve.clone(),
                    meta: field.meta.clone(),
                };
                Ok((name.clone(), definition))
            })
            .collect()
    };
    let types = |types: &[TypeRef]| -> Result<Vec<TypeInput>> {
        types.iter().map(|ty| type_input(ty, registry)).collect()
    };

    Ok(match id {
        NamedTypeId::Object(id) => Members::Fields {
            fields: fields(&registry.records[id].kind.fields)?,
            interfaces: types(&registry.records[id].kind.interfaces)?,
        },
        NamedTypeId::Interface(id) => Members::Fields {
            fields: fields(&registry.records[id].kind.fields)?,
            interfaces: types(&registry.records[id].kind.interfaces)?,
        },
        NamedTypeId::Input(id) => Members::InputFields(args(&registry.records[id].kind.fields)?.into_iter().collect()),
        NamedTypeId::Enum(id) => Members::Values(
            registry.records[id]
                .kind
                .values
                .iter()
                .map(|(name, value)| {
                    let definition = EnumValueDefinition {
                        value: Some(value.value.clone()),
                        meta: value.meta.clone(),
                    };
                    (name.clone(), definition)
                })
                .collect(),
        ),
        NamedTypeId::Union(id) => Members::Types(types(&registry.records[id].kind.types)?),
        NamedTypeId::Scalar(_) => Members::None,
    })
}

fn apply(sc: &mut SchemaComposer, id: NamedTypeId, members: Members) -> Result<()> {
    match (id, members) {
        (NamedTypeId::Object(id), Members::Fields { fields, interfaces }) => {
            let mut composer = sc.object(id)?;
            composer.add_fields(fields)?;
            composer.add_interfaces(interfaces)?;
        }
        (NamedTypeId::Interface(id), Members::Fields { fields, interfaces }) => {
            let mut composer = sc.interface(id)?;
            composer.add_fields(fields)?;
            composer.add_interfaces(interfaces)?;
        }
        (NamedTypeId::Input(id), Members::InputFields(fields)) => sc.input(id)?.add_fields(fields)?,
        (NamedTypeId::Enum(id), Members::Values(values)) => sc.enum_type(id)?.add_fields(values)?,
        (NamedTypeId::Union(id), Members::Types(types)) => sc.union(id)?.add_types(types)?,
        _ => {}
    }
    Ok(())
}

/// Populates a freshly created type from an external definition.
pub(crate) fn import_output(sc: &mut SchemaComposer, id: NamedTypeId, ty: &OutputType) -> Result<()> {
    let names = |types: &[crate::OutputTypeRef]| types.iter().map(|ty| TypeInput::Name(ty.to_string())).collect::<Vec<_>>();

    match (id, ty) {
        (NamedTypeId::Object(id), OutputType::Object(object)) => {
            let mut composer = sc.object(id)?;
            composer.add_fields(output_fields(&object.fields))?;
            composer.add_interfaces(names(&object.interfaces))?;
            composer.set_is_type_of(object.is_type_of.clone());
        }
        (NamedTypeId::Interface(id), OutputType::Interface(interface)) => {
            let mut composer = sc.interface(id)?;
            composer.add_fields(output_fields(&interface.fields))?;
            composer.add_interfaces(names(&interface.interfaces))?;
            sc.registry.records[id].kind.type_resolvers.custom = interface.resolve_type.clone();
        }
        (NamedTypeId::Union(id), OutputType::Union(union)) => {
            sc.union(id)?.add_types(names(&union.types))?;
            sc.registry.records[id].kind.type_resolvers.custom = union.resolve_type.clone();
        }
        (NamedTypeId::Input(id), OutputType::Input(input)) => {
            let fields = input
                .fields
                .iter()
                .map(|(name, field)| (name.clone(), input_value(field)))
                .collect::<Vec<_>>();
            sc.input(id)?.add_fields(fields)?;
        }
        (NamedTypeId::Enum(id), OutputType::Enum(enm)) => {
            let values = enm
                .values
                .iter()
                .map(|(name, value)| {
                    let definition = EnumValueDefinition {
                        value: Some(value.value.clone()),
                        meta: Metadata {
                            description: value.description.clone(),
                            deprecation_reason: value.deprecation_reason.clone(),
                            extensions: value.extensions.clone(),
                            directives: value.directives.clone(),
                        },
                    };
                    (name.clone(), definition)
                })
                .collect::<Vec<_>>();
            sc.enum_type(id)?.add_fields(values)?;
        }
        (NamedTypeId::Scalar(id), OutputType::Scalar(scalar)) => {
            let record = &mut sc.registry.records[id].kind;
            record.specified_by_url = scalar.specified_by_url.clone();
            record.serialize = scalar.serialize.clone();
            record.parse_value = scalar.parse_value.clone();
        }
        (id, ty) => return Err(ComposeError::kind_mismatch(ty.name(), id.kind(), ty.kind())),
    }

    let common = sc.registry.common_mut(id);
    common.description = ty.description().map(str::to_owned);
    common.directives = ty.directives().to_vec();
    common.extensions = match ty {
        OutputType::Object(ty) => ty.extensions.clone(),
        OutputType::Input(ty) => ty.extensions.clone(),
        OutputType::Interface(ty) => ty.extensions.clone(),
        OutputType::Union(ty) => ty.extensions.clone(),
        OutputType::Enum(ty) => ty.extensions.clone(),
        OutputType::Scalar(ty) => ty.extensions.clone(),
    };
    common.modified = true;
    Ok(())
}

fn output_fields(fields: &IndexMap<String, OutputField>) -> Vec<(String, FieldDefinition)> {
    fields
        .iter()
        .map(|(name, field)| {
            let definition = FieldDefinition {
                ty: Some(TypeInput::Name(field.ty.to_string())),
                args: field
                    .args
                    .iter()
                    .map(|(name, arg)| (name.clone(), input_value(arg)))
                    .collect(),
                resolve: field.resolve.clone(),
                meta: Metadata {
                    description: field.description.clone(),
                    deprecation_reason: field.deprecation_reason.clone(),
                    extensions: field.extensions.clone(),
                    directives: field.directives.clone(),
                },
            };
            (name.clone(), definition)
        })
        .collect()
}

fn input_value(value: &InputValue) -> InputValueDefinition {
    InputValueDefinition {
        ty: Some(TypeInput::Name(value.ty.to_string())),
        default_value: value.default_value.clone(),
        meta: Metadata {
            description: value.description.clone(),
            deprecation_reason: value.deprecation_reason.clone(),
            extensions: value.extensions.clone(),
            directives: value.directives.clone(),
        },
    }
}
