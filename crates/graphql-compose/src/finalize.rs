//! Materialization of composed types into [OutputType]s.
//!
//! Every type owns one output allocation for its whole life. Finalizing overwrites that allocation
//! in place, and only when the type was modified since the last time, so references handed out by
//! [SchemaComposer::get_type] keep pointing at the current definition of the type.

use std::{collections::HashSet, sync::Arc};

use indexmap::IndexMap;

use crate::{
    registry::CommonRecord, ArgumentConfig, ComposeError, EnumType, EnumValue, EnumValueConfig, FieldConfig,
    InputObjectType, InputValue, InterfaceType, NamedTypeId, ObjectType, OutputField, OutputType, OutputTypeRef,
    Polarity, Registry, Result, ScalarType, SchemaComposer, SchemaLocation, TypeKind, TypeRef, UnionType,
};

impl SchemaComposer {
    /// The materialized type, rebuilt first if it was modified. Modified types it references are
    /// finalized along with it.
    pub fn get_type(&mut self, id: impl Into<NamedTypeId>) -> Result<&OutputType> {
        let id = self.registry.check(id.into())?;
        self.finalize(id)?;
        Ok(&*self.registry.common(id).output)
    }

    /// Finalizes every type of the session.
    pub fn finalize_all(&mut self) -> Result<()> {
        let ids = self.registry.types().collect::<Vec<_>>();
        for id in ids {
            self.finalize(id)?;
        }
        Ok(())
    }

    /// An owned copy of the materialized type, detached from later changes.
    pub fn snapshot(&mut self, id: impl Into<NamedTypeId>) -> Result<Arc<OutputType>> {
        self.get_type(id).map(|ty| Arc::new(ty.clone()))
    }

    #[tracing::instrument(skip_all, fields(root = self.registry.name_of(root)))]
    fn finalize(&mut self, root: NamedTypeId) -> Result<()> {
        let mut visited = HashSet::new();
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            if !visited.insert(id) || !self.registry.common(id).modified {
                continue;
            }

            realize_references(&mut self.registry, id)?;
            let (output, referenced) = build(&self.registry, id)?;

            let common = self.registry.common_mut(id);
            *common.output = output;
            common.modified = false;
            tracing::debug!(name = common.name.as_str(), "finalized type");

            pending.extend(
                referenced
                    .into_iter()
                    .filter(|referenced| !visited.contains(referenced)),
            );
        }
        Ok(())
    }
}

/// Replaces deferred references of a type by what they resolve to. Does not mark the type as
/// modified, and leaves it untouched when any reference fails to resolve.
fn realize_references(registry: &mut Registry, id: NamedTypeId) -> Result<()> {
    match id {
        NamedTypeId::Object(id) => {
            let record = &registry.records[id].kind;
            let fields = realize_fields(registry, &record.fields)?;
            let interfaces = realize_all(registry, &record.interfaces)?;
            let record = &mut registry.records[id].kind;
            record.fields = fields;
            record.interfaces = interfaces;
        }
        NamedTypeId::Interface(id) => {
            let record = &registry.records[id].kind;
            let fields = realize_fields(registry, &record.fields)?;
            let interfaces = realize_all(registry, &record.interfaces)?;
            let record = &mut registry.records[id].kind;
            record.fields = fields;
            record.interfaces = interfaces;
        }
        NamedTypeId::Union(id) => {
            let types = realize_all(registry, &registry.records[id].kind.types)?;
            registry.records[id].kind.types = types;
        }
        NamedTypeId::Input(id) => {
            let fields = realize_args(registry, &registry.records[id].kind.fields)?;
            registry.records[id].kind.fields = fields;
        }
        NamedTypeId::Enum(_) | NamedTypeId::Scalar(_) => {}
    }
    Ok(())
}

fn realize_all(registry: &Registry, types: &[TypeRef]) -> Result<Vec<TypeRef>> {
    types.iter().map(|ty| ty.realize(registry)).collect()
}

fn realize_fields(registry: &Registry, fields: &IndexMap<String, FieldConfig>) -> Result<IndexMap<String, FieldConfig>> {
    fields
        .iter()
        .map(|(name, field)| {
            let mut field = field.clone();
            field.ty = field.ty.realize(registry)?;
            field.args = realize_args(registry, &field.args)?;
            Ok((name.clone(), field))
        })
        .collect()
}

fn realize_args(
    registry: &Registry,
    args: &IndexMap<String, ArgumentConfig>,
) -> Result<IndexMap<String, ArgumentConfig>> {
    args.iter()
        .map(|(name, arg)| {
            let mut arg = arg.clone();
            arg.ty = arg.ty.realize(registry)?;
            Ok((name.clone(), arg))
        })
        .collect()
}

struct Builder<'a> {
    registry: &'a Registry,
    referenced: Vec<NamedTypeId>,
}

fn build(registry: &Registry, id: NamedTypeId) -> Result<(OutputType, Vec<NamedTypeId>)> {
    let mut builder = Builder {
        registry,
        referenced: Vec::new(),
    };
    let common = registry.common(id);
    let output = match id {
        NamedTypeId::Object(id) => {
            let record = &registry.records[id].kind;
            OutputType::Object(ObjectType {
                name: common.name.clone(),
                description: common.description.clone(),
                fields: builder.output_fields(common, &record.fields)?,
                interfaces: builder.type_refs(common, &record.interfaces, TypeKind::Interface)?,
                is_type_of: record.is_type_of.clone(),
                directives: common.directives.clone(),
                extensions: common.extensions.clone(),
            })
        }
        NamedTypeId::Interface(id) => {
            let record = &registry.records[id].kind;
            OutputType::Interface(InterfaceType {
                name: common.name.clone(),
                description: common.description.clone(),
                fields: builder.output_fields(common, &record.fields)?,
                interfaces: builder.type_refs(common, &record.interfaces, TypeKind::Interface)?,
                resolve_type: record.type_resolvers.resolve_type(),
                directives: common.directives.clone(),
                extensions: common.extensions.clone(),
            })
        }
        NamedTypeId::Union(id) => {
            let record = &registry.records[id].kind;
            OutputType::Union(UnionType {
                name: common.name.clone(),
                description: common.description.clone(),
                types: builder.type_refs(common, &record.types, TypeKind::Object)?,
                resolve_type: record.type_resolvers.resolve_type(),
                directives: common.directives.clone(),
                extensions: common.extensions.clone(),
            })
        }
        NamedTypeId::Input(id) => {
            let record = &registry.records[id].kind;
            let fields = record
                .fields
                .iter()
                .map(|(name, field)| {
                    let location = SchemaLocation::field(&common.name, name);
                    Ok((name.clone(), builder.input_value(name, field, location)?))
                })
                .collect::<Result<_>>()?;
            OutputType::Input(InputObjectType {
                name: common.name.clone(),
                description: common.description.clone(),
                fields,
                directives: common.directives.clone(),
                extensions: common.extensions.clone(),
            })
        }
        NamedTypeId::Enum(id) => OutputType::Enum(EnumType {
            name: common.name.clone(),
            description: common.description.clone(),
            values: registry.records[id]
                .kind
                .values
                .iter()
                .map(|(name, value)| (name.clone(), enum_value(name, value)))
                .collect(),
            directives: common.directives.clone(),
            extensions: common.extensions.clone(),
        }),
        NamedTypeId::Scalar(id) => {
            let record = &registry.records[id].kind;
            OutputType::Scalar(ScalarType {
                name: common.name.clone(),
                description: common.description.clone(),
                specified_by_url: record.specified_by_url.clone(),
                serialize: record.serialize.clone(),
                parse_value: record.parse_value.clone(),
                directives: common.directives.clone(),
                extensions: common.extensions.clone(),
            })
        }
    };
    Ok((output, builder.referenced))
}

impl Builder<'_> {
    fn type_ref(&mut self, ty: &TypeRef) -> Result<OutputTypeRef> {
        let (id, wrapping) = ty.wrapping(self.registry)?;
        self.referenced.push(id);
        Ok(OutputTypeRef {
            id,
            name: self.registry.name_of(id).to_owned(),
            wrapping,
        })
    }

    /// Interface lists and union members, which must all be of `kind`.
    fn type_refs(&mut self, common: &CommonRecord, types: &[TypeRef], kind: TypeKind) -> Result<Vec<OutputTypeRef>> {
        types
            .iter()
            .map(|ty| {
                let ty = self.type_ref(ty)?;
                if ty.id.kind() != kind {
                    return Err(ComposeError::Validation {
                        location: SchemaLocation::definition(&common.name),
                        message: format!("'{}' is {} type, expected {kind} type", ty.name, ty.id.kind()),
                    });
                }
                Ok(ty)
            })
            .collect()
    }

    fn output_fields(
        &mut self,
        common: &CommonRecord,
        fields: &IndexMap<String, FieldConfig>,
    ) -> Result<IndexMap<String, OutputField>> {
        fields
            .iter()
            .map(|(name, field)| {
                let location = SchemaLocation::field(&common.name, name);
                let ty = self.type_ref(&field.ty)?;
                check_polarity(&ty, Polarity::Output, &location)?;
                let args = field
                    .args
                    .iter()
                    .map(|(arg, config)| {
                        let location = SchemaLocation::argument(&common.name, name, arg);
                        Ok((arg.clone(), self.input_value(arg, config, location)?))
                    })
                    .collect::<Result<_>>()?;
                Ok((
                    name.clone(),
                    OutputField {
                        name: name.clone(),
                        description: field.meta.description.clone(),
                        ty,
                        args,
                        resolve: field.resolve.clone(),
                        deprecation_reason: field.meta.deprecation_reason.clone(),
                        directives: field.meta.directives.clone(),
                        extensions: field.meta.extensions.clone(),
                    },
                ))
            })
            .collect()
    }

    fn input_value(&mut self, name: &str, config: &ArgumentConfig, location: SchemaLocation) -> Result<InputValue> {
        let ty = self.type_ref(&config.ty)?;
        check_polarity(&ty, Polarity::Input, &location)?;
        Ok(InputValue {
            name: name.to_owned(),
            description: config.meta.description.clone(),
            ty,
            default_value: config.default_value.clone(),
            deprecation_reason: config.meta.deprecation_reason.clone(),
            directives: config.meta.directives.clone(),
            extensions: config.meta.extensions.clone(),
        })
    }
}

fn check_polarity(ty: &OutputTypeRef, expected: Polarity, location: &SchemaLocation) -> Result<()> {
    let kind = ty.id.kind();
    let allowed = match expected {
        Polarity::Output => kind.is_output(),
        Polarity::Input => kind.is_input(),
    };
    if allowed {
        Ok(())
    } else {
        Err(ComposeError::WrongPolarity {
            location: location.clone(),
            name: ty.name.clone(),
            expected,
            actual: kind,
        })
    }
}

fn enum_value(name: &str, value: &EnumValueConfig) -> EnumValue {
    EnumValue {
        name: name.to_owned(),
        description: value.meta.description.clone(),
        value: value.value.clone(),
        deprecation_reason: value.meta.deprecation_reason.clone(),
        directives: value.meta.directives.clone(),
        extensions: value.meta.extensions.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldsComposer, TypeComposer};

    #[test]
    fn unmodified_types_are_not_rebuilt() {
        let mut sc = SchemaComposer::new();
        let mut user = sc.create_object("User").unwrap();
        user.set_field("id", "ID!").unwrap();
        let user = user.id();

        let first: *const OutputType = sc.get_type(user).unwrap();
        assert!(!sc.object(user).unwrap().is_modified());
        let second: *const OutputType = sc.get_type(user).unwrap();
        assert!(std::ptr::eq(first, second));

        sc.object(user).unwrap().set_field("name", "String").unwrap();
        let third = sc.get_type(user).unwrap();
        assert!(std::ptr::eq(first, third));
        assert_eq!(third.output_fields().unwrap().len(), 2);
    }

    #[test]
    fn input_types_are_rejected_in_output_position() {
        let mut sc = SchemaComposer::new();
        sc.create_object("Query").unwrap().set_field("filter", "Filter").unwrap();
        sc.create_input("Filter").unwrap();

        let err = sc.get_otc("Query").unwrap().get_type().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Query.filter: type 'Filter' is input type and cannot be used in output position"
        );
    }
}
