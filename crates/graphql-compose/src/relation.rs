//! Relations: fields of an object or interface backed by a resolver, with some of the resolver's
//! arguments filled from the parent value instead of being exposed to clients.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    ArgumentConfig, ArgumentDefinition, ComposeError, Context, Directive, FieldConfig, FieldResolveFn, Metadata,
    ResolveParams, Result, SchemaComposer, SchemaLocation, TypeInput, TypePosition, TypeRef,
};

/// A reusable resolver: output type, arguments and resolve function.
#[derive(Debug, Clone)]
pub struct Resolver {
    pub name: String,
    pub ty: TypeInput,
    pub args: IndexMap<String, ArgumentDefinition>,
    pub resolve: FieldResolveFn,
    pub meta: Metadata,
}

impl Resolver {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeInput>, resolve: FieldResolveFn) -> Self {
        Resolver {
            name: name.into(),
            ty: ty.into(),
            args: IndexMap::new(),
            resolve,
            meta: Metadata::default(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, arg: impl Into<ArgumentDefinition>) -> Self {
        self.args.insert(name.into(), arg.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }
}

type PrepareFn = dyn Fn(&Value, &Value, &Context) -> Value + Send + Sync;

/// Value of a hidden resolver argument.
#[derive(Clone)]
pub enum PrepareArg {
    Value(Value),
    /// Computed from the parent value, the client arguments and the context.
    Fn(Arc<PrepareFn>),
}

impl PrepareArg {
    pub fn from_fn(f: impl Fn(&Value, &Value, &Context) -> Value + Send + Sync + 'static) -> Self {
        PrepareArg::Fn(Arc::new(f))
    }

    /// Reads a field of the parent value.
    pub fn source_field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::from_fn(move |source, _, _| source.get(&name).cloned().unwrap_or(Value::Null))
    }

    fn evaluate(&self, source: &Value, args: &Value, context: &Context) -> Value {
        match self {
            PrepareArg::Value(value) => value.clone(),
            PrepareArg::Fn(f) => f(source, args, context),
        }
    }
}

impl fmt::Debug for PrepareArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepareArg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            PrepareArg::Fn(_) => f.write_str("Fn"),
        }
    }
}

impl From<Value> for PrepareArg {
    fn from(value: Value) -> Self {
        PrepareArg::Value(value)
    }
}

/// Options of `add_relation`. Exactly one of `resolver` or `ty` must be set.
#[derive(Debug, Clone, Default)]
pub struct RelationOpts {
    pub resolver: Option<Resolver>,
    pub ty: Option<TypeInput>,
    pub resolve: Option<FieldResolveFn>,
    /// Arguments added to (or overriding) the resolver's.
    pub args: IndexMap<String, ArgumentDefinition>,
    pub prepare_args: IndexMap<String, PrepareArg>,
    /// Resolve to null instead of failing. Defaults to the session configuration.
    pub catch_errors: Option<bool>,
    pub meta: Metadata,
}

impl RelationOpts {
    pub fn resolver(resolver: Resolver) -> Self {
        RelationOpts {
            resolver: Some(resolver),
            ..Default::default()
        }
    }

    pub fn typed(ty: impl Into<TypeInput>, resolve: FieldResolveFn) -> Self {
        RelationOpts {
            ty: Some(ty.into()),
            resolve: Some(resolve),
            ..Default::default()
        }
    }

    pub fn arg(mut self, name: impl Into<String>, arg: impl Into<ArgumentDefinition>) -> Self {
        self.args.insert(name.into(), arg.into());
        self
    }

    pub fn prepare_arg(mut self, name: impl Into<String>, prepare: impl Into<PrepareArg>) -> Self {
        self.prepare_args.insert(name.into(), prepare.into());
        self
    }

    pub fn catch_errors(mut self, catch_errors: bool) -> Self {
        self.catch_errors = Some(catch_errors);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, reason: impl Into<String>) -> Self {
        self.meta.deprecation_reason = Some(reason.into());
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.meta.directives.push(directive);
        self
    }
}

/// A relation as stored on its type, next to the field it produced.
#[derive(Debug, Clone)]
pub struct RelationConfig {
    pub resolver_name: Option<String>,
    pub ty: TypeRef,
    /// Every resolver argument, hidden ones included.
    pub args: IndexMap<String, ArgumentConfig>,
    pub prepare_args: IndexMap<String, PrepareArg>,
    pub catch_errors: bool,
}

pub(crate) fn build_relation(
    sc: &mut SchemaComposer,
    type_name: &str,
    name: &str,
    opts: RelationOpts,
) -> Result<(FieldConfig, RelationConfig)> {
    let location = SchemaLocation::field(type_name, name);
    let RelationOpts {
        resolver,
        ty,
        resolve,
        args,
        prepare_args,
        catch_errors,
        meta,
    } = opts;

    let (resolver_name, ty, mut all_args, resolve, mut field_meta) = match (resolver, ty) {
        (Some(_), Some(_)) => return Err(ComposeError::RelationConflict { location }),
        (None, None) => return Err(ComposeError::MissingType { location }),
        (Some(resolver), None) => (
            Some(resolver.name),
            resolver.ty,
            resolver.args,
            Some(resolver.resolve),
            resolver.meta,
        ),
        (None, Some(ty)) => (None, ty, IndexMap::new(), resolve, Metadata::default()),
    };
    let Some(resolve) = resolve else {
        return Err(ComposeError::Validation {
            location,
            message: "relation needs a resolve function".to_owned(),
        });
    };

    all_args.extend(args);
    field_meta.merge(meta);

    let ty = sc.convert(ty, TypePosition::Output, &location)?;
    let all_args = sc.convert_args(type_name, name, all_args)?;
    let exposed = all_args
        .iter()
        .filter(|(arg, _)| !prepare_args.contains_key(arg.as_str()))
        .map(|(arg, config)| (arg.clone(), config.clone()))
        .collect();

    let catch_errors = catch_errors.unwrap_or(sc.config.catch_relation_errors);
    tracing::debug!(
        type_name,
        relation = name,
        resolver = resolver_name.as_deref(),
        hidden_args = prepare_args.len(),
        catch_errors,
        "added relation"
    );

    let field = FieldConfig {
        ty: ty.clone(),
        args: exposed,
        resolve: Some(wrap_resolve(
            resolve,
            prepare_args.clone(),
            catch_errors,
            location.to_string(),
        )),
        meta: field_meta,
    };
    let relation = RelationConfig {
        resolver_name,
        ty,
        args: all_args,
        prepare_args,
        catch_errors,
    };
    Ok((field, relation))
}

fn wrap_resolve(
    resolve: FieldResolveFn,
    prepare_args: IndexMap<String, PrepareArg>,
    catch_errors: bool,
    field: String,
) -> FieldResolveFn {
    FieldResolveFn::new(move |params| {
        let mut args = match params.args {
            Value::Object(args) => args.clone(),
            _ => Map::new(),
        };
        for (name, prepare) in &prepare_args {
            args.insert(name.clone(), prepare.evaluate(params.source, params.args, params.context));
        }
        let args = Value::Object(args);
        let future = resolve.call(ResolveParams { args: &args, ..params });
        if !catch_errors {
            return future;
        }

        let field = field.clone();
        Box::pin(async move {
            match future.await {
                Ok(value) => Ok(value),
                Err(error) => {
                    tracing::debug!(field = field.as_str(), %error, "relation failed, resolving to null");
                    Ok(Value::Null)
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ResolveError, ResolveInfo};

    fn echo_args() -> FieldResolveFn {
        FieldResolveFn::sync(|params| Ok(params.args.clone()))
    }

    #[tokio::test]
    async fn prepared_args_are_merged_into_client_args() {
        let resolve = wrap_resolve(
            echo_args(),
            IndexMap::from([
                ("authorId".to_owned(), PrepareArg::source_field("id")),
                ("limit".to_owned(), PrepareArg::Value(json!(10))),
            ]),
            false,
            "User.posts".to_owned(),
        );
        let source = json!({"id": 7});
        let args = json!({"after": "abc"});
        let info = ResolveInfo::default();
        let result = resolve
            .call(ResolveParams {
                source: &source,
                args: &args,
                context: &(),
                info: &info,
            })
            .await
            .unwrap();
        assert_eq!(result, json!({"after": "abc", "authorId": 7, "limit": 10}));
    }

    #[tokio::test]
    async fn caught_errors_resolve_to_null() {
        let failing = FieldResolveFn::sync(|_| Err(ResolveError::new("boom")));
        let info = ResolveInfo::default();
        let params = ResolveParams {
            source: &Value::Null,
            args: &Value::Null,
            context: &(),
            info: &info,
        };

        let caught = wrap_resolve(failing.clone(), IndexMap::new(), true, "User.posts".to_owned());
        assert_eq!(caught.call(params).await.unwrap(), Value::Null);

        let uncaught = wrap_resolve(failing, IndexMap::new(), false, "User.posts".to_owned());
        assert_eq!(uncaught.call(params).await.unwrap_err().to_string(), "boom");
    }
}
