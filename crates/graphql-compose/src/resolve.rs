//! Runtime hooks carried through to the materialized schema: field resolvers, `isTypeOf`
//! predicates and scalar coercions. Nothing in this crate executes queries, these are only stored
//! and wrapped.

use std::{any::Any, fmt, sync::Arc};

use futures::future::BoxFuture;
use serde_json::Value;

/// Request-scoped data handed to resolvers by the executor.
pub type Context = dyn Any + Send + Sync;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveInfo {
    pub field_name: String,
    pub parent_type: String,
    pub path: Vec<String>,
}

#[derive(Clone, Copy)]
pub struct ResolveParams<'a> {
    pub source: &'a Value,
    pub args: &'a Value,
    pub context: &'a Context,
    pub info: &'a ResolveInfo,
}

impl fmt::Debug for ResolveParams<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveParams")
            .field("source", self.source)
            .field("args", self.args)
            .field("info", self.info)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    #[error("{0}")]
    Message(String),
    #[error("{message}")]
    Extended { message: String, extensions: serde_json::Map<String, Value> },
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        ResolveError::Message(message.into())
    }
}

type ResolveFnInner = dyn for<'a> Fn(ResolveParams<'a>) -> BoxFuture<'static, Result<Value, ResolveError>> + Send + Sync;

/// A field resolver.
#[derive(Clone)]
pub struct FieldResolveFn(Arc<ResolveFnInner>);

impl FieldResolveFn {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(ResolveParams<'a>) -> BoxFuture<'static, Result<Value, ResolveError>> + Send + Sync + 'static,
    {
        FieldResolveFn(Arc::new(f))
    }

    /// A resolver that does not need to suspend.
    pub fn sync<F>(f: F) -> Self
    where
        F: for<'a> Fn(ResolveParams<'a>) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        Self::new(move |params| {
            let result = f(params);
            Box::pin(futures::future::ready(result))
        })
    }

    pub fn call(&self, params: ResolveParams<'_>) -> BoxFuture<'static, Result<Value, ResolveError>> {
        (self.0)(params)
    }

    pub fn ptr_eq(&self, other: &FieldResolveFn) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FieldResolveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldResolveFn")
    }
}

type IsTypeOfInner = dyn Fn(&Value, &Context, &ResolveInfo) -> bool + Send + Sync;

/// Tells whether a value belongs to an object type.
#[derive(Clone)]
pub struct IsTypeOfFn(Arc<IsTypeOfInner>);

impl IsTypeOfFn {
    pub fn new(f: impl Fn(&Value, &Context, &ResolveInfo) -> bool + Send + Sync + 'static) -> Self {
        IsTypeOfFn(Arc::new(f))
    }

    pub fn call(&self, value: &Value, context: &Context, info: &ResolveInfo) -> bool {
        (self.0)(value, context, info)
    }
}

impl fmt::Debug for IsTypeOfFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IsTypeOfFn")
    }
}

type ScalarInner = dyn Fn(&Value) -> Result<Value, ResolveError> + Send + Sync;

/// Coerces a scalar value, for serialization or parsing.
#[derive(Clone)]
pub struct ScalarFn(Arc<ScalarInner>);

impl ScalarFn {
    pub fn new(f: impl Fn(&Value) -> Result<Value, ResolveError> + Send + Sync + 'static) -> Self {
        ScalarFn(Arc::new(f))
    }

    pub fn call(&self, value: &Value) -> Result<Value, ResolveError> {
        (self.0)(value)
    }
}

impl fmt::Debug for ScalarFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScalarFn")
    }
}
