//! Runtime type resolution of interfaces and unions.
//!
//! An abstract type keeps an ordered table of candidate object types, each with a predicate, and
//! an optional fallback. Whenever the table changes it is compiled into a single [TypeResolveFn]
//! which picks the first candidate whose predicate matches.
//!
//! Whether the compiled dispatcher is synchronous or asynchronous is decided by calling every
//! predicate once with placeholder arguments (`null`, an empty context, a default info) and
//! looking at what it returns. Predicates with side effects observe that call. A predicate that
//! panics during it counts as synchronous.

use std::{
    fmt,
    future::Future,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::Value;

use crate::{Context, ObjectTypeId, ResolveInfo};

/// What a predicate returns: either an answer right away, or a future of it.
pub enum PredicateOutcome<'a> {
    Ready(bool),
    Pending(BoxFuture<'a, bool>),
}

type PredicateFn = dyn for<'a> Fn(&'a Value, &'a Context, &'a ResolveInfo) -> PredicateOutcome<'a> + Send + Sync;

#[derive(Clone)]
pub struct TypeResolverPredicate(Arc<PredicateFn>);

impl TypeResolverPredicate {
    pub fn new(predicate: impl Fn(&Value, &Context, &ResolveInfo) -> bool + Send + Sync + 'static) -> Self {
        Self::from_fn(move |value, context, info| PredicateOutcome::Ready(predicate(value, context, info)))
    }

    pub fn new_async<F, Fut>(predicate: F) -> Self
    where
        F: Fn(&Value, &Context, &ResolveInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Self::from_fn(move |value, context, info| PredicateOutcome::Pending(Box::pin(predicate(value, context, info))))
    }

    /// A predicate deciding on each call whether it needs to suspend.
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a Value, &'a Context, &'a ResolveInfo) -> PredicateOutcome<'a> + Send + Sync + 'static,
    {
        TypeResolverPredicate(Arc::new(predicate))
    }

    pub fn call<'a>(&self, value: &'a Value, context: &'a Context, info: &'a ResolveInfo) -> PredicateOutcome<'a> {
        (self.0)(value, context, info)
    }

    fn returns_pending(&self) -> bool {
        let value = Value::Null;
        let info = ResolveInfo::default();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            matches!(self.call(&value, &(), &info), PredicateOutcome::Pending(_))
        }));
        outcome.unwrap_or_else(|_| {
            tracing::warn!("type resolver predicate panicked on placeholder arguments, treating it as synchronous");
            false
        })
    }
}

impl fmt::Debug for TypeResolverPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeResolverPredicate")
    }
}

/// Result of a dispatch. `Pending` only comes out of asynchronous dispatchers.
pub enum DispatchOutcome<'a> {
    Ready(Option<ObjectTypeId>),
    Pending(BoxFuture<'a, Option<ObjectTypeId>>),
}

impl DispatchOutcome<'_> {
    pub async fn resolved(self) -> Option<ObjectTypeId> {
        match self {
            DispatchOutcome::Ready(ty) => ty,
            DispatchOutcome::Pending(future) => future.await,
        }
    }
}

type CustomDispatchFn =
    dyn for<'a> Fn(&'a Value, &'a Context, &'a ResolveInfo) -> DispatchOutcome<'a> + Send + Sync;

#[derive(Debug)]
struct CompiledTable {
    candidates: Vec<(ObjectTypeId, TypeResolverPredicate)>,
    fallback: Option<ObjectTypeId>,
}

#[derive(Clone)]
enum Dispatch {
    Sync(Arc<CompiledTable>),
    Async(Arc<CompiledTable>),
    Custom(Arc<CustomDispatchFn>),
}

/// The `resolveType` function of an interface or union.
#[derive(Clone)]
pub struct TypeResolveFn(Dispatch);

impl TypeResolveFn {
    /// A hand-written dispatcher, replacing the compiled table.
    pub fn custom<F>(dispatch: F) -> Self
    where
        F: for<'a> Fn(&'a Value, &'a Context, &'a ResolveInfo) -> DispatchOutcome<'a> + Send + Sync + 'static,
    {
        TypeResolveFn(Dispatch::Custom(Arc::new(dispatch)))
    }

    pub fn is_async(&self) -> bool {
        matches!(self.0, Dispatch::Async(_))
    }

    pub fn dispatch<'a>(&'a self, value: &'a Value, context: &'a Context, info: &'a ResolveInfo) -> DispatchOutcome<'a> {
        match &self.0 {
            Dispatch::Sync(table) => DispatchOutcome::Ready(dispatch_sync(table, value, context, info)),
            Dispatch::Async(table) => DispatchOutcome::Pending(Box::pin(dispatch_async(table, value, context, info))),
            Dispatch::Custom(dispatch) => dispatch(value, context, info),
        }
    }
}

impl fmt::Debug for TypeResolveFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Dispatch::Sync(table) => f.debug_tuple("Sync").field(&table.candidates.len()).finish(),
            Dispatch::Async(table) => f.debug_tuple("Async").field(&table.candidates.len()).finish(),
            Dispatch::Custom(_) => f.write_str("Custom"),
        }
    }
}

fn dispatch_sync(
    table: &CompiledTable,
    value: &Value,
    context: &Context,
    info: &ResolveInfo,
) -> Option<ObjectTypeId> {
    for (candidate, predicate) in &table.candidates {
        match predicate.call(value, context, info) {
            PredicateOutcome::Ready(true) => return Some(*candidate),
            PredicateOutcome::Ready(false) => (),
            // A future is a truthy value: the candidate matches without waiting for it.
            PredicateOutcome::Pending(_) => {
                tracing::warn!(?candidate, "asynchronous predicate in a synchronous type resolver");
                return Some(*candidate);
            }
        }
    }
    table.fallback
}

// Predicates are awaited one after the other, never concurrently.
async fn dispatch_async(
    table: &CompiledTable,
    value: &Value,
    context: &Context,
    info: &ResolveInfo,
) -> Option<ObjectTypeId> {
    for (candidate, predicate) in &table.candidates {
        let matched = match predicate.call(value, context, info) {
            PredicateOutcome::Ready(matched) => matched,
            PredicateOutcome::Pending(future) => future.await,
        };
        if matched {
            return Some(*candidate);
        }
    }
    table.fallback
}

/// The type resolver table of an interface or union.
#[derive(Debug, Clone, Default)]
pub struct TypeResolvers {
    pub(crate) table: IndexMap<ObjectTypeId, TypeResolverPredicate>,
    pub(crate) fallback: Option<ObjectTypeId>,
    /// Set explicitly, takes precedence over the compiled table.
    pub(crate) custom: Option<TypeResolveFn>,
    compiled: Option<TypeResolveFn>,
}

impl TypeResolvers {
    pub fn table(&self) -> &IndexMap<ObjectTypeId, TypeResolverPredicate> {
        &self.table
    }

    pub fn fallback(&self) -> Option<ObjectTypeId> {
        self.fallback
    }

    pub fn resolve_type(&self) -> Option<TypeResolveFn> {
        self.custom.clone().or_else(|| self.compiled.clone())
    }

    /// Rebuilds the dispatcher from the whole table.
    pub(crate) fn compile(&mut self, type_name: &str) {
        if self.table.is_empty() && self.fallback.is_none() {
            self.compiled = None;
            return;
        }

        // Every predicate is called, even after an asynchronous one was found.
        let is_async = self
            .table
            .values()
            .map(TypeResolverPredicate::returns_pending)
            .fold(false, |is_async, pending| is_async || pending);

        tracing::debug!(
            type_name,
            candidates = self.table.len(),
            fallback = self.fallback.is_some(),
            is_async,
            "compiled type resolvers"
        );

        let table = Arc::new(CompiledTable {
            candidates: self
                .table
                .iter()
                .map(|(candidate, predicate)| (*candidate, predicate.clone()))
                .collect(),
            fallback: self.fallback,
        });
        self.compiled = Some(TypeResolveFn(if is_async {
            Dispatch::Async(table)
        } else {
            Dispatch::Sync(table)
        }));
    }

    /// Replaces every candidate id, keeping order and predicates.
    pub(crate) fn remap(&self, mut map: impl FnMut(ObjectTypeId) -> ObjectTypeId) -> TypeResolvers {
        TypeResolvers {
            table: self
                .table
                .iter()
                .map(|(candidate, predicate)| (map(*candidate), predicate.clone()))
                .collect(),
            fallback: self.fallback.map(&mut map),
            custom: self.custom.clone(),
            compiled: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{registry::ObjectRecord, Registry};

    fn candidates(n: usize) -> Vec<ObjectTypeId> {
        let mut registry = Registry::new();
        (0..n)
            .map(|ix| registry.push::<ObjectRecord>(format!("Candidate{ix}")))
            .collect()
    }

    fn kind_is(expected: &'static str) -> TypeResolverPredicate {
        TypeResolverPredicate::new(move |value, _, _| value["kind"] == expected)
    }

    #[test]
    fn first_matching_candidate_wins() {
        let ids = candidates(3);
        let mut resolvers = TypeResolvers::default();
        resolvers.table.insert(ids[0], kind_is("red"));
        resolvers.table.insert(ids[1], kind_is("green"));
        resolvers.table.insert(ids[2], kind_is("blue"));
        resolvers.compile("Color");

        let dispatch = resolvers.resolve_type().unwrap();
        assert!(!dispatch.is_async());

        let value = serde_json::json!({"kind": "blue"});
        let info = ResolveInfo::default();
        let DispatchOutcome::Ready(selected) = dispatch.dispatch(&value, &(), &info) else {
            unreachable!("synchronous dispatcher")
        };
        assert_eq!(selected, Some(ids[2]));
    }

    #[test]
    fn fallback_when_nothing_matches() {
        let ids = candidates(2);
        let mut resolvers = TypeResolvers::default();
        resolvers.table.insert(ids[0], kind_is("red"));
        resolvers.compile("Color");

        let value = serde_json::json!({"kind": "blue"});
        let info = ResolveInfo::default();
        let dispatch = resolvers.resolve_type().unwrap();
        assert!(matches!(dispatch.dispatch(&value, &(), &info), DispatchOutcome::Ready(None)));

        resolvers.fallback = Some(ids[1]);
        resolvers.compile("Color");
        let dispatch = resolvers.resolve_type().unwrap();
        assert!(matches!(
            dispatch.dispatch(&value, &(), &info),
            DispatchOutcome::Ready(Some(id)) if id == ids[1]
        ));
    }

    #[test]
    fn probing_calls_each_predicate_once_and_survives_panics() {
        let ids = candidates(2);
        let calls = Arc::new(AtomicUsize::new(0));
        let mut resolvers = TypeResolvers::default();
        resolvers.table.insert(ids[0], {
            let calls = calls.clone();
            TypeResolverPredicate::new(move |_, _, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                false
            })
        });
        resolvers.table.insert(
            ids[1],
            TypeResolverPredicate::new(|value, _, _| value.as_object().map(|object| object.is_empty()).unwrap_or_else(|| unreachable!())),
        );

        resolvers.compile("Thing");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!resolvers.resolve_type().unwrap().is_async());
    }

    #[tokio::test]
    async fn async_predicates_compile_an_async_dispatcher() {
        let ids = candidates(3);
        let mut resolvers = TypeResolvers::default();
        resolvers.table.insert(ids[0], kind_is("red"));
        resolvers.table.insert(
            ids[1],
            TypeResolverPredicate::new_async(|value, _, _| {
                let matched = value["kind"] == "green";
                async move { matched }
            }),
        );
        resolvers.table.insert(ids[2], kind_is("blue"));
        resolvers.compile("Color");

        let dispatch = resolvers.resolve_type().unwrap();
        assert!(dispatch.is_async());

        let info = ResolveInfo::default();
        for (kind, expected) in [("red", Some(ids[0])), ("green", Some(ids[1])), ("blue", Some(ids[2])), ("pink", None)] {
            let value = serde_json::json!({ "kind": kind });
            assert_eq!(dispatch.dispatch(&value, &(), &info).resolved().await, expected, "{kind}");
        }
    }

    #[test]
    fn custom_resolve_type_takes_precedence() {
        let ids = candidates(2);
        let mut resolvers = TypeResolvers::default();
        resolvers.table.insert(ids[0], kind_is("red"));
        resolvers.compile("Color");

        let fixed = ids[1];
        resolvers.custom = Some(TypeResolveFn::custom(move |_, _, _| DispatchOutcome::Ready(Some(fixed))));

        let value = serde_json::json!({"kind": "red"});
        let info = ResolveInfo::default();
        assert!(matches!(
            resolvers.resolve_type().unwrap().dispatch(&value, &(), &info),
            DispatchOutcome::Ready(Some(id)) if id == fixed
        ));
    }
}
