//! References to named types, possibly wrapped in list/non-null modifiers or deferred.

use std::{fmt, sync::Arc};

use once_cell::sync::OnceCell;

use crate::{
    EnumTypeId, InputTypeId, InterfaceTypeId, NamedTypeId, ObjectTypeId, Registry, Result,
    ScalarTypeId, UnionTypeId, Wrapping, WrappingType,
};

type DeferredFn = dyn Fn(&Registry) -> Result<TypeRef> + Send + Sync;

/// A reference resolved on first access and memoized afterwards.
///
/// Clones share the same cache: the callback runs at most once successfully, whichever clone is
/// read first. Concurrent first reads wait for the one resolving.
#[derive(Clone)]
pub struct Deferred(Arc<DeferredInner>);

struct DeferredInner {
    name: Option<String>,
    callback: Box<DeferredFn>,
    resolved: OnceCell<TypeRef>,
}

impl Deferred {
    pub fn new(callback: impl Fn(&Registry) -> Result<TypeRef> + Send + Sync + 'static) -> Self {
        Deferred(Arc::new(DeferredInner {
            name: None,
            callback: Box::new(callback),
            resolved: OnceCell::new(),
        }))
    }

    /// Deferred reference with a provisional name, reported by [TypeRef::type_name] until resolution.
    pub fn named(
        name: impl Into<String>,
        callback: impl Fn(&Registry) -> Result<TypeRef> + Send + Sync + 'static,
    ) -> Self {
        Deferred(Arc::new(DeferredInner {
            name: Some(name.into()),
            callback: Box::new(callback),
            resolved: OnceCell::new(),
        }))
    }

    /// Reference to a type that may not be registered yet, looked up by name on resolution.
    pub fn forward(name: impl Into<String>) -> Self {
        let name = name.into();
        let lookup = name.clone();
        Self::named(name, move |registry| registry.get(lookup.as_str()).map(TypeRef::Named))
    }

    pub fn provisional_name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.0.resolved.get().is_some()
    }

    pub fn resolved(&self) -> Option<&TypeRef> {
        self.0.resolved.get()
    }

    /// The referenced type, resolving it on first access.
    ///
    /// The resolved value never contains another `Deferred` layer.
    pub fn of_type(&self, registry: &Registry) -> Result<TypeRef> {
        self.0
            .resolved
            .get_or_try_init(|| {
                let resolved = (self.0.callback)(registry)?.realize(registry)?;
                tracing::trace!(name = ?self.0.name, "resolved deferred type");
                Ok(resolved)
            })
            .cloned()
    }

    pub fn ptr_eq(&self, other: &Deferred) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("name", &self.0.name)
            .field("resolved", &self.0.resolved.get())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum TypeRef {
    Named(NamedTypeId),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
    Deferred(Deferred),
}

impl TypeRef {
    pub fn list(inner: impl Into<TypeRef>) -> Self {
        TypeRef::List(Box::new(inner.into()))
    }

    /// Wraps in a non-null modifier unless the reference already is non-null.
    pub fn non_null(inner: impl Into<TypeRef>) -> Self {
        match inner.into() {
            non_null @ TypeRef::NonNull(_) => non_null,
            inner => TypeRef::NonNull(Box::new(inner)),
        }
    }

    pub fn from_wrapping(named: NamedTypeId, wrapping: &Wrapping) -> Self {
        TypeRef::Named(named).wrapped(wrapping)
    }

    /// Wraps this reference in the given modifiers, the outermost one ending up outside.
    pub fn wrapped(self, wrapping: &Wrapping) -> Self {
        wrapping.wrappers().rev().fold(self, |inner, wrapper| match wrapper {
            WrappingType::NonNull => TypeRef::NonNull(Box::new(inner)),
            WrappingType::List => TypeRef::List(Box::new(inner)),
        })
    }

    /// The innermost named type if reachable without resolving a deferred layer.
    pub fn named(&self) -> Option<NamedTypeId> {
        match self {
            TypeRef::Named(id) => Some(*id),
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named(),
            TypeRef::Deferred(deferred) => deferred.resolved().and_then(TypeRef::named),
        }
    }

    /// Strips every list, non-null and deferred layer down to the named type.
    pub fn unwrap_named(&self, registry: &Registry) -> Result<NamedTypeId> {
        match self {
            TypeRef::Named(id) => registry.check(*id),
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.unwrap_named(registry),
            TypeRef::Deferred(deferred) => deferred.of_type(registry)?.unwrap_named(registry),
        }
    }

    /// The same reference with every deferred layer replaced by its resolved value.
    pub fn realize(&self, registry: &Registry) -> Result<TypeRef> {
        Ok(match self {
            TypeRef::Named(id) => TypeRef::Named(registry.check(*id)?),
            TypeRef::List(inner) => TypeRef::List(Box::new(inner.realize(registry)?)),
            TypeRef::NonNull(inner) => TypeRef::NonNull(Box::new(inner.realize(registry)?)),
            TypeRef::Deferred(deferred) => deferred.of_type(registry)?,
        })
    }

    pub fn has_deferred(&self) -> bool {
        match self {
            TypeRef::Named(_) => false,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.has_deferred(),
            TypeRef::Deferred(_) => true,
        }
    }

    /// The named type and its wrapping, resolving deferred layers.
    pub fn wrapping(&self, registry: &Registry) -> Result<(NamedTypeId, Wrapping)> {
        let mut wrappers = Vec::new();
        let mut current = self.realize(registry)?;
        loop {
            current = match current {
                TypeRef::Named(id) => return Ok((id, Wrapping::from_outermost(wrappers))),
                TypeRef::List(inner) => {
                    wrappers.push(WrappingType::List);
                    *inner
                }
                TypeRef::NonNull(inner) => {
                    // NonNull<NonNull<T>> is only reachable through hand-built references.
                    if wrappers.last() != Some(&WrappingType::NonNull) {
                        wrappers.push(WrappingType::NonNull);
                    }
                    *inner
                }
                TypeRef::Deferred(deferred) => deferred.of_type(registry)?,
            }
        }
    }

    /// Bracket and bang decorated name, e.g. `[Foo!]!`.
    ///
    /// Unresolved deferred references with a provisional name report that name without resolving.
    pub fn type_name(&self, registry: &Registry) -> Result<String> {
        Ok(match self {
            TypeRef::Named(id) => registry.name_of(registry.check(*id)?).to_owned(),
            TypeRef::List(inner) => format!("[{}]", inner.type_name(registry)?),
            TypeRef::NonNull(inner) => format!("{}!", inner.type_name(registry)?),
            TypeRef::Deferred(deferred) => match (deferred.resolved(), deferred.provisional_name()) {
                (Some(resolved), _) => resolved.type_name(registry)?,
                (None, Some(name)) => name.to_owned(),
                (None, None) => deferred.of_type(registry)?.type_name(registry)?,
            },
        })
    }

    /// Outer layer is non-null.
    pub fn is_non_null(&self, registry: &Registry) -> bool {
        matches!(self.clone().resolve_outer(registry), TypeRef::NonNull(_))
    }

    /// A list, possibly behind one non-null layer.
    pub fn is_plural(&self, registry: &Registry) -> bool {
        match self.clone().resolve_outer(registry) {
            TypeRef::List(_) => true,
            TypeRef::NonNull(inner) => matches!(inner.resolve_outer(registry), TypeRef::List(_)),
            _ => false,
        }
    }

    /// Removes an outer non-null layer, if any.
    pub fn into_nullable(self, registry: &Registry) -> TypeRef {
        match self.resolve_outer(registry) {
            TypeRef::NonNull(inner) => *inner,
            other => other,
        }
    }

    /// Adds a non-null layer unless there already is one.
    pub fn into_non_null(self, registry: &Registry) -> TypeRef {
        TypeRef::non_null(self.resolve_outer(registry))
    }

    /// Wraps in a list unless the reference already is plural.
    pub fn into_plural(self, registry: &Registry) -> TypeRef {
        let ty = self.resolve_outer(registry);
        if ty.is_plural(registry) {
            return ty;
        }
        TypeRef::List(Box::new(ty))
    }

    /// Removes the list layer, keeping the outer and inner non-null modifiers.
    ///
    /// `[T!]!` becomes `T!`, `[T]!` becomes `T!`, `[T!]` becomes `T!`.
    pub fn into_non_plural(self, registry: &Registry) -> TypeRef {
        match self.resolve_outer(registry) {
            TypeRef::List(inner) => *inner,
            TypeRef::NonNull(inner) => match inner.resolve_outer(registry) {
                TypeRef::List(item) => TypeRef::non_null(*item),
                other => TypeRef::NonNull(Box::new(other)),
            },
            other => other,
        }
    }

    /// Replaces an outer deferred layer by its value when it can be resolved already.
    ///
    /// A forward reference to a type not registered yet stays as is: it stands for a named type.
    fn resolve_outer(self, registry: &Registry) -> TypeRef {
        match self {
            TypeRef::Deferred(deferred) => deferred.of_type(registry).unwrap_or(TypeRef::Deferred(deferred)),
            other => other,
        }
    }

    /// Structural equality on resolved references: same named types, same wrappers.
    pub fn same_as(&self, other: &TypeRef, registry: &Registry) -> Result<bool> {
        Ok(self.wrapping(registry)? == other.wrapping(registry)?)
    }
}

impl PartialEq for TypeRef {
    /// Structural equality without resolution. Deferred layers compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Named(a), TypeRef::Named(b)) => a == b,
            (TypeRef::List(a), TypeRef::List(b)) | (TypeRef::NonNull(a), TypeRef::NonNull(b)) => a == b,
            (TypeRef::Deferred(a), TypeRef::Deferred(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<NamedTypeId> for TypeRef {
    fn from(id: NamedTypeId) -> Self {
        TypeRef::Named(id)
    }
}

impl From<Deferred> for TypeRef {
    fn from(deferred: Deferred) -> Self {
        TypeRef::Deferred(deferred)
    }
}

macro_rules! named_type_refs {
    ($($id:ident),*) => {
        $(
            impl From<$id> for TypeRef {
                fn from(id: $id) -> Self {
                    TypeRef::Named(id.into())
                }
            }
        )*
    };
}

named_type_refs!(
    ObjectTypeId,
    InputTypeId,
    InterfaceTypeId,
    UnionTypeId,
    EnumTypeId,
    ScalarTypeId
);
