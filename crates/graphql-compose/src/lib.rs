//! Incremental construction of GraphQL schemas.
//!
//! A [SchemaComposer] is one composition session. Types are created in it, edited through
//! short-lived composers ([ObjectTypeComposer], [InputTypeComposer], ...) and materialized into
//! [OutputType]s on demand:
//!
//! - Types can reference types that do not exist yet. Such references are [Deferred] and resolve
//!   by name on first use.
//! - Each type is materialized into the same allocation for its whole life, so a materialized type
//!   always reflects the latest changes once it was finalized again.
//! - A type and everything it references can be cloned into another session with
//!   [TypeComposer::clone_to].

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod clone;
mod composer;
mod config;
mod convert;
mod error;
mod field;
mod finalize;
mod ids;
mod merge;
mod metadata;
mod output;
mod registry;
mod relation;
mod resolve;
mod scalars;
mod schema;
mod sdl;
mod type_ref;
mod type_resolvers;
mod wrapping;

pub use clone::{CloneMap, CloneTarget};
pub use composer::{
    AbstractTypeComposer, ArgumentsComposer, DeprecatedFields, EnumTypeComposer, FieldNames, FieldsComposer,
    InputTypeComposer, InterfaceTypeComposer, InterfacesComposer, ObjectTypeComposer, RelationsComposer,
    ScalarTypeComposer, TypeComposer, TypedFieldsComposer, UnionTypeComposer, DEFAULT_DEPRECATION_REASON,
};
pub use config::ComposerConfig;
pub use convert::{TypeInput, TypePosition};
pub use error::{ComposeError, ErrorCategory, Polarity, Result, SchemaLocation};
pub use field::{
    ArgumentConfig, ArgumentDefinition, EnumValueConfig, EnumValueDefinition, FieldConfig, FieldDefinition,
    FieldLike, FieldPatch, InputFieldConfig, InputFieldDefinition, InputValueConfig, InputValueDefinition,
    TypedField,
};
pub use ids::{
    EnumTypeId, InputTypeId, InterfaceTypeId, KindId, NamedTypeId, ObjectTypeId, ScalarTypeId, TypeKind, UnionTypeId,
};
pub use metadata::{Directive, Extensions, Metadata};
pub use output::{
    EnumType, EnumValue, InputObjectType, InputValue, InterfaceType, ObjectType, OutputField, OutputType,
    OutputTypeRef, ScalarType, UnionType,
};
pub use registry::{ExternalKey, Registry, RegistryKey};
pub use relation::{PrepareArg, RelationConfig, RelationOpts, Resolver};
pub use resolve::{Context, FieldResolveFn, IsTypeOfFn, ResolveError, ResolveInfo, ResolveParams, ScalarFn};
pub use scalars::{is_builtin_scalar, BUILTIN_SCALARS};
pub use schema::SchemaComposer;
pub use sdl::DEFAULT_SDL_DEPRECATION_REASON;
pub use type_ref::{Deferred, TypeRef};
pub use type_resolvers::{DispatchOutcome, PredicateOutcome, TypeResolveFn, TypeResolverPredicate, TypeResolvers};
pub use wrapping::{Wrapping, WrappingType};
