use std::fmt;

use crate::TypeKind;

pub type Result<T, E = ComposeError> = std::result::Result<T, E>;

/// Where in the schema an error was detected. Only used to build messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaLocation {
    Definition { name: String },
    Field { ty: String, name: String },
    Argument { ty: String, field: String, name: String },
}

impl SchemaLocation {
    pub fn definition(name: impl Into<String>) -> Self {
        SchemaLocation::Definition { name: name.into() }
    }

    pub fn field(ty: impl Into<String>, name: impl Into<String>) -> Self {
        SchemaLocation::Field {
            ty: ty.into(),
            name: name.into(),
        }
    }

    pub fn argument(ty: impl Into<String>, field: impl Into<String>, name: impl Into<String>) -> Self {
        SchemaLocation::Argument {
            ty: ty.into(),
            field: field.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaLocation::Definition { name } => f.write_str(name),
            SchemaLocation::Field { ty, name } => write!(f, "{ty}.{name}"),
            SchemaLocation::Argument { ty, field, name } => write!(f, "{ty}.{field}({name}:)"),
        }
    }
}

/// The polarity a type reference is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Polarity {
    Input,
    Output,
}

/// Broad classes of [ComposeError], mirroring what a caller has to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorCategory {
    NotFound,
    KindMismatch,
    Definition,
    Validation,
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Type with key '{key}' does not exist in the registry")]
    TypeNotFound { key: String },
    #[error("Cannot get field '{field}' from type '{ty}'. Field does not exist.")]
    FieldNotFound { ty: String, field: String },
    #[error("Cannot get argument '{arg}' from field '{ty}.{field}'. Argument does not exist.")]
    ArgumentNotFound { ty: String, field: String, arg: String },
    #[error("Cannot get relation '{relation}' from type '{ty}'. Relation does not exist.")]
    RelationNotFound { ty: String, relation: String },
    #[error("Type handle {handle} does not belong to the current registry")]
    StaleHandle { handle: String },

    #[error("Type '{name}' is {actual} type, expected {expected} type")]
    KindMismatch {
        name: String,
        expected: String,
        actual: TypeKind,
    },
    #[error("{location}: type '{name}' is {actual} type and cannot be used in {expected} position")]
    WrongPolarity {
        location: SchemaLocation,
        name: String,
        expected: Polarity,
        actual: TypeKind,
    },

    #[error("{location}: can accept array with exactly one type definition, got {len}")]
    ArrayShorthand { location: SchemaLocation, len: usize },
    #[error("{location}: cannot parse type definition: {message}")]
    InvalidSdl { location: SchemaLocation, message: String },
    #[error("{location}: cannot convert '{value}' to a type")]
    UnknownTypeInput { location: SchemaLocation, value: String },
    #[error("{location}: missing required `type`")]
    MissingType { location: SchemaLocation },

    #[error("{location}: relation cannot have both `resolver` and `type`")]
    RelationConflict { location: SchemaLocation },
    #[error("{location}: type resolver candidate '{name}' must be object type, got {actual}")]
    InvalidTypeResolver {
        location: SchemaLocation,
        name: String,
        actual: TypeKind,
    },
    #[error("{location}: {message}")]
    Validation { location: SchemaLocation, message: String },
}

impl ComposeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ComposeError::TypeNotFound { .. }
            | ComposeError::FieldNotFound { .. }
            | ComposeError::ArgumentNotFound { .. }
            | ComposeError::RelationNotFound { .. }
            | ComposeError::StaleHandle { .. } => ErrorCategory::NotFound,
            ComposeError::KindMismatch { .. } | ComposeError::WrongPolarity { .. } => ErrorCategory::KindMismatch,
            ComposeError::ArrayShorthand { .. }
            | ComposeError::InvalidSdl { .. }
            | ComposeError::UnknownTypeInput { .. }
            | ComposeError::MissingType { .. } => ErrorCategory::Definition,
            ComposeError::RelationConflict { .. }
            | ComposeError::InvalidTypeResolver { .. }
            | ComposeError::Validation { .. } => ErrorCategory::Validation,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    pub(crate) fn field_not_found(ty: &str, field: &str) -> Self {
        ComposeError::FieldNotFound {
            ty: ty.to_owned(),
            field: field.to_owned(),
        }
    }

    pub(crate) fn kind_mismatch(name: &str, expected: impl fmt::Display, actual: TypeKind) -> Self {
        ComposeError::KindMismatch {
            name: name.to_owned(),
            expected: expected.to_string(),
            actual,
        }
    }
}
