//! The scalars every schema knows without declaring them.

use crate::{registry::ScalarRecord, NamedTypeId, Registry};

pub const BUILTIN_SCALARS: [(&str, &str); 5] = [
    (
        "String",
        "The `String` scalar type represents textual data, represented as UTF-8 character sequences.",
    ),
    (
        "Int",
        "The `Int` scalar type represents non-fractional signed whole numeric values between -(2^31) and 2^31 - 1.",
    ),
    (
        "Float",
        "The `Float` scalar type represents signed double-precision fractional values as specified by IEEE 754.",
    ),
    ("Boolean", "The `Boolean` scalar type represents `true` or `false`."),
    (
        "ID",
        "The `ID` scalar type represents a unique identifier, often used to refetch an object or as key for a cache.",
    ),
];

pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.iter().any(|(builtin, _)| *builtin == name)
}

/// The registry's built-in scalar named `name`, registered on first use.
///
/// A type registered under a built-in name beforehand is returned as is, whatever its kind.
pub(crate) fn builtin_scalar(registry: &mut Registry, name: &str) -> Option<NamedTypeId> {
    let (name, description) = BUILTIN_SCALARS.iter().find(|(builtin, _)| *builtin == name)?;
    Some(registry.lookup(*name).unwrap_or_else(|| {
        let id = registry.push::<ScalarRecord>(*name);
        let common = &mut registry.records[id].common;
        common.description = Some((*description).to_owned());
        // The output has to carry the description too, the type is never modified.
        common.modified = true;
        registry.set(*name, id);
        id.into()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered_once() {
        let mut registry = Registry::new();
        let first = builtin_scalar(&mut registry, "Int").unwrap();
        let second = builtin_scalar(&mut registry, "Int").unwrap();
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
        assert!(builtin_scalar(&mut registry, "DateTime").is_none());
    }
}
