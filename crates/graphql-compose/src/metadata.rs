use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Private, builder-side metadata. Never part of the printed schema.
pub type Extensions = IndexMap<String, Value>;

/// A directive applied to a type, field, argument or enum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub args: IndexMap<String, Value>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Directive {
            name: name.into(),
            args: IndexMap::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }
}

/// Description, deprecation, extensions and directives of a field, argument or enum value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub extensions: Extensions,
    pub directives: Vec<Directive>,
}

impl Metadata {
    /// Set properties of `patch` replace ours, extensions are merged and directives appended.
    pub fn merge(&mut self, patch: Metadata) {
        let Metadata {
            description,
            deprecation_reason,
            extensions,
            directives,
        } = patch;
        if description.is_some() {
            self.description = description;
        }
        if deprecation_reason.is_some() {
            self.deprecation_reason = deprecation_reason;
        }
        self.extensions.extend(extensions);
        self.directives.extend(directives);
    }
}

/// Removes every directive named `name`, returning whether there was any.
pub(crate) fn remove_directives_by_name(directives: &mut Vec<Directive>, name: &str) -> bool {
    let before = directives.len();
    directives.retain(|directive| directive.name != name);
    before != directives.len()
}

pub(crate) fn directive_by_name<'a>(directives: &'a [Directive], name: &str) -> Option<&'a Directive> {
    directives.iter().find(|directive| directive.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_concatenates_directives() {
        let mut meta = Metadata {
            description: Some("before".into()),
            extensions: [("a".to_owned(), Value::from(1))].into_iter().collect(),
            directives: vec![Directive::new("first")],
            ..Default::default()
        };

        meta.merge(Metadata {
            deprecation_reason: Some("gone".into()),
            extensions: [("b".to_owned(), Value::from(2))].into_iter().collect(),
            directives: vec![Directive::new("second")],
            ..Default::default()
        });

        assert_eq!(meta.description.as_deref(), Some("before"));
        assert_eq!(meta.deprecation_reason.as_deref(), Some("gone"));
        assert_eq!(meta.extensions.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(
            meta.directives.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            ["first", "second"]
        );
    }

    #[test]
    fn directive_round_trips_through_json() {
        let directive = Directive::new("cost").arg("weight", 3);
        let json = serde_json::to_value(&directive).unwrap();
        assert_eq!(json, serde_json::json!({"name": "cost", "args": {"weight": 3}}));
        let back: Directive = serde_json::from_value(json).unwrap();
        assert_eq!(back, directive);
    }
}
