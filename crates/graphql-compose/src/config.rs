use serde::Deserialize;

/// Behavior switches of a [SchemaComposer](crate::SchemaComposer).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct ComposerConfig {
    /// Also register types built from an SDL snippet under the snippet text, so that converting
    /// the same snippet twice yields the same type.
    pub register_sdl_literals: bool,
    /// Unknown type names become forward references instead of failing.
    pub forward_references: bool,
    /// `String`, `Int`, `Float`, `Boolean` and `ID` are known without being registered.
    pub builtin_scalars: bool,
    /// Relations without an explicit `catch_errors` resolve to null on failure.
    pub catch_relation_errors: bool,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        ComposerConfig {
            register_sdl_literals: true,
            forward_references: true,
            builtin_scalars: true,
            catch_relation_errors: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ComposerConfig = toml::from_str("forward_references = false").unwrap();
        assert_eq!(
            config,
            ComposerConfig {
                forward_references: false,
                ..Default::default()
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = toml::from_str::<ComposerConfig>("strict = true").unwrap_err();
        assert!(err.message().contains("unknown field `strict`"), "{err}");
    }
}
