use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrappingType {
    NonNull,
    List,
}

/// List and non-null modifiers around a named type, outermost first.
///
/// `[Foo!]!` is `[NonNull, List, NonNull]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Wrapping(Vec<WrappingType>);

impl Wrapping {
    pub fn nullable() -> Self {
        Self::default()
    }

    pub fn from_outermost(wrappers: impl IntoIterator<Item = WrappingType>) -> Self {
        Wrapping(wrappers.into_iter().collect())
    }

    /// Splits a wrapped type name such as `[Int!]!` into the named type and its wrapping.
    ///
    /// Returns `None` when brackets are unbalanced, the name is empty or a non-null modifier is doubled.
    pub fn parse(ty: &str) -> Option<(&str, Wrapping)> {
        let mut rest = ty.trim();
        let mut wrappers = Vec::new();
        let mut lists = 0;
        loop {
            if let Some(inner) = rest.strip_suffix('!') {
                if wrappers.last() == Some(&WrappingType::NonNull) {
                    return None;
                }
                wrappers.push(WrappingType::NonNull);
                rest = inner;
            } else if let Some(inner) = rest.strip_suffix(']') {
                wrappers.push(WrappingType::List);
                lists += 1;
                rest = inner;
            } else {
                break;
            }
        }

        for _ in 0..lists {
            rest = rest.trim_end().strip_prefix('[')?;
        }
        let name = rest.trim();
        if name.is_empty() || name.contains(['[', ']', '!']) {
            return None;
        }

        Some((name, Wrapping(wrappers)))
    }

    pub fn wrappers(&self) -> impl DoubleEndedIterator<Item = WrappingType> + '_ {
        self.0.iter().copied()
    }

    pub fn is_required(&self) -> bool {
        self.0.first() == Some(&WrappingType::NonNull)
    }

    pub fn is_list(&self) -> bool {
        self.0.contains(&WrappingType::List)
    }

    /// Whether the named type itself, inside all lists, is non-null.
    pub fn inner_is_required(&self) -> bool {
        self.0.last() == Some(&WrappingType::NonNull)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn type_display<'a>(&'a self, name: &'a str) -> impl fmt::Display + 'a {
        WrappedName { wrapping: self, name }
    }
}

struct WrappedName<'a> {
    wrapping: &'a Wrapping,
    name: &'a str,
}

impl fmt::Display for WrappedName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for wrapper in self.wrapping.wrappers() {
            if wrapper == WrappingType::List {
                f.write_str("[")?;
            }
        }
        f.write_str(self.name)?;
        for wrapper in self.wrapping.wrappers().rev() {
            match wrapper {
                WrappingType::NonNull => f.write_str("!")?,
                WrappingType::List => f.write_str("]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for ty in ["Int", "Int!", "[Int]", "[Int!]!", "[[Int]!]", "[[Int!]!]!"] {
            let (name, wrapping) = Wrapping::parse(ty).unwrap();
            assert_eq!(name, "Int");
            assert_eq!(wrapping.type_display(name).to_string(), ty);
        }
    }

    #[test]
    fn parse_reports_outermost_first() {
        let (_, wrapping) = Wrapping::parse("[Foo!]!").unwrap();
        assert_eq!(
            wrapping.wrappers().collect::<Vec<_>>(),
            [WrappingType::NonNull, WrappingType::List, WrappingType::NonNull]
        );
        assert!(wrapping.is_required());
        assert!(wrapping.is_list());
        assert!(wrapping.inner_is_required());
    }

    #[test]
    fn parse_rejects_malformed_names() {
        for ty in ["", "!", "[Int", "Int]", "Int!!", "[]", "[[Int]", "é]", "[é]]", "Ünïcode!]"] {
            assert!(Wrapping::parse(ty).is_none(), "{ty}");
        }
    }
}
