use std::{collections::BTreeMap, fmt::Display};

/// A dimension position is a unique set of dimensions.
/// Two measurements with the same metric name and the same dimension position
/// land on the same counter.
pub type DimensionPosition = BTreeMap<Name, Dimension>;

/// The value part of a dimension's key/value pair.
#[derive(Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Clone)]
pub enum Dimension {
    /// A static string dimension. Feel really good about these.
    Str(&'static str),
    /// Operation and field names show up here. Clones can add up.
    String(String),
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Str(s) => write!(f, "{s}"),
            Dimension::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<&'static str> for Dimension {
    fn from(s: &'static str) -> Self {
        Self::Str(s)
    }
}

impl From<String> for Dimension {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// An identifier for metrics and dimension keys.
#[derive(Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Clone)]
pub enum Name {
    /// A static string Name.
    Str(&'static str),
    /// A String name. Avoid these when you can, because clones can add up.
    String(String),
}

impl Name {
    /// an &str view of the name
    pub fn as_str(&self) -> &str {
        match self {
            Name::Str(s) => s,
            Name::String(s) => s,
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for Name {
    fn from(s: &'static str) -> Self {
        Self::Str(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

#[cfg(test)]
mod test {
    use super::{Dimension, DimensionPosition, Name};

    #[test_log::test]
    fn names_compare_by_variant_then_value() {
        // Map lookups depend on exact variant equality; callers must build
        // names the same way every time.
        assert_ne!(Name::from("a"), Name::from("a".to_string()));
        assert_eq!(Name::from("a").as_str(), Name::from("a".to_string()).as_str());
        assert_eq!("a", Name::from("a".to_string()).to_string());
    }

    #[test_log::test]
    fn dimension_positions_are_ordered() {
        let position = DimensionPosition::from([
            (Name::from("z"), Dimension::from("query")),
            (Name::from("a"), Dimension::from("user".to_string())),
        ]);
        let keys: Vec<&str> = position.keys().map(Name::as_str).collect();
        assert_eq!(vec!["a", "z"], keys);
        assert_eq!("user", position[&Name::from("a")].to_string());
    }
}
