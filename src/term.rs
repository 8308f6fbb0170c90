//! Ground terms appearing in initial facts and static extensions.
//!
//! The parser hands arguments over as untyped strings. A string that parses
//! as an integer is a numeric term, anything else names an object. Tuples
//! of terms can therefore mix object references and integers, which lets
//! numeric function values sit next to object arguments in one record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index::{ObjectId, ObjectIndex};

/// A ground term: an object reference or an integer literal.
///
/// # Examples
///
/// ```
/// use taskindex::Term;
///
/// assert_eq!(Term::parse("42"), Term::Int(42));
/// assert_eq!(Term::parse("b1"), Term::Object("b1".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// Reference to a declared object, by name.
    Object(String),
    /// Integer literal.
    Int(i64),
}

impl Term {
    /// Coerces a raw argument string into a term.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<i64>()
            .map_or_else(|_| Self::Object(raw.to_string()), Self::Int)
    }

    /// True for object references.
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// True for integer literals.
    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Object name, if this is an object reference.
    pub fn as_object(&self) -> Option<&str> {
        match self {
            Self::Object(name) => Some(name),
            Self::Int(_) => None,
        }
    }

    /// Literal value, if this is an integer.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Object(_) => None,
        }
    }

    /// Resolves the term to its integer identity: the object id for object
    /// references, the literal itself for integers.
    #[must_use]
    pub fn resolve(&self, objects: &ObjectIndex) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Object(name) => objects.get(name).map(ObjectId::as_i64),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(name) => write!(f, "{name}"),
            Self::Int(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Term {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Term {
    fn from(v: &str) -> Self {
        Self::Object(v.to_string())
    }
}

impl From<String> for Term {
    fn from(v: String) -> Self {
        Self::Object(v)
    }
}

/// An ordered argument tuple.
pub type Tuple = Vec<Term>;

/// Coerces raw argument strings into a tuple.
#[must_use]
pub fn parse_tuple<S: AsRef<str>>(raw: &[S]) -> Tuple {
    raw.iter().map(|a| Term::parse(a.as_ref())).collect()
}

/// Renders a tuple for error messages, e.g. `b1, b2`.
#[must_use]
pub fn render_tuple(tuple: &[Term]) -> String {
    tuple
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TypeIndex;
    use crate::input::ObjectDecl;

    #[test]
    fn test_parse_integer_and_object() {
        assert_eq!(Term::parse("-3"), Term::Int(-3));
        assert_eq!(Term::parse("0"), Term::Int(0));
        assert_eq!(Term::parse("b1"), Term::Object("b1".to_string()));
        assert_eq!(Term::parse("1.5"), Term::Object("1.5".to_string()));
    }

    #[test]
    fn test_accessors() {
        let t = Term::Int(5);
        assert!(t.is_int());
        assert_eq!(t.as_int(), Some(5));
        assert_eq!(t.as_object(), None);

        let t = Term::from("b2");
        assert!(t.is_object());
        assert_eq!(t.as_object(), Some("b2"));
    }

    #[test]
    fn test_resolve_through_object_index() {
        let types = TypeIndex::new(["object"]).unwrap();
        let objects =
            ObjectIndex::new(&[ObjectDecl::new("b1", "object")], &types).unwrap();

        assert_eq!(Term::from("b1").resolve(&objects), Some(2));
        assert_eq!(Term::from("true").resolve(&objects), Some(1));
        assert_eq!(Term::Int(17).resolve(&objects), Some(17));
        assert_eq!(Term::from("missing").resolve(&objects), None);
    }

    #[test]
    fn test_parse_and_render_tuple() {
        let tuple = parse_tuple(&["b1", "3"]);
        assert_eq!(tuple, vec![Term::from("b1"), Term::Int(3)]);
        assert_eq!(render_tuple(&tuple), "b1, 3");
        assert_eq!(render_tuple(&[]), "");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Term::Int(4)).unwrap();
        assert_eq!(json, r#"{"type":"int","value":4}"#);
        let back: Term = serde_json::from_str(r#"{"type":"object","value":"b1"}"#).unwrap();
        assert_eq!(back, Term::from("b1"));
    }
}
