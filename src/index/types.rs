//! Type identities.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Dense 0-based identity of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(usize);

impl TypeId {
    /// Position in the type index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat type-name → id mapping. The hierarchy between types is resolved by
/// the external type collaborator; only the identities live here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TypeIndex {
    names: Vec<String>,
    ids: HashMap<String, TypeId>,
}

impl TypeIndex {
    /// Builds the index in input order.
    ///
    /// Returns `ValidationError::DuplicateType` if a name repeats.
    pub fn new<I, S>(types: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for name in types {
            let name = name.into();
            if index.ids.contains_key(&name) {
                return Err(ValidationError::DuplicateType { name });
            }
            index.ids.insert(name.clone(), TypeId(index.names.len()));
            index.names.push(name);
        }
        Ok(index)
    }

    /// Id of the named type.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.ids.get(name).copied()
    }

    /// True if the type is indexed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Name of the type with the given id.
    #[must_use]
    pub fn name(&self, id: TypeId) -> Option<&str> {
        self.names.get(id.0).map(String::as_str)
    }

    /// Number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no type is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Type names in id order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (TypeId(i), n.as_str()))
    }
}

impl TryFrom<Vec<String>> for TypeIndex {
    type Error = ValidationError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<TypeIndex> for Vec<String> {
    fn from(index: TypeIndex) -> Self {
        index.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_ids_in_order() {
        let index = TypeIndex::new(["object", "block", "table"]).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get("object").map(TypeId::index), Some(0));
        assert_eq!(index.get("table").map(TypeId::index), Some(2));
        assert_eq!(index.name(TypeId(1)), Some("block"));
        assert!(index.get("robot").is_none());
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = TypeIndex::new(["block", "block"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateType {
                name: "block".to_string()
            }
        );
    }

    #[test]
    fn test_serializes_as_name_list() {
        let index = TypeIndex::new(["object", "block"]).unwrap();
        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(json, r#"["object","block"]"#);
        let back: TypeIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);
    }

    #[test]
    fn test_deserialize_rejects_duplicate_names() {
        let err = serde_json::from_str::<TypeIndex>(r#"["object","block","object"]"#).unwrap_err();
        assert!(err.to_string().contains("Duplicate type declaration: 'object'"));
    }
}
