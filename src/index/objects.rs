//! Object identities.
//!
//! Ids 0 and 1 are reserved for the boolean literals so that predicate
//! values and object values share one integer domain in the runtime.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::index::types::{TypeId, TypeIndex};
use crate::input::ObjectDecl;

/// Name of the reserved object with id 0.
pub const FALSE_OBJECT: &str = "false";

/// Name of the reserved object with id 1.
pub const TRUE_OBJECT: &str = "true";

/// Dense 0-based identity of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Id of `false`.
    pub const FALSE: Self = Self(0);
    /// Id of `true`.
    pub const TRUE: Self = Self(1);

    /// Position in the object index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    /// The id as it appears in exchange records.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn as_i64(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serialized form of one object index slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_id: Option<TypeId>,
}

/// Object name → id mapping plus the object → declared type lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ObjectEntry>", into = "Vec<ObjectEntry>")]
pub struct ObjectIndex {
    entries: Vec<ObjectEntry>,
    ids: HashMap<String, ObjectId>,
}

impl ObjectIndex {
    /// Indexes `false`, `true`, then every declared object in order.
    ///
    /// Returns `ValidationError::DuplicateObject` for repeated names
    /// (including the reserved literals) and `ValidationError::UnknownType`
    /// for objects whose declared type is not indexed.
    pub fn new(objects: &[ObjectDecl], types: &TypeIndex) -> Result<Self, ValidationError> {
        let mut index = Self {
            entries: Vec::with_capacity(objects.len() + 2),
            ids: HashMap::with_capacity(objects.len() + 2),
        };
        index.push(FALSE_OBJECT.to_string(), None)?;
        index.push(TRUE_OBJECT.to_string(), None)?;

        for o in objects {
            let type_id = types.get(&o.type_name).ok_or_else(|| ValidationError::UnknownType {
                object: o.name.clone(),
                type_name: o.type_name.clone(),
            })?;
            index.push(o.name.clone(), Some(type_id))?;
        }
        Ok(index)
    }

    fn push(&mut self, name: String, type_id: Option<TypeId>) -> Result<ObjectId, ValidationError> {
        if self.ids.contains_key(&name) {
            return Err(ValidationError::DuplicateObject { name });
        }
        let id = ObjectId(self.entries.len());
        self.ids.insert(name.clone(), id);
        self.entries.push(ObjectEntry { name, type_id });
        Ok(id)
    }

    /// Id of the named object.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ObjectId> {
        self.ids.get(name).copied()
    }

    /// True if the object is indexed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Inverse lookup, used when decoding exchange records.
    #[must_use]
    pub fn name(&self, id: ObjectId) -> Option<&str> {
        self.entries.get(id.0).map(|e| e.name.as_str())
    }

    /// Declared type of an object. `None` for the boolean literals and for
    /// unknown names.
    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<TypeId> {
        let id = self.get(name)?;
        self.entries[id.0].type_id
    }

    /// All objects declared with the given type, in id order.
    pub fn of_type(&self, type_id: TypeId) -> impl Iterator<Item = ObjectId> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.type_id == Some(type_id))
            .map(|(i, _)| ObjectId(i))
    }

    /// Number of indexed objects, including the two boolean literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the boolean literals are present in every index.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Objects in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (ObjectId(i), e.name.as_str()))
    }
}

impl TryFrom<Vec<ObjectEntry>> for ObjectIndex {
    type Error = ValidationError;

    /// Rebuilds the lookup, rejecting repeated names and indexes whose
    /// first two slots are not `false` and `true`.
    fn try_from(entries: Vec<ObjectEntry>) -> Result<Self, Self::Error> {
        for (slot, reserved) in [FALSE_OBJECT, TRUE_OBJECT].into_iter().enumerate() {
            if entries.get(slot).map(|e| e.name.as_str()) != Some(reserved) {
                return Err(ValidationError::MissingField {
                    field: reserved.to_string(),
                });
            }
        }
        let mut index = Self {
            entries: Vec::with_capacity(entries.len()),
            ids: HashMap::with_capacity(entries.len()),
        };
        for entry in entries {
            index.push(entry.name, entry.type_id)?;
        }
        Ok(index)
    }
}

impl From<ObjectIndex> for Vec<ObjectEntry> {
    fn from(index: ObjectIndex) -> Self {
        index.entries
    }
}
