//! Static extensions.
//!
//! A static symbol never changes during planning, so its complete value can
//! be shipped to the native runtime as data. One [`StaticExtension`] holds
//! that value for one symbol: the set of true tuples of a predicate, or the
//! tuple → value map of a function.
//!
//! The runtime ships one container per (kind, arity) pair and nothing
//! beyond arity 4. [`ExtensionShape`] encodes that boundary: a shape that
//! exists is a shape the runtime can load.

mod descriptor;
mod serialize;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CapabilityError, ValidationError};
use crate::index::{ObjectIndex, Symbol};
use crate::term::{render_tuple, Term, Tuple};

pub use descriptor::{
    native_identifier, AccessorDescriptor, DeclarationDescriptor, ExtensionDescriptor, ValueKind,
};
pub use serialize::{decode_record, encode_record};

/// Which container family an extension uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    /// Tuples of a boolean predicate.
    Set,
    /// Tuple → value associations of a function.
    Map,
}

impl ExtensionKind {
    /// Supported arities, rendered for error messages.
    #[must_use]
    pub const fn supported(self) -> &'static str {
        match self {
            Self::Set => "1..=4",
            Self::Map => "0..=4",
        }
    }

    /// True if the runtime has a container of this kind for `arity`.
    #[must_use]
    pub const fn supports(self, arity: usize) -> bool {
        match self {
            Self::Set => arity >= 1 && arity <= ExtensionShape::MAX_ARITY,
            Self::Map => arity <= ExtensionShape::MAX_ARITY,
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => write!(f, "set"),
            Self::Map => write!(f, "map"),
        }
    }
}

/// A supported (kind, arity) pair. Only constructible through
/// [`ExtensionShape::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExtensionShape {
    kind: ExtensionKind,
    arity: usize,
}

impl ExtensionShape {
    /// Largest arity the runtime has containers for.
    pub const MAX_ARITY: usize = 4;

    /// Validates the pair.
    ///
    /// Returns `CapabilityError::UnsupportedArity` for a Set of arity 0 or
    /// any kind above [`Self::MAX_ARITY`].
    pub fn new(symbol: &str, kind: ExtensionKind, arity: usize) -> Result<Self, CapabilityError> {
        if !kind.supports(arity) {
            return Err(CapabilityError::UnsupportedArity {
                symbol: symbol.to_string(),
                kind,
                arity,
                supported: kind.supported(),
            });
        }
        Ok(Self { kind, arity })
    }

    /// Set or map.
    #[must_use]
    pub const fn kind(self) -> ExtensionKind {
        self.kind
    }

    /// Key arity.
    #[must_use]
    pub const fn arity(self) -> usize {
        self.arity
    }

    /// Name of the runtime container for this shape.
    #[must_use]
    pub const fn storage_name(self) -> &'static str {
        match (self.kind, self.arity) {
            (ExtensionKind::Map, 0) => "Arity0Element",
            (ExtensionKind::Map, 1) => "UnaryMap",
            (ExtensionKind::Map, 2) => "BinaryMap",
            (ExtensionKind::Map, 3) => "Arity3Map",
            (ExtensionKind::Map, _) => "Arity4Map",
            (ExtensionKind::Set, 1) => "UnarySet",
            (ExtensionKind::Set, 2) => "BinarySet",
            (ExtensionKind::Set, 3) => "Arity3Set",
            (ExtensionKind::Set, _) => "Arity4Set",
        }
    }

    /// Name of the runtime serializer routine that loads this shape.
    #[must_use]
    pub const fn loader_name(self) -> &'static str {
        match (self.kind, self.arity) {
            (ExtensionKind::Map, 0) => "deserialize0AryElement",
            (ExtensionKind::Map, 1) => "deserializeUnaryMap",
            (ExtensionKind::Map, 2) => "deserializeBinaryMap",
            (ExtensionKind::Map, 3) => "deserializeArity3Map",
            (ExtensionKind::Map, _) => "deserializeArity4Map",
            (ExtensionKind::Set, 1) => "deserializeUnarySet",
            (ExtensionKind::Set, 2) => "deserializeBinarySet",
            (ExtensionKind::Set, 3) => "deserializeArity3Set",
            (ExtensionKind::Set, _) => "deserializeArity4Set",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExtensionData {
    Set(HashSet<Tuple>),
    Map(HashMap<Tuple, Term>),
}

/// The full extensional value of one static symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExtensionRecord", into = "ExtensionRecord")]
pub struct StaticExtension {
    symbol: String,
    shape: ExtensionShape,
    element_type: String,
    data: ExtensionData,
}

impl StaticExtension {
    /// Creates an empty extension of the given kind and arity.
    pub fn new(
        symbol: impl Into<String>,
        kind: ExtensionKind,
        arity: usize,
        element_type: impl Into<String>,
    ) -> Result<Self, CapabilityError> {
        let symbol = symbol.into();
        let shape = ExtensionShape::new(&symbol, kind, arity)?;
        let data = match kind {
            ExtensionKind::Set => ExtensionData::Set(HashSet::new()),
            ExtensionKind::Map => ExtensionData::Map(HashMap::new()),
        };
        Ok(Self {
            symbol,
            shape,
            element_type: element_type.into(),
            data,
        })
    }

    /// Creates the extension matching a symbol declaration: predicates map
    /// to sets, functions to maps, arity is the argument count.
    pub fn for_symbol(symbol: &Symbol) -> Result<Self, CapabilityError> {
        let kind = if symbol.is_predicate() {
            ExtensionKind::Set
        } else {
            ExtensionKind::Map
        };
        Self::new(symbol.name(), kind, symbol.arity(), symbol.value_type())
    }

    /// Symbol this extension belongs to.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Validated kind and arity.
    #[must_use]
    pub const fn shape(&self) -> ExtensionShape {
        self.shape
    }

    /// Set or map.
    #[must_use]
    pub const fn kind(&self) -> ExtensionKind {
        self.shape.kind
    }

    /// Key arity.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.shape.arity
    }

    /// Declared value type: `bool` for sets, the return type for maps.
    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Adds one element.
    ///
    /// Sets take `value == None`, maps take `Some(value)`. The tuple length
    /// must equal the arity; a 0-ary map therefore takes the empty tuple and
    /// holds a single scalar. Re-adding a tuple overwrites its value. On
    /// error the extension is left unchanged.
    pub fn add(&mut self, tuple: Tuple, value: Option<Term>) -> Result<(), ValidationError> {
        if tuple.len() != self.shape.arity {
            return Err(ValidationError::ArityViolation {
                symbol: self.symbol.clone(),
                expected: self.shape.arity,
                actual: tuple.len(),
                tuple: render_tuple(&tuple),
                value: value.as_ref().map(ToString::to_string),
            });
        }
        match (&mut self.data, value) {
            (ExtensionData::Set(set), None) => {
                set.insert(tuple);
            }
            (ExtensionData::Map(map), Some(value)) => {
                map.insert(tuple, value);
            }
            (ExtensionData::Set(_), Some(_)) => {
                return Err(ValidationError::FactKindMismatch {
                    symbol: self.symbol.clone(),
                    found: "assignment",
                    declared: "predicate",
                });
            }
            (ExtensionData::Map(_), None) => {
                return Err(ValidationError::FactKindMismatch {
                    symbol: self.symbol.clone(),
                    found: "atom",
                    declared: "function",
                });
            }
        }
        Ok(())
    }

    /// Number of stored tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.data {
            ExtensionData::Set(set) => set.len(),
            ExtensionData::Map(map) => map.len(),
        }
    }

    /// True if nothing was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the tuple is stored (as a set member or a map key).
    #[must_use]
    pub fn contains(&self, tuple: &[Term]) -> bool {
        match &self.data {
            ExtensionData::Set(set) => set.contains(tuple),
            ExtensionData::Map(map) => map.contains_key(tuple),
        }
    }

    /// Value stored for a tuple. Always `None` for sets.
    #[must_use]
    pub fn value(&self, tuple: &[Term]) -> Option<&Term> {
        match &self.data {
            ExtensionData::Set(_) => None,
            ExtensionData::Map(map) => map.get(tuple),
        }
    }

    /// Stored elements in no particular order. Set members come with `None`.
    pub fn elements(&self) -> Box<dyn Iterator<Item = (&Tuple, Option<&Term>)> + '_> {
        match &self.data {
            ExtensionData::Set(set) => Box::new(set.iter().map(|t| (t, None))),
            ExtensionData::Map(map) => Box::new(map.iter().map(|(t, v)| (t, Some(v)))),
        }
    }

    /// Serializes every element into an exchange record.
    ///
    /// Each record is the comma-joined integer identities of the tuple
    /// (followed by the value for maps). Object names resolve through
    /// `objects`, integers are written as-is. Records come out sorted by
    /// their integer fields, so the output is stable across runs.
    ///
    /// Returns `ValidationError::UnknownObject` if a name is not indexed.
    pub fn serialize(&self, objects: &ObjectIndex) -> Result<Vec<String>, ValidationError> {
        let mut rows = self
            .elements()
            .map(|(tuple, value)| self.resolve_row(tuple, value, objects))
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_unstable();
        Ok(rows.iter().map(|row| encode_record(row)).collect())
    }

    fn resolve_row(
        &self,
        tuple: &[Term],
        value: Option<&Term>,
        objects: &ObjectIndex,
    ) -> Result<Vec<i64>, ValidationError> {
        tuple
            .iter()
            .chain(value)
            .map(|term| {
                term.resolve(objects).ok_or_else(|| ValidationError::UnknownObject {
                    symbol: self.symbol.clone(),
                    name: term.to_string(),
                })
            })
            .collect()
    }

    /// Structured description of the declaration and accessor the runtime
    /// needs for this extension.
    #[must_use]
    pub fn descriptor(&self) -> ExtensionDescriptor {
        ExtensionDescriptor::new(&self.symbol, self.shape, &self.element_type)
    }

    /// Declaration part of [`Self::descriptor`].
    #[must_use]
    pub fn declaration_descriptor(&self) -> DeclarationDescriptor {
        self.descriptor().declaration
    }

    /// Accessor part of [`Self::descriptor`].
    #[must_use]
    pub fn accessor_descriptor(&self) -> AccessorDescriptor {
        self.descriptor().accessor
    }
}

/// Serialized form of a [`StaticExtension`]; elements are sorted so the
/// output is stable. Deserialization replays every element through
/// [`StaticExtension::add`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionRecord {
    symbol: String,
    kind: ExtensionKind,
    arity: usize,
    element_type: String,
    elements: Vec<(Tuple, Option<Term>)>,
}

impl From<StaticExtension> for ExtensionRecord {
    fn from(ext: StaticExtension) -> Self {
        let mut elements: Vec<(Tuple, Option<Term>)> = match ext.data {
            ExtensionData::Set(set) => set.into_iter().map(|t| (t, None)).collect(),
            ExtensionData::Map(map) => map.into_iter().map(|(t, v)| (t, Some(v))).collect(),
        };
        elements.sort();
        Self {
            symbol: ext.symbol,
            kind: ext.shape.kind,
            arity: ext.shape.arity,
            element_type: ext.element_type,
            elements,
        }
    }
}

impl TryFrom<ExtensionRecord> for StaticExtension {
    type Error = String;

    fn try_from(record: ExtensionRecord) -> Result<Self, Self::Error> {
        let mut ext = Self::new(record.symbol, record.kind, record.arity, record.element_type)
            .map_err(|e| e.to_string())?;
        for (tuple, value) in record.elements {
            ext.add(tuple, value).map_err(|e| e.to_string())?;
        }
        Ok(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TypeIndex;
    use crate::input::{FunctionDecl, ObjectDecl, PredicateDecl};

    fn objects() -> ObjectIndex {
        let types = TypeIndex::new(["object", "block"]).unwrap();
        ObjectIndex::new(
            &[ObjectDecl::new("b1", "block"), ObjectDecl::new("b2", "block")],
            &types,
        )
        .unwrap()
    }

    fn tuple(items: &[&str]) -> Tuple {
        items.iter().map(|s| Term::parse(s)).collect()
    }

    #[test]
    fn test_shape_bounds() {
        for arity in 1..=4 {
            assert!(ExtensionShape::new("p", ExtensionKind::Set, arity).is_ok());
        }
        for arity in 0..=4 {
            assert!(ExtensionShape::new("f", ExtensionKind::Map, arity).is_ok());
        }
        assert!(ExtensionShape::new("p", ExtensionKind::Set, 0).is_err());
        assert!(ExtensionShape::new("p", ExtensionKind::Set, 5).is_err());
        assert!(ExtensionShape::new("f", ExtensionKind::Map, 5).is_err());
    }

    #[test]
    fn test_unsupported_arity_names_symbol() {
        let err = StaticExtension::new("p5", ExtensionKind::Set, 5, "bool").unwrap_err();
        assert_eq!(
            err,
            CapabilityError::UnsupportedArity {
                symbol: "p5".to_string(),
                kind: ExtensionKind::Set,
                arity: 5,
                supported: "1..=4",
            }
        );
    }

    #[test]
    fn test_for_symbol_selects_kind() {
        let clear = Symbol::from(&PredicateDecl::new("clear", ["block"]));
        let ext = StaticExtension::for_symbol(&clear).unwrap();
        assert_eq!(ext.kind(), ExtensionKind::Set);
        assert_eq!(ext.shape().storage_name(), "UnarySet");
        assert_eq!(ext.element_type(), "bool");

        let weight = Symbol::from(&FunctionDecl::new("weight", ["block", "block"], "number"));
        let ext = StaticExtension::for_symbol(&weight).unwrap();
        assert_eq!(ext.kind(), ExtensionKind::Map);
        assert_eq!(ext.shape().storage_name(), "BinaryMap");
        assert_eq!(ext.element_type(), "number");
    }

    #[test]
    fn test_set_add_and_serialize() {
        let mut ext = StaticExtension::new("clear", ExtensionKind::Set, 1, "bool").unwrap();
        ext.add(tuple(&["b1"]), None).unwrap();
        assert!(ext.contains(&tuple(&["b1"])));
        assert_eq!(ext.serialize(&objects()).unwrap(), vec!["2".to_string()]);
    }

    #[test]
    fn test_set_arity_violation_leaves_extension_unchanged() {
        let mut ext = StaticExtension::new("clear", ExtensionKind::Set, 1, "bool").unwrap();
        ext.add(tuple(&["b1"]), None).unwrap();
        let before = ext.clone();

        let err = ext.add(tuple(&["b1", "b2"]), None).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ArityViolation { expected: 1, actual: 2, ref symbol, .. } if symbol == "clear"
        ));
        assert_eq!(ext, before);
    }

    #[test]
    fn test_map_records_append_value() {
        let mut ext = StaticExtension::new("dist", ExtensionKind::Map, 2, "number").unwrap();
        ext.add(tuple(&["b2", "b1"]), Some(Term::Int(7))).unwrap();
        ext.add(tuple(&["b1", "b2"]), Some(Term::Int(5))).unwrap();
        assert_eq!(ext.serialize(&objects()).unwrap(), vec!["2,3,5", "3,2,7"]);
    }

    #[test]
    fn test_map_object_values_resolve() {
        let mut ext = StaticExtension::new("below", ExtensionKind::Map, 1, "block").unwrap();
        ext.add(tuple(&["b1"]), Some(Term::from("b2"))).unwrap();
        assert_eq!(ext.serialize(&objects()).unwrap(), vec!["2,3"]);
        assert_eq!(ext.value(&tuple(&["b1"])), Some(&Term::from("b2")));
    }

    #[test]
    fn test_last_write_wins() {
        let mut ext = StaticExtension::new("weight", ExtensionKind::Map, 1, "number").unwrap();
        ext.add(tuple(&["b1"]), Some(Term::Int(1))).unwrap();
        ext.add(tuple(&["b1"]), Some(Term::Int(9))).unwrap();
        assert_eq!(ext.len(), 1);
        assert_eq!(ext.value(&tuple(&["b1"])), Some(&Term::Int(9)));
    }

    #[test]
    fn test_constant_map_holds_single_scalar() {
        let mut ext = StaticExtension::new("capacity", ExtensionKind::Map, 0, "number").unwrap();
        ext.add(vec![], Some(Term::Int(3))).unwrap();
        ext.add(vec![], Some(Term::Int(4))).unwrap();
        assert_eq!(ext.len(), 1);
        assert_eq!(ext.serialize(&objects()).unwrap(), vec!["4"]);

        let err = ext.add(tuple(&["b1"]), Some(Term::Int(1))).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ArityViolation { expected: 0, actual: 1, value: Some(ref v), .. } if v == "1"
        ));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut set = StaticExtension::new("clear", ExtensionKind::Set, 1, "bool").unwrap();
        assert!(matches!(
            set.add(tuple(&["b1"]), Some(Term::Int(1))),
            Err(ValidationError::FactKindMismatch { .. })
        ));
        let mut map = StaticExtension::new("weight", ExtensionKind::Map, 1, "number").unwrap();
        assert!(matches!(
            map.add(tuple(&["b1"]), None),
            Err(ValidationError::FactKindMismatch { .. })
        ));
        assert!(set.is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn test_serialize_unknown_object_fails() {
        let mut ext = StaticExtension::new("clear", ExtensionKind::Set, 1, "bool").unwrap();
        ext.add(tuple(&["ghost"]), None).unwrap();
        let err = ext.serialize(&objects()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownObject {
                symbol: "clear".to_string(),
                name: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_json_roundtrip_revalidates() {
        let mut ext = StaticExtension::new("weight", ExtensionKind::Map, 1, "number").unwrap();
        ext.add(tuple(&["b1"]), Some(Term::Int(3))).unwrap();
        let json = serde_json::to_string(&ext).unwrap();
        let back: StaticExtension = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ext);

        let bad = r#"{"symbol":"p","kind":"set","arity":5,"element_type":"bool","elements":[]}"#;
        assert!(serde_json::from_str::<StaticExtension>(bad).is_err());
    }

    #[test]
    fn test_integer_arguments_interleave() {
        let mut ext = StaticExtension::new("slot", ExtensionKind::Set, 2, "bool").unwrap();
        ext.add(tuple(&["b2", "10"]), None).unwrap();
        assert_eq!(ext.serialize(&objects()).unwrap(), vec!["3,10"]);
    }
}
