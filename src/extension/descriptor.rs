//! Declaration and accessor descriptors.
//!
//! The native runtime needs, per static symbol, a member declaration, an
//! accessor function and a loader call. This module describes those as
//! data; rendering them in the runtime's language is the job of
//! [`crate::codegen`].

use serde::{Deserialize, Serialize};

use crate::extension::{ExtensionKind, ExtensionShape};
use crate::index::BOOL_TYPE;

/// Turns a symbol name into a valid native identifier: every character that
/// is not ASCII alphanumeric or `_` becomes `_`.
///
/// ```
/// use taskindex::extension::native_identifier;
///
/// assert_eq!(native_identifier("road-length"), "road_length");
/// ```
#[must_use]
pub fn native_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// What an accessor returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum ValueKind {
    /// Membership test of a set.
    Membership,
    /// Stored value of a map, with its declared element type.
    Value(String),
}

/// The storage member the runtime declares for one extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationDescriptor {
    /// Native member name.
    pub identifier: String,
    /// Set or map.
    pub kind: ExtensionKind,
    /// Key arity.
    pub arity: usize,
    /// Runtime container name, e.g. `UnarySet`.
    pub storage: String,
    /// Stored value type (`bool` for sets).
    pub element_type: String,
}

/// The accessor function the runtime exposes for one extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorDescriptor {
    /// Accessor function name, `get_<identifier>`.
    pub name: String,
    /// Member the accessor reads.
    pub target: String,
    /// Number of object-id parameters.
    pub parameters: usize,
    /// Return kind of the accessor.
    pub returns: ValueKind,
}

/// Everything a code generator needs for one static symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDescriptor {
    /// Original symbol name.
    pub symbol: String,
    /// Member declaration.
    pub declaration: DeclarationDescriptor,
    /// Accessor function.
    pub accessor: AccessorDescriptor,
    /// Loader routine of the runtime serializer, e.g. `deserializeUnarySet`.
    pub loader: String,
    /// Exchange file stem; the extension is appended by the exporter.
    pub data_stem: String,
}

impl ExtensionDescriptor {
    pub(crate) fn new(symbol: &str, shape: ExtensionShape, element_type: &str) -> Self {
        let identifier = native_identifier(symbol);
        let storage = shape.storage_name();
        let returns = match shape.kind() {
            ExtensionKind::Set => ValueKind::Membership,
            ExtensionKind::Map => ValueKind::Value(element_type.to_string()),
        };
        let element_type = match shape.kind() {
            ExtensionKind::Set => BOOL_TYPE.to_string(),
            ExtensionKind::Map => element_type.to_string(),
        };
        Self {
            symbol: symbol.to_string(),
            declaration: DeclarationDescriptor {
                identifier: identifier.clone(),
                kind: shape.kind(),
                arity: shape.arity(),
                storage: storage.to_string(),
                element_type,
            },
            accessor: AccessorDescriptor {
                name: format!("get_{identifier}"),
                target: identifier.clone(),
                parameters: shape.arity(),
                returns,
            },
            loader: shape.loader_name().to_string(),
            data_stem: identifier,
        }
    }

    /// Native member name.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.declaration.identifier
    }

    /// Set or map.
    #[must_use]
    pub const fn kind(&self) -> ExtensionKind {
        self.declaration.kind
    }

    /// Key arity.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.declaration.arity
    }

    /// File name of the exchange records, e.g. `road_length.data`.
    #[must_use]
    pub fn data_file(&self, extension: &str) -> String {
        format!("{}.{extension}", self.data_stem)
    }
}
