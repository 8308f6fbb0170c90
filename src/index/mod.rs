//! Stable integer identities for types, objects and symbols.
//!
//! Every index here is dense and 0-based, assigned in declaration order, so
//! the same input always yields the same identities.

mod objects;
mod symbols;
mod types;

pub use objects::{ObjectId, ObjectIndex, FALSE_OBJECT, TRUE_OBJECT};
pub use symbols::{Symbol, SymbolId, SymbolTable, BOOL_TYPE};
pub use types::{TypeId, TypeIndex};
