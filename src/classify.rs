//! Fluent/static classification of symbols.
//!
//! A symbol is fluent iff it is the head of some action effect. Everything
//! else, plus equality, is static. Every later stage consults this
//! classification, so it must exist before the initial state or any formula
//! is processed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::index::SymbolTable;
use crate::input::{EQUALITY, TOTAL_COST};

/// The fluent/static partition of a symbol table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    fluent: BTreeSet<String>,
    #[serde(rename = "static")]
    static_: BTreeSet<String>,
}

impl Classification {
    /// Classifies every symbol of `symbols` from the effect head names of
    /// all actions.
    ///
    /// `total-cost` and `=` heads are ignored. A head that is not a declared
    /// symbol is still fluent; any initial fact about it is rejected later
    /// as an unknown symbol.
    #[must_use]
    pub fn new<'a, I>(symbols: &SymbolTable, effect_heads: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let fluent: BTreeSet<String> = effect_heads
            .into_iter()
            .filter(|head| *head != TOTAL_COST && *head != EQUALITY)
            .map(ToString::to_string)
            .collect();

        let mut static_: BTreeSet<String> = symbols
            .names()
            .filter(|name| !fluent.contains(*name))
            .map(ToString::to_string)
            .collect();
        static_.insert(EQUALITY.to_string());

        Self { fluent, static_ }
    }

    /// True if some action changes `name`.
    #[must_use]
    pub fn is_fluent(&self, name: &str) -> bool {
        self.fluent.contains(name)
    }

    /// True if `name` never changes.
    #[must_use]
    pub fn is_static(&self, name: &str) -> bool {
        self.static_.contains(name)
    }

    /// Fluent symbol names, sorted.
    #[must_use]
    pub const fn fluent_symbols(&self) -> &BTreeSet<String> {
        &self.fluent
    }

    /// Static symbol names, sorted. Always contains `=`.
    #[must_use]
    pub const fn static_symbols(&self) -> &BTreeSet<String> {
        &self.static_
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{FunctionDecl, PredicateDecl};

    fn table() -> SymbolTable {
        SymbolTable::new(
            &[
                PredicateDecl::new("on", ["block", "block"]),
                PredicateDecl::new("clear", ["block"]),
            ],
            &[FunctionDecl::new("weight", ["block"], "number")],
        )
        .unwrap()
    }

    #[test]
    fn test_effect_heads_are_fluent() {
        let c = Classification::new(&table(), ["on", "on"]);
        assert!(c.is_fluent("on"));
        assert!(!c.is_fluent("clear"));
        assert!(c.is_static("clear"));
        assert!(c.is_static("weight"));
        assert_eq!(c.fluent_symbols().len(), 1);
    }

    #[test]
    fn test_equality_always_static() {
        let c = Classification::new(&table(), Vec::<&str>::new());
        assert!(c.is_static("="));
        assert!(!c.is_fluent("="));
    }

    #[test]
    fn test_partition_is_total_and_disjoint() {
        let table = table();
        let c = Classification::new(&table, ["clear", "weight"]);
        for name in table.names() {
            assert_ne!(c.is_fluent(name), c.is_static(name), "symbol {name}");
        }
    }

    #[test]
    fn test_total_cost_head_ignored() {
        let c = Classification::new(&table(), ["total-cost", "on"]);
        assert!(!c.is_fluent("total-cost"));
        assert!(!c.is_static("total-cost"));
    }

    #[test]
    fn test_undeclared_head_is_fluent() {
        let c = Classification::new(&table(), ["holding", "on"]);
        assert!(c.is_fluent("holding"));
        assert!(!c.is_static("holding"));
        assert!(c.is_static("clear"));
    }
}
