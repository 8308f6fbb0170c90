//! Predicate and function symbols.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::input::{FunctionDecl, PredicateDecl, EQUALITY, TOTAL_COST};

/// Value type of every predicate.
pub const BOOL_TYPE: &str = "bool";

/// Dense 0-based identity of a symbol, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(usize);

impl SymbolId {
    /// Position in the symbol table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed symbol of the planning language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Symbol {
    /// Boolean-valued relation.
    Predicate {
        /// Predicate name.
        name: String,
        /// Argument type names.
        argument_types: Vec<String>,
    },
    /// Valued function with an explicit return type (numeric or an object type).
    Function {
        /// Function name.
        name: String,
        /// Argument type names.
        argument_types: Vec<String>,
        /// Return type name.
        return_type: String,
    },
}

impl Symbol {
    /// Symbol name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Predicate { name, .. } | Self::Function { name, .. } => name,
        }
    }

    /// Declared argument types.
    #[must_use]
    pub fn argument_types(&self) -> &[String] {
        match self {
            Self::Predicate { argument_types, .. } | Self::Function { argument_types, .. } => {
                argument_types
            }
        }
    }

    /// Number of arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.argument_types().len()
    }

    /// `bool` for predicates, the declared return type for functions.
    #[must_use]
    pub fn value_type(&self) -> &str {
        match self {
            Self::Predicate { .. } => BOOL_TYPE,
            Self::Function { return_type, .. } => return_type,
        }
    }

    /// True for predicates.
    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        matches!(self, Self::Predicate { .. })
    }

    /// True for functions.
    #[must_use]
    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Function { .. })
    }

    /// Human-readable variant name.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Predicate { .. } => "predicate",
            Self::Function { .. } => "function",
        }
    }
}

impl From<&PredicateDecl> for Symbol {
    fn from(decl: &PredicateDecl) -> Self {
        Self::Predicate {
            name: decl.name.clone(),
            argument_types: decl.arguments.clone(),
        }
    }
}

impl From<&FunctionDecl> for Symbol {
    fn from(decl: &FunctionDecl) -> Self {
        Self::Function {
            name: decl.name.clone(),
            argument_types: decl.arguments.clone(),
            return_type: decl.return_type.clone(),
        }
    }
}

/// Ordered symbol table: predicates first, then functions, in declaration
/// order. The position of a symbol is its [`SymbolId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    ids: HashMap<String, SymbolId>,
}

impl SymbolTable {
    /// Builds the table.
    ///
    /// `total-cost` is skipped. A repeated `=` declaration is ignored (the
    /// first one stays); any other repeated name fails with
    /// `ValidationError::DuplicateSymbol`.
    pub fn new(predicates: &[PredicateDecl], functions: &[FunctionDecl]) -> Result<Self, ValidationError> {
        let mut table = Self::default();
        for p in predicates {
            table.insert(Symbol::from(p))?;
        }
        for f in functions.iter().filter(|f| f.name != TOTAL_COST) {
            table.insert(Symbol::from(f))?;
        }
        Ok(table)
    }

    fn insert(&mut self, symbol: Symbol) -> Result<(), ValidationError> {
        if self.ids.contains_key(symbol.name()) {
            if symbol.name() == EQUALITY {
                return Ok(());
            }
            return Err(ValidationError::DuplicateSymbol {
                name: symbol.name().to_string(),
            });
        }
        self.ids
            .insert(symbol.name().to_string(), SymbolId(self.symbols.len()));
        self.symbols.push(symbol);
        Ok(())
    }

    /// Looks up a symbol by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.ids.get(name).map(|id| &self.symbols[id.0])
    }

    /// Id of the named symbol.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<SymbolId> {
        self.ids.get(name).copied()
    }

    /// Symbol with the given id.
    #[must_use]
    pub fn by_id(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    /// True if `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    /// Value type of the named symbol (`bool` for predicates).
    #[must_use]
    pub fn value_type(&self, name: &str) -> Option<&str> {
        self.get(name).map(Symbol::value_type)
    }

    /// Number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if no symbol is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Symbol names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(Symbol::name)
    }
}

impl TryFrom<Vec<Symbol>> for SymbolTable {
    type Error = ValidationError;

    fn try_from(symbols: Vec<Symbol>) -> Result<Self, Self::Error> {
        let mut table = Self::default();
        for symbol in symbols {
            table.insert(symbol)?;
        }
        Ok(table)
    }
}

impl From<SymbolTable> for Vec<Symbol> {
    fn from(table: SymbolTable) -> Self {
        table.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decls() -> (Vec<PredicateDecl>, Vec<FunctionDecl>) {
        let predicates = vec![
            PredicateDecl::new("on", ["block", "block"]),
            PredicateDecl::new("clear", ["block"]),
        ];
        let functions = vec![
            FunctionDecl::new("total-cost", Vec::<String>::new(), "number"),
            FunctionDecl::new("weight", ["block"], "number"),
            FunctionDecl::new("loc", ["block"], "place"),
        ];
        (predicates, functions)
    }

    #[test]
    fn test_predicates_then_functions_in_order() {
        let (p, f) = decls();
        let table = SymbolTable::new(&p, &f).unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["on", "clear", "weight", "loc"]);
        assert_eq!(table.id("weight").map(SymbolId::index), Some(2));
    }

    #[test]
    fn test_total_cost_skipped() {
        let (p, f) = decls();
        let table = SymbolTable::new(&p, &f).unwrap();
        assert!(!table.contains("total-cost"));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_symbol_metadata() {
        let (p, f) = decls();
        let table = SymbolTable::new(&p, &f).unwrap();

        let on = table.get("on").unwrap();
        assert!(on.is_predicate());
        assert_eq!(on.arity(), 2);
        assert_eq!(on.value_type(), "bool");

        let loc = table.get("loc").unwrap();
        assert!(loc.is_function());
        assert_eq!(loc.argument_types(), ["block"]);
        assert_eq!(table.value_type("loc"), Some("place"));
        assert_eq!(table.value_type("missing"), None);
    }

    #[test]
    fn test_duplicate_across_variants_rejected() {
        let p = vec![PredicateDecl::new("at", ["block"])];
        let f = vec![FunctionDecl::new("at", ["block"], "number")];
        let err = SymbolTable::new(&p, &f).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateSymbol { name: "at".to_string() });
    }

    #[test]
    fn test_equality_may_be_shadowed() {
        let p = vec![
            PredicateDecl::new("=", ["object", "object"]),
            PredicateDecl::new("=", ["object", "object"]),
        ];
        let table = SymbolTable::new(&p, &[]).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains("="));
    }

    #[test]
    fn test_serialization_preserves_order() {
        let (p, f) = decls();
        let table = SymbolTable::new(&p, &f).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: SymbolTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.id("loc").map(SymbolId::index), Some(3));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_names() {
        let json = r#"[
            {"kind":"predicate","name":"at","argument_types":["block"]},
            {"kind":"function","name":"at","argument_types":[],"return_type":"number"}
        ]"#;
        let err = serde_json::from_str::<SymbolTable>(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate symbol declaration: 'at'"));
    }
}
