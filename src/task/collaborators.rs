//! Interfaces to the external collaborators of the task index.
//!
//! State variable enumeration and action/formula compilation are not done
//! here. The task index calls them at the right stage and hands them the
//! read-only naming context they need to resolve symbols and objects.

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::error::TaskResult;
use crate::index::{ObjectIndex, SymbolTable, TypeIndex};
use crate::input::ActionDecl;
use crate::term::Tuple;

/// Read-only view of the indexed task passed to collaborators.
#[derive(Debug, Clone, Copy)]
pub struct CompilationContext<'a> {
    /// Type index.
    pub types: &'a TypeIndex,
    /// Object index.
    pub objects: &'a ObjectIndex,
    /// Symbol table.
    pub symbols: &'a SymbolTable,
    /// Fluent/static classification.
    pub classification: &'a Classification,
}

impl CompilationContext<'_> {
    /// True if `symbol` is fluent.
    #[must_use]
    pub fn is_fluent(&self, symbol: &str) -> bool {
        self.classification.is_fluent(symbol)
    }

    /// True if `symbol` is static.
    #[must_use]
    pub fn is_static(&self, symbol: &str) -> bool {
        self.classification.is_static(symbol)
    }
}

/// A state variable: a fluent symbol applied to a ground argument tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateVariable {
    /// Fluent symbol.
    pub symbol: String,
    /// Ground arguments.
    pub arguments: Tuple,
}

impl StateVariable {
    /// Creates a state variable.
    pub fn new(symbol: impl Into<String>, arguments: Tuple) -> Self {
        Self {
            symbol: symbol.into(),
            arguments,
        }
    }
}

/// Enumerates every possible state variable of a task.
pub trait StateVariableSource {
    /// All state variables of the task.
    fn state_variables(&self, ctx: &CompilationContext<'_>) -> TaskResult<Vec<StateVariable>>;
}

/// Compiles action schemas and formulas into the runtime representation.
///
/// The output is opaque to the task index; it is stored as JSON and handed
/// to later stages untouched.
pub trait SchemaCompiler {
    /// Compiles one action schema.
    fn compile_action(
        &self,
        ctx: &CompilationContext<'_>,
        action: &ActionDecl,
    ) -> TaskResult<serde_json::Value>;

    /// Compiles a goal or constraint formula.
    fn compile_formula(
        &self,
        ctx: &CompilationContext<'_>,
        formula: &serde_json::Value,
    ) -> TaskResult<serde_json::Value>;
}
