//! Initial state compilation.
//!
//! The initial state splits in two: facts about fluent symbols become the
//! initial atoms the search starts from, facts about static symbols become
//! the static extensions exported to the runtime.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::Classification;
use crate::config::ExternalSymbols;
use crate::error::{TaskResult, ValidationError};
use crate::extension::StaticExtension;
use crate::index::{ObjectIndex, Symbol, SymbolId, SymbolTable};
use crate::input::{InitFact, ValueExpr, TOTAL_COST};
use crate::term::{parse_tuple, render_tuple, Term, Tuple};

/// Value of a satisfied predicate fact.
pub const TRUE_VALUE: i64 = 1;

/// An initial fact about a fluent symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluentAtom {
    /// Fluent symbol.
    pub symbol: String,
    /// Ground arguments.
    pub arguments: Tuple,
    /// Initial value; `1` for predicate atoms.
    pub value: Term,
}

impl FluentAtom {
    /// The atom with every term resolved to its integer identity:
    /// `(symbol id, argument ids, value id)`.
    ///
    /// Returns `ValidationError::UnknownSymbol` / `UnknownObject` if a name
    /// is not indexed.
    pub fn resolve(
        &self,
        symbols: &SymbolTable,
        objects: &ObjectIndex,
    ) -> Result<(SymbolId, Vec<i64>, i64), ValidationError> {
        let symbol = symbols
            .id(&self.symbol)
            .ok_or_else(|| ValidationError::UnknownSymbol {
                name: self.symbol.clone(),
            })?;
        let resolve = |term: &Term| {
            term.resolve(objects).ok_or_else(|| ValidationError::UnknownObject {
                symbol: self.symbol.clone(),
                name: term.to_string(),
            })
        };
        let arguments = self.arguments.iter().map(resolve).collect::<Result<Vec<_>, _>>()?;
        let value = resolve(&self.value)?;
        Ok((symbol, arguments, value))
    }
}

/// Output of initial state compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialState {
    /// Fluent facts, in input order.
    pub fluent_atoms: Vec<FluentAtom>,
    /// One extension per static symbol that has at least one initial fact.
    pub static_data: BTreeMap<String, StaticExtension>,
}

/// Compiles initial facts against an indexed, classified symbol table.
pub struct InitialStateCompiler<'a> {
    symbols: &'a SymbolTable,
    objects: &'a ObjectIndex,
    classification: &'a Classification,
    externals: &'a dyn ExternalSymbols,
}

/// Negated atoms are rejected before their symbol is even looked up.
fn reject_negation(fact: &InitFact) -> Result<(), ValidationError> {
    match fact {
        InitFact::Atom {
            predicate,
            arguments,
            negated: true,
        } => Err(ValidationError::InvalidNegation {
            symbol: predicate.clone(),
            arguments: render_tuple(&parse_tuple(arguments)),
        }),
        _ => Ok(()),
    }
}

impl<'a> InitialStateCompiler<'a> {
    /// Creates a compiler over the indexed task.
    pub fn new(
        symbols: &'a SymbolTable,
        objects: &'a ObjectIndex,
        classification: &'a Classification,
        externals: &'a dyn ExternalSymbols,
    ) -> Self {
        Self {
            symbols,
            objects,
            classification,
            externals,
        }
    }

    /// Compiles all facts. Stops at the first invalid fact.
    pub fn compile(&self, facts: &[InitFact]) -> TaskResult<InitialState> {
        let mut state = InitialState::default();
        for fact in facts {
            reject_negation(fact)?;
            let Some(symbol) = self.resolve_symbol(fact.symbol())? else {
                continue;
            };
            let (arguments, value) = self.ground(symbol, fact)?;

            if self.classification.is_fluent(symbol.name()) {
                if arguments.len() != symbol.arity() {
                    return Err(ValidationError::ArityViolation {
                        symbol: symbol.name().to_string(),
                        expected: symbol.arity(),
                        actual: arguments.len(),
                        tuple: render_tuple(&arguments),
                        value: value.as_ref().map(ToString::to_string),
                    }
                    .into());
                }
                state.fluent_atoms.push(FluentAtom {
                    symbol: symbol.name().to_string(),
                    arguments,
                    value: value.unwrap_or(Term::Int(TRUE_VALUE)),
                });
            } else {
                let extension = match state.static_data.entry(symbol.name().to_string()) {
                    Entry::Occupied(e) => e.into_mut(),
                    Entry::Vacant(e) => e.insert(StaticExtension::for_symbol(symbol)?),
                };
                extension.add(arguments, value)?;
            }
        }

        debug!(
            fluent_atoms = state.fluent_atoms.len(),
            static_extensions = state.static_data.len(),
            "compiled initial state"
        );
        Ok(state)
    }

    /// Resolves the symbol of a fact. `None` means the fact is discarded.
    fn resolve_symbol(&self, name: &str) -> Result<Option<&'a Symbol>, ValidationError> {
        if name == TOTAL_COST {
            return Ok(None);
        }
        if self.externals.is_external(name) {
            return Err(ValidationError::ExternalInitialization {
                symbol: name.to_string(),
            });
        }
        self.symbols
            .get(name)
            .map(Some)
            .ok_or_else(|| ValidationError::UnknownSymbol {
                name: name.to_string(),
            })
    }

    /// Checks the fact against its symbol and grounds its arguments and
    /// value. Predicate facts carry no value.
    fn ground(&self, symbol: &Symbol, fact: &InitFact) -> Result<(Tuple, Option<Term>), ValidationError> {
        let (arguments, value) = match fact {
            InitFact::Atom { arguments, .. } => {
                if !symbol.is_predicate() {
                    return Err(ValidationError::FactKindMismatch {
                        symbol: symbol.name().to_string(),
                        found: "atom",
                        declared: symbol.kind_name(),
                    });
                }
                (parse_tuple(arguments), None)
            }
            InitFact::Assign {
                arguments, value, ..
            } => {
                if !symbol.is_function() {
                    return Err(ValidationError::FactKindMismatch {
                        symbol: symbol.name().to_string(),
                        found: "assignment",
                        declared: symbol.kind_name(),
                    });
                }
                (parse_tuple(arguments), Some(self.parse_value(symbol, value)?))
            }
        };

        if let Some(name) = arguments.iter().find_map(|t| t.as_object().filter(|n| !self.objects.contains(n))) {
            return Err(ValidationError::UnknownObject {
                symbol: symbol.name().to_string(),
                name: name.to_string(),
            });
        }
        Ok((arguments, value))
    }

    fn parse_value(&self, symbol: &Symbol, value: &ValueExpr) -> Result<Term, ValidationError> {
        match value {
            ValueExpr::Number(n) => Ok(Term::Int(*n)),
            ValueExpr::Symbol(name) if self.objects.contains(name) => Ok(Term::Object(name.clone())),
            ValueExpr::Symbol(name) => Err(ValidationError::UnresolvedValue {
                symbol: symbol.name().to_string(),
                value: name.clone(),
            }),
        }
    }
}
