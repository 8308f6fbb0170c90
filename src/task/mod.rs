//! The task index and its staged construction.
//!
//! A [`TaskIndexBuilder`] runs the compilation stages strictly in order:
//!
//! ```text
//! types → objects → symbols → state variables → initial state
//!       → actions → goal → constraints
//! ```
//!
//! Each stage needs the output of the previous one and runs exactly once.
//! Reading a field before its stage ran is an ordering error, never a
//! sentinel value. [`TaskIndexBuilder::finish`] turns a completed builder
//! into an immutable [`TaskIndex`].

mod collaborators;
mod serialization;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::Classification;
use crate::config::ExternalSymbols;
use crate::error::{OrderingError, TaskResult, ValidationError};
use crate::exchange::ExchangeBundle;
use crate::extension::StaticExtension;
use crate::index::{ObjectIndex, SymbolTable, TypeIndex};
use crate::init::{FluentAtom, InitialStateCompiler};
use crate::input::{ActionDecl, FunctionDecl, InitFact, ObjectDecl, PredicateDecl};

pub use collaborators::{
    CompilationContext, SchemaCompiler, StateVariable, StateVariableSource,
};
pub use serialization::{from_json, to_json_pretty};

/// Construction stages, in order. A builder's stage is the last one that
/// completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing has run yet.
    Uninitialized,
    /// Types indexed.
    TypesSet,
    /// Objects indexed.
    ObjectsSet,
    /// Symbols indexed and classified.
    SymbolsSet,
    /// State variables enumerated.
    StateVariablesSet,
    /// Initial state compiled.
    InitialStateSet,
    /// Action schemas compiled.
    ActionsSet,
    /// Goal compiled.
    GoalSet,
    /// Terminal.
    ConstraintsSet,
}

impl Stage {
    /// Name of the work this stage stands for.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::TypesSet => "types",
            Self::ObjectsSet => "objects",
            Self::SymbolsSet => "symbols",
            Self::StateVariablesSet => "state_variables",
            Self::InitialStateSet => "initial_state",
            Self::ActionsSet => "actions",
            Self::GoalSet => "goal",
            Self::ConstraintsSet => "constraints",
        }
    }

    /// Stage that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Uninitialized => Some(Self::TypesSet),
            Self::TypesSet => Some(Self::ObjectsSet),
            Self::ObjectsSet => Some(Self::SymbolsSet),
            Self::SymbolsSet => Some(Self::StateVariablesSet),
            Self::StateVariablesSet => Some(Self::InitialStateSet),
            Self::InitialStateSet => Some(Self::ActionsSet),
            Self::ActionsSet => Some(Self::GoalSet),
            Self::GoalSet => Some(Self::ConstraintsSet),
            Self::ConstraintsSet => None,
        }
    }

    /// True once every stage has run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::ConstraintsSet)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn field<'a, T>(slot: &'a Option<T>, name: &'static str) -> Result<&'a T, OrderingError> {
    slot.as_ref().ok_or(OrderingError::Uninitialized { field: name })
}

/// Write-once, ordered construction of a [`TaskIndex`].
///
/// # Example
/// ```rust,ignore
/// let mut builder = TaskIndexBuilder::new("blocks", "p01");
/// builder.process_types(["object", "block"])?;
/// builder.process_objects(&objects)?;
/// builder.process_symbols(&predicates, &functions, effect_heads)?;
/// // ...
/// let task = builder.finish()?;
/// ```
#[derive(Debug, Clone)]
pub struct TaskIndexBuilder {
    domain: String,
    instance: String,
    stage: Stage,
    types: Option<TypeIndex>,
    objects: Option<ObjectIndex>,
    symbols: Option<SymbolTable>,
    classification: Option<Classification>,
    state_variables: Option<Vec<StateVariable>>,
    initial_fluent_atoms: Option<Vec<FluentAtom>>,
    initial_static_data: Option<BTreeMap<String, StaticExtension>>,
    action_schemas: Option<Vec<serde_json::Value>>,
    goal: Option<serde_json::Value>,
    state_constraints: Option<serde_json::Value>,
}

impl TaskIndexBuilder {
    /// Creates an empty builder for the given domain and instance names.
    pub fn new(domain: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            instance: instance.into(),
            stage: Stage::Uninitialized,
            types: None,
            objects: None,
            symbols: None,
            classification: None,
            state_variables: None,
            initial_fluent_atoms: None,
            initial_static_data: None,
            action_schemas: None,
            goal: None,
            state_constraints: None,
        }
    }

    /// Last completed stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Checks that `target` is the next stage to run.
    fn check_stage(&self, target: Stage) -> Result<(), OrderingError> {
        if self.stage >= target {
            return Err(OrderingError::AlreadyCompleted {
                stage: target.name(),
            });
        }
        if self.stage.next() != Some(target) {
            let required = self.stage.next().unwrap_or(Stage::ConstraintsSet);
            return Err(OrderingError::OutOfOrder {
                stage: target.name(),
                required: required.name(),
            });
        }
        Ok(())
    }

    /// Assigns dense ids to the resolved type list.
    pub fn process_types<I, S>(&mut self, types: I) -> TaskResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_stage(Stage::TypesSet)?;
        let types = TypeIndex::new(types)?;
        debug!(types = types.len(), "indexed types");
        self.types = Some(types);
        self.stage = Stage::TypesSet;
        Ok(())
    }

    /// Indexes `false`, `true` and the declared objects.
    pub fn process_objects(&mut self, objects: &[ObjectDecl]) -> TaskResult<()> {
        self.check_stage(Stage::ObjectsSet)?;
        let index = ObjectIndex::new(objects, field(&self.types, "types")?)?;
        debug!(objects = index.len(), "indexed objects");
        self.objects = Some(index);
        self.stage = Stage::ObjectsSet;
        Ok(())
    }

    /// Builds the symbol table and classifies every symbol from the effect
    /// heads of all actions.
    pub fn process_symbols<'a, I>(
        &mut self,
        predicates: &[PredicateDecl],
        functions: &[FunctionDecl],
        effect_heads: I,
    ) -> TaskResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.check_stage(Stage::SymbolsSet)?;
        let symbols = SymbolTable::new(predicates, functions)?;
        let classification = Classification::new(&symbols, effect_heads);
        debug!(
            symbols = symbols.len(),
            fluent = classification.fluent_symbols().len(),
            r#static = classification.static_symbols().len(),
            "indexed symbols"
        );
        self.symbols = Some(symbols);
        self.classification = Some(classification);
        self.stage = Stage::SymbolsSet;
        Ok(())
    }

    /// Stores the externally enumerated state variables.
    ///
    /// Every variable must name a declared symbol and match its arity.
    pub fn process_state_variables(&mut self, variables: Vec<StateVariable>) -> TaskResult<()> {
        self.check_stage(Stage::StateVariablesSet)?;
        let symbols = field(&self.symbols, "symbols")?;
        for var in &variables {
            let symbol = symbols.get(&var.symbol).ok_or_else(|| ValidationError::UnknownSymbol {
                name: var.symbol.clone(),
            })?;
            if symbol.arity() != var.arguments.len() {
                return Err(ValidationError::ArityViolation {
                    symbol: var.symbol.clone(),
                    expected: symbol.arity(),
                    actual: var.arguments.len(),
                    tuple: crate::term::render_tuple(&var.arguments),
                    value: None,
                }
                .into());
            }
        }
        debug!(state_variables = variables.len(), "stored state variables");
        self.state_variables = Some(variables);
        self.stage = Stage::StateVariablesSet;
        Ok(())
    }

    /// Enumerates state variables through `source` and stores them.
    pub fn enumerate_state_variables(&mut self, source: &dyn StateVariableSource) -> TaskResult<()> {
        self.check_stage(Stage::StateVariablesSet)?;
        let variables = source.state_variables(&self.context()?)?;
        self.process_state_variables(variables)
    }

    /// Compiles the initial state. Nothing is stored unless every fact is
    /// valid.
    pub fn process_initial_state(
        &mut self,
        facts: &[InitFact],
        externals: &dyn ExternalSymbols,
    ) -> TaskResult<()> {
        self.check_stage(Stage::InitialStateSet)?;
        let state = InitialStateCompiler::new(
            field(&self.symbols, "symbols")?,
            field(&self.objects, "objects")?,
            field(&self.classification, "classification")?,
            externals,
        )
        .compile(facts)?;
        self.initial_fluent_atoms = Some(state.fluent_atoms);
        self.initial_static_data = Some(state.static_data);
        self.stage = Stage::InitialStateSet;
        Ok(())
    }

    /// Compiles every action schema through the schema compiler.
    pub fn process_actions(
        &mut self,
        actions: &[ActionDecl],
        compiler: &dyn SchemaCompiler,
    ) -> TaskResult<()> {
        self.check_stage(Stage::ActionsSet)?;
        let ctx = self.context()?;
        let schemas = actions
            .iter()
            .map(|a| compiler.compile_action(&ctx, a))
            .collect::<TaskResult<Vec<_>>>()?;
        debug!(actions = schemas.len(), "compiled action schemas");
        self.action_schemas = Some(schemas);
        self.stage = Stage::ActionsSet;
        Ok(())
    }

    /// Compiles the goal formula.
    pub fn process_goal(
        &mut self,
        goal: &serde_json::Value,
        compiler: &dyn SchemaCompiler,
    ) -> TaskResult<()> {
        self.check_stage(Stage::GoalSet)?;
        let goal = compiler.compile_formula(&self.context()?, goal)?;
        self.goal = Some(goal);
        self.stage = Stage::GoalSet;
        Ok(())
    }

    /// Compiles the state constraints formula.
    pub fn process_state_constraints(
        &mut self,
        constraints: &serde_json::Value,
        compiler: &dyn SchemaCompiler,
    ) -> TaskResult<()> {
        self.check_stage(Stage::ConstraintsSet)?;
        let constraints = compiler.compile_formula(&self.context()?, constraints)?;
        self.state_constraints = Some(constraints);
        self.stage = Stage::ConstraintsSet;
        Ok(())
    }

    /// Naming context for collaborators. Available once symbols are set.
    pub fn context(&self) -> Result<CompilationContext<'_>, OrderingError> {
        Ok(CompilationContext {
            types: field(&self.types, "types")?,
            objects: field(&self.objects, "objects")?,
            symbols: field(&self.symbols, "symbols")?,
            classification: field(&self.classification, "classification")?,
        })
    }

    /// Type index, once `process_types` has run.
    pub fn types(&self) -> Result<&TypeIndex, OrderingError> {
        field(&self.types, "types")
    }

    /// Object index, once `process_objects` has run.
    pub fn objects(&self) -> Result<&ObjectIndex, OrderingError> {
        field(&self.objects, "objects")
    }

    /// Symbol table, once `process_symbols` has run.
    pub fn symbols(&self) -> Result<&SymbolTable, OrderingError> {
        field(&self.symbols, "symbols")
    }

    /// Fluent/static classification, once `process_symbols` has run.
    pub fn classification(&self) -> Result<&Classification, OrderingError> {
        field(&self.classification, "classification")
    }

    /// True if `symbol` is fluent.
    pub fn is_fluent(&self, symbol: &str) -> Result<bool, OrderingError> {
        Ok(self.classification()?.is_fluent(symbol))
    }

    /// Enumerated state variables.
    pub fn state_variables(&self) -> Result<&[StateVariable], OrderingError> {
        field(&self.state_variables, "state_variables").map(Vec::as_slice)
    }

    /// Fluent atoms of the initial state.
    pub fn initial_fluent_atoms(&self) -> Result<&[FluentAtom], OrderingError> {
        field(&self.initial_fluent_atoms, "initial_fluent_atoms").map(Vec::as_slice)
    }

    /// Static extensions built from the initial state, keyed by symbol.
    pub fn initial_static_data(&self) -> Result<&BTreeMap<String, StaticExtension>, OrderingError> {
        field(&self.initial_static_data, "initial_static_data")
    }

    /// Compiled action schemas.
    pub fn action_schemas(&self) -> Result<&[serde_json::Value], OrderingError> {
        field(&self.action_schemas, "action_schemas").map(Vec::as_slice)
    }

    /// Compiled goal.
    pub fn goal(&self) -> Result<&serde_json::Value, OrderingError> {
        field(&self.goal, "goal")
    }

    /// Compiled state constraints.
    pub fn state_constraints(&self) -> Result<&serde_json::Value, OrderingError> {
        field(&self.state_constraints, "state_constraints")
    }

    /// Produces the immutable task index.
    ///
    /// Returns `OrderingError::Incomplete` naming the first stage that has
    /// not run.
    pub fn finish(self) -> Result<TaskIndex, OrderingError> {
        if let Some(pending) = self.stage.next() {
            return Err(OrderingError::Incomplete {
                pending: pending.name(),
            });
        }
        let incomplete = |field: &'static str| OrderingError::Uninitialized { field };
        Ok(TaskIndex {
            domain: self.domain,
            instance: self.instance,
            types: self.types.ok_or_else(|| incomplete("types"))?,
            objects: self.objects.ok_or_else(|| incomplete("objects"))?,
            symbols: self.symbols.ok_or_else(|| incomplete("symbols"))?,
            classification: self.classification.ok_or_else(|| incomplete("classification"))?,
            state_variables: self.state_variables.ok_or_else(|| incomplete("state_variables"))?,
            initial_fluent_atoms: self
                .initial_fluent_atoms
                .ok_or_else(|| incomplete("initial_fluent_atoms"))?,
            initial_static_data: self
                .initial_static_data
                .ok_or_else(|| incomplete("initial_static_data"))?,
            action_schemas: self.action_schemas.ok_or_else(|| incomplete("action_schemas"))?,
            goal: self.goal.ok_or_else(|| incomplete("goal"))?,
            state_constraints: self
                .state_constraints
                .ok_or_else(|| incomplete("state_constraints"))?,
        })
    }
}

/// The fully populated, immutable index of one planning task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskIndex {
    domain: String,
    instance: String,
    types: TypeIndex,
    objects: ObjectIndex,
    symbols: SymbolTable,
    classification: Classification,
    state_variables: Vec<StateVariable>,
    initial_fluent_atoms: Vec<FluentAtom>,
    initial_static_data: BTreeMap<String, StaticExtension>,
    action_schemas: Vec<serde_json::Value>,
    goal: serde_json::Value,
    state_constraints: serde_json::Value,
}

impl TaskIndex {
    /// Domain name.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Instance name.
    #[must_use]
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Type index.
    #[must_use]
    pub const fn types(&self) -> &TypeIndex {
        &self.types
    }

    /// Object index.
    #[must_use]
    pub const fn objects(&self) -> &ObjectIndex {
        &self.objects
    }

    /// Symbol table.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Fluent/static classification.
    #[must_use]
    pub const fn classification(&self) -> &Classification {
        &self.classification
    }

    /// True if `symbol` is fluent.
    #[must_use]
    pub fn is_fluent(&self, symbol: &str) -> bool {
        self.classification.is_fluent(symbol)
    }

    /// Every state variable.
    #[must_use]
    pub fn state_variables(&self) -> &[StateVariable] {
        &self.state_variables
    }

    /// Fluent atoms of the initial state.
    #[must_use]
    pub fn initial_fluent_atoms(&self) -> &[FluentAtom] {
        &self.initial_fluent_atoms
    }

    /// Static extensions keyed by symbol.
    #[must_use]
    pub const fn initial_static_data(&self) -> &BTreeMap<String, StaticExtension> {
        &self.initial_static_data
    }

    /// Compiled action schemas.
    #[must_use]
    pub fn action_schemas(&self) -> &[serde_json::Value] {
        &self.action_schemas
    }

    /// Compiled goal.
    #[must_use]
    pub const fn goal(&self) -> &serde_json::Value {
        &self.goal
    }

    /// Compiled state constraints.
    #[must_use]
    pub const fn state_constraints(&self) -> &serde_json::Value {
        &self.state_constraints
    }

    /// Naming context, as seen by collaborators during construction.
    #[must_use]
    pub const fn context(&self) -> CompilationContext<'_> {
        CompilationContext {
            types: &self.types,
            objects: &self.objects,
            symbols: &self.symbols,
            classification: &self.classification,
        }
    }

    /// Serializes the static extensions for the native runtime.
    pub fn exchange(&self, data_extension: &str) -> Result<ExchangeBundle, ValidationError> {
        ExchangeBundle::build(&self.initial_static_data, &self.objects, data_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoExternalSymbols;
    use crate::error::TaskError;
    use crate::term::Term;

    struct Echo;

    impl SchemaCompiler for Echo {
        fn compile_action(
            &self,
            _ctx: &CompilationContext<'_>,
            action: &ActionDecl,
        ) -> TaskResult<serde_json::Value> {
            Ok(serde_json::json!({ "name": action.name }))
        }

        fn compile_formula(
            &self,
            _ctx: &CompilationContext<'_>,
            formula: &serde_json::Value,
        ) -> TaskResult<serde_json::Value> {
            Ok(formula.clone())
        }
    }

    fn through_symbols() -> TaskIndexBuilder {
        let mut b = TaskIndexBuilder::new("blocks", "p01");
        b.process_types(["object", "block"]).unwrap();
        b.process_objects(&[ObjectDecl::new("b1", "block"), ObjectDecl::new("b2", "block")])
            .unwrap();
        b.process_symbols(
            &[
                PredicateDecl::new("on", ["block", "block"]),
                PredicateDecl::new("clear", ["block"]),
            ],
            &[],
            ["on"],
        )
        .unwrap();
        b
    }

    #[test]
    fn test_stage_sequence() {
        assert_eq!(Stage::Uninitialized.next(), Some(Stage::TypesSet));
        assert_eq!(Stage::GoalSet.next(), Some(Stage::ConstraintsSet));
        assert!(Stage::ConstraintsSet.is_terminal());
        assert_eq!(Stage::StateVariablesSet.to_string(), "state_variables");
    }

    #[test]
    fn test_access_before_initialization() {
        let b = TaskIndexBuilder::new("d", "i");
        assert_eq!(
            b.objects().unwrap_err(),
            OrderingError::Uninitialized { field: "objects" }
        );
        assert!(b.is_fluent("on").is_err());
        assert!(b.context().is_err());
    }

    #[test]
    fn test_out_of_order_stage_rejected() {
        let mut b = TaskIndexBuilder::new("d", "i");
        let err = b.process_objects(&[]).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Ordering(OrderingError::OutOfOrder { stage: "objects", required: "types" })
        ));
        assert_eq!(b.stage(), Stage::Uninitialized);
    }

    #[test]
    fn test_stage_cannot_rerun() {
        let mut b = TaskIndexBuilder::new("d", "i");
        b.process_types(["object"]).unwrap();
        let err = b.process_types(["object"]).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Ordering(OrderingError::AlreadyCompleted { stage: "types" })
        ));
    }

    #[test]
    fn test_failed_stage_does_not_advance() {
        let mut b = through_symbols();
        let err = b
            .process_state_variables(vec![StateVariable::new("holding", vec![])])
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(b.stage(), Stage::SymbolsSet);
        assert!(b.state_variables().is_err());
    }

    #[test]
    fn test_state_variable_arity_checked() {
        let mut b = through_symbols();
        let err = b
            .process_state_variables(vec![StateVariable::new("on", vec![Term::from("b1")])])
            .unwrap_err();
        assert!(matches!(
            err,
            TaskError::Validation(ValidationError::ArityViolation { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_failed_initial_state_leaves_no_trace() {
        let mut b = through_symbols();
        b.process_state_variables(vec![]).unwrap();
        let err = b
            .process_initial_state(
                &[InitFact::atom("on", ["b1", "b2"]), InitFact::atom("holding", ["b1"])],
                &NoExternalSymbols,
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert!(b.initial_fluent_atoms().is_err());
        assert!(b.initial_static_data().is_err());
        assert_eq!(b.stage(), Stage::StateVariablesSet);
    }

    #[test]
    fn test_full_construction() {
        let mut b = through_symbols();
        b.process_state_variables(vec![StateVariable::new(
            "on",
            vec![Term::from("b1"), Term::from("b2")],
        )])
        .unwrap();
        b.process_initial_state(
            &[InitFact::atom("on", ["b1", "b2"]), InitFact::atom("clear", ["b1"])],
            &NoExternalSymbols,
        )
        .unwrap();
        b.process_actions(&[ActionDecl::new("stack", Vec::new())], &Echo).unwrap();
        b.process_goal(&serde_json::json!({"atom": "on"}), &Echo).unwrap();

        assert!(matches!(
            b.clone().finish(),
            Err(OrderingError::Incomplete { pending: "constraints" })
        ));

        b.process_state_constraints(&serde_json::Value::Null, &Echo).unwrap();
        let task = b.finish().unwrap();

        assert_eq!(task.domain(), "blocks");
        assert!(task.is_fluent("on"));
        assert_eq!(task.initial_fluent_atoms().len(), 1);
        assert_eq!(task.initial_static_data().len(), 1);
        assert_eq!(task.action_schemas(), [serde_json::json!({"name": "stack"})]);
        assert_eq!(task.goal(), &serde_json::json!({"atom": "on"}));
        assert!(task.state_constraints().is_null());
        assert!(task.context().is_static("clear"));
    }
}
