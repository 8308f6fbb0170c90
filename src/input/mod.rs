//! Parsed domain/problem records handed over by the external parser.
//!
//! These are plain serde records: the grammar front-end can produce them
//! directly or ship them as JSON. Nothing here is indexed yet; the
//! [`crate::task`] stages turn them into the task index.

mod validation;

use serde::{Deserialize, Serialize};

pub use validation::{MAX_ARGUMENTS, MAX_NAME_LEN};

/// Name of the bookkeeping function the grammar introduces for action costs.
pub const TOTAL_COST: &str = "total-cost";

/// Name of the built-in equality predicate.
pub const EQUALITY: &str = "=";

/// A declared object and its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDecl {
    /// Object name.
    pub name: String,
    /// Declared type name.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ObjectDecl {
    /// Creates an object declaration.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A predicate declaration: name plus ordered argument types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateDecl {
    /// Predicate name.
    pub name: String,
    /// Argument type names.
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl PredicateDecl {
    /// Creates a predicate declaration.
    pub fn new<S: Into<String>>(name: impl Into<String>, arguments: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
        }
    }
}

/// A function declaration: name, ordered argument types and return type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Function name.
    pub name: String,
    /// Argument type names.
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Return type: `number` or an object type.
    pub return_type: String,
}

impl FunctionDecl {
    /// Creates a function declaration.
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        arguments: impl IntoIterator<Item = S>,
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            return_type: return_type.into(),
        }
    }
}

/// One effect of an action schema. Only the head symbol matters here; the
/// rest is handed to the schema compiler untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDecl {
    /// Head symbol of the effect.
    pub symbol: String,
    /// Remaining effect structure, opaque here.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub body: serde_json::Value,
}

impl EffectDecl {
    /// An effect on `symbol` with an empty body.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            body: serde_json::Value::Null,
        }
    }
}

/// An action schema as produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDecl {
    /// Action name.
    pub name: String,
    /// Effects of the action.
    #[serde(default)]
    pub effects: Vec<EffectDecl>,
    /// Parameters, precondition and anything else the schema compiler needs.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub body: serde_json::Value,
}

impl ActionDecl {
    /// Creates an action with the given effects and an empty body.
    pub fn new(name: impl Into<String>, effects: impl IntoIterator<Item = EffectDecl>) -> Self {
        Self {
            name: name.into(),
            effects: effects.into_iter().collect(),
            body: serde_json::Value::Null,
        }
    }

    /// Head symbols of all effects of this action.
    pub fn effect_heads(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().map(|e| e.symbol.as_str())
    }
}

/// Right-hand side of an initial assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ValueExpr {
    /// Numeric literal.
    Number(i64),
    /// Object name.
    Symbol(String),
}

/// A ground fact of the initial state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitFact {
    /// Predicate atom, possibly negated.
    Atom {
        /// Predicate name.
        predicate: String,
        /// Raw argument strings.
        #[serde(default)]
        arguments: Vec<String>,
        /// Whether the atom is negated.
        #[serde(default)]
        negated: bool,
    },
    /// Function assignment.
    Assign {
        /// Function name.
        function: String,
        /// Raw argument strings.
        #[serde(default)]
        arguments: Vec<String>,
        /// Assigned value.
        value: ValueExpr,
    },
}

impl InitFact {
    /// A positive ground atom.
    pub fn atom<S: Into<String>>(predicate: impl Into<String>, arguments: impl IntoIterator<Item = S>) -> Self {
        Self::Atom {
            predicate: predicate.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    /// A negated ground atom. Never valid in an initial state.
    pub fn negated_atom<S: Into<String>>(
        predicate: impl Into<String>,
        arguments: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::Atom {
            predicate: predicate.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    /// A ground assignment `function(arguments) = value`.
    pub fn assign<S: Into<String>>(
        function: impl Into<String>,
        arguments: impl IntoIterator<Item = S>,
        value: ValueExpr,
    ) -> Self {
        Self::Assign {
            function: function.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            value,
        }
    }

    /// The symbol this fact talks about.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Atom { predicate, .. } => predicate,
            Self::Assign { function, .. } => function,
        }
    }

    /// Raw argument strings of this fact.
    pub fn arguments(&self) -> &[String] {
        match self {
            Self::Atom { arguments, .. } | Self::Assign { arguments, .. } => arguments,
        }
    }
}

/// Complete parser output for one planning instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTask {
    /// Domain name.
    pub domain: String,
    /// Instance name.
    pub instance: String,
    /// Type names, already resolved into a flat list by the type collaborator.
    pub types: Vec<String>,
    /// Declared objects, in order.
    #[serde(default)]
    pub objects: Vec<ObjectDecl>,
    /// Predicate declarations.
    #[serde(default)]
    pub predicates: Vec<PredicateDecl>,
    /// Function declarations.
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    /// Action schemas.
    #[serde(default)]
    pub actions: Vec<ActionDecl>,
    /// Initial facts.
    #[serde(default)]
    pub init: Vec<InitFact>,
    /// Goal formula, opaque here.
    #[serde(default)]
    pub goal: serde_json::Value,
    /// State constraints formula, opaque here.
    #[serde(default)]
    pub constraints: serde_json::Value,
}

impl ParsedTask {
    /// Head symbols of every effect of every action.
    pub fn effect_heads(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().flat_map(|a| a.effect_heads())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_fact_accessors() {
        let fact = InitFact::atom("on", ["b1", "b2"]);
        assert_eq!(fact.symbol(), "on");
        assert_eq!(fact.arguments(), ["b1", "b2"]);

        let fact = InitFact::assign("weight", ["b1"], ValueExpr::Number(3));
        assert_eq!(fact.symbol(), "weight");
        assert_eq!(fact.arguments(), ["b1"]);
    }

    #[test]
    fn test_effect_heads_flatten_actions() {
        let task = ParsedTask {
            domain: "blocks".to_string(),
            instance: "p01".to_string(),
            types: vec!["object".to_string()],
            objects: vec![],
            predicates: vec![],
            functions: vec![],
            actions: vec![
                ActionDecl::new("stack", [EffectDecl::new("on"), EffectDecl::new("clear")]),
                ActionDecl::new("unstack", [EffectDecl::new("holding")]),
            ],
            init: vec![],
            goal: serde_json::Value::Null,
            constraints: serde_json::Value::Null,
        };
        let heads: Vec<&str> = task.effect_heads().collect();
        assert_eq!(heads, vec!["on", "clear", "holding"]);
    }

    #[test]
    fn test_deserialize_parsed_task() {
        let json = r#"{
            "domain": "blocks",
            "instance": "p01",
            "types": ["object", "block"],
            "objects": [{"name": "b1", "type": "block"}],
            "predicates": [{"name": "on", "arguments": ["block", "block"]}],
            "functions": [{"name": "total-cost", "return_type": "number"}],
            "actions": [{"name": "stack", "effects": [{"symbol": "on"}]}],
            "init": [
                {"kind": "atom", "predicate": "on", "arguments": ["b1", "b1"]},
                {"kind": "assign", "function": "total-cost", "value": {"type": "number", "value": 0}}
            ]
        }"#;
        let task: ParsedTask = serde_json::from_str(json).unwrap();
        assert_eq!(task.objects[0], ObjectDecl::new("b1", "block"));
        assert_eq!(task.functions[0].arguments.len(), 0);
        assert_eq!(task.init.len(), 2);
        assert!(matches!(task.init[0], InitFact::Atom { negated: false, .. }));
        assert!(task.goal.is_null());
    }
}
