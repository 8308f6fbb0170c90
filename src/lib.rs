//! # taskindex - Planning Task Front-End Compiler
//!
//! taskindex turns a parsed planning task (types, objects, predicates,
//! functions, actions, initial facts, goal) into the indexed form a native
//! search runtime consumes.
//!
//! ## Core Concepts
//!
//! - **Object index**: dense integer ids, with `false` = 0 and `true` = 1
//! - **Classification**: a symbol is fluent iff some action effect changes it
//! - **Initial state**: fluent facts become initial atoms, static facts
//!   become static extensions
//! - **Static extension**: a set (predicate) or map (function) of ground
//!   tuples, exported as integer records plus a native declaration
//! - **Task index**: the immutable result of staged, ordered construction
//!
//! ## Usage
//!
//! ```rust,ignore
//! use taskindex::{compile_task, CompilerConfig, NativeEmitter, StaticData};
//!
//! let config = CompilerConfig::default();
//! let task = compile_task(&parsed, &schemas, &state_vars, &config)?;
//!
//! let bundle = task.exchange(&config.data_extension)?;
//! bundle.write_to(&data_dir)?;
//! let native = StaticData::render(&bundle, &NativeEmitter);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Inputs and naming
pub mod error;
pub mod input;
pub mod term;
pub mod index;
pub mod classify;

// Initial state and static data
pub mod init;
pub mod extension;
pub mod exchange;
pub mod codegen;

// Orchestration
pub mod config;
pub mod task;
pub mod pipeline;

// Re-export primary types at crate root for convenience
pub use classify::Classification;
pub use codegen::{Emitter, NativeEmitter, StaticData};
pub use config::{CompilerConfig, ExternalPattern, ExternalSymbols, NoExternalSymbols};
pub use error::{
    CapabilityError, ConfigError, OrderingError, TaskError, TaskResult, ValidationError,
};
pub use exchange::{ExchangeBundle, ExchangeFile};
pub use extension::{ExtensionDescriptor, ExtensionKind, ExtensionShape, StaticExtension};
pub use index::{ObjectId, ObjectIndex, Symbol, SymbolId, SymbolTable, TypeId, TypeIndex};
pub use init::{FluentAtom, InitialState, InitialStateCompiler};
pub use input::{
    ActionDecl, EffectDecl, FunctionDecl, InitFact, ObjectDecl, ParsedTask, PredicateDecl,
    ValueExpr,
};
pub use pipeline::compile_task;
pub use task::{
    CompilationContext, SchemaCompiler, Stage, StateVariable, StateVariableSource, TaskIndex,
    TaskIndexBuilder,
};
pub use term::{Term, Tuple};
