//! One-call compilation of a parsed task.

use tracing::info;

use crate::config::CompilerConfig;
use crate::error::TaskResult;
use crate::input::ParsedTask;
use crate::task::{SchemaCompiler, StateVariableSource, TaskIndex, TaskIndexBuilder};

/// Validates `parsed` and runs every construction stage in order.
///
/// Stops at the first error; no partially built index escapes.
pub fn compile_task(
    parsed: &ParsedTask,
    schemas: &dyn SchemaCompiler,
    state_variables: &dyn StateVariableSource,
    config: &CompilerConfig,
) -> TaskResult<TaskIndex> {
    config.validate()?;
    parsed.validate()?;
    let externals = config.external_symbols()?;

    let mut builder = TaskIndexBuilder::new(&parsed.domain, &parsed.instance);
    builder.process_types(&parsed.types)?;
    builder.process_objects(&parsed.objects)?;
    builder.process_symbols(&parsed.predicates, &parsed.functions, parsed.effect_heads())?;
    builder.enumerate_state_variables(state_variables)?;
    builder.process_initial_state(&parsed.init, &externals)?;
    builder.process_actions(&parsed.actions, schemas)?;
    builder.process_goal(&parsed.goal, schemas)?;
    builder.process_state_constraints(&parsed.constraints, schemas)?;
    let task = builder.finish()?;

    info!(
        domain = %task.domain(),
        instance = %task.instance(),
        objects = task.objects().len(),
        fluent_atoms = task.initial_fluent_atoms().len(),
        static_extensions = task.initial_static_data().len(),
        "compiled task"
    );
    Ok(task)
}
