//! Task index serialization helpers.
//!
//! A finished [`TaskIndex`] is plain data. These helpers keep its JSON form
//! stable for tools that inspect or cache compiled tasks.

use crate::error::TaskError;
use crate::task::TaskIndex;

/// Serialize a task index to pretty JSON.
pub fn to_json_pretty(task: &TaskIndex) -> Result<String, TaskError> {
    serde_json::to_string_pretty(task)
        .map_err(|e| TaskError::internal(format!("serialize task index: {e}")))
}

/// Deserialize a task index from JSON.
///
/// Static extensions are revalidated while decoding, so a document with an
/// unsupported arity or a mistyped element is rejected.
pub fn from_json(s: &str) -> Result<TaskIndex, TaskError> {
    serde_json::from_str::<TaskIndex>(s)
        .map_err(|e| TaskError::internal(format!("deserialize task index: {e}")))
}
