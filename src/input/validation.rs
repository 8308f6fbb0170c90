//! Structural validation of parser output.
//!
//! Indexing assumes well-formed names. The parser normally guarantees this,
//! but records may also arrive as JSON from elsewhere, so they are checked
//! before the first stage runs.

use crate::error::ValidationError;
use crate::input::{ActionDecl, FunctionDecl, InitFact, ObjectDecl, ParsedTask, PredicateDecl};

/// Upper bound for any declared name.
pub const MAX_NAME_LEN: usize = 1024;

/// Upper bound on declared argument counts. This is far above what the
/// static extension model supports; it only guards against garbage input.
pub const MAX_ARGUMENTS: usize = 64;

fn validate_name(field: &str, value: &str) -> Result<(), ValidationError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ValidationError::MissingField {
            field: field.to_string(),
        });
    }
    if v.len() > MAX_NAME_LEN {
        return Err(ValidationError::FieldTooLong {
            field: field.to_string(),
            max_length: MAX_NAME_LEN,
        });
    }
    Ok(())
}

fn validate_arguments(field: &str, arguments: &[String]) -> Result<(), ValidationError> {
    if arguments.len() > MAX_ARGUMENTS {
        return Err(ValidationError::FieldTooLong {
            field: field.to_string(),
            max_length: MAX_ARGUMENTS,
        });
    }
    for a in arguments {
        validate_name(field, a)?;
    }
    Ok(())
}

impl ObjectDecl {
    /// Validates this declaration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("object.name", &self.name)?;
        validate_name("object.type", &self.type_name)?;
        Ok(())
    }
}

impl PredicateDecl {
    /// Validates this declaration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("predicate.name", &self.name)?;
        validate_arguments("predicate.arguments", &self.arguments)?;
        Ok(())
    }
}

impl FunctionDecl {
    /// Validates this declaration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("function.name", &self.name)?;
        validate_arguments("function.arguments", &self.arguments)?;
        validate_name("function.return_type", &self.return_type)?;
        Ok(())
    }
}

impl ActionDecl {
    /// Validates this declaration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("action.name", &self.name)?;
        for effect in &self.effects {
            validate_name("action.effects.symbol", &effect.symbol)?;
        }
        Ok(())
    }
}

impl InitFact {
    /// Validates this fact's shape. Symbol resolution happens later, against
    /// the symbol table.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("init.symbol", self.symbol())?;
        validate_arguments("init.arguments", self.arguments())?;
        Ok(())
    }
}

impl ParsedTask {
    /// Validates every record of the task.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name("domain", &self.domain)?;
        validate_name("instance", &self.instance)?;
        for t in &self.types {
            validate_name("types", t)?;
        }
        self.objects.iter().try_for_each(ObjectDecl::validate)?;
        self.predicates.iter().try_for_each(PredicateDecl::validate)?;
        self.functions.iter().try_for_each(FunctionDecl::validate)?;
        self.actions.iter().try_for_each(ActionDecl::validate)?;
        self.init.iter().try_for_each(InitFact::validate)?;
        Ok(())
    }
}
