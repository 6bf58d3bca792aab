// ISLISP Conditions
//
// The typed error values operations return. Handler search and unwinding
// belong to the evaluator; this module only builds the values and maps each
// onto its condition class.

use crate::ilos::{BuiltInClass, Class};
use crate::streams::StreamId;
use crate::types::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Condition {
    /// A value is not an instance of the class an operation requires.
    #[error("domain error: {object:?} is not an instance of {expected}")]
    DomainError { object: Value, expected: Class },
    /// Wrong number of positional or optional arguments.
    #[error("arity error")]
    ArityError,
    /// An index, or the number of indices, does not fit the array's shape.
    #[error("index out of range")]
    IndexOutOfRange,
    #[error("stream error on stream {}", .stream.0)]
    StreamError { stream: StreamId },
    #[error("end of stream on stream {}", .stream.0)]
    EndOfStream { stream: StreamId },
    /// An allocation could not be satisfied. Retrying will not help.
    #[error("storage exhausted: cannot allocate {requested} elements")]
    StorageExhausted { requested: usize },
}

impl Condition {
    pub fn domain_error(object: &Value, expected: impl Into<Class>) -> Self {
        Condition::DomainError {
            object: object.clone(),
            expected: expected.into(),
        }
    }

    /// The condition class handlers match against.
    pub fn class(&self) -> BuiltInClass {
        match self {
            Condition::DomainError { .. } => BuiltInClass::DomainError,
            Condition::ArityError => BuiltInClass::ArityError,
            Condition::IndexOutOfRange => BuiltInClass::IndexOutOfRange,
            Condition::StreamError { .. } => BuiltInClass::StreamError,
            Condition::EndOfStream { .. } => BuiltInClass::EndOfStream,
            Condition::StorageExhausted { .. } => BuiltInClass::StorageExhausted,
        }
    }
}

/// Result of every operation in the core
pub type EvalResult = Result<Value, Condition>;
