//! Interpreter-internal errors.
//!
//! These are failures of the evaluator itself, not of the evaluated
//! program: unsupported IR shapes, missing intrinsic bindings, missing
//! method implementations, and the command budget. They are never
//! catchable from evaluated code; they surface directly as an error
//! result at the outermost call.
//!
//! Source-language exceptions live in `exceptions` and travel through
//! `Interrupt::Exception` instead.

use std::fmt;

/// An interpreter-internal error with enough context to debug the
/// interpreter, not the evaluated program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalError {
    message: String,
}

impl InternalError {
    pub fn new(message: impl Into<String>) -> Self {
        InternalError {
            message: message.into(),
        }
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interpreter error: {}", self.message)
    }
}

impl std::error::Error for InternalError {}

/// Evaluation reached an IR node the walker does not support.
#[cold]
pub fn unsupported_node(kind: &str) -> InternalError {
    InternalError::new(format!("unsupported IR node: {kind}"))
}

/// A function that should have a body does not.
#[cold]
pub fn missing_body(name: &str) -> InternalError {
    InternalError::new(format!("no body for function '{name}'"))
}

/// An abstract member had no concrete implementation on the runtime class.
#[cold]
pub fn missing_implementation(name: &str, class: &str) -> InternalError {
    InternalError::new(format!("no implementation of '{name}' on class {class}"))
}

/// A class marked intrinsic had no host binding for the member.
#[cold]
pub fn missing_intrinsic(key: &str, member: &str) -> InternalError {
    InternalError::new(format!("no intrinsic binding for {key}.{member}"))
}

/// A body-less function matched no built-in signature.
#[cold]
pub fn missing_builtin(name: &str, signature: &[&str]) -> InternalError {
    InternalError::new(format!(
        "no builtin for '{name}' with signature ({})",
        signature.join(", ")
    ))
}

/// A built-in signature had an arity outside the supported 1..=3 range.
#[cold]
pub fn bad_builtin_arity(name: &str, arity: usize) -> InternalError {
    InternalError::new(format!("builtin '{name}' has impossible arity {arity}"))
}

/// The command counter reached its limit.
#[cold]
pub fn timeout(limit: u32) -> InternalError {
    InternalError::new(format!("command limit of {limit} exceeded"))
}

/// A variable was read before any binding was visible.
#[cold]
pub fn undefined_variable(name: &str) -> InternalError {
    InternalError::new(format!("undefined variable '{name}'"))
}

/// A variable was read after declaration but before initialization.
#[cold]
pub fn uninitialized_variable(name: &str) -> InternalError {
    InternalError::new(format!("variable '{name}' read before initialization"))
}

/// A field slot was read before any initializer or assignment wrote it.
#[cold]
pub fn uninitialized_field(name: &str) -> InternalError {
    InternalError::new(format!("field '{name}' read before initialization"))
}

/// A call supplied more arguments than the target declares.
#[cold]
pub fn argument_mismatch(name: &str, expected: usize, got: usize) -> InternalError {
    InternalError::new(format!(
        "'{name}' declares {expected} parameter(s), call supplied {got}"
    ))
}

/// A required argument was neither supplied nor defaulted.
#[cold]
pub fn missing_argument(name: &str, index: usize) -> InternalError {
    InternalError::new(format!("missing argument {index} for '{name}'"))
}

/// A delegating constructor call was evaluated outside a constructor body.
#[cold]
pub fn delegation_outside_constructor() -> InternalError {
    InternalError::new("delegating call outside a constructor body")
}

/// An enum super-constructor ran without a pending enum entry.
#[cold]
pub fn enum_delegation_without_entry(class: &str) -> InternalError {
    InternalError::new(format!(
        "enum super delegation for {class} without a pending entry"
    ))
}

/// A `GetEnumValue` referenced an entry the class does not declare.
#[cold]
pub fn unknown_enum_entry(class: &str, entry: &str) -> InternalError {
    InternalError::new(format!("enum class {class} has no entry {entry}"))
}

/// The evaluation result cannot be represented as an IR constant.
#[cold]
pub fn unrepresentable_result(type_name: &str) -> InternalError {
    InternalError::new(format!("result of type {type_name} is not a constant"))
}

/// A non-exception value reached a `throw`.
#[cold]
pub fn throw_of_non_exception(type_name: &str) -> InternalError {
    InternalError::new(format!("throw of non-exception value of type {type_name}"))
}

/// A spread operator was applied to a non-array value.
#[cold]
pub fn spread_of_non_array(type_name: &str) -> InternalError {
    InternalError::new(format!("spread of non-array value of type {type_name}"))
}

/// A control-flow signal escaped the expression it belongs to.
#[cold]
pub fn loose_control_flow(kind: &str) -> InternalError {
    InternalError::new(format!("loose {kind} signal escaped to the top level"))
}
