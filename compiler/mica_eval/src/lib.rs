//! Mica Eval - Compile-time evaluator for Mica IR.
//!
//! A tree-walking interpreter that constant-folds IR expressions, including
//! expressions over classes, enums, arrays, lambdas, and exceptions. Given
//! an expression rooted in a resolved `IrModule`, `Interpreter::interpret`
//! yields either a reduced constant or a formatted error description ready
//! to be materialized as an IR error expression.
//!
//! # Architecture
//!
//! - `Value`: the runtime value model (primitive, host-wrapped, user object,
//!   lambda, exception)
//! - `FrameStack`: call frames, sub-frames, and the stack-trace list
//! - `ExecResult`: the control-flow signal threaded through every step
//! - `builtins`: signature-keyed tables for primitive operations
//! - `intrinsics`: host-backed classes (regex, string builder, arrays,
//!   unsigned integers)
//! - `Interpreter`: the walker itself
//!
//! Evaluation is single-threaded and bounded: a command counter and a stack
//! depth cap terminate pathological inputs. One evaluator instance serves
//! one evaluation at a time; the built-in tables are immutable and shared.

pub mod builtins;
pub mod errors;
mod exceptions;
mod frame;
mod interpreter;
mod intrinsics;
mod signal;
mod stack;
mod value;

#[cfg(test)]
mod tests;

pub use exceptions::ExceptionValue;
pub use frame::{Frame, FrameKind, FrameStack, Lookup};
pub use interpreter::{FoldResult, Interpreter, Limits};
pub use signal::{ExecResult, Interrupt};
pub use stack::ensure_sufficient_stack;
pub use value::{HostValue, LambdaValue, ObjRef, ObjectData, Primitive, RegexHost, Value};
