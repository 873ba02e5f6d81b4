//! The control-flow signal threaded through every evaluation step.
//!
//! `Ok(value)` is sequential continuation with the value in the return
//! register. Everything else travels as an `Interrupt` through the error
//! channel, so `?` is the "run the child, propagate anything that is not
//! plain continuation" combinator used throughout the walker.

use mica_ir::{FunId, Name};

use crate::errors::InternalError;
use crate::exceptions::ExceptionValue;
use crate::value::Value;

/// Result of one evaluation step.
pub type ExecResult = Result<Value, Interrupt>;

/// A non-sequential outcome of an evaluation step.
///
/// Propagated unchanged through intermediate nodes until a construct
/// intercepts it: loops intercept `Break`/`Continue`, function invocation
/// intercepts `Return` for its own target, the `when` scan intercepts
/// `BreakWhen`, and `try` intercepts `Exception`. `Fault` is never
/// intercepted by evaluated code.
#[derive(Clone, Debug)]
pub enum Interrupt {
    /// Return from the function identified by `target`.
    Return { target: FunId, value: Value },
    /// Exit the enclosing loop carrying the optional loop label.
    Break { label: Option<Name> },
    /// Next iteration of the enclosing loop.
    Continue { label: Option<Name> },
    /// Local signal ending the branch scan of a `when`; never escapes it.
    BreakWhen { value: Value },
    /// A thrown source-language exception.
    Exception(ExceptionValue),
    /// An interpreter-internal error; not catchable by evaluated code.
    Fault(InternalError),
}

impl Interrupt {
    /// Short label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Interrupt::Return { .. } => "return",
            Interrupt::Break { .. } => "break",
            Interrupt::Continue { .. } => "continue",
            Interrupt::BreakWhen { .. } => "when-exit",
            Interrupt::Exception(_) => "exception",
            Interrupt::Fault(_) => "fault",
        }
    }
}

impl From<InternalError> for Interrupt {
    fn from(err: InternalError) -> Self {
        Interrupt::Fault(err)
    }
}

impl From<ExceptionValue> for Interrupt {
    fn from(exc: ExceptionValue) -> Self {
        Interrupt::Exception(exc)
    }
}

/// Whether a loop jump label targets the loop labeled `own`.
///
/// An unlabeled jump targets the innermost loop; a labeled jump targets
/// the loop carrying the same label.
pub fn targets_loop(jump: &Option<Name>, own: &Option<Name>) -> bool {
    match jump {
        None => true,
        Some(label) => own.as_ref() == Some(label),
    }
}
