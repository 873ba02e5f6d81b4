//! Source-language exception state.
//!
//! A thrown value carries its IR class, message, optional cause chain, and
//! the stack trace frozen when it was first raised. Host-side failures
//! (arithmetic, bad regex patterns, index errors) are projected into the
//! matching IR exception class through the constructors below.

use mica_ir::{ClassId, IrModule};

/// A thrown exception value.
#[derive(Clone, Debug)]
pub struct ExceptionValue {
    /// The IR class of the exception; catch matching is by subtype.
    pub class: ClassId,
    pub message: Option<String>,
    pub cause: Option<Box<ExceptionValue>>,
    /// Formatted frame lines, frozen at the throw site. Immutable once set.
    pub trace: Vec<String>,
}

impl ExceptionValue {
    pub fn new(class: ClassId, message: Option<String>) -> Self {
        ExceptionValue {
            class,
            message,
            cause: None,
            trace: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: ExceptionValue) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Freeze the stack trace if it has not been captured yet.
    pub fn capture_trace(&mut self, frames: &[String]) {
        if self.trace.is_empty() {
            // Most recent call first.
            self.trace = frames.iter().rev().cloned().collect();
        }
    }

    /// Simple name of the exception class.
    pub fn class_name<'m>(&self, module: &'m IrModule) -> &'m str {
        module.name(module.class(self.class).name)
    }

    /// Format the full description: class name, message, frame lines, and
    /// the cause chain.
    ///
    /// ```text
    /// ArithmeticException: / by zero
    ///     at MainKt.divide(Main.mica:4)
    ///     at MainKt.entry(Main.mica:9)
    /// Caused by: IllegalStateException: broken
    /// ```
    pub fn describe(&self, module: &IrModule) -> String {
        let mut out = String::new();
        self.describe_into(module, &mut out);
        out
    }

    fn describe_into(&self, module: &IrModule, out: &mut String) {
        out.push_str(self.class_name(module));
        if let Some(message) = &self.message {
            out.push_str(": ");
            out.push_str(message);
        }
        for frame in &self.trace {
            out.push_str("\n\t");
            out.push_str(frame);
        }
        if let Some(cause) = &self.cause {
            out.push_str("\nCaused by: ");
            cause.describe_into(module, out);
        }
    }
}

// Projections of recognized failure kinds onto the built-in class table.

#[cold]
pub fn arithmetic(module: &IrModule, message: &str) -> ExceptionValue {
    ExceptionValue::new(
        module.builtins.arithmetic_exception,
        Some(message.to_string()),
    )
}

#[cold]
pub fn class_cast(module: &IrModule, from: &str, to: &str) -> ExceptionValue {
    ExceptionValue::new(
        module.builtins.class_cast_exception,
        Some(format!("{from} cannot be cast to {to}")),
    )
}

#[cold]
pub fn null_pointer(module: &IrModule) -> ExceptionValue {
    ExceptionValue::new(module.builtins.null_pointer_exception, None)
}

#[cold]
pub fn illegal_argument(module: &IrModule, message: String) -> ExceptionValue {
    ExceptionValue::new(module.builtins.illegal_argument_exception, Some(message))
}

#[cold]
pub fn no_such_element(module: &IrModule, message: String) -> ExceptionValue {
    ExceptionValue::new(module.builtins.no_such_element_exception, Some(message))
}

#[cold]
pub fn index_out_of_bounds(module: &IrModule, message: String) -> ExceptionValue {
    ExceptionValue::new(
        module.builtins.index_out_of_bounds_exception,
        Some(message),
    )
}

#[cold]
pub fn stack_overflow(module: &IrModule) -> ExceptionValue {
    ExceptionValue::new(module.builtins.stack_overflow_error, None)
}
