//! The tree-walking evaluator.
//!
//! `Interpreter::interpret` resets the execution state, walks the
//! expression, and converts the final value back into a constant (or a
//! formatted error description). All per-evaluation state - frame stack,
//! command counter, enum and object interns, stack trace - is owned by one
//! interpreter instance; the built-in tables are immutable and shared
//! across instances.
//!
//! The walker is split by concern:
//!
//! - `exprs`: node semantics for data and control flow
//! - `calls`: the call dispatch cascade and argument binding
//! - `ctors`: constructor semantics, delegation, and instance initializers
//! - `enums`: enum-entry and object-singleton interning
//! - `members`: `toString`/`equals`/`hashCode` resolution and derived
//!   data-class members

mod calls;
mod ctors;
mod enums;
mod exprs;
pub(crate) mod members;

use rustc_hash::FxHashMap;

use mica_ir::{ClassId, ConstValue, ExprId, FunId, IrExpr, IrModule, Name, VarId};

use crate::builtins::BuiltinTables;
use crate::errors;
use crate::exceptions::ExceptionValue;
use crate::frame::FrameStack;
use crate::signal::{ExecResult, Interrupt};
use crate::value::{LambdaValue, Primitive, Value};

/// Evaluation bounds. These terminate pathological inputs; they are not a
/// sandbox.
#[derive(Copy, Clone, Debug)]
pub struct Limits {
    /// Maximum number of IR nodes evaluated in one `interpret` call.
    pub max_commands: u32,
    /// Maximum depth of the stack-trace list, i.e. of nested invocations.
    pub max_stack_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_commands: 500_000,
            max_stack_depth: 10_000,
        }
    }
}

/// Outcome of one `interpret` call.
#[derive(Clone, Debug, PartialEq)]
pub enum FoldResult {
    /// The expression reduced to a constant.
    Const(ConstValue),
    /// Evaluation surfaced an exception or an internal error. The text
    /// begins with a newline, ready for an error expression's message.
    Error(String),
}

impl FoldResult {
    /// Materialize the outcome as an expression node in `module`.
    pub fn into_expr(self, module: &mut IrModule) -> ExprId {
        match self {
            FoldResult::Const(value) => module.append_expr(IrExpr::Const(value)),
            FoldResult::Error(message) => module.append_expr(IrExpr::Error(message)),
        }
    }

    pub fn as_const(&self) -> Option<&ConstValue> {
        match self {
            FoldResult::Const(value) => Some(value),
            FoldResult::Error(_) => None,
        }
    }

    pub fn error_text(&self) -> Option<&str> {
        match self {
            FoldResult::Const(_) => None,
            FoldResult::Error(message) => Some(message),
        }
    }
}

/// Constructor-evaluation context: which receiver symbol holds the object
/// under construction, and the pending enum entry for `EnumSuper`
/// delegation.
#[derive(Clone)]
pub(crate) struct CtorCtx {
    pub(crate) receiver: VarId,
    pub(crate) class: ClassId,
    pub(crate) enum_entry: Option<(Name, i32)>,
}

/// The compile-time evaluator. One instance serves one evaluation at a
/// time; create a fresh instance per concurrent evaluation.
pub struct Interpreter<'a> {
    pub(crate) module: &'a IrModule,
    limits: Limits,
    commands: u32,
    pub(crate) stack: FrameStack,
    pub(crate) enum_interns: FxHashMap<(ClassId, Name), Value>,
    pub(crate) object_interns: FxHashMap<ClassId, Value>,
    pub(crate) ctor_frames: Vec<CtorCtx>,
    pub(crate) pending_enum_entry: Option<(Name, i32)>,
    pub(crate) builtins: &'static BuiltinTables,
}

impl<'a> Interpreter<'a> {
    pub fn new(module: &'a IrModule) -> Self {
        Self::with_limits(module, Limits::default())
    }

    pub fn with_limits(module: &'a IrModule, limits: Limits) -> Self {
        Interpreter {
            module,
            limits,
            commands: 0,
            stack: FrameStack::new(limits.max_stack_depth),
            enum_interns: FxHashMap::default(),
            object_interns: FxHashMap::default(),
            ctor_frames: Vec::new(),
            pending_enum_entry: None,
            builtins: BuiltinTables::global(),
        }
    }

    /// Evaluate `expr` to a constant, or to an error description.
    pub fn interpret(&mut self, expr: ExprId) -> FoldResult {
        self.commands = 0;
        self.stack.reset();
        self.enum_interns.clear();
        self.object_interns.clear();
        self.ctor_frames.clear();
        self.pending_enum_entry = None;

        self.stack.push_full();
        let outcome = self.eval(expr);
        self.stack.pop();

        match outcome {
            Ok(Value::Prim(p)) => match p.to_const() {
                Some(value) => FoldResult::Const(value),
                None => FoldResult::Error(format!(
                    "\n{}",
                    errors::unrepresentable_result(p.type_string())
                )),
            },
            Ok(other) => FoldResult::Error(format!(
                "\n{}",
                errors::unrepresentable_result(other.type_name(self.module))
            )),
            Err(Interrupt::Exception(exc)) => {
                FoldResult::Error(format!("\n{}", exc.describe(self.module)))
            }
            Err(Interrupt::Fault(fault)) => FoldResult::Error(format!("\n{fault}")),
            Err(other) => FoldResult::Error(format!(
                "\n{}",
                errors::loose_control_flow(other.kind())
            )),
        }
    }

    /// Evaluate one node. Every step bumps the command counter.
    pub(crate) fn eval(&mut self, expr: ExprId) -> ExecResult {
        self.bump()?;
        let module = self.module;
        match module.expr(expr) {
            IrExpr::Const(value) => Ok(Primitive::from_const(value).into()),
            IrExpr::StringConcat(parts) => self.eval_concat(parts),
            IrExpr::GetVar(var) => self.eval_get_var(*var),
            IrExpr::SetVar { var, value } => self.eval_set_var(*var, *value),
            IrExpr::GetField { receiver, field } => self.eval_get_field(*receiver, *field),
            IrExpr::SetField {
                receiver,
                field,
                value,
            } => self.eval_set_field(*receiver, *field, *value),
            IrExpr::Block(stmts) => self.eval_block(stmts),
            IrExpr::VarDecl { var, init } => self.eval_var_decl(*var, *init),
            IrExpr::When { branches } => self.eval_when(branches),
            IrExpr::While {
                label,
                condition,
                body,
            } => self.eval_while(*label, *condition, *body),
            IrExpr::DoWhile {
                label,
                body,
                condition,
            } => self.eval_do_while(*label, *body, *condition),
            IrExpr::Break { label } => Err(Interrupt::Break { label: *label }),
            IrExpr::Continue { label } => Err(Interrupt::Continue { label: *label }),
            IrExpr::Return { target, value } => {
                let value = self.eval(*value)?;
                Err(Interrupt::Return {
                    target: *target,
                    value,
                })
            }
            IrExpr::Call(call) => self.eval_call(call),
            IrExpr::ConstructorCall {
                constructor,
                args,
                line,
            } => self.eval_constructor_call(*constructor, args, *line),
            IrExpr::DelegatingCall {
                constructor,
                args,
                kind,
            } => self.eval_delegating_call(*constructor, args, *kind),
            IrExpr::InstanceInitializer { class } => self.eval_instance_initializer(*class),
            IrExpr::GetEnumValue { class, entry } => self.enum_value(*class, *entry),
            IrExpr::GetObjectValue { class } => self.object_value(*class),
            IrExpr::TypeOp { op, target, arg } => self.eval_type_op(*op, target, *arg),
            IrExpr::Vararg { elements, .. } => self.eval_vararg(elements),
            IrExpr::Lambda {
                function,
                interface,
            } => Ok(Value::Lambda(LambdaValue {
                function: *function,
                interface: *interface,
                captures: std::rc::Rc::new(self.stack.capture_visible()),
            })),
            IrExpr::Throw(value) => self.eval_throw(*value),
            IrExpr::Try {
                body,
                catches,
                finally,
            } => self.eval_try(*body, catches, *finally),
            IrExpr::Error(_) => Err(errors::unsupported_node("error expression").into()),
        }
    }

    /// Bump the command counter. Monotonic within one `interpret` call.
    #[inline]
    fn bump(&mut self) -> Result<(), Interrupt> {
        self.commands += 1;
        if self.commands > self.limits.max_commands {
            return Err(errors::timeout(self.limits.max_commands).into());
        }
        Ok(())
    }

    /// Raise a source-language exception, freezing the stack trace at the
    /// raise site if it has not been captured yet.
    pub(crate) fn raise(&mut self, mut exc: ExceptionValue) -> Interrupt {
        exc.capture_trace(self.stack.trace());
        Interrupt::Exception(exc)
    }

    pub(crate) fn expect_bool(&self, value: &Value) -> Result<bool, Interrupt> {
        match value {
            Value::Prim(Primitive::Bool(b)) => Ok(*b),
            other => Err(errors::unsupported_node(&format!(
                "condition of type {}",
                other.type_name(self.module)
            ))
            .into()),
        }
    }

    // ── Frames and stack traces ─────────────────────────────────────────

    /// Push the trace line and full frame for an invocation. Exceeding the
    /// trace cap raises a stack-overflow exception instead.
    pub(crate) fn push_frame_for(&mut self, target: FunId, line: u32) -> Result<(), Interrupt> {
        let description = self.frame_description(target, line);
        if !self.stack.push_trace(description) {
            return Err(self.raise(crate::exceptions::stack_overflow(self.module)));
        }
        self.stack.push_full();
        Ok(())
    }

    pub(crate) fn pop_frame(&mut self) {
        self.stack.pop();
        self.stack.pop_trace();
    }

    /// A formatted stack frame line: `at <File>Kt.<fq-name>(<File>:<line>)`.
    fn frame_description(&self, target: FunId, line: u32) -> String {
        let module = self.module;
        let fun = module.function(target);
        let stem = module.file_stem(fun.file);
        let file_name = module.name(module.file(fun.file).name);
        format!(
            "at {stem}Kt.{fq}({file_name}:{line})",
            fq = module.fq_name(target)
        )
    }
}
