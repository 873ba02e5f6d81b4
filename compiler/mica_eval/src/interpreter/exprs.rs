//! Node semantics: data flow, control flow, type operators, varargs, and
//! exception constructs.

use mica_ir::{ExprId, FieldId, IrBranch, IrCatch, IrType, Name, TypeOperator, VarId, VarargElement};

use crate::errors;
use crate::exceptions;
use crate::frame::Lookup;
use crate::signal::{targets_loop, ExecResult, Interrupt};
use crate::value::{self, HostValue, Value};

use super::Interpreter;

impl Interpreter<'_> {
    pub(super) fn eval_concat(&mut self, parts: &[ExprId]) -> ExecResult {
        let mut out = String::new();
        for &part in parts {
            let value = self.eval(part)?;
            out.push_str(&self.stringify(&value)?);
        }
        Ok(Value::str(out))
    }

    pub(super) fn eval_get_var(&mut self, var: VarId) -> ExecResult {
        match self.stack.lookup(var) {
            Lookup::Found(value) => Ok(value),
            Lookup::Uninitialized => {
                let name = self.module.name(self.module.variable(var).name);
                Err(errors::uninitialized_variable(name).into())
            }
            Lookup::Missing => {
                let name = self.module.name(self.module.variable(var).name);
                Err(errors::undefined_variable(name).into())
            }
        }
    }

    pub(super) fn eval_set_var(&mut self, var: VarId, value: ExprId) -> ExecResult {
        let value = self.eval(value)?;
        if !self.stack.assign(var, value.clone()) {
            // No visible binding: the declaration carried no initializer
            // and was hoisted; bind in the current frame.
            self.stack.declare(var, Some(value));
        }
        Ok(Value::UNIT)
    }

    pub(super) fn eval_get_field(&mut self, receiver: ExprId, field: FieldId) -> ExecResult {
        let receiver = self.eval(receiver)?;
        if receiver.is_null() {
            return Err(self.raise(exceptions::null_pointer(self.module)));
        }
        let Some(obj) = receiver.as_object() else {
            return Err(errors::unsupported_node("field access on non-object").into());
        };
        match value::get_field(obj, field) {
            Some(value) => Ok(value),
            None => {
                let name = self.module.name(self.module.field(field).name);
                Err(errors::uninitialized_field(name).into())
            }
        }
    }

    pub(super) fn eval_set_field(
        &mut self,
        receiver: ExprId,
        field: FieldId,
        value: ExprId,
    ) -> ExecResult {
        let receiver = self.eval(receiver)?;
        if receiver.is_null() {
            return Err(self.raise(exceptions::null_pointer(self.module)));
        }
        let Some(obj) = receiver.as_object() else {
            return Err(errors::unsupported_node("field write on non-object").into());
        };
        let obj = obj.clone();
        let value = self.eval(value)?;
        value::set_field(self.module, &obj, field, value);
        Ok(Value::UNIT)
    }

    pub(super) fn eval_block(&mut self, stmts: &[ExprId]) -> ExecResult {
        self.stack.push_sub();
        let result = self.eval_sequence(stmts);
        self.stack.pop();
        result
    }

    fn eval_sequence(&mut self, stmts: &[ExprId]) -> ExecResult {
        let mut last = Value::UNIT;
        for &stmt in stmts {
            last = self.eval(stmt)?;
        }
        Ok(last)
    }

    pub(super) fn eval_var_decl(&mut self, var: VarId, init: Option<ExprId>) -> ExecResult {
        match init {
            Some(init) => {
                let value = self.eval(init)?;
                self.stack.declare(var, Some(value));
            }
            None => self.stack.declare(var, None),
        }
        Ok(Value::UNIT)
    }

    // ── Branching and loops ─────────────────────────────────────────────

    /// Scan branches in source order; the first true condition evaluates
    /// its result and signals `BreakWhen`, which never escapes this node.
    pub(super) fn eval_when(&mut self, branches: &[IrBranch]) -> ExecResult {
        match self.scan_when_branches(branches) {
            Err(Interrupt::BreakWhen { value }) => Ok(value),
            other => other,
        }
    }

    fn scan_when_branches(&mut self, branches: &[IrBranch]) -> ExecResult {
        for branch in branches {
            let condition = self.eval(branch.condition)?;
            if self.expect_bool(&condition)? {
                let value = self.eval(branch.result)?;
                return Err(Interrupt::BreakWhen { value });
            }
        }
        Ok(Value::UNIT)
    }

    pub(super) fn eval_while(
        &mut self,
        label: Option<Name>,
        condition: ExprId,
        body: ExprId,
    ) -> ExecResult {
        loop {
            let c = self.eval(condition)?;
            if !self.expect_bool(&c)? {
                break;
            }
            match self.eval(body) {
                Ok(_) => {}
                Err(Interrupt::Continue { label: l }) if targets_loop(&l, &label) => {}
                Err(Interrupt::Break { label: l }) if targets_loop(&l, &label) => break,
                Err(other) => return Err(other),
            }
        }
        Ok(Value::UNIT)
    }

    pub(super) fn eval_do_while(
        &mut self,
        label: Option<Name>,
        body: ExprId,
        condition: ExprId,
    ) -> ExecResult {
        loop {
            match self.eval(body) {
                Ok(_) => {}
                // `continue` in do/while still evaluates the condition.
                Err(Interrupt::Continue { label: l }) if targets_loop(&l, &label) => {}
                Err(Interrupt::Break { label: l }) if targets_loop(&l, &label) => break,
                Err(other) => return Err(other),
            }
            let c = self.eval(condition)?;
            if !self.expect_bool(&c)? {
                break;
            }
        }
        Ok(Value::UNIT)
    }

    // ── Exceptions ──────────────────────────────────────────────────────

    pub(super) fn eval_throw(&mut self, value: ExprId) -> ExecResult {
        let value = self.eval(value)?;
        match value {
            Value::Exception(exc) => Err(self.raise(exc)),
            other => Err(errors::throw_of_non_exception(other.type_name(self.module)).into()),
        }
    }

    pub(super) fn eval_try(
        &mut self,
        body: ExprId,
        catches: &[IrCatch],
        finally: Option<ExprId>,
    ) -> ExecResult {
        let mut result = self.eval(body);
        if let Err(Interrupt::Exception(exc)) = result {
            result = self.run_catches(exc, catches);
        }
        if let Some(finally) = finally {
            // A finally completing normally preserves the try/catch result;
            // any other signal from the finally supersedes it.
            match self.eval(finally) {
                Ok(_) => {}
                Err(interrupt) => result = Err(interrupt),
            }
        }
        result
    }

    fn run_catches(&mut self, exc: crate::ExceptionValue, catches: &[IrCatch]) -> ExecResult {
        for catch in catches {
            let Some(catch_class) = self.module.class_of_type(&catch.ty) else {
                continue;
            };
            if self.module.is_subclass_of(exc.class, catch_class) {
                self.stack.push_sub();
                self.stack
                    .declare(catch.parameter, Some(Value::Exception(exc)));
                let result = self.eval(catch.body);
                self.stack.pop();
                return result;
            }
        }
        Err(Interrupt::Exception(exc))
    }

    // ── Type operators ──────────────────────────────────────────────────

    pub(super) fn eval_type_op(
        &mut self,
        op: TypeOperator,
        target: &IrType,
        arg: ExprId,
    ) -> ExecResult {
        let value = self.eval(arg)?;
        match op {
            TypeOperator::CoercionToUnit => Ok(Value::UNIT),
            TypeOperator::InstanceOf => Ok(Value::bool(self.conforms(&value, target))),
            TypeOperator::NotInstanceOf => Ok(Value::bool(!self.conforms(&value, target))),
            TypeOperator::SafeCast => {
                if self.conforms(&value, target) {
                    Ok(value)
                } else {
                    Ok(Value::NULL)
                }
            }
            TypeOperator::Cast | TypeOperator::ImplicitCast => {
                if self.conforms(&value, target) {
                    Ok(value)
                } else {
                    let from = if value.is_null() {
                        "null".to_string()
                    } else {
                        value.type_name(self.module).to_string()
                    };
                    let to = self.module.type_string(target);
                    Err(self.raise(exceptions::class_cast(self.module, &from, to)))
                }
            }
        }
    }

    /// Runtime conformance of a value to a type: `null` conforms to
    /// nullable types only; everything else checks the class hierarchy.
    fn conforms(&self, value: &Value, target: &IrType) -> bool {
        if value.is_null() {
            return target.is_nullable();
        }
        let Some(target_class) = self.module.class_of_type(target) else {
            return false;
        };
        value
            .runtime_class(self.module)
            .is_some_and(|class| self.module.is_subclass_of(class, target_class))
    }

    // ── Varargs ─────────────────────────────────────────────────────────

    /// Flatten vararg elements: spreads splice host arrays element-wise,
    /// everything else stays scalar. The result is a host array typed by
    /// the IR element type.
    pub(super) fn eval_vararg(&mut self, elements: &[VarargElement]) -> ExecResult {
        let mut elems = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                VarargElement::Regular(expr) => elems.push(self.eval(*expr)?),
                VarargElement::Spread(expr) => {
                    let value = self.eval(*expr)?;
                    match value {
                        Value::Wrapped(HostValue::Array { elems: src }) => {
                            elems.extend(src.borrow().iter().cloned());
                        }
                        other => {
                            return Err(errors::spread_of_non_array(
                                other.type_name(self.module),
                            )
                            .into())
                        }
                    }
                }
            }
        }
        Ok(Value::array(elems))
    }
}
