//! Call dispatch.
//!
//! A call evaluates its dispatch receiver, extension receiver, and value
//! arguments (defaults in a sub-frame over the previously-bound
//! parameters), then selects the target by a fixed cascade:
//!
//! 1. host-wrapped receivers dispatch to the bound host operation,
//! 2. intrinsic-marked members dispatch to static host implementations,
//! 3. receiver-class overrides are resolved and invoked,
//! 4. fake overrides walk to the nearest real implementation,
//! 5. body-less members dispatch through the built-in signature tables,
//! 6. everything else evaluates the function's IR body.
//!
//! The callee's receiver slot is bound through the callee's own receiver
//! symbol, so `super` calls re-enter super-class bodies with the correct
//! instance view.

use mica_ir::{ClassKind, ExprId, FunId, IrCall, IrFunction};

use crate::errors;
use crate::exceptions;
use crate::intrinsics;
use crate::signal::{ExecResult, Interrupt};
use crate::stack::ensure_sufficient_stack;
use crate::value::{LambdaValue, Primitive, Value};

use super::Interpreter;

impl Interpreter<'_> {
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn eval_call(&mut self, call: &IrCall) -> ExecResult {
        let module = self.module;
        let fun = module.function(call.function);

        let dispatch = match call.dispatch_receiver {
            Some(expr) => Some(self.eval(expr)?),
            None => None,
        };
        let extension = match call.extension_receiver {
            Some(expr) => Some(self.eval(expr)?),
            None => None,
        };

        if dispatch.as_ref().is_some_and(Value::is_null) {
            return Err(self.raise(exceptions::null_pointer(module)));
        }

        let args = self.bind_arguments(&call.args, fun, dispatch.as_ref(), extension.as_ref())?;
        self.dispatch_call(call, dispatch, extension, args)
    }

    /// Evaluate the value arguments left to right. A missing argument
    /// evaluates the parameter default in a sub-frame that already holds
    /// the receivers and the previously-bound parameters.
    pub(super) fn bind_arguments(
        &mut self,
        supplied: &[Option<ExprId>],
        fun: &IrFunction,
        dispatch: Option<&Value>,
        extension: Option<&Value>,
    ) -> Result<Vec<Value>, Interrupt> {
        let name = self.module.name(fun.name);
        if supplied.len() > fun.params.len() {
            return Err(errors::argument_mismatch(name, fun.params.len(), supplied.len()).into());
        }
        let mut values: Vec<Value> = Vec::with_capacity(fun.params.len());
        for (index, param) in fun.params.iter().enumerate() {
            let value = match supplied.get(index).copied().flatten() {
                Some(expr) => self.eval(expr)?,
                None => {
                    let Some(default) = param.default else {
                        return Err(errors::missing_argument(name, index).into());
                    };
                    self.stack.push_sub();
                    if let (Some(var), Some(value)) = (fun.dispatch_receiver, dispatch) {
                        self.stack.declare(var, Some(value.clone()));
                    }
                    if let (Some(var), Some(value)) = (fun.extension_receiver, extension) {
                        self.stack.declare(var, Some(value.clone()));
                    }
                    for (bound, prior) in fun.params.iter().zip(values.iter()) {
                        self.stack.declare(bound.var, Some(prior.clone()));
                    }
                    let result = self.eval(default);
                    self.stack.pop();
                    result?
                }
            };
            values.push(value);
        }
        Ok(values)
    }

    fn dispatch_call(
        &mut self,
        call: &IrCall,
        dispatch: Option<Value>,
        extension: Option<Value>,
        args: Vec<Value>,
    ) -> ExecResult {
        let module = self.module;
        let fun_id = call.function;
        let fun = module.function(fun_id);
        let name = module.name(fun.name);

        // Structural equality and string concatenation may re-enter user
        // `equals`/`toString` implementations, so they are evaluator-level
        // rather than table entries.
        if fun_id == module.builtins.eqeq {
            let eq = self.values_equal(&args[0], &args[1])?;
            return Ok(Value::bool(eq));
        }
        if let Some(Value::Prim(Primitive::Str(s))) = &dispatch {
            if name == "plus" && fun.body.is_none() {
                let mut out = s.to_string();
                out.push_str(&self.stringify(&args[0])?);
                return Ok(Value::str(out));
            }
        }
        // `rangeTo` synthesizes a range construction through the ordinary
        // constructor path.
        if name == "rangeTo" && fun.body.is_none() {
            let receiver =
                dispatch.ok_or_else(|| errors::missing_argument("rangeTo", 0))?;
            return self.eval_range_to(receiver, args, call.line);
        }
        // First-class functions.
        if let Some(Value::Lambda(lambda)) = &dispatch {
            if fun.body.is_none() {
                let lambda = lambda.clone();
                return self.invoke_lambda(&lambda, extension, args, call.line);
            }
        }

        // 1. Host-wrapped receiver, unless the callee is an interface
        //    default implementation.
        if let Some(Value::Wrapped(host)) = &dispatch {
            if !self.is_interface_default(fun_id) {
                let host = host.clone();
                return intrinsics::call_wrapped(self, fun_id, &host, &args);
            }
        }

        // 2. Intrinsic members, plus the synthetic enum-class statics.
        if let Some(parent) = fun.parent {
            let parent_class = module.class(parent);
            if parent_class.kind == ClassKind::EnumClass && fun.body.is_none() {
                if name == "valueOf" {
                    return self.enum_value_of(parent, &args);
                }
                if name == "values" {
                    return self.enum_values(parent);
                }
            }
            if fun.body.is_none() && !fun.is_abstract {
                if let Some(key) = parent_class.intrinsic {
                    let key = module.name(key);
                    if intrinsics::handles_members(key) {
                        return intrinsics::call_member(self, key, fun_id, dispatch.as_ref(), &args);
                    }
                }
            }
        }

        // 3. Overrides on the runtime class of the receiver. `super`
        //    calls bypass this and enter the statically-chosen body.
        if call.super_qualifier.is_none() {
            if let Some(Value::Object(obj)) = &dispatch {
                let runtime_class = obj.borrow().class;
                match module.resolve_override(runtime_class, fun_id) {
                    Some(target)
                        if target != fun_id && module.function(target).body.is_some() =>
                    {
                        return self.invoke_function(target, dispatch, extension, args, call.line);
                    }
                    Some(_) => {}
                    None if fun.is_abstract => {
                        let class_name = module.name(module.class(runtime_class).name);
                        return Err(errors::missing_implementation(name, class_name).into());
                    }
                    None => {}
                }
            }
        }

        if fun.body.is_none() {
            // 4. Fake override: walk to the nearest real implementation.
            if let Some(real) = self.find_overridden_body(fun_id) {
                return self.invoke_function(real, dispatch, extension, args, call.line);
            }
            // 5. Built-ins, keyed by the ultimate base signature.
            let base = self.ultimate_base(fun_id);
            return self.call_builtin(base, dispatch, args);
        }

        // 6. Default: evaluate the body.
        self.invoke_function(fun_id, dispatch, extension, args, call.line)
    }

    /// Invoke a function body in a fresh frame, receivers and arguments
    /// rebound to the target's own symbols.
    pub(crate) fn invoke_function(
        &mut self,
        target: FunId,
        dispatch: Option<Value>,
        extension: Option<Value>,
        args: Vec<Value>,
        line: u32,
    ) -> ExecResult {
        let module = self.module;
        let fun = module.function(target);
        let name = module.name(fun.name);
        let Some(body) = fun.body else {
            return Err(errors::missing_body(name).into());
        };
        if args.len() != fun.params.len() {
            return Err(errors::argument_mismatch(name, fun.params.len(), args.len()).into());
        }

        self.push_frame_for(target, line)?;
        if let (Some(var), Some(value)) = (fun.dispatch_receiver, dispatch) {
            self.stack.declare(var, Some(value));
        }
        if let (Some(var), Some(value)) = (fun.extension_receiver, extension) {
            self.stack.declare(var, Some(value));
        }
        for (param, value) in fun.params.iter().zip(args) {
            self.stack.declare(param.var, Some(value));
        }

        let result = ensure_sufficient_stack(|| self.eval(body));
        self.pop_frame();

        match result {
            Ok(value) => Ok(value),
            Err(Interrupt::Return { target: t, value }) if t == target => Ok(value),
            Err(other) => Err(other),
        }
    }

    /// Invoke a lambda: captures first, then the receiver (explicit or as
    /// the leading argument), then the parameters.
    pub(crate) fn invoke_lambda(
        &mut self,
        lambda: &LambdaValue,
        extension: Option<Value>,
        args: Vec<Value>,
        line: u32,
    ) -> ExecResult {
        let module = self.module;
        let fun = module.function(lambda.function);
        let name = module.name(fun.name);
        let Some(body) = fun.body else {
            return Err(errors::missing_body(name).into());
        };

        self.push_frame_for(lambda.function, line)?;
        for (var, value) in lambda.captures.iter() {
            self.stack.declare(*var, Some(value.clone()));
        }
        let mut remaining = args.into_iter();
        if let Some(var) = fun.extension_receiver {
            let value = extension.or_else(|| remaining.next());
            let Some(value) = value else {
                self.pop_frame();
                return Err(errors::missing_argument(name, 0).into());
            };
            self.stack.declare(var, Some(value));
        }
        for (index, param) in fun.params.iter().enumerate() {
            let Some(value) = remaining.next() else {
                self.pop_frame();
                return Err(errors::missing_argument(name, index).into());
            };
            self.stack.declare(param.var, Some(value));
        }

        let result = ensure_sufficient_stack(|| self.eval(body));
        self.pop_frame();

        match result {
            Ok(value) => Ok(value),
            Err(Interrupt::Return { target, value }) if target == lambda.function => Ok(value),
            Err(other) => Err(other),
        }
    }

    fn eval_range_to(&mut self, receiver: Value, args: Vec<Value>, line: u32) -> ExecResult {
        let module = self.module;
        let ctor = module
            .find_constructor(module.builtins.int_range, &["Int", "Int"])
            .ok_or_else(|| errors::missing_body("IntRange.<init>"))?;
        let mut ctor_args = Vec::with_capacity(2);
        ctor_args.push(receiver);
        ctor_args.extend(args);
        self.invoke_constructor(ctor, ctor_args, line)
    }

    /// Dispatch through the built-in signature tables, after the derived
    /// member defaults for user objects.
    fn call_builtin(
        &mut self,
        base: FunId,
        dispatch: Option<Value>,
        args: Vec<Value>,
    ) -> ExecResult {
        let module = self.module;
        let fun = module.function(base);
        let name = module.name(fun.name);

        if let Some(receiver @ Value::Object(_)) = &dispatch {
            if fun.parent == Some(module.builtins.any) {
                if let Some(value) = self.object_default_member(name, receiver, &args)? {
                    return Ok(value);
                }
            }
        }

        let mut signature: Vec<&'static str> = Vec::with_capacity(args.len() + 1);
        let mut values: Vec<Value> = Vec::with_capacity(args.len() + 1);
        if fun.dispatch_receiver.is_some() {
            let parent = fun
                .parent
                .ok_or_else(|| errors::missing_builtin(name, &[]))?;
            signature.push(module.name(module.class(parent).name));
            let receiver =
                dispatch.ok_or_else(|| errors::missing_argument(name, 0))?;
            values.push(receiver);
        }
        signature.extend(module.param_type_strings(base));
        values.extend(args);

        if values.is_empty() || values.len() > 3 {
            return Err(errors::bad_builtin_arity(name, values.len()).into());
        }
        match self.builtins.dispatch(module, name, &signature, &values) {
            Some(Ok(value)) => Ok(value),
            Some(Err(exc)) => Err(self.raise(exc)),
            None => Err(errors::missing_builtin(name, &signature).into()),
        }
    }

    // ── Resolution helpers ──────────────────────────────────────────────

    fn is_interface_default(&self, fun: FunId) -> bool {
        let fun = self.module.function(fun);
        fun.body.is_some()
            && fun
                .parent
                .is_some_and(|p| self.module.class(p).kind == ClassKind::Interface)
    }

    /// Nearest overridden function with a real body.
    fn find_overridden_body(&self, fun: FunId) -> Option<FunId> {
        for &parent in &self.module.function(fun).overridden {
            let f = self.module.function(parent);
            if f.body.is_some() && !f.is_abstract {
                return Some(parent);
            }
            if let Some(found) = self.find_overridden_body(parent) {
                return Some(found);
            }
        }
        None
    }

    /// The end of the override chain; its signature keys built-in dispatch.
    fn ultimate_base(&self, fun: FunId) -> FunId {
        let mut current = fun;
        loop {
            match self.module.function(current).overridden.first() {
                Some(&parent) => current = parent,
                None => return current,
            }
        }
    }
}
