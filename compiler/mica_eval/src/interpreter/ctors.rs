//! Constructor semantics.
//!
//! Intrinsic widths (`Long`, `Char`), throwable construction, host-provided
//! constructors, array allocation, and user-object construction with
//! super/sibling delegation and instance initializers.

use mica_ir::{ClassId, DelegationKind, ExprId, FunId, Name};

use crate::errors;
use crate::exceptions::{self, ExceptionValue};
use crate::intrinsics;
use crate::signal::{ExecResult, Interrupt};
use crate::stack::ensure_sufficient_stack;
use crate::value::{self, LambdaValue, ObjectData, Primitive, Value};

use super::{CtorCtx, Interpreter};

impl Interpreter<'_> {
    pub(super) fn eval_constructor_call(
        &mut self,
        constructor: FunId,
        args: &[Option<ExprId>],
        line: u32,
    ) -> ExecResult {
        // A pending enum entry belongs to this construction; take it before
        // argument evaluation can start a nested one.
        let enum_ctx = self.pending_enum_entry.take();
        let fun = self.module.function(constructor);
        let args = self.bind_arguments(args, fun, None, None)?;
        self.invoke_constructor_with(constructor, args, line, enum_ctx)
    }

    pub(crate) fn invoke_constructor(
        &mut self,
        constructor: FunId,
        args: Vec<Value>,
        line: u32,
    ) -> ExecResult {
        self.invoke_constructor_with(constructor, args, line, None)
    }

    fn invoke_constructor_with(
        &mut self,
        constructor: FunId,
        args: Vec<Value>,
        line: u32,
        enum_ctx: Option<(Name, i32)>,
    ) -> ExecResult {
        let module = self.module;
        let b = &module.builtins;
        let fun = module.function(constructor);
        let Some(class_id) = fun.parent else {
            return Err(errors::missing_body("<init> without a class").into());
        };

        // Long is synthesized from its halves, Char from its code, on
        // platforms where the width is not native to the source's numbers.
        if class_id == b.long && fun.params.len() == 2 {
            let high = self.expect_int(&args[0])?;
            let low = self.expect_int(&args[1])?;
            let value = (i64::from(high) << 32).wrapping_add(i64::from(low));
            return Ok(Value::long(value));
        }
        if class_id == b.char {
            let code = self.expect_int(&args[0])?;
            return match char::from_u32(code.cast_unsigned()) {
                Some(c) => Ok(Value::Prim(Primitive::Char(c))),
                None => Err(self.raise(exceptions::illegal_argument(
                    module,
                    format!("invalid char code {code}"),
                ))),
            };
        }
        if module.is_subclass_of(class_id, b.throwable) {
            return Ok(Value::Exception(build_exception(class_id, &args)));
        }
        if let Some(key) = module.class(class_id).intrinsic {
            let key = module.name(key);
            if intrinsics::constructs_hosted(key) {
                return intrinsics::construct(self, key, constructor, &args);
            }
        }
        if class_id == b.array {
            return self.construct_array(&args, line);
        }

        self.construct_user_object(constructor, class_id, args, line, enum_ctx)
    }

    fn construct_user_object(
        &mut self,
        constructor: FunId,
        class_id: ClassId,
        args: Vec<Value>,
        line: u32,
        enum_ctx: Option<(Name, i32)>,
    ) -> ExecResult {
        let module = self.module;
        let fun = module.function(constructor);
        let name = module.name(fun.name);
        let Some(body) = fun.body else {
            return Err(errors::missing_body(name).into());
        };
        let Some(receiver) = fun.dispatch_receiver else {
            return Err(errors::missing_body(name).into());
        };
        if args.len() != fun.params.len() {
            return Err(errors::argument_mismatch(name, fun.params.len(), args.len()).into());
        }

        let obj = ObjectData::new(class_id);

        self.push_frame_for(constructor, line)?;
        self.stack.declare(receiver, Some(Value::Object(obj.clone())));
        for (param, value) in fun.params.iter().zip(args) {
            self.stack.declare(param.var, Some(value));
        }
        self.ctor_frames.push(CtorCtx {
            receiver,
            class: class_id,
            enum_entry: enum_ctx,
        });

        let result = ensure_sufficient_stack(|| self.eval(body));

        self.ctor_frames.pop();
        self.pop_frame();

        match result {
            Ok(_) => Ok(Value::Object(obj)),
            Err(Interrupt::Return { target, .. }) if target == constructor => {
                Ok(Value::Object(obj))
            }
            Err(other) => Err(other),
        }
    }

    fn construct_array(&mut self, args: &[Value], line: u32) -> ExecResult {
        let size = self.expect_int(&args[0])?;
        if size < 0 {
            return Err(self.raise(exceptions::illegal_argument(
                self.module,
                format!("negative array size {size}"),
            )));
        }
        let size = size.cast_unsigned() as usize;
        let mut elems = Vec::with_capacity(size);
        match args.get(1) {
            Some(Value::Lambda(init)) => {
                let init: LambdaValue = init.clone();
                for index in 0..size {
                    #[allow(clippy::cast_possible_truncation, reason = "index < i32::MAX by construction")]
                    let index = index as i32;
                    elems.push(self.invoke_lambda(&init, None, vec![Value::int(index)], line)?);
                }
            }
            Some(other) => {
                return Err(errors::unsupported_node(&format!(
                    "array initializer of type {}",
                    other.type_name(self.module)
                ))
                .into())
            }
            None => elems.resize(size, Value::NULL),
        }
        Ok(Value::array(elems))
    }

    // ── Delegation ──────────────────────────────────────────────────────

    pub(super) fn eval_delegating_call(
        &mut self,
        constructor: FunId,
        args: &[Option<ExprId>],
        kind: DelegationKind,
    ) -> ExecResult {
        let Some(ctx) = self.ctor_frames.last().cloned() else {
            return Err(errors::delegation_outside_constructor().into());
        };
        let this_obj = match self.stack.lookup(ctx.receiver) {
            crate::frame::Lookup::Found(Value::Object(obj)) => obj,
            _ => return Err(errors::delegation_outside_constructor().into()),
        };

        match kind {
            DelegationKind::EnumSuper => {
                let module = self.module;
                let Some((entry, ordinal)) = ctx.enum_entry else {
                    let class_name = module.name(module.class(ctx.class).name);
                    return Err(errors::enum_delegation_without_entry(class_name).into());
                };
                let enum_class = module.builtins.enum_class;
                let name_field = module
                    .find_field(enum_class, "name")
                    .ok_or_else(|| errors::missing_body("Enum.name"))?;
                let ordinal_field = module
                    .find_field(enum_class, "ordinal")
                    .ok_or_else(|| errors::missing_body("Enum.ordinal"))?;
                let sup = ObjectData::new(enum_class);
                {
                    let mut data = sup.borrow_mut();
                    data.fields
                        .insert(name_field, Value::str(module.name(entry)));
                    data.fields.insert(ordinal_field, Value::int(ordinal));
                }
                this_obj.borrow_mut().super_instance = Some(sup);
            }
            DelegationKind::Super => {
                let fun = self.module.function(constructor);
                let args = self.bind_arguments(args, fun, None, None)?;
                match self.invoke_constructor(constructor, args, 0)? {
                    Value::Object(sup) => {
                        this_obj.borrow_mut().super_instance = Some(sup);
                    }
                    other => {
                        return Err(errors::unsupported_node(&format!(
                            "super delegation produced {}",
                            other.type_name(self.module)
                        ))
                        .into())
                    }
                }
            }
            DelegationKind::This => {
                let fun = self.module.function(constructor);
                let args = self.bind_arguments(args, fun, None, None)?;
                match self.invoke_constructor(constructor, args, 0)? {
                    Value::Object(sibling) => {
                        // The sibling is fully formed; adopt its state.
                        let (fields, super_instance) = {
                            let data = sibling.borrow();
                            (data.fields.clone(), data.super_instance.clone())
                        };
                        let mut data = this_obj.borrow_mut();
                        data.fields = fields;
                        data.super_instance = super_instance;
                    }
                    other => {
                        return Err(errors::unsupported_node(&format!(
                            "sibling delegation produced {}",
                            other.type_name(self.module)
                        ))
                        .into())
                    }
                }
            }
        }
        Ok(Value::UNIT)
    }

    /// Run the class's field initializers, then its anonymous initializer
    /// blocks, writing each result into the receiver's field map.
    pub(super) fn eval_instance_initializer(&mut self, class: ClassId) -> ExecResult {
        let Some(ctx) = self.ctor_frames.last().cloned() else {
            return Err(errors::delegation_outside_constructor().into());
        };
        let this_obj = match self.stack.lookup(ctx.receiver) {
            crate::frame::Lookup::Found(Value::Object(obj)) => obj,
            _ => return Err(errors::delegation_outside_constructor().into()),
        };

        let module = self.module;
        let decl = module.class(class);
        for &field in &decl.fields {
            if let Some(init) = module.field(field).initializer {
                let value = self.eval(init)?;
                value::set_field(module, &this_obj, field, value);
            }
        }
        for &block in &decl.init_blocks {
            self.eval(block)?;
        }
        Ok(Value::UNIT)
    }

    fn expect_int(&self, value: &Value) -> Result<i32, Interrupt> {
        match value {
            Value::Prim(Primitive::Int(v)) => Ok(*v),
            other => Err(errors::unsupported_node(&format!(
                "expected Int, got {}",
                other.type_name(self.module)
            ))
            .into()),
        }
    }
}

/// Build an exception value from constructor arguments: the first string
/// argument is the message, the first exception argument is the cause.
fn build_exception(class: ClassId, args: &[Value]) -> ExceptionValue {
    let mut exc = ExceptionValue::new(class, None);
    for arg in args {
        match arg {
            Value::Prim(Primitive::Str(s)) if exc.message.is_none() => {
                exc.message = Some(s.to_string());
            }
            Value::Exception(cause) if exc.cause.is_none() => {
                exc.cause = Some(Box::new(cause.clone()));
            }
            _ => {}
        }
    }
    exc
}
