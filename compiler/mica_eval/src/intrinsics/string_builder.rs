//! The mutable host string buffer.

use std::cell::RefCell;
use std::rc::Rc;

use mica_ir::FunId;

use crate::errors;
use crate::signal::ExecResult;
use crate::value::{HostValue, Primitive, Value};
use crate::Interpreter;

pub(super) fn construct(
    interp: &mut Interpreter<'_>,
    ctor: FunId,
    args: &[Value],
) -> ExecResult {
    let seeded = !interp.module.function(ctor).params.is_empty();
    let content = if seeded {
        match args.first() {
            Some(Value::Prim(Primitive::Str(s))) => s.to_string(),
            _ => return Err(errors::missing_argument("StringBuilder", 0).into()),
        }
    } else {
        String::new()
    };
    Ok(Value::Wrapped(HostValue::StringBuilder(Rc::new(
        RefCell::new(content),
    ))))
}

pub(super) fn call(
    interp: &mut Interpreter<'_>,
    content: &Rc<RefCell<String>>,
    name: &str,
    args: &[Value],
) -> ExecResult {
    match name {
        "append" => {
            let value = args
                .first()
                .ok_or_else(|| errors::missing_argument("append", 0))?;
            let text = interp.stringify(value)?;
            content.borrow_mut().push_str(&text);
            Ok(Value::Wrapped(HostValue::StringBuilder(content.clone())))
        }
        "toString" => Ok(Value::str(content.borrow().as_str())),
        "length" => {
            #[allow(clippy::cast_possible_truncation, reason = "buffer lengths fit Int width")]
            let length = content.borrow().chars().count() as i32;
            Ok(Value::int(length))
        }
        other => Err(errors::missing_intrinsic("StringBuilder", other).into()),
    }
}
