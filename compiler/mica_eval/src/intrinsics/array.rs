//! The mutable host buffer behind array values.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors;
use crate::exceptions;
use crate::signal::ExecResult;
use crate::value::{Primitive, Value};
use crate::Interpreter;

pub(super) fn call(
    interp: &mut Interpreter<'_>,
    elems: &Rc<RefCell<Vec<Value>>>,
    name: &str,
    args: &[Value],
) -> ExecResult {
    match name {
        "get" => {
            let index = expect_index(interp, args.first(), elems.borrow().len())?;
            Ok(elems.borrow()[index].clone())
        }
        "set" => {
            let index = expect_index(interp, args.first(), elems.borrow().len())?;
            let value = args
                .get(1)
                .cloned()
                .ok_or_else(|| errors::missing_argument("set", 1))?;
            elems.borrow_mut()[index] = value;
            Ok(Value::UNIT)
        }
        "size" => {
            #[allow(clippy::cast_possible_truncation, reason = "array sizes fit Int width")]
            let size = elems.borrow().len() as i32;
            Ok(Value::int(size))
        }
        other => Err(errors::missing_intrinsic("Array", other).into()),
    }
}

fn expect_index(
    interp: &mut Interpreter<'_>,
    value: Option<&Value>,
    len: usize,
) -> Result<usize, crate::signal::Interrupt> {
    let Some(Value::Prim(Primitive::Int(index))) = value else {
        return Err(errors::missing_argument("get", 0).into());
    };
    match usize::try_from(*index).ok().filter(|&ix| ix < len) {
        Some(ix) => Ok(ix),
        None => Err(interp.raise(exceptions::index_out_of_bounds(
            interp.module,
            format!("Index {index} out of bounds for length {len}"),
        ))),
    }
}
