//! The unsigned integer classes.
//!
//! `UInt` and `ULong` are user-shaped objects whose single backing field
//! holds the signed representation; their members are static host
//! implementations operating on the unsigned reinterpretation.

use mica_ir::{ClassId, IrModule};

use crate::errors;
use crate::exceptions;
use crate::signal::{ExecResult, Interrupt};
use crate::value::{self, ObjectData, Primitive, Value};
use crate::Interpreter;

pub(super) fn call(
    interp: &mut Interpreter<'_>,
    key: &str,
    name: &str,
    receiver: Option<&Value>,
    args: &[Value],
) -> ExecResult {
    let module = interp.module;
    let class = match key {
        "UInt" => module.builtins.uint,
        _ => module.builtins.ulong,
    };
    let receiver = receiver.ok_or_else(|| errors::missing_argument(name, 0))?;
    let a = backing(module, class, receiver)?;
    match name {
        "plus" | "minus" | "times" | "div" | "rem" => {
            let b = backing(module, class, arg(name, args)?)?;
            let result = match name {
                "plus" => Ok(a.wrapping_add(b)),
                "minus" => Ok(a.wrapping_sub(b)),
                "times" => Ok(a.wrapping_mul(b)),
                _ if b == 0 => Err(interp.raise(exceptions::arithmetic(module, "/ by zero"))),
                "div" => Ok(a / b),
                _ => Ok(a % b),
            }?;
            wrap(module, class, result)
        }
        "compareTo" => {
            let b = backing(module, class, arg(name, args)?)?;
            Ok(Value::int(match a.cmp(&b) {
                std::cmp::Ordering::Less => -1,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => 1,
            }))
        }
        "toString" => Ok(match key {
            "UInt" => {
                #[allow(clippy::cast_possible_truncation, reason = "UInt backing is 32-bit")]
                let narrow = a as u32;
                Value::str(narrow.to_string())
            }
            _ => Value::str(a.to_string()),
        }),
        "toInt" => {
            #[allow(clippy::cast_possible_truncation, reason = "reinterpreting low bits")]
            let narrow = a as u32;
            Ok(Value::int(narrow.cast_signed()))
        }
        "toLong" => Ok(Value::long(a.cast_signed())),
        other => Err(errors::missing_intrinsic(key, other).into()),
    }
}

fn arg<'v>(name: &str, args: &'v [Value]) -> Result<&'v Value, Interrupt> {
    args.first()
        .ok_or_else(|| errors::missing_argument(name, 0).into())
}

/// Read the backing field, zero-extended to 64 bits.
fn backing(module: &IrModule, class: ClassId, value: &Value) -> Result<u64, Interrupt> {
    let data_field = module
        .find_field(class, "data")
        .ok_or_else(|| errors::missing_intrinsic("unsigned", "data"))?;
    let obj = value.as_object().ok_or_else(|| {
        errors::missing_intrinsic("unsigned", value.type_name(module))
    })?;
    match value::get_field(obj, data_field) {
        Some(Value::Prim(Primitive::Int(v))) => Ok(u64::from(v.cast_unsigned())),
        Some(Value::Prim(Primitive::Long(v))) => Ok(v.cast_unsigned()),
        _ => Err(errors::missing_intrinsic("unsigned", "data").into()),
    }
}

/// Wrap an unsigned result back into a fresh instance of the class.
fn wrap(module: &IrModule, class: ClassId, result: u64) -> ExecResult {
    let data_field = module
        .find_field(class, "data")
        .ok_or_else(|| errors::missing_intrinsic("unsigned", "data"))?;
    let signed = if class == module.builtins.uint {
        #[allow(clippy::cast_possible_truncation, reason = "UInt backing is 32-bit")]
        let narrow = result as u32;
        Value::int(narrow.cast_signed())
    } else {
        Value::long(result.cast_signed())
    };
    let obj = ObjectData::new(class);
    obj.borrow_mut().fields.insert(data_field, signed);
    Ok(Value::Object(obj))
}
