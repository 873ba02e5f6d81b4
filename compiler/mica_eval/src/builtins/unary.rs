//! Arity-1 built-ins: the receiver is the only argument.

use mica_ir::IrModule;

use crate::exceptions::{self, ExceptionValue};
use crate::interpreter::members::{format_primitive, hash_primitive};
use crate::value::{HostValue, Primitive, Value};

use super::{BuiltinResult, BuiltinTables, NUMERIC};

pub(super) fn register(t: &mut BuiltinTables) {
    for ty in ["Byte", "Short", "Int", "Long", "Float", "Double", "Char", "Boolean", "String"] {
        t.unary("toString", ty, to_string);
        t.unary("hashCode", ty, hash_code);
    }
    t.unary("toString", "Any", to_string);
    t.unary("hashCode", "Any", hash_code);
    t.unary("toString", "Throwable", to_string);

    for ty in ["Byte", "Short", "Int", "Long", "Float", "Double"] {
        t.unary("toByte", ty, to_byte);
        t.unary("toShort", ty, to_short);
        t.unary("toInt", ty, to_int);
        t.unary("toLong", ty, to_long);
        t.unary("toFloat", ty, to_float);
        t.unary("toDouble", ty, to_double);
    }
    t.unary("toInt", "Char", to_int);
    t.unary("toChar", "Int", to_char);

    for ty in NUMERIC {
        t.unary("unaryMinus", ty, unary_minus);
        t.unary("inc", ty, inc);
        t.unary("dec", ty, dec);
    }
    t.unary("inv", "Int", inv);
    t.unary("inv", "Long", inv);
    t.unary("not", "Boolean", not);

    t.unary("length", "String", str_length);
    t.unary("trim", "String", str_trim);
    t.unary("isEmpty", "String", str_is_empty);

    t.unary("isEmpty", "IntRange", range_is_empty);
    t.unary("toString", "IntRange", range_to_string);

    t.unary("message", "Throwable", throwable_message);
    t.unary("cause", "Throwable", throwable_cause);

    t.unary("arrayOf", "Array", array_of);
}

fn expect_prim<'v>(module: &IrModule, v: &'v Value) -> Result<&'v Primitive, ExceptionValue> {
    match v {
        Value::Prim(p) => Ok(p),
        other => Err(exceptions::illegal_argument(
            module,
            format!("expected a primitive, got {}", other.type_name(module)),
        )),
    }
}

fn to_string(module: &IrModule, v: &Value) -> BuiltinResult {
    match v {
        Value::Prim(p) => Ok(Value::str(format_primitive(p))),
        Value::Exception(exc) => Ok(Value::str(match &exc.message {
            Some(message) => format!("{}: {message}", exc.class_name(module)),
            None => exc.class_name(module).to_string(),
        })),
        other => Err(exceptions::illegal_argument(
            module,
            format!("{} has no builtin string form", other.type_name(module)),
        )),
    }
}

fn hash_code(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    Ok(Value::int(hash_primitive(p)))
}

// Conversions follow host semantics: integral narrowing truncates,
// float-to-integral saturates with NaN mapping to zero.

fn to_byte(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    let value = match p {
        Primitive::Float(f) => *f as i8,
        Primitive::Double(f) => *f as i8,
        #[allow(clippy::cast_possible_truncation, reason = "narrowing conversion truncates")]
        _ => numeric_i64(module, p)? as i8,
    };
    Ok(Value::Prim(Primitive::Byte(value)))
}

fn to_short(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    let value = match p {
        Primitive::Float(f) => *f as i16,
        Primitive::Double(f) => *f as i16,
        #[allow(clippy::cast_possible_truncation, reason = "narrowing conversion truncates")]
        _ => numeric_i64(module, p)? as i16,
    };
    Ok(Value::Prim(Primitive::Short(value)))
}

fn to_int(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    let value = match p {
        Primitive::Float(f) => *f as i32,
        Primitive::Double(f) => *f as i32,
        Primitive::Char(c) => *c as i32,
        #[allow(clippy::cast_possible_truncation, reason = "narrowing conversion truncates")]
        _ => numeric_i64(module, p)? as i32,
    };
    Ok(Value::int(value))
}

fn to_long(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    let value = match p {
        Primitive::Float(f) => *f as i64,
        Primitive::Double(f) => *f as i64,
        _ => numeric_i64(module, p)?,
    };
    Ok(Value::long(value))
}

fn to_float(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    let value = match p {
        Primitive::Float(f) => *f,
        Primitive::Double(f) => *f as f32,
        #[allow(clippy::cast_precision_loss, reason = "widening follows host semantics")]
        _ => numeric_i64(module, p)? as f32,
    };
    Ok(Value::Prim(Primitive::Float(value)))
}

fn to_double(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    let value = match p {
        Primitive::Float(f) => f64::from(*f),
        Primitive::Double(f) => *f,
        #[allow(clippy::cast_precision_loss, reason = "widening follows host semantics")]
        _ => numeric_i64(module, p)? as f64,
    };
    Ok(Value::double(value))
}

fn to_char(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    let code = numeric_i64(module, p)?;
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, reason = "char codes reinterpret low bits")]
    let code = code as u32;
    match char::from_u32(code) {
        Some(c) => Ok(Value::Prim(Primitive::Char(c))),
        None => Err(exceptions::illegal_argument(
            module,
            format!("invalid char code {code}"),
        )),
    }
}

fn numeric_i64(module: &IrModule, p: &Primitive) -> Result<i64, ExceptionValue> {
    p.as_i64().ok_or_else(|| {
        exceptions::illegal_argument(module, format!("{} is not integral", p.type_string()))
    })
}

fn unary_minus(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    Ok(Value::Prim(match p {
        Primitive::Int(v) => Primitive::Int(v.wrapping_neg()),
        Primitive::Long(v) => Primitive::Long(v.wrapping_neg()),
        Primitive::Float(v) => Primitive::Float(-v),
        Primitive::Double(v) => Primitive::Double(-v),
        other => {
            return Err(exceptions::illegal_argument(
                module,
                format!("cannot negate {}", other.type_string()),
            ))
        }
    }))
}

fn inc(module: &IrModule, v: &Value) -> BuiltinResult {
    step(module, v, 1)
}

fn dec(module: &IrModule, v: &Value) -> BuiltinResult {
    step(module, v, -1)
}

fn step(module: &IrModule, v: &Value, delta: i64) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    Ok(Value::Prim(match p {
        #[allow(clippy::cast_possible_truncation, reason = "delta is ±1")]
        Primitive::Int(v) => Primitive::Int(v.wrapping_add(delta as i32)),
        Primitive::Long(v) => Primitive::Long(v.wrapping_add(delta)),
        #[allow(clippy::cast_precision_loss, reason = "delta is ±1")]
        Primitive::Float(v) => Primitive::Float(v + delta as f32),
        #[allow(clippy::cast_precision_loss, reason = "delta is ±1")]
        Primitive::Double(v) => Primitive::Double(v + delta as f64),
        other => {
            return Err(exceptions::illegal_argument(
                module,
                format!("cannot step {}", other.type_string()),
            ))
        }
    }))
}

fn inv(module: &IrModule, v: &Value) -> BuiltinResult {
    let p = expect_prim(module, v)?;
    Ok(Value::Prim(match p {
        Primitive::Int(v) => Primitive::Int(!v),
        Primitive::Long(v) => Primitive::Long(!v),
        other => {
            return Err(exceptions::illegal_argument(
                module,
                format!("cannot invert {}", other.type_string()),
            ))
        }
    }))
}

fn not(module: &IrModule, v: &Value) -> BuiltinResult {
    match expect_prim(module, v)? {
        Primitive::Bool(b) => Ok(Value::bool(!b)),
        other => Err(exceptions::illegal_argument(
            module,
            format!("cannot apply not to {}", other.type_string()),
        )),
    }
}

fn str_arg<'v>(
    module: &IrModule,
    v: &'v Value,
) -> Result<&'v str, ExceptionValue> {
    match v {
        Value::Prim(Primitive::Str(s)) => Ok(s),
        other => Err(exceptions::illegal_argument(
            module,
            format!("expected a String, got {}", other.type_name(module)),
        )),
    }
}

fn str_length(module: &IrModule, v: &Value) -> BuiltinResult {
    let s = str_arg(module, v)?;
    #[allow(clippy::cast_possible_truncation, reason = "string lengths fit Int width")]
    Ok(Value::int(s.chars().count() as i32))
}

fn str_trim(module: &IrModule, v: &Value) -> BuiltinResult {
    Ok(Value::str(str_arg(module, v)?.trim()))
}

fn str_is_empty(module: &IrModule, v: &Value) -> BuiltinResult {
    Ok(Value::bool(str_arg(module, v)?.is_empty()))
}

pub(super) fn range_bound(module: &IrModule, v: &Value, field: &str) -> Option<i32> {
    let obj = v.as_object()?;
    let field = module.find_field(module.builtins.int_range, field)?;
    match crate::value::get_field(obj, field) {
        Some(Value::Prim(Primitive::Int(bound))) => Some(bound),
        _ => None,
    }
}

fn range_is_empty(module: &IrModule, v: &Value) -> BuiltinResult {
    match (range_bound(module, v, "first"), range_bound(module, v, "last")) {
        (Some(first), Some(last)) => Ok(Value::bool(first > last)),
        _ => Err(exceptions::illegal_argument(module, "malformed range".to_string())),
    }
}

fn range_to_string(module: &IrModule, v: &Value) -> BuiltinResult {
    match (range_bound(module, v, "first"), range_bound(module, v, "last")) {
        (Some(first), Some(last)) => Ok(Value::str(format!("{first}..{last}"))),
        _ => Err(exceptions::illegal_argument(module, "malformed range".to_string())),
    }
}

fn throwable_message(module: &IrModule, v: &Value) -> BuiltinResult {
    match v {
        Value::Exception(exc) => Ok(match &exc.message {
            Some(message) => Value::str(message),
            None => Value::NULL,
        }),
        other => Err(exceptions::illegal_argument(
            module,
            format!("expected a Throwable, got {}", other.type_name(module)),
        )),
    }
}

fn throwable_cause(module: &IrModule, v: &Value) -> BuiltinResult {
    match v {
        Value::Exception(exc) => Ok(match &exc.cause {
            Some(cause) => Value::Exception((**cause).clone()),
            None => Value::NULL,
        }),
        other => Err(exceptions::illegal_argument(
            module,
            format!("expected a Throwable, got {}", other.type_name(module)),
        )),
    }
}

fn array_of(module: &IrModule, v: &Value) -> BuiltinResult {
    match v {
        Value::Wrapped(HostValue::Array { .. }) => Ok(v.clone()),
        other => Err(exceptions::illegal_argument(
            module,
            format!("expected an Array, got {}", other.type_name(module)),
        )),
    }
}
