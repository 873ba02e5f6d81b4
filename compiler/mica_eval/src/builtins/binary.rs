//! Arity-2 built-ins: receiver plus one argument, or two top-level
//! arguments.
//!
//! Numeric arithmetic runs at the width of the most precise argument.
//! Integral arithmetic wraps, matching the source language's host; only
//! division and remainder by zero raise.

use std::cmp::Ordering;

use mica_ir::{IrModule, PrimitiveKind};

use crate::exceptions::{self, ExceptionValue};
use crate::value::{Primitive, Value};

use super::{BuiltinResult, BuiltinTables, NUMERIC};

pub(super) fn register(t: &mut BuiltinTables) {
    for lhs in NUMERIC {
        for rhs in NUMERIC {
            t.binary("plus", lhs, rhs, num_plus);
            t.binary("minus", lhs, rhs, num_minus);
            t.binary("times", lhs, rhs, num_times);
            t.binary("div", lhs, rhs, num_div);
            t.binary("rem", lhs, rhs, num_rem);
            t.binary("compareTo", lhs, rhs, num_compare);
        }
    }
    t.binary("compareTo", "Byte", "Byte", num_compare);
    t.binary("compareTo", "Short", "Short", num_compare);
    t.binary("compareTo", "Char", "Char", char_compare);
    t.binary("compareTo", "String", "String", str_compare);
    t.binary("compareTo", "Boolean", "Boolean", bool_compare);
    t.binary("compareTo", "Enum", "Enum", enum_compare);

    for ty in ["Int", "Long"] {
        t.binary("and", ty, ty, bit_and);
        t.binary("or", ty, ty, bit_or);
        t.binary("xor", ty, ty, bit_xor);
        t.binary("shl", ty, "Int", shl);
        t.binary("shr", ty, "Int", shr);
        t.binary("ushr", ty, "Int", ushr);
    }
    t.binary("and", "Boolean", "Boolean", bool_and);
    t.binary("or", "Boolean", "Boolean", bool_or);
    t.binary("xor", "Boolean", "Boolean", bool_xor);

    t.binary("plus", "Char", "Int", char_plus);
    t.binary("minus", "Char", "Char", char_minus_char);
    t.binary("minus", "Char", "Int", char_minus_int);

    t.binary("get", "String", "Int", str_get);
    t.binary("substring", "String", "Int", str_substring_from);
    t.binary("indexOf", "String", "String", str_index_of);
    t.binary("contains", "String", "String", str_contains);
    t.binary("startsWith", "String", "String", str_starts_with);
    t.binary("endsWith", "String", "String", str_ends_with);

    t.binary("contains", "IntRange", "Int", range_contains);

    t.binary("equals", "Any", "Any", structural_equals);

    for ty in ["Int", "Long", "Float", "Double", "Char", "String"] {
        t.binary("less", ty, ty, less);
        t.binary("lessOrEqual", ty, ty, less_or_equal);
        t.binary("greater", ty, ty, greater);
        t.binary("greaterOrEqual", ty, ty, greater_or_equal);
    }
}

// ── Numeric arithmetic ──────────────────────────────────────────────────

#[derive(Copy, Clone)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

fn widen(a: PrimitiveKind, b: PrimitiveKind) -> PrimitiveKind {
    use PrimitiveKind::{Double, Float, Long};
    if a == Double || b == Double {
        Double
    } else if a == Float || b == Float {
        Float
    } else if a == Long || b == Long {
        Long
    } else {
        PrimitiveKind::Int
    }
}

fn prim<'v>(module: &IrModule, v: &'v Value) -> Result<&'v Primitive, ExceptionValue> {
    match v {
        Value::Prim(p) => Ok(p),
        other => Err(exceptions::illegal_argument(
            module,
            format!("expected a primitive, got {}", other.type_name(module)),
        )),
    }
}

fn numeric_pair(
    module: &IrModule,
    a: &Value,
    b: &Value,
) -> Result<(Primitive, Primitive), ExceptionValue> {
    let pa = prim(module, a)?;
    let pb = prim(module, b)?;
    if pa.as_f64().is_none() || pb.as_f64().is_none() {
        return Err(exceptions::illegal_argument(
            module,
            format!(
                "cannot apply a numeric operator to {} and {}",
                pa.type_string(),
                pb.type_string()
            ),
        ));
    }
    Ok((pa.clone(), pb.clone()))
}

fn apply_arith(module: &IrModule, a: &Value, b: &Value, op: ArithOp) -> BuiltinResult {
    let (pa, pb) = numeric_pair(module, a, b)?;
    match widen(pa.kind(), pb.kind()) {
        PrimitiveKind::Int => {
            #[allow(clippy::cast_possible_truncation, reason = "operands are Int-width or narrower")]
            let (x, y) = (int_operand(&pa) as i32, int_operand(&pb) as i32);
            let value = match op {
                ArithOp::Add => x.wrapping_add(y),
                ArithOp::Sub => x.wrapping_sub(y),
                ArithOp::Mul => x.wrapping_mul(y),
                ArithOp::Div => {
                    if y == 0 {
                        return Err(exceptions::arithmetic(module, "/ by zero"));
                    }
                    x.wrapping_div(y)
                }
                ArithOp::Rem => {
                    if y == 0 {
                        return Err(exceptions::arithmetic(module, "/ by zero"));
                    }
                    x.wrapping_rem(y)
                }
            };
            Ok(Value::int(value))
        }
        PrimitiveKind::Long => {
            let (x, y) = (int_operand(&pa), int_operand(&pb));
            let value = match op {
                ArithOp::Add => x.wrapping_add(y),
                ArithOp::Sub => x.wrapping_sub(y),
                ArithOp::Mul => x.wrapping_mul(y),
                ArithOp::Div => {
                    if y == 0 {
                        return Err(exceptions::arithmetic(module, "/ by zero"));
                    }
                    x.wrapping_div(y)
                }
                ArithOp::Rem => {
                    if y == 0 {
                        return Err(exceptions::arithmetic(module, "/ by zero"));
                    }
                    x.wrapping_rem(y)
                }
            };
            Ok(Value::long(value))
        }
        PrimitiveKind::Float => {
            #[allow(clippy::cast_possible_truncation, reason = "Float result width is f32")]
            let (x, y) = (float_operand(&pa) as f32, float_operand(&pb) as f32);
            let value = match op {
                ArithOp::Add => x + y,
                ArithOp::Sub => x - y,
                ArithOp::Mul => x * y,
                ArithOp::Div => x / y,
                ArithOp::Rem => x % y,
            };
            Ok(Value::Prim(Primitive::Float(value)))
        }
        _ => {
            let (x, y) = (float_operand(&pa), float_operand(&pb));
            let value = match op {
                ArithOp::Add => x + y,
                ArithOp::Sub => x - y,
                ArithOp::Mul => x * y,
                ArithOp::Div => x / y,
                ArithOp::Rem => x % y,
            };
            Ok(Value::double(value))
        }
    }
}

fn int_operand(p: &Primitive) -> i64 {
    p.as_i64().unwrap_or_default()
}

fn float_operand(p: &Primitive) -> f64 {
    p.as_f64().unwrap_or_default()
}

fn num_plus(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    apply_arith(module, a, b, ArithOp::Add)
}

fn num_minus(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    apply_arith(module, a, b, ArithOp::Sub)
}

fn num_times(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    apply_arith(module, a, b, ArithOp::Mul)
}

fn num_div(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    apply_arith(module, a, b, ArithOp::Div)
}

fn num_rem(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    apply_arith(module, a, b, ArithOp::Rem)
}

// ── Comparison ──────────────────────────────────────────────────────────

fn compare_prims(module: &IrModule, a: &Value, b: &Value) -> Result<Ordering, ExceptionValue> {
    let pa = prim(module, a)?;
    let pb = prim(module, b)?;
    match (pa, pb) {
        (Primitive::Char(x), Primitive::Char(y)) => Ok(x.cmp(y)),
        (Primitive::Str(x), Primitive::Str(y)) => Ok(x.cmp(y)),
        (Primitive::Bool(x), Primitive::Bool(y)) => Ok(x.cmp(y)),
        _ => {
            if let (Some(x), Some(y)) = (pa.as_i64(), pb.as_i64()) {
                return Ok(x.cmp(&y));
            }
            match (pa.as_f64(), pb.as_f64()) {
                // IEEE 754 total ordering, so NaN compares deterministically.
                (Some(x), Some(y)) => Ok(x.total_cmp(&y)),
                _ => Err(exceptions::illegal_argument(
                    module,
                    format!(
                        "cannot compare {} and {}",
                        pa.type_string(),
                        pb.type_string()
                    ),
                )),
            }
        }
    }
}

fn ordering_to_int(ordering: Ordering) -> Value {
    Value::int(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

fn num_compare(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    Ok(ordering_to_int(compare_prims(module, a, b)?))
}

fn char_compare(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    Ok(ordering_to_int(compare_prims(module, a, b)?))
}

fn str_compare(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    Ok(ordering_to_int(compare_prims(module, a, b)?))
}

fn bool_compare(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    Ok(ordering_to_int(compare_prims(module, a, b)?))
}

fn enum_ordinal(module: &IrModule, v: &Value) -> Result<i32, ExceptionValue> {
    let bad = || {
        exceptions::illegal_argument(module, "expected an enum value".to_string())
    };
    let obj = v.as_object().ok_or_else(bad)?;
    let field = module
        .find_field(module.builtins.enum_class, "ordinal")
        .ok_or_else(bad)?;
    match crate::value::get_field(obj, field) {
        Some(Value::Prim(Primitive::Int(ordinal))) => Ok(ordinal),
        _ => Err(bad()),
    }
}

fn enum_compare(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let x = enum_ordinal(module, a)?;
    let y = enum_ordinal(module, b)?;
    Ok(ordering_to_int(x.cmp(&y)))
}

fn less(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    Ok(Value::bool(compare_prims(module, a, b)? == Ordering::Less))
}

fn less_or_equal(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    Ok(Value::bool(compare_prims(module, a, b)? != Ordering::Greater))
}

fn greater(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    Ok(Value::bool(compare_prims(module, a, b)? == Ordering::Greater))
}

fn greater_or_equal(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    Ok(Value::bool(compare_prims(module, a, b)? != Ordering::Less))
}

/// Structural equality for primitives. User objects are resolved through
/// `equals` dispatch before built-in lookup and never reach this entry.
fn structural_equals(_module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let equal = match (a, b) {
        (Value::Prim(x), Value::Prim(y)) => x == y,
        _ => false,
    };
    Ok(Value::bool(equal))
}

// ── Bitwise ─────────────────────────────────────────────────────────────

fn bit_pair(module: &IrModule, a: &Value, b: &Value) -> Result<(Primitive, Primitive), ExceptionValue> {
    Ok((prim(module, a)?.clone(), prim(module, b)?.clone()))
}

fn bit_and(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match bit_pair(module, a, b)? {
        (Primitive::Int(x), Primitive::Int(y)) => Ok(Value::int(x & y)),
        (Primitive::Long(x), Primitive::Long(y)) => Ok(Value::long(x & y)),
        (x, y) => Err(bitwise_mismatch(module, &x, &y)),
    }
}

fn bit_or(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match bit_pair(module, a, b)? {
        (Primitive::Int(x), Primitive::Int(y)) => Ok(Value::int(x | y)),
        (Primitive::Long(x), Primitive::Long(y)) => Ok(Value::long(x | y)),
        (x, y) => Err(bitwise_mismatch(module, &x, &y)),
    }
}

fn bit_xor(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match bit_pair(module, a, b)? {
        (Primitive::Int(x), Primitive::Int(y)) => Ok(Value::int(x ^ y)),
        (Primitive::Long(x), Primitive::Long(y)) => Ok(Value::long(x ^ y)),
        (x, y) => Err(bitwise_mismatch(module, &x, &y)),
    }
}

fn bitwise_mismatch(module: &IrModule, a: &Primitive, b: &Primitive) -> ExceptionValue {
    exceptions::illegal_argument(
        module,
        format!(
            "cannot apply a bitwise operator to {} and {}",
            a.type_string(),
            b.type_string()
        ),
    )
}

// Shift counts mask to the receiver width, as on the host.

fn shl(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match bit_pair(module, a, b)? {
        (Primitive::Int(x), Primitive::Int(s)) => Ok(Value::int(x.wrapping_shl(s.cast_unsigned()))),
        (Primitive::Long(x), Primitive::Int(s)) => {
            Ok(Value::long(x.wrapping_shl(s.cast_unsigned())))
        }
        (x, y) => Err(bitwise_mismatch(module, &x, &y)),
    }
}

fn shr(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match bit_pair(module, a, b)? {
        (Primitive::Int(x), Primitive::Int(s)) => Ok(Value::int(x.wrapping_shr(s.cast_unsigned()))),
        (Primitive::Long(x), Primitive::Int(s)) => {
            Ok(Value::long(x.wrapping_shr(s.cast_unsigned())))
        }
        (x, y) => Err(bitwise_mismatch(module, &x, &y)),
    }
}

fn ushr(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match bit_pair(module, a, b)? {
        (Primitive::Int(x), Primitive::Int(s)) => {
            Ok(Value::int(x.cast_unsigned().wrapping_shr(s.cast_unsigned()).cast_signed()))
        }
        (Primitive::Long(x), Primitive::Int(s)) => {
            Ok(Value::long(x.cast_unsigned().wrapping_shr(s.cast_unsigned()).cast_signed()))
        }
        (x, y) => Err(bitwise_mismatch(module, &x, &y)),
    }
}

// ── Boolean ─────────────────────────────────────────────────────────────

// Both operands were evaluated eagerly before dispatch; short-circuit
// semantics are expressed as `when` lowering in the IR, not here.

fn bool_pair(module: &IrModule, a: &Value, b: &Value) -> Result<(bool, bool), ExceptionValue> {
    match (prim(module, a)?, prim(module, b)?) {
        (Primitive::Bool(x), Primitive::Bool(y)) => Ok((*x, *y)),
        (x, y) => Err(exceptions::illegal_argument(
            module,
            format!(
                "cannot apply a boolean operator to {} and {}",
                x.type_string(),
                y.type_string()
            ),
        )),
    }
}

fn bool_and(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let (x, y) = bool_pair(module, a, b)?;
    Ok(Value::bool(x && y))
}

fn bool_or(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let (x, y) = bool_pair(module, a, b)?;
    Ok(Value::bool(x || y))
}

fn bool_xor(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let (x, y) = bool_pair(module, a, b)?;
    Ok(Value::bool(x ^ y))
}

// ── Char ────────────────────────────────────────────────────────────────

fn char_plus(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match (prim(module, a)?, prim(module, b)?) {
        (Primitive::Char(c), Primitive::Int(n)) => char_from_code(module, (*c as i32).wrapping_add(*n)),
        _ => Err(exceptions::illegal_argument(module, "expected Char + Int".to_string())),
    }
}

fn char_minus_char(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match (prim(module, a)?, prim(module, b)?) {
        (Primitive::Char(x), Primitive::Char(y)) => {
            Ok(Value::int((*x as i32).wrapping_sub(*y as i32)))
        }
        _ => Err(exceptions::illegal_argument(module, "expected Char - Char".to_string())),
    }
}

fn char_minus_int(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match (prim(module, a)?, prim(module, b)?) {
        (Primitive::Char(c), Primitive::Int(n)) => char_from_code(module, (*c as i32).wrapping_sub(*n)),
        _ => Err(exceptions::illegal_argument(module, "expected Char - Int".to_string())),
    }
}

fn char_from_code(module: &IrModule, code: i32) -> BuiltinResult {
    match char::from_u32(code.cast_unsigned()) {
        Some(c) => Ok(Value::Prim(Primitive::Char(c))),
        None => Err(exceptions::illegal_argument(
            module,
            format!("invalid char code {code}"),
        )),
    }
}

// ── String ──────────────────────────────────────────────────────────────

fn str_pair<'v>(
    module: &IrModule,
    a: &'v Value,
    b: &'v Value,
) -> Result<(&'v str, &'v str), ExceptionValue> {
    match (prim(module, a)?, prim(module, b)?) {
        (Primitive::Str(x), Primitive::Str(y)) => Ok((x, y)),
        _ => Err(exceptions::illegal_argument(
            module,
            "expected String arguments".to_string(),
        )),
    }
}

fn str_get(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match (prim(module, a)?, prim(module, b)?) {
        (Primitive::Str(s), Primitive::Int(index)) => {
            let found = usize::try_from(*index)
                .ok()
                .and_then(|index| s.chars().nth(index));
            match found {
                Some(c) => Ok(Value::Prim(Primitive::Char(c))),
                None => Err(exceptions::index_out_of_bounds(
                    module,
                    format!("String index out of range: {index}"),
                )),
            }
        }
        _ => Err(exceptions::illegal_argument(module, "expected String.get(Int)".to_string())),
    }
}

fn str_substring_from(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    match (prim(module, a)?, prim(module, b)?) {
        (Primitive::Str(s), Primitive::Int(start)) => {
            let chars: Vec<char> = s.chars().collect();
            let start_ix = usize::try_from(*start).ok();
            match start_ix {
                Some(ix) if ix <= chars.len() => {
                    Ok(Value::str(chars[ix..].iter().collect::<String>()))
                }
                _ => Err(exceptions::index_out_of_bounds(
                    module,
                    format!("begin {start}, length {}", chars.len()),
                )),
            }
        }
        _ => Err(exceptions::illegal_argument(module, "expected substring(Int)".to_string())),
    }
}

fn str_index_of(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let (s, needle) = str_pair(module, a, b)?;
    match s.find(needle) {
        #[allow(clippy::cast_possible_truncation, reason = "string lengths fit Int width")]
        Some(byte_ix) => Ok(Value::int(s[..byte_ix].chars().count() as i32)),
        None => Ok(Value::int(-1)),
    }
}

fn str_contains(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let (s, needle) = str_pair(module, a, b)?;
    Ok(Value::bool(s.contains(needle)))
}

fn str_starts_with(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let (s, prefix) = str_pair(module, a, b)?;
    Ok(Value::bool(s.starts_with(prefix)))
}

fn str_ends_with(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let (s, suffix) = str_pair(module, a, b)?;
    Ok(Value::bool(s.ends_with(suffix)))
}

// ── Range ───────────────────────────────────────────────────────────────

fn range_contains(module: &IrModule, a: &Value, b: &Value) -> BuiltinResult {
    let first = super::unary::range_bound(module, a, "first");
    let last = super::unary::range_bound(module, a, "last");
    match (first, last, prim(module, b)?) {
        (Some(first), Some(last), Primitive::Int(v)) => {
            Ok(Value::bool(first <= *v && *v <= last))
        }
        _ => Err(exceptions::illegal_argument(module, "malformed range".to_string())),
    }
}
