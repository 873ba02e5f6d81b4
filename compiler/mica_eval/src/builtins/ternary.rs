//! Arity-3 built-ins.

use mica_ir::IrModule;

use crate::exceptions;
use crate::value::{Primitive, Value};

use super::{BuiltinResult, BuiltinTables};

pub(super) fn register(t: &mut BuiltinTables) {
    t.ternary("substring", "String", "Int", "Int", str_substring);
}

fn str_substring(module: &IrModule, a: &Value, b: &Value, c: &Value) -> BuiltinResult {
    let (s, start, end) = match (a, b, c) {
        (
            Value::Prim(Primitive::Str(s)),
            Value::Prim(Primitive::Int(start)),
            Value::Prim(Primitive::Int(end)),
        ) => (s, *start, *end),
        _ => {
            return Err(exceptions::illegal_argument(
                module,
                "expected substring(Int, Int)".to_string(),
            ))
        }
    };
    let chars: Vec<char> = s.chars().collect();
    let bounds = usize::try_from(start)
        .ok()
        .zip(usize::try_from(end).ok())
        .filter(|&(start, end)| start <= end && end <= chars.len());
    match bounds {
        Some((start, end)) => Ok(Value::str(chars[start..end].iter().collect::<String>())),
        None => Err(exceptions::index_out_of_bounds(
            module,
            format!("begin {start}, end {end}, length {}", chars.len()),
        )),
    }
}
