//! Host-backed classes.
//!
//! Classes carrying the intrinsic marker delegate construction and member
//! behavior to the host runtime. Lookups are total for marked classes:
//! a missing binding is an interpreter error, never a silent fall-through.
//!
//! - `Regex`: compiled patterns over the host regex engine
//! - `StringBuilder`: a mutable host string buffer
//! - `Array`: the mutable host buffer behind array values
//! - `UInt`/`ULong`: unsigned reinterpretation of the signed backing field

mod array;
mod regex;
mod string_builder;
mod unsigned;

use mica_ir::{ClassId, FunId, Name};

use crate::errors;
use crate::signal::ExecResult;
use crate::value::{HostValue, Value};
use crate::Interpreter;

/// Whether the host provides the constructor for this intrinsic key.
/// `Long`, `Char`, and `Array` construction is evaluator-handled; the
/// unsigned classes construct as ordinary user objects.
pub(crate) fn constructs_hosted(key: &str) -> bool {
    matches!(key, "Regex" | "StringBuilder")
}

/// Whether instance members of this intrinsic key dispatch to static host
/// implementations (receivers that are user objects, not host wrappers).
pub(crate) fn handles_members(key: &str) -> bool {
    matches!(key, "UInt" | "ULong")
}

/// Constructor table, keyed by the class's intrinsic key.
pub(crate) fn construct(
    interp: &mut Interpreter<'_>,
    key: &str,
    ctor: FunId,
    args: &[Value],
) -> ExecResult {
    match key {
        "Regex" => regex::construct(interp, args),
        "StringBuilder" => string_builder::construct(interp, ctor, args),
        _ => Err(errors::missing_intrinsic(key, "<init>").into()),
    }
}

/// Instance-method dispatch for host-wrapped receivers.
pub(crate) fn call_wrapped(
    interp: &mut Interpreter<'_>,
    fun: FunId,
    host: &HostValue,
    args: &[Value],
) -> ExecResult {
    let name = interp.module.name(interp.module.function(fun).name);
    match host {
        HostValue::Regex(regex) => regex::call(interp, regex, name, args),
        HostValue::Array { elems } => array::call(interp, elems, name, args),
        HostValue::StringBuilder(content) => string_builder::call(interp, content, name, args),
    }
}

/// Static host implementations for intrinsic members whose receivers are
/// user objects (the unsigned classes).
pub(crate) fn call_member(
    interp: &mut Interpreter<'_>,
    key: &str,
    fun: FunId,
    receiver: Option<&Value>,
    args: &[Value],
) -> ExecResult {
    let name = interp.module.name(interp.module.function(fun).name);
    match key {
        "UInt" | "ULong" => unsigned::call(interp, key, name, receiver, args),
        _ => Err(errors::missing_intrinsic(key, name).into()),
    }
}

/// Companion-object accessor. No intrinsic class in the built-in table
/// carries a host companion; a hit here means the module was assembled
/// against a host the wrapper layer does not know.
pub(crate) fn companion(
    _interp: &mut Interpreter<'_>,
    key: &str,
    _class: ClassId,
) -> ExecResult {
    Err(errors::missing_intrinsic(key, "Companion").into())
}

/// `valueOf` for intrinsic enum classes. As with companions, no such
/// class ships in the built-in table.
pub(crate) fn host_enum_value(
    interp: &mut Interpreter<'_>,
    key: &str,
    _class: ClassId,
    entry: Name,
) -> ExecResult {
    let member = interp.module.name(entry);
    Err(errors::missing_intrinsic(key, member).into())
}
