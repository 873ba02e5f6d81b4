//! The host regex class.
//!
//! Construction compiles the pattern twice: once as written for searches,
//! once anchored to the whole input for `matches`. An invalid pattern is
//! the evaluated program's mistake and raises `IllegalArgumentException`.

use std::rc::Rc;

use crate::errors;
use crate::exceptions;
use crate::signal::{ExecResult, Interrupt};
use crate::value::{HostValue, Primitive, RegexHost, Value};
use crate::Interpreter;

pub(super) fn construct(interp: &mut Interpreter<'_>, args: &[Value]) -> ExecResult {
    let pattern = expect_str(interp, args.first())?;
    let compiled = ::regex::Regex::new(&pattern);
    let anchored = ::regex::Regex::new(&format!("\\A(?:{pattern})\\z"));
    match (compiled, anchored) {
        (Ok(regex), Ok(anchored)) => Ok(Value::Wrapped(HostValue::Regex(Rc::new(RegexHost {
            pattern,
            regex,
            anchored,
        })))),
        (Err(error), _) | (_, Err(error)) => Err(interp.raise(exceptions::illegal_argument(
            interp.module,
            error.to_string(),
        ))),
    }
}

pub(super) fn call(
    interp: &mut Interpreter<'_>,
    host: &Rc<RegexHost>,
    name: &str,
    args: &[Value],
) -> ExecResult {
    match name {
        "matches" => {
            let input = expect_str(interp, args.first())?;
            Ok(Value::bool(host.anchored.is_match(&input)))
        }
        "containsMatchIn" => {
            let input = expect_str(interp, args.first())?;
            Ok(Value::bool(host.regex.is_match(&input)))
        }
        "replace" => {
            let input = expect_str(interp, args.first())?;
            let replacement = expect_str(interp, args.get(1))?;
            Ok(Value::str(
                host.regex.replace_all(&input, replacement.as_str()),
            ))
        }
        "find" => {
            let input = expect_str(interp, args.first())?;
            Ok(match host.regex.find(&input) {
                Some(found) => Value::str(found.as_str()),
                None => Value::NULL,
            })
        }
        "toString" => Ok(Value::str(&host.pattern)),
        other => Err(errors::missing_intrinsic("Regex", other).into()),
    }
}

fn expect_str(interp: &Interpreter<'_>, value: Option<&Value>) -> Result<String, Interrupt> {
    match value {
        Some(Value::Prim(Primitive::Str(s))) => Ok(s.to_string()),
        Some(other) => Err(errors::missing_intrinsic(
            "Regex",
            &format!("argument of type {}", other.type_name(interp.module)),
        )
        .into()),
        None => Err(errors::missing_argument("Regex", 0).into()),
    }
}
