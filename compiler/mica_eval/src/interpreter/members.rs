//! `toString`/`equals`/`hashCode` resolution.
//!
//! String conversion and equality dispatch through the overridden-method
//! resolver for user objects, fall back to derived members for data
//! classes and enums, and bottom out in structural defaults that are
//! deterministic across evaluator instances.

use std::rc::Rc;

use mica_ir::ClassKind;

use crate::errors;
use crate::signal::Interrupt;
use crate::value::{self, HostValue, ObjRef, Primitive, Value};

use super::Interpreter;

/// FNV-1a parameters for the structural default `hashCode`.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Structural hash of a primitive, shared with the built-in `hashCode`
/// entries. Deterministic across evaluator instances.
pub(crate) fn hash_primitive(p: &Primitive) -> i32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in p
        .type_string()
        .bytes()
        .chain(format_primitive(p).bytes())
    {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    fold_hash(hash)
}

#[allow(clippy::cast_possible_truncation, reason = "folding a 64-bit hash to Int width")]
fn fold_hash(hash: u64) -> i32 {
    (hash ^ (hash >> 32)) as u32 as i32
}

/// Host formatting of a primitive, matching the source language's
/// conventions (doubles always carry a decimal point, `null` is literal).
pub(crate) fn format_primitive(p: &Primitive) -> String {
    match p {
        Primitive::Null => "null".to_string(),
        Primitive::Unit => "Unit".to_string(),
        Primitive::Bool(v) => v.to_string(),
        Primitive::Char(v) => v.to_string(),
        Primitive::Byte(v) => v.to_string(),
        Primitive::Short(v) => v.to_string(),
        Primitive::Int(v) => v.to_string(),
        Primitive::Long(v) => v.to_string(),
        Primitive::Float(v) => format!("{v:?}"),
        Primitive::Double(v) => format!("{v:?}"),
        Primitive::Str(v) => v.to_string(),
    }
}

impl Interpreter<'_> {
    /// Convert any value to its string form, dispatching `toString`
    /// overrides for user objects.
    pub(crate) fn stringify(&mut self, value: &Value) -> Result<String, Interrupt> {
        let module = self.module;
        match value {
            Value::Prim(p) => Ok(format_primitive(p)),
            Value::Wrapped(host) => match host {
                HostValue::Regex(regex) => Ok(regex.pattern.clone()),
                HostValue::StringBuilder(content) => Ok(content.borrow().clone()),
                HostValue::Array { elems } => {
                    let elems: Vec<Value> = elems.borrow().clone();
                    let mut out = String::from("[");
                    for (i, elem) in elems.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&self.stringify(elem)?);
                    }
                    out.push(']');
                    Ok(out)
                }
            },
            Value::Lambda(lambda) => {
                let name = module.name(module.function(lambda.function).name);
                Ok(format!("<function {name}>"))
            }
            Value::Exception(exc) => Ok(match &exc.message {
                Some(message) => format!("{}: {message}", exc.class_name(module)),
                None => exc.class_name(module).to_string(),
            }),
            Value::Object(obj) => self.stringify_object(&obj.clone()),
        }
    }

    fn stringify_object(&mut self, obj: &ObjRef) -> Result<String, Interrupt> {
        let module = self.module;
        let class_id = obj.borrow().class;

        // User override first.
        let any_to_string = module
            .find_method(module.builtins.any, "toString", &[])
            .ok_or_else(|| errors::missing_body("Any.toString"))?;
        if let Some(target) = module.resolve_override(class_id, any_to_string) {
            if module.function(target).body.is_some() {
                let result =
                    self.invoke_function(target, Some(Value::Object(obj.clone())), None, vec![], 0)?;
                return match result {
                    Value::Prim(Primitive::Str(s)) => Ok(s.to_string()),
                    other => Err(errors::unsupported_node(&format!(
                        "toString returned {}",
                        other.type_name(module)
                    ))
                    .into()),
                };
            }
        }

        let decl = module.class(class_id);
        let class_name = module.name(decl.name);

        // Enum entries print their name.
        if decl.kind == ClassKind::EnumClass {
            if let Some(name) = self.enum_entry_name(obj) {
                return Ok(name);
            }
        }

        // Data classes print `Class(field=value, ...)`.
        if decl.is_data {
            let mut out = String::from(class_name);
            out.push('(');
            for (i, &field) in decl.fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(module.name(module.field(field).name));
                out.push('=');
                match value::get_field(obj, field) {
                    Some(v) => out.push_str(&self.stringify(&v)?),
                    None => out.push_str("null"),
                }
            }
            out.push(')');
            return Ok(out);
        }

        // Structural default, deterministic across evaluations.
        let hash = self.hash_value(&Value::Object(obj.clone()))?.cast_unsigned();
        Ok(format!("{class_name}@{hash:x}"))
    }

    fn enum_entry_name(&self, obj: &ObjRef) -> Option<String> {
        let module = self.module;
        let name_field = module.find_field(module.builtins.enum_class, "name")?;
        match value::get_field(obj, name_field) {
            Some(Value::Prim(Primitive::Str(s))) => Some(s.to_string()),
            _ => None,
        }
    }

    /// Structural equality: primitives by value, user objects through
    /// `equals` overrides, data classes field-wise, everything else by
    /// identity.
    pub(crate) fn values_equal(&mut self, a: &Value, b: &Value) -> Result<bool, Interrupt> {
        let module = self.module;
        match (a, b) {
            (Value::Prim(x), Value::Prim(y)) => Ok(x == y),
            (Value::Object(x), Value::Object(y)) => {
                if Rc::ptr_eq(x, y) {
                    return Ok(true);
                }
                let class_id = x.borrow().class;

                let any_equals = module
                    .find_method(module.builtins.any, "equals", &["Any"])
                    .ok_or_else(|| errors::missing_body("Any.equals"))?;
                if let Some(target) = module.resolve_override(class_id, any_equals) {
                    if module.function(target).body.is_some() {
                        let result = self.invoke_function(
                            target,
                            Some(a.clone()),
                            None,
                            vec![b.clone()],
                            0,
                        )?;
                        return self.expect_bool(&result);
                    }
                }

                let decl = module.class(class_id);
                if decl.is_data && y.borrow().class == class_id {
                    for &field in &decl.fields {
                        let fx = value::get_field(x, field);
                        let fy = value::get_field(y, field);
                        let equal = match (fx, fy) {
                            (Some(fx), Some(fy)) => self.values_equal(&fx, &fy)?,
                            (None, None) => true,
                            _ => false,
                        };
                        if !equal {
                            return Ok(false);
                        }
                    }
                    return Ok(true);
                }
                Ok(false)
            }
            (Value::Exception(x), Value::Exception(y)) => {
                Ok(x.class == y.class && x.message == y.message)
            }
            (Value::Wrapped(x), Value::Wrapped(y)) => Ok(match (x, y) {
                (HostValue::Regex(a), HostValue::Regex(b)) => Rc::ptr_eq(a, b),
                (HostValue::Array { elems: a }, HostValue::Array { elems: b }) => Rc::ptr_eq(a, b),
                (HostValue::StringBuilder(a), HostValue::StringBuilder(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }),
            _ => Ok(false),
        }
    }

    /// Structural FNV-1a hash. Deterministic across evaluator instances,
    /// so repeated evaluation of a `hashCode`-dependent expression folds
    /// to the same constant.
    pub(crate) fn hash_value(&mut self, value: &Value) -> Result<i32, Interrupt> {
        let mut hash = FNV_OFFSET_BASIS;
        self.hash_into(value, &mut hash)?;
        Ok(fold_hash(hash))
    }

    fn hash_into(&mut self, value: &Value, hash: &mut u64) -> Result<(), Interrupt> {
        fn feed(hash: &mut u64, bytes: &[u8]) {
            for &byte in bytes {
                *hash ^= u64::from(byte);
                *hash = hash.wrapping_mul(FNV_PRIME);
            }
        }
        match value {
            Value::Prim(p) => {
                feed(hash, p.type_string().as_bytes());
                feed(hash, format_primitive(p).as_bytes());
            }
            Value::Object(obj) => {
                let module = self.module;
                let class_id = obj.borrow().class;
                let decl = module.class(class_id);

                // User hashCode override wins.
                let any_hash = module
                    .find_method(module.builtins.any, "hashCode", &[])
                    .ok_or_else(|| errors::missing_body("Any.hashCode"))?;
                if let Some(target) = module.resolve_override(class_id, any_hash) {
                    if module.function(target).body.is_some() {
                        let result = self.invoke_function(
                            target,
                            Some(value.clone()),
                            None,
                            vec![],
                            0,
                        )?;
                        if let Value::Prim(Primitive::Int(v)) = result {
                            feed(hash, &v.to_le_bytes());
                            return Ok(());
                        }
                        return Err(errors::unsupported_node("hashCode returned non-Int").into());
                    }
                }

                feed(hash, module.name(decl.name).as_bytes());
                for &field in &decl.fields {
                    if let Some(v) = value::get_field(obj, field) {
                        self.hash_into(&v, hash)?;
                    }
                }
                // Enum identity comes from the super instance's name slot.
                if decl.kind == ClassKind::EnumClass {
                    if let Some(name) = self.enum_entry_name(obj) {
                        feed(hash, name.as_bytes());
                    }
                }
            }
            Value::Wrapped(_) | Value::Lambda(_) => feed(hash, b"<host>"),
            Value::Exception(exc) => {
                feed(hash, exc.class_name(self.module).as_bytes());
            }
        }
        Ok(())
    }

    /// The derived member defaults reached when dispatch bottoms out in a
    /// body-less `Any` member with a user-object receiver.
    pub(super) fn object_default_member(
        &mut self,
        name: &str,
        receiver: &Value,
        args: &[Value],
    ) -> Result<Option<Value>, Interrupt> {
        match name {
            "toString" => {
                let Value::Object(obj) = receiver else {
                    return Ok(None);
                };
                Ok(Some(Value::str(self.stringify_object(&obj.clone())?)))
            }
            "equals" => {
                let Some(other) = args.first() else {
                    return Ok(None);
                };
                Ok(Some(Value::bool(self.values_equal(receiver, other)?)))
            }
            "hashCode" => Ok(Some(Value::int(self.hash_value(receiver)?))),
            _ => Ok(None),
        }
    }
}
