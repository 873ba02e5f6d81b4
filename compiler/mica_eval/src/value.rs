//! Runtime values.
//!
//! A value is one of five variants: a primitive, a host-wrapped object, a
//! user object, a lambda, or an exception. Objects and wrapped buffers use
//! `Rc` cells; evaluation is single-threaded by design, so `Rc`/`RefCell`
//! is the intended sharing primitive, mirroring how frames share values.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use mica_ir::{ClassId, ConstValue, FieldId, FunId, IrModule, PrimitiveKind, VarId};

use crate::exceptions::ExceptionValue;

/// A primitive value: the host representation plus its kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Null,
    Unit,
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Rc<str>),
}

impl Primitive {
    /// The IR kind this primitive materializes as.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Primitive::Null => PrimitiveKind::Nothing,
            Primitive::Unit => PrimitiveKind::Unit,
            Primitive::Bool(_) => PrimitiveKind::Boolean,
            Primitive::Char(_) => PrimitiveKind::Char,
            Primitive::Byte(_) => PrimitiveKind::Byte,
            Primitive::Short(_) => PrimitiveKind::Short,
            Primitive::Int(_) => PrimitiveKind::Int,
            Primitive::Long(_) => PrimitiveKind::Long,
            Primitive::Float(_) => PrimitiveKind::Float,
            Primitive::Double(_) => PrimitiveKind::Double,
            Primitive::Str(_) => PrimitiveKind::String,
        }
    }

    /// Stable type string, e.g. `"Int"`.
    pub fn type_string(&self) -> &'static str {
        self.kind().type_string()
    }

    pub fn from_const(value: &ConstValue) -> Primitive {
        match value {
            ConstValue::Null => Primitive::Null,
            ConstValue::Bool(v) => Primitive::Bool(*v),
            ConstValue::Char(v) => Primitive::Char(*v),
            ConstValue::Byte(v) => Primitive::Byte(*v),
            ConstValue::Short(v) => Primitive::Short(*v),
            ConstValue::Int(v) => Primitive::Int(*v),
            ConstValue::Long(v) => Primitive::Long(*v),
            ConstValue::Float(v) => Primitive::Float(*v),
            ConstValue::Double(v) => Primitive::Double(*v),
            ConstValue::Str(v) => Primitive::Str(Rc::from(v.as_str())),
        }
    }

    /// Convert back to an IR constant. `Unit` has no constant form.
    pub fn to_const(&self) -> Option<ConstValue> {
        match self {
            Primitive::Null => Some(ConstValue::Null),
            Primitive::Unit => None,
            Primitive::Bool(v) => Some(ConstValue::Bool(*v)),
            Primitive::Char(v) => Some(ConstValue::Char(*v)),
            Primitive::Byte(v) => Some(ConstValue::Byte(*v)),
            Primitive::Short(v) => Some(ConstValue::Short(*v)),
            Primitive::Int(v) => Some(ConstValue::Int(*v)),
            Primitive::Long(v) => Some(ConstValue::Long(*v)),
            Primitive::Float(v) => Some(ConstValue::Float(*v)),
            Primitive::Double(v) => Some(ConstValue::Double(*v)),
            Primitive::Str(v) => Some(ConstValue::Str(v.to_string())),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Primitive::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Primitive::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric view widened to `f64`; `None` for non-numerics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Primitive::Byte(v) => Some(f64::from(*v)),
            Primitive::Short(v) => Some(f64::from(*v)),
            Primitive::Int(v) => Some(f64::from(*v)),
            #[allow(clippy::cast_precision_loss, reason = "widening follows host semantics")]
            Primitive::Long(v) => Some(*v as f64),
            Primitive::Float(v) => Some(f64::from(*v)),
            Primitive::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view as `i64`; `None` for non-integrals.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Primitive::Byte(v) => Some(i64::from(*v)),
            Primitive::Short(v) => Some(i64::from(*v)),
            Primitive::Int(v) => Some(i64::from(*v)),
            Primitive::Long(v) => Some(*v),
            _ => None,
        }
    }
}

/// The mutable state of a user object.
///
/// `fields` holds the slots written at this level of the hierarchy; the
/// super-class portion lives in `super_instance`. The chain is built during
/// construction and is strictly acyclic.
#[derive(Debug)]
pub struct ObjectData {
    pub class: ClassId,
    pub fields: FxHashMap<FieldId, Value>,
    pub super_instance: Option<ObjRef>,
}

/// Shared reference to a user object.
pub type ObjRef = Rc<RefCell<ObjectData>>;

impl ObjectData {
    pub fn new(class: ClassId) -> ObjRef {
        Rc::new(RefCell::new(ObjectData {
            class,
            fields: FxHashMap::default(),
            super_instance: None,
        }))
    }
}

/// Read a field, walking the super-instance chain outward.
pub fn get_field(obj: &ObjRef, field: FieldId) -> Option<Value> {
    let data = obj.borrow();
    if let Some(value) = data.fields.get(&field) {
        return Some(value.clone());
    }
    data.super_instance
        .as_ref()
        .and_then(|parent| get_field(parent, field))
}

/// Write a field. An existing slot anywhere on the chain is mutated in
/// place; otherwise the slot is created on the instance level whose class
/// declares the field, falling back to the receiver itself.
pub fn set_field(module: &IrModule, obj: &ObjRef, field: FieldId, value: Value) {
    {
        let mut data = obj.borrow_mut();
        if data.fields.contains_key(&field) {
            data.fields.insert(field, value);
            return;
        }
    }
    let parent = obj.borrow().super_instance.clone();
    if let Some(parent) = parent {
        if chain_declares(module, &parent, field) {
            set_field(module, &parent, field, value);
            return;
        }
    }
    obj.borrow_mut().fields.insert(field, value);
}

fn chain_declares(module: &IrModule, obj: &ObjRef, field: FieldId) -> bool {
    let data = obj.borrow();
    if module.class(data.class).fields.contains(&field) {
        return true;
    }
    match &data.super_instance {
        Some(parent) => chain_declares(module, parent, field),
        None => false,
    }
}

/// Host regex state: the source pattern, the compiled pattern, and a
/// whole-input anchored variant for `matches`.
#[derive(Debug)]
pub struct RegexHost {
    pub pattern: String,
    pub regex: regex::Regex,
    pub anchored: regex::Regex,
}

/// A value whose behavior the host runtime supplies.
#[derive(Clone, Debug)]
pub enum HostValue {
    Regex(Rc<RegexHost>),
    Array {
        elems: Rc<RefCell<Vec<Value>>>,
    },
    StringBuilder(Rc<RefCell<String>>),
}

impl HostValue {
    /// The IR class standing in for this host object.
    pub fn class(&self, module: &IrModule) -> ClassId {
        match self {
            HostValue::Regex(_) => module.builtins.regex,
            HostValue::Array { .. } => module.builtins.array,
            HostValue::StringBuilder(_) => module.builtins.string_builder,
        }
    }
}

/// A first-class function value.
///
/// Captures a snapshot of the bindings visible at its creation site; free
/// variables resolve from that snapshot when the lambda is invoked.
#[derive(Clone, Debug)]
pub struct LambdaValue {
    pub function: FunId,
    pub interface: ClassId,
    pub captures: Rc<FxHashMap<VarId, Value>>,
}

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Prim(Primitive),
    Wrapped(HostValue),
    Object(ObjRef),
    Lambda(LambdaValue),
    Exception(ExceptionValue),
}

impl Value {
    pub const NULL: Value = Value::Prim(Primitive::Null);
    pub const UNIT: Value = Value::Prim(Primitive::Unit);

    #[inline]
    pub fn bool(v: bool) -> Value {
        Value::Prim(Primitive::Bool(v))
    }

    #[inline]
    pub fn int(v: i32) -> Value {
        Value::Prim(Primitive::Int(v))
    }

    #[inline]
    pub fn long(v: i64) -> Value {
        Value::Prim(Primitive::Long(v))
    }

    #[inline]
    pub fn double(v: f64) -> Value {
        Value::Prim(Primitive::Double(v))
    }

    #[inline]
    pub fn str(v: impl AsRef<str>) -> Value {
        Value::Prim(Primitive::Str(Rc::from(v.as_ref())))
    }

    pub fn array(elems: Vec<Value>) -> Value {
        Value::Wrapped(HostValue::Array {
            elems: Rc::new(RefCell::new(elems)),
        })
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Prim(Primitive::Null))
    }

    /// The most-derived IR class of this value, used for dispatch, catch
    /// matching, and `is` checks. `null` has none.
    pub fn runtime_class(&self, module: &IrModule) -> Option<ClassId> {
        match self {
            Value::Prim(p) => match p {
                Primitive::Null => None,
                _ => module.class_of_type(&mica_ir::IrType::Primitive(p.kind())),
            },
            Value::Wrapped(host) => Some(host.class(module)),
            Value::Object(obj) => Some(obj.borrow().class),
            Value::Lambda(lambda) => Some(lambda.interface),
            Value::Exception(exc) => Some(exc.class),
        }
    }

    /// Display name of the value's runtime type, for error messages.
    pub fn type_name<'m>(&self, module: &'m IrModule) -> &'m str {
        match self {
            Value::Prim(p) => p.type_string(),
            _ => match self.runtime_class(module) {
                Some(class) => module.name(module.class(class).name),
                None => "Nothing",
            },
        }
    }

    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_prim(&self) -> Option<&Primitive> {
        match self {
            Value::Prim(p) => Some(p),
            _ => None,
        }
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        Value::Prim(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_round_trip_preserves_bits() {
        let cases = [
            ConstValue::Bool(true),
            ConstValue::Char('µ'),
            ConstValue::Byte(-1),
            ConstValue::Short(-300),
            ConstValue::Int(i32::MIN),
            ConstValue::Long(i64::MAX),
            ConstValue::Float(1.5),
            ConstValue::Double(-0.0),
            ConstValue::Str("hi".to_string()),
            ConstValue::Null,
        ];
        for case in cases {
            let back = Primitive::from_const(&case).to_const().unwrap();
            match (&case, &back) {
                (ConstValue::Double(a), ConstValue::Double(b)) => {
                    assert_eq!(a.to_bits(), b.to_bits());
                }
                (ConstValue::Float(a), ConstValue::Float(b)) => {
                    assert_eq!(a.to_bits(), b.to_bits());
                }
                _ => assert_eq!(case, back),
            }
        }
    }

    #[test]
    fn unit_has_no_constant_form() {
        assert!(Primitive::Unit.to_const().is_none());
    }

    #[test]
    fn field_walk_reaches_super_instance() {
        let module = mica_ir::ModuleBuilder::new().finish();
        let b = &module.builtins;
        let name_field = module.find_field(b.enum_class, "name").unwrap();

        let sup = ObjectData::new(b.enum_class);
        sup.borrow_mut()
            .fields
            .insert(name_field, Value::str("RED"));
        let obj = ObjectData::new(b.int_range);
        obj.borrow_mut().super_instance = Some(sup);

        let read = get_field(&obj, name_field).unwrap();
        assert_eq!(read.as_prim().and_then(Primitive::as_str), Some("RED"));
    }

    #[test]
    fn set_field_mutates_declaring_level() {
        let module = mica_ir::ModuleBuilder::new().finish();
        let b = &module.builtins;
        let ordinal = module.find_field(b.enum_class, "ordinal").unwrap();

        let sup = ObjectData::new(b.enum_class);
        sup.borrow_mut().fields.insert(ordinal, Value::int(0));
        let obj = ObjectData::new(b.int_range);
        obj.borrow_mut().super_instance = Some(sup.clone());

        set_field(&module, &obj, ordinal, Value::int(2));
        assert!(obj.borrow().fields.is_empty());
        assert_eq!(
            get_field(&sup, ordinal).unwrap().as_prim().and_then(Primitive::as_int),
            Some(2)
        );
    }
}
