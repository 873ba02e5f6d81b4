//! Built-in dispatch tables.
//!
//! Body-less members of the primitive classes resolve here through a
//! compile-time function key: the method name plus the declared argument
//! type strings (the receiver, when present, is the first argument).
//! Three tables cover arity 1, 2, and 3. The tables are built once and
//! shared across evaluator instances; they are immutable after
//! initialization.
//!
//! Failures of the operations themselves (division by zero, bad indices)
//! are source-language exceptions; a missing key is the caller's internal
//! error.

mod binary;
mod ternary;
mod unary;

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use mica_ir::IrModule;

use crate::exceptions::ExceptionValue;
use crate::value::Value;

/// Result of a built-in operation.
pub type BuiltinResult = Result<Value, ExceptionValue>;

pub type UnaryFn = fn(&IrModule, &Value) -> BuiltinResult;
pub type BinaryFn = fn(&IrModule, &Value, &Value) -> BuiltinResult;
pub type TernaryFn = fn(&IrModule, &Value, &Value, &Value) -> BuiltinResult;

type Key1 = (&'static str, [&'static str; 1]);
type Key2 = (&'static str, [&'static str; 2]);
type Key3 = (&'static str, [&'static str; 3]);

/// The three signature tables.
pub struct BuiltinTables {
    unary: FxHashMap<Key1, UnaryFn>,
    binary: FxHashMap<Key2, BinaryFn>,
    ternary: FxHashMap<Key3, TernaryFn>,
}

impl BuiltinTables {
    /// The shared tables, built on first use.
    pub fn global() -> &'static BuiltinTables {
        static TABLES: OnceLock<BuiltinTables> = OnceLock::new();
        TABLES.get_or_init(BuiltinTables::build)
    }

    fn build() -> Self {
        let mut tables = BuiltinTables {
            unary: FxHashMap::default(),
            binary: FxHashMap::default(),
            ternary: FxHashMap::default(),
        };
        unary::register(&mut tables);
        binary::register(&mut tables);
        ternary::register(&mut tables);
        tables
    }

    pub(crate) fn unary(&mut self, name: &'static str, receiver: &'static str, f: UnaryFn) {
        self.unary.insert((name, [receiver]), f);
    }

    pub(crate) fn binary(
        &mut self,
        name: &'static str,
        a: &'static str,
        b: &'static str,
        f: BinaryFn,
    ) {
        self.binary.insert((name, [a, b]), f);
    }

    pub(crate) fn ternary(
        &mut self,
        name: &'static str,
        a: &'static str,
        b: &'static str,
        c: &'static str,
        f: TernaryFn,
    ) {
        self.ternary.insert((name, [a, b, c]), f);
    }

    /// Look up and invoke by key. `None` means no entry matched.
    pub fn dispatch(
        &self,
        module: &IrModule,
        name: &'static str,
        signature: &[&'static str],
        values: &[Value],
    ) -> Option<BuiltinResult> {
        debug_assert_eq!(signature.len(), values.len());
        match (signature, values) {
            ([a], [v]) => self.unary.get(&(name, [*a])).map(|f| f(module, v)),
            ([a, b], [x, y]) => self.binary.get(&(name, [*a, *b])).map(|f| f(module, x, y)),
            ([a, b, c], [x, y, z]) => self
                .ternary
                .get(&(name, [*a, *b, *c]))
                .map(|f| f(module, x, y, z)),
            _ => None,
        }
    }
}

/// Declared argument type strings of the numeric operator surface.
pub(crate) const NUMERIC: [&str; 4] = ["Int", "Long", "Float", "Double"];

#[cfg(test)]
mod tests {
    use super::*;
    use mica_ir::ModuleBuilder;

    #[test]
    fn tables_are_shared() {
        let a = BuiltinTables::global() as *const BuiltinTables;
        let b = BuiltinTables::global() as *const BuiltinTables;
        assert_eq!(a, b);
    }

    #[test]
    fn arithmetic_widens_to_most_precise_argument() {
        let module = ModuleBuilder::new().finish();
        let tables = BuiltinTables::global();
        let result = tables
            .dispatch(
                &module,
                "plus",
                &["Int", "Double"],
                &[Value::int(1), Value::double(0.5)],
            )
            .unwrap()
            .unwrap();
        match result {
            Value::Prim(crate::Primitive::Double(v)) => assert!((v - 1.5).abs() < f64::EPSILON),
            other => panic!("expected Double, got {other:?}"),
        }
    }

    #[test]
    fn division_by_zero_is_a_source_exception() {
        let module = ModuleBuilder::new().finish();
        let tables = BuiltinTables::global();
        let result = tables
            .dispatch(
                &module,
                "div",
                &["Int", "Int"],
                &[Value::int(1), Value::int(0)],
            )
            .unwrap();
        let exc = result.unwrap_err();
        assert_eq!(exc.class, module.builtins.arithmetic_exception);
        assert_eq!(exc.message.as_deref(), Some("/ by zero"));
    }

    #[test]
    fn missing_key_is_none() {
        let module = ModuleBuilder::new().finish();
        let tables = BuiltinTables::global();
        assert!(tables
            .dispatch(&module, "nope", &["Int"], &[Value::int(1)])
            .is_none());
    }
}
