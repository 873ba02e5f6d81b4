//! Enum entries and object singletons.
//!
//! Enum values are interned by `(enum class, entry name)`: the second and
//! later references resolve to the same instance. Interns live for one
//! `interpret` call. Entry construction threads the entry name and ordinal
//! to the enum super constructor; the IR is never modified.

use mica_ir::{ClassId, Name};

use crate::errors;
use crate::exceptions;
use crate::intrinsics;
use crate::signal::ExecResult;
use crate::value::{Primitive, Value};

use super::Interpreter;

impl Interpreter<'_> {
    pub(super) fn enum_value(&mut self, class: ClassId, entry: Name) -> ExecResult {
        if let Some(value) = self.enum_interns.get(&(class, entry)) {
            return Ok(value.clone());
        }

        let module = self.module;
        let decl = module.class(class);
        if decl.enum_entries.is_empty() {
            if let Some(key) = decl.intrinsic {
                // Intrinsic enums resolve through the host's valueOf.
                let key = module.name(key);
                let value = intrinsics::host_enum_value(self, key, class, entry)?;
                self.enum_interns.insert((class, entry), value.clone());
                return Ok(value);
            }
        }

        let Some(index) = module.enum_entry_index(class, entry) else {
            let class_name = module.name(decl.name);
            let entry_name = module.name(entry);
            return Err(errors::unknown_enum_entry(class_name, entry_name).into());
        };
        #[allow(clippy::cast_possible_truncation, reason = "entry counts are tiny")]
        let ordinal = index as i32;
        let initializer = decl.enum_entries[index].initializer;

        self.pending_enum_entry = Some((entry, ordinal));
        let result = self.eval(initializer);
        self.pending_enum_entry = None;
        let value = result?;

        self.enum_interns.insert((class, entry), value.clone());
        Ok(value)
    }

    /// The synthetic `valueOf(name)` static of an enum class.
    pub(super) fn enum_value_of(&mut self, class: ClassId, args: &[Value]) -> ExecResult {
        let module = self.module;
        let Some(Value::Prim(Primitive::Str(name))) = args.first() else {
            return Err(errors::missing_argument("valueOf", 0).into());
        };
        let entry = module.interner.intern(name);
        if module.enum_entry_index(class, entry).is_some() {
            self.enum_value(class, entry)
        } else {
            let class_name = module.name(module.class(class).name);
            let message = format!("No enum constant {class_name}.{name}");
            Err(self.raise(exceptions::illegal_argument(module, message)))
        }
    }

    /// The synthetic `values()` static: an array of all entries in
    /// declaration order.
    pub(super) fn enum_values(&mut self, class: ClassId) -> ExecResult {
        let entries: Vec<Name> = self
            .module
            .class(class)
            .enum_entries
            .iter()
            .map(|e| e.name)
            .collect();
        let mut values = Vec::with_capacity(entries.len());
        for entry in entries {
            values.push(self.enum_value(class, entry)?);
        }
        Ok(Value::array(values))
    }

    /// Reference to an `object` or companion singleton: constructed once
    /// per evaluation through its primary constructor, then interned.
    pub(super) fn object_value(&mut self, class: ClassId) -> ExecResult {
        if let Some(value) = self.object_interns.get(&class) {
            return Ok(value.clone());
        }
        let module = self.module;
        let decl = module.class(class);
        if let Some(key) = decl.intrinsic {
            return intrinsics::companion(self, module.name(key), class);
        }
        let Some(&ctor) = decl.constructors.first() else {
            let name = module.name(decl.name);
            return Err(errors::missing_body(&format!("{name}.<init>")).into());
        };
        let value = self.invoke_constructor(ctor, Vec::new(), 0)?;
        self.object_interns.insert(class, value.clone());
        Ok(value)
    }
}
