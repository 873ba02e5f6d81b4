//! The resolved module: arenas, built-in class table, and queries.

use crate::{
    ClassId, ExprId, FieldId, FileId, FunId, IrClass, IrExpr, IrField, IrFunction, IrVariable,
    IrType, Name, PrimitiveKind, SharedInterner, VarId,
};

/// A source file participating in the module, e.g. `Main.mica`.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub name: Name,
}

/// The built-in class table.
///
/// Every module exposes these well-known declarations; the evaluator relies
/// on them for exception projection, catch matching, primitive method
/// dispatch, and range/array/unsigned synthesis.
#[derive(Clone, Debug)]
pub struct Builtins {
    pub any: ClassId,
    pub throwable: ClassId,
    pub exception: ClassId,
    pub arithmetic_exception: ClassId,
    pub class_cast_exception: ClassId,
    pub null_pointer_exception: ClassId,
    pub illegal_argument_exception: ClassId,
    pub illegal_state_exception: ClassId,
    pub no_such_element_exception: ClassId,
    pub index_out_of_bounds_exception: ClassId,
    pub stack_overflow_error: ClassId,

    pub boolean: ClassId,
    pub char: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub int: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub string: ClassId,

    pub enum_class: ClassId,
    pub array: ClassId,
    pub int_range: ClassId,
    pub uint: ClassId,
    pub ulong: ClassId,
    pub regex: ClassId,
    pub string_builder: ClassId,

    pub function0: ClassId,
    pub function1: ClassId,
    pub function2: ClassId,

    /// Structural equality, `eqeq(Any?, Any?): Boolean`.
    pub eqeq: FunId,
}

impl Builtins {
    /// Placeholder table used while `ModuleBuilder::new` installs the real
    /// declarations; every field is overwritten before the builder is
    /// handed out.
    pub(crate) fn bootstrap() -> Self {
        let class = ClassId::from_raw(0);
        let fun = FunId::from_raw(0);
        Builtins {
            any: class,
            throwable: class,
            exception: class,
            arithmetic_exception: class,
            class_cast_exception: class,
            null_pointer_exception: class,
            illegal_argument_exception: class,
            illegal_state_exception: class,
            no_such_element_exception: class,
            index_out_of_bounds_exception: class,
            stack_overflow_error: class,
            boolean: class,
            char: class,
            byte: class,
            short: class,
            int: class,
            long: class,
            float: class,
            double: class,
            string: class,
            enum_class: class,
            array: class,
            int_range: class,
            uint: class,
            ulong: class,
            regex: class,
            string_builder: class,
            function0: class,
            function1: class,
            function2: class,
            eqeq: fun,
        }
    }
}

/// A fully-resolved Mica module fragment.
///
/// Owns the declaration and expression arenas. Read-only during evaluation;
/// the evaluator never mutates a module.
pub struct IrModule {
    pub interner: SharedInterner,
    pub(crate) exprs: Vec<IrExpr>,
    pub(crate) classes: Vec<IrClass>,
    pub(crate) functions: Vec<IrFunction>,
    pub(crate) fields: Vec<IrField>,
    pub(crate) variables: Vec<IrVariable>,
    pub(crate) files: Vec<SourceFile>,
    pub(crate) toplevel_functions: Vec<FunId>,
    pub builtins: Builtins,
}

impl IrModule {
    #[inline]
    pub fn expr(&self, id: ExprId) -> &IrExpr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> &IrClass {
        &self.classes[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FunId) -> &IrFunction {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn field(&self, id: FieldId) -> &IrField {
        &self.fields[id.index()]
    }

    #[inline]
    pub fn variable(&self, id: VarId) -> &IrVariable {
        &self.variables[id.index()]
    }

    #[inline]
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    /// Resolve an interned name to its text.
    #[inline]
    pub fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Top-level (non-member) functions, in declaration order.
    pub fn toplevel_functions(&self) -> &[FunId] {
        &self.toplevel_functions
    }

    /// Append an expression node after construction, e.g. when materializing
    /// an evaluation result back into the module.
    pub fn append_expr(&mut self, expr: IrExpr) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    // ── Type queries ────────────────────────────────────────────────────

    /// Subtype check over the class hierarchy. Reflexive.
    pub fn is_subclass_of(&self, sub: ClassId, sup: ClassId) -> bool {
        if sub == sup || sup == self.builtins.any {
            return true;
        }
        let class = self.class(sub);
        if let Some(parent) = class.super_class {
            if self.is_subclass_of(parent, sup) {
                return true;
            }
        }
        class
            .interfaces
            .iter()
            .any(|&iface| self.is_subclass_of(iface, sup))
    }

    /// The class standing in for a type in dispatch and catch matching.
    /// Primitive kinds map to their boxed built-in classes; `Nothing` has
    /// no class.
    pub fn class_of_type(&self, ty: &IrType) -> Option<ClassId> {
        let b = &self.builtins;
        match ty {
            IrType::Class { class, .. } => Some(*class),
            IrType::Primitive(kind) => match kind {
                PrimitiveKind::Boolean => Some(b.boolean),
                PrimitiveKind::Char => Some(b.char),
                PrimitiveKind::Byte => Some(b.byte),
                PrimitiveKind::Short => Some(b.short),
                PrimitiveKind::Int => Some(b.int),
                PrimitiveKind::Long => Some(b.long),
                PrimitiveKind::Float => Some(b.float),
                PrimitiveKind::Double => Some(b.double),
                PrimitiveKind::String => Some(b.string),
                PrimitiveKind::Unit => Some(b.any),
                PrimitiveKind::Nothing => None,
            },
        }
    }

    /// Display string of a type: the primitive kind name or the class name.
    /// Nullability is not part of dispatch keys and is omitted.
    pub fn type_string(&self, ty: &IrType) -> &'static str {
        match ty {
            IrType::Primitive(kind) => kind.type_string(),
            IrType::Class { class, .. } => self.name(self.class(*class).name),
        }
    }

    /// Declared parameter type strings of a function, in order.
    pub fn param_type_strings(&self, fun: FunId) -> Vec<&'static str> {
        self.function(fun)
            .params
            .iter()
            .map(|p| self.type_string(&self.variable(p.var).ty))
            .collect()
    }

    // ── Name formatting ─────────────────────────────────────────────────

    /// Fully-qualified display name: `package.Class.name` with empty
    /// segments dropped.
    pub fn fq_name(&self, fun: FunId) -> String {
        let f = self.function(fun);
        let mut out = String::new();
        if let Some(class_id) = f.parent {
            let class = self.class(class_id);
            let package = self.name(class.package);
            if !package.is_empty() {
                out.push_str(package);
                out.push('.');
            }
            out.push_str(self.name(class.name));
            out.push('.');
        }
        out.push_str(self.name(f.name));
        out
    }

    /// File name without its extension, e.g. `Main` for `Main.mica`.
    pub fn file_stem(&self, file: FileId) -> &'static str {
        let name = self.name(self.file(file).name);
        match name.rfind('.') {
            Some(dot) => &name[..dot],
            None => name,
        }
    }

    // ── Member lookup ───────────────────────────────────────────────────

    /// Whether `fun` transitively overrides `target`.
    pub fn overrides_transitively(&self, fun: FunId, target: FunId) -> bool {
        if fun == target {
            return true;
        }
        self.function(fun)
            .overridden
            .iter()
            .any(|&parent| self.overrides_transitively(parent, target))
    }

    /// Resolve the concrete implementation of `target` for a receiver whose
    /// runtime class is `class`: scan the most-derived class first, then
    /// walk up the super chain. Returns the first member that is (or
    /// overrides) `target` and has a body or an intrinsic parent.
    pub fn resolve_override(&self, class: ClassId, target: FunId) -> Option<FunId> {
        let mut current = Some(class);
        while let Some(class_id) = current {
            let c = self.class(class_id);
            for &fun in &c.functions {
                if self.overrides_transitively(fun, target) && !self.function(fun).is_abstract {
                    return Some(fun);
                }
            }
            current = c.super_class;
        }
        // Interface default methods are not part of the super-class chain.
        self.resolve_interface_default(class, target)
    }

    fn resolve_interface_default(&self, class: ClassId, target: FunId) -> Option<FunId> {
        let mut current = Some(class);
        while let Some(class_id) = current {
            let c = self.class(class_id);
            for &iface in &c.interfaces {
                if let Some(found) = self.find_default_in_interface(iface, target) {
                    return Some(found);
                }
            }
            current = c.super_class;
        }
        None
    }

    fn find_default_in_interface(&self, iface: ClassId, target: FunId) -> Option<FunId> {
        let c = self.class(iface);
        for &fun in &c.functions {
            if self.overrides_transitively(fun, target) && self.function(fun).body.is_some() {
                return Some(fun);
            }
        }
        c.interfaces
            .iter()
            .find_map(|&parent| self.find_default_in_interface(parent, target))
    }

    /// Find a member function by name and declared parameter type strings.
    pub fn find_method(&self, class: ClassId, name: &str, param_types: &[&str]) -> Option<FunId> {
        self.class(class)
            .functions
            .iter()
            .copied()
            .find(|&fun| self.signature_matches(fun, name, param_types))
    }

    /// Find a constructor by declared parameter type strings.
    pub fn find_constructor(&self, class: ClassId, param_types: &[&str]) -> Option<FunId> {
        self.class(class)
            .constructors
            .iter()
            .copied()
            .find(|&fun| {
                let f = self.function(fun);
                f.params.len() == param_types.len()
                    && self.param_type_strings(fun) == param_types
            })
    }

    /// Find a top-level function by name and declared parameter type strings.
    pub fn find_toplevel(&self, name: &str, param_types: &[&str]) -> Option<FunId> {
        self.toplevel_functions
            .iter()
            .copied()
            .find(|&fun| self.signature_matches(fun, name, param_types))
    }

    /// Find a declared field by name, on the class itself only.
    pub fn find_field(&self, class: ClassId, name: &str) -> Option<FieldId> {
        self.class(class)
            .fields
            .iter()
            .copied()
            .find(|&field| self.name(self.field(field).name) == name)
    }

    /// Index of an enum entry within its class, i.e. its ordinal.
    pub fn enum_entry_index(&self, class: ClassId, entry: Name) -> Option<usize> {
        self.class(class)
            .enum_entries
            .iter()
            .position(|e| e.name == entry)
    }

    fn signature_matches(&self, fun: FunId, name: &str, param_types: &[&str]) -> bool {
        let f = self.function(fun);
        self.name(f.name) == name
            && f.params.len() == param_types.len()
            && self.param_type_strings(fun) == param_types
    }
}
