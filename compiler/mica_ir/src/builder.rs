//! Module assembly.
//!
//! `ModuleBuilder` is the API the frontend uses to lower a resolved Mica
//! module into IR. `new()` installs the standard built-in declarations:
//! the well-known class table, the body-less operator members on the
//! primitive classes (routed to built-in dispatch at evaluation time),
//! and the intrinsic classes pre-marked with their host keys.

use std::sync::Arc;

use crate::module::SourceFile;
use crate::{
    Builtins, ClassId, ClassKind, ConstValue, ExprId, FieldId, FileId, FunId, FunctionKind,
    IrClass, IrEnumEntry, IrExpr, IrField, IrFunction, IrModule, IrParam, IrType, IrVariable,
    Modality, Name, PrimitiveKind, SharedInterner, StringInterner, VarId,
};

fn prim(kind: PrimitiveKind) -> IrType {
    IrType::Primitive(kind)
}

/// Numeric widening: the result width of a mixed-width binary operator.
fn widen(a: PrimitiveKind, b: PrimitiveKind) -> PrimitiveKind {
    use PrimitiveKind::{Double, Float, Int, Long};
    if a == Double || b == Double {
        Double
    } else if a == Float || b == Float {
        Float
    } else if a == Long || b == Long {
        Long
    } else {
        Int
    }
}

/// Builder for `IrModule`.
pub struct ModuleBuilder {
    interner: SharedInterner,
    exprs: Vec<IrExpr>,
    classes: Vec<IrClass>,
    functions: Vec<IrFunction>,
    fields: Vec<IrField>,
    variables: Vec<IrVariable>,
    files: Vec<SourceFile>,
    toplevel_functions: Vec<FunId>,
    builtins: Builtins,
    builtin_file: FileId,
}

impl ModuleBuilder {
    /// Create a builder with the standard built-ins installed.
    pub fn new() -> Self {
        let mut b = ModuleBuilder {
            interner: Arc::new(StringInterner::new()),
            exprs: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            fields: Vec::new(),
            variables: Vec::new(),
            files: Vec::new(),
            toplevel_functions: Vec::new(),
            builtins: Builtins::bootstrap(),
            builtin_file: FileId::from_raw(0),
        };
        b.builtin_file = b.add_file("Builtins.mica");
        b.install_builtins();
        b
    }

    /// The module's interner.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Intern a string.
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// The installed built-in table.
    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Consume the builder, yielding the module.
    pub fn finish(self) -> IrModule {
        IrModule {
            interner: self.interner,
            exprs: self.exprs,
            classes: self.classes,
            functions: self.functions,
            fields: self.fields,
            variables: self.variables,
            files: self.files,
            toplevel_functions: self.toplevel_functions,
            builtins: self.builtins,
        }
    }

    // ── Files ───────────────────────────────────────────────────────────

    pub fn add_file(&mut self, name: &str) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        let name = self.intern(name);
        self.files.push(SourceFile { name });
        id
    }

    // ── Classes ─────────────────────────────────────────────────────────

    pub fn declare_class(&mut self, name: &str, kind: ClassKind, modality: Modality) -> ClassId {
        let id = ClassId::from_raw(self.classes.len() as u32);
        let name = self.intern(name);
        self.classes.push(IrClass {
            name,
            package: Name::EMPTY,
            kind,
            modality,
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            init_blocks: Vec::new(),
            functions: Vec::new(),
            constructors: Vec::new(),
            enum_entries: Vec::new(),
            is_data: false,
            intrinsic: None,
            companion: None,
        });
        id
    }

    /// Declare an enum class: kind `EnumClass`, super `Enum`, with the
    /// synthetic body-less `valueOf(String)` and `values()` statics.
    pub fn declare_enum_class(&mut self, name: &str, file: FileId) -> ClassId {
        let class = self.declare_class(name, ClassKind::EnumClass, Modality::Final);
        self.set_super_class(class, self.builtins.enum_class);
        let value_of = self.declare_function(Some(class), "valueOf", IrType::class(class), file);
        self.add_param(value_of, "value", prim(PrimitiveKind::String), None);
        self.declare_function(Some(class), "values", IrType::class(self.builtins.array), file);
        class
    }

    pub fn set_super_class(&mut self, class: ClassId, super_class: ClassId) {
        self.classes[class.index()].super_class = Some(super_class);
    }

    pub fn add_interface(&mut self, class: ClassId, iface: ClassId) {
        self.classes[class.index()].interfaces.push(iface);
    }

    pub fn set_package(&mut self, class: ClassId, package: &str) {
        self.classes[class.index()].package = self.interner.intern(package);
    }

    pub fn mark_data(&mut self, class: ClassId) {
        self.classes[class.index()].is_data = true;
    }

    pub fn mark_intrinsic(&mut self, class: ClassId, key: &str) {
        self.classes[class.index()].intrinsic = Some(self.interner.intern(key));
    }

    pub fn set_companion(&mut self, class: ClassId, companion: ClassId) {
        self.classes[class.index()].companion = Some(companion);
    }

    pub fn add_field(
        &mut self,
        class: ClassId,
        name: &str,
        ty: IrType,
        initializer: Option<ExprId>,
    ) -> FieldId {
        let id = FieldId::from_raw(self.fields.len() as u32);
        let name = self.intern(name);
        self.fields.push(IrField {
            name,
            ty,
            initializer,
        });
        self.classes[class.index()].fields.push(id);
        id
    }

    pub fn add_init_block(&mut self, class: ClassId, block: ExprId) {
        self.classes[class.index()].init_blocks.push(block);
    }

    pub fn add_enum_entry(&mut self, class: ClassId, name: &str, initializer: ExprId) {
        let name = self.intern(name);
        self.classes[class.index()]
            .enum_entries
            .push(IrEnumEntry { name, initializer });
    }

    // ── Functions ───────────────────────────────────────────────────────

    /// Declare a function. Member functions are registered on their parent
    /// class; others become top-level functions.
    pub fn declare_function(
        &mut self,
        parent: Option<ClassId>,
        name: &str,
        return_type: IrType,
        file: FileId,
    ) -> FunId {
        let id = FunId::from_raw(self.functions.len() as u32);
        let name = self.intern(name);
        self.functions.push(IrFunction {
            name,
            parent,
            dispatch_receiver: None,
            extension_receiver: None,
            params: Vec::new(),
            return_type,
            body: None,
            overridden: Vec::new(),
            kind: FunctionKind::Function,
            is_abstract: false,
            file,
        });
        match parent {
            Some(class) => self.classes[class.index()].functions.push(id),
            None => self.toplevel_functions.push(id),
        }
        id
    }

    pub fn declare_constructor(&mut self, class: ClassId, primary: bool, file: FileId) -> FunId {
        let id = FunId::from_raw(self.functions.len() as u32);
        let name = self.intern("<init>");
        self.functions.push(IrFunction {
            name,
            parent: Some(class),
            dispatch_receiver: None,
            extension_receiver: None,
            params: Vec::new(),
            return_type: IrType::class(class),
            body: None,
            overridden: Vec::new(),
            kind: FunctionKind::Constructor { primary },
            is_abstract: false,
            file,
        });
        self.classes[class.index()].constructors.push(id);
        let this = self.declare_variable("<this>", IrType::class(class));
        self.functions[id.index()].dispatch_receiver = Some(this);
        id
    }

    /// Attach a dispatch receiver symbol typed as the given type.
    pub fn set_dispatch_receiver(&mut self, fun: FunId, ty: IrType) -> VarId {
        let var = self.declare_variable("<this>", ty);
        self.functions[fun.index()].dispatch_receiver = Some(var);
        var
    }

    /// Attach an extension receiver symbol typed as the given type.
    pub fn set_extension_receiver(&mut self, fun: FunId, ty: IrType) -> VarId {
        let var = self.declare_variable("<receiver>", ty);
        self.functions[fun.index()].extension_receiver = Some(var);
        var
    }

    pub fn add_param(
        &mut self,
        fun: FunId,
        name: &str,
        ty: IrType,
        default: Option<ExprId>,
    ) -> VarId {
        let var = self.declare_variable(name, ty);
        self.functions[fun.index()].params.push(IrParam { var, default });
        var
    }

    pub fn set_body(&mut self, fun: FunId, body: ExprId) {
        self.functions[fun.index()].body = Some(body);
    }

    pub fn add_override(&mut self, fun: FunId, overridden: FunId) {
        self.functions[fun.index()].overridden.push(overridden);
    }

    pub fn set_abstract(&mut self, fun: FunId) {
        self.functions[fun.index()].is_abstract = true;
    }

    // ── Symbols and expressions ─────────────────────────────────────────

    pub fn declare_variable(&mut self, name: &str, ty: IrType) -> VarId {
        let id = VarId::from_raw(self.variables.len() as u32);
        let name = self.intern(name);
        self.variables.push(IrVariable { name, ty });
        id
    }

    pub fn expr(&mut self, expr: IrExpr) -> ExprId {
        let id = ExprId::from_raw(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn const_null(&mut self) -> ExprId {
        self.expr(IrExpr::Const(ConstValue::Null))
    }

    pub fn const_bool(&mut self, v: bool) -> ExprId {
        self.expr(IrExpr::Const(ConstValue::Bool(v)))
    }

    pub fn const_int(&mut self, v: i32) -> ExprId {
        self.expr(IrExpr::Const(ConstValue::Int(v)))
    }

    pub fn const_long(&mut self, v: i64) -> ExprId {
        self.expr(IrExpr::Const(ConstValue::Long(v)))
    }

    pub fn const_double(&mut self, v: f64) -> ExprId {
        self.expr(IrExpr::Const(ConstValue::Double(v)))
    }

    pub fn const_str(&mut self, v: &str) -> ExprId {
        self.expr(IrExpr::Const(ConstValue::Str(v.to_string())))
    }

    /// Lower an unsigned literal: a constructor call on `UInt` carrying the
    /// signed reinterpretation as its single argument.
    pub fn uint_const(&mut self, v: u32, line: u32) -> ExprId {
        let data = self.const_int(v.cast_signed());
        let ctor = self.builtins_uint_ctor();
        self.expr(IrExpr::ConstructorCall {
            constructor: ctor,
            args: vec![Some(data)],
            line,
        })
    }

    /// Lower an unsigned long literal, as `uint_const`.
    pub fn ulong_const(&mut self, v: u64, line: u32) -> ExprId {
        let data = self.const_long(v.cast_signed());
        let ctor = self.classes[self.builtins.ulong.index()].constructors[0];
        self.expr(IrExpr::ConstructorCall {
            constructor: ctor,
            args: vec![Some(data)],
            line,
        })
    }

    fn builtins_uint_ctor(&self) -> FunId {
        self.classes[self.builtins.uint.index()].constructors[0]
    }

    // ── Lookup ──────────────────────────────────────────────────────────
    //
    // Mirrors of the `IrModule` queries, usable while the module is still
    // under construction (frontends need member ids to build call nodes).

    fn type_string_of(&self, ty: &IrType) -> &'static str {
        match ty {
            IrType::Primitive(kind) => kind.type_string(),
            IrType::Class { class, .. } => {
                self.interner.lookup(self.classes[class.index()].name)
            }
        }
    }

    fn signature_matches(&self, fun: FunId, name: &str, param_types: &[&str]) -> bool {
        let f = &self.functions[fun.index()];
        if self.interner.lookup(f.name) != name || f.params.len() != param_types.len() {
            return false;
        }
        f.params
            .iter()
            .zip(param_types)
            .all(|(p, expected)| {
                self.type_string_of(&self.variables[p.var.index()].ty) == *expected
            })
    }

    pub fn find_method(&self, class: ClassId, name: &str, param_types: &[&str]) -> Option<FunId> {
        self.classes[class.index()]
            .functions
            .iter()
            .copied()
            .find(|&fun| self.signature_matches(fun, name, param_types))
    }

    pub fn find_constructor(&self, class: ClassId, param_types: &[&str]) -> Option<FunId> {
        self.classes[class.index()]
            .constructors
            .iter()
            .copied()
            .find(|&fun| self.signature_matches(fun, "<init>", param_types))
    }

    pub fn find_toplevel(&self, name: &str, param_types: &[&str]) -> Option<FunId> {
        self.toplevel_functions
            .iter()
            .copied()
            .find(|&fun| self.signature_matches(fun, name, param_types))
    }

    /// The receiver symbol a constructor binds the new instance to.
    ///
    /// # Panics
    ///
    /// Panics if `ctor` was not declared through `declare_constructor`.
    pub fn constructor_receiver(&self, ctor: FunId) -> VarId {
        self.functions[ctor.index()]
            .dispatch_receiver
            .expect("constructors always carry a receiver symbol")
    }

    /// The class a constructor belongs to.
    ///
    /// # Panics
    ///
    /// Panics if `ctor` was not declared through `declare_constructor`.
    pub fn constructor_class(&self, ctor: FunId) -> ClassId {
        self.functions[ctor.index()]
            .parent
            .expect("constructors always have a parent class")
    }

    pub fn find_field(&self, class: ClassId, name: &str) -> Option<FieldId> {
        self.classes[class.index()]
            .fields
            .iter()
            .copied()
            .find(|&field| self.interner.lookup(self.fields[field.index()].name) == name)
    }

    // ── Built-in installation ───────────────────────────────────────────

    /// A body-less member whose evaluation routes to built-in dispatch.
    fn builtin_method(
        &mut self,
        class: ClassId,
        name: &str,
        params: &[(&str, IrType)],
        ret: IrType,
    ) -> FunId {
        let file = self.builtin_file;
        let fun = self.declare_function(Some(class), name, ret, file);
        self.set_dispatch_receiver(fun, IrType::class(class));
        for (pname, pty) in params {
            self.add_param(fun, pname, *pty, None);
        }
        fun
    }

    fn install_builtins(&mut self) {
        use ClassKind::{Class, Interface};
        use Modality::{Abstract, Final, Open};
        use PrimitiveKind as P;

        let file = self.builtin_file;

        let any = self.declare_class("Any", Class, Open);
        let throwable = self.declare_class("Throwable", Class, Open);
        let exception = self.declare_class("Exception", Class, Open);
        let arithmetic = self.declare_class("ArithmeticException", Class, Open);
        let class_cast = self.declare_class("ClassCastException", Class, Open);
        let null_pointer = self.declare_class("NullPointerException", Class, Open);
        let illegal_argument = self.declare_class("IllegalArgumentException", Class, Open);
        let illegal_state = self.declare_class("IllegalStateException", Class, Open);
        let no_such_element = self.declare_class("NoSuchElementException", Class, Open);
        let index_out_of_bounds = self.declare_class("IndexOutOfBoundsException", Class, Open);
        let stack_overflow = self.declare_class("StackOverflowError", Class, Open);

        let boolean = self.declare_class("Boolean", Class, Final);
        let char_class = self.declare_class("Char", Class, Final);
        let byte = self.declare_class("Byte", Class, Final);
        let short = self.declare_class("Short", Class, Final);
        let int = self.declare_class("Int", Class, Final);
        let long = self.declare_class("Long", Class, Final);
        let float = self.declare_class("Float", Class, Final);
        let double = self.declare_class("Double", Class, Final);
        let string = self.declare_class("String", Class, Final);

        let enum_class = self.declare_class("Enum", Class, Abstract);
        let array = self.declare_class("Array", Class, Final);
        let int_range = self.declare_class("IntRange", Class, Final);
        let uint = self.declare_class("UInt", Class, Final);
        let ulong = self.declare_class("ULong", Class, Final);
        let regex = self.declare_class("Regex", Class, Final);
        let string_builder = self.declare_class("StringBuilder", Class, Final);

        let function0 = self.declare_class("Function0", Interface, Abstract);
        let function1 = self.declare_class("Function1", Interface, Abstract);
        let function2 = self.declare_class("Function2", Interface, Abstract);

        // Hierarchy. Error and exception families both bottom out in Throwable.
        self.set_super_class(throwable, any);
        self.set_super_class(exception, throwable);
        for sub in [
            arithmetic,
            class_cast,
            null_pointer,
            illegal_argument,
            illegal_state,
            no_such_element,
            index_out_of_bounds,
        ] {
            self.set_super_class(sub, exception);
        }
        self.set_super_class(stack_overflow, throwable);
        for class in [
            boolean,
            char_class,
            byte,
            short,
            int,
            long,
            float,
            double,
            string,
            enum_class,
            array,
            int_range,
            uint,
            ulong,
            regex,
            string_builder,
        ] {
            self.set_super_class(class, any);
        }

        self.mark_intrinsic(char_class, "Char");
        self.mark_intrinsic(long, "Long");
        self.mark_intrinsic(array, "Array");
        self.mark_intrinsic(uint, "UInt");
        self.mark_intrinsic(ulong, "ULong");
        self.mark_intrinsic(regex, "Regex");
        self.mark_intrinsic(string_builder, "StringBuilder");

        // Any: the open members every class can override.
        let nullable_any = IrType::nullable(any);
        {
            let ctor = self.declare_constructor(any, true, file);
            let body = self.expr(IrExpr::Block(Vec::new()));
            self.set_body(ctor, body);
            self.builtin_method(any, "equals", &[("other", nullable_any)], prim(P::Boolean));
            self.builtin_method(any, "hashCode", &[], prim(P::Int));
            self.builtin_method(any, "toString", &[], prim(P::String));
        }

        // Throwable family: (), (message), (message, cause) constructors,
        // plus message/cause accessors. Construction is evaluator-handled.
        let nullable_string = IrType::nullable(string);
        let nullable_throwable = IrType::nullable(throwable);
        for class in [
            throwable,
            exception,
            arithmetic,
            class_cast,
            null_pointer,
            illegal_argument,
            illegal_state,
            no_such_element,
            index_out_of_bounds,
            stack_overflow,
        ] {
            self.declare_constructor(class, true, file);
            let with_message = self.declare_constructor(class, false, file);
            self.add_param(with_message, "message", nullable_string, None);
            let with_cause = self.declare_constructor(class, false, file);
            self.add_param(with_cause, "message", nullable_string, None);
            self.add_param(with_cause, "cause", nullable_throwable, None);
        }
        self.builtin_method(throwable, "message", &[], nullable_string);
        self.builtin_method(throwable, "cause", &[], nullable_throwable);

        // Numeric classes: arithmetic at the widened result type,
        // comparisons, conversions.
        let numeric = [
            (int, P::Int),
            (long, P::Long),
            (float, P::Float),
            (double, P::Double),
        ];
        for &(class, kind) in &numeric {
            for op in ["plus", "minus", "times", "div", "rem"] {
                for &(_, rhs) in &numeric {
                    let ret = widen(kind, rhs);
                    self.builtin_method(class, op, &[("other", prim(rhs))], prim(ret));
                }
            }
            for &(_, rhs) in &numeric {
                self.builtin_method(class, "compareTo", &[("other", prim(rhs))], prim(P::Int));
            }
            self.builtin_method(class, "unaryMinus", &[], prim(kind));
            self.builtin_method(class, "inc", &[], prim(kind));
            self.builtin_method(class, "dec", &[], prim(kind));
            self.install_conversions(class);
            self.builtin_method(class, "toString", &[], prim(P::String));
            self.builtin_method(class, "hashCode", &[], prim(P::Int));
        }
        for &(class, kind) in &[(int, P::Int), (long, P::Long)] {
            for op in ["and", "or", "xor"] {
                self.builtin_method(class, op, &[("other", prim(kind))], prim(kind));
            }
            self.builtin_method(class, "inv", &[], prim(kind));
            for op in ["shl", "shr", "ushr"] {
                self.builtin_method(class, op, &[("bitCount", prim(P::Int))], prim(kind));
            }
        }
        self.builtin_method(int, "toChar", &[], prim(P::Char));
        self.builtin_method(int, "rangeTo", &[("other", prim(P::Int))], IrType::class(int_range));

        // Byte/Short: conversions only; arithmetic is widened by the frontend.
        for &class in &[byte, short] {
            self.install_conversions(class);
            self.builtin_method(class, "toString", &[], prim(P::String));
            self.builtin_method(class, "hashCode", &[], prim(P::Int));
        }
        self.builtin_method(byte, "compareTo", &[("other", prim(P::Byte))], prim(P::Int));
        self.builtin_method(short, "compareTo", &[("other", prim(P::Short))], prim(P::Int));

        // Char.
        self.builtin_method(char_class, "plus", &[("other", prim(P::Int))], prim(P::Char));
        self.builtin_method(char_class, "minus", &[("other", prim(P::Char))], prim(P::Int));
        self.builtin_method(char_class, "minus", &[("other", prim(P::Int))], prim(P::Char));
        self.builtin_method(char_class, "compareTo", &[("other", prim(P::Char))], prim(P::Int));
        self.builtin_method(char_class, "toInt", &[], prim(P::Int));
        self.builtin_method(char_class, "toString", &[], prim(P::String));
        self.builtin_method(char_class, "hashCode", &[], prim(P::Int));

        // Boolean: eager operators; short-circuiting is lowered to `when`
        // before the IR reaches the evaluator.
        self.builtin_method(boolean, "not", &[], prim(P::Boolean));
        for op in ["and", "or", "xor"] {
            self.builtin_method(boolean, op, &[("other", prim(P::Boolean))], prim(P::Boolean));
        }
        self.builtin_method(boolean, "compareTo", &[("other", prim(P::Boolean))], prim(P::Int));
        self.builtin_method(boolean, "toString", &[], prim(P::String));
        self.builtin_method(boolean, "hashCode", &[], prim(P::Int));

        // String.
        self.builtin_method(string, "plus", &[("other", nullable_any)], prim(P::String));
        self.builtin_method(string, "length", &[], prim(P::Int));
        self.builtin_method(string, "get", &[("index", prim(P::Int))], prim(P::Char));
        self.builtin_method(string, "substring", &[("startIndex", prim(P::Int))], prim(P::String));
        self.builtin_method(
            string,
            "substring",
            &[("startIndex", prim(P::Int)), ("endIndex", prim(P::Int))],
            prim(P::String),
        );
        self.builtin_method(string, "indexOf", &[("string", prim(P::String))], prim(P::Int));
        self.builtin_method(string, "contains", &[("other", prim(P::String))], prim(P::Boolean));
        self.builtin_method(string, "startsWith", &[("prefix", prim(P::String))], prim(P::Boolean));
        self.builtin_method(string, "endsWith", &[("suffix", prim(P::String))], prim(P::Boolean));
        self.builtin_method(string, "trim", &[], prim(P::String));
        self.builtin_method(string, "isEmpty", &[], prim(P::Boolean));
        self.builtin_method(string, "compareTo", &[("other", prim(P::String))], prim(P::Int));
        self.builtin_method(string, "toString", &[], prim(P::String));
        self.builtin_method(string, "hashCode", &[], prim(P::Int));

        // Enum: name/ordinal backing fields written by the enum super
        // constructor; compareTo orders by ordinal.
        self.add_field(enum_class, "name", prim(P::String), None);
        self.add_field(enum_class, "ordinal", prim(P::Int), None);
        self.declare_constructor(enum_class, true, file);
        self.builtin_method(enum_class, "compareTo", &[("other", IrType::class(enum_class))], prim(P::Int));

        // Array: construction is evaluator-handled; members dispatch on the
        // wrapped host buffer.
        {
            let sized = self.declare_constructor(array, true, file);
            self.add_param(sized, "size", prim(P::Int), None);
            let with_init = self.declare_constructor(array, false, file);
            self.add_param(with_init, "size", prim(P::Int), None);
            self.add_param(with_init, "init", IrType::class(function1), None);
            self.builtin_method(array, "get", &[("index", prim(P::Int))], nullable_any);
            self.builtin_method(
                array,
                "set",
                &[("index", prim(P::Int)), ("value", nullable_any)],
                IrType::UNIT,
            );
            self.builtin_method(array, "size", &[], prim(P::Int));
        }

        // IntRange: a real user-shaped class so `rangeTo` synthesis runs
        // through the ordinary constructor path.
        {
            let any_ctor = self.classes[any.index()].constructors[0];
            let f_first = self.add_field(int_range, "first", prim(P::Int), None);
            let f_last = self.add_field(int_range, "last", prim(P::Int), None);
            let ctor = self.declare_constructor(int_range, true, file);
            let this = self.functions[ctor.index()]
                .dispatch_receiver
                .expect("constructors always carry a receiver symbol");
            let p_first = self.add_param(ctor, "first", prim(P::Int), None);
            let p_last = self.add_param(ctor, "last", prim(P::Int), None);
            let delegate = self.expr(IrExpr::DelegatingCall {
                constructor: any_ctor,
                args: Vec::new(),
                kind: crate::DelegationKind::Super,
            });
            let init = self.expr(IrExpr::InstanceInitializer { class: int_range });
            let recv1 = self.expr(IrExpr::GetVar(this));
            let val1 = self.expr(IrExpr::GetVar(p_first));
            let set_first = self.expr(IrExpr::SetField {
                receiver: recv1,
                field: f_first,
                value: val1,
            });
            let recv2 = self.expr(IrExpr::GetVar(this));
            let val2 = self.expr(IrExpr::GetVar(p_last));
            let set_last = self.expr(IrExpr::SetField {
                receiver: recv2,
                field: f_last,
                value: val2,
            });
            let body = self.expr(IrExpr::Block(vec![delegate, init, set_first, set_last]));
            self.set_body(ctor, body);
            self.builtin_method(int_range, "contains", &[("value", prim(P::Int))], prim(P::Boolean));
            self.builtin_method(int_range, "isEmpty", &[], prim(P::Boolean));
            self.builtin_method(int_range, "toString", &[], prim(P::String));
        }

        // Unsigned classes: a single signed backing field; methods are
        // intrinsic targets operating on the unsigned reinterpretation.
        self.install_unsigned(uint, P::Int);
        self.install_unsigned(ulong, P::Long);

        // Long/Char host constructors for platforms without native width.
        {
            let long_ctor = self.declare_constructor(long, true, file);
            self.add_param(long_ctor, "high", prim(P::Int), None);
            self.add_param(long_ctor, "low", prim(P::Int), None);
            let char_ctor = self.declare_constructor(char_class, true, file);
            self.add_param(char_ctor, "code", prim(P::Int), None);
        }

        // Regex.
        {
            let ctor = self.declare_constructor(regex, true, file);
            self.add_param(ctor, "pattern", prim(P::String), None);
            self.builtin_method(regex, "matches", &[("input", prim(P::String))], prim(P::Boolean));
            self.builtin_method(
                regex,
                "containsMatchIn",
                &[("input", prim(P::String))],
                prim(P::Boolean),
            );
            self.builtin_method(
                regex,
                "replace",
                &[("input", prim(P::String)), ("replacement", prim(P::String))],
                prim(P::String),
            );
            self.builtin_method(regex, "find", &[("input", prim(P::String))], nullable_string);
            self.builtin_method(regex, "toString", &[], prim(P::String));
        }

        // StringBuilder.
        {
            self.declare_constructor(string_builder, true, file);
            let seeded = self.declare_constructor(string_builder, false, file);
            self.add_param(seeded, "content", prim(P::String), None);
            self.builtin_method(
                string_builder,
                "append",
                &[("value", nullable_any)],
                IrType::class(string_builder),
            );
            self.builtin_method(string_builder, "toString", &[], prim(P::String));
            self.builtin_method(string_builder, "length", &[], prim(P::Int));
        }

        // Functional interfaces.
        {
            let f0 = self.declare_function(Some(function0), "invoke", nullable_any, file);
            self.set_dispatch_receiver(f0, IrType::class(function0));
            self.set_abstract(f0);
            let f1 = self.declare_function(Some(function1), "invoke", nullable_any, file);
            self.set_dispatch_receiver(f1, IrType::class(function1));
            self.add_param(f1, "p1", nullable_any, None);
            self.set_abstract(f1);
            let f2 = self.declare_function(Some(function2), "invoke", nullable_any, file);
            self.set_dispatch_receiver(f2, IrType::class(function2));
            self.add_param(f2, "p1", nullable_any, None);
            self.add_param(f2, "p2", nullable_any, None);
            self.set_abstract(f2);
        }

        // Top-level comparison builtins plus structural equality.
        for kind in [P::Int, P::Long, P::Float, P::Double, P::Char, P::String] {
            for name in ["less", "lessOrEqual", "greater", "greaterOrEqual"] {
                let fun = self.declare_function(None, name, prim(P::Boolean), file);
                self.add_param(fun, "a", prim(kind), None);
                self.add_param(fun, "b", prim(kind), None);
            }
        }
        let eqeq = self.declare_function(None, "eqeq", prim(P::Boolean), file);
        self.add_param(eqeq, "a", nullable_any, None);
        self.add_param(eqeq, "b", nullable_any, None);

        let array_of = self.declare_function(None, "arrayOf", IrType::class(array), file);
        self.add_param(array_of, "elements", IrType::class(array), None);

        self.builtins = Builtins {
            any,
            throwable,
            exception,
            arithmetic_exception: arithmetic,
            class_cast_exception: class_cast,
            null_pointer_exception: null_pointer,
            illegal_argument_exception: illegal_argument,
            illegal_state_exception: illegal_state,
            no_such_element_exception: no_such_element,
            index_out_of_bounds_exception: index_out_of_bounds,
            stack_overflow_error: stack_overflow,
            boolean,
            char: char_class,
            byte,
            short,
            int,
            long,
            float,
            double,
            string,
            enum_class,
            array,
            int_range,
            uint,
            ulong,
            regex,
            string_builder,
            function0,
            function1,
            function2,
            eqeq,
        };
    }

    fn install_conversions(&mut self, class: ClassId) {
        use PrimitiveKind as P;
        for (name, kind) in [
            ("toByte", P::Byte),
            ("toShort", P::Short),
            ("toInt", P::Int),
            ("toLong", P::Long),
            ("toFloat", P::Float),
            ("toDouble", P::Double),
        ] {
            self.builtin_method(class, name, &[], prim(kind));
        }
    }

    fn install_unsigned(&mut self, class: ClassId, backing: PrimitiveKind) {
        use PrimitiveKind as P;
        let any_ctor = self.classes[self.builtins_any_index()].constructors[0];
        let f_data = self.add_field(class, "data", prim(backing), None);
        let ctor = self.declare_constructor(class, true, self.builtin_file);
        let this = self.functions[ctor.index()]
            .dispatch_receiver
            .expect("constructors always carry a receiver symbol");
        let p_data = self.add_param(ctor, "data", prim(backing), None);
        let delegate = self.expr(IrExpr::DelegatingCall {
            constructor: any_ctor,
            args: Vec::new(),
            kind: crate::DelegationKind::Super,
        });
        let init = self.expr(IrExpr::InstanceInitializer { class });
        let recv = self.expr(IrExpr::GetVar(this));
        let val = self.expr(IrExpr::GetVar(p_data));
        let set_data = self.expr(IrExpr::SetField {
            receiver: recv,
            field: f_data,
            value: val,
        });
        let body = self.expr(IrExpr::Block(vec![delegate, init, set_data]));
        self.set_body(ctor, body);

        let self_ty = IrType::class(class);
        for op in ["plus", "minus", "times", "div", "rem"] {
            self.builtin_method(class, op, &[("other", self_ty)], self_ty);
        }
        self.builtin_method(class, "compareTo", &[("other", self_ty)], prim(P::Int));
        self.builtin_method(class, "toString", &[], prim(P::String));
        self.builtin_method(class, "toInt", &[], prim(P::Int));
        self.builtin_method(class, "toLong", &[], prim(P::Long));
    }

    fn builtins_any_index(&self) -> usize {
        // `Any` is always the first declared class.
        0
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_installed() {
        let module = ModuleBuilder::new().finish();
        let b = &module.builtins;
        assert!(module.is_subclass_of(b.arithmetic_exception, b.throwable));
        assert!(module.is_subclass_of(b.stack_overflow_error, b.throwable));
        assert!(!module.is_subclass_of(b.stack_overflow_error, b.exception));
        assert!(module.find_method(b.int, "plus", &["Int"]).is_some());
        assert!(module.find_method(b.int, "plus", &["Double"]).is_some());
        assert!(module.find_method(b.string, "length", &[]).is_some());
        assert!(module.find_toplevel("less", &["Int", "Int"]).is_some());
    }

    #[test]
    fn range_constructor_has_a_real_body() {
        let module = ModuleBuilder::new().finish();
        let ctor = module
            .find_constructor(module.builtins.int_range, &["Int", "Int"])
            .unwrap();
        assert!(module.function(ctor).body.is_some());
    }

    #[test]
    fn enum_class_declares_value_of() {
        let mut b = ModuleBuilder::new();
        let file = b.add_file("Color.mica");
        let color = b.declare_enum_class("Color", file);
        let module = b.finish();
        assert!(module.find_method(color, "valueOf", &["String"]).is_some());
        assert!(module.find_method(color, "values", &[]).is_some());
        assert_eq!(
            module.class(color).super_class,
            Some(module.builtins.enum_class)
        );
    }

    #[test]
    fn uint_literal_lowers_to_constructor_call() {
        let mut b = ModuleBuilder::new();
        let expr = b.uint_const(0xFFFF_FFFF, 1);
        let module = b.finish();
        match module.expr(expr) {
            IrExpr::ConstructorCall { constructor, args, .. } => {
                assert_eq!(module.function(*constructor).parent, Some(module.builtins.uint));
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected ConstructorCall, got {other:?}"),
        }
    }
}
