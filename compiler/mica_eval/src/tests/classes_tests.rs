//! Classes: construction, data-class derived members, inheritance,
//! overrides, interface defaults, and singletons.

use mica_ir::{
    ClassId, ClassKind, ConstValue, DelegationKind, FieldId, FunId, IrCall, IrExpr, IrType,
    Modality, ModuleBuilder, PrimitiveKind,
};

use crate::FoldResult;

use super::{call, construct, error_text, fold, fold_twice};

const INT: IrType = IrType::Primitive(PrimitiveKind::Int);
const STRING: IrType = IrType::Primitive(PrimitiveKind::String);

/// Declare `class <name>(<fields>)` with a primary constructor that
/// delegates to `Any`, runs the instance initializer, and assigns each
/// parameter to its backing field.
fn declare_simple_class(
    b: &mut ModuleBuilder,
    file: mica_ir::FileId,
    name: &str,
    fields: &[(&str, IrType)],
) -> (ClassId, FunId, Vec<FieldId>) {
    let class = b.declare_class(name, ClassKind::Class, Modality::Open);
    b.set_super_class(class, b.builtins().any);
    let any_ctor = b.find_constructor(b.builtins().any, &[]).unwrap();

    let mut field_ids = Vec::new();
    for (field_name, ty) in fields {
        field_ids.push(b.add_field(class, field_name, *ty, None));
    }

    let ctor = b.declare_constructor(class, true, file);
    let this = b.constructor_receiver(ctor);
    let mut stmts = vec![
        b.expr(IrExpr::DelegatingCall {
            constructor: any_ctor,
            args: vec![],
            kind: DelegationKind::Super,
        }),
        b.expr(IrExpr::InstanceInitializer { class }),
    ];
    for ((field_name, ty), &field) in fields.iter().zip(&field_ids) {
        let param = b.add_param(ctor, field_name, *ty, None);
        let recv = b.expr(IrExpr::GetVar(this));
        let value = b.expr(IrExpr::GetVar(param));
        stmts.push(b.expr(IrExpr::SetField {
            receiver: recv,
            field,
            value,
        }));
    }
    let body = b.expr(IrExpr::Block(stmts));
    b.set_body(ctor, body);
    (class, ctor, field_ids)
}

#[test]
fn data_class_to_string_through_concatenation() {
    // "x=" + Point(1, 2)
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let (point, ctor, _) = declare_simple_class(&mut b, file, "Point", &[("x", INT), ("y", INT)]);
    b.mark_data(point);

    let str_plus = b
        .find_method(b.builtins().string, "plus", &["Any"])
        .unwrap();
    let prefix = b.const_str("x=");
    let one = b.const_int(1);
    let two = b.const_int(2);
    let instance = construct(&mut b, ctor, vec![one, two]);
    let root = call(&mut b, str_plus, Some(prefix), vec![instance]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Str("x=Point(x=1, y=2)".to_string()))
    );
}

#[test]
fn data_class_equality_and_hash_laws() {
    // Point(3, 4) == Point(3, 4), and equal values hash equally.
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let (point, ctor, _) = declare_simple_class(&mut b, file, "Point", &[("x", INT), ("y", INT)]);
    b.mark_data(point);

    let eqeq = b.builtins().eqeq;

    let three = b.const_int(3);
    let four = b.const_int(4);
    let p1 = construct(&mut b, ctor, vec![three, four]);
    let three = b.const_int(3);
    let four = b.const_int(4);
    let p2 = construct(&mut b, ctor, vec![three, four]);
    let equal = call(&mut b, eqeq, None, vec![p1, p2]);
    assert_eq!(fold(b, equal), FoldResult::Const(ConstValue::Bool(true)));

    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let (point, ctor, _) = declare_simple_class(&mut b, file, "Point", &[("x", INT), ("y", INT)]);
    b.mark_data(point);
    let eqeq = b.builtins().eqeq;
    let hash_code = b.find_method(b.builtins().any, "hashCode", &[]).unwrap();
    let three = b.const_int(3);
    let four = b.const_int(4);
    let p1 = construct(&mut b, ctor, vec![three, four]);
    let three = b.const_int(3);
    let four = b.const_int(4);
    let p2 = construct(&mut b, ctor, vec![three, four]);
    let h1 = call(&mut b, hash_code, Some(p1), vec![]);
    let h2 = call(&mut b, hash_code, Some(p2), vec![]);
    let hashes_equal = call(&mut b, eqeq, None, vec![h1, h2]);
    assert_eq!(
        fold(b, hashes_equal),
        FoldResult::Const(ConstValue::Bool(true))
    );
}

#[test]
fn field_initializer_runs_in_declaration_order() {
    // class Box { val n = 41; val m = n + 1 } ... Box().m
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let class = b.declare_class("Box", ClassKind::Class, Modality::Final);
    b.set_super_class(class, b.builtins().any);
    let any_ctor = b.find_constructor(b.builtins().any, &[]).unwrap();
    let plus = b.find_method(b.builtins().int, "plus", &["Int"]).unwrap();

    let ctor = b.declare_constructor(class, true, file);
    let this = b.constructor_receiver(ctor);
    let forty_one = b.const_int(41);
    let n = b.add_field(class, "n", INT, Some(forty_one));
    let this_ref = b.expr(IrExpr::GetVar(this));
    let n_ref = b.expr(IrExpr::GetField {
        receiver: this_ref,
        field: n,
    });
    let one = b.const_int(1);
    let n_plus_1 = call(&mut b, plus, Some(n_ref), vec![one]);
    let m = b.add_field(class, "m", INT, Some(n_plus_1));

    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: any_ctor,
        args: vec![],
        kind: DelegationKind::Super,
    });
    let init = b.expr(IrExpr::InstanceInitializer { class });
    let body = b.expr(IrExpr::Block(vec![delegate, init]));
    b.set_body(ctor, body);

    let instance = construct(&mut b, ctor, vec![]);
    let root = b.expr(IrExpr::GetField {
        receiver: instance,
        field: m,
    });
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(42)));
}

#[test]
fn secondary_constructor_adopts_sibling_state() {
    // class P(x: Int) { constructor() : this(7) } ... P().x
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let (_, primary, fields) = declare_simple_class(&mut b, file, "P", &[("x", INT)]);

    let class = b.constructor_class(primary);
    let secondary = b.declare_constructor(class, false, file);
    let seven = b.const_int(7);
    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: primary,
        args: vec![Some(seven)],
        kind: DelegationKind::This,
    });
    let body = b.expr(IrExpr::Block(vec![delegate]));
    b.set_body(secondary, body);

    let instance = construct(&mut b, secondary, vec![]);
    let root = b.expr(IrExpr::GetField {
        receiver: instance,
        field: fields[0],
    });
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(7)));
}

#[test]
fn abstract_call_dispatches_to_the_runtime_class() {
    // abstract class Shape { abstract fun area(): Int }
    // class Square(s: Int) : Shape() { override fun area() = s * s }
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let any_ctor = b.find_constructor(b.builtins().any, &[]).unwrap();
    let times = b.find_method(b.builtins().int, "times", &["Int"]).unwrap();

    let shape = b.declare_class("Shape", ClassKind::Class, Modality::Abstract);
    b.set_super_class(shape, b.builtins().any);
    let shape_ctor = b.declare_constructor(shape, true, file);
    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: any_ctor,
        args: vec![],
        kind: DelegationKind::Super,
    });
    let init = b.expr(IrExpr::InstanceInitializer { class: shape });
    let body = b.expr(IrExpr::Block(vec![delegate, init]));
    b.set_body(shape_ctor, body);
    let area = b.declare_function(Some(shape), "area", INT, file);
    b.set_dispatch_receiver(area, IrType::class(shape));
    b.set_abstract(area);

    let square = b.declare_class("Square", ClassKind::Class, Modality::Final);
    b.set_super_class(square, shape);
    let side = b.add_field(square, "s", INT, None);
    let square_ctor = b.declare_constructor(square, true, file);
    let this = b.constructor_receiver(square_ctor);
    let s_param = b.add_param(square_ctor, "s", INT, None);
    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: shape_ctor,
        args: vec![],
        kind: DelegationKind::Super,
    });
    let init = b.expr(IrExpr::InstanceInitializer { class: square });
    let recv = b.expr(IrExpr::GetVar(this));
    let value = b.expr(IrExpr::GetVar(s_param));
    let assign = b.expr(IrExpr::SetField {
        receiver: recv,
        field: side,
        value,
    });
    let body = b.expr(IrExpr::Block(vec![delegate, init, assign]));
    b.set_body(square_ctor, body);

    let square_area = b.declare_function(Some(square), "area", INT, file);
    let this = b.set_dispatch_receiver(square_area, IrType::class(square));
    b.add_override(square_area, area);
    let this_ref = b.expr(IrExpr::GetVar(this));
    let side_ref = b.expr(IrExpr::GetField {
        receiver: this_ref,
        field: side,
    });
    let this_ref = b.expr(IrExpr::GetVar(this));
    let side_ref_2 = b.expr(IrExpr::GetField {
        receiver: this_ref,
        field: side,
    });
    let body = call(&mut b, times, Some(side_ref), vec![side_ref_2]);
    b.set_body(square_area, body);

    // Call through the abstract symbol with a Square receiver.
    let nine = b.const_int(9);
    let instance = construct(&mut b, square_ctor, vec![nine]);
    let root = call(&mut b, area, Some(instance), vec![]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(81)));
}

#[test]
fn interface_default_is_found_when_not_overridden() {
    // interface Greeter { fun greet(): String = "hi" }
    // class G : Greeter
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let any_ctor = b.find_constructor(b.builtins().any, &[]).unwrap();

    let greeter = b.declare_class("Greeter", ClassKind::Interface, Modality::Abstract);
    let greet = b.declare_function(Some(greeter), "greet", STRING, file);
    b.set_dispatch_receiver(greet, IrType::class(greeter));
    let hi = b.const_str("hi");
    b.set_body(greet, hi);

    let g = b.declare_class("G", ClassKind::Class, Modality::Final);
    b.set_super_class(g, b.builtins().any);
    b.add_interface(g, greeter);
    let g_ctor = b.declare_constructor(g, true, file);
    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: any_ctor,
        args: vec![],
        kind: DelegationKind::Super,
    });
    let init = b.expr(IrExpr::InstanceInitializer { class: g });
    let body = b.expr(IrExpr::Block(vec![delegate, init]));
    b.set_body(g_ctor, body);

    let instance = construct(&mut b, g_ctor, vec![]);
    let root = call(&mut b, greet, Some(instance), vec![]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Str("hi".to_string()))
    );
}

#[test]
fn super_call_enters_the_super_class_body() {
    // open class A { open fun f(): Int = 1 }
    // class B : A() { override fun f(): Int = super.f() + 1 }
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let any_ctor = b.find_constructor(b.builtins().any, &[]).unwrap();
    let plus = b.find_method(b.builtins().int, "plus", &["Int"]).unwrap();

    let a = b.declare_class("A", ClassKind::Class, Modality::Open);
    b.set_super_class(a, b.builtins().any);
    let a_ctor = b.declare_constructor(a, true, file);
    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: any_ctor,
        args: vec![],
        kind: DelegationKind::Super,
    });
    let init = b.expr(IrExpr::InstanceInitializer { class: a });
    let body = b.expr(IrExpr::Block(vec![delegate, init]));
    b.set_body(a_ctor, body);
    let a_f = b.declare_function(Some(a), "f", INT, file);
    b.set_dispatch_receiver(a_f, IrType::class(a));
    let one = b.const_int(1);
    b.set_body(a_f, one);

    let bee = b.declare_class("B", ClassKind::Class, Modality::Final);
    b.set_super_class(bee, a);
    let b_ctor = b.declare_constructor(bee, true, file);
    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: a_ctor,
        args: vec![],
        kind: DelegationKind::Super,
    });
    let init = b.expr(IrExpr::InstanceInitializer { class: bee });
    let body = b.expr(IrExpr::Block(vec![delegate, init]));
    b.set_body(b_ctor, body);

    let b_f = b.declare_function(Some(bee), "f", INT, file);
    let this = b.set_dispatch_receiver(b_f, IrType::class(bee));
    b.add_override(b_f, a_f);
    let this_ref = b.expr(IrExpr::GetVar(this));
    let super_call = b.expr(IrExpr::Call(IrCall {
        function: a_f,
        dispatch_receiver: Some(this_ref),
        extension_receiver: None,
        args: vec![],
        super_qualifier: Some(a),
        line: 3,
    }));
    let one = b.const_int(1);
    let body = call(&mut b, plus, Some(super_call), vec![one]);
    b.set_body(b_f, body);

    let instance = construct(&mut b, b_ctor, vec![]);
    let root = call(&mut b, a_f, Some(instance), vec![]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(2)));
}

#[test]
fn object_singleton_is_interned_per_evaluation() {
    // object Config { val n = 5 } ... Config === Config, Config.n
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let any_ctor = b.find_constructor(b.builtins().any, &[]).unwrap();

    let config = b.declare_class("Config", ClassKind::Object, Modality::Final);
    b.set_super_class(config, b.builtins().any);
    let five = b.const_int(5);
    b.add_field(config, "n", INT, Some(five));
    let ctor = b.declare_constructor(config, true, file);
    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: any_ctor,
        args: vec![],
        kind: DelegationKind::Super,
    });
    let init = b.expr(IrExpr::InstanceInitializer { class: config });
    let body = b.expr(IrExpr::Block(vec![delegate, init]));
    b.set_body(ctor, body);

    let eqeq = b.builtins().eqeq;
    let first = b.expr(IrExpr::GetObjectValue { class: config });
    let second = b.expr(IrExpr::GetObjectValue { class: config });
    let same = call(&mut b, eqeq, None, vec![first, second]);
    assert_eq!(fold(b, same), FoldResult::Const(ConstValue::Bool(true)));

    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let any_ctor = b.find_constructor(b.builtins().any, &[]).unwrap();
    let config = b.declare_class("Config", ClassKind::Object, Modality::Final);
    b.set_super_class(config, b.builtins().any);
    let five = b.const_int(5);
    let n = b.add_field(config, "n", INT, Some(five));
    let ctor = b.declare_constructor(config, true, file);
    let delegate = b.expr(IrExpr::DelegatingCall {
        constructor: any_ctor,
        args: vec![],
        kind: DelegationKind::Super,
    });
    let init = b.expr(IrExpr::InstanceInitializer { class: config });
    let body = b.expr(IrExpr::Block(vec![delegate, init]));
    b.set_body(ctor, body);
    let instance = b.expr(IrExpr::GetObjectValue { class: config });
    let root = b.expr(IrExpr::GetField {
        receiver: instance,
        field: n,
    });
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(5)));
}

#[test]
fn call_on_null_receiver_raises_npe() {
    let mut b = ModuleBuilder::new();
    let to_string = b.find_method(b.builtins().any, "toString", &[]).unwrap();
    let null = b.const_null();
    let root = call(&mut b, to_string, Some(null), vec![]);
    let result = fold(b, root);
    assert!(error_text(&result).contains("NullPointerException"));
}

#[test]
fn cast_failures_follow_the_type_operator() {
    use mica_ir::TypeOperator;

    // 1 as? String == null
    let mut b = ModuleBuilder::new();
    let one = b.const_int(1);
    let target = IrType::class(b.builtins().string);
    let root = b.expr(IrExpr::TypeOp {
        op: TypeOperator::SafeCast,
        target,
        arg: one,
    });
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Null));

    // 1 as String raises ClassCastException
    let mut b = ModuleBuilder::new();
    let one = b.const_int(1);
    let target = IrType::class(b.builtins().string);
    let root = b.expr(IrExpr::TypeOp {
        op: TypeOperator::Cast,
        target,
        arg: one,
    });
    let result = fold(b, root);
    let text = error_text(&result);
    assert!(text.contains("ClassCastException"));
    assert!(text.contains("Int cannot be cast to String"));

    // 1 is Int
    let mut b = ModuleBuilder::new();
    let one = b.const_int(1);
    let target = IrType::class(b.builtins().int);
    let root = b.expr(IrExpr::TypeOp {
        op: TypeOperator::InstanceOf,
        target,
        arg: one,
    });
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Bool(true)));
}

#[test]
fn equal_data_values_fold_identically_across_instances() {
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let (point, ctor, _) = declare_simple_class(&mut b, file, "Point", &[("x", INT), ("y", INT)]);
    b.mark_data(point);
    let hash_code = b.find_method(b.builtins().any, "hashCode", &[]).unwrap();
    let one = b.const_int(1);
    let two = b.const_int(2);
    let instance = construct(&mut b, ctor, vec![one, two]);
    let root = call(&mut b, hash_code, Some(instance), vec![]);
    let (first, second) = fold_twice(b, root);
    assert!(first.as_const().is_some());
    assert_eq!(first, second);
}
