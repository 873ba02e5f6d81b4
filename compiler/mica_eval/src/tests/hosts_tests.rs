//! Host-backed values: regex, string builder, arrays, unsigned integers,
//! wide constants.

use mica_ir::{ConstValue, IrExpr, ModuleBuilder, VarargElement};

use crate::FoldResult;

use super::{call, construct, error_text, fold};

#[test]
fn const_round_trip_preserves_every_width() {
    let cases = [
        ConstValue::Bool(true),
        ConstValue::Char('ж'),
        ConstValue::Byte(-7),
        ConstValue::Short(-12345),
        ConstValue::Int(i32::MIN),
        ConstValue::Long(i64::MIN),
        ConstValue::Float(3.5),
        ConstValue::Double(-2.25),
        ConstValue::Str("hello".to_string()),
        ConstValue::Null,
    ];
    for case in cases {
        let mut b = ModuleBuilder::new();
        let root = b.expr(IrExpr::Const(case.clone()));
        assert_eq!(fold(b, root), FoldResult::Const(case));
    }
}

#[test]
fn long_constructs_from_its_halves() {
    // Long(high = 1, low = 2) == (1 shl 32) + 2
    let mut b = ModuleBuilder::new();
    let ctor = b
        .find_constructor(b.builtins().long, &["Int", "Int"])
        .unwrap();
    let high = b.const_int(1);
    let low = b.const_int(2);
    let root = construct(&mut b, ctor, vec![high, low]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Long((1_i64 << 32) + 2))
    );
}

#[test]
fn char_constructs_from_its_code() {
    let mut b = ModuleBuilder::new();
    let ctor = b.find_constructor(b.builtins().char, &["Int"]).unwrap();
    let code = b.const_int(0x41);
    let root = construct(&mut b, ctor, vec![code]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Char('A')));
}

#[test]
fn long_arithmetic_widens_the_int_operand() {
    // 4_000_000_000L + 1
    let mut b = ModuleBuilder::new();
    let plus = b.find_method(b.builtins().long, "plus", &["Int"]).unwrap();
    let big = b.const_long(4_000_000_000);
    let one = b.const_int(1);
    let root = call(&mut b, plus, Some(big), vec![one]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Long(4_000_000_001))
    );
}

#[test]
fn regex_matches_whole_input_only() {
    // Regex("a+b").matches("aaab"), then containsMatchIn on a partial match
    let mut b = ModuleBuilder::new();
    let ctor = b.find_constructor(b.builtins().regex, &["String"]).unwrap();
    let matches = b
        .find_method(b.builtins().regex, "matches", &["String"])
        .unwrap();
    let pattern = b.const_str("a+b");
    let re = construct(&mut b, ctor, vec![pattern]);
    let input = b.const_str("aaab");
    let root = call(&mut b, matches, Some(re), vec![input]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Bool(true)));

    let mut b = ModuleBuilder::new();
    let ctor = b.find_constructor(b.builtins().regex, &["String"]).unwrap();
    let matches = b
        .find_method(b.builtins().regex, "matches", &["String"])
        .unwrap();
    let pattern = b.const_str("a+b");
    let re = construct(&mut b, ctor, vec![pattern]);
    let input = b.const_str("xxaabyy");
    let root = call(&mut b, matches, Some(re), vec![input]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Bool(false)));

    let mut b = ModuleBuilder::new();
    let ctor = b.find_constructor(b.builtins().regex, &["String"]).unwrap();
    let contains = b
        .find_method(b.builtins().regex, "containsMatchIn", &["String"])
        .unwrap();
    let pattern = b.const_str("a+b");
    let re = construct(&mut b, ctor, vec![pattern]);
    let input = b.const_str("xxaabyy");
    let root = call(&mut b, contains, Some(re), vec![input]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Bool(true)));
}

#[test]
fn invalid_regex_pattern_raises_illegal_argument() {
    let mut b = ModuleBuilder::new();
    let ctor = b.find_constructor(b.builtins().regex, &["String"]).unwrap();
    let pattern = b.const_str("(unclosed");
    let root = construct(&mut b, ctor, vec![pattern]);
    let result = fold(b, root);
    assert!(error_text(&result).contains("IllegalArgumentException"));
}

#[test]
fn regex_replace_supports_the_host_syntax() {
    // Regex("l+").replace("hello", "L")
    let mut b = ModuleBuilder::new();
    let ctor = b.find_constructor(b.builtins().regex, &["String"]).unwrap();
    let replace = b
        .find_method(b.builtins().regex, "replace", &["String", "String"])
        .unwrap();
    let pattern = b.const_str("l+");
    let re = construct(&mut b, ctor, vec![pattern]);
    let input = b.const_str("hello");
    let replacement = b.const_str("L");
    let root = call(&mut b, replace, Some(re), vec![input, replacement]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Str("heLo".to_string()))
    );
}

#[test]
fn string_builder_accumulates_appends() {
    // StringBuilder().append("ab").append(42).toString()
    let mut b = ModuleBuilder::new();
    let ctor = b
        .find_constructor(b.builtins().string_builder, &[])
        .unwrap();
    let append = b
        .find_method(b.builtins().string_builder, "append", &["Any"])
        .unwrap();
    let to_string = b
        .find_method(b.builtins().string_builder, "toString", &[])
        .unwrap();
    let sb = construct(&mut b, ctor, vec![]);
    let ab = b.const_str("ab");
    let appended = call(&mut b, append, Some(sb), vec![ab]);
    let forty_two = b.const_int(42);
    let appended = call(&mut b, append, Some(appended), vec![forty_two]);
    let root = call(&mut b, to_string, Some(appended), vec![]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Str("ab42".to_string()))
    );
}

#[test]
fn uint_constant_reinterprets_as_unsigned() {
    // 0xFFFF_FFFFu.toString()
    let mut b = ModuleBuilder::new();
    let root = b.uint_const(0xFFFF_FFFF, 1);
    let to_string = b.find_method(b.builtins().uint, "toString", &[]).unwrap();
    let root = call(&mut b, to_string, Some(root), vec![]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Str("4294967295".to_string()))
    );
}

#[test]
fn uint_arithmetic_wraps_like_the_host() {
    // 0xFFFF_FFFFu + 2u == 1u
    let mut b = ModuleBuilder::new();
    let plus = b.find_method(b.builtins().uint, "plus", &["UInt"]).unwrap();
    let to_string = b.find_method(b.builtins().uint, "toString", &[]).unwrap();
    let lhs = b.uint_const(0xFFFF_FFFF, 1);
    let rhs = b.uint_const(2, 1);
    let sum = call(&mut b, plus, Some(lhs), vec![rhs]);
    let root = call(&mut b, to_string, Some(sum), vec![]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Str("1".to_string()))
    );
}

#[test]
fn uint_comparison_is_unsigned() {
    // 0xFFFF_FFFFu.compareTo(1u) > 0
    let mut b = ModuleBuilder::new();
    let compare_to = b
        .find_method(b.builtins().uint, "compareTo", &["UInt"])
        .unwrap();
    let lhs = b.uint_const(0xFFFF_FFFF, 1);
    let rhs = b.uint_const(1, 1);
    let root = call(&mut b, compare_to, Some(lhs), vec![rhs]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(1)));
}

#[test]
fn array_constructor_runs_the_initializer_per_index() {
    // Array(4) { i -> i * 10 }.get(3)
    let mut b = ModuleBuilder::new();
    let file = b.add_file("Main.mica");
    let times = b.find_method(b.builtins().int, "times", &["Int"]).unwrap();
    let array_ctor = b
        .find_constructor(b.builtins().array, &["Int", "Function1"])
        .unwrap();
    let get = b.find_method(b.builtins().array, "get", &["Int"]).unwrap();

    let init = b.declare_function(None, "init$lambda", mica_ir::IrType::Primitive(mica_ir::PrimitiveKind::Int), file);
    let i = b.add_param(init, "i", mica_ir::IrType::Primitive(mica_ir::PrimitiveKind::Int), None);
    let i_ref = b.expr(IrExpr::GetVar(i));
    let ten = b.const_int(10);
    let lam_body = call(&mut b, times, Some(i_ref), vec![ten]);
    b.set_body(init, lam_body);

    let four = b.const_int(4);
    let lambda = b.expr(IrExpr::Lambda {
        function: init,
        interface: b.builtins().function1,
    });
    let array = construct(&mut b, array_ctor, vec![four, lambda]);
    let three = b.const_int(3);
    let root = call(&mut b, get, Some(array), vec![three]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(30)));
}

#[test]
fn array_index_out_of_bounds_raises() {
    let mut b = ModuleBuilder::new();
    let array_ctor = b.find_constructor(b.builtins().array, &["Int"]).unwrap();
    let get = b.find_method(b.builtins().array, "get", &["Int"]).unwrap();
    let two = b.const_int(2);
    let array = construct(&mut b, array_ctor, vec![two]);
    let five = b.const_int(5);
    let root = call(&mut b, get, Some(array), vec![five]);
    let result = fold(b, root);
    assert!(error_text(&result).contains("IndexOutOfBoundsException"));
}

#[test]
fn vararg_spreads_arrays_element_wise() {
    // arrayOf(0, *arrayOf(1, 2)).size()
    let mut b = ModuleBuilder::new();
    let array_of = b.find_toplevel("arrayOf", &["Array"]).unwrap();
    let size = b.find_method(b.builtins().array, "size", &[]).unwrap();

    let one = b.const_int(1);
    let two = b.const_int(2);
    let inner_vararg = b.expr(IrExpr::Vararg {
        element_type: mica_ir::IrType::Primitive(mica_ir::PrimitiveKind::Int),
        elements: vec![VarargElement::Regular(one), VarargElement::Regular(two)],
    });
    let inner = call(&mut b, array_of, None, vec![inner_vararg]);
    let zero = b.const_int(0);
    let outer_vararg = b.expr(IrExpr::Vararg {
        element_type: mica_ir::IrType::Primitive(mica_ir::PrimitiveKind::Int),
        elements: vec![
            VarargElement::Regular(zero),
            VarargElement::Spread(inner),
        ],
    });
    let outer = call(&mut b, array_of, None, vec![outer_vararg]);
    let root = call(&mut b, size, Some(outer), vec![]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(3)));
}

#[test]
fn array_set_mutates_the_buffer() {
    // val a = Array(2); a.set(1, 9); a.get(1)
    let mut b = ModuleBuilder::new();
    let array_ctor = b.find_constructor(b.builtins().array, &["Int"]).unwrap();
    let get = b.find_method(b.builtins().array, "get", &["Int"]).unwrap();
    let set = b
        .find_method(b.builtins().array, "set", &["Int", "Any"])
        .unwrap();
    let a = b.declare_variable(
        "a",
        mica_ir::IrType::class(b.builtins().array),
    );
    let two = b.const_int(2);
    let array = construct(&mut b, array_ctor, vec![two]);
    let decl = b.expr(IrExpr::VarDecl { var: a, init: Some(array) });
    let a_ref = b.expr(IrExpr::GetVar(a));
    let one = b.const_int(1);
    let nine = b.const_int(9);
    let write = call(&mut b, set, Some(a_ref), vec![one, nine]);
    let a_ref = b.expr(IrExpr::GetVar(a));
    let one = b.const_int(1);
    let read = call(&mut b, get, Some(a_ref), vec![one]);
    let root = b.expr(IrExpr::Block(vec![decl, write, read]));
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(9)));
}

#[test]
fn string_methods_use_host_string_apis() {
    // "  padded  ".trim().length()
    let mut b = ModuleBuilder::new();
    let trim = b.find_method(b.builtins().string, "trim", &[]).unwrap();
    let length = b.find_method(b.builtins().string, "length", &[]).unwrap();
    let padded = b.const_str("  padded  ");
    let trimmed = call(&mut b, trim, Some(padded), vec![]);
    let root = call(&mut b, length, Some(trimmed), vec![]);
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(6)));

    // "hello".substring(1, 3)
    let mut b = ModuleBuilder::new();
    let substring = b
        .find_method(b.builtins().string, "substring", &["Int", "Int"])
        .unwrap();
    let hello = b.const_str("hello");
    let one = b.const_int(1);
    let three = b.const_int(3);
    let root = call(&mut b, substring, Some(hello), vec![one, three]);
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Str("el".to_string()))
    );
}
