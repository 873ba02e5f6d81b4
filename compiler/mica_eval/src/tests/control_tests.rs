//! Control flow: loops, labels, `when`, blocks, and string templates.

use mica_ir::{ConstValue, IrBranch, IrExpr, IrType, ModuleBuilder, PrimitiveKind};

use crate::FoldResult;

use super::{call, fold};

const INT: IrType = IrType::Primitive(PrimitiveKind::Int);

#[test]
fn when_takes_the_first_true_branch() {
    // when { false -> 1; true -> 2; true -> 3 }
    let mut b = ModuleBuilder::new();
    let c1 = b.const_bool(false);
    let r1 = b.const_int(1);
    let c2 = b.const_bool(true);
    let r2 = b.const_int(2);
    let c3 = b.const_bool(true);
    let r3 = b.const_int(3);
    let root = b.expr(IrExpr::When {
        branches: vec![
            IrBranch { condition: c1, result: r1 },
            IrBranch { condition: c2, result: r2 },
            IrBranch { condition: c3, result: r3 },
        ],
    });
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(2)));
}

#[test]
fn while_loop_counts_down() {
    // var n = 5; var acc = 0; while (0 < n) { acc = acc + n; n = n - 1 }; acc
    let mut b = ModuleBuilder::new();
    let plus = b.find_method(b.builtins().int, "plus", &["Int"]).unwrap();
    let minus = b.find_method(b.builtins().int, "minus", &["Int"]).unwrap();
    let less = b.find_toplevel("less", &["Int", "Int"]).unwrap();

    let n = b.declare_variable("n", INT);
    let acc = b.declare_variable("acc", INT);
    let five = b.const_int(5);
    let decl_n = b.expr(IrExpr::VarDecl { var: n, init: Some(five) });
    let zero = b.const_int(0);
    let decl_acc = b.expr(IrExpr::VarDecl { var: acc, init: Some(zero) });

    let zero = b.const_int(0);
    let n_ref = b.expr(IrExpr::GetVar(n));
    let cond = call(&mut b, less, None, vec![zero, n_ref]);
    let acc_ref = b.expr(IrExpr::GetVar(acc));
    let n_ref = b.expr(IrExpr::GetVar(n));
    let new_acc = call(&mut b, plus, Some(acc_ref), vec![n_ref]);
    let set_acc = b.expr(IrExpr::SetVar { var: acc, value: new_acc });
    let n_ref = b.expr(IrExpr::GetVar(n));
    let one = b.const_int(1);
    let new_n = call(&mut b, minus, Some(n_ref), vec![one]);
    let set_n = b.expr(IrExpr::SetVar { var: n, value: new_n });
    let body = b.expr(IrExpr::Block(vec![set_acc, set_n]));
    let loop_expr = b.expr(IrExpr::While { label: None, condition: cond, body });

    let acc_ref = b.expr(IrExpr::GetVar(acc));
    let root = b.expr(IrExpr::Block(vec![decl_n, decl_acc, loop_expr, acc_ref]));
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(15)));
}

#[test]
fn do_while_runs_the_body_at_least_once() {
    // var n = 0; do { n = n + 1 } while (false); n
    let mut b = ModuleBuilder::new();
    let plus = b.find_method(b.builtins().int, "plus", &["Int"]).unwrap();
    let n = b.declare_variable("n", INT);
    let zero = b.const_int(0);
    let decl = b.expr(IrExpr::VarDecl { var: n, init: Some(zero) });
    let n_ref = b.expr(IrExpr::GetVar(n));
    let one = b.const_int(1);
    let bumped = call(&mut b, plus, Some(n_ref), vec![one]);
    let body = b.expr(IrExpr::SetVar { var: n, value: bumped });
    let cond = b.const_bool(false);
    let loop_expr = b.expr(IrExpr::DoWhile { label: None, body, condition: cond });
    let n_ref = b.expr(IrExpr::GetVar(n));
    let root = b.expr(IrExpr::Block(vec![decl, loop_expr, n_ref]));
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(1)));
}

#[test]
fn labeled_break_unwinds_to_the_outer_loop() {
    // var acc = 0;
    // outer@ while (true) { while (true) { acc = 1; break@outer }; acc = 2 }
    // acc
    let mut b = ModuleBuilder::new();
    let outer = b.intern("outer");
    let acc = b.declare_variable("acc", INT);
    let zero = b.const_int(0);
    let decl = b.expr(IrExpr::VarDecl { var: acc, init: Some(zero) });

    let one = b.const_int(1);
    let set_one = b.expr(IrExpr::SetVar { var: acc, value: one });
    let jump = b.expr(IrExpr::Break { label: Some(outer) });
    let inner_body = b.expr(IrExpr::Block(vec![set_one, jump]));
    let inner_cond = b.const_bool(true);
    let inner = b.expr(IrExpr::While {
        label: None,
        condition: inner_cond,
        body: inner_body,
    });
    let two = b.const_int(2);
    let set_two = b.expr(IrExpr::SetVar { var: acc, value: two });
    let outer_body = b.expr(IrExpr::Block(vec![inner, set_two]));
    let outer_cond = b.const_bool(true);
    let outer_loop = b.expr(IrExpr::While {
        label: Some(outer),
        condition: outer_cond,
        body: outer_body,
    });
    let acc_ref = b.expr(IrExpr::GetVar(acc));
    let root = b.expr(IrExpr::Block(vec![decl, outer_loop, acc_ref]));
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(1)));
}

#[test]
fn continue_skips_to_the_next_iteration() {
    // var n = 0; var acc = 0;
    // while (n < 4) { n = n + 1; when { n == 2 -> continue; else -> Unit }; acc = acc + n }
    // acc == 1 + 3 + 4
    let mut b = ModuleBuilder::new();
    let plus = b.find_method(b.builtins().int, "plus", &["Int"]).unwrap();
    let less = b.find_toplevel("less", &["Int", "Int"]).unwrap();
    let eqeq = b.builtins().eqeq;

    let n = b.declare_variable("n", INT);
    let acc = b.declare_variable("acc", INT);
    let zero = b.const_int(0);
    let decl_n = b.expr(IrExpr::VarDecl { var: n, init: Some(zero) });
    let zero = b.const_int(0);
    let decl_acc = b.expr(IrExpr::VarDecl { var: acc, init: Some(zero) });

    let n_ref = b.expr(IrExpr::GetVar(n));
    let four = b.const_int(4);
    let cond = call(&mut b, less, None, vec![n_ref, four]);

    let n_ref = b.expr(IrExpr::GetVar(n));
    let one = b.const_int(1);
    let bumped = call(&mut b, plus, Some(n_ref), vec![one]);
    let set_n = b.expr(IrExpr::SetVar { var: n, value: bumped });

    let n_ref = b.expr(IrExpr::GetVar(n));
    let two = b.const_int(2);
    let is_two = call(&mut b, eqeq, None, vec![n_ref, two]);
    let skip = b.expr(IrExpr::Continue { label: None });
    let branch = b.expr(IrExpr::When {
        branches: vec![IrBranch {
            condition: is_two,
            result: skip,
        }],
    });

    let acc_ref = b.expr(IrExpr::GetVar(acc));
    let n_ref = b.expr(IrExpr::GetVar(n));
    let new_acc = call(&mut b, plus, Some(acc_ref), vec![n_ref]);
    let set_acc = b.expr(IrExpr::SetVar { var: acc, value: new_acc });

    let body = b.expr(IrExpr::Block(vec![set_n, branch, set_acc]));
    let loop_expr = b.expr(IrExpr::While { label: None, condition: cond, body });
    let acc_ref = b.expr(IrExpr::GetVar(acc));
    let root = b.expr(IrExpr::Block(vec![decl_n, decl_acc, loop_expr, acc_ref]));
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(8)));
}

#[test]
fn string_template_stringifies_each_part() {
    // "n=" + 4 + ", b=" + true, as a template node
    let mut b = ModuleBuilder::new();
    let prefix = b.const_str("n=");
    let four = b.const_int(4);
    let mid = b.const_str(", b=");
    let yes = b.const_bool(true);
    let root = b.expr(IrExpr::StringConcat(vec![prefix, four, mid, yes]));
    assert_eq!(
        fold(b, root),
        FoldResult::Const(ConstValue::Str("n=4, b=true".to_string()))
    );
}

#[test]
fn coercion_to_unit_discards_the_value() {
    use mica_ir::TypeOperator;
    // (run { 42 } as Unit); 7
    let mut b = ModuleBuilder::new();
    let forty_two = b.const_int(42);
    let coerced = b.expr(IrExpr::TypeOp {
        op: TypeOperator::CoercionToUnit,
        target: IrType::UNIT,
        arg: forty_two,
    });
    let seven = b.const_int(7);
    let root = b.expr(IrExpr::Block(vec![coerced, seven]));
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(7)));
}

#[test]
fn assignment_mutates_across_sub_frames() {
    // var x = 1; { x = 5 }; x
    let mut b = ModuleBuilder::new();
    let x = b.declare_variable("x", INT);
    let one = b.const_int(1);
    let decl = b.expr(IrExpr::VarDecl { var: x, init: Some(one) });
    let five = b.const_int(5);
    let assign = b.expr(IrExpr::SetVar { var: x, value: five });
    let inner = b.expr(IrExpr::Block(vec![assign]));
    let x_ref = b.expr(IrExpr::GetVar(x));
    let root = b.expr(IrExpr::Block(vec![decl, inner, x_ref]));
    assert_eq!(fold(b, root), FoldResult::Const(ConstValue::Int(5)));
}
