//! Scenario tests: whole IR programs assembled through `ModuleBuilder`
//! and folded by a fresh interpreter.

#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

mod classes_tests;
mod control_tests;
mod hosts_tests;

use mica_ir::{ExprId, IrCall, IrExpr, ModuleBuilder};

use crate::{FoldResult, Interpreter};

/// Finish the module and fold `expr` in a fresh interpreter.
pub(crate) fn fold(builder: ModuleBuilder, expr: ExprId) -> FoldResult {
    let module = builder.finish();
    Interpreter::new(&module).interpret(expr)
}

/// Fold `expr` twice, each time in a fresh interpreter instance.
pub(crate) fn fold_twice(builder: ModuleBuilder, expr: ExprId) -> (FoldResult, FoldResult) {
    let module = builder.finish();
    let first = Interpreter::new(&module).interpret(expr);
    let second = Interpreter::new(&module).interpret(expr);
    (first, second)
}

/// A call with positional arguments and an optional dispatch receiver.
pub(crate) fn call(
    b: &mut ModuleBuilder,
    function: mica_ir::FunId,
    receiver: Option<ExprId>,
    args: Vec<ExprId>,
) -> ExprId {
    b.expr(IrExpr::Call(IrCall {
        function,
        dispatch_receiver: receiver,
        extension_receiver: None,
        args: args.into_iter().map(Some).collect(),
        super_qualifier: None,
        line: 1,
    }))
}

/// A constructor call with positional arguments.
pub(crate) fn construct(
    b: &mut ModuleBuilder,
    constructor: mica_ir::FunId,
    args: Vec<ExprId>,
) -> ExprId {
    b.expr(IrExpr::ConstructorCall {
        constructor,
        args: args.into_iter().map(Some).collect(),
        line: 1,
    })
}

/// The error text of a result, panicking on a constant.
pub(crate) fn error_text(result: &FoldResult) -> &str {
    result
        .error_text()
        .unwrap_or_else(|| panic!("expected an error, got {result:?}"))
}
