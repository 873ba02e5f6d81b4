//! Expression nodes.
//!
//! Expressions form a tree addressed by `ExprId` into the module arena.
//! Statements are expressions of type `Unit`; blocks evaluate their
//! children in order and yield the last child's value.

use crate::{ClassId, ConstValue, ExprId, FieldId, FunId, IrType, Name, VarId};

/// Type-operator variants carried by `IrExpr::TypeOp`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TypeOperator {
    /// `as`: raises a cast exception on failure.
    Cast,
    /// Compiler-inserted cast; fails like `Cast` but without user framing.
    ImplicitCast,
    /// `as?`: yields `null` on failure.
    SafeCast,
    /// `is`.
    InstanceOf,
    /// `!is`.
    NotInstanceOf,
    /// Discard the value and yield `Unit`.
    CoercionToUnit,
}

/// One branch of a `When` expression.
///
/// An `else` branch is lowered to a branch whose condition is `true`.
#[derive(Clone, Debug)]
pub struct IrBranch {
    pub condition: ExprId,
    pub result: ExprId,
}

/// One catch clause of a `Try` expression.
#[derive(Clone, Debug)]
pub struct IrCatch {
    /// The catch parameter the thrown value is bound to.
    pub parameter: VarId,
    /// Declared exception type; matching is by subtype.
    pub ty: IrType,
    pub body: ExprId,
}

/// An element of a vararg expression.
#[derive(Clone, Debug)]
pub enum VarargElement {
    Regular(ExprId),
    /// `*expr`: the operand's elements are spliced in element-wise.
    Spread(ExprId),
}

/// Which constructor a delegating call targets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DelegationKind {
    /// Delegation to a super-class constructor.
    Super,
    /// Delegation to a sibling constructor of the same class.
    This,
    /// Delegation from an enum entry initializer to the enum super
    /// constructor. The evaluator supplies the entry name and ordinal.
    EnumSuper,
}

/// A call to a function, with receivers and positional arguments.
///
/// A `None` argument means "evaluate the parameter's default expression".
#[derive(Clone, Debug)]
pub struct IrCall {
    pub function: FunId,
    pub dispatch_receiver: Option<ExprId>,
    pub extension_receiver: Option<ExprId>,
    pub args: Vec<Option<ExprId>>,
    /// Present on `super.f()` calls: the class whose implementation to enter.
    pub super_qualifier: Option<ClassId>,
    /// Source line of the call site, for stack-trace formatting.
    pub line: u32,
}

/// An expression node.
#[derive(Clone, Debug)]
pub enum IrExpr {
    Const(ConstValue),
    /// String template: evaluate each part, stringify, append.
    StringConcat(Vec<ExprId>),
    GetVar(VarId),
    SetVar {
        var: VarId,
        value: ExprId,
    },
    GetField {
        receiver: ExprId,
        field: FieldId,
    },
    SetField {
        receiver: ExprId,
        field: FieldId,
        value: ExprId,
    },
    /// Statement list evaluated in a child scope.
    Block(Vec<ExprId>),
    VarDecl {
        var: VarId,
        init: Option<ExprId>,
    },
    /// Branch scan in source order; the first true condition wins.
    When {
        branches: Vec<IrBranch>,
    },
    While {
        label: Option<Name>,
        condition: ExprId,
        body: ExprId,
    },
    DoWhile {
        label: Option<Name>,
        body: ExprId,
        condition: ExprId,
    },
    Break {
        label: Option<Name>,
    },
    Continue {
        label: Option<Name>,
    },
    Return {
        /// The function this return exits.
        target: FunId,
        value: ExprId,
    },
    Call(IrCall),
    ConstructorCall {
        constructor: FunId,
        args: Vec<Option<ExprId>>,
        line: u32,
    },
    /// The first statement of a constructor body: delegation to a super,
    /// sibling, or enum super constructor.
    DelegatingCall {
        constructor: FunId,
        args: Vec<Option<ExprId>>,
        kind: DelegationKind,
    },
    /// Runs the class's field initializers and init blocks in order.
    InstanceInitializer {
        class: ClassId,
    },
    GetEnumValue {
        class: ClassId,
        entry: Name,
    },
    /// Reference to an `object` or companion singleton.
    GetObjectValue {
        class: ClassId,
    },
    TypeOp {
        op: TypeOperator,
        target: IrType,
        arg: ExprId,
    },
    Vararg {
        element_type: IrType,
        elements: Vec<VarargElement>,
    },
    /// A function literal implementing a functional interface.
    Lambda {
        function: FunId,
        interface: ClassId,
    },
    Throw(ExprId),
    Try {
        body: ExprId,
        catches: Vec<IrCatch>,
        finally: Option<ExprId>,
    },
    /// Placeholder produced when evaluation fails; never evaluable.
    Error(String),
}
