//! Declarations: classes, functions, fields, and value symbols.

use crate::{ClassId, ExprId, FieldId, FileId, FunId, IrType, Name, VarId};

/// What kind of class-like declaration this is.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ClassKind {
    Class,
    Interface,
    EnumClass,
    /// A singleton `object` declaration.
    Object,
    /// A companion object; also a singleton.
    Companion,
}

/// Openness of a class or member.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Modality {
    Final,
    Open,
    Abstract,
}

/// Function flavor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FunctionKind {
    Function,
    Constructor {
        /// Primary constructors attach the delegated super instance;
        /// secondary constructors copy fields from the sibling instance.
        primary: bool,
    },
}

/// An enum entry: its name plus the initializer expression, which is a
/// delegating call to one of the enum class's constructors. The ordinal is
/// the entry's index in the declaration list.
#[derive(Clone, Debug)]
pub struct IrEnumEntry {
    pub name: Name,
    pub initializer: ExprId,
}

/// A class, interface, enum class, or object declaration.
#[derive(Clone, Debug)]
pub struct IrClass {
    pub name: Name,
    /// Dotted package path; `Name::EMPTY` for the root package.
    pub package: Name,
    pub kind: ClassKind,
    pub modality: Modality,
    pub super_class: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    /// Backing fields in declaration order.
    pub fields: Vec<FieldId>,
    /// Anonymous `init { }` blocks, run after the field initializers.
    pub init_blocks: Vec<ExprId>,
    pub functions: Vec<FunId>,
    pub constructors: Vec<FunId>,
    pub enum_entries: Vec<IrEnumEntry>,
    /// Data classes get derived `equals`/`hashCode`/`toString` members.
    pub is_data: bool,
    /// Host key for classes whose behavior the host runtime supplies.
    /// `None` for ordinary user classes.
    pub intrinsic: Option<Name>,
    pub companion: Option<ClassId>,
}

/// A value parameter: its symbol plus an optional default expression.
#[derive(Clone, Debug)]
pub struct IrParam {
    pub var: VarId,
    pub default: Option<ExprId>,
}

/// A function or constructor declaration.
#[derive(Clone, Debug)]
pub struct IrFunction {
    pub name: Name,
    pub parent: Option<ClassId>,
    /// Receiver symbol for member functions. Each function owns its own
    /// receiver symbol; `super` calls rebind the instance to the callee's.
    pub dispatch_receiver: Option<VarId>,
    pub extension_receiver: Option<VarId>,
    pub params: Vec<IrParam>,
    pub return_type: IrType,
    /// `None` for abstract members and for built-in/intrinsic targets.
    pub body: Option<ExprId>,
    /// Immediately-overridden functions, nearest first. Fake overrides
    /// resolve through this chain to the nearest real implementation.
    pub overridden: Vec<FunId>,
    pub kind: FunctionKind,
    pub is_abstract: bool,
    pub file: FileId,
}

impl IrFunction {
    /// Whether this is a constructor.
    #[inline]
    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, FunctionKind::Constructor { .. })
    }
}

/// A backing field of a class.
#[derive(Clone, Debug)]
pub struct IrField {
    pub name: Name,
    pub ty: IrType,
    /// Property initializer, run by `InstanceInitializer` in declaration order.
    pub initializer: Option<ExprId>,
}

/// A value symbol: parameter, local, receiver, or catch parameter.
#[derive(Clone, Debug)]
pub struct IrVariable {
    pub name: Name,
    pub ty: IrType,
}
