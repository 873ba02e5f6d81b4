//! Mica IR - Typed intermediate representation for the Mica compiler.
//!
//! This crate defines the fully-resolved, lowered form of a Mica module that
//! downstream phases consume. Everything is arena-allocated and addressed by
//! compact `u32` ids; identity is always by id, never by node contents.
//!
//! # Architecture
//!
//! - `Name` / `StringInterner`: interned identifiers
//! - Typed ids (`ClassId`, `FunId`, `VarId`, `FieldId`, `ExprId`, `FileId`)
//! - `IrExpr`: the expression tree, one arena per module
//! - `IrClass` / `IrFunction` / `IrField` / `IrVariable`: declarations
//! - `IrModule`: the arenas plus the built-in class table and queries
//! - `ModuleBuilder`: assembly API used by the frontend and by tests

mod builder;
mod consts;
mod decl;
mod expr;
mod ids;
mod interner;
mod module;
mod name;
mod types;

pub use builder::ModuleBuilder;
pub use consts::ConstValue;
pub use decl::{
    ClassKind, FunctionKind, IrClass, IrEnumEntry, IrField, IrFunction, IrParam, IrVariable,
    Modality,
};
pub use expr::{
    DelegationKind, IrBranch, IrCall, IrCatch, IrExpr, TypeOperator, VarargElement,
};
pub use ids::{ClassId, ExprId, FieldId, FileId, FunId, VarId};
pub use interner::{SharedInterner, StringInterner};
pub use module::{Builtins, IrModule, SourceFile};
pub use name::Name;
pub use types::{IrType, PrimitiveKind};
