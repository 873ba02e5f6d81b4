//! Typed arena indices.
//!
//! Each id is a `#[repr(transparent)]` `u32` index into the corresponding
//! arena on `IrModule`. Ids from different modules must never be mixed.

use std::fmt;

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw arena index.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            /// Get the raw arena index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

arena_id! {
    /// A class, interface, enum class, or object declaration.
    ClassId
}
arena_id! {
    /// A function or constructor declaration.
    FunId
}
arena_id! {
    /// A value symbol: parameter, local, receiver, or catch parameter.
    VarId
}
arena_id! {
    /// A backing field of a class.
    FieldId
}
arena_id! {
    /// An expression node.
    ExprId
}
arena_id! {
    /// A source file.
    FileId
}
