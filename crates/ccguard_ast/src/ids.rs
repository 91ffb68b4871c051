//! Opaque ID newtypes for all AST entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and `Serialize`/`Deserialize`.
//! IDs are created by [`Arena::alloc`](crate::arena::Arena::alloc) and used for O(1) lookup.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a declaration.
    DeclId
);

define_id!(
    /// Opaque, copyable ID for an interned type.
    TypeId
);

define_id!(
    /// Opaque, copyable ID for a statement.
    StmtId
);

define_id!(
    /// Opaque, copyable ID for an expression.
    ExprId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_transparent_serde() {
        let id = DeclId::from_raw(12);
        assert_eq!(id.as_raw(), 12);
        assert_eq!(serde_json::to_string(&id).unwrap(), "12");
        let back: DeclId = serde_json::from_str("12").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn distinct_id_types_share_raw_values() {
        assert_eq!(TypeId::from_raw(3).as_raw(), StmtId::from_raw(3).as_raw());
    }
}
