//! Runtime values, type identifiers, rows and the execution context that
//! flow through a FrankenExpr expression tree.
//!
//! The value model follows SQLite's storage classes (NULL, INTEGER, REAL,
//! TEXT, BLOB). Unlike SQLite, expression nodes carry a *static* type: every
//! node declares the [`TypeId`] it produces, and function calls are checked
//! against declared signatures before they run.

pub mod context;
pub mod row;
pub mod value;

pub use context::ExecContext;
pub use row::{Row, TupleSide};
pub use value::Value;

use std::fmt;

/// Static type identifier of an expression or runtime value.
///
/// `Invalid` is the "unknown" type: it is what an expression reports before
/// its type has been resolved (e.g. a function call that has not been bound
/// to a catalog entry yet). No runtime value ever has type `Invalid`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum TypeId {
    /// Type not yet known.
    Invalid,
    /// The type of an untyped SQL NULL literal.
    Null,
    /// 64-bit signed integer.
    Integer,
    /// 64-bit IEEE 754 floating point.
    Real,
    /// UTF-8 text.
    Text,
    /// Binary large object.
    Blob,
}

impl TypeId {
    /// All concrete (non-`Invalid`) type identifiers.
    pub const CONCRETE: [Self; 5] = [Self::Null, Self::Integer, Self::Real, Self::Text, Self::Blob];

    /// Human-readable SQL name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "INVALID",
            Self::Null => "NULL",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }

    /// Whether this identifier names a resolved type.
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Invalid)
    }

    /// Parse a declared SQL type name.
    ///
    /// Accepts the canonical names plus the common aliases `INT`, `BIGINT`,
    /// `DOUBLE`, `FLOAT`, `VARCHAR` and `CHAR`. Matching is case-insensitive.
    pub fn from_sql_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "NULL" => Some(Self::Null),
            "INTEGER" | "INT" | "BIGINT" => Some(Self::Integer),
            "REAL" | "DOUBLE" | "FLOAT" => Some(Self::Real),
            "TEXT" | "VARCHAR" | "CHAR" => Some(Self::Text),
            "BLOB" => Some(Self::Blob),
            _ => None,
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
