//! SQL-like rendering of expression trees via `fmt::Display`.
//!
//! Used in log events and error context. Column references render as
//! `$p<index>` for the primary row and `$s<index>` for the secondary row.

use std::fmt;

use fexpr_types::{TupleSide, TypeId};

use crate::{ColumnRef, Expr, FunctionCallExpr, LiteralExpr};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        None => true,
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => true,
        Some(_) => !chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
    }
}

fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if needs_quoting(name) {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    } else {
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

impl fmt::Display for LiteralExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = self.value_type();
        if self.value().is_null() && ty != TypeId::Null {
            return write!(f, "CAST(NULL AS {ty})");
        }
        write!(f, "{}", self.value())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.side {
            TupleSide::Primary => 'p',
            TupleSide::Secondary => 's',
        };
        write!(f, "${prefix}{}", self.index)
    }
}

impl fmt::Display for FunctionCallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ident(f, self.name())?;
        f.write_str("(")?;
        comma_list(f, self.children())?;
        f.write_str(")")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => lit.fmt(f),
            Self::Column(col) => col.fmt(f),
            Self::Function(call) => call.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use fexpr_types::Value;

    use super::*;

    #[test]
    fn literals() {
        assert_eq!(Expr::literal(3_i64).to_string(), "3");
        assert_eq!(Expr::literal(-2.5).to_string(), "-2.5");
        assert_eq!(Expr::literal("it's").to_string(), "'it''s'");
        assert_eq!(Expr::literal(vec![0x0A_u8]).to_string(), "X'0A'");
        assert_eq!(Expr::literal(Value::Null).to_string(), "NULL");
    }

    #[test]
    fn typed_null_renders_as_cast() {
        assert_eq!(
            Expr::typed_null(TypeId::Integer).to_string(),
            "CAST(NULL AS INTEGER)"
        );
        assert_eq!(Expr::typed_null(TypeId::Null).to_string(), "NULL");
    }

    #[test]
    fn columns() {
        assert_eq!(Expr::column(0, TypeId::Integer).to_string(), "$p0");
        assert_eq!(Expr::secondary_column(12, TypeId::Text).to_string(), "$s12");
    }

    #[test]
    fn calls() {
        let expr = Expr::call(
            "add_int",
            vec![
                Expr::literal(3_i64),
                Expr::call("abs", vec![Expr::column(1, TypeId::Integer)]),
            ],
        );
        assert_eq!(expr.to_string(), "add_int(3, abs($p1))");
        assert_eq!(Expr::call("now", vec![]).to_string(), "now()");
    }

    #[test]
    fn odd_function_names_are_quoted() {
        assert_eq!(Expr::call("my fn", vec![]).to_string(), "\"my fn\"()");
        assert_eq!(Expr::call("2x", vec![]).to_string(), "\"2x\"()");
        assert_eq!(Expr::call("a\"b", vec![]).to_string(), "\"a\"\"b\"()");
    }
}
