//! Row (tuple) representation supplied to expression evaluation.

use std::fmt;

use crate::Value;

/// Which input row of a dual-row evaluation a column reference reads.
///
/// Single-row contexts (projections, filters) only supply the primary row.
/// Join predicates supply both: the primary row is the outer side and the
/// secondary row the inner side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum TupleSide {
    #[default]
    Primary,
    Secondary,
}

impl TupleSide {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl fmt::Display for TupleSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of column values.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a row from its column values.
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// An empty row, used when an expression reads no columns.
    #[must_use]
    pub const fn empty() -> Self {
        Self { values: Vec::new() }
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Column value at `index`, or `None` past the end of the row.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_access() {
        let row = Row::new(vec![Value::Integer(1), Value::from("a")]);
        assert_eq!(row.width(), 2);
        assert_eq!(row.get(0), Some(&Value::Integer(1)));
        assert_eq!(row.get(1), Some(&Value::Text("a".to_owned())));
        assert!(row.get(2).is_none());
    }

    #[test]
    fn row_from_iterator() {
        let row: Row = (1..=3).map(Value::Integer).collect();
        assert_eq!(row.width(), 3);
        assert_eq!(row.values()[2], Value::Integer(3));
        assert_eq!(row.into_values().len(), 3);
    }

    #[test]
    fn empty_row_has_no_columns() {
        assert_eq!(Row::empty().width(), 0);
        assert_eq!(Row::empty(), Row::default());
    }

    #[test]
    fn tuple_side_display() {
        assert_eq!(TupleSide::Primary.to_string(), "primary");
        assert_eq!(TupleSide::Secondary.to_string(), "secondary");
        assert_eq!(TupleSide::default(), TupleSide::Primary);
    }
}
