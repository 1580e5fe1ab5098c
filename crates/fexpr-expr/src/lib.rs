//! Scalar expression trees evaluated once per row.
//!
//! An [`Expr`] is a closed sum over the node kinds this engine evaluates:
//! constants, column references and function calls. Each node exposes its
//! static [`TypeId`] without touching data, and [`Expr::evaluate`] computes a
//! [`Value`] against a primary row, an optional secondary row (join
//! predicates) and an opaque [`ExecContext`].
//!
//! Function calls start life either unbound (name and children only, as a
//! parser produces them) or bound to a [`ResolvedFunction`] from the catalog;
//! see [`FunctionCallExpr`]. The [`Binder`] resolves every unbound call of a
//! tree against a [`FunctionRegistry`](fexpr_func::FunctionRegistry).
//!
//! Trees own their children exclusively. `Clone` is a structural deep copy;
//! only the immutable, thread-safe function implementations are shared.

pub mod binder;
pub mod config;
mod display;
pub mod function;

pub use binder::Binder;
pub use config::EvalConfig;
pub use function::{Binding, FunctionCallExpr};

pub use fexpr_error::{FrankenError, Result};
pub use fexpr_func::ResolvedFunction;
pub use fexpr_types::{ExecContext, Row, TupleSide, TypeId, Value};

/// A constant value with its static type.
///
/// The static type is normally the value's own type. A typed NULL
/// ([`Expr::typed_null`]) keeps the column or parameter type it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    value: Value,
    value_type: TypeId,
}

impl LiteralExpr {
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn value_type(&self) -> TypeId {
        self.value_type
    }
}

/// Reference to a column of the primary or secondary input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub side: TupleSide,
    pub index: usize,
    /// Declared column type, taken from the schema the plan was built for.
    pub value_type: TypeId,
}

impl ColumnRef {
    fn evaluate(&self, primary: &Row, secondary: Option<&Row>) -> Result<Value> {
        let row = match self.side {
            TupleSide::Primary => primary,
            TupleSide::Secondary => secondary
                .ok_or(FrankenError::MissingSecondaryRow { index: self.index })?,
        };
        row.get(self.index)
            .cloned()
            .ok_or(FrankenError::ColumnOutOfRange {
                side: self.side,
                index: self.index,
                width: row.width(),
            })
    }
}

/// A scalar expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A constant.
    Literal(LiteralExpr),
    /// A column of an input row.
    Column(ColumnRef),
    /// A scalar function call over child expressions.
    Function(FunctionCallExpr),
}

impl Expr {
    /// A constant whose static type is the value's type.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        let value_type = value.type_id();
        Self::Literal(LiteralExpr { value, value_type })
    }

    /// A NULL constant statically typed as `ty`.
    #[must_use]
    pub fn typed_null(ty: TypeId) -> Self {
        Self::Literal(LiteralExpr {
            value: Value::Null,
            value_type: ty,
        })
    }

    /// A reference to column `index` of the primary row.
    #[must_use]
    pub fn column(index: usize, value_type: TypeId) -> Self {
        Self::Column(ColumnRef {
            side: TupleSide::Primary,
            index,
            value_type,
        })
    }

    /// A reference to column `index` of the secondary row.
    #[must_use]
    pub fn secondary_column(index: usize, value_type: TypeId) -> Self {
        Self::Column(ColumnRef {
            side: TupleSide::Secondary,
            index,
            value_type,
        })
    }

    /// An unbound function call.
    #[must_use]
    pub fn call(name: impl Into<String>, children: Vec<Self>) -> Self {
        Self::Function(FunctionCallExpr::new(name, children))
    }

    /// A function call bound to `resolved`, validated against `children`.
    pub fn bound_call(resolved: ResolvedFunction, children: Vec<Self>) -> Result<Self> {
        FunctionCallExpr::new_bound(resolved, children).map(Self::Function)
    }

    /// Static type of the value this node produces.
    ///
    /// Unbound function calls report [`TypeId::Invalid`].
    #[must_use]
    pub fn value_type(&self) -> TypeId {
        match self {
            Self::Literal(lit) => lit.value_type,
            Self::Column(col) => col.value_type,
            Self::Function(call) => call.value_type(),
        }
    }

    /// Evaluate this node against a row.
    ///
    /// `secondary` is supplied in dual-row contexts such as join predicates.
    /// `cx` is passed through to every child unchanged.
    pub fn evaluate(&self, primary: &Row, secondary: Option<&Row>, cx: &ExecContext) -> Result<Value> {
        match self {
            Self::Literal(lit) => Ok(lit.value.clone()),
            Self::Column(col) => col.evaluate(primary, secondary),
            Self::Function(call) => call.evaluate(primary, secondary, cx),
        }
    }

    /// Direct children, in evaluation order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Literal(_) | Self::Column(_) => &[],
            Self::Function(call) => call.children(),
        }
    }

    #[must_use]
    pub fn as_function(&self) -> Option<&FunctionCallExpr> {
        match self {
            Self::Function(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut FunctionCallExpr> {
        match self {
            Self::Function(call) => Some(call),
            _ => None,
        }
    }

    /// Height of the tree rooted here; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        // Iterative so that measuring an over-deep tree cannot itself
        // exhaust the stack.
        let mut max = 0;
        let mut stack = vec![(self, 1_usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children().iter().map(|child| (child, depth + 1)));
        }
        max
    }

    /// Number of function-call nodes in the tree.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.iter().filter(|node| matches!(node, Self::Function(_))).count()
    }

    /// Whether every function call in the tree is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.iter()
            .all(|node| node.as_function().is_none_or(FunctionCallExpr::is_bound))
    }

    /// Whether evaluating the tree twice on the same row must give the same
    /// value. Unbound calls count as non-deterministic.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.iter().all(|node| {
            node.as_function().is_none_or(|call| {
                call.resolved()
                    .is_some_and(|resolved| resolved.function.is_deterministic())
            })
        })
    }

    /// Pre-order iterator over the nodes of the tree.
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());
            Some(node)
        })
    }
}

impl From<FunctionCallExpr> for Expr {
    fn from(call: FunctionCallExpr) -> Self {
        Self::Function(call)
    }
}

impl From<ColumnRef> for Expr {
    fn from(col: ColumnRef) -> Self {
        Self::Column(col)
    }
}
