//! Function-call expression nodes.
//!
//! A [`FunctionCallExpr`] is created unbound by the parser (name plus
//! children) and later bound to a [`ResolvedFunction`], or constructed bound
//! directly by a planner that already resolved the call. Binding validates
//! the children's static types against the declared signature and only then
//! commits, so a failed bind leaves the node exactly as it was.

use fexpr_error::{FrankenError, Result};
use fexpr_func::ResolvedFunction;
use fexpr_types::{ExecContext, Row, TypeId, Value};
use tracing::{debug, error};

use crate::Expr;

/// Binding state of a function-call node.
#[derive(Debug, Clone, Default)]
pub enum Binding {
    /// Name only; the node cannot be evaluated yet.
    #[default]
    Unbound,
    /// Resolved to a catalog entry whose argument types match the children.
    Bound(ResolvedFunction),
}

impl Binding {
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    #[must_use]
    pub const fn resolved(&self) -> Option<&ResolvedFunction> {
        match self {
            Self::Unbound => None,
            Self::Bound(resolved) => Some(resolved),
        }
    }
}

/// A scalar function applied to child expressions.
///
/// When bound, `children.len() == arg_types.len()` and every child's static
/// type equals the declared argument type at its position. Both hold for the
/// node's whole lifetime: children are only replaced through
/// [`replace_child`](Self::replace_child), which re-checks them.
#[derive(Debug, Clone)]
pub struct FunctionCallExpr {
    name: String,
    children: Vec<Expr>,
    binding: Binding,
}

impl FunctionCallExpr {
    /// Create an unbound call. No validation happens until it is bound.
    #[must_use]
    pub fn new(name: impl Into<String>, children: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            children,
            binding: Binding::Unbound,
        }
    }

    /// Create a call that is bound from the start.
    ///
    /// The node takes its name from the resolved function. On failure no node
    /// is constructed; use [`validate_binding`](Self::validate_binding)
    /// beforehand to keep ownership of `children` when that matters.
    pub fn new_bound(resolved: ResolvedFunction, children: Vec<Expr>) -> Result<Self> {
        Self::validate_binding(resolved.name(), &resolved, &children)?;
        Ok(Self {
            name: resolved.name().to_owned(),
            children,
            binding: Binding::Bound(resolved),
        })
    }

    /// Check `children` against `resolved`'s declared argument types.
    ///
    /// A signature that declares `INVALID` anywhere is rejected as an
    /// internal error. Arity is checked next; type mismatches report the
    /// lowest offending position. `function` names the call in the error.
    pub fn validate_binding(
        function: &str,
        resolved: &ResolvedFunction,
        children: &[Expr],
    ) -> Result<()> {
        if !resolved.return_type.is_known() {
            return Err(FrankenError::internal(format!(
                "function {function}() declares return type {}",
                resolved.return_type
            )));
        }
        if let Some(position) = resolved.arg_types.iter().position(|ty| !ty.is_known()) {
            return Err(FrankenError::internal(format!(
                "function {function}() declares argument {position} with type {}",
                resolved.arg_types[position]
            )));
        }
        if children.len() != resolved.arg_types.len() {
            return Err(FrankenError::ArityMismatch {
                function: function.to_owned(),
                expected: resolved.arg_types.len(),
                actual: children.len(),
            });
        }
        for (position, (child, &expected)) in
            children.iter().zip(&resolved.arg_types).enumerate()
        {
            let actual = child.value_type();
            if actual != expected {
                return Err(FrankenError::ArgumentTypeMismatch {
                    function: function.to_owned(),
                    position,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Bind (or rebind) this node to `resolved`.
    ///
    /// On error the previous binding is kept.
    pub fn bind(&mut self, resolved: ResolvedFunction) -> Result<()> {
        Self::validate_binding(&self.name, &resolved, &self.children)?;
        debug!(
            function = %self.name,
            return_type = %resolved.return_type,
            arity = self.children.len(),
            rebind = self.binding.is_bound(),
            "bound function call"
        );
        self.binding = Binding::Bound(resolved);
        Ok(())
    }

    /// Evaluate the call.
    ///
    /// Children are evaluated left to right, stopping at the first error.
    /// The function is then invoked exactly once and its result checked
    /// against the declared return type.
    pub fn evaluate(
        &self,
        primary: &Row,
        secondary: Option<&Row>,
        cx: &ExecContext,
    ) -> Result<Value> {
        let Binding::Bound(resolved) = &self.binding else {
            return Err(FrankenError::UnboundFunctionCall {
                function: self.name.clone(),
            });
        };

        let mut args = Vec::with_capacity(self.children.len());
        for child in &self.children {
            args.push(child.evaluate(primary, secondary, cx)?);
        }

        let value = resolved.function.invoke(&args)?;
        if !value.conforms_to(resolved.return_type) {
            error!(
                function = %self.name,
                expected = %resolved.return_type,
                actual = %value.type_id(),
                query_id = cx.query_id(),
                "function returned a value outside its declared return type"
            );
            return Err(FrankenError::ReturnTypeMismatch {
                function: self.name.clone(),
                expected: resolved.return_type,
                actual: value.type_id(),
            });
        }
        Ok(value)
    }

    /// Replace the child at `index`, returning the previous one.
    ///
    /// On a bound node the replacement must have the declared argument type
    /// at that position; otherwise the node is left unchanged.
    pub fn replace_child(&mut self, index: usize, child: Expr) -> Result<Expr> {
        let width = self.children.len();
        let slot = self.children.get_mut(index).ok_or_else(|| {
            FrankenError::internal(format!(
                "child {index} out of range for {}() with {width} arguments",
                self.name
            ))
        })?;
        if let Binding::Bound(resolved) = &self.binding {
            let expected = resolved.arg_types[index];
            let actual = child.value_type();
            if actual != expected {
                return Err(FrankenError::ArgumentTypeMismatch {
                    function: self.name.clone(),
                    position: index,
                    expected,
                    actual,
                });
            }
        }
        Ok(std::mem::replace(slot, child))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn children(&self) -> &[Expr] {
        &self.children
    }

    /// Mutable access for in-crate passes that bind children in place.
    /// Rebinding a child may change its static type; the caller must then
    /// re-resolve this node or discard the whole tree.
    pub(crate) fn children_mut(&mut self) -> &mut [Expr] {
        &mut self.children
    }

    #[must_use]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.binding.is_bound()
    }

    #[must_use]
    pub const fn resolved(&self) -> Option<&ResolvedFunction> {
        self.binding.resolved()
    }

    /// Declared return type, or [`TypeId::Invalid`] while unbound.
    #[must_use]
    pub fn return_type(&self) -> TypeId {
        self.resolved()
            .map_or(TypeId::Invalid, |resolved| resolved.return_type)
    }

    /// Declared argument types; empty while unbound.
    #[must_use]
    pub fn arg_types(&self) -> &[TypeId] {
        match &self.binding {
            Binding::Unbound => &[],
            Binding::Bound(resolved) => &resolved.arg_types,
        }
    }

    /// Static type of this node's result.
    #[must_use]
    pub fn value_type(&self) -> TypeId {
        self.return_type()
    }
}
