//! Resolves the function calls of an expression tree against a registry.

use fexpr_error::{FrankenError, Result};
use fexpr_func::FunctionRegistry;
use fexpr_types::TypeId;
use tracing::debug;

use crate::{EvalConfig, Expr, FunctionCallExpr};

/// Binds every unbound call in a tree, children before parents.
///
/// Each call is looked up by its name and its children's static types, then
/// bound through [`FunctionCallExpr::bind`], so the usual arity and type
/// checks apply to registry results too.
pub struct Binder<'a> {
    registry: &'a FunctionRegistry,
    config: EvalConfig,
}

impl<'a> Binder<'a> {
    #[must_use]
    pub const fn new(registry: &'a FunctionRegistry, config: EvalConfig) -> Self {
        Self { registry, config }
    }

    #[must_use]
    pub const fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Bind `expr` in place, returning how many calls this pass bound.
    ///
    /// Fails with `ExpressionTooDeep` before touching any node when the tree
    /// exceeds `max_expr_depth`. The pass runs on a copy of the tree and is
    /// committed only when every call resolved, so on any error `expr` is
    /// left exactly as it was.
    pub fn bind(&self, expr: &mut Expr) -> Result<usize> {
        let depth = expr.depth();
        if depth > self.config.max_expr_depth {
            debug!(depth, max = self.config.max_expr_depth, "expression tree too deep");
            return Err(FrankenError::ExpressionTooDeep {
                max: self.config.max_expr_depth,
            });
        }
        let mut staged = expr.clone();
        let mut bound = 0;
        if let Err(err) = self.bind_node(&mut staged, &mut bound) {
            debug!(depth, error = %err, "binder pass failed; tree left unchanged");
            return Err(err);
        }
        *expr = staged;
        debug!(depth, bound, calls = expr.call_count(), "bound expression tree");
        Ok(bound)
    }

    fn bind_node(&self, expr: &mut Expr, bound: &mut usize) -> Result<()> {
        let Expr::Function(call) = expr else {
            return Ok(());
        };
        for child in call.children_mut() {
            self.bind_node(child, bound)?;
        }
        // A skipped call must still agree with its children, which this pass
        // may have just bound.
        if let Some(resolved) = call.resolved()
            && !self.config.rebind_bound
        {
            return FunctionCallExpr::validate_binding(call.name(), resolved, call.children());
        }
        self.resolve(call)?;
        *bound += 1;
        Ok(())
    }

    fn resolve(&self, call: &mut FunctionCallExpr) -> Result<()> {
        let arg_types: Vec<TypeId> = call.children().iter().map(Expr::value_type).collect();
        let resolved = self
            .registry
            .find_scalar(call.name(), &arg_types)
            .ok_or_else(|| FrankenError::NoSuchFunction {
                name: call.name().to_owned(),
                arg_types,
            })?;
        call.bind(resolved)
    }
}
