//! Binder and evaluation settings.

use fexpr_error::{FrankenError, Result};
use serde::{Deserialize, Serialize};

/// Default maximum expression-tree depth (SQLite's `SQLITE_MAX_EXPR_DEPTH`).
pub const DEFAULT_MAX_EXPR_DEPTH: usize = 1000;

/// Settings for binding expression trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Trees deeper than this are rejected before any node is bound.
    /// Evaluation recurses once per level.
    pub max_expr_depth: usize,
    /// Re-resolve calls that are already bound instead of skipping them.
    pub rebind_bound: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_expr_depth: DEFAULT_MAX_EXPR_DEPTH,
            rebind_bound: false,
        }
    }
}

impl EvalConfig {
    /// Parse a JSON object; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FrankenError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_expr_depth == 0 {
            return Err(FrankenError::invalid_config(
                "max_expr_depth must be at least 1",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn with_max_expr_depth(mut self, max_expr_depth: usize) -> Self {
        self.max_expr_depth = max_expr_depth;
        self
    }

    #[must_use]
    pub const fn with_rebind_bound(mut self, rebind_bound: bool) -> Self {
        self.rebind_bound = rebind_bound;
        self
    }
}
