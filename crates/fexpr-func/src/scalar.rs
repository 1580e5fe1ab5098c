//! Scalar (row-level) function trait.
//!
//! Scalar functions compute a single output value from zero or more input
//! values. They are stateless across rows: each invocation is independent.
//!
//! # Send + Sync
//!
//! A resolved function is shared by every copy of an expression tree and may
//! be invoked from concurrent evaluations of the same tree, so
//! implementations must be thread-safe.
#![allow(clippy::unnecessary_literal_bound)]

use fexpr_error::Result;
use fexpr_types::Value;

/// A scalar SQL function.
///
/// Implementations receive the already-evaluated arguments in declaration
/// order and return exactly one value. Arity and types are not properties of
/// the implementation: the declared signature lives beside the function in
/// [`Signature`](crate::Signature), so one implementation can be registered
/// under several overloads. Evaluation checks the returned value against it.
///
/// # Error Handling
///
/// - Return [`FrankenError::FunctionError`](fexpr_error::FrankenError::FunctionError)
///   for domain errors (e.g. `substr` with a negative length).
/// - Return [`FrankenError::IntegerOverflow`](fexpr_error::FrankenError::IntegerOverflow)
///   when integer arithmetic overflows.
pub trait ScalarFunction: Send + Sync {
    /// Execute this function on the given arguments.
    fn invoke(&self, args: &[Value]) -> Result<Value>;

    /// Whether this function is deterministic (same inputs → same output).
    ///
    /// Defaults to `true`.
    fn is_deterministic(&self) -> bool {
        true
    }

    /// The function name, used in error messages and SQL rendering.
    fn name(&self) -> &str;
}
