use fexpr_types::{TupleSide, TypeId};
use thiserror::Error;

/// Primary error type for FrankenExpr operations.
///
/// Binding errors (`ArityMismatch`, `ArgumentTypeMismatch`, `NoSuchFunction`,
/// `ExpressionTooDeep`) describe a malformed plan and surface as query
/// compilation failures. Everything raised while evaluating surfaces as a
/// query execution failure. See [`FrankenError::phase`].
#[derive(Error, Debug)]
pub enum FrankenError {
    // === Binding Errors ===
    /// Declared argument-type count disagrees with the number of children.
    #[error(
        "wrong number of arguments to function {function}(): expected {expected}, got {actual}"
    )]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// A child's static type disagrees with the declared argument type.
    #[error(
        "incorrect argument type to function {function}(): argument {position} expected type {expected} but found {actual}"
    )]
    ArgumentTypeMismatch {
        function: String,
        position: usize,
        expected: TypeId,
        actual: TypeId,
    },

    /// No catalog entry matches the function name and argument types.
    #[error("no such function: {name}({})", join_types(.arg_types))]
    NoSuchFunction { name: String, arg_types: Vec<TypeId> },

    /// Expression tree too deep.
    #[error("expression tree too deep (max {max})")]
    ExpressionTooDeep { max: usize },

    // === Evaluation Errors ===
    /// A function-call node was evaluated before it was bound.
    #[error("function {function}() evaluated before it was bound")]
    UnboundFunctionCall { function: String },

    /// A function returned a value whose type differs from its declared
    /// return type.
    #[error("function {function}() returned an unexpected type: expected {expected}, got {actual}")]
    ReturnTypeMismatch {
        function: String,
        expected: TypeId,
        actual: TypeId,
    },

    /// Column reference past the end of the supplied row.
    #[error("column {index} out of range for {side} row of width {width}")]
    ColumnOutOfRange {
        side: TupleSide,
        index: usize,
        width: usize,
    },

    /// Column reference to the secondary row when none was supplied.
    #[error("column {index} reads the secondary row, but none was supplied")]
    MissingSecondaryRow { index: usize },

    /// Integer overflow during computation.
    #[error("integer overflow")]
    IntegerOverflow,

    /// String or BLOB exceeds the size limit.
    #[error("string or BLOB exceeds size limit")]
    TooBig,

    /// SQL function domain/runtime error (analogous to `sqlite3_result_error`).
    #[error("{0}")]
    FunctionError(String),

    // === Configuration Errors ===
    /// Evaluation configuration rejected.
    #[error("invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    // === Internal Errors ===
    /// Internal logic error (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn join_types(types: &[TypeId]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// SQLite-compatible result/error codes.
///
/// These match the numeric values from C SQLite's `sqlite3.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Successful result.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// Internal logic error.
    Internal = 2,
    /// String or BLOB exceeds size limit.
    TooBig = 18,
    /// Data type mismatch.
    Mismatch = 20,
    /// Library used incorrectly.
    Misuse = 21,
    /// Value out of range.
    Range = 25,
}

/// Query phase an error should be reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorPhase {
    /// Raised while building or binding the expression tree.
    Compile,
    /// Raised while evaluating the tree against a row.
    Execute,
}

impl FrankenError {
    /// Map this error to a SQLite error code for compatibility.
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::ArityMismatch { .. }
            | Self::NoSuchFunction { .. }
            | Self::ExpressionTooDeep { .. }
            | Self::InvalidConfig { .. }
            | Self::FunctionError(_) => ErrorCode::Error,
            Self::ArgumentTypeMismatch { .. } => ErrorCode::Mismatch,
            Self::UnboundFunctionCall { .. } => ErrorCode::Misuse,
            Self::ReturnTypeMismatch { .. } | Self::Internal(_) => ErrorCode::Internal,
            Self::ColumnOutOfRange { .. }
            | Self::MissingSecondaryRow { .. }
            | Self::IntegerOverflow => ErrorCode::Range,
            Self::TooBig => ErrorCode::TooBig,
        }
    }

    /// Whether this error is reported as a compilation or execution failure.
    pub const fn phase(&self) -> ErrorPhase {
        match self {
            Self::ArityMismatch { .. }
            | Self::ArgumentTypeMismatch { .. }
            | Self::NoSuchFunction { .. }
            | Self::ExpressionTooDeep { .. }
            | Self::InvalidConfig { .. } => ErrorPhase::Compile,
            Self::UnboundFunctionCall { .. }
            | Self::ReturnTypeMismatch { .. }
            | Self::ColumnOutOfRange { .. }
            | Self::MissingSecondaryRow { .. }
            | Self::IntegerOverflow
            | Self::TooBig
            | Self::FunctionError(_)
            | Self::Internal(_) => ErrorPhase::Execute,
        }
    }

    /// Whether this error signals a broken engine invariant rather than a
    /// problem with the query or its data.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnboundFunctionCall { .. } | Self::ReturnTypeMismatch { .. } | Self::Internal(_)
        )
    }

    /// Whether the user can likely fix this without code changes.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ArityMismatch { .. }
                | Self::ArgumentTypeMismatch { .. }
                | Self::NoSuchFunction { .. }
                | Self::ExpressionTooDeep { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ArityMismatch { .. } => Some("Check the number of arguments passed to the function"),
            Self::ArgumentTypeMismatch { .. } => {
                Some("Add a CAST so the argument matches the declared parameter type")
            }
            Self::NoSuchFunction { .. } => {
                Some("Check the function name and the types of its arguments")
            }
            Self::ExpressionTooDeep { .. } => {
                Some("Simplify the expression or raise max_expr_depth")
            }
            Self::TooBig => Some("Reduce the size of the value being produced"),
            _ => None,
        }
    }

    /// Get the process exit code for this error (for CLI use).
    pub const fn exit_code(&self) -> i32 {
        self.error_code() as i32
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a function domain error.
    pub fn function_error(msg: impl Into<String>) -> Self {
        Self::FunctionError(msg.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(detail: impl Into<String>) -> Self {
        Self::InvalidConfig {
            detail: detail.into(),
        }
    }
}

/// Result type alias using `FrankenError`.
pub type Result<T> = std::result::Result<T, FrankenError>;
