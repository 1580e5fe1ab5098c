//! Built-in typed scalar functions.
//!
//! Every built-in is registered with an explicit [`Signature`]; overloads
//! (e.g. `abs(INTEGER)` and `abs(REAL)`) share one implementation object per
//! registration. Unless noted otherwise, a NULL argument yields NULL.
#![allow(
    clippy::unnecessary_literal_bound,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use std::fmt::Write as _;

use fexpr_error::{FrankenError, Result};
use fexpr_types::{TypeId, Value};

use crate::{FunctionRegistry, ScalarFunction, Signature};

// ── Helpers ───────────────────────────────────────────────────────────────

/// Standard NULL propagation: if any arg is NULL, return NULL.
fn null_propagate(args: &[Value]) -> Option<Value> {
    if args.iter().any(Value::is_null) {
        Some(Value::Null)
    } else {
        None
    }
}

fn unexpected(name: &str, args: &[Value]) -> FrankenError {
    let types: Vec<&str> = args.iter().map(Value::typeof_str).collect();
    FrankenError::internal(format!(
        "{name}() invoked with undeclared argument types ({})",
        types.join(", ")
    ))
}

// ── abs(X) ────────────────────────────────────────────────────────────────

pub struct AbsFunc;

impl ScalarFunction for AbsFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Integer(i) => i
                .checked_abs()
                .map(Value::Integer)
                .ok_or(FrankenError::IntegerOverflow),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            _ => Err(unexpected(self.name(), args)),
        }
    }

    fn name(&self) -> &str {
        "abs"
    }
}

// ── add_int(X, Y) ─────────────────────────────────────────────────────────

pub struct AddIntFunc;

impl ScalarFunction for AddIntFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        if let Some(null) = null_propagate(args) {
            return Ok(null);
        }
        match (&args[0], &args[1]) {
            (Value::Integer(a), Value::Integer(b)) => a
                .checked_add(*b)
                .map(Value::Integer)
                .ok_or(FrankenError::IntegerOverflow),
            _ => Err(unexpected(self.name(), args)),
        }
    }

    fn name(&self) -> &str {
        "add_int"
    }
}

// ── add_real(X, Y) ────────────────────────────────────────────────────────

pub struct AddRealFunc;

impl ScalarFunction for AddRealFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        if let Some(null) = null_propagate(args) {
            return Ok(null);
        }
        match (&args[0], &args[1]) {
            // NaN (e.g. Inf + -Inf) becomes NULL.
            (Value::Float(a), Value::Float(b)) => Ok(Value::from(a + b)),
            _ => Err(unexpected(self.name(), args)),
        }
    }

    fn name(&self) -> &str {
        "add_real"
    }
}

// ── concat(X, ...) ────────────────────────────────────────────────────────

pub struct ConcatFunc;

impl ScalarFunction for ConcatFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        let mut result = String::new();
        for arg in args {
            // concat treats NULL as empty string (unlike ||)
            if let Some(s) = arg.as_text() {
                result.push_str(s);
            }
        }
        Ok(Value::Text(result))
    }

    fn name(&self) -> &str {
        "concat"
    }
}

// ── lower(X) / upper(X) ───────────────────────────────────────────────────

pub struct LowerFunc;

impl ScalarFunction for LowerFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Text(s) => Ok(Value::Text(s.to_lowercase())),
            _ => Err(unexpected(self.name(), args)),
        }
    }

    fn name(&self) -> &str {
        "lower"
    }
}

pub struct UpperFunc;

impl ScalarFunction for UpperFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Text(s) => Ok(Value::Text(s.to_uppercase())),
            _ => Err(unexpected(self.name(), args)),
        }
    }

    fn name(&self) -> &str {
        "upper"
    }
}

// ── length(X) ─────────────────────────────────────────────────────────────

pub struct LengthFunc;

impl ScalarFunction for LengthFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        let len = match &args[0] {
            Value::Null => return Ok(Value::Null),
            Value::Text(s) => s.chars().count(),
            Value::Blob(b) => b.len(),
            _ => return Err(unexpected(self.name(), args)),
        };
        Ok(Value::Integer(len as i64))
    }

    fn name(&self) -> &str {
        "length"
    }
}

// ── substr(X, START [, LENGTH]) ───────────────────────────────────────────

pub struct SubstrFunc;

impl ScalarFunction for SubstrFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        if let Some(null) = null_propagate(args) {
            return Ok(null);
        }
        let (Some(s), Some(start)) = (args[0].as_text(), args[1].as_integer()) else {
            return Err(unexpected(self.name(), args));
        };
        let chars: Vec<char> = s.chars().collect();
        let char_count = chars.len() as i64;
        let length = match args.get(2) {
            Some(v) => v
                .as_integer()
                .ok_or_else(|| unexpected(self.name(), args))?,
            None => char_count + 1,
        };

        // 1-based start; start=0 yields max(length-1, 0) chars; negative
        // start counts from the end; negative length takes the characters
        // preceding start.
        if length < 0 {
            let end_pos = if start > 0 {
                (start - 1).min(char_count)
            } else if start == 0 {
                0
            } else {
                (char_count + start + 1).clamp(0, char_count)
            };
            let start_pos = end_pos.saturating_add(length).max(0);
            let result: String = chars[start_pos as usize..end_pos as usize].iter().collect();
            return Ok(Value::Text(result));
        }

        let (begin, len) = if start > 0 {
            ((start - 1) as usize, length as usize)
        } else if start == 0 {
            (0, (length - 1).max(0) as usize)
        } else {
            let effective = char_count + start;
            if effective < 0 {
                let skip = effective.unsigned_abs() as usize;
                (0, (length as usize).saturating_sub(skip))
            } else {
                (effective as usize, length as usize)
            }
        };

        let result: String = chars.iter().skip(begin).take(len).collect();
        Ok(Value::Text(result))
    }

    fn name(&self) -> &str {
        "substr"
    }
}

// ── hex(X) ────────────────────────────────────────────────────────────────

pub struct HexFunc;

impl ScalarFunction for HexFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        let bytes = match &args[0] {
            Value::Null => return Ok(Value::Null),
            Value::Blob(b) => b,
            _ => return Err(unexpected(self.name(), args)),
        };
        let mut hex = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            let _ = write!(hex, "{b:02X}");
        }
        Ok(Value::Text(hex))
    }

    fn name(&self) -> &str {
        "hex"
    }
}

// ── round(X) ──────────────────────────────────────────────────────────────

pub struct RoundFunc;

impl ScalarFunction for RoundFunc {
    fn invoke(&self, args: &[Value]) -> Result<Value> {
        match &args[0] {
            Value::Null => Ok(Value::Null),
            // Round half away from zero (NOT banker's rounding)
            Value::Float(x) => Ok(Value::Float(x.round())),
            _ => Err(unexpected(self.name(), args)),
        }
    }

    fn name(&self) -> &str {
        "round"
    }
}

/// Register every built-in scalar function with its typed signatures.
pub fn register_builtins(registry: &mut FunctionRegistry) {
    use TypeId::{Blob, Integer, Real, Text};

    // Math
    registry.register_scalar(AbsFunc, Signature::new(vec![Integer], Integer));
    registry.register_scalar(AbsFunc, Signature::new(vec![Real], Real));
    registry.register_scalar(AddIntFunc, Signature::new(vec![Integer, Integer], Integer));
    registry.register_scalar(AddRealFunc, Signature::new(vec![Real, Real], Real));
    registry.register_scalar(RoundFunc, Signature::new(vec![Real], Real));

    // String
    registry.register_scalar(ConcatFunc, Signature::variadic(Text, Text));
    registry.register_scalar(LowerFunc, Signature::new(vec![Text], Text));
    registry.register_scalar(UpperFunc, Signature::new(vec![Text], Text));
    registry.register_scalar(LengthFunc, Signature::new(vec![Text], Integer));
    registry.register_scalar(LengthFunc, Signature::new(vec![Blob], Integer));
    registry.register_scalar(SubstrFunc, Signature::new(vec![Text, Integer], Text));
    registry.register_scalar(SubstrFunc, Signature::new(vec![Text, Integer, Integer], Text));

    // Blob
    registry.register_scalar(HexFunc, Signature::new(vec![Blob], Text));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_owned())
    }

    fn call(registry: &FunctionRegistry, name: &str, args: &[Value]) -> Result<Value> {
        let types: Vec<TypeId> = args.iter().map(Value::type_id).collect();
        let resolved = registry
            .find_scalar(name, &types)
            .unwrap_or_else(|| panic!("{name} resolves for {types:?}"));
        resolved.function.invoke(args)
    }

    #[test]
    fn test_builtins_registered() {
        let registry = FunctionRegistry::with_builtins();
        for name in [
            "abs", "add_int", "add_real", "round", "concat", "lower", "upper", "length",
            "substr", "hex",
        ] {
            assert!(registry.contains_scalar(name), "{name} missing");
        }
        assert_eq!(registry.len(), 13);
    }

    #[test]
    fn test_abs_overloads() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(
            call(&registry, "abs", &[Value::Integer(-5)]).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            call(&registry, "abs", &[Value::Float(-2.5)]).unwrap(),
            Value::Float(2.5)
        );
        let abs_int = registry.find_scalar("abs", &[TypeId::Integer]).unwrap();
        assert_eq!(abs_int.return_type, TypeId::Integer);
    }

    #[test]
    fn test_abs_min_overflows() {
        let err = AbsFunc.invoke(&[Value::Integer(i64::MIN)]).unwrap_err();
        assert!(matches!(err, FrankenError::IntegerOverflow));
    }

    #[test]
    fn test_add_int() {
        let registry = FunctionRegistry::with_builtins();
        assert_eq!(
            call(&registry, "add_int", &[Value::Integer(3), Value::Integer(4)]).unwrap(),
            Value::Integer(7)
        );
        let err = AddIntFunc
            .invoke(&[Value::Integer(i64::MAX), Value::Integer(1)])
            .unwrap_err();
        assert!(matches!(err, FrankenError::IntegerOverflow));
        assert!(
            AddIntFunc
                .invoke(&[Value::Null, Value::Integer(1)])
                .unwrap()
                .is_null()
        );
    }

    #[test]
    fn test_add_real_nan_is_null() {
        assert_eq!(
            AddRealFunc
                .invoke(&[Value::Float(1.5), Value::Float(2.0)])
                .unwrap(),
            Value::Float(3.5)
        );
        assert!(
            AddRealFunc
                .invoke(&[Value::Float(f64::INFINITY), Value::Float(f64::NEG_INFINITY)])
                .unwrap()
                .is_null()
        );
    }

    #[test]
    fn test_concat_skips_null() {
        assert_eq!(
            ConcatFunc
                .invoke(&[text("a"), Value::Null, text("b")])
                .unwrap(),
            text("ab")
        );
        assert_eq!(ConcatFunc.invoke(&[]).unwrap(), text(""));
    }

    #[test]
    fn test_lower_upper() {
        assert_eq!(LowerFunc.invoke(&[text("HeLLo")]).unwrap(), text("hello"));
        assert_eq!(UpperFunc.invoke(&[text("HeLLo")]).unwrap(), text("HELLO"));
        assert!(UpperFunc.invoke(&[Value::Null]).unwrap().is_null());
    }

    #[test]
    fn test_length_text_and_blob() {
        assert_eq!(
            LengthFunc.invoke(&[text("héllo")]).unwrap(),
            Value::Integer(5)
        );
        assert_eq!(
            LengthFunc.invoke(&[Value::Blob(vec![1, 2, 3])]).unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn test_substr_semantics() {
        let s = text("hello");
        let sub = |start: i64, len: Option<i64>| {
            let mut args = vec![s.clone(), Value::Integer(start)];
            if let Some(len) = len {
                args.push(Value::Integer(len));
            }
            SubstrFunc.invoke(&args).unwrap()
        };
        assert_eq!(sub(2, Some(3)), text("ell"));
        assert_eq!(sub(2, None), text("ello"));
        assert_eq!(sub(0, Some(2)), text("h"));
        assert_eq!(sub(-3, Some(2)), text("ll"));
        assert_eq!(sub(-7, Some(4)), text("he"));
        assert_eq!(sub(4, Some(-2)), text("el"));
        assert_eq!(sub(10, Some(2)), text(""));
    }

    #[test]
    fn test_hex() {
        assert_eq!(
            HexFunc.invoke(&[Value::Blob(vec![0xde, 0xad, 0x01])]).unwrap(),
            text("DEAD01")
        );
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(RoundFunc.invoke(&[Value::Float(2.5)]).unwrap(), Value::Float(3.0));
        assert_eq!(
            RoundFunc.invoke(&[Value::Float(-2.5)]).unwrap(),
            Value::Float(-3.0)
        );
    }

    #[test]
    fn test_undeclared_argument_type_is_internal_error() {
        let err = LowerFunc.invoke(&[Value::Integer(1)]).unwrap_err();
        assert!(matches!(err, FrankenError::Internal(ref msg) if msg.contains("lower()")));
    }
}
