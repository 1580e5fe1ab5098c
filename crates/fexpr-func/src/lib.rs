//! Scalar function surface and typed function catalog.
//!
//! This crate defines the open, user-implementable [`ScalarFunction`] trait,
//! the declared [`Signature`] that travels with every catalog entry, and a
//! small in-memory [`FunctionRegistry`] that resolves a function name plus
//! argument types to a [`ResolvedFunction`] ready to be bound into an
//! expression tree.
//!
//! Lookup is keyed by `(UPPERCASE name, argument types)`, so overloads such
//! as `abs(INTEGER)` and `abs(REAL)` coexist. Variadic functions are stored
//! under their element type and match any argument list whose members all
//! have that type.
#![allow(clippy::unnecessary_literal_bound)]

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fexpr_types::TypeId;
use tracing::debug;

pub mod builtins;
pub mod scalar;

pub use builtins::register_builtins;
pub use scalar::ScalarFunction;

/// Declared type contract of a scalar function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Declared argument types. For a variadic signature this holds exactly
    /// one entry: the type every argument must have.
    pub arg_types: Vec<TypeId>,
    /// Declared return type.
    pub return_type: TypeId,
    /// Whether the single entry of `arg_types` repeats for each argument.
    pub variadic: bool,
}

impl Signature {
    /// A fixed-arity signature.
    #[must_use]
    pub fn new(arg_types: Vec<TypeId>, return_type: TypeId) -> Self {
        Self {
            arg_types,
            return_type,
            variadic: false,
        }
    }

    /// A variadic signature: any number of arguments, all of `element`.
    #[must_use]
    pub fn variadic(element: TypeId, return_type: TypeId) -> Self {
        Self {
            arg_types: vec![element],
            return_type,
            variadic: true,
        }
    }

    /// Concrete argument types for a call with `arity` arguments.
    ///
    /// Returns `None` when a fixed signature is asked for a different arity,
    /// or when a variadic signature has no element type.
    #[must_use]
    pub fn expand(&self, arity: usize) -> Option<Vec<TypeId>> {
        if self.variadic {
            self.arg_types.first().map(|&element| vec![element; arity])
        } else if self.arg_types.len() == arity {
            Some(self.arg_types.clone())
        } else {
            None
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, ty) in self.arg_types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        if self.variadic {
            f.write_str(", ...")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

/// A function implementation together with the concrete types it was
/// resolved for. This is what a function-call expression binds to.
#[derive(Clone)]
pub struct ResolvedFunction {
    /// The implementation.
    pub function: Arc<dyn ScalarFunction>,
    /// Declared return type.
    pub return_type: TypeId,
    /// Declared argument types, one per argument.
    pub arg_types: Vec<TypeId>,
}

impl ResolvedFunction {
    #[must_use]
    pub fn new(
        function: Arc<dyn ScalarFunction>,
        return_type: TypeId,
        arg_types: Vec<TypeId>,
    ) -> Self {
        Self {
            function,
            return_type,
            arg_types,
        }
    }

    /// Name of the underlying implementation.
    #[must_use]
    pub fn name(&self) -> &str {
        self.function.name()
    }

    /// Whether both resolutions point at the same implementation object and
    /// declare the same types.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.function, &other.function)
            && self.return_type == other.return_type
            && self.arg_types == other.arg_types
    }
}

impl fmt::Debug for ResolvedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedFunction")
            .field("name", &self.function.name())
            .field("return_type", &self.return_type)
            .field("arg_types", &self.arg_types)
            .finish()
    }
}

/// Composite lookup key: `(UPPERCASE name, argument types)`.
///
/// Names are stored as uppercase ASCII for case-insensitive matching.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct FunctionKey {
    /// Function name, stored as uppercase ASCII.
    pub name: String,
    /// Declared argument types (the element type for variadic entries).
    pub arg_types: Vec<TypeId>,
}

impl FunctionKey {
    /// Create a new function key with the name canonicalized to uppercase.
    #[must_use]
    pub fn new(name: &str, arg_types: Vec<TypeId>) -> Self {
        Self {
            name: canonical_name(name),
            arg_types,
        }
    }
}

struct CatalogEntry {
    function: Arc<dyn ScalarFunction>,
    signature: Signature,
}

/// Registry of typed scalar functions.
///
/// Lookup strategy:
/// 1. Exact match on `(UPPERCASE_NAME, arg_types)`.
/// 2. Variadic fallback: an entry `(UPPERCASE_NAME, [T])` registered with a
///    variadic signature matches when every argument has type `T`. A
///    zero-argument call matches when the name has exactly one variadic
///    entry.
/// 3. `None` if neither found (caller raises "no such function").
#[derive(Default)]
pub struct FunctionRegistry {
    fixed: HashMap<FunctionKey, CatalogEntry>,
    variadic: HashMap<FunctionKey, CatalogEntry>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in functions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtins(&mut registry);
        registry
    }

    /// Register a scalar function under `signature`.
    ///
    /// Overwrites any existing function with the same name and argument
    /// types. Returns the previous function if one existed.
    pub fn register_scalar<F>(
        &mut self,
        function: F,
        signature: Signature,
    ) -> Option<Arc<dyn ScalarFunction>>
    where
        F: ScalarFunction + 'static,
    {
        self.register_shared(Arc::new(function), signature)
    }

    /// Register an already shared function object.
    pub fn register_shared(
        &mut self,
        function: Arc<dyn ScalarFunction>,
        signature: Signature,
    ) -> Option<Arc<dyn ScalarFunction>> {
        let key = FunctionKey::new(function.name(), signature.arg_types.clone());
        let table = if signature.variadic {
            &mut self.variadic
        } else {
            &mut self.fixed
        };
        table
            .insert(
                key,
                CatalogEntry {
                    function,
                    signature,
                },
            )
            .map(|previous| previous.function)
    }

    /// Resolve a scalar function for a call with the given argument types.
    #[must_use]
    pub fn find_scalar(&self, name: &str, arg_types: &[TypeId]) -> Option<ResolvedFunction> {
        let canon = canonical_name(name);
        let exact = FunctionKey {
            name: canon.clone(),
            arg_types: arg_types.to_vec(),
        };
        if let Some(entry) = self.fixed.get(&exact) {
            debug!(name = %canon, arity = arg_types.len(), hit = "exact", "registry lookup");
            return Some(entry.resolve(arg_types.len()));
        }

        let variadic = match arg_types.split_first() {
            Some((first, rest)) if rest.iter().all(|ty| ty == first) => self
                .variadic
                .get(&FunctionKey {
                    name: canon.clone(),
                    arg_types: vec![*first],
                }),
            Some(_) => None,
            None => {
                let mut candidates = self.variadic.iter().filter(|(k, _)| k.name == canon);
                match (candidates.next(), candidates.next()) {
                    (Some((_, entry)), None) => Some(entry),
                    _ => None,
                }
            }
        };
        let result = variadic.map(|entry| entry.resolve(arg_types.len()));
        debug!(
            name = %canon,
            arity = arg_types.len(),
            hit = if result.is_some() { "variadic" } else { "miss" },
            "registry lookup"
        );
        result
    }

    /// Whether the registry contains any scalar function with this name
    /// (any signature).
    #[must_use]
    pub fn contains_scalar(&self, name: &str) -> bool {
        let canon = canonical_name(name);
        self.fixed
            .keys()
            .chain(self.variadic.keys())
            .any(|k| k.name == canon)
    }

    /// All signatures registered under `name`, for diagnostics.
    #[must_use]
    pub fn signatures(&self, name: &str) -> Vec<Signature> {
        let canon = canonical_name(name);
        let mut out: Vec<Signature> = self
            .fixed
            .iter()
            .chain(self.variadic.iter())
            .filter(|(k, _)| k.name == canon)
            .map(|(_, entry)| entry.signature.clone())
            .collect();
        out.sort_by(|a, b| a.arg_types.cmp(&b.arg_types).then(a.variadic.cmp(&b.variadic)));
        out
    }

    /// Number of registered signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fixed.len() + self.variadic.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogEntry {
    fn resolve(&self, arity: usize) -> ResolvedFunction {
        let arg_types = self
            .signature
            .expand(arity)
            .unwrap_or_else(|| self.signature.arg_types.clone());
        ResolvedFunction::new(
            Arc::clone(&self.function),
            self.signature.return_type,
            arg_types,
        )
    }
}

fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use fexpr_error::Result;
    use fexpr_types::Value;

    use super::*;

    struct Double;

    impl ScalarFunction for Double {
        fn invoke(&self, args: &[Value]) -> Result<Value> {
            match &args[0] {
                Value::Integer(i) => Ok(Value::Integer(i * 2)),
                Value::Float(f) => Ok(Value::Float(f * 2.0)),
                other => Ok(other.clone()),
            }
        }

        fn name(&self) -> &str {
            "double"
        }
    }

    struct Join;

    impl ScalarFunction for Join {
        fn invoke(&self, args: &[Value]) -> Result<Value> {
            Ok(Value::Text(args.iter().map(Value::to_text).collect()))
        }

        fn name(&self) -> &str {
            "join"
        }
    }

    fn int_sig() -> Signature {
        Signature::new(vec![TypeId::Integer], TypeId::Integer)
    }

    #[test]
    fn test_registry_register_and_find() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.register_scalar(Double, int_sig()).is_none());
        assert!(registry.contains_scalar("double"));
        assert!(registry.contains_scalar("DOUBLE"));

        let f = registry
            .find_scalar(" Double ", &[TypeId::Integer])
            .expect("double registered");
        assert_eq!(f.return_type, TypeId::Integer);
        assert_eq!(f.arg_types, vec![TypeId::Integer]);
        assert_eq!(
            f.function.invoke(&[Value::Integer(21)]).unwrap(),
            Value::Integer(42)
        );
    }

    #[test]
    fn test_registry_overloads_by_type() {
        let mut registry = FunctionRegistry::new();
        registry.register_scalar(Double, int_sig());
        registry.register_scalar(Double, Signature::new(vec![TypeId::Real], TypeId::Real));
        assert_eq!(registry.len(), 2);

        let int = registry.find_scalar("double", &[TypeId::Integer]).unwrap();
        let real = registry.find_scalar("double", &[TypeId::Real]).unwrap();
        assert_eq!(int.return_type, TypeId::Integer);
        assert_eq!(real.return_type, TypeId::Real);
        assert!(registry.find_scalar("double", &[TypeId::Text]).is_none());
    }

    #[test]
    fn test_registry_overwrite() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.register_scalar(Double, int_sig()).is_none());
        assert!(registry.register_scalar(Double, int_sig()).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_variadic_fallback() {
        let mut registry = FunctionRegistry::new();
        registry.register_scalar(Join, Signature::variadic(TypeId::Text, TypeId::Text));

        let f = registry
            .find_scalar("join", &[TypeId::Text, TypeId::Text, TypeId::Text])
            .expect("variadic fallback");
        assert_eq!(f.arg_types, vec![TypeId::Text; 3]);
        assert_eq!(
            f.function
                .invoke(&[Value::from("a"), Value::from("b"), Value::from("c")])
                .unwrap(),
            Value::from("abc")
        );

        // Mixed element types never match a single-type variadic.
        assert!(
            registry
                .find_scalar("join", &[TypeId::Text, TypeId::Integer])
                .is_none()
        );
    }

    #[test]
    fn test_registry_variadic_zero_args() {
        let mut registry = FunctionRegistry::new();
        registry.register_scalar(Join, Signature::variadic(TypeId::Text, TypeId::Text));
        let f = registry.find_scalar("join", &[]).expect("sole variadic entry");
        assert!(f.arg_types.is_empty());

        // Ambiguous once a second element type is registered.
        registry.register_scalar(Join, Signature::variadic(TypeId::Blob, TypeId::Text));
        assert!(registry.find_scalar("join", &[]).is_none());
    }

    #[test]
    fn test_registry_exact_match_over_variadic() {
        let mut registry = FunctionRegistry::new();
        registry.register_scalar(Join, Signature::variadic(TypeId::Text, TypeId::Text));
        registry.register_scalar(Join, Signature::new(vec![TypeId::Text], TypeId::Integer));

        let f = registry.find_scalar("join", &[TypeId::Text]).unwrap();
        assert_eq!(f.return_type, TypeId::Integer, "exact entry wins");
        let f = registry
            .find_scalar("join", &[TypeId::Text, TypeId::Text])
            .unwrap();
        assert_eq!(f.return_type, TypeId::Text);
    }

    #[test]
    fn test_registry_not_found_returns_none() {
        let registry = FunctionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.find_scalar("nonexistent", &[TypeId::Integer]).is_none());
        assert!(!registry.contains_scalar("nonexistent"));
    }

    #[test]
    fn test_signatures_listing() {
        let mut registry = FunctionRegistry::new();
        registry.register_scalar(Double, Signature::new(vec![TypeId::Real], TypeId::Real));
        registry.register_scalar(Double, int_sig());
        let sigs = registry.signatures("DOUBLE");
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].to_string(), "(INTEGER) -> INTEGER");
        assert_eq!(sigs[1].to_string(), "(REAL) -> REAL");
    }

    #[test]
    fn test_signature_expand() {
        assert_eq!(int_sig().expand(1), Some(vec![TypeId::Integer]));
        assert_eq!(int_sig().expand(2), None);
        let v = Signature::variadic(TypeId::Blob, TypeId::Text);
        assert_eq!(v.expand(0), Some(vec![]));
        assert_eq!(v.expand(2), Some(vec![TypeId::Blob, TypeId::Blob]));
        assert_eq!(v.to_string(), "(BLOB, ...) -> TEXT");
    }

    #[test]
    fn test_signature_expand_variadic_without_element() {
        let malformed = Signature {
            arg_types: vec![],
            return_type: TypeId::Text,
            variadic: true,
        };
        assert_eq!(malformed.expand(0), None);
        assert_eq!(malformed.expand(3), None);

        let mut registry = FunctionRegistry::new();
        registry.register_scalar(Join, malformed);
        let resolved = registry.find_scalar("join", &[]).unwrap();
        assert!(resolved.arg_types.is_empty());
        assert!(registry.find_scalar("join", &[TypeId::Text]).is_none());
    }

    #[test]
    fn test_resolved_function_identity() {
        let f: Arc<dyn ScalarFunction> = Arc::new(Double);
        let a = ResolvedFunction::new(Arc::clone(&f), TypeId::Integer, vec![TypeId::Integer]);
        let b = a.clone();
        assert!(a.same_as(&b));
        assert_eq!(a.name(), "double");

        let other = ResolvedFunction::new(Arc::new(Double), TypeId::Integer, vec![TypeId::Integer]);
        assert!(!a.same_as(&other));
        assert!(format!("{a:?}").contains("double"));
    }

    #[test]
    fn test_function_key_equality() {
        let k1 = FunctionKey::new("ABS", vec![TypeId::Integer]);
        let k2 = FunctionKey::new("abs", vec![TypeId::Integer]);
        let k3 = FunctionKey::new("ABS", vec![TypeId::Real]);
        assert_eq!(k1, k2, "case-insensitive equality");
        assert_ne!(k1, k3, "different argument types");
    }
}
