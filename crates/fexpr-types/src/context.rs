//! Execution context (`ExecContext`) threaded through expression evaluation.
//!
//! Expression nodes never interpret the context; they hand the same reference
//! to every child. It exists so engine-level state (query identity, session
//! settings, cancellation) can reach leaf nodes and user functions without
//! widening every evaluation signature.
//!
//! Cancellation is cooperative and owned by the caller: evaluation itself
//! never polls the flag. An executor driving many rows checks
//! [`ExecContext::is_cancel_requested`] between calls.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Value;

#[derive(Debug, Default)]
struct ContextInner {
    query_id: u64,
    settings: BTreeMap<String, Value>,
    cancel_requested: AtomicBool,
}

/// Shared, cheaply cloneable execution context.
///
/// Clones share the same settings and cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct ExecContext {
    inner: Arc<ContextInner>,
}

impl ExecContext {
    #[must_use]
    pub fn new(query_id: u64) -> Self {
        Self::with_settings(query_id, BTreeMap::new())
    }

    /// Create a context carrying session settings (e.g. `timezone`).
    #[must_use]
    pub fn with_settings(query_id: u64, settings: BTreeMap<String, Value>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                query_id,
                settings,
                cancel_requested: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn query_id(&self) -> u64 {
        self.inner.query_id
    }

    /// Look up a session setting by name.
    #[must_use]
    pub fn setting(&self, name: &str) -> Option<&Value> {
        self.inner.settings.get(name)
    }

    /// Request cancellation of the query owning this context.
    pub fn cancel(&self) {
        self.inner.cancel_requested.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel_requested.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_lookup() {
        let mut settings = BTreeMap::new();
        settings.insert("timezone".to_owned(), Value::from("UTC"));
        let cx = ExecContext::with_settings(9, settings);
        assert_eq!(cx.query_id(), 9);
        assert_eq!(cx.setting("timezone"), Some(&Value::Text("UTC".to_owned())));
        assert!(cx.setting("missing").is_none());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let cx = ExecContext::new(1);
        let clone = cx.clone();
        assert!(!clone.is_cancel_requested());
        cx.cancel();
        assert!(clone.is_cancel_requested());
    }

    #[test]
    fn context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExecContext>();
    }
}
