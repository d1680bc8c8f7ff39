//! Deduplicated warnings.
//!
//! A query that runs inside a loop would otherwise report the same problem
//! once per iteration. Each unique `[component] message` pair is emitted a
//! single time through `tracing` until [`clear_warnings`] is called.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted.
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about degraded behavior (emits once per unique message).
///
/// Returns `true` if this call emitted the warning.
///
/// # Example
/// ```
/// use quarry_common::warning::warn_once;
///
/// let _ = warn_once("selector", "':hover' never matches in a static document");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first_time {
        tracing::warn!(component, "{message}");
    }
    first_time
}

/// Forget all recorded warnings (call when starting on a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warns_once_per_message() {
        let message = "unit-test: duplicate suppression";
        let first = warn_once("test", message);
        let second = warn_once("test", message);
        assert!(first || !second, "a repeated warning must not be emitted twice");
        assert!(!second);
    }

    #[test]
    fn test_components_are_distinct() {
        let message = "unit-test: same text, different component";
        let _ = warn_once("alpha", message);
        assert!(warn_once("beta", message));
    }
}
