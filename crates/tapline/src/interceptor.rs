//! Tap interceptors.
//!
//! An interceptor observes a hook's lifecycle and may rewrite tap records.
//! The registry itself only ever invokes [`register`](TapInterceptor::register):
//! once for every tap already present when the interceptor is attached, and
//! once for every tap registered afterwards. The remaining methods are
//! observer slots carried through [`CompileContext`](crate::compile::CompileContext)
//! untouched — a hook flavor's compiled callable may wire them into its
//! dispatch sequence, the core never calls them.

use std::sync::Arc;

use crate::types::Tap;

/// Observer capable of rewriting tap metadata at registration time.
///
/// All methods have no-op defaults; implement only the slots the
/// interceptor cares about. Attached interceptors are never removed.
pub trait TapInterceptor<F>: Send + Sync {
    /// Rewrite a tap record.
    ///
    /// Return `Some(replacement)` to substitute the record being processed,
    /// or `None` to leave it unchanged.
    fn register(&self, _tap: &Tap<F>) -> Option<Tap<F>> {
        None
    }

    /// Observe a tap just before the compiled callable runs it.
    ///
    /// Invoked by compiled callables that choose to honor it, never by the
    /// registry.
    fn on_tap(&self, _tap: &Tap<F>) {}

    /// Observe the start of a hook invocation.
    ///
    /// Invoked by compiled callables that choose to honor it, never by the
    /// registry.
    fn on_call(&self) {}
}

/// Fold a tap record through every interceptor's `register` slot in
/// attachment order, carrying forward the replacement whenever one is
/// returned.
pub(crate) fn run_register_chain<F>(
    interceptors: &[Arc<dyn TapInterceptor<F>>],
    mut tap: Tap<F>,
) -> Tap<F> {
    for interceptor in interceptors {
        if let Some(replacement) = interceptor.register(&tap) {
            tap = replacement;
        }
    }
    tap
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;
    use crate::types::TapKind;

    struct StageShift {
        delta: i32,
    }

    impl TapInterceptor<()> for StageShift {
        fn register(&self, tap: &Tap<()>) -> Option<Tap<()>> {
            let mut replacement = tap.clone();
            replacement.stage += self.delta;
            Some(replacement)
        }
    }

    struct PassThrough;

    impl TapInterceptor<()> for PassThrough {}

    fn tap(name: &str, stage: i32) -> Tap<()> {
        Tap {
            name: name.to_string(),
            kind: TapKind::Sync,
            callback: (),
            before: Vec::new(),
            stage,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_chain_applies_interceptors_in_attachment_order() {
        let interceptors: Vec<Arc<dyn TapInterceptor<()>>> = vec![
            Arc::new(StageShift { delta: 1 }),
            Arc::new(StageShift { delta: 10 }),
        ];
        let result = run_register_chain(&interceptors, tap("emit", 0));
        assert_eq!(result.stage, 11);
    }

    #[test]
    fn test_chain_keeps_record_when_register_returns_none() {
        let interceptors: Vec<Arc<dyn TapInterceptor<()>>> = vec![
            Arc::new(PassThrough),
            Arc::new(StageShift { delta: 5 }),
            Arc::new(PassThrough),
        ];
        let result = run_register_chain(&interceptors, tap("emit", 2));
        assert_eq!(result.stage, 7);
        assert_eq!(result.name, "emit");
    }

    #[test]
    fn test_empty_chain_returns_record_unchanged() {
        let interceptors: Vec<Arc<dyn TapInterceptor<()>>> = Vec::new();
        let result = run_register_chain(&interceptors, tap("emit", 3));
        assert_eq!(result.stage, 3);
    }
}
