//! Scoped registration views.
//!
//! [`Hook::with_options`](crate::hook::Hook::with_options) returns a view
//! that merges a fixed set of options underneath every registration made
//! through it. The view owns nothing but the fixed options; `intercept` and
//! `is_used` pass straight through to the underlying hook.

use std::sync::Arc;

use crate::compile::HookCompiler;
use crate::errors::HookError;
use crate::hook::Hook;
use crate::interceptor::TapInterceptor;
use crate::types::{IntoTapOptions, TapKind, TapOptions};

/// A registration view with fixed default options.
///
/// The caller's per-call options win on key collision; absent caller fields
/// inherit from the fixed options. Nested views compose their merges
/// left-to-right.
pub struct ScopedHook<'a, C: HookCompiler> {
    hook: &'a mut Hook<C>,
    fixed: TapOptions,
}

impl<'a, C: HookCompiler> ScopedHook<'a, C> {
    pub(crate) fn new(hook: &'a mut Hook<C>, fixed: TapOptions) -> Self {
        Self { hook, fixed }
    }

    /// The underlying hook's diagnostic name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.hook.name()
    }

    /// Whether the underlying hook has any tap or interceptor registered.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.hook.is_used()
    }

    /// Register a sync tap with the fixed options merged in.
    pub fn tap(
        &mut self,
        options: impl IntoTapOptions,
        callback: C::Callback,
    ) -> Result<(), HookError> {
        self.register(TapKind::Sync, options, callback)
    }

    /// Register an async tap with the fixed options merged in.
    pub fn tap_async(
        &mut self,
        options: impl IntoTapOptions,
        callback: C::Callback,
    ) -> Result<(), HookError> {
        self.register(TapKind::Async, options, callback)
    }

    /// Register a promise tap with the fixed options merged in.
    pub fn tap_promise(
        &mut self,
        options: impl IntoTapOptions,
        callback: C::Callback,
    ) -> Result<(), HookError> {
        self.register(TapKind::Promise, options, callback)
    }

    /// Attach an interceptor to the underlying hook, unmodified.
    pub fn intercept(&mut self, interceptor: Arc<dyn TapInterceptor<C::Callback>>) {
        self.hook.intercept(interceptor);
    }

    /// Narrow the view further; `options` overlays the current fixed set.
    #[must_use]
    pub fn with_options(self, options: TapOptions) -> ScopedHook<'a, C> {
        let fixed = options.merged_over(&self.fixed);
        ScopedHook {
            hook: self.hook,
            fixed,
        }
    }

    fn register(
        &mut self,
        kind: TapKind,
        options: impl IntoTapOptions,
        callback: C::Callback,
    ) -> Result<(), HookError> {
        let merged = options.into_tap_options()?.merged_over(&self.fixed);
        self.hook.register(kind, merged, callback)
    }
}
