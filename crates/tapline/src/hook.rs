//! The hook: an extension point owning an ordered tap sequence.
//!
//! A [`Hook`] pairs a tap registry with an injected [`HookCompiler`] and
//! dispatches through one of three calling conventions. Compilation is
//! lazy and memoized per convention: the first `call` / `call_async` /
//! `promise` after construction (or after any registration or interception)
//! asks the compiler for a fresh callable and caches it; until the next
//! mutation, invocations go straight to the cached callable.
//!
//! Registration and invocation may interleave: a callable obtained before a
//! mutation keeps dispatching its own snapshot of the tap list, while the
//! next entry-point call recompiles against the updated registry.

use std::fmt;
use std::sync::{Arc, Once};

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::compile::{
    AsyncCallable, CompileContext, Done, HookCompiler, PromiseCallable, SyncCallable,
};
use crate::errors::HookError;
use crate::interceptor::{self, TapInterceptor};
use crate::order;
use crate::scoped::ScopedHook;
use crate::types::{IntoTapOptions, Tap, TapKind, TapOptions};

static LEGACY_CONTEXT_WARNING: Once = Once::new();

/// Warn about the legacy `context` tap option, at most once per process.
fn warn_legacy_context() {
    LEGACY_CONTEXT_WARNING.call_once(|| {
        warn!("tap option 'context' is deprecated and will be removed");
    });
}

/// An extension point: ordered taps, interceptors, and lazily-compiled
/// dispatch through an injected [`HookCompiler`].
pub struct Hook<C: HookCompiler> {
    compiler: C,
    name: Option<String>,
    args: Vec<String>,
    taps: Vec<Tap<C::Callback>>,
    interceptors: Vec<Arc<dyn TapInterceptor<C::Callback>>>,
    compiled_sync: Option<SyncCallable<C::Input, C::Output>>,
    compiled_async: Option<AsyncCallable<C::Input, C::Output>>,
    compiled_promise: Option<PromiseCallable<C::Input, C::Output>>,
}

impl<C: HookCompiler> Hook<C> {
    /// Create a hook with the given compiler and formal parameter names.
    pub fn new<I, S>(compiler: C, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            compiler,
            name: None,
            args: args.into_iter().map(Into::into).collect(),
            taps: Vec::new(),
            interceptors: Vec::new(),
            compiled_sync: None,
            compiled_async: None,
            compiled_promise: None,
        }
    }

    /// Name the hook for diagnostics.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The hook's diagnostic name, if one was set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Formal parameter names declared at construction.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The ordered tap records.
    #[must_use]
    pub fn taps(&self) -> &[Tap<C::Callback>] {
        &self.taps
    }

    /// Names of the registered taps, in dispatch order.
    pub fn tap_names(&self) -> impl Iterator<Item = &str> {
        self.taps.iter().map(|tap| tap.name.as_str())
    }

    /// Number of registered taps.
    #[must_use]
    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    /// Whether at least one tap or interceptor is registered.
    #[must_use]
    pub fn is_used(&self) -> bool {
        !self.taps.is_empty() || !self.interceptors.is_empty()
    }

    /// Register a callback under the plain synchronous convention.
    pub fn tap(
        &mut self,
        options: impl IntoTapOptions,
        callback: C::Callback,
    ) -> Result<(), HookError> {
        self.register(TapKind::Sync, options, callback)
    }

    /// Register a callback under the callback-style asynchronous convention.
    pub fn tap_async(
        &mut self,
        options: impl IntoTapOptions,
        callback: C::Callback,
    ) -> Result<(), HookError> {
        self.register(TapKind::Async, options, callback)
    }

    /// Register a callback under the future-based convention.
    pub fn tap_promise(
        &mut self,
        options: impl IntoTapOptions,
        callback: C::Callback,
    ) -> Result<(), HookError> {
        self.register(TapKind::Promise, options, callback)
    }

    pub(crate) fn register(
        &mut self,
        kind: TapKind,
        options: impl IntoTapOptions,
        callback: C::Callback,
    ) -> Result<(), HookError> {
        let options = options.into_tap_options()?;
        let Some(name) = options.name.filter(|name| !name.is_empty()) else {
            return Err(HookError::missing_name(self.name.as_deref()));
        };
        if options.legacy_context {
            warn_legacy_context();
        }
        let tap = Tap {
            name,
            kind,
            callback,
            before: options.before,
            stage: options.stage.unwrap_or(0),
            extra: options.extra,
        };
        let tap = interceptor::run_register_chain(&self.interceptors, tap);
        debug!(
            hook = self.debug_name(),
            tap = %tap.name,
            kind = %tap.kind,
            stage = tap.stage,
            "Registering tap"
        );
        self.reset_compilation();
        order::insert(&mut self.taps, tap);
        Ok(())
    }

    /// Attach an interceptor.
    ///
    /// Invalidates the compiled callables, appends the interceptor, and
    /// rewrites every already-registered tap through its `register` slot
    /// (records are left unchanged when `register` returns `None`).
    pub fn intercept(&mut self, interceptor: Arc<dyn TapInterceptor<C::Callback>>) {
        debug!(hook = self.debug_name(), "Attaching interceptor");
        self.reset_compilation();
        self.interceptors.push(Arc::clone(&interceptor));
        for tap in &mut self.taps {
            if let Some(replacement) = interceptor.register(tap) {
                *tap = replacement;
            }
        }
    }

    /// A view that merges `fixed` underneath the options of every
    /// registration made through it.
    pub fn with_options(&mut self, fixed: TapOptions) -> ScopedHook<'_, C> {
        ScopedHook::new(self, fixed)
    }

    /// Invoke the hook synchronously.
    ///
    /// Compiles and caches the sync callable on first use.
    pub fn call(&mut self, input: C::Input) -> Result<C::Output, HookError> {
        let compiled = self.compiled_sync()?;
        Ok(compiled(input))
    }

    /// Invoke the hook in the callback-style asynchronous convention.
    ///
    /// `done` is handed to the compiled callable, which signals completion
    /// through it. Compiles and caches the async callable on first use.
    pub fn call_async(&mut self, input: C::Input, done: Done<C::Output>) -> Result<(), HookError> {
        let compiled = self.compiled_async()?;
        compiled(input, done);
        Ok(())
    }

    /// Invoke the hook in the future-based convention.
    ///
    /// Compiles and caches the promise callable on first use. The returned
    /// future is produced by the compiled callable; the hook itself never
    /// awaits.
    pub fn promise(&mut self, input: C::Input) -> Result<BoxFuture<'static, C::Output>, HookError> {
        let compiled = self.compiled_promise()?;
        Ok(compiled(input))
    }

    /// The memoized sync callable, compiling it if the cache is empty.
    ///
    /// The returned handle is a snapshot: it keeps dispatching the tap list
    /// it was compiled from even if the registry mutates afterwards.
    pub fn compiled_sync(&mut self) -> Result<SyncCallable<C::Input, C::Output>, HookError> {
        if let Some(compiled) = &self.compiled_sync {
            return Ok(Arc::clone(compiled));
        }
        self.trace_compile(TapKind::Sync);
        let compiled = self.compiler.compile_sync(self.snapshot(TapKind::Sync))?;
        self.compiled_sync = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    /// The memoized async callable, compiling it if the cache is empty.
    pub fn compiled_async(&mut self) -> Result<AsyncCallable<C::Input, C::Output>, HookError> {
        if let Some(compiled) = &self.compiled_async {
            return Ok(Arc::clone(compiled));
        }
        self.trace_compile(TapKind::Async);
        let compiled = self.compiler.compile_async(self.snapshot(TapKind::Async))?;
        self.compiled_async = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    /// The memoized promise callable, compiling it if the cache is empty.
    pub fn compiled_promise(&mut self) -> Result<PromiseCallable<C::Input, C::Output>, HookError> {
        if let Some(compiled) = &self.compiled_promise {
            return Ok(Arc::clone(compiled));
        }
        self.trace_compile(TapKind::Promise);
        let compiled = self
            .compiler
            .compile_promise(self.snapshot(TapKind::Promise))?;
        self.compiled_promise = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    fn snapshot(&self, kind: TapKind) -> CompileContext<C::Callback> {
        CompileContext {
            hook_name: self.name.clone(),
            args: self.args.clone(),
            taps: self.taps.clone(),
            interceptors: self.interceptors.clone(),
            kind,
        }
    }

    fn reset_compilation(&mut self) {
        self.compiled_sync = None;
        self.compiled_async = None;
        self.compiled_promise = None;
    }

    fn trace_compile(&self, kind: TapKind) {
        debug!(
            hook = self.debug_name(),
            kind = %kind,
            taps = self.taps.len(),
            "Compiling hook"
        );
    }

    fn debug_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

impl<C: HookCompiler> fmt::Debug for Hook<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("taps", &self.taps.len())
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}
