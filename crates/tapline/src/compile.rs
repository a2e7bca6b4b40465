//! The compilation capability a hook flavor must supply.
//!
//! The registry never calls a tap callback itself. Turning the ordered tap
//! list into something executable is the job of a [`HookCompiler`]: it
//! receives an owned [`CompileContext`] snapshot and returns a callable for
//! one calling convention. Each convention has its own compile method with a
//! default body that fails with [`HookError::AbstractCompile`], so a flavor
//! implements exactly the conventions it supports and every other entry
//! point reports the unimplemented convention instead of misbehaving.
//!
//! Because the context is an owned snapshot, a compiled callable can capture
//! it and keep running unaffected while taps registered later invalidate the
//! hook's caches for the *next* invocation.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::errors::HookError;
use crate::interceptor::TapInterceptor;
use crate::types::{Tap, TapKind};

/// Compiled callable for the plain synchronous convention.
pub type SyncCallable<I, O> = Arc<dyn Fn(I) -> O + Send + Sync>;

/// Completion callback handed to an async-convention callable.
pub type Done<O> = Box<dyn FnOnce(O) + Send>;

/// Compiled callable for the callback-style asynchronous convention.
pub type AsyncCallable<I, O> = Arc<dyn Fn(I, Done<O>) + Send + Sync>;

/// Compiled callable for the future-based convention.
pub type PromiseCallable<I, O> = Arc<dyn Fn(I) -> BoxFuture<'static, O> + Send + Sync>;

/// Owned snapshot of a hook's registration state, handed to the compiler.
///
/// Cloned out of the hook at compile time so the returned callable can own
/// its view of the tap list; registrations made while an invocation is in
/// flight never alias into it.
pub struct CompileContext<F> {
    /// Name of the hook being compiled, when it has one.
    pub hook_name: Option<String>,
    /// Formal parameter names declared at hook construction.
    pub args: Vec<String>,
    /// The ordered tap records, constraints already resolved.
    pub taps: Vec<Tap<F>>,
    /// Attached interceptors, in attachment order.
    pub interceptors: Vec<Arc<dyn TapInterceptor<F>>>,
    /// Calling convention being compiled for.
    pub kind: TapKind,
}

impl<F> fmt::Debug for CompileContext<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileContext")
            .field("hook_name", &self.hook_name)
            .field("args", &self.args)
            .field("taps", &self.taps.len())
            .field("interceptors", &self.interceptors.len())
            .field("kind", &self.kind)
            .finish()
    }
}

/// The injected compilation strategy.
///
/// A hook is generic over its compiler; the compiler decides the callback
/// type stored in tap records, the invocation input, and the completion
/// value. Implement the `compile_*` method for each calling convention the
/// flavor supports — the defaults fail with
/// [`HookError::AbstractCompile`].
pub trait HookCompiler {
    /// Callback type stored in tap records. Cloned when snapshots are taken.
    type Callback: Clone;
    /// Invocation input forwarded verbatim to the compiled callable.
    type Input;
    /// Completion value produced under every convention.
    type Output;

    /// Compile the plain synchronous calling convention.
    fn compile_sync(
        &self,
        context: CompileContext<Self::Callback>,
    ) -> Result<SyncCallable<Self::Input, Self::Output>, HookError> {
        Err(HookError::abstract_compile(
            context.hook_name.as_deref(),
            TapKind::Sync,
        ))
    }

    /// Compile the callback-style asynchronous calling convention.
    fn compile_async(
        &self,
        context: CompileContext<Self::Callback>,
    ) -> Result<AsyncCallable<Self::Input, Self::Output>, HookError> {
        Err(HookError::abstract_compile(
            context.hook_name.as_deref(),
            TapKind::Async,
        ))
    }

    /// Compile the future-based calling convention.
    fn compile_promise(
        &self,
        context: CompileContext<Self::Callback>,
    ) -> Result<PromiseCallable<Self::Input, Self::Output>, HookError> {
        Err(HookError::abstract_compile(
            context.hook_name.as_deref(),
            TapKind::Promise,
        ))
    }
}
