//! # tapline
//!
//! An extensible callback-dispatch primitive. Independent components
//! register ordered, named callbacks ("taps") against an extension point
//! (a [`Hook`](hook::Hook)), and other components invoke all registered
//! taps through one of three calling conventions — plain synchronous,
//! callback-style asynchronous, or future-based — without the hook knowing
//! in advance how many taps exist or what they do.
//!
//! ## Division of Labor
//!
//! The hook owns the tap registry, the ordering rules (`stage` priorities
//! and `before` constraints), the interceptor pipeline, and a lazily-filled
//! cache of compiled callables — one per calling convention. What it does
//! *not* do is run taps: turning the tap list into an executable callable is
//! delegated to an injected [`HookCompiler`](compile::HookCompiler), the
//! single capability a concrete hook flavor must supply.
//!
//! ## Laziness
//!
//! Each calling convention compiles on first invocation and is cached until
//! the tap list or interceptor list changes. Compiled callables capture an
//! owned snapshot of the registry, so registrations made while a call is in
//! flight take effect on the next invocation, never the current one.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tapline::compile::{CompileContext, HookCompiler, SyncCallable};
//! use tapline::errors::HookError;
//! use tapline::hook::Hook;
//!
//! /// Waterfall flavor: each tap receives the previous tap's result.
//! struct Waterfall;
//!
//! impl HookCompiler for Waterfall {
//!     type Callback = Arc<dyn Fn(i32) -> i32 + Send + Sync>;
//!     type Input = i32;
//!     type Output = i32;
//!
//!     fn compile_sync(
//!         &self,
//!         context: CompileContext<Self::Callback>,
//!     ) -> Result<SyncCallable<Self::Input, Self::Output>, HookError> {
//!         let taps = context.taps;
//!         Ok(Arc::new(move |input| {
//!             taps.iter().fold(input, |acc, tap| (tap.callback)(acc))
//!         }))
//!     }
//! }
//!
//! let mut hook = Hook::new(Waterfall, ["value"]).with_name("resolve");
//! hook.tap("double", Arc::new(|value| value * 2))?;
//! hook.tap("increment", Arc::new(|value| value + 1))?;
//!
//! assert_eq!(hook.call(10)?, 21);
//! # Ok::<(), HookError>(())
//! ```

#![deny(unsafe_code)]

pub mod compile;
pub mod errors;
pub mod hook;
pub mod interceptor;
mod order;
pub mod scoped;
pub mod types;
