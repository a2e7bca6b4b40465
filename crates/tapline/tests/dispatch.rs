//! End-to-end dispatch through a small waterfall flavor.
//!
//! Exercises registration, ordering constraints, interceptor observation,
//! and all three calling conventions against one hook.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tapline::compile::{
    AsyncCallable, CompileContext, Done, HookCompiler, PromiseCallable, SyncCallable,
};
use tapline::errors::HookError;
use tapline::hook::Hook;
use tapline::interceptor::TapInterceptor;
use tapline::types::{Tap, TapOptions};

type Callback = Arc<dyn Fn(i32) -> i32 + Send + Sync>;

/// Waterfall flavor: each tap receives the previous tap's result. The
/// compiled callables honor the interceptor observer slots.
struct Waterfall;

fn run_taps(
    taps: &[Tap<Callback>],
    interceptors: &[Arc<dyn TapInterceptor<Callback>>],
    input: i32,
) -> i32 {
    for interceptor in interceptors {
        interceptor.on_call();
    }
    let mut acc = input;
    for tap in taps {
        for interceptor in interceptors {
            interceptor.on_tap(tap);
        }
        acc = (tap.callback)(acc);
    }
    acc
}

impl HookCompiler for Waterfall {
    type Callback = Callback;
    type Input = i32;
    type Output = i32;

    fn compile_sync(
        &self,
        context: CompileContext<Callback>,
    ) -> Result<SyncCallable<i32, i32>, HookError> {
        let CompileContext {
            taps, interceptors, ..
        } = context;
        Ok(Arc::new(move |input| run_taps(&taps, &interceptors, input)))
    }

    fn compile_async(
        &self,
        context: CompileContext<Callback>,
    ) -> Result<AsyncCallable<i32, i32>, HookError> {
        let CompileContext {
            taps, interceptors, ..
        } = context;
        Ok(Arc::new(move |input, done: Done<i32>| {
            done(run_taps(&taps, &interceptors, input));
        }))
    }

    fn compile_promise(
        &self,
        context: CompileContext<Callback>,
    ) -> Result<PromiseCallable<i32, i32>, HookError> {
        let CompileContext {
            taps, interceptors, ..
        } = context;
        let taps = Arc::new(taps);
        let interceptors = Arc::new(interceptors);
        Ok(Arc::new(move |input| {
            let taps = Arc::clone(&taps);
            let interceptors = Arc::clone(&interceptors);
            Box::pin(async move { run_taps(&taps, &interceptors, input) })
        }))
    }
}

/// Records every dispatch observed through the interceptor slots and marks
/// each registered tap record as it passes the register chain.
#[derive(Default)]
struct Recorder {
    calls: AtomicUsize,
    taps_seen: Mutex<Vec<String>>,
}

impl TapInterceptor<Callback> for Recorder {
    fn register(&self, tap: &Tap<Callback>) -> Option<Tap<Callback>> {
        let mut replacement = tap.clone();
        let _ = replacement
            .extra
            .insert("observed".to_string(), json!(true));
        Some(replacement)
    }

    fn on_tap(&self, tap: &Tap<Callback>) {
        self.taps_seen.lock().unwrap().push(tap.name.clone());
    }

    fn on_call(&self) {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn build_hook() -> Hook<Waterfall> {
    Hook::new(Waterfall, ["value"]).with_name("resolve")
}

#[test]
fn sync_dispatch_honors_ordering_constraints() {
    let mut hook = build_hook();
    hook.tap("add-one", Arc::new(|value| value + 1)).unwrap();
    hook.tap(
        TapOptions::named("double").before("add-one"),
        Arc::new(|value| value * 2),
    )
    .unwrap();
    hook.tap(
        TapOptions::named("floor").stage(-10),
        Arc::new(|value| value.max(0)),
    )
    .unwrap();

    assert_eq!(
        hook.tap_names().collect::<Vec<_>>(),
        ["floor", "double", "add-one"]
    );
    // max(-3, 0) = 0, * 2 = 0, + 1 = 1
    assert_eq!(hook.call(-3).unwrap(), 1);
    // max(5, 0) = 5, * 2 = 10, + 1 = 11
    assert_eq!(hook.call(5).unwrap(), 11);
}

#[test]
fn async_dispatch_signals_completion_through_done() {
    let mut hook = build_hook();
    hook.tap_async("add-one", Arc::new(|value| value + 1))
        .unwrap();
    hook.tap_async("double", Arc::new(|value| value * 2))
        .unwrap();

    let result = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&result);
    hook.call_async(3, Box::new(move |value| *slot.lock().unwrap() = Some(value)))
        .unwrap();
    assert_eq!(*result.lock().unwrap(), Some(8));
}

#[tokio::test]
async fn promise_dispatch_resolves_to_folded_value() {
    let mut hook = build_hook();
    hook.tap_promise("add-one", Arc::new(|value| value + 1))
        .unwrap();
    let future = hook.promise(41).unwrap();
    assert_eq!(future.await, 42);
}

#[test]
fn interceptor_observes_registration_and_dispatch() {
    let recorder = Arc::new(Recorder::default());
    let mut hook = build_hook();
    hook.tap("early", Arc::new(|value| value + 1)).unwrap();
    hook.intercept(Arc::clone(&recorder) as Arc<dyn TapInterceptor<Callback>>);
    hook.tap("late", Arc::new(|value| value * 2)).unwrap();

    // Both the retroactively rewritten tap and the new one carry the marker.
    for tap in hook.taps() {
        assert_eq!(tap.extra.get("observed"), Some(&json!(true)));
    }

    assert_eq!(hook.call(1).unwrap(), 4);
    assert_eq!(hook.call(2).unwrap(), 6);
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        *recorder.taps_seen.lock().unwrap(),
        ["early", "late", "early", "late"]
    );
}

#[test]
fn mutation_after_invocation_recompiles_with_new_taps() {
    let mut hook = build_hook();
    hook.tap("add-one", Arc::new(|value| value + 1)).unwrap();
    assert_eq!(hook.call(1).unwrap(), 2);

    hook.tap(
        TapOptions::named("triple").before("add-one"),
        Arc::new(|value| value * 3),
    )
    .unwrap();
    assert_eq!(hook.call(1).unwrap(), 4);
}

#[test]
fn scoped_view_tags_plugin_registrations() {
    let mut hook = build_hook();
    let mut view = hook.with_options(
        TapOptions::default()
            .stage(10)
            .extra("plugin", json!("markup")),
    );
    view.tap("render", Arc::new(|value| value + 1)).unwrap();
    view.tap(
        TapOptions::named("prepare").stage(-1),
        Arc::new(|value| value * 2),
    )
    .unwrap();

    assert_eq!(hook.tap_names().collect::<Vec<_>>(), ["prepare", "render"]);
    assert_eq!(hook.taps()[0].stage, -1);
    assert_eq!(hook.taps()[1].stage, 10);
    for tap in hook.taps() {
        assert_eq!(tap.extra.get("plugin"), Some(&json!("markup")));
    }
}
