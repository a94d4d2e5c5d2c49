//! Nested, re-entrant and concurrent chain invocations

use assert_matches::assert_matches;
use aura_invocation::prelude::*;
use aura_invocation::{ChainDescriptor, FailureClass, LinkDescriptor, PassThroughInterceptor};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("aura_invocation=trace")
        .with_test_writer()
        .try_init();
}

fn tagging(tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Interceptor> {
    let log = log.clone();
    Arc::new(interceptor_fn(tag, move |ctx| {
        log.lock().push(tag.to_string());
        ctx.proceed()
    }))
}

fn sum_context(values: Vec<Value>) -> BasicInvocationContext<'static> {
    BasicInvocationContext::new(MethodDescriptor::new("Calc", "sum"), values, |params| {
        Ok(json!(params.iter().filter_map(Value::as_i64).sum::<i64>()))
    })
}

#[test]
fn nested_chain_behaves_like_a_single_link() {
    init_tracing();
    let log = Arc::new(Mutex::new(Vec::new()));
    let inner = InterceptorChain::builder()
        .with_interceptors(vec![tagging("inner-a", &log), tagging("inner-b", &log)])
        .with_config(ChainConfig {
            label: Some("inner".into()),
            trace_links: true,
        })
        .build()
        .unwrap();
    let outer = InterceptorChain::new(vec![
        tagging("outer-a", &log),
        Arc::new(inner) as Arc<dyn Interceptor>,
        tagging("outer-b", &log),
    ]);

    let result = outer.intercept(&mut sum_context(vec![json!(2), json!(3)])).unwrap();

    assert_eq!(result, json!(5));
    assert_eq!(
        *log.lock(),
        vec!["outer-a", "inner-a", "inner-b", "outer-b"]
    );
    assert_matches!(
        outer.descriptor().links[1],
        LinkDescriptor::Chain(ChainDescriptor { ref label, .. }) if label.as_deref() == Some("inner")
    );
}

#[test]
fn failure_crossing_nested_chains_is_wrapped_once() {
    init_tracing();
    let denied = InvocationError::application_with_data("Denied", "role missing", json!({"role": "admin"}));
    let deny: Arc<dyn Interceptor> = {
        let denied = denied.clone();
        Arc::new(interceptor_fn("deny", move |_| Err(denied.clone())))
    };
    let inner = InterceptorChain::new(vec![Arc::new(PassThroughInterceptor) as Arc<dyn Interceptor>, deny]);
    let middle = InterceptorChain::new(vec![Arc::new(inner) as Arc<dyn Interceptor>]);
    let outer = InterceptorChain::new(vec![
        Arc::new(PassThroughInterceptor) as Arc<dyn Interceptor>,
        Arc::new(middle),
    ]);

    let err = outer.intercept(&mut sum_context(vec![])).unwrap_err();

    assert_eq!(err, InvocationError::invocation(denied));
}

#[test]
fn signal_from_nested_chain_reported_as_undeclared() {
    init_tracing();
    let signal = InvocationError::signal("ThreadDeath", "worker stopped");
    let inner = InterceptorChain::builder()
        .with_interceptor({
            let signal = signal.clone();
            interceptor_fn("stop", move |_| Err(InvocationError::invocation(signal.clone())))
        })
        .build()
        .unwrap();
    let outer = InterceptorChain::new(vec![Arc::new(inner) as Arc<dyn Interceptor>]);

    let err = outer.intercept(&mut sum_context(vec![])).unwrap_err();

    // inner boundary: Invocation(Undeclared(signal)); outer link boundary
    // unwraps once, outer chain boundary wraps once
    assert_eq!(
        err,
        InvocationError::invocation(InvocationError::undeclared(signal.clone()))
    );
    assert_eq!(err.root_cause(), &signal);
    assert_eq!(err.root_cause().class(), FailureClass::Unrecognized);
}

#[test]
fn fatal_failure_escapes_every_layer_unchanged() {
    let fatal = InvocationError::fatal("heap exhausted");
    let inner = InterceptorChain::builder()
        .with_interceptor({
            let fatal = fatal.clone();
            interceptor_fn("oom", move |_| Err(fatal.clone()))
        })
        .build()
        .unwrap();
    let outer = InterceptorChain::new(vec![
        Arc::new(PassThroughInterceptor) as Arc<dyn Interceptor>,
        Arc::new(inner),
    ]);

    assert_eq!(outer.intercept(&mut sum_context(vec![])).unwrap_err(), fatal);
}

#[test]
fn reentrant_invocation_uses_its_own_cursor() {
    init_tracing();
    let slot: Arc<OnceLock<InterceptorChain>> = Arc::new(OnceLock::new());
    let entries = Arc::new(AtomicUsize::new(0));

    let reenter: Arc<dyn Interceptor> = {
        let slot = slot.clone();
        let entries = entries.clone();
        Arc::new(interceptor_fn("reenter", move |ctx| {
            entries.fetch_add(1, Ordering::SeqCst);
            let depth = ctx.parameters()[0].as_i64().unwrap_or_default();
            if depth < 3 {
                if let Some(chain) = slot.get() {
                    let nested = chain.intercept(&mut sum_context(vec![json!(depth + 1)]))?;
                    let total = nested.as_i64().unwrap_or_default() + depth;
                    ctx.set_parameters(vec![json!(total)])?;
                }
            }
            ctx.proceed()
        }))
    };
    let chain = InterceptorChain::new(vec![reenter, Arc::new(PassThroughInterceptor)]);
    assert!(slot.set(chain).is_ok());

    let result = slot
        .get()
        .unwrap()
        .intercept(&mut sum_context(vec![json!(0)]))
        .unwrap();

    // 0 + 1 + 2 + 3
    assert_eq!(result, json!(6));
    assert_eq!(entries.load(Ordering::SeqCst), 4);
}

#[test]
fn concurrent_invocations_do_not_interfere() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let counting: Arc<dyn Interceptor> = {
        let calls = calls.clone();
        Arc::new(interceptor_fn("count", move |ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            ctx.proceed()
        }))
    };
    let doubling: Arc<dyn Interceptor> = Arc::new(interceptor_fn("double", |ctx| {
        let doubled = ctx
            .parameters()
            .iter()
            .map(|value| json!(value.as_i64().unwrap_or_default() * 2))
            .collect();
        ctx.set_parameters(doubled)?;
        ctx.proceed()
    }));
    let chain = InterceptorChain::new(vec![counting.clone(), doubling, counting]);

    let threads = 8;
    let per_thread = 50;
    let results: Vec<Vec<Value>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let chain = &chain;
                scope.spawn(move || {
                    (0..per_thread)
                        .map(|i| {
                            let mut ctx = sum_context(vec![json!(t), json!(i)]);
                            chain.intercept(&mut ctx).unwrap()
                        })
                        .collect::<Vec<Value>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (t, per) in results.iter().enumerate() {
        for (i, value) in per.iter().enumerate() {
            assert_eq!(value, &json!(2 * (t + i)));
        }
    }
    assert_eq!(calls.load(Ordering::SeqCst), threads * per_thread * 2);
}
