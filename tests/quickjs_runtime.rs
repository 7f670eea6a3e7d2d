use frontier_document::config::EngineConfig;
use frontier_document::js::runtime::QuickJsEngine;

#[test]
fn quickjs_executes_inline_script() {
    let engine = QuickJsEngine::new().expect("engine");
    let result: i32 = engine
        .eval_with(
            "(() => { console.log('hello from test'); return 40 + 2; })()",
            "quickjs_runtime_test.js",
        )
        .expect("script result");
    assert_eq!(result, 42);
}

#[test]
fn quickjs_reports_exception_message() {
    let engine = QuickJsEngine::new().expect("engine");
    let err = engine
        .eval("throw new TypeError('bad input');", "throwing.js")
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("TypeError"), "{message}");
    assert!(message.contains("bad input"), "{message}");
}

#[test]
fn quickjs_drains_promise_jobs_after_eval() {
    let engine = QuickJsEngine::with_config(&EngineConfig {
        max_pending_jobs: 8,
    })
    .expect("engine");
    engine
        .eval(
            "globalThis.settled = false; Promise.resolve().then(() => { globalThis.settled = true; });",
            "promise.js",
        )
        .expect("eval");
    let settled: bool = engine.eval_with("globalThis.settled", "check.js").expect("read");
    assert!(settled);
}

#[test]
fn quickjs_zero_job_cap_runs_no_jobs() {
    let engine = QuickJsEngine::with_config(&EngineConfig {
        max_pending_jobs: 0,
    })
    .expect("engine");
    engine
        .eval(
            "globalThis.settled = false; Promise.resolve().then(() => { globalThis.settled = true; });",
            "promise.js",
        )
        .expect("eval");
    let settled: bool = engine.eval_with("globalThis.settled", "check.js").expect("read");
    assert!(!settled);
}
