//! End-to-end event sequences for the documented scenarios.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use vartrace::{here, locals, step, BufferSink, Tracer};

fn buffer_tracer() -> (Tracer, Arc<BufferSink>) {
    let sink = Arc::new(BufferSink::new());
    let tracer = Tracer::builder().output(sink.clone()).build().expect("default config builds");
    (tracer, sink)
}

#[test]
fn test_simple_call_event_sequence() {
    let (tracer, sink) = buffer_tracer();

    let x = 5;
    let result = tracer.trace_call("f", here!(), locals![x], |s| {
        let y = x + 1;
        step!(s, x, y);
        y
    });
    assert_eq!(result, 6);

    let lines = sink.lines();
    assert_eq!(lines.len(), 3, "expected CALL, LINE, RETURN: {lines:?}");
    assert!(lines[0].contains("[CALL]") && lines[0].contains("f()") && lines[0].contains("x = 5"));
    assert!(lines[1].contains("[LINE]") && lines[1].contains("y = 6"));
    // x did not change, so the LINE reports only y
    assert!(!lines[1].contains("x ="));
    assert!(lines[2].contains("[RET ]") && lines[2].contains("return = 6"));

    assert_eq!(vartrace::tracker::depth(), 0);
}

#[test]
fn test_fallible_call_reports_exception_and_propagates() {
    let (tracer, sink) = buffer_tracer();

    let x = 0;
    let result: Result<i32, String> = tracer.trace_fallible("g", here!(), locals![x], |s| {
        step!(s, x);
        if x == 0 {
            return Err("attempt to divide by zero".to_string());
        }
        Ok(10 / x)
    });

    // The error reaches the caller unchanged
    assert_eq!(result.unwrap_err(), "attempt to divide by zero");

    let lines = sink.lines();
    assert!(lines[0].contains("[CALL]") && lines[0].contains("x = 0"));
    let last = lines.last().unwrap();
    assert!(last.contains("[EXC ]") && last.contains("attempt to divide by zero"));
    assert!(!lines.iter().any(|l| l.contains("[RET ]")));

    assert_eq!(vartrace::tracker::depth(), 0);
}

#[test]
fn test_panic_is_observed_and_resumed() {
    let (tracer, sink) = buffer_tracer();

    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        tracer.trace_call("boom", here!(), locals![], |_s| -> i32 { panic!("kaboom") })
    }));
    assert!(outcome.is_err(), "panic must propagate past the tracer");

    let lines = sink.lines();
    let last = lines.last().unwrap();
    assert!(last.contains("[EXC ]") && last.contains("panic: kaboom"));

    // Push/pop parity holds on the unwind path
    assert_eq!(vartrace::tracker::depth(), 0);
}

#[test]
fn test_changed_variables_show_old_and_new() {
    let (tracer, sink) = buffer_tracer();

    tracer.trace_call("count", here!(), locals![], |s| {
        let mut total = 0;
        step!(s, total);
        total += 7;
        step!(s, total);
        total
    });

    let lines = sink.lines();
    assert!(lines[1].contains("total = 0"));
    assert!(lines[2].contains("total: 0 -> 7"));
}

#[test]
fn test_unchanged_suppressed_unless_requested() {
    let sink = Arc::new(BufferSink::new());
    let tracer = Tracer::builder()
        .report_unchanged(true)
        .output(sink.clone())
        .build()
        .unwrap();

    tracer.trace_call("steady", here!(), locals![], |s| {
        let x = 1;
        step!(s, x);
        step!(s, x);
        x
    });

    let lines = sink.lines();
    // With report_unchanged the second step still shows x
    assert!(lines[2].contains("x = 1"));
}

#[test]
fn test_failing_watch_degrades_to_marker_only() {
    let sink = Arc::new(BufferSink::new());
    let tracer = Tracer::builder()
        .watch("missing.field")
        .watch("v[0]")
        .output(sink.clone())
        .build()
        .unwrap();

    let v = vec![10, 20];
    tracer.trace_call("watched", here!(), locals![v], |s| {
        step!(s, v);
        v.len()
    });

    let lines = sink.lines();
    // The broken expression degrades; the healthy one and the local survive
    assert!(lines[0].contains("missing.field = <unavailable:"));
    assert!(lines[0].contains("v[0] = 10"));
    assert!(lines[0].contains("v = [10,20]"));
}

#[test]
fn test_prefix_labels_every_line() {
    let sink = Arc::new(BufferSink::new());
    let tracer = Tracer::builder().prefix("DB").output(sink.clone()).build().unwrap();

    tracer.trace_call("query", here!(), locals![], |_s| 1);

    let lines = sink.lines();
    assert!(lines.iter().all(|l| l.starts_with("DB: ")));
}
