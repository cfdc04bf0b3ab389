//! Depth gating: nested calls keep their call/return skeleton while line
//! detail is elided beyond the configured depth.

use std::sync::Arc;
use vartrace::{here, locals, step, BufferSink, Tracer};

fn countdown(tracer: &Tracer, n: u32) -> u32 {
    tracer.trace_call("countdown", here!(), locals![n], |s| {
        if n == 0 {
            return 0;
        }
        let next = n - 1;
        step!(s, n, next);
        countdown(tracer, next)
    })
}

#[test]
fn test_depth_one_keeps_lines_only_at_outermost_level() {
    let sink = Arc::new(BufferSink::new());
    let tracer = Tracer::builder().depth(1).output(sink.clone()).build().unwrap();

    countdown(&tracer, 2);

    let lines = sink.lines();
    let calls = lines.iter().filter(|l| l.contains("[CALL]")).count();
    let returns = lines.iter().filter(|l| l.contains("[RET ]")).count();
    let line_events = lines.iter().filter(|l| l.contains("[LINE]")).count();

    // Three levels of recursion: skeleton everywhere, detail only at depth 0
    assert_eq!(calls, 3);
    assert_eq!(returns, 3);
    assert_eq!(line_events, 1);

    assert_eq!(vartrace::tracker::depth(), 0);
}

#[test]
fn test_deeper_budget_reveals_nested_lines() {
    let sink = Arc::new(BufferSink::new());
    let tracer = Tracer::builder().depth(3).output(sink.clone()).build().unwrap();

    countdown(&tracer, 2);

    let lines = sink.lines();
    // Levels n=2 and n=1 both step; n=0 returns before its step
    assert_eq!(lines.iter().filter(|l| l.contains("[LINE]")).count(), 2);
}

#[test]
fn test_session_exposes_depth_and_gating() {
    let tracer =
        Tracer::builder().depth(1).output(Arc::new(BufferSink::new())).build().unwrap();

    tracer.trace_call("outer", here!(), locals![], |s| {
        assert!(!s.is_gated());
        assert_eq!(s.depth(), 0);
        let outer_id = s.call_id();
        tracer.trace_call("inner", here!(), locals![], |s2| {
            assert!(s2.is_gated());
            assert_eq!(s2.depth(), 1);
            assert_ne!(s2.call_id(), outer_id);
            0
        })
    });
}

#[test]
fn test_indentation_tracks_depth() {
    let sink = Arc::new(BufferSink::new());
    let tracer = Tracer::builder().depth(1).output(sink.clone()).build().unwrap();

    countdown(&tracer, 2);

    let lines = sink.lines();
    assert!(lines.iter().any(|l| l.starts_with("[CALL]")));
    assert!(lines.iter().any(|l| l.starts_with("  [CALL]")));
    assert!(lines.iter().any(|l| l.starts_with("    [CALL]")));
}
