//! Basic tracing and announce demo.
//!
//! Run with: cargo run --example demo-basics
//! Trace output goes to stderr.

use vartrace::{here, locals, ret, show, show_at, step, Level, Tracer};

fn checkout_total(tracer: &Tracer, prices: &[f64], discount: f64) -> f64 {
    let prices = prices.to_vec();
    tracer.trace_scope("checkout_total", here!(), locals![prices, discount], |s| {
        let subtotal: f64 = prices.iter().sum();
        step!(s, subtotal);
        let total = subtotal * (1.0 - discount);
        step!(s, subtotal, total);
        ret!(s, total)
    })
}

fn main() {
    let tracer = Tracer::builder()
        .watch("prices[*]")
        .prefix("SHOP")
        .build()
        .expect("watch expressions parse");

    show!("starting checkout");
    let total = checkout_total(&tracer, &[9.99, 4.50], 0.1);
    show_at!(Level::Success, "SHOP", "checkout complete: {total:.2}");
}
