//! Trace export functionality
//!
//! This module provides functionality for exporting traced event streams to
//! external formats. Currently supports Chrome Trace Event Format for
//! visualization in chrome://tracing, Perfetto or Speedscope.

pub mod chrome_trace;

pub use chrome_trace::ChromeTraceExporter;
