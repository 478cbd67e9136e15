//! Benchmarks for the monitoring graph.

mod buses;

pub use buses::{bench_analyser, bench_buses};
