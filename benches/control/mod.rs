//! Benchmarks for the per-sample control path.

mod emit;
mod mapping;

pub use emit::bench_emit;
pub use mapping::{bench_mapping, bench_quantize};
