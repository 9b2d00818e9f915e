use criterion::{criterion_group, criterion_main};


use matching::register_benchmarks as register_matching_benchmarks;
use spsc::register_benchmarks as register_spsc_benchmarks;

criterion_group!(
    benches,
    register_matching_benchmarks,
    register_spsc_benchmarks,
);

criterion_main!(benches);
