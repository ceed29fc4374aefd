pub mod benchmarks;
pub mod roi;
