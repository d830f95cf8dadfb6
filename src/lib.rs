//! Wraparound-read memory microbenchmark.
//!
//! Allocates `S` integers holding their own index, performs `N` reads at
//! `i mod S` and accumulates them. Elapsed time is measured externally; the
//! printed sum keeps the loop observable.

pub mod benchmark;
pub mod cli;
pub mod error;
pub mod reference;
pub mod reporting;
pub mod system;
pub mod workload;

pub use benchmark::{BenchConfig, DEFAULT_ACCESSES, DEFAULT_WORKING_SET, run};
pub use error::BenchError;
