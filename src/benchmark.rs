use std::hint::black_box;
use std::io::Write;

use crate::error::{BenchError, Result};
use crate::reference::expected_sum;
use crate::reporting::{emit_result, format_bytes, format_number};
use crate::system;
use crate::workload::{Buffer, wraparound_read};

pub const DEFAULT_ACCESSES: u64 = 1_000_000;
pub const DEFAULT_WORKING_SET: usize = 10_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    accesses: u64,
    working_set: usize,
}

impl BenchConfig {
    pub fn new(accesses: u64, working_set: usize) -> Result<Self> {
        if working_set == 0 {
            return Err(BenchError::InvalidWorkingSet(working_set));
        }
        Ok(Self {
            accesses,
            working_set,
        })
    }

    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    pub fn working_set(&self) -> usize {
        self.working_set
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            accesses: DEFAULT_ACCESSES,
            working_set: DEFAULT_WORKING_SET,
        }
    }
}

/// Allocates the buffer, runs the read loop and returns the accumulator.
pub fn run(config: &BenchConfig) -> Result<i64> {
    log::info!(
        "[Config] {} accesses over {} elements",
        format_number(config.accesses),
        format_number(config.working_set as u64)
    );

    // must precede Buffer::allocate
    let bytes = u64::try_from(Buffer::bytes_for(config.working_set)).unwrap_or(u64::MAX);
    system::log_memory_context(bytes);

    let buffer = Buffer::allocate(config.working_set)?;
    log::debug!(
        "[Buffer] allocated and initialized {} ({} elements)",
        format_bytes(buffer.size_bytes() as u64),
        buffer.len()
    );

    log::debug!("[Run] starting read loop");
    let sum = wraparound_read(black_box(config.accesses), buffer.as_slice());
    log::debug!(
        "[Run] read loop complete, {} full passes",
        format_number(config.accesses / config.working_set as u64)
    );

    Ok(sum)
}

/// Checks `sum` against the closed-form result when one exists.
pub fn verify(config: &BenchConfig, sum: i64) -> Result<()> {
    match expected_sum(config.accesses, config.working_set) {
        Some(expected) if expected != sum => Err(BenchError::VerificationFailed {
            expected,
            actual: sum,
        }),
        Some(_) => {
            log::info!("[Verify] result matches closed-form sum");
            Ok(())
        }
        None => {
            log::warn!("[Verify] no closed form for a working set this large, skipping");
            Ok(())
        }
    }
}

/// Full driver: run, optionally verify, then emit the single result line.
pub fn run_and_emit<W: Write>(config: &BenchConfig, verify_result: bool, out: &mut W) -> Result<i64> {
    let sum = run(config)?;
    if verify_result {
        verify(config, sum)?;
    }
    emit_result(out, sum)?;
    Ok(sum)
}
