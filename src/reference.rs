//! Closed-form result of the wraparound read loop.
//!
//! Full passes over the buffer each contribute `S*(S-1)/2`; the trailing
//! partial pass of `r = N mod S` reads contributes `r*(r-1)/2`. The result is
//! reduced mod 2^64 to match the loop's wrapping accumulator.

/// Largest working set whose elements all fit in an `i32` unchanged.
pub const MAX_EXACT_WORKING_SET: usize = 1 << 31;

fn triangular(x: u128) -> u128 {
    if x == 0 { 0 } else { x * (x - 1) / 2 }
}

/// Expected accumulator for `accesses` reads over a `working_set`-element
/// buffer. `None` when the working set is empty or large enough that buffer
/// values are truncated.
pub fn expected_sum(accesses: u64, working_set: usize) -> Option<i64> {
    if working_set == 0 || working_set > MAX_EXACT_WORKING_SET {
        return None;
    }

    let s = working_set as u128;
    let n = accesses as u128;
    let total = (n / s) * triangular(s) + triangular(n % s);

    Some(total as u64 as i64)
}
