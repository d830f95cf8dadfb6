use std::hint::black_box;

use crate::error::{BenchError, Result};

/// Benchmark buffer: `S` integers with `buffer[k] == k`.
///
/// Element width matches a C `int`; indices past `i32::MAX` are stored
/// truncated.
#[derive(Debug)]
pub struct Buffer {
    data: Box<[i32]>,
}

impl Buffer {
    /// Allocates and fills a buffer of `len` elements. Allocation failure is
    /// reported instead of aborting the process.
    pub fn allocate(len: usize) -> Result<Self> {
        let bytes = Self::bytes_for(len);
        let oom = || BenchError::OutOfMemory {
            elements: len,
            bytes,
        };

        let mut data: Vec<i32> = Vec::new();
        data.try_reserve_exact(len).map_err(|_| oom())?;
        data.extend((0..len).map(|k| k as i32));

        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    /// Bytes a buffer of `len` elements occupies, without overflow.
    pub fn bytes_for(len: usize) -> u128 {
        len as u128 * std::mem::size_of::<i32>() as u128
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size_bytes(&self) -> usize {
        std::mem::size_of_val(&*self.data)
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }
}

/// Wraparound read loop: for `i` in `0..accesses`, reads `buffer[i % len]`
/// and adds it to a wrapping `i64` accumulator.
///
/// Every read passes through `black_box`, so the loop cannot be folded into
/// a closed-form sum.
#[inline(always)]
pub fn wraparound_read(accesses: u64, buffer: &[i32]) -> i64 {
    if buffer.is_empty() {
        return 0;
    }

    let len = buffer.len() as u64;
    let mut acc = 0i64;

    for i in 0..accesses {
        let idx = (i % len) as usize;
        let value = black_box(buffer[idx]);
        acc = acc.wrapping_add(value as i64);
    }

    acc
}
