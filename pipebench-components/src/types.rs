// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The data passed between stages.

use std::fmt;
use std::time::{Duration, Instant};

use pipebench_engine::traits::{SimObject, TotalBytes};
use pipebench_engine::types::SimError;
use pipebench_track::Id;
use pipebench_track::id::Identified;

/// Largest payload a single block may carry.
pub const MAX_BLOCK_BYTES: usize = 1 << 30;

/// Size in bytes of `num_samples` samples of `unit_size` bytes, or `None` if
/// they would not fit in one block.
#[must_use]
pub fn block_bytes(unit_size: usize, num_samples: usize) -> Option<usize> {
    unit_size
        .checked_mul(num_samples)
        .filter(|&num_bytes| num_bytes <= MAX_BLOCK_BYTES)
}

/// A contiguous run of samples from one pipe's stream.
///
/// The payload is raw bytes, `unit_size` bytes per sample. `offset` is the
/// position of the first sample within the stream so that blocks can be
/// sliced and still be located. A block can carry the time at which its first
/// sample was produced, which the sink turns into a latency.
#[derive(Clone, Debug)]
pub struct SampleBlock {
    id: Id,
    offset: u64,
    unit_size: usize,
    data: Vec<u8>,
    created: Option<Instant>,
}

impl SampleBlock {
    /// Create a zero-filled block of `num_samples` samples.
    pub fn zeroed(
        id: Id,
        offset: u64,
        unit_size: usize,
        num_samples: usize,
    ) -> Result<Self, SimError> {
        let num_bytes = block_bytes(unit_size, num_samples).ok_or_else(|| {
            SimError(format!(
                "{num_samples} samples of {unit_size} bytes exceed the block limit of {MAX_BLOCK_BYTES} bytes"
            ))
        })?;
        Ok(Self {
            id,
            offset,
            unit_size,
            data: vec![0; num_bytes],
            created: None,
        })
    }

    /// Mark the block with the time its first sample was produced.
    #[must_use]
    pub fn stamped(mut self, created: Instant) -> Self {
        self.created = Some(created);
        self
    }

    /// Copy `num_samples` samples starting at sample `start` into a new block.
    ///
    /// The latency stamp belongs to the first sample so it is only kept by a
    /// slice that starts at the beginning of this block.
    #[must_use]
    pub fn slice(&self, id: Id, start: usize, num_samples: usize) -> Self {
        let first = start * self.unit_size;
        let last = first + num_samples * self.unit_size;
        Self {
            id,
            offset: self.offset + start as u64,
            unit_size: self.unit_size,
            data: self.data[first..last].to_vec(),
            created: if start == 0 { self.created } else { None },
        }
    }

    /// Drop all samples after the first `num_samples`.
    pub fn truncate(&mut self, num_samples: usize) {
        self.data.truncate(num_samples * self.unit_size);
    }

    #[must_use]
    pub fn num_samples(&self) -> usize {
        self.data.len() / self.unit_size
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn created(&self) -> Option<Instant> {
        self.created
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for SampleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "block {}: {} samples @ {}",
            self.id,
            self.num_samples(),
            self.offset
        )
    }
}

impl Identified for SampleBlock {
    fn id(&self) -> Id {
        self.id
    }
}

impl TotalBytes for SampleBlock {
    fn total_bytes(&self) -> usize {
        self.data.len()
    }
}

impl SimObject for SampleBlock {}

/// Running latency statistics kept by a sink.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatencySummary {
    pub count: u64,
    pub min: Duration,
    pub max: Duration,
    pub total: Duration,
}

impl LatencySummary {
    pub fn record(&mut self, latency: Duration) {
        if self.count == 0 || latency < self.min {
            self.min = latency;
        }
        if latency > self.max {
            self.max = latency;
        }
        self.total += latency;
        self.count += 1;
    }

    #[must_use]
    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            let nanos = self.total.as_nanos() / u128::from(self.count);
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        }
    }
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples timed, latency min {:?}, mean {:?}, max {:?}",
            self.count,
            self.min,
            self.mean(),
            self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_keeps_position() {
        let block = SampleBlock::zeroed(Id(1), 64, 4, 16)
            .unwrap()
            .stamped(Instant::now());
        assert_eq!(block.total_bytes(), 64);

        let head = block.slice(Id(2), 0, 5);
        assert_eq!(head.offset(), 64);
        assert_eq!(head.num_samples(), 5);
        assert!(head.created().is_some());

        let tail = block.slice(Id(3), 5, 11);
        assert_eq!(tail.offset(), 69);
        assert_eq!(tail.num_samples(), 11);
        assert!(tail.created().is_none());
        assert_eq!(tail.to_string(), "block 3: 11 samples @ 69");
    }

    #[test]
    fn truncate_in_samples() {
        let mut block = SampleBlock::zeroed(Id(1), 0, 4, 10).unwrap();
        block.truncate(3);
        assert_eq!(block.num_samples(), 3);
        assert_eq!(block.data().len(), 12);
    }

    #[test]
    fn oversized_block_rejected() {
        assert_eq!(block_bytes(4, 1024), Some(4096));
        assert_eq!(block_bytes(4, MAX_BLOCK_BYTES / 4), Some(MAX_BLOCK_BYTES));
        assert_eq!(block_bytes(4, MAX_BLOCK_BYTES / 4 + 1), None);
        assert_eq!(block_bytes(4, usize::MAX / 2), None);
        assert_eq!(block_bytes(4, 1 << 62), None);

        let err = SampleBlock::zeroed(Id(1), 0, 4, 1 << 62).unwrap_err();
        assert!(err.to_string().contains("exceed the block limit"));
    }

    #[test]
    fn latency_summary() {
        let mut summary = LatencySummary::default();
        assert_eq!(summary.mean(), Duration::ZERO);

        summary.record(Duration::from_micros(30));
        summary.record(Duration::from_micros(10));
        summary.record(Duration::from_micros(20));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, Duration::from_micros(10));
        assert_eq!(summary.max, Duration::from_micros(30));
        assert_eq!(summary.mean(), Duration::from_micros(20));
    }
}
