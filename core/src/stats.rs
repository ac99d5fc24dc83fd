//! Min/max/mean summaries of timing samples and their console rendering.

use std::fmt;
use std::io::{self, Write};

use crate::runner::Phase;

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Extremes and mean of a set of nanosecond samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub count: usize,
}

impl Summary {
    /// Summarise `samples` without modifying them.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is empty.
    pub fn from_samples(samples: &[u64]) -> Self {
        assert!(!samples.is_empty(), "cannot summarise an empty sample set");

        let (min, max, sum) = samples.iter().fold(
            (u64::MAX, u64::MIN, 0u128),
            |(min, max, sum), &sample| {
                (min.min(sample), max.max(sample), sum + u128::from(sample))
            },
        );

        Self {
            min,
            max,
            mean: sum as f64 / samples.len() as f64,
            count: samples.len(),
        }
    }

    pub fn min_ms(&self) -> f64 {
        self.min as f64 / NANOS_PER_MILLI
    }

    pub fn max_ms(&self) -> f64 {
        self.max as f64 / NANOS_PER_MILLI
    }

    pub fn mean_ms(&self) -> f64 {
        self.mean / NANOS_PER_MILLI
    }
}

/// A phase's summary as printed after its timed loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseReport {
    pub phase: Phase,
    pub summary: Summary,
}

impl PhaseReport {
    pub fn new(phase: Phase, samples: &[u64]) -> Self {
        Self {
            phase,
            summary: Summary::from_samples(samples),
        }
    }

    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")?;
        out.flush()
    }
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}:", self.phase)?;
        writeln!(f, "  min: {:.3} ms", self.summary.min_ms())?;
        writeln!(f, "  max: {:.3} ms", self.summary.max_ms())?;
        writeln!(f, "  avg: {:.3} ms", self.summary.mean_ms())
    }
}
