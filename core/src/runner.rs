//! Warm-up and timed execution of a single benchmark phase.

use std::fmt;
use std::hint::black_box;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{BenchError, BenchResult, FailurePoint, SchemeResult};

/// Measured operation, labelled as it appears in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    KeyGeneration,
    SigningDetached,
    Verification,
}

impl Phase {
    pub const fn label(self) -> &'static str {
        match self {
            Phase::KeyGeneration => "Key Generation",
            Phase::SigningDetached => "Signing (detached)",
            Phase::Verification => "Verification (open)",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a failing warm-up call aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warmup {
    /// Failure is fatal.
    Checked,
    /// Failure is logged and left for the timed loop to surface.
    Unchecked,
}

/// Runs an operation against a [`Clock`], one sample per iteration.
#[derive(Debug)]
pub struct OperationRunner<'c, C: Clock> {
    clock: &'c C,
}

impl<'c, C: Clock> OperationRunner<'c, C> {
    pub fn new(clock: &'c C) -> Self {
        Self { clock }
    }

    /// Call `op` `rounds` times without timing it.
    pub fn warm_up<T, F>(
        &self,
        phase: Phase,
        rounds: usize,
        policy: Warmup,
        mut op: F,
    ) -> BenchResult<()>
    where
        F: FnMut() -> SchemeResult<T>,
    {
        for round in 0..rounds {
            match (op(), policy) {
                (Ok(output), _) => {
                    black_box(output);
                }
                (Err(source), Warmup::Checked) => {
                    return Err(BenchError::operation(
                        phase,
                        FailurePoint::Warmup,
                        source,
                    ));
                }
                (Err(source), Warmup::Unchecked) => {
                    warn!(%phase, round, error = %source, "ignoring warm-up failure");
                }
            }
        }
        Ok(())
    }

    /// Time one call of `op` per slot of `samples`, in nanoseconds.
    ///
    /// The first failure aborts with the failing iteration index. The returned
    /// slice borrows `samples`, so it must be consumed before the buffer is
    /// handed to the next phase.
    pub fn measure<'s, T, F>(
        &self,
        phase: Phase,
        samples: &'s mut [u64],
        mut op: F,
    ) -> BenchResult<&'s [u64]>
    where
        F: FnMut() -> SchemeResult<T>,
    {
        debug!(%phase, iterations = samples.len(), "measuring");
        for (iteration, slot) in samples.iter_mut().enumerate() {
            let start = self.clock.now();
            let outcome = op();
            let end = self.clock.now();
            let output = outcome.map_err(|source| {
                BenchError::operation(
                    phase,
                    FailurePoint::Iteration(iteration),
                    source,
                )
            })?;
            black_box(output);
            *slot = end.nanos_since(start);
        }
        Ok(samples)
    }
}
