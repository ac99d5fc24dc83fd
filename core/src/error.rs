use std::collections::TryReserveError;
use std::fmt;
use std::io;

use thiserror::Error;

use crate::buffers::BufferKind;
use crate::runner::Phase;

/// Result type specialized for harness runs.
pub type BenchResult<T> = std::result::Result<T, BenchError>;

/// Result type returned by the signature primitive.
pub type SchemeResult<T> = std::result::Result<T, SchemeError>;

/// Failures reported by a [`SignatureScheme`](crate::scheme::SignatureScheme).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemeError {
    #[error("{0}")]
    Primitive(&'static str),
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("input of {found} bytes, expected {expected}")]
    InvalidLength { expected: usize, found: usize },
    #[error("signed message of {len} bytes is shorter than a signature ({min})")]
    Truncated { len: usize, min: usize },
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("recovered message does not match the signed message")]
    MessageMismatch,
}

/// Where inside a phase an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    Warmup,
    Iteration(usize),
    Setup(&'static str),
}

impl fmt::Display for FailurePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePoint::Warmup => write!(f, "warm-up"),
            FailurePoint::Iteration(index) => write!(f, "iter {index}"),
            FailurePoint::Setup(step) => write!(f, "{step}"),
        }
    }
}

/// Errors that abort a benchmark run.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Allocation failure: {buffer} buffer of {len} elements")]
    Allocation {
        buffer: BufferKind,
        len: usize,
        #[source]
        source: TryReserveError,
    },
    #[error("{phase} failed at {point}: {source}")]
    Operation {
        phase: Phase,
        point: FailurePoint,
        #[source]
        source: SchemeError,
    },
    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
}

impl BenchError {
    pub(crate) fn operation(
        phase: Phase,
        point: FailurePoint,
        source: SchemeError,
    ) -> Self {
        BenchError::Operation {
            phase,
            point,
            source,
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            BenchError::Allocation { .. } => 1,
            BenchError::Operation { .. } => 2,
            BenchError::Report(_) => 3,
        }
    }

    /// Phase and failure point for operation failures.
    pub fn failure_site(&self) -> Option<(Phase, FailurePoint)> {
        match self {
            BenchError::Operation { phase, point, .. } => Some((*phase, *point)),
            _ => None,
        }
    }
}
