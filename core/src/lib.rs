//! Latency harness for ML-DSA (Dilithium): key generation, detached signing
//! and sign/open, each timed over a fixed number of iterations.

pub mod buffers;
pub mod clock;
pub mod error;
pub mod harness;
pub mod params;
pub mod runner;
pub mod scheme;
pub mod stats;
pub mod utils;

pub use error::{BenchError, BenchResult, FailurePoint, SchemeError, SchemeResult};
pub use harness::{run_configured, Harness, HarnessState, RunReport};
pub use params::{HarnessConfig, MessageSource, SecurityLevel};
pub use runner::Phase;
pub use scheme::SignatureScheme;
