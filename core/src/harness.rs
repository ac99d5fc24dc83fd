//! Phase sequencing for a full benchmark run.

use std::io::{self, Write};

use tracing::{debug, info};

use crate::buffers::{BufferAllocator, BufferPool, HeapAllocator};
use crate::clock::{Clock, MonotonicClock};
use crate::error::{BenchError, BenchResult, FailurePoint, SchemeError};
use crate::params::{
    HarnessConfig, SchemeSizes, SecurityLevel, KEYGEN_WARMUP_ROUNDS,
    WARMUP_ROUNDS,
};
use crate::runner::{OperationRunner, Phase, Warmup};
use crate::scheme::{MlDsa44, MlDsa65, MlDsa87, SignatureScheme};
use crate::stats::PhaseReport;
use crate::utils::{fill_message, ContextDisplay};

/// Driver states; any failure jumps straight to `Cleanup`, which wipes the
/// key material before the pool is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    Init,
    KeygenBench,
    Resetup,
    SignBench,
    OpenSetup,
    OpenBench,
    Cleanup,
    Done,
}

/// Summaries of every phase that completed.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub level: SecurityLevel,
    pub iterations: usize,
    pub phases: Vec<PhaseReport>,
}

impl RunReport {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|report| report.phase == phase)
    }
}

/// Runs the keygen, detached-sign and sign/open phases for one scheme.
pub struct Harness<S, C = MonotonicClock, A = HeapAllocator> {
    scheme: S,
    clock: C,
    allocator: A,
    config: HarnessConfig,
    signed_len: usize,
    report: RunReport,
}

impl<S: SignatureScheme> Harness<S> {
    pub fn new(scheme: S, config: HarnessConfig) -> Self {
        let report = RunReport {
            level: scheme.level(),
            iterations: config.iterations,
            phases: Vec::with_capacity(3),
        };
        Self {
            scheme,
            clock: MonotonicClock::new(),
            allocator: HeapAllocator,
            config,
            signed_len: 0,
            report,
        }
    }
}

impl<S, C, A> Harness<S, C, A>
where
    S: SignatureScheme,
    C: Clock,
    A: BufferAllocator,
{
    pub fn with_clock<T: Clock>(self, clock: T) -> Harness<S, T, A> {
        Harness {
            scheme: self.scheme,
            clock,
            allocator: self.allocator,
            config: self.config,
            signed_len: self.signed_len,
            report: self.report,
        }
    }

    pub fn with_allocator<T: BufferAllocator>(
        self,
        allocator: T,
    ) -> Harness<S, C, T> {
        Harness {
            scheme: self.scheme,
            clock: self.clock,
            allocator,
            config: self.config,
            signed_len: self.signed_len,
            report: self.report,
        }
    }

    /// Run every phase, writing the header and statistics to `out`.
    ///
    /// Buffers are released before returning on success and on failure.
    pub fn run<W: Write>(mut self, out: &mut W) -> BenchResult<RunReport> {
        let sizes = self.scheme.sizes();
        let mut pool = BufferPool::allocate(
            &mut self.allocator,
            sizes,
            self.config.iterations,
        )?;

        let mut state = HarnessState::Init;
        let mut outcome = Ok(());
        while state != HarnessState::Done {
            let next = match self.advance(state, &mut pool, out) {
                Ok(next) => next,
                Err(err) => {
                    debug!(from = ?state, error = %err, "aborting run");
                    outcome = Err(err);
                    HarnessState::Cleanup
                }
            };
            debug!(from = ?state, to = ?next, "state transition");
            state = next;
        }

        pool.release();
        outcome.map(|()| self.report)
    }

    fn advance<W: Write>(
        &mut self,
        state: HarnessState,
        pool: &mut BufferPool,
        out: &mut W,
    ) -> BenchResult<HarnessState> {
        let Self {
            scheme,
            clock,
            config,
            signed_len,
            report,
            ..
        } = self;
        let runner = OperationRunner::new(&*clock);
        let context = config.context.as_slice();
        let BufferPool {
            public_key,
            secret_key,
            message,
            signature,
            signed_message,
            recovered,
            samples,
        } = pool;

        match state {
            HarnessState::Init => {
                fill_message(message, config.message, &mut rand::rng());
                write_header(
                    out,
                    scheme.level(),
                    scheme.sizes(),
                    context,
                    config.iterations,
                )?;
                Ok(HarnessState::KeygenBench)
            }
            HarnessState::KeygenBench => {
                let mut keypair = || {
                    scheme.keypair(
                        public_key.as_mut_slice(),
                        secret_key.as_mut_slice(),
                    )
                };
                runner.warm_up(
                    Phase::KeyGeneration,
                    KEYGEN_WARMUP_ROUNDS,
                    Warmup::Unchecked,
                    &mut keypair,
                )?;
                let timings = runner.measure(
                    Phase::KeyGeneration,
                    samples.as_mut_slice(),
                    keypair,
                )?;
                let phase = PhaseReport::new(Phase::KeyGeneration, timings);
                record(report, phase, out)?;
                Ok(HarnessState::Resetup)
            }
            HarnessState::Resetup => {
                scheme
                    .keypair(
                        public_key.as_mut_slice(),
                        secret_key.as_mut_slice(),
                    )
                    .map_err(|source| {
                        BenchError::operation(
                            Phase::KeyGeneration,
                            FailurePoint::Setup("post-bench keypair"),
                            source,
                        )
                    })?;
                Ok(HarnessState::SignBench)
            }
            HarnessState::SignBench => {
                let mut sign = || {
                    scheme.sign_detached(
                        signature.as_mut_slice(),
                        message.as_slice(),
                        context,
                        secret_key.as_slice(),
                    )
                };
                runner.warm_up(
                    Phase::SigningDetached,
                    WARMUP_ROUNDS,
                    Warmup::Checked,
                    &mut sign,
                )?;
                let timings = runner.measure(
                    Phase::SigningDetached,
                    samples.as_mut_slice(),
                    sign,
                )?;
                let phase = PhaseReport::new(Phase::SigningDetached, timings);
                record(report, phase, out)?;
                Ok(HarnessState::OpenSetup)
            }
            HarnessState::OpenSetup => {
                *signed_len = scheme
                    .sign(
                        signed_message.as_mut_slice(),
                        message.as_slice(),
                        context,
                        secret_key.as_slice(),
                    )
                    .map_err(|source| {
                        BenchError::operation(
                            Phase::Verification,
                            FailurePoint::Setup("combined sign"),
                            source,
                        )
                    })?;
                let signed = &signed_message[..*signed_len];
                runner.warm_up(
                    Phase::Verification,
                    WARMUP_ROUNDS,
                    Warmup::Checked,
                    || {
                        let len = scheme.open(
                            recovered.as_mut_slice(),
                            signed,
                            context,
                            public_key.as_slice(),
                        )?;
                        if recovered[..len] != message[..] {
                            return Err(SchemeError::MessageMismatch);
                        }
                        Ok(len)
                    },
                )?;
                Ok(HarnessState::OpenBench)
            }
            HarnessState::OpenBench => {
                let signed = &signed_message[..*signed_len];
                let timings = runner.measure(
                    Phase::Verification,
                    samples.as_mut_slice(),
                    || {
                        scheme.open(
                            recovered.as_mut_slice(),
                            signed,
                            context,
                            public_key.as_slice(),
                        )
                    },
                )?;
                let phase = PhaseReport::new(Phase::Verification, timings);
                record(report, phase, out)?;
                Ok(HarnessState::Cleanup)
            }
            HarnessState::Cleanup => {
                secret_key.fill(0);
                signed_message.fill(0);
                *signed_len = 0;
                Ok(HarnessState::Done)
            }
            // `run` stops looping once `Done` is reached
            HarnessState::Done => unreachable!("advance called after Done"),
        }
    }
}

fn record<W: Write>(
    report: &mut RunReport,
    phase: PhaseReport,
    out: &mut W,
) -> BenchResult<()> {
    info!(
        phase = %phase.phase,
        min_ns = phase.summary.min,
        max_ns = phase.summary.max,
        mean_ns = phase.summary.mean,
        "phase complete"
    );
    phase.write_to(out)?;
    report.phases.push(phase);
    Ok(())
}

fn write_header<W: Write>(
    out: &mut W,
    level: SecurityLevel,
    sizes: SchemeSizes,
    context: &[u8],
    iterations: usize,
) -> io::Result<()> {
    writeln!(out, "Mode: {level}")?;
    writeln!(
        out,
        "Public key: {} bytes, secret key: {} bytes, signature: {} bytes",
        sizes.public_key, sizes.secret_key, sizes.signature
    )?;
    writeln!(out, "Context: {}", ContextDisplay(context))?;
    writeln!(out, "Running {iterations} iterations for each operation...")?;
    out.flush()
}

/// Benchmark the parameter set named by `config.level`.
pub fn run_configured<W: Write>(
    config: HarnessConfig,
    out: &mut W,
) -> BenchResult<RunReport> {
    match config.level {
        SecurityLevel::Level2 => Harness::new(MlDsa44, config).run(out),
        SecurityLevel::Level3 => Harness::new(MlDsa65, config).run(out),
        SecurityLevel::Level5 => Harness::new(MlDsa87, config).run(out),
    }
}
