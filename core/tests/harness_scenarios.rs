//! End-to-end runs of the driver with injected clocks, allocators and faults.

mod common;

use std::io;

use common::{FailingAllocator, FaultyScheme, ScriptedClock};
use dilithium_bench::buffers::BufferKind;
use dilithium_bench::params::{KEYGEN_WARMUP_ROUNDS, WARMUP_ROUNDS};
use dilithium_bench::scheme::MlDsa44;
use dilithium_bench::{
    BenchError, FailurePoint, Harness, HarnessConfig, MessageSource, Phase,
    SecurityLevel,
};

fn zeroed_config(iterations: usize) -> HarnessConfig {
    HarnessConfig::new(SecurityLevel::Level2, iterations)
        .with_message(MessageSource::Zeroed)
}

fn as_text(out: Vec<u8>) -> String {
    String::from_utf8(out).expect("report is utf-8")
}

#[test]
fn hundred_iterations_on_smallest_level() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    let mut out: Vec<u8> = Vec::new();

    let report = Harness::new(&mut scheme, zeroed_config(100))
        .run(&mut out)
        .expect("run completes");

    let keygen = report.phase(Phase::KeyGeneration).unwrap().summary;
    assert_eq!(keygen.count, 100);
    assert!(keygen.min as f64 <= keygen.mean && keygen.mean <= keygen.max as f64);

    // warm-ups, timed loop, and the stable pair
    assert_eq!(scheme.keygen_calls, KEYGEN_WARMUP_ROUNDS + 100 + 1);
    assert_eq!(scheme.detached_calls, WARMUP_ROUNDS + 100);
    assert_eq!(scheme.combined_calls, 1);
    assert_eq!(scheme.open_calls, WARMUP_ROUNDS + 100);

    let text = as_text(out);
    assert!(text.contains("Verification (open):"));
}

#[test]
fn scripted_clock_drives_sample_values() {
    // Each iteration reads the clock twice; every sample is 2_000 ns except a regression.
    let iterations = 4;
    let mut script = Vec::new();
    for phase in 0..3u64 {
        for i in 0..iterations as u64 {
            let start = 1_000_000 * phase + 10_000 * i;
            script.push(start);
            script.push(start + 2_000);
        }
    }
    // last verification sample goes backwards and must clamp to zero
    let len = script.len();
    script[len - 1] = script[len - 2] - 500;
    let clock = ScriptedClock::new(script);

    let report = Harness::new(MlDsa44, zeroed_config(iterations))
        .with_clock(&clock)
        .run(&mut io::sink())
        .expect("run completes");

    assert_eq!(clock.readings(), 3 * 2 * iterations);
    let keygen = report.phase(Phase::KeyGeneration).unwrap().summary;
    assert_eq!((keygen.min, keygen.max, keygen.mean), (2_000, 2_000, 2_000.0));

    let open = report.phase(Phase::Verification).unwrap().summary;
    assert_eq!(open.min, 0);
    assert_eq!(open.max, 2_000);
    assert_eq!(open.mean, 1_500.0);
}

#[test]
fn public_key_allocation_failure_exits_with_status_one() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    let mut allocator = FailingAllocator::new(BufferKind::PublicKey);
    let mut out: Vec<u8> = Vec::new();

    let err = Harness::new(&mut scheme, zeroed_config(100))
        .with_allocator(&mut allocator)
        .run(&mut out)
        .unwrap_err();

    assert!(matches!(
        err,
        BenchError::Allocation {
            buffer: BufferKind::PublicKey,
            ..
        }
    ));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(allocator.requests, 1);
    assert_eq!(scheme.total_calls(), 0);
    assert!(out.is_empty(), "nothing may be printed before allocation succeeds");
}

#[test]
fn sample_array_allocation_failure_is_fatal() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    let mut allocator = FailingAllocator::new(BufferKind::Samples);

    let err = Harness::new(&mut scheme, zeroed_config(10))
        .with_allocator(&mut allocator)
        .run(&mut io::sink())
        .unwrap_err();

    assert_eq!(err.exit_code(), 1);
    assert_eq!(allocator.requests, 7);
    assert_eq!(scheme.total_calls(), 0);
}

#[test]
fn corrupted_verification_at_iteration_37_aborts() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    // open call 0 is the warm-up, so timed iteration i is call i + 1
    scheme.corrupt_open = Some(WARMUP_ROUNDS + 37);
    let mut out: Vec<u8> = Vec::new();

    let err = Harness::new(&mut scheme, zeroed_config(100))
        .run(&mut out)
        .unwrap_err();

    assert_eq!(
        err.failure_site(),
        Some((Phase::Verification, FailurePoint::Iteration(37)))
    );
    assert_eq!(err.exit_code(), 2);
    assert_eq!(
        err.to_string(),
        "Verification (open) failed at iter 37: signature verification failed"
    );
    assert_eq!(scheme.open_calls, WARMUP_ROUNDS + 38);

    let text = as_text(out);
    assert!(text.contains("Key Generation:"));
    assert!(text.contains("Signing (detached):"));
    assert!(!text.contains("Verification (open):"));
}

#[test]
fn detached_sign_warmup_failure_is_fatal() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    scheme.failing_detached_sign = Some(0);
    let mut out: Vec<u8> = Vec::new();

    let err = Harness::new(&mut scheme, zeroed_config(5))
        .run(&mut out)
        .unwrap_err();

    assert_eq!(
        err.failure_site(),
        Some((Phase::SigningDetached, FailurePoint::Warmup))
    );
    assert_eq!(scheme.detached_calls, 1);
    assert_eq!(scheme.open_calls, 0);
    assert!(!as_text(out).contains("Signing (detached):"));
}

#[test]
fn keygen_warmup_failures_are_tolerated() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    scheme.failing_keygens = (0..KEYGEN_WARMUP_ROUNDS).collect();

    let report = Harness::new(&mut scheme, zeroed_config(3))
        .run(&mut io::sink())
        .expect("warm-up failures do not abort the run");

    assert_eq!(report.phases.len(), 3);
}

#[test]
fn timed_keygen_failure_stops_remaining_phases() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    scheme.failing_keygens = vec![KEYGEN_WARMUP_ROUNDS + 2];
    let mut out: Vec<u8> = Vec::new();

    let err = Harness::new(&mut scheme, zeroed_config(5))
        .run(&mut out)
        .unwrap_err();

    assert_eq!(
        err.failure_site(),
        Some((Phase::KeyGeneration, FailurePoint::Iteration(2)))
    );
    assert_eq!(scheme.detached_calls, 0);
    assert!(!as_text(out).contains("Key Generation:"));
}

#[test]
fn stable_keypair_failure_is_fatal() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    scheme.failing_keygens = vec![KEYGEN_WARMUP_ROUNDS + 4];

    let err = Harness::new(&mut scheme, zeroed_config(4))
        .run(&mut io::sink())
        .unwrap_err();

    assert_eq!(
        err.failure_site(),
        Some((Phase::KeyGeneration, FailurePoint::Setup("post-bench keypair")))
    );
    assert_eq!(scheme.detached_calls, 0);
}

#[test]
fn combined_sign_failure_is_fatal() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    scheme.failing_combined_sign = Some(0);

    let err = Harness::new(&mut scheme, zeroed_config(2))
        .run(&mut io::sink())
        .unwrap_err();

    assert_eq!(
        err.failure_site(),
        Some((Phase::Verification, FailurePoint::Setup("combined sign")))
    );
    assert_eq!(scheme.open_calls, 0);
}

#[test]
fn verification_warmup_failure_is_fatal() {
    let mut scheme = FaultyScheme::new(MlDsa44);
    scheme.corrupt_open = Some(0);

    let err = Harness::new(&mut scheme, zeroed_config(2))
        .run(&mut io::sink())
        .unwrap_err();

    assert_eq!(
        err.failure_site(),
        Some((Phase::Verification, FailurePoint::Warmup))
    );
    assert_eq!(scheme.open_calls, 1);
}

#[test]
fn random_message_run_completes() {
    let config = HarnessConfig::new(SecurityLevel::Level2, 2);
    let report = dilithium_bench::run_configured(config, &mut io::sink())
        .expect("run completes");
    assert_eq!(report.iterations, 2);
    assert_eq!(report.phases.len(), 3);
}
