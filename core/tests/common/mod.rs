#![allow(dead_code)]

use std::cell::Cell;
use std::collections::TryReserveError;

use dilithium_bench::buffers::{BufferAllocator, BufferKind, HeapAllocator};
use dilithium_bench::clock::{Clock, Timestamp};
use dilithium_bench::params::SecurityLevel;
use dilithium_bench::{SchemeError, SchemeResult, SignatureScheme};

/// Wraps a real scheme and injects failures on chosen calls (0-based counts).
#[derive(Debug)]
pub struct FaultyScheme<S> {
    pub inner: S,
    pub failing_keygens: Vec<usize>,
    pub failing_detached_sign: Option<usize>,
    pub failing_combined_sign: Option<usize>,
    pub corrupt_open: Option<usize>,
    pub keygen_calls: usize,
    pub detached_calls: usize,
    pub combined_calls: usize,
    pub open_calls: usize,
}

impl<S> FaultyScheme<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing_keygens: Vec::new(),
            failing_detached_sign: None,
            failing_combined_sign: None,
            corrupt_open: None,
            keygen_calls: 0,
            detached_calls: 0,
            combined_calls: 0,
            open_calls: 0,
        }
    }

    pub fn total_calls(&self) -> usize {
        self.keygen_calls + self.detached_calls + self.combined_calls + self.open_calls
    }
}

impl<S: SignatureScheme> SignatureScheme for FaultyScheme<S> {
    fn level(&self) -> SecurityLevel {
        self.inner.level()
    }

    fn keypair(
        &mut self,
        public_key: &mut [u8],
        secret_key: &mut [u8],
    ) -> SchemeResult<()> {
        let call = self.keygen_calls;
        self.keygen_calls += 1;
        if self.failing_keygens.contains(&call) {
            return Err(SchemeError::Primitive("injected keygen failure"));
        }
        self.inner.keypair(public_key, secret_key)
    }

    fn sign_detached(
        &mut self,
        signature: &mut [u8],
        message: &[u8],
        context: &[u8],
        secret_key: &[u8],
    ) -> SchemeResult<usize> {
        let call = self.detached_calls;
        self.detached_calls += 1;
        if self.failing_detached_sign == Some(call) {
            return Err(SchemeError::Primitive("injected signing failure"));
        }
        self.inner.sign_detached(signature, message, context, secret_key)
    }

    fn sign(
        &mut self,
        signed_message: &mut [u8],
        message: &[u8],
        context: &[u8],
        secret_key: &[u8],
    ) -> SchemeResult<usize> {
        let call = self.combined_calls;
        self.combined_calls += 1;
        if self.failing_combined_sign == Some(call) {
            return Err(SchemeError::Primitive("injected signing failure"));
        }
        self.inner.sign(signed_message, message, context, secret_key)
    }

    fn open(
        &mut self,
        message: &mut [u8],
        signed_message: &[u8],
        context: &[u8],
        public_key: &[u8],
    ) -> SchemeResult<usize> {
        let call = self.open_calls;
        self.open_calls += 1;
        if self.corrupt_open == Some(call) {
            let mut corrupted = signed_message.to_vec();
            corrupted[signed_message.len() / 2] ^= 0x01;
            return self.inner.open(message, &corrupted, context, public_key);
        }
        self.inner.open(message, signed_message, context, public_key)
    }
}

/// Fails the request for one buffer kind and counts every request.
#[derive(Debug)]
pub struct FailingAllocator {
    pub fail_on: BufferKind,
    pub requests: usize,
}

impl FailingAllocator {
    pub fn new(fail_on: BufferKind) -> Self {
        Self {
            fail_on,
            requests: 0,
        }
    }
}

fn overflow() -> TryReserveError {
    Vec::<u8>::new()
        .try_reserve_exact(usize::MAX)
        .unwrap_err()
}

impl BufferAllocator for FailingAllocator {
    fn bytes(
        &mut self,
        kind: BufferKind,
        len: usize,
    ) -> Result<Vec<u8>, TryReserveError> {
        self.requests += 1;
        if kind == self.fail_on {
            return Err(overflow());
        }
        HeapAllocator.bytes(kind, len)
    }

    fn samples(&mut self, len: usize) -> Result<Vec<u64>, TryReserveError> {
        self.requests += 1;
        if self.fail_on == BufferKind::Samples {
            return Err(overflow());
        }
        HeapAllocator.samples(len)
    }
}

/// Replays a fixed sequence of timestamps, then repeats the last one.
#[derive(Debug)]
pub struct ScriptedClock {
    script: Vec<u64>,
    cursor: Cell<usize>,
}

impl ScriptedClock {
    pub fn new(script: Vec<u64>) -> Self {
        Self {
            script,
            cursor: Cell::new(0),
        }
    }

    pub fn readings(&self) -> usize {
        self.cursor.get()
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> Timestamp {
        let index = self.cursor.get();
        self.cursor.set(index + 1);
        let nanos = self
            .script
            .get(index)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or(0);
        Timestamp::from_nanos(nanos)
    }
}
