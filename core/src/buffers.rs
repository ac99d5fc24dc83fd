//! One-shot allocation of every buffer a run needs.

use std::collections::TryReserveError;
use std::fmt;

use tracing::debug;

use crate::error::{BenchError, BenchResult};
use crate::params::{SchemeSizes, MESSAGE_BYTES};

/// Identifies a buffer in the [`BufferPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    PublicKey,
    SecretKey,
    Message,
    Signature,
    SignedMessage,
    RecoveredMessage,
    Samples,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BufferKind::PublicKey => "public key",
            BufferKind::SecretKey => "secret key",
            BufferKind::Message => "message",
            BufferKind::Signature => "signature",
            BufferKind::SignedMessage => "signed message",
            BufferKind::RecoveredMessage => "recovered message",
            BufferKind::Samples => "timing sample",
        };
        f.write_str(name)
    }
}

/// Fallible allocation of zero-filled buffers.
pub trait BufferAllocator {
    fn bytes(
        &mut self,
        kind: BufferKind,
        len: usize,
    ) -> Result<Vec<u8>, TryReserveError>;

    fn samples(&mut self, len: usize) -> Result<Vec<u64>, TryReserveError>;
}

impl<A: BufferAllocator + ?Sized> BufferAllocator for &mut A {
    fn bytes(
        &mut self,
        kind: BufferKind,
        len: usize,
    ) -> Result<Vec<u8>, TryReserveError> {
        (**self).bytes(kind, len)
    }

    fn samples(&mut self, len: usize) -> Result<Vec<u64>, TryReserveError> {
        (**self).samples(len)
    }
}

/// Allocator backed by the global heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapAllocator;

fn zeroed<T: Clone + Default>(len: usize) -> Result<Vec<T>, TryReserveError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

impl BufferAllocator for HeapAllocator {
    fn bytes(
        &mut self,
        _kind: BufferKind,
        len: usize,
    ) -> Result<Vec<u8>, TryReserveError> {
        zeroed(len)
    }

    fn samples(&mut self, len: usize) -> Result<Vec<u64>, TryReserveError> {
        zeroed(len)
    }
}

/// Every buffer used by a run, released together when the pool is dropped.
///
/// The timing sample array is shared by all phases: each phase overwrites it,
/// so its statistics must be read before the next phase starts.
#[derive(Debug)]
pub struct BufferPool {
    pub(crate) public_key: Vec<u8>,
    pub(crate) secret_key: Vec<u8>,
    pub(crate) message: Vec<u8>,
    pub(crate) signature: Vec<u8>,
    pub(crate) signed_message: Vec<u8>,
    pub(crate) recovered: Vec<u8>,
    pub(crate) samples: Vec<u64>,
}

impl BufferPool {
    /// Allocate all buffers for `sizes` and `iterations` timing samples.
    ///
    /// On failure the buffers acquired so far are dropped before returning.
    pub fn allocate<A: BufferAllocator>(
        allocator: &mut A,
        sizes: SchemeSizes,
        iterations: usize,
    ) -> BenchResult<Self> {
        let mut bytes = |kind: BufferKind, len: usize| {
            allocator.bytes(kind, len).map_err(|source| {
                BenchError::Allocation {
                    buffer: kind,
                    len,
                    source,
                }
            })
        };

        let public_key = bytes(BufferKind::PublicKey, sizes.public_key)?;
        let secret_key = bytes(BufferKind::SecretKey, sizes.secret_key)?;
        let message = bytes(BufferKind::Message, MESSAGE_BYTES)?;
        let signature = bytes(BufferKind::Signature, sizes.signature)?;
        let signed_message = bytes(
            BufferKind::SignedMessage,
            sizes.signed_message(MESSAGE_BYTES),
        )?;
        let recovered = bytes(BufferKind::RecoveredMessage, MESSAGE_BYTES)?;
        let samples = allocator.samples(iterations).map_err(|source| {
            BenchError::Allocation {
                buffer: BufferKind::Samples,
                len: iterations,
                source,
            }
        })?;

        debug!(?sizes, iterations, "allocated buffer pool");
        Ok(Self {
            public_key,
            secret_key,
            message,
            signature,
            signed_message,
            recovered,
            samples,
        })
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Capacity of the given buffer in elements.
    pub fn capacity(&self, kind: BufferKind) -> usize {
        match kind {
            BufferKind::PublicKey => self.public_key.len(),
            BufferKind::SecretKey => self.secret_key.len(),
            BufferKind::Message => self.message.len(),
            BufferKind::Signature => self.signature.len(),
            BufferKind::SignedMessage => self.signed_message.len(),
            BufferKind::RecoveredMessage => self.recovered.len(),
            BufferKind::Samples => self.samples.len(),
        }
    }

    /// Drop every buffer now.
    pub fn release(self) {}
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        debug!("released buffer pool");
    }
}
