//! The four-operation signature contract consumed by the harness.

mod ml_dsa;

pub use ml_dsa::{MlDsa44, MlDsa65, MlDsa87};

use crate::error::SchemeResult;
use crate::params::{SchemeSizes, SecurityLevel};

/// Context-tagged signature primitive writing into caller-owned buffers.
///
/// Output buffers must be at least as large as [`SchemeSizes`] for
/// [`level`](Self::level); the returned lengths are authoritative.
pub trait SignatureScheme {
    /// Parameter set implemented by this scheme.
    fn level(&self) -> SecurityLevel;

    fn sizes(&self) -> SchemeSizes {
        self.level().sizes()
    }

    /// Generate a fresh key pair into `public_key` and `secret_key`.
    fn keypair(
        &mut self,
        public_key: &mut [u8],
        secret_key: &mut [u8],
    ) -> SchemeResult<()>;

    /// Write a detached signature of `message` into `signature`, returning its length.
    fn sign_detached(
        &mut self,
        signature: &mut [u8],
        message: &[u8],
        context: &[u8],
        secret_key: &[u8],
    ) -> SchemeResult<usize>;

    /// Write `signature || message` into `signed_message`, returning its length.
    fn sign(
        &mut self,
        signed_message: &mut [u8],
        message: &[u8],
        context: &[u8],
        secret_key: &[u8],
    ) -> SchemeResult<usize>;

    /// Verify `signed_message` and copy the message into `message`, returning its length.
    fn open(
        &mut self,
        message: &mut [u8],
        signed_message: &[u8],
        context: &[u8],
        public_key: &[u8],
    ) -> SchemeResult<usize>;
}

impl<S: SignatureScheme + ?Sized> SignatureScheme for &mut S {
    fn level(&self) -> SecurityLevel {
        (**self).level()
    }

    fn keypair(
        &mut self,
        public_key: &mut [u8],
        secret_key: &mut [u8],
    ) -> SchemeResult<()> {
        (**self).keypair(public_key, secret_key)
    }

    fn sign_detached(
        &mut self,
        signature: &mut [u8],
        message: &[u8],
        context: &[u8],
        secret_key: &[u8],
    ) -> SchemeResult<usize> {
        (**self).sign_detached(signature, message, context, secret_key)
    }

    fn sign(
        &mut self,
        signed_message: &mut [u8],
        message: &[u8],
        context: &[u8],
        secret_key: &[u8],
    ) -> SchemeResult<usize> {
        (**self).sign(signed_message, message, context, secret_key)
    }

    fn open(
        &mut self,
        message: &mut [u8],
        signed_message: &[u8],
        context: &[u8],
        public_key: &[u8],
    ) -> SchemeResult<usize> {
        (**self).open(message, signed_message, context, public_key)
    }
}
