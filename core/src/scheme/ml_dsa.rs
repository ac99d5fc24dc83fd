//! FIPS 204 (ML-DSA) parameter sets backed by the `fips204` crate.
//!
//! The combined format follows the Dilithium reference: `signature || message`.

use fips204::traits::{SerDes, Signer, Verifier};
use fips204::{ml_dsa_44, ml_dsa_65, ml_dsa_87};

use crate::error::{SchemeError, SchemeResult};
use crate::params::SecurityLevel;
use crate::scheme::SignatureScheme;

/// Copy `src` into the front of `dst`, failing if `dst` is too short.
fn write_prefix(dst: &mut [u8], src: &[u8]) -> SchemeResult<usize> {
    let available = dst.len();
    let slot = dst.get_mut(..src.len()).ok_or(SchemeError::BufferTooSmall {
        needed: src.len(),
        available,
    })?;
    slot.copy_from_slice(src);
    Ok(src.len())
}

/// View `input` as a fixed-size array of exactly `N` bytes.
fn exact<const N: usize>(input: &[u8]) -> SchemeResult<[u8; N]> {
    input.try_into().map_err(|_| SchemeError::InvalidLength {
        expected: N,
        found: input.len(),
    })
}

macro_rules! ml_dsa_scheme {
    ($(#[$doc:meta])* $name:ident, $module:ident, $level:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl $name {
            fn signature_for(
                message: &[u8],
                context: &[u8],
                secret_key: &[u8],
            ) -> SchemeResult<[u8; $module::SIG_LEN]> {
                let secret_key = $module::PrivateKey::try_from_bytes(
                    exact::<{ $module::SK_LEN }>(secret_key)?,
                )
                .map_err(SchemeError::Primitive)?;
                secret_key
                    .try_sign(message, context)
                    .map_err(SchemeError::Primitive)
            }
        }

        impl SignatureScheme for $name {
            fn level(&self) -> SecurityLevel {
                $level
            }

            fn keypair(
                &mut self,
                public_key: &mut [u8],
                secret_key: &mut [u8],
            ) -> SchemeResult<()> {
                let (pk, sk) =
                    $module::try_keygen().map_err(SchemeError::Primitive)?;
                write_prefix(public_key, &pk.into_bytes())?;
                write_prefix(secret_key, &sk.into_bytes())?;
                Ok(())
            }

            fn sign_detached(
                &mut self,
                signature: &mut [u8],
                message: &[u8],
                context: &[u8],
                secret_key: &[u8],
            ) -> SchemeResult<usize> {
                let sig = Self::signature_for(message, context, secret_key)?;
                write_prefix(signature, &sig)
            }

            fn sign(
                &mut self,
                signed_message: &mut [u8],
                message: &[u8],
                context: &[u8],
                secret_key: &[u8],
            ) -> SchemeResult<usize> {
                let needed = $module::SIG_LEN + message.len();
                if signed_message.len() < needed {
                    return Err(SchemeError::BufferTooSmall {
                        needed,
                        available: signed_message.len(),
                    });
                }
                let sig = Self::signature_for(message, context, secret_key)?;
                let (head, tail) = signed_message.split_at_mut($module::SIG_LEN);
                head.copy_from_slice(&sig);
                tail[..message.len()].copy_from_slice(message);
                Ok(needed)
            }

            fn open(
                &mut self,
                message: &mut [u8],
                signed_message: &[u8],
                context: &[u8],
                public_key: &[u8],
            ) -> SchemeResult<usize> {
                if signed_message.len() < $module::SIG_LEN {
                    return Err(SchemeError::Truncated {
                        len: signed_message.len(),
                        min: $module::SIG_LEN,
                    });
                }
                let (sig, body) = signed_message.split_at($module::SIG_LEN);
                let sig = exact::<{ $module::SIG_LEN }>(sig)?;
                let public_key = $module::PublicKey::try_from_bytes(
                    exact::<{ $module::PK_LEN }>(public_key)?,
                )
                .map_err(SchemeError::Primitive)?;

                if !public_key.verify(body, &sig, context) {
                    return Err(SchemeError::VerificationFailed);
                }
                write_prefix(message, body)
            }
        }
    };
}

ml_dsa_scheme!(
    /// ML-DSA-44 (Dilithium2).
    MlDsa44,
    ml_dsa_44,
    SecurityLevel::Level2
);
ml_dsa_scheme!(
    /// ML-DSA-65 (Dilithium3).
    MlDsa65,
    ml_dsa_65,
    SecurityLevel::Level3
);
ml_dsa_scheme!(
    /// ML-DSA-87 (Dilithium5).
    MlDsa87,
    ml_dsa_87,
    SecurityLevel::Level5
);
