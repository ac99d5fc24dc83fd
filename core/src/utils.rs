use std::fmt;

use rand::RngCore;

use crate::params::MessageSource;

/// Fill the benchmark message according to `source`.
pub fn fill_message<R: RngCore + ?Sized>(
    message: &mut [u8],
    source: MessageSource,
    rng: &mut R,
) {
    match source {
        MessageSource::Random => rng.fill_bytes(message),
        MessageSource::Zeroed => message.fill(0),
    }
}

/// Printable form of a context tag: ASCII as-is, other bytes escaped.
pub struct ContextDisplay<'a>(pub &'a [u8]);

impl fmt::Display for ContextDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" (len={})", self.0.escape_ascii(), self.0.len())
    }
}
