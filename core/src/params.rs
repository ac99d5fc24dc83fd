use std::fmt;

use fips204::{ml_dsa_44, ml_dsa_65, ml_dsa_87};

#[cfg(not(any(feature = "level2", feature = "level3", feature = "level5")))]
compile_error!(
    "Enable at least one Dilithium security level feature: level2, level3, or level5."
);

#[cfg(any(
    all(feature = "level2", feature = "level3"),
    all(feature = "level2", feature = "level5"),
    all(feature = "level3", feature = "level5"),
))]
compile_error!(
    "Multiple Dilithium security level features enabled. Select exactly one of level2, level3, or level5."
);

#[cfg(feature = "level2")]
const ACTIVE_SECURITY_LEVEL: SecurityLevel = SecurityLevel::Level2;
#[cfg(feature = "level3")]
const ACTIVE_SECURITY_LEVEL: SecurityLevel = SecurityLevel::Level3;
#[cfg(feature = "level5")]
const ACTIVE_SECURITY_LEVEL: SecurityLevel = SecurityLevel::Level5;

/// Security level benchmarked by the binary (selected via Cargo feature).
pub const BUILD_SECURITY_LEVEL: SecurityLevel = ACTIVE_SECURITY_LEVEL;

/// Iteration count used when `DILITHIUM_BENCH_ITERATIONS` is not set at build time.
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Iterations per timed phase, fixed at build time.
pub const BUILD_ITERATIONS: usize =
    match option_env!("DILITHIUM_BENCH_ITERATIONS") {
        Some(value) => parse_iterations(value),
        None => DEFAULT_ITERATIONS,
    };

/// Length of the benchmarked message.
pub const MESSAGE_BYTES: usize = 100;

/// Context tag bound into every sign and open call.
pub const DEFAULT_CONTEXT: &[u8] = b"dilithium-bench";

/// Untimed key generations before the keygen phase.
pub const KEYGEN_WARMUP_ROUNDS: usize = 5;

/// Untimed calls before the signing and verification phases.
pub const WARMUP_ROUNDS: usize = 1;

/// Supported Dilithium security levels as defined in FIPS 204.
pub const SUPPORTED_SECURITY_LEVELS: [SecurityLevel; 3] = [
    SecurityLevel::Level2,
    SecurityLevel::Level3,
    SecurityLevel::Level5,
];

/// Enumerates the supported ML-DSA / Dilithium security levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SecurityLevel {
    Level2,
    Level3,
    Level5,
}

impl SecurityLevel {
    /// Return the numeric identifier used by the Dilithium round-3 submission.
    #[inline]
    pub const fn as_usize(self) -> usize {
        match self {
            SecurityLevel::Level2 => 2,
            SecurityLevel::Level3 => 3,
            SecurityLevel::Level5 => 5,
        }
    }

    /// FIPS 204 parameter set name.
    pub const fn name(self) -> &'static str {
        match self {
            SecurityLevel::Level2 => "ML-DSA-44",
            SecurityLevel::Level3 => "ML-DSA-65",
            SecurityLevel::Level5 => "ML-DSA-87",
        }
    }

    /// Declared key and signature sizes for this level.
    #[inline]
    pub const fn sizes(self) -> SchemeSizes {
        match self {
            SecurityLevel::Level2 => SchemeSizes::new(
                ml_dsa_44::PK_LEN,
                ml_dsa_44::SK_LEN,
                ml_dsa_44::SIG_LEN,
            ),
            SecurityLevel::Level3 => SchemeSizes::new(
                ml_dsa_65::PK_LEN,
                ml_dsa_65::SK_LEN,
                ml_dsa_65::SIG_LEN,
            ),
            SecurityLevel::Level5 => SchemeSizes::new(
                ml_dsa_87::PK_LEN,
                ml_dsa_87::SK_LEN,
                ml_dsa_87::SIG_LEN,
            ),
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Dilithium{})", self.name(), self.as_usize())
    }
}

impl TryFrom<usize> for SecurityLevel {
    type Error = InvalidSecurityLevel;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        SUPPORTED_SECURITY_LEVELS
            .into_iter()
            .find(|level| level.as_usize() == value)
            .ok_or(InvalidSecurityLevel(value))
    }
}

/// Error raised when an unsupported security level is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSecurityLevel(pub usize);

impl fmt::Display for InvalidSecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported Dilithium security level {}", self.0)
    }
}

impl std::error::Error for InvalidSecurityLevel {}

/// Maximum output sizes declared by a parameter set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemeSizes {
    pub public_key: usize,
    pub secret_key: usize,
    pub signature: usize,
}

impl SchemeSizes {
    pub const fn new(public_key: usize, secret_key: usize, signature: usize) -> Self {
        Self {
            public_key,
            secret_key,
            signature,
        }
    }

    /// Capacity of a combined `signature || message` buffer.
    pub const fn signed_message(&self, message_len: usize) -> usize {
        self.signature + message_len
    }
}

/// Runtime view of the harness configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    pub level: SecurityLevel,
    pub iterations: usize,
    pub context: Vec<u8>,
    pub message: MessageSource,
}

/// How the benchmarked message is filled during `Init`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MessageSource {
    #[default]
    Random,
    Zeroed,
}

impl HarnessConfig {
    /// Configuration fixed at build time by features and environment.
    pub fn from_build() -> Self {
        Self::new(BUILD_SECURITY_LEVEL, BUILD_ITERATIONS)
    }

    /// Configuration with the default context tag and a random message.
    pub fn new(level: SecurityLevel, iterations: usize) -> Self {
        debug_assert!(iterations > 0, "iteration count must be non-zero");
        Self {
            level,
            iterations,
            context: DEFAULT_CONTEXT.to_vec(),
            message: MessageSource::Random,
        }
    }

    pub fn with_context(mut self, context: impl Into<Vec<u8>>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_message(mut self, message: MessageSource) -> Self {
        self.message = message;
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::from_build()
    }
}

/// Parse a decimal iteration count in const context; bad input fails the build.
const fn parse_iterations(value: &str) -> usize {
    let bytes = value.as_bytes();
    if bytes.is_empty() {
        panic!("DILITHIUM_BENCH_ITERATIONS is empty");
    }
    let mut acc: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        if !digit.is_ascii_digit() {
            panic!("DILITHIUM_BENCH_ITERATIONS must be a decimal integer");
        }
        acc = match acc.checked_mul(10) {
            Some(shifted) => match shifted.checked_add((digit - b'0') as usize) {
                Some(next) => next,
                None => panic!("DILITHIUM_BENCH_ITERATIONS overflows usize"),
            },
            None => panic!("DILITHIUM_BENCH_ITERATIONS overflows usize"),
        };
        i += 1;
    }
    if acc == 0 {
        panic!("DILITHIUM_BENCH_ITERATIONS must be non-zero");
    }
    acc
}
