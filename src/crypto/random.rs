//! Secure random source seam and the bounded retry loop used by key generation.

use crate::core::errors::KeyError;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Anything that can fill a buffer with cryptographically secure bytes.
///
/// Every `RngCore + CryptoRng` qualifies, so `OsRng` works directly and tests can
/// inject a seeded `StdRng` or a mock that fails on purpose.
pub trait RandomSource {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), KeyError>;
}

impl<R: RngCore + CryptoRng> RandomSource for R {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), KeyError> {
        self.try_fill_bytes(dest)
            .map_err(|e| KeyError::RandomSource(e.to_string()))
    }
}

/// The operating system's generator.
pub fn os_random() -> OsRng {
    OsRng
}

/// How many times a candidate may be redrawn before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "RetryPolicy::default_max_attempts")]
    pub max_attempts: u32,
}

impl RetryPolicy {
    fn default_max_attempts() -> u32 {
        // P(random 32 bytes >= n) is about 2^-128; 128 misses in a row means a broken source.
        128
    }

    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts: max_attempts.max(1) }
    }

    /// Run `attempt` until it yields `Some`, an error, or the budget runs out.
    ///
    /// The closure receives the zero-based attempt number. `Ok(None)` means
    /// "rejected, draw again"; `Err` aborts without further attempts.
    pub fn run<T, F>(&self, mut attempt: F) -> Result<T, KeyError>
    where
        F: FnMut(u32) -> Result<Option<T>, KeyError>,
    {
        let max = self.max_attempts.max(1);
        for n in 0..max {
            if let Some(value) = attempt(n)? {
                return Ok(value);
            }
        }
        warn!("retry budget of {} attempts exhausted", max);
        Err(KeyError::RetryExhausted { attempts: max })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: Self::default_max_attempts() }
    }
}
