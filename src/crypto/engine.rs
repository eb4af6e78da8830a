//! Shared handle to the secp256k1 context.
//!
//! One `Engine` is built when the hosting process starts and handed by reference to
//! every key operation. Signing and verification only read the context, so a single
//! handle (or clones of it) can be used from many threads at once.

use crate::core::errors::KeyError;
use crate::crypto::random::RandomSource;
use crate::security::memory_protection::LockedBytes;
use secp256k1::{All, Secp256k1};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Engine {
    secp: Arc<Secp256k1<All>>,
}

impl Engine {
    /// Context capable of signing and verification, without blinding.
    pub fn new() -> Self {
        Self { secp: Arc::new(Secp256k1::new()) }
    }

    /// Context with side-channel blinding seeded from `rng`.
    pub fn randomized<R: RandomSource + ?Sized>(rng: &mut R) -> Result<Self, KeyError> {
        let mut secp = Secp256k1::new();
        let mut seed = LockedBytes::<32>::new();
        rng.fill(&mut seed[..])?;
        secp.seeded_randomize(&seed);
        debug!("secp256k1 context randomized");
        Ok(Self { secp: Arc::new(secp) })
    }

    pub fn secp(&self) -> &Secp256k1<All> {
        &self.secp
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_shareable() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_randomized_engine_builds() {
        let mut rng = StdRng::seed_from_u64(1);
        let engine = Engine::randomized(&mut rng).unwrap();
        let sk = secp256k1::SecretKey::from_slice(&[1u8; 32]).unwrap();
        let a = secp256k1::PublicKey::from_secret_key(engine.secp(), &sk);
        let b = secp256k1::PublicKey::from_secret_key(Engine::new().secp(), &sk);
        assert_eq!(a, b);
    }
}
