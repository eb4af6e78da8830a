//! Start-up self test of the key stack.

use crate::crypto::engine::Engine;
use crate::crypto::key::PrivateKey;
use crate::crypto::random::{RandomSource, RetryPolicy};
use tracing::{error, info};

/// Generate a key, derive its public key and check that the pair signs and verifies.
///
/// Hosting processes must refuse to start when this returns `false`.
pub fn sanity_check<R: RandomSource + ?Sized>(engine: &Engine, rng: &mut R) -> bool {
    let key = match PrivateKey::generate(rng, &RetryPolicy::default(), true) {
        Ok(key) => key,
        Err(e) => {
            error!("sanity check: key generation failed: {}", e);
            return false;
        }
    };
    let pubkey = key.public_key(engine);
    match key.verify_pubkey(engine, rng, &pubkey) {
        Ok(true) => {
            info!("secp256k1 sanity check passed");
            true
        }
        Ok(false) => {
            error!("sanity check: generated key does not verify against its public key");
            false
        }
        Err(e) => {
            error!("sanity check: {}", e);
            false
        }
    }
}
