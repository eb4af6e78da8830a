//! secp256k1 private keys.
//!
//! The 32 scalar bytes live in a [`LockedBytes`] buffer for the whole lifetime of a
//! [`PrivateKey`] and are wiped when it is dropped. Signing uses RFC 6979 nonces, so
//! the same key and hash always produce the same signature.

use crate::core::errors::KeyError;
use crate::crypto::der::{decode_private_key, encode_private_key};
use crate::crypto::engine::Engine;
use crate::crypto::hash::{bip32_hash, ChainCode, Hash256Writer};
use crate::crypto::path::is_hardened;
use crate::crypto::pubkey::PublicKey;
use crate::crypto::random::{RandomSource, RetryPolicy};
use crate::crypto::signature_utils::{
    compact_header, is_low_s_der, COMPACT_SIGNATURE_SIZE, MAX_DER_SIGNATURE_SIZE,
};
use crate::security::memory_protection::LockedBytes;
use secp256k1::constants::CURVE_ORDER;
use secp256k1::{Message, Scalar, SecretKey};
use secrecy::SecretVec;
use std::fmt;
use tracing::{debug, warn};
use zeroize::Zeroizing;

pub const PRIVATE_KEY_SIZE: usize = 32;

const VERIFY_LABEL: &[u8] = b"Bitcoin key verification\n";

#[derive(Clone)]
pub struct PrivateKey {
    secret: LockedBytes<PRIVATE_KEY_SIZE>,
    compressed: bool,
    valid: bool,
}

impl PrivateKey {
    /// True when `bytes` is a 32-byte big-endian integer in `1..n`.
    pub fn check(bytes: &[u8]) -> bool {
        bytes.len() == PRIVATE_KEY_SIZE
            && bytes.iter().any(|&b| b != 0)
            && bytes < &CURVE_ORDER[..]
    }

    /// Draw a fresh key from `rng`, redrawing out-of-range candidates.
    ///
    /// A failing random source aborts at once; running out of attempts yields
    /// [`KeyError::RetryExhausted`].
    pub fn generate<R: RandomSource + ?Sized>(
        rng: &mut R,
        policy: &RetryPolicy,
        compressed: bool,
    ) -> Result<Self, KeyError> {
        let mut secret = LockedBytes::<PRIVATE_KEY_SIZE>::new();
        policy.run(|attempt| {
            rng.fill(&mut secret[..])?;
            if Self::check(&secret[..]) {
                Ok(Some(()))
            } else {
                debug!("random candidate {} out of range, drawing again", attempt);
                Ok(None)
            }
        })?;
        Ok(Self { secret, compressed, valid: true })
    }

    /// Raw 32-byte scalar import.
    pub fn from_slice(bytes: &[u8], compressed: bool) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(KeyError::MalformedEncoding(format!(
                "private key must be {} bytes, got {}",
                PRIVATE_KEY_SIZE,
                bytes.len()
            )));
        }
        if !Self::check(bytes) {
            return Err(KeyError::InvalidScalar("scalar outside 1..n".into()));
        }
        let mut secret = LockedBytes::new();
        secret.copy_from_slice(bytes);
        Ok(Self { secret, compressed, valid: true })
    }

    /// Build a key without rejecting out-of-range bytes; `is_valid` reports the result.
    pub(crate) fn from_bytes_unchecked(bytes: &[u8; PRIVATE_KEY_SIZE], compressed: bool) -> Self {
        let mut secret = LockedBytes::new();
        secret.copy_from_slice(bytes);
        let valid = Self::check(&secret[..]);
        Self { secret, compressed, valid }
    }

    /// Parse a DER `ECPrivateKey` as produced by [`PrivateKey::export`].
    pub fn import(der: &[u8], compressed: bool) -> Result<Self, KeyError> {
        let scalar = decode_private_key(der)?;
        Self::from_slice(&scalar[..], compressed).map_err(|e| {
            warn!("rejected imported private key: {}", e);
            e
        })
    }

    /// Import a stored key and confirm it matches the stored public key.
    ///
    /// The compression flag is taken from `pubkey`. With `skip_check` the pair is
    /// trusted as-is.
    pub fn load<R: RandomSource + ?Sized>(
        engine: &Engine,
        rng: &mut R,
        der: &[u8],
        pubkey: &PublicKey,
        skip_check: bool,
    ) -> Result<Self, KeyError> {
        let key = Self::import(der, pubkey.is_compressed())?;
        if skip_check {
            return Ok(key);
        }
        if !key.verify_pubkey(engine, rng, pubkey)? {
            return Err(KeyError::KeyMismatch(format!(
                "stored private key does not match public key {}",
                pubkey
            )));
        }
        Ok(key)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Scoped read access to the raw scalar.
    pub fn with_secret<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&[u8; PRIVATE_KEY_SIZE]) -> T,
    {
        f(&*self.secret)
    }

    /// Run `f` against a transient `SecretKey`, erased again before returning.
    fn with_secret_key<T, F>(&self, f: F) -> Result<T, KeyError>
    where
        F: FnOnce(&SecretKey) -> Result<T, KeyError>,
    {
        if !self.valid {
            return Err(KeyError::InvalidKey("private key is not valid".into()));
        }
        let mut sk = SecretKey::from_slice(&self.secret[..])?;
        let result = f(&sk);
        sk.non_secure_erase();
        result
    }

    /// DER `ECPrivateKey` with explicit curve parameters.
    ///
    /// # Panics
    /// If the key is not valid.
    pub fn export(&self, engine: &Engine) -> SecretVec<u8> {
        assert!(self.valid, "export called on an invalid private key");
        let pubkey = self.public_key(engine);
        let mut der = encode_private_key(&self.secret, pubkey.as_bytes());
        SecretVec::new(std::mem::take(&mut *der))
    }

    /// # Panics
    /// If the key is not valid.
    pub fn public_key(&self, engine: &Engine) -> PublicKey {
        assert!(self.valid, "public_key called on an invalid private key");
        let pk = self.with_secret_key(|sk| Ok(secp256k1::PublicKey::from_secret_key(engine.secp(), sk)));
        match pk {
            Ok(pk) => PublicKey::from_secp(&pk, self.compressed),
            Err(e) => panic!("valid scalar rejected by secp256k1: {}", e),
        }
    }

    /// Low-S DER signature over `hash`.
    pub fn sign(&self, engine: &Engine, hash: &[u8; 32]) -> Result<Vec<u8>, KeyError> {
        let msg = Message::from_slice(hash)?;
        let der = self.with_secret_key(|sk| Ok(engine.secp().sign_ecdsa(&msg, sk).serialize_der().to_vec()))?;
        debug_assert!(der.len() <= MAX_DER_SIGNATURE_SIZE);
        debug_assert!(is_low_s_der(&der));
        Ok(der)
    }

    /// 65-byte recoverable signature: header, r, s.
    pub fn sign_compact(
        &self,
        engine: &Engine,
        hash: &[u8; 32],
    ) -> Result<[u8; COMPACT_SIGNATURE_SIZE], KeyError> {
        let msg = Message::from_slice(hash)?;
        let (recid, rs) = self.with_secret_key(|sk| {
            Ok(engine.secp().sign_ecdsa_recoverable(&msg, sk).serialize_compact())
        })?;
        let mut out = [0u8; COMPACT_SIGNATURE_SIZE];
        out[0] = compact_header(recid, self.compressed);
        out[1..].copy_from_slice(&rs);
        Ok(out)
    }

    /// Sign a random challenge and check it against `pubkey`.
    ///
    /// A compression mismatch is rejected without signing anything.
    pub fn verify_pubkey<R: RandomSource + ?Sized>(
        &self,
        engine: &Engine,
        rng: &mut R,
        pubkey: &PublicKey,
    ) -> Result<bool, KeyError> {
        if pubkey.is_compressed() != self.compressed {
            return Ok(false);
        }
        let mut nonce = [0u8; 8];
        rng.fill(&mut nonce)?;
        let hash = Hash256Writer::new().write(VERIFY_LABEL).write(&nonce).finalize();
        let sig = self.sign(engine, &hash)?;
        Ok(pubkey.verify(engine, &hash, &sig))
    }

    /// BIP32 private child derivation.
    ///
    /// # Panics
    /// If the key is not valid or not compressed.
    pub fn derive(
        &self,
        engine: &Engine,
        child: u32,
        chain_code: &ChainCode,
    ) -> Result<(PrivateKey, ChainCode), KeyError> {
        assert!(self.valid, "derive called on an invalid private key");
        if is_hardened(child) {
            self.derive_child(engine, child, chain_code, None)
        } else {
            let pubkey = self.public_key(engine);
            self.derive_child(engine, child, chain_code, Some(&pubkey))
        }
    }

    /// [`PrivateKey::derive`] reusing an already computed public key for normal children.
    pub(crate) fn derive_child(
        &self,
        engine: &Engine,
        child: u32,
        chain_code: &ChainCode,
        pubkey: Option<&PublicKey>,
    ) -> Result<(PrivateKey, ChainCode), KeyError> {
        assert!(self.valid, "derive called on an invalid private key");
        assert!(self.compressed, "BIP32 derivation needs a compressed key");

        let out = if is_hardened(child) {
            bip32_hash(chain_code, child, 0, &self.secret)
        } else {
            let own;
            let pubkey = match pubkey {
                Some(pk) => pk,
                None => {
                    own = self.public_key(engine);
                    &own
                }
            };
            let bytes = pubkey.as_bytes();
            let mut body = [0u8; 32];
            body.copy_from_slice(&bytes[1..]);
            bip32_hash(chain_code, child, bytes[0], &body)
        };

        let mut tweak_bytes = Zeroizing::new([0u8; 32]);
        tweak_bytes.copy_from_slice(&out[..32]);
        let mut tweak = Scalar::from_be_bytes(*tweak_bytes).map_err(|_| {
            KeyError::EngineFailure(format!("tweak for child {:#010x} out of range", child))
        })?;
        let derived = self.with_secret_key(|sk| {
            let mut derived = sk.add_tweak(&tweak)?;
            let bytes = Zeroizing::new(derived.secret_bytes());
            derived.non_secure_erase();
            let mut secret = LockedBytes::<PRIVATE_KEY_SIZE>::new();
            secret.copy_from_slice(&bytes[..]);
            Ok(secret)
        });
        tweak.non_secure_erase();
        let secret = derived?;

        let child_cc = ChainCode::from_slice(&out[32..])?;
        debug!("derived private child {:#010x}", child);
        Ok((PrivateKey { secret, compressed: true, valid: true }, child_cc))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.compressed == other.compressed && self.valid == other.valid && self.secret == other.secret
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("secret", &self.secret)
            .field("compressed", &self.compressed)
            .field("valid", &self.valid)
            .finish()
    }
}
