//! Serialized secp256k1 public keys.

use crate::core::errors::KeyError;
use crate::crypto::engine::Engine;
use crate::crypto::hash::{bip32_hash, hash160, ChainCode, Fingerprint, KeyId};
use crate::crypto::signature_utils::{
    parse_compact_header, parse_der_normalized, COMPACT_SIGNATURE_SIZE,
};
use secp256k1::ecdsa::RecoverableSignature;
use secp256k1::{Message, Scalar};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;

pub const PUBLIC_KEY_SIZE: usize = 65;
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;

/// Size implied by a serialized key's first byte, or 0 for an unknown header.
fn len_for_header(header: u8) -> usize {
    match header {
        2 | 3 => COMPRESSED_PUBLIC_KEY_SIZE,
        4 | 6 | 7 => PUBLIC_KEY_SIZE,
        _ => 0,
    }
}

/// A compressed (33-byte) or uncompressed (65-byte) point.
///
/// Construction only checks that the length matches the header byte; use
/// [`PublicKey::is_fully_valid`] to check that the bytes are really on the curve.
#[derive(Clone, Copy)]
pub struct PublicKey {
    data: [u8; PUBLIC_KEY_SIZE],
}

impl PublicKey {
    fn invalid() -> Self {
        let mut data = [0u8; PUBLIC_KEY_SIZE];
        data[0] = 0xFF;
        Self { data }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let expected = bytes.first().map(|&h| len_for_header(h)).unwrap_or(0);
        if expected == 0 || bytes.len() != expected {
            return Err(KeyError::MalformedEncoding(format!(
                "public key of {} bytes does not match its header",
                bytes.len()
            )));
        }
        let mut data = [0u8; PUBLIC_KEY_SIZE];
        data[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { data })
    }

    pub(crate) fn from_secp(pk: &secp256k1::PublicKey, compressed: bool) -> Self {
        let mut data = [0u8; PUBLIC_KEY_SIZE];
        if compressed {
            data[..COMPRESSED_PUBLIC_KEY_SIZE].copy_from_slice(&pk.serialize());
        } else {
            data.copy_from_slice(&pk.serialize_uncompressed());
        }
        Self { data }
    }

    pub(crate) fn to_secp(&self) -> Result<secp256k1::PublicKey, KeyError> {
        if !self.is_valid() {
            return Err(KeyError::MalformedEncoding("public key header is invalid".into()));
        }
        Ok(secp256k1::PublicKey::from_slice(self.as_bytes())?)
    }

    pub fn len(&self) -> usize {
        len_for_header(self.data[0])
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Size-class check only.
    pub fn is_valid(&self) -> bool {
        self.len() > 0
    }

    /// Full check that the bytes describe a point on the curve.
    pub fn is_fully_valid(&self) -> bool {
        self.to_secp().is_ok()
    }

    pub fn is_compressed(&self) -> bool {
        self.len() == COMPRESSED_PUBLIC_KEY_SIZE
    }

    /// Hash160 of the serialized bytes.
    pub fn id(&self) -> KeyId {
        KeyId(hash160(self.as_bytes()))
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.id().fingerprint()
    }

    /// Check a DER signature over `hash`. Any malformed input yields `false`.
    pub fn verify(&self, engine: &Engine, hash: &[u8; 32], der_sig: &[u8]) -> bool {
        let Ok(pk) = self.to_secp() else {
            return false;
        };
        let Some(sig) = parse_der_normalized(der_sig) else {
            return false;
        };
        let Ok(msg) = Message::from_slice(hash) else {
            return false;
        };
        engine.secp().verify_ecdsa(&msg, &sig, &pk).is_ok()
    }

    /// Recover the signer of `hash` from a 65-byte compact signature.
    pub fn recover_compact(engine: &Engine, hash: &[u8; 32], sig: &[u8]) -> Result<Self, KeyError> {
        if sig.len() != COMPACT_SIGNATURE_SIZE {
            return Err(KeyError::MalformedEncoding(format!(
                "compact signature must be {} bytes, got {}",
                COMPACT_SIGNATURE_SIZE,
                sig.len()
            )));
        }
        let (recid, compressed) = parse_compact_header(sig[0]).ok_or_else(|| {
            KeyError::MalformedEncoding(format!("compact header {} out of range", sig[0]))
        })?;
        let rsig = RecoverableSignature::from_compact(&sig[1..], recid)?;
        let msg = Message::from_slice(hash)?;
        let pk = engine.secp().recover_ecdsa(&msg, &rsig)?;
        Ok(Self::from_secp(&pk, compressed))
    }

    /// Uncompressed form of the same point.
    pub fn decompress(&self) -> Result<Self, KeyError> {
        let pk = self.to_secp()?;
        Ok(Self::from_secp(&pk, false))
    }

    /// BIP32 public child derivation (normal indices only).
    ///
    /// Applies `tweak·G` to this point, which matches deriving the private child and
    /// taking its public key.
    pub fn derive(
        &self,
        engine: &Engine,
        child: u32,
        chain_code: &ChainCode,
    ) -> Result<(PublicKey, ChainCode), KeyError> {
        if child >> 31 != 0 {
            return Err(KeyError::HardenedDerivation(child));
        }
        if !self.is_compressed() {
            return Err(KeyError::MalformedEncoding(
                "public derivation needs a compressed key".into(),
            ));
        }
        let mut body = [0u8; 32];
        body.copy_from_slice(&self.data[1..COMPRESSED_PUBLIC_KEY_SIZE]);
        let out = bip32_hash(chain_code, child, self.data[0], &body);

        let mut tweak_bytes = [0u8; 32];
        tweak_bytes.copy_from_slice(&out[..32]);
        let tweak = Scalar::from_be_bytes(tweak_bytes)
            .map_err(|_| KeyError::EngineFailure(format!("tweak for child {} out of range", child)))?;
        let parent = self.to_secp()?;
        let derived = parent.add_exp_tweak(engine.secp(), &tweak)?;
        let child_cc = ChainCode::from_slice(&out[32..])?;
        debug!("derived public child {}", child);
        Ok((Self::from_secp(&derived, true), child_cc))
    }
}

impl Default for PublicKey {
    fn default() -> Self {
        Self::invalid()
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for PublicKey {}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.as_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_bytes()))
    }
}
