//! Hash primitives: SHA-256d, Hash160, and the BIP32 HMAC-SHA512 step.

use crate::core::errors::KeyError;
use crate::security::memory_protection::LockedBytes;
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

/// Length of a BIP32 chain code.
pub const CHAIN_CODE_SIZE: usize = 32;

/// RIPEMD160(SHA256(data)).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    Ripemd160::digest(sha).into()
}

/// SHA256(SHA256(data)).
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// Incremental SHA-256d, for hashing several pieces without concatenating them.
#[derive(Clone, Default)]
pub struct Hash256Writer {
    inner: Sha256,
}

impl Hash256Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(mut self, data: &[u8]) -> Self {
        self.inner.update(data);
        self
    }

    pub fn finalize(self) -> [u8; 32] {
        Sha256::digest(self.inner.finalize()).into()
    }
}

/// Hash160 of a serialized public key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(pub [u8; 20]);

impl KeyId {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let mut fp = [0u8; 4];
        fp.copy_from_slice(&self.0[..4]);
        Fingerprint(fp)
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", hex::encode(self.0))
    }
}

/// First four bytes of a parent key's [`KeyId`].
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(pub [u8; 4]);

impl Fingerprint {
    pub const ZERO: Fingerprint = Fingerprint([0u8; 4]);

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(self.0))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// 32 bytes of derivation entropy carried next to every extended key.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ChainCode(LockedBytes<CHAIN_CODE_SIZE>);

impl ChainCode {
    pub fn from_bytes(bytes: &[u8; CHAIN_CODE_SIZE]) -> Self {
        let mut inner = LockedBytes::new();
        inner.copy_from_slice(bytes);
        Self(inner)
    }

    pub(crate) fn from_locked(bytes: LockedBytes<CHAIN_CODE_SIZE>) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        LockedBytes::from_slice(bytes).map(Self).ok_or_else(|| {
            KeyError::MalformedEncoding(format!(
                "chain code must be {} bytes, got {}",
                CHAIN_CODE_SIZE,
                bytes.len()
            ))
        })
    }

    pub fn as_bytes(&self) -> &[u8; CHAIN_CODE_SIZE] {
        &self.0
    }
}

/// HMAC-SHA512 keyed by `key` over the concatenation of `parts`, written into a locked buffer.
pub(crate) fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> LockedBytes<64> {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = <HmacSha512 as Mac>::new_from_slice(key)
        .unwrap_or_else(|_| unreachable!("HMAC-SHA512 accepts keys of any length"));
    for part in parts {
        mac.update(part);
    }
    let mut tag = mac.finalize_reset().into_bytes();
    // SAFETY: the HMAC state is plain integer arrays and counters with no heap
    // pointers or `Drop` impl, so the all-zero pattern is a valid value.
    unsafe { zeroize::zeroize_flat_type(&mut mac) };
    let mut out = LockedBytes::<64>::new();
    out.copy_from_slice(&tag);
    tag.as_mut_slice().zeroize();
    out
}

/// BIP32 child hash: HMAC-SHA512(chain code, header ‖ data32 ‖ BE(child)).
///
/// `header` is the first byte of a compressed public key for normal children, or
/// `0x00` ahead of the private scalar for hardened ones.
pub(crate) fn bip32_hash(
    chain_code: &ChainCode,
    child: u32,
    header: u8,
    data: &[u8; 32],
) -> LockedBytes<64> {
    let mut input = LockedBytes::<37>::new();
    input[0] = header;
    input[1..33].copy_from_slice(data);
    input[33..].copy_from_slice(&child.to_be_bytes());
    hmac_sha512(chain_code.as_bytes(), &[&input[..]])
}
