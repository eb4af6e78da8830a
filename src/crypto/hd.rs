//! BIP32 extended keys and their fixed 74-byte encoding.
//!
//! Layout shared by both key kinds:
//!
//! | bytes    | field                      |
//! |----------|----------------------------|
//! | 0        | depth                      |
//! | 1..5     | parent fingerprint         |
//! | 5..9     | child number (big endian)  |
//! | 9..41    | chain code                 |
//! | 41..74   | `0x00` + scalar, or compressed point |
//!
//! Extended keys are never mutated; every derivation returns a new value.

use crate::core::errors::KeyError;
use crate::crypto::engine::Engine;
use crate::crypto::hash::{hmac_sha512, ChainCode, Fingerprint};
use crate::crypto::key::PrivateKey;
use crate::crypto::path::DerivationPath;
use crate::crypto::pubkey::PublicKey;
use crate::security::memory_protection::LockedBytes;
use tracing::debug;

pub const EXTENDED_KEY_SIZE: usize = 74;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

fn read_header(code: &[u8; EXTENDED_KEY_SIZE]) -> (u8, Fingerprint, u32, ChainCode) {
    let mut fp = [0u8; 4];
    fp.copy_from_slice(&code[1..5]);
    let mut child = [0u8; 4];
    child.copy_from_slice(&code[5..9]);
    let mut cc = LockedBytes::new();
    cc.copy_from_slice(&code[9..41]);
    (code[0], Fingerprint(fp), u32::from_be_bytes(child), ChainCode::from_locked(cc))
}

fn write_header(
    out: &mut [u8],
    depth: u8,
    parent_fingerprint: &Fingerprint,
    child_number: u32,
    chain_code: &ChainCode,
) {
    out[0] = depth;
    out[1..5].copy_from_slice(parent_fingerprint.as_bytes());
    out[5..9].copy_from_slice(&child_number.to_be_bytes());
    out[9..41].copy_from_slice(chain_code.as_bytes());
}

fn next_depth(depth: u8) -> Result<u8, KeyError> {
    depth.checked_add(1).ok_or(KeyError::DepthOverflow(depth))
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExtendedPrivateKey {
    depth: u8,
    parent_fingerprint: Fingerprint,
    child_number: u32,
    chain_code: ChainCode,
    key: PrivateKey,
}

impl ExtendedPrivateKey {
    /// Root key from seed bytes.
    ///
    /// Fails with [`KeyError::InvalidScalar`] in the (2^-127) case where the left
    /// half of the HMAC is not a usable scalar.
    pub fn set_master(seed: &[u8]) -> Result<Self, KeyError> {
        let out = hmac_sha512(MASTER_HMAC_KEY, &[seed]);
        let key = PrivateKey::from_slice(&out[..32], true)?;
        let chain_code = ChainCode::from_slice(&out[32..])?;
        debug!("created master key from {} seed bytes", seed.len());
        Ok(Self {
            depth: 0,
            parent_fingerprint: Fingerprint::ZERO,
            child_number: 0,
            chain_code,
            key,
        })
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> Fingerprint {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    pub fn key(&self) -> &PrivateKey {
        &self.key
    }

    /// Child `child` of this key; indices with the top bit set are hardened.
    ///
    /// # Panics
    /// If the key is not valid (see [`ExtendedPrivateKey::decode`]).
    pub fn derive(&self, engine: &Engine, child: u32) -> Result<Self, KeyError> {
        let depth = next_depth(self.depth)?;
        let parent = self.key.public_key(engine);
        let (key, chain_code) = self.key.derive_child(engine, child, &self.chain_code, Some(&parent))?;
        let parent_fingerprint = parent.fingerprint();
        Ok(Self {
            depth,
            parent_fingerprint,
            child_number: child,
            chain_code,
            key,
        })
    }

    pub fn derive_path(&self, engine: &Engine, path: &DerivationPath) -> Result<Self, KeyError> {
        let mut current = self.clone();
        for &child in path.as_slice() {
            current = current.derive(engine, child)?;
        }
        Ok(current)
    }

    /// Public half of this key with the same position in the tree.
    pub fn neuter(&self, engine: &Engine) -> ExtendedPublicKey {
        ExtendedPublicKey {
            depth: self.depth,
            parent_fingerprint: self.parent_fingerprint,
            child_number: self.child_number,
            chain_code: self.chain_code.clone(),
            pubkey: self.key.public_key(engine),
        }
    }

    pub fn encode(&self) -> LockedBytes<EXTENDED_KEY_SIZE> {
        let mut out = LockedBytes::<EXTENDED_KEY_SIZE>::new();
        write_header(
            &mut out[..],
            self.depth,
            &self.parent_fingerprint,
            self.child_number,
            &self.chain_code,
        );
        out[41] = 0;
        self.key.with_secret(|s| out[42..].copy_from_slice(s));
        out
    }

    /// Inverse of [`ExtendedPrivateKey::encode`].
    ///
    /// The scalar is not range checked and byte 41 is ignored; check
    /// `key().is_valid()` before using a key decoded from untrusted input.
    pub fn decode(code: &[u8; EXTENDED_KEY_SIZE]) -> Self {
        let (depth, parent_fingerprint, child_number, chain_code) = read_header(code);
        let mut scalar = LockedBytes::<32>::new();
        scalar.copy_from_slice(&code[42..]);
        Self {
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            key: PrivateKey::from_bytes_unchecked(&scalar, true),
        }
    }

    pub fn decode_slice(code: &[u8]) -> Result<Self, KeyError> {
        let code: &[u8; EXTENDED_KEY_SIZE] = code.try_into().map_err(|_| {
            KeyError::MalformedEncoding(format!(
                "extended key must be {} bytes, got {}",
                EXTENDED_KEY_SIZE,
                code.len()
            ))
        })?;
        Ok(Self::decode(code))
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExtendedPublicKey {
    depth: u8,
    parent_fingerprint: Fingerprint,
    child_number: u32,
    chain_code: ChainCode,
    pubkey: PublicKey,
}

impl ExtendedPublicKey {
    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> Fingerprint {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.pubkey
    }

    /// Normal (non-hardened) child; hardened indices fail with
    /// [`KeyError::HardenedDerivation`].
    pub fn derive(&self, engine: &Engine, child: u32) -> Result<Self, KeyError> {
        let depth = next_depth(self.depth)?;
        let (pubkey, chain_code) = self.pubkey.derive(engine, child, &self.chain_code)?;
        Ok(Self {
            depth,
            parent_fingerprint: self.pubkey.fingerprint(),
            child_number: child,
            chain_code,
            pubkey,
        })
    }

    pub fn derive_path(&self, engine: &Engine, path: &DerivationPath) -> Result<Self, KeyError> {
        let mut current = self.clone();
        for &child in path.as_slice() {
            current = current.derive(engine, child)?;
        }
        Ok(current)
    }

    pub fn encode(&self) -> [u8; EXTENDED_KEY_SIZE] {
        let mut out = [0u8; EXTENDED_KEY_SIZE];
        write_header(
            &mut out,
            self.depth,
            &self.parent_fingerprint,
            self.child_number,
            &self.chain_code,
        );
        out[41..].copy_from_slice(self.pubkey.as_bytes());
        out
    }

    /// Inverse of [`ExtendedPublicKey::encode`]. Rejects anything but a compressed
    /// point header; the point itself is not checked against the curve.
    pub fn decode(code: &[u8; EXTENDED_KEY_SIZE]) -> Result<Self, KeyError> {
        let pubkey = PublicKey::from_slice(&code[41..])?;
        if !pubkey.is_compressed() {
            return Err(KeyError::MalformedEncoding(
                "extended public key must carry a compressed point".into(),
            ));
        }
        let (depth, parent_fingerprint, child_number, chain_code) = read_header(code);
        Ok(Self {
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            pubkey,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::path::hardened;
    use pretty_assertions::assert_eq;

    const SEED_1: &str = "000102030405060708090a0b0c0d0e0f";

    fn master() -> ExtendedPrivateKey {
        ExtendedPrivateKey::set_master(&hex::decode(SEED_1).unwrap()).unwrap()
    }

    fn secret_hex(key: &ExtendedPrivateKey) -> String {
        key.key().with_secret(|s| hex::encode(s))
    }

    #[test]
    fn test_master_from_vector_1() {
        let m = master();
        assert_eq!(m.depth(), 0);
        assert_eq!(m.child_number(), 0);
        assert_eq!(m.parent_fingerprint(), Fingerprint::ZERO);
        assert_eq!(
            secret_hex(&m),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(m.chain_code().as_bytes()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert!(m.key().is_compressed());
    }

    #[test]
    fn test_set_master_is_deterministic() {
        assert_eq!(master(), master());
        assert_ne!(master(), ExtendedPrivateKey::set_master(b"another seed").unwrap());
    }

    #[test]
    fn test_derive_vector_1_chain() {
        let engine = Engine::new();
        let m0h = master().derive(&engine, hardened(0)).unwrap();
        assert_eq!(m0h.depth(), 1);
        assert_eq!(m0h.parent_fingerprint().to_string(), "3442193e");
        assert_eq!(m0h.child_number(), 0x8000_0000);
        assert_eq!(
            secret_hex(&m0h),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );

        let m0h1 = m0h.derive(&engine, 1).unwrap();
        assert_eq!(m0h1.depth(), 2);
        assert_eq!(m0h1.parent_fingerprint().to_string(), "5c1bd648");
        assert_eq!(
            secret_hex(&m0h1),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(
            hex::encode(m0h1.chain_code().as_bytes()),
            "2a7857631386ba23dacac34180dd1983734e444fdbf774041578e9b6adb37c19"
        );
    }

    #[test]
    fn test_derive_path_matches_steps() {
        let engine = Engine::new();
        let by_path = master().derive_path(&engine, &"m/0'/1".parse().unwrap()).unwrap();
        let by_steps = master().derive(&engine, hardened(0)).unwrap().derive(&engine, 1).unwrap();
        assert_eq!(by_path, by_steps);
        assert_eq!(master().derive_path(&engine, &DerivationPath::master()).unwrap(), master());
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let engine = Engine::new();
        let m0h = master().derive(&engine, hardened(0)).unwrap();
        let via_private = m0h.derive(&engine, 1).unwrap().neuter(&engine);
        let via_public = m0h.neuter(&engine).derive(&engine, 1).unwrap();
        assert_eq!(via_public, via_private);
        assert_eq!(
            via_public.public_key().to_string(),
            "03501e454bf00751f24b1b489aa925215d66af2234e3891c3b21a52bedb3cd711c"
        );
    }

    #[test]
    fn test_public_hardened_derivation_fails() {
        let engine = Engine::new();
        let xpub = master().neuter(&engine);
        assert_eq!(
            xpub.derive(&engine, hardened(0)).unwrap_err(),
            KeyError::HardenedDerivation(0x8000_0000)
        );
    }

    #[test]
    fn test_private_codec_roundtrip() {
        let engine = Engine::new();
        let key = master().derive(&engine, hardened(0)).unwrap();
        let code = key.encode();
        assert_eq!(code[0], 1);
        assert_eq!(&code[1..5], &[0x34, 0x42, 0x19, 0x3e]);
        assert_eq!(&code[5..9], &[0x80, 0, 0, 0]);
        assert_eq!(code[41], 0);
        assert_eq!(ExtendedPrivateKey::decode(&code), key);
        assert_eq!(ExtendedPrivateKey::decode_slice(&code[..]).unwrap(), key);
    }

    #[test]
    fn test_public_codec_roundtrip() {
        let engine = Engine::new();
        let xpub = master().derive(&engine, hardened(0)).unwrap().neuter(&engine);
        let code = xpub.encode();
        assert_eq!(code[41], 0x03);
        assert_eq!(ExtendedPublicKey::decode(&code).unwrap(), xpub);
    }

    #[test]
    fn test_public_decode_rejects_bad_header() {
        let engine = Engine::new();
        let mut code = master().neuter(&engine).encode();
        code[41] = 0x04;
        assert!(matches!(
            ExtendedPublicKey::decode(&code),
            Err(KeyError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_decode_keeps_out_of_range_scalar() {
        let mut code = [0u8; EXTENDED_KEY_SIZE];
        code[42..].copy_from_slice(&secp256k1::constants::CURVE_ORDER);
        let key = ExtendedPrivateKey::decode(&code);
        assert!(!key.key().is_valid());
        assert_eq!(&key.encode()[..], &code[..]);
    }

    #[test]
    fn test_decode_slice_rejects_wrong_length() {
        assert!(ExtendedPrivateKey::decode_slice(&[0u8; 73]).is_err());
        assert!(ExtendedPrivateKey::decode_slice(&[0u8; 75]).is_err());
    }

    #[test]
    fn test_depth_overflow() {
        let engine = Engine::new();
        let mut code = master().encode();
        code[0] = u8::MAX;
        let deep = ExtendedPrivateKey::decode(&code);
        assert_eq!(deep.derive(&engine, 0).unwrap_err(), KeyError::DepthOverflow(255));
        assert_eq!(
            deep.neuter(&engine).derive(&engine, 0).unwrap_err(),
            KeyError::DepthOverflow(255)
        );
    }
}
