//! Property-based tests over keys, signatures and extended keys.

use ion_keys::{
    hardened, Engine, ExtendedPrivateKey, ExtendedPublicKey, PrivateKey, PublicKey,
};
use proptest::prelude::*;

fn valid_scalar() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>().prop_filter("scalar in 1..n", |b| PrivateKey::check(b))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn property_public_key_is_deterministic(scalar in valid_scalar(), compressed in any::<bool>()) {
        let engine = Engine::new();
        let key = PrivateKey::from_slice(&scalar, compressed).unwrap();
        let a = key.public_key(&engine);
        let b = key.public_key(&engine);
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.len(), if compressed { 33 } else { 65 });
        prop_assert!(a.is_fully_valid());
    }

    #[test]
    fn property_sign_then_verify(scalar in valid_scalar(), hash in any::<[u8; 32]>()) {
        let engine = Engine::new();
        let key = PrivateKey::from_slice(&scalar, true).unwrap();
        let sig = key.sign(&engine, &hash).unwrap();
        prop_assert!(key.public_key(&engine).verify(&engine, &hash, &sig));
    }

    #[test]
    fn property_compact_recovery(
        scalar in valid_scalar(),
        hash in any::<[u8; 32]>(),
        compressed in any::<bool>(),
    ) {
        let engine = Engine::new();
        let key = PrivateKey::from_slice(&scalar, compressed).unwrap();
        let sig = key.sign_compact(&engine, &hash).unwrap();
        let recovered = PublicKey::recover_compact(&engine, &hash, &sig).unwrap();
        prop_assert_eq!(recovered, key.public_key(&engine));
    }

    #[test]
    fn property_bit_flip_breaks_signature(
        scalar in valid_scalar(),
        hash in any::<[u8; 32]>(),
        bit in 0usize..512,
    ) {
        let engine = Engine::new();
        let key = PrivateKey::from_slice(&scalar, true).unwrap();
        let mut sig = key.sign(&engine, &hash).unwrap();
        let index = (bit / 8) % sig.len();
        sig[index] ^= 1 << (bit % 8);
        prop_assert!(!key.public_key(&engine).verify(&engine, &hash, &sig));
    }

    #[test]
    fn property_hash_bit_flip_breaks_signature(
        scalar in valid_scalar(),
        hash in any::<[u8; 32]>(),
        bit in 0usize..256,
    ) {
        let engine = Engine::new();
        let key = PrivateKey::from_slice(&scalar, true).unwrap();
        let sig = key.sign(&engine, &hash).unwrap();
        let mut other = hash;
        other[bit / 8] ^= 1 << (bit % 8);
        prop_assert!(!key.public_key(&engine).verify(&engine, &other, &sig));
    }

    #[test]
    fn property_set_master_is_deterministic(seed in proptest::collection::vec(any::<u8>(), 16..64)) {
        let a = ExtendedPrivateKey::set_master(&seed).unwrap();
        let b = ExtendedPrivateKey::set_master(&seed).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn property_codec_roundtrip(
        seed in proptest::collection::vec(any::<u8>(), 16..64),
        child in any::<u32>(),
    ) {
        let engine = Engine::new();
        let key = ExtendedPrivateKey::set_master(&seed).unwrap().derive(&engine, child).unwrap();
        let code = key.encode();
        let back = ExtendedPrivateKey::decode(&code);
        prop_assert_eq!(back.depth(), key.depth());
        prop_assert_eq!(back.parent_fingerprint(), key.parent_fingerprint());
        prop_assert_eq!(back.child_number(), key.child_number());
        prop_assert_eq!(back.chain_code(), key.chain_code());
        prop_assert_eq!(&back, &key);

        let xpub = key.neuter(&engine);
        prop_assert_eq!(ExtendedPublicKey::decode(&xpub.encode()).unwrap(), xpub);
    }

    #[test]
    fn property_depth_increases_by_one(
        seed in proptest::collection::vec(any::<u8>(), 16..64),
        path in proptest::collection::vec(any::<u32>(), 1..5),
    ) {
        let engine = Engine::new();
        let mut key = ExtendedPrivateKey::set_master(&seed).unwrap();
        for child in path {
            let next = key.derive(&engine, child).unwrap();
            prop_assert_eq!(next.depth(), key.depth() + 1);
            prop_assert_eq!(next.child_number(), child);
            prop_assert_eq!(next.parent_fingerprint(), key.key().public_key(&engine).fingerprint());
            key = next;
        }
    }

    #[test]
    fn property_hardened_and_normal_diverge(
        seed in proptest::collection::vec(any::<u8>(), 16..64),
        index in 0u32..0x8000_0000,
    ) {
        let engine = Engine::new();
        let master = ExtendedPrivateKey::set_master(&seed).unwrap();
        let normal = master.derive(&engine, index).unwrap();
        let hard = master.derive(&engine, hardened(index)).unwrap();
        prop_assert_ne!(normal.key(), hard.key());
        prop_assert_ne!(normal.chain_code(), hard.chain_code());
        prop_assert!(master.neuter(&engine).derive(&engine, hardened(index)).is_err());
    }

    #[test]
    fn property_public_derivation_matches_private(
        seed in proptest::collection::vec(any::<u8>(), 16..64),
        index in 0u32..0x8000_0000,
    ) {
        let engine = Engine::new();
        let master = ExtendedPrivateKey::set_master(&seed).unwrap();
        let via_private = master.derive(&engine, index).unwrap().neuter(&engine);
        let via_public = master.neuter(&engine).derive(&engine, index).unwrap();
        prop_assert_eq!(via_public, via_private);
    }
}
