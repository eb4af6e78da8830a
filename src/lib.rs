// src/lib.rs
//! secp256k1 key core: private and public keys, deterministic ECDSA, compact
//! recoverable signatures and BIP32 extended keys.
//!
//! Every operation that touches the curve takes an [`Engine`] handle, created once
//! by the hosting process:
//!
//! ```
//! use ion_keys::{sanity_check, Engine, ExtendedPrivateKey};
//!
//! let engine = Engine::new();
//! assert!(sanity_check(&engine, &mut ion_keys::os_random()));
//!
//! let master = ExtendedPrivateKey::set_master(b"correct horse battery staple").unwrap();
//! let child = master.derive(&engine, ion_keys::hardened(0)).unwrap();
//! assert_eq!(child.depth(), 1);
//! ```

pub mod core;
pub mod crypto;
pub mod security;

pub use crate::core::config::{KeyCoreConfig, LoggingConfig};
pub use crate::core::errors::KeyError;
pub use crate::crypto::{
    hardened, is_hardened, os_random, sanity_check, ChainCode, DerivationPath, Engine,
    ExtendedPrivateKey, ExtendedPublicKey, Fingerprint, KeyId, PrivateKey, PublicKey,
    RandomSource, RetryPolicy, EXTENDED_KEY_SIZE, HARDENED,
};
pub use crate::security::LockedBytes;
