pub mod der;
pub mod engine;
pub mod hash;
pub mod hd;
pub mod key;
pub mod path;
pub mod pubkey;
pub mod random;
pub mod sanity;
pub mod signature_utils;

pub use self::engine::Engine;
pub use self::hash::{hash160, sha256d, ChainCode, Fingerprint, KeyId};
pub use self::hd::{ExtendedPrivateKey, ExtendedPublicKey, EXTENDED_KEY_SIZE};
pub use self::key::PrivateKey;
pub use self::path::{hardened, is_hardened, DerivationPath, HARDENED};
pub use self::pubkey::PublicKey;
pub use self::random::{os_random, RandomSource, RetryPolicy};
pub use self::sanity::sanity_check;
