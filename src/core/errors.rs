use thiserror::Error;

/// Errors surfaced by key, signature and extended-key operations.
///
/// Precondition violations (using an invalid key where a valid one is required)
/// are not represented here: they are programmer errors and panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Bytes fail the `0 < value < n` curve-order check.
    #[error("Invalid scalar: {0}")]
    InvalidScalar(String),
    /// Wrong length or invalid structure on import/decode.
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),
    /// Signing was requested on a key that never became valid.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    /// Numeric rejection inside the elliptic-curve engine.
    #[error("Engine failure: {0}")]
    EngineFailure(String),
    /// Hardened child requested where only public material is available.
    #[error("Hardened derivation requires a private key (child {0:#010x})")]
    HardenedDerivation(u32),
    /// Extended-key depth would not fit in eight bits.
    #[error("Derivation depth overflow at depth {0}")]
    DepthOverflow(u8),
    /// A stored private key does not match its stored public key.
    #[error("Key mismatch: {0}")]
    KeyMismatch(String),
    /// The secure random source failed to deliver bytes.
    #[error("Random source failure: {0}")]
    RandomSource(String),
    /// A bounded retry loop ran out of attempts.
    #[error("Retry budget exhausted after {attempts} attempts")]
    RetryExhausted { attempts: u32 },
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KeyError {
    /// Errors after which the hosting process should not keep using the key material.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            KeyError::RandomSource(_) | KeyError::EngineFailure(_) | KeyError::KeyMismatch(_)
        )
    }

    /// Errors where asking again (fresh randomness, another child index) can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            KeyError::InvalidScalar(_) | KeyError::EngineFailure(_) | KeyError::RetryExhausted { .. }
        )
    }
}

impl From<secp256k1::Error> for KeyError {
    fn from(err: secp256k1::Error) -> Self {
        match err {
            secp256k1::Error::InvalidSecretKey => KeyError::InvalidScalar(err.to_string()),
            secp256k1::Error::InvalidPublicKey
            | secp256k1::Error::InvalidSignature
            | secp256k1::Error::InvalidRecoveryId => KeyError::MalformedEncoding(err.to_string()),
            other => KeyError::EngineFailure(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for KeyError {
    fn from(err: toml::de::Error) -> Self {
        KeyError::Config(err.to_string())
    }
}

impl From<std::io::Error> for KeyError {
    fn from(err: std::io::Error) -> Self {
        KeyError::Config(err.to_string())
    }
}
