//! BIP32 derivation paths in `m/44'/0'/0'/0` notation.

use crate::core::errors::KeyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top bit of a child index marks hardened derivation.
pub const HARDENED: u32 = 0x8000_0000;

pub fn hardened(index: u32) -> u32 {
    index | HARDENED
}

pub fn is_hardened(child: u32) -> bool {
    child & HARDENED != 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationPath {
    path: Vec<u32>,
}

impl DerivationPath {
    pub fn new(path: Vec<u32>) -> Self {
        Self { path }
    }

    /// The empty path, `m`.
    pub fn master() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn child(&self, child: u32) -> Self {
        let mut path = self.path.clone();
        path.push(child);
        Self { path }
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.path.split_last()?;
        Some(Self { path: rest.to_vec() })
    }

    /// True when any step needs the private key.
    pub fn has_hardened(&self) -> bool {
        self.path.iter().any(|&c| is_hardened(c))
    }
}

impl FromStr for DerivationPath {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, KeyError> {
        let rest = match s {
            "m" => return Ok(Self::master()),
            _ => s.strip_prefix("m/").ok_or_else(|| {
                KeyError::MalformedEncoding(format!("derivation path {:?} must start with m/", s))
            })?,
        };

        let path = rest
            .split('/')
            .map(|component| {
                let (digits, harden) = match component
                    .strip_suffix('\'')
                    .or_else(|| component.strip_suffix('h'))
                {
                    Some(d) => (d, true),
                    None => (component, false),
                };
                let index: u32 = digits.parse().map_err(|_| {
                    KeyError::MalformedEncoding(format!("bad path component {:?}", component))
                })?;
                if is_hardened(index) {
                    return Err(KeyError::MalformedEncoding(format!(
                        "path index {} too large",
                        index
                    )));
                }
                Ok(if harden { hardened(index) } else { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { path })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for &child in &self.path {
            if is_hardened(child) {
                write!(f, "/{}'", child & !HARDENED)?;
            } else {
                write!(f, "/{}", child)?;
            }
        }
        Ok(())
    }
}

impl From<Vec<u32>> for DerivationPath {
    fn from(path: Vec<u32>) -> Self {
        Self { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_master() {
        assert!(DerivationPath::from_str("m").unwrap().is_empty());
    }

    #[test]
    fn test_parse_mixed() {
        let path: DerivationPath = "m/44'/0h/7".parse().unwrap();
        assert_eq!(path.as_slice(), &[hardened(44), hardened(0), 7]);
        assert!(path.has_hardened());
        assert_eq!(path.to_string(), "m/44'/0'/7");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "n/0", "m/", "m//0", "m/abc", "m/2147483648", "m/1'h", "M/0"] {
            assert!(DerivationPath::from_str(bad).is_err(), "{:?} should fail", bad);
        }
    }

    #[test]
    fn test_child_and_parent() {
        let path = DerivationPath::master().child(hardened(1)).child(2);
        assert_eq!(path.len(), 2);
        assert_eq!(path.parent().unwrap().as_slice(), &[hardened(1)]);
        assert_eq!(DerivationPath::master().parent(), None);
    }

    #[test]
    fn test_largest_index_prints_back() {
        let path: DerivationPath = "m/2147483647'/2147483647".parse().unwrap();
        assert_eq!(path.as_slice(), &[u32::MAX, 0x7FFF_FFFF]);
        assert_eq!(path.to_string(), "m/2147483647'/2147483647");
    }
}
