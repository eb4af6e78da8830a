// src/security/memory_protection.rs
//! Fixed-size secret buffers.
//!
//! [`LockedBytes`] keeps its bytes on the heap so the address is stable while the
//! pages are locked, and wipes then unlocks them when dropped. Dropping happens on
//! every exit path, so a `?` in the middle of a derivation still releases the buffer.

use crate::core::memory_protection::{lock_memory, unlock_memory};
use crate::security::redaction::redact_hex_bytes;
use std::fmt;
use std::ops::{Deref, DerefMut};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

pub struct LockedBytes<const N: usize> {
    bytes: Box<[u8; N]>,
    locked: bool,
}

impl<const N: usize> LockedBytes<N> {
    /// Allocate a zeroed buffer and try to lock it. Lock failure is tolerated:
    /// the buffer is still wiped on drop, it just may reach swap.
    pub fn new() -> Self {
        let bytes = Box::new([0u8; N]);
        let locked = match lock_memory(&bytes[..]) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("could not lock {} secret bytes: {}", N, e);
                false
            }
        };
        Self { bytes, locked }
    }

    /// Copy `src` into a fresh locked buffer. `src` must be exactly `N` bytes.
    pub fn from_slice(src: &[u8]) -> Option<Self> {
        if src.len() != N {
            return None;
        }
        let mut out = Self::new();
        out.bytes.copy_from_slice(src);
        Some(out)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl<const N: usize> Default for LockedBytes<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Deref for LockedBytes<N> {
    type Target = [u8; N];

    fn deref(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> DerefMut for LockedBytes<N> {
    fn deref_mut(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }
}

impl<const N: usize> AsRef<[u8]> for LockedBytes<N> {
    fn as_ref(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl<const N: usize> Clone for LockedBytes<N> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        out.bytes.copy_from_slice(&self.bytes[..]);
        out
    }
}

impl<const N: usize> PartialEq for LockedBytes<N> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl<const N: usize> Eq for LockedBytes<N> {}

impl<const N: usize> fmt::Debug for LockedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact_hex_bytes(&self.bytes[..]))
    }
}

impl<const N: usize> Zeroize for LockedBytes<N> {
    fn zeroize(&mut self) {
        self.bytes[..].zeroize();
    }
}

impl<const N: usize> Drop for LockedBytes<N> {
    fn drop(&mut self) {
        self.bytes[..].zeroize();
        if self.locked {
            if let Err(e) = unlock_memory(&self.bytes[..]) {
                tracing::debug!("could not unlock {} secret bytes: {}", N, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let buf = LockedBytes::<32>::new();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_slice_requires_exact_length() {
        assert!(LockedBytes::<4>::from_slice(&[1, 2, 3]).is_none());
        assert!(LockedBytes::<4>::from_slice(&[1, 2, 3, 4, 5]).is_none());
        let buf = LockedBytes::<4>::from_slice(&[1, 2, 3, 4]).unwrap();
        assert_eq!(*buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = LockedBytes::<8>::from_slice(&[0x11; 8]).unwrap();
        let cloned = original.clone();
        original.copy_from_slice(&[0x22; 8]);
        assert_eq!(*cloned, [0x11; 8]);
        assert_ne!(original, cloned);
    }

    #[test]
    fn test_zeroize_clears_contents() {
        let mut buf = LockedBytes::<16>::from_slice(&[0xAA; 16]).unwrap();
        buf.zeroize();
        assert_eq!(*buf, [0u8; 16]);
    }

    #[test]
    fn test_debug_is_redacted() {
        let buf = LockedBytes::<4>::from_slice(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
        let shown = format!("{:?}", buf);
        let printing = std::env::var(crate::security::redaction::PRINT_SECRETS_ENV).is_ok();
        assert!(printing || !shown.contains("deadbeef"));
        assert!(printing || shown.contains("len=4"));
    }
}
