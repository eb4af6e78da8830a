// src/security/mod.rs
//! Secret-handling building blocks: locked buffers and redacted output.

pub mod memory_protection;
pub mod redaction;

pub use memory_protection::LockedBytes;
pub use redaction::redact_hex_bytes;
