//! SEC1 `ECPrivateKey` DER encoding with explicit secp256k1 domain parameters.
//!
//! This is the historical OpenSSL-compatible private key format: 279 bytes when the
//! embedded public key is uncompressed, 214 bytes when it is compressed.

use crate::core::errors::KeyError;
use secp256k1::constants::{CURVE_ORDER, FIELD_SIZE, GENERATOR_X, GENERATOR_Y};
use zeroize::Zeroizing;

/// Encoded size with an uncompressed public key.
pub const DER_PRIVKEY_SIZE: usize = 279;
/// Encoded size with a compressed public key.
pub const DER_PRIVKEY_COMPRESSED_SIZE: usize = 214;

// OID 1.2.840.10045.1.1 (prime-field)
const PRIME_FIELD_OID: [u8; 9] = [0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x01, 0x01];

/// Encode `secret` together with its serialized public point.
///
/// `pubkey` must be 33 bytes (compressed) or 65 bytes (uncompressed).
pub fn encode_private_key(secret: &[u8; 32], pubkey: &[u8]) -> Zeroizing<Vec<u8>> {
    let compressed = pubkey.len() == 33;
    let generator_len = if compressed { 33 } else { 65 };

    // ECParameters body: version, fieldID, curve, base, order, cofactor
    let params_len = 3 + (2 + 44) + (2 + 6) + (2 + generator_len) + (2 + 33) + 3;
    // [0] wraps "30 81 <params_len>"
    let explicit_len = 3 + params_len;
    // [1] wraps BIT STRING "03 <len> 00 <pubkey>"
    let bitstring_len = 1 + pubkey.len();
    let public_len = 2 + bitstring_len;
    let body_len = 3 + (2 + 32) + (3 + explicit_len) + (2 + public_len);

    let mut out = Zeroizing::new(Vec::with_capacity(4 + body_len));
    out.push(0x30);
    if body_len > 0xFF {
        out.extend_from_slice(&[0x82, (body_len >> 8) as u8, body_len as u8]);
    } else {
        out.extend_from_slice(&[0x81, body_len as u8]);
    }
    out.extend_from_slice(&[0x02, 0x01, 0x01]);
    out.extend_from_slice(&[0x04, 0x20]);
    out.extend_from_slice(secret);

    out.extend_from_slice(&[0xA0, 0x81, explicit_len as u8]);
    out.extend_from_slice(&[0x30, 0x81, params_len as u8]);
    out.extend_from_slice(&[0x02, 0x01, 0x01]);
    out.extend_from_slice(&[0x30, 0x2C]);
    out.extend_from_slice(&PRIME_FIELD_OID);
    out.extend_from_slice(&[0x02, 0x21, 0x00]);
    out.extend_from_slice(&FIELD_SIZE);
    // a = 0, b = 7
    out.extend_from_slice(&[0x30, 0x06, 0x04, 0x01, 0x00, 0x04, 0x01, 0x07]);
    out.extend_from_slice(&[0x04, generator_len as u8]);
    if compressed {
        out.push(0x02 | (GENERATOR_Y[31] & 1));
        out.extend_from_slice(&GENERATOR_X);
    } else {
        out.push(0x04);
        out.extend_from_slice(&GENERATOR_X);
        out.extend_from_slice(&GENERATOR_Y);
    }
    out.extend_from_slice(&[0x02, 0x21, 0x00]);
    out.extend_from_slice(&CURVE_ORDER);
    out.extend_from_slice(&[0x02, 0x01, 0x01]);

    out.extend_from_slice(&[0xA1, public_len as u8, 0x03, bitstring_len as u8, 0x00]);
    out.extend_from_slice(pubkey);
    out
}

fn malformed(what: &str) -> KeyError {
    KeyError::MalformedEncoding(format!("DER private key: {}", what))
}

/// Extract the 32-byte scalar from a DER `ECPrivateKey`.
///
/// Parsing is lenient on purpose: only the outer sequence, the version and the
/// private-key octet string are inspected; trailing parameters are ignored. An octet
/// string shorter than 32 bytes is left-padded with zeros. The scalar is not range
/// checked here.
pub fn decode_private_key(der: &[u8]) -> Result<Zeroizing<[u8; 32]>, KeyError> {
    let mut rest = der;

    if rest.first() != Some(&0x30) {
        return Err(malformed("missing sequence header"));
    }
    rest = &rest[1..];

    let len_byte = *rest.first().ok_or_else(|| malformed("missing sequence length"))?;
    if len_byte & 0x80 == 0 {
        return Err(malformed("sequence length must use long form"));
    }
    let len_bytes = usize::from(len_byte & 0x7F);
    rest = &rest[1..];
    if !(1..=2).contains(&len_bytes) || rest.len() < len_bytes {
        return Err(malformed("bad sequence length prefix"));
    }
    let seq_len = rest[..len_bytes]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));
    rest = &rest[len_bytes..];
    if rest.len() < seq_len {
        return Err(malformed("truncated sequence"));
    }

    if rest.len() < 3 || rest[..3] != [0x02, 0x01, 0x01] {
        return Err(malformed("unsupported version"));
    }
    rest = &rest[3..];

    if rest.len() < 2 || rest[0] != 0x04 {
        return Err(malformed("missing private key octet string"));
    }
    let key_len = usize::from(rest[1]);
    rest = &rest[2..];
    if key_len > 32 || rest.len() < key_len {
        return Err(malformed("bad private key length"));
    }

    let mut out = Zeroizing::new([0u8; 32]);
    out[32 - key_len..].copy_from_slice(&rest[..key_len]);
    Ok(out)
}
