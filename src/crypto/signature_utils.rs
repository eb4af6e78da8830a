use secp256k1::ecdsa::{RecoveryId, Signature};

/// Size of a compact recoverable signature: header byte, r, s.
pub const COMPACT_SIGNATURE_SIZE: usize = 65;

/// Upper bound of a DER-encoded secp256k1 ECDSA signature.
pub const MAX_DER_SIGNATURE_SIZE: usize = 72;

const COMPACT_HEADER_BASE: u8 = 27;
const COMPACT_HEADER_COMPRESSED: u8 = 4;

/// Header byte of a compact signature: 27 + recid, plus 4 when the signer's key is compressed.
pub fn compact_header(recid: RecoveryId, compressed: bool) -> u8 {
    let rec = recid.to_i32() as u8;
    COMPACT_HEADER_BASE + rec + if compressed { COMPACT_HEADER_COMPRESSED } else { 0 }
}

/// Split a compact header into its recovery id and compression flag.
/// Returns `None` outside 27..=34.
pub fn parse_compact_header(header: u8) -> Option<(RecoveryId, bool)> {
    let offset = header.checked_sub(COMPACT_HEADER_BASE)?;
    if offset > 7 {
        return None;
    }
    let recid = RecoveryId::from_i32(i32::from(offset & 3)).ok()?;
    Some((recid, offset & COMPACT_HEADER_COMPRESSED != 0))
}

/// Parse a DER signature and force low-S, as verification expects.
///
/// The lax parser skips over length bytes it can recompute, so the input must
/// also be the exact re-encoding of what was parsed.
pub fn parse_der_normalized(der: &[u8]) -> Option<Signature> {
    let mut sig = Signature::from_der_lax(der).ok()?;
    if &sig.serialize_der()[..] != der {
        return None;
    }
    sig.normalize_s();
    Some(sig)
}

/// True when `der` parses strictly and already carries a low S value.
pub fn is_low_s_der(der: &[u8]) -> bool {
    match Signature::from_der(der) {
        Ok(sig) => {
            let mut normalized = sig;
            normalized.normalize_s();
            normalized == sig
        }
        Err(_) => false,
    }
}
