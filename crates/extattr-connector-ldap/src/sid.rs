//! Security identifier decoding.
//!
//! `objectSid` is returned as raw bytes:
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 1 | revision |
//! | 1 | 1 | sub-authority count `n` |
//! | 2 | 6 | identifier authority, big-endian |
//! | 8 | 4 × n | sub-authorities, little-endian |

const HEADER_LEN: usize = 8;
const MAX_SUB_AUTHORITIES: usize = 15;

/// Decode a binary SID into its `S-1-5-21-...` form.
///
/// Returns `None` for anything that is not a well-formed SID.
#[must_use]
pub fn decode_sid(bytes: &[u8]) -> Option<String> {
    if bytes.len() < HEADER_LEN {
        return None;
    }

    let revision = bytes[0];
    let count = usize::from(bytes[1]);
    if count > MAX_SUB_AUTHORITIES || bytes.len() != HEADER_LEN + 4 * count {
        return None;
    }

    let authority = bytes[2..HEADER_LEN]
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

    let mut sid = format!("S-{revision}-{authority}");
    for chunk in bytes[HEADER_LEN..].chunks_exact(4) {
        let sub = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        sid.push('-');
        sid.push_str(&sub.to_string());
    }

    Some(sid)
}
