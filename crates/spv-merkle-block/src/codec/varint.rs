//! # CompactSize Integers
//!
//! Variable-length counts: one byte below `0xfd`, otherwise a marker byte
//! followed by a little-endian u16 (`0xfd`), u32 (`0xfe`) or u64 (`0xff`).
//! Only the shortest encoding is accepted, so decode/encode round-trips.

use crate::domain::DecodeError;

/// Read a CompactSize integer from the front of `buf`.
///
/// Returns the value and the number of bytes consumed.
pub fn read_varint(buf: &[u8]) -> Result<(u64, usize), DecodeError> {
    let marker = *buf.first().ok_or(DecodeError::Truncated {
        needed: 1,
        available: 0,
    })?;

    let (width, minimum) = match marker {
        0xfd => (2, 0xfd),
        0xfe => (4, 0x1_0000),
        0xff => (8, 0x1_0000_0000),
        n => return Ok((u64::from(n), 1)),
    };

    let body = buf.get(1..1 + width).ok_or(DecodeError::Truncated {
        needed: width,
        available: buf.len() - 1,
    })?;
    let mut raw = [0u8; 8];
    raw[..width].copy_from_slice(body);
    let value = u64::from_le_bytes(raw);

    if value < minimum {
        return Err(DecodeError::Malformed(format!(
            "non-canonical varint {:#x} for value {}",
            marker, value
        )));
    }

    Ok((value, 1 + width))
}

/// Append the shortest CompactSize encoding of `value`.
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(&mut out, value);
        out
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(0xfc), vec![0xfc]);
        assert_eq!(read_varint(&[0xfc, 0xaa]).unwrap(), (0xfc, 1));
    }

    #[test]
    fn test_widths() {
        assert_eq!(encoded(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(encoded(0x1_0000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(encoded(0x1_0000_0000).len(), 9);

        for value in [0xfdu64, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
            let bytes = encoded(value);
            assert_eq!(read_varint(&bytes).unwrap(), (value, bytes.len()));
        }
    }

    #[test]
    fn test_truncated() {
        assert!(matches!(
            read_varint(&[]),
            Err(DecodeError::Truncated { needed: 1, .. })
        ));
        assert!(matches!(
            read_varint(&[0xfe, 0x01, 0x02]),
            Err(DecodeError::Truncated {
                needed: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn test_non_canonical_rejected() {
        assert!(matches!(
            read_varint(&[0xfd, 0x05, 0x00]),
            Err(DecodeError::Malformed(_))
        ));
        assert!(read_varint(&[0xfe, 0xff, 0xff, 0x00, 0x00]).is_err());
    }
}
