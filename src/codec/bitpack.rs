//! # Bit Packing
//!
//! Packs fixed-width unsigned fields into a byte buffer as one continuous
//! bitstream, LSB first, and unpacks them back.
//!
//! Field `i` of width `w` occupies bits `[w*i, w*i + w)` of the stream.
//! Byte 0 holds stream bits `[0, 8)`, byte 1 holds `[8, 16)`, and so on.

use crate::error::{RcLinkError, Result};

/// Widest field the accumulator supports
pub const MAX_FIELD_WIDTH: u32 = 16;

/// Number of bytes needed to hold `count` fields of `width` bits
///
/// # Examples
///
/// ```
/// use rc_link::codec::bitpack::packed_len;
///
/// assert_eq!(packed_len(16, 11), 22);
/// assert_eq!(packed_len(3, 11), 5);
/// ```
pub const fn packed_len(count: usize, width: u32) -> usize {
    (count * width as usize + 7) / 8
}

/// Bit mask selecting the low `width` bits of a field
const fn field_mask(width: u32) -> u32 {
    (1u32 << width) - 1
}

fn check_width(width: u32) -> Result<()> {
    if width == 0 || width > MAX_FIELD_WIDTH {
        return Err(RcLinkError::InvalidFieldWidth {
            width,
            max: MAX_FIELD_WIDTH,
        });
    }
    Ok(())
}

/// Pack `values` into `out`, `width` bits per value
///
/// Bits above `width` in each value are discarded. If the total bit count is
/// not a multiple of 8, the unused high bits of the last byte are zero.
/// Bytes past the packed length are never touched.
///
/// # Arguments
///
/// * `values` - Field values, packed in order
/// * `width` - Bits per field (1-16)
/// * `out` - Destination buffer
///
/// # Returns
///
/// * `Result<usize>` - Number of bytes written
///
/// # Errors
///
/// Returns `InvalidFieldWidth` if `width` is outside 1-16, or `BufferTooSmall`
/// if `out` is shorter than `packed_len(values.len(), width)`. Nothing is
/// written in either case.
pub fn pack_fields(values: &[u16], width: u32, out: &mut [u8]) -> Result<usize> {
    check_width(width)?;

    let needed = packed_len(values.len(), width);
    if out.len() < needed {
        return Err(RcLinkError::BufferTooSmall {
            needed,
            actual: out.len(),
        });
    }

    Ok(write_fields(values, width, out))
}

/// Pack `values` into a buffer whose size is already known to fit
///
/// `width` must be in 1-16 and `out` must hold at least
/// `packed_len(values.len(), width)` bytes.
pub(crate) fn write_fields(values: &[u16], width: u32, out: &mut [u8]) -> usize {
    let mask = field_mask(width);
    let mut pending: u32 = 0;
    let mut pending_bits: u32 = 0;
    let mut written = 0;

    for &value in values {
        pending |= (u32::from(value) & mask) << pending_bits;
        pending_bits += width;

        while pending_bits >= 8 {
            out[written] = pending as u8;
            written += 1;
            pending >>= 8;
            pending_bits -= 8;
        }
    }

    // Flush a trailing partial byte
    if pending_bits > 0 {
        out[written] = pending as u8;
        written += 1;
    }

    written
}

/// Unpack `out.len()` fields of `width` bits from `input`
///
/// Inverse of [`pack_fields`]. Every bit pattern is a valid field, so this
/// only fails on width or length.
///
/// # Arguments
///
/// * `input` - Packed bitstream
/// * `width` - Bits per field (1-16)
/// * `out` - Destination for the unpacked values; its length sets the field count
///
/// # Errors
///
/// Returns `InvalidFieldWidth` if `width` is outside 1-16, or `BufferTooShort`
/// if `input` is shorter than `packed_len(out.len(), width)`. `out` is left
/// untouched in either case.
pub fn unpack_fields(input: &[u8], width: u32, out: &mut [u16]) -> Result<()> {
    check_width(width)?;

    let needed = packed_len(out.len(), width);
    if input.len() < needed {
        return Err(RcLinkError::BufferTooShort {
            needed,
            actual: input.len(),
        });
    }

    let mask = field_mask(width);
    let mut pending: u32 = 0;
    let mut pending_bits: u32 = 0;
    let mut bytes = input.iter();

    for slot in out.iter_mut() {
        while pending_bits < width {
            // Length was checked above, so the stream cannot run dry here
            let Some(&byte) = bytes.next() else { break };
            pending |= u32::from(byte) << pending_bits;
            pending_bits += 8;
        }

        *slot = (pending & mask) as u16;
        pending >>= width;
        pending_bits = pending_bits.saturating_sub(width);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(0, 11), 0);
        assert_eq!(packed_len(1, 11), 2);
        assert_eq!(packed_len(8, 11), 11);
        assert_eq!(packed_len(16, 11), 22);
        assert_eq!(packed_len(4, 8), 4);
        assert_eq!(packed_len(3, 1), 1);
    }

    #[test]
    fn test_pack_byte_width_is_identity() {
        let mut out = [0u8; 4];
        let written = pack_fields(&[0x12, 0x34, 0x56, 0x78], 8, &mut out).unwrap();
        assert_eq!(written, 4);
        assert_eq!(out, [0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_pack_nibbles_low_first() {
        let mut out = [0u8; 2];
        pack_fields(&[0x1, 0x2, 0x3, 0x4], 4, &mut out).unwrap();

        // First field lands in the low nibble of byte 0
        assert_eq!(out, [0x21, 0x43]);
    }

    #[test]
    fn test_pack_masks_high_bits() {
        let mut out = [0u8; 1];
        pack_fields(&[0xFF, 0x00], 4, &mut out).unwrap();
        assert_eq!(out, [0x0F]);
    }

    #[test]
    fn test_pack_trailing_partial_byte_zero_filled() {
        let mut out = [0xAAu8; 3];
        let written = pack_fields(&[0x7FF], 11, &mut out).unwrap();

        assert_eq!(written, 2);
        assert_eq!(out[0], 0xFF);
        assert_eq!(out[1], 0x07);
        // Beyond the packed length stays untouched
        assert_eq!(out[2], 0xAA);
    }

    #[test]
    fn test_pack_buffer_too_small_writes_nothing() {
        let mut out = [0xAAu8; 2];
        let result = pack_fields(&[1, 2, 3], 11, &mut out);

        match result {
            Err(RcLinkError::BufferTooSmall { needed, actual }) => {
                assert_eq!(needed, 5);
                assert_eq!(actual, 2);
            }
            other => panic!("Expected BufferTooSmall, got: {:?}", other),
        }
        assert_eq!(out, [0xAA, 0xAA]);
    }

    #[test]
    fn test_unpack_buffer_too_short_leaves_output() {
        let mut out = [7u16; 3];
        let result = unpack_fields(&[0xFF; 4], 11, &mut out);

        match result {
            Err(RcLinkError::BufferTooShort { needed, actual }) => {
                assert_eq!(needed, 5);
                assert_eq!(actual, 4);
            }
            other => panic!("Expected BufferTooShort, got: {:?}", other),
        }
        assert_eq!(out, [7, 7, 7]);
    }

    #[test]
    fn test_unpack_ignores_trailing_bytes() {
        let mut out = [0u16; 2];
        unpack_fields(&[0x21, 0xFF, 0xFF], 4, &mut out).unwrap();
        assert_eq!(out, [0x1, 0x2]);
    }

    #[test]
    fn test_unpack_spanning_three_bytes() {
        // Third 11-bit field spans bytes 2, 3 and 4
        let mut packed = [0u8; 5];
        pack_fields(&[0, 0, 0x5A5], 11, &mut packed).unwrap();

        let mut out = [0u16; 3];
        unpack_fields(&packed, 11, &mut out).unwrap();
        assert_eq!(out, [0, 0, 0x5A5]);
    }

    #[test]
    fn test_empty_fields() {
        let mut out = [0u8; 0];
        assert_eq!(pack_fields(&[], 11, &mut out).unwrap(), 0);

        let mut fields: [u16; 0] = [];
        assert!(unpack_fields(&[], 11, &mut fields).is_ok());
    }

    #[test]
    fn test_invalid_width_rejected() {
        for width in [0, MAX_FIELD_WIDTH + 1, 32, u32::MAX] {
            let mut out = [0xAAu8; 8];
            match pack_fields(&[1, 2, 3], width, &mut out) {
                Err(RcLinkError::InvalidFieldWidth { width: w, max }) => {
                    assert_eq!(w, width);
                    assert_eq!(max, MAX_FIELD_WIDTH);
                }
                other => panic!("Expected InvalidFieldWidth for {}, got: {:?}", width, other),
            }
            assert_eq!(out, [0xAAu8; 8]);

            let mut fields = [7u16; 3];
            assert!(matches!(
                unpack_fields(&[0xFF; 8], width, &mut fields),
                Err(RcLinkError::InvalidFieldWidth { .. })
            ));
            assert_eq!(fields, [7u16; 3]);
        }
    }

    #[test]
    fn test_write_fields_matches_pack_fields() {
        let values = [0x7FF, 0x123, 0x456, 0x001];
        let mut checked = [0u8; 6];
        let mut unchecked = [0u8; 6];

        let a = pack_fields(&values, 11, &mut checked).unwrap();
        let b = write_fields(&values, 11, &mut unchecked);

        assert_eq!(a, b);
        assert_eq!(checked, unchecked);
    }

    #[test]
    fn test_full_width_fields() {
        let values = [0xBEEF, 0x1234, 0xFFFF];
        let mut packed = [0u8; 6];
        pack_fields(&values, 16, &mut packed).unwrap();
        assert_eq!(packed, [0xEF, 0xBE, 0x34, 0x12, 0xFF, 0xFF]);

        let mut out = [0u16; 3];
        unpack_fields(&packed, 16, &mut out).unwrap();
        assert_eq!(out, values);
    }
}
