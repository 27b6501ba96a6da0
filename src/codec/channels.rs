//! # Channel Codec
//!
//! Encodes RC channel values into the 22-byte packed channels region and
//! decodes them back.
//!
//! 16 channels × 11 bits = 176 bits = 22 bytes, no padding. Channel `i`
//! occupies bits `[11*i, 11*i + 11)` of an LSB-first bitstream:
//!
//! ```text
//! Byte 0: Ch0[0:7]
//! Byte 1: Ch0[8:10] | Ch1[0:4]
//! Byte 2: Ch1[5:10] | Ch2[0:1]
//! Byte 3: Ch2[2:9]
//! Byte 4: Ch2[10]   | Ch3[0:6]
//! ...
//! ```

use super::bitpack::{pack_fields, packed_len, unpack_fields, write_fields};
use crate::error::Result;

/// Number of channel slots held in memory
pub const CHANNELS_COUNT: usize = 18;

/// Number of leading channel slots carried on the wire
///
/// Slots 16 and 17 have no wire representation.
pub const PACKED_CHANNELS_COUNT: usize = 16;

/// Bits per packed channel
pub const CHANNEL_BITS: u32 = 11;

/// Mask selecting the packed bits of a channel value
pub const CHANNEL_VALUE_MASK: u16 = 0x07FF;

/// Channel value range (11-bit: 0-2047)
pub const CHANNEL_VALUE_MIN: u16 = 0;
pub const CHANNEL_VALUE_MAX: u16 = 2047;
pub const CHANNEL_VALUE_CENTER: u16 = 1024;

/// Packed channels region size (22 bytes for 16 channels × 11 bits)
pub const PACKED_CHANNELS_SIZE: usize = packed_len(PACKED_CHANNELS_COUNT, CHANNEL_BITS);

/// In-memory channel slots (values stored as u16, only the low 11 bits are packed)
pub type ChannelSet = [u16; CHANNELS_COUNT];

/// Packed channels region
pub type PackedChannels = [u8; PACKED_CHANNELS_SIZE];

/// Encode the first 16 channels into `out`
///
/// Each value is reduced to its low 11 bits (`value & 0x7FF`); out-of-range
/// values are masked, never rejected. Only bytes 0-21 of `out` are written.
///
/// # Arguments
///
/// * `channels` - Channel slots; slots 16 and 17 are ignored
/// * `out` - Destination buffer (at least 22 bytes)
///
/// # Errors
///
/// Returns `BufferTooSmall` if `out` is shorter than 22 bytes. Nothing is
/// written in that case.
///
/// # Examples
///
/// ```
/// use rc_link::codec::channels::{encode, CHANNELS_COUNT, PACKED_CHANNELS_SIZE};
///
/// let mut channels = [0u16; CHANNELS_COUNT];
/// channels[0] = 1;
///
/// let mut out = [0u8; PACKED_CHANNELS_SIZE];
/// encode(&channels, &mut out)?;
/// assert_eq!(out[0], 0x01);
/// # Ok::<(), rc_link::error::RcLinkError>(())
/// ```
pub fn encode(channels: &ChannelSet, out: &mut [u8]) -> Result<()> {
    pack_fields(&channels[..PACKED_CHANNELS_COUNT], CHANNEL_BITS, out)?;
    Ok(())
}

/// Encode the first 16 channels into a new packed region
pub fn encode_to_array(channels: &ChannelSet) -> PackedChannels {
    let mut out = [0u8; PACKED_CHANNELS_SIZE];
    write_fields(&channels[..PACKED_CHANNELS_COUNT], CHANNEL_BITS, &mut out);
    out
}

/// Decode 16 channels from a packed region
///
/// Any 22-byte sequence decodes to a valid channel set; slots 16 and 17 of
/// the result are zero.
///
/// # Arguments
///
/// * `input` - Packed region (at least 22 bytes, extra bytes are ignored)
///
/// # Returns
///
/// * `Result<ChannelSet>` - Decoded channels, each in 0-2047
///
/// # Errors
///
/// Returns `BufferTooShort` if `input` is shorter than 22 bytes
pub fn decode(input: &[u8]) -> Result<ChannelSet> {
    let mut channels = [0u16; CHANNELS_COUNT];
    decode_into(input, &mut channels)?;
    Ok(channels)
}

/// Decode 16 channels into the leading slots of `channels`
///
/// Slots 16 and 17 keep whatever value they held.
///
/// # Errors
///
/// Returns `BufferTooShort` if `input` is shorter than 22 bytes; `channels`
/// is unchanged in that case.
pub fn decode_into(input: &[u8], channels: &mut ChannelSet) -> Result<()> {
    unpack_fields(input, CHANNEL_BITS, &mut channels[..PACKED_CHANNELS_COUNT])
}

/// Reduce a channel value to the bits that survive packing
pub fn mask_channel_value(value: u16) -> u16 {
    value & CHANNEL_VALUE_MASK
}
