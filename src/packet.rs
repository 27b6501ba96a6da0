//! # Packet Types
//!
//! Packets exchanged over the RC link: channels, GPS and battery telemetry.
//!
//! Only the channels region of [`ChannelsPacket`] is bit-packed. GPS and
//! battery packets are plain fixed-width records.

use crate::codec::channels::{self, ChannelSet, CHANNELS_COUNT};
use crate::error::Result;

/// RC channels packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelsPacket {
    /// Packet identifier
    pub id: u32,

    /// Channel slots (only the first 16 are packed)
    pub channels: ChannelSet,

    /// Transmitter lost its control link, receiver should apply failsafe
    pub is_failsafe: bool,
}

impl ChannelsPacket {
    /// Create a packet with all channels at zero
    pub fn new(id: u32) -> Self {
        Self {
            id,
            channels: [0; CHANNELS_COUNT],
            is_failsafe: false,
        }
    }

    /// Pack the first 16 channels into `buf` (11 bits each, LSB first)
    ///
    /// # Errors
    ///
    /// Returns `BufferTooSmall` if `buf` is shorter than 22 bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use rc_link::packet::ChannelsPacket;
    ///
    /// let mut packet = ChannelsPacket::new(1);
    /// packet.channels[0] = 2047;
    ///
    /// let mut buf = [0u8; 22];
    /// packet.pack_channels(&mut buf)?;
    /// assert_eq!(&buf[..2], &[0xFF, 0x07]);
    /// # Ok::<(), rc_link::error::RcLinkError>(())
    /// ```
    pub fn pack_channels(&self, buf: &mut [u8]) -> Result<()> {
        channels::encode(&self.channels, buf)
    }

    /// Parse the first 16 channels from `buf`
    ///
    /// Slots 16 and 17 keep their current values.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooShort` if `buf` is shorter than 22 bytes
    pub fn parse_channels(&mut self, buf: &[u8]) -> Result<()> {
        channels::decode_into(buf, &mut self.channels)
    }
}

/// GPS telemetry packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpsPacket {
    pub latitude: i32,
    pub longitude: i32,
    pub ground_speed: u16,
    pub heading: u16,
    pub altitude: u16,
    pub satellites: u8,
}

/// Battery telemetry packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatteryPacket {
    /// Average cell voltage in hundredths of a volt
    pub average_cell_voltage: u16,
}

impl BatteryPacket {
    /// Average cell voltage in volts
    pub fn cell_voltage(&self) -> f32 {
        self.average_cell_voltage as f32 / 100.0
    }
}

/// Any packet carried by the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    Channels(ChannelsPacket),
    Gps(GpsPacket),
    Battery(BatteryPacket),
}

impl From<ChannelsPacket> for Packet {
    fn from(packet: ChannelsPacket) -> Self {
        Packet::Channels(packet)
    }
}

impl From<GpsPacket> for Packet {
    fn from(packet: GpsPacket) -> Self {
        Packet::Gps(packet)
    }
}

impl From<BatteryPacket> for Packet {
    fn from(packet: BatteryPacket) -> Self {
        Packet::Battery(packet)
    }
}
