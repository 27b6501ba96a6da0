//! # Channel Frame Link
//!
//! Produces channels packets with consecutive ids and hands each one, with
//! its packed channels region, to a [`FrameSink`].

use tracing::{debug, info};

use crate::codec::channels::{ChannelSet, PackedChannels, PACKED_CHANNELS_SIZE};
use crate::config::ChannelsConfig;
use crate::error::Result;
use crate::packet::ChannelsPacket;

/// Destination for emitted channel frames
#[cfg_attr(test, mockall::automock)]
pub trait FrameSink {
    /// Accept one packet and its packed channels region
    fn publish(&mut self, packet: &ChannelsPacket, payload: &[u8]) -> Result<()>;
}

/// Generates channels packets from a fixed channel set
#[derive(Debug, Clone)]
pub struct ChannelFrameSource {
    next_id: u32,
    channels: ChannelSet,
    failsafe: bool,
}

impl ChannelFrameSource {
    /// Create a source starting at `initial_id`
    pub fn new(initial_id: u32, channels: ChannelSet) -> Self {
        Self {
            next_id: initial_id,
            channels,
            failsafe: false,
        }
    }

    /// Create a source from the `[channels]` configuration section
    pub fn from_config(config: &ChannelsConfig) -> Self {
        let mut source = Self::new(config.initial_id, config.channel_set());
        source.set_failsafe(config.failsafe);
        source
    }

    /// Raise or clear the failsafe flag on subsequent frames
    pub fn set_failsafe(&mut self, failsafe: bool) {
        if failsafe != self.failsafe {
            info!("Failsafe {}", if failsafe { "raised" } else { "cleared" });
        }
        self.failsafe = failsafe;
    }

    /// Replace the channel values sent in subsequent frames
    pub fn set_channels(&mut self, channels: ChannelSet) {
        self.channels = channels;
    }

    /// Id the next frame will carry
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Build the next packet and its packed channels region
    ///
    /// Ids wrap around after `u32::MAX`.
    pub fn next_frame(&mut self) -> Result<(ChannelsPacket, PackedChannels)> {
        let packet = ChannelsPacket {
            id: self.next_id,
            channels: self.channels,
            is_failsafe: self.failsafe,
        };

        let mut payload = [0u8; PACKED_CHANNELS_SIZE];
        packet.pack_channels(&mut payload)?;

        self.next_id = self.next_id.wrapping_add(1);
        Ok((packet, payload))
    }

    /// Build the next frame and publish it to `sink`
    ///
    /// The id advances even if the sink rejects the frame.
    pub fn emit<S: FrameSink + ?Sized>(&mut self, sink: &mut S) -> Result<ChannelsPacket> {
        let (packet, payload) = self.next_frame()?;
        debug!("Emitting frame {} ({})", packet.id, hex_string(&payload));
        sink.publish(&packet, &payload)?;
        Ok(packet)
    }
}

/// Format bytes as uppercase hex with no separators
pub fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::channels::{decode, CHANNELS_COUNT, CHANNEL_VALUE_CENTER};
    use crate::error::RcLinkError;

    #[test]
    fn test_next_frame_increments_id() {
        let mut source = ChannelFrameSource::new(5, [CHANNEL_VALUE_CENTER; CHANNELS_COUNT]);

        let (first, _) = source.next_frame().unwrap();
        let (second, _) = source.next_frame().unwrap();

        assert_eq!(first.id, 5);
        assert_eq!(second.id, 6);
        assert_eq!(source.next_id(), 7);
    }

    #[test]
    fn test_next_frame_id_wraps() {
        let mut source = ChannelFrameSource::new(u32::MAX, [0; CHANNELS_COUNT]);
        let (packet, _) = source.next_frame().unwrap();

        assert_eq!(packet.id, u32::MAX);
        assert_eq!(source.next_id(), 0);
    }

    #[test]
    fn test_next_frame_payload_matches_channels() {
        let mut channels = [0u16; CHANNELS_COUNT];
        channels[2] = 1811;
        channels[9] = 172;
        let mut source = ChannelFrameSource::new(0, channels);

        let (packet, payload) = source.next_frame().unwrap();
        let decoded = decode(&payload).unwrap();

        assert_eq!(packet.channels, channels);
        assert_eq!(decoded[2], 1811);
        assert_eq!(decoded[9], 172);
    }

    #[test]
    fn test_failsafe_flag_follows_setter() {
        let mut source = ChannelFrameSource::new(0, [0; CHANNELS_COUNT]);

        let (packet, _) = source.next_frame().unwrap();
        assert!(!packet.is_failsafe);

        source.set_failsafe(true);
        let (packet, _) = source.next_frame().unwrap();
        assert!(packet.is_failsafe);

        source.set_failsafe(false);
        let (packet, _) = source.next_frame().unwrap();
        assert!(!packet.is_failsafe);
    }

    #[test]
    fn test_from_config() {
        let config = ChannelsConfig {
            values: vec![1500, 1400],
            initial_id: 77,
            failsafe: true,
        };

        let mut source = ChannelFrameSource::from_config(&config);
        let (packet, _) = source.next_frame().unwrap();

        assert_eq!(packet.id, 77);
        assert!(packet.is_failsafe);
        assert_eq!(packet.channels[0], 1500);
        assert_eq!(packet.channels[1], 1400);
    }

    #[test]
    fn test_set_channels() {
        let mut source = ChannelFrameSource::new(0, [0; CHANNELS_COUNT]);
        source.set_channels([2047; CHANNELS_COUNT]);

        let (_, payload) = source.next_frame().unwrap();
        assert_eq!(payload, [0xFFu8; PACKED_CHANNELS_SIZE]);
    }

    #[test]
    fn test_emit_publishes_to_sink() {
        let mut sink = MockFrameSink::new();
        sink.expect_publish()
            .withf(|packet, payload| {
                packet.id == 3 && payload.len() == PACKED_CHANNELS_SIZE && payload[0] == 0x00
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut source = ChannelFrameSource::new(3, [CHANNEL_VALUE_CENTER; CHANNELS_COUNT]);
        let packet = source.emit(&mut sink).unwrap();
        assert_eq!(packet.id, 3);
    }

    #[test]
    fn test_emit_propagates_sink_error() {
        let mut sink = MockFrameSink::new();
        sink.expect_publish()
            .times(1)
            .returning(|_, _| Err(RcLinkError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))));

        let mut source = ChannelFrameSource::new(0, [0; CHANNELS_COUNT]);
        assert!(matches!(source.emit(&mut sink), Err(RcLinkError::Io(_))));

        // Id still advanced
        assert_eq!(source.next_id(), 1);
    }

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[]), "");
        assert_eq!(hex_string(&[0x00, 0x0A, 0xFF]), "000AFF");
    }
}
