//! # Serial Protocol
//!
//! Boundary between packets and the byte streams that carry them.
//!
//! Framing, checksums and retries belong to implementations of
//! [`SerialProtocol`]; packet types only know how to pack their own fields.

use std::io::{Read, Write};

use tracing::debug;

use crate::error::Result;
use crate::packet::{ChannelsPacket, Packet};

/// Reads and writes whole packets over a byte stream
pub trait SerialProtocol {
    /// Read one packet from `reader`
    fn read_packet<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<Packet>;

    /// Write one packet to `writer`
    fn write_packet<W: Write + ?Sized>(&mut self, writer: &mut W, packet: &Packet) -> Result<()>;
}

/// Read packets until a channels packet arrives
///
/// Telemetry packets read along the way are dropped.
///
/// # Errors
///
/// Returns the first error reported by the protocol
pub fn read_channels<P, R>(protocol: &mut P, reader: &mut R) -> Result<ChannelsPacket>
where
    P: SerialProtocol,
    R: Read + ?Sized,
{
    loop {
        match protocol.read_packet(reader)? {
            Packet::Channels(packet) => return Ok(packet),
            other => debug!("Skipping telemetry packet: {:?}", other),
        }
    }
}
