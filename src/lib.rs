//! # RC Link Library
//!
//! Packed RC channel codec for a fixed-channel remote-control link.
//!
//! This library packs 16 channel values (11 bits each) into the 22-byte
//! channels region of a channels packet and parses them back, alongside the
//! surrounding packet types and a rotating recorder for emitted frames.

pub mod codec;
pub mod config;
pub mod error;
pub mod link;
pub mod packet;
pub mod protocol;
pub mod recorder;
