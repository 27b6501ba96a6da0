//! # Codec Module
//!
//! Bit-level encoding of the packed RC channels region.
//!
//! This module handles:
//! - Generic LSB-first packing of fixed-width fields
//! - 16 channels × 11 bits into a 22-byte region and back
//! - Masking of out-of-range channel values

pub mod bitpack;
pub mod channels;
