//! Audio subsystem building blocks
//!
//! Architecture:
//! - Playback ring: decouples radio arrival jitter from speaker cadence
//! - Drop-oldest on overflow, silence on underflow
//! - Mono 16-bit PCM at the device sample rate

pub mod buffer;

pub use buffer::SampleRing;
