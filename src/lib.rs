//! # WalkieRelay
//!
//! Half-duplex push-to-talk voice relay over a best-effort broadcast radio.
//!
//! ## Architecture
//!
//! ```text
//! mic ──▶ RelayCoordinator (TRANSMIT) ──▶ Transport ──▶ FrameCodec ──▶ radio
//! radio ──▶ FrameReceiver ──▶ FrameCodec ──▶ SampleRing ──▶ RelayCoordinator (RECEIVE) ──▶ speaker
//! ```
//!
//! Two concurrent actors only:
//! - Relay task: runs [`RelayCoordinator`], pops from the ring
//! - Radio receive context: runs [`FrameReceiver`], pushes into the ring
//!
//! The [`SampleRing`] is the only state they share.

#![cfg_attr(not(test), no_std)]

// ESP-IDF is a std platform; driver adapters use its threads
#[cfg(all(not(test), target_os = "espidf"))]
extern crate std;

pub mod audio;
pub mod config;
pub mod frame;
pub mod hal;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod relay;
pub mod sample;
pub mod stats;
pub mod transport;

pub use audio::SampleRing;
pub use config::{RelayConfig, RING_CAPACITY, TRANSPORT_HEADER};
pub use frame::{FrameCodec, FrameError, MAX_SAMPLES_PER_FRAME};
pub use hal::{HalError, RelayDevices};
pub use log_globals::RELAY_LOG;
pub use relay::{Phase, RelayCoordinator, RelayError};
pub use sample::Sample;
pub use stats::{RelayStats, StatsSnapshot};
pub use transport::{FrameHandler, FrameReceiver, Transport};
