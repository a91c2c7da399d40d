//! Module: config
//!
//! Purpose: Configuration for WalkieRelay.
//!
//! Architecture:
//! - Sizes that shape static memory are compile-time constants
//! - Runtime knobs live in [`RelayConfig`], supplied at construction
//! - No persistence: every boot starts from [`RelayConfig::DEFAULT`]
//!
//! Safety: Safe. Plain data, validated once before the relay starts.

/// Playback ring capacity in samples (300 ms at 16 kHz).
pub const RING_CAPACITY: usize = 300 * 16;

/// Largest capture/playback chunk the relay loop moves per step.
pub const MAX_CHUNK_SAMPLES: usize = 128;

/// Protocol header prepended to every frame. Peers must agree on it.
///
/// Its length is checked by [`FrameCodec::new`](crate::frame::FrameCodec::new).
pub const TRANSPORT_HEADER: &[u8] = &[];

/// Indicator colours (0xRRGGBB).
pub const COLOR_OFF: u32 = 0x000000;
pub const COLOR_RED: u32 = 0xff0000;
pub const COLOR_GREEN: u32 = 0x00ff00;

/// Configuration rejected by [`RelayConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,
    #[error("chunk of {0} samples outside 1..={max}", max = MAX_CHUNK_SAMPLES)]
    ChunkSize(usize),
    #[error("radio channel {0} outside 1..=14")]
    RadioChannel(u8),
}

/// Runtime relay configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// Capture and playback rate in Hz.
    pub sample_rate_hz: u32,
    /// Minimum time spent in either phase before it may end.
    pub dwell_ms: u32,
    /// Samples moved per loop step (mic read / speaker write).
    pub chunk_samples: usize,
    /// Wi-Fi channel shared by all peers.
    pub radio_channel: u8,
    /// Flash colour while transmitting.
    pub transmit_color: u32,
    /// Flash colour while the radio comes up.
    pub connecting_color: u32,
    /// Solid colour once the radio is up.
    pub ready_color: u32,
}

impl RelayConfig {
    pub const DEFAULT: Self = Self {
        sample_rate_hz: 16_000,
        dwell_ms: 1_000,
        chunk_samples: MAX_CHUNK_SAMPLES,
        radio_channel: 1,
        transmit_color: COLOR_RED,
        connecting_color: COLOR_RED,
        ready_color: COLOR_GREEN,
    };

    /// Dwell floor in microseconds
    #[inline]
    pub fn dwell_us(&self) -> u64 {
        self.dwell_ms as u64 * 1000
    }

    /// Check the configuration against the compile-time limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.chunk_samples == 0 || self.chunk_samples > MAX_CHUNK_SAMPLES {
            return Err(ConfigError::ChunkSize(self.chunk_samples));
        }
        if !(1..=14).contains(&self.radio_channel) {
            return Err(ConfigError::RadioChannel(self.radio_channel));
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
