//! Hardware Abstraction Layer for WalkieRelay.
//!
//! Narrow contracts for the collaborators the relay core drives.
//! Business logic stays in core modules, HAL is just I/O.
//! ESP-IDF implementations live in [`esp`] (target builds only); tests
//! substitute host fakes.

#[cfg(target_os = "espidf")]
pub mod esp;

use crate::sample::Sample;
use crate::transport::FrameHandler;

/// Collaborator failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HalError {
    /// Operation needs a started device
    #[error("device not started")]
    NotStarted,
    /// Device or link temporarily unable to accept work
    #[error("device busy")]
    Busy,
    /// Radio has no peer to send to
    #[error("no peer configured")]
    NoPeer,
    /// Requested mode not supported by this device
    #[error("unsupported configuration")]
    Unsupported,
    /// Driver error code (ESP-IDF `esp_err_t` on target)
    #[error("driver error {0}")]
    Driver(i32),
}

/// Microphone capture.
pub trait AudioCapture {
    /// Start sampling.
    fn start(&mut self) -> Result<(), HalError>;

    /// Stop sampling.
    fn stop(&mut self) -> Result<(), HalError>;

    /// Block until up to `buf.len()` samples are available.
    ///
    /// Returns the number of samples written to `buf`.
    fn read(&mut self, buf: &mut [Sample]) -> Result<usize, HalError>;
}

/// Speaker output.
pub trait AudioSink {
    /// Start output at `sample_rate_hz`.
    fn start(&mut self, sample_rate_hz: u32) -> Result<(), HalError>;

    /// Stop output.
    fn stop(&mut self) -> Result<(), HalError>;

    /// Play `buf`. Blocks for the playback duration of the chunk.
    fn write(&mut self, buf: &[Sample]) -> Result<(), HalError>;
}

/// Best-effort broadcast radio.
///
/// No ordering, no acknowledgement, no retransmission.
pub trait RadioLink {
    /// One-time bring-up (channel, broadcast peer).
    fn begin(&mut self) -> Result<(), HalError>;

    /// Broadcast one frame. Must not block for longer than a few
    /// milliseconds.
    fn broadcast(&mut self, frame: &[u8]) -> Result<(), HalError>;

    /// Register the handler invoked for every inbound frame.
    ///
    /// The handler runs in the radio's own context, concurrently with the
    /// relay loop.
    fn set_frame_handler<H>(&mut self, handler: H) -> Result<(), HalError>
    where
        H: FrameHandler + Send + 'static;
}

/// Visual status. Purely observational.
pub trait StatusIndicator {
    /// Colour shown when not flashing (0 = off).
    fn set_default_color(&mut self, color: u32);

    /// Flash `color`, or fall back to the default colour.
    fn set_flashing(&mut self, enabled: bool, color: u32);
}

/// Push-to-talk input.
pub trait PushToTalk {
    /// True while the button requests transmit.
    fn is_asserted(&mut self) -> bool;
}

/// Monotonic time source.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin.
    fn now_us(&self) -> u64;
}

/// Owned collaborators injected into the relay coordinator.
pub struct RelayDevices<M, S, I, P, K> {
    pub mic: M,
    pub speaker: S,
    pub indicator: I,
    pub ptt: P,
    pub clock: K,
}
