//! Radio transport for the voice relay.
//!
//! # Send path
//!
//! ```text
//! add_sample() ──▶ [TransmitAccumulator] ──full/flush──▶ FrameCodec::pack ──▶ RadioLink::broadcast
//! ```
//!
//! # Receive path
//!
//! ```text
//! radio callback ──▶ FrameReceiver::on_frame ──▶ FrameCodec::unpack ──▶ SampleRing::push
//! ```
//!
//! Send failures are counted and reported to the caller, never retried.
//! Malformed inbound frames are counted and discarded.

use crate::audio::SampleRing;
use crate::frame::{FrameCodec, FrameError, MAX_FRAME_BYTES, MAX_SAMPLES_PER_FRAME};
use crate::hal::{HalError, RadioLink};
use crate::sample::{Sample, SILENCE};
use crate::stats::RelayStats;

/// Inbound frame consumer, invoked from the radio receive context.
pub trait FrameHandler {
    fn on_frame(&self, frame: &[u8]);
}

/// Samples collected since the last frame emission.
pub struct TransmitAccumulator {
    samples: [Sample; MAX_SAMPLES_PER_FRAME],
    len: usize,
}

impl TransmitAccumulator {
    pub const fn new() -> Self {
        Self {
            samples: [SILENCE; MAX_SAMPLES_PER_FRAME],
            len: 0,
        }
    }

    /// Append one sample. Returns false if already full.
    #[inline]
    pub fn push(&mut self, sample: Sample) -> bool {
        if self.len == MAX_SAMPLES_PER_FRAME {
            return false;
        }
        self.samples[self.len] = sample;
        self.len += 1;
        true
    }

    #[inline]
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for TransmitAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the radio send surface and the transmit chunker.
pub struct Transport<'a, R> {
    radio: R,
    codec: FrameCodec<'a>,
    pending: TransmitAccumulator,
    frame: [u8; MAX_FRAME_BYTES],
    stats: &'a RelayStats,
}

impl<'a, R: RadioLink> Transport<'a, R> {
    pub fn new(radio: R, codec: FrameCodec<'a>, stats: &'a RelayStats) -> Self {
        Self {
            radio,
            codec,
            pending: TransmitAccumulator::new(),
            frame: [0; MAX_FRAME_BYTES],
            stats,
        }
    }

    /// Radio bring-up.
    pub fn begin(&mut self) -> Result<(), HalError> {
        self.radio.begin()
    }

    /// Queue one captured sample.
    ///
    /// Crossing the frame size emits a full frame. The result describes
    /// that frame: `Err` means it was dropped. With no frame emitted the
    /// result is always `Ok`.
    pub fn add_sample(&mut self, sample: Sample) -> Result<(), HalError> {
        self.pending.push(sample);
        if self.pending.len() >= self.codec.max_samples() {
            return self.send_pending();
        }
        Ok(())
    }

    /// Emit whatever is buffered as a short final frame.
    ///
    /// No-op on an empty accumulator.
    pub fn flush(&mut self) -> Result<(), HalError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.send_pending()
    }

    fn send_pending(&mut self) -> Result<(), HalError> {
        let result = match self.codec.pack(self.pending.as_slice(), &mut self.frame) {
            Ok(len) => self.radio.broadcast(&self.frame[..len]),
            // Accumulator is bounded by the codec, cannot happen
            Err(_) => Err(HalError::Unsupported),
        };
        self.pending.clear();

        match result {
            Ok(()) => self.stats.record_sent(),
            Err(_) => self.stats.record_send_failure(),
        }
        result
    }

    /// Samples waiting for the next frame
    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn codec(&self) -> FrameCodec<'a> {
        self.codec
    }

    #[inline]
    pub fn radio(&self) -> &R {
        &self.radio
    }

    #[inline]
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Receive-side handle feeding `ring`.
    pub fn receiver<const C: usize>(&self, ring: &'a SampleRing<C>) -> FrameReceiver<'a, C> {
        FrameReceiver {
            codec: self.codec,
            ring,
            stats: self.stats,
        }
    }
}

impl<R: RadioLink> Transport<'static, R> {
    /// Route inbound frames from the radio into `ring`.
    pub fn listen<const C: usize>(&mut self, ring: &'static SampleRing<C>) -> Result<(), HalError> {
        let receiver = self.receiver(ring);
        self.radio.set_frame_handler(receiver)
    }
}

/// Receive path: decodes inbound frames into the playback ring.
///
/// Safe to call from the radio context while the relay loop pops from the
/// same ring (single producer).
#[derive(Clone, Copy)]
pub struct FrameReceiver<'a, const C: usize> {
    codec: FrameCodec<'a>,
    ring: &'a SampleRing<C>,
    stats: &'a RelayStats,
}

impl<'a, const C: usize> FrameReceiver<'a, C> {
    /// Decode `frame` and buffer its samples.
    ///
    /// Returns the number of samples buffered.
    pub fn receive(&self, frame: &[u8]) -> Result<usize, FrameError> {
        let payload = match self.codec.unpack(frame) {
            Ok(payload) => payload,
            Err(e) => {
                self.stats.record_rejected();
                return Err(e);
            }
        };

        let mut decoded = [SILENCE; MAX_SAMPLES_PER_FRAME];
        let n = payload.copy_into(&mut decoded);
        self.ring.push(&decoded[..n]);
        self.stats.record_received();
        Ok(n)
    }
}

impl<const C: usize> FrameHandler for FrameReceiver<'_, C> {
    fn on_frame(&self, frame: &[u8]) {
        let _ = self.receive(frame);
    }
}
