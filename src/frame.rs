//! Wire frame codec.
//!
//! # Layout
//!
//! ```text
//! [header: H bytes][s0 lo][s0 hi][s1 lo][s1 hi] ... [sN-1 lo][sN-1 hi]
//! ```
//!
//! - Header: deployment constant agreed between peers, compared bit-exact
//! - Payload: `1..=max_samples` little-endian `i16` samples
//! - Whole frame fits one ESP-NOW packet ([`MAX_FRAME_BYTES`])
//!
//! The codec is stateless and `Copy`; transmit and receive paths each hold
//! their own copy.

use crate::sample::Sample;

/// Largest radio payload (ESP-NOW limit).
pub const MAX_FRAME_BYTES: usize = 250;

/// Bytes per encoded sample.
pub const SAMPLE_BYTES: usize = 2;

/// Most samples any frame can carry (header-less).
pub const MAX_SAMPLES_PER_FRAME: usize = MAX_FRAME_BYTES / SAMPLE_BYTES;

/// Frame encode/decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Header leaves no room for a single sample
    #[error("header of {len} bytes leaves no room for samples")]
    HeaderTooLong { len: usize },
    /// Requested payload size is zero or does not fit a frame
    #[error("invalid payload size {max_samples}")]
    InvalidPayloadSize { max_samples: usize },
    /// Frame would carry no samples
    #[error("empty payload")]
    EmptyPayload,
    /// More samples than the codec allows
    #[error("{count} samples exceed frame limit of {max}")]
    TooManySamples { count: usize, max: usize },
    /// Output buffer cannot hold the frame
    #[error("buffer too small: need {needed}, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    /// Inbound frame shorter than the header
    #[error("truncated frame of {len} bytes")]
    Truncated { len: usize },
    /// Inbound header differs from ours
    #[error("header mismatch")]
    HeaderMismatch,
    /// Payload is not a whole number of samples
    #[error("odd payload length {len}")]
    OddPayload { len: usize },
}

/// Frame packer/unpacker bound to one deployment header.
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec<'h> {
    header: &'h [u8],
    max_samples: usize,
}

impl<'h> FrameCodec<'h> {
    /// Codec carrying as many samples as fit after `header`.
    pub fn new(header: &'h [u8]) -> Result<Self, FrameError> {
        let room = MAX_FRAME_BYTES.saturating_sub(header.len()) / SAMPLE_BYTES;
        if room == 0 {
            return Err(FrameError::HeaderTooLong { len: header.len() });
        }
        Ok(Self {
            header,
            max_samples: room,
        })
    }

    /// Codec with a fixed, smaller payload.
    pub fn with_max_samples(header: &'h [u8], max_samples: usize) -> Result<Self, FrameError> {
        let codec = Self::new(header)?;
        if max_samples == 0 || max_samples > codec.max_samples {
            return Err(FrameError::InvalidPayloadSize { max_samples });
        }
        Ok(Self {
            header,
            max_samples,
        })
    }

    /// Deployment header
    #[inline]
    pub fn header(&self) -> &'h [u8] {
        self.header
    }

    /// Samples per full frame
    #[inline]
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Encoded size of a frame carrying `count` samples
    #[inline]
    pub fn encoded_len(&self, count: usize) -> usize {
        self.header.len() + count * SAMPLE_BYTES
    }

    /// Pack `samples` behind the header into `out`.
    ///
    /// Returns the frame length.
    pub fn pack(&self, samples: &[Sample], out: &mut [u8]) -> Result<usize, FrameError> {
        if samples.is_empty() {
            return Err(FrameError::EmptyPayload);
        }
        if samples.len() > self.max_samples {
            return Err(FrameError::TooManySamples {
                count: samples.len(),
                max: self.max_samples,
            });
        }
        let needed = self.encoded_len(samples.len());
        if out.len() < needed {
            return Err(FrameError::BufferTooSmall {
                needed,
                available: out.len(),
            });
        }

        let (head, body) = out[..needed].split_at_mut(self.header.len());
        head.copy_from_slice(self.header);
        for (chunk, s) in body.chunks_exact_mut(SAMPLE_BYTES).zip(samples) {
            chunk.copy_from_slice(&s.to_le_bytes());
        }

        Ok(needed)
    }

    /// Validate an inbound frame and expose its payload.
    pub fn unpack<'f>(&self, frame: &'f [u8]) -> Result<Payload<'f>, FrameError> {
        if frame.len() < self.header.len() {
            return Err(FrameError::Truncated { len: frame.len() });
        }
        let (head, body) = frame.split_at(self.header.len());
        if head != self.header {
            return Err(FrameError::HeaderMismatch);
        }
        if body.is_empty() {
            return Err(FrameError::EmptyPayload);
        }
        if body.len() % SAMPLE_BYTES != 0 {
            return Err(FrameError::OddPayload { len: body.len() });
        }
        let count = body.len() / SAMPLE_BYTES;
        if count > self.max_samples {
            return Err(FrameError::TooManySamples {
                count,
                max: self.max_samples,
            });
        }

        Ok(Payload { bytes: body })
    }
}

/// Validated payload of an inbound frame.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'f> {
    bytes: &'f [u8],
}

impl<'f> Payload<'f> {
    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / SAMPLE_BYTES
    }

    /// Always false for a validated payload
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decoded samples in wire order
    pub fn samples(&self) -> impl Iterator<Item = Sample> + 'f {
        self.bytes
            .chunks_exact(SAMPLE_BYTES)
            .map(|b| Sample::from_le_bytes([b[0], b[1]]))
    }

    /// Decode into `out`, returns samples written.
    pub fn copy_into(&self, out: &mut [Sample]) -> usize {
        let mut n = 0;
        for (slot, s) in out.iter_mut().zip(self.samples()) {
            *slot = s;
            n += 1;
        }
        n
    }
}
