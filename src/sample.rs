//! Module: sample
//!
//! Purpose: PCM sample type shared by capture, transport and playback.
//!
//! Architecture:
//! - Mono, signed 16-bit, fixed sample rate (device constant)
//! - No compression: every sample travels verbatim
//! - Silence is the zero amplitude
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// One mono PCM amplitude.
pub type Sample = i16;

/// Zero amplitude, used to pad playback on underrun.
pub const SILENCE: Sample = 0;

/// Playback duration of `count` samples at `sample_rate_hz`, in microseconds.
///
/// Returns 0 for a zero sample rate.
#[inline]
pub const fn duration_us(count: usize, sample_rate_hz: u32) -> u64 {
    if sample_rate_hz == 0 {
        return 0;
    }
    (count as u64 * 1_000_000) / sample_rate_hz as u64
}

/// Convert a raw 32-bit I2S MEMS word into a 16-bit sample.
///
/// MEMS microphones deliver 24 significant bits left-aligned in a 32-bit
/// slot. The low nibble is noise; the value is scaled down by 2^11 and
/// saturated into the 16-bit range.
#[inline]
pub fn from_mems_word(raw: i32) -> Sample {
    let scaled = (raw & !0xF) >> 11;
    scaled.clamp(Sample::MIN as i32, Sample::MAX as i32) as Sample
}
