//! Relay diagnostics.
//!
//! # Philosophy
//!
//! > Voice tolerates loss, not stalls.
//!
//! Every recoverable failure (dropped frame, malformed frame, underrun,
//! driver hiccup) is absorbed where it happens and only counted here.
//! Counters are never cleared; they are observational and never feed back
//! into relay decisions.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::audio::SampleRing;

/// Event counters shared by the relay task and the radio receive context.
pub struct RelayStats {
    /// Frames handed to the radio successfully.
    frames_sent: AtomicU32,

    /// Frames the radio refused (dropped, not retried).
    send_failures: AtomicU32,

    /// Inbound frames decoded into the playback ring.
    frames_received: AtomicU32,

    /// Inbound frames discarded as malformed or foreign.
    frames_rejected: AtomicU32,

    /// Microphone reads that failed.
    capture_errors: AtomicU32,

    /// Speaker writes that failed.
    playback_errors: AtomicU32,
}

impl RelayStats {
    /// Create zeroed counters.
    pub const fn new() -> Self {
        Self {
            frames_sent: AtomicU32::new(0),
            send_failures: AtomicU32::new(0),
            frames_received: AtomicU32::new(0),
            frames_rejected: AtomicU32::new(0),
            capture_errors: AtomicU32::new(0),
            playback_errors: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn record_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_capture_error(&self) {
        self.capture_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_playback_error(&self) {
        self.playback_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames sent since boot.
    #[inline]
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    /// Frames dropped by the radio since boot.
    #[inline]
    pub fn send_failures(&self) -> u32 {
        self.send_failures.load(Ordering::Relaxed)
    }

    /// Inbound frames accepted since boot.
    #[inline]
    pub fn frames_received(&self) -> u32 {
        self.frames_received.load(Ordering::Relaxed)
    }

    /// Inbound frames rejected since boot.
    #[inline]
    pub fn frames_rejected(&self) -> u32 {
        self.frames_rejected.load(Ordering::Relaxed)
    }

    /// Snapshot of all counters, including the ring's drop/underrun totals.
    pub fn snapshot<const C: usize>(&self, ring: &SampleRing<C>) -> StatsSnapshot {
        StatsSnapshot {
            frames_sent: self.frames_sent(),
            send_failures: self.send_failures(),
            frames_received: self.frames_received(),
            frames_rejected: self.frames_rejected(),
            capture_errors: self.capture_errors.load(Ordering::Relaxed),
            playback_errors: self.playback_errors.load(Ordering::Relaxed),
            ring_dropped: ring.dropped(),
            ring_underrun: ring.underrun(),
        }
    }
}

impl Default for RelayStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_sent: u32,
    pub send_failures: u32,
    pub frames_received: u32,
    pub frames_rejected: u32,
    pub capture_errors: u32,
    pub playback_errors: u32,
    pub ring_dropped: u32,
    pub ring_underrun: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_start_at_zero() {
        let stats = RelayStats::new();
        let ring = SampleRing::<4>::new();
        assert_eq!(stats.snapshot(&ring), StatsSnapshot::default());
    }

    #[test]
    fn test_snapshot_collects_ring_counters() {
        let stats = RelayStats::new();
        let ring = SampleRing::<2>::new();

        stats.record_sent();
        stats.record_sent();
        stats.record_send_failure();
        stats.record_rejected();
        stats.record_playback_error();

        ring.push(&[1, 2, 3]); // drops 1
        let mut out = [0; 4];
        ring.pop(&mut out); // 2 silence

        let snap = stats.snapshot(&ring);
        assert_eq!(snap.frames_sent, 2);
        assert_eq!(snap.send_failures, 1);
        assert_eq!(snap.frames_rejected, 1);
        assert_eq!(snap.playback_errors, 1);
        assert_eq!(snap.ring_dropped, 1);
        assert_eq!(snap.ring_underrun, 2);
    }
}
