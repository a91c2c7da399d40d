//! Log drain: turns [`LogEntry`] records into console lines.
//!
//! # Output format
//!
//! ```text
//! [    123456] INFO: Started transmitting
//! [WARN] Dropped log entries: 3
//! [STAT] tx=128 txfail=0 rx=512 rxbad=1 drop=0 under=2048 cap=0 play=0
//! ```
//!
//! Formatting is `core::fmt` only, so the same code runs on target (console
//! UART via stdout) and in host tests (into a `String`).

use core::fmt::Write;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::logging::{LogEntry, LogStream, SliceWriter};
use crate::stats::StatsSnapshot;

/// Longest formatted line.
pub const LINE_BUFFER_SIZE: usize = 192;

/// Format log entry into `buf`.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = SliceWriter::new(buf);
    let _ = writeln!(
        writer,
        "[{:10}] {}: {}",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.message()
    );
    writer.len()
}

/// Drain every pending entry of `stream` into `out`.
///
/// Reports (and resets) the dropped counter after the entries.
/// Returns the number of entries written.
pub fn drain_to<W: Write, const N: usize>(stream: &LogStream<N>, out: &mut W) -> usize {
    let mut line = [0u8; LINE_BUFFER_SIZE];
    let mut count = 0;

    while let Some(entry) = stream.drain() {
        let len = format_log_entry(&entry, &mut line);
        let _ = out.write_str(core::str::from_utf8(&line[..len]).unwrap_or("<invalid utf8>\n"));
        count += 1;
    }

    let dropped = stream.dropped();
    if dropped > 0 {
        let _ = writeln!(out, "[WARN] Dropped log entries: {}", dropped);
        stream.reset_dropped();
    }

    count
}

/// Single-drain guard for a [`LogStream`].
///
/// The stream allows one consumer at a time. Every context that drains it
/// (the periodic drain thread, the fatal-error path) goes through the same
/// lock.
pub struct DrainLock {
    busy: AtomicBool,
}

impl DrainLock {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Drain `stream` into `out` unless another context is draining.
    ///
    /// Returns `None` without touching the stream if the lock is held.
    pub fn drain_to<W: Write, const N: usize>(
        &self,
        stream: &LogStream<N>,
        out: &mut W,
    ) -> Option<usize> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return None;
        }
        let count = drain_to(stream, out);
        self.busy.store(false, Ordering::Release);
        Some(count)
    }
}

impl Default for DrainLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one statistics line.
pub fn write_stats<W: Write>(out: &mut W, snap: &StatsSnapshot) -> core::fmt::Result {
    writeln!(
        out,
        "[STAT] tx={} txfail={} rx={} rxbad={} drop={} under={} cap={} play={}",
        snap.frames_sent,
        snap.send_failures,
        snap.frames_received,
        snap.frames_rejected,
        snap.ring_dropped,
        snap.ring_underrun,
        snap.capture_errors,
        snap.playback_errors,
    )
}
