//! Playback ring buffer
//!
//! SPSC (single producer, single consumer) store of mono PCM samples that
//! sits between the radio receive callback and the speaker loop.
//!
//! - Producer: radio receive context, calls [`SampleRing::push`]
//! - Consumer: playback loop, calls [`SampleRing::pop`]
//! - Overflow: oldest samples are discarded (recency beats completeness)
//! - Underflow: shortfall is filled with silence, `pop` never waits
//!
//! Only the cursor update runs inside a critical section. Sample copies
//! happen outside it, into atomic slots, so a burst of inbound frames never
//! holds off the playback loop for longer than a few instructions.

use core::cell::Cell;
use core::sync::atomic::{AtomicI16, AtomicU32, Ordering};

use critical_section::Mutex;

use crate::sample::{Sample, SILENCE};

/// Cursor state, only touched inside a critical section.
#[derive(Clone, Copy)]
struct Cursors {
    /// Slot of the oldest buffered sample.
    head: usize,
    /// Number of buffered samples, always in `0..=C`.
    len: usize,
}

/// Fixed-capacity playback ring.
///
/// `C` is the capacity in samples, checked at compile time.
pub struct SampleRing<const C: usize> {
    slots: [AtomicI16; C],
    cursors: Mutex<Cell<Cursors>>,
    dropped: AtomicU32,
    underrun: AtomicU32,
}

impl<const C: usize> SampleRing<C> {
    /// Create new empty ring
    pub const fn new() -> Self {
        const { assert!(C > 0, "Ring capacity must be non-zero") };

        Self {
            slots: [const { AtomicI16::new(SILENCE) }; C],
            cursors: Mutex::new(Cell::new(Cursors { head: 0, len: 0 })),
            dropped: AtomicU32::new(0),
            underrun: AtomicU32::new(0),
        }
    }

    /// Append samples (producer side).
    ///
    /// If the ring cannot hold them all, the oldest buffered samples are
    /// discarded first. When `samples` alone exceeds the capacity only its
    /// last `C` samples are kept.
    pub fn push(&self, samples: &[Sample]) {
        if samples.is_empty() {
            return;
        }

        let mut lost = 0usize;
        let samples = if samples.len() > C {
            lost = samples.len() - C;
            &samples[lost..]
        } else {
            samples
        };

        // Tail only moves under the producer, so it is stable across the copy.
        let tail = critical_section::with(|cs| {
            let cur = self.cursors.borrow(cs).get();
            (cur.head + cur.len) % C
        });

        for (i, &s) in samples.iter().enumerate() {
            self.slots[(tail + i) % C].store(s, Ordering::Relaxed);
        }

        let overflow = critical_section::with(|cs| {
            let cell = self.cursors.borrow(cs);
            let mut cur = cell.get();
            let wanted = cur.len + samples.len();
            let overflow = wanted.saturating_sub(C);
            cur.head = (cur.head + overflow) % C;
            cur.len = wanted - overflow;
            cell.set(cur);
            overflow
        });

        lost += overflow;
        if lost > 0 {
            self.dropped.fetch_add(lost as u32, Ordering::Relaxed);
        }
    }

    /// Remove up to `out.len()` samples (consumer side).
    ///
    /// The part of `out` that cannot be served is filled with silence.
    /// Returns the number of real samples written.
    ///
    /// The cursor is committed before the slots are copied out. A `push`
    /// that lands in that window and would have overflowed without this
    /// pop may overwrite slots still being copied, and is not counted in
    /// [`dropped`](Self::dropped). Slots are atomic, so the cost is a
    /// glitch in the copied chunk.
    pub fn pop(&self, out: &mut [Sample]) -> usize {
        let (head, count) = critical_section::with(|cs| {
            let cell = self.cursors.borrow(cs);
            let mut cur = cell.get();
            let count = cur.len.min(out.len());
            let head = cur.head;
            cur.head = (cur.head + count) % C;
            cur.len -= count;
            cell.set(cur);
            (head, count)
        });

        for (i, slot) in out[..count].iter_mut().enumerate() {
            *slot = self.slots[(head + i) % C].load(Ordering::Relaxed);
        }

        let shortfall = out.len() - count;
        if shortfall > 0 {
            out[count..].fill(SILENCE);
            self.underrun.fetch_add(shortfall as u32, Ordering::Relaxed);
        }

        count
    }

    /// Number of buffered samples
    #[inline]
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.cursors.borrow(cs).get().len)
    }

    /// Check if ring is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Free space in samples
    #[inline]
    pub fn available(&self) -> usize {
        C - self.len()
    }

    /// Ring capacity in samples
    #[inline]
    pub const fn capacity(&self) -> usize {
        C
    }

    /// Discard all buffered samples
    pub fn clear(&self) {
        critical_section::with(|cs| {
            let cell = self.cursors.borrow(cs);
            let mut cur = cell.get();
            cur.head = (cur.head + cur.len) % C;
            cur.len = 0;
            cell.set(cur);
        });
    }

    /// Samples discarded by drop-oldest since boot
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Silence samples inserted by `pop` since boot
    #[inline]
    pub fn underrun(&self) -> u32 {
        self.underrun.load(Ordering::Relaxed)
    }
}

impl<const C: usize> Default for SampleRing<C> {
    fn default() -> Self {
        Self::new()
    }
}
