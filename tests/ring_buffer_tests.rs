//! Playback ring tests

use std::sync::Arc;
use std::thread;

use walkie_relay::sample::SILENCE;
use walkie_relay::SampleRing;

#[test]
fn test_ring_empty() {
    let ring: SampleRing<64> = SampleRing::new();
    assert!(ring.is_empty());
    assert_eq!(ring.len(), 0);
    assert_eq!(ring.available(), 64);
    assert_eq!(ring.capacity(), 64);
}

#[test]
fn test_ring_fifo_order() {
    let ring: SampleRing<64> = SampleRing::new();
    ring.push(&[100, 200]);
    ring.push(&[300]);

    let mut out = [0i16; 3];
    assert_eq!(ring.pop(&mut out), 3);
    assert_eq!(out, [100, 200, 300]);
    assert!(ring.is_empty());
}

#[test]
fn test_ring_len_never_exceeds_capacity() {
    let ring: SampleRing<8> = SampleRing::new();
    for i in 0..20 {
        ring.push(&[i, i + 1, i + 2]);
        assert!(ring.len() <= 8);
    }
    assert_eq!(ring.len(), 8);
}

#[test]
fn test_ring_overflow_drops_oldest() {
    let ring: SampleRing<4> = SampleRing::new();
    ring.push(&[1, 2, 3]);
    ring.push(&[4, 5, 6]);

    // 1 and 2 discarded
    assert_eq!(ring.dropped(), 2);
    let mut out = [0i16; 4];
    assert_eq!(ring.pop(&mut out), 4);
    assert_eq!(out, [3, 4, 5, 6]);
}

#[test]
fn test_ring_oversized_push_keeps_newest() {
    let ring: SampleRing<4> = SampleRing::new();
    ring.push(&[9]);
    ring.push(&[1, 2, 3, 4, 5, 6]);

    let mut out = [0i16; 4];
    ring.pop(&mut out);
    assert_eq!(out, [3, 4, 5, 6]);
    assert_eq!(ring.dropped(), 3);
}

#[test]
fn test_ring_underflow_fills_silence() {
    let ring: SampleRing<16> = SampleRing::new();
    ring.push(&[7, 8]);

    let mut out = [-1i16; 5];
    assert_eq!(ring.pop(&mut out), 2);
    assert_eq!(out, [7, 8, SILENCE, SILENCE, SILENCE]);
    assert_eq!(ring.underrun(), 3);
}

#[test]
fn test_ring_pop_empty_is_all_silence() {
    let ring: SampleRing<16> = SampleRing::new();
    let mut out = [42i16; 8];
    assert_eq!(ring.pop(&mut out), 0);
    assert!(out.iter().all(|&s| s == SILENCE));
}

#[test]
fn test_ring_wrap_around() {
    let ring: SampleRing<4> = SampleRing::new();
    let mut out = [0i16; 2];

    ring.push(&[1, 2, 3]);
    ring.pop(&mut out);
    assert_eq!(out, [1, 2]);

    // Tail wraps past the end of storage
    ring.push(&[4, 5, 6]);
    let mut rest = [0i16; 4];
    assert_eq!(ring.pop(&mut rest), 4);
    assert_eq!(rest, [3, 4, 5, 6]);
    assert_eq!(ring.dropped(), 0);
}

#[test]
fn test_ring_pop_frees_room_before_copy() {
    let ring: SampleRing<4> = SampleRing::new();
    ring.push(&[1, 2, 3, 4]);

    let mut out = [0i16; 2];
    ring.pop(&mut out);
    // Room freed by the pop is counted as free space, not as overflow
    ring.push(&[5, 6]);
    assert_eq!(ring.dropped(), 0);
    assert_eq!(out, [1, 2]);

    let mut rest = [0i16; 4];
    assert_eq!(ring.pop(&mut rest), 4);
    assert_eq!(rest, [3, 4, 5, 6]);
}

#[test]
fn test_ring_clear() {
    let ring: SampleRing<8> = SampleRing::new();
    ring.push(&[1, 2, 3]);
    ring.clear();
    assert!(ring.is_empty());

    ring.push(&[4]);
    let mut out = [0i16; 1];
    ring.pop(&mut out);
    assert_eq!(out, [4]);
}

#[test]
fn test_ring_spsc_threads() {
    const TOTAL: i16 = 20_000;
    let ring: Arc<SampleRing<256>> = Arc::new(SampleRing::new());

    let producer = {
        let ring = Arc::clone(&ring);
        thread::spawn(move || {
            let mut next = 1i16;
            while next <= TOTAL {
                // Wait for room so nothing is dropped
                if ring.available() >= 8 {
                    let chunk: Vec<i16> = (next..next.saturating_add(8).min(TOTAL + 1)).collect();
                    ring.push(&chunk);
                    next += chunk.len() as i16;
                } else {
                    thread::yield_now();
                }
            }
        })
    };

    let mut received = Vec::with_capacity(TOTAL as usize);
    let mut buf = [0i16; 16];
    while received.len() < TOTAL as usize {
        let n = ring.pop(&mut buf);
        received.extend_from_slice(&buf[..n]);
        if n == 0 {
            thread::yield_now();
        }
    }
    producer.join().unwrap();

    // Order preserved, no gaps, no duplicates
    let expected: Vec<i16> = (1..=TOTAL).collect();
    assert_eq!(received, expected);
    assert_eq!(ring.dropped(), 0);
}
