//! Lock-free envelope sample handoff
//!
//! SPSC ring between the audio-delivery context (producer) and the
//! carrier-update tick (consumer). Push drops on full, pop holds the last
//! value on empty: at these rates a dropped or repeated envelope sample is
//! inaudible, a blocked tick is not.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, Ordering};

/// SPSC ring buffer for envelope-domain samples.
///
/// `N` must be a power of two; one slot is sacrificed to tell full from
/// empty with only two indices, so usable capacity is `N - 1`.
///
/// # Safety contract
///
/// - Exactly one context calls [`push`](Self::push) (delivery).
/// - Exactly one context calls [`pop_or_last`](Self::pop_or_last) (tick).
/// - `head` is written only by the producer, `tail` only by the consumer;
///   each side reads the other's index with Acquire and publishes its own
///   with Release.
pub struct SampleHandoffBuffer<const N: usize> {
    slots: UnsafeCell<[i16; N]>,
    /// Write index (producer-owned), stored pre-masked.
    head: AtomicU32,
    /// Read index (consumer-owned), stored pre-masked.
    tail: AtomicU32,
    /// Samples rejected because the ring was full.
    dropped: AtomicU32,
    /// Pops that fell back to the held value.
    underruns: AtomicU32,
}

// SAFETY: single producer, single consumer, coordination through the
// atomic indices. No mutable aliasing within the contract above.
unsafe impl<const N: usize> Sync for SampleHandoffBuffer<N> {}
unsafe impl<const N: usize> Send for SampleHandoffBuffer<N> {}

impl<const N: usize> SampleHandoffBuffer<N> {
    const MASK: u32 = (N - 1) as u32;

    /// Create an empty buffer.
    pub const fn new() -> Self {
        assert!(
            N.is_power_of_two() && N >= 2,
            "slot count must be a power of 2"
        );

        Self {
            slots: UnsafeCell::new([0i16; N]),
            head: AtomicU32::new(0),
            tail: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            underruns: AtomicU32::new(0),
        }
    }

    /// Push one sample (producer side). Never blocks.
    ///
    /// Returns `false` if the ring was full: the sample is dropped and the
    /// drop counter incremented. Full is "the next write index would equal
    /// the current read index".
    #[inline]
    pub fn push(&self, sample: i16) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & Self::MASK;
        if next == self.tail.load(Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // SAFETY: sole producer; `head != tail` here, so the consumer is
        // not reading this slot.
        unsafe {
            (*self.slots.get())[head as usize] = sample;
        }

        self.head.store(next, Ordering::Release);
        true
    }

    /// Pop the oldest sample, or return `last` unchanged if empty
    /// (consumer side). Never blocks; on empty the indices are untouched.
    #[inline]
    pub fn pop_or_last(&self, last: i16) -> i16 {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            self.underruns.fetch_add(1, Ordering::Relaxed);
            return last;
        }

        // SAFETY: sole consumer; `tail != head`, so this slot holds a
        // published sample.
        let sample = unsafe { (*self.slots.get())[tail as usize] };

        self.tail.store((tail + 1) & Self::MASK, Ordering::Release);
        sample
    }

    /// Number of buffered samples.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head.wrapping_sub(tail) & Self::MASK) as usize
    }

    /// True if nothing is buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usable capacity (`N - 1`).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Samples dropped on full since construction.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Pops that hit an empty ring since construction.
    #[inline]
    pub fn underruns(&self) -> u32 {
        self.underruns.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for SampleHandoffBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
