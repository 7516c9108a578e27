//! Audio envelope extraction
//!
//! Transforms bursts of raw stereo PCM into a trickle of decimated,
//! filtered envelope samples. All the non-O(1) work in the signal chain
//! lives here, in the delivery context; the tick only pops finished values.

use crate::buffer::SampleHandoffBuffer;

/// Upper bound of the unsigned envelope domain.
pub const ENV_MAX: u16 = 32767;

/// DC bias: silence maps to mid-scale, and the carrier modulates
/// symmetrically around it.
pub const ENV_MID: i16 = 16384;

/// Headroom shift applied before biasing (halves the signal swing).
const HEADROOM_SHIFT: u32 = 1;

/// Stereo to mono reduction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonoPolicy {
    /// Average of both channels.
    #[default]
    Average,
    /// Left channel passthrough.
    Left,
    /// Right channel passthrough.
    Right,
}

/// Producer-side envelope extractor.
///
/// Holds the only carried-over numeric state in the chain (the one-pole
/// filter accumulator) plus the decimation counter. One instance per
/// delivery context.
pub struct EnvelopeExtractor<'a, const N: usize> {
    buffer: &'a SampleHandoffBuffer<N>,
    policy: MonoPolicy,
    /// Low-pass coefficient as a right shift: alpha = 1/2^shift, 0 bypasses.
    filter_shift: u32,
    /// Forward every `decimation`-th filtered sample.
    decimation: u32,
    decim_count: u32,
    filter_state: i32,
}

impl<'a, const N: usize> EnvelopeExtractor<'a, N> {
    /// Create an extractor feeding `buffer`.
    ///
    /// A zero `decimation` is treated as 1 (no decimation).
    pub fn new(
        buffer: &'a SampleHandoffBuffer<N>,
        policy: MonoPolicy,
        filter_shift: u32,
        decimation: u32,
    ) -> Self {
        Self {
            buffer,
            policy,
            filter_shift,
            decimation: if decimation == 0 { 1 } else { decimation },
            decim_count: 0,
            filter_state: 0,
        }
    }

    /// Delivery-context entry point: consume a burst of raw bytes holding
    /// consecutive little-endian signed 16-bit stereo frames.
    ///
    /// Bursts may be any length; a trailing partial frame is ignored.
    /// Never blocks — on a full ring the decimated sample is dropped
    /// silently.
    pub fn push_frames(&mut self, bytes: &[u8]) {
        for frame in bytes.chunks_exact(4) {
            let left = i16::from_le_bytes([frame[0], frame[1]]);
            let right = i16::from_le_bytes([frame[2], frame[3]]);
            self.process_frame(left, right);
        }
    }

    /// Run one stereo frame through the chain. Produces zero or one
    /// ring-buffer entries.
    pub fn process_frame(&mut self, left: i16, right: i16) {
        let mono = match self.policy {
            MonoPolicy::Average => (left as i32 + right as i32) >> 1,
            MonoPolicy::Left => left as i32,
            MonoPolicy::Right => right as i32,
        };

        // One-pole low-pass: state += (x - state) >> k. Runs on every
        // frame; decimation only gates the output.
        if self.filter_shift > 0 {
            self.filter_state += (mono - self.filter_state) >> self.filter_shift;
        } else {
            self.filter_state = mono;
        }

        self.decim_count += 1;
        if self.decim_count < self.decimation {
            return;
        }
        self.decim_count = 0;

        // Headroom shift, DC bias to mid-scale, clamp into the unsigned
        // envelope domain.
        let env = ((self.filter_state >> HEADROOM_SHIFT) + ENV_MID as i32)
            .clamp(0, ENV_MAX as i32);
        let _ = self.buffer.push(env as i16);
    }

    /// Filter accumulator (diagnostics, tests).
    #[inline]
    pub fn filter_state(&self) -> i32 {
        self.filter_state
    }

    /// Reset the carried-over state (filter and decimation phase).
    pub fn reset(&mut self) {
        self.filter_state = 0;
        self.decim_count = 0;
    }
}
