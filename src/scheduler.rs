//! Carrier update scheduler
//!
//! The per-tick consumer. Each invocation runs in bounded time: one
//! control snapshot, one sample acquisition, one map, one commit. No
//! allocation, no filtering, no formatting, no blocking — if the buffer is
//! empty the previous sample is held, because a missed deadline is worse
//! than a repeated sample.

use crate::buffer::SampleHandoffBuffer;
use crate::control::{EngineControl, EngineMode};
use crate::envelope::ENV_MID;
use crate::tone::ToneSynthesizer;

/// Carrier output peripheral seam.
///
/// A committed duty takes effect at the next carrier cycle; the write is
/// assumed glitch-free.
pub trait CarrierOutput {
    fn set_duty(&mut self, duty: u16);
}

/// Tick-context consumer: drains the handoff buffer (or the tone
/// synthesizer in self-test) and commits one duty value per tick.
pub struct CarrierScheduler<'a, const N: usize> {
    buffer: &'a SampleHandoffBuffer<N>,
    control: &'a EngineControl,
    tone: ToneSynthesizer,
    /// Hold-last state; starts at mid-scale so the idle carrier sits at
    /// the duty midpoint.
    last_sample: i16,
}

impl<'a, const N: usize> CarrierScheduler<'a, N> {
    pub fn new(buffer: &'a SampleHandoffBuffer<N>, control: &'a EngineControl) -> Self {
        Self {
            buffer,
            control,
            tone: ToneSynthesizer::new(),
            last_sample: ENV_MID,
        }
    }

    /// Periodic entry point. Call once per tick from the timer context.
    ///
    /// Returns the committed duty, or `None` when the engine is stopped
    /// (the carrier output is left untouched).
    #[inline]
    pub fn on_tick<O: CarrierOutput>(&mut self, out: &mut O) -> Option<u16> {
        if !self.control.is_running() {
            return None;
        }

        let envelope = match self.control.mode() {
            EngineMode::Streaming => {
                let sample = self.buffer.pop_or_last(self.last_sample);
                self.last_sample = sample;
                // Slots are envelope-domain by construction; clamp anyway.
                if sample < 0 {
                    0
                } else {
                    sample as u16
                }
            }
            EngineMode::SelfTest => self.tone.next_sample(self.control.phase_inc()),
        };

        let duty = self.control.duty_range().map(envelope);
        out.set_duty(duty);
        Some(duty)
    }

    /// Most recent hold-last value (envelope domain).
    #[inline]
    pub fn last_sample(&self) -> i16 {
        self.last_sample
    }

    /// Reset tick-side state: hold-last back to mid-scale, tone phase to
    /// zero.
    pub fn reset(&mut self) {
        self.last_sample = ENV_MID;
        self.tone.reset();
    }
}
