//! Shared engine control block
//!
//! Everything the tick shares with the configuration/glue contexts, held
//! in single-word atomics. Multi-word data (the duty bounds pair) are
//! packed into one word, so a tick-side snapshot is one load and can never
//! be torn. This is the hosted mapping of the interrupt-masking critical
//! sections the carrier update would run under on bare metal.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::config::EngineConfig;
use crate::duty::DutyRange;
use crate::tone::phase_increment;

/// Operating mode of the carrier scheduler.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    /// Drain the handoff buffer (external audio).
    #[default]
    Streaming = 0,
    /// Drive the tone synthesizer (no external input).
    SelfTest = 1,
}

impl EngineMode {
    /// Convert from raw u8 value.
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::SelfTest,
            _ => Self::Streaming,
        }
    }
}

/// Shared control state, safe to touch from both contexts.
///
/// Mode transitions, retunes and duty-bounds changes are external
/// configuration actions; the tick only reads.
pub struct EngineControl {
    /// Tick gate: while clear, the tick returns without touching the
    /// carrier.
    running: AtomicBool,
    mode: AtomicU8,
    /// Q16.16 phase increment for the self-test tone.
    phase_inc: AtomicU32,
    /// Packed [`DutyRange`] ([`DutyRange::to_bits`]).
    duty_bounds: AtomicU32,
    /// Tick rate the phase increments are derived against.
    tick_rate_hz: AtomicU32,
    /// Bumped once per applied change; readers can detect reconfiguration.
    generation: AtomicU32,
}

impl EngineControl {
    /// Create an unconfigured control block (stopped, streaming, all
    /// rates zero).
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            mode: AtomicU8::new(EngineMode::Streaming as u8),
            phase_inc: AtomicU32::new(0),
            duty_bounds: AtomicU32::new(0),
            tick_rate_hz: AtomicU32::new(0),
            generation: AtomicU32::new(0),
        }
    }

    /// Gate the tick on. Idempotent.
    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Quiesce the tick: further ticks leave the carrier untouched.
    /// Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[inline]
    pub fn mode(&self) -> EngineMode {
        EngineMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Switch between streaming and self-test. Takes effect on the next
    /// tick.
    pub fn set_mode(&self, mode: EngineMode) {
        self.mode.store(mode as u8, Ordering::Release);
        self.bump();
    }

    #[inline]
    pub fn phase_inc(&self) -> u32 {
        self.phase_inc.load(Ordering::Acquire)
    }

    /// Retune the self-test tone. One word store: a tick sees either the
    /// old or the new increment, never a mixture.
    pub fn retune(&self, tone_hz: u32) {
        let rate = self.tick_rate_hz.load(Ordering::Acquire);
        self.phase_inc
            .store(phase_increment(tone_hz, rate), Ordering::Release);
        self.bump();
    }

    #[inline]
    pub fn duty_range(&self) -> DutyRange {
        DutyRange::from_bits(self.duty_bounds.load(Ordering::Acquire))
    }

    /// Publish new duty bounds as one packed word.
    pub fn set_duty_range(&self, range: DutyRange) {
        self.duty_bounds.store(range.to_bits(), Ordering::Release);
        self.bump();
    }

    #[inline]
    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz.load(Ordering::Acquire)
    }

    /// Configuration generation; bumped on every applied change.
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Apply a validated configuration. Each field is a single-word
    /// publish; callers validate first ([`EngineConfig::validate`]).
    pub(crate) fn apply(&self, cfg: &EngineConfig) {
        self.tick_rate_hz.store(cfg.tick_rate_hz, Ordering::Release);
        self.mode.store(cfg.mode as u8, Ordering::Release);
        self.duty_bounds.store(cfg.duty.to_bits(), Ordering::Release);
        self.phase_inc.store(
            phase_increment(cfg.tone_hz, cfg.tick_rate_hz),
            Ordering::Release,
        );
        self.bump();
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for EngineControl {
    fn default() -> Self {
        Self::new()
    }
}
