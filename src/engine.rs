//! Modulation engine assembly
//!
//! Process-lifetime singleton owning the handoff buffer and the shared
//! control block. Const-constructible so it can live in a `static`; each
//! context asks it for its own handle once at startup.

use crate::buffer::SampleHandoffBuffer;
use crate::config::{ConfigError, EngineConfig};
use crate::control::EngineControl;
use crate::envelope::EnvelopeExtractor;
use crate::scheduler::CarrierScheduler;

/// Default handoff buffer slot count.
pub const DEFAULT_BUFFER_SIZE: usize = 512;

/// The modulation engine: one per transducer array, alive for the whole
/// process.
///
/// ```ignore
/// static ENGINE: ModulationEngine = ModulationEngine::new();
///
/// // startup
/// ENGINE.configure(&EngineConfig::default())?;
/// ENGINE.start();
///
/// // delivery context
/// let mut extractor = ENGINE.extractor(&cfg);
/// extractor.push_frames(pcm_bytes);
///
/// // tick context
/// let mut scheduler = ENGINE.scheduler();
/// scheduler.on_tick(&mut carrier);
/// ```
pub struct ModulationEngine<const N: usize = DEFAULT_BUFFER_SIZE> {
    buffer: SampleHandoffBuffer<N>,
    control: EngineControl,
}

impl<const N: usize> ModulationEngine<N> {
    /// Create a stopped, unconfigured engine.
    pub const fn new() -> Self {
        Self {
            buffer: SampleHandoffBuffer::new(),
            control: EngineControl::new(),
        }
    }

    /// Validate and apply a configuration.
    ///
    /// Nothing is applied on rejection. Safe against a live tick: every
    /// applied field is a single-word atomic publish.
    pub fn configure(&self, cfg: &EngineConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        self.control.apply(cfg);
        Ok(())
    }

    /// Gate the tick on. Idempotent.
    pub fn start(&self) {
        self.control.start();
    }

    /// Quiesce the tick. Idempotent.
    pub fn stop(&self) {
        self.control.stop();
    }

    /// Producer-side handle for the delivery context. Create exactly one.
    pub fn extractor(&self, cfg: &EngineConfig) -> EnvelopeExtractor<'_, N> {
        EnvelopeExtractor::new(
            &self.buffer,
            cfg.mono_policy,
            cfg.filter_shift,
            cfg.decimation(),
        )
    }

    /// Consumer-side handle for the tick context. Create exactly one.
    pub fn scheduler(&self) -> CarrierScheduler<'_, N> {
        CarrierScheduler::new(&self.buffer, &self.control)
    }

    /// Shared control block (mode, retune, duty bounds, start/stop).
    #[inline]
    pub fn control(&self) -> &EngineControl {
        &self.control
    }

    /// Handoff buffer (diagnostic counters).
    #[inline]
    pub fn buffer(&self) -> &SampleHandoffBuffer<N> {
        &self.buffer
    }
}

impl<const N: usize> Default for ModulationEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}
