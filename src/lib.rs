//! # ParametricSpeaker
//!
//! Modulation engine for a directional (parametric) ultrasonic speaker.
//! A fixed 40 kHz carrier is amplitude-modulated with an audio envelope so
//! that nonlinear demodulation in air reconstructs audible sound along a
//! narrow beam.
//!
//! ## Architecture
//!
//! Two contexts, one lock-free seam:
//! - The delivery context feeds PCM bursts through [`EnvelopeExtractor`]
//!   into the [`SampleHandoffBuffer`].
//! - The tick context drains one envelope sample per carrier update via
//!   [`CarrierScheduler`] and commits a duty value through
//!   [`scheduler::CarrierOutput`].
//!
//! No callbacks between components, no mutexes: everything shared across
//! the two contexts is a single-word atomic on [`EngineControl`], so a tick
//! can never observe a torn update.

#![cfg_attr(not(test), no_std)]

pub mod buffer;
pub mod config;
pub mod control;
pub mod duty;
pub mod engine;
pub mod envelope;
pub mod logging;
pub mod scheduler;
pub mod tone;

pub use buffer::SampleHandoffBuffer;
pub use config::{ConfigError, EngineConfig};
pub use control::{EngineControl, EngineMode};
pub use duty::DutyRange;
pub use engine::{ModulationEngine, DEFAULT_BUFFER_SIZE};
pub use envelope::{EnvelopeExtractor, MonoPolicy, ENV_MAX, ENV_MID};
pub use scheduler::{CarrierOutput, CarrierScheduler};
pub use tone::{ToneSynthesizer, TwoToneToggle, SINE_LUT, TABLE_SIZE};
