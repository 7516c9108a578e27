//! ParametricSpeaker - Firmware entry point (ESP32)
//!
//! Wires the modulation engine to the platform:
//! 1. LEDC carrier PWM at 40 kHz (the ultrasonic carrier)
//! 2. Hardware timer at the envelope tick rate -> tick task
//! 3. A2DP sink raw PCM callback -> delivery task
//! 4. Idle loop: log drain, self-test tone toggle

#![no_std]
#![no_main]

use esp_idf_svc::sys as esp_idf_sys;

use rust_parametric_speaker::{
    engine::DEFAULT_BUFFER_SIZE,
    envelope::EnvelopeExtractor,
    logging::LogRing,
    scheduler::CarrierOutput,
    tone::TwoToneToggle,
    EngineConfig, EngineMode, ModulationEngine,
};

// Process-lifetime singletons. Both are const-constructible, so no unsafe
// init dance is needed.
static ENGINE: ModulationEngine = ModulationEngine::new();
static LOG: LogRing = LogRing::new();

/// LEDC carrier channel.
struct CarrierPwm;

impl CarrierOutput for CarrierPwm {
    fn set_duty(&mut self, _duty: u16) {
        // TODO: LedcDriver duty write (takes effect at the next carrier
        // cycle, glitch-free)
    }
}

#[no_mangle]
fn main() {
    // Initialize ESP-IDF
    esp_idf_sys::link_patches();

    let cfg = EngineConfig::default();
    match ENGINE.configure(&cfg) {
        Ok(()) => {
            ENGINE.start();
            rust_parametric_speaker::rt_info!(
                LOG,
                timestamp_us(),
                "engine up: tick {} Hz, decim {}",
                cfg.tick_rate_hz,
                cfg.decimation()
            );
        }
        Err(e) => {
            // Fail safe: leave the tick gated off and idle.
            rust_parametric_speaker::rt_error!(LOG, timestamp_us(), "bad config: {:?}", e);
        }
    }

    // TODO: LEDC setup (40 kHz carrier, 10-bit), idle at cfg.duty.midpoint()
    // TODO: hardware timer at cfg.tick_rate_hz -> tick_task
    // TODO: A2DP sink ("Ultrasonic Speaker"), stream reader -> delivery_task

    let mut toggle = TwoToneToggle::new(400, 1000, 1000);

    loop {
        // Self-test bench mode: alternate between the two test tones.
        if ENGINE.control().mode() == EngineMode::SelfTest {
            toggle.poll(now_ms(), ENGINE.control());
        }

        while let Some(entry) = LOG.drain() {
            // TODO: write to the UART console
            let _ = entry;
        }

        unsafe {
            esp_idf_sys::vTaskDelay(10);
        }
    }
}

/// Tick task (hardware timer context, highest priority).
///
/// This is the critical path: one `on_tick` per timer period, nothing
/// else. No blocking calls, no allocation, no logging.
#[allow(dead_code)]
fn tick_task() {
    let mut scheduler = ENGINE.scheduler();
    let mut carrier = CarrierPwm;

    loop {
        scheduler.on_tick(&mut carrier);
        delay_until_next_tick();
    }
}

/// Delivery context (A2DP stream reader callback).
///
/// The extractor carries filter state across bursts, so it must live in
/// the callback environment, not be rebuilt per call.
#[allow(dead_code)]
fn delivery_task(
    extractor: &mut EnvelopeExtractor<'static, DEFAULT_BUFFER_SIZE>,
    pcm: &[u8],
) {
    extractor.push_frames(pcm);
}

// --- Placeholder functions (to be implemented with the real HAL) ---

#[allow(dead_code)]
fn timestamp_us() -> i64 {
    unsafe { esp_idf_sys::esp_timer_get_time() }
}

#[allow(dead_code)]
fn now_ms() -> u32 {
    (timestamp_us() / 1000) as u32
}

#[allow(dead_code)]
fn delay_until_next_tick() {
    // TODO: precise timing with the hardware timer alarm
    unsafe {
        esp_idf_sys::vTaskDelay(1);
    }
}
