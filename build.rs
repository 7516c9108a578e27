// ParametricSpeaker - Build Script
//
// The ESP-IDF link environment is only needed when the firmware feature is
// active; host builds of the core library and tests must not require an
// ESP toolchain.

fn main() {
    if std::env::var_os("CARGO_FEATURE_ESP32").is_some() {
        embuild::espidf::sysenv::output();
    }
}
