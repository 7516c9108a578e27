//! RT-safe logging
//!
//! The tick and delivery paths never format or log; they only bump
//! counters. Everything above them reports through this ring: push never
//! blocks, drain runs in the glue context at leisure.
//!
//! ```text
//! control/glue ──rt_info!──▶ [E0][E1][E2] ──drain──▶ UART console
//!               non-blocking   lock-free              blocking ok
//! ```

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Maximum message length in bytes.
pub const MAX_MSG_LEN: usize = 96;

/// Default number of ring entries.
pub const LOG_RING_SIZE: usize = 128;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Convert to string for console output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// One formatted log record.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds.
    pub timestamp_us: i64,
    /// Log level.
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    /// The message as a byte slice.
    pub fn text(&self) -> &[u8] {
        &self.msg[..self.len as usize]
    }
}

/// Lock-free log ring (single producer, single consumer).
///
/// The producer is the control/glue context; the drain side is a
/// background task or the console. A full ring drops the message and
/// counts it.
pub struct LogRing<const N: usize = LOG_RING_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
    min_level: AtomicU8,
}

// SAFETY: single producer, single consumer, atomic index coordination.
unsafe impl<const N: usize> Sync for LogRing<N> {}
unsafe impl<const N: usize> Send for LogRing<N> {}

impl<const N: usize> LogRing<N> {
    const MASK: u32 = (N - 1) as u32;

    /// Create an empty ring with verbosity `Info`.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "ring size must be a power of 2");

        const EMPTY: LogEntry = LogEntry {
            timestamp_us: 0,
            level: LogLevel::Info,
            len: 0,
            msg: [0; MAX_MSG_LEN],
        };

        Self {
            entries: UnsafeCell::new([EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            min_level: AtomicU8::new(LogLevel::Info as u8),
        }
    }

    /// Runtime verbosity: messages above `level` are discarded at the
    /// call site.
    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether a message at `level` would be kept.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.min_level.load(Ordering::Relaxed)
    }

    /// Queue a message. Never blocks; returns `false` if the ring was
    /// full and the message dropped.
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        let write = self.write_idx.load(Ordering::Relaxed);
        if write.wrapping_sub(self.read_idx.load(Ordering::Acquire)) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let len = msg.len().min(MAX_MSG_LEN);

        // SAFETY: single producer; the full check above keeps this slot
        // outside the consumer's window.
        unsafe {
            let entry = &mut (*self.entries.get())[(write & Self::MASK) as usize];
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Take the oldest entry, if any (drain side).
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        if read == self.write_idx.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: single consumer; `read != write`, so the slot is
        // published.
        let entry = unsafe { (*self.entries.get())[(read & Self::MASK) as usize] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Messages dropped on a full ring.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for LogRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer; returns the number of bytes written.
/// Output exceeding the buffer is truncated.
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    use core::fmt::Write;

    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
    }

    impl<'a> Write for BufWriter<'a> {
        fn write_str(&mut self, s: &str) -> core::fmt::Result {
            let bytes = s.as_bytes();
            let to_write = bytes.len().min(self.buf.len() - self.pos);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            Ok(())
        }
    }

    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// Log at an explicit level, formatting into a stack buffer.
///
/// ```ignore
/// rt_log!(LOG, LogLevel::Info, timestamp_us(), "tick {} Hz", rate);
/// ```
#[macro_export]
macro_rules! rt_log {
    ($ring:expr, $level:expr, $timestamp:expr, $($arg:tt)*) => {{
        if $ring.enabled($level) {
            let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
            let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
            $ring.push($timestamp, $level, &buf[..len]);
        }
    }};
}

/// Error-level log.
#[macro_export]
macro_rules! rt_error {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($ring, $crate::logging::LogLevel::Error, $timestamp, $($arg)*)
    };
}

/// Warning-level log.
#[macro_export]
macro_rules! rt_warn {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($ring, $crate::logging::LogLevel::Warn, $timestamp, $($arg)*)
    };
}

/// Info-level log.
#[macro_export]
macro_rules! rt_info {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($ring, $crate::logging::LogLevel::Info, $timestamp, $($arg)*)
    };
}

/// Debug-level log.
#[macro_export]
macro_rules! rt_debug {
    ($ring:expr, $timestamp:expr, $($arg:tt)*) => {
        $crate::rt_log!($ring, $crate::logging::LogLevel::Debug, $timestamp, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_drain_roundtrip() {
        let ring = LogRing::<16>::new();

        assert!(ring.push(1000, LogLevel::Info, b"carrier up"));
        assert_eq!(ring.pending(), 1);

        let entry = ring.drain().unwrap();
        assert_eq!(entry.timestamp_us, 1000);
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.text(), b"carrier up");

        assert_eq!(ring.pending(), 0);
        assert!(ring.drain().is_none());
    }

    #[test]
    fn test_full_ring_drops() {
        let ring = LogRing::<4>::new();

        for i in 0..4 {
            assert!(ring.push(i, LogLevel::Info, b"x"));
        }
        assert!(!ring.push(5, LogLevel::Info, b"y"));
        assert_eq!(ring.dropped(), 1);

        // Draining one frees a slot again.
        ring.drain();
        assert!(ring.push(6, LogLevel::Info, b"z"));
    }

    #[test]
    fn test_min_level_filter() {
        let ring = LogRing::<16>::new();

        ring.set_min_level(LogLevel::Warn);
        assert!(ring.enabled(LogLevel::Error));
        assert!(ring.enabled(LogLevel::Warn));
        assert!(!ring.enabled(LogLevel::Info));
        assert!(!ring.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_macro_formats_and_queues() {
        let ring = LogRing::<16>::new();

        rt_info!(ring, 42, "tick {} Hz", 16_000);
        let entry = ring.drain().unwrap();
        assert_eq!(entry.text(), b"tick 16000 Hz");
        assert_eq!(entry.timestamp_us, 42);

        // Filtered at the call site: nothing queued.
        ring.set_min_level(LogLevel::Error);
        rt_debug!(ring, 43, "noise");
        assert!(ring.drain().is_none());
    }

    #[test]
    fn test_long_message_truncated() {
        let ring = LogRing::<4>::new();

        let long = [b'a'; 2 * MAX_MSG_LEN];
        assert!(ring.push(0, LogLevel::Info, &long));

        let entry = ring.drain().unwrap();
        assert_eq!(entry.len as usize, MAX_MSG_LEN);
    }

    #[test]
    fn test_format_to_buffer() {
        let mut buf = [0u8; 32];
        let len = format_to_buffer(&mut buf, format_args!("duty {}", 480));
        assert_eq!(&buf[..len], b"duty 480");
    }
}
