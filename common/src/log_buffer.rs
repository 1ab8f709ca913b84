//! Log ring buffer with levels and timestamps, shown on the Info page.
//!
//! Every `log_*!` macro formats into a fixed-size string, pushes it into
//! [`LOG_BUFFER`] and, when the `defmt` feature is on, forwards the same
//! arguments to `defmt`. Format strings must therefore stick to `{}`
//! placeholders that both formatters understand.
//!
//! ```ignore
//! use obdeck_common::{log_info, log_warn};
//!
//! log_info!("Adapter connected");
//! log_warn!("Query {} failed ({} in a row)", pid, failures);
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;

use crate::colors::{GRAY, GREEN, RED, YELLOW};

/// Maximum number of log entries to keep.
pub const LOG_ENTRIES: usize = 14;

/// Maximum characters per log message.
pub const LOG_MSG_LEN: usize = 40;

/// Log severity level.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl LogLevel {
    /// Display color for this level.
    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Debug => GRAY,
            Self::Info => GREEN,
            Self::Warn => YELLOW,
            Self::Error => RED,
        }
    }

    /// Single-character prefix for this level.
    pub const fn prefix(self) -> char {
        match self {
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

/// A single log entry with level, message, and timestamp.
#[derive(Clone, Debug, Default)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Message, cut to [`LOG_MSG_LEN`] characters.
    pub message: String<LOG_MSG_LEN>,
    /// Milliseconds since boot.
    pub timestamp_ms: u32,
}

impl LogEntry {
    pub fn new(
        level: LogLevel,
        message: &str,
        timestamp_ms: u32,
    ) -> Self {
        Self {
            level,
            message: crate::text::truncated(message),
            timestamp_ms,
        }
    }
}

/// Circular buffer of log entries; the oldest entry is overwritten first.
pub struct LogBuffer {
    entries: [LogEntry; LOG_ENTRIES],
    head: usize,
    count: usize,
    sequence: u32,
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self {
            entries: [const {
                LogEntry {
                    level: LogLevel::Info,
                    message: String::new(),
                    timestamp_ms: 0,
                }
            }; LOG_ENTRIES],
            head: 0,
            count: 0,
            sequence: 0,
        }
    }

    pub fn push(
        &mut self,
        entry: LogEntry,
    ) {
        self.entries[self.head] = entry;
        self.head = (self.head + 1) % LOG_ENTRIES;
        if self.count < LOG_ENTRIES {
            self.count += 1;
        }
        self.sequence = self.sequence.wrapping_add(1);
    }

    /// Number of entries ever pushed, wrapping. Changes on every push, even
    /// when two entries share a timestamp.
    #[inline]
    pub const fn sequence(&self) -> u32 { self.sequence }

    #[inline]
    pub const fn len(&self) -> usize { self.count }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.count == 0 }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + '_ {
        let start = if self.count < LOG_ENTRIES { 0 } else { self.head };
        (0..self.count).map(move |i| &self.entries[(start + i) % LOG_ENTRIES])
    }

    /// Copy of the `N` newest entries, oldest first.
    pub fn recent<const N: usize>(&self) -> heapless::Vec<LogEntry, N> {
        let skip = self.count.saturating_sub(N);
        self.iter().skip(skip).cloned().collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self { Self::new() }
}

/// Global log buffer.
pub static LOG_BUFFER: Mutex<CriticalSectionRawMutex, LogBuffer> = Mutex::new(LogBuffer::new());

/// Milliseconds since boot, wrapping after ~49 days.
#[inline]
pub fn current_timestamp_ms() -> u32 { embassy_time::Instant::now().as_millis() as u32 }

/// Push an entry without blocking. Dropped if the buffer is locked.
pub fn push_log(
    level: LogLevel,
    message: &str,
) {
    let entry = LogEntry::new(level, message, current_timestamp_ms());
    if let Ok(mut buffer) = LOG_BUFFER.try_lock() {
        buffer.push(entry);
    }
}

/// Format and push an entry. Used by the `log_*!` macros.
pub fn push_fmt(
    level: LogLevel,
    args: core::fmt::Arguments<'_>,
) {
    let message: String<LOG_MSG_LEN> = crate::text::truncated_fmt(args);
    push_log(level, &message);
}

/// Push sequence and the newest `N` entries, or `None` if the buffer is
/// locked.
pub fn recent_logs<const N: usize>() -> Option<(u32, heapless::Vec<LogEntry, N>)> {
    LOG_BUFFER.try_lock().ok().map(|buffer| (buffer.sequence(), buffer.recent::<N>()))
}

#[cfg(feature = "defmt")]
#[doc(hidden)]
#[macro_export]
macro_rules! __log_defmt {
    (debug, $($arg:tt)*) => { ::defmt::debug!($($arg)*) };
    (info, $($arg:tt)*) => { ::defmt::info!($($arg)*) };
    (warn, $($arg:tt)*) => { ::defmt::warn!($($arg)*) };
    (error, $($arg:tt)*) => { ::defmt::error!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __log_defmt {
    ($level:ident, $($arg:tt)*) => {};
}

/// Log a message at Info level.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        $crate::log_buffer::push_fmt($crate::log_buffer::LogLevel::Info, format_args!($($arg)*));
        $crate::__log_defmt!(info, $($arg)*);
    }};
}

/// Log a message at Warn level.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        $crate::log_buffer::push_fmt($crate::log_buffer::LogLevel::Warn, format_args!($($arg)*));
        $crate::__log_defmt!(warn, $($arg)*);
    }};
}

/// Log a message at Error level.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        $crate::log_buffer::push_fmt($crate::log_buffer::LogLevel::Error, format_args!($($arg)*));
        $crate::__log_defmt!(error, $($arg)*);
    }};
}

/// Log a message at Debug level.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        $crate::log_buffer::push_fmt($crate::log_buffer::LogLevel::Debug, format_args!($($arg)*));
        $crate::__log_defmt!(debug, $($arg)*);
    }};
}
