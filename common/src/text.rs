//! Truncating text helpers for fixed-capacity strings.
//!
//! `heapless::String` rejects a whole `push_str` when it does not fit. The
//! helpers here keep as many whole characters as fit instead, which is what a
//! status line or a DTC description wants.

use core::fmt;

use heapless::String;

/// `fmt::Write` adapter that silently drops whatever does not fit.
pub struct Truncating<'a, const N: usize> {
    inner: &'a mut String<N>,
    truncated: bool,
}

impl<'a, const N: usize> Truncating<'a, N> {
    pub fn new(inner: &'a mut String<N>) -> Self {
        Self {
            inner,
            truncated: false,
        }
    }

    /// Whether any character had to be dropped.
    #[inline]
    pub const fn truncated(&self) -> bool { self.truncated }
}

impl<const N: usize> fmt::Write for Truncating<'_, N> {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        for c in s.chars() {
            if self.inner.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

/// Copy `text` into a new string, keeping the longest prefix that fits.
pub fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    let _ = fmt::Write::write_str(&mut Truncating::new(&mut out), text);
    out
}

/// Format `args` into a new string, keeping the longest prefix that fits.
pub fn truncated_fmt<const N: usize>(args: fmt::Arguments<'_>) -> String<N> {
    let mut out = String::new();
    let _ = fmt::Write::write_fmt(&mut Truncating::new(&mut out), args);
    out
}
