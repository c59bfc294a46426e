//! SIMD-accelerated markup scanning using memchr
//!
//! Uses memchr crate for fast byte searching with SIMD acceleration:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)

use memchr::{memchr, memchr3};

/// Scanner for markup delimiter detection
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos.min(self.input.len())..]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Skip whitespace characters (space, tab, newline, carriage return).
    /// Returns whether anything was skipped.
    #[inline]
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.pos < self.input.len() {
            match self.input[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
        self.pos > start
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// ASCII case-insensitive `starts_with`
    #[inline]
    pub fn starts_with_ignore_case(&self, needle: &[u8]) -> bool {
        let remaining = self.remaining();
        remaining.len() >= needle.len() && remaining[..needle.len()].eq_ignore_ascii_case(needle)
    }

    /// Find the `]` closing an internal subset, skipping quoted literals.
    /// Returns its absolute position.
    pub fn find_subset_end(&self) -> Option<usize> {
        let mut pos = self.pos;
        while pos < self.input.len() {
            let hit = pos + memchr3(b']', b'"', b'\'', &self.input[pos..])?;
            match self.input[hit] {
                b']' => return Some(hit),
                quote => {
                    let close = memchr(quote, &self.input[hit + 1..])?;
                    pos = hit + 1 + close + 1;
                }
            }
        }
        None
    }

    /// Read bytes until a delimiter, returning the slice and advancing past delimiter
    pub fn read_until(&mut self, delimiter: u8) -> Option<&'a [u8]> {
        let start = self.pos;
        let end = memchr(delimiter, self.remaining())?;
        self.pos = start + end + 1;
        Some(&self.input[start..start + end])
    }

    /// Read a markup name (starts with letter/underscore/colon, continues with letters/digits/hyphens/underscores/periods)
    pub fn read_name(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        let first = *self.input.get(start)?;
        if !is_name_start_char(first) {
            return None;
        }

        self.pos += 1;
        while self.pos < self.input.len() && is_name_char(self.input[self.pos]) {
            self.pos += 1;
        }

        Some(&self.input[start..self.pos])
    }
}

/// Check if byte is valid name start character
/// Allows ASCII letters, underscore, colon, and non-ASCII (UTF-8 Unicode)
#[inline]
fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

/// Check if byte is valid name character
/// Allows ASCII alphanumeric, punctuation, and non-ASCII (UTF-8 Unicode)
#[inline]
fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}
