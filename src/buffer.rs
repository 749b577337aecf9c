//! Growable byte accumulator backing the per-connection parse state.
//!
//! Each connection owns exactly one [`StreamBuf`]: socket reads are appended
//! to it, the codec searches it for protocol delimiters, and consumed bytes
//! are shifted off the front. It is never shared between connections.

/// A growable byte buffer with append, delimiter search and prefix-consume.
///
/// Growth is amortized (reallocate-and-copy when capacity runs out). The
/// search is a plain linear scan: header and boundary blocks are small, so
/// simplicity wins over asymptotic optimality here.
#[derive(Debug, Default)]
pub struct StreamBuf {
    data: Vec<u8>,
}

impl StreamBuf {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Appends `bytes` to the end of the buffer. Empty input is a no-op.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.data.extend_from_slice(bytes);
    }

    /// Scans for `pattern` and returns the index one past the last matched
    /// byte (the end-of-match position), or `None` if no full match fits
    /// within the current length.
    ///
    /// The scan resets the pattern index on a mismatch without backtracking
    /// the buffer index, so a failed partial match can report an overlapping
    /// later match instead of the earliest one. For the CRLF and boundary
    /// delimiters this parser feeds it, well-formed input never hits that
    /// case; it is a deliberate trade of strictness for simplicity.
    ///
    /// # Example
    ///
    /// ```
    /// # use socketd::buffer::StreamBuf;
    /// let mut buf = StreamBuf::new();
    /// buf.append(b"header\r\n\r\nbody");
    /// assert_eq!(buf.find(b"\r\n\r\n"), Some(10));
    /// assert_eq!(buf.find(b"missing"), None);
    /// ```
    pub fn find(&self, pattern: &[u8]) -> Option<usize> {
        if pattern.is_empty() {
            return None;
        }

        let mut p = 0;
        let mut i = 0;
        while i + (pattern.len() - 1) - p < self.data.len() {
            if self.data[i] == pattern[p] {
                if p < pattern.len() - 1 {
                    p += 1;
                } else {
                    return Some(i + 1);
                }
            } else {
                p = 0;
            }
            i += 1;
        }

        None
    }

    /// Discards the first `n` bytes, compacting the remainder to offset 0.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the current length.
    pub fn shift(&mut self, n: usize) {
        self.data.drain(..n);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}
