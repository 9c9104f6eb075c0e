//! Growable read buffer with additive, block-sized growth.

use std::collections::TryReserveError;

/// Read block size; also the growth increment and the default initial size.
pub const READ_BLOCK: usize = 64 * 1024;

/// Byte buffer filled front-to-back by successive reads.
///
/// The backing storage is always initialized up to its length, so the unfilled
/// tail can be handed straight to `read(2)`. When the tail is exhausted the
/// buffer grows by one [`READ_BLOCK`]; the filled prefix is preserved verbatim.
#[derive(Debug)]
pub struct GrowBuffer {
    data: Vec<u8>,
    filled: usize,
}

impl GrowBuffer {
    /// Allocate a buffer of `suggested_size` bytes, or one block if zero.
    pub fn new(suggested_size: usize) -> Result<Self, TryReserveError> {
        let size = if suggested_size == 0 {
            READ_BLOCK
        } else {
            suggested_size
        };
        let mut data = Vec::new();
        data.try_reserve_exact(size)?;
        data.resize(size, 0);
        Ok(Self { data, filled: 0 })
    }

    /// The unfilled tail.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        self.data.get_mut(self.filled..).unwrap_or_default()
    }

    /// Mark `n` more bytes of the tail as filled.
    pub fn advance(&mut self, n: usize) {
        self.filled = self.filled.saturating_add(n).min(self.data.len());
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.data.len()
    }

    /// Extend the storage by one block.
    pub fn grow(&mut self) -> Result<(), TryReserveError> {
        self.data.try_reserve_exact(READ_BLOCK)?;
        self.data.resize(self.data.len() + READ_BLOCK, 0);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Current allocated size (filled + unfilled).
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn filled(&self) -> &[u8] {
        self.data.get(..self.filled).unwrap_or_default()
    }

    /// Freeze into the caller-facing output. Capacity is kept.
    pub fn into_output(mut self) -> CapturedOutput {
        self.data.truncate(self.filled);
        CapturedOutput { bytes: self.data }
    }
}

/// Bytes read from a child's stdout (or a file). Opaque, not decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    bytes: Vec<u8>,
}

impl CapturedOutput {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Allocated capacity; always `>= len()`.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for CapturedOutput {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<CapturedOutput> for Vec<u8> {
    fn from(output: CapturedOutput) -> Self {
        output.bytes
    }
}
