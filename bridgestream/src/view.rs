// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Zero-copy views over the bridge stream's buffer.
//!
//! The stream owns exactly one buffer. What the external capability sees is a
//! [`ViewRange`] (offset and length, no ownership) resolved against that buffer
//! for the duration of a single call, yielding a [`DirectView`] or
//! [`DirectViewMut`] that borrows the buffer memory directly.

use std::ops::{Deref, DerefMut, Range};

/// Non-owning descriptor of a byte range inside the stream buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRange {
    offset: usize,
    len: usize,
}

impl ViewRange {
    /// Describe `len` bytes starting at `offset`.
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Describe the first `len` bytes.
    pub const fn prefix(len: usize) -> Self {
        Self::new(0, len)
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Borrow the described bytes of `buffer` read-only.
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie within `buffer`.
    pub fn resolve<'a>(&self, buffer: &'a [u8]) -> DirectView<'a> {
        DirectView {
            bytes: &buffer[self.span()],
        }
    }

    /// Borrow the described bytes of `buffer` for writing.
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie within `buffer`.
    pub fn resolve_mut<'a>(&self, buffer: &'a mut [u8]) -> DirectViewMut<'a> {
        DirectViewMut {
            bytes: &mut buffer[self.span()],
        }
    }
}

/// Read-only view handed to the external write capability.
///
/// The capability is expected to consume the full extent of the view.
#[derive(Debug, Clone, Copy)]
pub struct DirectView<'a> {
    bytes: &'a [u8],
}

impl<'a> DirectView<'a> {
    /// Start address of the viewed memory.
    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.bytes
    }
}

impl Deref for DirectView<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

/// Writable view handed to the external read capability.
#[derive(Debug)]
pub struct DirectViewMut<'a> {
    bytes: &'a mut [u8],
}

impl DirectViewMut<'_> {
    /// Start address of the viewed memory.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.bytes
    }
}

impl Deref for DirectViewMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl DerefMut for DirectViewMut<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.bytes
    }
}
