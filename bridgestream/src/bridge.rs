// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Buffered stream over an external read/write capability.
//!
//! [`BridgeStream`] owns one fixed-size buffer and runs the classic buffering
//! protocol over it:
//!
//! - [`underflow`](BridgeStream::underflow) refills the read region by handing
//!   the whole buffer to [`ManagedStream::read`].
//! - [`overflow`](BridgeStream::overflow) accepts one byte past the write
//!   region and drains the buffer through [`ManagedStream::write`].
//! - [`sync`](BridgeStream::sync) drains whatever is pending.
//!
//! On top of those it implements `std::io::Read`, `BufRead` and `Write`.
//!
//! # Example
//!
//! ```
//! use bridgestream::{BridgeStream, ReaderStream};
//! use std::io::Read;
//!
//! let source = ReaderStream::new(&b"hello"[..]);
//! let mut stream = BridgeStream::with_capacity(4, source).unwrap();
//!
//! let mut text = String::new();
//! stream.read_to_string(&mut text).unwrap();
//! assert_eq!(text, "hello");
//! ```

use std::io;
use std::mem::ManuallyDrop;
use std::ptr;

use crate::config::BridgeConfig;
use crate::managed::{Capabilities, ManagedStream};
use crate::view::ViewRange;
use crate::error::IntoInnerError;
use crate::BridgeError;

/// Direction a bridge stream was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ReadEnd,
    WriteEnd,
}

impl Mode {
    /// Pick the mode for an object with the given capabilities.
    ///
    /// Read wins when both are present.
    pub fn probe(capabilities: Capabilities) -> Result<Self, BridgeError> {
        if capabilities.read {
            Ok(Mode::ReadEnd)
        } else if capabilities.write {
            Ok(Mode::WriteEnd)
        } else {
            Err(BridgeError::TypeMismatch)
        }
    }
}

/// Position state for the single active region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Valid data is `buffer[pos..end]`; `eof` latches once the source is done.
    Get { pos: usize, end: usize, eof: bool },
    /// `buffer[..pos]` holds bytes not yet handed to the sink.
    Put { pos: usize },
}

/// Buffered stream that delegates transfers to a [`ManagedStream`].
///
/// The external object is asked for its capabilities once, at construction,
/// and the stream is fixed to read or write from then on.
///
/// Dropping a write-end stream flushes pending bytes; failures there are
/// logged and otherwise ignored. Call [`sync`](Self::sync) or
/// `Write::flush` to observe them.
pub struct BridgeStream<S: ManagedStream> {
    inner: S,
    buffer: Box<[u8]>,
    full_view: ViewRange,
    cursor: Cursor,
}

impl<S: ManagedStream> BridgeStream<S> {
    /// Create a stream with the default buffer size.
    pub fn new(stream: S) -> Result<Self, BridgeError> {
        Self::with_config(stream, BridgeConfig::default())
    }

    /// Create a stream with a buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize, stream: S) -> Result<Self, BridgeError> {
        Self::with_config(stream, BridgeConfig::with_buffer_size(capacity))
    }

    /// Create a stream from explicit settings.
    pub fn with_config(stream: S, config: BridgeConfig) -> Result<Self, BridgeError> {
        let mode = Mode::probe(stream.capabilities())?;
        config.validate()?;

        let capacity = config.buffer_size;
        let cursor = match mode {
            // Empty region, so the first read goes through underflow.
            Mode::ReadEnd => Cursor::Get {
                pos: 0,
                end: 0,
                eof: false,
            },
            Mode::WriteEnd => Cursor::Put { pos: 0 },
        };

        tracing::debug!(capacity, ?mode, "bridge stream created");

        Ok(Self {
            inner: stream,
            buffer: vec![0u8; capacity].into_boxed_slice(),
            full_view: ViewRange::prefix(capacity),
            cursor,
        })
    }

    pub fn mode(&self) -> Mode {
        match self.cursor {
            Cursor::Get { .. } => Mode::ReadEnd,
            Cursor::Put { .. } => Mode::WriteEnd,
        }
    }

    /// Size of the shared buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` once the source has reported end of data.
    pub fn is_eof(&self) -> bool {
        matches!(self.cursor, Cursor::Get { eof: true, .. })
    }

    /// Buffered bytes not yet read.
    pub fn buffer(&self) -> &[u8] {
        match self.cursor {
            Cursor::Get { pos, end, .. } => &self.buffer[pos..end],
            Cursor::Put { .. } => &[],
        }
    }

    /// Number of written bytes not yet handed to the sink.
    pub fn pending(&self) -> usize {
        match self.cursor {
            Cursor::Get { .. } => 0,
            Cursor::Put { pos } => pos,
        }
    }

    /// Get a reference to the external stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Get a mutable reference to the external stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Flush pending writes and return the external stream.
    ///
    /// If the flush fails the stream is still handed back, inside the error.
    pub fn into_inner(mut self) -> Result<S, IntoInnerError<S>> {
        let flushed = self.sync();
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so each field is read or dropped
        // exactly once here.
        let inner = unsafe {
            ptr::drop_in_place(&mut this.buffer);
            ptr::read(&this.inner)
        };
        match flushed {
            Ok(()) => Ok(inner),
            Err(error) => Err(IntoInnerError::new(error, inner)),
        }
    }

    /// Return the next unread byte without consuming it, refilling the
    /// buffer from the source when the read region is exhausted.
    ///
    /// Returns `None` at end of stream. A source that reports `Ok(0)` or an
    /// error is never called again.
    pub fn underflow(&mut self) -> Option<u8> {
        let Cursor::Get { pos, end, eof } = &mut self.cursor else {
            return None;
        };
        if *pos < *end {
            return Some(self.buffer[*pos]);
        }
        if *eof {
            return None;
        }

        let capacity = self.buffer.len();
        let mut view = self.full_view.resolve_mut(&mut self.buffer);
        let filled = match self.inner.read(&mut view) {
            Ok(0) => None,
            Ok(count) if count > capacity => {
                tracing::warn!(count, capacity, "source reported more bytes than the view holds");
                Some(capacity)
            }
            Ok(count) => Some(count),
            Err(err) => {
                tracing::debug!(%err, "source read failed, treating as end of stream");
                None
            }
        };

        *pos = 0;
        match filled {
            Some(count) => {
                tracing::trace!(count, "read region refilled");
                *end = count;
                Some(self.buffer[0])
            }
            None => {
                tracing::debug!("source exhausted");
                *end = 0;
                *eof = true;
                None
            }
        }
    }

    /// Read and consume one byte.
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.underflow()?;
        io::BufRead::consume(self, 1);
        Some(byte)
    }

    /// Accept one byte beyond the write region and drain the buffer.
    ///
    /// `None` only drains. Returns the accepted value, or
    /// [`BridgeError::EndOfStream`] if the drain failed or the stream is not
    /// writable.
    pub fn overflow(&mut self, byte: Option<u8>) -> Result<Option<u8>, BridgeError> {
        let Cursor::Put { pos } = &mut self.cursor else {
            return Err(BridgeError::EndOfStream);
        };
        if let Some(byte) = byte {
            self.buffer[*pos] = byte;
            *pos += 1;
        }
        self.flush_buffer().map_err(|_| BridgeError::EndOfStream)?;
        Ok(byte)
    }

    /// Drain pending written bytes to the sink.
    ///
    /// The put cursor is rewound even when the sink fails.
    pub fn sync(&mut self) -> Result<(), BridgeError> {
        if self.pending() > 0 {
            self.flush_buffer().map_err(|_| BridgeError::FlushFailed)?;
        }
        Ok(())
    }

    /// Hand `buffer[..pending]` to the sink and rewind the put cursor.
    ///
    /// A short positive write is not retried: the unwritten tail is dropped.
    fn flush_buffer(&mut self) -> Result<usize, BridgeError> {
        let Cursor::Put { pos } = &mut self.cursor else {
            return Ok(0);
        };
        let pending = *pos;
        if pending == 0 {
            return Ok(0);
        }

        // A partial view keeps stale bytes past `pending` away from the sink.
        let range = if pending == self.buffer.len() {
            self.full_view
        } else {
            ViewRange::prefix(pending)
        };
        let result = self.inner.write(&range.resolve(&self.buffer));
        *pos = 0;

        match result {
            Ok(0) => {
                tracing::debug!(pending, "sink accepted no bytes");
                Err(BridgeError::EndOfStream)
            }
            Ok(written) => {
                if written < pending {
                    tracing::warn!(pending, written, "short write, unwritten bytes dropped");
                } else {
                    tracing::trace!(pending, "write region drained");
                }
                Ok(pending)
            }
            Err(err) => {
                tracing::debug!(%err, pending, "sink write failed");
                Err(BridgeError::EndOfStream)
            }
        }
    }
}

impl<S: ManagedStream> Drop for BridgeStream<S> {
    fn drop(&mut self) {
        if self.pending() > 0
            && let Err(err) = self.sync()
        {
            tracing::warn!(%err, "pending bytes lost while dropping bridge stream");
        }
    }
}

impl<S: ManagedStream> std::fmt::Debug for BridgeStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeStream")
            .field("capacity", &self.buffer.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<S: ManagedStream> io::Read for BridgeStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let available = io::BufRead::fill_buf(self)?;
        let to_copy = available.len().min(buf.len());
        buf[..to_copy].copy_from_slice(&available[..to_copy]);
        io::BufRead::consume(self, to_copy);
        Ok(to_copy)
    }
}

impl<S: ManagedStream> io::BufRead for BridgeStream<S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.underflow();
        Ok(self.buffer())
    }

    fn consume(&mut self, amt: usize) {
        if let Cursor::Get { pos, end, .. } = &mut self.cursor {
            *pos = (*pos + amt).min(*end);
        }
    }
}

impl<S: ManagedStream> io::Write for BridgeStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Cursor::Put { pos } = &mut self.cursor else {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "bridge stream was opened for reading",
            ));
        };
        if buf.is_empty() {
            return Ok(0);
        }

        // The last slot is reserved for the byte handed to overflow.
        let limit = self.buffer.len() - 1;
        let room = limit - *pos;
        if room > 0 {
            let to_write = room.min(buf.len());
            self.buffer[*pos..*pos + to_write].copy_from_slice(&buf[..to_write]);
            *pos += to_write;
            return Ok(to_write);
        }

        self.overflow(Some(buf[0]))
            .map_err(|err| io::Error::new(io::ErrorKind::WriteZero, err))?;
        Ok(1)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sync()?;
        Ok(())
    }
}
