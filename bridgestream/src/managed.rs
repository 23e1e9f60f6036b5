// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The external ("managed") side of the bridge.
//!
//! A [`ManagedStream`] is the object the bridge delegates real I/O to. It
//! advertises which directions it supports through [`Capabilities`], which the
//! bridge inspects exactly once when it is built.

use std::io;

use crate::view::{DirectView, DirectViewMut};

/// Directions an external stream object supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub read: bool,
    pub write: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        read: false,
        write: false,
    };
    pub const READ: Self = Self {
        read: true,
        write: false,
    };
    pub const WRITE: Self = Self {
        read: false,
        write: true,
    };
}

/// Read/write capability supplied by the external runtime.
///
/// Both transfer calls are blocking and receive a view over the bridge's own
/// buffer, so no bytes are copied between the two sides.
pub trait ManagedStream {
    /// Report supported directions. Called once, at bridge construction.
    fn capabilities(&self) -> Capabilities;

    /// Fill `view` with data and return how many bytes were placed at its
    /// start. `Ok(0)` and `Err(_)` both mean no more data.
    fn read(&mut self, view: &mut DirectViewMut<'_>) -> io::Result<usize> {
        let _ = view;
        Err(io::ErrorKind::Unsupported.into())
    }

    /// Persist the whole of `view`. `Ok(0)` and `Err(_)` are failures; a
    /// positive count is taken as success.
    fn write(&mut self, view: &DirectView<'_>) -> io::Result<usize> {
        let _ = view;
        Err(io::ErrorKind::Unsupported.into())
    }
}

impl<S: ManagedStream + ?Sized> ManagedStream for &mut S {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn read(&mut self, view: &mut DirectViewMut<'_>) -> io::Result<usize> {
        (**self).read(view)
    }

    fn write(&mut self, view: &DirectView<'_>) -> io::Result<usize> {
        (**self).write(view)
    }
}

impl<S: ManagedStream + ?Sized> ManagedStream for Box<S> {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn read(&mut self, view: &mut DirectViewMut<'_>) -> io::Result<usize> {
        (**self).read(view)
    }

    fn write(&mut self, view: &DirectView<'_>) -> io::Result<usize> {
        (**self).write(view)
    }
}

/// Read-only capability backed by a [`std::io::Read`].
#[derive(Debug)]
pub struct ReaderStream<R> {
    inner: R,
}

impl<R> ReaderStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: io::Read> ManagedStream for ReaderStream<R> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::READ
    }

    fn read(&mut self, view: &mut DirectViewMut<'_>) -> io::Result<usize> {
        loop {
            match self.inner.read(view.as_mut_slice()) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}

/// Write-only capability backed by a [`std::io::Write`].
///
/// Every call writes the full view, so the reported count is always the view
/// length on success.
#[derive(Debug)]
pub struct WriterStream<W> {
    inner: W,
}

impl<W> WriterStream<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> ManagedStream for WriterStream<W> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::WRITE
    }

    fn write(&mut self, view: &DirectView<'_>) -> io::Result<usize> {
        self.inner.write_all(view)?;
        self.inner.flush()?;
        Ok(view.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewRange;

    #[test]
    fn test_reader_stream_fills_view() {
        let mut stream = ReaderStream::new(&b"xyz"[..]);
        assert_eq!(stream.capabilities(), Capabilities::READ);

        let mut buffer = [0u8; 8];
        let mut view = ViewRange::prefix(8).resolve_mut(&mut buffer);
        assert_eq!(stream.read(&mut view).unwrap(), 3);
        assert_eq!(&buffer[..3], b"xyz");
    }

    #[test]
    fn test_reader_stream_retries_interrupted() {
        struct InterruptOnce {
            interrupted: bool,
            data: &'static [u8],
        }

        impl io::Read for InterruptOnce {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(io::ErrorKind::Interrupted.into());
                }
                io::Read::read(&mut self.data, buf)
            }
        }

        let source = ReaderStream::new(InterruptOnce {
            interrupted: false,
            data: b"payload",
        });
        let mut stream = crate::BridgeStream::with_capacity(8, source).unwrap();
        let mut buf = Vec::new();
        io::Read::read_to_end(&mut stream, &mut buf).unwrap();
        assert_eq!(buf, b"payload");
        assert!(stream.is_eof());
    }

    #[test]
    fn test_writer_stream_consumes_whole_view() {
        let mut stream = WriterStream::new(Vec::new());
        assert_eq!(stream.capabilities(), Capabilities::WRITE);

        let buffer = *b"hello";
        let view = ViewRange::prefix(4).resolve(&buffer);
        assert_eq!(stream.write(&view).unwrap(), 4);
        assert_eq!(stream.into_inner(), b"hell");
    }

    #[test]
    fn test_unsupported_direction_errors() {
        let mut stream = ReaderStream::new(&b""[..]);
        let buffer = [0u8; 1];
        let err = stream.write(&ViewRange::prefix(1).resolve(&buffer)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
