// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Adaptor exposing a [`BridgeStream`] through the futures_util I/O traits.
//!
//! The external capability is blocking, so every poll runs the transfer inline
//! and returns [`Poll::Ready`]. This lets code written against
//! `futures_util::io` (or tokio, through `tokio_util::compat`) consume a
//! bridged stream without a separate I/O thread.
//!
//! # Example
//!
//! ```
//! use bridgestream::{AsyncBridgeStream, ReaderStream};
//! use futures_util::io::AsyncReadExt;
//!
//! # futures::executor::block_on(async {
//! let source = ReaderStream::new(&b"Hello"[..]);
//! let mut stream = AsyncBridgeStream::new(source).unwrap();
//!
//! let mut buf = Vec::new();
//! stream.read_to_end(&mut buf).await.unwrap();
//! assert_eq!(buf, b"Hello");
//! # });
//! ```

use futures_util::io::{
    AsyncBufRead as FutAsyncBufRead, AsyncRead as FutAsyncRead, AsyncWrite as FutAsyncWrite,
};
use pin_project_lite::pin_project;
use std::io::{self, BufRead, Read, Write};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::config::BridgeConfig;
use crate::managed::ManagedStream;
use crate::{BridgeError, BridgeStream};

pin_project! {
    /// Async adaptor for `futures_util::io::AsyncRead`, `AsyncBufRead` and
    /// `AsyncWrite`.
    ///
    /// After `poll_close` completes, further writes fail with
    /// [`io::ErrorKind::BrokenPipe`].
    ///
    /// No field is structurally pinned, so the adaptor is `Unpin` even when
    /// the external stream is not.
    pub struct AsyncBridgeStream<S>
    where
        S: ManagedStream,
    {
        inner: BridgeStream<S>,
        closed: bool,
    }
}

impl<S: ManagedStream> AsyncBridgeStream<S> {
    /// Create a new `AsyncBridgeStream` with the default buffer size.
    pub fn new(stream: S) -> Result<Self, BridgeError> {
        BridgeStream::new(stream).map(Self::from_bridge)
    }

    /// Create a new `AsyncBridgeStream` with a buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize, stream: S) -> Result<Self, BridgeError> {
        BridgeStream::with_capacity(capacity, stream).map(Self::from_bridge)
    }

    /// Create a new `AsyncBridgeStream` from explicit settings.
    pub fn with_config(stream: S, config: BridgeConfig) -> Result<Self, BridgeError> {
        BridgeStream::with_config(stream, config).map(Self::from_bridge)
    }

    /// Wrap an existing bridge stream.
    pub fn from_bridge(inner: BridgeStream<S>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    /// Get a reference to the wrapped bridge stream.
    pub fn get_ref(&self) -> &BridgeStream<S> {
        &self.inner
    }

    /// Get a mutable reference to the wrapped bridge stream.
    pub fn get_mut(&mut self) -> &mut BridgeStream<S> {
        &mut self.inner
    }

    /// Consume the adaptor and return the bridge stream.
    pub fn into_inner(self) -> BridgeStream<S> {
        self.inner
    }
}

impl<S: ManagedStream> FutAsyncRead for AsyncBridgeStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        Poll::Ready(this.inner.read(buf))
    }
}

impl<S: ManagedStream> FutAsyncBufRead for AsyncBridgeStream<S> {
    fn poll_fill_buf(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        let this = self.project();
        Poll::Ready(this.inner.fill_buf())
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        let this = self.project();
        this.inner.consume(amt);
    }
}

impl<S: ManagedStream> FutAsyncWrite for AsyncBridgeStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.project();
        if *this.closed {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "bridge stream is closed",
            )));
        }
        Poll::Ready(this.inner.write(buf))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.project();
        Poll::Ready(this.inner.flush())
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.project();
        if *this.closed {
            return Poll::Ready(Ok(()));
        }
        // Closed even if the final flush fails; the bytes were discarded.
        *this.closed = true;
        Poll::Ready(this.inner.flush())
    }
}
