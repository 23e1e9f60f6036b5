// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Buffered streams over an externally owned read/write capability.
//!
//! This crate lets native code use `std::io` (and `futures_util::io`) traits
//! on a stream object that lives in another runtime. Actual transfers are
//! delegated to a [`ManagedStream`], which reads into and writes from a view
//! over the bridge's own buffer, so bytes are never copied between sides.
//!
//! # Bridge Stream
//!
//! - [`BridgeStream`] - Fixed-buffer stream implementing `Read`, `BufRead` and `Write`
//! - [`AsyncBridgeStream`] - Implements `futures_util::io::AsyncRead`/`AsyncWrite`
//! - [`ReaderStream`]/[`WriterStream`] - Capabilities backed by std readers and writers
//!
//! # Example
//!
//! ```
//! use bridgestream::{BridgeStream, WriterStream};
//! use std::io::Write;
//!
//! let sink = WriterStream::new(Vec::new());
//! let mut stream = BridgeStream::with_capacity(16, sink).unwrap();
//! stream.write_all(b"Hello").unwrap();
//! stream.flush().unwrap();
//!
//! let sink = stream.into_inner().unwrap();
//! assert_eq!(sink.into_inner(), b"Hello");
//! ```

pub mod bridge;
pub mod config;
mod error;
pub mod managed;
pub mod stream_adapt;
pub mod view;

pub use bridge::{BridgeStream, Mode};
pub use config::{BridgeConfig, DEFAULT_BUFFER_SIZE};
pub use error::{BridgeError, IntoInnerError};
pub use managed::{Capabilities, ManagedStream, ReaderStream, WriterStream};
pub use stream_adapt::AsyncBridgeStream;
pub use view::{DirectView, DirectViewMut, ViewRange};
