// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error vocabulary of the bridge stream.
//!
//! Transfer failures are deliberately coarse: the buffering protocol only
//! knows "end of stream" and "flush failed", so I/O detail reported by the
//! external capability is not carried past the call site.

use std::{fmt, io};

/// Errors produced by [`BridgeStream`](crate::BridgeStream).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The external object supports neither read nor write.
    #[error("type mismatch: input or output capability expected")]
    TypeMismatch,

    /// A buffer of zero bytes was requested.
    #[error("buffer size must be at least one byte")]
    ZeroCapacity,

    /// The external capability reported end of data or an error.
    #[error("end of stream")]
    EndOfStream,

    /// An explicit flush could not drain the pending bytes.
    #[error("flush failed")]
    FlushFailed,
}

impl From<BridgeError> for io::Error {
    fn from(err: BridgeError) -> Self {
        let kind = match err {
            BridgeError::TypeMismatch | BridgeError::ZeroCapacity => io::ErrorKind::InvalidInput,
            BridgeError::EndOfStream => io::ErrorKind::UnexpectedEof,
            BridgeError::FlushFailed => io::ErrorKind::WriteZero,
        };
        io::Error::new(kind, err)
    }
}

/// Error from [`BridgeStream::into_inner`](crate::BridgeStream::into_inner)
/// when the final flush fails. Carries the external stream back.
#[derive(Debug)]
pub struct IntoInnerError<S> {
    error: BridgeError,
    stream: S,
}

impl<S> IntoInnerError<S> {
    pub(crate) fn new(error: BridgeError, stream: S) -> Self {
        Self { error, stream }
    }

    /// The flush failure.
    pub fn error(&self) -> BridgeError {
        self.error
    }

    /// Recover the external stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn into_parts(self) -> (BridgeError, S) {
        (self.error, self.stream)
    }
}

impl<S> fmt::Display for IntoInnerError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<S: fmt::Debug> std::error::Error for IntoInnerError<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
