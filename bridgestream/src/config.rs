// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Construction-time settings for [`BridgeStream`](crate::BridgeStream).

use serde::{Deserialize, Serialize};

use crate::BridgeError;

/// Default size of the shared buffer, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Settings applied when a bridge stream is built.
///
/// Missing fields fall back to their defaults when deserialized, so an empty
/// table (`{}`) yields [`BridgeConfig::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Length of the buffer shared with the external capability.
    pub buffer_size: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl BridgeConfig {
    /// Config with the given buffer size.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self { buffer_size }
    }

    /// Check that the settings describe a usable stream.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.buffer_size == 0 {
            return Err(BridgeError::ZeroCapacity);
        }
        Ok(())
    }
}
