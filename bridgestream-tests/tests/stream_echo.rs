// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the async adaptor with tokio compatibility.
//!
//! Each test bridges a writer and a reader over one in-memory pipe, the way a
//! host would hand both ends of a channel to native code.

use bridgestream::{AsyncBridgeStream, Capabilities, DirectView, DirectViewMut, ManagedStream};
use futures_util::io::{AsyncReadExt as FutAsyncReadExt, AsyncWriteExt as FutAsyncWriteExt};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt as TokioAsyncReadExt, AsyncWriteExt as TokioAsyncWriteExt};
use tokio_util::compat::{FuturesAsyncReadCompatExt, FuturesAsyncWriteCompatExt};

/// Shared byte queue standing in for an external channel.
#[derive(Clone, Default)]
struct Pipe {
    bytes: Arc<Mutex<VecDeque<u8>>>,
}

impl Pipe {
    fn reader(&self) -> PipeReader {
        PipeReader(self.clone())
    }

    fn writer(&self) -> PipeWriter {
        PipeWriter(self.clone())
    }

    fn len(&self) -> usize {
        self.bytes.lock().unwrap().len()
    }
}

struct PipeReader(Pipe);

impl ManagedStream for PipeReader {
    fn capabilities(&self) -> Capabilities {
        Capabilities::READ
    }

    fn read(&mut self, view: &mut DirectViewMut<'_>) -> io::Result<usize> {
        let mut bytes = self.0.bytes.lock().unwrap();
        let count = bytes.len().min(view.len());
        for (slot, byte) in view.iter_mut().zip(bytes.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }
}

struct PipeWriter(Pipe);

impl ManagedStream for PipeWriter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::WRITE
    }

    fn write(&mut self, view: &DirectView<'_>) -> io::Result<usize> {
        self.0.bytes.lock().unwrap().extend(view.iter());
        Ok(view.len())
    }
}

/// Round trip through the pipe using tokio traits over the compat layer.
#[tokio::test]
async fn test_pipe_round_trip_with_tokio_compat() {
    let pipe = Pipe::default();
    let mut writer = AsyncBridgeStream::with_capacity(8, pipe.writer())
        .unwrap()
        .compat_write();
    let mut reader = AsyncBridgeStream::with_capacity(8, pipe.reader())
        .unwrap()
        .compat();

    let test_data = b"Hello from tokio compat!";
    TokioAsyncWriteExt::write_all(&mut writer, test_data)
        .await
        .unwrap();
    TokioAsyncWriteExt::flush(&mut writer).await.unwrap();
    assert_eq!(pipe.len(), test_data.len());

    let mut read_buf = vec![0u8; test_data.len()];
    TokioAsyncReadExt::read_exact(&mut reader, &mut read_buf)
        .await
        .unwrap();
    assert_eq!(&read_buf, test_data);

    TokioAsyncWriteExt::shutdown(&mut writer).await.unwrap();
}

/// Round trip using futures_util traits directly.
#[tokio::test]
async fn test_pipe_round_trip_with_futures_util() {
    let pipe = Pipe::default();
    let mut writer = AsyncBridgeStream::new(pipe.writer()).unwrap();
    let mut reader = AsyncBridgeStream::new(pipe.reader()).unwrap();

    let test_data = b"Hello from futures_util!";
    FutAsyncWriteExt::write_all(&mut writer, test_data)
        .await
        .unwrap();
    // Nothing reaches the pipe until the buffer is drained.
    assert_eq!(pipe.len(), 0);
    FutAsyncWriteExt::close(&mut writer).await.unwrap();

    let mut read_buf = Vec::new();
    FutAsyncReadExt::read_to_end(&mut reader, &mut read_buf)
        .await
        .unwrap();
    assert_eq!(&read_buf, test_data);
    assert!(reader.get_ref().is_eof());
}

/// Multiple round trips with tokio compat layer.
#[tokio::test]
async fn test_pipe_multiple_messages_tokio_compat() {
    let pipe = Pipe::default();
    let mut writer = AsyncBridgeStream::with_capacity(4, pipe.writer())
        .unwrap()
        .compat_write();
    let mut reader = AsyncBridgeStream::with_capacity(4, pipe.reader())
        .unwrap()
        .compat();

    for i in 0..10 {
        let test_data = format!("Message {}", i);
        TokioAsyncWriteExt::write_all(&mut writer, test_data.as_bytes())
            .await
            .unwrap();
        TokioAsyncWriteExt::flush(&mut writer).await.unwrap();

        let mut read_buf = vec![0u8; test_data.len()];
        TokioAsyncReadExt::read_exact(&mut reader, &mut read_buf)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(read_buf).unwrap(), test_data);
    }

    TokioAsyncWriteExt::shutdown(&mut writer).await.unwrap();
}

/// Large payloads cross the pipe in buffer-sized drains.
#[tokio::test]
async fn test_pipe_large_data() {
    let pipe = Pipe::default();
    let mut writer = AsyncBridgeStream::new(pipe.writer()).unwrap();
    let mut reader = AsyncBridgeStream::new(pipe.reader()).unwrap();

    let large_data: Vec<u8> = (0..255u8).cycle().take(4000).collect();
    FutAsyncWriteExt::write_all(&mut writer, &large_data)
        .await
        .unwrap();
    // Three full 1024-byte drains; the remainder is still buffered.
    assert_eq!(pipe.len(), 3 * 1024);
    FutAsyncWriteExt::flush(&mut writer).await.unwrap();
    assert_eq!(pipe.len(), large_data.len());

    let mut read_buf = vec![0u8; large_data.len()];
    FutAsyncReadExt::read_exact(&mut reader, &mut read_buf)
        .await
        .unwrap();
    assert_eq!(read_buf, large_data);
}
