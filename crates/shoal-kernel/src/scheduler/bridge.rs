//! Bounded byte bridge with backpressure, connecting adjacent pipeline
//! stages.
//!
//! The bridge blocks the writer when the buffer is full and the reader when
//! it is empty — matching OS pipe semantics with a ~64KB kernel buffer.
//! These are the only suspension points in the core.
//!
//! ```text
//!   BridgeWriter ──▶ [VecDeque<u8> ring buffer] ──▶ BridgeReader
//!                    ├── writer parks when full (backpressure)
//!                    ├── reader parks when empty
//!                    ├── drop writer → EOF (reader returns 0)
//!                    └── drop reader → broken pipe (writer errors)
//! ```
//!
//! Implementation uses `std::sync::Mutex` (not tokio) since critical
//! sections are just VecDeque operations (microseconds). Closed flags are
//! `AtomicBool` so Drop is always synchronous — no `tokio::spawn` in
//! destructors. Wakers are stored under the lock to prevent lost wakeups.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Default bridge capacity (matches the Linux kernel pipe default).
pub const BRIDGE_CAPACITY: usize = 64 * 1024;

/// Shared mutable state protected by std::sync::Mutex.
struct BridgeBuffer {
    buffer: VecDeque<u8>,
    capacity: usize,
    /// Waker for the reader task (set when the reader finds the buffer empty).
    reader_waker: Option<Waker>,
    /// Waker for the writer task (set when the writer finds the buffer full).
    writer_waker: Option<Waker>,
}

/// State shared between the two ends.
struct BridgeShared {
    buf: Mutex<BridgeBuffer>,
    /// Writer has been dropped (EOF). Atomic so Drop is lock-free.
    writer_closed: AtomicBool,
    /// Reader has been dropped (broken pipe). Atomic so Drop is lock-free.
    reader_closed: AtomicBool,
}

/// Writing end of a bridge.
pub struct BridgeWriter {
    shared: Arc<BridgeShared>,
}

/// Reading end of a bridge.
pub struct BridgeReader {
    shared: Arc<BridgeShared>,
}

/// Create a bridge pair with the given capacity.
///
/// Dropping the writer signals EOF; dropping the reader signals broken
/// pipe, so a failed downstream stage can never hang its upstream.
pub fn bridge(capacity: usize) -> (BridgeWriter, BridgeReader) {
    let shared = Arc::new(BridgeShared {
        buf: Mutex::new(BridgeBuffer {
            buffer: VecDeque::with_capacity(capacity.min(8192)),
            capacity,
            reader_waker: None,
            writer_waker: None,
        }),
        writer_closed: AtomicBool::new(false),
        reader_closed: AtomicBool::new(false),
    });

    (
        BridgeWriter {
            shared: shared.clone(),
        },
        BridgeReader { shared },
    )
}

impl AsyncWrite for BridgeWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        if self.shared.reader_closed.load(Ordering::Acquire) {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "bridge reader closed",
            )));
        }

        let mut inner = self.shared.buf.lock().unwrap_or_else(|e| e.into_inner());

        // Re-check under lock (writer may have raced with reader drop)
        if self.shared.reader_closed.load(Ordering::Acquire) {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "bridge reader closed",
            )));
        }

        let available = inner.capacity.saturating_sub(inner.buffer.len());
        if available > 0 {
            let to_write = buf.len().min(available);
            inner.buffer.extend(&buf[..to_write]);
            // Wake the reader if it was waiting for data
            if let Some(waker) = inner.reader_waker.take() {
                waker.wake();
            }
            Poll::Ready(Ok(to_write))
        } else {
            // Buffer full — register waker so the reader can wake us
            inner.writer_waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.shared.writer_closed.store(true, Ordering::Release);
        let mut inner = self.shared.buf.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(waker) = inner.reader_waker.take() {
            waker.wake();
        }
        Poll::Ready(Ok(()))
    }
}

impl Drop for BridgeWriter {
    fn drop(&mut self) {
        self.shared.writer_closed.store(true, Ordering::Release);
        // Wake the reader so it sees EOF. Lock is std::sync::Mutex — always
        // available synchronously.
        if let Ok(mut inner) = self.shared.buf.lock() {
            if let Some(waker) = inner.reader_waker.take() {
                waker.wake();
            }
        }
        // If the lock is poisoned, the reader sees writer_closed on its next poll.
    }
}

impl AsyncRead for BridgeReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut inner = self.shared.buf.lock().unwrap_or_else(|e| e.into_inner());

        if !inner.buffer.is_empty() {
            let to_read = buf.remaining().min(inner.buffer.len());
            let (front, back) = inner.buffer.as_slices();

            if to_read <= front.len() {
                buf.put_slice(&front[..to_read]);
            } else {
                buf.put_slice(front);
                let remaining = to_read - front.len();
                buf.put_slice(&back[..remaining]);
            }

            inner.buffer.drain(..to_read);
            // Wake the writer if it was waiting for space
            if let Some(waker) = inner.writer_waker.take() {
                waker.wake();
            }
            Poll::Ready(Ok(()))
        } else if self.shared.writer_closed.load(Ordering::Acquire) {
            // EOF — the writer is gone and the buffer is drained
            Poll::Ready(Ok(()))
        } else {
            // No data, writer still alive — register waker and wait
            inner.reader_waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl Drop for BridgeReader {
    fn drop(&mut self) {
        self.shared.reader_closed.store(true, Ordering::Release);
        if let Ok(mut inner) = self.shared.buf.lock() {
            if let Some(waker) = inner.writer_waker.take() {
                waker.wake();
            }
        }
    }
}

impl std::fmt::Debug for BridgeWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeWriter").finish()
    }
}

impl std::fmt::Debug for BridgeReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeReader").finish()
    }
}
