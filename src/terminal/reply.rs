//! Host-bound byte pipe
//!
//! Bounded single-producer/single-consumer queue carrying bytes from the
//! emulator to the host (device reports, color query answers, encoded
//! key/mouse events). Writes block while the queue is full and reads block
//! while it is empty. After `close`, readers drain what is left and then see
//! end-of-stream; writers fail with `Error::Closed`.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::error::{Error, Result};

struct State {
    buf: VecDeque<u8>,
    closed: bool,
}

struct Shared {
    state: Mutex<State>,
    readable: Condvar,
    writable: Condvar,
    capacity: usize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Create a pipe holding at most `capacity` bytes
pub fn pipe(capacity: usize) -> (ReplyWriter, ReplyReader) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            buf: VecDeque::new(),
            closed: false,
        }),
        readable: Condvar::new(),
        writable: Condvar::new(),
        capacity: capacity.max(1),
    });
    (
        ReplyWriter {
            shared: Arc::clone(&shared),
        },
        ReplyReader { shared },
    )
}

/// Emulator side of the pipe
pub struct ReplyWriter {
    shared: Arc<Shared>,
}

impl ReplyWriter {
    /// Push all of `data`, blocking while the pipe is full
    pub fn write_all(&self, mut data: &[u8]) -> Result<()> {
        let mut state = self.shared.lock();
        while !data.is_empty() {
            if state.closed {
                return Err(Error::Closed);
            }
            let room = self.shared.capacity.saturating_sub(state.buf.len());
            if room == 0 {
                state = self
                    .shared
                    .writable
                    .wait(state)
                    .unwrap_or_else(|e| e.into_inner());
                continue;
            }
            let n = room.min(data.len());
            state.buf.extend(&data[..n]);
            data = &data[n..];
            self.shared.readable.notify_one();
        }
        Ok(())
    }

    /// Close the pipe; pending bytes stay readable
    pub fn close(&self) {
        let mut state = self.shared.lock();
        state.closed = true;
        self.shared.readable.notify_all();
        self.shared.writable.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

/// Host side of the pipe. Clones share the same queue.
#[derive(Clone)]
pub struct ReplyReader {
    shared: Arc<Shared>,
}

impl ReplyReader {
    /// Bytes currently queued
    pub fn available(&self) -> usize {
        self.shared.lock().buf.len()
    }

    /// Take whatever is queued without blocking
    pub fn try_read_all(&self) -> Vec<u8> {
        let mut state = self.shared.lock();
        let out: Vec<u8> = state.buf.drain(..).collect();
        if !out.is_empty() {
            self.shared.writable.notify_all();
        }
        out
    }
}

impl io::Read for ReplyReader {
    /// Blocks until at least one byte is available. Returns `Ok(0)` once the
    /// pipe is closed and drained.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.lock();
        loop {
            if !state.buf.is_empty() {
                let n = buf.len().min(state.buf.len());
                for (dst, src) in buf.iter_mut().zip(state.buf.drain(..n)) {
                    *dst = src;
                }
                self.shared.writable.notify_one();
                return Ok(n);
            }
            if state.closed {
                return Ok(0);
            }
            state = self
                .shared
                .readable
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::thread;

    #[test]
    fn test_write_then_read() {
        let (w, mut r) = pipe(16);
        w.write_all(b"\x1b[0n").unwrap();
        let mut buf = [0u8; 16];
        let n = r.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"\x1b[0n");
    }

    #[test]
    fn test_close_drains_then_eof() {
        let (w, mut r) = pipe(16);
        w.write_all(b"ab").unwrap();
        w.close();
        let mut buf = [0u8; 1];
        assert_eq!(r.read(&mut buf).unwrap(), 1);
        assert_eq!(r.read(&mut buf).unwrap(), 1);
        assert_eq!(r.read(&mut buf).unwrap(), 0);
        assert!(matches!(w.write_all(b"x"), Err(Error::Closed)));
    }

    #[test]
    fn test_writer_blocks_until_drained() {
        let (w, mut r) = pipe(4);
        let handle = thread::spawn(move || {
            w.write_all(b"0123456789").unwrap();
            w.close();
        });
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        handle.join().unwrap();
        assert_eq!(out, b"0123456789");
    }

    #[test]
    fn test_reader_blocks_until_written() {
        let (w, r) = pipe(8);
        let mut reader = r.clone();
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 8];
            reader.read(&mut buf).unwrap()
        });
        w.write_all(b"xyz").unwrap();
        let n = handle.join().unwrap();
        assert_eq!(n, 3);
        assert_eq!(r.available(), 0);
    }
}
