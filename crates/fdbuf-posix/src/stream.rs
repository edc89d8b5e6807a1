//! Buffered stream over a file descriptor.
//!
//! One `Stream` owns one descriptor and one fixed-capacity staging buffer.
//! Every public operation either serves directly from/to the buffer or
//! triggers exactly one refill or flush before proceeding. The logical
//! cursor counts bytes actually delivered to or accepted from the caller,
//! independent of the kernel offset (which diverges under buffering and
//! append mode).
//!
//! Sticky flags: `error` is set by any I/O fault and never cleared; `eof`
//! is set by a zero-byte refill and cleared only by a successful seek.

use std::ffi::CString;
use std::os::fd::RawFd;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use fdbuf_core::buffer::{BUF_SIZE, StreamBuffer};
use fdbuf_core::error::StreamError;
use fdbuf_core::mode::{OpenFlags, open_bits, parse_mode};

use crate::sys;

/// Permission bits for descriptors created by `open`.
const CREATE_PERM: libc::mode_t = 0o644;

/// Seek origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// From the start of the file.
    Start,
    /// From the current kernel offset.
    Current,
    /// From the end of the file.
    End,
}

impl Whence {
    fn as_raw(self) -> libc::c_int {
        match self {
            Whence::Start => libc::SEEK_SET,
            Whence::Current => libc::SEEK_CUR,
            Whence::End => libc::SEEK_END,
        }
    }
}

/// Which direction the buffer was last used in. Gates whether the staging
/// buffer is read-valid or write-pending; the two are never valid at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LastOp {
    #[default]
    None,
    Read,
    Write,
}

/// Buffered stream wrapping one owned file descriptor.
#[derive(Debug)]
pub struct Stream {
    /// Underlying descriptor (-1 once released).
    fd: RawFd,
    flags: OpenFlags,
    buffer: StreamBuffer,
    /// Caller-visible byte offset; advances one per byte delivered/accepted.
    logical_cursor: i64,
    eof: bool,
    error: bool,
    last_op: LastOp,
    /// Child pid for pipe-mode streams; None for ordinary files.
    child: Option<libc::pid_t>,
}

impl Stream {
    /// Open `path` with a mode token from `{r, w, a, r+, w+, a+}`.
    ///
    /// An unrecognized token or a failed open reports `Open`; no partial
    /// stream is returned in that case.
    pub fn open<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self, StreamError> {
        let flags = parse_mode(mode).ok_or(StreamError::Open { errno: libc::EINVAL })?;
        let c_path = CString::new(path.as_ref().as_os_str().as_bytes())
            .map_err(|_| StreamError::Open { errno: libc::EINVAL })?;
        let fd = sys::open(&c_path, open_bits(&flags), CREATE_PERM)
            .map_err(|errno| StreamError::Open { errno })?;
        Ok(Self::from_fd(fd, flags))
    }

    /// Wrap an already-open descriptor in a fresh stream.
    pub(crate) fn from_fd(fd: RawFd, flags: OpenFlags) -> Self {
        Self {
            fd,
            flags,
            buffer: StreamBuffer::new(BUF_SIZE),
            logical_cursor: 0,
            eof: false,
            error: false,
            last_op: LastOp::None,
            child: None,
        }
    }

    pub(crate) fn set_child(&mut self, pid: libc::pid_t) {
        self.child = Some(pid);
    }

    pub(crate) fn child(&self) -> Option<libc::pid_t> {
        self.child
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Underlying descriptor number.
    pub fn fileno(&self) -> RawFd {
        self.fd
    }

    /// Sticky end-of-file flag. Cleared only by a successful seek.
    pub fn at_end(&self) -> bool {
        self.eof
    }

    /// Sticky error flag. Never cleared once set.
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Caller-visible byte offset. Never touches the descriptor.
    pub fn tell(&self) -> i64 {
        self.logical_cursor
    }

    // -----------------------------------------------------------------------
    // Byte transfer
    // -----------------------------------------------------------------------

    /// Read one byte, refilling the buffer from the descriptor when it is
    /// exhausted.
    ///
    /// `Access` on a non-readable stream leaves the sticky error flag
    /// untouched; a failed refill sets it.
    pub fn read_byte(&mut self) -> Result<u8, StreamError> {
        if !self.flags.readable {
            return Err(StreamError::Access);
        }
        if self.eof {
            return Err(StreamError::EndOfStream);
        }
        if self.buffer.exhausted() {
            self.refill()?;
        }
        let byte = self.buffer.next_byte().ok_or(StreamError::EndOfStream)?;
        self.logical_cursor += 1;
        self.last_op = LastOp::Read;
        Ok(byte)
    }

    /// Write one byte, flushing the buffer to the descriptor first when it
    /// is full. Echoes the byte back on success.
    pub fn write_byte(&mut self, byte: u8) -> Result<u8, StreamError> {
        if !self.flags.writable && !self.flags.appendable {
            return Err(StreamError::Access);
        }
        if self.buffer.is_full() {
            self.drain_buffer()?;
        }
        let pushed = self.buffer.push(byte);
        debug_assert!(pushed, "full-buffer check precedes every append");
        self.logical_cursor += 1;
        self.last_op = LastOp::Write;
        Ok(byte)
    }

    /// Read `count` elements of `size` bytes each into `dst`, byte by byte.
    ///
    /// Stops at the first single-byte failure, returning the number of
    /// fully completed elements — forced to zero when the sticky error flag
    /// is set at that point, so a fault is distinguishable from a clean
    /// short read. `dst` must hold at least `size * count` bytes; an
    /// undersized destination reads nothing and returns zero.
    pub fn read_block(&mut self, size: usize, count: usize, dst: &mut [u8]) -> usize {
        if dst.len() < size.saturating_mul(count) {
            return 0;
        }
        let mut done = 0;
        for elem in 0..count {
            for offset in 0..size {
                match self.read_byte() {
                    Ok(byte) => dst[elem * size + offset] = byte,
                    Err(_) => return if self.error { 0 } else { done },
                }
            }
            done += 1;
        }
        done
    }

    /// Write `count` elements of `size` bytes each from `src`, byte by byte.
    ///
    /// All-or-nothing: any single-byte failure returns zero regardless of
    /// partial progress, unlike the read side. `src` must hold at least
    /// `size * count` bytes.
    pub fn write_block(&mut self, size: usize, count: usize, src: &[u8]) -> usize {
        if src.len() < size.saturating_mul(count) {
            return 0;
        }
        let mut done = 0;
        for elem in 0..count {
            for offset in 0..size {
                if self.write_byte(src[elem * size + offset]).is_err() {
                    return 0;
                }
            }
            done += 1;
        }
        done
    }

    // -----------------------------------------------------------------------
    // Flush / seek / tell
    // -----------------------------------------------------------------------

    /// Drain pending write bytes to the descriptor.
    ///
    /// A no-op returning `Ok(0)` unless the last operation was a write.
    /// On success returns the byte count flushed and resets the buffer; on
    /// failure the unflushed remainder stays in place so the caller may
    /// retry.
    pub fn flush(&mut self) -> Result<usize, StreamError> {
        if self.last_op != LastOp::Write {
            return Ok(0);
        }
        self.drain_buffer()
    }

    /// Write the pending buffer to the descriptor, looping over partial
    /// transfers. A zero or negative transfer is fatal for this flush.
    fn drain_buffer(&mut self) -> Result<usize, StreamError> {
        let total = self.buffer.len();
        let mut written = 0;
        while written < total {
            let n = match sys::write(self.fd, &self.buffer.pending()[written..]) {
                Ok(n) => n,
                Err(errno) => {
                    self.buffer.drop_flushed(written);
                    self.error = true;
                    return Err(StreamError::Io { errno });
                }
            };
            if n == 0 {
                self.buffer.drop_flushed(written);
                self.error = true;
                return Err(StreamError::Io { errno: libc::EIO });
            }
            written += n;
        }
        self.buffer.reset();
        Ok(total)
    }

    /// Move the kernel offset, flushing pending writes first and discarding
    /// any read-staged bytes.
    ///
    /// On success the logical cursor takes the new absolute offset and the
    /// eof flag clears (seeking always makes more data potentially
    /// reachable). A failed seek sets the sticky error flag.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<(), StreamError> {
        if self.flags.writable && self.last_op == LastOp::Write {
            self.drain_buffer()?;
        }
        self.buffer.reset();
        self.last_op = LastOp::None;

        match sys::lseek(self.fd, offset, whence.as_raw()) {
            Err(errno) => {
                self.error = true;
                Err(StreamError::Io { errno })
            }
            Ok(pos) => {
                self.logical_cursor = pos;
                self.eof = false;
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Close
    // -----------------------------------------------------------------------

    /// Flush pending writes and release the descriptor.
    ///
    /// The descriptor is released even when the final flush fails; the
    /// first failure of either step is reported.
    pub fn close(mut self) -> Result<(), StreamError> {
        let flushed = if (self.flags.writable || self.flags.appendable)
            && self.last_op == LastOp::Write
            && !self.buffer.is_empty()
        {
            self.drain_buffer().map(|_| ())
        } else {
            Ok(())
        };

        let fd = self.fd;
        self.fd = -1; // disarm Drop
        let released = sys::close(fd).map_err(|errno| StreamError::Io { errno });

        flushed.and(released)
    }

    fn refill(&mut self) -> Result<(), StreamError> {
        self.buffer.reset();
        match sys::read(self.fd, self.buffer.fill_target()) {
            Err(errno) => {
                self.error = true;
                Err(StreamError::Io { errno })
            }
            Ok(0) => {
                self.eof = true;
                Err(StreamError::EndOfStream)
            }
            Ok(n) => {
                self.buffer.adopt(n);
                Ok(())
            }
        }
    }
}

impl Drop for Stream {
    /// Best-effort release so an early return cannot leak the descriptor.
    /// The checked path is the explicit `close`, which disarms this.
    fn drop(&mut self) {
        if self.fd >= 0 {
            if (self.flags.writable || self.flags.appendable) && self.last_op == LastOp::Write {
                let _ = self.drain_buffer();
            }
            let _ = sys::close(self.fd);
            self.fd = -1;
        }
    }
}
