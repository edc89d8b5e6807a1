//! # fdbuf-posix
//!
//! Buffered streams over POSIX file descriptors, plus a process-pipe
//! variant (`popen`/`pclose`).
//!
//! The buffering policy, mode parsing, and error taxonomy live in
//! `fdbuf-core`; this crate binds them to real descriptors through a thin
//! typed syscall veneer. Everything is synchronous and blocking, and each
//! [`Stream`] exclusively owns its descriptor and buffer — driving one
//! stream from multiple threads at once is outside the contract.

pub mod pipe;
pub mod stream;
mod sys;

pub use fdbuf_core::error::StreamError;
pub use fdbuf_core::{BUF_SIZE, status};
pub use pipe::popen;
pub use stream::{Stream, Whence};
