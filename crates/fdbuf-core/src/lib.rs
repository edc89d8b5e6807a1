//! # fdbuf-core
//!
//! Safe buffering logic for fdbuf streams.
//!
//! This crate holds everything about a buffered stream that does not touch
//! the operating system: mode-token parsing, the fixed-capacity buffer
//! engine, open-flag bit derivation, wait-status decoding, and the error
//! taxonomy. No `unsafe` code is permitted at the crate level; the actual
//! descriptor I/O lives in `fdbuf-posix`.

#![deny(unsafe_code)]

pub mod buffer;
pub mod error;
pub mod mode;
pub mod status;

pub use buffer::{BUF_SIZE, StreamBuffer};
pub use error::StreamError;
pub use mode::{OpenFlags, open_bits, parse_mode};
