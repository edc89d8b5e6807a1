//! Stream error taxonomy.
//!
//! Five failure classes, each with a fixed sticky-flag contract:
//! `Access` and `EndOfStream` never set the sticky error flag, `Io` always
//! does, and `Open`/`Spawn` mean no stream was constructed at all.

use thiserror::Error;

/// Failure reported by a stream operation.
///
/// Variants carrying an `errno` preserve the OS error code verbatim so
/// callers can distinguish, say, a bad path from a permission problem.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// Operation not permitted by the stream's open mode.
    ///
    /// Caller misuse, not an I/O fault: the sticky error flag is left
    /// untouched.
    #[error("operation not permitted by the stream's open mode")]
    Access,

    /// Clean exhaustion: a refill observed a zero-byte read.
    ///
    /// Sets the sticky eof flag, never the sticky error flag.
    #[error("end of stream")]
    EndOfStream,

    /// A transfer or seek failed at the descriptor. Sets the sticky error
    /// flag on the stream.
    #[error("I/O error (errno {errno})")]
    Io { errno: i32 },

    /// The mode token was unrecognized or the open call failed. No stream
    /// is constructed.
    #[error("open failed (errno {errno})")]
    Open { errno: i32 },

    /// Pipe creation or fork failed. No stream is constructed and no
    /// descriptor is leaked.
    #[error("process spawn failed (errno {errno})")]
    Spawn { errno: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_is_preserved() {
        let e = StreamError::Io { errno: 5 };
        assert_eq!(e, StreamError::Io { errno: 5 });
        assert_ne!(e, StreamError::Io { errno: 9 });
    }

    #[test]
    fn display_names_the_class() {
        assert!(StreamError::Access.to_string().contains("open mode"));
        assert!(StreamError::EndOfStream.to_string().contains("end of stream"));
        assert!(
            StreamError::Spawn { errno: 11 }
                .to_string()
                .contains("spawn")
        );
    }
}
