//! Process-pipe streams.
//!
//! `popen` spawns `sh -c command` with one anonymous pipe end duplicated
//! onto the child's stdin (`w` mode) or stdout (`r` mode) and wraps the
//! parent's end in an ordinary buffered [`Stream`]. `pclose` performs the
//! normal close (final flush included) and then blocks reaping the child.

use std::ffi::CString;

use fdbuf_core::error::StreamError;
use fdbuf_core::mode::parse_mode;

use crate::stream::Stream;
use crate::sys;

/// Exit code used by the child branch when image replacement fails.
const EXEC_FAILED: i32 = 127;

/// Spawn `sh -c command` and return a stream over the command's stdout
/// (`mode == "r"`) or stdin (`mode == "w"`).
///
/// Only `r` and `w` are accepted; anything else (including `+` and append
/// variants) fails with `Access` before any process is spawned. Pipe or
/// fork failure reports `Spawn` and leaks no descriptors.
pub fn popen(command: &str, mode: &str) -> Result<Stream, StreamError> {
    if mode != "r" && mode != "w" {
        return Err(StreamError::Access);
    }
    // Infallible for "r"/"w"; reuse the ordinary flag derivation.
    let flags = parse_mode(mode).ok_or(StreamError::Access)?;
    let command =
        CString::new(command).map_err(|_| StreamError::Spawn { errno: libc::EINVAL })?;

    let (read_end, write_end) =
        sys::pipe().map_err(|errno| StreamError::Spawn { errno })?;

    match sys::fork() {
        Err(errno) => {
            let _ = sys::close(read_end);
            let _ = sys::close(write_end);
            Err(StreamError::Spawn { errno })
        }
        Ok(0) => {
            // Child: wire the matching end onto the standard stream, then
            // replace the image. This branch must never return into parent
            // logic, so a failed exec terminates the child outright.
            if mode == "r" {
                let _ = sys::close(read_end);
                let _ = sys::dup2(write_end, libc::STDOUT_FILENO);
            } else {
                let _ = sys::close(write_end);
                let _ = sys::dup2(read_end, libc::STDIN_FILENO);
            }
            sys::exec_shell(&command);
            sys::exit_now(EXEC_FAILED)
        }
        Ok(pid) => {
            // Parent: keep the end the child is not using.
            let fd = if mode == "r" {
                let _ = sys::close(write_end);
                read_end
            } else {
                let _ = sys::close(read_end);
                write_end
            };
            let mut stream = Stream::from_fd(fd, flags);
            stream.set_child(pid);
            Ok(stream)
        }
    }
}

impl Stream {
    /// Close a pipe stream and reap its child.
    ///
    /// Fails with `Access` on a stream that was not opened by [`popen`].
    /// The ordinary close (final flush included) runs first; the child is
    /// waited on regardless of its outcome so no zombie is left behind.
    /// Returns the child's raw termination status word, decodable with
    /// `fdbuf_core::status`.
    pub fn pclose(self) -> Result<i32, StreamError> {
        let Some(pid) = self.child() else {
            return Err(StreamError::Access);
        };

        let closed = self.close();
        let waited = sys::waitpid(pid);

        match (closed, waited) {
            (Ok(()), Ok(status)) => Ok(status),
            (Err(e), _) => Err(e),
            (Ok(()), Err(errno)) => Err(StreamError::Io { errno }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popen_rejects_extended_modes() {
        assert_eq!(popen("true", "r+").unwrap_err(), StreamError::Access);
        assert_eq!(popen("true", "a").unwrap_err(), StreamError::Access);
        assert_eq!(popen("true", "w+").unwrap_err(), StreamError::Access);
        assert_eq!(popen("true", "").unwrap_err(), StreamError::Access);
    }

    #[test]
    fn test_pclose_on_plain_file_stream_is_access() {
        let s = Stream::open("/dev/null", "r").unwrap();
        assert_eq!(s.pclose().unwrap_err(), StreamError::Access);
    }
}
