//! Process-pipe streams: reading a command's output, feeding a command's
//! input, and reaping real exit statuses.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use fdbuf_posix::{Stream, StreamError, popen, status};

fn temp_path(tag: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("fdbuf_pipe_{}_{}_{}", std::process::id(), tag, n))
}

fn read_to_end(s: &mut Stream) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        match s.read_byte() {
            Ok(b) => out.push(b),
            Err(StreamError::EndOfStream) => return out,
            Err(e) => panic!("pipe read failed: {e}"),
        }
    }
}

#[test]
fn pipe_read_yields_command_output() {
    let mut s = popen("printf 'pipe payload'", "r").unwrap();
    let out = read_to_end(&mut s);
    assert_eq!(out, b"pipe payload");
    assert!(s.at_end());
    assert!(!s.has_error());

    let st = s.pclose().unwrap();
    assert!(status::wifexited(st));
    assert_eq!(status::wexitstatus(st), 0);
}

#[test]
fn pipe_read_spanning_the_buffer() {
    // 10000 bytes of 'x' crosses the 4096-byte staging buffer twice.
    let mut s = popen("head -c 10000 /dev/zero | tr '\\0' 'x'", "r").unwrap();
    let out = read_to_end(&mut s);
    assert_eq!(out.len(), 10000);
    assert!(out.iter().all(|&b| b == b'x'));
    assert_eq!(status::wexitstatus(s.pclose().unwrap()), 0);
}

#[test]
fn pclose_reports_real_exit_status() {
    let s = popen("exit 3", "r").unwrap();
    let st = s.pclose().unwrap();
    assert!(status::wifexited(st));
    assert_eq!(status::wexitstatus(st), 3);
}

#[test]
fn pipe_write_feeds_command_stdin() {
    let path = temp_path("sink");
    let cmd = format!("cat > {}", path.display());

    let mut s = popen(&cmd, "w").unwrap();
    let payload = b"written through the pipe";
    assert_eq!(s.write_block(1, payload.len(), payload), payload.len());
    // pclose flushes the pending bytes, closes the pipe, and reaps cat.
    assert_eq!(status::wexitstatus(s.pclose().unwrap()), 0);

    assert_eq!(std::fs::read(&path).unwrap(), payload);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn pipe_stream_obeys_its_direction() {
    let mut s = popen("true", "r").unwrap();
    assert_eq!(s.write_byte(b'x'), Err(StreamError::Access));
    assert!(!s.has_error());
    let _ = s.pclose();

    let mut s = popen("cat > /dev/null", "w").unwrap();
    assert_eq!(s.read_byte(), Err(StreamError::Access));
    assert!(!s.has_error());
    assert_eq!(status::wexitstatus(s.pclose().unwrap()), 0);
}
