//! Typed veneer over raw libc calls.
//!
//! Every wrapper converts the C `-1`/errno convention into
//! `Result<_, i32>` carrying the raw errno, and confines `unsafe` to this
//! module. The blocking POSIX contract is assumed throughout: each call
//! parks the thread until the kernel completes it.

use std::ffi::CStr;
use std::os::fd::RawFd;

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// `open(path, bits, perm)` — acquire a descriptor.
pub(crate) fn open(path: &CStr, bits: i32, perm: libc::mode_t) -> Result<RawFd, i32> {
    // SAFETY: path is a valid NUL-terminated string for the duration of the call.
    let fd = unsafe { libc::open(path.as_ptr(), bits, perm as libc::c_uint) };
    if fd < 0 { Err(last_errno()) } else { Ok(fd) }
}

/// `read(fd, buf)` — read up to `buf.len()` bytes. Ok(0) is end of file.
pub(crate) fn read(fd: RawFd, buf: &mut [u8]) -> Result<usize, i32> {
    // SAFETY: buf is a live, writable slice of exactly the length passed.
    let rc = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
    if rc < 0 { Err(last_errno()) } else { Ok(rc as usize) }
}

/// `write(fd, buf)` — write up to `buf.len()` bytes; partial transfers are
/// legal and the caller loops.
pub(crate) fn write(fd: RawFd, buf: &[u8]) -> Result<usize, i32> {
    // SAFETY: buf is a live, readable slice of exactly the length passed.
    let rc = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
    if rc < 0 { Err(last_errno()) } else { Ok(rc as usize) }
}

/// `lseek(fd, offset, whence)` — returns the new absolute offset.
pub(crate) fn lseek(fd: RawFd, offset: i64, whence: libc::c_int) -> Result<i64, i32> {
    // SAFETY: no pointers cross the boundary.
    let rc = unsafe { libc::lseek(fd, offset as libc::off_t, whence) };
    if rc < 0 { Err(last_errno()) } else { Ok(rc as i64) }
}

/// `close(fd)` — release a descriptor.
pub(crate) fn close(fd: RawFd) -> Result<(), i32> {
    // SAFETY: fd is owned by the caller; double-close is prevented above.
    let rc = unsafe { libc::close(fd) };
    if rc < 0 { Err(last_errno()) } else { Ok(()) }
}

/// `pipe()` — returns `(read_end, write_end)`.
pub(crate) fn pipe() -> Result<(RawFd, RawFd), i32> {
    let mut fds = [0 as libc::c_int; 2];
    // SAFETY: fds is a live two-element array as pipe(2) requires.
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if rc < 0 {
        Err(last_errno())
    } else {
        Ok((fds[0], fds[1]))
    }
}

/// `dup2(oldfd, newfd)` — duplicate a descriptor onto a fixed number.
pub(crate) fn dup2(oldfd: RawFd, newfd: RawFd) -> Result<(), i32> {
    // SAFETY: no pointers cross the boundary.
    let rc = unsafe { libc::dup2(oldfd, newfd) };
    if rc < 0 { Err(last_errno()) } else { Ok(()) }
}

/// `fork()` — Ok(0) in the child, Ok(pid) in the parent.
pub(crate) fn fork() -> Result<libc::pid_t, i32> {
    // SAFETY: the child branch execs or exits immediately, so no
    // post-fork invariants of the Rust runtime are relied on.
    let pid = unsafe { libc::fork() };
    if pid < 0 { Err(last_errno()) } else { Ok(pid) }
}

/// Blocking `waitpid(pid)` — returns the raw status word.
pub(crate) fn waitpid(pid: libc::pid_t) -> Result<i32, i32> {
    let mut status: libc::c_int = 0;
    // SAFETY: status is a live out-parameter for the duration of the call.
    let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
    if rc < 0 { Err(last_errno()) } else { Ok(status) }
}

/// Replace the process image with `sh -c command`. Returns only on failure.
pub(crate) fn exec_shell(command: &CStr) -> i32 {
    let sh = c"sh";
    let dash_c = c"-c";
    let argv = [
        sh.as_ptr(),
        dash_c.as_ptr(),
        command.as_ptr(),
        std::ptr::null(),
    ];
    // SAFETY: argv is NULL-terminated and every element outlives the call.
    unsafe { libc::execvp(sh.as_ptr(), argv.as_ptr()) }
}

/// Terminate the calling process immediately, skipping all cleanup.
pub(crate) fn exit_now(code: i32) -> ! {
    // SAFETY: _exit never returns.
    unsafe { libc::_exit(code) }
}
