//! Open-mode parsing and flag derivation.
//!
//! The mode vocabulary is the exact six-token set `{r, w, a, r+, w+, a+}`.
//! Flags are derived once at open time and never mutated afterwards.

/// Access-mode flags derived from the mode token.
///
/// `readable`/`writable`/`appendable` gate every data-transfer call;
/// `create`/`truncate` are consumed only by the open syscall.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    pub readable: bool,
    pub writable: bool,
    pub appendable: bool,
    pub create: bool,
    pub truncate: bool,
}

/// Parse a mode token into open flags.
///
/// Returns `None` for anything outside the six recognized tokens. The
/// derivation rules: `r*` is readable; `w*` is writable with create and
/// truncate; `a*` is writable and appendable with create; any `+` adds
/// readable; `r+` is the one case where a base `r` token gains writable.
pub fn parse_mode(mode: &str) -> Option<OpenFlags> {
    let mut flags = OpenFlags::default();
    match mode {
        "r" => {
            flags.readable = true;
        }
        "r+" => {
            flags.readable = true;
            flags.writable = true;
        }
        "w" => {
            flags.writable = true;
            flags.create = true;
            flags.truncate = true;
        }
        "w+" => {
            flags.readable = true;
            flags.writable = true;
            flags.create = true;
            flags.truncate = true;
        }
        "a" => {
            flags.writable = true;
            flags.appendable = true;
            flags.create = true;
        }
        "a+" => {
            flags.readable = true;
            flags.writable = true;
            flags.appendable = true;
            flags.create = true;
        }
        _ => return None,
    }
    Some(flags)
}

/// Convert open flags to POSIX O_* flag bits.
pub fn open_bits(flags: &OpenFlags) -> i32 {
    let mut bits = 0i32;

    if flags.readable && flags.writable {
        bits |= 2; // O_RDWR
    } else if flags.writable {
        bits |= 1; // O_WRONLY
    }
    // O_RDONLY is 0, so readable-only needs no flag.

    if flags.create {
        bits |= 0o100; // O_CREAT
    }
    if flags.truncate {
        bits |= 0o1000; // O_TRUNC
    }
    if flags.appendable {
        bits |= 0o2000; // O_APPEND
    }

    bits
}
