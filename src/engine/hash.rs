//! Short content hashes.
//!
//! Output filenames embed the first six lowercase hex characters of an MD5
//! digest. MD5 is used for its distribution only; nothing here is a security
//! boundary, and the truncation keeps URLs short.

use md5::{Digest, Md5};

/// Number of hex characters kept from the digest.
const SHORT_LEN: usize = 6;

/// Six lowercase hex characters of MD5 over the given bytes.
pub fn short_hash(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    let digest = hasher.finalize();

    let mut out = String::with_capacity(SHORT_LEN);
    for byte in digest.iter().take(SHORT_LEN.div_ceil(2)) {
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(SHORT_LEN);
    out
}

/// Short hash of strings joined with `\n` (no trailing newline).
pub fn joined_hash<S: AsRef<str>>(lines: &[S]) -> String {
    let mut hasher = Md5::new();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            hasher.update(b"\n");
        }
        hasher.update(line.as_ref().as_bytes());
    }
    let digest = hasher.finalize();

    let mut out = String::with_capacity(SHORT_LEN);
    for byte in digest.iter().take(SHORT_LEN.div_ceil(2)) {
        out.push_str(&format!("{byte:02x}"));
    }
    out.truncate(SHORT_LEN);
    out
}
