//! MD5 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing whole-file
//! content fingerprints. The digest covers every byte of the file, but the
//! file is read through a fixed-size buffer so memory stays flat no matter
//! how large the file is.
//!
//! MD5 is used as a fast candidate-duplicate signal. Collisions are not
//! defended against.
//!
//! # Example
//!
//! ```no_run
//! use dupscan::scanner::Hasher;
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! match hasher.hash(Path::new("photo.jpg")) {
//!     Ok(fingerprint) => println!("photo.jpg: {}", fingerprint),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::{Digest, Md5};

use super::HashError;

/// Size of the read buffer used when streaming file content (64 KiB).
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Length of an MD5 digest in bytes.
const DIGEST_LEN: usize = 16;

/// A 128-bit content fingerprint.
///
/// Displays as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; DIGEST_LEN]);

impl Fingerprint {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Fingerprint of an in-memory byte slice.
    #[must_use]
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(Md5::digest(data).into())
    }

    /// Lowercase hexadecimal form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// Error parsing a fingerprint from hex.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFingerprintError {
    /// The string is not exactly 32 characters long.
    #[error("expected 32 hex characters, got {0}")]
    InvalidLength(usize),
    /// The string contains a non-hex character.
    #[error("invalid hex character {0:?}")]
    InvalidCharacter(char),
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let len = s.chars().count();
        if len != DIGEST_LEN * 2 {
            return Err(ParseFingerprintError::InvalidLength(len));
        }

        let mut bytes = [0u8; DIGEST_LEN];
        let mut chars = s.chars();
        for byte in &mut bytes {
            let mut value = 0u8;
            for _ in 0..2 {
                let c = chars.next().ok_or(ParseFingerprintError::InvalidLength(len))?;
                let nibble = c
                    .to_digit(16)
                    .ok_or(ParseFingerprintError::InvalidCharacter(c))?;
                value = (value << 4) | nibble as u8;
            }
            *byte = value;
        }
        Ok(Self(bytes))
    }
}

/// Streaming whole-file hasher.
///
/// Stateless apart from its buffer size, so one instance can be shared
/// across worker threads.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 64 KiB read buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: READ_BUFFER_SIZE,
        }
    }

    /// Use a different read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Fingerprint the full content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a classified [`HashError`] if the file cannot be opened or
    /// read. The caller decides whether the scan continues.
    pub fn hash(&self, path: &Path) -> Result<Fingerprint, HashError> {
        self.hash_counted(path).map(|(fingerprint, _)| fingerprint)
    }

    /// Like [`Hasher::hash`], also returning the number of bytes read.
    ///
    /// # Errors
    ///
    /// Same as [`Hasher::hash`].
    pub fn hash_counted(&self, path: &Path) -> Result<(Fingerprint, u64), HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        self.hash_reader(file)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))
    }

    /// Fingerprint everything `reader` yields until EOF.
    ///
    /// # Errors
    ///
    /// Propagates read errors other than `Interrupted`, which is retried.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<(Fingerprint, u64)> {
        let mut digest = Md5::new();
        let mut buffer = vec![0u8; self.buffer_size];
        let mut total = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            digest.update(&buffer[..n]);
            total += n as u64;
        }

        Ok((Fingerprint(digest.finalize().into()), total))
    }
}
