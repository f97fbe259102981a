//! jobsettings wire protocol: version-gated binary primitives
//!
//! This crate defines the byte-level building blocks used when job settings
//! cross a node boundary (replication, cluster-state transfer). Both sides
//! agree on a [`WireVersion`] first; every writer and reader carries that
//! version so payload types can gate the slots they emit.
//!
//! # Wire Format
//!
//! - `bool`: one byte, `0` or `1`
//! - `i32`: four bytes, big-endian
//! - `f32`: IEEE-754 bits as four bytes, big-endian
//! - optional: a `bool` presence byte, followed by the payload when present
//!
//! Released versions are frozen. Adding a slot requires:
//! 1. A new `WireVersion` constant, and `CURRENT` bumped to it
//! 2. Writers emitting the slot only when `version >= <new constant>`
//! 3. Readers synthesizing a value for the slot below that version
//!
//! # Usage
//!
//! ```ignore
//! use jobsettings_protocol::{WireReader, WireVersion, WireWriter};
//!
//! let mut out = WireWriter::new(WireVersion::CURRENT);
//! out.write_optional_i32(Some(500));
//! let bytes = out.into_bytes();
//!
//! let mut input = WireReader::new(&bytes, WireVersion::CURRENT);
//! assert_eq!(input.read_optional_i32()?, Some(500));
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// =============================================================================
// Versions
// =============================================================================

/// Negotiated protocol version between two peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireVersion(u32);

impl WireVersion {
    /// Baseline: page size and throttle rate only.
    pub const V0: WireVersion = WireVersion(0);
    /// Adds the dates-as-epoch-millis flag.
    pub const V1: WireVersion = WireVersion(1);
    /// Adds the align-checkpoints flag.
    pub const V2: WireVersion = WireVersion(2);
    /// Newest version this build speaks.
    pub const CURRENT: WireVersion = WireVersion::V2;

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Version both peers understand.
    pub fn negotiate(self, peer: WireVersion) -> WireVersion {
        self.min(peer)
    }

    pub fn on_or_after(self, other: WireVersion) -> bool {
        self >= other
    }
}

impl Default for WireVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for WireVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Error parsing a version string such as `"2"` or `"v2"`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid wire version '{0}': expected a number such as 2 or v2")]
pub struct ParseVersionError(String);

impl FromStr for WireVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map(WireVersion)
            .map_err(|_| ParseVersionError(s.to_string()))
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended inside a slot.
    #[error("unexpected end of input: needed {needed} byte(s), {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    /// A presence or bool byte that is neither 0 nor 1.
    #[error("invalid bool byte 0x{0:02x}")]
    InvalidBool(u8),
}

// =============================================================================
// Writer
// =============================================================================

/// Append-only byte sink bound to a negotiated version.
#[derive(Debug, Clone)]
pub struct WireWriter {
    version: WireVersion,
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new(version: WireVersion) -> Self {
        Self {
            version,
            buf: Vec::new(),
        }
    }

    pub fn version(&self) -> WireVersion {
        self.version
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    pub fn write_optional_i32(&mut self, value: Option<i32>) {
        match value {
            Some(v) => {
                self.write_bool(true);
                self.write_i32(v);
            }
            None => self.write_bool(false),
        }
    }

    pub fn write_optional_f32(&mut self, value: Option<f32>) {
        match value {
            Some(v) => {
                self.write_bool(true);
                self.write_f32(v);
            }
            None => self.write_bool(false),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// =============================================================================
// Reader
// =============================================================================

/// Cursor over a received payload, bound to the sender's version.
///
/// The reader never looks past the last slot its caller asks for, so bytes
/// appended by a newer peer are left untouched.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    version: WireVersion,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(bytes: &'a [u8], version: WireVersion) -> Self {
        Self {
            version,
            bytes,
            pos: 0,
        }
    }

    pub fn version(&self) -> WireVersion {
        self.version
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let remaining = self.remaining();
        if remaining < N {
            return Err(DecodeError::Truncated {
                needed: N,
                remaining,
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let [byte] = self.take::<1>()?;
        match byte {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_be_bytes(self.take::<4>()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(u32::from_be_bytes(self.take::<4>()?)))
    }

    pub fn read_optional_i32(&mut self) -> Result<Option<i32>, DecodeError> {
        if self.read_bool()? {
            self.read_i32().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn read_optional_f32(&mut self) -> Result<Option<f32>, DecodeError> {
        if self.read_bool()? {
            self.read_f32().map(Some)
        } else {
            Ok(None)
        }
    }
}
