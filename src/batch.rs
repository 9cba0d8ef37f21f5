// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

//! Decoding many values at once
//!
//! Values are read back to back with no length prefix. [`decode_into`] reads as many values
//! as its destination holds, [`decode_to_end`] reads until the input runs out.

use crate::{Decode, Error};
use alloc::vec::Vec;
use core::fmt::{self, Display};

/// Failure of [`decode_into`] after some values were possibly decoded
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartialDecode {
    /// Number of leading destination slots that were filled
    pub decoded: usize,
    /// Bytes consumed by the decoded values
    pub bytes_read: usize,
    pub error: Error,
}

impl Display for PartialDecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decoded {} values ({} bytes) before failing: {}", self.decoded,
            self.bytes_read, self.error)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PartialDecode {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<PartialDecode> for Error {
    fn from(e: PartialDecode) -> Self {
        e.error
    }
}

/// Decodes `dest.len()` consecutive values into `dest` and returns the bytes read
///
/// An empty destination reads nothing and succeeds.
pub fn decode_into<T: Decode>(input: &[u8], dest: &mut [T]) -> Result<usize, PartialDecode> {
    let mut pos = 0;
    for (i, slot) in dest.iter_mut().enumerate() {
        match T::decode_from(&input[pos..]) {
            Ok((value, read)) => {
                *slot = value;
                pos += read;
            }
            Err(error) => {
                return Err(PartialDecode {
                    decoded: i,
                    bytes_read: pos,
                    error: error.at_offset(pos),
                });
            }
        }
    }
    Ok(pos)
}

/// Decodes consecutive values until `input` is exhausted
///
/// Returns the values and the bytes they occupy. If a value fails to decode after at least
/// one succeeded, decoding stops there and the values read so far are returned; trailing
/// bytes are then left unread. A failure on the first value is returned as is. A value that
/// decodes from zero bytes cannot exhaust the input and fails with
/// [`Error::MalformedInput`].
pub fn decode_to_end<T: Decode>(input: &[u8]) -> Result<(Vec<T>, usize), Error> {
    let mut values = Vec::new();
    let mut pos = 0;
    while pos < input.len() {
        match T::decode_from(&input[pos..]) {
            Ok((_, 0)) => return Err(Error::MalformedInput { offset: pos }),
            Ok((value, read)) => {
                values.push(value);
                pos += read;
            }
            Err(e) if values.is_empty() => return Err(e),
            Err(e) => {
                tracing::trace!(
                    decoded = values.len(),
                    offset = pos,
                    error = %e,
                    "batch decode stopped",
                );
                break;
            }
        }
    }
    Ok((values, pos))
}
