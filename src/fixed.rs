// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

//! Fixed-width integers
//!
//! Native integers are written as exactly `size_of::<T>()` little-endian bytes, two's
//! complement when signed. [`WideInt`] does the same for [`BigInt`] values of any byte width.

use crate::{Codec, Decode, Encode, Error};
use alloc::vec::Vec;
use core::{convert::TryInto, mem::size_of};
use num_bigint::{BigInt, Sign};
use num_traits::Signed;

macro_rules! impl_fixed {
    ($($t:ty),+) => {
        $(
            impl Encode for $t {
                const FIXED_WIDTH: Option<usize> = Some(size_of::<$t>());

                fn encoded_size(&self) -> usize {
                    size_of::<$t>()
                }

                fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
                    const WIDTH: usize = size_of::<$t>();
                    Error::check_len(WIDTH, out.len())?;
                    out[..WIDTH].copy_from_slice(&self.to_le_bytes());
                    Ok(WIDTH)
                }
            }

            impl Decode for $t {
                const FIXED_WIDTH: Option<usize> = Some(size_of::<$t>());

                fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
                    const WIDTH: usize = size_of::<$t>();
                    Error::check_len(WIDTH, input.len())?;
                    let bytes: [u8; WIDTH] = input[..WIDTH]
                        .try_into()
                        .map_err(|_| Error::BufferTooSmall {
                            needed: WIDTH,
                            available: input.len(),
                        })?;
                    Ok((<$t>::from_le_bytes(bytes), WIDTH))
                }
            }
        )+
    };
}

impl_fixed!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

/// Whether a wide integer is read and written as two's complement
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// Codec for arbitrary-precision integers stored in a fixed number of bytes
///
/// Values are little-endian, two's complement when [`Signedness::Signed`], and always
/// occupy exactly `width` bytes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct WideInt {
    width: usize,
    signedness: Signedness,
}

impl WideInt {
    pub const fn new(width: usize, signedness: Signedness) -> Self {
        Self { width, signedness }
    }

    /// Signed 128-bit integers
    pub const fn i128() -> Self {
        Self::new(16, Signedness::Signed)
    }

    /// Unsigned 128-bit integers
    pub const fn u128() -> Self {
        Self::new(16, Signedness::Unsigned)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn signedness(&self) -> Signedness {
        self.signedness
    }
}

impl Codec for WideInt {
    type Value = BigInt;

    fn fixed_width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn encoded_size(&self, _: &BigInt) -> usize {
        self.width
    }

    fn validate(&self, value: &BigInt) -> Result<(), Error> {
        wide_bytes(value, self.width, self.signedness).map(drop)
    }

    fn encode_to(&self, value: &BigInt, out: &mut [u8]) -> Result<usize, Error> {
        encode_wide(value, self.width, self.signedness, out)
    }

    fn decode_from(&self, input: &[u8]) -> Result<(BigInt, usize), Error> {
        decode_wide(input, self.width, self.signedness)
    }
}

/// Writes `value` as a `width`-byte integer at the start of `out`
///
/// A negative signed value is sign-extended with `0xff` bytes, anything else is zero
/// padded. The value must fit in `width` bytes and must not be negative when unsigned.
pub fn encode_wide(
    value: &BigInt,
    width: usize,
    signedness: Signedness,
    out: &mut [u8],
) -> Result<usize, Error> {
    let bytes = wide_bytes(value, width, signedness)?;
    Error::check_len(width, out.len())?;
    let filler = if value.is_negative() { 0xff } else { 0 };
    let out = &mut out[..width];
    for b in out.iter_mut() {
        *b = filler;
    }
    // High bytes keep the filler, which is the sign extension in little-endian order.
    out[..bytes.len()].copy_from_slice(&bytes);
    Ok(width)
}

/// Minimal little-endian bytes of `value`, if they fit in `width` bytes
fn wide_bytes(value: &BigInt, width: usize, signedness: Signedness) -> Result<Vec<u8>, Error> {
    let bytes = match signedness {
        Signedness::Signed => value.to_signed_bytes_le(),
        Signedness::Unsigned if value.is_negative() => {
            return Err(Error::invalid_value("negative value for an unsigned integer"));
        }
        Signedness::Unsigned => value.magnitude().to_bytes_le(),
    };
    if bytes.len() > width {
        return Err(Error::invalid_value("integer does not fit in the requested width"));
    }
    Ok(bytes)
}

/// Reads a `width`-byte integer from the start of `input`
pub fn decode_wide(
    input: &[u8],
    width: usize,
    signedness: Signedness,
) -> Result<(BigInt, usize), Error> {
    Error::check_len(width, input.len())?;
    let bytes = &input[..width];
    let value = match signedness {
        Signedness::Signed => BigInt::from_signed_bytes_le(bytes),
        Signedness::Unsigned => BigInt::from_bytes_le(Sign::Plus, bytes),
    };
    Ok((value, width))
}
