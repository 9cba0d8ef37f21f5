// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

//! Compact integers
//!
//! Non-negative integers are written in one of four modes, selected by magnitude. The two
//! low bits of the first byte hold the mode:
//!
//! | Range                    | Mode                        | Size                 |
//! |--------------------------|-----------------------------|----------------------|
//! | `0..=0x3f`               | [`CompactMode::SingleByte`] | 1                    |
//! | `0x40..=0x3fff`          | [`CompactMode::TwoByte`]    | 2                    |
//! | `0x4000..=0x3fff_ffff`   | [`CompactMode::FourByte`]   | 4                    |
//! | `0x4000_0000..`          | [`CompactMode::BigInteger`] | 1 + significant bytes |
//!
//! ```rust
//! use scale_light::{Compact, Encode};
//!
//! assert_eq!(Compact(42u32).encode().unwrap(), [0xa8]);
//! assert_eq!(Compact(69u32).encode().unwrap(), [0x15, 0x01]);
//! ```

use crate::{Decode, Encode, Error};
use core::{convert::TryFrom, fmt, marker::PhantomData, mem::size_of};
use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};

const MAX_SINGLE_BYTE: u32 = 0x3f;
const MAX_TWO_BYTE: u32 = 0x3fff;
const MAX_FOUR_BYTE: u32 = 0x3fff_ffff;

/// Largest magnitude length the 6-bit length header of the big-integer mode can describe
pub const MAX_BIG_INTEGER_BYTES: usize = 0x3f + 4;

/// Encoding mode of a compact integer
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompactMode {
    SingleByte,
    TwoByte,
    FourByte,
    BigInteger,
}

impl CompactMode {
    /// Mode tag stored in the two low bits of the first byte
    pub fn tag(self) -> u8 {
        match self {
            CompactMode::SingleByte => 0b00,
            CompactMode::TwoByte => 0b01,
            CompactMode::FourByte => 0b10,
            CompactMode::BigInteger => 0b11,
        }
    }

    /// Mode a first byte announces
    pub fn from_head(head: u8) -> Self {
        match head & 0b11 {
            0b00 => CompactMode::SingleByte,
            0b01 => CompactMode::TwoByte,
            0b10 => CompactMode::FourByte,
            _ => CompactMode::BigInteger,
        }
    }
}

/// Unsigned integer types that can be compact encoded
pub trait CompactUnsigned: Sized {
    /// Returns the value if it is small enough for the single, two or four byte modes
    fn to_small(&self) -> Option<u32>;

    /// Calls `f` with the little-endian bytes of the value, without trailing zeros
    fn with_le_bytes<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R;

    /// Builds a value from a small-mode payload, if the type can hold it
    fn from_small(v: u32) -> Option<Self>;

    /// Builds a value from little-endian bytes, if the type can hold it
    fn from_le_slice(bytes: &[u8]) -> Option<Self>;
}

fn significant_len(bytes: &[u8]) -> usize {
    bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1)
}

macro_rules! impl_compact_unsigned {
    ($($t:ty),+) => {
        $(
            impl CompactUnsigned for $t {
                fn to_small(&self) -> Option<u32> {
                    u32::try_from(*self).ok().filter(|&v| v <= MAX_FOUR_BYTE)
                }

                fn with_le_bytes<R, F>(&self, f: F) -> R
                where
                    F: FnOnce(&[u8]) -> R,
                {
                    let bytes = self.to_le_bytes();
                    f(&bytes[..significant_len(&bytes)])
                }

                fn from_small(v: u32) -> Option<Self> {
                    <$t>::try_from(v).ok()
                }

                fn from_le_slice(bytes: &[u8]) -> Option<Self> {
                    let len = significant_len(bytes);
                    if len > size_of::<$t>() {
                        return None;
                    }
                    let mut buf = [0; size_of::<$t>()];
                    buf[..len].copy_from_slice(&bytes[..len]);
                    Some(<$t>::from_le_bytes(buf))
                }
            }
        )+
    };
}

impl_compact_unsigned!(u8, u16, u32, u64, u128);

impl CompactUnsigned for BigUint {
    fn to_small(&self) -> Option<u32> {
        self.to_u32().filter(|&v| v <= MAX_FOUR_BYTE)
    }

    fn with_le_bytes<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        let bytes = self.to_bytes_le();
        f(&bytes[..significant_len(&bytes)])
    }

    fn from_small(v: u32) -> Option<Self> {
        Some(BigUint::from(v))
    }

    fn from_le_slice(bytes: &[u8]) -> Option<Self> {
        Some(BigUint::from_bytes_le(bytes))
    }
}

/// Wrapper selecting the compact encoding for an unsigned integer
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Compact<T>(pub T);

impl<T> Compact<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: CompactUnsigned> Compact<T> {
    /// Mode used to encode this value
    pub fn mode(&self) -> CompactMode {
        match self.0.to_small() {
            Some(v) if v <= MAX_SINGLE_BYTE => CompactMode::SingleByte,
            Some(v) if v <= MAX_TWO_BYTE => CompactMode::TwoByte,
            Some(_) => CompactMode::FourByte,
            None => CompactMode::BigInteger,
        }
    }
}

impl<T> From<T> for Compact<T> {
    fn from(x: T) -> Self {
        Compact(x)
    }
}

macro_rules! impl_from_signed {
    ($($s:ty => $u:ty),+) => {
        $(
            impl TryFrom<$s> for Compact<$u> {
                type Error = Error;

                fn try_from(v: $s) -> Result<Self, Error> {
                    <$u>::try_from(v)
                        .map(Compact)
                        .map_err(|_| Error::invalid_value("negative compact integer"))
                }
            }
        )+
    };
}

impl_from_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, i128 => u128);

impl TryFrom<BigInt> for Compact<BigUint> {
    type Error = Error;

    fn try_from(v: BigInt) -> Result<Self, Error> {
        v.to_biguint()
            .map(Compact)
            .ok_or_else(|| Error::invalid_value("negative compact integer"))
    }
}

impl TryFrom<&BigInt> for Compact<BigUint> {
    type Error = Error;

    fn try_from(v: &BigInt) -> Result<Self, Error> {
        v.to_biguint()
            .map(Compact)
            .ok_or_else(|| Error::invalid_value("negative compact integer"))
    }
}

/// Mode a signed value would be encoded with
///
/// Fails with [`Error::InvalidValue`] if `n` is negative.
pub fn mode_of_signed(n: &BigInt) -> Result<CompactMode, Error> {
    Compact::<BigUint>::try_from(n).map(|c| c.mode())
}

fn encode_small(v: u32, out: &mut [u8]) -> Result<usize, Error> {
    if v <= MAX_SINGLE_BYTE {
        Error::check_len(1, out.len())?;
        out[0] = (v << 2) as u8;
        Ok(1)
    } else if v <= MAX_TWO_BYTE {
        Error::check_len(2, out.len())?;
        let bytes = ((v << 2) as u16 | 0b01).to_le_bytes();
        out[..2].copy_from_slice(&bytes);
        Ok(2)
    } else {
        debug_assert!(v <= MAX_FOUR_BYTE);
        Error::check_len(4, out.len())?;
        out[..4].copy_from_slice(&(v << 2 | 0b10).to_le_bytes());
        Ok(4)
    }
}

fn check_big_len(len: usize) -> Result<(), Error> {
    // Anything above 0x3fff_ffff has at least four significant bytes.
    debug_assert!(len >= 4, "big-integer mode used for a {}-byte value", len);
    if len < 4 {
        return Err(Error::invalid_value("compact integer too small for big-integer mode"));
    }
    if len > MAX_BIG_INTEGER_BYTES {
        return Err(Error::invalid_value("compact integer exceeds 67 bytes"));
    }
    Ok(())
}

fn encode_big(magnitude: &[u8], out: &mut [u8]) -> Result<usize, Error> {
    let len = magnitude.len();
    check_big_len(len)?;
    Error::check_len(len + 1, out.len())?;
    out[0] = ((len - 4) << 2) as u8 | 0b11;
    out[1..=len].copy_from_slice(magnitude);
    Ok(len + 1)
}

impl<T: CompactUnsigned> Encode for Compact<T> {
    fn encoded_size(&self) -> usize {
        match self.0.to_small() {
            Some(v) if v <= MAX_SINGLE_BYTE => 1,
            Some(v) if v <= MAX_TWO_BYTE => 2,
            Some(_) => 4,
            None => self.0.with_le_bytes(|b| b.len() + 1),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        match self.0.to_small() {
            Some(_) => Ok(()),
            None => self.0.with_le_bytes(|b| check_big_len(b.len())),
        }
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        match self.0.to_small() {
            Some(v) => encode_small(v, out),
            None => self.0.with_le_bytes(|b| encode_big(b, out)),
        }
    }
}

impl<T: CompactUnsigned> Decode for Compact<T> {
    fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
        let head = *input.first().ok_or(Error::BufferTooSmall { needed: 1, available: 0 })?;
        let too_large = || Error::invalid_value("compact integer too large for target type");
        match CompactMode::from_head(head) {
            CompactMode::SingleByte => {
                let v = T::from_small(u32::from(head >> 2)).ok_or_else(too_large)?;
                Ok((Compact(v), 1))
            }
            CompactMode::TwoByte => {
                Error::check_len(2, input.len())?;
                let v = u16::from_le_bytes([input[0], input[1]]) >> 2;
                let v = T::from_small(u32::from(v)).ok_or_else(too_large)?;
                Ok((Compact(v), 2))
            }
            CompactMode::FourByte => {
                Error::check_len(4, input.len())?;
                let v = u32::from_le_bytes([input[0], input[1], input[2], input[3]]) >> 2;
                let v = T::from_small(v).ok_or_else(too_large)?;
                Ok((Compact(v), 4))
            }
            CompactMode::BigInteger => {
                let len = usize::from(head >> 2) + 4;
                Error::check_len(len + 1, input.len())?;
                let v = T::from_le_slice(&input[1..=len]).ok_or_else(too_large)?;
                Ok((Compact(v), len + 1))
            }
        }
    }
}

/// Number of bytes the compact encoding of `n` takes
pub fn compact_len(n: u64) -> usize {
    Compact(n).encoded_size()
}

/// Newtype name recognized by [`Serializer`](crate::Serializer) and
/// [`Deserializer`](crate::Deserializer) to switch to the compact encoding
///
/// Other serde formats see a plain newtype around the integer.
pub(crate) const SERDE_NAME: &str = "$scale_light::Compact";

impl<T: Serialize> Serialize for Compact<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(SERDE_NAME, &self.0)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Compact<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CompactVisitor<T>(PhantomData<fn() -> T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for CompactVisitor<T> {
            type Value = Compact<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a compact integer")
            }

            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                T::deserialize(deserializer).map(Compact)
            }
        }

        deserializer.deserialize_newtype_struct(SERDE_NAME, CompactVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::{mode_of_signed, Compact, CompactMode, MAX_BIG_INTEGER_BYTES};
    use crate::{Decode, Encode, Error};
    use alloc::{vec, vec::Vec};
    use core::convert::TryFrom;
    use num_bigint::{BigInt, BigUint};

    fn encode<T: Encode>(v: T) -> Vec<u8> {
        v.encode().unwrap()
    }

    #[test]
    fn known_vectors() {
        assert_eq!(encode(Compact(0u32)), [0x00]);
        assert_eq!(encode(Compact(1u32)), [0x04]);
        assert_eq!(encode(Compact(42u32)), [0xa8]);
        assert_eq!(encode(Compact(69u32)), [0x15, 0x01]);
        assert_eq!(encode(Compact(65535u32)), [0xfe, 0xff, 0x03, 0x00]);
        assert_eq!(encode(Compact(5897439u32)).len(), 4);
    }

    #[test]
    fn mode_boundaries() {
        let cases: [(u64, CompactMode, usize); 7] = [
            (0x3f, CompactMode::SingleByte, 1),
            (0x40, CompactMode::TwoByte, 2),
            (0x3fff, CompactMode::TwoByte, 2),
            (0x4000, CompactMode::FourByte, 4),
            (0x3fff_ffff, CompactMode::FourByte, 4),
            (0x4000_0000, CompactMode::BigInteger, 5),
            (u64::max_value(), CompactMode::BigInteger, 9),
        ];
        for &(n, mode, size) in cases.iter() {
            assert_eq!(Compact(n).mode(), mode, "{:#x}", n);
            assert_eq!(Compact(n).encoded_size(), size, "{:#x}", n);
            assert_eq!(encode(Compact(n)).len(), size, "{:#x}", n);
            assert_eq!(Compact::<u64>::decode_from(&encode(Compact(n))).unwrap(), (Compact(n), size));
        }
    }

    #[test]
    fn big_integer_mode_layout() {
        assert_eq!(encode(Compact(0x4000_0000u32)), [0x03, 0x00, 0x00, 0x00, 0x40]);
        assert_eq!(encode(Compact(1u64 << 32)), [0x07, 0x00, 0x00, 0x00, 0x00, 0x01]);
        assert_eq!(encode(Compact(u128::max_value())), {
            let mut v: Vec<u8> = vec![(12 << 2) | 0b11];
            v.extend_from_slice(&[0xff; 16]);
            v
        });
    }

    #[test]
    fn arbitrary_precision_roundtrips() {
        let n: BigUint = BigUint::from(1u8) << 500;
        let bytes = encode(Compact(n.clone()));
        assert_eq!(bytes.len(), 64);
        assert_eq!(bytes[0], ((63 - 4) << 2) | 0b11);
        assert_eq!(Compact::<BigUint>::decode_from(&bytes).unwrap(), (Compact(n), 64));
    }

    #[test]
    fn oversized_big_integer_is_rejected() {
        let n = BigUint::from(1u8) << (MAX_BIG_INTEGER_BYTES * 8);
        let mut out = vec![0; 80];
        assert!(matches!(Compact(n).encode_to(&mut out), Err(Error::InvalidValue { .. })));
        assert!(out.iter().all(|&b| b == 0));
        let largest = (BigUint::from(1u8) << (MAX_BIG_INTEGER_BYTES * 8)) - 1u8;
        assert_eq!(encode(Compact(largest)).len(), MAX_BIG_INTEGER_BYTES + 1);
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(matches!(Compact::<u64>::try_from(-1i64), Err(Error::InvalidValue { .. })));
        assert!(matches!(
            Compact::<BigUint>::try_from(BigInt::from(-5)),
            Err(Error::InvalidValue { .. }),
        ));
        assert!(matches!(mode_of_signed(&BigInt::from(-1)), Err(Error::InvalidValue { .. })));
        assert_eq!(mode_of_signed(&BigInt::from(265317)), Ok(CompactMode::FourByte));
        assert_eq!(Compact::<u32>::try_from(7i32), Ok(Compact(7)));
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert_eq!(
            Compact::<u32>::decode_from(&[]),
            Err(Error::BufferTooSmall { needed: 1, available: 0 }),
        );
        assert_eq!(
            Compact::<u32>::decode_from(&[0x15]),
            Err(Error::BufferTooSmall { needed: 2, available: 1 }),
        );
        assert_eq!(
            Compact::<u32>::decode_from(&[0xfe, 0xff, 0x03]),
            Err(Error::BufferTooSmall { needed: 4, available: 3 }),
        );
        assert_eq!(
            Compact::<u64>::decode_from(&[0x07, 0, 0, 0, 0]),
            Err(Error::BufferTooSmall { needed: 6, available: 5 }),
        );
    }

    #[test]
    fn narrow_targets_reject_large_values() {
        let bytes = encode(Compact(300u32));
        assert!(matches!(Compact::<u8>::decode_from(&bytes), Err(Error::InvalidValue { .. })));
        let bytes = encode(Compact(1u64 << 40));
        assert!(matches!(Compact::<u32>::decode_from(&bytes), Err(Error::InvalidValue { .. })));
        assert_eq!(Compact::<u64>::decode(&bytes), Ok(Compact(1 << 40)));
    }

    #[test]
    fn trailing_bytes_are_not_consumed() {
        assert_eq!(Compact::<u32>::decode_from(&[0x15, 0x01, 0xff]).unwrap(), (Compact(69), 2));
    }
}
