// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

//! Tagged unions
//!
//! A tagged union is written as one discriminant byte followed by the payload of the variant
//! it designates. Decoding needs the closed set of variants, which implementors of
//! [`TaggedUnion`] provide by matching on the discriminant.
//!
//! ```rust
//! use scale_light::{impl_tagged_union_codec, union, Decode, Encode, Error, TaggedUnion};
//!
//! #[derive(Debug, PartialEq)]
//! enum IntOrBool {
//!     Int(u8),
//!     Bool(bool),
//! }
//!
//! impl TaggedUnion for IntOrBool {
//!     const NAME: &'static str = "IntOrBool";
//!
//!     fn discriminant(&self) -> u8 {
//!         match self {
//!             IntOrBool::Int(_) => 0,
//!             IntOrBool::Bool(_) => 1,
//!         }
//!     }
//!
//!     fn payload_size(&self) -> usize {
//!         match self {
//!             IntOrBool::Int(x) => x.encoded_size(),
//!             IntOrBool::Bool(x) => x.encoded_size(),
//!         }
//!     }
//!
//!     fn encode_payload(&self, out: &mut [u8]) -> Result<usize, Error> {
//!         match self {
//!             IntOrBool::Int(x) => x.encode_to(out),
//!             IntOrBool::Bool(x) => x.encode_to(out),
//!         }
//!     }
//!
//!     fn decode_payload(discriminant: u8, input: &[u8]) -> Result<(Self, usize), Error> {
//!         match discriminant {
//!             0 => union::decode_variant(input, IntOrBool::Int),
//!             1 => union::decode_variant(input, IntOrBool::Bool),
//!             found => Err(union::unknown::<Self>(found)),
//!         }
//!     }
//! }
//!
//! impl_tagged_union_codec!(IntOrBool);
//!
//! assert_eq!(IntOrBool::Int(42).encode().unwrap(), [0, 42]);
//! assert_eq!(IntOrBool::decode(&[1, 1]).unwrap(), IntOrBool::Bool(true));
//! assert!(IntOrBool::decode(&[2, 1]).is_err());
//! ```

use crate::{Decode, Error};

/// Sum type encoded as a discriminant byte followed by the payload of one variant
pub trait TaggedUnion: Sized {
    /// Name reported when an unknown discriminant is found
    const NAME: &'static str;

    fn discriminant(&self) -> u8;

    /// Size of the payload, without the discriminant
    fn payload_size(&self) -> usize;

    /// Checks that the payload can be encoded, without writing anything
    ///
    /// Variants holding values that may be rejected by their encoding (wide integers, big
    /// compact integers, or composites of them) should check them here.
    fn validate_payload(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Writes the payload at the start of `out`
    fn encode_payload(&self, out: &mut [u8]) -> Result<usize, Error>;

    /// Decodes the payload of the variant selected by `discriminant`
    ///
    /// Discriminants without a variant must fail, typically with [`unknown`].
    fn decode_payload(discriminant: u8, input: &[u8]) -> Result<(Self, usize), Error>;
}

pub fn encoded_size<U: TaggedUnion>(value: &U) -> usize {
    1 + value.payload_size()
}

/// Writes the discriminant and payload of `value` at the start of `out`
pub fn encode<U: TaggedUnion>(value: &U, out: &mut [u8]) -> Result<usize, Error> {
    let size = encoded_size(value);
    Error::check_len(size, out.len())?;
    value.validate_payload()?;
    let written = value.encode_payload(&mut out[1..size])?;
    out[0] = value.discriminant();
    Ok(1 + written)
}

/// Reads a discriminant and the payload it selects
pub fn decode<U: TaggedUnion>(input: &[u8]) -> Result<(U, usize), Error> {
    Error::check_len(1, input.len())?;
    let (value, read) = U::decode_payload(input[0], &input[1..]).map_err(|e| e.at_offset(1))?;
    Ok((value, read + 1))
}

/// Decodes a payload of type `T` and wraps it into a variant
pub fn decode_variant<U, T, F>(input: &[u8], variant: F) -> Result<(U, usize), Error>
where
    T: Decode,
    F: FnOnce(T) -> U,
{
    T::decode_from(input).map(|(x, n)| (variant(x), n))
}

/// Error for a discriminant that has no variant in `U`
pub fn unknown<U: TaggedUnion>(found: u8) -> Error {
    tracing::debug!(tagged_union = U::NAME, discriminant = found, "unknown discriminant");
    Error::invalid_discriminant(U::NAME, found)
}

/// Implements [`Encode`](crate::Encode) and [`Decode`](crate::Decode) for a
/// [`TaggedUnion`](crate::TaggedUnion)
#[macro_export]
macro_rules! impl_tagged_union_codec {
    ($t:ty) => {
        impl $crate::Encode for $t {
            fn encoded_size(&self) -> usize {
                $crate::union::encoded_size(self)
            }

            fn validate(&self) -> ::core::result::Result<(), $crate::Error> {
                $crate::TaggedUnion::validate_payload(self)
            }

            fn encode_to(&self, out: &mut [u8]) -> ::core::result::Result<usize, $crate::Error> {
                $crate::union::encode(self, out)
            }
        }

        impl $crate::Decode for $t {
            fn decode_from(
                input: &[u8],
            ) -> ::core::result::Result<(Self, usize), $crate::Error> {
                $crate::union::decode(input)
            }
        }
    };
}
