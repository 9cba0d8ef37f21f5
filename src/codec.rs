// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

use crate::Error;
use alloc::{vec, vec::Vec};
use core::{fmt, marker::PhantomData};

/// Types that know how to write their SCALE encoding into a buffer
pub trait Encode {
    /// Encoded size shared by every value of the type, if there is one
    const FIXED_WIDTH: Option<usize> = None;

    /// Number of bytes `encode_to` writes for this value
    fn encoded_size(&self) -> usize;

    /// Checks that the value can be encoded, without writing anything
    ///
    /// Types whose values can all be encoded keep the default. Composite types check every
    /// part, so that a failure is known before the first byte is written.
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Writes the encoding at the start of `out` and returns the number of bytes written
    ///
    /// Fails before writing anything if `out` is shorter than [`Encode::encoded_size`] or if
    /// [`Encode::validate`] rejects the value.
    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error>;

    /// Encodes into a new vector
    fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut out = vec![0; self.encoded_size()];
        let written = self.encode_to(&mut out)?;
        out.truncate(written);
        Ok(out)
    }
}

/// Types that can be read back from their SCALE encoding
pub trait Decode: Sized {
    /// Encoded size shared by every value of the type, if there is one
    const FIXED_WIDTH: Option<usize> = None;

    /// Decodes a value from the start of `input` and returns it along with the number of
    /// bytes read
    ///
    /// Trailing bytes are left alone.
    fn decode_from(input: &[u8]) -> Result<(Self, usize), Error>;

    /// Decodes a value from the start of `input`, ignoring trailing bytes
    fn decode(input: &[u8]) -> Result<Self, Error> {
        Self::decode_from(input).map(|(v, _)| v)
    }
}

impl<T: Encode + ?Sized> Encode for &'_ T {
    const FIXED_WIDTH: Option<usize> = T::FIXED_WIDTH;

    fn encoded_size(&self) -> usize {
        (**self).encoded_size()
    }

    fn validate(&self) -> Result<(), Error> {
        (**self).validate()
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        (**self).encode_to(out)
    }
}

/// Codec described by a value rather than by a type
///
/// Some encodings need parameters that the encoded value does not carry, like the byte
/// count of a wide integer. A `Codec` holds them and encodes or decodes `Self::Value`.
/// Option, result and sequence codecs are built on this trait so that they work with any
/// payload encoding.
pub trait Codec {
    type Value;

    /// Encoded size shared by every value, if there is one
    fn fixed_width(&self) -> Option<usize> {
        None
    }

    fn encoded_size(&self, value: &Self::Value) -> usize;

    /// Checks that `value` can be encoded, without writing anything
    fn validate(&self, _value: &Self::Value) -> Result<(), Error> {
        Ok(())
    }

    fn encode_to(&self, value: &Self::Value, out: &mut [u8]) -> Result<usize, Error>;

    fn decode_from(&self, input: &[u8]) -> Result<(Self::Value, usize), Error>;
}

impl<C: Codec + ?Sized> Codec for &'_ C {
    type Value = C::Value;

    fn fixed_width(&self) -> Option<usize> {
        (**self).fixed_width()
    }

    fn encoded_size(&self, value: &Self::Value) -> usize {
        (**self).encoded_size(value)
    }

    fn validate(&self, value: &Self::Value) -> Result<(), Error> {
        (**self).validate(value)
    }

    fn encode_to(&self, value: &Self::Value, out: &mut [u8]) -> Result<usize, Error> {
        (**self).encode_to(value, out)
    }

    fn decode_from(&self, input: &[u8]) -> Result<(Self::Value, usize), Error> {
        (**self).decode_from(input)
    }
}

/// Codec using the type's own [`Encode`] and [`Decode`] implementations
pub struct Natural<T>(PhantomData<fn() -> T>);

impl<T> Natural<T> {
    pub const fn new() -> Self {
        Natural(PhantomData)
    }
}

impl<T> Default for Natural<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Natural<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for Natural<T> {}

impl<T> fmt::Debug for Natural<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Natural")
    }
}

impl<T: Encode + Decode> Codec for Natural<T> {
    type Value = T;

    fn fixed_width(&self) -> Option<usize> {
        <T as Encode>::FIXED_WIDTH
    }

    fn encoded_size(&self, value: &T) -> usize {
        value.encoded_size()
    }

    fn validate(&self, value: &T) -> Result<(), Error> {
        value.validate()
    }

    fn encode_to(&self, value: &T, out: &mut [u8]) -> Result<usize, Error> {
        value.encode_to(out)
    }

    fn decode_from(&self, input: &[u8]) -> Result<(T, usize), Error> {
        T::decode_from(input)
    }
}

impl Encode for () {
    const FIXED_WIDTH: Option<usize> = Some(0);

    fn encoded_size(&self) -> usize {
        0
    }

    fn encode_to(&self, _: &mut [u8]) -> Result<usize, Error> {
        Ok(0)
    }
}

impl Decode for () {
    const FIXED_WIDTH: Option<usize> = Some(0);

    fn decode_from(_: &[u8]) -> Result<((), usize), Error> {
        Ok(((), 0))
    }
}

const fn sum_widths(widths: &[Option<usize>]) -> Option<usize> {
    let mut total = 0;
    let mut i = 0;
    while i < widths.len() {
        match widths[i] {
            Some(w) => total += w,
            None => return None,
        }
        i += 1;
    }
    Some(total)
}

macro_rules! impl_tuple {
    ($($name:ident $idx:tt),+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            const FIXED_WIDTH: Option<usize> =
                sum_widths(&[$(<$name as Encode>::FIXED_WIDTH),+]);

            fn encoded_size(&self) -> usize {
                0 $(+ self.$idx.encoded_size())+
            }

            fn validate(&self) -> Result<(), Error> {
                $(self.$idx.validate()?;)+
                Ok(())
            }

            fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
                Error::check_len(self.encoded_size(), out.len())?;
                self.validate()?;
                let mut written = 0;
                $(written += self.$idx.encode_to(&mut out[written..])?;)+
                Ok(written)
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            const FIXED_WIDTH: Option<usize> =
                sum_widths(&[$(<$name as Decode>::FIXED_WIDTH),+]);

            fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
                let mut read = 0;
                let value = ($({
                    let (v, n) = $name::decode_from(&input[read..])
                        .map_err(|e| e.at_offset(read))?;
                    read += n;
                    v
                },)+);
                Ok((value, read))
            }
        }
    };
}

impl_tuple!(A 0);
impl_tuple!(A 0, B 1);
impl_tuple!(A 0, B 1, C 2);
impl_tuple!(A 0, B 1, C 2, D 3);
impl_tuple!(A 0, B 1, C 2, D 3, E 4);
impl_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
