// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

//! Sequences
//!
//! A sequence is its element count as a [`Compact`] integer followed by the concatenated
//! encodings of its elements. Decoding reads exactly as many elements as the prefix says,
//! whatever follows them.

use crate::{compact::compact_len, Codec, Compact, Decode, Encode, Error};
use alloc::{
    string::String,
    vec::Vec,
};
use core::convert::TryFrom;

fn len_to_compact(len: usize) -> Result<Compact<u64>, Error> {
    u64::try_from(len)
        .map(Compact)
        .map_err(|_| Error::invalid_value("sequence longer than 2^64 elements"))
}

fn len_size(len: usize) -> usize {
    compact_len(len as u64)
}

/// Writes a sequence length prefix
pub fn encode_len(len: usize, out: &mut [u8]) -> Result<usize, Error> {
    len_to_compact(len)?.encode_to(out)
}

/// Reads a sequence length prefix and returns the length and the prefix size
pub fn decode_len(input: &[u8]) -> Result<(usize, usize), Error> {
    let (Compact(len), read) = Compact::<u64>::decode_from(input)?;
    let len = usize::try_from(len)
        .map_err(|_| Error::invalid_value("sequence length does not fit in memory"))?;
    Ok((len, read))
}

/// Checks that `len` elements can follow a length prefix ending at `pos`
///
/// Every element is counted as taking at least one byte, which bounds the work done for a
/// length read from untrusted input. Elements that take no bytes at all cannot be bounded
/// by the input and fail with [`Error::MalformedInput`] when they outnumber it.
pub(crate) fn check_count(
    len: usize,
    pos: usize,
    input_len: usize,
    fixed_width: Option<usize>,
) -> Result<(), Error> {
    if len <= input_len.saturating_sub(pos) {
        return Ok(());
    }
    match fixed_width {
        Some(0) => Err(Error::MalformedInput { offset: pos }),
        _ => Err(Error::BufferTooSmall {
            needed: pos.saturating_add(len),
            available: input_len,
        }),
    }
}

fn encoded_size_of<T, S>(items: &[T], fixed_width: Option<usize>, size: S) -> usize
where
    S: Fn(&T) -> usize,
{
    let body = match fixed_width {
        Some(w) => items.len() * w,
        None => items.iter().map(size).sum(),
    };
    len_size(items.len()) + body
}

fn validate_items<T, V>(items: &[T], validate: V) -> Result<(), Error>
where
    V: Fn(&T) -> Result<(), Error>,
{
    len_to_compact(items.len())?;
    items.iter().try_for_each(validate)
}

fn encode_items<T, V, F>(
    items: &[T],
    total: usize,
    out: &mut [u8],
    validate: V,
    encode: F,
) -> Result<usize, Error>
where
    V: Fn(&T) -> Result<(), Error>,
    F: Fn(&T, &mut [u8]) -> Result<usize, Error>,
{
    Error::check_len(total, out.len())?;
    validate_items(items, validate)?;
    let out = &mut out[..total];
    let mut pos = encode_len(items.len(), out)?;
    for x in items {
        pos += encode(x, &mut out[pos..])?;
    }
    Ok(pos)
}

fn decode_items<T, F>(
    input: &[u8],
    fixed_width: Option<usize>,
    decode: F,
) -> Result<(Vec<T>, usize), Error>
where
    F: Fn(&[u8]) -> Result<(T, usize), Error>,
{
    let (len, mut pos) = decode_len(input)?;
    if let Some(w) = fixed_width {
        let needed = len
            .checked_mul(w)
            .and_then(|body| body.checked_add(pos))
            .unwrap_or(usize::max_value());
        Error::check_len(needed, input.len())?;
    }
    check_count(len, pos, input.len(), fixed_width)?;
    let mut items = Vec::with_capacity(len.min(input.len() - pos));
    for _ in 0..len {
        let (x, read) = decode(&input[pos..]).map_err(|e| e.at_offset(pos))?;
        items.push(x);
        pos += read;
    }
    Ok((items, pos))
}

/// Size of a sequence of values encoded by `codec`
pub fn encoded_size_with<C: Codec>(codec: &C, items: &[C::Value]) -> usize {
    encoded_size_of(items, codec.fixed_width(), |x| codec.encoded_size(x))
}

/// Writes a sequence of values encoded by `codec`
pub fn encode_with<C: Codec>(codec: &C, items: &[C::Value], out: &mut [u8]) -> Result<usize, Error> {
    let total = encoded_size_with(codec, items);
    encode_items(items, total, out, |x| codec.validate(x), |x, out| codec.encode_to(x, out))
}

/// Checks that a sequence of values can be encoded by `codec`
pub fn validate_with<C: Codec>(codec: &C, items: &[C::Value]) -> Result<(), Error> {
    validate_items(items, |x| codec.validate(x))
}

/// Reads a sequence of values encoded by `codec`
pub fn decode_with<C: Codec>(codec: &C, input: &[u8]) -> Result<(Vec<C::Value>, usize), Error> {
    decode_items(input, codec.fixed_width(), |input| codec.decode_from(input))
}

/// Writes a byte sequence with a single copy
pub fn encode_bytes(bytes: &[u8], out: &mut [u8]) -> Result<usize, Error> {
    let prefix = len_to_compact(bytes.len())?;
    let total = prefix.encoded_size() + bytes.len();
    Error::check_len(total, out.len())?;
    let pos = prefix.encode_to(out)?;
    out[pos..total].copy_from_slice(bytes);
    Ok(total)
}

/// Reads a byte sequence without copying it
pub fn decode_bytes(input: &[u8]) -> Result<(&[u8], usize), Error> {
    let (len, pos) = decode_len(input)?;
    let total = pos.checked_add(len).unwrap_or(usize::max_value());
    Error::check_len(total, input.len())?;
    Ok((&input[pos..total], total))
}

/// Codec for sequences of values encoded by the inner codec
#[derive(Clone, Copy, Debug, Default)]
pub struct SeqCodec<C>(pub C);

impl<C: Codec> Codec for SeqCodec<C> {
    type Value = Vec<C::Value>;

    fn encoded_size(&self, value: &Self::Value) -> usize {
        encoded_size_with(&self.0, value)
    }

    fn validate(&self, value: &Self::Value) -> Result<(), Error> {
        validate_with(&self.0, value)
    }

    fn encode_to(&self, value: &Self::Value, out: &mut [u8]) -> Result<usize, Error> {
        encode_with(&self.0, value, out)
    }

    fn decode_from(&self, input: &[u8]) -> Result<(Self::Value, usize), Error> {
        decode_with(&self.0, input)
    }
}

/// Elements are written one by one, `u8` included. Byte slices known as such go through
/// [`encode_bytes`] and [`decode_bytes`], which copy them in one operation and produce the
/// same bytes.
impl<T: Encode> Encode for [T] {
    fn encoded_size(&self) -> usize {
        encoded_size_of(self, T::FIXED_WIDTH, T::encoded_size)
    }

    fn validate(&self) -> Result<(), Error> {
        validate_items(self, T::validate)
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        encode_items(self, self.encoded_size(), out, T::validate, T::encode_to)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encoded_size(&self) -> usize {
        self.as_slice().encoded_size()
    }

    fn validate(&self) -> Result<(), Error> {
        self.as_slice().validate()
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        self.as_slice().encode_to(out)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
        decode_items(input, T::FIXED_WIDTH, T::decode_from)
    }
}

impl Encode for str {
    fn encoded_size(&self) -> usize {
        len_size(self.len()) + self.len()
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        encode_bytes(self.as_bytes(), out)
    }
}

impl Encode for String {
    fn encoded_size(&self) -> usize {
        self.as_str().encoded_size()
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        self.as_str().encode_to(out)
    }
}

impl Decode for String {
    fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
        let (bytes, read) = decode_bytes(input)?;
        let s = core::str::from_utf8(bytes).map_err(Error::InvalidUnicode)?;
        Ok((String::from(s), read))
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_bytes, decode_len, decode_with, encode_bytes, encode_with, SeqCodec};
    use crate::{
        Codec, Compact, Decode, Encode, Error, Natural, OptionCodec, Signedness, WideInt,
    };
    use num_bigint::BigUint;
    use alloc::{string::String, vec, vec::Vec};
    use num_bigint::BigInt;

    #[test]
    fn six_u64_values() {
        let values: Vec<u64> = (0..6).collect();
        let bytes = values.encode().unwrap();
        let mut expected = vec![0x18];
        for i in 0..6_u64 {
            expected.extend_from_slice(&i.to_le_bytes());
        }
        assert_eq!(bytes, expected);
        assert_eq!(bytes.len(), 49);
        assert_eq!(Vec::<u64>::decode_from(&bytes).unwrap(), (values, 49));
    }

    #[test]
    fn length_prefix_bounds_decoding() {
        let mut bytes = vec![1_u16, 2].encode().unwrap();
        bytes.extend_from_slice(&[3, 0, 4, 0]);
        assert_eq!(Vec::<u16>::decode_from(&bytes).unwrap(), (vec![1, 2], 5));
    }

    #[test]
    fn missing_elements_are_reported_up_front() {
        // Claims 3 u32 values but holds only one.
        let bytes = [0x0c, 1, 0, 0, 0];
        assert_eq!(
            Vec::<u32>::decode_from(&bytes),
            Err(Error::BufferTooSmall { needed: 13, available: 5 }),
        );
    }

    #[test]
    fn huge_length_does_not_allocate() {
        let bytes = [0x13, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(Vec::<u64>::decode_from(&bytes), Err(Error::BufferTooSmall { .. })));
        assert!(matches!(Vec::<Option<u8>>::decode_from(&bytes), Err(Error::BufferTooSmall { .. })));
    }

    #[test]
    fn variable_width_elements() {
        let values = vec![Some(1_u8), None, Some(3)];
        let bytes = values.encode().unwrap();
        assert_eq!(bytes, [0x0c, 1, 1, 0, 1, 3]);
        assert_eq!(Vec::<Option<u8>>::decode_from(&bytes).unwrap(), (values, 6));
    }

    #[test]
    fn nested_sequences() {
        let values = vec![vec![Compact(1_u32)], vec![], vec![Compact(69), Compact(0)]];
        let bytes = values.encode().unwrap();
        assert_eq!(bytes, [0x0c, 0x04, 0x04, 0x00, 0x08, 0x15, 0x01, 0x00]);
        assert_eq!(Vec::<Vec<Compact<u32>>>::decode(&bytes).unwrap(), values);
    }

    #[test]
    fn element_errors_point_into_the_whole_buffer() {
        let bytes = [0x08, 2, 0];
        assert_eq!(
            Vec::<Option<u8>>::decode_from(&bytes),
            Err(Error::InvalidDiscriminant { expected: "prefix", found: 2 }),
        );
        let bytes = [0x08, 1, 7, 1];
        assert_eq!(
            Vec::<Option<u8>>::decode_from(&bytes),
            Err(Error::BufferTooSmall { needed: 5, available: 4 }),
        );
    }

    #[test]
    fn output_is_checked_before_writing() {
        let mut out = [0xaa; 4];
        let err = vec![1_u16, 2].encode_to(&mut out).unwrap_err();
        assert_eq!(err, Error::BufferTooSmall { needed: 5, available: 4 });
        assert_eq!(out, [0xaa; 4]);
    }

    #[test]
    fn wide_integer_sequences() {
        let codec = WideInt::i128();
        let values = vec![BigInt::from(-1), BigInt::from(2)];
        let mut out = vec![0; 33];
        assert_eq!(encode_with(&codec, &values, &mut out), Ok(33));
        assert_eq!(out[0], 0x08);
        assert!(out[1..17].iter().all(|&b| b == 0xff));
        assert_eq!(out[17], 2);
        assert_eq!(decode_with(&codec, &out).unwrap(), (values, 33));
    }

    #[test]
    fn sequence_of_optional_wide_integers() {
        let codec = SeqCodec(OptionCodec(WideInt::u128()));
        let values = vec![None, Some(BigInt::from(5))];
        let mut out = vec![0; codec.encoded_size(&values)];
        assert_eq!(codec.encode_to(&values, &mut out), Ok(19));
        assert_eq!(codec.decode_from(&out).unwrap(), (values, 19));
    }

    #[test]
    fn bytes_are_borrowed() {
        let input = [0x0c, 7, 8, 9, 10];
        let (bytes, read) = decode_bytes(&input).unwrap();
        assert_eq!(bytes, [7, 8, 9]);
        assert_eq!(read, 4);
        let mut out = [0; 4];
        assert_eq!(encode_bytes(bytes, &mut out), Ok(4));
        assert_eq!(out, input[..4]);
        assert_eq!(decode_bytes(&[0x0c, 7]), Err(Error::BufferTooSmall { needed: 4, available: 2 }));
    }

    #[test]
    fn length_prefix_alone() {
        assert_eq!(decode_len(&[0x15, 0x01]), Ok((69, 2)));
        let natural = Natural::<u8>::new();
        assert_eq!(decode_with(&natural, &[0x00, 0xff]).unwrap(), (vec![], 1));
    }

    #[test]
    fn strings_are_utf8_bytes() {
        let s = String::from("thisDataIsNice");
        let bytes = s.encode().unwrap();
        assert_eq!(bytes[0], 14 << 2);
        assert_eq!(&bytes[1..], s.as_bytes());
        assert_eq!(String::decode(&bytes).unwrap(), s);
        assert!(matches!(String::decode(&[0x04, 0xff]), Err(Error::InvalidUnicode(_))));
    }

    #[test]
    fn rejected_element_leaves_output_untouched() {
        let codec = WideInt::new(1, Signedness::Unsigned);
        let mut out = [0xaa; 3];
        let values = [BigInt::from(7), BigInt::from(300)];
        assert!(matches!(encode_with(&codec, &values, &mut out), Err(Error::InvalidValue { .. })));
        assert_eq!(out, [0xaa; 3]);

        let values = vec![Compact(BigUint::from(1_u8)), Compact(BigUint::from(1_u8) << 544)];
        let mut out = vec![0xaa; values.encoded_size()];
        assert!(matches!(values.encode_to(&mut out), Err(Error::InvalidValue { .. })));
        assert!(out.iter().all(|&b| b == 0xaa));
    }

    #[test]
    fn zero_width_elements_are_bounded_by_input() {
        let bytes = [0x03, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(Vec::<()>::decode_from(&bytes), Err(Error::MalformedInput { offset: 5 }));
        let codec = WideInt::new(0, Signedness::Unsigned);
        let bytes = Compact(1_u32 << 24).encode().unwrap();
        assert_eq!(decode_with(&codec, &bytes), Err(Error::MalformedInput { offset: 4 }));
        assert_eq!(Vec::<()>::decode_from(&[0x08, 0xaa, 0xbb]).unwrap(), (vec![(), ()], 1));
    }

    #[test]
    fn counts_beyond_input_fail_before_decoding() {
        assert_eq!(
            Vec::<Option<u8>>::decode_from(&[0x0c, 0, 0]),
            Err(Error::BufferTooSmall { needed: 4, available: 3 }),
        );
    }

    #[test]
    fn byte_vectors_match_bulk_copy() {
        let bytes = vec![0xde_u8, 0xad, 0xbe, 0xef];
        let mut bulk = [0; 5];
        assert_eq!(encode_bytes(&bytes, &mut bulk), Ok(5));
        assert_eq!(bytes.encode().unwrap(), bulk);
        assert_eq!(Vec::<u8>::decode(&bulk).unwrap(), decode_bytes(&bulk).unwrap().0);
    }
}
