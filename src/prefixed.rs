// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

//! Options and results
//!
//! Both start with a [`Prefix`]. They differ in when a payload follows it:
//!
//! - [`PrefixMode::Option`]: only after [`Prefix::Set`] (`Some`).
//! - [`PrefixMode::Result`]: always, for success (`0x00`) and failure (`0x01`) alike. A branch
//!   without information uses a zero-sized payload such as `()`.
//!
//! The mode is never inferred from the prefix byte; callers pass it explicitly, or use the
//! [`Option`] and [`Result`] implementations of [`Encode`] and [`Decode`], which pick it.

use crate::{Codec, Decode, Encode, Error, Natural, Prefix};

/// Payload policy of a prefixed value
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PrefixMode {
    /// Payload present only when the prefix is set
    Option,
    /// Payload always present
    Result,
}

impl PrefixMode {
    /// Whether a payload follows `prefix` in this mode
    pub fn carries_payload(self, prefix: Prefix) -> bool {
        match self {
            PrefixMode::Option => prefix == Prefix::Set,
            PrefixMode::Result => true,
        }
    }
}

/// A prefix along with its optional payload
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Prefixed<T> {
    pub prefix: Prefix,
    pub payload: Option<T>,
}

impl<T> Prefixed<T> {
    pub fn none() -> Self {
        Self { prefix: Prefix::Unset, payload: None }
    }

    pub fn some(x: T) -> Self {
        Self { prefix: Prefix::Set, payload: Some(x) }
    }

    pub fn ok(x: T) -> Self {
        Self { prefix: Prefix::Unset, payload: Some(x) }
    }

    pub fn err(x: T) -> Self {
        Self { prefix: Prefix::Set, payload: Some(x) }
    }

    /// Reads the value as an option
    pub fn into_option(self) -> Option<T> {
        match self.prefix {
            Prefix::Set => self.payload,
            Prefix::Unset => None,
        }
    }

    /// Reads the value as a result, or `None` if the payload is missing
    pub fn into_result(self) -> Option<Result<T, T>> {
        let prefix = self.prefix;
        self.payload.map(|x| if prefix.is_ok() { Ok(x) } else { Err(x) })
    }

    pub fn encoded_size_with<C>(&self, codec: &C, mode: PrefixMode) -> usize
    where
        C: Codec<Value = T>,
    {
        encoded_size(codec, self.prefix, self.payload.as_ref(), mode)
    }

    pub fn encode_with<C>(&self, codec: &C, mode: PrefixMode, out: &mut [u8]) -> Result<usize, Error>
    where
        C: Codec<Value = T>,
    {
        encode(codec, self.prefix, self.payload.as_ref(), mode, out)
    }

    pub fn decode_with<C>(codec: &C, mode: PrefixMode, input: &[u8]) -> Result<(Self, usize), Error>
    where
        C: Codec<Value = T>,
    {
        decode(codec, mode, input)
    }
}

impl<T> From<Option<T>> for Prefixed<T> {
    fn from(x: Option<T>) -> Self {
        x.map_or_else(Prefixed::none, Prefixed::some)
    }
}

/// Size of a prefix and payload encoded with `mode`
///
/// A payload that `mode` does not write is not counted, nor is a missing one.
pub fn encoded_size<C: Codec>(
    codec: &C,
    prefix: Prefix,
    payload: Option<&C::Value>,
    mode: PrefixMode,
) -> usize {
    if !mode.carries_payload(prefix) {
        return 1;
    }
    1 + payload.map_or(0, |x| codec.encoded_size(x))
}

/// Writes a prefix followed by its payload when `mode` calls for one
///
/// Fails with [`Error::InvalidValue`] if the payload is required but missing. Nothing is
/// written on failure.
pub fn encode<C: Codec>(
    codec: &C,
    prefix: Prefix,
    payload: Option<&C::Value>,
    mode: PrefixMode,
    out: &mut [u8],
) -> Result<usize, Error> {
    if !mode.carries_payload(prefix) {
        return prefix.encode_to(out);
    }
    let payload = payload.ok_or_else(|| Error::invalid_value("missing payload after prefix"))?;
    encode_after_prefix(codec, prefix, payload, out)
}

fn encode_after_prefix<C: Codec>(
    codec: &C,
    prefix: Prefix,
    payload: &C::Value,
    out: &mut [u8],
) -> Result<usize, Error> {
    let size = 1 + codec.encoded_size(payload);
    Error::check_len(size, out.len())?;
    codec.validate(payload)?;
    let written = codec.encode_to(payload, &mut out[1..size])?;
    out[0] = prefix.byte();
    Ok(1 + written)
}

/// Checks that a prefix and payload can be encoded with `mode`
pub fn validate<C: Codec>(
    codec: &C,
    prefix: Prefix,
    payload: Option<&C::Value>,
    mode: PrefixMode,
) -> Result<(), Error> {
    if !mode.carries_payload(prefix) {
        return Ok(());
    }
    let payload = payload.ok_or_else(|| Error::invalid_value("missing payload after prefix"))?;
    codec.validate(payload)
}

/// Reads a prefix and, when `mode` calls for one, the payload that follows
pub fn decode<C: Codec>(
    codec: &C,
    mode: PrefixMode,
    input: &[u8],
) -> Result<(Prefixed<C::Value>, usize), Error> {
    let (prefix, _) = Prefix::decode_from(input)?;
    if !mode.carries_payload(prefix) {
        return Ok((Prefixed { prefix, payload: None }, 1));
    }
    let (payload, read) = decode_after_prefix(codec, input)?;
    Ok((Prefixed { prefix, payload: Some(payload) }, read))
}

fn decode_after_prefix<C: Codec>(codec: &C, input: &[u8]) -> Result<(C::Value, usize), Error> {
    let (payload, read) = codec.decode_from(&input[1..]).map_err(|e| e.at_offset(1))?;
    Ok((payload, read + 1))
}

/// Codec for options of values encoded by the inner codec
#[derive(Clone, Copy, Debug, Default)]
pub struct OptionCodec<C>(pub C);

impl<C: Codec> Codec for OptionCodec<C> {
    type Value = Option<C::Value>;

    fn encoded_size(&self, value: &Self::Value) -> usize {
        encoded_size(&self.0, Prefix::from_option(value), value.as_ref(), PrefixMode::Option)
    }

    fn validate(&self, value: &Self::Value) -> Result<(), Error> {
        value.as_ref().map_or(Ok(()), |x| self.0.validate(x))
    }

    fn encode_to(&self, value: &Self::Value, out: &mut [u8]) -> Result<usize, Error> {
        encode(&self.0, Prefix::from_option(value), value.as_ref(), PrefixMode::Option, out)
    }

    fn decode_from(&self, input: &[u8]) -> Result<(Self::Value, usize), Error> {
        decode(&self.0, PrefixMode::Option, input).map(|(x, n)| (x.into_option(), n))
    }
}

/// Codec for results whose success and failure payloads have their own codecs
#[derive(Clone, Copy, Debug, Default)]
pub struct ResultCodec<O, E> {
    pub ok: O,
    pub err: E,
}

impl<O: Codec, E: Codec> Codec for ResultCodec<O, E> {
    type Value = Result<O::Value, E::Value>;

    fn fixed_width(&self) -> Option<usize> {
        match (self.ok.fixed_width(), self.err.fixed_width()) {
            (Some(a), Some(b)) if a == b => Some(1 + a),
            _ => None,
        }
    }

    fn encoded_size(&self, value: &Self::Value) -> usize {
        1 + match value {
            Ok(x) => self.ok.encoded_size(x),
            Err(e) => self.err.encoded_size(e),
        }
    }

    fn validate(&self, value: &Self::Value) -> Result<(), Error> {
        match value {
            Ok(x) => self.ok.validate(x),
            Err(e) => self.err.validate(e),
        }
    }

    fn encode_to(&self, value: &Self::Value, out: &mut [u8]) -> Result<usize, Error> {
        match value {
            Ok(x) => encode_after_prefix(&self.ok, Prefix::Unset, x, out),
            Err(e) => encode_after_prefix(&self.err, Prefix::Set, e, out),
        }
    }

    fn decode_from(&self, input: &[u8]) -> Result<(Self::Value, usize), Error> {
        let (prefix, _) = Prefix::decode_from(input)?;
        match prefix {
            Prefix::Unset => decode_after_prefix(&self.ok, input).map(|(x, n)| (Ok(x), n)),
            Prefix::Set => decode_after_prefix(&self.err, input).map(|(e, n)| (Err(e), n)),
        }
    }
}

/// Codec for [`Prefixed`] values with an explicit [`PrefixMode`]
#[derive(Clone, Copy, Debug)]
pub struct PrefixedCodec<C> {
    pub payload: C,
    pub mode: PrefixMode,
}

impl<C: Codec> Codec for PrefixedCodec<C> {
    type Value = Prefixed<C::Value>;

    fn fixed_width(&self) -> Option<usize> {
        match self.mode {
            PrefixMode::Result => self.payload.fixed_width().map(|w| w + 1),
            PrefixMode::Option => None,
        }
    }

    fn encoded_size(&self, value: &Self::Value) -> usize {
        value.encoded_size_with(&self.payload, self.mode)
    }

    fn validate(&self, value: &Self::Value) -> Result<(), Error> {
        validate(&self.payload, value.prefix, value.payload.as_ref(), self.mode)
    }

    fn encode_to(&self, value: &Self::Value, out: &mut [u8]) -> Result<usize, Error> {
        value.encode_with(&self.payload, self.mode, out)
    }

    fn decode_from(&self, input: &[u8]) -> Result<(Self::Value, usize), Error> {
        Prefixed::decode_with(&self.payload, self.mode, input)
    }
}

impl<T: Encode + Decode> Encode for Option<T> {
    fn encoded_size(&self) -> usize {
        OptionCodec(Natural::<T>::new()).encoded_size(self)
    }

    fn validate(&self) -> Result<(), Error> {
        self.as_ref().map_or(Ok(()), T::validate)
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        OptionCodec(Natural::<T>::new()).encode_to(self, out)
    }
}

impl<T: Encode + Decode> Decode for Option<T> {
    fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
        OptionCodec(Natural::<T>::new()).decode_from(input)
    }
}

const fn same_width(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) if a == b => Some(a + 1),
        _ => None,
    }
}

impl<T: Encode + Decode, E: Encode + Decode> Encode for Result<T, E> {
    const FIXED_WIDTH: Option<usize> =
        same_width(<T as Encode>::FIXED_WIDTH, <E as Encode>::FIXED_WIDTH);

    fn encoded_size(&self) -> usize {
        natural_result::<T, E>().encoded_size(self)
    }

    fn validate(&self) -> Result<(), Error> {
        match self {
            Ok(x) => x.validate(),
            Err(e) => e.validate(),
        }
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        natural_result::<T, E>().encode_to(self, out)
    }
}

impl<T: Encode + Decode, E: Encode + Decode> Decode for Result<T, E> {
    const FIXED_WIDTH: Option<usize> =
        same_width(<T as Decode>::FIXED_WIDTH, <E as Decode>::FIXED_WIDTH);

    fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
        natural_result::<T, E>().decode_from(input)
    }
}

fn natural_result<T, E>() -> ResultCodec<Natural<T>, Natural<E>> {
    ResultCodec { ok: Natural::new(), err: Natural::new() }
}

#[cfg(test)]
mod tests {
    use super::{OptionCodec, PrefixMode, Prefixed, PrefixedCodec, ResultCodec};
    use crate::{
        Codec, Compact, Decode, Encode, Error, Natural, Prefix, SeqCodec, Signedness, WideInt,
    };
    use alloc::vec;
    use num_bigint::BigInt;

    #[test]
    fn none_is_a_single_byte() {
        assert_eq!(None::<u32>.encode().unwrap(), [0]);
        assert_eq!(None::<u32>.encoded_size(), 1);
        assert_eq!(Option::<u32>::decode_from(&[0, 9, 9]).unwrap(), (None, 1));
    }

    #[test]
    fn some_carries_its_payload() {
        assert_eq!(Some(3_u16).encode().unwrap(), [1, 3, 0]);
        assert_eq!(Some(3_u16).encoded_size(), 1 + 3_u16.encoded_size());
        assert_eq!(Option::<u16>::decode_from(&[1, 3, 0]).unwrap(), (Some(3), 3));
    }

    #[test]
    fn optional_bool_uses_two_bytes() {
        assert_eq!(Some(false).encode().unwrap(), [1, 0]);
        assert_eq!(Some(true).encode().unwrap(), [1, 1]);
        assert_eq!(
            Option::<bool>::decode_from(&[2]),
            Err(Error::InvalidDiscriminant { expected: "prefix", found: 2 }),
        );
    }

    #[test]
    fn results_always_carry_a_payload() {
        let ok: Result<u8, u8> = Ok(7);
        let err: Result<u8, u8> = Err(7);
        assert_eq!(ok.encode().unwrap(), [0, 7]);
        assert_eq!(err.encode().unwrap(), [1, 7]);
        assert_eq!(ok.encoded_size(), 2);
        assert_eq!(err.encoded_size(), 2);
        assert_eq!(Result::<u8, u8>::decode_from(&[1, 7]).unwrap(), (Err(7), 2));
    }

    #[test]
    fn unit_branch_has_no_payload_bytes() {
        let ok: Result<(), u8> = Ok(());
        assert_eq!(ok.encode().unwrap(), [0]);
        assert_eq!(Result::<(), u8>::decode_from(&[1, 3]).unwrap(), (Err(3), 2));
    }

    #[test]
    fn mode_decides_whether_unset_has_payload() {
        let codec = Natural::<u8>::new();
        let input = [0, 5];
        let (as_option, n) = Prefixed::decode_with(&codec, PrefixMode::Option, &input).unwrap();
        assert_eq!((as_option, n), (Prefixed::none(), 1));
        let (as_result, n) = Prefixed::decode_with(&codec, PrefixMode::Result, &input).unwrap();
        assert_eq!((as_result.clone(), n), (Prefixed::ok(5), 2));
        assert_eq!(as_result.into_result(), Some(Ok(5)));
    }

    #[test]
    fn result_mode_requires_a_payload() {
        let codec = PrefixedCodec { payload: Natural::<u8>::new(), mode: PrefixMode::Result };
        let mut out = [0xaa; 2];
        let missing = Prefixed { prefix: Prefix::Set, payload: None };
        assert!(matches!(codec.encode_to(&missing, &mut out), Err(Error::InvalidValue { .. })));
        assert_eq!(out, [0xaa; 2]);
        assert_eq!(codec.encode_to(&Prefixed::err(4), &mut out), Ok(2));
        assert_eq!(out, [1, 4]);
        assert_eq!(codec.fixed_width(), Some(2));
    }

    #[test]
    fn option_mode_ignores_payload_of_none() {
        let codec = Natural::<u32>::new();
        let none = Prefixed { prefix: Prefix::Unset, payload: Some(9) };
        assert_eq!(none.encoded_size_with(&codec, PrefixMode::Option), 1);
        assert_eq!(none.encoded_size_with(&codec, PrefixMode::Result), 5);
    }

    #[test]
    fn wide_payloads_compose() {
        let codec = OptionCodec(WideInt::i128());
        let value = Some(BigInt::from(-9999999999999999_i64));
        let mut out = vec![0; codec.encoded_size(&value)];
        assert_eq!(codec.encode_to(&value, &mut out), Ok(17));
        assert_eq!(&out[1..], &(-9999999999999999_i128).to_le_bytes()[..]);
        assert_eq!(codec.decode_from(&out).unwrap(), (value, 17));
    }

    #[test]
    fn failing_payload_leaves_buffer_untouched() {
        let codec = ResultCodec { ok: WideInt::new(1, Signedness::Unsigned), err: Natural::<u8>::new() };
        let mut out = [0xaa; 2];
        let value = Ok(BigInt::from(300));
        assert!(matches!(codec.encode_to(&value, &mut out), Err(Error::InvalidValue { .. })));
        assert_eq!(out, [0xaa; 2]);
    }

    #[test]
    fn rejected_payload_inside_option_leaves_buffer_untouched() {
        let codec = OptionCodec(SeqCodec(WideInt::new(1, Signedness::Unsigned)));
        let value = Some(vec![BigInt::from(7), BigInt::from(300)]);
        let mut out = [0xaa; 4];
        assert!(matches!(codec.validate(&value), Err(Error::InvalidValue { .. })));
        assert!(matches!(codec.encode_to(&value, &mut out), Err(Error::InvalidValue { .. })));
        assert_eq!(out, [0xaa; 4]);
    }

    #[test]
    fn compact_payload_errors_point_past_the_prefix() {
        let err = Option::<Compact<u32>>::decode_from(&[1, 0x15]).unwrap_err();
        assert_eq!(err, Error::BufferTooSmall { needed: 3, available: 2 });
    }

    #[test]
    fn error_code_result_roundtrips() {
        let value: Result<u128, u8> = Err(2);
        let bytes = value.encode().unwrap();
        assert_eq!(bytes, [1, 2]);
        assert_eq!(Result::<u128, u8>::decode(&bytes), Ok(Err(2)));
        let value: Result<u128, u8> = Ok(99999999);
        assert_eq!(value.encoded_size(), 17);
    }
}
