// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

use crate::{Decode, Encode, Error};

/// One-byte discriminant shared by options and results
///
/// `0x00` means absent for an option and success for a result, `0x01` means present or
/// failure. No other byte is a valid prefix.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Prefix {
    Unset = 0,
    Set = 1,
}

impl Prefix {
    pub fn from_option<T>(x: &Option<T>) -> Self {
        if x.is_some() { Prefix::Set } else { Prefix::Unset }
    }

    pub fn from_result<T, E>(x: &Result<T, E>) -> Self {
        if x.is_ok() { Prefix::Unset } else { Prefix::Set }
    }

    pub fn is_none(self) -> bool {
        self == Prefix::Unset
    }

    pub fn is_ok(self) -> bool {
        self == Prefix::Unset
    }

    pub fn byte(self) -> u8 {
        self as u8
    }
}

impl From<bool> for Prefix {
    fn from(set: bool) -> Self {
        if set { Prefix::Set } else { Prefix::Unset }
    }
}

impl Encode for Prefix {
    const FIXED_WIDTH: Option<usize> = Some(1);

    fn encoded_size(&self) -> usize {
        1
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        Error::check_len(1, out.len())?;
        out[0] = self.byte();
        Ok(1)
    }
}

impl Decode for Prefix {
    const FIXED_WIDTH: Option<usize> = Some(1);

    fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
        Error::check_len(1, input.len())?;
        match input[0] {
            0 => Ok((Prefix::Unset, 1)),
            1 => Ok((Prefix::Set, 1)),
            found => Err(Error::invalid_discriminant("prefix", found)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Prefix;
    use crate::{Decode, Encode, Error};

    #[test]
    fn prefix_bytes() {
        assert_eq!(Prefix::Unset.encode().unwrap(), [0]);
        assert_eq!(Prefix::Set.encode().unwrap(), [1]);
        assert_eq!(Prefix::from_option(&Some(3)), Prefix::Set);
        assert_eq!(Prefix::from_result::<(), u8>(&Err(1)), Prefix::Set);
        assert!(Prefix::from(false).is_none());
    }

    #[test]
    fn only_zero_and_one_decode() {
        assert_eq!(Prefix::decode_from(&[1, 7]).unwrap(), (Prefix::Set, 1));
        assert_eq!(
            Prefix::decode_from(&[2]),
            Err(Error::InvalidDiscriminant { expected: "prefix", found: 2 }),
        );
    }

    #[test]
    fn flag_without_payload() {
        // A "has docs" style flag is a prefix on its own.
        let (has_docs, read) = Prefix::decode_from(&[0x00, 0x2a]).unwrap();
        assert!(has_docs.is_none());
        assert_eq!(read, 1);
    }
}
