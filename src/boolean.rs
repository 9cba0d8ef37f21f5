// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

use crate::{Decode, Encode, Error};

impl Encode for bool {
    const FIXED_WIDTH: Option<usize> = Some(1);

    fn encoded_size(&self) -> usize {
        1
    }

    fn encode_to(&self, out: &mut [u8]) -> Result<usize, Error> {
        Error::check_len(1, out.len())?;
        out[0] = *self as u8;
        Ok(1)
    }
}

impl Decode for bool {
    const FIXED_WIDTH: Option<usize> = Some(1);

    fn decode_from(input: &[u8]) -> Result<(Self, usize), Error> {
        Error::check_len(1, input.len())?;
        match input[0] {
            0 => Ok((false, 1)),
            1 => Ok((true, 1)),
            found => Err(Error::invalid_discriminant("bool", found)),
        }
    }
}
