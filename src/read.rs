// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

use crate::{seq, Codec, Decode, Error};

/// Cursor over a byte slice
///
/// Errors report positions and sizes relative to the start of the whole slice, not to the
/// cursor.
#[derive(Clone, Copy, Debug)]
pub struct Reader<'de> {
    input: &'de [u8],
    pos: usize,
}

impl<'de> Reader<'de> {
    pub fn new(input: &'de [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> &'de [u8] {
        &self.input[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.input.len()
    }

    /// Consumes exactly `n` bytes
    pub fn take(&mut self, n: usize) -> Result<&'de [u8], Error> {
        let end = self.pos.checked_add(n).unwrap_or(usize::max_value());
        Error::check_len(end, self.input.len())?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Decodes a value of type `T`
    pub fn decode<T: Decode>(&mut self) -> Result<T, Error> {
        self.advance(T::decode_from)
    }

    /// Decodes a value with the given codec
    pub fn decode_with<C: Codec>(&mut self, codec: &C) -> Result<C::Value, Error> {
        self.advance(|input| codec.decode_from(input))
    }

    /// Decodes a sequence length prefix
    pub fn decode_len(&mut self) -> Result<usize, Error> {
        self.advance(seq::decode_len)
    }

    /// Decodes a length-prefixed byte sequence without copying it
    pub fn decode_bytes(&mut self) -> Result<&'de [u8], Error> {
        let input: &'de [u8] = self.input;
        let pos = self.pos;
        let (bytes, read) = seq::decode_bytes(&input[pos..]).map_err(|e| e.at_offset(pos))?;
        self.pos += read;
        Ok(bytes)
    }

    fn advance<T, F>(&mut self, decode: F) -> Result<T, Error>
    where
        F: FnOnce(&'de [u8]) -> Result<(T, usize), Error>,
    {
        let input: &'de [u8] = self.input;
        let pos = self.pos;
        let (value, read) = decode(&input[pos..]).map_err(|e| e.at_offset(pos))?;
        self.pos += read;
        Ok(value)
    }
}
