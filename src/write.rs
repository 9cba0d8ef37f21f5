// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

use crate::{Encode, Error};
use alloc::vec::Vec;

/// Largest encoding written through the stack by [`Write::write_encoded`]
const INLINE_SIZE: usize = 32;

/// Interface to write bytes
pub trait Write {
    /// Writes bytes
    ///
    /// Implementations must either write all of `data` or fail without writing anything.
    fn write(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Writes the SCALE encoding of `value`
    fn write_encoded<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let size = value.encoded_size();
        if size <= INLINE_SIZE {
            let mut buf = [0; INLINE_SIZE];
            let written = value.encode_to(&mut buf)?;
            self.write(&buf[..written])
        } else {
            self.write(&value.encode()?)
        }
    }
}

impl<W: Write + ?Sized> Write for &'_ mut W {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        (**self).write(data)
    }
}

impl Write for Vec<u8> {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.extend_from_slice(data);
        Ok(())
    }
}

/// Writer filling a caller-provided buffer
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the written part of the buffer
    pub fn into_written(self) -> &'a mut [u8] {
        &mut self.buf[..self.pos]
    }
}

impl Write for SliceWriter<'_> {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        let end = self.pos.saturating_add(data.len());
        Error::check_len(end, self.buf.len())?;
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }
}

/// Writer discarding its input and counting bytes
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SizeCounter(usize);

impl SizeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.0
    }
}

impl Write for SizeCounter {
    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.0 += data.len();
        Ok(())
    }

    fn write_encoded<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        value.validate()?;
        self.0 += value.encoded_size();
        Ok(())
    }
}
