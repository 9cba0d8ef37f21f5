// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

use crate::{compact, Compact, Encode, Error, Prefix, SizeCounter, SliceWriter, Write};
use alloc::vec::Vec;
use core::convert::TryFrom;
use serde::{ser::Impossible, Serialize};

/// Serializes a value using the SCALE encoding
pub fn to_vec<T: Serialize + ?Sized>(x: &T) -> Result<Vec<u8>, Error> {
    let mut serializer = Serializer::new(Vec::new());
    x.serialize(&mut serializer)?;
    Ok(serializer.0)
}

/// Serializes a value at the start of `out` and returns the number of bytes written
///
/// The value is checked before anything is written: on failure, including
/// [`Error::BufferTooSmall`], `out` is left untouched.
pub fn to_slice<T: Serialize + ?Sized>(x: &T, out: &mut [u8]) -> Result<usize, Error> {
    let size = serialized_size(x)?;
    Error::check_len(size, out.len())?;
    let mut serializer = Serializer::new(SliceWriter::new(out));
    x.serialize(&mut serializer)?;
    Ok(serializer.0.position())
}

/// Returns the number of bytes the SCALE encoding of a value takes
pub fn serialized_size<T: Serialize + ?Sized>(x: &T) -> Result<usize, Error> {
    let mut serializer = Serializer::new(SizeCounter::new());
    x.serialize(&mut serializer)?;
    Ok(serializer.0.size())
}

/// Serializer for the SCALE encoding
#[derive(Debug)]
pub struct Serializer<W>(W);

impl<W: Write> Serializer<W> {
    /// Returns a serializer using the given writer
    pub fn new(out: W) -> Self {
        Self(out)
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.0
    }

    fn serialize_len(&mut self, len: usize) -> Result<(), Error> {
        let len = u64::try_from(len)
            .map_err(|_| Error::invalid_value("collection longer than 2^64 elements"))?;
        self.0.write_encoded(&Compact(len))
    }

    fn serialize_discriminant(
        &mut self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<(), Error> {
        let discriminant = u8::try_from(variant_index).map_err(|_| {
            Error::TooManyVariants {
                enum_name: name,
                variant_name: variant,
                variant_index,
            }
        })?;
        self.0.write_encoded(&discriminant)
    }
}

impl<'a, W: Write> serde::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Compound<'a, W>;
    type SerializeTuple = Compound<'a, W>;
    type SerializeTupleStruct = Compound<'a, W>;
    type SerializeTupleVariant = Compound<'a, W>;
    type SerializeMap = Compound<'a, W>;
    type SerializeStruct = Compound<'a, W>;
    type SerializeStructVariant = Compound<'a, W>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&v)
    }

    fn serialize_f32(self, _: f32) -> Result<Self::Ok, Self::Error> {
        Err(Error::FloatingPointUnsupported)
    }

    fn serialize_f64(self, _: f64) -> Result<Self::Ok, Self::Error> {
        Err(Error::FloatingPointUnsupported)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        self.serialize_u32(v as u32)
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        self.serialize_bytes(v.as_bytes())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        self.serialize_len(v.len())?;
        self.0.write(v)
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.0.write_encoded(&Prefix::Unset)
    }

    fn serialize_some<T>(self, v: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.0.write_encoded(&Prefix::Set)?;
        v.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok, Self::Error> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.serialize_discriminant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        if name == compact::SERDE_NAME {
            let n = value.serialize(CompactSerializer)?;
            return self.0.write_encoded(&n);
        }
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.serialize_discriminant(name, variant_index, variant)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        let len = len.ok_or(Error::LengthNeeded)?;
        self.serialize_len(len)?;
        Ok(Compound(self))
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(Compound(self))
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(Compound(self))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.serialize_discriminant(name, variant_index, variant)?;
        Ok(Compound(self))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        let len = len.ok_or(Error::LengthNeeded)?;
        self.serialize_len(len)?;
        Ok(Compound(self))
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(Compound(self))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.serialize_discriminant(name, variant_index, variant)?;
        Ok(Compound(self))
    }
}

mod compound {
    pub struct Compound<'a, W>(pub &'a mut super::Serializer<W>);
}

use compound::Compound;

impl<W: Write> serde::ser::SerializeSeq for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut *self.0)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<W: Write> serde::ser::SerializeTuple for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut *self.0)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<W: Write> serde::ser::SerializeTupleStruct for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut *self.0)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<W: Write> serde::ser::SerializeTupleVariant for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut *self.0)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

// Maps are sequences of key-value pairs.
impl<W: Write> serde::ser::SerializeMap for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        key.serialize(&mut *self.0)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut *self.0)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<W: Write> serde::ser::SerializeStruct for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, _: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut *self.0)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

impl<W: Write> serde::ser::SerializeStructVariant for Compound<'_, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, _: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut *self.0)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(())
    }
}

/// Extracts the integer wrapped by a [`Compact`]
struct CompactSerializer;

type Impossible128 = Impossible<Compact<u128>, Error>;

fn not_compact() -> Error {
    Error::invalid_value("compact value is not an integer")
}

fn from_signed<T>(v: T) -> Result<Compact<u128>, Error>
where
    u128: TryFrom<T>,
{
    u128::try_from(v)
        .map(Compact)
        .map_err(|_| Error::invalid_value("negative compact integer"))
}

impl serde::Serializer for CompactSerializer {
    type Ok = Compact<u128>;
    type Error = Error;
    type SerializeSeq = Impossible128;
    type SerializeTuple = Impossible128;
    type SerializeTupleStruct = Impossible128;
    type SerializeTupleVariant = Impossible128;
    type SerializeMap = Impossible128;
    type SerializeStruct = Impossible128;
    type SerializeStructVariant = Impossible128;

    fn serialize_bool(self, _: bool) -> Result<Self::Ok, Self::Error> {
        Err(not_compact())
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        from_signed(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        from_signed(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        from_signed(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        from_signed(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
        from_signed(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        Ok(Compact(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        Ok(Compact(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        Ok(Compact(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        Ok(Compact(v.into()))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
        Ok(Compact(v))
    }

    fn serialize_f32(self, _: f32) -> Result<Self::Ok, Self::Error> {
        Err(Error::FloatingPointUnsupported)
    }

    fn serialize_f64(self, _: f64) -> Result<Self::Ok, Self::Error> {
        Err(Error::FloatingPointUnsupported)
    }

    fn serialize_char(self, _: char) -> Result<Self::Ok, Self::Error> {
        Err(not_compact())
    }

    fn serialize_str(self, _: &str) -> Result<Self::Ok, Self::Error> {
        Err(not_compact())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<Self::Ok, Self::Error> {
        Err(not_compact())
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(not_compact())
    }

    fn serialize_some<T>(self, _: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(not_compact())
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(not_compact())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(not_compact())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Err(not_compact())
    }

    fn serialize_newtype_struct<T>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        Err(not_compact())
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(not_compact())
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(not_compact())
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(not_compact())
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(not_compact())
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(not_compact())
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(not_compact())
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(not_compact())
    }
}
