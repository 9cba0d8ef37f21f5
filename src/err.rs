// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

use alloc::string::{String, ToString};
use core::fmt::{self, Display};

/// Encoding and decoding errors
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The buffer holds fewer bytes than the operation requires
    ///
    /// Encoders report this before writing anything.
    BufferTooSmall {
        needed: usize,
        available: usize,
    },
    /// The value is outside the domain the encoding can represent
    InvalidValue {
        reason: &'static str,
    },
    /// A discriminant byte is not one of the values defined for `expected`
    InvalidDiscriminant {
        expected: &'static str,
        found: u8,
    },
    /// A decoding loop stopped making progress at `offset`
    MalformedInput {
        offset: usize,
    },
    /// SCALE does not specify how to serialize floating point values
    FloatingPointUnsupported,
    /// SCALE limits enums to 256 variants
    TooManyVariants {
        enum_name: &'static str,
        variant_name: &'static str,
        variant_index: u32,
    },
    /// SCALE requires knowing the length of collections
    LengthNeeded,
    /// SCALE requires knowing the type of the data being deserialized
    TypeMustBeKnown,
    /// Invalid character found. Characters must be UTF-32 code points.
    InvalidCharacter {
        found: u32,
    },
    /// Invalid Unicode was found in a string
    InvalidUnicode(core::str::Utf8Error),
    /// Other error the serializer or deserializer might encounter
    Other(String),
}

impl Error {
    pub(crate) fn invalid_value(reason: &'static str) -> Self {
        Error::InvalidValue { reason }
    }

    pub(crate) fn invalid_discriminant(expected: &'static str, found: u8) -> Self {
        Error::InvalidDiscriminant { expected, found }
    }

    /// Returns `Ok` if `available` bytes are enough to hold `needed` bytes
    pub(crate) fn check_len(needed: usize, available: usize) -> Result<(), Self> {
        if available < needed {
            Err(Error::BufferTooSmall { needed, available })
        } else {
            Ok(())
        }
    }

    /// Shifts the offset carried by positional errors
    ///
    /// Used when an error produced for a sub-slice is reported for the enclosing buffer.
    pub(crate) fn at_offset(self, base: usize) -> Self {
        match self {
            Error::BufferTooSmall { needed, available } => Error::BufferTooSmall {
                needed: needed.saturating_add(base),
                available: available.saturating_add(base),
            },
            Error::MalformedInput { offset } => Error::MalformedInput {
                offset: offset.saturating_add(base),
            },
            e => e,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferTooSmall { needed, available } => {
                write!(f, "Buffer too small: {} bytes needed but {} available", needed,
                    available)
            }
            Error::InvalidValue { reason } => write!(f, "Invalid value: {}", reason),
            Error::InvalidDiscriminant { expected, found } => {
                write!(f, "Invalid discriminant {} for {}", found, expected)
            }
            Error::MalformedInput { offset } => {
                write!(f, "Malformed input: no progress at offset {}", offset)
            }
            Error::FloatingPointUnsupported => {
                write!(f, "Floating point values are not supported by the SCALE encoding")
            }
            Error::TooManyVariants { enum_name, variant_name, variant_index } => {
                write!(f, "Variant {}::{} has index {} but the SCALE encoding limits enumerations \
                    to 256 variants", enum_name, variant_name, variant_index)
            }
            Error::LengthNeeded => {
                write!(f, "Sequence length unknown but the SCALE encoding requires to know it")
            }
            Error::TypeMustBeKnown => {
                write!(f, "Type unknown but the SCALE encoding requires to know it")
            }
            Error::InvalidCharacter { found } => {
                write!(f, "{} is an invalid UTF-32 codepoint", found)
            }
            Error::InvalidUnicode(e) => {
                write!(f, "Invalid Unicode in string: {}", e)
            }
            Error::Other(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidUnicode(e) => Some(e),
            Error::BufferTooSmall { .. }
            | Error::InvalidValue { .. }
            | Error::InvalidDiscriminant { .. }
            | Error::MalformedInput { .. }
            | Error::FloatingPointUnsupported
            | Error::TooManyVariants { .. }
            | Error::LengthNeeded
            | Error::TypeMustBeKnown
            | Error::InvalidCharacter { .. }
            | Error::Other(_) => None,
        }
    }
}

#[cfg(not(feature = "std"))]
impl serde::ser::StdError for Error {}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Other(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        serde::ser::Error::custom(msg)
    }
}
