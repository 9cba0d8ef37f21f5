// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

//! # Overview
//! - [⚖ zlib license](https://opensource.org/licenses/Zlib)
//!
//! Encoder and decoder for the [SCALE encoding](https://docs.substrate.io/reference/scale-codec/)
//! ("Simple Concatenated Aggregate Little-Endian").
//!
//! Two interfaces share one set of wire rules:
//!
//! - [`Encode`] and [`Decode`] write into and read from byte slices, reporting the number of
//!   bytes used. [`Codec`] does the same for encodings that need parameters, like
//!   [`WideInt`] for arbitrary-precision integers of a given byte width.
//! - [`Serializer`] and [`Deserializer`] plug the encoding into [`serde`](https://docs.rs/serde).
//!
//! # Example
//! ```rust
//! use scale_light::{Compact, Decode, Encode};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Deserialize, PartialEq, Serialize)]
//! struct Transfer {
//!     dest: u8,
//!     amount: Compact<u64>,
//!     memo: Option<String>,
//! }
//!
//! let transfer = Transfer { dest: 3, amount: Compact(69), memo: None };
//! let bytes = scale_light::to_vec(&transfer).unwrap();
//! assert_eq!(bytes, [3, 0x15, 0x01, 0]);
//! assert_eq!(scale_light::from_slice::<Transfer>(&bytes).unwrap(), transfer);
//!
//! let values = vec![Some(1u32), None];
//! let bytes = values.encode().unwrap();
//! assert_eq!(bytes, [0x08, 1, 1, 0, 0, 0, 0]);
//! assert_eq!(Vec::<Option<u32>>::decode(&bytes).unwrap(), values);
//! ```
//!
//! # Conformance
//! - `Option<bool>` takes two bytes like any other option.
//! - Booleans and option/result prefixes only accept `0x00` and `0x01`.
//! - Compact integers in non-canonical form (e.g. a small value in a wider mode) are
//!   accepted when decoding.
//! - A collection length larger than the number of bytes left to read is rejected before
//!   any element is decoded, including for elements that take no bytes such as `()`.
//! - Encoders check every value before writing, so a failed encoding leaves the output
//!   buffer as it was.
//!
//! # Features
//! `no_std` is supported by disabling default features. The `alloc` crate is required.
//!
//! - `std`: Support for `std`. It is enabled by default.
//!
//! # Logging
//! Decoding failures that drop information are reported at debug and trace levels through
//! [`tracing`](https://docs.rs/tracing). No subscriber is installed.
//!
//! # Test
//! Conformance tests against `parity-scale-codec` live in the `scale-light-tests` crate (part
//! of the workspace) in order to avoid dependencies enabling `serde` features.
//!
//! ```sh
//! cargo test --workspace
//! ```
//!
//! # Contribute
//! All contributions shall be licensed under the [zlib license](https://opensource.org/licenses/Zlib).
//!
//! # Related projects
//! [parity-scale-codec](https://crates.io/crates/parity-scale-codec): Reference Rust implementation

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod batch;
mod boolean;
mod codec;
pub mod compact;
mod de;
mod err;
pub mod fixed;
mod prefix;
pub mod prefixed;
mod read;
pub mod seq;
mod ser;
pub mod union;
mod write;

pub use batch::{decode_into, decode_to_end, PartialDecode};
pub use codec::{Codec, Decode, Encode, Natural};
pub use compact::{Compact, CompactMode, CompactUnsigned};
pub use de::{from_slice, from_slice_with_len, Deserializer};
pub use err::Error;
pub use fixed::{Signedness, WideInt};
pub use prefix::Prefix;
pub use prefixed::{OptionCodec, PrefixMode, Prefixed, PrefixedCodec, ResultCodec};
pub use read::Reader;
pub use seq::SeqCodec;
pub use ser::{serialized_size, to_slice, to_vec, Serializer};
pub use union::TaggedUnion;
pub use write::{SizeCounter, SliceWriter, Write};
