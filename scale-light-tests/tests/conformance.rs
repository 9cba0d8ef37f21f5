// Copyright (C) 2020 Stephane Raux. Distributed under the zlib license.

use parity_scale_codec::Encode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    error::Error,
    fmt::Debug,
};

fn roundtrips<T>(v: &T) -> Result<(), Box<dyn Error>>
where
    T: Debug + Serialize + DeserializeOwned + PartialEq,
{
    let bytes = scale_light::to_vec(v)?;
    let (rebuilt, read) = scale_light::from_slice_with_len::<T>(&bytes)?;
    if read != bytes.len() {
        let msg = format!("Deserialization read {} bytes out of {}", read, bytes.len());
        return Err(msg.into());
    }
    if *v == rebuilt {
        Ok(())
    } else {
        let msg = format!(
            "Values before and after serialization differ.\n\
            Before: {:?}\n\
            After: {:?}",
            v,
            rebuilt,
        );
        Err(msg.into())
    }
}

fn same_as_codec<T, U>(v: &T, codec_v: &U) -> Result<(), Box<dyn Error>>
where
    T: Debug + Serialize,
    U: Encode,
{
    let out = scale_light::to_vec(v)?;
    let codec_out = codec_v.encode();
    if out != codec_out {
        let msg = format!(
            "Serialization result differs from the reference implementation.\n\
            scale-light: {:?}\n\
            parity-scale-codec: {:?}",
            out,
            codec_out,
        );
        return Err(msg.into());
    }
    let size = scale_light::serialized_size(v)?;
    if size != out.len() {
        let msg = format!("Serialized size {} but {} bytes written", size, out.len());
        return Err(msg.into());
    }
    Ok(())
}

struct TestInfo<T, U> {
    value: T,
    codec_value: U,
}

impl<T, U> TestInfo<T, U> {
    fn new(value: T, codec_value: U) -> Self {
        Self { value, codec_value }
    }
}

impl<T: Clone> From<T> for TestInfo<T, T> {
    fn from(x: T) -> Self {
        TestInfo {
            value: x.clone(),
            codec_value: x,
        }
    }
}

trait Test {
    fn run<T, U, I>(&self, info: I) -> Result<(), Box<dyn Error>>
    where
        I: Into<TestInfo<T, U>>,
        T: Debug + Serialize + DeserializeOwned + PartialEq,
        U: Encode;

    fn run_with<T, U>(&self, value: T, codec_value: U) -> Result<(), Box<dyn Error>>
    where
        T: Debug + Serialize + DeserializeOwned + PartialEq,
        U: Encode,
    {
        self.run(TestInfo::new(value, codec_value))
    }
}

struct Roundtrips;

impl Test for Roundtrips {
    fn run<T, U, I>(&self, info: I) -> Result<(), Box<dyn Error>>
    where
        I: Into<TestInfo<T, U>>,
        T: Debug + Serialize + DeserializeOwned + PartialEq,
        U: Encode,
    {
        let info = info.into();
        roundtrips(&info.value).map_err(|e| {
            format!("{:?} did not roundtrip:\n{}", info.value, e).into()
        })
    }
}

struct SameAsCodec;

impl Test for SameAsCodec {
    fn run<T, U, I>(&self, info: I) -> Result<(), Box<dyn Error>>
    where
        I: Into<TestInfo<T, U>>,
        T: Debug + Serialize + DeserializeOwned + PartialEq,
        U: Encode,
    {
        let info = info.into();
        same_as_codec(&info.value, &info.codec_value).map_err(|e| {
            format!(
                "{:?} serialized differently from reference implementation:\n{}", info.value, e,
            ).into()
        })
    }
}

fn compact<T: Copy>(x: T) -> (scale_light::Compact<T>, parity_scale_codec::Compact<T>) {
    (scale_light::Compact(x), parity_scale_codec::Compact(x))
}

fn apply_test<T: Test>(test: T) {
    let compact_values = [
        0_u64,
        1,
        0x3f,
        0x40,
        0x3fff,
        0x4000,
        0x3fff_ffff,
        0x4000_0000,
        0xffff_ffff,
        1 << 32,
        1 << 48,
        u64::max_value(),
    ];
    let mut results = vec![
        test.run(i8::min_value()),
        test.run(1_i8),
        test.run(i8::max_value()),
        test.run(i16::min_value()),
        test.run(1_i16),
        test.run(i16::max_value()),
        test.run(i32::min_value()),
        test.run(1_i32),
        test.run(i32::max_value()),
        test.run(i64::min_value()),
        test.run(1_i64),
        test.run(i64::max_value()),
        test.run(i128::min_value()),
        test.run(-99999543232999_i128),
        test.run(i128::max_value()),
        test.run(u8::min_value()),
        test.run(1_u8),
        test.run(u8::max_value()),
        test.run(u16::min_value()),
        test.run(1_u16),
        test.run(u16::max_value()),
        test.run(u32::min_value()),
        test.run(1_u32),
        test.run(u32::max_value()),
        test.run(u64::min_value()),
        test.run(1_u64),
        test.run(u64::max_value()),
        test.run(u128::max_value()),
        test.run(false),
        test.run(true),
        test.run(None::<i32>),
        test.run(Some(3_i32)),
        test.run(None::<bool>),
        test.run(Some(false)),
        test.run(Some(true)),
        test.run(Some(Some(1_u8))),
        test.run(Ok::<i32, String>(3)),
        test.run(Err::<String, i32>(3)),
        test.run(Ok::<(), u8>(())),
        test.run(vec![1, 2, 3]),
        test.run((0..6).collect::<Vec<u64>>()),
        test.run(vec![Some(1_u16), None]),
        test.run(vec![vec![1_u8], vec![], vec![2, 3]]),
        test.run(String::from("foo")),
        test.run(String::from("thisDataIsNice")),
        test.run((3, String::from("foo"))),
        test.run(vec![(1_u8, 10_u32), (2, 20)].into_iter().collect::<BTreeMap<_, _>>()),
        test.run(Operator { name: "+".into(), priority: 2 }),
        test.run(Expression::Const(3)),
        test.run(Expression::Op(
            Box::new(Expression::Const(2)),
            Operator { name: "+".into(), priority: 2 },
            Box::new(Expression::Const(3)),
        )),
        test.run(Extrinsic::Transfer { dest: 7, value: 1 << 40 }),
        test.run(Extrinsic::Remark(vec![0xde, 0xad])),
        test.run(Extrinsic::Halt),
    ];
    for &x in compact_values.iter() {
        let (ours, theirs) = compact(x);
        results.push(test.run_with(ours, theirs));
    }
    let (ours, theirs) = compact(u128::max_value());
    results.push(test.run_with(ours, theirs));
    let (ours, theirs) = compact(70_u8);
    results.push(test.run_with(ours, theirs));
    let error_msg = results
        .into_iter()
        .flat_map(|r| r.err())
        .map(|e| format!("\n{}\n", e))
        .collect::<String>();
    assert!(error_msg.is_empty(), "{}", error_msg);
}

#[test]
fn data_set_roundtrips() {
    apply_test(Roundtrips);
}

#[test]
fn results_match_codec() {
    apply_test(SameAsCodec);
}

#[derive(Clone, Debug, Deserialize, Encode, PartialEq, Serialize)]
struct Operator {
    name: String,
    priority: u8,
}

#[derive(Clone, Debug, Deserialize, Encode, PartialEq, Serialize)]
enum Expression {
    Const(i32),
    Op(Box<Expression>, Operator, Box<Expression>),
}

#[derive(Clone, Debug, Deserialize, Encode, PartialEq, Serialize)]
enum Extrinsic {
    Transfer {
        dest: u8,
        #[codec(compact)]
        #[serde(with = "compact_u128")]
        value: u128,
    },
    Remark(Vec<u8>),
    Halt,
}

mod compact_u128 {
    use scale_light::Compact;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(x: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        Compact(*x).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        Compact::<u128>::deserialize(deserializer).map(Compact::into_inner)
    }
}
