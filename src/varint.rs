//! LEB128 variable-length integers.
//!
//! Values are split into 7-bit groups, lowest group first. Every byte but the
//! last carries the continuation bit (0x80). Signed values use the
//! two's-complement form: encoding stops once the remaining value can be
//! rebuilt by sign-extending bit 6 of the last group.
//!
//! Integers are arbitrary precision. The `*_u64`/`*_i64` functions are fast
//! paths for values that fit a machine word.

use bytes::BufMut;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};

use crate::error::{CodecError, Result};
use crate::source::Source;

const CONTINUATION: u8 = 0x80;
const GROUP_MASK: u8 = 0x7F;
const SIGN_BIT: u8 = 0x40;

/// Encodes a non-negative integer.
///
/// Fails with [`CodecError::NegativeForUnsigned`] for negative input.
pub fn encode_unsigned(buf: &mut impl BufMut, value: &BigInt) -> Result<()> {
    if value.is_negative() {
        return Err(CodecError::NegativeForUnsigned(value.clone()));
    }
    if let Ok(small) = u64::try_from(value) {
        encode_u64(buf, small);
        return Ok(());
    }
    put_groups(buf, value.magnitude().to_radix_le(0x80));
    Ok(())
}

/// Encodes a signed integer.
pub fn encode_signed(buf: &mut impl BufMut, value: &BigInt) {
    match i64::try_from(value) {
        Ok(small) => encode_i64(buf, small),
        Err(_) => encode_signed_big(buf, value.clone()),
    }
}

pub fn encode_u64(buf: &mut impl BufMut, mut value: u64) {
    loop {
        let group = (value & u64::from(GROUP_MASK)) as u8;
        value >>= 7;
        if value == 0 {
            buf.put_u8(group);
            return;
        }
        buf.put_u8(group | CONTINUATION);
    }
}

pub fn encode_i64(buf: &mut impl BufMut, mut value: i64) {
    loop {
        let group = (value & i64::from(GROUP_MASK)) as u8;
        // Arithmetic shift: negative values converge on -1.
        value >>= 7;
        if is_last_signed_group(value == 0, value == -1, group) {
            buf.put_u8(group);
            return;
        }
        buf.put_u8(group | CONTINUATION);
    }
}

fn encode_signed_big(buf: &mut impl BufMut, mut value: BigInt) {
    let minus_one = -BigInt::one();
    loop {
        // Low byte of the two's-complement form; never empty.
        let low = value.to_signed_bytes_le().first().copied().unwrap_or(0);
        let group = low & GROUP_MASK;
        value >>= 7;
        if is_last_signed_group(value.is_zero(), value == minus_one, group) {
            buf.put_u8(group);
            return;
        }
        buf.put_u8(group | CONTINUATION);
    }
}

fn is_last_signed_group(rest_is_zero: bool, rest_is_minus_one: bool, group: u8) -> bool {
    (rest_is_zero && group & SIGN_BIT == 0) || (rest_is_minus_one && group & SIGN_BIT != 0)
}

fn put_groups(buf: &mut impl BufMut, mut groups: Vec<u8>) {
    if groups.is_empty() {
        groups.push(0);
    }
    let last = groups.len() - 1;
    for (i, group) in groups.into_iter().enumerate() {
        buf.put_u8(if i < last { group | CONTINUATION } else { group });
    }
}

/// Decodes an unsigned integer of any width.
pub fn decode_unsigned(src: &mut (impl Source + ?Sized)) -> Result<BigInt> {
    let groups = read_groups(src)?;
    unsigned_from_groups(&groups).map(BigInt::from)
}

/// Decodes a signed integer of any width.
pub fn decode_signed(src: &mut (impl Source + ?Sized)) -> Result<BigInt> {
    let groups = read_groups(src)?;
    signed_from_groups(&groups)
}

/// Decodes an unsigned integer that must fit in 64 bits.
pub fn decode_u64(src: &mut (impl Source + ?Sized)) -> Result<u64> {
    let groups = read_groups(src)?;
    small_unsigned(&groups)
        .ok_or_else(|| CodecError::InvalidEncoding("unsigned varint exceeds 64 bits".into()))
}

/// Decodes a signed integer that must fit in 64 bits.
pub fn decode_i64(src: &mut (impl Source + ?Sized)) -> Result<i64> {
    match decode_int(src)? {
        Int::Small(v) => Ok(v),
        Int::Big(_) => Err(CodecError::InvalidEncoding(
            "signed varint exceeds 64 bits".into(),
        )),
    }
}

/// A decoded signed integer, narrowed to `i64` whenever it fits.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Int {
    Small(i64),
    Big(BigInt),
}

pub(crate) fn decode_int(src: &mut (impl Source + ?Sized)) -> Result<Int> {
    let groups = read_groups(src)?;
    if let Some(v) = small_signed(&groups) {
        return Ok(Int::Small(v));
    }
    let big = signed_from_groups(&groups)?;
    Ok(match i64::try_from(&big) {
        Ok(v) => Int::Small(v),
        Err(_) => Int::Big(big),
    })
}

/// Reads 7-bit groups up to and including the terminating byte.
fn read_groups(src: &mut (impl Source + ?Sized)) -> Result<Vec<u8>> {
    let mut groups = Vec::new();
    loop {
        let byte = src.take_u8()?;
        groups.push(byte & GROUP_MASK);
        if byte & CONTINUATION == 0 {
            return Ok(groups);
        }
    }
}

fn unsigned_from_groups(groups: &[u8]) -> Result<BigUint> {
    BigUint::from_radix_le(groups, 0x80)
        .ok_or_else(|| CodecError::InvalidEncoding("malformed varint".into()))
}

fn signed_from_groups(groups: &[u8]) -> Result<BigInt> {
    let mut value = BigInt::from(unsigned_from_groups(groups)?);
    if groups.last().is_some_and(|g| g & SIGN_BIT != 0) {
        value -= BigInt::one() << (7 * groups.len());
    }
    Ok(value)
}

fn small_unsigned(groups: &[u8]) -> Option<u64> {
    let mut out = 0u64;
    for (i, &group) in groups.iter().enumerate() {
        if group == 0 {
            continue;
        }
        let shift = 7 * i;
        let group = u64::from(group);
        if shift >= 64 || (group << shift) >> shift != group {
            return None;
        }
        out |= group << shift;
    }
    Some(out)
}

fn small_signed(groups: &[u8]) -> Option<i64> {
    // Nine groups carry 63 bits, which sign-extend safely into an i64.
    if groups.len() > 9 {
        return None;
    }
    let mut out = 0i64;
    let mut shift = 0;
    for &group in groups {
        out |= i64::from(group) << shift;
        shift += 7;
    }
    if groups.last().is_some_and(|g| g & SIGN_BIT != 0) {
        out |= -1i64 << shift;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_bytes(v: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_i64(&mut buf, v);
        buf
    }

    fn unsigned_bytes(v: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_u64(&mut buf, v);
        buf
    }

    #[test]
    fn unsigned_known_vectors() {
        assert_eq!(unsigned_bytes(0), [0x00]);
        assert_eq!(unsigned_bytes(2), [0x02]);
        assert_eq!(unsigned_bytes(127), [0x7F]);
        assert_eq!(unsigned_bytes(128), [0x80, 0x01]);
        assert_eq!(unsigned_bytes(300), [0xAC, 0x02]);
        assert_eq!(unsigned_bytes(624_485), [0xE5, 0x8E, 0x26]);
    }

    #[test]
    fn signed_known_vectors() {
        assert_eq!(signed_bytes(0), [0x00]);
        assert_eq!(signed_bytes(42), [0x2A]);
        assert_eq!(signed_bytes(63), [0x3F]);
        assert_eq!(signed_bytes(64), [0xC0, 0x00]);
        assert_eq!(signed_bytes(-1), [0x7F]);
        assert_eq!(signed_bytes(-64), [0x40]);
        assert_eq!(signed_bytes(-65), [0xBF, 0x7F]);
        assert_eq!(signed_bytes(-128), [0x80, 0x7F]);
        assert_eq!(signed_bytes(-123_456), [0xC0, 0xBB, 0x78]);
    }

    #[test]
    fn unsigned_round_trip() {
        for v in [0, 1, 127, 128, 16_383, 16_384, u64::from(u32::MAX), u64::MAX - 1, u64::MAX] {
            let bytes = unsigned_bytes(v);
            assert_eq!(decode_u64(&mut &bytes[..]).unwrap(), v, "failed for {v}");
            assert_eq!(
                decode_unsigned(&mut &bytes[..]).unwrap(),
                BigInt::from(v),
                "failed for {v}"
            );
        }
    }

    #[test]
    fn signed_round_trip() {
        for v in [
            0,
            1,
            -1,
            63,
            64,
            -64,
            -65,
            8191,
            -8192,
            i64::from(i32::MIN),
            i64::from(i32::MAX),
            i64::MIN,
            i64::MAX,
        ] {
            let bytes = signed_bytes(v);
            assert_eq!(decode_i64(&mut &bytes[..]).unwrap(), v, "failed for {v}");
            assert_eq!(
                decode_signed(&mut &bytes[..]).unwrap(),
                BigInt::from(v),
                "failed for {v}"
            );
        }
    }

    #[test]
    fn big_path_matches_word_path() {
        for v in [0, 1, -1, 64, -65, 1 << 40, -(1 << 40), i64::MIN, i64::MAX] {
            let mut big = Vec::new();
            encode_signed_big(&mut big, BigInt::from(v));
            assert_eq!(big, signed_bytes(v), "failed for {v}");
        }
    }

    #[test]
    fn big_integers_round_trip() {
        let values = [
            BigInt::from(u64::MAX) + 1u32,
            BigInt::from(i64::MIN) - 1u32,
            BigInt::from(i128::MAX),
            BigInt::from(i128::MIN),
            BigInt::one() << 200u32,
            -(BigInt::one() << 200u32),
        ];
        for v in &values {
            let mut buf = Vec::new();
            encode_signed(&mut buf, v);
            assert_eq!(&decode_signed(&mut &buf[..]).unwrap(), v, "failed for {v}");
        }

        let v = BigInt::one() << 64u32;
        let mut buf = Vec::new();
        encode_unsigned(&mut buf, &v).unwrap();
        assert_eq!(buf.len(), 10);
        assert_eq!(decode_unsigned(&mut &buf[..]).unwrap(), v);
    }

    #[test]
    fn negative_unsigned_rejected() {
        let mut buf = Vec::new();
        let err = encode_unsigned(&mut buf, &BigInt::from(-1)).unwrap_err();
        assert!(matches!(err, CodecError::NegativeForUnsigned(v) if v == BigInt::from(-1)));
        assert!(buf.is_empty());
    }

    #[test]
    fn truncated_varint_is_eof() {
        assert!(matches!(
            decode_u64(&mut &[0x80u8][..]),
            Err(CodecError::UnexpectedEof)
        ));
        assert!(matches!(
            decode_signed(&mut &[0xFFu8, 0xFF][..]),
            Err(CodecError::UnexpectedEof)
        ));
        assert!(matches!(
            decode_u64(&mut &[0u8; 0][..]),
            Err(CodecError::UnexpectedEof)
        ));
    }

    #[test]
    fn oversized_u64_is_invalid() {
        let mut buf = Vec::new();
        encode_unsigned(&mut buf, &(BigInt::one() << 64u32)).unwrap();
        assert!(matches!(
            decode_u64(&mut &buf[..]),
            Err(CodecError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn oversized_i64_is_invalid() {
        let mut buf = Vec::new();
        encode_signed(&mut buf, &(BigInt::from(i64::MAX) + 1u32));
        assert!(matches!(
            decode_i64(&mut &buf[..]),
            Err(CodecError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn decode_int_narrows() {
        let mut buf = Vec::new();
        encode_i64(&mut buf, i64::MIN);
        assert_eq!(decode_int(&mut &buf[..]).unwrap(), Int::Small(i64::MIN));

        let big = BigInt::from(i64::MAX) + 1u32;
        buf.clear();
        encode_signed(&mut buf, &big);
        assert_eq!(decode_int(&mut &buf[..]).unwrap(), Int::Big(big));
    }

    #[test]
    fn decoding_stops_at_terminator() {
        let data = [0xAC, 0x02, 0x05];
        let mut src = &data[..];
        assert_eq!(decode_u64(&mut src).unwrap(), 300);
        assert_eq!(src, &[0x05]);
    }
}
