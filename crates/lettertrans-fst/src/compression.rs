// Variable-length integer, string and weight encoding.
//
// Integers are stored as groups of 7 bits, most significant group first.
// Every byte but the last has the high bit set, so a decoder stops exactly at
// the byte the encoder wrote last. Values below 0x80 cost a single byte and
// the full u64 range fits in at most 10 bytes.

use std::io::{Read, Write};

use crate::{LtError, Weight};

/// Continuation bit set on every byte of a VarInt except the last.
const CONTINUATION: u8 = 0x80;

/// Payload bits carried by each VarInt byte.
const PAYLOAD: u8 = 0x7F;

/// Longest encoding of a `u64` (ceil(64 / 7)).
pub const MAX_VARINT_LEN: usize = 10;

/// Number of bytes `write_varint` emits for `value`.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Encode `value` into a fresh byte vector.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let len = encoded_len(value);
    let mut buf = Vec::with_capacity(len);
    for i in (0..len).rev() {
        let group = ((value >> (7 * i)) as u8) & PAYLOAD;
        if i == 0 {
            buf.push(group);
        } else {
            buf.push(group | CONTINUATION);
        }
    }
    buf
}

/// Write `value` as a VarInt.
pub fn write_varint<W: Write + ?Sized>(w: &mut W, value: u64) -> Result<(), LtError> {
    w.write_all(&encode_varint(value))?;
    Ok(())
}

/// Read one VarInt, consuming exactly the bytes that encode it.
pub fn read_varint<R: Read + ?Sized>(r: &mut R) -> Result<u64, LtError> {
    let mut value: u64 = 0;
    for _ in 0..MAX_VARINT_LEN {
        let byte = read_byte(r)?;
        if value >> 57 != 0 {
            return Err(LtError::VarIntOverflow);
        }
        value = (value << 7) | u64::from(byte & PAYLOAD);
        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
    }
    Err(LtError::VarIntOverflow)
}

/// Read a VarInt that must fit in a `u32` (counts, states, codes).
pub fn read_varint_u32<R: Read + ?Sized>(r: &mut R, what: &str) -> Result<u32, LtError> {
    let value = read_varint(r)?;
    u32::try_from(value).map_err(|_| LtError::Corrupt(format!("{what} {value} out of range")))
}

fn read_byte<R: Read + ?Sized>(r: &mut R) -> Result<u8, LtError> {
    let mut byte = [0u8; 1];
    r.read_exact(&mut byte).map_err(|e| LtError::from_read(e, "variable-length integer"))?;
    Ok(byte[0])
}

/// Write a string as a character count followed by one VarInt per code point.
pub fn write_string<W: Write + ?Sized>(w: &mut W, s: &str) -> Result<(), LtError> {
    write_varint(w, s.chars().count() as u64)?;
    for ch in s.chars() {
        write_varint(w, u64::from(u32::from(ch)))?;
    }
    Ok(())
}

/// Read a string written by [`write_string`].
pub fn read_string<R: Read + ?Sized>(r: &mut R) -> Result<String, LtError> {
    let len = read_varint(r)?;
    let mut s = String::new();
    for _ in 0..len {
        s.push(read_char(r)?);
    }
    Ok(s)
}

/// Read a single code point stored as a VarInt.
pub fn read_char<R: Read + ?Sized>(r: &mut R) -> Result<char, LtError> {
    let code = read_varint(r)?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or(LtError::InvalidCodePoint(code))
}

/// Write a weight as 8 little-endian bytes.
pub fn write_weight<W: Write + ?Sized>(w: &mut W, weight: Weight) -> Result<(), LtError> {
    w.write_all(&weight.to_le_bytes())?;
    Ok(())
}

/// Read a weight written by [`write_weight`].
pub fn read_weight<R: Read + ?Sized>(r: &mut R) -> Result<Weight, LtError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(|e| LtError::from_read(e, "weight"))?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a fixed-width little-endian `u64` (the feature flag word).
pub fn read_u64_le<R: Read + ?Sized>(r: &mut R) -> Result<u64, LtError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(|e| LtError::from_read(e, "feature flags"))?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode(bytes: &[u8]) -> Result<u64, LtError> {
        read_varint(&mut Cursor::new(bytes))
    }

    #[test]
    fn single_byte_values() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(1), vec![0x01]);
        assert_eq!(encode_varint(0x7F), vec![0x7F]);
    }

    #[test]
    fn multi_byte_values_are_most_significant_first() {
        assert_eq!(encode_varint(0x80), vec![0x81, 0x00]);
        assert_eq!(encode_varint(300), vec![0x82, 0x2C]);
        assert_eq!(encode_varint(0x3FFF), vec![0xFF, 0x7F]);
        assert_eq!(encode_varint(0x4000), vec![0x81, 0x80, 0x00]);
    }

    #[test]
    fn encoded_len_matches_encoding() {
        for value in [0, 1, 127, 128, 16_383, 16_384, u32::MAX as u64, u64::MAX] {
            assert_eq!(encoded_len(value), encode_varint(value).len(), "value {value}");
        }
        assert_eq!(encoded_len(u64::MAX), MAX_VARINT_LEN);
    }

    #[test]
    fn decode_known_bytes() {
        assert_eq!(decode(&[0x00]).unwrap(), 0);
        assert_eq!(decode(&[0x82, 0x2C]).unwrap(), 300);
        assert_eq!(decode(&encode_varint(u64::MAX)).unwrap(), u64::MAX);
    }

    #[test]
    fn decode_stops_at_value_boundary() {
        let mut data = encode_varint(1000);
        data.extend_from_slice(&encode_varint(5));
        let mut cursor = Cursor::new(data.as_slice());
        assert_eq!(read_varint(&mut cursor).unwrap(), 1000);
        assert_eq!(cursor.position(), 2);
        assert_eq!(read_varint(&mut cursor).unwrap(), 5);
    }

    #[test]
    fn truncated_varint() {
        let err = decode(&[0x81]).unwrap_err();
        assert!(matches!(err, LtError::Truncated(_)));
        let err = decode(&[]).unwrap_err();
        assert!(matches!(err, LtError::Truncated(_)));
    }

    #[test]
    fn overlong_varint_overflows() {
        let err = decode(&[0xFF; 11]).unwrap_err();
        assert!(matches!(err, LtError::VarIntOverflow));
        // 10 bytes whose payload exceeds 64 bits
        let mut data = vec![0xFF; 9];
        data.push(0x7F);
        assert!(matches!(decode(&data).unwrap_err(), LtError::VarIntOverflow));
    }

    #[test]
    fn string_round_trip() {
        let mut buf = Vec::new();
        write_string(&mut buf, "kis\u{00e4}<n>").unwrap();
        let s = read_string(&mut Cursor::new(buf.as_slice())).unwrap();
        assert_eq!(s, "kis\u{00e4}<n>");
    }

    #[test]
    fn reject_surrogate_code_point() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 1).unwrap();
        write_varint(&mut buf, 0xD800).unwrap();
        let err = read_string(&mut Cursor::new(buf.as_slice())).unwrap_err();
        assert!(matches!(err, LtError::InvalidCodePoint(0xD800)));
    }

    #[test]
    fn weight_round_trip() {
        let mut buf = Vec::new();
        write_weight(&mut buf, -1.25).unwrap();
        assert_eq!(buf.len(), 8);
        assert_eq!(read_weight(&mut Cursor::new(buf.as_slice())).unwrap(), -1.25);
    }

    #[test]
    fn truncated_weight() {
        let err = read_weight(&mut Cursor::new(&[0u8; 3][..])).unwrap_err();
        assert!(matches!(err, LtError::Truncated("weight")));
    }
}
