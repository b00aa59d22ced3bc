//! Low-level binary parsing helpers for BIFF8 records.
//!
//! All multi-byte integers in BIFF8 are little-endian. Two families of helpers
//! live here: cursor reads (`read_*`) that bounds-check and advance an offset,
//! and positional accessors (`get_*`/`put_*`) for patching fields in place,
//! where the caller guarantees the buffer is large enough.

use crate::error::{XlsError, XlsResult};

const SIGN_BIT: u32 = 0x8000_0000;

fn short_read(offset: usize, need: usize) -> XlsError {
    XlsError::Parse(format!(
        "unexpected end of data at offset {}, need {} bytes",
        offset, need
    ))
}

/// Read a `u8` from a byte slice at `offset`, advancing `offset`.
#[inline]
pub fn read_u8(data: &[u8], offset: &mut usize) -> XlsResult<u8> {
    let v = *data.get(*offset).ok_or_else(|| short_read(*offset, 1))?;
    *offset += 1;
    Ok(v)
}

/// Read a `u16` (little-endian) from a byte slice at `offset`, advancing `offset`.
#[inline]
pub fn read_u16(data: &[u8], offset: &mut usize) -> XlsResult<u16> {
    if *offset + 2 > data.len() {
        return Err(short_read(*offset, 2));
    }
    let v = get_u16(data, *offset);
    *offset += 2;
    Ok(v)
}

/// Read a `u32` (little-endian) from a byte slice at `offset`, advancing `offset`.
#[inline]
pub fn read_u32(data: &[u8], offset: &mut usize) -> XlsResult<u32> {
    if *offset + 4 > data.len() {
        return Err(short_read(*offset, 4));
    }
    let v = get_u32(data, *offset);
    *offset += 4;
    Ok(v)
}

/// Read an `i16` (little-endian).
#[inline]
pub fn read_i16(data: &[u8], offset: &mut usize) -> XlsResult<i16> {
    read_u16(data, offset).map(|v| v as i16)
}

/// Read an `i32` (little-endian).
#[inline]
pub fn read_i32(data: &[u8], offset: &mut usize) -> XlsResult<i32> {
    read_u32(data, offset).map(|v| v as i32)
}

/// Read an `f64` (IEEE 754 double, little-endian) from a byte slice.
#[inline]
pub fn read_f64(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    if *offset + 8 > data.len() {
        return Err(short_read(*offset, 8));
    }
    let v = read_ieee754_double(data, *offset);
    *offset += 8;
    Ok(v)
}

/// Unsigned little-endian `u16` at `pos`.
#[inline]
pub fn get_u16(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([bytes[pos], bytes[pos + 1]])
}

/// Unsigned little-endian `u32` at `pos`.
#[inline]
pub fn get_u32(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

/// Store `value` little-endian at `pos`.
#[inline]
pub fn put_u16(value: u16, buf: &mut [u8], pos: usize) {
    buf[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
}

/// Store `value` little-endian at `pos`.
#[inline]
pub fn put_u32(value: u32, buf: &mut [u8], pos: usize) {
    buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
}

/// Reassemble a double stored as two little-endian 32-bit halves.
///
/// The sign is taken off the high half before the 63-bit magnitude is put
/// together, then reapplied.
pub fn read_ieee754_double(bytes: &[u8], pos: usize) -> f64 {
    let low = get_u32(bytes, pos) as u64;
    let high = get_u32(bytes, pos + 4);
    let negative = high & SIGN_BIT != 0;
    let magnitude = (((high & !SIGN_BIT) as u64) << 32) | low;
    let bits = if negative {
        magnitude | (1u64 << 63)
    } else {
        magnitude
    };
    f64::from_bits(bits)
}

/// Inverse of [`read_ieee754_double`].
pub fn put_ieee754_double(value: f64, buf: &mut [u8], pos: usize) {
    let bits = value.to_bits();
    put_u32(bits as u32, buf, pos);
    put_u32((bits >> 32) as u32, buf, pos + 4);
}

/// Decode an RK-encoded number.
///
/// RK encoding (4 bytes):
/// - Bit 0: if 1, the decoded number should be divided by 100
/// - Bit 1: if 1, value is an integer (bits 2..31 as signed 30-bit int)
///           if 0, value is an IEEE 754 double (bits 2..31 are the upper 30 bits,
///           lower 34 bits of the double are zero)
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let div100 = (rk & 0x01) != 0;
    let is_integer = (rk & 0x02) != 0;

    let value = if is_integer {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if div100 {
        value / 100.0
    } else {
        value
    }
}

/// Encode a number as RK when that is lossless.
///
/// Tries, in order: the truncated double, the truncated double of `value * 100`,
/// a 30-bit integer, a 30-bit integer of `value * 100`.
pub fn encode_rk(value: f64) -> Option<u32> {
    let bits = value.to_bits();
    if bits & 0x0000_0003_FFFF_FFFF == 0 {
        return Some((bits >> 32) as u32);
    }

    let scaled = value * 100.0;
    let scaled_bits = scaled.to_bits();
    if scaled_bits & 0x0000_0003_FFFF_FFFF == 0 && decode_rk((scaled_bits >> 32) as u32 | 1) == value
    {
        return Some((scaled_bits >> 32) as u32 | 0x01);
    }

    const MIN: f64 = -(1i64 << 29) as f64;
    const MAX: f64 = ((1i64 << 29) - 1) as f64;
    if value.fract() == 0.0 && (MIN..=MAX).contains(&value) {
        return Some(((value as i32) << 2) as u32 | 0x02);
    }
    if scaled.fract() == 0.0 && (MIN..=MAX).contains(&scaled) {
        let rk = ((scaled as i32) << 2) as u32 | 0x03;
        if decode_rk(rk) == value {
            return Some(rk);
        }
    }
    None
}

/// Read an RK value from 4 bytes at `offset`.
#[inline]
pub fn read_rk(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    let raw = read_u32(data, offset)?;
    Ok(decode_rk(raw))
}
