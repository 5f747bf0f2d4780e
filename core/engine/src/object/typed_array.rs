//! Component F (part 1): typed arrays over an `ArrayBuffer` byte store.

use super::array_buffer::ArrayBufferData;
use super::byte_order::ByteOrderPod;
use super::JsObject;
use crate::value::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float16,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

impl TypedArrayKind {
    pub fn element_size(self) -> usize {
        match self {
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 | TypedArrayKind::Float16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::Float64 | TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 => 8,
        }
    }

    pub fn constructor_name(self) -> &'static str {
        match self {
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Uint8Clamped => "Uint8ClampedArray",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float16 => "Float16Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
            TypedArrayKind::BigInt64 => "BigInt64Array",
            TypedArrayKind::BigUint64 => "BigUint64Array",
        }
    }

    fn is_bigint(self) -> bool {
        matches!(self, TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64)
    }
}

pub struct TypedArrayData {
    pub buffer: JsObject,
    pub kind: TypedArrayKind,
    pub byte_offset: usize,
    pub length: usize,
}

impl TypedArrayData {
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn byte_length(&self) -> usize {
        self.length * self.kind.element_size()
    }

    fn byte_range(&self, index: u32) -> Option<std::ops::Range<usize>> {
        if index as usize >= self.length {
            return None;
        }
        let size = self.kind.element_size();
        let start = self.byte_offset + index as usize * size;
        Some(start..start + size)
    }
}

pub fn new_typed_array(buffer: JsObject, kind: TypedArrayKind, byte_offset: usize, length: usize, proto: Option<JsObject>) -> JsObject {
    JsObject::from_data(
        proto,
        super::ObjectKind::TypedArray(TypedArrayData {
            buffer,
            kind,
            byte_offset,
            length,
        }),
    )
}

/// Reads element `index`, decoding little-endian bytes and reinterpreting
/// wraparound per the element's native width (§4.F: "writes wrap rather than
/// clamp, except for `Uint8ClampedArray` which always clamps").
pub fn get_index(obj: &JsObject, index: u32) -> JsValue {
    let data_ref = obj.borrow();
    let ta = match &data_ref.kind {
        super::ObjectKind::TypedArray(ta) => ta,
        _ => return JsValue::undefined(),
    };
    let Some(range) = ta.byte_range(index) else {
        return JsValue::undefined();
    };
    let kind = ta.kind;
    let buffer_obj = ta.buffer.clone();
    drop(data_ref);
    let buf_ref = buffer_obj.borrow();
    let bytes: &[u8] = match &buf_ref.kind {
        super::ObjectKind::ArrayBuffer(ArrayBufferData { data }) => &data[range],
        _ => return JsValue::undefined(),
    };
    decode(kind, bytes)
}

fn decode(kind: TypedArrayKind, bytes: &[u8]) -> JsValue {
    match kind {
        TypedArrayKind::Int8 => JsValue::number(bytes[0] as i8 as f64),
        TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => JsValue::number(bytes[0] as f64),
        TypedArrayKind::Int16 => JsValue::number(i16::from_bytes_ordered(bytes, true) as f64),
        TypedArrayKind::Uint16 => JsValue::number(u16::from_bytes_ordered(bytes, true) as f64),
        TypedArrayKind::Int32 => JsValue::number(i32::from_bytes_ordered(bytes, true) as f64),
        TypedArrayKind::Uint32 => JsValue::number(u32::from_bytes_ordered(bytes, true) as f64),
        TypedArrayKind::Float16 => JsValue::number(f16_bits_to_f64(u16::from_bytes_ordered(bytes, true))),
        TypedArrayKind::Float32 => JsValue::number(f32::from_bytes_ordered(bytes, true) as f64),
        TypedArrayKind::Float64 => JsValue::number(f64::from_bytes_ordered(bytes, true)),
        TypedArrayKind::BigInt64 => {
            JsValue::from(crate::bigint::JsBigInt::new(i64::from_bytes_ordered(bytes, true)))
        }
        TypedArrayKind::BigUint64 => {
            JsValue::from(crate::bigint::JsBigInt::new(u64::from_bytes_ordered(bytes, true)))
        }
    }
}

/// Writes element `index`. `Uint8ClampedArray` clamps to `[0, 255]` with
/// round-half-to-even; every other integer kind wraps via two's-complement
/// truncation (`ToInt32`/`ToUint32` semantics at the element width); `NaN`
/// written to a float lane is stored as the canonical NaN bit pattern.
pub fn set_index(
    obj: &JsObject,
    index: u32,
    value: &JsValue,
    context: &mut crate::context::Context,
) -> crate::error::JsResult<()> {
    let (kind, buffer_obj, range) = {
        let data_ref = obj.borrow();
        let ta = match &data_ref.kind {
            super::ObjectKind::TypedArray(ta) => ta,
            _ => return Ok(()),
        };
        let Some(range) = ta.byte_range(index) else {
            return Ok(());
        };
        (ta.kind, ta.buffer.clone(), range)
    };

    let bytes: Vec<u8> = if kind.is_bigint() {
        let big = match value {
            JsValue::BigInt(b) => b.clone(),
            _ => return Err(crate::error::JsNativeError::typ()
                .with_message("cannot convert non-BigInt to BigInt typed array element")
                .into()),
        };
        match kind {
            TypedArrayKind::BigInt64 => big.to_i64_wrapping().to_bytes_ordered(true),
            TypedArrayKind::BigUint64 => big.to_u64_wrapping().to_bytes_ordered(true),
            _ => unreachable!(),
        }
    } else {
        let n = crate::value::to_number(value, context)?;
        encode(kind, n)
    };

    let mut buf_ref = buffer_obj.borrow_mut();
    if let super::ObjectKind::ArrayBuffer(ArrayBufferData { data }) = &mut buf_ref.kind {
        data[range].copy_from_slice(&bytes);
    }
    Ok(())
}

fn encode(kind: TypedArrayKind, n: f64) -> Vec<u8> {
    match kind {
        TypedArrayKind::Int8 => (wrap_i64(n) as i8).to_bytes_ordered(true),
        TypedArrayKind::Uint8 => (wrap_i64(n) as u8).to_bytes_ordered(true),
        TypedArrayKind::Uint8Clamped => clamp_u8(n).to_bytes_ordered(true),
        TypedArrayKind::Int16 => (wrap_i64(n) as i16).to_bytes_ordered(true),
        TypedArrayKind::Uint16 => (wrap_i64(n) as u16).to_bytes_ordered(true),
        TypedArrayKind::Int32 => (wrap_i64(n) as i32).to_bytes_ordered(true),
        TypedArrayKind::Uint32 => (wrap_i64(n) as u32).to_bytes_ordered(true),
        TypedArrayKind::Float16 => f64_to_f16_bits(n).to_bytes_ordered(true),
        TypedArrayKind::Float32 => (n as f32).to_bytes_ordered(true),
        TypedArrayKind::Float64 => n.to_bytes_ordered(true),
        TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 => unreachable!(),
    }
}

fn wrap_i64(n: f64) -> i64 {
    if !n.is_finite() {
        return 0;
    }
    let truncated = n.trunc();
    let modulo = truncated.rem_euclid(4294967296.0);
    modulo as i64
}

/// Decodes an IEEE 754 binary16 (half-precision) bit pattern to `f64`. Rust
/// has no native half-float type, so the sign/exponent/mantissa fields are
/// unpacked by hand rather than widened through `f32`/`f64`'s own decoders.
fn f16_bits_to_f64(bits: u16) -> f64 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = (bits >> 10) & 0x1f;
    let mantissa = u32::from(bits & 0x3ff);
    if exponent == 0 {
        sign * f64::from(mantissa) * 2f64.powi(-24)
    } else if exponent == 0x1f {
        if mantissa == 0 {
            sign * f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        sign * (1.0 + f64::from(mantissa) / 1024.0) * 2f64.powi(i32::from(exponent) - 15)
    }
}

/// The inverse of [`f16_bits_to_f64`]. `65504.0` is the largest finite
/// half-precision magnitude (§4.F); anything larger rounds to signed
/// infinity rather than wrapping, the same way narrowing to `f32`/`f64`
/// already saturates instead of truncating bits.
fn f64_to_f16_bits(n: f64) -> u16 {
    if n.is_nan() {
        return 0x7e00;
    }
    let sign: u16 = if n.is_sign_negative() { 0x8000 } else { 0 };
    let abs = n.abs();
    if abs == 0.0 {
        return sign;
    }
    if abs > 65504.0 {
        return sign | 0x7c00;
    }

    let mut exponent = abs.log2().floor() as i32;
    let mut mantissa_frac = abs / 2f64.powi(exponent) - 1.0;
    if mantissa_frac < 0.0 {
        exponent -= 1;
        mantissa_frac = abs / 2f64.powi(exponent) - 1.0;
    } else if mantissa_frac >= 1.0 {
        exponent += 1;
        mantissa_frac = abs / 2f64.powi(exponent) - 1.0;
    }

    let half_exp = exponent + 15;
    if half_exp <= 0 {
        let smallest_subnormal = 2f64.powi(-24);
        let mantissa10 = (abs / smallest_subnormal).round() as u16;
        return sign | mantissa10.min(0x3ff);
    }

    let mantissa10 = (mantissa_frac * 1024.0).round() as u16;
    if mantissa10 == 1024 {
        let bumped_exp = half_exp + 1;
        if bumped_exp >= 0x1f {
            return sign | 0x7c00;
        }
        return sign | ((bumped_exp as u16) << 10);
    }
    sign | ((half_exp as u16) << 10) | mantissa10
}

/// Round-half-to-even clamp to `[0, 255]`, matching `ToUint8Clamp` (§4.F).
fn clamp_u8(n: f64) -> u8 {
    if n.is_nan() || n <= 0.0 {
        return 0;
    }
    if n >= 255.0 {
        return 255;
    }
    let floor = n.floor();
    let diff = n - floor;
    if diff < 0.5 {
        floor as u8
    } else if diff > 0.5 {
        (floor as u8).saturating_add(1)
    } else if (floor as u64) % 2 == 0 {
        floor as u8
    } else {
        (floor as u8).saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::object::array_buffer::new_array_buffer;

    #[test]
    fn int8_wraps_on_overflow() {
        let mut context = Context::default();
        let buf = new_array_buffer(1, None);
        let ta = new_typed_array(buf, TypedArrayKind::Int8, 0, 1, None);
        set_index(&ta, 0, &JsValue::number(200.0), &mut context).unwrap();
        assert_eq!(get_index(&ta, 0), JsValue::number(-56.0));
    }

    #[test]
    fn float16_saturates_to_infinity_past_max_finite() {
        let mut context = Context::default();
        let buf = new_array_buffer(2, None);
        let ta = new_typed_array(buf, TypedArrayKind::Float16, 0, 1, None);
        set_index(&ta, 0, &JsValue::number(65504.0), &mut context).unwrap();
        assert_eq!(get_index(&ta, 0), JsValue::number(65504.0));

        let buf2 = new_array_buffer(2, None);
        let ta2 = new_typed_array(buf2, TypedArrayKind::Float16, 0, 1, None);
        set_index(&ta2, 0, &JsValue::number(100000.0), &mut context).unwrap();
        assert_eq!(get_index(&ta2, 0).as_number(), Some(f64::INFINITY));

        let buf3 = new_array_buffer(2, None);
        let ta3 = new_typed_array(buf3, TypedArrayKind::Float16, 0, 1, None);
        set_index(&ta3, 0, &JsValue::number(-100000.0), &mut context).unwrap();
        assert_eq!(get_index(&ta3, 0).as_number(), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn big_int64_write_preserves_precision_past_f64_mantissa() {
        let mut context = Context::default();
        let buf = new_array_buffer(8, None);
        let ta = new_typed_array(buf, TypedArrayKind::BigInt64, 0, 1, None);
        let big = crate::bigint::JsBigInt::from_string("9007199254740993").unwrap();
        set_index(&ta, 0, &JsValue::from(big), &mut context).unwrap();
        match get_index(&ta, 0) {
            JsValue::BigInt(b) => assert_eq!(b.to_string_radix(10), "9007199254740993"),
            other => panic!("expected a BigInt, got {other:?}"),
        }
    }

    #[test]
    fn uint8_clamped_saturates() {
        let mut context = Context::default();
        let buf = new_array_buffer(1, None);
        let ta = new_typed_array(buf, TypedArrayKind::Uint8Clamped, 0, 1, None);
        set_index(&ta, 0, &JsValue::number(300.0), &mut context).unwrap();
        assert_eq!(get_index(&ta, 0), JsValue::number(255.0));
        set_index(&ta, 0, &JsValue::number(-10.0), &mut context).unwrap();
        assert_eq!(get_index(&ta, 0), JsValue::number(0.0));
    }
}
