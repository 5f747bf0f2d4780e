//! `ToBoolean`, `ToNumber`, `ToPrimitive`, `ToString`, and friends (§4.A).

use super::JsValue;
use crate::context::Context;
use crate::error::{JsNativeError, JsResult};
use crate::object::JsObject;
use crate::property::PropertyKey;
use crate::string::JsString;

/// The hint `ToPrimitive` is called with; `Default` is used by `+`/`==` and
/// tries `valueOf` before `toString` just like `Number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    Number,
    String,
}

/// Either a finite/NaN/infinite integer or one of the two infinities,
/// the result of `ToIntegerOrInfinity` — needed by array-index clamping
/// (`slice`, `splice`, `at`, ...) where `-Infinity` and `Infinity` are
/// meaningfully different from any finite integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerOrInfinity {
    Integer(i64),
    PositiveInfinity,
    NegativeInfinity,
}

impl IntegerOrInfinity {
    /// Clamps into `[0, len]`, resolving negative offsets relative to `len`
    /// the way `Array.prototype.slice`'s `RelativeIndex` does.
    pub fn clamp_relative(self, len: usize) -> usize {
        match self {
            IntegerOrInfinity::NegativeInfinity => 0,
            IntegerOrInfinity::PositiveInfinity => len,
            IntegerOrInfinity::Integer(i) => {
                if i < 0 {
                    (len as i64 + i).max(0) as usize
                } else {
                    (i as u64).min(len as u64) as usize
                }
            }
        }
    }
}

/// `ToBoolean` (§4.A): the only values that don't want the whole value to
/// be `true`.
pub fn to_boolean(value: &JsValue) -> bool {
    match value {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
        JsValue::String(s) => !s.is_empty(),
        JsValue::BigInt(b) => !b.is_zero(),
        JsValue::Symbol(_) | JsValue::Object(_) => true,
    }
}

/// Numeric value produced by `ToNumeric`: either a `Number` or a `BigInt`,
/// used by operators that accept both but must not silently mix them.
#[derive(Debug, Clone)]
pub enum Numeric {
    Number(f64),
    BigInt(crate::bigint::JsBigInt),
}

/// `ToNumber` (§4.A). BigInt inputs are a `TypeError`; objects go through
/// `ToPrimitive(v, "number")` first.
pub fn to_number(value: &JsValue, context: &mut Context) -> JsResult<f64> {
    match value {
        JsValue::Undefined => Ok(f64::NAN),
        JsValue::Null => Ok(0.0),
        JsValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        JsValue::Number(n) => Ok(*n),
        JsValue::String(s) => Ok(string_to_number(s)),
        JsValue::BigInt(_) => Err(JsNativeError::typ()
            .with_message("cannot convert a BigInt value to a number")
            .into()),
        JsValue::Symbol(_) => Err(JsNativeError::typ()
            .with_message("cannot convert a Symbol value to a number")
            .into()),
        JsValue::Object(_) => {
            let primitive = to_primitive(value, PreferredType::Number, context)?;
            if primitive.is_object() {
                return Err(JsNativeError::typ()
                    .with_message("ToPrimitive returned an object")
                    .into());
            }
            to_number(&primitive, context)
        }
    }
}

/// `ToNumeric`: like `ToNumber` but passes `BigInt` through unchanged
/// instead of throwing.
pub fn to_numeric(value: &JsValue, context: &mut Context) -> JsResult<Numeric> {
    match value {
        JsValue::BigInt(b) => Ok(Numeric::BigInt(b.clone())),
        JsValue::Object(_) => {
            let primitive = to_primitive(value, PreferredType::Number, context)?;
            to_numeric(&primitive, context)
        }
        other => to_number(other, context).map(Numeric::Number),
    }
}

/// Parses a JS numeric-string literal: decimal, `0x`/`0b`/`0o` radix
/// literals after trimming ASCII whitespace, else `NaN`. Per the resolved
/// open question in SPEC_FULL §9, legacy (ES5-and-earlier) bare `0`-prefix
/// octal is deliberately *not* recognized.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(|c: char| c.is_whitespace());
    if s.is_empty() {
        return 0.0;
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(rest, 16).map_or(f64::NAN, |n| n as f64);
    }
    if let Some(rest) = s.strip_prefix("0b").or_else(|| s.strip_prefix("0B")) {
        return u64::from_str_radix(rest, 2).map_or(f64::NAN, |n| n as f64);
    }
    if let Some(rest) = s.strip_prefix("0o").or_else(|| s.strip_prefix("0O")) {
        return u64::from_str_radix(rest, 8).map_or(f64::NAN, |n| n as f64);
    }
    match s {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => fast_float2::parse::<f64, _>(s).unwrap_or(f64::NAN),
    }
}

/// `ToPrimitive(v, hint)` (§4.A): primitives pass through; objects dispatch
/// through `Symbol.toPrimitive`, then `valueOf`, then `toString` (order
/// depends on `hint`), walking the full prototype chain for each lookup.
pub fn to_primitive(
    value: &JsValue,
    hint: PreferredType,
    context: &mut Context,
) -> JsResult<JsValue> {
    let JsValue::Object(obj) = value else {
        return Ok(value.clone());
    };

    let exotic_key = PropertyKey::Symbol(context.well_known_symbols().to_primitive.clone());
    let exotic = crate::object::internal_methods::get(obj, &exotic_key, value, context)?;
    if let Some(callable) = exotic.as_callable() {
        let hint_str = match hint {
            PreferredType::Default => "default",
            PreferredType::Number => "number",
            PreferredType::String => "string",
        };
        let result = context.call(
            &exotic,
            value,
            &[JsValue::string(JsString::from(hint_str))],
        )?;
        let _ = callable;
        if result.is_object() {
            return Err(JsNativeError::typ()
                .with_message("Symbol.toPrimitive returned an object")
                .into());
        }
        return Ok(result);
    }

    let method_order: [&str; 2] = match hint {
        PreferredType::String => ["toString", "valueOf"],
        PreferredType::Number | PreferredType::Default => ["valueOf", "toString"],
    };

    for method_name in method_order {
        let method = crate::object::internal_methods::get(obj, &PropertyKey::from_str(method_name), value, context)?;
        if let Some(_callable) = method.as_callable() {
            let result = context.call(&method, value, &[])?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }

    Err(JsNativeError::typ()
        .with_message("cannot convert object to primitive value")
        .into())
}

/// `ToString` (§4.A).
pub fn to_string(value: &JsValue, context: &mut Context) -> JsResult<JsString> {
    match value {
        JsValue::String(s) => Ok(s.clone()),
        JsValue::Undefined => Ok("undefined".into()),
        JsValue::Null => Ok("null".into()),
        JsValue::Boolean(b) => Ok(if *b { "true".into() } else { "false".into() }),
        JsValue::Number(n) => Ok(format_number(*n).into()),
        JsValue::BigInt(b) => Ok(b.to_string_radix(10).into()),
        JsValue::Symbol(_) => Err(JsNativeError::typ()
            .with_message("cannot convert a Symbol value to a string")
            .into()),
        JsValue::Object(_) => {
            let primitive = to_primitive(value, PreferredType::String, context)?;
            if primitive.is_object() {
                return Err(JsNativeError::typ()
                    .with_message("ToPrimitive returned an object")
                    .into());
            }
            to_string(&primitive, context)
        }
    }
}

/// Formats a number the way `Number.prototype.toString()` does: integral
/// safe integers never show a decimal point, `NaN`/`Infinity` spell
/// themselves out, everything else gets the shortest round-tripping
/// decimal via `ryu_js` (the crate this codebase's `Number` builtin already
/// reaches for instead of hand-rolling Grisu/Ryu).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    if n == 0.0 {
        return "0".into();
    }
    if n.fract() == 0.0 && n.abs() < 2f64.powi(53) {
        return format!("{n:.0}");
    }
    ryu_js::Buffer::new().format(n).to_string()
}

/// `ToObject`: wraps primitives in their corresponding wrapper object kind;
/// `undefined`/`null` are a `TypeError`, matching every "this object is
/// null or undefined" restriction elsewhere in the spec.
pub fn to_object(value: &JsValue, context: &mut Context) -> JsResult<JsObject> {
    match value {
        JsValue::Object(o) => Ok(o.clone()),
        JsValue::Undefined | JsValue::Null => Err(JsNativeError::typ()
            .with_message("cannot convert undefined or null to object")
            .into()),
        JsValue::Boolean(b) => Ok(context.intrinsics().new_boolean_wrapper(*b)),
        JsValue::Number(n) => Ok(context.intrinsics().new_number_wrapper(*n)),
        JsValue::String(s) => Ok(context.intrinsics().new_string_wrapper(s.clone())),
        JsValue::BigInt(b) => Ok(context.intrinsics().new_bigint_wrapper(b.clone())),
        JsValue::Symbol(s) => Ok(context.intrinsics().new_symbol_wrapper(s.clone())),
    }
}

/// `ToLength`: `ToIntegerOrInfinity` clamped into `[0, 2^53 - 1]`. Used to
/// read `length` on array-likes for the generic array methods (§4.E).
pub fn to_length(value: &JsValue, context: &mut Context) -> JsResult<u64> {
    let int = to_integer_or_infinity(value, context)?;
    Ok(match int {
        IntegerOrInfinity::NegativeInfinity => 0,
        IntegerOrInfinity::PositiveInfinity => (1u64 << 53) - 1,
        IntegerOrInfinity::Integer(i) => i.clamp(0, (1i64 << 53) - 1) as u64,
    })
}

pub fn to_integer_or_infinity(
    value: &JsValue,
    context: &mut Context,
) -> JsResult<IntegerOrInfinity> {
    let n = to_number(value, context)?;
    if n.is_nan() || n == 0.0 {
        return Ok(IntegerOrInfinity::Integer(0));
    }
    if n == f64::INFINITY {
        return Ok(IntegerOrInfinity::PositiveInfinity);
    }
    if n == f64::NEG_INFINITY {
        return Ok(IntegerOrInfinity::NegativeInfinity);
    }
    Ok(IntegerOrInfinity::Integer(n.trunc() as i64))
}

/// `ToUint32`: used by array-`length` assignment (§4.E) and typed-array
/// index wraparound.
pub fn to_uint32(value: &JsValue, context: &mut Context) -> JsResult<u32> {
    let n = to_number(value, context)?;
    if !n.is_finite() || n == 0.0 {
        return Ok(0);
    }
    let n = n.trunc();
    let m = n.rem_euclid(2f64.powi(32));
    Ok(m as u32)
}

pub fn to_int32(value: &JsValue, context: &mut Context) -> JsResult<i32> {
    let u = to_uint32(value, context)?;
    Ok(u as i32)
}

/// `ToPropertyKey`: strings canonicalize array indices, symbols pass
/// through, everything else is first `ToString`d.
pub fn to_property_key(value: &JsValue, context: &mut Context) -> JsResult<PropertyKey> {
    if let JsValue::Symbol(s) = value {
        return Ok(PropertyKey::Symbol(s.clone()));
    }
    let s = to_string(value, context)?;
    Ok(PropertyKey::from_str(s.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_boolean_falsy_values() {
        assert!(!to_boolean(&JsValue::Undefined));
        assert!(!to_boolean(&JsValue::Null));
        assert!(!to_boolean(&JsValue::Number(0.0)));
        assert!(!to_boolean(&JsValue::Number(-0.0)));
        assert!(!to_boolean(&JsValue::Number(f64::NAN)));
        assert!(!to_boolean(&JsValue::string(JsString::from(""))));
    }

    #[test]
    fn string_to_number_radices() {
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert_eq!(string_to_number("0o17"), 15.0);
        assert_eq!(string_to_number("  42  "), 42.0);
        assert!(string_to_number("0123abc").is_nan());
    }

    #[test]
    fn number_formatting_integral_vs_fractional() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }
}
