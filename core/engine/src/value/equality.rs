//! The four equality predicates of §4.A.

use super::conversions::PreferredType;
use super::JsValue;
use crate::context::Context;
use crate::error::JsResult;
use crate::object::JsObject;

/// `SameValue`: identical to `===` except `NaN` equals itself and `+0`/`-0`
/// are distinguished.
pub fn same_value(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(x), JsValue::Number(y)) => {
            if x.is_nan() && y.is_nan() {
                true
            } else if *x == 0.0 && *y == 0.0 {
                x.is_sign_positive() == y.is_sign_positive()
            } else {
                x == y
            }
        }
        _ => strict_equals(a, b),
    }
}

/// `SameValueZero`: like `SameValue` but `+0` and `-0` are not distinguished
/// (used by `Array.prototype.includes`, `Map`/`Set` key comparison).
pub fn same_value_zero(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(x), JsValue::Number(y)) => {
            (x.is_nan() && y.is_nan()) || x == y
        }
        _ => strict_equals(a, b),
    }
}

/// `===`. No coercion; `NaN !== NaN`; `+0 === -0`.
pub fn strict_equals(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) => true,
        (JsValue::Null, JsValue::Null) => true,
        (JsValue::Boolean(x), JsValue::Boolean(y)) => x == y,
        (JsValue::Number(x), JsValue::Number(y)) => x == y,
        (JsValue::String(x), JsValue::String(y)) => x == y,
        (JsValue::BigInt(x), JsValue::BigInt(y)) => x == y,
        (JsValue::Symbol(x), JsValue::Symbol(y)) => x == y,
        (JsValue::Object(x), JsValue::Object(y)) => JsObject::ptr_eq(x, y),
        _ => false,
    }
}

/// `==`, with full cross-type coercion (ECMA-262 7.2.13). May invoke user
/// `valueOf`/`toString`/`Symbol.toPrimitive` when one side is an object, so
/// it can fail and must run through `Context`.
pub fn abstract_equals(a: &JsValue, b: &JsValue, context: &mut Context) -> JsResult<bool> {
    use JsValue::{BigInt, Boolean, Null, Number, Object, String, Symbol, Undefined};

    if std::mem::discriminant(a) == std::mem::discriminant(b) {
        return Ok(strict_equals(a, b));
    }

    match (a, b) {
        (Null, Undefined) | (Undefined, Null) => Ok(true),
        (Number(_), String(_)) | (String(_), Number(_)) => {
            let (n, s) = match (a, b) {
                (Number(n), String(s)) => (*n, s),
                (String(s), Number(n)) => (*n, s),
                _ => unreachable!(),
            };
            Ok(n == super::conversions::string_to_number(s))
        }
        (BigInt(big), String(s)) | (String(s), BigInt(big)) => {
            Ok(crate::bigint::JsBigInt::from_string(s)
                .map(|parsed| parsed == *big)
                .unwrap_or(false))
        }
        (Boolean(_), _) => {
            let n = super::conversions::to_number(a, context)?;
            abstract_equals(&Number(n), b, context)
        }
        (_, Boolean(_)) => {
            let n = super::conversions::to_number(b, context)?;
            abstract_equals(a, &Number(n), context)
        }
        (Number(x), BigInt(y)) | (BigInt(y), Number(x)) => Ok(*x == y.to_f64()),
        (Object(_), Number(_) | String(_) | BigInt(_) | Symbol(_)) => {
            let primitive = super::conversions::to_primitive(a, PreferredType::Default, context)?;
            abstract_equals(&primitive, b, context)
        }
        (Number(_) | String(_) | BigInt(_) | Symbol(_), Object(_)) => {
            let primitive = super::conversions::to_primitive(b, PreferredType::Default, context)?;
            abstract_equals(a, &primitive, context)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_same_value_but_not_strict_equal() {
        let nan = JsValue::Number(f64::NAN);
        assert!(same_value(&nan, &nan));
        assert!(same_value_zero(&nan, &nan));
        assert!(!strict_equals(&nan, &nan));
    }

    #[test]
    fn positive_and_negative_zero() {
        let pos = JsValue::Number(0.0);
        let neg = JsValue::Number(-0.0);
        assert!(strict_equals(&pos, &neg));
        assert!(same_value_zero(&pos, &neg));
        assert!(!same_value(&pos, &neg));
    }
}
