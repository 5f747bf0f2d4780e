//! Odds and ends that need an `ObjectKind` discriminant but no dedicated
//! module of their own: `arguments` objects, and minimal `RegExp`/`Date`
//! placeholders (full lexical/calendar semantics are out of scope; these
//! exist only so `typeof`, `instanceof`, and property access on them behave
//! like objects of the right kind).

use crate::object::JsObject;
use crate::value::JsValue;
use std::collections::HashMap;

/// An `arguments` object (§6.2). `mapped` entries alias a parameter
/// binding by index so that assigning through `arguments[i]` is visible to
/// the function body and vice versa, for non-strict, non-rest, non-default
/// parameter lists; everything else is `unmapped` (a plain copy).
pub enum ArgumentsData {
    Unmapped {
        values: Vec<JsValue>,
    },
    Mapped {
        values: Vec<JsValue>,
        /// Parameter slots in the backing activation, addressed by the
        /// argument index they alias. The embedder's `Evaluator` owns the
        /// actual environment record; this just remembers which indices are
        /// still live aliases (an index removed here behaves as a plain
        /// own property afterward, e.g. after `delete arguments[0]`).
        mapped_indices: HashMap<u32, ()>,
    },
}

impl ArgumentsData {
    pub fn unmapped(values: Vec<JsValue>) -> Self {
        ArgumentsData::Unmapped { values }
    }

    pub fn mapped(values: Vec<JsValue>) -> Self {
        let mapped_indices = (0..values.len() as u32).map(|i| (i, ())).collect();
        ArgumentsData::Mapped { values, mapped_indices }
    }

    pub fn len(&self) -> usize {
        match self {
            ArgumentsData::Unmapped { values } | ArgumentsData::Mapped { values, .. } => values.len(),
        }
    }
}

/// Builds an `arguments` object for a call to `callee` (§4.D). `strict`
/// governs `.callee`: a strict-callee arguments object gets the
/// `%ThrowTypeError%` poison pill in both getter and setter slots instead of
/// a real reference to `callee`, per the same guard as
/// `Function.prototype.caller`.
pub fn new_arguments(proto: Option<JsObject>, data: ArgumentsData, callee: JsObject, strict: bool) -> JsObject {
    let obj = JsObject::from_data(proto, crate::object::ObjectKind::Arguments(data));
    let len = match &obj.borrow().kind {
        crate::object::ObjectKind::Arguments(d) => d.len(),
        _ => unreachable!(),
    };
    obj.insert_data("length", JsValue::number(len as f64), crate::property::Attribute::WRITABLE | crate::property::Attribute::CONFIGURABLE);
    let values: Vec<JsValue> = match &obj.borrow().kind {
        crate::object::ObjectKind::Arguments(ArgumentsData::Unmapped { values })
        | crate::object::ObjectKind::Arguments(ArgumentsData::Mapped { values, .. }) => values.clone(),
        _ => unreachable!(),
    };
    for (i, v) in values.into_iter().enumerate() {
        obj.insert_data(i as u32, v, crate::property::Attribute::ALL);
    }
    if strict {
        let poison = super::function::throw_type_error_accessor(
            "'callee' is restricted on strict-mode arguments objects",
        );
        obj.insert_property(
            "callee",
            crate::property::PropertyDescriptor::accessor(
                Some(poison.clone()),
                Some(poison),
                crate::property::Attribute::NONE,
            ),
        );
    } else {
        obj.insert_data(
            "callee",
            JsValue::object(callee),
            crate::property::Attribute::WRITABLE | crate::property::Attribute::CONFIGURABLE,
        );
    }
    obj
}

/// A placeholder sufficient for `instanceof RegExp` and property access;
/// pattern matching itself is explicitly out of scope.
pub struct RegExpData {
    pub source: crate::string::JsString,
    pub flags: crate::string::JsString,
}

pub fn new_regexp(source: crate::string::JsString, flags: crate::string::JsString, proto: Option<JsObject>) -> JsObject {
    JsObject::from_data(proto, crate::object::ObjectKind::RegExp(RegExpData { source, flags }))
}

/// A placeholder sufficient for `instanceof Date` and property access;
/// calendar/timezone semantics are explicitly out of scope.
pub struct DateData {
    pub time_value: f64,
}

pub fn new_date(time_value: f64, proto: Option<JsObject>) -> JsObject {
    JsObject::from_data(proto, crate::object::ObjectKind::Date(DateData { time_value }))
}

/// The materialized `Error`/`TypeError`/... object an `Evaluator` creates
/// when a thrown [`crate::error::JsError`] needs a concrete `JsValue` (§6.3).
pub struct ErrorData {
    pub name: crate::string::JsString,
    pub message: crate::string::JsString,
    pub cause: Option<JsValue>,
}

pub fn new_error_object(
    name: crate::string::JsString,
    message: crate::string::JsString,
    cause: Option<JsValue>,
    proto: Option<JsObject>,
) -> JsObject {
    let obj = JsObject::from_data(
        proto,
        crate::object::ObjectKind::Error(ErrorData {
            name: name.clone(),
            message: message.clone(),
            cause,
        }),
    );
    obj.insert_data("message", JsValue::string(message), crate::property::Attribute::WRITABLE | crate::property::Attribute::CONFIGURABLE);
    obj
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_arguments_tracks_indices() {
        let data = ArgumentsData::mapped(vec![JsValue::number(1.0), JsValue::number(2.0)]);
        assert_eq!(data.len(), 2);
    }
}
