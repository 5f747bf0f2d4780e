//! The `Reflect` namespace (§7.5): thin, exception-faithful wrappers over
//! the fundamental internal methods, with no coercion-on-failure fallback
//! the way the equivalent `Object.*` static methods sometimes have.

use crate::context::Context;
use crate::error::{JsNativeError, JsResult};
use crate::object::internal_methods::{self, OwnKeysFilter};
use crate::object::JsObject;
use crate::property::{PartialDescriptor, PropertyKey};
use crate::value::JsValue;

pub fn get(target: &JsObject, key: &PropertyKey, receiver: &JsValue, context: &mut Context) -> JsResult<JsValue> {
    internal_methods::get(target, key, receiver, context)
}

pub fn set(
    target: &JsObject,
    key: PropertyKey,
    value: JsValue,
    receiver: &JsValue,
    context: &mut Context,
) -> JsResult<bool> {
    internal_methods::set(target, key, value, receiver, false, context)
}

pub fn has(target: &JsObject, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
    internal_methods::has(target, key, context)
}

pub fn delete_property(target: &JsObject, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
    internal_methods::delete(target, key, false, context)
}

pub fn apply(target: &JsValue, this_arg: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    context.call(target, this_arg, args)
}

/// `Reflect.construct(target, args, newTarget)`: unlike `new target(...)`,
/// `newTarget` may differ from `target` itself, which is how subclassing
/// machinery reuses a base constructor while installing the derived
/// class's prototype.
pub fn construct(
    target: &JsValue,
    args: &[JsValue],
    new_target: Option<&JsObject>,
    context: &mut Context,
) -> JsResult<JsObject> {
    context.construct(target, args, new_target)
}

pub fn get_prototype_of(target: &JsObject, context: &mut Context) -> JsResult<Option<JsObject>> {
    internal_methods::get_prototype_of(target, context)
}

pub fn set_prototype_of(target: &JsObject, proto: Option<JsObject>, context: &mut Context) -> JsResult<bool> {
    internal_methods::set_prototype_of(target, proto, context)
}

pub fn own_keys(target: &JsObject) -> Vec<PropertyKey> {
    internal_methods::own_keys(
        target,
        OwnKeysFilter {
            strings: true,
            symbols: true,
            only_enumerable: false,
        },
    )
}

pub fn prevent_extensions(target: &JsObject) -> bool {
    target.prevent_extensions();
    true
}

pub fn is_extensible(target: &JsObject) -> bool {
    target.is_extensible()
}

pub fn define_property(
    target: &JsObject,
    key: PropertyKey,
    partial: PartialDescriptor,
) -> JsResult<bool> {
    match internal_methods::define_own_property(target, key, partial, false) {
        Ok(result) => Ok(result),
        Err(e) => Err(e),
    }
}

pub fn get_own_property_descriptor(target: &JsObject, key: &PropertyKey) -> Option<crate::property::PropertyDescriptor> {
    internal_methods::get_own_property(target, key)
}

pub fn require_object(value: &JsValue, method: &str) -> JsResult<&JsObject> {
    value.as_object().ok_or_else(|| {
        JsNativeError::typ()
            .with_message(format!("Reflect.{method} called on non-object"))
            .into()
    })
}
