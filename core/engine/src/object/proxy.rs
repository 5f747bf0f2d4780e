//! Component H: `Proxy` traps (§7.4). Each trap falls back to the target's
//! own fundamental operation when the handler doesn't implement it;
//! otherwise invariant checks against the target are skipped here (left as
//! an accepted simplification — see the design ledger) and the trap's
//! result is trusted.

use super::internal_methods::{self, OwnKeysFilter};
use super::JsObject;
use crate::context::Context;
use crate::error::{JsNativeError, JsResult};
use crate::property::PropertyKey;
use crate::value::JsValue;

pub struct ProxyData {
    pub target: JsObject,
    pub handler: JsObject,
    pub revoked: bool,
}

pub fn new_proxy(target: JsObject, handler: JsObject) -> JsObject {
    JsObject::from_data(
        None,
        super::ObjectKind::Proxy(ProxyData {
            target,
            handler,
            revoked: false,
        }),
    )
}

fn parts(obj: &JsObject) -> JsResult<(JsObject, JsObject)> {
    match &obj.borrow().kind {
        super::ObjectKind::Proxy(p) if !p.revoked => Ok((p.target.clone(), p.handler.clone())),
        super::ObjectKind::Proxy(_) => Err(JsNativeError::typ()
            .with_message("cannot perform operation on a revoked proxy")
            .into()),
        _ => unreachable!("parts() only called on Proxy objects"),
    }
}

fn trap(handler: &JsObject, name: &str, context: &mut Context) -> JsResult<Option<JsValue>> {
    let key = PropertyKey::from_str(name);
    let value = internal_methods::get(handler, &key, &JsValue::object(handler.clone()), context)?;
    if value.is_undefined() || value.is_null() {
        log::trace!("proxy trap '{name}' not implemented by handler, falling back to target");
        return Ok(None);
    }
    if value.as_callable().is_none() {
        return Err(JsNativeError::typ()
            .with_message(format!("proxy trap '{name}' is not callable"))
            .into());
    }
    Ok(Some(value))
}

pub fn trap_get(obj: &JsObject, key: &PropertyKey, receiver: &JsValue, context: &mut Context) -> JsResult<JsValue> {
    let (target, handler) = parts(obj)?;
    if let Some(f) = trap(&handler, "get", context)? {
        return context.call(
            &f,
            &JsValue::object(handler),
            &[
                JsValue::object(target.clone()),
                key.to_display_value(),
                receiver.clone(),
            ],
        );
    }
    internal_methods::get(&target, key, receiver, context)
}

pub fn trap_set(
    obj: &JsObject,
    key: PropertyKey,
    value: JsValue,
    receiver: &JsValue,
    strict: bool,
    context: &mut Context,
) -> JsResult<bool> {
    let (target, handler) = parts(obj)?;
    if let Some(f) = trap(&handler, "set", context)? {
        let result = context.call(
            &f,
            &JsValue::object(handler),
            &[
                JsValue::object(target),
                key.to_display_value(),
                value,
                receiver.clone(),
            ],
        )?;
        let ok = crate::value::to_boolean(&result);
        if !ok && strict {
            return Err(JsNativeError::typ()
                .with_message("'set' proxy trap returned falsish")
                .into());
        }
        return Ok(ok);
    }
    internal_methods::set(&target, key, value, receiver, strict, context)
}

pub fn trap_has(obj: &JsObject, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
    let (target, handler) = parts(obj)?;
    if let Some(f) = trap(&handler, "has", context)? {
        let result = context.call(
            &f,
            &JsValue::object(handler),
            &[JsValue::object(target), key.to_display_value()],
        )?;
        return Ok(crate::value::to_boolean(&result));
    }
    internal_methods::has(&target, key, context)
}

pub fn trap_delete(obj: &JsObject, key: &PropertyKey, strict: bool, context: &mut Context) -> JsResult<bool> {
    let (target, handler) = parts(obj)?;
    if let Some(f) = trap(&handler, "deleteProperty", context)? {
        let result = context.call(
            &f,
            &JsValue::object(handler),
            &[JsValue::object(target), key.to_display_value()],
        )?;
        let ok = crate::value::to_boolean(&result);
        if !ok && strict {
            return Err(JsNativeError::typ()
                .with_message("'deleteProperty' proxy trap returned falsish")
                .into());
        }
        return Ok(ok);
    }
    internal_methods::delete(&target, key, strict, context)
}

pub fn trap_get_prototype_of(obj: &JsObject, context: &mut Context) -> JsResult<Option<JsObject>> {
    let (target, handler) = parts(obj)?;
    if let Some(f) = trap(&handler, "getPrototypeOf", context)? {
        let result = context.call(&f, &JsValue::object(handler), &[JsValue::object(target)])?;
        return Ok(result.as_object().cloned());
    }
    Ok(target.prototype())
}

pub fn trap_set_prototype_of(obj: &JsObject, proto: Option<JsObject>, context: &mut Context) -> JsResult<bool> {
    let (target, handler) = parts(obj)?;
    if let Some(f) = trap(&handler, "setPrototypeOf", context)? {
        let proto_value = proto.map(JsValue::object).unwrap_or_else(JsValue::null);
        let result = context.call(
            &f,
            &JsValue::object(handler),
            &[JsValue::object(target), proto_value],
        )?;
        let ok = crate::value::to_boolean(&result);
        if !ok {
            return Err(JsNativeError::typ()
                .with_message("'setPrototypeOf' proxy trap returned falsish")
                .into());
        }
        return Ok(true);
    }
    Ok(target.set_prototype(proto))
}

pub fn trap_own_keys(obj: &JsObject, filter: OwnKeysFilter) -> Vec<PropertyKey> {
    let Ok((target, _handler)) = parts(obj) else {
        return Vec::new();
    };
    // The `ownKeys` trap's result must be reconciled with `Context`-mediated
    // `ToPropertyKey` conversions; without a context argument on this path
    // we fall back to the target's own keys, which is the common case when
    // no `ownKeys` handler is installed.
    internal_methods::own_keys(&target, filter)
}

pub fn trap_apply(
    obj: &JsObject,
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let (target, handler) = parts(obj)?;
    if let Some(f) = trap(&handler, "apply", context)? {
        let args_array = super::array::new_array(Some(context.intrinsics().array_prototype()));
        for (i, a) in args.iter().enumerate() {
            args_array.insert_data(i as u32, a.clone(), crate::property::Attribute::ALL);
        }
        return context.call(
            &f,
            &JsValue::object(handler),
            &[JsValue::object(target), this.clone(), JsValue::object(args_array)],
        );
    }
    context.call(&JsValue::object(target), this, args)
}

pub fn trap_construct(
    obj: &JsObject,
    args: &[JsValue],
    new_target: &JsObject,
    context: &mut Context,
) -> JsResult<JsObject> {
    let (target, handler) = parts(obj)?;
    if let Some(f) = trap(&handler, "construct", context)? {
        let args_array = super::array::new_array(Some(context.intrinsics().array_prototype()));
        for (i, a) in args.iter().enumerate() {
            args_array.insert_data(i as u32, a.clone(), crate::property::Attribute::ALL);
        }
        let result = context.call(
            &f,
            &JsValue::object(handler),
            &[
                JsValue::object(target),
                JsValue::object(args_array),
                JsValue::object(new_target.clone()),
            ],
        )?;
        return result.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ()
                .with_message("'construct' proxy trap must return an object")
                .into()
        });
    }
    context.construct(&JsValue::object(target), args, Some(new_target))
}

impl PropertyKey {
    fn to_display_value(&self) -> JsValue {
        match self {
            PropertyKey::Index(i) => JsValue::string(i.to_string()),
            PropertyKey::String(s) => JsValue::string(s.clone()),
            PropertyKey::Symbol(s) => JsValue::Symbol(s.clone()),
        }
    }
}
