//! Component C: the fundamental `[[Get]]`/`[[Set]]`/`[[HasProperty]]`/
//! `[[Delete]]`/`OwnKeys` operations, plus the exotic-kind dispatch table
//! (§9: "Array, Typed Array, Proxy, and String-wrapper override [[Get]],
//! [[Set]], [[HasProperty]], [[Delete]], and OwnKeys; all other kinds reuse
//! the Ordinary implementations").

use super::{JsObject, ObjectKind};
use crate::context::Context;
use crate::error::{JsNativeError, JsResult};
use crate::property::{Attribute, PartialDescriptor, PropertyDescriptor, PropertyKey};
use crate::value::JsValue;

/// Which key/kind combinations currently have a getter/setter on the call
/// stack, so a getter that re-enters itself on the same object/key breaks
/// the cycle instead of overflowing the stack (§4.C).
#[derive(Default)]
pub struct ReentrancyGuard {
    active: std::collections::HashSet<(usize, PropertyKey)>,
}

impl ReentrancyGuard {
    fn enter(&mut self, obj: &JsObject, key: &PropertyKey) -> bool {
        self.active.insert((obj.identity(), key.clone()))
    }
    fn exit(&mut self, obj: &JsObject, key: &PropertyKey) {
        self.active.remove(&(obj.identity(), key.clone()));
    }
    fn is_active(&self, obj: &JsObject, key: &PropertyKey) -> bool {
        self.active.contains(&(obj.identity(), key.clone()))
    }
}

/// `Function.prototype.caller`/class constructors' `.caller` (§4.D): a
/// poison pill in strict contexts, resolved before any table lookup since
/// no table entry backs it.
fn function_caller_value(obj: &JsObject, key: &PropertyKey, context: &mut Context) -> Option<JsResult<JsValue>> {
    if !matches!(key, PropertyKey::String(s) if s.as_str() == "caller") {
        return None;
    }
    let is_function_like = matches!(obj.borrow().kind, ObjectKind::Function(_) | ObjectKind::Class(_));
    if !is_function_like || obj.get_own_property(key).is_some() {
        return None;
    }
    Some(super::function::caller_accessor(obj, context))
}

/// `[[Get]](key, receiver)`. Dispatches to an exotic override where one
/// exists, otherwise runs the ordinary algorithm.
pub fn get(obj: &JsObject, key: &PropertyKey, receiver: &JsValue, context: &mut Context) -> JsResult<JsValue> {
    if let Some(result) = function_caller_value(obj, key, context) {
        return result;
    }
    let kind_is_exotic = matches!(
        obj.borrow().kind,
        ObjectKind::Array(_) | ObjectKind::TypedArray(_) | ObjectKind::Proxy(_) | ObjectKind::StringWrapper(_)
    );
    if kind_is_exotic {
        return get_exotic(obj, key, receiver, context);
    }
    ordinary_get(obj, key, receiver, context)
}

/// Arrays carry their `length` in `ArrayData`, not the descriptor table;
/// this surfaces it as a virtual own property unless something has
/// shadowed it with a real table entry.
fn array_length_value(obj: &JsObject, key: &PropertyKey) -> Option<JsValue> {
    if !matches!(key, PropertyKey::String(s) if s.as_str() == "length") {
        return None;
    }
    match &obj.borrow().kind {
        ObjectKind::Array(a) if obj.get_own_property(key).is_none() => {
            Some(JsValue::number(f64::from(a.length())))
        }
        _ => None,
    }
}

fn get_exotic(obj: &JsObject, key: &PropertyKey, receiver: &JsValue, context: &mut Context) -> JsResult<JsValue> {
    // Array and string-wrapper only override the integer-index fast path;
    // everything else (symbols, `length`, other strings) still walks the
    // ordinary descriptor table, so we try the exotic fast path first and
    // fall back.
    if let Some(v) = array_length_value(obj, key) {
        return Ok(v);
    }
    if let Some(index) = key.as_index() {
        let is_array = matches!(obj.borrow().kind, ObjectKind::Array(_));
        if is_array && obj.get_own_property(key).is_none() {
            if let Some(v) = super::array::fast_get(obj, index) {
                return Ok(v);
            }
        }
        if let ObjectKind::TypedArray(_) = obj.borrow().kind {
            return Ok(super::typed_array::get_index(obj, index));
        }
        if let ObjectKind::StringWrapper(s) = &obj.borrow().kind {
            if let Some(c) = s.as_str().encode_utf16().nth(index as usize) {
                return Ok(JsValue::string(String::from_utf16_lossy(&[c])));
            }
        }
    }
    if let ObjectKind::Proxy(_) = obj.borrow().kind {
        return super::proxy::trap_get(obj, key, receiver, context);
    }
    ordinary_get(obj, key, receiver, context)
}

pub fn ordinary_get(
    obj: &JsObject,
    key: &PropertyKey,
    receiver: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let Some(desc) = obj.get_own_property(key) else {
        return match obj.prototype() {
            Some(proto) => get(&proto, key, receiver, context),
            None => Ok(JsValue::undefined()),
        };
    };

    match desc.kind {
        crate::property::PropertyKind::Data(v) => Ok(v),
        crate::property::PropertyKind::Accessor { get: Some(getter), .. } => {
            if context.reentrancy_guard_mut().is_active(obj, key) {
                log::trace!("reentrant getter call on {key:?} broken by the reentrancy guard");
                return Ok(JsValue::undefined());
            }
            context.reentrancy_guard_mut().enter(obj, key);
            let result = context.call(&getter, receiver, &[]);
            context.reentrancy_guard_mut().exit(obj, key);
            result
        }
        crate::property::PropertyKind::Accessor { get: None, .. } => Ok(JsValue::undefined()),
    }
}

/// `[[Set]](key, value, receiver)`.
pub fn set(
    obj: &JsObject,
    key: PropertyKey,
    value: JsValue,
    receiver: &JsValue,
    strict: bool,
    context: &mut Context,
) -> JsResult<bool> {
    if let ObjectKind::Proxy(_) = obj.borrow().kind {
        return super::proxy::trap_set(obj, key, value, receiver, strict, context);
    }
    if let ObjectKind::Array(_) = obj.borrow().kind {
        if let Some(r) = super::array::exotic_set(obj, &key, &value, strict, context)? {
            return Ok(r);
        }
    }
    if let ObjectKind::TypedArray(_) = obj.borrow().kind {
        if let Some(index) = key.as_index() {
            super::typed_array::set_index(obj, index, &value, context)?;
            return Ok(true);
        }
    }
    ordinary_set(obj, key, value, receiver, strict, context)
}

pub fn ordinary_set(
    obj: &JsObject,
    key: PropertyKey,
    value: JsValue,
    receiver: &JsValue,
    strict: bool,
    context: &mut Context,
) -> JsResult<bool> {
    // Resolve the descriptor that governs this key: own, else inherited
    // (walking the chain, but skipping integer-index keys on the *prototype*
    // to avoid pathological recursion through indexed setters, per §4.C).
    let resolved = resolve_for_set(obj, &key, context)?;

    match resolved {
        Some(desc) if desc.is_accessor() => match desc.setter() {
            Some(setter) => {
                context.call(setter, receiver, &[value])?;
                Ok(true)
            }
            None => fail_or_silent(strict, "no setter for accessor property"),
        },
        Some(desc) if !desc.writable() => fail_or_silent(strict, "cannot assign to read only property"),
        _ => {
            // Create/overwrite an *own* data property on the receiver.
            let Some(receiver_obj) = receiver.as_object() else {
                return Ok(false);
            };
            if let Some(existing) = receiver_obj.get_own_property(&key) {
                if existing.is_accessor() || !existing.writable() {
                    return fail_or_silent(strict, "cannot assign over accessor/read-only own property");
                }
                receiver_obj.insert_property(
                    key,
                    PropertyDescriptor::data(value, existing.attributes),
                );
                return Ok(true);
            }
            if !receiver_obj.is_extensible() {
                return fail_or_silent(strict, "cannot add property, object is not extensible");
            }
            receiver_obj.insert_property(key, PropertyDescriptor::data(value, Attribute::ALL));
            Ok(true)
        }
    }
}

fn resolve_for_set(
    obj: &JsObject,
    key: &PropertyKey,
    context: &mut Context,
) -> JsResult<Option<PropertyDescriptor>> {
    if let Some(desc) = obj.get_own_property(key) {
        return Ok(Some(desc));
    }
    let mut current = obj.prototype();
    while let Some(proto) = current {
        if key.as_index().is_some() {
            // skip indexed accessor lookup on the prototype chain
            current = proto.prototype();
            continue;
        }
        if let Some(desc) = proto.get_own_property(key) {
            return Ok(Some(desc));
        }
        current = proto.prototype();
    }
    let _ = context;
    Ok(None)
}

fn fail_or_silent(strict: bool, message: &str) -> JsResult<bool> {
    if strict {
        Err(JsNativeError::typ().with_message(message.to_string()).into())
    } else {
        Ok(false)
    }
}

/// `[[HasProperty]]`.
pub fn has(obj: &JsObject, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
    if let ObjectKind::Proxy(_) = obj.borrow().kind {
        return super::proxy::trap_has(obj, key, context);
    }
    if obj.get_own_property(key).is_some() {
        return Ok(true);
    }
    if let ObjectKind::Array(_) = obj.borrow().kind {
        if let Some(index) = key.as_index() {
            return Ok(super::array::fast_has(obj, index));
        }
    }
    if let ObjectKind::TypedArray(ta) = &obj.borrow().kind {
        if let Some(index) = key.as_index() {
            return Ok((index as u64) < ta.length() as u64);
        }
    }
    match obj.prototype() {
        Some(proto) => has(&proto, key, context),
        None => Ok(false),
    }
}

/// `[[Delete]]`.
pub fn delete(obj: &JsObject, key: &PropertyKey, strict: bool, context: &mut Context) -> JsResult<bool> {
    if let ObjectKind::Proxy(_) = obj.borrow().kind {
        return super::proxy::trap_delete(obj, key, strict, context);
    }
    if let ObjectKind::Array(_) = obj.borrow().kind {
        if let Some(index) = key.as_index() {
            return super::array::delete_index(obj, index, strict);
        }
    }
    match obj.get_own_property(key) {
        None => Ok(true),
        Some(desc) if desc.configurable() => {
            obj.remove_own_property(key);
            Ok(true)
        }
        Some(_) => {
            if strict {
                Err(JsNativeError::typ()
                    .with_message("cannot delete non-configurable property")
                    .into())
            } else {
                Ok(false)
            }
        }
    }
}

/// `[[GetOwnProperty]]`, array-aware: a table entry wins if present,
/// otherwise a fast-stored array element is synthesized as the plain W|E|C
/// data descriptor it implicitly is (§4.E). Prefer this over
/// [`JsObject::get_own_property`] whenever the object might be an array.
pub fn get_own_property(obj: &JsObject, key: &PropertyKey) -> Option<PropertyDescriptor> {
    if let Some(desc) = obj.get_own_property(key) {
        return Some(desc);
    }
    if let ObjectKind::Array(a) = &obj.borrow().kind {
        if matches!(key, PropertyKey::String(s) if s.as_str() == "length") {
            return Some(super::array::length_descriptor(a.length()));
        }
        if let Some(index) = key.as_index() {
            if let Some(v) = super::array::fast_get(obj, index) {
                return Some(PropertyDescriptor::data(v, Attribute::ALL));
            }
        }
    }
    None
}

/// `[[DefineOwnProperty]]`, including the non-extensible-object rejection
/// that `PartialDescriptor::validate_and_apply` deliberately leaves to the
/// caller (§4.B).
pub fn define_own_property(
    obj: &JsObject,
    key: PropertyKey,
    partial: PartialDescriptor,
    strict: bool,
) -> JsResult<bool> {
    let current = get_own_property(obj, &key);
    if current.is_none() && !obj.is_extensible() {
        return fail_or_silent(strict, "object is not extensible");
    }
    let is_array_index = matches!(obj.borrow().kind, ObjectKind::Array(_)) && key.as_index().is_some();
    match obj.define_own_property_raw_with_current(key.clone(), partial, current) {
        Ok(()) => {
            if is_array_index {
                super::array::clear_fast(obj, key.as_index().unwrap());
            }
            Ok(true)
        }
        Err(()) => {
            if strict {
                Err(JsNativeError::typ()
                    .with_message("cannot redefine property")
                    .into())
            } else {
                Ok(false)
            }
        }
    }
}

/// Which enumeration the caller wants back from [`own_keys`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnKeysFilter {
    pub strings: bool,
    pub symbols: bool,
    pub only_enumerable: bool,
}

/// `OwnKeys` / `[[OwnPropertyKeys]]` (§4.C): integer-index keys ascending
/// numerically, then string keys in insertion order, then symbol keys in
/// insertion order.
/// `[[GetPrototypeOf]]` (§4.G): traps through a `Proxy`'s handler instead of
/// reading the proxy wrapper's own (always-`None`) prototype slot.
pub fn get_prototype_of(obj: &JsObject, context: &mut Context) -> JsResult<Option<JsObject>> {
    if let ObjectKind::Proxy(_) = obj.borrow().kind {
        return super::proxy::trap_get_prototype_of(obj, context);
    }
    Ok(obj.prototype())
}

/// `[[SetPrototypeOf]]` (§4.G): traps through a `Proxy`'s handler instead of
/// mutating the proxy wrapper's own dummy prototype slot.
pub fn set_prototype_of(obj: &JsObject, proto: Option<JsObject>, context: &mut Context) -> JsResult<bool> {
    if let ObjectKind::Proxy(_) = obj.borrow().kind {
        return super::proxy::trap_set_prototype_of(obj, proto, context);
    }
    Ok(obj.set_prototype(proto))
}

pub fn own_keys(obj: &JsObject, filter: OwnKeysFilter) -> Vec<PropertyKey> {
    if let ObjectKind::Proxy(_) = obj.borrow().kind {
        return super::proxy::trap_own_keys(obj, filter);
    }

    let raw = obj.raw_keys();
    let mut indices: Vec<u32> = raw.iter().filter_map(PropertyKey::as_index).collect();
    if matches!(obj.borrow().kind, ObjectKind::Array(_)) {
        for i in super::array::fast_indices(obj) {
            if !indices.contains(&i) {
                indices.push(i);
            }
        }
    }
    indices.sort_unstable();

    let mut keys: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Index).collect();

    if filter.strings {
        keys.extend(raw.iter().filter(|k| matches!(k, PropertyKey::String(_))).cloned());
        if matches!(obj.borrow().kind, ObjectKind::Array(_)) {
            let length_key = PropertyKey::from_str("length");
            if !raw.contains(&length_key) {
                keys.push(length_key);
            }
        }
    }
    if filter.symbols {
        keys.extend(raw.iter().filter(|k| matches!(k, PropertyKey::Symbol(_))).cloned());
    }

    if filter.only_enumerable {
        keys.retain(|k| {
            get_own_property(obj, k)
                .map(PropertyDescriptor::enumerable)
                .unwrap_or(false)
        });
    }
    keys
}

/// `for-in` enumeration (§4.C): own enumerable string keys (indices
/// ascending, then strings by insertion order), then recursively the
/// prototype's, skipping keys already seen, stopping before a prototype
/// with no further parent (the object-root boundary).
pub fn for_in_keys(obj: &JsObject) -> Vec<PropertyKey> {
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    let mut current = Some(obj.clone());
    while let Some(o) = current {
        let own = own_keys(
            &o,
            OwnKeysFilter {
                strings: true,
                symbols: false,
                only_enumerable: true,
            },
        );
        for key in own {
            if seen.insert(key.clone()) {
                result.push(key);
            }
        }
        current = o.prototype();
    }
    result
}
