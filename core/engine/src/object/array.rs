//! Component E: the array exotic object.

use super::internal_methods;
use super::{JsObject, ObjectKind};
use crate::context::Context;
use crate::error::{JsNativeError, JsResult};
use crate::property::{Attribute, PropertyDescriptor, PropertyKey};
use crate::value::{same_value_zero, strict_equals, JsValue};
use std::collections::BTreeMap;
use thin_vec::ThinVec;

/// Indices at or above this threshold move from the dense vector into the
/// sparse map, per §3's "dense vector up to a threshold... sparse mapping
/// for larger indices".
pub const DENSE_THRESHOLD: u32 = 10_000;

/// Array storage: a dense prefix, a sparse tail, and the set of indices
/// that are holes (declared-but-never-set) rather than simply "out of
/// bounds". `length` is tracked explicitly rather than derived, since
/// extending `length` past the highest set index creates holes with no
/// backing storage at all.
#[derive(Default)]
pub struct ArrayData {
    dense: ThinVec<Option<JsValue>>,
    sparse: BTreeMap<u32, JsValue>,
    holes: std::collections::HashSet<u32>,
    length: u32,
}

impl ArrayData {
    pub fn new() -> Self {
        ArrayData::default()
    }

    pub fn with_length(length: u32) -> Self {
        ArrayData {
            length,
            ..Default::default()
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    fn get(&self, index: u32) -> Option<JsValue> {
        if index >= self.length || self.holes.contains(&index) {
            return None;
        }
        if index < DENSE_THRESHOLD {
            return self.dense.get(index as usize).and_then(Clone::clone);
        }
        self.sparse.get(&index).cloned()
    }

    fn has(&self, index: u32) -> bool {
        index < self.length && !self.holes.contains(&index) && {
            if index < DENSE_THRESHOLD {
                self.dense.get(index as usize).map(Option::is_some).unwrap_or(false)
            } else {
                self.sparse.contains_key(&index)
            }
        }
    }

    fn set(&mut self, index: u32, value: JsValue) {
        self.holes.remove(&index);
        if index < DENSE_THRESHOLD {
            if index as usize >= self.dense.len() {
                self.dense.resize(index as usize + 1, None);
            }
            self.dense[index as usize] = Some(value);
        } else {
            self.sparse.insert(index, value);
        }
        if index >= self.length {
            self.length = index + 1;
        }
    }

    fn mark_hole(&mut self, index: u32) {
        if index < self.length {
            self.holes.insert(index);
        }
        if index < DENSE_THRESHOLD {
            if let Some(slot) = self.dense.get_mut(index as usize) {
                *slot = None;
            }
        } else {
            self.sparse.remove(&index);
        }
    }

    fn remove(&mut self, index: u32) {
        self.mark_hole(index);
        self.holes.remove(&index);
    }

    /// Truncates storage above `new_length`, marking freshly-out-of-range
    /// slots as absent. Does not itself enforce the non-configurable-stop
    /// rule; callers walk index-by-index through [`JsObject`]'s descriptor
    /// table for that (configurability is a table concept, not a storage
    /// concept — plain array-storage slots are always configurable).
    fn truncate(&mut self, new_length: u32) {
        self.dense.truncate((new_length.min(DENSE_THRESHOLD)) as usize);
        self.sparse.retain(|&k, _| k < new_length);
        self.holes.retain(|&k| k < new_length);
        self.length = new_length;
    }
}

pub fn new_array(proto: Option<JsObject>) -> JsObject {
    JsObject::from_data(proto, ObjectKind::Array(ArrayData::new()))
}

pub fn fast_get(obj: &JsObject, index: u32) -> Option<JsValue> {
    match &obj.borrow().kind {
        ObjectKind::Array(a) => a.get(index),
        _ => None,
    }
}

pub fn fast_has(obj: &JsObject, index: u32) -> bool {
    match &obj.borrow().kind {
        ObjectKind::Array(a) => a.has(index),
        _ => false,
    }
}

/// The index-coupled-to-`length` half of `[[Set]]` for arrays (§4.E.3).
/// Returns `Ok(None)` to signal "not an array-specific set, fall through to
/// ordinary `[[Set]]`" (e.g. setting a non-index, non-`length` key).
pub fn exotic_set(
    obj: &JsObject,
    key: &PropertyKey,
    value: &JsValue,
    strict: bool,
    context: &mut Context,
) -> JsResult<Option<bool>> {
    if let PropertyKey::String(s) = key {
        if s.as_str() == "length" {
            return set_length(obj, value, strict, context).map(Some);
        }
    }
    let Some(index) = key.as_index() else {
        return Ok(None);
    };
    // Only take the array fast path when no descriptor already shadows this
    // index (e.g. via a prior `Object.defineProperty`).
    if obj.get_own_property(key).is_some() {
        return Ok(None);
    }
    match &mut obj.borrow_mut().kind {
        ObjectKind::Array(a) => {
            a.set(index, value.clone());
            Ok(Some(true))
        }
        _ => Ok(None),
    }
}

pub fn delete_index(obj: &JsObject, index: u32, _strict: bool) -> JsResult<bool> {
    if obj.get_own_property(&PropertyKey::Index(index)).is_some() {
        return Ok(true); // handled by the generic descriptor-table path
    }
    if let ObjectKind::Array(a) = &mut obj.borrow_mut().kind {
        a.remove(index);
    }
    Ok(true)
}

/// Array `length` assignment (§4.E.3): double ToNumber-flavoured coercion,
/// range validation, then deletion from the top down, stopping at the
/// first non-configurable index.
fn set_length(obj: &JsObject, value: &JsValue, strict: bool, context: &mut Context) -> JsResult<bool> {
    let n = crate::value::to_number(value, context)?;
    let as_u32 = crate::value::to_uint32(value, context)?;
    if f64::from(as_u32) != n || n.is_nan() || n < 0.0 {
        return Err(JsNativeError::range()
            .with_message("invalid array length")
            .into());
    }
    let new_length = as_u32;
    let current_length = match &obj.borrow().kind {
        ObjectKind::Array(a) => a.length(),
        _ => return Ok(false),
    };

    if new_length >= current_length {
        if let ObjectKind::Array(a) = &mut obj.borrow_mut().kind {
            a.length = new_length;
        }
        return Ok(true);
    }

    // Walk indices [new_length, current_length) from the top down; stop at
    // the first non-configurable own descriptor.
    let mut stop_at = new_length;
    let mut i = current_length;
    while i > new_length {
        i -= 1;
        let key = PropertyKey::Index(i);
        if let Some(desc) = obj.get_own_property(&key) {
            if !desc.configurable() {
                stop_at = i + 1;
                break;
            }
            obj.remove_own_property(&key);
        }
        if let ObjectKind::Array(a) = &mut obj.borrow_mut().kind {
            a.remove(i);
        }
    }

    if let ObjectKind::Array(a) = &mut obj.borrow_mut().kind {
        a.truncate(stop_at);
    }

    if stop_at > new_length && strict {
        return Err(JsNativeError::typ()
            .with_message("cannot delete non-configurable array element while shortening length")
            .into());
    }
    Ok(true)
}

pub fn length_descriptor(length: u32) -> PropertyDescriptor {
    PropertyDescriptor::data(JsValue::number(f64::from(length)), Attribute::WRITABLE)
}

/// All indices currently holding a value in fast storage (dense or sparse),
/// unordered. `OwnKeys`/`for-in` merge these back in alongside the property
/// table, since a fast-stored element is a real W|E|C data property that
/// just isn't kept in the table for the common case (§4.E).
pub fn fast_indices(obj: &JsObject) -> Vec<u32> {
    match &obj.borrow().kind {
        ObjectKind::Array(a) => {
            let mut out: Vec<u32> = a
                .dense
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.is_some().then_some(i as u32))
                .collect();
            out.extend(a.sparse.keys().copied());
            out
        }
        _ => Vec::new(),
    }
}

/// Drops an index from fast storage without touching `length`. Called after
/// `Object.defineProperty` gives that index an explicit table descriptor, so
/// the two stores never disagree about which one is authoritative.
pub(crate) fn clear_fast(obj: &JsObject, index: u32) {
    if let ObjectKind::Array(a) = &mut obj.borrow_mut().kind {
        if index < DENSE_THRESHOLD {
            if let Some(slot) = a.dense.get_mut(index as usize) {
                *slot = None;
            }
        } else {
            a.sparse.remove(&index);
        }
    }
}

// ---------------------------------------------------------------------
// Generic array methods. Every one of these accepts an array-*like* `this`
// (§4.E): read `length` via `ToLength` first (observably, before
// validating a callback argument), then index 0..length via the normal
// Value-API `get`/`set`, never touching `ArrayData` directly. This is what
// "generic" means in the spec and is what lets these same functions work
// on `arguments`, typed arrays, or any object with a numeric `length`.
// ---------------------------------------------------------------------

/// Reads `this.length` via `ToLength`. Must run *before* validating a
/// callback argument so that a `length` getter's side effects are
/// observable in the right order (§4.E, §5's reentrancy contract).
pub fn array_like_length(this: &JsValue, context: &mut Context) -> JsResult<u64> {
    let len_val = get_prop(this, "length", context)?;
    crate::value::to_length(&len_val, context)
}

fn get_prop(this: &JsValue, key: &str, context: &mut Context) -> JsResult<JsValue> {
    let obj = crate::value::to_object(this, context)?;
    internal_methods::get(&obj, &PropertyKey::from_str(key), this, context)
}

fn get_index(this: &JsValue, index: u64, context: &mut Context) -> JsResult<JsValue> {
    let obj = crate::value::to_object(this, context)?;
    internal_methods::get(&obj, &index_key(index), this, context)
}

fn has_index(this: &JsValue, index: u64, context: &mut Context) -> JsResult<bool> {
    let obj = crate::value::to_object(this, context)?;
    internal_methods::has(&obj, &index_key(index), context)
}

fn set_index(this: &JsValue, index: u64, value: JsValue, context: &mut Context) -> JsResult<()> {
    let obj = crate::value::to_object(this, context)?;
    internal_methods::set(&obj, index_key(index), value, this, true, context)?;
    Ok(())
}

fn delete_at(this: &JsValue, index: u64, context: &mut Context) -> JsResult<()> {
    let obj = crate::value::to_object(this, context)?;
    internal_methods::delete(&obj, &index_key(index), true, context)?;
    Ok(())
}

fn set_length_prop(this: &JsValue, length: u64, context: &mut Context) -> JsResult<()> {
    let obj = crate::value::to_object(this, context)?;
    internal_methods::set(
        &obj,
        PropertyKey::from_str("length"),
        JsValue::number(length as f64),
        this,
        true,
        context,
    )?;
    Ok(())
}

fn index_key(index: u64) -> PropertyKey {
    if index <= u64::from(u32::MAX - 1) {
        PropertyKey::Index(index as u32)
    } else {
        PropertyKey::from_str(&index.to_string())
    }
}

fn require_callable(value: &JsValue, method: &str) -> JsResult<()> {
    if value.as_callable().is_none() {
        return Err(JsNativeError::typ()
            .with_message(format!("{method}: callback is not a function"))
            .into());
    }
    Ok(())
}

pub fn for_each(this: &JsValue, callback: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<()> {
    let len = array_like_length(this, context)?;
    require_callable(callback, "forEach")?;
    for i in 0..len {
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            context.call(
                callback,
                this_arg,
                &[v, JsValue::number(i as f64), this.clone()],
            )?;
        }
    }
    Ok(())
}

/// `map`: holes are skipped during invocation but preserved as holes in the
/// result (§8's sparse-hole-preservation property), not materialized as
/// `undefined`.
pub fn map(this: &JsValue, callback: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<JsObject> {
    let len = array_like_length(this, context)?;
    require_callable(callback, "map")?;
    let proto = context.intrinsics().array_prototype();
    let result = new_array(Some(proto));
    for i in 0..len {
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            let mapped = context.call(
                callback,
                this_arg,
                &[v, JsValue::number(i as f64), this.clone()],
            )?;
            if let ObjectKind::Array(a) = &mut result.borrow_mut().kind {
                a.set(i as u32, mapped);
            }
        } else if let ObjectKind::Array(a) = &mut result.borrow_mut().kind {
            a.length = (i + 1) as u32;
            a.holes.insert(i as u32);
        }
    }
    Ok(result)
}

pub fn filter(this: &JsValue, callback: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<JsObject> {
    let len = array_like_length(this, context)?;
    require_callable(callback, "filter")?;
    let proto = context.intrinsics().array_prototype();
    let result = new_array(Some(proto));
    let mut out_index = 0u32;
    for i in 0..len {
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            let keep = context.call(
                callback,
                this_arg,
                &[v.clone(), JsValue::number(i as f64), this.clone()],
            )?;
            if crate::value::to_boolean(&keep) {
                if let ObjectKind::Array(a) = &mut result.borrow_mut().kind {
                    a.set(out_index, v);
                }
                out_index += 1;
            }
        }
    }
    Ok(result)
}

pub fn every(this: &JsValue, callback: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<bool> {
    let len = array_like_length(this, context)?;
    require_callable(callback, "every")?;
    for i in 0..len {
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            let result = context.call(callback, this_arg, &[v, JsValue::number(i as f64), this.clone()])?;
            if !crate::value::to_boolean(&result) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

pub fn some(this: &JsValue, callback: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<bool> {
    let len = array_like_length(this, context)?;
    require_callable(callback, "some")?;
    for i in 0..len {
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            let result = context.call(callback, this_arg, &[v, JsValue::number(i as f64), this.clone()])?;
            if crate::value::to_boolean(&result) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

pub fn reduce(
    this: &JsValue,
    callback: &JsValue,
    initial: Option<JsValue>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let len = array_like_length(this, context)?;
    require_callable(callback, "reduce")?;
    let mut acc = initial;
    let mut i = 0u64;
    if acc.is_none() {
        while i < len && !has_index(this, i, context)? {
            i += 1;
        }
        if i >= len {
            return Err(JsNativeError::typ()
                .with_message("reduce of empty array with no initial value")
                .into());
        }
        acc = Some(get_index(this, i, context)?);
        i += 1;
    }
    let mut acc = acc.unwrap();
    while i < len {
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            acc = context.call(callback, &JsValue::undefined(), &[acc, v, JsValue::number(i as f64), this.clone()])?;
        }
        i += 1;
    }
    Ok(acc)
}

pub fn reduce_right(
    this: &JsValue,
    callback: &JsValue,
    initial: Option<JsValue>,
    context: &mut Context,
) -> JsResult<JsValue> {
    let len = array_like_length(this, context)?;
    require_callable(callback, "reduceRight")?;
    if len == 0 && initial.is_none() {
        return Err(JsNativeError::typ()
            .with_message("reduceRight of empty array with no initial value")
            .into());
    }
    let mut acc = initial;
    let mut i = len;
    if acc.is_none() {
        loop {
            if i == 0 {
                return Err(JsNativeError::typ()
                    .with_message("reduceRight of empty array with no initial value")
                    .into());
            }
            i -= 1;
            if has_index(this, i, context)? {
                acc = Some(get_index(this, i, context)?);
                break;
            }
        }
    }
    let mut acc = acc.unwrap();
    while i > 0 {
        i -= 1;
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            acc = context.call(callback, &JsValue::undefined(), &[acc, v, JsValue::number(i as f64), this.clone()])?;
        }
    }
    Ok(acc)
}

pub fn index_of(this: &JsValue, search: &JsValue, from: i64, context: &mut Context) -> JsResult<i64> {
    let len = array_like_length(this, context)? as i64;
    let mut i = if from < 0 { (len + from).max(0) } else { from };
    while i < len {
        if has_index(this, i as u64, context)? {
            let v = get_index(this, i as u64, context)?;
            if strict_equals(&v, search) {
                return Ok(i);
            }
        }
        i += 1;
    }
    Ok(-1)
}

pub fn last_index_of(this: &JsValue, search: &JsValue, from: i64, context: &mut Context) -> JsResult<i64> {
    let len = array_like_length(this, context)? as i64;
    let mut i = if from < 0 { len + from } else { from.min(len - 1) };
    while i >= 0 {
        if has_index(this, i as u64, context)? {
            let v = get_index(this, i as u64, context)?;
            if strict_equals(&v, search) {
                return Ok(i);
            }
        }
        i -= 1;
    }
    Ok(-1)
}

/// `includes`: uses `SameValueZero`, so `NaN` is findable (unlike `indexOf`).
pub fn includes(this: &JsValue, search: &JsValue, from: i64, context: &mut Context) -> JsResult<bool> {
    let len = array_like_length(this, context)? as i64;
    let mut i = if from < 0 { (len + from).max(0) } else { from };
    while i < len {
        let v = get_index(this, i as u64, context)?;
        if same_value_zero(&v, search) {
            return Ok(true);
        }
        i += 1;
    }
    Ok(false)
}

pub fn find(this: &JsValue, predicate: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<JsValue> {
    let len = array_like_length(this, context)?;
    require_callable(predicate, "find")?;
    for i in 0..len {
        let v = get_index(this, i, context)?;
        let matched = context.call(predicate, this_arg, &[v.clone(), JsValue::number(i as f64), this.clone()])?;
        if crate::value::to_boolean(&matched) {
            return Ok(v);
        }
    }
    Ok(JsValue::undefined())
}

pub fn find_index(this: &JsValue, predicate: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<i64> {
    let len = array_like_length(this, context)?;
    require_callable(predicate, "findIndex")?;
    for i in 0..len {
        let v = get_index(this, i, context)?;
        let matched = context.call(predicate, this_arg, &[v, JsValue::number(i as f64), this.clone()])?;
        if crate::value::to_boolean(&matched) {
            return Ok(i as i64);
        }
    }
    Ok(-1)
}

pub fn find_last(this: &JsValue, predicate: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<JsValue> {
    let len = array_like_length(this, context)?;
    require_callable(predicate, "findLast")?;
    let mut i = len;
    while i > 0 {
        i -= 1;
        let v = get_index(this, i, context)?;
        let matched = context.call(predicate, this_arg, &[v.clone(), JsValue::number(i as f64), this.clone()])?;
        if crate::value::to_boolean(&matched) {
            return Ok(v);
        }
    }
    Ok(JsValue::undefined())
}

pub fn find_last_index(this: &JsValue, predicate: &JsValue, this_arg: &JsValue, context: &mut Context) -> JsResult<i64> {
    let len = array_like_length(this, context)?;
    require_callable(predicate, "findLastIndex")?;
    let mut i = len;
    while i > 0 {
        i -= 1;
        let v = get_index(this, i, context)?;
        let matched = context.call(predicate, this_arg, &[v, JsValue::number(i as f64), this.clone()])?;
        if crate::value::to_boolean(&matched) {
            return Ok(i as i64);
        }
    }
    Ok(-1)
}

pub fn push(this: &JsValue, items: &[JsValue], context: &mut Context) -> JsResult<u64> {
    let mut len = array_like_length(this, context)?;
    for item in items {
        set_index(this, len, item.clone(), context)?;
        len += 1;
    }
    set_length_prop(this, len, context)?;
    Ok(len)
}

pub fn pop(this: &JsValue, context: &mut Context) -> JsResult<JsValue> {
    let len = array_like_length(this, context)?;
    if len == 0 {
        set_length_prop(this, 0, context)?;
        return Ok(JsValue::undefined());
    }
    let last = len - 1;
    let v = get_index(this, last, context)?;
    delete_at(this, last, context)?;
    set_length_prop(this, last, context)?;
    Ok(v)
}

pub fn shift(this: &JsValue, context: &mut Context) -> JsResult<JsValue> {
    let len = array_like_length(this, context)?;
    if len == 0 {
        set_length_prop(this, 0, context)?;
        return Ok(JsValue::undefined());
    }
    let first = get_index(this, 0, context)?;
    for i in 1..len {
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            set_index(this, i - 1, v, context)?;
        } else {
            delete_at(this, i - 1, context)?;
        }
    }
    delete_at(this, len - 1, context)?;
    set_length_prop(this, len - 1, context)?;
    Ok(first)
}

pub fn unshift(this: &JsValue, items: &[JsValue], context: &mut Context) -> JsResult<u64> {
    let len = array_like_length(this, context)?;
    let count = items.len() as u64;
    let mut i = len;
    while i > 0 {
        i -= 1;
        if has_index(this, i, context)? {
            let v = get_index(this, i, context)?;
            set_index(this, i + count, v, context)?;
        } else {
            delete_at(this, i + count, context)?;
        }
    }
    for (i, item) in items.iter().enumerate() {
        set_index(this, i as u64, item.clone(), context)?;
    }
    set_length_prop(this, len + count, context)?;
    Ok(len + count)
}

pub fn slice(this: &JsValue, start: i64, end: i64, context: &mut Context) -> JsResult<JsObject> {
    let len = array_like_length(this, context)? as i64;
    let start = clamp(start, len);
    let end = clamp(end, len);
    let proto = context.intrinsics().array_prototype();
    let result = new_array(Some(proto));
    let mut out = 0u32;
    let mut i = start;
    while i < end {
        if has_index(this, i as u64, context)? {
            let v = get_index(this, i as u64, context)?;
            if let ObjectKind::Array(a) = &mut result.borrow_mut().kind {
                a.set(out, v);
            }
        } else if let ObjectKind::Array(a) = &mut result.borrow_mut().kind {
            a.length = out + 1;
            a.holes.insert(out);
        }
        out += 1;
        i += 1;
    }
    Ok(result)
}

pub fn splice(
    this: &JsValue,
    start: i64,
    delete_count: u64,
    items: &[JsValue],
    context: &mut Context,
) -> JsResult<JsObject> {
    let len = array_like_length(this, context)? as i64;
    let start = clamp(start, len);
    let delete_count = delete_count.min((len - start) as u64);

    let proto = context.intrinsics().array_prototype();
    let removed = new_array(Some(proto));
    for k in 0..delete_count {
        let v = get_index(this, (start as u64) + k, context)?;
        if let ObjectKind::Array(a) = &mut removed.borrow_mut().kind {
            a.set(k as u32, v);
        }
    }

    let items_len = items.len() as i64;
    let shift = items_len - delete_count as i64;

    if shift < 0 {
        for k in (start as u64 + delete_count)..(len as u64) {
            if has_index(this, k, context)? {
                let v = get_index(this, k, context)?;
                set_index(this, (k as i64 + shift) as u64, v, context)?;
            } else {
                delete_at(this, (k as i64 + shift) as u64, context)?;
            }
        }
        for k in ((len + shift) as u64)..(len as u64) {
            delete_at(this, k, context)?;
        }
    } else if shift > 0 {
        let mut k = len as u64;
        while k > start as u64 + delete_count {
            k -= 1;
            if has_index(this, k, context)? {
                let v = get_index(this, k, context)?;
                set_index(this, (k as i64 + shift) as u64, v, context)?;
            } else {
                delete_at(this, (k as i64 + shift) as u64, context)?;
            }
        }
    }

    for (i, item) in items.iter().enumerate() {
        set_index(this, start as u64 + i as u64, item.clone(), context)?;
    }
    set_length_prop(this, (len + shift) as u64, context)?;
    Ok(removed)
}

pub fn reverse(this: &JsValue, context: &mut Context) -> JsResult<()> {
    let len = array_like_length(this, context)?;
    for i in 0..(len / 2) {
        let j = len - 1 - i;
        let a_has = has_index(this, i, context)?;
        let b_has = has_index(this, j, context)?;
        let a_val = if a_has { Some(get_index(this, i, context)?) } else { None };
        let b_val = if b_has { Some(get_index(this, j, context)?) } else { None };
        match (a_val, b_val) {
            (Some(a), Some(b)) => {
                set_index(this, i, b, context)?;
                set_index(this, j, a, context)?;
            }
            (Some(a), None) => {
                set_index(this, j, a, context)?;
                delete_at(this, i, context)?;
            }
            (None, Some(b)) => {
                set_index(this, i, b, context)?;
                delete_at(this, j, context)?;
            }
            (None, None) => {}
        }
    }
    Ok(())
}

pub fn fill(this: &JsValue, value: &JsValue, start: i64, end: i64, context: &mut Context) -> JsResult<()> {
    let len = array_like_length(this, context)? as i64;
    let start = clamp(start, len);
    let end = clamp(end, len);
    for i in start..end {
        set_index(this, i as u64, value.clone(), context)?;
    }
    Ok(())
}

/// `copyWithin` preserves hole-ness: copying from a hole deletes the
/// destination rather than writing `undefined` (§4.E.2).
pub fn copy_within(this: &JsValue, target: i64, start: i64, end: i64, context: &mut Context) -> JsResult<()> {
    let len = array_like_length(this, context)? as i64;
    let mut to = clamp(target, len);
    let mut from = clamp(start, len);
    let final_ = clamp(end, len);
    let count = (final_ - from).min(len - to);
    if count <= 0 {
        return Ok(());
    }
    let (range, step): (Vec<i64>, i64) = if from < to && to < from + count {
        ((0..count).rev().collect(), -1)
    } else {
        ((0..count).collect(), 1)
    };
    let _ = step;
    for k in range {
        let src = from + k;
        let dst = to + k;
        if has_index(this, src as u64, context)? {
            let v = get_index(this, src as u64, context)?;
            set_index(this, dst as u64, v, context)?;
        } else {
            delete_at(this, dst as u64, context)?;
        }
    }
    let _ = &mut to;
    let _ = &mut from;
    Ok(())
}

pub fn at(this: &JsValue, index: i64, context: &mut Context) -> JsResult<JsValue> {
    let len = array_like_length(this, context)? as i64;
    let i = if index < 0 { len + index } else { index };
    if i < 0 || i >= len {
        return Ok(JsValue::undefined());
    }
    get_index(this, i as u64, context)
}

/// `sort`: lexicographic string order with no comparator; otherwise the
/// comparator decides (non-numeric returns are coerced; `NaN` means
/// "equal", matching `Array.prototype.sort`'s tolerant comparator
/// contract).
pub fn sort(this: &JsValue, comparator: Option<&JsValue>, context: &mut Context) -> JsResult<()> {
    let len = array_like_length(this, context)?;
    let mut present = Vec::new();
    let mut hole_count = 0u64;
    for i in 0..len {
        if has_index(this, i, context)? {
            present.push(get_index(this, i, context)?);
        } else {
            hole_count += 1;
        }
    }

    if let Some(cmp) = comparator {
        require_callable(cmp, "sort")?;
        // A simple, allocation-light insertion-merge via sort_by, tolerating
        // a fallible comparator by surfacing the first error encountered.
        let mut error = None;
        present.sort_by(|a, b| {
            if error.is_some() {
                return std::cmp::Ordering::Equal;
            }
            match context.call(cmp, &JsValue::undefined(), &[a.clone(), b.clone()]) {
                Ok(result) => {
                    let n = result.as_number().unwrap_or(0.0);
                    if n.is_nan() || n == 0.0 {
                        std::cmp::Ordering::Equal
                    } else if n < 0.0 {
                        std::cmp::Ordering::Less
                    } else {
                        std::cmp::Ordering::Greater
                    }
                }
                Err(e) => {
                    error = Some(e);
                    std::cmp::Ordering::Equal
                }
            }
        });
        if let Some(e) = error {
            return Err(e);
        }
    } else {
        let mut strings: Vec<(String, JsValue)> = Vec::with_capacity(present.len());
        for v in present {
            strings.push((crate::value::to_string(&v, context)?.to_string(), v));
        }
        strings.sort_by(|a, b| a.0.cmp(&b.0));
        present = strings.into_iter().map(|(_, v)| v).collect();
    }

    for (i, v) in present.iter().enumerate() {
        set_index(this, i as u64, v.clone(), context)?;
    }
    for i in present.len() as u64..len {
        delete_at(this, i, context)?;
    }
    Ok(())
}

pub fn concat_spread(this: &JsValue, items: &[JsValue], context: &mut Context) -> JsResult<JsObject> {
    let proto = context.intrinsics().array_prototype();
    let result = new_array(Some(proto));
    let mut out = 0u64;
    let mut push_one = |value: &JsValue, out: &mut u64, context: &mut Context| -> JsResult<()> {
        if is_concat_spreadable(value, context)? {
            let len = array_like_length(value, context)?;
            for i in 0..len {
                if has_index(value, i, context)? {
                    let v = get_index(value, i, context)?;
                    set_index(&JsValue::object(result.clone()), *out, v, context)?;
                }
                *out += 1;
            }
        } else {
            set_index(&JsValue::object(result.clone()), *out, value.clone(), context)?;
            *out += 1;
        }
        Ok(())
    };
    push_one(this, &mut out, context)?;
    for item in items {
        push_one(item, &mut out, context)?;
    }
    set_length_prop(&JsValue::object(result.clone()), out, context)?;
    Ok(result)
}

fn is_concat_spreadable(value: &JsValue, context: &mut Context) -> JsResult<bool> {
    let Some(obj) = value.as_object() else {
        return Ok(false);
    };
    let key = PropertyKey::Symbol(context.well_known_symbols().is_concat_spreadable.clone());
    let marker = internal_methods::get(obj, &key, value, context)?;
    if !marker.is_undefined() {
        return Ok(crate::value::to_boolean(&marker));
    }
    Ok(matches!(obj.borrow().kind, ObjectKind::Array(_)))
}

pub fn entries_keys_values(
    this: &JsValue,
    context: &mut Context,
) -> JsResult<Vec<(u64, JsValue)>> {
    let len = array_like_length(this, context)?;
    let mut out = Vec::with_capacity(len as usize);
    for i in 0..len {
        let v = if has_index(this, i, context)? {
            get_index(this, i, context)?
        } else {
            JsValue::undefined()
        };
        out.push((i, v));
    }
    Ok(out)
}

fn clamp(i: i64, len: i64) -> i64 {
    if i < 0 {
        (len + i).max(0)
    } else {
        i.min(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn fresh_array(context: &mut Context, values: &[JsValue]) -> JsValue {
        let obj = new_array(Some(context.intrinsics().array_prototype()));
        for (i, v) in values.iter().enumerate() {
            if let ObjectKind::Array(a) = &mut obj.borrow_mut().kind {
                a.set(i as u32, v.clone());
            }
        }
        JsValue::object(obj)
    }

    #[test]
    fn sparse_hole_preserved_through_map() {
        let mut context = Context::default();
        let obj = new_array(Some(context.intrinsics().array_prototype()));
        if let ObjectKind::Array(a) = &mut obj.borrow_mut().kind {
            a.set(0, JsValue::number(1.0));
            a.length = 3; // index 1 is a hole, index 2 absent too but length 3
            a.set(2, JsValue::number(3.0));
        }
        let this = JsValue::object(obj.clone());
        let doubler = context.intrinsics().test_doubler();
        let mapped = map(&this, &doubler, &JsValue::undefined(), &mut context).unwrap();
        assert_eq!(
            match &mapped.borrow().kind {
                ObjectKind::Array(a) => a.length(),
                _ => unreachable!(),
            },
            3
        );
        assert!(fast_has(&mapped, 0));
        assert!(!fast_has(&mapped, 1));
        assert!(fast_has(&mapped, 2));
        assert_eq!(fast_get(&mapped, 0), Some(JsValue::number(2.0)));
        assert_eq!(fast_get(&mapped, 2), Some(JsValue::number(6.0)));
    }

    #[test]
    fn length_truncation_stops_at_non_configurable() {
        let mut context = Context::default();
        let this = fresh_array(
            &mut context,
            &[JsValue::number(1.0), JsValue::number(2.0), JsValue::number(3.0)],
        );
        let obj = this.as_object().unwrap().clone();
        obj.insert_property(
            PropertyKey::Index(2),
            PropertyDescriptor::data(JsValue::number(3.0), Attribute::NONE),
        );
        set_length_prop(&this, 0, &mut context).unwrap();
        let len = array_like_length(&this, &mut context).unwrap();
        assert_eq!(len, 3);
        // The walk from the top down hits the non-configurable index 2
        // immediately and stops there, so nothing below it is ever deleted.
        assert!(has_index(&this, 0, &mut context).unwrap());
        assert!(has_index(&this, 1, &mut context).unwrap());
        assert!(has_index(&this, 2, &mut context).unwrap());
    }

    #[test]
    fn own_keys_sees_fast_path_elements_as_enumerable() {
        let mut context = Context::default();
        let this = fresh_array(
            &mut context,
            &[JsValue::number(1.0), JsValue::number(2.0)],
        );
        let obj = this.as_object().unwrap().clone();
        let keys = internal_methods::own_keys(
            &obj,
            internal_methods::OwnKeysFilter {
                strings: true,
                symbols: false,
                only_enumerable: true,
            },
        );
        assert_eq!(keys, vec![PropertyKey::Index(0), PropertyKey::Index(1)]);
    }
}
