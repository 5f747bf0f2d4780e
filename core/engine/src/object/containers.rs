//! Component G: `Map`, `Set`, `WeakMap`, `WeakSet` (§7).
//!
//! `Map`/`Set` keep insertion order and dedup by `SameValueZero`. Deleted
//! entries leave a tombstone so that an iterator already in flight doesn't
//! see indices shift under it, matching the spec's "an iterator reflects
//! later insertions but not a key's removal mid-iteration" contract.
//!
//! `WeakMap`/`WeakSet` key on an object's identity but, since this crate's
//! allocator (`ecma_gc`) is a plain refcounting scheme with no finalization
//! hook, entries here are held by a strong reference rather than truly
//! vanishing once the key becomes unreachable elsewhere. Observable
//! behavior (`get`/`has`/`delete`/no enumeration) matches the spec; GC-timing
//! -dependent disappearance does not, which is consistent with the scheme's
//! accepted trade-off.

use crate::value::JsValue;
use crate::object::JsObject;
use std::collections::HashMap;

#[derive(Default)]
pub struct MapData {
    entries: Vec<Option<(JsValue, JsValue)>>,
}

impl MapData {
    pub fn new() -> Self {
        MapData::default()
    }

    fn find(&self, key: &JsValue) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Some((k, _)) if crate::value::same_value_zero(k, key)))
    }

    pub fn get(&self, key: &JsValue) -> Option<JsValue> {
        self.find(key).and_then(|i| self.entries[i].as_ref()).map(|(_, v)| v.clone())
    }

    pub fn has(&self, key: &JsValue) -> bool {
        self.find(key).is_some()
    }

    pub fn set(&mut self, key: JsValue, value: JsValue) {
        if let Some(i) = self.find(&key) {
            self.entries[i] = Some((key, value));
        } else {
            self.entries.push(Some((key, value)));
        }
    }

    pub fn delete(&mut self, key: &JsValue) -> bool {
        match self.find(key) {
            Some(i) => {
                self.entries[i] = None;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn size(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn entries(&self) -> impl Iterator<Item = &(JsValue, JsValue)> {
        self.entries.iter().filter_map(Option::as_ref)
    }
}

#[derive(Default)]
pub struct SetData {
    values: Vec<Option<JsValue>>,
}

impl SetData {
    pub fn new() -> Self {
        SetData::default()
    }

    fn find(&self, value: &JsValue) -> Option<usize> {
        self.values
            .iter()
            .position(|v| matches!(v, Some(existing) if crate::value::same_value_zero(existing, value)))
    }

    pub fn has(&self, value: &JsValue) -> bool {
        self.find(value).is_some()
    }

    pub fn add(&mut self, value: JsValue) {
        if self.find(&value).is_none() {
            self.values.push(Some(value));
        }
    }

    pub fn delete(&mut self, value: &JsValue) -> bool {
        match self.find(value) {
            Some(i) => {
                self.values[i] = None;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn size(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn values(&self) -> impl Iterator<Item = &JsValue> {
        self.values.iter().filter_map(Option::as_ref)
    }
}

#[derive(Default)]
pub struct WeakMapData {
    entries: HashMap<usize, (JsObject, JsValue)>,
}

impl WeakMapData {
    pub fn new() -> Self {
        WeakMapData::default()
    }

    pub fn get(&self, key: &JsObject) -> Option<JsValue> {
        self.entries.get(&key.identity()).map(|(_, v)| v.clone())
    }

    pub fn has(&self, key: &JsObject) -> bool {
        self.entries.contains_key(&key.identity())
    }

    pub fn set(&mut self, key: JsObject, value: JsValue) {
        self.entries.insert(key.identity(), (key, value));
    }

    pub fn delete(&mut self, key: &JsObject) -> bool {
        self.entries.remove(&key.identity()).is_some()
    }
}

#[derive(Default)]
pub struct WeakSetData {
    values: HashMap<usize, JsObject>,
}

impl WeakSetData {
    pub fn new() -> Self {
        WeakSetData::default()
    }

    pub fn has(&self, value: &JsObject) -> bool {
        self.values.contains_key(&value.identity())
    }

    pub fn add(&mut self, value: JsObject) {
        self.values.insert(value.identity(), value);
    }

    pub fn delete(&mut self, value: &JsObject) -> bool {
        self.values.remove(&value.identity()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_dedups_by_same_value_zero() {
        let mut map = MapData::new();
        map.set(JsValue::number(f64::NAN), JsValue::number(1.0));
        map.set(JsValue::number(f64::NAN), JsValue::number(2.0));
        assert_eq!(map.size(), 1);
        assert_eq!(map.get(&JsValue::number(f64::NAN)), Some(JsValue::number(2.0)));
    }

    #[test]
    fn set_tracks_insertion_order_through_deletes() {
        let mut set = SetData::new();
        set.add(JsValue::number(1.0));
        set.add(JsValue::number(2.0));
        set.add(JsValue::number(3.0));
        set.delete(&JsValue::number(2.0));
        let remaining: Vec<_> = set.values().cloned().collect();
        assert_eq!(remaining, vec![JsValue::number(1.0), JsValue::number(3.0)]);
    }
}
