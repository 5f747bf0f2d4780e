//! Component B: the property descriptor store.
//!
//! `PropertyKey` and `PropertyDescriptor` are the vocabulary every other
//! component builds on; `DefineOwn`'s ValidateAndApplyPropertyDescriptor
//! algorithm lives on [`PropertyDescriptor`] itself since it never needs
//! anything beyond the old and new descriptor.

use crate::string::JsString;
use crate::symbol::JsSymbol;
use crate::value::JsValue;
use bitflags::bitflags;

/// The maximum array index plus one; see §4.E.
pub const MAX_SAFE_ARRAY_LENGTH: u32 = u32::MAX;

/// A property key: an integer array index, a string, or a symbol.
///
/// Integer-index keys are kept distinct from general strings (rather than
/// re-parsed from a string every lookup) because §4.C's `OwnKeys` ordering
/// and §4.E's array fast path both need to recognize them cheaply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(u32),
    String(JsString),
    Symbol(JsSymbol),
}

impl PropertyKey {
    /// `ToPropertyKey` applied to a plain Rust string: recognizes canonical
    /// array-index spellings (`"0"`, `"4294967294"`, no leading zeros other
    /// than `"0"` itself, no sign) and keeps everything else as a string.
    pub fn from_str(s: &str) -> Self {
        if let Some(index) = canonical_array_index(s) {
            PropertyKey::Index(index)
        } else {
            PropertyKey::String(JsString::from(s))
        }
    }

    pub fn as_index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// A display form usable for diagnostics and `for-in`/`Reflect.ownKeys`
    /// string coercion; symbols display as `Symbol(desc)`.
    pub fn to_display_string(&self) -> String {
        match self {
            PropertyKey::Index(i) => i.to_string(),
            PropertyKey::String(s) => s.to_string(),
            PropertyKey::Symbol(s) => s.to_string(),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::from_str(s)
    }
}
impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        PropertyKey::from_str(s.as_str())
    }
}
impl From<JsSymbol> for PropertyKey {
    fn from(s: JsSymbol) -> Self {
        PropertyKey::Symbol(s)
    }
}
impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        PropertyKey::Index(i)
    }
}

/// `i < 2^32 - 1` and `i`'s canonical decimal string is exactly `s` (no
/// leading zeros, no sign, "0" is valid).
fn canonical_array_index(s: &str) -> Option<u32> {
    if s == "0" {
        return Some(0);
    }
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u64 = s.parse().ok()?;
    if n < u64::from(u32::MAX) && n.to_string() == s {
        Some(n as u32)
    } else {
        None
    }
}

bitflags! {
    /// Data/accessor-descriptor attribute flags. Splitting these from the
    /// `value`/`get`/`set` payload lets [`PropertyDescriptor`] share one
    /// attribute representation across both descriptor kinds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attribute: u8 {
        const WRITABLE     = 0b0000_0001;
        const ENUMERABLE   = 0b0000_0010;
        const CONFIGURABLE = 0b0000_0100;
    }
}

impl Attribute {
    pub const NONE: Attribute = Attribute::empty();
    pub const ALL: Attribute = Attribute::WRITABLE
        .union(Attribute::ENUMERABLE)
        .union(Attribute::CONFIGURABLE);

    pub fn writable(self) -> bool {
        self.contains(Attribute::WRITABLE)
    }
    pub fn enumerable(self) -> bool {
        self.contains(Attribute::ENUMERABLE)
    }
    pub fn configurable(self) -> bool {
        self.contains(Attribute::CONFIGURABLE)
    }
}

/// Either half of a descriptor's computed value: a plain data value, or a
/// getter/setter pair (either of which may be absent).
#[derive(Debug, Clone)]
pub enum PropertyKind {
    Data(JsValue),
    Accessor {
        get: Option<JsValue>,
        set: Option<JsValue>,
    },
}

/// A full property descriptor, as stored in an object's property table.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub kind: PropertyKind,
    pub attributes: Attribute,
}

impl PropertyDescriptor {
    pub fn data(value: JsValue, attributes: Attribute) -> Self {
        PropertyDescriptor {
            kind: PropertyKind::Data(value),
            attributes,
        }
    }

    pub fn accessor(get: Option<JsValue>, set: Option<JsValue>, attributes: Attribute) -> Self {
        PropertyDescriptor {
            kind: PropertyKind::Accessor { get, set },
            attributes,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self.kind, PropertyKind::Data(_))
    }
    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, PropertyKind::Accessor { .. })
    }

    pub fn value(&self) -> Option<&JsValue> {
        match &self.kind {
            PropertyKind::Data(v) => Some(v),
            PropertyKind::Accessor { .. } => None,
        }
    }

    pub fn getter(&self) -> Option<&JsValue> {
        match &self.kind {
            PropertyKind::Accessor { get, .. } => get.as_ref(),
            PropertyKind::Data(_) => None,
        }
    }

    pub fn setter(&self) -> Option<&JsValue> {
        match &self.kind {
            PropertyKind::Accessor { set, .. } => set.as_ref(),
            PropertyKind::Data(_) => None,
        }
    }

    pub fn writable(&self) -> bool {
        self.attributes.writable()
    }
    pub fn enumerable(&self) -> bool {
        self.attributes.enumerable()
    }
    pub fn configurable(&self) -> bool {
        self.attributes.configurable()
    }
}

/// A partial descriptor as given to `Object.defineProperty`: every field is
/// optional so the implementation can tell `{configurable: true}` apart
/// from `{value: undefined, configurable: true}`, per §3's invariant note.
#[derive(Debug, Clone, Default)]
pub struct PartialDescriptor {
    pub value: Option<JsValue>,
    pub get: Option<Option<JsValue>>,
    pub set: Option<Option<JsValue>>,
    pub writable: Option<bool>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PartialDescriptor {
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    /// ValidateAndApplyPropertyDescriptor (ECMA-262 10.1.6.3), specialized to
    /// the "ordinary object" case (no parent-record `extensible` check here;
    /// callers gate that separately since non-extensible + new-key is a
    /// different failure than a frozen existing key).
    ///
    /// Returns `Ok(new_descriptor)` on success, `Err(())` if the change is
    /// rejected; the caller (strict-mode aware) decides whether rejection
    /// throws or is silently ignored.
    pub fn validate_and_apply(
        self,
        current: Option<&PropertyDescriptor>,
    ) -> Result<PropertyDescriptor, ()> {
        let Some(current) = current else {
            // No existing property: accept, filling in defaults (§3: a
            // brand-new property gets whichever attributes were specified,
            // false/undefined otherwise).
            return Ok(self.into_fresh_descriptor());
        };

        if !current.configurable() {
            // Non-configurable: only a handful of changes are legal.
            if self.configurable == Some(true) {
                return Err(());
            }
            if let Some(enumerable) = self.enumerable {
                if enumerable != current.enumerable() {
                    return Err(());
                }
            }
            if self.is_generic_descriptor() {
                // no-op redefinition, always fine once the above passed
            } else if self.is_data_descriptor() != current.is_data() {
                return Err(());
            } else if current.is_data() {
                if !current.writable() {
                    if self.writable == Some(true) {
                        return Err(());
                    }
                    if let Some(v) = &self.value {
                        if !same_value(v, current.value().unwrap()) {
                            return Err(());
                        }
                    }
                }
            } else {
                // accessor: getter/setter may not change at all
                if let Some(get) = &self.get {
                    if !same_optional_value(get.as_ref(), current.getter()) {
                        return Err(());
                    }
                }
                if let Some(set) = &self.set {
                    if !same_optional_value(set.as_ref(), current.setter()) {
                        return Err(());
                    }
                }
            }
        }

        Ok(self.merge_onto(current))
    }

    fn into_fresh_descriptor(self) -> PropertyDescriptor {
        let mut attrs = Attribute::NONE;
        if self.writable == Some(true) {
            attrs |= Attribute::WRITABLE;
        }
        if self.enumerable == Some(true) {
            attrs |= Attribute::ENUMERABLE;
        }
        if self.configurable == Some(true) {
            attrs |= Attribute::CONFIGURABLE;
        }
        if self.is_accessor_descriptor() {
            PropertyDescriptor::accessor(
                self.get.unwrap_or(None),
                self.set.unwrap_or(None),
                attrs,
            )
        } else {
            PropertyDescriptor::data(self.value.unwrap_or(JsValue::undefined()), attrs)
        }
    }

    fn merge_onto(self, current: &PropertyDescriptor) -> PropertyDescriptor {
        let mut attrs = current.attributes;
        if let Some(w) = self.writable {
            attrs.set(Attribute::WRITABLE, w);
        }
        if let Some(e) = self.enumerable {
            attrs.set(Attribute::ENUMERABLE, e);
        }
        if let Some(c) = self.configurable {
            attrs.set(Attribute::CONFIGURABLE, c);
        }

        if self.is_accessor_descriptor() {
            let get = self.get.unwrap_or_else(|| current.getter().cloned());
            let set = self.set.unwrap_or_else(|| current.setter().cloned());
            PropertyDescriptor::accessor(get, set, attrs)
        } else if self.is_data_descriptor() || current.is_data() {
            let value = self
                .value
                .unwrap_or_else(|| current.value().cloned().unwrap_or_else(JsValue::undefined));
            PropertyDescriptor::data(value, attrs)
        } else {
            // generic descriptor applied on top of an accessor: keep kind
            PropertyDescriptor::accessor(current.getter().cloned(), current.setter().cloned(), attrs)
        }
    }
}

fn same_optional_value(a: Option<&JsValue>, b: Option<&JsValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => same_value(a, b),
        _ => false,
    }
}

fn same_value(a: &JsValue, b: &JsValue) -> bool {
    crate::value::same_value(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_index_canonicalization() {
        assert_eq!(canonical_array_index("0"), Some(0));
        assert_eq!(canonical_array_index("10"), Some(10));
        assert_eq!(canonical_array_index("01"), None);
        assert_eq!(canonical_array_index("-1"), None);
        assert_eq!(canonical_array_index(""), None);
        assert_eq!(canonical_array_index("4294967295"), None); // 2^32-1 is not a valid index
    }

    #[test]
    fn non_configurable_writable_may_only_go_false() {
        let current = PropertyDescriptor::data(JsValue::number(1.0), Attribute::WRITABLE);
        let attempt = PartialDescriptor {
            writable: Some(true),
            ..Default::default()
        };
        // current is configurable (only WRITABLE set, not CONFIGURABLE) -> irrelevant path;
        // re-test with non-configurable current:
        let frozen = PropertyDescriptor::data(JsValue::number(1.0), Attribute::NONE);
        let attempt2 = PartialDescriptor {
            writable: Some(true),
            ..Default::default()
        };
        assert!(attempt2.validate_and_apply(Some(&frozen)).is_err());
        assert!(PartialDescriptor {
            configurable: Some(true),
            ..Default::default()
        }
        .validate_and_apply(Some(&current))
        .is_ok());
    }

    #[test]
    fn non_configurable_rejects_configurable_true() {
        let frozen = PropertyDescriptor::data(JsValue::number(1.0), Attribute::NONE);
        let attempt = PartialDescriptor {
            configurable: Some(true),
            ..Default::default()
        };
        assert!(attempt.validate_and_apply(Some(&frozen)).is_err());
    }
}
