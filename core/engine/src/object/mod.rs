//! Components C–G: the object model itself.
//!
//! An object is represented as a uniform "descriptor table + kind-specific
//! payload" substrate (§9's "exotic variant dispatch" design note): every
//! [`JsObject`] carries the same prototype/property-table/extensible
//! machinery, and the [`ObjectKind`] discriminant carries whatever extra
//! state a particular kind of exotic object needs (array storage, typed
//! array byte view, promise reactions, ...). Fundamental operations are
//! ordinary by default; [`internal_methods`] dispatches to a kind-specific
//! override only for the handful of kinds that need one.

pub mod array;
pub mod array_buffer;
pub(crate) mod byte_order;
pub mod containers;
pub mod data_view;
pub mod function;
pub mod internal_methods;
pub mod misc;
pub mod promise;
pub mod proxy;
pub mod typed_array;

use crate::property::{Attribute, PartialDescriptor, PropertyDescriptor, PropertyKey};
use crate::value::JsValue;
use ecma_gc::{Gc, GcRefCell};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;

pub(crate) type PropertyMap = IndexMap<PropertyKey, PropertyDescriptor, FxBuildHasher>;

/// The kind-specific payload of an object, plus the uniform substrate every
/// kind shares (prototype, property table, extensibility).
pub struct ObjectData {
    pub prototype: Option<JsObject>,
    pub properties: PropertyMap,
    pub extensible: bool,
    pub kind: ObjectKind,
}

/// The object-kind discriminator of §3's data model.
pub enum ObjectKind {
    Ordinary,
    Array(array::ArrayData),
    Function(function::FunctionData),
    Class(function::ClassData),
    Arguments(misc::ArgumentsData),
    BooleanWrapper(bool),
    NumberWrapper(f64),
    StringWrapper(crate::string::JsString),
    BigIntWrapper(crate::bigint::JsBigInt),
    SymbolWrapper(crate::symbol::JsSymbol),
    Map(containers::MapData),
    Set(containers::SetData),
    WeakMap(containers::WeakMapData),
    WeakSet(containers::WeakSetData),
    Promise(promise::PromiseData),
    ArrayBuffer(array_buffer::ArrayBufferData),
    TypedArray(typed_array::TypedArrayData),
    DataView(data_view::DataViewData),
    Proxy(proxy::ProxyData),
    RegExp(misc::RegExpData),
    Date(misc::DateData),
    Error(misc::ErrorData),
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Ordinary => "Object",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::Class(_) => "Function",
            ObjectKind::Arguments(_) => "Arguments",
            ObjectKind::BooleanWrapper(_) => "Boolean",
            ObjectKind::NumberWrapper(_) => "Number",
            ObjectKind::StringWrapper(_) => "String",
            ObjectKind::BigIntWrapper(_) => "BigInt",
            ObjectKind::SymbolWrapper(_) => "Symbol",
            ObjectKind::Map(_) => "Map",
            ObjectKind::Set(_) => "Set",
            ObjectKind::WeakMap(_) => "WeakMap",
            ObjectKind::WeakSet(_) => "WeakSet",
            ObjectKind::Promise(_) => "Promise",
            ObjectKind::ArrayBuffer(_) => "ArrayBuffer",
            ObjectKind::TypedArray(ta) => ta.kind.constructor_name(),
            ObjectKind::DataView(_) => "DataView",
            ObjectKind::Proxy(_) => "Proxy",
            ObjectKind::RegExp(_) => "RegExp",
            ObjectKind::Date(_) => "Date",
            ObjectKind::Error(_) => "Error",
        }
    }
}

/// A shared handle to an object. Cloning yields another handle to the same
/// allocation — there is no exclusive owner of an object anywhere in the
/// runtime (§3).
#[derive(Clone)]
pub struct JsObject(Gc<GcRefCell<ObjectData>>);

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsObject({})", self.borrow().kind.name())
    }
}

impl PartialEq for JsObject {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}
impl Eq for JsObject {}

impl std::hash::Hash for JsObject {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Gc::as_ptr_usize(&self.0).hash(state);
    }
}

impl JsObject {
    pub fn from_data(prototype: Option<JsObject>, kind: ObjectKind) -> Self {
        JsObject(Gc::new(GcRefCell::new(ObjectData {
            prototype,
            properties: PropertyMap::default(),
            extensible: true,
            kind,
        })))
    }

    pub fn ordinary(prototype: Option<JsObject>) -> Self {
        Self::from_data(prototype, ObjectKind::Ordinary)
    }

    pub fn borrow(&self) -> std::cell::Ref<'_, ObjectData> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, ObjectData> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Gc::ptr_eq(&a.0, &b.0)
    }

    /// A stable integer identity, used for Map/Set/WeakMap identity hashing
    /// and the accessor-reentrancy guard's key.
    pub fn identity(&self) -> usize {
        Gc::as_ptr_usize(&self.0)
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self.borrow().kind,
            ObjectKind::Function(_) | ObjectKind::Class(_)
        )
    }

    pub fn is_constructor(&self) -> bool {
        match &self.borrow().kind {
            ObjectKind::Function(f) => f.is_constructor(),
            ObjectKind::Class(_) => true,
            _ => false,
        }
    }

    pub fn is_extensible(&self) -> bool {
        self.borrow().extensible
    }

    pub fn prevent_extensions(&self) {
        self.borrow_mut().extensible = false;
    }

    pub fn prototype(&self) -> Option<JsObject> {
        self.borrow().prototype.clone()
    }

    /// `[[SetPrototypeOf]]`: refuses to install a prototype whose chain
    /// would revisit `self`, per §9's cycle-safety rule.
    pub fn set_prototype(&self, proto: Option<JsObject>) -> bool {
        if let Some(p) = &proto {
            let mut cur = Some(p.clone());
            while let Some(o) = cur {
                if JsObject::ptr_eq(&o, self) {
                    return false;
                }
                cur = o.prototype();
            }
        }
        self.borrow_mut().prototype = proto;
        true
    }

    /// A plain, own-table lookup, bypassing any exotic `[[GetOwnProperty]]`
    /// override. Exotic kinds call this for the "consult the descriptor
    /// table" half of their own override.
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.borrow().properties.get(key).cloned()
    }

    /// A raw table insert, bypassing ValidateAndApplyPropertyDescriptor.
    /// Used internally by constructors installing known-fresh properties
    /// (e.g. wiring up `length`/`name` on a fresh function object).
    pub fn insert_property(&self, key: impl Into<PropertyKey>, desc: PropertyDescriptor) {
        self.borrow_mut().properties.insert(key.into(), desc);
    }

    pub fn insert_data(
        &self,
        key: impl Into<PropertyKey>,
        value: impl Into<JsValue>,
        attrs: Attribute,
    ) {
        self.insert_property(key, PropertyDescriptor::data(value.into(), attrs));
    }

    pub fn remove_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.borrow_mut().properties.shift_remove(key)
    }

    /// Raw own-key listing in table-insertion order (no index-vs-string
    /// reordering). [`internal_methods::own_keys`] applies the §4.C
    /// ordering rule on top of this.
    pub fn raw_keys(&self) -> Vec<PropertyKey> {
        self.borrow().properties.keys().cloned().collect()
    }

    #[must_use]
    pub fn define_own_property_raw(
        &self,
        key: PropertyKey,
        partial: PartialDescriptor,
    ) -> Result<(), ()> {
        let current = self.get_own_property(&key);
        self.define_own_property_raw_with_current(key, partial, current)
    }

    /// As [`Self::define_own_property_raw`], but against a caller-supplied
    /// "current descriptor" rather than one looked up from the table —
    /// needed by array `[[DefineOwnProperty]]`, where an index may already
    /// hold a value in fast storage without a table entry to match it.
    #[must_use]
    pub fn define_own_property_raw_with_current(
        &self,
        key: PropertyKey,
        partial: PartialDescriptor,
        current: Option<PropertyDescriptor>,
    ) -> Result<(), ()> {
        let new_desc = partial.validate_and_apply(current.as_ref())?;
        self.insert_property(key, new_desc);
        Ok(())
    }
}
