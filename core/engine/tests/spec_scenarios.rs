//! End-to-end scenarios exercising the value/object runtime through the
//! public `Context`/`internal_methods` surface rather than a single
//! module's unit tests. Each function corresponds to one scenario named
//! after the behavior it demonstrates.

use ecma_engine::object::array::{fast_get, fast_has, map, new_array};
use ecma_engine::object::array_buffer::new_array_buffer;
use ecma_engine::object::function::FunctionData;
use ecma_engine::object::internal_methods;
use ecma_engine::object::proxy::new_proxy;
use ecma_engine::object::typed_array::{get_index, new_typed_array, set_index, TypedArrayKind};
use ecma_engine::object::{JsObject, ObjectKind};
use ecma_engine::property::{Attribute, PartialDescriptor, PropertyDescriptor, PropertyKey};
use ecma_engine::value::JsValue;
use ecma_engine::Context;
use std::cell::RefCell;
use std::rc::Rc;

fn native_fn(
    name: &str,
    len: u32,
    f: impl Fn(&JsValue, &[JsValue], &mut Context) -> ecma_engine::JsResult<JsValue> + 'static,
) -> JsObject {
    JsObject::from_data(
        None,
        ObjectKind::Function(FunctionData::native(name, len, Rc::new(f))),
    )
}

fn set_array_index(arr: &JsObject, index: u32, value: f64, context: &mut Context) {
    let receiver = JsValue::object(arr.clone());
    internal_methods::set(arr, PropertyKey::Index(index), JsValue::number(value), &receiver, true, context)
        .expect("setting an array index should succeed");
}

fn set_array_length(arr: &JsObject, n: u32, context: &mut Context) {
    let receiver = JsValue::object(arr.clone());
    internal_methods::set(
        arr,
        PropertyKey::from_str("length"),
        JsValue::number(f64::from(n)),
        &receiver,
        true,
        context,
    )
    .expect("setting array length should succeed");
}

fn current_length(arr: &JsObject) -> u32 {
    match &arr.borrow().kind {
        ObjectKind::Array(a) => a.length(),
        _ => panic!("not an array"),
    }
}

#[test]
fn sparse_array_hole_preservation() {
    let mut cx = Context::default();
    let arr = new_array(Some(cx.intrinsics().array_prototype()));
    set_array_index(&arr, 0, 1.0, &mut cx);
    set_array_index(&arr, 2, 3.0, &mut cx);

    let doubler = native_fn("double", 1, |_this, args, _cx| {
        Ok(JsValue::number(args[0].as_number().unwrap_or(0.0) * 2.0))
    });

    let mapped = map(&JsValue::object(arr.clone()), &JsValue::object(doubler), &JsValue::undefined(), &mut cx)
        .expect("map should succeed on a sparse array");

    assert_eq!(current_length(&mapped), 3);
    assert!(fast_has(&mapped, 0));
    assert!(!fast_has(&mapped, 1), "index 1 stays a hole");
    assert!(fast_has(&mapped, 2));
    assert_eq!(fast_get(&mapped, 0).unwrap().as_number(), Some(2.0));
    assert_eq!(fast_get(&mapped, 2).unwrap().as_number(), Some(6.0));
}

#[test]
fn array_length_truncation_stops_at_non_configurable_element() {
    let mut cx = Context::default();
    let arr = new_array(Some(cx.intrinsics().array_prototype()));
    for (i, v) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
        set_array_index(&arr, i as u32, v, &mut cx);
    }

    // `Object.defineProperty(a, '2', {configurable:false, value:3})`: the
    // walk down from the top deletes indices 4 and 3, then hits index 2
    // and stops, so the final length is 3 and 0/1/2 survive.
    let partial = PartialDescriptor {
        value: Some(JsValue::number(3.0)),
        configurable: Some(false),
        ..Default::default()
    };
    internal_methods::define_own_property(&arr, PropertyKey::Index(2), partial, true)
        .expect("defineProperty on index 2 should succeed");

    set_array_length(&arr, 0, &mut cx);

    assert_eq!(current_length(&arr), 3, "truncation stopped at the non-configurable index");
    assert!(!fast_has(&arr, 3));
    assert!(!fast_has(&arr, 4));
    assert!(fast_has(&arr, 0));
    assert!(fast_has(&arr, 1));
    assert!(arr.get_own_property(&PropertyKey::Index(2)).is_some());
}

#[test]
fn promise_then_reactions_settle_in_scheduling_order() {
    let mut cx = Context::default();
    let order = Rc::new(RefCell::new(Vec::<&'static str>::new()));

    let p1 = ecma_engine::object::promise::promise_resolve(JsValue::undefined(), &mut cx);
    let o1 = order.clone();
    let cb_a = native_fn("a", 0, move |_this, _args, _cx| {
        o1.borrow_mut().push("a");
        Ok(JsValue::undefined())
    });
    ecma_engine::object::promise::then(&p1, Some(JsValue::object(cb_a)), None, &mut cx);

    let p2 = ecma_engine::object::promise::promise_resolve(JsValue::undefined(), &mut cx);
    let o2 = order.clone();
    let cb_b = native_fn("b", 0, move |_this, _args, _cx| {
        o2.borrow_mut().push("b");
        Ok(JsValue::undefined())
    });
    let o3 = order.clone();
    let cb_c = native_fn("c", 0, move |_this, _args, _cx| {
        o3.borrow_mut().push("c");
        Ok(JsValue::undefined())
    });
    let chained = ecma_engine::object::promise::then(&p2, Some(JsValue::object(cb_b)), None, &mut cx);
    ecma_engine::object::promise::then(&chained, Some(JsValue::object(cb_c)), None, &mut cx);

    order.borrow_mut().push("sync");
    cx.run_jobs();

    assert_eq!(*order.borrow(), vec!["sync", "a", "b", "c"]);
}

#[test]
fn getter_cycle_breaker_returns_undefined_instead_of_overflowing() {
    let mut cx = Context::default();
    let o = JsObject::ordinary(None);
    let key = PropertyKey::from_str("x");

    let o_captured = o.clone();
    let key_captured = key.clone();
    let getter = native_fn("get x", 0, move |this, _args, cx| {
        internal_methods::get(&o_captured, &key_captured, this, cx)
    });
    o.insert_property(
        key.clone(),
        PropertyDescriptor::accessor(Some(JsValue::object(getter)), None, Attribute::NONE),
    );

    let result = internal_methods::get(&o, &key, &JsValue::object(o.clone()), &mut cx)
        .expect("reentrant getter call must not error or overflow the stack");
    assert!(result.is_undefined());
}

#[test]
fn proxy_get_trap_observes_the_original_receiver() {
    let mut cx = Context::default();
    let target = JsObject::ordinary(None);
    target.insert_data(PropertyKey::from_str("a"), JsValue::number(1.0), Attribute::ALL);

    let handler = JsObject::ordinary(None);
    let proxy = new_proxy(target, handler.clone());
    let proxy_for_trap = proxy.clone();
    let get_trap = native_fn("get", 3, move |_this, args, _cx| {
        let receiver = args.get(2).cloned().unwrap_or_else(JsValue::undefined);
        let is_same = receiver
            .as_object()
            .is_some_and(|o| JsObject::ptr_eq(o, &proxy_for_trap));
        Ok(JsValue::boolean(is_same))
    });
    handler.insert_data(PropertyKey::from_str("get"), JsValue::object(get_trap), Attribute::ALL);

    let direct = internal_methods::get(
        &proxy,
        &PropertyKey::from_str("anything"),
        &JsValue::object(proxy.clone()),
        &mut cx,
    )
    .unwrap();
    assert_eq!(direct, JsValue::boolean(true), "direct access: receiver is the proxy itself");

    let derived = JsObject::ordinary(Some(proxy.clone()));
    let via_inheritance = internal_methods::get(
        &derived,
        &PropertyKey::from_str("anything"),
        &JsValue::object(derived.clone()),
        &mut cx,
    )
    .unwrap();
    assert_eq!(
        via_inheritance,
        JsValue::boolean(false),
        "inherited access: the receiver is the derived object, not the proxy"
    );
}

#[test]
fn typed_array_writes_wrap_and_clamp_per_kind() {
    let mut cx = Context::default();
    let buffer = new_array_buffer(1, None);
    let u8_arr = new_typed_array(buffer, TypedArrayKind::Uint8, 0, 1, None);
    set_index(&u8_arr, 0, &JsValue::number(257.0), &mut cx).unwrap();
    assert_eq!(get_index(&u8_arr, 0).as_number(), Some(1.0), "257 wraps to 1 in a Uint8Array");

    let buffer2 = new_array_buffer(1, None);
    let i8_arr = new_typed_array(buffer2, TypedArrayKind::Int8, 0, 1, None);
    set_index(&i8_arr, 0, &JsValue::number(200.0), &mut cx).unwrap();
    assert_eq!(get_index(&i8_arr, 0).as_number(), Some(-56.0), "200 wraps to -56 in an Int8Array");

    let buffer3 = new_array_buffer(1, None);
    let clamped = new_typed_array(buffer3, TypedArrayKind::Uint8Clamped, 0, 1, None);
    set_index(&clamped, 0, &JsValue::number(2.5), &mut cx).unwrap();
    assert_eq!(get_index(&clamped, 0).as_number(), Some(2.0), "2.5 rounds to even (2) under Uint8Clamped");
    set_index(&clamped, 0, &JsValue::number(3.5), &mut cx).unwrap();
    assert_eq!(get_index(&clamped, 0).as_number(), Some(4.0), "3.5 rounds to even (4) under Uint8Clamped");
}
