//! Component I: `Promise` (§5). State transitions are one-shot and
//! reactions are queued as microtasks through [`crate::context::Context`],
//! never invoked synchronously — even an already-settled promise's `.then`
//! handler runs on a later turn.

use crate::context::Context;
use crate::error::{JsError, JsNativeError, JsResult};
use crate::object::JsObject;
use crate::value::JsValue;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromiseState {
    Pending,
    Fulfilled,
    Rejected,
}

struct Reaction {
    on_fulfilled: Option<JsValue>,
    on_rejected: Option<JsValue>,
    result_capability: JsObject,
}

pub struct PromiseData {
    state: PromiseState,
    result: JsValue,
    reactions: Vec<Reaction>,
    pub is_handled: bool,
}

impl Default for PromiseData {
    fn default() -> Self {
        PromiseData {
            state: PromiseState::Pending,
            result: JsValue::undefined(),
            reactions: Vec::new(),
            is_handled: false,
        }
    }
}

impl PromiseData {
    pub fn state(&self) -> PromiseState {
        self.state
    }
}

pub fn new_promise(proto: Option<JsObject>) -> JsObject {
    JsObject::from_data(proto, crate::object::ObjectKind::Promise(PromiseData::default()))
}

fn with_promise_data<R>(obj: &JsObject, f: impl FnOnce(&mut PromiseData) -> R) -> R {
    match &mut obj.borrow_mut().kind {
        crate::object::ObjectKind::Promise(p) => f(p),
        _ => panic!("not a Promise"),
    }
}

/// Resolves a promise to `value`, following a thenable one level (§5's
/// "the resolution procedure chains through a thenable's own `then`, not
/// just its own settlement" rule) before settling as fulfilled.
pub fn resolve(promise: &JsObject, value: JsValue, context: &mut Context) {
    if crate::value::same_value(&JsValue::object(promise.clone()), &value) {
        return reject(
            promise,
            JsNativeError::typ().with_message("chaining cycle detected for promise").into(),
            context,
        );
    }
    if let Some(thenable) = value.as_object().cloned() {
        let then_key = crate::property::PropertyKey::from_str("then");
        let then_fn = crate::object::internal_methods::get(&thenable, &then_key, &value, context)
            .ok()
            .filter(|v| v.as_callable().is_some());
        if let Some(then_fn) = then_fn {
            let promise = promise.clone();
            let thenable_value = value.clone();
            context.enqueue_microtask(move |ctx| {
                let resolve_fn = make_settle_fn(promise.clone(), true);
                let reject_fn = make_settle_fn(promise.clone(), false);
                if let Err(e) = ctx.call(&then_fn, &thenable_value, &[resolve_fn, reject_fn]) {
                    reject(&promise, e, ctx);
                }
            });
            return;
        }
    }
    settle(promise, PromiseState::Fulfilled, value, context);
}

pub fn reject(promise: &JsObject, error: JsError, context: &mut Context) {
    settle(promise, PromiseState::Rejected, error.into_value(context), context);
}

fn settle(promise: &JsObject, state: PromiseState, value: JsValue, context: &mut Context) {
    let reactions = with_promise_data(promise, |p| {
        if p.state != PromiseState::Pending {
            return None;
        }
        p.state = state;
        p.result = value.clone();
        Some(std::mem::take(&mut p.reactions))
    });
    let Some(reactions) = reactions else { return };
    for reaction in reactions {
        schedule_reaction(reaction, state, value.clone(), context);
    }
}

fn schedule_reaction(reaction: Reaction, state: PromiseState, value: JsValue, context: &mut Context) {
    let handler = match state {
        PromiseState::Fulfilled => reaction.on_fulfilled,
        PromiseState::Rejected => reaction.on_rejected,
        PromiseState::Pending => unreachable!(),
    };
    let capability = reaction.result_capability;
    context.enqueue_microtask(move |ctx| {
        let outcome = match handler.filter(|h| h.as_callable().is_some()) {
            Some(h) => ctx.call(&h, &JsValue::undefined(), &[value]),
            None => match state {
                PromiseState::Fulfilled => Ok(value),
                PromiseState::Rejected => Err(JsError::from_value(value)),
                PromiseState::Pending => unreachable!(),
            },
        };
        match outcome {
            Ok(v) => resolve(&capability, v, ctx),
            Err(e) => reject(&capability, e, ctx),
        }
    });
}

/// `.then(onFulfilled, onRejected)`: returns a new promise, settled by
/// scheduling a reaction job either immediately (if already settled) or
/// when the source promise settles.
pub fn then(
    promise: &JsObject,
    on_fulfilled: Option<JsValue>,
    on_rejected: Option<JsValue>,
    context: &mut Context,
) -> JsObject {
    let result = new_promise(Some(context.intrinsics().promise_prototype.clone()));
    let reaction = Reaction {
        on_fulfilled,
        on_rejected,
        result_capability: result.clone(),
    };
    let (state, value) = with_promise_data(promise, |p| {
        p.is_handled = true;
        if p.state == PromiseState::Pending {
            (PromiseState::Pending, JsValue::undefined())
        } else {
            (p.state, p.result.clone())
        }
    });
    if state == PromiseState::Pending {
        with_promise_data(promise, |p| p.reactions.push(reaction));
    } else {
        schedule_reaction(reaction, state, value, context);
    }
    result
}

fn make_settle_fn(promise: JsObject, fulfill: bool) -> JsValue {
    use crate::object::function::FunctionData;
    use std::rc::Rc;
    let f = JsObject::from_data(
        None,
        crate::object::ObjectKind::Function(FunctionData::native(
            if fulfill { "resolve" } else { "reject" },
            1,
            Rc::new(move |_this, args, ctx| {
                let value = args.first().cloned().unwrap_or_else(JsValue::undefined);
                if fulfill {
                    resolve(&promise, value, ctx);
                } else {
                    reject(&promise, JsError::from_value(value), ctx);
                }
                Ok(JsValue::undefined())
            }),
        )),
    );
    JsValue::object(f)
}

/// Runs `executor(resolve, reject)` synchronously, per `new Promise(...)`'s
/// contract; an executor that throws rejects the promise with that value.
pub fn construct_with_executor(executor: &JsValue, context: &mut Context) -> JsResult<JsObject> {
    let promise = new_promise(Some(context.intrinsics().promise_prototype.clone()));
    let resolve_fn = make_settle_fn(promise.clone(), true);
    let reject_fn = make_settle_fn(promise.clone(), false);
    if let Err(e) = context.call(executor, &JsValue::undefined(), &[resolve_fn, reject_fn]) {
        reject(&promise, e, context);
    }
    Ok(promise)
}

pub fn promise_resolve(value: JsValue, context: &mut Context) -> JsObject {
    if let Some(obj) = value.as_object() {
        if matches!(obj.borrow().kind, crate::object::ObjectKind::Promise(_)) {
            return obj.clone();
        }
    }
    let promise = new_promise(Some(context.intrinsics().promise_prototype.clone()));
    resolve(&promise, value, context);
    promise
}

pub fn promise_reject(error: JsError, context: &mut Context) -> JsObject {
    let promise = new_promise(Some(context.intrinsics().promise_prototype.clone()));
    reject(&promise, error, context);
    promise
}

/// `Promise.all`: rejects as soon as any input rejects; otherwise fulfills
/// with results in input order once every input has fulfilled (§5).
pub fn all(promises: Vec<JsValue>, context: &mut Context) -> JsObject {
    combinator(promises, context, Strategy::All)
}

pub fn all_settled(promises: Vec<JsValue>, context: &mut Context) -> JsObject {
    combinator(promises, context, Strategy::AllSettled)
}

pub fn race(promises: Vec<JsValue>, context: &mut Context) -> JsObject {
    let result = new_promise(Some(context.intrinsics().promise_prototype.clone()));
    for p in promises {
        let inner = promise_resolve(p, context);
        let result_clone = result.clone();
        then(
            &inner,
            Some(make_settle_fn(result_clone.clone(), true)),
            Some(make_settle_fn(result_clone, false)),
            context,
        );
    }
    result
}

pub fn any(promises: Vec<JsValue>, context: &mut Context) -> JsObject {
    let result = new_promise(Some(context.intrinsics().promise_prototype.clone()));
    let count = promises.len();
    if count == 0 {
        reject(
            &result,
            JsNativeError::aggregate(Vec::new())
                .with_message("All promises were rejected")
                .into(),
            context,
        );
        return result;
    }
    let errors = std::rc::Rc::new(std::cell::RefCell::new(vec![JsValue::undefined(); count]));
    let remaining = std::rc::Rc::new(std::cell::Cell::new(count));
    for (i, p) in promises.into_iter().enumerate() {
        let inner = promise_resolve(p, context);
        let result_clone = result.clone();
        let errors = errors.clone();
        let remaining = remaining.clone();
        let on_fulfilled = make_settle_fn(result_clone.clone(), true);
        let on_rejected = native_reject_into_any(i, errors, remaining, result_clone);
        then(&inner, Some(on_fulfilled), Some(on_rejected), context);
    }
    result
}

fn native_reject_into_any(
    index: usize,
    errors: std::rc::Rc<std::cell::RefCell<Vec<JsValue>>>,
    remaining: std::rc::Rc<std::cell::Cell<usize>>,
    result: JsObject,
) -> JsValue {
    use crate::object::function::FunctionData;
    use std::rc::Rc;
    let f = JsObject::from_data(
        None,
        crate::object::ObjectKind::Function(FunctionData::native("", 1, Rc::new(move |_this, args, ctx| {
            let err = args.first().cloned().unwrap_or_else(JsValue::undefined);
            errors.borrow_mut()[index] = err;
            let left = remaining.get() - 1;
            remaining.set(left);
            if left == 0 {
                reject(
                    &result,
                    JsNativeError::aggregate(errors.borrow().clone())
                        .with_message("All promises were rejected")
                        .into(),
                    ctx,
                );
            }
            Ok(JsValue::undefined())
        }))),
    );
    JsValue::object(f)
}

enum Strategy {
    All,
    AllSettled,
}

fn combinator(promises: Vec<JsValue>, context: &mut Context, strategy: Strategy) -> JsObject {
    let result = new_promise(Some(context.intrinsics().promise_prototype.clone()));
    let count = promises.len();
    if count == 0 {
        resolve(&result, JsValue::object(empty_result_array(context)), context);
        return result;
    }
    let values = std::rc::Rc::new(std::cell::RefCell::new(vec![JsValue::undefined(); count]));
    let remaining = std::rc::Rc::new(std::cell::Cell::new(count));
    for (i, p) in promises.into_iter().enumerate() {
        let inner = promise_resolve(p, context);
        let result_clone = result.clone();
        let values = values.clone();
        let remaining = remaining.clone();
        match strategy {
            Strategy::All => {
                let on_fulfilled = settle_slot(i, values.clone(), remaining.clone(), result_clone.clone(), false);
                let on_rejected = make_settle_fn(result_clone, false);
                then(&inner, Some(on_fulfilled), Some(on_rejected), context);
            }
            Strategy::AllSettled => {
                let on_fulfilled = settle_slot_settled(i, values.clone(), remaining.clone(), result_clone.clone(), true);
                let on_rejected = settle_slot_settled(i, values, remaining, result_clone, false);
                then(&inner, Some(on_fulfilled), Some(on_rejected), context);
            }
        }
    }
    result
}

fn empty_result_array(context: &mut Context) -> JsObject {
    crate::object::array::new_array(Some(context.intrinsics().array_prototype()))
}

fn settle_slot(
    index: usize,
    values: std::rc::Rc<std::cell::RefCell<Vec<JsValue>>>,
    remaining: std::rc::Rc<std::cell::Cell<usize>>,
    result: JsObject,
    _unused: bool,
) -> JsValue {
    use crate::object::function::FunctionData;
    use std::rc::Rc;
    let f = JsObject::from_data(
        None,
        crate::object::ObjectKind::Function(FunctionData::native("", 1, Rc::new(move |_this, args, ctx| {
            let v = args.first().cloned().unwrap_or_else(JsValue::undefined);
            values.borrow_mut()[index] = v;
            let left = remaining.get() - 1;
            remaining.set(left);
            if left == 0 {
                let arr = crate::object::array::new_array(Some(ctx.intrinsics().array_prototype()));
                for (i, v) in values.borrow().iter().enumerate() {
                    arr.insert_data(i as u32, v.clone(), crate::property::Attribute::ALL);
                }
                resolve(&result, JsValue::object(arr), ctx);
            }
            Ok(JsValue::undefined())
        }))),
    );
    JsValue::object(f)
}

fn settle_slot_settled(
    index: usize,
    values: std::rc::Rc<std::cell::RefCell<Vec<JsValue>>>,
    remaining: std::rc::Rc<std::cell::Cell<usize>>,
    result: JsObject,
    fulfilled: bool,
) -> JsValue {
    use crate::object::function::FunctionData;
    use std::rc::Rc;
    let f = JsObject::from_data(
        None,
        crate::object::ObjectKind::Function(FunctionData::native("", 1, Rc::new(move |_this, args, ctx| {
            let v = args.first().cloned().unwrap_or_else(JsValue::undefined);
            let entry = JsObject::ordinary(Some(ctx.intrinsics().object_prototype.clone()));
            entry.insert_data(
                "status",
                JsValue::string(if fulfilled { "fulfilled" } else { "rejected" }),
                crate::property::Attribute::ALL,
            );
            entry.insert_data(
                if fulfilled { "value" } else { "reason" },
                v,
                crate::property::Attribute::ALL,
            );
            values.borrow_mut()[index] = JsValue::object(entry);
            let left = remaining.get() - 1;
            remaining.set(left);
            if left == 0 {
                let arr = crate::object::array::new_array(Some(ctx.intrinsics().array_prototype()));
                for (i, v) in values.borrow().iter().enumerate() {
                    arr.insert_data(i as u32, v.clone(), crate::property::Attribute::ALL);
                }
                resolve(&result, JsValue::object(arr), ctx);
            }
            Ok(JsValue::undefined())
        }))),
    );
    JsValue::object(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn then_reactions_run_in_fifo_order() {
        let mut context = Context::default();
        let promise = new_promise(Some(context.intrinsics().promise_prototype.clone()));
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::<i32>::new()));

        for tag in [1, 2, 3] {
            let log = log.clone();
            let handler = JsObject::from_data(
                None,
                crate::object::ObjectKind::Function(crate::object::function::FunctionData::native(
                    "",
                    1,
                    std::rc::Rc::new(move |_this, _args, _ctx| {
                        log.borrow_mut().push(tag);
                        Ok(JsValue::undefined())
                    }),
                )),
            );
            then(&promise, Some(JsValue::object(handler)), None, &mut context);
        }

        resolve(&promise, JsValue::number(1.0), &mut context);
        context.run_jobs();
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }
}
