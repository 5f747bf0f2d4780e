//! The embedding surface (§6): realm/intrinsics bookkeeping, the Value API
//! (`call`/`construct`), the microtask queue, and the [`Evaluator`] seam
//! that lets an embedder plug in a parser/AST-walker without this crate
//! ever containing one itself.

use crate::error::{JsNativeError, JsResult};
use crate::object::function::{call as call_function, construct as construct_function, ClassData, FunctionData};
use crate::object::internal_methods::ReentrancyGuard;
use crate::object::{ObjectKind, JsObject};
use crate::symbol::WellKnownSymbols;
use crate::value::JsValue;
use std::collections::VecDeque;
use std::rc::Rc;

/// An opaque reference to embedder-owned scripted-function state (a parsed
/// function body, closed-over scope, whatever the embedder's parser
/// produces). This crate never inspects it — it only ever hands it back to
/// the [`Evaluator`] that created it.
pub struct ScriptedHandle(Rc<dyn std::any::Any>);

impl ScriptedHandle {
    pub fn new(payload: Rc<dyn std::any::Any>) -> Self {
        ScriptedHandle(payload)
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl Clone for ScriptedHandle {
    fn clone(&self) -> Self {
        ScriptedHandle(self.0.clone())
    }
}

/// The boundary between this crate's object/value runtime and whatever
/// parses and walks source text (§6.1). Scripted function bodies and class
/// constructors are driven entirely through here; native functions never
/// touch it.
pub trait Evaluator {
    fn call(
        &mut self,
        handle: &ScriptedHandle,
        function: &JsObject,
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue>;

    fn construct(
        &mut self,
        handle: &ScriptedHandle,
        function: &JsObject,
        args: &[JsValue],
        new_target: &JsObject,
        context: &mut Context,
    ) -> JsResult<JsObject>;

    fn construct_class(
        &mut self,
        class: &ClassData,
        class_object: &JsObject,
        args: &[JsValue],
        new_target: &JsObject,
        context: &mut Context,
    ) -> JsResult<JsObject>;

    /// Whether the scripted code currently executing (the top of the
    /// `Evaluator`'s own call stack) is strict-mode (§6.1). The core has no
    /// call stack of its own, so the `.caller`/`.callee` poison-pill guard
    /// (§4.D) asks the embedder instead of tracking this itself.
    fn current_strict_mode(&self) -> bool;

    /// The function object that called `callee`, if the `Evaluator`'s call
    /// stack has one (§6.1). Backs the legacy `Function.prototype.caller`
    /// accessor on non-strict functions.
    fn current_caller(&self, callee: &JsObject) -> Option<JsObject>;
}

/// Per-realm prototypes and wrapper-object constructors (§6.4). Deliberately
/// never shared across `Context`s: two independent realms must not see
/// each other's `Array.prototype` (§9's per-context design note).
pub struct Intrinsics {
    pub object_prototype: JsObject,
    pub function_prototype: JsObject,
    pub array_prototype: JsObject,
    pub boolean_prototype: JsObject,
    pub number_prototype: JsObject,
    pub string_prototype: JsObject,
    pub symbol_prototype: JsObject,
    pub bigint_prototype: JsObject,
    pub error_prototype: JsObject,
    pub promise_prototype: JsObject,
    pub map_prototype: JsObject,
    pub set_prototype: JsObject,
    pub weak_map_prototype: JsObject,
    pub weak_set_prototype: JsObject,
    pub regexp_prototype: JsObject,
    pub date_prototype: JsObject,
    pub array_buffer_prototype: JsObject,
    pub typed_array_prototype: JsObject,
    pub data_view_prototype: JsObject,
}

impl Intrinsics {
    fn new() -> Self {
        let object_prototype = JsObject::ordinary(None);
        let mk = || JsObject::ordinary(Some(object_prototype.clone()));
        Intrinsics {
            function_prototype: mk(),
            array_prototype: mk(),
            boolean_prototype: mk(),
            number_prototype: mk(),
            string_prototype: mk(),
            symbol_prototype: mk(),
            bigint_prototype: mk(),
            error_prototype: mk(),
            promise_prototype: mk(),
            map_prototype: mk(),
            set_prototype: mk(),
            weak_map_prototype: mk(),
            weak_set_prototype: mk(),
            regexp_prototype: mk(),
            date_prototype: mk(),
            array_buffer_prototype: mk(),
            typed_array_prototype: mk(),
            data_view_prototype: mk(),
            object_prototype,
        }
    }

    pub fn array_prototype(&self) -> JsObject {
        self.array_prototype.clone()
    }

    pub fn new_boolean_wrapper(&self, value: bool) -> JsObject {
        JsObject::from_data(Some(self.boolean_prototype.clone()), ObjectKind::BooleanWrapper(value))
    }

    pub fn new_number_wrapper(&self, value: f64) -> JsObject {
        JsObject::from_data(Some(self.number_prototype.clone()), ObjectKind::NumberWrapper(value))
    }

    pub fn new_string_wrapper(&self, value: crate::string::JsString) -> JsObject {
        JsObject::from_data(Some(self.string_prototype.clone()), ObjectKind::StringWrapper(value))
    }

    pub fn new_bigint_wrapper(&self, value: crate::bigint::JsBigInt) -> JsObject {
        JsObject::from_data(Some(self.bigint_prototype.clone()), ObjectKind::BigIntWrapper(value))
    }

    pub fn new_symbol_wrapper(&self, value: crate::symbol::JsSymbol) -> JsObject {
        JsObject::from_data(Some(self.symbol_prototype.clone()), ObjectKind::SymbolWrapper(value))
    }

    /// A native `x => x * 2` used only by this crate's own array-method
    /// tests, where a real parsed closure isn't available.
    #[cfg(test)]
    pub(crate) fn test_doubler(&self) -> JsValue {
        use crate::object::function::FunctionData;
        let f = JsObject::from_data(
            Some(self.function_prototype.clone()),
            ObjectKind::Function(FunctionData::native(
                "double",
                1,
                Rc::new(|_this, args, _ctx| {
                    let n = args.first().and_then(JsValue::as_number).unwrap_or(0.0);
                    Ok(JsValue::number(n * 2.0))
                }),
            )),
        );
        JsValue::object(f)
    }
}

/// A single realm (§6.4): its intrinsics, well-known symbols, the
/// reentrancy guard, the pending microtask queue, and the installed
/// `Evaluator`.
pub struct Context {
    intrinsics: Intrinsics,
    well_known_symbols: WellKnownSymbols,
    reentrancy_guard: ReentrancyGuard,
    microtasks: VecDeque<Microtask>,
    evaluator: Option<Box<dyn Evaluator>>,
    /// Identifier interner for this realm. The core itself never looks
    /// identifiers up by `Sym` (property keys are stored as [`JsString`]s),
    /// but an embedder's parser needs a shared interner to hand matching
    /// source identifiers the same symbol, and a realm is the natural place
    /// to own one.
    interner: ecma_interner::Interner,
}

struct Microtask(Box<dyn FnOnce(&mut Context)>);

impl Default for Context {
    fn default() -> Self {
        Context {
            intrinsics: Intrinsics::new(),
            well_known_symbols: WellKnownSymbols::new(),
            reentrancy_guard: ReentrancyGuard::default(),
            microtasks: VecDeque::new(),
            evaluator: None,
            interner: ecma_interner::Interner::new(),
        }
    }
}

impl Context {
    pub fn with_evaluator(evaluator: Box<dyn Evaluator>) -> Self {
        Context {
            evaluator: Some(evaluator),
            ..Context::default()
        }
    }

    pub fn interner(&self) -> &ecma_interner::Interner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut ecma_interner::Interner {
        &mut self.interner
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn well_known_symbols(&self) -> &WellKnownSymbols {
        &self.well_known_symbols
    }

    pub(crate) fn reentrancy_guard_mut(&mut self) -> &mut ReentrancyGuard {
        &mut self.reentrancy_guard
    }

    /// The Value-API entry point for invoking any callable (§6.2).
    pub fn call(&mut self, callable: &JsValue, this: &JsValue, args: &[JsValue]) -> JsResult<JsValue> {
        let obj = callable.as_callable().ok_or_else(|| {
            JsError::from(JsNativeError::typ().with_message("value is not callable"))
        })?;
        call_function(obj, this, args, self)
    }

    pub fn construct(
        &mut self,
        callable: &JsValue,
        args: &[JsValue],
        new_target: Option<&JsObject>,
    ) -> JsResult<JsObject> {
        let obj = callable
            .as_object()
            .filter(|o| o.is_constructor())
            .ok_or_else(|| JsError::from(JsNativeError::typ().with_message("value is not a constructor")))?;
        let nt = new_target.cloned().unwrap_or_else(|| obj.clone());
        construct_function(obj, args, &nt, self)
    }

    pub(crate) fn call_scripted(
        &mut self,
        handle: &ScriptedHandle,
        function: &JsObject,
        this: &JsValue,
        args: &[JsValue],
    ) -> JsResult<JsValue> {
        let mut evaluator = self
            .evaluator
            .take()
            .expect("no Evaluator installed for a scripted function call");
        let result = evaluator.call(handle, function, this, args, self);
        self.evaluator = Some(evaluator);
        result
    }

    pub(crate) fn construct_scripted(
        &mut self,
        handle: &ScriptedHandle,
        function: &JsObject,
        args: &[JsValue],
        new_target: &JsObject,
    ) -> JsResult<JsObject> {
        let mut evaluator = self
            .evaluator
            .take()
            .expect("no Evaluator installed for a scripted constructor call");
        let result = evaluator.construct(handle, function, args, new_target, self);
        self.evaluator = Some(evaluator);
        result
    }

    pub(crate) fn construct_class(
        &mut self,
        class: &ClassData,
        class_object: &JsObject,
        args: &[JsValue],
        new_target: &JsObject,
    ) -> JsResult<JsObject> {
        let mut evaluator = self
            .evaluator
            .take()
            .expect("no Evaluator installed for a class construction");
        let result = evaluator.construct_class(class, class_object, args, new_target, self);
        self.evaluator = Some(evaluator);
        result
    }

    /// Schedules a microtask (§5): a Promise reaction job or similar.
    pub fn enqueue_microtask(&mut self, job: impl FnOnce(&mut Context) + 'static) {
        self.microtasks.push_back(Microtask(Box::new(job)));
    }

    /// Drains the microtask queue to empty, FIFO, running jobs *enqueued
    /// during drainage* to completion as well (§5's "run to empty, not a
    /// fixed snapshot" rule).
    pub fn run_jobs(&mut self) {
        let mut drained = 0u32;
        while let Some(Microtask(job)) = self.microtasks.pop_front() {
            job(self);
            drained += 1;
        }
        log::trace!("drained {drained} microtask(s)");
    }

    pub fn has_pending_jobs(&self) -> bool {
        !self.microtasks.is_empty()
    }

    /// §4.D's `.caller`/`.callee` guard needs to know whether the calling
    /// scripted code is strict; with no installed `Evaluator` (a purely
    /// native embedding) there is no scripted call stack, so this is
    /// vacuously non-strict.
    pub fn current_strict_mode(&self) -> bool {
        self.evaluator.as_ref().is_some_and(|e| e.current_strict_mode())
    }

    pub fn current_caller(&self, callee: &JsObject) -> Option<JsObject> {
        self.evaluator.as_ref().and_then(|e| e.current_caller(callee))
    }
}

use crate::error::JsError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn microtasks_run_fifo_including_newly_enqueued() {
        let mut context = Context::default();
        let log = Rc::new(std::cell::RefCell::new(Vec::<i32>::new()));
        let log2 = log.clone();
        context.enqueue_microtask(move |ctx| {
            log2.borrow_mut().push(1);
            let log3 = log2.clone();
            ctx.enqueue_microtask(move |_| log3.borrow_mut().push(3));
        });
        let log4 = log.clone();
        context.enqueue_microtask(move |_| log4.borrow_mut().push(2));
        context.run_jobs();
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn fresh_context_has_distinct_array_prototype() {
        let a = Context::default();
        let b = Context::default();
        assert!(!JsObject::ptr_eq(&a.intrinsics().array_prototype, &b.intrinsics().array_prototype));
    }
}
