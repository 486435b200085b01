use crate::field::{FieldId, Props};
use crate::store::{SingleStore, Store, Subscription, STATE_ID};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

type Render<S> = Box<dyn FnMut(&S)>;

struct SelectionState<P, S> {
    selector: Box<dyn Fn(&P) -> S>,
    same: Box<dyn Fn(&S, &S) -> bool>,
    current: RefCell<S>,
    render: RefCell<Option<Render<S>>>,
}

impl<P: Props, S: Clone + 'static> SelectionState<P, S> {
    /// Select from `props` and render if the selection changed.
    fn receive(&self, props: &P) {
        let next = (self.selector)(props);
        if (self.same)(&*self.current.borrow(), &next) {
            return;
        }
        *self.current.borrow_mut() = next.clone();

        let render = self.render.borrow_mut().take();
        if let Some(mut render) = render {
            trace!(field = %props.id(), "selection changed");
            render(&next);
            let mut slot = self.render.borrow_mut();
            if slot.is_none() {
                *slot = Some(render);
            }
        }
    }
}

/// A derived value of one field that tracks the field's updates.
///
/// Created by [`use_selector`] and friends. On every notification for the
/// field, the selector runs on the new props and the result is compared with
/// the last accepted selection; only a difference replaces the selection and
/// calls the [`on_change`](Selection::on_change) callback. Dropping the
/// selection unsubscribes it. The store is never written to.
pub struct Selection<P: Props, S> {
    store: Store<P>,
    field: FieldId,
    state: Rc<SelectionState<P, S>>,
    subscription: Subscription,
}

impl<P: Props, S: Clone + 'static> Selection<P, S> {
    fn new(
        store: &Store<P>,
        field: FieldId,
        selector: impl Fn(&P) -> S + 'static,
        same: impl Fn(&S, &S) -> bool + 'static,
    ) -> Self {
        let initial = selector(&current_props(store, &field));
        let state = Rc::new(SelectionState {
            selector: Box::new(selector),
            same: Box::new(same),
            current: RefCell::new(initial),
            render: RefCell::new(None),
        });
        let subscription = subscribe(store, &field, &state);

        Self {
            store: store.clone(),
            field,
            state,
            subscription,
        }
    }

    /// The last accepted selection.
    pub fn get(&self) -> S {
        self.state.current.borrow().clone()
    }

    /// Borrow the last accepted selection.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.state.current.borrow())
    }

    pub fn field(&self) -> &FieldId {
        &self.field
    }

    /// Set the callback invoked with each newly accepted selection.
    pub fn on_change(&self, render: impl FnMut(&S) + 'static) {
        *self.state.render.borrow_mut() = Some(Box::new(render));
    }

    /// Follow `field` of `store` instead of the current source.
    ///
    /// The old subscription is released first. The selection is then
    /// recomputed from the new source and, if it differs, rendered.
    pub fn rebind(&mut self, store: &Store<P>, field: impl Into<FieldId>) {
        self.subscription.unsubscribe();
        self.store = store.clone();
        self.field = field.into();
        self.subscription = subscribe(&self.store, &self.field, &self.state);
        self.state.receive(&current_props(&self.store, &self.field));
    }
}

impl<P: Props, S> Drop for Selection<P, S> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl<P: Props, S: fmt::Debug> fmt::Debug for Selection<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("field", &self.field)
            .field("current", &self.state.current.borrow())
            .finish()
    }
}

fn current_props<P: Props>(store: &Store<P>, field: &FieldId) -> P {
    store
        .get_props(field)
        .unwrap_or_else(|| P::from_id(field.clone()))
}

fn subscribe<P: Props, S: Clone + 'static>(
    store: &Store<P>,
    field: &FieldId,
    state: &Rc<SelectionState<P, S>>,
) -> Subscription {
    let state = Rc::clone(state);
    store.subscribe(field.clone(), move |props: &P| state.receive(props))
}

/// Select from `field` of `store`, treating `PartialEq`-equal selections as
/// unchanged.
///
/// ```
/// use fieldstore::{hooks::use_selector, Record, Store};
/// use serde_json::json;
///
/// let store = Store::new([Record::new("a")]);
/// let count = use_selector(&store, "a", |props: &Record| props.get("count").cloned());
/// assert_eq!(count.get(), None);
///
/// store.patch("a", Record::patch(json!({ "count": 2 })));
/// assert_eq!(count.get(), Some(json!(2)));
/// ```
pub fn use_selector<P, S>(
    store: &Store<P>,
    field: impl Into<FieldId>,
    selector: impl Fn(&P) -> S + 'static,
) -> Selection<P, S>
where
    P: Props,
    S: Clone + PartialEq + 'static,
{
    Selection::new(store, field.into(), selector, |a: &S, b: &S| a == b)
}

/// Select from `field` of `store` with a custom comparator. `same` returns
/// `true` when two selections should be treated as unchanged.
pub fn use_selector_with<P, S>(
    store: &Store<P>,
    field: impl Into<FieldId>,
    selector: impl Fn(&P) -> S + 'static,
    same: impl Fn(&S, &S) -> bool + 'static,
) -> Selection<P, S>
where
    P: Props,
    S: Clone + 'static,
{
    Selection::new(store, field.into(), selector, same)
}

/// Select from the state of a [`SingleStore`].
pub fn use_state_selector<P, S>(
    store: &SingleStore<P>,
    selector: impl Fn(&P) -> S + 'static,
) -> Selection<P, S>
where
    P: Props,
    S: Clone + PartialEq + 'static,
{
    use_selector(store.store(), STATE_ID, selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Record;
    use serde_json::{json, Value};
    use std::cell::Cell;

    fn get(key: &'static str) -> impl Fn(&Record) -> Option<Value> {
        move |props: &Record| props.get(key).cloned()
    }

    #[test]
    fn renders_only_when_selection_changes() {
        let store = Store::new([Record::new("a")]);
        let selection = use_selector(&store, "a", get("count"));
        let renders = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&renders);
        selection.on_change(move |v: &Option<Value>| sink.borrow_mut().push(v.clone()));

        store.patch("a", Record::patch(json!({ "count": 1 })));
        store.patch("a", Record::patch(json!({ "other": true })));
        store.patch("a", Record::patch(json!({ "count": 1 })));
        store.patch("a", Record::patch(json!({ "count": 2 })));

        assert_eq!(*renders.borrow(), vec![Some(json!(1)), Some(json!(2))]);
        assert_eq!(selection.get(), Some(json!(2)));
    }

    #[test]
    fn custom_comparator_decides() {
        let store = Store::new([Record::new("a")]);
        let parity = |props: &Record| props.get("n").and_then(Value::as_i64).unwrap_or(0);
        let selection = use_selector_with(&store, "a", parity, |a: &i64, b: &i64| a % 2 == b % 2);
        let renders = Rc::new(Cell::new(0));
        let counter = Rc::clone(&renders);
        selection.on_change(move |_| counter.set(counter.get() + 1));

        store.patch("a", Record::patch(json!({ "n": 2 })));
        store.patch("a", Record::patch(json!({ "n": 3 })));
        store.patch("a", Record::patch(json!({ "n": 5 })));

        assert_eq!(renders.get(), 1);
        assert_eq!(selection.get(), 3);
    }

    #[test]
    fn drop_unsubscribes() {
        let store = Store::new([Record::new("a")]);
        let renders = Rc::new(Cell::new(0));
        {
            let selection = use_selector(&store, "a", get("count"));
            let counter = Rc::clone(&renders);
            selection.on_change(move |_| counter.set(counter.get() + 1));
            store.patch("a", Record::patch(json!({ "count": 1 })));
        }
        store.patch("a", Record::patch(json!({ "count": 2 })));

        assert_eq!(renders.get(), 1);
        assert_eq!(Rc::strong_count(&renders), 1);
    }

    #[test]
    fn rebind_follows_new_field() {
        let store = Store::new([Record::new("a"), Record::new("b")]);
        store.patch("b", Record::patch(json!({ "count": 7 })));
        let mut selection = use_selector(&store, "a", get("count"));

        selection.rebind(&store, "b");
        assert_eq!(selection.get(), Some(json!(7)));
        assert_eq!(selection.field(), &FieldId::from("b"));

        store.patch("a", Record::patch(json!({ "count": 1 })));
        assert_eq!(selection.get(), Some(json!(7)));

        store.patch("b", Record::patch(json!({ "count": 8 })));
        assert_eq!(selection.get(), Some(json!(8)));
    }

    #[test]
    fn single_store_selection() {
        let store = SingleStore::<Record>::new(Some(Record::patch(json!({ "open": false }))));
        let open = use_state_selector(&store, get("open"));
        assert_eq!(open.get(), Some(json!(false)));

        store.patch(Record::patch(json!({ "open": true })));
        assert_eq!(open.get(), Some(json!(true)));
    }

    #[test]
    fn missing_field_selects_from_fresh_record() {
        let store: Store<Record> = Store::default();
        let id = use_selector(&store, 9, |props: &Record| props.id().clone());
        assert_eq!(id.get(), FieldId::from(9));
    }
}
