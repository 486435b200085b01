use super::{Store, Subscription, Update};
use crate::config::{StoreConfig, UpdateConfig};
use crate::field::{FieldId, Props};

/// Id of the only field in a [`SingleStore`].
pub const STATE_ID: &str = "state";

/// A store holding a single props record.
///
/// Wraps a [`Store`] whose only field is [`STATE_ID`]; every operation drops
/// the id parameter and delegates.
pub struct SingleStore<P: Props> {
    store: Store<P>,
}

impl<P: Props> SingleStore<P> {
    /// Create the store from the synthesized [`STATE_ID`] record, merging
    /// `initial` over it when given.
    pub fn new(initial: Option<P::Patch>) -> Self {
        Self::with_config(initial, StoreConfig::default())
    }

    /// Like [`new`](SingleStore::new), with an explicit configuration.
    pub fn with_config(initial: Option<P::Patch>, config: StoreConfig) -> Self {
        let store = Store::with_config([P::from_id(state_id())], config);
        if let Some(patch) = initial {
            store.patch(STATE_ID, patch);
        }
        Self { store }
    }

    /// A copy of the current state.
    pub fn get_props(&self) -> Option<P> {
        self.store.get_props(&state_id())
    }

    /// Register `subscriber` for every emitted state update.
    pub fn subscribe(&self, subscriber: impl Fn(&P) + 'static) -> Subscription {
        self.store.subscribe(STATE_ID, subscriber)
    }

    /// Update the state; see [`Store::update`].
    pub fn update(&self, update: Update<P>, config: UpdateConfig) {
        self.store.update(STATE_ID, update, config);
    }

    /// Merge `patch` into the state.
    pub fn patch(&self, patch: P::Patch) {
        self.store.patch(STATE_ID, patch);
    }

    /// Compute a patch from the current state and merge it.
    pub fn update_with(&self, f: impl FnOnce(&P) -> P::Patch + 'static) {
        self.store.update_with(STATE_ID, f);
    }

    /// The underlying keyed store.
    pub fn store(&self) -> &Store<P> {
        &self.store
    }
}

impl<P: Props> Clone for SingleStore<P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

fn state_id() -> FieldId {
    FieldId::from(STATE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Record;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn starts_from_synthesized_state() {
        let store: SingleStore<Record> = SingleStore::new(None);
        let state = store.get_props().unwrap();
        assert_eq!(state.id().as_str(), Some(STATE_ID));
        assert_eq!(state.values().len(), 1);
    }

    #[test]
    fn initial_patch_is_merged() {
        let store = SingleStore::<Record>::new(Some(Record::patch(json!({ "theme": "dark" }))));
        assert_eq!(store.get_props().unwrap().get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn updates_reach_subscribers() {
        let store = SingleStore::<Record>::new(None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |state| sink.borrow_mut().push(state.get("n").cloned()));

        store.patch(Record::patch(json!({ "n": 1 })));
        store.update_with(|state| {
            let n = state.get("n").and_then(|n| n.as_i64()).unwrap_or(0);
            Record::patch(json!({ "n": n + 1 }))
        });
        sub.unsubscribe();
        store.patch(Record::patch(json!({ "n": 10 })));

        assert_eq!(*seen.borrow(), vec![Some(json!(1)), Some(json!(2))]);
        assert_eq!(store.store().len(), 1);
    }
}
