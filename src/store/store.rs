use super::subscription::{Detach, Subscription, SubscriptionId, Target};
use super::update::{HeldUpdate, Update};
use crate::config::{StoreConfig, UpdateConfig};
use crate::field::{FieldId, Props};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

type Subscriber<P> = Rc<dyn Fn(&P)>;
type ListSubscriber = Rc<dyn Fn(&[FieldId])>;

/// Ordered mapping from field id to props, in iteration order.
pub type Fields<P> = IndexMap<FieldId, P, FxBuildHasher>;

struct StoreInner<P: Props> {
    config: StoreConfig,
    fields: Fields<P>,
    subscribers: FxHashMap<FieldId, SmallVec<[(SubscriptionId, Subscriber<P>); 2]>>,
    list_subscribers: Vec<(SubscriptionId, ListSubscriber)>,
    batching: bool,
    batched: Fields<P>,
    // Non-empty exactly while the store is holding.
    held: Vec<HeldUpdate<P>>,
    next_subscription: u64,
}

impl<P: Props> StoreInner<P> {
    fn current(&self, field: &FieldId) -> P {
        self.fields
            .get(field)
            .cloned()
            .unwrap_or_else(|| P::from_id(field.clone()))
    }

    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        id
    }

    fn field_subscribers(&self, field: &FieldId) -> Vec<Subscriber<P>> {
        self.subscribers
            .get(field)
            .map(|list| list.iter().map(|(_, cb)| Rc::clone(cb)).collect())
            .unwrap_or_default()
    }

    /// Snapshot of the id list and its subscribers, if anyone is listening.
    fn list_snapshot(&self) -> Option<(Vec<FieldId>, Vec<ListSubscriber>)> {
        if self.list_subscribers.is_empty() {
            return None;
        }
        let ids = self.fields.keys().cloned().collect();
        let subscribers = self
            .list_subscribers
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        Some((ids, subscribers))
    }
}

impl<P: Props> Detach for RefCell<StoreInner<P>> {
    fn detach(&self, target: &Target, id: SubscriptionId) {
        let mut inner = self.borrow_mut();
        match target {
            Target::Field(field) => {
                if let Some(list) = inner.subscribers.get_mut(field) {
                    list.retain(|(sid, _)| *sid != id);
                    if list.is_empty() {
                        inner.subscribers.remove(field);
                    }
                }
            }
            Target::List => inner.list_subscribers.retain(|(sid, _)| *sid != id),
        }
        trace!(store = %inner.config.label, ?target, ?id, "unsubscribed");
    }
}

/// A keyed publish/subscribe store.
///
/// Holds one props record per [`FieldId`] and notifies the subscribers of a
/// field whenever that field is updated. `Store` is a cheap handle: clones
/// share the same state.
///
/// Updates normally apply and notify immediately. Two mechanisms suspend that:
///
/// - **Batching**, between [`batch_init`](Store::batch_init) and
///   [`batch_finish`](Store::batch_finish). Updates merge into a staging area
///   and are committed together at the end, without per-field notifications.
/// - **Holding**, entered by an update whose [`UpdateConfig`] has
///   `emit_updates: false`. Such updates queue up until an emitting update
///   arrives, which first replays the queue (in call order, each committed
///   and notified) and then applies itself.
///
/// Batching takes precedence: while a batch is open, every update goes to the
/// batch regardless of its configuration.
///
/// # Example
///
/// ```
/// use fieldstore::{Record, Store};
/// use serde_json::json;
///
/// let store = Store::new([Record::new("a")]);
///
/// let sub = store.subscribe("a", |props: &Record| {
///     println!("a changed: {:?}", props.get("count"));
/// });
///
/// store.patch("a", Record::patch(json!({ "count": 1 })));
/// assert_eq!(store.get_props(&"a".into()).unwrap().get("count"), Some(&json!(1)));
///
/// sub.unsubscribe();
/// ```
pub struct Store<P: Props> {
    inner: Rc<RefCell<StoreInner<P>>>,
}

impl<P: Props> Store<P> {
    /// Create a store seeded with `initial`. Later records with a duplicate
    /// id replace earlier ones.
    pub fn new(initial: impl IntoIterator<Item = P>) -> Self {
        Self::with_config(initial, StoreConfig::default())
    }

    /// Create a seeded store with an explicit configuration.
    pub fn with_config(initial: impl IntoIterator<Item = P>, config: StoreConfig) -> Self {
        let mut fields = Fields::default();
        for props in initial {
            fields.insert(props.id().clone(), props);
        }
        debug!(store = %config.label, fields = fields.len(), "store created");

        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                config,
                fields,
                subscribers: FxHashMap::default(),
                list_subscribers: Vec::new(),
                batching: false,
                batched: Fields::default(),
                held: Vec::new(),
                next_subscription: 0,
            })),
        }
    }

    /// The label this store reports in log events.
    pub fn label(&self) -> String {
        self.inner.borrow().config.label.to_string()
    }

    /// A copy of the props of `field`, or `None` if the field does not exist.
    pub fn get_props(&self, field: &FieldId) -> Option<P> {
        let inner = self.inner.borrow();
        trace!(store = %inner.config.label, %field, "get props");
        inner.fields.get(field).cloned()
    }

    /// A copy of every field, in iteration order.
    pub fn fields(&self) -> Fields<P> {
        let inner = self.inner.borrow();
        trace!(store = %inner.config.label, "got fields");
        inner.fields.clone()
    }

    /// The ids of every field, in iteration order.
    pub fn field_ids(&self) -> Vec<FieldId> {
        self.inner.borrow().fields.keys().cloned().collect()
    }

    /// Whether `field` exists.
    pub fn contains(&self, field: &FieldId) -> bool {
        self.inner.borrow().fields.contains_key(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.inner.borrow().fields.len()
    }

    /// Whether the store has no fields.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().fields.is_empty()
    }

    /// Whether a batch is open.
    pub fn is_batching(&self) -> bool {
        self.inner.borrow().batching
    }

    /// Whether held updates are waiting for an emitting update.
    pub fn is_holding(&self) -> bool {
        !self.inner.borrow().held.is_empty()
    }

    /// Update `field` by merging `update` over its props.
    ///
    /// Unknown ids are created from [`Props::from_id`]. See the type-level
    /// docs for how batching and holding affect when the merge is committed
    /// and notified.
    pub fn update(&self, field: impl Into<FieldId>, update: Update<P>, config: UpdateConfig) {
        let field = field.into();

        if self.is_batching() {
            self.batch_update(field, update);
            return;
        }

        if !config.emit_updates {
            let mut inner = self.inner.borrow_mut();
            if inner.held.is_empty() {
                debug!(store = %inner.config.label, %field, "holding updates");
            }
            inner.held.push(HeldUpdate {
                field,
                update,
                config,
            });
            return;
        }

        let held = std::mem::take(&mut self.inner.borrow_mut().held);
        if !held.is_empty() {
            debug!(store = %self.label(), count = held.len(), "emitting held updates");
            for held in held {
                trace!(field = %held.field, config = ?held.config, "replaying held update");
                self.apply(held.field, held.update);
            }
        }

        self.apply(field, update);
    }

    /// Merge `patch` into `field` with the default configuration.
    pub fn patch(&self, field: impl Into<FieldId>, patch: P::Patch) {
        self.update(field, Update::Patch(patch), UpdateConfig::default());
    }

    /// Compute a patch from the field's current props and merge it, with the
    /// default configuration.
    pub fn update_with(&self, field: impl Into<FieldId>, f: impl FnOnce(&P) -> P::Patch + 'static) {
        self.update(field, Update::with(f), UpdateConfig::default());
    }

    /// Remove `field` together with all of its subscribers.
    ///
    /// Removed subscribers are not notified. Updates to `field` staged in an
    /// open batch or held back are discarded. List subscribers receive the new
    /// id list if the field existed.
    pub fn delete(&self, field: &FieldId) {
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.remove(field);
            inner.batched.shift_remove(field);
            inner.held.retain(|held| &held.field != field);

            if inner.fields.shift_remove(field).is_none() {
                return;
            }
            debug!(store = %inner.config.label, %field, "field deleted");
            inner.list_snapshot()
        };

        if let Some((ids, subscribers)) = snapshot {
            notify_list(&ids, &subscribers);
        }
    }

    /// Register `subscriber` to be called with the new props of `field` on
    /// every emitted update. Subscribers of one field run in registration
    /// order.
    pub fn subscribe(&self, field: impl Into<FieldId>, subscriber: impl Fn(&P) + 'static) -> Subscription {
        let field = field.into();
        let subscriber: Subscriber<P> = Rc::new(subscriber);
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner
            .subscribers
            .entry(field.clone())
            .or_default()
            .push((id, subscriber));
        trace!(store = %inner.config.label, %field, ?id, "subscribed");

        Subscription::new(self.detach_handle(), Target::Field(field), id)
    }

    /// Register `subscriber` to be called with the ordered id list whenever
    /// fields are added or removed. Props-only updates do not trigger it.
    pub fn subscribe_to_list(&self, subscriber: impl Fn(&[FieldId]) + 'static) -> Subscription {
        let subscriber: ListSubscriber = Rc::new(subscriber);
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.list_subscribers.push((id, subscriber));
        trace!(store = %inner.config.label, ?id, "subscribed to list");

        Subscription::new(self.detach_handle(), Target::List, id)
    }

    /// Start batching. Has no effect if a batch is already open.
    pub fn batch_init(&self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.batching {
            inner.batching = true;
            debug!(store = %inner.config.label, "batch started");
        }
    }

    /// Commit every batched field, in the order the fields were first
    /// updated during the batch.
    ///
    /// Field subscribers are not notified of the commit. List subscribers are
    /// notified once if the batch created new fields.
    pub fn batch_finish(&self) {
        let snapshot = {
            let mut inner = self.inner.borrow_mut();
            if !inner.batching {
                return;
            }
            inner.batching = false;

            let batched = std::mem::take(&mut inner.batched);
            let count = batched.len();
            let mut created = false;
            for (field, props) in batched {
                created |= inner.fields.insert(field, props).is_none();
            }
            debug!(store = %inner.config.label, fields = count, "batch finished");

            if created {
                inner.list_snapshot()
            } else {
                None
            }
        };

        if let Some((ids, subscribers)) = snapshot {
            notify_list(&ids, &subscribers);
        }
    }

    /// Reorder fields by `compare`. Only iteration order changes.
    ///
    /// `compare` sees a copy of the fields and may read the store. Fields
    /// created while sorting keep their place after the sorted ones.
    pub fn sort_fields(&self, mut compare: impl FnMut((&FieldId, &P), (&FieldId, &P)) -> Ordering) {
        let mut entries: Vec<(FieldId, P)> = self.fields().into_iter().collect();
        entries.sort_by(|(k1, v1), (k2, v2)| compare((k1, v1), (k2, v2)));

        let rank: FxHashMap<FieldId, usize> = entries
            .into_iter()
            .enumerate()
            .map(|(rank, (field, _))| (field, rank))
            .collect();
        let rank_of = |field: &FieldId| rank.get(field).copied().unwrap_or(usize::MAX);

        let mut inner = self.inner.borrow_mut();
        inner
            .fields
            .sort_by(|k1, _, k2, _| rank_of(k1).cmp(&rank_of(k2)));
        debug!(store = %inner.config.label, "fields sorted");
    }

    fn detach_handle(&self) -> Weak<dyn Detach> {
        let weak: Weak<RefCell<StoreInner<P>>> = Rc::downgrade(&self.inner);
        weak
    }

    fn batch_update(&self, field: FieldId, update: Update<P>) {
        let authoritative = self.inner.borrow().current(&field);
        let patch = update.into_patch(&authoritative);

        let mut inner = self.inner.borrow_mut();
        trace!(store = %inner.config.label, %field, "batched update");
        inner
            .batched
            .entry(field)
            .or_insert(authoritative)
            .merge(patch);
    }

    /// Merge, commit and notify a single update.
    fn apply(&self, field: FieldId, update: Update<P>) {
        let mut props = self.inner.borrow().current(&field);
        let patch = update.into_patch(&props);
        props.merge(patch);

        let (subscribers, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            let created = inner.fields.insert(field.clone(), props.clone()).is_none();
            if created {
                debug!(store = %inner.config.label, %field, "field created");
            }
            let snapshot = if created { inner.list_snapshot() } else { None };
            (inner.field_subscribers(&field), snapshot)
        };

        trace!(%field, subscribers = subscribers.len(), "notify");
        for subscriber in &subscribers {
            subscriber(&props);
        }
        if let Some((ids, subscribers)) = snapshot {
            notify_list(&ids, &subscribers);
        }
    }
}

fn notify_list(ids: &[FieldId], subscribers: &[ListSubscriber]) {
    trace!(fields = ids.len(), subscribers = subscribers.len(), "notify list");
    for subscriber in subscribers {
        subscriber(ids);
    }
}

impl<P: Props> Clone for Store<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: Props> Default for Store<P> {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl<P: Props + fmt::Debug> fmt::Debug for Store<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("label", &inner.config.label)
            .field("fields", &inner.fields)
            .field("batching", &inner.batching)
            .field("held", &inner.held.len())
            .finish()
    }
}
