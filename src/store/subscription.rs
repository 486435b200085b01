use crate::field::FieldId;
use std::cell::Cell;
use std::fmt;
use std::rc::Weak;

/// Identifies one registration within a store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// What a subscription listens to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    Field(FieldId),
    List,
}

/// Removes registrations from the store that issued them.
pub(crate) trait Detach {
    fn detach(&self, target: &Target, id: SubscriptionId);
}

/// Handle returned by [`Store::subscribe`](crate::Store::subscribe) and
/// [`Store::subscribe_to_list`](crate::Store::subscribe_to_list).
///
/// Dropping the handle does not unsubscribe; the callback stays registered
/// until [`unsubscribe`](Subscription::unsubscribe) is called or the field is
/// deleted. Unsubscribing more than once has no further effect.
pub struct Subscription {
    store: Weak<dyn Detach>,
    target: Target,
    id: SubscriptionId,
    active: Cell<bool>,
}

impl Subscription {
    pub(crate) fn new(store: Weak<dyn Detach>, target: Target, id: SubscriptionId) -> Self {
        Self {
            store,
            target,
            id,
            active: Cell::new(true),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The field this subscription listens to, or `None` for list
    /// subscriptions.
    pub fn field(&self) -> Option<&FieldId> {
        match &self.target {
            Target::Field(field) => Some(field),
            Target::List => None,
        }
    }

    /// Whether [`unsubscribe`](Subscription::unsubscribe) has not been called
    /// yet. Stays `true` after the field is deleted.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Removes exactly this registration from the store.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(store) = self.store.upgrade() {
            store.detach(&self.target, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("target", &self.target)
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}
