use crate::config::UpdateConfig;
use crate::field::{FieldId, Props};
use std::fmt;

/// Payload of a [`Store::update`](crate::Store::update) call.
pub enum Update<P: Props> {
    /// A partial value merged over the previous props.
    Patch(P::Patch),
    /// Computes the patch from the field's authoritative props.
    ///
    /// The function sees the committed value even while a batch or a hold is
    /// pending. For an unknown id it receives the synthesized `{id}` record.
    With(Box<dyn FnOnce(&P) -> P::Patch>),
}

impl<P: Props> Update<P> {
    /// Box `f` as a function payload.
    pub fn with(f: impl FnOnce(&P) -> P::Patch + 'static) -> Self {
        Update::With(Box::new(f))
    }

    /// Resolve the payload into a patch, reading from `current` when needed.
    pub(crate) fn into_patch(self, current: &P) -> P::Patch {
        match self {
            Update::Patch(patch) => patch,
            Update::With(f) => f(current),
        }
    }
}

impl<P: Props> fmt::Debug for Update<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Patch(_) => f.write_str("Update::Patch(..)"),
            Update::With(_) => f.write_str("Update::With(..)"),
        }
    }
}

/// An update deferred while the store is holding.
pub(crate) struct HeldUpdate<P: Props> {
    pub(crate) field: FieldId,
    pub(crate) update: Update<P>,
    pub(crate) config: UpdateConfig,
}
