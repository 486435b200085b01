use super::FieldId;

/// A record of state tracked by a [`Store`](crate::Store).
///
/// Every props value carries its own id. Updates are expressed as a
/// [`Patch`](Props::Patch), a partial value that is shallow-merged over the
/// previous props.
///
/// # Example
///
/// ```
/// use fieldstore::{FieldId, Props};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Cell {
///     id: FieldId,
///     value: i32,
///     valid: bool,
/// }
///
/// #[derive(Default)]
/// struct CellPatch {
///     value: Option<i32>,
///     valid: Option<bool>,
/// }
///
/// impl Props for Cell {
///     type Patch = CellPatch;
///
///     fn from_id(id: FieldId) -> Self {
///         Cell { id, value: 0, valid: true }
///     }
///
///     fn id(&self) -> &FieldId {
///         &self.id
///     }
///
///     fn merge(&mut self, patch: CellPatch) {
///         if let Some(value) = patch.value {
///             self.value = value;
///         }
///         if let Some(valid) = patch.valid {
///             self.valid = valid;
///         }
///     }
/// }
/// ```
pub trait Props: Clone + 'static {
    /// Partial update shape.
    type Patch: 'static;

    /// The record synthesized for an id the store has never seen.
    fn from_id(id: FieldId) -> Self;

    /// The id this record is stored under.
    fn id(&self) -> &FieldId;

    /// Shallow-merge `patch` over `self`. Must not change the id.
    fn merge(&mut self, patch: Self::Patch);

    /// Returns a copy of `self` with `patch` merged over it.
    fn merged(&self, patch: Self::Patch) -> Self {
        let mut next = self.clone();
        next.merge(patch);
        next
    }
}
