//! Consumers that derive render-ready values from a store.
//!
//! - [`Selection`]: a selected slice of one field, re-rendered only when the
//!   selection changes under a comparator.
//! - [`FieldsList`]: the ordered id list of a store, re-rendered when fields
//!   are added or removed.
//!
//! Both only read and subscribe; neither writes to the store.

mod fields_list;
mod selection;

pub use fields_list::FieldsList;
pub use selection::{use_selector, use_selector_with, use_state_selector, Selection};
