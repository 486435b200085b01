//! Keyed state management with stores.
//!
//! A [`Store`] maps field ids to props records and notifies per-field and
//! whole-list subscribers when those records change. [`SingleStore`] is the
//! same store restricted to one field, for plain application state.

mod single;
mod store;
mod subscription;
mod update;

pub use single::{SingleStore, STATE_ID};
pub use store::{Fields, Store};
pub use subscription::{Subscription, SubscriptionId};
pub use update::Update;
