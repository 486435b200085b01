//! # fieldstore
//!
//! A keyed publish/subscribe state store for UI code.
//!
//! Components render from state that is mutated elsewhere. Instead of one
//! global state object whose every change re-renders everything, state is
//! split into fields keyed by [`FieldId`], and each component subscribes to
//! the one field it renders.
//!
//! ## Store
//!
//! - [`Store<P>`] - Keyed props records with per-field and list subscribers
//! - Batching (`batch_init`/`batch_finish`) collapses many updates into one
//!   silent commit
//! - Holding (`UpdateConfig::held()`) defers updates until the next emitting
//!   update replays them
//! - [`SingleStore<P>`] - The same store restricted to one field
//! - [`registry`] - Look up stores by name
//!
//! ## Hooks
//!
//! - [`hooks::use_selector`] - Re-render only when a selected slice changes
//! - [`hooks::FieldsList`] - Track the id list as fields come and go

pub mod config;
pub mod error;
pub mod field;
pub mod hooks;
pub mod registry;
pub mod store;

// Re-export main types for convenience
pub use config::{StoreConfig, UpdateConfig};
pub use error::{Error, Result};
pub use field::{FieldId, Props, Record};
pub use store::{Fields, SingleStore, Store, Subscription, SubscriptionId, Update, STATE_ID};
