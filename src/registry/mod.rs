//! Name-to-store registry.
//!
//! Lets any code on the current thread retrieve a [`Store`] by name instead of
//! threading the handle through every call site. Stores are single-threaded,
//! so the registry is per thread; in a single-threaded program it is the
//! process-wide registry.
//!
//! ```
//! use fieldstore::{registry, Record, Store};
//!
//! registry::register("rows", Store::<Record>::default());
//!
//! let rows = registry::lookup::<Record>("rows").unwrap();
//! rows.patch(1, Record::patch(serde_json::json!({ "checked": true })));
//! assert!(registry::lookup::<Record>("rows").unwrap().contains(&1.into()));
//! ```

use crate::error::{Error, Result};
use crate::field::Props;
use crate::store::Store;
use rustc_hash::FxHashMap;
use std::any::{type_name, Any};
use std::cell::RefCell;
use tracing::debug;

struct Entry {
    store: Box<dyn Any>,
    props: &'static str,
}

thread_local! {
    static REGISTRY: RefCell<FxHashMap<String, Entry>> = RefCell::new(FxHashMap::default());
}

/// Register `store` under `name`, replacing any previous entry.
pub fn register<P: Props>(name: impl Into<String>, store: Store<P>) {
    let name = name.into();
    debug!(%name, props = type_name::<P>(), "store registered");
    REGISTRY.with(|registry| {
        registry.borrow_mut().insert(
            name,
            Entry {
                store: Box::new(store),
                props: type_name::<P>(),
            },
        );
    });
}

/// The store registered under `name`.
///
/// Returns `None` when nothing is registered or the registered store holds a
/// different props type.
pub fn lookup<P: Props>(name: &str) -> Option<Store<P>> {
    fetch(name).ok()
}

/// Like [`lookup`], but reports why the store could not be returned.
pub fn fetch<P: Props>(name: &str) -> Result<Store<P>> {
    REGISTRY.with(|registry| {
        let registry = registry.borrow();
        let entry = registry.get(name).ok_or_else(|| Error::NotRegistered {
            name: name.to_owned(),
        })?;

        entry
            .store
            .downcast_ref::<Store<P>>()
            .cloned()
            .ok_or_else(|| {
                debug!(name, registered = entry.props, requested = type_name::<P>(), "props type mismatch");
                Error::TypeMismatch {
                    name: name.to_owned(),
                    expected: type_name::<P>(),
                }
            })
    })
}

/// Remove the entry for `name`. Returns whether one existed.
pub fn unregister(name: &str) -> bool {
    REGISTRY.with(|registry| registry.borrow_mut().remove(name).is_some())
}

/// Names of all registered stores, sorted.
pub fn names() -> Vec<String> {
    REGISTRY.with(|registry| {
        let mut names: Vec<String> = registry.borrow().keys().cloned().collect();
        names.sort();
        names
    })
}

/// Drop every entry. Intended for tests.
pub fn reset() {
    REGISTRY.with(|registry| registry.borrow_mut().clear());
}
