//! Store and update configuration.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Per-call options for [`Store::update`](crate::Store::update).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateConfig {
    /// When `false`, the update is held instead of being applied. Held updates
    /// are replayed, in call order, by the next update that emits.
    pub emit_updates: bool,
}

impl UpdateConfig {
    /// Configuration that holds the update back.
    pub const fn held() -> Self {
        Self {
            emit_updates: false,
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self { emit_updates: true }
    }
}

/// Construction options for a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name attached to every log event the store emits.
    pub label: Cow<'static, str>,
}

impl StoreConfig {
    pub fn labeled(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("store"),
        }
    }
}
