//! Error types.

use thiserror::Error;

/// Errors returned by the strict registry accessor
/// [`registry::fetch`](crate::registry::fetch).
///
/// Store operations themselves never fail: unknown ids read as `None` and
/// updates to unknown ids create the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no store registered under `{name}`")]
    NotRegistered { name: String },

    #[error("store `{name}` does not hold props of type `{expected}`")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
