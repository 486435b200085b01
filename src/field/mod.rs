//! Field identifiers and the props records stored under them.

mod id;
mod props;
mod record;

pub use id::FieldId;
pub use props::Props;
pub use record::{MissingId, Record};
