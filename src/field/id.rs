use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a field in a [`Store`](crate::Store).
///
/// Ids are either strings or numbers. The two kinds never compare equal:
/// `FieldId::from("1")` and `FieldId::from(1)` address different fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldId {
    Num(i64),
    Str(String),
}

impl FieldId {
    /// The string form of this id, if it is a string id.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldId::Str(s) => Some(s),
            FieldId::Num(_) => None,
        }
    }

    /// The numeric form of this id, if it is a numeric id.
    pub fn as_num(&self) -> Option<i64> {
        match self {
            FieldId::Num(n) => Some(*n),
            FieldId::Str(_) => None,
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldId::Num(n) => write!(f, "{n}"),
            FieldId::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        FieldId::Str(value.to_owned())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        FieldId::Str(value)
    }
}

impl From<&String> for FieldId {
    fn from(value: &String) -> Self {
        FieldId::Str(value.clone())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldId {
                fn from(value: $ty) -> Self {
                    FieldId::Num(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);
