use super::{FieldId, Props};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ID_KEY: &str = "id";

/// Dynamic props backed by a JSON object.
///
/// The `"id"` key always holds the record's [`FieldId`]. Patches are JSON
/// objects whose keys replace the record's keys one by one; nested objects are
/// replaced wholesale, not merged.
///
/// ```
/// use fieldstore::{Props, Record};
/// use serde_json::json;
///
/// let mut row = Record::new("a");
/// row.merge(Record::patch(json!({ "count": 1, "label": "first" })));
/// assert_eq!(row.get("count"), Some(&json!(1)));
/// assert_eq!(row.id().as_str(), Some("a"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    id: FieldId,
    values: Map<String, Value>,
}

impl Record {
    /// Creates a record holding only its id.
    pub fn new(id: impl Into<FieldId>) -> Self {
        let id = id.into();
        let mut values = Map::new();
        values.insert(ID_KEY.to_owned(), id_value(&id));
        Self { id, values }
    }

    /// Builds a patch from a JSON value.
    ///
    /// Non-object values produce an empty patch.
    pub fn patch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Sets a single key. Writes to `"id"` are ignored.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if key != ID_KEY {
            self.values.insert(key, value);
        }
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

impl Props for Record {
    type Patch = Map<String, Value>;

    fn from_id(id: FieldId) -> Self {
        Record::new(id)
    }

    fn id(&self) -> &FieldId {
        &self.id
    }

    fn merge(&mut self, patch: Self::Patch) {
        for (key, value) in patch {
            self.set(key, value);
        }
    }
}

fn id_value(id: &FieldId) -> Value {
    match id {
        FieldId::Num(n) => Value::from(*n),
        FieldId::Str(s) => Value::from(s.as_str()),
    }
}

/// Error returned when a JSON object cannot be used as a [`Record`].
#[derive(Debug, thiserror::Error)]
#[error("record is missing a string or integer `id`")]
pub struct MissingId;

impl TryFrom<Map<String, Value>> for Record {
    type Error = MissingId;

    fn try_from(values: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match values.get(ID_KEY) {
            Some(Value::String(s)) => FieldId::Str(s.clone()),
            Some(Value::Number(n)) => n.as_i64().map(FieldId::Num).ok_or(MissingId)?,
            _ => return Err(MissingId),
        };
        Ok(Self { id, values })
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.values
    }
}
