//! Size-bounded JSON serialization.
//!
//! [`BoundedSerializer`] turns a value into JSON that fits a byte budget. Values
//! that already fit are emitted as they are. Oversized objects are rebuilt
//! greedily: the identity field goes first and is always kept, then the other
//! fields in ascending name order until the next one would overflow. The result
//! stays valid JSON. Values that are not objects fall back to
//! [`NonObjectPolicy`].
//!
//! ```rust
//! use serde_json::json;
//! use smartlog::{ByteBudget, bounded_serialize};
//!
//! let row = json!({"ID": 7, "alpha": "aaaa", "beta": 1, "gamma": true});
//! let bytes = bounded_serialize(&row, ByteBudget::Bytes(30), "ID").unwrap();
//! assert_eq!(bytes, br#"{"ID":7,"alpha":"aaaa"}"#);
//! ```

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

use crate::error::Result;

/// Field name kept first and unconditionally when truncating.
pub const DEFAULT_IDENTITY_FIELD: &str = "ID";

/// Bytes taken by the `{}` of an empty object.
const OBJECT_DELIMITERS: usize = 2;

/// Maximum size of a serialized result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ByteBudget {
    /// No truncation.
    #[default]
    Unbounded,
    Bytes(usize),
}

impl ByteBudget {
    /// Maps a configured limit to a budget. Zero and negative limits mean unbounded.
    pub fn from_limit(limit: i64) -> Self {
        match usize::try_from(limit) {
            Ok(0) | Err(_) => Self::Unbounded,
            Ok(bytes) => Self::Bytes(bytes),
        }
    }
}

impl From<i64> for ByteBudget {
    fn from(limit: i64) -> Self {
        Self::from_limit(limit)
    }
}

/// What to emit when an oversized value is not a JSON object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonObjectPolicy {
    /// Cut the serialized bytes at exactly the budget. The output may not be
    /// valid JSON.
    #[default]
    RawSlice,
    /// Emit a JSON string noting the original size. Always valid JSON, and it
    /// may exceed small budgets.
    Sentinel,
}

/// Serializer that keeps output within a [`ByteBudget`].
#[derive(Clone, Debug)]
pub struct BoundedSerializer {
    budget: ByteBudget,
    identity_field: String,
    non_object: NonObjectPolicy,
}

impl BoundedSerializer {
    pub fn new(budget: ByteBudget) -> Self {
        Self {
            budget,
            identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
            non_object: NonObjectPolicy::default(),
        }
    }

    /// Uses another identity field. Matching is exact and case-sensitive.
    #[must_use]
    pub fn with_identity_field(mut self, field: impl Into<String>) -> Self {
        self.identity_field = field.into();
        self
    }

    #[must_use]
    pub fn with_non_object_policy(mut self, policy: NonObjectPolicy) -> Self {
        self.non_object = policy;
        self
    }

    pub fn budget(&self) -> ByteBudget {
        self.budget
    }

    pub fn identity_field(&self) -> &str {
        &self.identity_field
    }

    /// Serializes `value`, truncating it when its JSON exceeds the budget.
    ///
    /// # Errors
    ///
    /// Fails only when `value` itself cannot be serialized to JSON.
    pub fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let canonical = serde_json::to_vec(value)?;
        let ByteBudget::Bytes(limit) = self.budget else {
            return Ok(canonical);
        };
        if canonical.len() <= limit {
            return Ok(canonical);
        }

        // Truncation works on the generic object view, whatever `T` was.
        match serde_json::from_slice::<Value>(&canonical) {
            Ok(Value::Object(object)) => truncate_object(&object, limit, &self.identity_field),
            _ => self.non_object_fallback(canonical, limit),
        }
    }

    fn non_object_fallback(&self, mut canonical: Vec<u8>, limit: usize) -> Result<Vec<u8>> {
        match self.non_object {
            NonObjectPolicy::RawSlice => {
                canonical.truncate(limit);
                Ok(canonical)
            }
            NonObjectPolicy::Sentinel => {
                let note = format!("[TRUNCATED non-object result: {} bytes]", canonical.len());
                Ok(serde_json::to_vec(&note)?)
            }
        }
    }
}

/// Serializes `value` within `budget`, keeping `identity_field` first.
///
/// Non-object values over budget are cut with [`NonObjectPolicy::RawSlice`].
/// Use [`BoundedSerializer`] to pick another policy.
pub fn bounded_serialize<T: Serialize + ?Sized>(
    value: &T,
    budget: ByteBudget,
    identity_field: &str,
) -> Result<Vec<u8>> {
    BoundedSerializer::new(budget)
        .with_identity_field(identity_field)
        .serialize(value)
}

/// Object fields serialized in the given order.
struct OrderedFields<'a>(Vec<(&'a str, &'a Value)>);

impl Serialize for OrderedFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Size charged for one field: its singleton object, less the one delimiter it
/// is assumed to share once merged. This overcounts by a byte per extra field,
/// so accepted output always comes in under the budget.
fn field_cost(name: &str, value: &Value) -> Result<usize> {
    let fragment = serde_json::to_vec(&OrderedFields(vec![(name, value)]))?;
    Ok(fragment.len().saturating_sub(1))
}

fn truncate_object(
    object: &Map<String, Value>,
    limit: usize,
    identity_field: &str,
) -> Result<Vec<u8>> {
    let mut kept = OrderedFields(Vec::with_capacity(object.len()));
    let mut used = OBJECT_DELIMITERS;

    if let Some(value) = object.get(identity_field) {
        used += field_cost(identity_field, value)?;
        kept.0.push((identity_field, value));
    }

    let mut names: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|name| *name != identity_field)
        .collect();
    names.sort_unstable();

    for name in names {
        let Some(value) = object.get(name) else {
            continue;
        };
        let cost = field_cost(name, value)?;
        if used + cost > limit {
            break;
        }
        used += cost;
        kept.0.push((name, value));
    }

    Ok(serde_json::to_vec(&kept)?)
}
