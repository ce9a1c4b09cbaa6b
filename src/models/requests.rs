//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies and their
//! normalization into validated values.

use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

use crate::store::NAME_MAX_CHARS;

/// Accepts strings plus numbers and booleans (rendered as text). `null` and
/// absent fields read as `None`.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {}",
            other
        ))),
    }
}

/// Truncates to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Request body for POST /api/test
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRecordRequest {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: Option<String>,
}

/// A validated record ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub value: String,
}

impl CreateRecordRequest {
    /// Trims both fields, truncates `name` to `NAME_MAX_CHARS` and defaults
    /// `value` to empty. Fails when `name` is absent or blank.
    pub fn normalize(self) -> Result<NewRecord, String> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| "Missing name".to_string())?;

        Ok(NewRecord {
            name: truncate_chars(name, NAME_MAX_CHARS),
            value: self.value.as_deref().unwrap_or_default().trim().to_string(),
        })
    }
}

/// Request body for POST /api/cache
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds; non-positive values mean no expiry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetCacheRequest {
    #[serde(default, deserialize_with = "scalar_string")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: Option<String>,
    #[serde(default)]
    pub ttl: Option<i64>,
}

/// A validated cache write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheWrite {
    pub key: String,
    pub value: String,
    pub ttl: Option<u64>,
}

impl SetCacheRequest {
    pub fn normalize(self) -> Result<CacheWrite, String> {
        let missing = || "Missing key or value".to_string();

        let key = self.key.as_deref().map(str::trim).ok_or_else(missing)?;
        let value = self.value.as_deref().map(str::trim).ok_or_else(missing)?;
        if key.is_empty() {
            return Err(missing());
        }

        Ok(CacheWrite {
            key: key.to_string(),
            value: value.to_string(),
            ttl: self
                .ttl
                .filter(|ttl| *ttl > 0)
                .and_then(|ttl| u64::try_from(ttl).ok()),
        })
    }
}
