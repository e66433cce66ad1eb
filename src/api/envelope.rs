//! Decoding of the admin API's response envelopes.
//!
//! Listings look like `{success, <plural>: [...], last_<singular>: cursor}`;
//! single-resource calls look like `{success, <singular>: {...}}`. A body
//! with `success: false` is treated as a rejected request even on 2xx.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::{ClientError, Result};

/// Opaque continuation token; absence means end of data
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret a `last_*` field. Null, missing and empty all mean "no more".
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::String(s) if !s.is_empty() => Some(Cursor(s.clone())),
            Value::Number(n) => Some(Cursor(n.to_string())),
            Value::Object(map) => match map.get("id") {
                Some(Value::String(id)) if !id.is_empty() => Some(Cursor(id.clone())),
                Some(Value::Number(n)) => Some(Cursor(n.to_string())),
                _ => Some(Cursor(Value::Object(map.clone()).to_string())),
            },
            _ => None,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a listing, in server order
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<Cursor>) -> Self {
        Self { items, cursor }
    }

    /// A page that ends the listing
    pub fn last(items: Vec<T>) -> Self {
        Self { items, cursor: None }
    }
}

/// Field names of one listing endpoint's envelope
#[derive(Debug, Clone, Copy)]
pub struct ListingKeys {
    pub items: &'static str,
    pub cursor: Option<&'static str>,
}

impl ListingKeys {
    pub const fn paged(items: &'static str, cursor: &'static str) -> Self {
        Self {
            items,
            cursor: Some(cursor),
        }
    }

    pub const fn unpaged(items: &'static str) -> Self {
        Self { items, cursor: None }
    }
}

/// Error message carried by a body, if any
pub fn error_message(body: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string))
}

/// Reject `success: false` bodies that arrived with a 2xx status
pub fn ensure_success(status: u16, body: &Value, fallback: &str) -> Result<()> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = error_message(body).unwrap_or_else(|| fallback.to_string());
        return Err(ClientError::api(status, message));
    }
    Ok(())
}

/// Decode a listing body. A missing items array is an empty page.
pub fn decode_page<T: DeserializeOwned>(body: &Value, keys: ListingKeys) -> Result<Page<T>> {
    let items = match body.get(keys.items) {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ClientError::decode(format!("{}: {}", keys.items, e)))?,
    };
    let cursor = keys.cursor.and_then(|key| Cursor::from_value(body.get(key)));
    Ok(Page { items, cursor })
}

/// Decode a required field of a single-resource body
pub fn decode_field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T> {
    let value = body
        .get(key)
        .ok_or_else(|| ClientError::decode(format!("missing '{key}' in response")))?;
    serde_json::from_value(value.clone()).map_err(|e| ClientError::decode(format!("{key}: {e}")))
}
