//! Telegram init-data parsing and canonicalization
//!
//! Init-data arrives as a URL-query-encoded string
//! (`query_id=...&user=%7B...%7D&auth_date=1700000000&hash=ab12...`).
//! The `hash` field is the detached signature; every other field takes part
//! in the data-check string.

use super::telegram::InitDataError;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Name of the signature field
pub const SIGNATURE_FIELD: &str = "hash";

/// Decoded login payload: signed fields plus the detached signature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPayload {
    fields: BTreeMap<String, String>,
    signature: Option<String>,
}

impl LoginPayload {
    /// Parse a raw init-data query string
    ///
    /// Empty segments are skipped. A segment without `=`, an empty key, an
    /// undecodable value or a repeated key makes the whole payload malformed.
    pub fn parse(raw: &str) -> Result<Self, InitDataError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(InitDataError::MalformedPayload("empty init data".to_string()));
        }

        let mut decoded = BTreeMap::new();
        for segment in raw.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                InitDataError::MalformedPayload(format!("segment without '=': {}", segment))
            })?;

            let key = decode_component(key)?;
            if key.is_empty() {
                return Err(InitDataError::MalformedPayload("empty key".to_string()));
            }
            let value = decode_component(value)?;

            match decoded.entry(key) {
                Entry::Occupied(entry) => {
                    return Err(InitDataError::MalformedPayload(format!(
                        "duplicate key: {}",
                        entry.key()
                    )));
                }
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }

        if decoded.is_empty() {
            return Err(InitDataError::MalformedPayload("no fields".to_string()));
        }

        Ok(Self::from_fields(decoded))
    }

    /// Build a payload from already-decoded fields
    ///
    /// The `hash` entry, if any, becomes the detached signature.
    pub fn from_fields(mut fields: BTreeMap<String, String>) -> Self {
        let signature = fields.remove(SIGNATURE_FIELD);
        Self { fields, signature }
    }

    /// Signed fields, excluding the signature
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Look up a signed field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The detached signature, if the payload carried one
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Canonical data-check string of the signed fields
    pub fn data_check_string(&self) -> String {
        data_check_string(&self.fields)
    }

    pub(crate) fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }
}

/// Sort by key and join as `key=value` lines separated by `\n`
///
/// `BTreeMap` iterates in byte-wise key order, so the output is
/// deterministic for a given field set.
pub fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Encode fields (plus signature) back into an init-data query string
pub fn encode_query(fields: &BTreeMap<String, String>, signature: Option<&str>) -> String {
    let mut parts: Vec<String> = fields
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect();
    if let Some(signature) = signature {
        parts.push(format!("{}={}", SIGNATURE_FIELD, urlencoding::encode(signature)));
    }
    parts.join("&")
}

fn decode_component(component: &str) -> Result<String, InitDataError> {
    let spaced = component.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| InitDataError::MalformedPayload("invalid percent-encoding".to_string()))
}
