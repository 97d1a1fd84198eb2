// Passive Identity request/response payloads
//
// Request bodies are typed so the wire shape is fixed in one place.
// Responses are kept as raw JSON: the service owns their schema and the
// client only ever looks at the `id` of a created mapping.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::Error;

/// Wire format for mapping timestamps: UTC, second precision, `Z` suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Render a timestamp in [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp that must be exactly `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Offsets, fractional seconds and unpadded fields are rejected.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Error> {
    let invalid = || Error::InvalidTimestamp {
        value: raw.to_owned(),
    };

    let parsed = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| invalid())?
        .and_utc();

    // chrono tolerates missing zero padding; the service does not.
    if format_timestamp(&parsed) != raw {
        return Err(invalid());
    }
    Ok(parsed)
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

/// Port Address Translation range attached to a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatRange {
    pub user_pat_start: u32,
    pub user_pat_end: u32,
    pub pat_range_start: u32,
}

impl PatRange {
    /// Build a range only when all three values are present.
    ///
    /// Zero counts as present.
    pub fn from_parts(
        user_pat_start: Option<u32>,
        user_pat_end: Option<u32>,
        pat_range_start: Option<u32>,
    ) -> Option<Self> {
        Some(Self {
            user_pat_start: user_pat_start?,
            user_pat_end: user_pat_end?,
            pat_range_start: pat_range_start?,
        })
    }
}

/// Body of `POST /api/identity/v1/identity/useridentity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMapping {
    pub user: String,
    pub src_ip_address: String,
    pub agent_info: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_pat_range: Option<PatRange>,
}

impl IdentityMapping {
    pub fn new(
        user: impl Into<String>,
        src_ip_address: impl Into<String>,
        agent_info: impl Into<String>,
        timestamp: DateTime<Utc>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            src_ip_address: src_ip_address.into(),
            agent_info: agent_info.into(),
            timestamp,
            domain: domain.into(),
            src_pat_range: None,
        }
    }

    /// Attach (or clear) the PAT range.
    pub fn with_pat_range(mut self, range: Option<PatRange>) -> Self {
        self.src_pat_range = range;
        self
    }
}

/// A created mapping exactly as the service returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingRecord(pub Value);

impl MappingRecord {
    /// The mapping identifier used for deletion.
    ///
    /// Accepts string or numeric ids.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}
