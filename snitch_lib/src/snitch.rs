//! Snitch resource model: construction, validation, and parsing of API responses.

use crate::error::ValidationError;
use crate::helpers::parse_time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const REQUIRED_OPTIONS: [&str; 2] = ["name", "interval"];

/// Expected check-in period of a snitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "15_minute")]
    FifteenMinute,
    #[serde(rename = "30_minute")]
    ThirtyMinute,
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::FifteenMinute,
        Interval::ThirtyMinute,
        Interval::Hourly,
        Interval::Daily,
        Interval::Weekly,
        Interval::Monthly,
    ];

    /// Wire value, e.g. `15_minute`.
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::FifteenMinute => "15_minute",
            Interval::ThirtyMinute => "30_minute",
            Interval::Hourly => "hourly",
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidInterval(s.to_string()))
    }
}

/// Caller-supplied options for [`Snitch::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SnitchOptions {
    pub name: Option<String>,
    pub interval: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl SnitchOptions {
    pub fn new(name: impl Into<String>, interval: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            interval: Some(interval.into()),
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// A heartbeat monitor.
///
/// Built locally with [`Snitch::new`] (no token yet) or hydrated from an API
/// response with [`Snitch::parse`] (token and server fields present).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snitch {
    pub name: String,
    pub interval: Interval,
    pub notes: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub checked_in_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Request body for create and edit: `{name, type: {interval}, notes, tags}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnitchPayload<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub kind: PayloadType,
    pub notes: &'a str,
    pub tags: &'a [String],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayloadType {
    pub interval: Interval,
}

impl Snitch {
    /// Validate options and build an unsaved snitch.
    ///
    /// Every missing required option is reported at once; an unknown interval is
    /// reported by value.
    pub fn new(options: SnitchOptions) -> Result<Self, ValidationError> {
        let SnitchOptions {
            name,
            interval,
            notes,
            tags,
        } = options;
        let name = name.filter(|n| !n.is_empty());
        let interval = interval.filter(|i| !i.is_empty());

        let (name, interval) = match (name, interval) {
            (Some(name), Some(interval)) => (name, interval),
            (name, interval) => {
                let missing = REQUIRED_OPTIONS
                    .into_iter()
                    .zip([name.is_none(), interval.is_none()])
                    .filter_map(|(option, missing)| missing.then_some(option))
                    .collect();
                return Err(ValidationError::MissingOptions(missing));
            }
        };
        let interval = interval.parse::<Interval>()?;

        Ok(Self {
            name,
            interval,
            notes: notes.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
            token: None,
            href: None,
            status: None,
            checked_in_at: None,
            check_in_url: None,
            created_at: None,
        })
    }

    /// Build a snitch from a decoded API object.
    ///
    /// Requires `name` and `type.interval`. The other known fields are copied when
    /// they have the expected type and dropped otherwise; unknown fields are ignored.
    /// Non-null `created_at` / `checked_in_at` become timestamps.
    pub fn parse(data: &Value) -> Result<Self, ValidationError> {
        if !data.is_object() {
            return Err(ValidationError::InvalidData);
        }
        let name = data
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::InvalidData)?;
        let interval = data
            .get("type")
            .and_then(|t| t.get("interval"))
            .and_then(Value::as_str)
            .filter(|i| !i.is_empty())
            .ok_or(ValidationError::InvalidData)?;

        let mut snitch = Snitch::new(SnitchOptions::new(name, interval))?;
        snitch.token = text_field(data, "token");
        snitch.href = text_field(data, "href");
        snitch.tags = tags_field(data);
        snitch.status = text_field(data, "status");
        snitch.check_in_url = text_field(data, "check_in_url");
        snitch.notes = text_field(data, "notes").unwrap_or_default();
        snitch.created_at = time_field(data, "created_at");
        snitch.checked_in_at = time_field(data, "checked_in_at");
        Ok(snitch)
    }

    /// Whether the snitch exists remotely (has a token).
    pub fn is_saved(&self) -> bool {
        self.token.is_some()
    }

    /// Body sent on create and edit.
    pub fn payload(&self) -> SnitchPayload<'_> {
        SnitchPayload {
            name: &self.name,
            kind: PayloadType {
                interval: self.interval,
            },
            notes: &self.notes,
            tags: &self.tags,
        }
    }
}

fn text_field(data: &Value, field: &'static str) -> Option<String> {
    match data.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => {
            debug!(field, value = %other, "dropping field with unexpected type");
            None
        }
    }
}

fn tags_field(data: &Value) -> Vec<String> {
    match data.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag.clone()),
                other => {
                    debug!(value = %other, "dropping non-text tag");
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            debug!(value = %other, "dropping tags with unexpected type");
            Vec::new()
        }
    }
}

fn time_field(data: &Value, field: &'static str) -> Option<DateTime<Utc>> {
    let raw = text_field(data, field)?;
    match parse_time(&raw) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!(field, value = %raw, error = %e, "dropping unparseable timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn new_without_options_reports_both_fields() {
        let err = Snitch::new(SnitchOptions::default()).unwrap_err();
        assert_eq!(err, ValidationError::MissingOptions(vec!["name", "interval"]));
        assert_eq!(err.to_string(), "Missing required options: name, interval");
    }

    #[test]
    fn new_treats_empty_strings_as_missing() {
        let err = Snitch::new(SnitchOptions::new("", "daily")).unwrap_err();
        assert_eq!(err, ValidationError::MissingOptions(vec!["name"]));
        let err = Snitch::new(SnitchOptions::new("Backups", "")).unwrap_err();
        assert_eq!(err, ValidationError::MissingOptions(vec!["interval"]));
    }

    #[test]
    fn new_rejects_unknown_interval() {
        let err = Snitch::new(SnitchOptions::new("New Snitch", "invalid")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid snitch interval: invalid");
    }

    #[test]
    fn new_accepts_every_interval_with_defaults() {
        for interval in Interval::ALL {
            let snitch = Snitch::new(SnitchOptions::new("Job", interval.as_str())).unwrap();
            assert_eq!(snitch.interval, interval);
            assert_eq!(snitch.notes, "");
            assert!(snitch.tags.is_empty());
            assert!(!snitch.is_saved());
        }
    }

    #[test]
    fn new_keeps_optional_fields() {
        let snitch = Snitch::new(
            SnitchOptions::new("New Snitch", "15_minute")
                .notes("Optional notes")
                .tags(["one", "two", "three"]),
        )
        .unwrap();
        assert_eq!(snitch.name, "New Snitch");
        assert_eq!(snitch.interval, Interval::FifteenMinute);
        assert_eq!(snitch.notes, "Optional notes");
        assert_eq!(snitch.tags, vec!["one", "two", "three"]);
    }

    #[test]
    fn parse_rejects_missing_data() {
        assert_eq!(Snitch::parse(&Value::Null), Err(ValidationError::InvalidData));
        assert_eq!(
            Snitch::parse(&json!({"name": "x"})),
            Err(ValidationError::InvalidData)
        );
        assert_eq!(
            Snitch::parse(&json!({"type": {"interval": "daily"}})),
            Err(ValidationError::InvalidData)
        );
    }

    #[test]
    fn parse_copies_known_fields_only() {
        let data = json!({
            "token": "c2354d53d2",
            "href": "/v1/snitches/c2354d53d2",
            "name": "Daily Backups",
            "tags": ["production", "critical"],
            "status": "pending",
            "checked_in_at": null,
            "type": {"interval": "daily"},
            "check_in_url": "https://nosnch.in/c2354d53d2",
            "created_at": "2014-03-28T22:07:44.902Z",
            "notes": "Postgres box at 123.213.231.132",
            "ignored_property": true
        });

        let snitch = Snitch::parse(&data).unwrap();
        assert_eq!(snitch.token.as_deref(), Some("c2354d53d2"));
        assert_eq!(snitch.href.as_deref(), Some("/v1/snitches/c2354d53d2"));
        assert_eq!(snitch.name, "Daily Backups");
        assert_eq!(snitch.interval, Interval::Daily);
        assert_eq!(snitch.tags, vec!["production", "critical"]);
        assert_eq!(snitch.status.as_deref(), Some("pending"));
        assert_eq!(snitch.checked_in_at, None);
        assert_eq!(snitch.check_in_url.as_deref(), Some("https://nosnch.in/c2354d53d2"));
        assert_eq!(snitch.notes, "Postgres box at 123.213.231.132");
        let created = Utc.with_ymd_and_hms(2014, 3, 28, 22, 7, 44).unwrap()
            + chrono::Duration::milliseconds(902);
        assert_eq!(snitch.created_at, Some(created));
        assert!(snitch.is_saved());

        let out = serde_json::to_value(&snitch).unwrap();
        assert!(out.get("ignored_property").is_none());
    }

    #[test]
    fn parse_accepts_timestamps_without_offset() {
        let snitch = Snitch::parse(&json!({
            "token": "a",
            "name": "x",
            "type": {"interval": "daily"},
            "created_at": "2014-03-28T22:07:44.902"
        }))
        .unwrap();
        let expected = Utc.with_ymd_and_hms(2014, 3, 28, 22, 7, 44).unwrap()
            + chrono::Duration::milliseconds(902);
        assert_eq!(snitch.created_at, Some(expected));
    }

    #[test]
    fn parse_drops_mistyped_fields() {
        let snitch = Snitch::parse(&json!({
            "token": "a",
            "name": "x",
            "type": {"interval": "daily"},
            "status": 3,
            "check_in_url": 42,
            "tags": ["ok", 1],
            "notes": null,
            "created_at": null,
            "checked_in_at": "not a time"
        }))
        .unwrap();
        assert_eq!(snitch.token.as_deref(), Some("a"));
        assert_eq!(snitch.status, None);
        assert_eq!(snitch.check_in_url, None);
        assert_eq!(snitch.tags, vec!["ok"]);
        assert_eq!(snitch.notes, "");
        assert_eq!(snitch.created_at, None);
        assert_eq!(snitch.checked_in_at, None);
    }

    #[test]
    fn parse_rejects_non_text_name() {
        assert_eq!(
            Snitch::parse(&json!({"name": 7, "type": {"interval": "daily"}})),
            Err(ValidationError::InvalidData)
        );
    }

    #[test]
    fn parse_validates_interval() {
        let err = Snitch::parse(&json!({"name": "x", "type": {"interval": "yearly"}})).unwrap_err();
        assert_eq!(err, ValidationError::InvalidInterval("yearly".to_string()));
    }

    #[test]
    fn payload_matches_wire_shape() {
        let snitch = Snitch::new(SnitchOptions::new("New Snitch", "15_minute")).unwrap();
        assert_eq!(
            serde_json::to_value(snitch.payload()).unwrap(),
            json!({
                "name": "New Snitch",
                "type": {"interval": "15_minute"},
                "notes": "",
                "tags": []
            })
        );
    }
}
