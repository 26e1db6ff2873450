//! Helpers for API key resolution and timestamp handling.

use crate::error::AuthError;
use crate::secret::SecretBackend;
use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Source from which the API key was obtained (for diagnostics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    /// `--api-key` flag or `SNITCH_API_KEY`.
    Explicit,
    OnePassword,
    Bitwarden,
    Keepassxc,
}

impl From<SecretBackend> for ApiKeySource {
    fn from(backend: SecretBackend) -> Self {
        match backend {
            SecretBackend::OnePassword => ApiKeySource::OnePassword,
            SecretBackend::Bitwarden => ApiKeySource::Bitwarden,
            SecretBackend::Keepassxc => ApiKeySource::Keepassxc,
        }
    }
}

/// Resolve the API key: an explicit key wins, then each secret backend in turn.
pub fn get_api_key(explicit: Option<&str>) -> Result<(String, ApiKeySource), AuthError> {
    if let Some(k) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok((k.to_string(), ApiKeySource::Explicit));
    }
    for backend in SecretBackend::ALL {
        if let Some(k) = backend.read() {
            return Ok((k, backend.into()));
        }
    }
    Err(AuthError {
        message: "API key not found. Pass --api-key / SNITCH_API_KEY or configure a \
                  secret backend: SNITCH_OP_ENTRY_PATH (1Password), SNITCH_BW_ITEM_ID \
                  (Bitwarden), or SNITCH_KPXC_DB+SNITCH_KPXC_ENTRY (KeePassXC)."
            .to_string(),
    })
}

/// Parse an ISO 8601 / RFC 3339 time string into UTC.
///
/// A string without an offset (`2014-03-28T22:07:44.902`) is read as UTC.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.and_utc())
        .map_err(|e| format!("invalid timestamp {s:?}: {e}"))
}

/// Format a timestamp for display, in UTC or the local timezone.
pub fn format_timestamp_display(dt: &DateTime<Utc>, use_utc: bool) -> String {
    if use_utc {
        dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    } else {
        dt.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %:z")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn explicit_key_wins() {
        let (key, source) = get_api_key(Some(" abc123 ")).unwrap();
        assert_eq!(key, "abc123");
        assert_eq!(source, ApiKeySource::Explicit);
    }

    #[test]
    fn parse_time_keeps_milliseconds() {
        let t = parse_time("2014-03-28T22:07:44.902Z").unwrap();
        let expected = Utc.with_ymd_and_hms(2014, 3, 28, 22, 7, 44).unwrap()
            + chrono::Duration::milliseconds(902);
        assert_eq!(t, expected);
    }

    #[test]
    fn parse_time_normalizes_offsets() {
        let t = parse_time("2014-03-28T23:07:44+01:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2014, 3, 28, 22, 7, 44).unwrap());
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn parse_time_reads_offsetless_as_utc() {
        let t = parse_time("2014-03-28T22:07:44.902").unwrap();
        assert_eq!(t, parse_time("2014-03-28T22:07:44.902Z").unwrap());
        let t = parse_time("2014-03-28T22:07:44").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2014, 3, 28, 22, 7, 44).unwrap());
        assert!(parse_time("2014-03-28").is_err());
    }

    #[test]
    fn format_utc_display() {
        let t = Utc.with_ymd_and_hms(2014, 3, 28, 22, 7, 44).unwrap();
        assert_eq!(format_timestamp_display(&t, true), "2014-03-28 22:07:44 UTC");
    }
}
