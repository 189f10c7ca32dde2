use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;

pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Renders `timestamp` in `zone` as `DD/MM/YYYY HH:MM:SS`.
pub fn format_in_zone(timestamp: DateTime<Utc>, zone: Tz) -> String {
    timestamp.with_timezone(&zone).format(DISPLAY_FORMAT).to_string()
}

/// Short zone label for display, e.g. `WIB` for Asia/Jakarta.
pub fn zone_abbreviation(timestamp: DateTime<Utc>, zone: Tz) -> String {
    timestamp.with_timezone(&zone).format("%Z").to_string()
}

/// Accepts epoch milliseconds (number or numeric string) or an RFC 3339 string.
pub fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| anyhow!("timestamp {} is not representable", n))?;
            from_millis(millis)
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(millis) = s.parse::<i64>() {
                return from_millis(millis);
            }
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("unrecognised timestamp '{}'", s))
        }
        other => Err(anyhow!("unrecognised timestamp {}", other)),
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| anyhow!("timestamp {} out of range", millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_epoch_millis_in_jakarta() {
        let ts = parse_timestamp(&json!(1_700_000_000_000i64)).unwrap();
        assert_eq!(
            format_in_zone(ts, chrono_tz::Asia::Jakarta),
            "15/11/2023 05:13:20"
        );
        assert_eq!(zone_abbreviation(ts, chrono_tz::Asia::Jakarta), "WIB");
    }

    #[test]
    fn formats_rfc3339_strings() {
        let ts = parse_timestamp(&json!("2023-11-14T22:13:20.000Z")).unwrap();
        assert_eq!(format_in_zone(ts, chrono_tz::UTC), "14/11/2023 22:13:20");
    }

    #[test]
    fn honours_daylight_saving() {
        let ts = parse_timestamp(&json!(1_730_000_000_000i64)).unwrap();
        assert_eq!(
            format_in_zone(ts, chrono_tz::America::New_York),
            "26/10/2024 23:33:20"
        );
    }

    #[test]
    fn numeric_strings_are_millis() {
        let ts = parse_timestamp(&json!("0")).unwrap();
        assert_eq!(
            format_in_zone(ts, chrono_tz::Asia::Jakarta),
            "01/01/1970 07:00:00"
        );
    }

    #[test]
    fn rejects_unusable_values() {
        assert!(parse_timestamp(&json!(null)).is_err());
        assert!(parse_timestamp(&json!("yesterday")).is_err());
        assert!(parse_timestamp(&json!({"start": 1})).is_err());
    }
}
