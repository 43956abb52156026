use crate::constants::KEY_SEPARATOR;
use crate::store::StoreError;

fn validate_component(kind: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{kind} must not be empty")));
    }
    if value.contains(KEY_SEPARATOR) {
        return Err(StoreError::Validation(format!(
            "{kind} '{value}' must not contain '{KEY_SEPARATOR}'"
        )));
    }
    Ok(())
}

/// Layout of event keys, recorded in the meta tree by the first migration.
pub const EVENT_KEY_LAYOUT: &str = "series:ts020:event_id";

fn padded_ts(timestamp_ms: i64) -> String {
    format!("{:020}", timestamp_ms.max(0) as u64)
}

/// `{series}:{ts:020}:{event_id}`; sorts by series, then time, then id.
pub fn event_key(series_key: &str, timestamp_ms: i64, event_id: &str) -> Result<String, StoreError> {
    validate_component("series key", series_key)?;
    validate_component("event id", event_id)?;
    Ok(format!(
        "{series_key}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{event_id}",
        padded_ts(timestamp_ms)
    ))
}

pub fn series_prefix(series_key: &str) -> Result<String, StoreError> {
    validate_component("series key", series_key)?;
    Ok(format!("{series_key}{KEY_SEPARATOR}"))
}

/// Smallest key of `series_key` at or after `timestamp_ms`.
pub fn series_time_bound(series_key: &str, timestamp_ms: i64) -> Result<String, StoreError> {
    validate_component("series key", series_key)?;
    Ok(format!(
        "{series_key}{KEY_SEPARATOR}{}",
        padded_ts(timestamp_ms)
    ))
}

/// Series key part of a stored event key.
pub fn parse_series_key(key: &[u8]) -> Option<&str> {
    let sep = key.iter().position(|b| *b == KEY_SEPARATOR as u8)?;
    std::str::from_utf8(&key[..sep]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_key_orders_by_time_then_id() {
        let early = event_key("def-1", 1_000, "b").unwrap();
        let late = event_key("def-1", 2_000, "a").unwrap();
        let late_b = event_key("def-1", 2_000, "b").unwrap();
        assert!(early < late);
        assert!(late < late_b);
    }

    #[test]
    fn time_bound_brackets_event_keys() {
        let lower = series_time_bound("def-1", 2_000).unwrap();
        let upper = series_time_bound("def-1", 3_000).unwrap();
        let inside = event_key("def-1", 2_000, "x").unwrap();
        let at_end = event_key("def-1", 3_000, "x").unwrap();
        assert!(lower < inside && inside < upper);
        assert!(at_end > upper);
    }

    #[test]
    fn negative_timestamps_clamp_to_zero() {
        assert_eq!(
            event_key("s", -5, "e").unwrap(),
            event_key("s", 0, "e").unwrap()
        );
    }

    #[test]
    fn rejects_separator_in_components() {
        assert!(matches!(
            event_key("a:b", 0, "e"),
            Err(StoreError::Validation(_))
        ));
        assert!(event_key("a", 0, "").is_err());
    }

    #[test]
    fn parses_series_key_back() {
        let key = event_key("Bug", 10, "t1").unwrap();
        assert_eq!(parse_series_key(key.as_bytes()), Some("Bug"));
    }
}
