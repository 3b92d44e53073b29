use chrono::{DateTime, Local, Utc};

/// Splits a fix timestamp into the `(time, date)` string pair a note stores.
///
/// Rendered in the machine's local timezone. A timestamp outside chrono's
/// representable range falls back to the epoch rather than failing; the note
/// is still created.
pub fn format_fix_timestamp(timestamp_millis: i64) -> (String, String) {
    let instant = DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or_default()
        .with_timezone(&Local);

    (
        instant.format("%H:%M:%S").to_string(),
        instant.format("%Y-%m-%d").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn formats_match_the_source_instant() {
        // 2024-01-15 12:30:45 UTC
        let millis = 1_705_321_845_000;
        let (time, date) = format_fix_timestamp(millis);

        let expected = DateTime::<Utc>::from_timestamp_millis(millis)
            .unwrap()
            .with_timezone(&Local);
        assert_eq!(time, expected.format("%H:%M:%S").to_string());
        assert_eq!(date, expected.format("%Y-%m-%d").to_string());
    }

    #[test]
    fn output_is_parseable() {
        let (time, date) = format_fix_timestamp(1_705_321_845_000);
        assert!(NaiveTime::parse_from_str(&time, "%H:%M:%S").is_ok());
        assert!(NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn out_of_range_timestamp_falls_back_to_epoch() {
        let (_, date) = format_fix_timestamp(i64::MAX);
        assert!(NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_ok());
    }
}
