use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Timezone of the ledger owner. Dates in the sheets and "today" for
/// summaries are taken in this zone.
pub const DEFAULT_LEDGER_TZ: Tz = chrono_tz::Asia::Seoul;

/// Calendar date of `instant` in `tz`.
pub fn local_today(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// IANA name to timezone, e.g. `"Asia/Seoul"`.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_today_crosses_midnight() {
        // 16:00 UTC is 01:00 the next day in Seoul.
        let instant = Utc.with_ymd_and_hms(2025, 8, 14, 16, 0, 0).unwrap();
        assert_eq!(
            local_today(instant, DEFAULT_LEDGER_TZ),
            NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()
        );
        assert_eq!(
            local_today(instant, chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2025, 8, 14).unwrap()
        );
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Asia/Seoul"), Some(DEFAULT_LEDGER_TZ));
        assert_eq!(parse_timezone(" UTC "), Some(chrono_tz::UTC));
        assert_eq!(parse_timezone("Mars/Olympus"), None);
    }
}
