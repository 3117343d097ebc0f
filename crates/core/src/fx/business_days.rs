use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The `count` most recent business days a provider may have a rate for,
/// newest first. Before the daily cutoff hour the current day is not yet
/// published, so the walk starts from the day before.
pub fn candidate_dates(now_local: NaiveDateTime, cutoff_hour: u32, count: usize) -> Vec<NaiveDate> {
    let mut date = now_local.date();
    if now_local.hour() < cutoff_hour {
        date -= Duration::days(1);
    }

    let mut dates = Vec::with_capacity(count);
    while dates.len() < count {
        if is_business_day(date) {
            dates.push(date);
        }
        match date.pred_opt() {
            Some(prev) => date = prev,
            None => break,
        }
    }
    dates
}
