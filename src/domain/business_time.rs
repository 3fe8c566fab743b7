use chrono::{DateTime, NaiveDate, Utc};

use chrono_tz::Tz;

/// Civil timezone that defines business days, regardless of server or client locale
pub const BUSINESS_TIMEZONE: Tz = chrono_tz::America::New_York;

/// The calendar date of an instant, as seen in the business timezone
pub fn business_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&BUSINESS_TIMEZONE).date_naive()
}

/// Whole calendar days from `start` to `end` in the business timezone.
///
/// Both instants are projected onto business dates before subtracting, so an
/// item received at 11:59 PM is one day old at 12:01 AM, and DST transitions
/// never shift the count. Negative when `end` falls on an earlier date.
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    business_date(end)
        .signed_duration_since(business_date(start))
        .num_days()
}

/// Days elapsed since `start`, never negative
pub fn days_since(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    days_between(start, now).max(0)
}

/// Check if an instant falls on the current business day
pub fn is_today(instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    business_date(instant) == business_date(now)
}

/// Long-form date for customer-facing text, e.g. "December 9, 2025"
pub fn long_date(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&BUSINESS_TIMEZONE)
        .format("%B %-d, %Y")
        .to_string()
}
