use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Unix timestamp of `date`, or of now.
pub fn date_to_unix(date: Option<DateTime<Utc>>) -> i64 {
    date.unwrap_or_else(Utc::now).timestamp()
}

/// Short age of `unix` as seen at `now`: `42s`, `5m`, `3h`, `2d`, `1w`,
/// `4mo`, `2y`.
pub fn relative_time(unix: i64, now: i64) -> String {
    let diff = now - unix;

    if diff < MINUTE {
        format!("{diff}s")
    } else if diff < HOUR {
        format!("{}m", diff / MINUTE)
    } else if diff < DAY {
        format!("{}h", diff / HOUR)
    } else if diff < WEEK {
        format!("{}d", diff / DAY)
    } else if diff < MONTH {
        format!("{}w", diff / WEEK)
    } else if diff < YEAR {
        format!("{}mo", diff / MONTH)
    } else {
        format!("{}y", diff / YEAR)
    }
}

/// Age of `unix` relative to the current time.
pub fn relative_time_now(unix: i64) -> String {
    relative_time(unix, date_to_unix(None))
}
