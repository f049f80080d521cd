// Days-left arithmetic for list badges ("D-3", "D+2")
use chrono::{DateTime, Utc};

/// Whole days from `now` until `expiry`, truncated toward zero.
/// Negative once the item has expired.
pub fn days_until_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_days()
}

/// `D-<days>` while there is time left, `D+<days>` after expiry
pub fn expiry_label(expiry: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = days_until_expiry(expiry, now);
    if days >= 0 {
        format!("D-{}", days)
    } else {
        format!("D+{}", -days)
    }
}

/// Expired items count as expiring soon too
pub fn is_expiring_soon(expiry: DateTime<Utc>, now: DateTime<Utc>, threshold_days: i64) -> bool {
    days_until_expiry(expiry, now) <= threshold_days
}
