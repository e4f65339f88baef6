//! Timestamps attached to events.

use chrono::{DateTime, Utc};

/// UTC timestamp used on events.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_monotonic_enough_utc_time() {
        let first = now();
        let second = now();
        assert!(second >= first);
    }
}
