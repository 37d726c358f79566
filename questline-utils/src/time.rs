use std::time::{SystemTime, UNIX_EPOCH};

/// Return the current unix timestamp in seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

/// Whether an `exp` claim (unix seconds) lies at or before `now`.
pub fn is_expired(expires_at: u64, now: u64) -> bool {
    expires_at <= now
}
