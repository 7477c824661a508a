//! Time helpers — record timestamps are Unix seconds.

/// Current Unix time in whole seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
