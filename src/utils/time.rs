use chrono::Utc;

/// Milliseconds since the Unix epoch, truncated to the 32-bit RTMP clock.
pub fn current_timestamp() -> u32 {
    Utc::now().timestamp_millis() as u32
}
