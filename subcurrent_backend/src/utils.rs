//! Shared helpers and constants.

use chrono::Utc;

pub const APP_NAME: &str = "subcurrent_backend";

pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339()
}
