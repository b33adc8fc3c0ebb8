//! Usage: Wall-clock helpers shared by token expiry bookkeeping.

pub(crate) fn now_unix_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}
