//! The process-wide reference day.
//!
//! Daily quotas (loot draws, attendance) must roll over at the same instant
//! for every user, so "today" is computed in one fixed reference offset -
//! KST, UTC+9 - never from any caller-local time. KST has no daylight
//! saving, so a fixed offset is exact.

use chrono::{FixedOffset, NaiveDate, Utc};

const REFERENCE_OFFSET_SECS: i32 = 9 * 3600;

/// Returns today's date in the reference time zone.
#[allow(clippy::expect_used)]
pub fn today() -> NaiveDate {
    let offset = FixedOffset::east_opt(REFERENCE_OFFSET_SECS).expect("UTC+9 is a valid offset");
    Utc::now().with_timezone(&offset).date_naive()
}
