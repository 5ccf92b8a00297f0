//! Once-per-week submission gate.
//!
//! A user may submit scores once per scoring period. A period is one ISO
//! calendar week in the competition's reference timezone, resetting at the
//! Monday 00:00 boundary. The check runs at session start only; a session
//! that straddles the boundary is still allowed to commit.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Weekly submission policy anchored to a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPolicy {
    /// Reference timezone as whole hours east of UTC.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

fn default_utc_offset_hours() -> i32 {
    3
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub allowed: bool,
    /// Human-readable denial reason; `None` when allowed.
    pub reason: Option<String>,
}

impl Eligibility {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn denied(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

impl SubmissionPolicy {
    /// Check whether a user with the given last-submission time may start
    /// a new scoring session at `now`. No prior submission is always
    /// eligible.
    pub fn check(&self, last_submission: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Eligibility {
        let Some(last) = last_submission else {
            return Eligibility::allowed();
        };

        if self.period_of(last) == self.period_of(now) {
            let next_open = self.next_reset_after(now);
            let local_open = next_open.with_timezone(&self.offset());
            return Eligibility::denied(format!(
                "You have already submitted your scores this week. \
                 The next round opens on {}.",
                local_open.format("%A %Y-%m-%d")
            ));
        }

        Eligibility::allowed()
    }

    /// The (iso-year, iso-week) period a timestamp falls in, evaluated in
    /// the reference timezone.
    fn period_of(&self, t: DateTime<Utc>) -> (i32, u32) {
        let local = t.with_timezone(&self.offset());
        let week = local.iso_week();
        (week.year(), week.week())
    }

    /// The next Monday 00:00 boundary (in the reference timezone) strictly
    /// after `now`.
    pub fn next_reset_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.offset());
        let days_left = 7 - local.weekday().num_days_from_monday() as i64;
        let next_monday = (local.date_naive() + Duration::days(days_left))
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time");
        match next_monday.and_local_timezone(self.offset()) {
            chrono::LocalResult::Single(t) => t.with_timezone(&Utc),
            // Fixed offsets have no gaps or folds.
            _ => now,
        }
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }
}
