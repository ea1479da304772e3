//! Daily wall-clock scheduler for the retention sweeps.
//!
//! Nothing is persisted between runs: after a restart the loop simply waits
//! for the next occurrence of the configured time. Missed runs are not
//! caught up.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};
use tokio::task::JoinHandle;
use tracing::info;

use super::sweep::{SweepReport, SweepRunner};

/// First occurrence of local time `at` strictly after `now`.
///
/// On a DST fold the earlier instant is used. When `at` falls in a DST gap
/// the run happens at the first valid local time after it, the same day.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();
    loop {
        if let Some(candidate) = first_valid_instant(&tz, date, at) {
            if candidate > *now {
                return candidate;
            }
        }
        date = match date.succ_opt() {
            Some(next) => next,
            None => return now.clone() + Duration::days(1),
        };
    }
}

/// `date` at `at`, moved forward minute by minute past a gap. `None` only if
/// nothing later that day exists.
fn first_valid_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, at: NaiveTime) -> Option<DateTime<Tz>> {
    let mut local = date.and_time(at);
    while local.date() == date {
        if let Some(instant) = tz.from_local_datetime(&local).earliest() {
            return Some(instant);
        }
        local += Duration::minutes(1);
    }
    None
}

pub struct DailyScheduler {
    at: NaiveTime,
    runner: SweepRunner,
}

impl DailyScheduler {
    pub fn new(at: NaiveTime, runner: SweepRunner) -> Self {
        Self { at, runner }
    }

    /// Sleep until the next run time, then run all sweeps once.
    pub async fn run_next(&self) -> Vec<SweepReport> {
        let now = self.runner.clock().now().with_timezone(&Local);
        let next = next_run_after(&now, self.at);
        let wait = (next.clone() - now).to_std().unwrap_or_default();
        info!(next_run = %next, wait_secs = wait.as_secs(), "sweep scheduled");

        tokio::time::sleep(wait).await;
        self.runner.run_daily_sweep().await
    }

    /// Runs for the lifetime of the process.
    pub async fn run(self) {
        loop {
            self.run_next().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
    use orgguard_core::Clock;

    use super::*;
    use crate::services::testing::Harness;

    /// Chile-like zone: -04 until local midnight of 2026-09-06, then clocks
    /// jump to 01:00 at -03. 00:00..01:00 that day does not exist.
    #[derive(Debug, Clone, Copy)]
    struct MidnightJump;

    impl MidnightJump {
        const WINTER: i32 = -4 * 3600;
        const SUMMER: i32 = -3 * 3600;

        fn jump_day() -> NaiveDate {
            NaiveDate::from_ymd_opt(2026, 9, 6).unwrap()
        }

        fn offset(secs: i32) -> FixedOffset {
            FixedOffset::east_opt(secs).unwrap()
        }
    }

    impl TimeZone for MidnightJump {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            MidnightJump
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            let secs = if *local < Self::jump_day() { Self::WINTER } else { Self::SUMMER };
            LocalResult::Single(Self::offset(secs))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let jump = Self::jump_day().and_hms_opt(0, 0, 0).unwrap();
            if *local < jump {
                LocalResult::Single(Self::offset(Self::WINTER))
            } else if *local < jump + Duration::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::offset(Self::SUMMER))
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            let secs = if *utc < Self::jump_day() { Self::WINTER } else { Self::SUMMER };
            Self::offset(secs)
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            // Local midnight at -04 is 04:00 UTC.
            let jump = Self::jump_day().and_hms_opt(4, 0, 0).unwrap();
            let secs = if *utc < jump { Self::WINTER } else { Self::SUMMER };
            Self::offset(secs)
        }
    }

    fn half_past_midnight() -> NaiveTime {
        NaiveTime::from_hms_opt(0, 30, 0).unwrap()
    }

    #[test]
    fn later_today_when_not_yet_passed() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 0, 10, 0).unwrap();
        let next = next_run_after(&now, half_past_midnight());
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 5, 10, 0, 30, 0).unwrap());
    }

    #[test]
    fn tomorrow_when_passed_or_exactly_now() {
        let at = half_past_midnight();
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 0, 30, 0).unwrap();
        assert_eq!(next_run_after(&now, at), Utc.with_ymd_and_hms(2026, 5, 11, 0, 30, 0).unwrap());

        let now = Utc.with_ymd_and_hms(2026, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(next_run_after(&now, at), Utc.with_ymd_and_hms(2027, 1, 1, 0, 30, 0).unwrap());
    }

    #[test]
    fn follows_the_local_offset() {
        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 5, 10, 1, 0, 0).unwrap();
        let next = next_run_after(&now, half_past_midnight());
        assert_eq!(next, tz.with_ymd_and_hms(2026, 5, 11, 0, 30, 0).unwrap());
        assert_eq!(next - now, Duration::hours(23) + Duration::minutes(30));
    }

    #[test]
    fn gap_day_still_runs_after_the_jump() {
        let now = MidnightJump
            .from_local_datetime(&NaiveDate::from_ymd_opt(2026, 9, 5).unwrap().and_hms_opt(12, 0, 0).unwrap())
            .single()
            .unwrap();
        let next = next_run_after(&now, half_past_midnight());

        assert_eq!(
            next.naive_local(),
            MidnightJump::jump_day().and_hms_opt(1, 0, 0).unwrap()
        );
        assert_eq!(next - now, Duration::hours(12));

        // The day after the jump is ordinary again.
        let following = next_run_after(&next, half_past_midnight());
        assert_eq!(
            following.naive_local(),
            NaiveDate::from_ymd_opt(2026, 9, 7).unwrap().and_hms_opt(0, 30, 0).unwrap()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_until_the_run_time_then_sweeps() {
        let h = Harness::new().await;
        let runner = SweepRunner::new(h.store.clone(), h.clock.clone());
        let scheduler = DailyScheduler::new(half_past_midnight(), runner);

        let local_now = h.clock.now().with_timezone(&Local);
        let expected = (next_run_after(&local_now, half_past_midnight()) - local_now)
            .to_std()
            .unwrap();

        let started = tokio::time::Instant::now();
        let reports = scheduler.run_next().await;

        assert_eq!(started.elapsed(), expected);
        assert_eq!(reports.len(), 3);
    }
}
