use std::sync::Arc;

use chrono::{Datelike, Duration, Local, NaiveDateTime, NaiveTime, Weekday};
use tracing::{error, info};

use crate::{
    app_error::{AppError, AppResult},
    use_cases::member_sync::MemberSync,
};

const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// A fixed weekly fire time in local time. The default is `0 9 * * TUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            weekday: Weekday::Tue,
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl WeeklySchedule {
    /// Parses a weekday name (`Tue`, `tuesday`) and an `HH:MM[:SS]` time.
    pub fn parse(weekday: &str, time: &str) -> AppResult<Self> {
        let weekday: Weekday = weekday
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("invalid weekday `{weekday}`")))?;

        let time = TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(time.trim(), format).ok())
            .ok_or_else(|| AppError::Config(format!("invalid time of day `{time}`")))?;

        Ok(Self { weekday, time })
    }

    /// The first fire time strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let days_ahead = (7 + self.weekday.num_days_from_monday()
            - now.weekday().num_days_from_monday())
            % 7;
        let candidate = (now.date() + Duration::days(days_ahead.into())).and_time(self.time);

        if candidate > now {
            candidate
        } else {
            candidate + Duration::days(7)
        }
    }
}

/// Runs the pipeline at every fire time, forever. A failed run is logged
/// and the loop waits for the next week.
pub async fn run_weekly(schedule: WeeklySchedule, sync: Arc<MemberSync>) {
    info!(
        weekday = %schedule.weekday,
        time = %schedule.time,
        "Member sync scheduler started"
    );

    loop {
        let now = Local::now().naive_local();
        let next_run = schedule.next_after(now);
        let wait = (next_run - now).to_std().unwrap_or_default();

        info!(next_run = %next_run, "Waiting for next member sync");
        tokio::time::sleep(wait).await;

        match sync.run().await {
            Ok(report) => {
                info!(
                    fetched = report.fetched,
                    uploaded = report.uploaded,
                    invited = report.invited,
                    "Member sync completed"
                );
            }
            Err(e) => {
                error!(error = %e, "Member sync failed");
            }
        }
    }
}
