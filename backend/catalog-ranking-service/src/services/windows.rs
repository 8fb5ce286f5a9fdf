use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Calendar windows used for the monthly and weekly rankings
///
/// Both windows are evaluated in UTC. Weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageWindows {
    pub now: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
}

impl UsageWindows {
    pub fn containing(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let first_of_month = today.with_day(1).unwrap_or(today);
        let monday =
            today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

        Self {
            now,
            month_start: start_of_day(first_of_month),
            week_start: start_of_day(monday),
        }
    }

    pub fn current() -> Self {
        Self::containing(Utc::now())
    }

    /// Whether `other` covers the same calendar month and week
    pub fn same_period(&self, other: &UsageWindows) -> bool {
        self.month_start == other.month_start && self.week_start == other.week_start
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn month_starts_on_the_first_at_midnight() {
        let windows = UsageWindows::containing(at(2024, 3, 14, 9));
        assert_eq!(windows.month_start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-14 is a Thursday
        let windows = UsageWindows::containing(at(2024, 3, 14, 9));
        assert_eq!(windows.week_start, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn monday_is_its_own_week_start() {
        let windows = UsageWindows::containing(at(2024, 3, 11, 0));
        assert_eq!(windows.week_start, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn week_can_start_in_previous_month() {
        // 2024-05-01 is a Wednesday
        let windows = UsageWindows::containing(at(2024, 5, 1, 12));
        assert_eq!(windows.week_start, Utc.with_ymd_and_hms(2024, 4, 29, 0, 0, 0).unwrap());
        assert_eq!(windows.month_start, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn same_period_detects_rollover() {
        let sunday = UsageWindows::containing(at(2024, 3, 17, 23));
        let monday = UsageWindows::containing(at(2024, 3, 18, 0));
        let later_sunday = UsageWindows::containing(at(2024, 3, 17, 1));

        assert!(sunday.same_period(&later_sunday));
        assert!(!sunday.same_period(&monday));
    }
}
