//! Selection of the most recent published nowcast snapshot.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::Serialize;

/// Minutes after the hour before that hour's observations can be queried.
pub const PUBLICATION_DELAY_MINUTES: u32 = 40;

/// Korea Standard Time has no daylight saving.
const KST_OFFSET_HOURS: i64 = 9;

/// Base date/time label of a published observation snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ForecastWindow {
    pub base_date: NaiveDate,
    pub base_time: NaiveTime,
}

impl ForecastWindow {
    /// Window for a wall-clock reading in Korea Standard Time.
    pub fn for_local(now: NaiveDateTime) -> Self {
        Self::with_delay(now, PUBLICATION_DELAY_MINUTES)
    }

    /// Window for an absolute instant. The service labels snapshots in KST.
    pub fn for_instant(now: DateTime<Utc>) -> Self {
        Self::for_local((now + Duration::hours(KST_OFFSET_HOURS)).naive_utc())
    }

    pub fn with_delay(now: NaiveDateTime, delay_minutes: u32) -> Self {
        let hour_mark = now.date().and_time(NaiveTime::default()) + Duration::hours(i64::from(now.hour()));

        let published = if now.minute() < delay_minutes {
            hour_mark - Duration::hours(1)
        } else {
            hour_mark
        };

        Self {
            base_date: published.date(),
            base_time: published.time(),
        }
    }

    /// `YYYYMMDD`
    pub fn base_date_str(&self) -> String {
        self.base_date.format("%Y%m%d").to_string()
    }

    /// `HHmm`
    pub fn base_time_str(&self) -> String {
        self.base_time.format("%H%M").to_string()
    }
}

impl std::fmt::Display for ForecastWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.base_date_str(), self.base_time_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid test datetime")
    }

    fn labels(window: ForecastWindow) -> (String, String) {
        (window.base_date_str(), window.base_time_str())
    }

    #[test]
    fn at_threshold_uses_current_hour() {
        let window = ForecastWindow::for_local(local("2024-10-17 14:40:00"));
        assert_eq!(labels(window), ("20241017".into(), "1400".into()));
    }

    #[test]
    fn one_minute_before_threshold_steps_back() {
        let window = ForecastWindow::for_local(local("2024-10-17 14:39:59"));
        assert_eq!(labels(window), ("20241017".into(), "1300".into()));
    }

    #[test]
    fn late_in_the_hour_uses_current_hour() {
        let window = ForecastWindow::for_local(local("2024-10-17 09:59:00"));
        assert_eq!(labels(window), ("20241017".into(), "0900".into()));
    }

    #[test]
    fn crossing_midnight_rolls_date_back() {
        let window = ForecastWindow::for_local(local("2024-10-17 00:15:00"));
        assert_eq!(labels(window), ("20241016".into(), "2300".into()));
    }

    #[test]
    fn crossing_month_and_year() {
        let window = ForecastWindow::for_local(local("2024-03-01 00:05:00"));
        assert_eq!(labels(window), ("20240229".into(), "2300".into()));

        let window = ForecastWindow::for_local(local("2025-01-01 00:39:00"));
        assert_eq!(labels(window), ("20241231".into(), "2300".into()));
    }

    #[test]
    fn custom_delay() {
        let window = ForecastWindow::with_delay(local("2024-10-17 14:10:00"), 10);
        assert_eq!(labels(window), ("20241017".into(), "1400".into()));

        let window = ForecastWindow::with_delay(local("2024-10-17 14:09:00"), 10);
        assert_eq!(labels(window), ("20241017".into(), "1300".into()));
    }

    #[test]
    fn instant_is_read_in_kst() {
        // 15:45 UTC is 00:45 KST on the next day.
        let now = DateTime::parse_from_rfc3339("2024-10-16T15:45:00Z")
            .expect("valid instant")
            .with_timezone(&Utc);

        let window = ForecastWindow::for_instant(now);
        assert_eq!(labels(window), ("20241017".into(), "0000".into()));
    }

    #[test]
    fn display_joins_labels() {
        let window = ForecastWindow::for_local(local("2024-10-17 14:50:00"));
        assert_eq!(window.to_string(), "20241017 1400");
    }
}
