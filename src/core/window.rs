use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum WindowError {
    #[error("Report window start {start} must be before end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
    #[error("No calendar day follows {0}")]
    OutOfRange(NaiveDate),
}

/// Date range queried from the billing API. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start >= end {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// The single day `day`, i.e. `[day, day + 1)`.
    pub fn for_day(day: NaiveDate) -> Result<Self, WindowError> {
        let end = day.succ_opt().ok_or(WindowError::OutOfRange(day))?;
        Self::new(day, end)
    }

    /// Yesterday to today, UTC.
    pub fn yesterday() -> Result<Self, WindowError> {
        let today = Utc::now().date_naive();
        Self::new(today - Duration::days(1), today)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Dates formatted the way Cost Explorer expects them (YYYY-MM-DD).
    pub fn api_range(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_accepts_ordered_dates() {
        let window = ReportWindow::new(date(2024, 3, 1), date(2024, 3, 2)).unwrap();
        assert_eq!(window.start(), date(2024, 3, 1));
        assert_eq!(window.end(), date(2024, 3, 2));
    }

    #[test]
    fn new_rejects_equal_dates() {
        let err = ReportWindow::new(date(2024, 3, 1), date(2024, 3, 1)).unwrap_err();
        assert!(err.to_string().contains("must be before"));
    }

    #[test]
    fn new_rejects_inverted_dates() {
        assert!(ReportWindow::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());
    }

    #[test]
    fn for_day_crosses_month_boundary() {
        let window = ReportWindow::for_day(date(2024, 2, 29)).unwrap();
        assert_eq!(window.end(), date(2024, 3, 1));
    }

    #[test]
    fn for_day_rejects_last_representable_date() {
        let err = ReportWindow::for_day(NaiveDate::MAX).unwrap_err();
        assert_eq!(err, WindowError::OutOfRange(NaiveDate::MAX));
    }

    #[test]
    fn yesterday_ends_today_utc() {
        let window = ReportWindow::yesterday().unwrap();
        assert_eq!(window.end(), Utc::now().date_naive());
        assert_eq!(window.end() - window.start(), Duration::days(1));
    }

    #[test]
    fn api_range_formats_iso_dates() {
        let window = ReportWindow::for_day(date(2024, 12, 31)).unwrap();
        assert_eq!(
            window.api_range(),
            ("2024-12-31".to_string(), "2025-01-01".to_string())
        );
    }
}
