use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

use crate::error::TrendError;

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Time window of the trend chart, also decides the bucket label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendFilter {
    #[default]
    All,
    Daily,
    Weekly,
    Monthly,
    Annually,
}

impl FromStr for TrendFilter {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "annually" => Ok(Self::Annually),
            _ => Err(TrendError::UnknownFilter(s.to_string())),
        }
    }
}

impl TrendFilter {
    /// Query-string flavour: absent means `all`, unknown values fall back to `all`.
    pub fn from_query(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::All;
        };

        raw.parse().unwrap_or_else(|e| {
            warn!("{e}, using all");
            Self::All
        })
    }

    /// Whether `timestamp` lies in the same calendar period as `now`.
    pub fn contains(
        self,
        timestamp: NaiveDateTime,
        now: NaiveDateTime,
        week_start: WeekStart,
    ) -> bool {
        let (date, today) = (timestamp.date(), now.date());

        match self {
            Self::All => true,
            Self::Daily => date == today,
            Self::Weekly => week_start.start_of(date) == week_start.start_of(today),
            Self::Monthly => date.year() == today.year() && date.month() == today.month(),
            Self::Annually => date.year() == today.year(),
        }
    }

    pub fn label(self, timestamp: NaiveDateTime) -> String {
        let format = match self {
            Self::Daily => "%H:%M",
            Self::Weekly => "%A",
            Self::Monthly => "%-d %b",
            Self::Annually => "%b",
            Self::All => DATE_FORMAT,
        };

        timestamp.format(format).to_string()
    }
}

/// First day of the week used by the weekly filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl FromStr for WeekStart {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Ok(Self::Sunday),
            "monday" | "mon" => Ok(Self::Monday),
            _ => Err(TrendError::UnknownWeekStart(s.to_string())),
        }
    }
}

impl WeekStart {
    /// `None` only at the very start of the calendar range.
    pub fn start_of(self, date: NaiveDate) -> Option<NaiveDate> {
        let offset = match self {
            Self::Sunday => date.weekday().num_days_from_sunday(),
            Self::Monday => date.weekday().num_days_from_monday(),
        };

        date.checked_sub_days(Days::new(offset.into()))
    }
}

/// Parses a sale date. Plain dates land at midnight, a time part is kept when present.
pub fn parse_sale_timestamp(raw: &str) -> Result<NaiveDateTime, TrendError> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(timestamp);
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.naive_local())
        .map_err(|_| TrendError::UnparseableDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> NaiveDateTime {
        parse_sale_timestamp(raw).unwrap()
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("daily".parse::<TrendFilter>(), Ok(TrendFilter::Daily));
        assert_eq!(" Weekly ".parse::<TrendFilter>(), Ok(TrendFilter::Weekly));
        assert_eq!("ANNUALLY".parse::<TrendFilter>(), Ok(TrendFilter::Annually));
        assert_eq!(
            "hourly".parse::<TrendFilter>(),
            Err(TrendError::UnknownFilter("hourly".to_string()))
        );
    }

    #[test]
    fn test_filter_from_query_falls_back_to_all() {
        assert_eq!(TrendFilter::from_query(None), TrendFilter::All);
        assert_eq!(TrendFilter::from_query(Some("monthly")), TrendFilter::Monthly);
        assert_eq!(TrendFilter::from_query(Some("fortnightly")), TrendFilter::All);
    }

    #[test]
    fn test_parse_plain_date_is_midnight() {
        assert_eq!(at("2024-01-10").format("%Y-%m-%d %H:%M").to_string(), "2024-01-10 00:00");
    }

    #[test]
    fn test_parse_keeps_time_part() {
        assert_eq!(at("2024-01-10T14:30").format("%H:%M").to_string(), "14:30");
        assert_eq!(at("2024-01-10 09:05:59").format("%H:%M").to_string(), "09:05");
        assert_eq!(at("2024-01-10T18:45:00+02:00").format("%H:%M").to_string(), "18:45");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_sale_timestamp("").is_err());
        assert!(parse_sale_timestamp("yesterday").is_err());
        assert!(parse_sale_timestamp("2024-13-40").is_err());
    }

    #[test]
    fn test_labels() {
        let ts = at("2024-01-05T07:30");

        assert_eq!(TrendFilter::Daily.label(ts), "07:30");
        assert_eq!(TrendFilter::Weekly.label(ts), "Friday");
        assert_eq!(TrendFilter::Monthly.label(ts), "5 Jan");
        assert_eq!(TrendFilter::Annually.label(ts), "Jan");
        assert_eq!(TrendFilter::All.label(ts), "2024-01-05");
    }

    #[test]
    fn test_weekly_respects_week_start() {
        // 2024-01-10 is a Wednesday
        let now = at("2024-01-10T12:00");

        let monday = at("2024-01-08");
        let sunday_before = at("2024-01-07");
        let sunday_after = at("2024-01-14");
        let prior_friday = at("2024-01-05");

        assert!(TrendFilter::Weekly.contains(monday, now, WeekStart::Sunday));
        assert!(TrendFilter::Weekly.contains(monday, now, WeekStart::Monday));

        assert!(TrendFilter::Weekly.contains(sunday_before, now, WeekStart::Sunday));
        assert!(!TrendFilter::Weekly.contains(sunday_before, now, WeekStart::Monday));

        assert!(!TrendFilter::Weekly.contains(sunday_after, now, WeekStart::Sunday));
        assert!(TrendFilter::Weekly.contains(sunday_after, now, WeekStart::Monday));

        assert!(!TrendFilter::Weekly.contains(prior_friday, now, WeekStart::Sunday));
    }

    #[test]
    fn test_day_month_year_windows() {
        let now = at("2024-03-15T08:00");

        assert!(TrendFilter::Daily.contains(at("2024-03-15T23:59"), now, WeekStart::Sunday));
        assert!(!TrendFilter::Daily.contains(at("2024-03-14"), now, WeekStart::Sunday));

        assert!(TrendFilter::Monthly.contains(at("2024-03-01"), now, WeekStart::Sunday));
        assert!(!TrendFilter::Monthly.contains(at("2023-03-15"), now, WeekStart::Sunday));

        assert!(TrendFilter::Annually.contains(at("2024-12-31"), now, WeekStart::Sunday));
        assert!(!TrendFilter::Annually.contains(at("2025-01-01"), now, WeekStart::Sunday));

        assert!(TrendFilter::All.contains(at("1999-01-01"), now, WeekStart::Sunday));
    }

    #[test]
    fn test_week_start_parse() {
        assert_eq!("Monday".parse::<WeekStart>(), Ok(WeekStart::Monday));
        assert_eq!("sun".parse::<WeekStart>(), Ok(WeekStart::Sunday));
        assert!("friday".parse::<WeekStart>().is_err());
    }
}
