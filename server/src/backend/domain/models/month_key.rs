//! Calendar month identifier used as the processing watermark.
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month, formatted as "YYYY-MM".
///
/// Ordering is chronological, which matches the lexicographic ordering of the
/// formatted string for four-digit years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid month key '{0}': expected YYYY-MM")]
pub struct MonthKeyParseError(pub String);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && (0..=9999).contains(&year) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing `date`
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Fields are validated on construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            2 => {
                if is_leap_year(self.year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        self.day_clamped(31)
    }

    /// The given day of this month, clamped to the month's length
    pub fn day_clamped(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or_else(|| self.first_day())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthKeyParseError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_format_and_parse() {
        let key = MonthKey::new(2024, 6).unwrap();
        assert_eq!(key.to_string(), "2024-06");
        assert_eq!("2024-06".parse::<MonthKey>().unwrap(), key);
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        for bad in ["2024-6", "2024-13", "2024-00", "24-06", "2024/06", "", "abcd-ef"] {
            assert!(bad.parse::<MonthKey>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_ordering_is_chronological() {
        let may = MonthKey::new(2024, 5).unwrap();
        let june = MonthKey::new(2024, 6).unwrap();
        let next_jan = MonthKey::new(2025, 1).unwrap();
        assert!(may < june);
        assert!(june < next_jan);
        assert!(may.to_string() < june.to_string());
        assert!(june.to_string() < next_jan.to_string());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(MonthKey::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthKey::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthKey::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthKey::new(2000, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthKey::new(2024, 4).unwrap().days_in_month(), 30);
        assert_eq!(MonthKey::new(2024, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_day_clamped() {
        let feb = MonthKey::new(2023, 2).unwrap();
        assert_eq!(feb.day_clamped(31), date("2023-02-28"));
        assert_eq!(feb.day_clamped(15), date("2023-02-15"));
        assert_eq!(MonthKey::new(2024, 2).unwrap().last_day(), date("2024-02-29"));
        assert_eq!(MonthKey::new(2024, 4).unwrap().day_clamped(31), date("2024-04-30"));
    }

    #[test]
    fn test_serde_as_string() {
        let key = MonthKey::new(2024, 1).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-01\"");
        let back: MonthKey = serde_json::from_str("\"2024-01\"").unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<MonthKey>("\"2024-1\"").is_err());
    }

    #[test]
    fn test_contains() {
        let key = MonthKey::new(2024, 6).unwrap();
        assert!(key.contains(date("2024-06-30")));
        assert!(!key.contains(date("2024-07-01")));
    }
}
