use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// calendar-month identifier in `YYYY-MM` form
///
/// Ordering is chronological (field order gives lexicographic year-then-month
/// comparison), which makes `Month` usable directly as a `BTreeMap` key and
/// in range scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonthParseError {
    #[error("malformed month literal: {raw}")]
    Malformed { raw: String },

    #[error("month number out of range: {month}")]
    OutOfRange { month: u32 },
}

impl Month {
    /// earliest representable month, for range scans
    pub const MIN: Month = Month { year: i32::MIN, month: 1 };
    /// latest representable month, for range scans
    pub const MAX: Month = Month { year: i32::MAX, month: 12 };

    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(1..=12).contains(&month) {
            return Err(MonthParseError::OutOfRange { month });
        }
        Ok(Month { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// january of this month's year
    pub fn first_of_year(year: i32) -> Month {
        Month { year, month: 1 }
    }

    /// the following calendar month
    pub fn next(self) -> Month {
        if self.month == 12 {
            Month { year: self.year + 1, month: 1 }
        } else {
            Month { year: self.year, month: self.month + 1 }
        }
    }

    /// the preceding calendar month
    pub fn prev(self) -> Month {
        if self.month == 1 {
            Month { year: self.year - 1, month: 12 }
        } else {
            Month { year: self.year, month: self.month - 1 }
        }
    }

    /// all twelve months of a year in chronological order
    pub fn months_of_year(year: i32) -> Vec<Month> {
        (1..=12).map(|month| Month { year, month }).collect()
    }

    /// months strictly before this one, within the same year, chronological
    pub fn earlier_in_year(self) -> Vec<Month> {
        (1..self.month)
            .map(|month| Month { year: self.year, month })
            .collect()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MonthParseError::Malformed { raw: s.to_string() };
        let (year, month) = s.split_once('-').ok_or_else(malformed)?;
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Month::new(year, month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
