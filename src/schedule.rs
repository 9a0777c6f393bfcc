use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Error, Result};

/// How often a contribution is made.
///
/// Parsing is the only entry point from user input; anything outside the
/// four tokens is an [`Error::InvalidFrequency`], so downstream code can
/// match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "weekly" | "week" => Ok(Frequency::Weekly),
            "m" | "monthly" | "month" => Ok(Frequency::Monthly),
            "q" | "quarterly" | "quarter" => Ok(Frequency::Quarterly),
            "y" | "yearly" | "year" => Ok(Frequency::Yearly),
            _ => Err(Error::InvalidFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        };
        write!(f, "{}", name)
    }
}

/// Report text for a schedule, e.g. "monthly, day 3".
pub fn schedule_description(freq: Frequency, day_offset: u32) -> String {
    format!("{}, day {}", freq, day_offset)
}

/// Generates the intended contribution dates for a plan.
///
/// Anchors are the Monday of each week, the 1st of each month, the 1st of
/// each calendar quarter, or January 1 of each year within
/// `[start, end]`; each anchor is then shifted by `day_offset - 1` days.
/// Shifted dates that leave the range are dropped, so every returned date
/// lies within `[start, end]` and the sequence is strictly increasing.
///
/// The dates are intentions, not trading days: a date falling on a
/// weekend or holiday is aligned to the next published NAV by the
/// simulator.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use dingtou::schedule::{investment_dates, Frequency};
/// let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
/// let dates = investment_dates(start, end, Frequency::Monthly, 1);
/// assert_eq!(dates.len(), 3);
/// assert_eq!(dates[2], end);
/// ```
pub fn investment_dates(
    start: NaiveDate,
    end: NaiveDate,
    freq: Frequency,
    day_offset: u32,
) -> Vec<NaiveDate> {
    let shift = Duration::days(i64::from(day_offset) - 1);
    let mut dates = Vec::new();
    let mut anchor = first_anchor(start, freq);
    while anchor <= end {
        let date = anchor + shift;
        if date >= start && date <= end {
            dates.push(date);
        }
        anchor = next_anchor(anchor, freq);
    }
    dates
}

/// First anchor on or after `start`.
fn first_anchor(start: NaiveDate, freq: Frequency) -> NaiveDate {
    match freq {
        Frequency::Weekly => {
            let until_monday = (7 - start.weekday().num_days_from_monday()) % 7;
            start + Duration::days(i64::from(until_monday))
        }
        Frequency::Monthly => {
            if start.day() == 1 {
                start
            } else {
                next_month_start(start.year(), start.month())
            }
        }
        Frequency::Quarterly => {
            let quarter_month = (start.month0() / 3) * 3 + 1;
            let quarter_start = NaiveDate::from_ymd_opt(start.year(), quarter_month, 1).unwrap();
            if quarter_start >= start {
                quarter_start
            } else {
                let mut anchor = next_month_start(start.year(), start.month());
                while (anchor.month0()) % 3 != 0 {
                    anchor = next_month_start(anchor.year(), anchor.month());
                }
                anchor
            }
        }
        Frequency::Yearly => {
            let jan1 = NaiveDate::from_ymd_opt(start.year(), 1, 1).unwrap();
            if jan1 >= start {
                jan1
            } else {
                NaiveDate::from_ymd_opt(start.year() + 1, 1, 1).unwrap()
            }
        }
    }
}

fn next_anchor(anchor: NaiveDate, freq: Frequency) -> NaiveDate {
    match freq {
        Frequency::Weekly => anchor + Duration::days(7),
        Frequency::Monthly => next_month_start(anchor.year(), anchor.month()),
        Frequency::Quarterly => {
            let mut next = anchor;
            for _ in 0..3 {
                next = next_month_start(next.year(), next.month());
            }
            next
        }
        Frequency::Yearly => NaiveDate::from_ymd_opt(anchor.year() + 1, 1, 1).unwrap(),
    }
}

fn next_month_start(year: i32, month: u32) -> NaiveDate {
    let (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}
