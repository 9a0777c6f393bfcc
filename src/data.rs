use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use tracing::warn;

/// One published net-asset-value point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavSlice {
    pub date: NaiveDate,
    pub nav: f64,
}

/// Historical NAV series of a single fund, ascending by date.
///
/// Dates are unique but not contiguous: weekends and holidays publish no
/// NAV. Alignment of intended purchase dates to actual publishing days is
/// the simulator's job, not the series'.
#[derive(Debug, Clone)]
pub struct Fund {
    code: String,
    data: Vec<NavSlice>,
}

impl Fund {
    /// Constructs an empty Fund object.
    ///
    /// # Examples
    /// ```
    /// use dingtou::Fund;
    /// let fund = Fund::new("017437");
    /// assert!(fund.code() == "017437");
    /// assert!(fund.data().is_empty());
    /// ```
    pub fn new(code: &str) -> Fund {
        Fund {
            code: String::from(code),
            data: Vec::new(),
        }
    }

    /// Appends a NAV record to the end of the series.
    ///
    /// The caller is responsible for keeping the series ordered; use
    /// [`Fund::from_records`] for unordered raw data.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use dingtou::Fund;
    /// let mut fund = Fund::new("017437");
    /// let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    /// fund.push(date, 1.0);
    /// assert!(fund[0].date == date);
    /// assert!(fund[0].nav == 1.0);
    /// ```
    pub fn push(&mut self, date: NaiveDate, nav: f64) {
        self.data.push(NavSlice { date, nav });
    }

    /// Builds a fund from raw records as they come off the wire or the
    /// cache file: sorts ascending, drops non-positive NAVs, keeps the
    /// last record when a date repeats.
    pub fn from_records(code: &str, mut records: Vec<NavSlice>) -> Fund {
        let raw = records.len();
        records.retain(|r| r.nav > 0.0);
        records.sort_by_key(|r| r.date);
        records.dedup_by(|a, b| {
            if a.date == b.date {
                *b = *a;
                true
            } else {
                false
            }
        });
        if records.len() < raw {
            warn!(
                "dropped {} of {} NAV records (non-positive or duplicate date)",
                raw - records.len(),
                raw
            );
        }
        Fund {
            code: String::from(code),
            data: records,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn data(&self) -> &[NavSlice] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First record dated on or after `date` (forward-fill lookup).
    pub fn nav_on_or_after(&self, date: NaiveDate) -> Option<&NavSlice> {
        let idx = self.data.partition_point(|r| r.date < date);
        self.data.get(idx)
    }

    /// Last record dated on or before `date` (backward-fill lookup).
    pub fn nav_on_or_before(&self, date: NaiveDate) -> Option<&NavSlice> {
        let idx = self.data.partition_point(|r| r.date <= date);
        idx.checked_sub(1).and_then(|i| self.data.get(i))
    }

    /// Record dated exactly `date`.
    pub fn nav_on(&self, date: NaiveDate) -> Option<&NavSlice> {
        self.nav_on_or_after(date).filter(|r| r.date == date)
    }
}

impl Index<usize> for Fund {
    type Output = NavSlice;
    fn index(&self, index: usize) -> &NavSlice {
        &self.data[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Fund {
        let mut fund = Fund::new("017437");
        fund.push(ymd(2023, 1, 3), 1.0);
        fund.push(ymd(2023, 1, 4), 1.1);
        fund.push(ymd(2023, 1, 9), 1.2);
        fund
    }

    #[test]
    fn test_from_records_sorts_and_filters() {
        let records = vec![
            NavSlice { date: ymd(2023, 1, 9), nav: 1.2 },
            NavSlice { date: ymd(2023, 1, 3), nav: 1.0 },
            NavSlice { date: ymd(2023, 1, 4), nav: 0.0 },
            NavSlice { date: ymd(2023, 1, 3), nav: 1.05 },
        ];
        let fund = Fund::from_records("017437", records);
        assert_eq!(fund.len(), 2);
        assert_eq!(fund[0].date, ymd(2023, 1, 3));
        assert_eq!(fund[0].nav, 1.05);
        assert_eq!(fund[1].date, ymd(2023, 1, 9));
    }

    #[test]
    fn test_nav_on_or_after() {
        let fund = sample();
        assert_eq!(fund.nav_on_or_after(ymd(2023, 1, 1)).unwrap().nav, 1.0);
        assert_eq!(fund.nav_on_or_after(ymd(2023, 1, 4)).unwrap().nav, 1.1);
        // 2023-01-07 is a Saturday, the next publishing day is Monday the 9th
        assert_eq!(fund.nav_on_or_after(ymd(2023, 1, 7)).unwrap().nav, 1.2);
        assert!(fund.nav_on_or_after(ymd(2023, 1, 10)).is_none());
    }

    #[test]
    fn test_nav_on_or_before() {
        let fund = sample();
        assert!(fund.nav_on_or_before(ymd(2023, 1, 2)).is_none());
        assert_eq!(fund.nav_on_or_before(ymd(2023, 1, 4)).unwrap().nav, 1.1);
        assert_eq!(fund.nav_on_or_before(ymd(2023, 1, 6)).unwrap().nav, 1.1);
        assert_eq!(fund.nav_on_or_before(ymd(2023, 2, 1)).unwrap().nav, 1.2);
    }

    #[test]
    fn test_nav_on() {
        let fund = sample();
        assert_eq!(fund.nav_on(ymd(2023, 1, 4)).unwrap().nav, 1.1);
        assert!(fund.nav_on(ymd(2023, 1, 5)).is_none());
        assert!(fund.nav_on(ymd(2023, 1, 10)).is_none());
    }
}
