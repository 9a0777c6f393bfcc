use core::fmt;
use std::ops::Index;

use chrono::NaiveDate;

use crate::utility::irr;

/// One settled contribution with running totals.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    date: NaiveDate,
    investment: f64,
    nav: f64,
    shares: f64,
    total_investment: f64,
    total_shares: f64,
    present_value: f64,
    profit: f64,
}

impl LedgerRow {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn investment(&self) -> f64 {
        self.investment
    }

    pub fn nav(&self) -> f64 {
        self.nav
    }

    pub fn shares(&self) -> f64 {
        self.shares
    }

    pub fn total_investment(&self) -> f64 {
        self.total_investment
    }

    pub fn total_shares(&self) -> f64 {
        self.total_shares
    }

    /// Value of all shares held so far at this row's NAV.
    pub fn present_value(&self) -> f64 {
        self.present_value
    }

    pub fn profit(&self) -> f64 {
        self.profit
    }
}

/// Append-only record of simulated purchases for one fund.
#[derive(Debug, Clone)]
pub struct Ledger {
    code: String,
    rows: Vec<LedgerRow>,
}

impl Ledger {
    pub fn new(code: &str) -> Self {
        Ledger {
            code: code.to_string(),
            rows: Vec::new(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_investment(&self) -> f64 {
        self.rows.last().map_or(0., |r| r.total_investment)
    }

    pub fn total_shares(&self) -> f64 {
        self.rows.last().map_or(0., |r| r.total_shares)
    }

    /// Appends a settled purchase to the end of the ledger.
    ///
    /// Dates must be appended in order. Two intended dates may settle on
    /// the same publishing day, so equal dates are allowed.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use dingtou::Ledger;
    /// let mut ledger = Ledger::new("017437");
    /// let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    /// ledger.append(day, 10., 1.0, 10.);
    /// ledger.append(day + chrono::Duration::days(31), 10., 1.25, 8.);
    /// assert_eq!(ledger.total_investment(), 20.);
    /// assert_eq!(ledger.rows()[1].present_value(), 22.5);
    /// ```
    pub fn append(&mut self, date: NaiveDate, investment: f64, nav: f64, shares: f64) {
        if let Some(last) = self.rows.last() {
            if date < last.date {
                panic!("ledger dates must be ordered");
            }
        }
        let total_investment = self.total_investment() + investment;
        let total_shares = self.total_shares() + shares;
        let present_value = nav * total_shares;
        self.rows.push(LedgerRow {
            date,
            investment,
            nav,
            shares,
            total_investment,
            total_shares,
            present_value,
            profit: present_value - total_investment,
        });
    }

    /// Annualized rate of return of the contribution stream.
    ///
    /// Solves the IRR of one flow per row against `end_value` at
    /// `end_date`. `None` when the ledger is empty or the solver does not
    /// converge.
    pub fn annualized_return(&self, end_date: NaiveDate, end_value: f64) -> Option<f64> {
        let days: Vec<f64> = self
            .rows
            .iter()
            .map(|r| (end_date - r.date).num_days() as f64)
            .collect();
        let flows: Vec<f64> = self.rows.iter().map(|r| r.investment).collect();
        irr(&days, &flows, end_value, 0.0)
    }
}

impl Index<usize> for Ledger {
    type Output = LedgerRow;
    fn index(&self, index: usize) -> &LedgerRow {
        &self.rows[index]
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "date        invest    nav      shares    tot_invest  tot_shares  value       profit    "
        )?;
        for r in self.rows() {
            writeln!(
                f,
                "{:<}  {:<8.2}  {:<7.4}  {:<8.4}  {:<10.2}  {:<10.4}  {:<10.2}  {:<10.2}",
                r.date,
                r.investment,
                r.nav,
                r.shares,
                r.total_investment,
                r.total_shares,
                r.present_value,
                r.profit
            )?;
        }
        fmt::Result::Ok(())
    }
}
