use chrono::NaiveDate;
use tracing::warn;

use crate::data::Fund;
use crate::error::{Error, Result};
use crate::record::Ledger;

/// Outcome of one backtest run. Computed once, never mutated.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub total_invested: f64,
    pub total_shares: f64,
    pub final_nav: f64,
    /// Publishing date of `final_nav`; equals the requested end date
    /// unless valuation fell back to an earlier record.
    pub final_nav_date: NaiveDate,
    pub final_asset_value: f64,
    /// Simple return over the whole period, in percent.
    pub return_rate: f64,
    /// Annualized internal rate of return of the contribution stream, in
    /// percent. `None` when the solver does not converge.
    pub annualized_rate: Option<f64>,
    pub ledger: Ledger,
}

/// Simulates fixed periodic purchases of `fund` on `invest_dates`.
///
/// Each intended date is aligned forward to the first published NAV on or
/// after it; the contribution buys `amount / nav` shares at that record.
/// An intended date with no NAV on or after it fails with
/// [`Error::NoMatchingNav`].
///
/// The holdings are valued at the NAV published exactly on `end_date`
/// when it exists; otherwise at the last NAV before it, with a warning.
pub fn simulate(
    fund: &Fund,
    amount: f64,
    invest_dates: &[NaiveDate],
    end_date: NaiveDate,
) -> Result<SimulationResult> {
    if !(amount > 0.0) || !amount.is_finite() {
        return Err(Error::InvalidContribution(amount));
    }

    let mut ledger = Ledger::new(fund.code());
    for &day in invest_dates {
        let slice = fund.nav_on_or_after(day).ok_or(Error::NoMatchingNav(day))?;
        let shares = amount / slice.nav;
        ledger.append(slice.date, amount, slice.nav, shares);
    }

    let valuation = fund
        .nav_on_or_before(end_date)
        .ok_or(Error::NoValuationNav(end_date))?;
    if valuation.date != end_date {
        warn!(
            "no NAV published on {}, valuing holdings at {} ({})",
            end_date, valuation.nav, valuation.date
        );
    }

    let total_invested = ledger.total_investment();
    let total_shares = ledger.total_shares();
    let final_asset_value = total_shares * valuation.nav;
    let return_rate = compute_return(final_asset_value, total_invested)?;
    let annualized_rate = ledger
        .annualized_return(valuation.date, final_asset_value)
        .map(|x| x * 100.0);

    Ok(SimulationResult {
        total_invested,
        total_shares,
        final_nav: valuation.nav,
        final_nav_date: valuation.date,
        final_asset_value,
        return_rate,
        annualized_rate,
        ledger,
    })
}

/// Simple percentage return on the invested amount.
pub fn compute_return(final_asset_value: f64, total_invested: f64) -> Result<f64> {
    if total_invested == 0.0 {
        return Err(Error::ZeroInvestment);
    }
    Ok((final_asset_value - total_invested) / total_invested * 100.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::NavSlice;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fund(points: &[(i32, u32, u32, f64)]) -> Fund {
        let records = points
            .iter()
            .map(|&(y, m, d, nav)| NavSlice { date: ymd(y, m, d), nav })
            .collect();
        Fund::from_records("test", records)
    }

    #[test]
    fn test_flat_nav_breaks_even() {
        let fund = fund(&[(2023, 1, 1, 1.0), (2023, 2, 1, 1.0), (2023, 3, 1, 1.0)]);
        let dates = [ymd(2023, 1, 1), ymd(2023, 2, 1), ymd(2023, 3, 1)];
        let res = simulate(&fund, 1000., &dates, ymd(2023, 3, 1)).unwrap();
        assert_eq!(res.total_invested, 3000.);
        assert_eq!(res.total_shares, 3000.);
        assert_eq!(res.final_nav, 1.0);
        assert_eq!(res.final_asset_value, 3000.);
        assert_eq!(res.return_rate, 0.);
    }

    #[test]
    fn test_rising_nav() {
        let fund = fund(&[(2023, 1, 1, 1.0), (2023, 2, 1, 1.0), (2023, 3, 1, 2.0)]);
        let dates = [ymd(2023, 1, 1), ymd(2023, 2, 1)];
        let res = simulate(&fund, 1000., &dates, ymd(2023, 3, 1)).unwrap();
        assert_eq!(res.total_invested, 2000.);
        assert_eq!(res.total_shares, 2000.);
        assert_eq!(res.final_asset_value, 4000.);
        assert_eq!(res.return_rate, 100.);
    }

    #[test]
    fn test_forward_fill_alignment() {
        // Intended date 2023-01-07 is not a publishing day; the buy
        // settles at the next record two days later.
        let fund = fund(&[(2023, 1, 5, 1.0), (2023, 1, 9, 1.25), (2023, 1, 31, 1.25)]);
        let res = simulate(&fund, 100., &[ymd(2023, 1, 7)], ymd(2023, 1, 31)).unwrap();
        assert_eq!(res.ledger[0].date(), ymd(2023, 1, 9));
        assert_eq!(res.ledger[0].nav(), 1.25);
        assert_eq!(res.total_shares, 80.);
    }

    #[test]
    fn test_single_date_break_even() {
        let fund = fund(&[(2023, 1, 2, 1.4), (2023, 6, 1, 1.4)]);
        let res = simulate(&fund, 500., &[ymd(2023, 1, 1)], ymd(2023, 6, 1)).unwrap();
        assert_eq!(res.return_rate, 0.);
    }

    #[test]
    fn test_no_matching_nav() {
        let fund = fund(&[(2023, 1, 2, 1.0)]);
        let err = simulate(&fund, 100., &[ymd(2023, 2, 1)], ymd(2023, 2, 1)).unwrap_err();
        assert!(matches!(err, Error::NoMatchingNav(d) if d == ymd(2023, 2, 1)));
    }

    #[test]
    fn test_valuation_backward_fill() {
        // End date beyond the last record values at the last known NAV.
        let fund = fund(&[(2023, 1, 2, 1.0), (2023, 1, 20, 1.1)]);
        let res = simulate(&fund, 100., &[ymd(2023, 1, 2)], ymd(2023, 1, 31)).unwrap();
        assert_eq!(res.final_nav, 1.1);
        assert_eq!(res.final_nav_date, ymd(2023, 1, 20));
        assert!((res.return_rate - 10.).abs() < 1e-10);
    }

    #[test]
    fn test_no_valuation_nav() {
        let fund = fund(&[(2023, 3, 1, 1.0)]);
        let err = simulate(&fund, 100., &[], ymd(2023, 2, 1)).unwrap_err();
        assert!(matches!(err, Error::NoValuationNav(_)));
    }

    #[test]
    fn test_empty_dates_is_zero_investment() {
        let fund = fund(&[(2023, 1, 2, 1.0)]);
        let err = simulate(&fund, 100., &[], ymd(2023, 1, 2)).unwrap_err();
        assert!(matches!(err, Error::ZeroInvestment));
    }

    #[test]
    fn test_rejects_non_positive_contribution() {
        let fund = fund(&[(2023, 1, 2, 1.0)]);
        for bad in [0.0, -100.0, f64::NAN] {
            let err = simulate(&fund, bad, &[ymd(2023, 1, 2)], ymd(2023, 1, 2)).unwrap_err();
            assert!(matches!(err, Error::InvalidContribution(_)));
        }
    }

    #[test]
    fn test_compute_return() {
        assert_eq!(compute_return(3000., 3000.).unwrap(), 0.);
        assert_eq!(compute_return(6000., 3000.).unwrap(), 100.);
        assert_eq!(compute_return(1500., 3000.).unwrap(), -50.);
        assert!(matches!(
            compute_return(100., 0.).unwrap_err(),
            Error::ZeroInvestment
        ));
    }

    #[test]
    fn test_return_monotone_in_final_value() {
        let mut last = f64::NEG_INFINITY;
        for value in [0., 500., 1000., 2500., 10_000.] {
            let r = compute_return(value, 1000.).unwrap();
            assert!(r > last);
            last = r;
        }
    }

    #[test]
    fn test_annualized_rate_present() {
        let fund = fund(&[(2023, 1, 2, 1.0), (2024, 1, 2, 2.0)]);
        let res = simulate(&fund, 100., &[ymd(2023, 1, 1)], ymd(2024, 1, 2)).unwrap();
        // 100 doubles over one year: IRR close to 100 percent.
        let rate = res.annualized_rate.unwrap();
        assert!((rate - 100.).abs() < 1.0);
    }
}
