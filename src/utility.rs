pub const DAYS_PER_YEAR: f64 = 365.;

/// Solve the internal rate of return of a cash-flow stream.
///
/// The IRR `x` satisfies
/// ```ignore
///     end_value = sum(investment_i * (1 + x) ** t_i)
/// ```
/// where `t_i` is the time from flow `i` to the valuation date in years
/// (`days_i / 365`). `x` lives in (-1, +inf); substituting `x = exp(p) - 1`
/// maps the search onto the whole real line so Newton iteration cannot
/// step out of the domain:
/// ```ignore
///     end_value = sum(investment_i * exp(p * t_i))
/// ```
/// Returns `None` when every flow is zero or the iteration fails to
/// converge from the initial guess `x0`.
pub(crate) fn irr(days: &[f64], investments: &[f64], end_value: f64, x0: f64) -> Option<f64> {
    if investments.iter().all(|&x| x == 0.) {
        return None;
    }

    let years: Vec<f64> = days.iter().map(|d| d / DAYS_PER_YEAR).collect();
    let residual = |p: f64| -> f64 {
        end_value
            - years
                .iter()
                .zip(investments)
                .map(|(&t, &x)| x * f64::exp(p * t))
                .sum::<f64>()
    };
    let slope = |p: f64| -> f64 {
        years
            .iter()
            .zip(investments)
            .map(|(&t, &x)| -x * t * f64::exp(p * t))
            .sum()
    };

    let p = newton1d(residual, slope, f64::ln(x0 + 1.), 1e-6, 1000)?;
    Some(f64::exp(p) - 1.)
}

/// One-dimensional Newton iteration.
///
/// # Arguments
///
/// * `f` - The target function.
/// * `d` - The derivative of `f`.
/// * `x0` - The initial guess of the root.
/// * `tol` - Absolute tolerance for the root.
/// * `maxiter` - Iteration limit.
pub(crate) fn newton1d(
    f: impl Fn(f64) -> f64,
    d: impl Fn(f64) -> f64,
    x0: f64,
    tol: f64,
    maxiter: usize,
) -> Option<f64> {
    let mut x = x0;
    for _ in 0..maxiter {
        let next = x - f(x) / d(x);
        if !next.is_finite() {
            return None;
        }
        if (next - x).abs() < tol {
            return Some(next);
        }
        x = next;
    }
    None
}
