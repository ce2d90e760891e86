//! Laboratory statistics
//!
//! Inverse-variance weighted mean and ordinary least-squares regression

use serde::Serialize;
use std::fmt::Display;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("empty data set")]
    Empty,
    #[error("data lengths differ ({0} vs {1})")]
    Length(usize, usize),
    #[error("invalid uncertainty #{index}: {value}")]
    Uncertainty { index: usize, value: f64 },
    #[error("at least 2 samples are required, found {0}")]
    TooFewSamples(usize),
    #[error("cannot calculate a linear regression if all x values are identical")]
    DegenerateAbscissa,
}
type Result<T> = std::result::Result<T, StatsError>;

/// Inverse-variance weighted mean and its uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedMean {
    pub mean: f64,
    pub error: f64,
}
impl Display for WeightedMean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} ± {:.4}", self.mean, self.error)
    }
}

/// Weighted mean of `data` with the weights `1/error²`
pub fn weighted_mean(data: &[f64], error: &[f64]) -> Result<WeightedMean> {
    if data.is_empty() {
        return Err(StatsError::Empty);
    }
    if data.len() != error.len() {
        return Err(StatsError::Length(data.len(), error.len()));
    }
    if let Some((index, &value)) = error
        .iter()
        .enumerate()
        .find(|(_, e)| !(**e > 0f64 && e.is_finite()))
    {
        return Err(StatsError::Uncertainty { index, value });
    }
    let (sum_w, sum_wx) = data
        .iter()
        .zip(error)
        .map(|(x, e)| {
            let w = e.powi(-2);
            (w, w * x)
        })
        .fold((0f64, 0f64), |(a, b), (w, wx)| (a + w, b + wx));
    Ok(WeightedMean {
        mean: sum_wx / sum_w,
        error: sum_w.powf(-0.5),
    })
}

/// Linear least squares regression result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient
    pub rvalue: f64,
    /// two-sided p-value for the null hypothesis of a zero slope
    pub pvalue: f64,
    /// standard error of the slope
    pub stderr: f64,
    pub intercept_stderr: f64,
}
impl LinearRegression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
    /// Fitted line evaluated at `x`
    pub fn line(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&x| self.predict(x)).collect()
    }
}
impl Display for LinearRegression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "slope={:.6} ± {:.6}, intercept={:.6} ± {:.6}, r={:.6}, p={:.3e}",
            self.slope,
            self.stderr,
            self.intercept,
            self.intercept_stderr,
            self.rvalue,
            self.pvalue
        )
    }
}

const TINY: f64 = 1e-20;

/// Regression of `y` against `x`
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<LinearRegression> {
    if x.len() != y.len() {
        return Err(StatsError::Length(x.len(), y.len()));
    }
    let n = x.len();
    if n < 2 {
        return Err(StatsError::TooFewSamples(n));
    }
    let n_f = n as f64;
    let x_mean = x.iter().sum::<f64>() / n_f;
    let y_mean = y.iter().sum::<f64>() / n_f;
    let (ssxm, ssym, ssxym) = x.iter().zip(y).fold((0f64, 0f64, 0f64), |(sx, sy, sxy), (x, y)| {
        let (dx, dy) = (x - x_mean, y - y_mean);
        (sx + dx * dx, sy + dy * dy, sxy + dx * dy)
    });
    let (ssxm, ssym, ssxym) = (ssxm / n_f, ssym / n_f, ssxym / n_f);
    if ssxm == 0f64 {
        return Err(StatsError::DegenerateAbscissa);
    }
    let rvalue = if ssym == 0f64 {
        0f64
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1f64, 1f64)
    };
    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;
    if n == 2 {
        return Ok(LinearRegression {
            slope,
            intercept,
            rvalue: if y[0] == y[1] { 0f64 } else { rvalue.signum() },
            pvalue: if y[0] == y[1] { 1f64 } else { 0f64 },
            stderr: 0f64,
            intercept_stderr: 0f64,
        });
    }
    let df = (n - 2) as f64;
    let t = rvalue * (df / ((1f64 - rvalue + TINY) * (1f64 + rvalue + TINY))).sqrt();
    let pvalue = special::student_t_two_sided(t, df);
    let stderr = ((1f64 - rvalue * rvalue) * ssym / ssxm / df).sqrt();
    let intercept_stderr = stderr * (ssxm + x_mean * x_mean).sqrt();
    Ok(LinearRegression {
        slope,
        intercept,
        rvalue,
        pvalue,
        stderr,
        intercept_stderr,
    })
}

mod special {
    const LANCZOS: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];

    fn ln_gamma(x: f64) -> f64 {
        let tmp = x + 5.5;
        let tmp = tmp - (x + 0.5) * tmp.ln();
        let ser = LANCZOS
            .iter()
            .enumerate()
            .fold(1.000000000190015, |s, (i, c)| s + c / (x + 1f64 + i as f64));
        -tmp + (2.5066282746310005 * ser / x).ln()
    }

    // continued fraction of the incomplete beta function (modified Lentz)
    fn beta_cf(a: f64, b: f64, x: f64) -> f64 {
        const MAX_ITER: usize = 300;
        const EPS: f64 = 1e-15;
        const FPMIN: f64 = 1e-300;
        let (qab, qap, qam) = (a + b, a + 1f64, a - 1f64);
        let mut c = 1f64;
        let mut d = 1f64 - qab * x / qap;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        d = 1f64 / d;
        let mut h = d;
        for m in 1..=MAX_ITER {
            let m = m as f64;
            let m2 = 2f64 * m;
            let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
            d = 1f64 + aa * d;
            if d.abs() < FPMIN {
                d = FPMIN;
            }
            c = 1f64 + aa / c;
            if c.abs() < FPMIN {
                c = FPMIN;
            }
            d = 1f64 / d;
            h *= d * c;
            let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
            d = 1f64 + aa * d;
            if d.abs() < FPMIN {
                d = FPMIN;
            }
            c = 1f64 + aa / c;
            if c.abs() < FPMIN {
                c = FPMIN;
            }
            d = 1f64 / d;
            let del = d * c;
            h *= del;
            if (del - 1f64).abs() < EPS {
                break;
            }
        }
        h
    }

    /// Regularized incomplete beta function I_x(a,b)
    pub fn inc_beta(a: f64, b: f64, x: f64) -> f64 {
        if x <= 0f64 {
            return 0f64;
        }
        if x >= 1f64 {
            return 1f64;
        }
        let bt = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b)
            + a * x.ln()
            + b * (1f64 - x).ln())
        .exp();
        if x < (a + 1f64) / (a + b + 2f64) {
            bt * beta_cf(a, b, x) / a
        } else {
            1f64 - bt * beta_cf(b, a, 1f64 - x) / b
        }
    }

    /// Two-sided tail probability of the Student t distribution with `df` degrees of freedom
    pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
        if !t.is_finite() {
            return 0f64;
        }
        inc_beta(0.5 * df, 0.5, df / (df + t * t))
    }

}
