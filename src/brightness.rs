//! Inverse Planck law brightness temperature and noise equivalent delta temperature

use itertools::Itertools;
use std::ops::Deref;

use crate::channel::ChannelCalibration;

/// First radiation constant of the inverted Planck law [K.micron]
pub const C1: f64 = 14309f64;
/// Second radiation constant of the inverted Planck law
pub const C2: f64 = 1.19e8;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BrightnessTemperatureError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("brightness temperature undefined for sample #{index} (pixel count: {pixel})")]
    Domain { index: usize, pixel: f64 },
}
type Result<T> = std::result::Result<T, BrightnessTemperatureError>;

fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(BrightnessTemperatureError::InvalidInput(msg.into()))
}

/// Inclusive range of pixel counts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRange {
    pub min: f64,
    pub max: f64,
}
impl PixelRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}
impl From<[f64; 2]> for PixelRange {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}
impl From<(f64, f64)> for PixelRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

/// Ordered pixel counts
#[derive(Debug, Clone, PartialEq)]
pub struct PixelDomain(Vec<f64>);
impl Deref for PixelDomain {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl PixelDomain {
    /// Evenly spaced pixel counts over the inclusive `range`
    pub fn linspace(range: PixelRange, n_sample: usize) -> Result<Self> {
        if n_sample < 2 {
            return invalid(format!("sample count must be at least 2, found {n_sample}"));
        }
        let PixelRange { min, max } = range;
        if !(min.is_finite() && max.is_finite()) || max <= min {
            return invalid(format!("invalid pixel range [{min},{max}]"));
        }
        let step = (max - min) / (n_sample - 1) as f64;
        let mut p: Vec<f64> = (0..n_sample).map(|i| min + i as f64 * step).collect();
        p[n_sample - 1] = max;
        Ok(Self(p))
    }
    /// Wraps existing pixel counts, checking that they are finite and strictly increasing
    pub fn from_vec(p: Vec<f64>) -> Result<Self> {
        if p.iter().any(|x| !x.is_finite()) {
            return invalid("pixel counts must be finite");
        }
        if p.iter().tuple_windows().any(|(p0, p1)| p1 <= p0) {
            return invalid("pixel counts must be strictly increasing");
        }
        Ok(Self(p))
    }
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Brightness temperature [K] of a single pixel count
///
/// Returns `None` when the linear response `a*p+b` is not strictly positive,
/// or when the logarithm is not strictly positive.
pub fn brightness_temperature(wavelength: f64, a: f64, b: f64, p: f64) -> Option<f64> {
    let response = a * p + b;
    if !(response > 0f64) {
        return None;
    }
    let log_arg = 1f64 + C2 / (wavelength.powi(5) * response);
    if !(log_arg > 1f64) {
        return None;
    }
    let t = C1 / (wavelength * log_arg.ln());
    t.is_finite().then_some(t)
}

/// Brightness temperatures co-indexed with a [PixelDomain]
///
/// Samples outside the domain of the inverse Planck law are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureCurve {
    pixel: PixelDomain,
    temperature: Vec<f64>,
}
impl TemperatureCurve {
    /// Evaluates the brightness temperature model on `pixel`
    pub fn new(calibration: &ChannelCalibration, pixel: PixelDomain) -> Result<Self> {
        calibration.validate()?;
        let ChannelCalibration {
            wavelength, a, b, ..
        } = *calibration;
        let temperature: Vec<f64> = pixel
            .iter()
            .map(|&p| brightness_temperature(wavelength, a, b, p).unwrap_or(f64::NAN))
            .collect();
        let n_nan = temperature.iter().filter(|t| t.is_nan()).count();
        if n_nan > 0 {
            log::warn!(
                "channel {}: brightness temperature undefined for {} of {} samples",
                calibration.channel,
                n_nan,
                temperature.len()
            );
        }
        Ok(Self { pixel, temperature })
    }
    /// Builds a curve from precomputed temperatures
    pub fn from_parts(pixel: PixelDomain, temperature: Vec<f64>) -> Result<Self> {
        if pixel.len() != temperature.len() {
            return invalid(format!(
                "pixel domain and temperature curve lengths differ ({} vs {})",
                pixel.len(),
                temperature.len()
            ));
        }
        Ok(Self { pixel, temperature })
    }
    pub fn pixel(&self) -> &PixelDomain {
        &self.pixel
    }
    pub fn temperature(&self) -> &[f64] {
        &self.temperature
    }
    pub fn len(&self) -> usize {
        self.temperature.len()
    }
    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }
    /// Iterator over the (pixel count, temperature) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.pixel.iter().cloned().zip(self.temperature.iter().cloned())
    }
    /// Iterator over the (pixel count, temperature) pairs where the temperature is defined
    pub fn valid_iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.iter().filter(|(_, t)| !t.is_nan())
    }
    /// Fails on the first undefined sample
    pub fn check(&self) -> Result<()> {
        match self.temperature.iter().position(|t| t.is_nan()) {
            Some(index) => Err(BrightnessTemperatureError::Domain {
                index,
                pixel: self.pixel[index],
            }),
            None => Ok(()),
        }
    }
    /// Linear interpolation of the temperature at pixel count `p`
    pub fn temperature_at(&self, p: f64) -> Option<f64> {
        interpolate(&self.pixel, &self.temperature, p)
    }
    /// Returns the pixel domain and the temperatures
    pub fn into_parts(self) -> (PixelDomain, Vec<f64>) {
        (self.pixel, self.temperature)
    }
}

/// Computes the brightness temperature curve over `n_sample` pixel counts evenly spread over `range`
pub fn compute_temperature_curve(
    calibration: &ChannelCalibration,
    range: impl Into<PixelRange>,
    n_sample: usize,
) -> Result<TemperatureCurve> {
    let pixel = PixelDomain::linspace(range.into(), n_sample)?;
    let curve = TemperatureCurve::new(calibration, pixel)?;
    log::debug!(
        "channel {}: {} temperature samples computed",
        calibration.channel,
        curve.len()
    );
    Ok(curve)
}

/// Noise equivalent delta temperature co-indexed with `pixel[1..]`
#[derive(Debug, Clone, PartialEq)]
pub struct NedtCurve {
    pixel: Vec<f64>,
    nedt: Vec<f64>,
}
impl NedtCurve {
    /// Pixel counts, i.e. the pixel domain without its first sample
    pub fn pixel(&self) -> &[f64] {
        &self.pixel
    }
    pub fn nedt(&self) -> &[f64] {
        &self.nedt
    }
    pub fn len(&self) -> usize {
        self.nedt.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nedt.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.pixel.iter().cloned().zip(self.nedt.iter().cloned())
    }
    /// NEDT interpolated at each brightness temperature in `temperatures`
    ///
    /// The NEDT is looked up against the temperatures `curve[1..]` the NEDT was derived from.
    pub fn at_temperatures(&self, curve: &TemperatureCurve, temperatures: &[f64]) -> Vec<Option<f64>> {
        let (t, nedt): (Vec<f64>, Vec<f64>) = curve
            .temperature()
            .iter()
            .skip(1)
            .cloned()
            .zip(self.nedt.iter().cloned())
            .filter(|(t, n)| !(t.is_nan() || n.is_nan()))
            .unzip();
        temperatures
            .iter()
            .map(|&x| interpolate_unordered(&t, &nedt, x))
            .collect()
    }
}

/// Forward first order finite difference of the temperature with respect to the pixel count, scaled by the pixel noise `sigma_p`
pub fn compute_nedt(pixel: &[f64], temperature: &[f64], sigma_p: f64) -> Result<NedtCurve> {
    if pixel.len() < 2 {
        return invalid(format!(
            "NEDT requires at least 2 pixel samples, found {}",
            pixel.len()
        ));
    }
    if pixel.len() != temperature.len() {
        return invalid(format!(
            "pixel domain and temperature curve lengths differ ({} vs {})",
            pixel.len(),
            temperature.len()
        ));
    }
    if !(sigma_p > 0f64 && sigma_p.is_finite()) {
        return invalid(format!("pixel noise must be positive, found {sigma_p}"));
    }
    if let Some((i, _)) = pixel
        .iter()
        .tuple_windows()
        .enumerate()
        .find(|(_, (p0, p1))| !(p1 > p0 && p1.is_finite() && p0.is_finite()))
    {
        return invalid(format!(
            "pixel counts must be finite and strictly increasing, found {} then {}",
            pixel[i],
            pixel[i + 1]
        ));
    }
    let nedt = pixel
        .iter()
        .tuple_windows()
        .zip(temperature.iter().tuple_windows())
        .map(|((p0, p1), (t0, t1))| sigma_p * (t1 - t0) / (p1 - p0))
        .collect();
    Ok(NedtCurve {
        pixel: pixel[1..].to_vec(),
        nedt,
    })
}

/// Closed-form NEDT, one value per pixel count
pub fn analytic_nedt(calibration: &ChannelCalibration, pixel: &[f64], sigma_p: f64) -> Result<Vec<f64>> {
    calibration.validate()?;
    if !(sigma_p > 0f64 && sigma_p.is_finite()) {
        return invalid(format!("pixel noise must be positive, found {sigma_p}"));
    }
    let ChannelCalibration {
        wavelength, a, b, ..
    } = *calibration;
    let k = C2 / wavelength.powi(5);
    Ok(pixel
        .iter()
        .map(|&p| {
            brightness_temperature(wavelength, a, b, p)
                .map(|t| {
                    let x = a * p + b;
                    let kx = k / x;
                    sigma_p * (t / (1f64 + kx).ln()) * (k * a / (x * x)) / (1f64 + kx)
                })
                .unwrap_or(f64::NAN)
        })
        .collect())
}

/// Differences between the analytic NEDT, skipping its first sample, and the numerical NEDT
pub fn nedt_residuals(analytic: &[f64], numerical: &NedtCurve) -> Result<Vec<f64>> {
    if analytic.len() != numerical.len() + 1 {
        return invalid(format!(
            "analytic NEDT must have one more sample than the numerical NEDT ({} vs {})",
            analytic.len(),
            numerical.len()
        ));
    }
    Ok(analytic[1..]
        .iter()
        .zip(numerical.nedt())
        .map(|(a, n)| a - n)
        .collect())
}

/// Temperature band `T ± |NEDT|`
#[derive(Debug, Clone, PartialEq)]
pub struct UncertaintyBand {
    pub pixel: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}
impl UncertaintyBand {
    pub fn new(curve: &TemperatureCurve, nedt: &NedtCurve) -> Result<Self> {
        if curve.len() != nedt.len() + 1 {
            return invalid(format!(
                "NEDT curve must have one sample less than the temperature curve ({} vs {})",
                nedt.len(),
                curve.len()
            ));
        }
        let (upper, lower) = curve.temperature()[1..]
            .iter()
            .zip(nedt.nedt())
            .map(|(t, n)| (t + n.abs(), t - n.abs()))
            .unzip();
        Ok(Self {
            pixel: nedt.pixel().to_vec(),
            upper,
            lower,
        })
    }
}

// linear interpolation on increasing abscissa
fn interpolate(x: &[f64], y: &[f64], x0: f64) -> Option<f64> {
    let (first, last) = (*x.first()?, *x.last()?);
    if !(first..=last).contains(&x0) {
        return None;
    }
    let i = x.partition_point(|&xi| xi < x0);
    if x[i] == x0 {
        return Some(y[i]);
    }
    let (x1, x2, y1, y2) = (x[i - 1], x[i], y[i - 1], y[i]);
    Some(y1 + (y2 - y1) * (x0 - x1) / (x2 - x1))
}

// linear interpolation on a monotonic abscissa, increasing or decreasing
fn interpolate_unordered(x: &[f64], y: &[f64], x0: f64) -> Option<f64> {
    x.iter()
        .zip(y)
        .tuple_windows()
        .find(|((x1, _), (x2, _))| x1.min(**x2) <= x0 && x0 <= x1.max(**x2))
        .map(|((&x1, &y1), (&x2, &y2))| {
            if x2 == x1 {
                y1
            } else {
                y1 + (y2 - y1) * (x0 - x1) / (x2 - x1)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;

    #[test]
    fn channel9_calibration_point() {
        let calibration = Channel::Nine.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 270.], 2701).unwrap();
        assert_eq!(curve.len(), 2701);
        let t = curve.temperature_at(115.30).unwrap();
        assert!((t - 294.6).abs() < 0.5, "T(115.30)={t}");
    }

    #[test]
    fn channel10_calibration_point() {
        let calibration = Channel::Ten.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 270.], 2701).unwrap();
        let t = curve.temperature_at(112.51).unwrap();
        assert!((t - 292.1).abs() < 0.5, "T(112.51)={t}");
    }

    #[test]
    fn linspace_endpoints() {
        let p = PixelDomain::linspace(PixelRange::new(0., 270.), 2701).unwrap();
        assert_eq!(p.len(), 2701);
        assert_eq!(p[0], 0.);
        assert_eq!(p[2700], 270.);
        assert!((p[1153] - 115.3).abs() < 1e-9);
    }

    #[test]
    fn sample_count_too_small() {
        let calibration = Channel::Nine.calibration();
        for n in [0, 1] {
            assert!(matches!(
                compute_temperature_curve(&calibration, [0., 270.], n),
                Err(BrightnessTemperatureError::InvalidInput(_))
            ));
        }
        assert_eq!(
            compute_temperature_curve(&calibration, [0., 270.], 2)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn bad_wavelength() {
        let calibration = ChannelCalibration::new(9, 0., -0.071857, 17.413);
        assert!(matches!(
            compute_temperature_curve(&calibration, [0., 270.], 10),
            Err(BrightnessTemperatureError::InvalidInput(_))
        ));
        let calibration = ChannelCalibration::new(9, -10.788, -0.071857, 17.413);
        assert!(compute_temperature_curve(&calibration, [0., 270.], 10).is_err());
    }

    #[test]
    fn zero_response_is_nan() {
        // a*p+b vanishes at p=10
        let calibration = ChannelCalibration::new(1, 10., -1., 10.);
        let curve = compute_temperature_curve(&calibration, [0., 20.], 21).unwrap();
        assert!(curve.temperature()[10].is_nan());
        assert!(curve.temperature()[11..].iter().all(|t| t.is_nan()));
        assert!(curve.temperature()[..10].iter().all(|t| t.is_finite()));
        assert_eq!(
            curve.check(),
            Err(BrightnessTemperatureError::Domain {
                index: 10,
                pixel: 10.
            })
        );
        assert_eq!(curve.valid_iter().count(), 10);
    }

    #[test]
    fn reference_range_beyond_zero_response() {
        let calibration = Channel::Nine.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 270.], 2701).unwrap();
        // a*p+b<=0 above p~242.3
        assert!(curve.temperature()[2424..].iter().all(|t| t.is_nan()));
        assert!(curve.temperature()[..2423].iter().all(|t| t.is_finite()));
        assert!(curve.check().is_err());
    }

    #[test]
    fn temperature_decreases_with_negative_slope() {
        let calibration = Channel::Ten.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 200.], 201).unwrap();
        curve.check().unwrap();
        assert!(curve
            .temperature()
            .windows(2)
            .all(|w| w[1] < w[0]));
    }

    #[test]
    fn nedt_synthetic() {
        let nedt = compute_nedt(&[0., 1., 2.], &[300., 302., 305.], 1.).unwrap();
        assert_eq!(nedt.nedt(), &[2., 3.]);
        assert_eq!(nedt.pixel(), &[1., 2.]);
    }

    #[test]
    fn nedt_uniform_step() {
        let p = [0., 0.1, 0.2, 0.3];
        let t = [290., 290.5, 290.7, 291.6];
        let nedt = compute_nedt(&p, &t, 0.86).unwrap();
        assert_eq!(nedt.len(), 3);
        for (i, n) in nedt.nedt().iter().enumerate() {
            let expected = 0.86 * (t[i + 1] - t[i]) / (p[i + 1] - p[i]);
            assert!((n - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn nedt_non_uniform_step() {
        let nedt = compute_nedt(&[0., 1., 3.], &[300., 302., 306.], 0.5).unwrap();
        assert_eq!(nedt.nedt(), &[1., 1.]);
    }

    #[test]
    fn nedt_invalid_inputs() {
        assert!(compute_nedt(&[0.], &[300.], 1.).is_err());
        assert!(compute_nedt(&[], &[], 1.).is_err());
        assert!(compute_nedt(&[0., 1.], &[300.], 1.).is_err());
        assert!(compute_nedt(&[0., 1.], &[300., 301.], 0.).is_err());
        assert!(compute_nedt(&[0., 1.], &[300., 301.], -1.).is_err());
    }

    #[test]
    fn nedt_pixels_must_increase() {
        let t = [300., 302., 305.];
        for pixel in [[0., 1., 1.], [2., 1., 0.], [0., f64::NAN, 2.]] {
            assert!(matches!(
                compute_nedt(&pixel, &t, 1.),
                Err(BrightnessTemperatureError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn nedt_length_follows_domain() {
        let calibration = Channel::Nine.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 270.], 2701).unwrap();
        let nedt = compute_nedt(curve.pixel(), curve.temperature(), 0.86).unwrap();
        assert_eq!(nedt.len(), 2700);
        assert!(nedt.nedt()[2423..].iter().all(|n| n.is_nan()));
    }

    #[test]
    fn analytic_matches_numerical() {
        let calibration = Channel::Nine.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 200.], 2001).unwrap();
        let nedt = compute_nedt(curve.pixel(), curve.temperature(), 0.86).unwrap();
        let analytic = analytic_nedt(&calibration, curve.pixel(), 0.86).unwrap();
        assert_eq!(analytic.len(), curve.len());
        let residuals = nedt_residuals(&analytic, &nedt).unwrap();
        let max_residual = residuals.iter().fold(0f64, |m, r| m.max(r.abs()));
        assert!(max_residual < 1e-2, "max residual: {max_residual}");
        assert!(analytic.iter().all(|n| *n < 0.));
    }

    #[test]
    fn nedt_at_calibration_temperature() {
        let calibration = Channel::Nine.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 270.], 2701).unwrap();
        let nedt = compute_nedt(curve.pixel(), curve.temperature(), 0.86).unwrap();
        let values = nedt.at_temperatures(&curve, &[294.6, 1e4]);
        let n = values[0].unwrap();
        let analytic = analytic_nedt(&calibration, &[115.3], 0.86).unwrap()[0];
        assert!((n - analytic).abs() < 1e-2, "{n} vs {analytic}");
        assert!(values[1].is_none());
    }

    #[test]
    fn band_brackets_curve() {
        let calibration = Channel::Ten.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 200.], 201).unwrap();
        let nedt = compute_nedt(curve.pixel(), curve.temperature(), 0.98).unwrap();
        let band = UncertaintyBand::new(&curve, &nedt).unwrap();
        assert_eq!(band.pixel.len(), 200);
        band.upper
            .iter()
            .zip(&band.lower)
            .zip(&curve.temperature()[1..])
            .for_each(|((u, l), t)| assert!(l <= t && t <= u));
    }

    #[test]
    fn interpolation_outside_domain() {
        let calibration = Channel::Nine.calibration();
        let curve = compute_temperature_curve(&calibration, [0., 100.], 11).unwrap();
        assert!(curve.temperature_at(-1.).is_none());
        assert!(curve.temperature_at(100.5).is_none());
        assert_eq!(curve.temperature_at(0.), Some(curve.temperature()[0]));
    }

    #[test]
    fn curve_from_parts() {
        let pixel = PixelDomain::from_vec(vec![0., 1., 2.]).unwrap();
        assert!(TemperatureCurve::from_parts(pixel.clone(), vec![300., 301.]).is_err());
        let curve = TemperatureCurve::from_parts(pixel, vec![300., f64::NAN, 302.]).unwrap();
        assert_eq!(curve.valid_iter().count(), 2);
        let (pixel, temperature) = curve.into_parts();
        assert_eq!(pixel.into_inner(), vec![0., 1., 2.]);
        assert_eq!(temperature.len(), 3);
    }

    #[test]
    fn pixel_domain_must_increase() {
        assert!(PixelDomain::from_vec(vec![0., 1., 1.]).is_err());
        assert!(PixelDomain::from_vec(vec![0., f64::NAN]).is_err());
        assert!(PixelDomain::from_vec(vec![0., 1., 3.]).is_ok());
    }
}
