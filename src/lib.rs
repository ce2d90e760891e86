//! Infrared channel brightness temperature calibration
//!
//! The brightness temperature of a channel is derived from the pixel count
//! with an inverted Planck law, the noise equivalent delta temperature (NEDT)
//! from the derivative of the brightness temperature with respect to the pixel count.
//! The crate also provides the laboratory statistics, spectral response and
//! temperature deficit tools used to calibrate the channels.

pub mod brightness;
pub mod channel;
pub mod deficit;
mod error;
pub mod logbook;
#[cfg(feature = "plot")]
pub mod plot;
pub mod report;
pub mod spectral;
pub mod stats;

pub use brightness::{
    analytic_nedt, brightness_temperature, compute_nedt, compute_temperature_curve,
    BrightnessTemperatureError, NedtCurve, PixelDomain, PixelRange, TemperatureCurve,
    UncertaintyBand, C1, C2,
};
pub use channel::{CalibrationPoint, Channel, ChannelCalibration};
pub use error::Error;
pub use report::ChannelReport;
pub use stats::{linear_regression, weighted_mean, LinearRegression, WeightedMean};
