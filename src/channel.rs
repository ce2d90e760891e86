use serde::Serialize;
use std::fmt::Display;
use strum_macros::EnumIter;

use crate::brightness::{BrightnessTemperatureError, PixelRange};

/// Calibration of an infrared channel
///
/// The channel radiance is linear with the pixel count `P`: `R = a*P + b`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelCalibration {
    /// channel number
    pub channel: u32,
    /// characteristic wavelength [micron]
    pub wavelength: f64,
    pub a: f64,
    pub b: f64,
}
impl ChannelCalibration {
    pub fn new(channel: u32, wavelength: f64, a: f64, b: f64) -> Self {
        Self {
            channel,
            wavelength,
            a,
            b,
        }
    }
    /// Checks that the wavelength is strictly positive and that all the parameters are finite
    pub fn validate(&self) -> Result<(), BrightnessTemperatureError> {
        if !(self.wavelength > 0f64 && self.wavelength.is_finite()) {
            return Err(BrightnessTemperatureError::InvalidInput(format!(
                "channel {}: wavelength must be positive, found {}",
                self.channel, self.wavelength
            )));
        }
        if !(self.a.is_finite() && self.b.is_finite()) {
            return Err(BrightnessTemperatureError::InvalidInput(format!(
                "channel {}: response coefficients must be finite",
                self.channel
            )));
        }
        Ok(())
    }
    /// Linear response `a*p+b`
    pub fn response(&self, p: f64) -> f64 {
        self.a * p + self.b
    }
    /// Pixel count where the linear response vanishes
    pub fn zero_response(&self) -> Option<f64> {
        (self.a != 0f64).then(|| -self.b / self.a)
    }
}
impl Display for ChannelCalibration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "channel {:>2}: λ={:.3}micron, a={:+.6}, b={:+.3}",
            self.channel, self.wavelength, self.a, self.b
        )
    }
}

/// Measured (pixel count, brightness temperature [K]) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationPoint {
    pub pixel: f64,
    pub temperature: f64,
}

/// Lab infrared channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Channel {
    /// 11 micron channel
    Nine,
    /// 12 micron channel
    Ten,
}
impl Channel {
    pub fn number(&self) -> u32 {
        match self {
            Channel::Nine => 9,
            Channel::Ten => 10,
        }
    }
    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            9 => Some(Channel::Nine),
            10 => Some(Channel::Ten),
            _ => None,
        }
    }
    pub fn calibration(&self) -> ChannelCalibration {
        match self {
            Channel::Nine => ChannelCalibration::new(9, 10.788, -0.071857, 17.413),
            Channel::Ten => ChannelCalibration::new(10, 11.943, -0.062984, 15.325),
        }
    }
    pub fn calibration_point(&self) -> CalibrationPoint {
        match self {
            Channel::Nine => CalibrationPoint {
                pixel: 115.30,
                temperature: 294.6,
            },
            Channel::Ten => CalibrationPoint {
                pixel: 112.51,
                temperature: 292.1,
            },
        }
    }
    /// Standard deviation of the pixel count noise
    pub fn sigma_p(&self) -> f64 {
        match self {
            Channel::Nine => 0.86,
            Channel::Ten => 0.98,
        }
    }
    pub fn pixel_range(&self) -> PixelRange {
        PixelRange::new(0f64, 270f64)
    }
    pub fn n_sample(&self) -> usize {
        2701
    }
}
impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ch.{}", self.number())
    }
}
