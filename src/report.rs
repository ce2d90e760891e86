use serde::Serialize;
use std::{io::Write, path::Path};

use crate::{
    brightness::{
        analytic_nedt, compute_nedt, compute_temperature_curve, nedt_residuals,
        BrightnessTemperatureError, NedtCurve, PixelRange, TemperatureCurve, UncertaintyBand,
    },
    channel::{CalibrationPoint, Channel, ChannelCalibration},
};

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("failed to compute the channel curves")]
    BrightnessTemperature(#[from] BrightnessTemperatureError),
    #[error("failed to write the CSV file")]
    Csv(#[from] csv::Error),
    #[error("failed to write the report")]
    Io(#[from] std::io::Error),
}
type Result<T> = std::result::Result<T, ReportError>;

#[derive(Serialize, Debug)]
struct Record {
    #[serde(rename = "Pixel count")]
    pixel: f64,
    #[serde(rename = "Temperature (K)")]
    temperature: f64,
    #[serde(rename = "NEDT (K)")]
    nedt: Option<f64>,
}

/// Brightness temperature and NEDT curves of a channel
#[derive(Debug, Clone)]
pub struct ChannelReport {
    pub calibration: ChannelCalibration,
    pub calibration_point: Option<CalibrationPoint>,
    pub sigma_p: f64,
    pub curve: TemperatureCurve,
    pub nedt: NedtCurve,
    pub analytic_nedt: Vec<f64>,
}
impl ChannelReport {
    pub fn new(
        calibration: ChannelCalibration,
        range: PixelRange,
        n_sample: usize,
        sigma_p: f64,
    ) -> Result<Self> {
        let curve = compute_temperature_curve(&calibration, range, n_sample)?;
        let nedt = compute_nedt(curve.pixel(), curve.temperature(), sigma_p)?;
        let analytic_nedt = analytic_nedt(&calibration, curve.pixel(), sigma_p)?;
        Ok(Self {
            calibration,
            calibration_point: None,
            sigma_p,
            curve,
            nedt,
            analytic_nedt,
        })
    }
    /// Report with the lab presets of `channel`
    pub fn from_channel(channel: Channel) -> Result<Self> {
        Ok(Self::new(
            channel.calibration(),
            channel.pixel_range(),
            channel.n_sample(),
            channel.sigma_p(),
        )?
        .calibration_point(channel.calibration_point()))
    }
    pub fn calibration_point(self, point: CalibrationPoint) -> Self {
        Self {
            calibration_point: Some(point),
            ..self
        }
    }
    pub fn residuals(&self) -> Result<Vec<f64>> {
        Ok(nedt_residuals(&self.analytic_nedt, &self.nedt)?)
    }
    pub fn band(&self) -> Result<UncertaintyBand> {
        Ok(UncertaintyBand::new(&self.curve, &self.nedt)?)
    }
    /// Model temperature at the calibration pixel count minus the measured temperature
    pub fn calibration_offset(&self) -> Option<f64> {
        let point = self.calibration_point?;
        self.curve
            .temperature_at(point.pixel)
            .map(|t| t - point.temperature)
    }
    /// Smallest and largest defined temperatures, `None` if every sample is undefined
    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        self.curve.valid_iter().fold(None, |range, (_, t)| match range {
            None => Some((t, t)),
            Some((t_min, t_max)) => Some((t_min.min(t), t_max.max(t))),
        })
    }
    pub fn summary(&self) {
        println!("SUMMARY:");
        println!(" - {}", self.calibration);
        println!(
            " - # of samples: {} ({} defined)",
            self.curve.len(),
            self.curve.valid_iter().count()
        );
        match self.temperature_range() {
            Some((t_min, t_max)) => {
                println!(" - temperature range: [{:.2},{:.2}]K", t_min, t_max)
            }
            None => println!(" - temperature range: no defined samples"),
        }
        if let (Some(point), Some(offset)) = (self.calibration_point, self.calibration_offset()) {
            println!(
                " - calibration point: P={:.2}, T={:.2}K (model offset: {:+.3}K)",
                point.pixel, point.temperature, offset
            );
        }
        let nedt_abs_max = self
            .nedt
            .nedt()
            .iter()
            .filter(|n| !n.is_nan())
            .fold(0f64, |m, n| m.max(n.abs()));
        println!(
            " - NEDT (σP={:.2}): max. |NEDT|={:.3}K",
            self.sigma_p, nedt_abs_max
        );
        if let Ok(residuals) = self.residuals() {
            let max_residual = residuals
                .iter()
                .filter(|r| !r.is_nan())
                .fold(0f64, |m, r| m.max(r.abs()));
            println!(" - analytic vs numerical NEDT: max. residual={:.3e}K", max_residual);
        }
    }
    /// Writes the curves as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let nedt = std::iter::once(None).chain(self.nedt.nedt().iter().cloned().map(Some));
        for ((pixel, temperature), nedt) in self.curve.iter().zip(nedt) {
            wtr.serialize(Record {
                pixel,
                temperature,
                nedt,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
    /// Writes the curves to a CSV file
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        log::info!("writing {:?}", path.as_ref());
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_columns() {
        let report = ChannelReport::new(
            ChannelCalibration::new(1, 10., -0.05, 15.),
            PixelRange::new(0., 2.),
            3,
            1.,
        )
        .unwrap();
        let mut buffer = Vec::new();
        report.write_csv(&mut buffer).unwrap();
        let contents = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Pixel count,Temperature (K),NEDT (K)");
        assert!(lines[1].starts_with("0.0,") && lines[1].ends_with(','));
        assert_eq!(lines[2].split(',').count(), 3);
        assert!(!lines[2].ends_with(','));
    }

    #[test]
    fn lab_channels() {
        for channel in [Channel::Nine, Channel::Ten] {
            let report = ChannelReport::from_channel(channel).unwrap();
            assert_eq!(report.nedt.len(), report.curve.len() - 1);
            assert!(report.calibration_offset().unwrap().abs() < 0.5);
            assert_eq!(report.band().unwrap().pixel.len(), 2700);
            let (t_min, t_max) = report.temperature_range().unwrap();
            assert!(t_min < t_max);
        }
    }

    #[test]
    fn undefined_temperature_range() {
        let report = ChannelReport::new(
            ChannelCalibration::new(1, 10., 0., -1.),
            PixelRange::new(0., 10.),
            11,
            1.,
        )
        .unwrap();
        assert_eq!(report.curve.valid_iter().count(), 0);
        assert_eq!(report.temperature_range(), None);
        assert!(report.nedt.nedt().iter().all(|n| n.is_nan()));
        report.summary();
    }
}
