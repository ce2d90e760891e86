use anyhow::Context;
use lab_radiometry::{Channel, ChannelCalibration, ChannelReport, PixelRange};
use std::path::PathBuf;
use structopt::StructOpt;
use strum::IntoEnumIterator;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "brightness-temperature",
    about = "Brightness temperature and NEDT against pixel count"
)]
struct Opt {
    /// Channel number, all the lab channels if omitted
    #[structopt(short, long)]
    channel: Option<u32>,
    /// Channel characteristic wavelength [micron]
    #[structopt(short, long)]
    wavelength: Option<f64>,
    /// Linear response slope
    #[structopt(short, allow_hyphen_values = true)]
    a: Option<f64>,
    /// Linear response intercept
    #[structopt(short, allow_hyphen_values = true)]
    b: Option<f64>,
    /// Pixel count lower bound
    #[structopt(long)]
    p_min: Option<f64>,
    /// Pixel count upper bound
    #[structopt(long)]
    p_max: Option<f64>,
    /// Number of pixel count samples
    #[structopt(short = "n", long)]
    samples: Option<usize>,
    /// Pixel count noise standard deviation
    #[structopt(long)]
    sigma_p: Option<f64>,
    /// Brightness temperatures [K] where the NEDT is evaluated
    #[structopt(short, long)]
    temperatures: Vec<f64>,
    /// Directory where the channel curves are saved as CSV files
    #[structopt(long)]
    csv: Option<PathBuf>,
    /// Plot the curves
    #[cfg(feature = "plot")]
    #[structopt(short, long)]
    plot: bool,
}

impl Opt {
    fn report(&self, channel: Option<Channel>) -> anyhow::Result<ChannelReport> {
        let number = channel.map(|c| c.number()).or(self.channel).unwrap_or(0);
        let preset = channel.map(|c| c.calibration());
        let calibration = ChannelCalibration::new(
            number,
            self.wavelength
                .or(preset.map(|c| c.wavelength))
                .context("missing channel wavelength")?,
            self.a
                .or(preset.map(|c| c.a))
                .context("missing linear response slope")?,
            self.b
                .or(preset.map(|c| c.b))
                .context("missing linear response intercept")?,
        );
        let default_range = channel
            .map(|c| c.pixel_range())
            .unwrap_or(PixelRange::new(0f64, 270f64));
        let range = PixelRange::new(
            self.p_min.unwrap_or(default_range.min),
            self.p_max.unwrap_or(default_range.max),
        );
        let n_sample = self
            .samples
            .or(channel.map(|c| c.n_sample()))
            .unwrap_or(2701);
        let sigma_p = self
            .sigma_p
            .or(channel.map(|c| c.sigma_p()))
            .context("missing pixel noise standard deviation")?;
        let report = ChannelReport::new(calibration, range, n_sample, sigma_p)
            .with_context(|| format!("channel {number}"))?;
        Ok(match channel {
            Some(channel) if self.a.is_none() && self.b.is_none() && self.wavelength.is_none() => {
                report.calibration_point(channel.calibration_point())
            }
            _ => report,
        })
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    log::debug!("{:?}", opt);

    let reports = match opt.channel {
        Some(number) => vec![opt.report(Channel::from_number(number))?],
        None => Channel::iter()
            .map(|channel| opt.report(Some(channel)))
            .collect::<anyhow::Result<Vec<_>>>()?,
    };

    for report in &reports {
        report.summary();
        if !opt.temperatures.is_empty() {
            let nedt = report.nedt.at_temperatures(&report.curve, &opt.temperatures);
            for (t, n) in opt.temperatures.iter().zip(nedt) {
                match n {
                    Some(n) => println!(" - NEDT @ {:.2}K: {:.4}K", t, n),
                    None => println!(" - NEDT @ {:.2}K: out of range", t),
                }
            }
        }
        if let Some(path) = &opt.csv {
            let filename = path.join(format!("channel{}.csv", report.calibration.channel));
            report
                .to_csv(&filename)
                .with_context(|| format!("failed to write {filename:?}"))?;
        }
    }

    #[cfg(feature = "plot")]
    if opt.plot {
        use lab_radiometry::plot;
        for report in &reports {
            let channel = report.calibration.channel;
            plot::temperature_curve(report, format!("TEMPERATURE_CH{channel}.svg"))
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            plot::nedt(report, format!("NEDT_CH{channel}.svg"))
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            plot::residuals(report, format!("NEDT-RESIDUALS_CH{channel}.svg"))
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            plot::band(report, format!("TEMPERATURE-BAND_CH{channel}.svg"))
                .map_err(|e| anyhow::anyhow!("{e}"))?;
        }
        if reports.len() > 1 {
            plot::channels(&reports, "TEMPERATURE.svg").map_err(|e| anyhow::anyhow!("{e}"))?;
        }
    }

    Ok(())
}
