use anyhow::Context;
use lab_radiometry::linear_regression;
use serde::Deserialize;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "linear-fit", about = "Linear regression of measurements")]
struct Opt {
    /// CSV file with the `x`, `y` and, optionally, `dy` columns
    path: PathBuf,
    /// Abscissa label
    #[cfg(feature = "plot")]
    #[structopt(long, default_value = "x")]
    x_label: String,
    /// Ordinate label
    #[cfg(feature = "plot")]
    #[structopt(long, default_value = "y")]
    y_label: String,
    /// Plot the measurements with the regression line
    #[cfg(feature = "plot")]
    #[structopt(short, long)]
    plot: bool,
}

#[derive(Deserialize, Debug)]
struct Record {
    x: f64,
    y: f64,
    #[cfg(feature = "plot")]
    dy: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&opt.path)
        .with_context(|| format!("failed to open {:?}", opt.path))?;
    let records = rdr
        .deserialize()
        .collect::<Result<Vec<Record>, _>>()
        .with_context(|| format!("failed to parse {:?}", opt.path))?;
    log::info!("{} measurements loaded", records.len());

    let x: Vec<f64> = records.iter().map(|r| r.x).collect();
    let y: Vec<f64> = records.iter().map(|r| r.y).collect();
    let fit = linear_regression(&x, &y)?;
    println!("{}", fit);

    #[cfg(feature = "plot")]
    if opt.plot {
        let dy: Option<Vec<f64>> = records.iter().map(|r| r.dy).collect();
        lab_radiometry::plot::regression(
            &x,
            &y,
            dy.as_deref(),
            &fit,
            (opt.x_label.as_str(), opt.y_label.as_str()),
            "LINEAR-FIT.svg",
        )
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    Ok(())
}
