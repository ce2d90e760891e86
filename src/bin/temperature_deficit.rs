use anyhow::Context;
use lab_radiometry::deficit::TemperatureDeficit;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "temperature-deficit",
    about = "k9 and k10 coefficients from the temperature deficit against the water vapour column"
)]
struct Opt {
    /// Path to the temperature deficit table
    #[structopt(default_value = "tdeficit.txt")]
    path: PathBuf,
    /// Plot the deficits and the regression lines
    #[cfg(feature = "plot")]
    #[structopt(short, long)]
    plot: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let deficit = TemperatureDeficit::from_path(&opt.path)
        .with_context(|| format!("failed to load {:?}", opt.path))?;
    let fit = deficit.fit()?;

    println!("# of samples: {}", deficit.len());
    println!("Ch.9           : {}", fit.k9);
    println!("Ch.10          : {}", fit.k10);
    println!("Ch.10 - Ch.9   : {}", fit.delta);
    println!(
        "k9={:.5}, k10={:.5}, k10-k9={:.5}",
        fit.k9.slope, fit.k10.slope, fit.delta.slope
    );

    #[cfg(feature = "plot")]
    if opt.plot {
        let delta = deficit.delta();
        lab_radiometry::plot::deficit(
            deficit.x(),
            [
                ("Ch.9 (11micron)", deficit.dt9()),
                ("Ch.10 (12micron)", deficit.dt10()),
                ("Ch.10 - Ch.9", delta.as_slice()),
            ],
            &fit,
            "TEMPERATURE-DEFICIT.svg",
        )
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    Ok(())
}
