use lab_radiometry::weighted_mean;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "weighted-mean", about = "Inverse-variance weighted mean")]
struct Opt {
    /// Measurements
    #[structopt(short, long, required = true, allow_hyphen_values = true)]
    values: Vec<f64>,
    /// Measurement uncertainties
    #[structopt(short, long, required = true)]
    errors: Vec<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let mean = weighted_mean(&opt.values, &opt.errors)?;
    println!("{}", mean);
    Ok(())
}
