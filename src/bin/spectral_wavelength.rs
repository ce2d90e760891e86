use anyhow::Context;
use glob::glob;
use lab_radiometry::spectral::{SpectralResponseLoader, SPECTRAL_HEADER_LINES};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "spectral-wavelength",
    about = "Channel characteristic wavelength from the spectral response"
)]
struct Opt {
    /// Path to the directory with the `ch{N}.txt` spectral response files
    #[structopt(long, default_value = ".")]
    path: PathBuf,
    /// Channel numbers, all the `ch*.txt` files if omitted
    #[structopt(short, long)]
    channel: Vec<u32>,
    /// Column separator, any whitespace if omitted
    #[structopt(short, long)]
    separator: Option<char>,
    /// Number of header lines
    #[structopt(long, default_value = "6")]
    header_lines: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    if opt.header_lines != SPECTRAL_HEADER_LINES {
        log::info!("skipping {} header lines", opt.header_lines);
    }

    let mut loader = SpectralResponseLoader::default()
        .data_path(&opt.path)
        .header_lines(opt.header_lines);
    if let Some(separator) = opt.separator {
        loader = loader.separator(separator);
    }

    let files: Vec<PathBuf> = if opt.channel.is_empty() {
        let pattern = opt.path.join("ch*.txt");
        let pattern = pattern.to_str().context("invalid data path")?;
        let mut files = glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
        files.sort();
        files
    } else {
        opt.channel
            .iter()
            .map(|&channel| loader.channel_path(channel))
            .collect()
    };
    if files.is_empty() {
        anyhow::bail!("no spectral response file found in {:?}", opt.path);
    }

    for file in files {
        let response = loader
            .load_path(&file)
            .with_context(|| format!("failed to load {file:?}"))?;
        let wavelength = response
            .characteristic_wavelength()
            .with_context(|| format!("{file:?}"))?;
        let name = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .trim_start_matches("ch");
        println!("{:>3}: {:.4}micron", name, wavelength);
    }

    Ok(())
}
