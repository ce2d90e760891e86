use anyhow::Context;
use lab_radiometry::logbook::{Logbook, QUIT};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "logbook", about = "Appends timestamped entries to a project logbook")]
struct Opt {
    /// Logbook file, prompted for if omitted
    path: Option<PathBuf>,
}

fn prompt(message: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{message}")?;
    stdout.flush()
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let path = match opt.path {
        Some(path) => path,
        None => {
            prompt("What file would you like to edit? ")?;
            let name = lines.next().context("no logbook file given")??;
            PathBuf::from(name.trim())
        }
    };
    let mut logbook = Logbook::open(&path)?;

    println!("To quit the program, type '{QUIT}'");
    loop {
        prompt("LOG: ")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line == QUIT {
            break;
        }
        logbook.append(&line)?;
    }

    Ok(())
}
