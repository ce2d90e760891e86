//! Temperature deficit against the water vapour column

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use crate::stats::{linear_regression, LinearRegression, StatsError};

#[derive(thiserror::Error, Debug)]
pub enum DeficitError {
    #[error("failed to open the temperature deficit file {0:?}")]
    Open(PathBuf, #[source] std::io::Error),
    #[error("failed to read the temperature deficit table")]
    Io(#[from] std::io::Error),
    #[error("line #{line}: expected 3 numeric columns, found {row:?}")]
    Row { line: usize, row: String },
    #[error("temperature deficit regression failed")]
    Regression(#[from] StatsError),
}
type Result<T> = std::result::Result<T, DeficitError>;

/// Temperature deficits of channels 9 and 10 [K]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TemperatureDeficit {
    /// water vapour column
    x: Vec<f64>,
    dt9: Vec<f64>,
    dt10: Vec<f64>,
}
impl TemperatureDeficit {
    /// Loads the table from a file; the first line is a header
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading {:?}...", path);
        let file = File::open(path).map_err(|e| DeficitError::Open(path.to_path_buf(), e))?;
        Self::read(file)
    }
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut this = Self::default();
        for (i, line) in BufReader::new(reader).lines().enumerate().skip(1) {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let values: Option<Vec<f64>> = line
                .split_whitespace()
                .map(|v| v.parse::<f64>().ok())
                .collect();
            match values.as_deref() {
                Some(&[x, dt9, dt10]) => {
                    this.x.push(x);
                    this.dt9.push(dt9);
                    this.dt10.push(dt10);
                }
                _ => {
                    return Err(DeficitError::Row {
                        line: i + 1,
                        row: line,
                    })
                }
            }
        }
        log::debug!("{} temperature deficit samples", this.len());
        Ok(this)
    }
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    pub fn x(&self) -> &[f64] {
        &self.x
    }
    pub fn dt9(&self) -> &[f64] {
        &self.dt9
    }
    pub fn dt10(&self) -> &[f64] {
        &self.dt10
    }
    /// Channel 10 deficit minus channel 9 deficit
    pub fn delta(&self) -> Vec<f64> {
        self.dt10
            .iter()
            .zip(&self.dt9)
            .map(|(dt10, dt9)| dt10 - dt9)
            .collect()
    }
    /// Regressions of the deficits against the water vapour column
    pub fn fit(&self) -> Result<DeficitFit> {
        Ok(DeficitFit {
            k9: linear_regression(&self.x, &self.dt9)?,
            k10: linear_regression(&self.x, &self.dt10)?,
            delta: linear_regression(&self.x, &self.delta())?,
        })
    }
}

/// Temperature deficit regressions, the slopes are the `k` coefficients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeficitFit {
    pub k9: LinearRegression,
    pub k10: LinearRegression,
    pub delta: LinearRegression,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uneven_whitespace() {
        let table = "x dT9 dT10\n  10   1.0  1.5\n20 2.0     3.0\n\n 30 3.0 4.5\n";
        let deficit = TemperatureDeficit::read(table.as_bytes()).unwrap();
        assert_eq!(deficit.len(), 3);
        assert_eq!(deficit.x(), &[10., 20., 30.]);
        assert_eq!(deficit.delta(), vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn k_coefficients() {
        let table: String = std::iter::once("x dt9 dt10".to_string())
            .chain((0..=10).map(|i| {
                let x = 10. * i as f64;
                format!("{} {} {}", x, 0.05 * x, 0.08 * x + 0.1)
            }))
            .collect::<Vec<_>>()
            .join("\n");
        let fit = TemperatureDeficit::read(table.as_bytes())
            .unwrap()
            .fit()
            .unwrap();
        assert!((fit.k9.slope - 0.05).abs() < 1e-12);
        assert!((fit.k10.slope - 0.08).abs() < 1e-12);
        assert!((fit.delta.slope - 0.03).abs() < 1e-12);
        assert!((fit.delta.intercept - 0.1).abs() < 1e-12);
    }

    #[test]
    fn malformed_row() {
        let table = "x dt9 dt10\n10 1.0 1.5\n20 2.0\n";
        match TemperatureDeficit::read(table.as_bytes()) {
            Err(DeficitError::Row { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn too_few_rows() {
        let deficit = TemperatureDeficit::read("x dt9 dt10\n10 1.0 1.5\n".as_bytes()).unwrap();
        assert!(matches!(
            deficit.fit(),
            Err(DeficitError::Regression(StatsError::TooFewSamples(1)))
        ));
    }
}
