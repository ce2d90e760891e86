use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum SpectralError {
    #[error("failed to open the spectral response file {0:?}")]
    Open(PathBuf, #[source] std::io::Error),
    #[error("failed to read the spectral response")]
    Io(#[from] std::io::Error),
    #[error("spectral response sums to zero")]
    EmptyResponse,
}
type Result<T> = std::result::Result<T, SpectralError>;

/// Default number of header lines in a spectral response file
pub const SPECTRAL_HEADER_LINES: usize = 6;

/// Channel spectral response
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SpectralResponse {
    /// wavelength [micron]
    wavelength: Vec<f64>,
    /// relative response
    response: Vec<f64>,
}
impl SpectralResponse {
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }
    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }
    /// Iterator over the (wavelength, response) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.wavelength
            .iter()
            .cloned()
            .zip(self.response.iter().cloned())
    }
    /// Response weighted mean wavelength
    pub fn characteristic_wavelength(&self) -> Result<f64> {
        let (weighted, normalisation) = self
            .iter()
            .fold((0f64, 0f64), |(s, n), (w, r)| (s + w * r, n + r));
        if normalisation == 0f64 {
            return Err(SpectralError::EmptyResponse);
        }
        Ok(weighted / normalisation)
    }
}

/// Column separator of the spectral response tables
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Separator {
    #[default]
    Whitespace,
    Char(char),
}
impl Separator {
    fn split<'a>(&self, row: &'a str) -> Vec<&'a str> {
        match self {
            Separator::Whitespace => row.split_whitespace().collect(),
            Separator::Char(c) => row
                .split(*c)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}
impl From<char> for Separator {
    fn from(c: char) -> Self {
        Separator::Char(c)
    }
}

pub struct SpectralResponseLoader {
    path: PathBuf,
    header_lines: usize,
    separator: Separator,
}
impl Default for SpectralResponseLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            header_lines: SPECTRAL_HEADER_LINES,
            separator: Separator::default(),
        }
    }
}
impl SpectralResponseLoader {
    /// Directory with the `ch{N}.txt` files
    pub fn data_path<P: AsRef<Path>>(self, data_path: P) -> Self {
        Self {
            path: data_path.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn header_lines(self, header_lines: usize) -> Self {
        Self {
            header_lines,
            ..self
        }
    }
    pub fn separator<S: Into<Separator>>(self, separator: S) -> Self {
        Self {
            separator: separator.into(),
            ..self
        }
    }
    /// Path to the spectral response file of `channel`
    pub fn channel_path(&self, channel: u32) -> PathBuf {
        self.path.join(format!("ch{channel}.txt"))
    }
    /// Loads the spectral response of `channel`
    pub fn load(&self, channel: u32) -> Result<SpectralResponse> {
        let path = self.channel_path(channel);
        self.load_path(path)
    }
    /// Loads the spectral response from the file at `path`
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<SpectralResponse> {
        let path = path.as_ref();
        log::info!("Loading {:?}...", path);
        let file = File::open(path).map_err(|e| SpectralError::Open(path.to_path_buf(), e))?;
        self.read(file)
    }
    /// Parses a spectral response table
    ///
    /// Rows that cannot be parsed are logged and skipped.
    pub fn read<R: Read>(&self, reader: R) -> Result<SpectralResponse> {
        let mut this = SpectralResponse::default();
        for (i, line) in BufReader::new(reader)
            .lines()
            .enumerate()
            .skip(self.header_lines)
        {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match self.parse_row(&line) {
                Some((wavelength, response)) => {
                    this.wavelength.push(wavelength);
                    this.response.push(response);
                }
                None => log::warn!("problem with line #{} reading: {:?}", i + 1, line),
            }
        }
        log::debug!("{} spectral response samples", this.len());
        Ok(this)
    }
    fn parse_row(&self, row: &str) -> Option<(f64, f64)> {
        let fields = self.separator.split(row);
        let wavelength = fields.first()?.parse::<f64>().ok()?;
        let response = fields.get(1)?.parse::<f64>().ok()?;
        Some((wavelength, response))
    }
}
