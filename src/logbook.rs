//! Timestamped project logbook

use chrono::{DateTime, Local, TimeZone};
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum LogbookError {
    #[error("failed to open the logbook {0:?}")]
    Open(PathBuf, #[source] std::io::Error),
    #[error("failed to write to the logbook")]
    Io(#[from] std::io::Error),
}
type Result<T> = std::result::Result<T, LogbookError>;

/// Input that ends a logbook session
pub const QUIT: &str = "q";

/// `asctime` layout, e.g. `Thu Oct 16 14:03:12 2026`
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Formats a logbook entry
pub fn entry<Tz: TimeZone>(time: &DateTime<Tz>, text: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}: {}\n", time.format(ASCTIME), text)
}

/// Logbook appending timestamped lines to a writer
pub struct Logbook<W: Write> {
    writer: W,
}
impl Logbook<File> {
    /// Opens the logbook file in append mode, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| LogbookError::Open(path.to_path_buf(), e))?;
        log::info!("appending to {:?}", path);
        Ok(Self { writer: file })
    }
}
impl<W: Write> Logbook<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
    /// Appends `text` stamped with the local time
    pub fn append(&mut self, text: &str) -> Result<()> {
        self.append_at(&Local::now(), text)
    }
    /// Appends `text` stamped with `time`
    pub fn append_at<Tz: TimeZone>(&mut self, time: &DateTime<Tz>, text: &str) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        self.writer.write_all(entry(time, text).as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn time() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, 10, 6)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn asctime_entry() {
        assert_eq!(
            entry(&time(), "aligned the detector"),
            "Tue Oct  6 09:05:03 2026: aligned the detector\n"
        );
    }

    #[test]
    fn append_lines() {
        let mut logbook = Logbook::new(Vec::new());
        logbook.append_at(&time(), "first").unwrap();
        logbook.append("second").unwrap();
        let contents = String::from_utf8(logbook.into_inner()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Tue Oct  6 09:05:03 2026: first");
        assert!(lines[1].ends_with(": second"));
    }
}
