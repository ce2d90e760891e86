use crate::{
    brightness::BrightnessTemperatureError, deficit::DeficitError, logbook::LogbookError,
    report::ReportError, spectral::SpectralError, stats::StatsError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `brightness` module")]
    BrightnessTemperature(#[from] BrightnessTemperatureError),
    #[error("Error in the `stats` module")]
    Stats(#[from] StatsError),
    #[error("Error in the `spectral` module")]
    Spectral(#[from] SpectralError),
    #[error("Error in the `deficit` module")]
    Deficit(#[from] DeficitError),
    #[error("Error in the `logbook` module")]
    Logbook(#[from] LogbookError),
    #[error("Error in the `report` module")]
    Report(#[from] ReportError),
}
