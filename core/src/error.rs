use thiserror::Error;

#[derive(Debug, Error)]
pub enum SonifyError {
    #[error("Character {ch:?} at position {position} is outside the printable range 32-126")]
    SymbolOutOfDomain { ch: char, position: usize },

    #[error("Input is empty")]
    EmptyInput,

    #[error("Non-finite frequency requested at position {position}")]
    NonFiniteFrequency { position: usize },

    #[error("Invalid frequency range: {0}")]
    InvalidRange(String),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("FFT error: {0}")]
    FftError(String),
}

pub type Result<T> = std::result::Result<T, SonifyError>;
