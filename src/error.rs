use thiserror::Error;

use crate::measurements::MeasurementKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Incomplete pose: visibility score {score:.3} below required {required:.3}")]
    InsufficientVisibility { score: f32, required: f32 },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    #[error("Invalid pixel-to-unit ratio {0}: must be positive")]
    InvalidScale(f32),

    #[error("Invalid frame: {width}x{height} pixels")]
    InvalidFrame { width: u32, height: u32 },

    #[error("Measurement `{0}` missing from measurement set")]
    MissingMeasurement(MeasurementKind),

    #[error("Size guide has no sizes")]
    EmptySizeGuide,

    #[error("Unknown gender `{0}`, expected male or female")]
    UnknownGender(String),
}

pub type Result<T> = std::result::Result<T, Error>;
