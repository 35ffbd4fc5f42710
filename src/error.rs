/*! Error types for the clustering and estimation steps of a scan. */

use thiserror::Error;

/// Result type alias for operations in this crate.
pub type ScanResult<T> = Result<T, ScanError>;

/**
 * Everything that can cause a scan to be rejected.
 *
 * Degenerate cluster hulls and missing table entries are not in this list because they are
 * recovered where they happen (a fallback geometry or the configured default value) and only
 * logged.
 */
#[derive(Error, Debug)]
pub enum ScanError {
    /// The field boundary has too few vertices, out of range vertices, no area, or crosses itself.
    #[error("invalid field boundary: {reason}")]
    InvalidBoundary { reason: &'static str },

    /// Too many of the leaf images could not be classified with confidence.
    #[error("insufficient confidence: {uncertain} of {total} readings are uncertain")]
    InsufficientConfidence { uncertain: usize, total: usize },

    /// Field areas must be positive.
    #[error("invalid field area: {0}")]
    InvalidFieldArea(f64),

    /// A latitude or longitude outside of the valid range.
    #[error("invalid coordinate: latitude={latitude} longitude={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Every sample location needs exactly one leaf reading.
    #[error("{readings} readings supplied for {points} points")]
    CountMismatch { readings: usize, points: usize },

    /// More images than a single scan accepts.
    #[error("{count} images supplied, at most {max} are allowed")]
    TooManyImages { count: usize, max: usize },

    /// The agronomy tables document is inconsistent.
    #[error("invalid agronomy tables: {0}")]
    InvalidTables(String),

    /// A clustering, fertilizer or scan setting is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    /// Short message suitable for showing to the farmer who submitted the scan.
    pub fn user_message(&self) -> &'static str {
        use ScanError::*;

        match self {
            InvalidBoundary { .. } => "Polygon lahan tidak valid",
            InsufficientConfidence { .. } => "Gambar harus berupa daun padi",
            InvalidFieldArea(_) => "area harus berupa angka positif",
            InvalidCoordinate { .. } => "Nilai latitude atau longitude tidak valid",
            CountMismatch { .. } => "Jumlah gambar harus sama dengan jumlah koordinat",
            TooManyImages { .. } => "Maksimal 10 gambar dapat diunggah",
            InvalidTables(_) | InvalidConfig(_) | Io(_) | Json(_) => "Terjadi kesalahan pada server",
        }
    }

    /// Is this a problem with what the user submitted, as opposed to a server side problem?
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            ScanError::InvalidTables(_)
                | ScanError::InvalidConfig(_)
                | ScanError::Io(_)
                | ScanError::Json(_)
        )
    }
}
