//! Error types for configuration loading and audio input.
//!
//! The simulation core itself never fails: numeric instability is recovered
//! in place and out-of-range parameters are clamped. Only the edges that touch
//! the filesystem return errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading a TOML simulation config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure while loading PCM audio for the headless driver
#[derive(Debug, Error)]
pub enum AudioSourceError {
    #[error("failed to decode WAV {path}: {source}")]
    Wav {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("WAV {path} contains no samples")]
    Empty { path: PathBuf },

    #[error("unsupported WAV format: {bits} bits per sample")]
    UnsupportedFormat { bits: u16 },
}

/// Failure while writing a PNG frame
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to create frame directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write frame {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
