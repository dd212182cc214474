//! De-identification and re-keying of MRI DICOM series.
//!
//! A run discovers imaging series below a root directory, strips a fixed set of identifying
//! attributes from every file, stamps each patient/study with a pseudonymous identifier built
//! from a manually supplied patient number and the study date, optionally zips the result and
//! returns an audit log that maps identifiers to acquisition parameters.
//!
//! # Example
//!
//! ```no_run
//! use anonymri::config::ConfigBuilder;
//! use anonymri::pipeline::Pipeline;
//! use anonymri::resolver::Fixed;
//!
//! let config = ConfigBuilder::new()
//!     .input("/data/incoming")
//!     .output("/data/anonymized")
//!     .archive(false)
//!     .build();
//!
//! let report = Pipeline::new(config, Fixed(7)).run()?;
//! println!("{}", report.log.render(&"tab".parse()?));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod audit;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod filter;
pub mod identifier;
pub mod pipeline;
pub mod removal;
pub mod resolver;
pub mod sample;

#[cfg(test)]
pub(crate) mod test_utils;

pub use dicom_dictionary_std::tags;
pub use engine::Anonymizer;

use config::ConfigError;
use identifier::DateParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no patient number available for {0}")]
    MissingPatientNumber(String),

    #[error(transparent)]
    DateParse(#[from] DateParseError),

    #[error("Read error: {0}")]
    ReadError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error(transparent)]
    ConfigError(#[from] ConfigError),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Filesystem(err.into())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(err) => Error::Filesystem(err),
            err => Error::ArchiveError(format!("{err}")),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
