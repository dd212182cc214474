use crate::audit::Delimiter;
use crate::discovery::DiscoveryMode;
use garde::Validate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LOG_FILE_NAME_DEFAULT: &str = "anonymization_log.txt";

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unable to load config from {path}: {reason}")]
    LoadError { path: String, reason: String },
}

fn default_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_log_file_name() -> String {
    LOG_FILE_NAME_DEFAULT.into()
}

#[allow(clippy::ptr_arg)]
fn is_plain_file_name(value: &String, _context: &()) -> garde::Result {
    let path = Path::new(value);
    if path.file_name().map(|name| name == path.as_os_str()) != Some(true) {
        return Err(garde::Error::new(
            "must be a plain file name, without directories",
        ));
    }
    Ok(())
}

/// Settings of one de-identification run.
///
/// # Fields
///
/// * `input` - Root directory to look for DICOM series in
/// * `output` - Directory receiving one sub-directory (and archive) per patient identifier, and the log file
/// * `delimiter` - Column separator of the audit log
/// * `archive` - Whether to zip every patient identifier directory
/// * `mode` - Whether series are processed one by one or grouped by study
/// * `fast_check` - In grouped mode, only probe the first file of a directory to classify it
/// * `log_file_name` - Name of the audit log file inside `output`
#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_path")]
    #[garde(skip)]
    input: PathBuf,

    #[serde(default = "default_path")]
    #[garde(skip)]
    output: PathBuf,

    #[serde(default)]
    #[garde(skip)]
    delimiter: Delimiter,

    #[serde(default = "default_true")]
    #[garde(skip)]
    archive: bool,

    #[serde(default)]
    #[garde(skip)]
    mode: DiscoveryMode,

    #[serde(default = "default_true")]
    #[garde(skip)]
    fast_check: bool,

    #[serde(default = "default_log_file_name")]
    #[garde(length(min = 1), custom(is_plain_file_name))]
    log_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_path(),
            output: default_path(),
            delimiter: Delimiter::default(),
            archive: true,
            mode: DiscoveryMode::default(),
            fast_check: true,
            log_file_name: default_log_file_name(),
        }
    }
}

impl Config {
    /// Loads a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let load_error = |reason: String| ConfigError::LoadError {
            path: path.display().to_string(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| load_error(format!("{e}")))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| load_error(format!("{e}")))?;
        config.check()?;
        Ok(config)
    }

    /// Validates the field constraints.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()
            .map_err(|e| ConfigError::InvalidConfig(format!("{e}")))
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    pub fn archive(&self) -> bool {
        self.archive
    }

    pub fn mode(&self) -> DiscoveryMode {
        self.mode
    }

    pub fn fast_check(&self) -> bool {
        self.fast_check
    }

    pub fn log_file_name(&self) -> &str {
        &self.log_file_name
    }

    /// `<output>/<log file name>`
    pub fn log_path(&self) -> PathBuf {
        self.output.join(&self.log_file_name)
    }
}

/// A builder for [`Config`], starting from the defaults.
///
/// # Example
///
/// ```
/// use anonymri::config::ConfigBuilder;
/// use anonymri::discovery::DiscoveryMode;
///
/// let config = ConfigBuilder::new()
///     .input("/data/incoming")
///     .output("/data/anonymized")
///     .delimiter(";".parse().unwrap())
///     .mode(DiscoveryMode::Grouped)
///     .archive(false)
///     .build();
///
/// assert_eq!(config.delimiter().as_str(), ";");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigBuilder(Config);

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder(Config::default())
    }

    pub fn from_config(config: Config) -> Self {
        ConfigBuilder(config)
    }

    pub fn input(mut self, input: impl Into<PathBuf>) -> Self {
        self.0.input = input.into();
        self
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.0.output = output.into();
        self
    }

    pub fn delimiter(mut self, delimiter: Delimiter) -> Self {
        self.0.delimiter = delimiter;
        self
    }

    pub fn archive(mut self, archive: bool) -> Self {
        self.0.archive = archive;
        self
    }

    pub fn mode(mut self, mode: DiscoveryMode) -> Self {
        self.0.mode = mode;
        self
    }

    pub fn fast_check(mut self, fast_check: bool) -> Self {
        self.0.fast_check = fast_check;
        self
    }

    pub fn log_file_name(mut self, log_file_name: impl Into<String>) -> Self {
        self.0.log_file_name = log_file_name.into();
        self
    }

    pub fn build(self) -> Config {
        self.0
    }
}
