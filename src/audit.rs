//! Audit log mapping pseudonymous identifiers to acquisition parameters.
//!
//! One [`LogRecord`] is kept per processed patient/study. The log holds no identifying
//! attributes, only what is needed to trace an output back to its acquisition.

use crate::identifier::PatientIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const HEADER: [&str; 6] = [
    "Patient Number",
    "MRI Number",
    "Date (DD.MM.YYYY)",
    "Magnetic Field Strength",
    "Manufacturer",
    "Manufacturer's Model Name",
];

const TAB_NAME: &str = "tab";

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("log delimiter must not be empty")]
pub struct DelimiterError;

/// Column separator of the rendered log.
///
/// Parsed from user input: `tab` (any case) means a tab character, anything else is taken
/// literally, so `;` and `,` work as expected.
///
/// # Example
///
/// ```
/// use anonymri::audit::Delimiter;
///
/// let delimiter: Delimiter = "TAB".parse().unwrap();
/// assert_eq!(delimiter.as_str(), "\t");
///
/// let delimiter: Delimiter = ";".parse().unwrap();
/// assert_eq!(delimiter.as_str(), ";");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(try_from = "String", into = "String")]
pub struct Delimiter(String);

impl Delimiter {
    pub fn new(delimiter: &str) -> Result<Self, DelimiterError> {
        if delimiter.is_empty() {
            return Err(DelimiterError);
        }
        if delimiter.eq_ignore_ascii_case(TAB_NAME) {
            return Ok(Self::tab());
        }
        Ok(Self(delimiter.into()))
    }

    pub fn tab() -> Self {
        Self("\t".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self::tab()
    }
}

impl FromStr for Delimiter {
    type Err = DelimiterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Delimiter::new(s)
    }
}

impl TryFrom<String> for Delimiter {
    type Error = DelimiterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Delimiter::new(&value)
    }
}

impl From<Delimiter> for String {
    fn from(delimiter: Delimiter) -> Self {
        if delimiter.0 == "\t" {
            TAB_NAME.into()
        } else {
            delimiter.0
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One audit line: a processed patient/study.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LogRecord {
    pub patient_number: u32,
    pub identifier: PatientIdentifier,
    /// Study date as `DD.MM.YYYY`.
    pub date: String,
    pub magnetic_field_strength: String,
    pub manufacturer: String,
    pub manufacturer_model_name: String,
}

impl LogRecord {
    fn columns(&self) -> [String; 6] {
        [
            self.patient_number.to_string(),
            self.identifier.to_string(),
            self.date.clone(),
            self.magnetic_field_strength.clone(),
            self.manufacturer.clone(),
            self.manufacturer_model_name.clone(),
        ]
    }
}

/// The log of one run. Records are only ever appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLog {
    records: Vec<LogRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header() -> [&'static str; 6] {
        HEADER
    }

    pub fn append(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the data lines, without the header.
    pub fn lines(&self, delimiter: &Delimiter) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.columns().join(delimiter.as_str()))
            .collect()
    }

    /// Renders the header and one line per record, each line terminated by a newline.
    pub fn render(&self, delimiter: &Delimiter) -> String {
        let mut text = HEADER.join(delimiter.as_str());
        text.push('\n');
        for line in self.lines(delimiter) {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    /// Writes the rendered log to `path` as UTF-8, replacing any existing file.
    pub fn write_to_file(&self, path: &Path, delimiter: &Delimiter) -> io::Result<()> {
        fs::write(path, self.render(delimiter))
    }
}
