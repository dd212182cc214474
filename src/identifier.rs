use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

const STUDY_DATE_FORMAT: &str = "%Y%m%d";
const LOG_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[error("unable to parse date from {0:?}")]
pub struct DateParseError(String);

/// A pseudonymous patient identifier.
///
/// It is the zero-padded (at least 4 digits) patient number followed by the raw study date,
/// e.g. `000720230115`. It names the output directory and the archive of a patient/study.
///
/// Two studies with the same patient number and study date get the same identifier and end
/// up in the same output directory. The patient number is expected to disambiguate them.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PatientIdentifier(String);

impl PatientIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PatientIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the pseudonymous identifier from a patient number and a study date.
///
/// The study date is used as-is; it is neither parsed nor validated here.
///
/// # Example
///
/// ```
/// use anonymri::identifier::assign;
///
/// assert_eq!(assign(7, "20230115").as_str(), "000720230115");
/// assert_eq!(assign(12345, "20230115").as_str(), "1234520230115");
/// ```
pub fn assign(patient_number: u32, study_date: &str) -> PatientIdentifier {
    PatientIdentifier(format!("{patient_number:04}{study_date}"))
}

/// Formats a `YYYYMMDD` study date as `DD.MM.YYYY` for the audit log.
///
/// Anything but exactly eight digits forming a calendar date is rejected.
pub fn format_study_date(study_date: &str) -> Result<String, DateParseError> {
    let trimmed = study_date.trim();
    if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateParseError(study_date.into()));
    }
    NaiveDate::parse_from_str(trimmed, STUDY_DATE_FORMAT)
        .map(|date| date.format(LOG_DATE_FORMAT).to_string())
        .map_err(|_| DateParseError(study_date.into()))
}
