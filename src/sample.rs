//! Typed access to the attributes read from a series' representative file.
//!
//! Every field is an `Option`; the placeholders used when a field is missing are named per
//! field below instead of being scattered through the callers.

use crate::{Error, Result};
use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::{InMemDicomObject, OpenFileOptions};
use std::path::Path;

/// Study date used for the identifier when the representative file has none.
pub const STUDY_DATE_DEFAULT: &str = "19000101";

/// Placeholder for missing acquisition parameters in the audit log.
pub const NOT_AVAILABLE: &str = "NA";

/// Placeholder for missing patient/study attributes in summaries and study keys.
pub const UNKNOWN: &str = "UNKNOWN";

/// Attributes of one representative imaging file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    pub study_instance_uid: Option<String>,
    pub patient_name: Option<String>,
    pub patient_birth_date: Option<String>,
    pub patient_sex: Option<String>,
    pub patient_age: Option<String>,
    pub study_date: Option<String>,
    pub magnetic_field_strength: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_model_name: Option<String>,
}

impl Sample {
    /// Reads the attributes of the file at `path`, stopping before the pixel data.
    pub fn read(path: &Path) -> Result<Self> {
        let obj = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
            .map_err(|e| Error::ReadError(format!("{}: {e}", path.display())))?;
        Ok(Self::from_object(&obj))
    }

    pub fn from_object(obj: &InMemDicomObject) -> Self {
        Self {
            study_instance_uid: string_value(obj, tags::STUDY_INSTANCE_UID),
            patient_name: string_value(obj, tags::PATIENT_NAME),
            patient_birth_date: string_value(obj, tags::PATIENT_BIRTH_DATE),
            patient_sex: string_value(obj, tags::PATIENT_SEX),
            patient_age: string_value(obj, tags::PATIENT_AGE),
            study_date: string_value(obj, tags::STUDY_DATE),
            magnetic_field_strength: string_value(obj, tags::MAGNETIC_FIELD_STRENGTH),
            manufacturer: string_value(obj, tags::MANUFACTURER),
            manufacturer_model_name: string_value(obj, tags::MANUFACTURER_MODEL_NAME),
        }
    }

    pub fn study_date_or_default(&self) -> &str {
        self.study_date.as_deref().unwrap_or(STUDY_DATE_DEFAULT)
    }

    pub fn patient_name_or_unknown(&self) -> &str {
        self.patient_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn patient_birth_date_or_unknown(&self) -> &str {
        self.patient_birth_date.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn patient_sex_or_unknown(&self) -> &str {
        self.patient_sex.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn patient_age_or_unknown(&self) -> &str {
        self.patient_age.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn magnetic_field_strength_or_na(&self) -> &str {
        self.magnetic_field_strength
            .as_deref()
            .unwrap_or(NOT_AVAILABLE)
    }

    pub fn manufacturer_or_na(&self) -> &str {
        self.manufacturer.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn manufacturer_model_name_or_na(&self) -> &str {
        self.manufacturer_model_name
            .as_deref()
            .unwrap_or(NOT_AVAILABLE)
    }
}

// Absent, empty and non-textual values all count as missing.
fn string_value(obj: &InMemDicomObject, tag: Tag) -> Option<String> {
    let elem = obj.element_opt(tag).ok().flatten()?;
    let value = elem.to_str().ok()?;
    let value = value
        .trim_end_matches(|c: char| c == '\0' || c == ' ')
        .trim_start();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::{str_element, write_mr_file, MrFile};
    use dicom_core::VR;

    #[test]
    fn test_from_object() {
        let obj = InMemDicomObject::from_element_iter([
            str_element(tags::PATIENT_NAME, VR::PN, "Doe^John"),
            str_element(tags::STUDY_DATE, VR::DA, "20230115"),
            str_element(tags::MAGNETIC_FIELD_STRENGTH, VR::DS, "3"),
        ]);
        let sample = Sample::from_object(&obj);

        assert_eq!(sample.patient_name.as_deref(), Some("Doe^John"));
        assert_eq!(sample.study_date_or_default(), "20230115");
        assert_eq!(sample.magnetic_field_strength_or_na(), "3");
        assert_eq!(sample.manufacturer, None);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let sample = Sample::from_object(&InMemDicomObject::new_empty());

        assert_eq!(sample.study_date_or_default(), "19000101");
        assert_eq!(sample.patient_name_or_unknown(), "UNKNOWN");
        assert_eq!(sample.patient_birth_date_or_unknown(), "UNKNOWN");
        assert_eq!(sample.patient_sex_or_unknown(), "UNKNOWN");
        assert_eq!(sample.patient_age_or_unknown(), "UNKNOWN");
        assert_eq!(sample.magnetic_field_strength_or_na(), "NA");
        assert_eq!(sample.manufacturer_or_na(), "NA");
        assert_eq!(sample.manufacturer_model_name_or_na(), "NA");
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let obj = InMemDicomObject::from_element_iter([str_element(
            tags::MANUFACTURER,
            VR::LO,
            "  ",
        )]);
        assert_eq!(Sample::from_object(&obj).manufacturer_or_na(), "NA");
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_mr_file(dir.path(), "IM0001", &MrFile::default());

        let sample = Sample::read(&path).unwrap();
        assert_eq!(sample.study_instance_uid.as_deref(), Some("1.2.3.4.5"));
        assert_eq!(sample.study_date.as_deref(), Some("20230115"));
        assert_eq!(sample.manufacturer_or_na(), "SIEMENS");
        assert_eq!(sample.manufacturer_model_name_or_na(), "Avanto");
        assert_eq!(sample.magnetic_field_strength_or_na(), "1.5");
    }

    #[test]
    fn test_read_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken");
        std::fs::write(&path, b"garbage").unwrap();

        let result = Sample::read(&path);
        assert!(matches!(result, Err(Error::ReadError(_))));
    }
}
