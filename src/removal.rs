use dicom_core::Tag;
use dicom_dictionary_std::tags;

/// Attributes that must never appear in an output file.
///
/// Covers patient identity and demographics, the referring physician, the performing
/// institution and operators, and free-text patient history/comments. Patient ID is listed
/// as well: it is removed like the others and then written back with the pseudonymous
/// identifier.
pub const REMOVAL_SET: [Tag; 16] = [
    tags::PATIENT_NAME,
    tags::PATIENT_ID,
    tags::PATIENT_BIRTH_DATE,
    tags::PATIENT_SEX,
    tags::PATIENT_AGE,
    tags::PATIENT_WEIGHT,
    tags::PATIENT_POSITION,
    tags::PATIENT_BIRTH_TIME,
    tags::REFERRING_PHYSICIAN_NAME,
    tags::ACCESSION_NUMBER,
    tags::INSTITUTION_NAME,
    tags::INSTITUTION_ADDRESS,
    tags::INSTITUTIONAL_DEPARTMENT_NAME,
    tags::OPERATORS_NAME,
    tags::ADDITIONAL_PATIENT_HISTORY,
    tags::PATIENT_COMMENTS,
];
