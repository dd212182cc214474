use dicom_core::value::{DataSetSequence, Value};
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::tags;
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::mem::InMemElement;
use dicom_object::{FileDicomObject, FileMetaTable, InMemDicomObject};
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const MR_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.4";

pub(crate) fn make_file_meta() -> FileMetaTable {
    make_file_meta_for("2.3.4")
}

pub(crate) fn make_file_meta_for(sop_instance_uid: &str) -> FileMetaTable {
    FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(MR_IMAGE_STORAGE)
        .media_storage_sop_instance_uid(sop_instance_uid)
        .transfer_syntax("1.2.840.10008.1.2.1") // Explicit VR Little Endian
        .build()
        .unwrap()
}

pub(crate) fn str_element(tag: Tag, vr: VR, value: &str) -> InMemElement {
    DataElement::new(tag, vr, PrimitiveValue::from(value))
}

pub(crate) fn sequence_element(tag: Tag, items: Vec<InMemDicomObject>) -> InMemElement {
    DataElement::new(tag, VR::SQ, Value::from(DataSetSequence::from(items)))
}

/// A record carrying every attribute of the removal set plus a few that must survive.
pub(crate) fn identifying_record() -> InMemDicomObject {
    InMemDicomObject::from_element_iter([
        str_element(tags::PATIENT_NAME, VR::PN, "Doe^John"),
        str_element(tags::PATIENT_ID, VR::LO, "MRN-12345"),
        str_element(tags::PATIENT_BIRTH_DATE, VR::DA, "19700101"),
        str_element(tags::PATIENT_SEX, VR::CS, "M"),
        str_element(tags::PATIENT_AGE, VR::AS, "053Y"),
        str_element(tags::PATIENT_WEIGHT, VR::DS, "80"),
        str_element(tags::PATIENT_POSITION, VR::CS, "HFS"),
        str_element(tags::PATIENT_BIRTH_TIME, VR::TM, "101010"),
        str_element(tags::REFERRING_PHYSICIAN_NAME, VR::PN, "House^Gregory"),
        str_element(tags::ACCESSION_NUMBER, VR::SH, "ACC0001"),
        str_element(tags::INSTITUTION_NAME, VR::LO, "General Hospital"),
        str_element(tags::INSTITUTION_ADDRESS, VR::ST, "1 Main Street"),
        str_element(tags::INSTITUTIONAL_DEPARTMENT_NAME, VR::LO, "Radiology"),
        str_element(tags::OPERATORS_NAME, VR::PN, "Tech^Anna"),
        str_element(tags::ADDITIONAL_PATIENT_HISTORY, VR::LT, "claustrophobic"),
        str_element(tags::PATIENT_COMMENTS, VR::LT, "call before visit"),
        str_element(tags::MODALITY, VR::CS, "MR"),
        str_element(tags::STUDY_DESCRIPTION, VR::LO, "BRAIN"),
    ])
}

/// Attributes of a synthetic MR file written by [`write_mr_file`].
#[derive(Debug, Clone)]
pub(crate) struct MrFile<'a> {
    pub study_instance_uid: &'a str,
    pub patient_name: &'a str,
    pub patient_birth_date: &'a str,
    pub study_date: Option<&'a str>,
    pub sop_instance_uid: &'a str,
}

impl Default for MrFile<'_> {
    fn default() -> Self {
        Self {
            study_instance_uid: "1.2.3.4.5",
            patient_name: "Doe^John",
            patient_birth_date: "19700101",
            study_date: Some("20230115"),
            sop_instance_uid: "1.2.3.4.5.1",
        }
    }
}

pub(crate) fn write_mr_file(dir: &Path, file_name: &str, mr_file: &MrFile) -> PathBuf {
    fs::create_dir_all(dir).unwrap();

    let mut obj = FileDicomObject::new_empty_with_meta(make_file_meta_for(mr_file.sop_instance_uid));
    for elem in identifying_record() {
        obj.put(elem);
    }
    obj.put(str_element(tags::SOP_CLASS_UID, VR::UI, MR_IMAGE_STORAGE));
    obj.put(str_element(tags::SOP_INSTANCE_UID, VR::UI, mr_file.sop_instance_uid));
    obj.put(str_element(
        tags::STUDY_INSTANCE_UID,
        VR::UI,
        mr_file.study_instance_uid,
    ));
    obj.put(str_element(tags::PATIENT_NAME, VR::PN, mr_file.patient_name));
    obj.put(str_element(
        tags::PATIENT_BIRTH_DATE,
        VR::DA,
        mr_file.patient_birth_date,
    ));
    if let Some(study_date) = mr_file.study_date {
        obj.put(str_element(tags::STUDY_DATE, VR::DA, study_date));
    }
    obj.put(str_element(tags::MAGNETIC_FIELD_STRENGTH, VR::DS, "1.5"));
    obj.put(str_element(tags::MANUFACTURER, VR::LO, "SIEMENS"));
    obj.put(str_element(tags::MANUFACTURER_MODEL_NAME, VR::LO, "Avanto"));
    obj.put(sequence_element(
        tags::REFERENCED_STUDY_SEQUENCE,
        vec![InMemDicomObject::from_element_iter([
            str_element(tags::PATIENT_NAME, VR::PN, mr_file.patient_name),
            str_element(tags::REFERENCED_SOP_CLASS_UID, VR::UI, MR_IMAGE_STORAGE),
        ])],
    ));

    let path = dir.join(file_name);
    obj.write_to_file(&path).unwrap();
    path
}

/// Write `count` files of the same study into `dir`, named `IM0001`, `IM0002`, ...
pub(crate) fn write_mr_series(dir: &Path, count: usize, mr_file: &MrFile) -> Vec<PathBuf> {
    (1..=count)
        .map(|i| {
            let sop_instance_uid = format!("{}.{}", mr_file.sop_instance_uid, i);
            let series_file = MrFile {
                sop_instance_uid: &sop_instance_uid,
                ..mr_file.clone()
            };
            write_mr_file(dir, &format!("IM{i:04}"), &series_file)
        })
        .collect()
}

pub(crate) fn write_non_dicom_file(dir: &Path, file_name: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(file_name);
    fs::write(&path, b"not an imaging file").unwrap();
    path
}
