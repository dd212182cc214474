use crate::archive::zip_directory;
use crate::audit::{AuditLog, LogRecord};
use crate::discovery::{imaging_files, Series, StudyGroup, StudyKey};
use crate::filter::remove_identifying_attributes;
use crate::identifier::{assign, format_study_date, PatientIdentifier};
use crate::removal::REMOVAL_SET;
use crate::resolver::{PatientNumberResolver, UnitInfo};
use crate::sample::Sample;
use crate::{Error, Result};
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::{open_file, DefaultDicomObject, InMemDicomObject};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the directory below the identifier directory holding the DICOM files.
pub const DICOM_DIR_NAME: &str = "DICOM";

/// A unit of work: everything that ends up under one patient identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    /// One directory, written directly into `<id>/DICOM/`.
    Series(Series),

    /// Several directories of one study, each written into `<id>/DICOM/<series name>/`.
    Group(StudyGroup),
}

impl From<Series> for Unit {
    fn from(series: Series) -> Self {
        Unit::Series(series)
    }
}

impl From<StudyGroup> for Unit {
    fn from(group: StudyGroup) -> Self {
        Unit::Group(group)
    }
}

impl Unit {
    fn description(&self) -> String {
        match self {
            Unit::Series(series) => series.dir.display().to_string(),
            Unit::Group(group) => group.summary(),
        }
    }

    fn key(&self) -> Option<&StudyKey> {
        match self {
            Unit::Series(_) => None,
            Unit::Group(group) => Some(&group.key),
        }
    }

    fn sample(&self) -> Result<Sample> {
        match self {
            Unit::Series(series) => Sample::read(&series.representative),
            Unit::Group(group) => Ok(group.sample.clone()),
        }
    }

    /// Source directories paired with their output sub-directory, if any.
    fn targets(&self) -> Vec<(&Path, Option<String>)> {
        match self {
            Unit::Series(series) => vec![(series.dir.as_path(), None)],
            Unit::Group(group) => group
                .series
                .iter()
                .map(|series| (series.dir.as_path(), Some(series.name())))
                .collect(),
        }
    }
}

/// Where a processed unit was written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedUnit {
    pub patient_number: u32,
    pub identifier: PatientIdentifier,

    /// `<output root>/<identifier>`
    pub directory: PathBuf,
    pub archive: Option<PathBuf>,
    pub files_written: usize,
}

/// Strips identifying attributes from `obj` and stamps it with `identifier` as Patient ID.
///
/// The Patient ID is written even when the source had none.
pub fn anonymize_object(obj: &mut InMemDicomObject, identifier: &PatientIdentifier) {
    remove_identifying_attributes(obj, &REMOVAL_SET);
    obj.put(DataElement::new(
        tags::PATIENT_ID,
        VR::LO,
        PrimitiveValue::from(identifier.as_str()),
    ));
}

/// Re-wraps the dataset of `obj` with a freshly built file meta group.
///
/// Only the media storage SOP class/instance UIDs and the transfer syntax of the source are
/// kept; implementation and source application details are those of this library.
fn with_fresh_meta(obj: DefaultDicomObject) -> Result<DefaultDicomObject> {
    let meta = obj.meta();
    let builder = FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(meta.media_storage_sop_class_uid())
        .media_storage_sop_instance_uid(meta.media_storage_sop_instance_uid())
        .transfer_syntax(meta.transfer_syntax());

    obj.into_inner()
        .with_meta(builder)
        .map_err(|e| Error::WriteError(format!("{e}")))
}

/// Reads the DICOM file at `input`, anonymizes it and writes it to `output`.
///
/// The output is encoded completely in memory before anything is written, so a file that
/// cannot be read or encoded leaves no output behind.
pub fn anonymize_file(input: &Path, output: &Path, identifier: &PatientIdentifier) -> Result<()> {
    let mut obj =
        open_file(input).map_err(|e| Error::ReadError(format!("{}: {e}", input.display())))?;
    anonymize_object(&mut obj, identifier);

    let obj = with_fresh_meta(obj)?;
    let mut buffer = Vec::new();
    obj.write_all(&mut buffer)
        .map_err(|e| Error::WriteError(format!("{}: {e}", output.display())))?;

    fs::write(output, buffer)?;
    debug!("wrote {}", output.display());
    Ok(())
}

/// Anonymizes every imaging file in `dir` into `out_dir`, keeping file names.
///
/// This is the nested step of a unit: it neither archives nor logs.
fn write_series(dir: &Path, out_dir: &Path, identifier: &PatientIdentifier) -> Result<usize> {
    let files = imaging_files(dir)?;
    info!("processing {} ({} files)", dir.display(), files.len());

    fs::create_dir_all(out_dir)?;
    for file in &files {
        let Some(file_name) = file.file_name() else {
            continue;
        };
        anonymize_file(file, &out_dir.join(file_name), identifier)?;
    }
    Ok(files.len())
}

/// Anonymizes discovered units into an output directory.
///
/// Every call to [`Anonymizer::process`] handles one unit completely: it resolves the patient
/// number, writes all files of the unit under its identifier, archives the identifier
/// directory if enabled and appends exactly one record to the audit log.
///
/// Two units resolving to the same identifier write into the same directory; the later one
/// overwrites files with equal names.
pub struct Anonymizer<R> {
    resolver: R,
    archive: bool,
}

impl<R: PatientNumberResolver> Anonymizer<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            archive: false,
        }
    }

    /// Zip each identifier directory into `<output root>/<identifier>.zip` after writing it.
    pub fn archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    pub fn process(
        &mut self,
        unit: &Unit,
        output_root: &Path,
        log: &mut AuditLog,
    ) -> Result<ProcessedUnit> {
        let description = unit.description();
        let sample = unit.sample()?;

        let patient_number = self.resolver.resolve(&UnitInfo {
            description: &description,
            sample: &sample,
            key: unit.key(),
        })?;

        let study_date = sample.study_date_or_default();
        let identifier = assign(patient_number, study_date);
        let date = format_study_date(study_date)?;
        info!("patient {patient_number} of {description} becomes {identifier}");

        let directory = output_root.join(identifier.as_str());
        let dicom_dir = directory.join(DICOM_DIR_NAME);

        let mut files_written = 0;
        let mut series_names = HashSet::new();
        for (dir, series_name) in unit.targets() {
            let out_dir = match series_name {
                Some(name) => {
                    if !series_names.insert(name.clone()) {
                        warn!(
                            "series directory name {name} occurs more than once in {identifier}, files may be overwritten"
                        );
                    }
                    dicom_dir.join(name)
                }
                None => dicom_dir.clone(),
            };
            files_written += write_series(dir, &out_dir, &identifier)?;
        }

        let archive = if self.archive {
            Some(zip_directory(&directory)?)
        } else {
            None
        };

        log.append(LogRecord {
            patient_number,
            identifier: identifier.clone(),
            date,
            magnetic_field_strength: sample.magnetic_field_strength_or_na().into(),
            manufacturer: sample.manufacturer_or_na().into(),
            manufacturer_model_name: sample.manufacturer_model_name_or_na().into(),
        });

        Ok(ProcessedUnit {
            patient_number,
            identifier,
            directory,
            archive,
            files_written,
        })
    }
}
