//! Discovery of imaging series below a root directory.
//!
//! Directories are visited parent first, children in file name order. Files are classified
//! by probing for the DICOM signature; anything else is skipped silently.

use crate::sample::{Sample, UNKNOWN};
use crate::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PREAMBLE_LENGTH: usize = 128;
const MAGIC_CODE: &[u8; 4] = b"DICM";

/// How series are discovered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    /// Every directory holding imaging files is its own unit.
    #[default]
    Flat,

    /// Directories are grouped by study key; each group is one unit.
    Grouped,
}

/// Returns whether the file at `path` carries the DICOM file signature.
///
/// Files shorter than the preamble and magic code are not imaging files. Failing to open or
/// read the file is an error.
pub fn is_dicom_file(path: &Path) -> io::Result<bool> {
    let mut header = [0u8; PREAMBLE_LENGTH + 4];
    let mut file = File::open(path)?;
    match file.read_exact(&mut header) {
        Ok(()) => Ok(&header[PREAMBLE_LENGTH..] == MAGIC_CODE),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// Regular files directly inside `dir`, in file name order.
fn files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Imaging files directly inside `dir`, in file name order.
pub fn imaging_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut imaging = Vec::new();
    for path in files_in(dir)? {
        if is_dicom_file(&path)? {
            imaging.push(path);
        }
    }
    Ok(imaging)
}

/// Directories below (and including) `root`, parent before children.
fn directories(root: &Path) -> impl Iterator<Item = Result<PathBuf>> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => Some(Ok(entry.into_path())),
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        })
}

/// A directory holding imaging files.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Series {
    pub dir: PathBuf,

    /// The first imaging file of the directory.
    pub representative: PathBuf,
}

impl Series {
    /// Name of the series directory, used as sub-directory name in grouped output.
    pub fn name(&self) -> String {
        self.dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "series".into())
    }
}

/// The attributes by which directories are grouped into one study.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct StudyKey {
    pub study_instance_uid: Option<String>,
    pub patient_name: String,
    pub patient_birth_date: String,
    pub study_date: String,
}

impl From<&Sample> for StudyKey {
    fn from(sample: &Sample) -> Self {
        Self {
            study_instance_uid: sample.study_instance_uid.clone(),
            patient_name: sample.patient_name_or_unknown().into(),
            patient_birth_date: sample.patient_birth_date_or_unknown().into(),
            study_date: sample.study_date.clone().unwrap_or_else(|| UNKNOWN.into()),
        }
    }
}

/// One or more series of the same study.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyGroup {
    pub key: StudyKey,

    /// Attributes of the first series' representative file.
    pub sample: Sample,
    pub series: Vec<Series>,
}

impl StudyGroup {
    /// One-line description of the group for an operator, e.g. to ask for a patient number.
    pub fn summary(&self) -> String {
        format!(
            "Name: {} | Birth date: {} | Sex: {} | Date: {} | Series: {}",
            self.key.patient_name,
            self.key.patient_birth_date,
            self.sample.patient_sex_or_unknown(),
            self.key.study_date,
            self.series.len()
        )
    }
}

/// Finds every directory below `root` (including `root`) holding at least one imaging file.
///
/// Returns an empty list when nothing is found.
pub fn discover_series(root: &Path) -> Result<Vec<Series>> {
    info!("looking for DICOM series in {}", root.display());

    let mut found = Vec::new();
    for dir in directories(root) {
        let dir = dir?;
        if let Some(representative) = imaging_files(&dir)?.into_iter().next() {
            found.push(Series { dir, representative });
        }
    }

    info!("found {} series", found.len());
    Ok(found)
}

/// Finds imaging directories below `root` and groups them by [`StudyKey`].
///
/// The key is read from the first imaging file of each directory. With `fast_check`, only
/// the first file of a directory is probed to classify it. Groups are returned in order of
/// first appearance; series within a group in walk order.
pub fn discover_groups(root: &Path, fast_check: bool) -> Result<Vec<StudyGroup>> {
    info!("looking for DICOM studies in {}", root.display());

    let mut groups: Vec<StudyGroup> = Vec::new();
    let mut index: HashMap<StudyKey, usize> = HashMap::new();

    for dir in directories(root) {
        let dir = dir?;
        let representative = if fast_check {
            match files_in(&dir)?.into_iter().next() {
                Some(first) if is_dicom_file(&first)? => Some(first),
                _ => None,
            }
        } else {
            imaging_files(&dir)?.into_iter().next()
        };
        let Some(representative) = representative else {
            continue;
        };

        let sample = Sample::read(&representative)?;
        let key = StudyKey::from(&sample);
        let series = Series { dir, representative };

        match index.get(&key) {
            Some(&i) => groups[i].series.push(series),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(StudyGroup {
                    key,
                    sample,
                    series: vec![series],
                });
            }
        }
    }

    info!("found {} studies", groups.len());
    Ok(groups)
}
