use crate::{Error, Result};
use log::info;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compresses the directory tree at `dir` into `<dir>.zip`, placed next to it.
///
/// Entry names are rooted at the directory's own name, e.g. `000720230115/DICOM/IM0001`,
/// and always use `/` as separator. An existing archive is replaced.
pub fn zip_directory(dir: &Path) -> Result<PathBuf> {
    let base_name = dir
        .file_name()
        .ok_or_else(|| Error::ArchiveError(format!("{} has no file name", dir.display())))?;
    let parent = dir.parent().unwrap_or_else(|| Path::new(""));

    let mut zip_name = base_name.to_os_string();
    zip_name.push(".zip");
    let zip_path = parent.join(zip_name);

    info!("archiving {} into {}", dir.display(), zip_path.display());

    let mut zip = ZipWriter::new(File::create(&zip_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(parent)
            .map_err(|e| Error::ArchiveError(format!("{e}")))?;
        zip.start_file(entry_name(relative), options)?;
        let mut source = File::open(entry.path())?;
        io::copy(&mut source, &mut zip)?;
    }

    zip.finish()?;
    Ok(zip_path)
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
