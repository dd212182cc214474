use crate::audit::{AuditLog, Delimiter};
use crate::config::Config;
use crate::discovery::{discover_groups, discover_series, DiscoveryMode};
use crate::engine::{Anonymizer, ProcessedUnit, Unit};
use crate::resolver::PatientNumberResolver;
use crate::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a run, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub log: AuditLog,
    pub outputs: Vec<ProcessedUnit>,
}

impl RunReport {
    pub fn write_log(&self, path: &Path, delimiter: &Delimiter) -> Result<()> {
        self.log.write_to_file(path, delimiter)?;
        info!("log saved to {}", path.display());
        Ok(())
    }
}

/// Discovers units per the configuration and anonymizes them one after the other.
///
/// The first error aborts the run; units processed before it stay on disk.
pub struct Pipeline<R> {
    config: Config,
    anonymizer: Anonymizer<R>,
}

impl<R: PatientNumberResolver> Pipeline<R> {
    pub fn new(config: Config, resolver: R) -> Self {
        let anonymizer = Anonymizer::new(resolver).archive(config.archive());
        Self { config, anonymizer }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn discover(&self) -> Result<Vec<Unit>> {
        let input = self.config.input();
        let units = match self.config.mode() {
            DiscoveryMode::Flat => discover_series(input)?
                .into_iter()
                .map(Unit::from)
                .collect(),
            DiscoveryMode::Grouped => discover_groups(input, self.config.fast_check())?
                .into_iter()
                .map(Unit::from)
                .collect(),
        };
        Ok(units)
    }

    pub fn run(&mut self) -> Result<RunReport> {
        self.config.check()?;
        info!("starting anonymization of {}", self.config.input().display());

        let units = self.discover()?;
        let output_root: PathBuf = self.config.output().to_path_buf();
        fs::create_dir_all(&output_root)?;

        let mut report = RunReport::default();
        for unit in &units {
            let processed = self.anonymizer.process(unit, &output_root, &mut report.log)?;
            report.outputs.push(processed);
        }

        info!("anonymization finished, {} units processed", report.outputs.len());
        Ok(report)
    }

    /// Runs and writes the log to the configured log file.
    pub fn run_and_save_log(&mut self) -> Result<RunReport> {
        let report = self.run()?;
        report.write_log(&self.config.log_path(), self.config.delimiter())?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::ConfigBuilder;
    use crate::resolver::{Fixed, NonInteractive, Prompt};
    use crate::test_utils::{write_mr_series, write_non_dicom_file, MrFile};
    use crate::Error;
    use std::fs::File;
    use zip::ZipArchive;

    #[test]
    fn test_scenario_single_series() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_mr_series(&root.path().join("exam"), 3, &MrFile::default());

        let config = ConfigBuilder::new()
            .input(root.path())
            .output(out.path())
            .build();
        let report = Pipeline::new(config, Fixed(7)).run_and_save_log().unwrap();

        assert_eq!(report.outputs.len(), 1);
        let dicom_dir = out.path().join("000720230115").join("DICOM");
        assert_eq!(fs::read_dir(&dicom_dir).unwrap().count(), 3);

        let log = fs::read_to_string(out.path().join("anonymization_log.txt")).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Patient Number\tMRI Number"));
        assert_eq!(lines[1], "7\t000720230115\t15.01.2023\t1.5\tSIEMENS\tAvanto");
        assert!(log.ends_with('\n'));

        let archive =
            ZipArchive::new(File::open(out.path().join("000720230115.zip")).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);
        assert!(archive
            .file_names()
            .all(|name| name.starts_with("000720230115/DICOM/")));
    }

    #[test]
    fn test_scenario_nothing_found() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_non_dicom_file(root.path(), "readme.txt");

        let config = ConfigBuilder::new()
            .input(root.path())
            .output(out.path())
            .build();
        let report = Pipeline::new(config, NonInteractive).run().unwrap();

        assert!(report.outputs.is_empty());
        assert!(report.log.is_empty());
    }

    #[test]
    fn test_scenario_grouped_study() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_mr_series(&root.path().join("study").join("t1"), 2, &MrFile::default());
        write_mr_series(&root.path().join("study").join("t2"), 2, &MrFile::default());

        let config = ConfigBuilder::new()
            .input(root.path())
            .output(out.path())
            .mode(DiscoveryMode::Grouped)
            .archive(false)
            .build();
        let report = Pipeline::new(config, Fixed(3)).run().unwrap();

        assert_eq!(report.log.len(), 1);
        assert_eq!(report.log.records()[0].identifier.as_str(), "000320230115");

        let dicom_dir = out.path().join("000320230115").join("DICOM");
        assert_eq!(fs::read_dir(dicom_dir.join("t1")).unwrap().count(), 2);
        assert_eq!(fs::read_dir(dicom_dir.join("t2")).unwrap().count(), 2);
    }

    #[test]
    fn test_scenario_flat_mode_logs_each_series() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_mr_series(&root.path().join("a"), 1, &MrFile::default());
        write_mr_series(
            &root.path().join("b"),
            1,
            &MrFile {
                study_date: Some("20240202"),
                ..MrFile::default()
            },
        );

        let config = ConfigBuilder::new()
            .input(root.path())
            .output(out.path())
            .archive(false)
            .build();
        let input = "1\n2\n".as_bytes();
        let report = Pipeline::new(config, Prompt::new(input, Vec::new()))
            .run()
            .unwrap();

        let identifiers: Vec<&str> = report
            .log
            .records()
            .iter()
            .map(|record| record.identifier.as_str())
            .collect();
        assert_eq!(identifiers, vec!["000120230115", "000220240202"]);
    }

    #[test]
    fn test_scenario_missing_patient_number() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write_mr_series(root.path(), 2, &MrFile::default());

        let config = ConfigBuilder::new()
            .input(root.path())
            .output(out.path())
            .build();
        let result = Pipeline::new(config, NonInteractive).run();

        assert!(matches!(result, Err(Error::MissingPatientNumber(_))));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let config = ConfigBuilder::new()
            .input(root.path())
            .output(root.path())
            .log_file_name("")
            .build();

        assert!(matches!(
            Pipeline::new(config, Fixed(1)).run(),
            Err(Error::ConfigError(_))
        ));
    }
}
