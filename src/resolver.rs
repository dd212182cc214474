//! Sources of the patient number for a unit of work.
//!
//! The engine only sees the [`PatientNumberResolver`] trait, so interactive, fixed and
//! per-group sources are interchangeable and tests can supply canned values.

use crate::discovery::StudyKey;
use crate::sample::Sample;
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// What a resolver gets to see about the unit it is asked for.
#[derive(Debug, Clone, Copy)]
pub struct UnitInfo<'a> {
    /// Human-readable description, e.g. the series directory or a study summary.
    pub description: &'a str,
    pub sample: &'a Sample,

    /// Only set for grouped units.
    pub key: Option<&'a StudyKey>,
}

pub trait PatientNumberResolver {
    /// Returns the patient number for `unit` or fails with [`Error::MissingPatientNumber`].
    fn resolve(&mut self, unit: &UnitInfo) -> Result<u32>;
}

impl<R: PatientNumberResolver + ?Sized> PatientNumberResolver for Box<R> {
    fn resolve(&mut self, unit: &UnitInfo) -> Result<u32> {
        (**self).resolve(unit)
    }
}

/// The same patient number for every unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed(pub u32);

impl PatientNumberResolver for Fixed {
    fn resolve(&mut self, _unit: &UnitInfo) -> Result<u32> {
        Ok(self.0)
    }
}

/// Never supplies a number; for headless runs without a fixed number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonInteractive;

impl PatientNumberResolver for NonInteractive {
    fn resolve(&mut self, unit: &UnitInfo) -> Result<u32> {
        Err(Error::MissingPatientNumber(unit.description.into()))
    }
}

/// Numbers entered per study group, e.g. through a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerGroup(pub HashMap<StudyKey, u32>);

impl PerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: StudyKey, patient_number: u32) -> Option<u32> {
        self.0.insert(key, patient_number)
    }
}

impl PatientNumberResolver for PerGroup {
    fn resolve(&mut self, unit: &UnitInfo) -> Result<u32> {
        unit.key
            .and_then(|key| self.0.get(key))
            .copied()
            .ok_or_else(|| Error::MissingPatientNumber(unit.description.into()))
    }
}

/// Asks an operator for the number, blocking until a valid integer is entered.
///
/// The patient name and age of the unit are shown so the operator can look the number up.
/// Invalid input is rejected and asked again. End of input fails the unit, since no
/// number can arrive anymore.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl Prompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PatientNumberResolver for Prompt<R, W> {
    fn resolve(&mut self, unit: &UnitInfo) -> Result<u32> {
        writeln!(self.output, "{}", unit.description)?;
        writeln!(
            self.output,
            "  Patient name: {}",
            unit.sample.patient_name_or_unknown()
        )?;
        writeln!(self.output, "  Age: {}", unit.sample.patient_age_or_unknown())?;

        loop {
            write!(self.output, "  Enter the patient number for this study: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(Error::MissingPatientNumber(unit.description.into()));
            }
            match line.trim().parse::<u32>() {
                Ok(patient_number) => return Ok(patient_number),
                Err(_) => writeln!(self.output, "  Error: please enter a whole number!")?,
            }
        }
    }
}
