//! This module provides the `ProgramLoader` struct, responsible for loading program
//! descriptors from files and strings.
//!
//! Files ending in `.json` hold a serialized [`ProgramDescriptor`]; files ending in
//! `.tm` hold the text format understood by [`crate::parser`].

use crate::analyzer::analyze;
use crate::parser::parse;
use crate::types::{ProgramDescriptor, TuringMachineError};
use std::fs;
use std::path::{Path, PathBuf};

/// The file formats a program can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFormat {
    Json,
    Text,
}

impl ProgramFormat {
    /// Determines the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(ProgramFormat::Json),
            "tm" => Some(ProgramFormat::Text),
            _ => None,
        }
    }
}

pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads and validates a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(ProgramDescriptor)` if the file is read, decoded and passes analysis.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or has an
    ///   unknown extension.
    /// * Any decoding or validation error otherwise.
    pub fn load_program(path: &Path) -> Result<ProgramDescriptor, TuringMachineError> {
        let format = ProgramFormat::from_path(path).ok_or_else(|| {
            TuringMachineError::FileError(format!(
                "Unsupported program file {}, expected .json or .tm",
                path.display()
            ))
        })?;

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_program_from_string(&content, format)
    }

    /// Loads and validates a single program from string content.
    pub fn load_program_from_string(
        content: &str,
        format: ProgramFormat,
    ) -> Result<ProgramDescriptor, TuringMachineError> {
        match format {
            ProgramFormat::Text => parse(content),
            ProgramFormat::Json => {
                let descriptor = ProgramDescriptor::from_json(content)?;
                analyze(&descriptor)?;
                Ok(descriptor)
            }
        }
    }

    /// Loads all program files (`.json` and `.tm`) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Each loaded file yields
    /// either its path and descriptor, or the error that prevented loading it.
    pub fn load_programs(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, ProgramDescriptor), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and unknown extensions
                if path.is_dir() || ProgramFormat::from_path(&path).is_none() {
                    return None;
                }

                Some(Self::load_program(&path).map(|descriptor| (path, descriptor)))
            })
            .collect()
    }
}
