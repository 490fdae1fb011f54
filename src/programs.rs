//! The catalog of built-in example programs.

use serde::Serialize;
use tracing::warn;

use crate::analyzer::analyze;
use crate::parser::parse;
use crate::types::{ProgramDescriptor, TuringMachineError};

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 4] = [
    (
        "binary_increment",
        include_str!("../programs/binary-increment.tm"),
    ),
    ("bit_flip", include_str!("../programs/bit-flip.tm")),
    ("even_ones", include_str!("../programs/even-ones.tm")),
    (
        "unary_successor",
        include_str!("../programs/unary-successor.tm"),
    ),
];

/// A built-in program together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub text: &'static str,
    pub descriptor: ProgramDescriptor,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<CatalogEntry> = PROGRAM_TEXTS
        .into_iter()
        .filter_map(|(id, text)| match parse(text) {
            Ok(descriptor) => Some(CatalogEntry { id, text, descriptor }),
            Err(e) => {
                warn!(id, error = %e, "failed to parse built-in program");
                None
            }
        })
        .collect();
}

/// Summary of a catalog entry, suitable for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramInfo {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub default_input: String,
    pub state_count: usize,
    pub transition_count: usize,
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its id
    pub fn get(id: &str) -> Result<CatalogEntry, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or_else(|| TuringMachineError::NotFound(id.to_string()))
    }

    /// Get a program by its index
    pub fn get_by_index(index: usize) -> Result<CatalogEntry, TuringMachineError> {
        PROGRAMS
            .get(index)
            .cloned()
            .ok_or_else(|| TuringMachineError::NotFound(format!("#{}", index)))
    }

    /// Get the source text of a program by its id
    pub fn text(id: &str) -> Result<&'static str, TuringMachineError> {
        Self::get(id).map(|entry| entry.text)
    }

    /// List every program
    pub fn list() -> Vec<ProgramInfo> {
        PROGRAMS
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| Self::info(index, entry).ok())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let entry = Self::get_by_index(index)?;
        Self::info(index, &entry)
    }

    /// Search for programs by id or name
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();
        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry.id.contains(&query)
                    || entry
                        .descriptor
                        .name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&query))
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn info(index: usize, entry: &CatalogEntry) -> Result<ProgramInfo, TuringMachineError> {
        let program = analyze(&entry.descriptor)?;
        let descriptor = &entry.descriptor;

        Ok(ProgramInfo {
            index,
            id: entry.id.to_string(),
            name: descriptor.name.clone().unwrap_or_else(|| entry.id.to_string()),
            description: descriptor.description.clone().unwrap_or_default(),
            goal: program.goal.clone(),
            default_input: descriptor.default_input.clone().unwrap_or_default(),
            state_count: program.states().len(),
            transition_count: program.transition_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::TuringMachine;
    use crate::types::DEFAULT_MAX_STEPS;

    fn run(id: &str, input: &str) -> TuringMachine {
        let entry = ProgramManager::get(id).unwrap();
        let mut machine = TuringMachine::new();
        machine.load_descriptor(&entry.descriptor).unwrap();
        machine.set_tape(input);
        machine.run(DEFAULT_MAX_STEPS);
        machine
    }

    #[test]
    fn test_all_programs_are_loaded() {
        assert_eq!(ProgramManager::count(), PROGRAM_TEXTS.len());
    }

    #[test]
    fn test_programs_can_be_executed_on_default_input() {
        for info in ProgramManager::list() {
            let machine = run(&info.id, &info.default_input);
            assert!(machine.is_halted(), "Program '{}' did not halt", info.name);
        }
    }

    #[test]
    fn test_binary_increment_entry() {
        let machine = run("binary_increment", "1011");
        assert_eq!(machine.tape_contents(), "1100");
        assert!(machine.is_accepted());
        assert_eq!(machine.step_count(), 8);
    }

    #[test]
    fn test_binary_increment_explains_every_rule() {
        let entry = ProgramManager::get("binary_increment").unwrap();
        let program = analyze(&entry.descriptor).unwrap();

        assert_eq!(program.goal.as_deref(), Some("Add 1 to the binary number"));
        assert_eq!(program.state_info.len(), 3);
        assert_eq!(program.state_info["add"].label, "ADD");
        for (state, by_symbol) in &program.rules {
            for symbol in by_symbol.keys() {
                assert!(
                    program.explanation(state, *symbol).is_some(),
                    "No explanation for {},{}",
                    state,
                    symbol
                );
            }
        }
        assert_eq!(
            program.explanation("add", '1').map(|e| e.why.as_str()),
            Some("1 + 1 = 2 = '10' in binary. Write 0, carry the 1 left.")
        );
    }

    #[test]
    fn test_even_ones_accepts_and_rejects() {
        assert!(run("even_ones", "1001").is_accepted());

        let machine = run("even_ones", "1101");
        assert!(machine.is_halted());
        assert!(!machine.is_accepted());
        assert_eq!(machine.state(), "reject");
    }

    #[test]
    fn test_unary_successor() {
        assert_eq!(run("unary_successor", "11").tape_contents(), "111");
    }

    #[test]
    fn test_get_program_info() {
        let info = ProgramManager::get_info(0).unwrap();

        assert_eq!(info.id, "binary_increment");
        assert_eq!(info.name, "Add 1 to Binary Number");
        assert_eq!(info.default_input, "1011");
        assert_eq!(info.goal.as_deref(), Some("Add 1 to the binary number"));
        assert_eq!(info.state_count, 3);
        assert_eq!(info.transition_count, 6);

        assert!(ProgramManager::get_info(999).is_err());
    }

    #[test]
    fn test_get_unknown_program() {
        assert!(matches!(
            ProgramManager::get("nonexistent"),
            Err(TuringMachineError::NotFound(_))
        ));
    }

    #[test]
    fn test_program_text() {
        let text = ProgramManager::text("bit_flip").unwrap();
        assert!(text.contains("flip, 0 -> flip, 1, R"));
    }

    #[test]
    fn test_search_programs() {
        assert_eq!(ProgramManager::search("binary"), vec![0]);
        assert_eq!(ProgramManager::search("FLIP"), vec![1]);
        assert!(ProgramManager::search("nonexistent").is_empty());
    }
}
