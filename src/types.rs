//! This module defines the core data structures and types used throughout the Turing Machine
//! engine, including program representation, transitions, execution reports, and error types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::analyzer::AnalysisError;
use crate::Rule;

/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The initial state assumed when a program descriptor does not name one.
pub const DEFAULT_INITIAL_STATE: &str = "q0";
/// The maximum allowed size for a Turing Machine program in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The default step budget for a single `run`.
pub const DEFAULT_MAX_STEPS: usize = 10000;
/// The default number of snapshots kept for undo.
pub const DEFAULT_MAX_HISTORY: usize = 1000;
/// The default number of blank cells shown on each side of the tape window.
pub const DEFAULT_TAPE_PADDING: usize = 5;
/// The largest padding a session may configure for the tape window.
pub const MAX_TAPE_PADDING: usize = 256;
/// The most cells a tape window spans on each side of the head.
pub const MAX_WINDOW_REACH: i64 = 512;

/// Represents the possible directions the head can move.
///
/// On the wire a direction is one of the single-letter codes `L`, `R` or `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    #[serde(rename = "L")]
    Left,
    /// Move the head one position to the right.
    #[serde(rename = "R")]
    Right,
    /// Keep the head in the same position.
    #[serde(rename = "N")]
    Stay,
}

impl Direction {
    /// Returns the single-letter code of this direction.
    pub fn code(&self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'N',
        }
    }

    /// Returns the signed offset applied to the head position.
    pub fn offset(&self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

impl FromStr for Direction {
    type Err = AnalysisError;

    /// Parses a direction code, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Direction::Left),
            "R" => Ok(Direction::Right),
            "N" => Ok(Direction::Stay),
            _ => Err(AnalysisError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The action taken when the machine is in a given state and reads a given symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine switches to.
    pub next_state: String,
    /// The symbol written under the head.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

/// Teaching notes attached to a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    /// A short display name, such as `SCAN`.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A plain-language explanation of a single rule, shown before the rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// What the machine is about to do.
    pub action: String,
    /// Why it does it.
    #[serde(default)]
    pub why: String,
}

/// A validated, immutable Turing Machine program.
///
/// Programs are built from a [`ProgramDescriptor`] by [`crate::analyzer::analyze`].
/// Rules are keyed first by state and then by the symbol under the head, so a lookup
/// never has to split or allocate a composite string key.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The name of the program, empty when the descriptor did not provide one.
    pub name: String,
    /// The state the machine starts in after a reset.
    pub initial_state: String,
    /// States that halt the machine with a positive outcome.
    pub accept_states: HashSet<String>,
    /// States that halt the machine with a negative outcome.
    pub reject_states: HashSet<String>,
    /// The blank symbol of the tape.
    pub blank: char,
    /// The transition table: `state -> read symbol -> transition`.
    pub rules: HashMap<String, HashMap<char, Transition>>,
    /// What the program sets out to do.
    pub goal: Option<String>,
    /// Teaching notes per state.
    pub state_info: HashMap<String, StateInfo>,
    /// Rule explanations, keyed like `rules`.
    pub explanations: HashMap<String, HashMap<char, Explanation>>,
}

impl Default for Program {
    /// An empty program: no initial state, no rules, default blank.
    fn default() -> Self {
        Self {
            name: String::new(),
            initial_state: String::new(),
            accept_states: HashSet::new(),
            reject_states: HashSet::new(),
            blank: DEFAULT_BLANK_SYMBOL,
            rules: HashMap::new(),
            goal: None,
            state_info: HashMap::new(),
            explanations: HashMap::new(),
        }
    }
}

impl Program {
    /// Looks up the transition for a `(state, symbol)` pair.
    pub fn transition(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.rules.get(state).and_then(|by_symbol| by_symbol.get(&symbol))
    }

    /// Looks up the explanation of the rule for a `(state, symbol)` pair.
    pub fn explanation(&self, state: &str, symbol: char) -> Option<&Explanation> {
        self.explanations
            .get(state)
            .and_then(|by_symbol| by_symbol.get(&symbol))
    }

    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    pub fn is_rejecting(&self, state: &str) -> bool {
        self.reject_states.contains(state)
    }

    /// Returns every state named by the transition table, either as a source or as a
    /// target, in sorted order.
    pub fn states(&self) -> Vec<String> {
        let mut states = BTreeSet::new();
        for (state, by_symbol) in &self.rules {
            states.insert(state.clone());
            for transition in by_symbol.values() {
                states.insert(transition.next_state.clone());
            }
        }
        states.into_iter().collect()
    }

    /// Returns the total number of entries in the transition table.
    pub fn transition_count(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    /// Returns a serializable summary of the program.
    pub fn summary(&self) -> ProgramSummary {
        let transitions = self
            .rules
            .iter()
            .flat_map(|(state, by_symbol)| {
                by_symbol.iter().map(move |(symbol, t)| {
                    (
                        format!("{},{}", state, symbol),
                        [
                            t.next_state.clone(),
                            t.write.to_string(),
                            t.direction.to_string(),
                        ],
                    )
                })
            })
            .collect();

        ProgramSummary {
            name: self.name.clone(),
            initial_state: self.initial_state.clone(),
            goal: self.goal.clone(),
            states: self.states(),
            state_info: self
                .state_info
                .iter()
                .map(|(state, info)| (state.clone(), info.clone()))
                .collect(),
            transitions,
        }
    }
}

/// A description of a program as it is received from callers or read from files.
///
/// Transition keys encode `"state,symbol"` and values encode
/// `[next_state, write_symbol, direction]`. Nothing is validated until the descriptor
/// is analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tape input suggested for this program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_input: Option<String>,
    #[serde(default = "default_initial_state")]
    pub initial_state: String,
    #[serde(default)]
    pub accept_states: Vec<String>,
    #[serde(default)]
    pub reject_states: Vec<String>,
    #[serde(default = "default_blank_symbol")]
    pub blank_symbol: String,
    #[serde(default)]
    pub transitions: BTreeMap<String, Vec<String>>,
    /// What the program sets out to do.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    /// Teaching notes keyed by state.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub states: BTreeMap<String, StateInfo>,
    /// Rule explanations keyed like `transitions`.
    #[serde(
        default,
        alias = "next_action_explanations",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub explanations: BTreeMap<String, Explanation>,
}

fn default_initial_state() -> String {
    DEFAULT_INITIAL_STATE.to_string()
}

fn default_blank_symbol() -> String {
    DEFAULT_BLANK_SYMBOL.to_string()
}

impl Default for ProgramDescriptor {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            default_input: None,
            initial_state: default_initial_state(),
            accept_states: Vec::new(),
            reject_states: Vec::new(),
            blank_symbol: default_blank_symbol(),
            transitions: BTreeMap::new(),
            goal: None,
            states: BTreeMap::new(),
            explanations: BTreeMap::new(),
        }
    }
}

impl ProgramDescriptor {
    /// Parses a descriptor from its JSON representation.
    pub fn from_json(input: &str) -> Result<Self, TuringMachineError> {
        if input.len() > MAX_PROGRAM_SIZE {
            return Err(TuringMachineError::ProgramTooLarge(input.len()));
        }

        serde_json::from_str(input).map_err(|e| TuringMachineError::DescriptorError(e.to_string()))
    }
}

/// A serializable overview of a loaded program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramSummary {
    pub name: String,
    pub initial_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub states: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub state_info: BTreeMap<String, StateInfo>,
    pub transitions: BTreeMap<String, [String; 3]>,
}

/// Why the machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// No rule exists for the current state and symbol.
    NoTransition,
    /// The machine entered an accept state.
    Accepted,
    /// The machine entered a reject state.
    Rejected,
}

/// The most recent step attempt, kept for observability.
///
/// When the machine halted because no rule matched, `to_state`, `write` and
/// `direction` are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTransition {
    pub from_state: String,
    pub read: char,
    pub to_state: Option<String>,
    pub write: Option<char>,
    pub direction: Option<Direction>,
    pub halted: bool,
    pub reason: Option<HaltReason>,
}

/// The outcome of a bounded `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub halted: bool,
    pub accepted: bool,
    /// Transitions applied during this run. A final step that found no rule is not counted.
    pub steps_executed: usize,
    /// True only when the budget ran out while the machine was still live.
    pub max_steps_reached: bool,
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates an error during the parsing of a `.tm` program text.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates that a program descriptor could not be decoded.
    #[error("Invalid program descriptor: {0}")]
    DescriptorError(String),
    /// Indicates that a program descriptor is well-formed but describes an invalid program.
    #[error("Program validation error: {0}")]
    ValidationError(#[from] AnalysisError),
    /// Indicates that a program source exceeds [`MAX_PROGRAM_SIZE`].
    #[error("Program is too large: {0} bytes")]
    ProgramTooLarge(usize),
    /// Indicates that a requested catalog program does not exist.
    #[error("Program '{0}' not found")]
    NotFound(String),
    /// Indicates that session limits are out of range.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
    /// Indicates an error related to file system operations, such as reading program files.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let stay_json = serde_json::to_string(&Direction::Stay).unwrap();

        assert_eq!(left_json, "\"L\"");
        assert_eq!(stay_json, "\"N\"");

        let right: Direction = serde_json::from_str("\"R\"").unwrap();
        assert_eq!(right, Direction::Right);
    }

    #[test]
    fn test_direction_parsing_is_case_insensitive() {
        assert_eq!("l".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!(" R ".parse::<Direction>(), Ok(Direction::Right));
        assert_eq!("n".parse::<Direction>(), Ok(Direction::Stay));
        assert_eq!(
            "S".parse::<Direction>(),
            Err(AnalysisError::UnknownDirection("S".to_string()))
        );
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = ProgramDescriptor::from_json("{}").unwrap();

        assert_eq!(descriptor.initial_state, "q0");
        assert_eq!(descriptor.blank_symbol, "_");
        assert!(descriptor.accept_states.is_empty());
        assert!(descriptor.transitions.is_empty());
    }

    #[test]
    fn test_descriptor_from_invalid_json() {
        let result = ProgramDescriptor::from_json("{\"transitions\": 3}");
        assert!(matches!(result, Err(TuringMachineError::DescriptorError(_))));
    }

    #[test]
    fn test_descriptor_reads_teaching_notes() {
        let descriptor = ProgramDescriptor::from_json(
            r#"{
                "goal": "Add 1 to the binary number",
                "states": {"scan": {"label": "SCAN", "description": "Looking for the end"}},
                "next_action_explanations": {
                    "scan,0": {"action": "Keep the 0, move RIGHT", "why": "Still looking."}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(descriptor.goal.as_deref(), Some("Add 1 to the binary number"));
        assert_eq!(descriptor.states["scan"].label, "SCAN");
        assert_eq!(descriptor.explanations["scan,0"].why, "Still looking.");

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["explanations"]["scan,0"]["action"], "Keep the 0, move RIGHT");
        assert!(json.get("next_action_explanations").is_none());
    }

    #[test]
    fn test_program_states_include_targets() {
        let mut program = Program::default();
        program.rules.entry("scan".to_string()).or_default().insert(
            '1',
            Transition {
                next_state: "done".to_string(),
                write: '0',
                direction: Direction::Stay,
            },
        );

        assert_eq!(program.states(), vec!["done".to_string(), "scan".to_string()]);
        assert_eq!(program.transition_count(), 1);
        assert!(program.transition("scan", '1').is_some());
        assert!(program.transition("done", '1').is_none());

        let summary = program.summary();
        assert_eq!(
            summary.transitions.get("scan,1"),
            Some(&["done".to_string(), "0".to_string(), "N".to_string()])
        );
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::FileError("missing.tm".to_string());

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("File error"));
        assert!(error_msg.contains("missing.tm"));
    }
}
