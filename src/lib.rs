//! This crate provides the core of an educational Turing Machine simulator.
//! It includes a single-tape execution engine with a sparse two-way tape, an undo/redo
//! history over machine snapshots, caller-owned sessions pairing the two, a parser for
//! the `.tm` program format, and a catalog of built-in example programs.

pub mod analyzer;
pub mod config;
pub mod history;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod session;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
pub use config::SessionConfig;
pub use history::HistoryManager;
/// Re-exports the loader and the file formats it understands.
pub use loader::{ProgramFormat, ProgramLoader};
pub use machine::{MachineView, Snapshot, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{CatalogEntry, ProgramInfo, ProgramManager, PROGRAMS};
pub use session::{LoadResponse, Notice, Response, Session};
pub use tape::{Tape, TapeSegment};
/// Re-exports various types related to program definition and execution from the types module.
pub use types::{
    Direction, Explanation, HaltReason, LastTransition, Program, ProgramDescriptor,
    ProgramSummary, RunReport, StateInfo, Transition, TuringMachineError, MAX_PROGRAM_SIZE,
};
