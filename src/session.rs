//! A caller-owned pairing of a [`TuringMachine`] with its [`HistoryManager`].
//!
//! Each user of the simulator gets its own `Session`; nothing here is shared or global.
//! Every command leaves the snapshot of the resulting machine state as the last entry
//! of the history, so undo and redo always restore exact states.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::history::HistoryManager;
use crate::machine::{MachineView, TuringMachine};
use crate::types::{ProgramDescriptor, ProgramSummary, RunReport, TuringMachineError};

/// Why a command did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    MachineHalted,
    NothingToUndo,
    NothingToRedo,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Notice::MachineHalted => "The machine has halted. Reset to run it again.",
            Notice::NothingToUndo => "Nothing to undo.",
            Notice::NothingToRedo => "Nothing to redo.",
        };
        f.write_str(message)
    }
}

/// The result of a session command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub machine: MachineView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RunReport>,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// The result of loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadResponse {
    #[serde(flatten)]
    pub response: Response,
    pub program: ProgramSummary,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    machine: TuringMachine,
    history: HistoryManager,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            machine: TuringMachine::new(),
            history: HistoryManager::new(config.max_history),
            config,
        }
    }

    /// Loads a program and, when `tape` is non-empty, writes it onto the tape.
    ///
    /// An invalid descriptor leaves the session untouched.
    pub fn load(
        &mut self,
        descriptor: &ProgramDescriptor,
        tape: &str,
    ) -> Result<LoadResponse, TuringMachineError> {
        self.machine.load_descriptor(descriptor)?;
        if !tape.is_empty() {
            self.machine.set_tape(tape);
        }
        info!(
            program = %self.machine.program().name,
            tape,
            "program loaded"
        );
        self.restart_history();

        Ok(LoadResponse {
            response: self.respond(true, None, None),
            program: self.machine.program().summary(),
        })
    }

    /// Executes one step.
    pub fn step(&mut self) -> Response {
        if self.machine.is_halted() {
            return self.respond(false, Some(Notice::MachineHalted), None);
        }

        let executed = self.machine.step();
        self.record();
        self.respond(executed, None, None)
    }

    /// Runs until halt or until the budget is spent. `None` uses the configured budget.
    pub fn run(&mut self, max_steps: Option<usize>) -> Response {
        if self.machine.is_halted() {
            return self.respond(false, Some(Notice::MachineHalted), None);
        }

        let report = self
            .machine
            .run(max_steps.unwrap_or(self.config.max_steps));
        self.record();
        self.respond(true, None, Some(report))
    }

    /// Resets the machine and, when `tape` is non-empty, writes it onto the tape.
    pub fn reset(&mut self, tape: &str) -> Response {
        self.machine.reset();
        if !tape.is_empty() {
            self.machine.set_tape(tape);
        }
        debug!(tape, "machine reset");
        self.restart_history();
        self.respond(true, None, None)
    }

    pub fn undo(&mut self) -> Response {
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.machine.restore(&snapshot);
                debug!(step_count = snapshot.step_count, "undo");
                self.respond(true, None, None)
            }
            None => self.respond(false, Some(Notice::NothingToUndo), None),
        }
    }

    pub fn redo(&mut self) -> Response {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.machine.restore(&snapshot);
                debug!(step_count = snapshot.step_count, "redo");
                self.respond(true, None, None)
            }
            None => self.respond(false, Some(Notice::NothingToRedo), None),
        }
    }

    /// Returns the current state without changing anything.
    pub fn view(&self) -> Response {
        self.respond(true, None, None)
    }

    pub fn machine(&self) -> &TuringMachine {
        &self.machine
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Pushes the present state unless it is already the latest entry.
    fn record(&mut self) {
        let snapshot = self.machine.snapshot();
        if self.history.current() != Some(&snapshot) {
            self.history.push(snapshot);
        }
    }

    fn restart_history(&mut self) {
        self.history.clear();
        self.history.push(self.machine.snapshot());
    }

    fn respond(&self, success: bool, notice: Option<Notice>, result: Option<RunReport>) -> Response {
        Response {
            success,
            notice,
            machine: self.machine.view(self.config.tape_padding),
            result,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }
}
