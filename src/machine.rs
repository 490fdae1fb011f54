//! This module defines the `TuringMachine` struct, the single-tape execution engine.
//! It owns the loaded program together with the live execution state and exposes
//! single-step and bounded multi-step execution, snapshots, and a display view.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::analyzer::analyze;
use crate::tape::{Tape, TapeSegment};
use crate::types::{
    Direction, Explanation, HaltReason, LastTransition, Program, ProgramDescriptor, RunReport,
    StateInfo, TuringMachineError,
};

/// An independent copy of the execution state, used for undo and redo.
///
/// A snapshot does not carry the program or the last transition, so it can be
/// restored into any machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tape: Tape,
    pub head_position: i64,
    pub current_state: String,
    pub halted: bool,
    pub accepted: bool,
    pub step_count: usize,
}

/// The serializable state of a machine as shown to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineView {
    pub tape: TapeSegment,
    pub current_state: String,
    pub halted: bool,
    pub accepted: bool,
    pub step_count: usize,
    pub last_transition: Option<LastTransition>,
    /// Notes on the current state, when the program carries any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_info: Option<StateInfo>,
    /// Explanation of the rule the next step would apply. Absent once halted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Explanation>,
}

/// Represents a single-tape Turing Machine with a tape unbounded in both directions.
#[derive(Debug, Clone, Default)]
pub struct TuringMachine {
    program: Program,
    tape: Tape,
    head: i64,
    state: String,
    halted: bool,
    accepted: bool,
    step_count: usize,
    last_transition: Option<LastTransition>,
}

impl TuringMachine {
    /// Creates a machine with no program loaded.
    ///
    /// The current state is empty, so the first step halts with no transition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a machine with `program` loaded and reset.
    pub fn with_program(program: Program) -> Self {
        let mut machine = Self::new();
        machine.load_program(program);
        machine
    }

    /// Analyzes `descriptor` and loads the resulting program.
    ///
    /// The machine is left untouched when the descriptor is invalid.
    pub fn load_descriptor(
        &mut self,
        descriptor: &ProgramDescriptor,
    ) -> Result<(), TuringMachineError> {
        let program = analyze(descriptor)?;
        self.load_program(program);
        Ok(())
    }

    /// Replaces the transition table and performs a full reset.
    pub fn load_program(&mut self, program: Program) {
        debug!(
            name = %program.name,
            initial_state = %program.initial_state,
            transitions = program.transition_count(),
            "loading program"
        );
        self.program = program;
        self.reset();
    }

    /// Writes `input` at positions `0..`, moves the head to 0 and clears the execution
    /// flags. The current state and the program are kept.
    pub fn set_tape(&mut self, input: &str) {
        self.tape = Tape::from_input(input, self.program.blank);
        self.head = 0;
        self.clear_flags();
    }

    /// Returns the machine to the program's initial state with an all-blank tape.
    pub fn reset(&mut self) {
        self.state = self.program.initial_state.clone();
        self.tape = Tape::new();
        self.head = 0;
        self.clear_flags();
    }

    fn clear_flags(&mut self) {
        self.halted = false;
        self.accepted = false;
        self.step_count = 0;
        self.last_transition = None;
    }

    /// Returns the symbol under the head.
    pub fn read_symbol(&self) -> char {
        self.tape.read(self.head, self.program.blank)
    }

    /// Writes `symbol` under the head. Writing the blank symbol clears the cell.
    pub fn write_symbol(&mut self, symbol: char) {
        self.tape.write(self.head, symbol, self.program.blank);
    }

    pub fn move_head(&mut self, direction: Direction) {
        self.head += direction.offset();
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `true` if a transition was applied, including one that enters an accept or
    ///   reject state.
    /// * `false` if the machine was already halted, or if no rule matched. In the
    ///   latter case the machine halts without counting a step.
    pub fn step(&mut self) -> bool {
        if self.halted {
            return false;
        }

        let read = self.read_symbol();
        let transition = match self.program.transition(&self.state, read) {
            Some(t) => t.clone(),
            None => {
                trace!(state = %self.state, symbol = %read, "no transition, halting");
                self.halted = true;
                self.accepted = self.program.is_accepting(&self.state);
                self.last_transition = Some(LastTransition {
                    from_state: self.state.clone(),
                    read,
                    to_state: None,
                    write: None,
                    direction: None,
                    halted: true,
                    reason: Some(HaltReason::NoTransition),
                });
                return false;
            }
        };

        trace!(
            from = %self.state,
            read = %read,
            to = %transition.next_state,
            write = %transition.write,
            direction = %transition.direction,
            "applying transition"
        );

        self.write_symbol(transition.write);
        self.move_head(transition.direction);
        let from_state = std::mem::replace(&mut self.state, transition.next_state.clone());
        self.step_count += 1;

        let reason = if self.program.is_accepting(&self.state) {
            self.halted = true;
            self.accepted = true;
            Some(HaltReason::Accepted)
        } else if self.program.is_rejecting(&self.state) {
            self.halted = true;
            self.accepted = false;
            Some(HaltReason::Rejected)
        } else {
            None
        };

        self.last_transition = Some(LastTransition {
            from_state,
            read,
            to_state: Some(transition.next_state),
            write: Some(transition.write),
            direction: Some(transition.direction),
            halted: self.halted,
            reason,
        });

        true
    }

    /// Steps until the machine halts or `max_steps` transitions have been applied.
    pub fn run(&mut self, max_steps: usize) -> RunReport {
        let mut steps_executed = 0;
        while !self.halted && steps_executed < max_steps {
            if !self.step() {
                break;
            }
            steps_executed += 1;
        }

        let report = RunReport {
            halted: self.halted,
            accepted: self.accepted,
            steps_executed,
            max_steps_reached: steps_executed >= max_steps && !self.halted,
        };
        debug!(?report, "run finished");
        report
    }

    /// Captures the execution state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tape: self.tape.clone(),
            head_position: self.head,
            current_state: self.state.clone(),
            halted: self.halted,
            accepted: self.accepted,
            step_count: self.step_count,
        }
    }

    /// Replaces the execution state with `snapshot` and clears the last transition.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.tape = snapshot.tape.clone();
        self.tape.canonicalize(self.program.blank);
        self.head = snapshot.head_position;
        self.state = snapshot.current_state.clone();
        self.halted = snapshot.halted;
        self.accepted = snapshot.accepted;
        self.step_count = snapshot.step_count;
        self.last_transition = None;
    }

    /// Returns a window of the tape around the occupied cells and the head.
    pub fn tape_segment(&self, padding: usize) -> TapeSegment {
        self.tape.segment(self.head, padding, self.program.blank)
    }

    /// Returns the serializable view of the machine.
    pub fn view(&self, padding: usize) -> MachineView {
        MachineView {
            tape: self.tape_segment(padding),
            current_state: self.state.clone(),
            halted: self.halted,
            accepted: self.accepted,
            step_count: self.step_count,
            last_transition: self.last_transition.clone(),
            state_info: self.program.state_info.get(&self.state).cloned(),
            next_action: self.next_action().cloned(),
        }
    }

    /// Returns the explanation of the rule that the next step would apply.
    pub fn next_action(&self) -> Option<&Explanation> {
        if self.halted {
            return None;
        }
        self.program.explanation(&self.state, self.read_symbol())
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the occupied span of the tape as a string.
    pub fn tape_contents(&self) -> String {
        self.tape.contents(self.program.blank)
    }

    pub fn head_position(&self) -> i64 {
        self.head
    }

    /// Returns the current state of the Turing Machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn blank(&self) -> char {
        self.program.blank
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Returns the number of transitions applied since the last reset or tape change.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn last_transition(&self) -> Option<&LastTransition> {
        self.last_transition.as_ref()
    }
}
