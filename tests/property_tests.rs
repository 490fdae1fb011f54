//! Property-based tests for the engine and the history manager.

use proptest::prelude::*;
use turing_tutor::{
    HistoryManager, ProgramManager, Snapshot, Tape, TuringMachine, TuringMachineError,
};

fn machine(id: &str) -> TuringMachine {
    let entry = ProgramManager::get(id).unwrap();
    let mut machine = TuringMachine::new();
    machine.load_descriptor(&entry.descriptor).unwrap();
    machine
}

fn snap(tag: u8) -> Snapshot {
    Snapshot {
        tape: Tape::from_input(&tag.to_string(), '_'),
        head_position: i64::from(tag),
        current_state: format!("q{}", tag),
        halted: tag % 2 == 0,
        accepted: false,
        step_count: usize::from(tag),
    }
}

prop_compose! {
    fn binary_input()(bits in proptest::collection::vec(any::<bool>(), 0..24)) -> String {
        bits.into_iter().map(|b| if b { '1' } else { '0' }).collect()
    }
}

proptest! {
    #[test]
    fn run_is_deterministic(input in binary_input(), budget in 0usize..64) {
        let mut machine = machine("binary_increment");

        machine.reset();
        machine.set_tape(&input);
        let first = machine.run(budget);
        let first_snapshot = machine.snapshot();

        machine.reset();
        machine.set_tape(&input);
        let second = machine.run(budget);

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_snapshot, machine.snapshot());
    }

    #[test]
    fn stepping_matches_running(input in binary_input()) {
        let mut stepped = machine("bit_flip");
        stepped.set_tape(&input);
        let mut k = 0;
        while stepped.step() {
            k += 1;
        }

        let mut ran = machine("bit_flip");
        ran.set_tape(&input);
        let report = ran.run(k);

        prop_assert_eq!(report.steps_executed, k);
        prop_assert_eq!(stepped.snapshot(), ran.snapshot());
    }

    #[test]
    fn binary_increment_adds_one(n in 0u32..100_000) {
        let mut machine = machine("binary_increment");
        machine.set_tape(&format!("{:b}", n));
        let report = machine.run(10_000);

        prop_assert!(report.accepted);
        prop_assert_eq!(machine.tape_contents(), format!("{:b}", n + 1));
    }

    #[test]
    fn tape_stays_sparse(writes in proptest::collection::vec((-20i64..20, prop_oneof![Just('_'), Just('0'), Just('1')]), 0..64)) {
        let mut tape = Tape::new();
        for (pos, symbol) in writes {
            tape.write(pos, symbol, '_');
        }

        prop_assert!(tape.iter().all(|(_, symbol)| symbol != '_'));
    }

    #[test]
    fn undo_then_redo_is_identity(tags in proptest::collection::vec(any::<u8>(), 2..32)) {
        let mut history = HistoryManager::default();
        for tag in &tags {
            history.push(snap(*tag));
        }
        let past = history.past().clone();
        let future = history.future().to_vec();

        prop_assert!(history.undo().is_some());
        prop_assert!(history.redo().is_some());

        prop_assert_eq!(history.past(), &past);
        prop_assert_eq!(history.future(), future.as_slice());
    }

    #[test]
    fn push_after_undo_truncates_redo(tags in proptest::collection::vec(any::<u8>(), 2..32), extra in any::<u8>()) {
        let mut history = HistoryManager::default();
        for tag in &tags {
            history.push(snap(*tag));
        }

        history.undo();
        history.push(snap(extra));

        prop_assert!(!history.can_redo());
    }

    #[test]
    fn history_never_exceeds_cap(cap in 1usize..16, count in 0usize..64) {
        let mut history = HistoryManager::new(cap);
        for i in 0..count {
            history.push(snap((i % 256) as u8));
            prop_assert!(history.len() <= cap);
        }
        prop_assert_eq!(history.len(), count.min(cap));
    }

    #[test]
    fn no_match_leaves_step_count_unchanged(prefix in binary_input()) {
        let mut machine = machine("binary_increment");
        machine.set_tape(&format!("{}x", prefix));
        let report = machine.run(10_000);

        prop_assert!(report.halted);
        prop_assert!(!report.accepted);
        prop_assert_eq!(machine.step_count(), prefix.len());
    }
}

#[test]
fn unknown_direction_is_rejected_at_load() {
    let mut descriptor = ProgramManager::get("bit_flip").unwrap().descriptor;
    descriptor.transitions.insert(
        "flip,x".to_string(),
        vec!["flip".to_string(), "x".to_string(), "U".to_string()],
    );

    let mut machine = TuringMachine::new();
    assert!(matches!(
        machine.load_descriptor(&descriptor),
        Err(TuringMachineError::ValidationError(_))
    ));
    assert_eq!(machine.state(), "");
}
