//! Property-based tests for conditions, transitions and the machine loop.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use bluecheese::core::{Blackboard, CompareOp, Condition, State, StateHistory, StateTransition};
use bluecheese::fsm::{StateMachine, Transition};
use chrono::Utc;
use proptest::prelude::*;

fn arbitrary_op() -> impl Strategy<Value = CompareOp> {
    prop_oneof![
        Just(CompareOp::Greater),
        Just(CompareOp::Less),
        Just(CompareOp::Equals),
        Just(CompareOp::NotEquals),
        Just(CompareOp::GreaterOrEqual),
        Just(CompareOp::LessOrEqual),
    ]
}

fn expected(op: CompareOp, lhs: i32, rhs: i32) -> bool {
    match op {
        CompareOp::Greater => lhs > rhs,
        CompareOp::Less => lhs < rhs,
        CompareOp::Equals => lhs == rhs,
        CompareOp::NotEquals => lhs != rhs,
        CompareOp::GreaterOrEqual => lhs >= rhs,
        CompareOp::LessOrEqual => lhs <= rhs,
    }
}

/// A ring of states, each leaving for the next after `exit_time`.
fn ring(size: usize, exit_time: f32) -> StateMachine {
    let mut machine = StateMachine::new("ring");
    let names: Vec<String> = (0..size).map(|i| format!("S{i}")).collect();
    for name in &names {
        machine.add_state(State::new(name.clone()), false).unwrap();
    }
    for i in 0..size {
        machine
            .add_transition(&names[i], &names[(i + 1) % size], exit_time, [])
            .unwrap();
    }
    machine
}

proptest! {
    #[test]
    fn int_condition_matches_operator(
        op in arbitrary_op(),
        stored in -50i32..50,
        threshold in -50i32..50,
    ) {
        let mut blackboard = Blackboard::new();
        blackboard.set_int("speed", stored);

        let condition = Condition::int("speed", op, threshold);
        prop_assert_eq!(condition.evaluate(&blackboard), expected(op, stored, threshold));
    }

    #[test]
    fn unset_int_reads_as_zero(op in arbitrary_op(), threshold in -5i32..5) {
        let condition = Condition::int("missing", op, threshold);
        prop_assert_eq!(condition.evaluate(&Blackboard::new()), expected(op, 0, threshold));
    }

    #[test]
    fn exit_time_gates_and_overflow_is_remainder(
        exit_time in 0.01f32..10.0,
        state_time in 0.0f32..20.0,
    ) {
        let mut machine = StateMachine::new("gate");
        let target = machine.add_state(State::new("Target"), false).unwrap();
        let transition = Transition::new(target, exit_time, Vec::new());
        let result = transition.evaluate(&Blackboard::new(), state_time);

        if state_time < exit_time {
            prop_assert!(result.is_none());
        } else {
            let fired = result.unwrap();
            prop_assert_eq!(fired.overflow, state_time - exit_time);
            prop_assert!(fired.overflow >= 0.0);
        }
    }

    #[test]
    fn history_never_exceeds_limit(limit in 0usize..8, records in 0usize..20) {
        let mut history = StateHistory::with_limit(limit);
        for i in 0..records {
            history.record(StateTransition {
                from: format!("S{i}"),
                to: format!("S{}", i + 1),
                timestamp: Utc::now(),
                overflow: 0.0,
            });
        }

        prop_assert_eq!(history.len(), records.min(limit));
        let path = history.get_path();
        if history.is_empty() {
            prop_assert!(path.is_empty());
        } else {
            prop_assert_eq!(path.len(), history.len() + 1);
            let last = format!("S{records}");
            prop_assert_eq!(path.last().copied(), Some(last.as_str()));
        }
    }

    #[test]
    fn overflow_is_conserved_across_cascades(
        size in 2usize..5,
        exit_time in 1u8..5,
        whole in 0u8..20,
    ) {
        let exit_time = f32::from(exit_time);
        let delta = f32::from(whole) + 0.5;
        let mut machine = ring(size, exit_time);
        machine.start().unwrap();

        machine.update(delta);

        let hops = (delta / exit_time).floor() as usize;
        let expected_state = format!("S{}", hops % size);
        prop_assert_eq!(machine.current_state(), Some(expected_state.as_str()));
        let remainder = delta - hops as f32 * exit_time;
        prop_assert!((machine.state_time() - remainder).abs() < 1e-4);
    }

    #[test]
    fn triggers_are_cleared_by_a_transition(extra in prop::collection::vec("[a-z]{1,6}", 0..4)) {
        let mut machine = StateMachine::builder()
            .add_default_state(State::new("Idle")).unwrap()
            .add_state(State::new("Jump")).unwrap()
            .add_transition("Idle", "Jump", 0.0, [Condition::trigger("jump")]).unwrap()
            .build()
            .unwrap();
        machine.start().unwrap();

        machine.set_trigger("jump");
        for name in &extra {
            machine.set_trigger(name.clone());
        }
        machine.update(0.0);

        prop_assert_eq!(machine.current_state(), Some("Jump"));
        prop_assert_eq!(machine.blackboard().active_triggers().count(), 0);
    }
}
