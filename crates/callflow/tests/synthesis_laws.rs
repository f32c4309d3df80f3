//! Property tests for message synthesis and participant extraction
//!
//! Traces are generated by driving a real id generator through random nested
//! call trees, so ids are contiguous and in program order.

use callflow::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Arbitrary Generators
// ============================================================================

const ACTORS: [(&str, &str); 5] = [
    ("web", "user"),
    ("web", "frontend"),
    ("api", "orders"),
    ("api", "billing"),
    ("data", "db"),
];

fn actor(index: u8) -> Container {
    let (system, label) = ACTORS[index as usize % ACTORS.len()];
    match (system, label) {
        ("web", "user") => Container::person(system, label),
        ("data", _) => Container::database(system, label),
        _ => Container::system(system, label),
    }
}

/// One step of the simulated program: open a call or close the innermost one
#[derive(Debug, Clone)]
struct Step {
    open: bool,
    source: u8,
    target: u8,
    fail: bool,
}

fn arb_step() -> impl Strategy<Value = Step> {
    (any::<bool>(), 0u8..5, 0u8..5, any::<bool>()).prop_map(|(open, source, target, fail)| Step {
        open,
        source,
        target,
        fail,
    })
}

/// Run the steps; calls still open at the end stay pending unless `close_all`
fn simulate(steps: &[Step], close_all: bool) -> Vec<CallRecord> {
    let ids = CallIdGenerator::new();
    let mut records: Vec<CallRecord> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();
    let mut clock = 0u64;

    let close = |records: &mut Vec<CallRecord>, index: usize, fail: bool, clock: u64| {
        let response_id = ids.next_id();
        let record = records[index].clone();
        records[index] = if fail {
            record.failed(response_id, clock, "boom")
        } else {
            record.completed(response_id, clock, "ok")
        };
    };

    for step in steps {
        clock += 10;
        match stack.last().copied() {
            Some(top) if !step.open => close(&mut records, top, step.fail, clock),
            _ => {
                let call_id = ids.next_id();
                records.push(CallRecord::new(
                    call_id,
                    actor(step.source),
                    actor(step.target),
                    format!("op{}", call_id),
                    clock,
                ));
                stack.push(records.len() - 1);
                continue;
            }
        }
        stack.pop();
    }

    if close_all {
        while let Some(top) = stack.pop() {
            clock += 10;
            close(&mut records, top, false, clock);
        }
    }
    records
}

fn arb_trace() -> impl Strategy<Value = Vec<CallRecord>> {
    (prop::collection::vec(arb_step(), 0..40), any::<bool>())
        .prop_map(|(steps, close_all)| simulate(&steps, close_all))
}

fn is_synchronous(call: &CallRecord) -> bool {
    call.response_id == Some(call.call_id + 1)
}

// ============================================================================
// Synthesis Laws
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The same calls in any order give the same messages.
    #[test]
    fn synthesis_ignores_input_order(calls in arb_trace()) {
        let mut reversed = calls.clone();
        reversed.reverse();
        prop_assert_eq!(synthesize(&calls), synthesize(&reversed));
    }

    /// Every call yields a start message and, once ended, exactly one return,
    /// except synchronous self-calls which yield nothing.
    #[test]
    fn every_call_is_paired(calls in arb_trace()) {
        let messages = synthesize(&calls);
        for call in &calls {
            let own: Vec<&Message> = messages.iter().filter(|m| m.call_id == call.call_id).collect();
            let expected = if call.is_self_call() && is_synchronous(call) {
                0
            } else if call.outcome.is_pending() {
                1
            } else {
                2
            };
            prop_assert_eq!(own.len(), expected, "call {}", call.call_id);
            if expected > 0 {
                prop_assert!(!own[0].arrow.is_return());
            }
            if expected == 2 {
                prop_assert!(own[1].arrow.is_return());
                prop_assert_eq!(&own[1].from, &call.target);
                prop_assert_eq!(&own[1].to, &call.source);
            }
        }
    }

    /// Pending calls never get a return and last forever.
    #[test]
    fn pending_calls_stay_open(calls in arb_trace()) {
        let messages = synthesize(&calls);
        for call in calls.iter().filter(|c| c.outcome.is_pending()) {
            let message = messages.iter().find(|m| m.call_id == call.call_id);
            prop_assert!(message.is_some());
            let message = message.unwrap();
            prop_assert!(message.duration.is_infinite());
            prop_assert!(!message.arrow.is_return());
        }
    }

    /// Calls are synchronous exactly when nothing happened between start and end.
    #[test]
    fn arrows_follow_adjacency(calls in arb_trace()) {
        let messages = synthesize(&calls);
        for message in &messages {
            let call = calls.iter().find(|c| c.call_id == message.call_id).unwrap();
            let expected = match (message.arrow.is_return(), call.is_self_call(), is_synchronous(call)) {
                (false, true, _) => ArrowKind::SelfCall,
                (false, false, true) => ArrowKind::SyncCall,
                (false, false, false) => ArrowKind::AsyncOpen,
                (true, _, true) => ArrowKind::SyncReturn,
                (true, _, false) => ArrowKind::AsyncClose,
            };
            prop_assert_eq!(message.arrow, expected);
        }
    }

    /// Messages come out in call order.
    #[test]
    fn messages_are_ordered(calls in arb_trace()) {
        let messages = synthesize(&calls);
        for pair in messages.windows(2) {
            prop_assert!(pair[0].sequence_key <= pair[1].sequence_key);
        }
    }
}

// ============================================================================
// Participant Laws
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Each actor appears once, under its own system.
    #[test]
    fn actors_registered_once(calls in arb_trace()) {
        let participants = extract_participants(&calls);
        let mut seen = HashSet::new();
        for (_, category, actors) in participants.iter() {
            for actor in actors {
                prop_assert_eq!(actor.system.as_str(), category);
                prop_assert!(seen.insert(actor.clone()));
            }
        }
        let expected: HashSet<Container> = calls
            .iter()
            .flat_map(|c| [c.source.clone(), c.target.clone()])
            .collect();
        prop_assert_eq!(seen, expected);
    }

    /// Categories are ordered by first appearance in time.
    #[test]
    fn categories_follow_first_appearance(calls in arb_trace()) {
        let participants = extract_participants(&calls);
        let mut order: Vec<String> = Vec::new();
        for call in &calls {
            for actor in [&call.source, &call.target] {
                if !order.contains(&actor.system) {
                    order.push(actor.system.clone());
                }
            }
        }
        prop_assert_eq!(participants.categories(), order.as_slice());
    }
}
