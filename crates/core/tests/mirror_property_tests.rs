//! Property-based integration tests for the mirror history, completion
//! arithmetic and the reconnect schedule.
//!
//! These tests use the `proptest` crate for random test case generation.

use std::time::Duration;

use orderwatch_core::job_orders::{checked_progress, percent_completion, JobOrderError};
use orderwatch_core::mirror::{ChangeEvent, ChangeOperation, MirrorHistory, ReconnectPolicy};
use proptest::prelude::*;
use serde_json::{json, Map};

// =============================================================================
// Generators
// =============================================================================

fn arb_operation() -> impl Strategy<Value = ChangeOperation> {
    prop_oneof![
        Just(ChangeOperation::Create),
        Just(ChangeOperation::Update),
        Just(ChangeOperation::Delete),
        Just(ChangeOperation::Read),
        Just(ChangeOperation::Unknown),
    ]
}

fn numbered(operation: ChangeOperation, seq: usize) -> ChangeEvent {
    let mut payload = Map::new();
    payload.insert("seq".to_string(), json!(seq));
    ChangeEvent::new(operation, payload)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// The history never exceeds its capacity and always holds exactly the
    /// most recent events, oldest first.
    #[test]
    fn history_keeps_the_last_n_in_order(
        capacity in 1usize..20,
        operations in prop::collection::vec(arb_operation(), 0..60),
    ) {
        let mut history = MirrorHistory::new(capacity);
        for (seq, op) in operations.iter().enumerate() {
            history.push(numbered(*op, seq));
            prop_assert!(history.len() <= capacity);
        }

        let kept: Vec<u64> = history
            .iter()
            .map(|e| e.payload["seq"].as_u64().unwrap())
            .collect();
        let start = operations.len().saturating_sub(capacity) as u64;
        let expected: Vec<u64> = (start..operations.len() as u64).collect();
        prop_assert_eq!(kept, expected);
    }

    /// Valid progress yields a percentage in [0, 100] within rounding of the
    /// exact ratio.
    #[test]
    fn valid_progress_is_a_bounded_percentage(
        (desired, current) in (1i32..100_000).prop_flat_map(|d| (Just(d), 0..=d)),
    ) {
        let percent = checked_progress("JO-P", current, desired).unwrap();
        prop_assert!((0.0..=100.0).contains(&percent));
        let exact = f64::from(current) * 100.0 / f64::from(desired);
        prop_assert!((percent - exact).abs() <= 0.005 + 1e-9);
        prop_assert_eq!(percent, percent_completion(current, desired));
    }

    /// Quantities outside [0, desired] are rejected.
    #[test]
    fn out_of_range_progress_is_rejected(
        desired in 0i32..1_000,
        over in 1i32..1_000,
    ) {
        let too_high = checked_progress("JO-P", desired + over, desired);
        let is_invalid_quantity =
            matches!(too_high, Err(JobOrderError::InvalidQuantity { .. }));
        prop_assert!(is_invalid_quantity);
        prop_assert!(checked_progress("JO-P", -over, desired).is_err());
    }

    /// Reconnect delays never shrink and never exceed the cap.
    #[test]
    fn reconnect_delays_grow_up_to_the_cap(
        initial_ms in 1u64..5_000,
        max_ms in 1u64..120_000,
        attempts in 1u32..64,
    ) {
        let policy = ReconnectPolicy::new(
            Duration::from_millis(initial_ms),
            Duration::from_millis(max_ms),
            None,
        );
        let mut previous = Duration::ZERO;
        for attempt in 0..attempts {
            let delay = policy.delay_for(attempt);
            prop_assert!(delay >= previous);
            prop_assert!(delay <= policy.max_delay);
            previous = delay;
        }
        prop_assert!(!policy.exhausted(attempts));
    }
}
