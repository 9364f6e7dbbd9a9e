#![forbid(unsafe_code)]

//! Property tests for [`SnapshotHistory`] invariants.
//!
//! Validates:
//! - Undoing n commits then redoing n yields the same snapshots in order.
//! - A commit after undo discards every snapshot past the cursor.
//! - The depth limit is never exceeded and the cursor stays in range.
//! - Random commit/undo/redo sequences agree with a plain Vec model.

use proptest::prelude::*;

use roster_runtime::undo::{HistoryError, SnapshotConfig, SnapshotHistory};

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Commit(i64),
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i64>().prop_map(Op::Commit),
        2 => Just(Op::Undo),
        2 => Just(Op::Redo),
    ]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 1..=max_len)
}

// ============================================================================
// Invariant 1: Round trip
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn undo_all_then_redo_all_replays_commits(
        values in prop::collection::vec(any::<i32>(), 1..40)
    ) {
        let mut history = SnapshotHistory::unbounded(i32::MIN);
        for v in &values {
            history.commit(*v);
        }

        let mut undone = Vec::new();
        for _ in 0..values.len() {
            undone.push(*history.undo().unwrap());
        }
        prop_assert_eq!(history.undo(), Err(HistoryError::NoUndoableState));
        prop_assert_eq!(**history.current(), i32::MIN);

        let mut redone = Vec::new();
        for _ in 0..values.len() {
            redone.push(*history.redo().unwrap());
        }
        prop_assert_eq!(&redone, &values);
        prop_assert_eq!(history.redo(), Err(HistoryError::NoRedoableState));

        // Undo walks back through every earlier snapshot.
        let mut expected: Vec<i32> = values[..values.len() - 1].to_vec();
        expected.reverse();
        expected.push(i32::MIN);
        prop_assert_eq!(undone, expected);
    }
}

// ============================================================================
// Invariant 2: Truncation on branch
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn commit_after_undo_truncates(
        values in prop::collection::vec(any::<i32>(), 2..30),
        undo_count in 1usize..30,
        branch in any::<i32>()
    ) {
        let mut history = SnapshotHistory::unbounded(0);
        for v in &values {
            history.commit(*v);
        }
        let undos = undo_count.min(values.len());
        for _ in 0..undos {
            history.undo().unwrap();
        }
        let position = history.position();

        history.commit(branch);
        prop_assert_eq!(history.len(), position + 2);
        prop_assert_eq!(history.redo_depth(), 0);
        prop_assert_eq!(history.redo(), Err(HistoryError::NoRedoableState));
        prop_assert_eq!(**history.current(), branch);
    }
}

// ============================================================================
// Invariant 3: Depth limit and cursor range
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn depth_and_cursor_stay_in_bounds(
        max_depth in 1usize..20,
        ops in ops_strategy(100)
    ) {
        let mut history = SnapshotHistory::new(0i64, SnapshotConfig::new(max_depth));
        for op in ops {
            match op {
                Op::Commit(v) => history.commit(v),
                Op::Undo => { let _ = history.undo(); }
                Op::Redo => { let _ = history.redo(); }
            }
            prop_assert!(history.len() <= max_depth);
            prop_assert!(history.position() < history.len());
            prop_assert_eq!(
                history.undo_depth() + history.redo_depth() + 1,
                history.len()
            );
        }
    }
}

// ============================================================================
// Invariant 4: Agreement with a Vec model
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn random_sequences_match_model(ops in ops_strategy(120)) {
        let mut history = SnapshotHistory::unbounded(0i64);
        let mut model: Vec<i64> = vec![0];
        let mut cursor = 0usize;

        for op in ops {
            match op {
                Op::Commit(v) => {
                    history.commit(v);
                    model.truncate(cursor + 1);
                    model.push(v);
                    cursor += 1;
                }
                Op::Undo => {
                    let result = history.undo();
                    if cursor == 0 {
                        prop_assert_eq!(result, Err(HistoryError::NoUndoableState));
                    } else {
                        cursor -= 1;
                        prop_assert_eq!(*result.unwrap(), model[cursor]);
                    }
                }
                Op::Redo => {
                    let result = history.redo();
                    if cursor + 1 == model.len() {
                        prop_assert_eq!(result, Err(HistoryError::NoRedoableState));
                    } else {
                        cursor += 1;
                        prop_assert_eq!(*result.unwrap(), model[cursor]);
                    }
                }
            }
            prop_assert_eq!(**history.current(), model[cursor]);
            prop_assert_eq!(history.can_undo(), cursor > 0);
            prop_assert_eq!(history.can_redo(), cursor + 1 < model.len());
        }
    }
}

// ============================================================================
// Structural sharing
// ============================================================================

#[test]
fn im_vector_snapshots_survive_later_edits() {
    let mut live: im::Vector<u64> = (0..10_000).collect();
    let mut history = SnapshotHistory::unbounded(live.clone());

    for i in 0..100 {
        live.set(i, u64::MAX);
        history.commit(live.clone());
    }

    for step in (0..100).rev() {
        let snapshot = history.undo().unwrap();
        assert_eq!(snapshot.len(), 10_000);
        assert_eq!(snapshot[step], step as u64);
    }
}
