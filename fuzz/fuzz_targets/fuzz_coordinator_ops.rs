#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use roster_core::{Expense, Person, StoreTag, TagSet};
use roster_runtime::{Coordinator, CoordinatorConfig, CoordinatorError, Mutation, VersionedStore};

#[derive(Debug, Arbitrary)]
enum Op {
    AddPerson(u8),
    DeletePerson(u8),
    AddExpense(u8, u16),
    ClearExpenses,
    Commit { records: bool, expenses: bool, chained: bool },
    Discard,
    Undo(u8),
    Redo(u8),
    UndoAction,
    RedoAction,
}

#[derive(Debug, Arbitrary)]
struct Input {
    max_entries: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let max = usize::from(input.max_entries % 16).max(1);
    let Ok(mut c) = Coordinator::new(CoordinatorConfig::new(max))
        .with_store(VersionedStore::<Person>::empty(StoreTag::Records))
        .and_then(|c| c.with_store(VersionedStore::<Expense>::empty(StoreTag::Expenses)))
    else {
        return;
    };

    for op in input.ops.into_iter().take(256) {
        apply(&mut c, op);
        check(&c, max);
    }
});

fn apply(c: &mut Coordinator, op: Op) {
    match op {
        Op::AddPerson(n) => {
            let _ = c.mutate(StoreTag::Records, Mutation::Add(Person::new(format!("p{n}"))));
        }
        Op::DeletePerson(n) => {
            let _ = c.mutate(StoreTag::Records, Mutation::Delete(Person::new(format!("p{n}"))));
        }
        Op::AddExpense(n, cents) => {
            let expense = Expense::new(format!("p{n}"), i64::from(cents), "2024-01-01", "fuzz");
            let _ = c.mutate(StoreTag::Expenses, Mutation::Add(expense));
        }
        Op::ClearExpenses => {
            let _ = c.mutate::<Expense>(StoreTag::Expenses, Mutation::ResetAll(Vec::new()));
        }
        Op::Commit {
            records,
            expenses,
            chained,
        } => {
            let mut tags = TagSet::empty();
            if records {
                tags |= TagSet::RECORDS;
            }
            if expenses {
                tags |= TagSet::EXPENSES;
            }
            let result = if chained {
                c.commit_chained(tags)
            } else {
                c.commit(tags)
            };
            assert!(result.is_ok(), "commit of registered stores failed");
        }
        Op::Discard => c.discard_uncommitted(TagSet::all()),
        Op::Undo(n) => expect_stepped(c.undo_last_action(usize::from(n % 8))),
        Op::Redo(n) => expect_stepped(c.redo_last_action(usize::from(n % 8))),
        Op::UndoAction => expect_stepped(c.undo_action()),
        Op::RedoAction => expect_stepped(c.redo_action()),
    }
}

fn expect_stepped<T>(result: Result<T, CoordinatorError>) {
    if let Err(err) = result {
        assert!(
            !matches!(err, CoordinatorError::HistoryDesynchronized { .. }),
            "stores fell out of step with the log: {err}"
        );
    }
}

/// Every store must hold at least as many steps as the log attributes to it.
fn check(c: &Coordinator, max: usize) {
    assert!(c.undoable_entries() <= max, "log exceeded its bound");
    let mut undo = [0usize; 2];
    let mut redo = [0usize; 2];
    for entry in c.log().undo_entries() {
        count(entry.tags, &mut undo);
    }
    for entry in c.log().redo_entries() {
        count(entry.tags, &mut redo);
    }
    let records = c.store::<Person>(StoreTag::Records).map(|s| (s.undo_depth(), s.redo_depth()));
    let expenses = c.store::<Expense>(StoreTag::Expenses).map(|s| (s.undo_depth(), s.redo_depth()));
    if let (Ok(records), Ok(expenses)) = (records, expenses) {
        assert!(records.0 >= undo[0] && records.1 >= redo[0]);
        assert!(expenses.0 >= undo[1] && expenses.1 >= redo[1]);
    }
}

fn count(tags: TagSet, totals: &mut [usize; 2]) {
    if tags.contains(TagSet::RECORDS) {
        totals[0] += 1;
    }
    if tags.contains(TagSet::EXPENSES) {
        totals[1] += 1;
    }
}
