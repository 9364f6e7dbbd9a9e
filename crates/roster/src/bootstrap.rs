#![forbid(unsafe_code)]

//! Startup and shutdown wiring between persistence and the coordinator.

use roster_core::{Expense, Person, Record, RecruitmentPost, Schedule, StoreTag};
use roster_runtime::{Coordinator, CoordinatorConfig, VersionedStore};
use tracing::info;

use crate::error::Result;
use crate::persistence::{CollectionSink, CollectionSource};

/// Build a coordinator holding all four stores, each seeded from `source`.
///
/// Initial collections become snapshot 0 of their store, so the fresh
/// coordinator has nothing to undo.
pub fn coordinator_from<S>(source: &S, config: CoordinatorConfig) -> Result<Coordinator>
where
    S: CollectionSource<Person>
        + CollectionSource<Schedule>
        + CollectionSource<Expense>
        + CollectionSource<RecruitmentPost>,
{
    let mut coordinator = Coordinator::new(config);
    load::<Person, S>(&mut coordinator, source, StoreTag::Records)?;
    load::<Schedule, S>(&mut coordinator, source, StoreTag::Schedules)?;
    load::<Expense, S>(&mut coordinator, source, StoreTag::Expenses)?;
    load::<RecruitmentPost, S>(&mut coordinator, source, StoreTag::RecruitmentPosts)?;
    info!(stores = %coordinator.registered(), "coordinator bootstrapped");
    Ok(coordinator)
}

fn load<T, S>(coordinator: &mut Coordinator, source: &S, tag: StoreTag) -> Result<()>
where
    T: Record,
    S: CollectionSource<T>,
{
    let records = source.load_initial(tag)?;
    coordinator.register(VersionedStore::new(tag, records))?;
    Ok(())
}

/// Hand every registered store's live collection to `sink`.
pub fn save_all<S>(coordinator: &Coordinator, sink: &mut S) -> Result<()>
where
    S: CollectionSink<Person>
        + CollectionSink<Schedule>
        + CollectionSink<Expense>
        + CollectionSink<RecruitmentPost>,
{
    let registered = coordinator.registered();
    if registered.has(StoreTag::Records) {
        save::<Person, S>(coordinator, sink, StoreTag::Records)?;
    }
    if registered.has(StoreTag::Schedules) {
        save::<Schedule, S>(coordinator, sink, StoreTag::Schedules)?;
    }
    if registered.has(StoreTag::Expenses) {
        save::<Expense, S>(coordinator, sink, StoreTag::Expenses)?;
    }
    if registered.has(StoreTag::RecruitmentPosts) {
        save::<RecruitmentPost, S>(coordinator, sink, StoreTag::RecruitmentPosts)?;
    }
    Ok(())
}

fn save<T, S>(coordinator: &Coordinator, sink: &mut S, tag: StoreTag) -> Result<()>
where
    T: Record,
    S: CollectionSink<T>,
{
    let records = coordinator.full_snapshot::<T>(tag)?;
    sink.save(tag, &records)?;
    Ok(())
}
