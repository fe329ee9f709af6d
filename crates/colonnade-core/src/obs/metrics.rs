use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for engine operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Operation entrypoints
    pub persist_calls: u64,
    pub remove_calls: u64,
    pub load_calls: u64,

    // Mutation traffic
    pub mutations_applied: u64,
    pub mutations_flushed: u64,
    pub batches_flushed: u64,

    // Tombstones by shape
    pub row_tombstones: u64,
    pub range_tombstones: u64,
    pub counter_tombstones: u64,

    // Cascades walked during persist
    pub cascade_hops: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub persist_calls: u64,
    pub remove_calls: u64,
    pub load_calls: u64,
}

///
/// EventReport
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

thread_local! {
    static STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

pub(crate) fn with_state_mut<T>(f: impl FnOnce(&mut EventState) -> T) -> T {
    STATE.with(|cell| f(&mut cell.borrow_mut()))
}

pub(crate) fn report() -> EventReport {
    STATE.with(|cell| {
        let state = cell.borrow();
        EventReport {
            ops: state.ops.clone(),
            entities: state.entities.clone(),
        }
    })
}

pub(crate) fn reset_all() {
    STATE.with(|cell| {
        *cell.borrow_mut() = EventState::default();
    });
}
