//! Metrics sink boundary.
//!
//! Engine logic never touches `obs::metrics` directly; all instrumentation
//! flows through [`MetricsEvent`] and [`MetricsSink`].

use crate::obs::metrics;

///
/// OpKind
///

#[derive(Clone, Copy, Debug)]
pub enum OpKind {
    Persist,
    Remove,
    Load,
}

///
/// TombstoneKind
///

#[derive(Clone, Copy, Debug)]
pub enum TombstoneKind {
    Row,
    Range,
    CounterRow,
}

///
/// MetricsEvent
///

#[derive(Clone, Debug)]
pub enum MetricsEvent {
    OpStart {
        kind: OpKind,
        entity: String,
    },
    MutationsApplied {
        count: u64,
    },
    BatchFlushed {
        mutations: u64,
    },
    Tombstone {
        kind: TombstoneKind,
        count: u64,
    },
    CascadeHop,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into thread-local metrics state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::OpStart { kind, entity } => {
                metrics::with_state_mut(|m| {
                    match kind {
                        OpKind::Persist => {
                            m.ops.persist_calls = m.ops.persist_calls.saturating_add(1);
                        }
                        OpKind::Remove => {
                            m.ops.remove_calls = m.ops.remove_calls.saturating_add(1);
                        }
                        OpKind::Load => m.ops.load_calls = m.ops.load_calls.saturating_add(1),
                    }

                    let entry = m.entities.entry(entity.clone()).or_default();
                    match kind {
                        OpKind::Persist => {
                            entry.persist_calls = entry.persist_calls.saturating_add(1);
                        }
                        OpKind::Remove => {
                            entry.remove_calls = entry.remove_calls.saturating_add(1);
                        }
                        OpKind::Load => entry.load_calls = entry.load_calls.saturating_add(1),
                    }
                });
            }

            MetricsEvent::MutationsApplied { count } => {
                metrics::with_state_mut(|m| {
                    m.ops.mutations_applied = m.ops.mutations_applied.saturating_add(count);
                });
            }

            MetricsEvent::BatchFlushed { mutations } => {
                metrics::with_state_mut(|m| {
                    m.ops.batches_flushed = m.ops.batches_flushed.saturating_add(1);
                    m.ops.mutations_flushed = m.ops.mutations_flushed.saturating_add(mutations);
                });
            }

            MetricsEvent::Tombstone { kind, count } => {
                metrics::with_state_mut(|m| match kind {
                    TombstoneKind::Row => {
                        m.ops.row_tombstones = m.ops.row_tombstones.saturating_add(count);
                    }
                    TombstoneKind::Range => {
                        m.ops.range_tombstones = m.ops.range_tombstones.saturating_add(count);
                    }
                    TombstoneKind::CounterRow => {
                        m.ops.counter_tombstones = m.ops.counter_tombstones.saturating_add(count);
                    }
                });
            }

            MetricsEvent::CascadeHop => {
                metrics::with_state_mut(|m| {
                    m.ops.cascade_hops = m.ops.cascade_hops.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    GLOBAL_METRICS_SINK.record(event);
}

/// Snapshot the current metrics state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

///
/// TESTS
///
