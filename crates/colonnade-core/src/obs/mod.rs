//! Observability: in-process operation counters and the sink boundary.
//!
//! This module never reads engine state directly; everything flows in
//! through [`sink::MetricsEvent`].

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::{EntityCounters, EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, OpKind, TombstoneKind, metrics_report, metrics_reset_all};
