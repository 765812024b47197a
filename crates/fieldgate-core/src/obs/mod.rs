//! Observability: per-thread counters and the sink abstraction that feeds them.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{AccessCounters, DslCounters, EventReport, EventState};
pub use sink::{
    AccessKind, DslKind, MetricsEvent, MetricsSink, RejectStage, metrics_report,
    metrics_reset_all, with_metrics_sink,
};
