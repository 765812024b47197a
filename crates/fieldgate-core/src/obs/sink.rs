//! Metrics sink boundary.
//!
//! Engine logic never touches `obs::metrics` directly. All instrumentation
//! flows through `MetricsEvent` and `MetricsSink`.
use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// DslKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DslKind {
    Filter,
    Update,
}

impl DslKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Update => "update",
        }
    }
}

///
/// RejectStage
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RejectStage {
    Parse,
    Compile,
}

///
/// AccessKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessKind {
    Read,
    Update,
    Delete,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExpressionParsed { dsl: DslKind, leaves: u64 },
    ExpressionRejected { dsl: DslKind, stage: RejectStage },
    SchemaRejected { dsl: DslKind },
    AccessPredicateBuilt { access: AccessKind },
    ProtectedFieldRejected,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExpressionParsed { dsl, leaves } => metrics::record_parsed(dsl, leaves),
            MetricsEvent::ExpressionRejected { dsl, stage } => metrics::record_rejected(dsl, stage),
            MetricsEvent::SchemaRejected { dsl } => metrics::record_schema_rejected(dsl),
            MetricsEvent::AccessPredicateBuilt { access } => metrics::record_access(access),
            MetricsEvent::ProtectedFieldRejected => metrics::record_protected_rejected(),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let installed = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match installed {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's counters.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<i64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all counters on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit, including unwinding.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CaptureSink(RefCell<Vec<MetricsEvent>>);

    impl MetricsSink for CaptureSink {
        fn record(&self, event: MetricsEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    #[test]
    fn global_sink_counts_events() {
        metrics_reset_all();
        record(MetricsEvent::ExpressionParsed {
            dsl: DslKind::Filter,
            leaves: 3,
        });
        record(MetricsEvent::ExpressionRejected {
            dsl: DslKind::Update,
            stage: RejectStage::Parse,
        });
        record(MetricsEvent::AccessPredicateBuilt {
            access: AccessKind::Delete,
        });
        record(MetricsEvent::ProtectedFieldRejected);

        let counters = metrics_report(None).counters.expect("counters");
        assert_eq!(counters.filter.parsed, 1);
        assert_eq!(counters.filter.leaves, 3);
        assert_eq!(counters.update.parse_rejections, 1);
        assert_eq!(counters.access.delete_predicates, 1);
        assert_eq!(counters.access.protected_rejections, 1);
    }

    #[test]
    fn override_captures_and_restores() {
        metrics_reset_all();
        let capture = Rc::new(CaptureSink::default());

        with_metrics_sink(capture.clone(), || {
            record(MetricsEvent::SchemaRejected {
                dsl: DslKind::Filter,
            });
        });
        record(MetricsEvent::SchemaRejected {
            dsl: DslKind::Filter,
        });

        assert_eq!(
            capture.0.borrow().as_slice(),
            &[MetricsEvent::SchemaRejected {
                dsl: DslKind::Filter
            }]
        );
        let counters = metrics_report(None).counters.expect("counters");
        assert_eq!(counters.filter.schema_rejections, 1);
    }

    #[test]
    fn window_filter_excludes_older_state() {
        metrics_reset_all();
        let report = metrics_report(Some(i64::MAX));
        assert!(report.counters.is_none());
    }
}
