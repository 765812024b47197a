use crate::obs::sink::{AccessKind, DslKind, RejectStage};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// Metrics
/// Ephemeral, in-memory counters for parse, validation and access-building.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub filter: DslCounters,
    pub update: DslCounters,
    pub access: AccessCounters,
    pub since_ms: i64,
}

impl EventState {
    pub(crate) const fn dsl_mut(&mut self, dsl: DslKind) -> &mut DslCounters {
        match dsl {
            DslKind::Filter => &mut self.filter,
            DslKind::Update => &mut self.update,
        }
    }
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            filter: DslCounters::default(),
            update: DslCounters::default(),
            access: AccessCounters::default(),
            since_ms: Utc::now().timestamp_millis(),
        }
    }
}

///
/// DslCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DslCounters {
    // Accepted sources
    pub parsed: u64,
    pub leaves: u64,

    // Rejections by stage
    pub parse_rejections: u64,
    pub compile_rejections: u64,
    pub schema_rejections: u64,
}

///
/// AccessCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AccessCounters {
    pub read_predicates: u64,
    pub update_predicates: u64,
    pub delete_predicates: u64,
    pub protected_rejections: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn record_parsed(dsl: DslKind, leaves: u64) {
    with_state_mut(|m| {
        let c = m.dsl_mut(dsl);
        c.parsed = c.parsed.saturating_add(1);
        c.leaves = c.leaves.saturating_add(leaves);
    });
}

pub(crate) fn record_rejected(dsl: DslKind, stage: RejectStage) {
    with_state_mut(|m| {
        let c = m.dsl_mut(dsl);
        match stage {
            RejectStage::Parse => c.parse_rejections = c.parse_rejections.saturating_add(1),
            RejectStage::Compile => {
                c.compile_rejections = c.compile_rejections.saturating_add(1);
            }
        }
    });
}

pub(crate) fn record_schema_rejected(dsl: DslKind) {
    with_state_mut(|m| {
        let c = m.dsl_mut(dsl);
        c.schema_rejections = c.schema_rejections.saturating_add(1);
    });
}

pub(crate) fn record_access(access: AccessKind) {
    with_state_mut(|m| {
        let a = &mut m.access;
        match access {
            AccessKind::Read => a.read_predicates = a.read_predicates.saturating_add(1),
            AccessKind::Update => a.update_predicates = a.update_predicates.saturating_add(1),
            AccessKind::Delete => a.delete_predicates = a.delete_predicates.saturating_add(1),
        }
    });
}

pub(crate) fn record_protected_rejected() {
    with_state_mut(|m| {
        m.access.protected_rejections = m.access.protected_rejections.saturating_add(1);
    });
}

///
/// EventReport
/// Point-in-time copy of the counters for the current thread.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Counters since `since_ms`; `None` when the window filter excluded them.
    pub counters: Option<EventState>,
}

/// Snapshot the counters, optionally only when the window started at or
/// after `window_start_ms`.
pub(crate) fn report_window_start(window_start_ms: Option<i64>) -> EventReport {
    let snapshot = with_state(Clone::clone);
    let counters = match window_start_ms {
        Some(start) if snapshot.since_ms < start => None,
        _ => Some(snapshot),
    };

    EventReport { counters }
}
