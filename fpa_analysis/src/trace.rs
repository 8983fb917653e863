//! Diagnostic hook for analysis construction and queries.
//!
//! The analysis reports what it does through an injected [`TraceSink`].
//! Nothing in the derivation depends on the sink; swapping it never changes
//! results.

use std::sync::Mutex;

use fpa_common::model::{NodeId, PointId};
use tracing::{debug, trace};

use crate::binding::BindingStep;
use crate::path::PropagationPath;
use crate::populate::PopulationPolicy;

/// Which query produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    DestinationEnds,
    PropagationPaths,
    SourceEnds,
    ReversePropagationPaths,
    ConnectionDestinations,
}

/// Event reported to a [`TraceSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// One record derived from a connection instance.
    PathPopulated {
        path: PropagationPath,
        policy: PopulationPolicy,
    },
    /// A binding step expanded into `paths` records.
    BindingSynthesized { step: BindingStep, paths: usize },
    /// A node joined the registry.
    NodeRegistered { node: NodeId },
    /// A stored path matched a query anchor.
    QueryMatched {
        query: QueryKind,
        node: NodeId,
        point: PointId,
        path: PropagationPath,
    },
}

/// Observer of analysis events.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: &TraceEvent);
}

// ─── Sinks ──────────────────────────────────────────────────────────

/// Forwards events to `tracing` (construction at DEBUG, queries at TRACE).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: &TraceEvent) {
        match event {
            TraceEvent::PathPopulated { path, policy } => debug!(
                connection = ?path.connection,
                source = ?path.source,
                destination = ?path.destination,
                %policy,
                "path populated"
            ),
            TraceEvent::BindingSynthesized { step, paths } => debug!(
                platform = %step.platform,
                hosted = %step.hosted,
                paths,
                "binding synthesized"
            ),
            TraceEvent::NodeRegistered { node } => trace!(%node, "node registered"),
            TraceEvent::QueryMatched {
                query,
                node,
                point,
                path,
            } => trace!(?query, %node, %point, connection = ?path.connection, "query matched"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&self, _event: &TraceEvent) {}
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        match self.events.lock() {
            Ok(events) => events.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TraceSink for RecordingSink {
    fn record(&self, event: &TraceEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(*event),
            Err(poisoned) => poisoned.into_inner().push(*event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpa_common::model::{ComponentCategory, InstanceModelBuilder};

    #[test]
    fn recording_sink_keeps_order() {
        let mut b = InstanceModelBuilder::new();
        let c = b.add_classifier("T", ComponentCategory::System);
        let top = b.add_root("top", c);
        let x = b.add_child(top, "x", c);

        let sink = RecordingSink::new();
        assert!(sink.is_empty());
        sink.record(&TraceEvent::NodeRegistered { node: x });
        sink.record(&TraceEvent::NodeRegistered { node: top });
        assert_eq!(sink.len(), 2);
        assert!(!sink.is_empty());
        assert_eq!(
            sink.events(),
            vec![
                TraceEvent::NodeRegistered { node: x },
                TraceEvent::NodeRegistered { node: top },
            ]
        );
    }

    #[test]
    fn null_and_tracing_sinks_accept_events() {
        let mut b = InstanceModelBuilder::new();
        let c = b.add_classifier("T", ComponentCategory::System);
        let top = b.add_root("top", c);
        let event = TraceEvent::NodeRegistered { node: top };
        NullSink.record(&event);
        TracingSink.record(&event);
    }
}
