//! Propagation path records.

use fpa_common::model::{ConnectionId, NodeId, PointId};

// ─── PathEnd ────────────────────────────────────────────────────────

/// Resolved endpoint of a path: a node and one of its declared points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathEnd {
    pub node: NodeId,
    pub point: PointId,
}

impl PathEnd {
    pub const fn new(node: NodeId, point: PointId) -> Self {
        Self { node, point }
    }

    /// Identity match on both node and point.
    #[inline]
    pub fn matches(&self, node: NodeId, point: PointId) -> bool {
        self.node == node && self.point == point
    }
}

/// Absent ends never match anything.
#[inline]
pub(crate) fn end_matches(end: Option<PathEnd>, node: NodeId, point: PointId) -> bool {
    end.is_some_and(|e| e.matches(node, point))
}

// ─── PropagationPath ────────────────────────────────────────────────

/// Derived link from a source point to a destination point.
///
/// Either end may be absent when no propagation point was found on that
/// side of a connection. Paths synthesized from bindings carry no
/// connection and are never bidirectional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropagationPath {
    pub source: Option<PathEnd>,
    pub destination: Option<PathEnd>,
    pub connection: Option<ConnectionId>,
    /// Copied from the originating connection.
    pub bidirectional: bool,
}

impl PropagationPath {
    /// Path derived from a connection instance.
    pub fn from_connection(
        connection: ConnectionId,
        bidirectional: bool,
        source: Option<PathEnd>,
        destination: Option<PathEnd>,
    ) -> Self {
        Self {
            source,
            destination,
            connection: Some(connection),
            bidirectional,
        }
    }

    /// Path synthesized from a binding between a platform and a hosted node.
    pub fn from_binding(source: PathEnd, destination: PathEnd) -> Self {
        Self {
            source: Some(source),
            destination: Some(destination),
            connection: None,
            bidirectional: false,
        }
    }

    /// True for binding-synthesized paths.
    #[inline]
    pub fn is_synthesized(&self) -> bool {
        self.connection.is_none()
    }

    /// True when both ends were resolved.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.source.is_some() && self.destination.is_some()
    }
}
