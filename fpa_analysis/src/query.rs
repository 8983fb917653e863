//! Path queries.
//!
//! Every query is anchored on a `(node, point)` pair and matches stored path
//! ends by handle identity. Bidirectional paths are also traversed in the
//! reverse orientation; binding-synthesized paths never are.

use core::fmt;
use core::str::FromStr;

use fpa_common::model::{Endpoint, FeatureId, NodeId, PointId};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisModel;
use crate::path::{PathEnd, PropagationPath, end_matches};
use crate::trace::{QueryKind, TraceEvent};

// ─── SourceEndSelection ─────────────────────────────────────────────

/// Which end a backward query reports for a matched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEndSelection {
    /// The end opposite the anchor: source on the primary branch,
    /// destination on the bidirectional branch.
    #[default]
    Opposite,
    /// The destination end on both branches.
    AlwaysDestination,
}

impl fmt::Display for SourceEndSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opposite => write!(f, "opposite"),
            Self::AlwaysDestination => write!(f, "always_destination"),
        }
    }
}

impl FromStr for SourceEndSelection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opposite" => Ok(Self::Opposite),
            "always_destination" => Ok(Self::AlwaysDestination),
            _ => Err(format!(
                "unknown SourceEndSelection: {s:?}, expected \"opposite\" or \"always_destination\""
            )),
        }
    }
}

// ─── Queries ────────────────────────────────────────────────────────

impl AnalysisModel<'_> {
    /// Ends reachable forward from an outgoing point.
    pub fn destination_ends(&self, node: NodeId, point: PointId) -> Vec<PathEnd> {
        self.forward_matches(node, point, QueryKind::DestinationEnds)
            .filter_map(|(path, reversed)| if reversed { path.source } else { path.destination })
            .collect()
    }

    /// Paths leaving an outgoing point, in either orientation.
    pub fn propagation_paths(&self, node: NodeId, point: PointId) -> Vec<PropagationPath> {
        self.forward_matches(node, point, QueryKind::PropagationPaths)
            .map(|(path, _)| *path)
            .collect()
    }

    /// Ends that feed an incoming point, using [`SourceEndSelection::Opposite`].
    pub fn source_ends(&self, node: NodeId, point: PointId) -> Vec<PathEnd> {
        self.source_ends_with(node, point, SourceEndSelection::Opposite)
    }

    /// Ends that feed an incoming point under an explicit selection rule.
    pub fn source_ends_with(
        &self,
        node: NodeId,
        point: PointId,
        selection: SourceEndSelection,
    ) -> Vec<PathEnd> {
        self.backward_matches(node, point, QueryKind::SourceEnds)
            .filter_map(|(path, reversed)| match (selection, reversed) {
                (SourceEndSelection::Opposite, false) => path.source,
                (SourceEndSelection::Opposite, true) => path.destination,
                (SourceEndSelection::AlwaysDestination, _) => path.destination,
            })
            .collect()
    }

    /// Paths arriving at an incoming point, in either orientation.
    pub fn reverse_propagation_paths(&self, node: NodeId, point: PointId) -> Vec<PropagationPath> {
        self.backward_matches(node, point, QueryKind::ReversePropagationPaths)
            .map(|(path, _)| *path)
            .collect()
    }

    /// Endpoints reached from a raw connection endpoint.
    ///
    /// Matches on the declared feature behind `endpoint`, so every instance
    /// of the same classifier feature shares the result. Destinations on a
    /// component-level access point come back as the whole component;
    /// feature-level destinations come back as the destination node's own
    /// feature instance.
    pub fn connection_destinations(&self, endpoint: Endpoint) -> Vec<Endpoint> {
        let Some(identity) = self.declared_feature(endpoint) else {
            return Vec::new();
        };
        let owner = self.model.owner_of(endpoint);
        let mut out = Vec::new();

        for path in &self.paths {
            if let (Some(src), Some(dst)) = (path.source, path.destination) {
                if self.point_feature(src.point) == Some(identity) {
                    self.push_endpoint(&mut out, dst, PathEnd::new(owner, src.point), path);
                }
                if path.bidirectional && self.point_feature(dst.point) == Some(identity) {
                    self.push_endpoint(&mut out, src, PathEnd::new(owner, dst.point), path);
                }
            }
        }
        out
    }

    // ── Matching ──

    /// Paths matching a forward anchor. `true` marks the reverse orientation.
    fn forward_matches(
        &self,
        node: NodeId,
        point: PointId,
        query: QueryKind,
    ) -> impl Iterator<Item = (&PropagationPath, bool)> + '_ {
        self.paths
            .iter()
            .flat_map(move |path| {
                let primary = end_matches(path.source, node, point).then_some((path, false));
                let reverse = (path.bidirectional && end_matches(path.destination, node, point))
                    .then_some((path, true));
                primary.into_iter().chain(reverse)
            })
            .inspect(move |(path, _)| self.report(query, node, point, path))
    }

    /// Paths matching a backward anchor. `true` marks the reverse orientation.
    fn backward_matches(
        &self,
        node: NodeId,
        point: PointId,
        query: QueryKind,
    ) -> impl Iterator<Item = (&PropagationPath, bool)> + '_ {
        self.paths
            .iter()
            .flat_map(move |path| {
                let primary = end_matches(path.destination, node, point).then_some((path, false));
                let reverse = (path.bidirectional && end_matches(path.source, node, point))
                    .then_some((path, true));
                primary.into_iter().chain(reverse)
            })
            .inspect(move |(path, _)| self.report(query, node, point, path))
    }

    fn report(&self, query: QueryKind, node: NodeId, point: PointId, path: &PropagationPath) {
        self.sink.record(&TraceEvent::QueryMatched {
            query,
            node,
            point,
            path: *path,
        });
    }

    // ── Endpoint identity ──

    /// Declared feature behind a raw endpoint. A whole-component endpoint
    /// stands for its subcomponent declaration, which no propagation point
    /// is ever tied to.
    fn declared_feature(&self, endpoint: Endpoint) -> Option<FeatureId> {
        match endpoint {
            Endpoint::Feature(fi) => Some(self.model.feature_instance(fi).feature),
            Endpoint::Component(_) => None,
        }
    }

    fn point_feature(&self, point: PointId) -> Option<FeatureId> {
        self.model.point(point).feature
    }

    /// Push the endpoint behind `end`, reporting the match against the
    /// anchor's own `(node, point)` pair.
    fn push_endpoint(
        &self,
        out: &mut Vec<Endpoint>,
        end: PathEnd,
        anchor: PathEnd,
        path: &PropagationPath,
    ) {
        let endpoint = match self.model.point(end.point).feature {
            None => Some(Endpoint::Component(end.node)),
            Some(feature) => self
                .model
                .find_feature_instance(end.node, feature)
                .map(Endpoint::Feature),
        };
        if let Some(endpoint) = endpoint {
            self.report(QueryKind::ConnectionDestinations, anchor.node, anchor.point, path);
            out.push(endpoint);
        }
    }
}
