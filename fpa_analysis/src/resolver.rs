//! Propagation point resolution.
//!
//! Maps a connection endpoint to the propagation point its owning node
//! declares for it:
//!
//! - `Endpoint::Feature`: the point declared on that feature.
//! - `Endpoint::Component`: the component-level access point.
//!
//! When a classifier declares several matching points, the first in
//! declaration order wins. No match yields `None`, never an error.

use fpa_common::model::{Direction, Endpoint, InstanceModel, NodeId, PointId};

use crate::path::PathEnd;

/// Pure lookup over an instance model.
#[derive(Debug, Clone, Copy)]
pub struct PointResolver<'m> {
    model: &'m InstanceModel,
}

impl<'m> PointResolver<'m> {
    pub fn new(model: &'m InstanceModel) -> Self {
        Self { model }
    }

    /// Outgoing point at `endpoint`.
    #[inline]
    pub fn outgoing(&self, endpoint: Endpoint) -> Option<PathEnd> {
        self.resolve(endpoint, Direction::Out)
    }

    /// Incoming point at `endpoint`.
    #[inline]
    pub fn incoming(&self, endpoint: Endpoint) -> Option<PathEnd> {
        self.resolve(endpoint, Direction::In)
    }

    pub fn resolve(&self, endpoint: Endpoint, direction: Direction) -> Option<PathEnd> {
        let point = match endpoint {
            Endpoint::Feature(fi) => {
                let inst = self.model.feature_instance(fi);
                self.feature_point(inst.node, inst.feature, direction)
            }
            Endpoint::Component(node) => self.access_point(node, direction),
        }?;
        Some(PathEnd::new(self.model.owner_of(endpoint), point))
    }

    fn feature_point(
        &self,
        node: NodeId,
        feature: fpa_common::model::FeatureId,
        direction: Direction,
    ) -> Option<PointId> {
        let classifier = self.model.node(node).classifier;
        self.model
            .points_of(classifier, direction)
            .find(|p| self.model.point(*p).feature == Some(feature))
    }

    fn access_point(&self, node: NodeId, direction: Direction) -> Option<PointId> {
        let classifier = self.model.node(node).classifier;
        self.model
            .points_of(classifier, direction)
            .find(|p| self.model.point(*p).is_access())
    }
}
