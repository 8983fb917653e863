//! Arena-backed component instance graph.
//!
//! The graph is built once (by [`InstanceModelBuilder`] or from a
//! [`ModelConfig`](super::config::ModelConfig)) and is immutable afterward.
//! Every element is addressed by a `Copy` handle; handle equality is
//! identity equality, so two structurally identical propagation points
//! declared on different classifiers never compare equal.

use std::collections::HashMap;
use std::fmt;

use super::category::{ComponentCategory, Direction};
use crate::consts::PATH_SEPARATOR;

// ─── Handles ────────────────────────────────────────────────────────

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Position in the owning arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }
    };
}

handle!(
    /// Component instance.
    NodeId, "node"
);
handle!(
    /// Component classifier (type + implementation).
    ClassifierId, "classifier"
);
handle!(
    /// Feature declared on a classifier.
    FeatureId, "feature"
);
handle!(
    /// Feature instantiated on a node.
    FeatureInstanceId, "feature_instance"
);
handle!(
    /// Declared propagation point.
    PointId, "point"
);
handle!(
    /// Connection instance.
    ConnectionId, "connection"
);

// ─── Declarations ───────────────────────────────────────────────────

/// Component classifier with its declared features and propagation points.
#[derive(Debug, Clone)]
pub struct Classifier {
    pub name: String,
    pub category: ComponentCategory,
    pub features: Vec<FeatureId>,
    pub points: Vec<PointId>,
    /// Whether the classifier carries an error-model annex.
    pub has_error_annex: bool,
}

/// Feature declared on a classifier.
#[derive(Debug, Clone)]
pub struct FeatureDecl {
    pub name: String,
    pub classifier: ClassifierId,
}

/// Declared fault entry or exit.
///
/// `feature == None` marks a component-level access point.
#[derive(Debug, Clone)]
pub struct PropagationPoint {
    pub name: String,
    pub classifier: ClassifierId,
    pub direction: Direction,
    pub feature: Option<FeatureId>,
}

impl PropagationPoint {
    /// True for component-level (access) points.
    #[inline]
    pub fn is_access(&self) -> bool {
        self.feature.is_none()
    }
}

// ─── Instances ──────────────────────────────────────────────────────

/// Component instance.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Dotted path from the root (`top.cpu`).
    pub path: String,
    pub classifier: ClassifierId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub features: Vec<FeatureInstanceId>,
    /// Actual processor binding, in declaration order.
    pub processor_binding: Vec<NodeId>,
}

/// Feature of a node.
#[derive(Debug, Clone, Copy)]
pub struct FeatureInstance {
    pub node: NodeId,
    pub feature: FeatureId,
}

/// Endpoint of a connection reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Port-like feature on a node.
    Feature(FeatureInstanceId),
    /// The node itself (access connection).
    Component(NodeId),
}

/// One point-to-point hop of a connection instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionReference {
    pub source: Endpoint,
    pub destination: Endpoint,
}

/// Realized connection between two instance-level endpoints.
#[derive(Debug, Clone)]
pub struct ConnectionInstance {
    pub name: String,
    /// Node whose containment owns the connection.
    pub owner: NodeId,
    pub bidirectional: bool,
    /// Ordered chain from the outermost source to the final destination.
    pub references: Vec<ConnectionReference>,
}

// ─── InstanceModel ──────────────────────────────────────────────────

/// Immutable component instance graph.
#[derive(Debug, Clone, Default)]
pub struct InstanceModel {
    classifiers: Vec<Classifier>,
    features: Vec<FeatureDecl>,
    points: Vec<PropagationPoint>,
    nodes: Vec<Node>,
    feature_instances: Vec<FeatureInstance>,
    connections: Vec<ConnectionInstance>,
    classifier_index: HashMap<String, ClassifierId>,
    path_index: HashMap<String, NodeId>,
}

impl InstanceModel {
    // ── Element access ──

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn classifier(&self, id: ClassifierId) -> &Classifier {
        &self.classifiers[id.index()]
    }

    pub fn feature(&self, id: FeatureId) -> &FeatureDecl {
        &self.features[id.index()]
    }

    pub fn point(&self, id: PointId) -> &PropagationPoint {
        &self.points[id.index()]
    }

    pub fn feature_instance(&self, id: FeatureInstanceId) -> &FeatureInstance {
        &self.feature_instances[id.index()]
    }

    pub fn connection(&self, id: ConnectionId) -> &ConnectionInstance {
        &self.connections[id.index()]
    }

    /// Classifier of a node.
    pub fn classifier_of(&self, node: NodeId) -> &Classifier {
        self.classifier(self.node(node).classifier)
    }

    /// Category of a node (taken from its classifier).
    pub fn category(&self, node: NodeId) -> ComponentCategory {
        self.classifier_of(node).category
    }

    // ── Counts / iteration ──

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn connection_ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        (0..self.connections.len()).map(ConnectionId::from_index)
    }

    // ── Lookup ──

    /// The single parentless node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.parent.is_none())
            .map(NodeId::from_index)
    }

    pub fn node_by_path(&self, path: &str) -> Option<NodeId> {
        self.path_index.get(path).copied()
    }

    pub fn classifier_by_name(&self, name: &str) -> Option<ClassifierId> {
        self.classifier_index.get(name).copied()
    }

    /// Declared feature of a classifier by name.
    pub fn feature_by_name(&self, classifier: ClassifierId, name: &str) -> Option<FeatureId> {
        self.classifier(classifier)
            .features
            .iter()
            .copied()
            .find(|f| self.feature(*f).name == name)
    }

    /// Instance of a declared feature on a node.
    pub fn find_feature_instance(&self, node: NodeId, feature: FeatureId) -> Option<FeatureInstanceId> {
        self.node(node)
            .features
            .iter()
            .copied()
            .find(|fi| self.feature_instance(*fi).feature == feature)
    }

    /// Node that owns an endpoint.
    pub fn owner_of(&self, endpoint: Endpoint) -> NodeId {
        match endpoint {
            Endpoint::Feature(fi) => self.feature_instance(fi).node,
            Endpoint::Component(node) => node,
        }
    }

    /// Propagation points of a classifier with the given direction, in
    /// declaration order.
    pub fn points_of(
        &self,
        classifier: ClassifierId,
        direction: Direction,
    ) -> impl Iterator<Item = PointId> + '_ {
        self.classifier(classifier)
            .points
            .iter()
            .copied()
            .filter(move |p| self.point(*p).direction == direction)
    }

    pub fn outgoing_points(&self, classifier: ClassifierId) -> impl Iterator<Item = PointId> + '_ {
        self.points_of(classifier, Direction::Out)
    }

    pub fn incoming_points(&self, classifier: ClassifierId) -> impl Iterator<Item = PointId> + '_ {
        self.points_of(classifier, Direction::In)
    }

    /// True if `node` is `ancestor` or lies beneath it.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// All nodes beneath `root` in pre-order. `root` itself is excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    /// Connections owned by `root` or any node beneath it, in declaration order.
    pub fn connections_under(&self, root: NodeId) -> Vec<ConnectionId> {
        self.connection_ids()
            .filter(|c| self.is_within(self.connection(*c).owner, root))
            .collect()
    }

    // ── Display helpers ──

    /// `path.feature` for features, `path` for components.
    pub fn describe_endpoint(&self, endpoint: Endpoint) -> String {
        match endpoint {
            Endpoint::Feature(fi) => {
                let inst = self.feature_instance(fi);
                format!(
                    "{}{}{}",
                    self.node(inst.node).path,
                    PATH_SEPARATOR,
                    self.feature(inst.feature).name
                )
            }
            Endpoint::Component(node) => self.node(node).path.clone(),
        }
    }

}

// ─── InstanceModelBuilder ───────────────────────────────────────────

/// Programmatic construction of an [`InstanceModel`].
///
/// Classifiers must be complete (features declared) before they are
/// instantiated: feature instances are created when a node is added.
#[derive(Debug, Default)]
pub struct InstanceModelBuilder {
    model: InstanceModel,
}

impl InstanceModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a classifier. Re-declaring a name returns the existing handle.
    pub fn add_classifier(&mut self, name: &str, category: ComponentCategory) -> ClassifierId {
        if let Some(id) = self.model.classifier_index.get(name) {
            return *id;
        }
        let id = ClassifierId::from_index(self.model.classifiers.len());
        self.model.classifiers.push(Classifier {
            name: name.to_string(),
            category,
            features: Vec::new(),
            points: Vec::new(),
            has_error_annex: false,
        });
        self.model.classifier_index.insert(name.to_string(), id);
        id
    }

    /// Declare a feature on a classifier.
    pub fn add_feature(&mut self, classifier: ClassifierId, name: &str) -> FeatureId {
        let id = FeatureId::from_index(self.model.features.len());
        self.model.features.push(FeatureDecl {
            name: name.to_string(),
            classifier,
        });
        self.model.classifiers[classifier.index()].features.push(id);
        id
    }

    /// Declare a propagation point. Marks the classifier as annexed.
    pub fn add_point(
        &mut self,
        classifier: ClassifierId,
        name: &str,
        direction: Direction,
        feature: Option<FeatureId>,
    ) -> PointId {
        let id = PointId::from_index(self.model.points.len());
        self.model.points.push(PropagationPoint {
            name: name.to_string(),
            classifier,
            direction,
            feature,
        });
        let decl = &mut self.model.classifiers[classifier.index()];
        decl.points.push(id);
        decl.has_error_annex = true;
        id
    }

    /// Override the error-annex flag of a classifier.
    pub fn set_error_annex(&mut self, classifier: ClassifierId, present: bool) {
        self.model.classifiers[classifier.index()].has_error_annex = present;
    }

    /// Add the parentless root node.
    pub fn add_root(&mut self, name: &str, classifier: ClassifierId) -> NodeId {
        self.push_node(name, name.to_string(), classifier, None)
    }

    /// Add a node beneath `parent`.
    pub fn add_child(&mut self, parent: NodeId, name: &str, classifier: ClassifierId) -> NodeId {
        let parent_node = &self.model.nodes[parent.index()];
        let path = format!("{}{}{}", parent_node.path, PATH_SEPARATOR, name);
        let id = self.push_node(name, path, classifier, Some(parent));
        self.model.nodes[parent.index()].children.push(id);
        id
    }

    fn push_node(
        &mut self,
        name: &str,
        path: String,
        classifier: ClassifierId,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId::from_index(self.model.nodes.len());
        let mut features = Vec::new();
        for feature in &self.model.classifiers[classifier.index()].features {
            let fi = FeatureInstanceId::from_index(self.model.feature_instances.len());
            self.model.feature_instances.push(FeatureInstance {
                node: id,
                feature: *feature,
            });
            features.push(fi);
        }
        self.model.path_index.insert(path.clone(), id);
        self.model.nodes.push(Node {
            name: name.to_string(),
            path,
            classifier,
            parent,
            children: Vec::new(),
            features,
            processor_binding: Vec::new(),
        });
        id
    }

    /// Record that `node` is bound to the execution platform `platform`.
    pub fn bind_processor(&mut self, node: NodeId, platform: NodeId) {
        self.model.nodes[node.index()].processor_binding.push(platform);
    }

    /// Feature endpoint of `node` by feature name.
    pub fn port(&self, node: NodeId, feature: &str) -> Option<Endpoint> {
        let classifier = self.model.nodes[node.index()].classifier;
        let decl = self.model.feature_by_name(classifier, feature)?;
        self.model
            .find_feature_instance(node, decl)
            .map(Endpoint::Feature)
    }

    /// Add a connection instance owned by `owner`.
    pub fn add_connection(
        &mut self,
        owner: NodeId,
        name: &str,
        bidirectional: bool,
        references: Vec<ConnectionReference>,
    ) -> ConnectionId {
        let id = ConnectionId::from_index(self.model.connections.len());
        self.model.connections.push(ConnectionInstance {
            name: name.to_string(),
            owner,
            bidirectional,
            references,
        });
        id
    }

    /// Read-only view of the model under construction.
    pub fn model(&self) -> &InstanceModel {
        &self.model
    }

    pub fn build(self) -> InstanceModel {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        model: InstanceModel,
        top: NodeId,
        a: NodeId,
        b: NodeId,
        a_inner: NodeId,
        out_port: FeatureId,
    }

    fn fixture() -> Fixture {
        let mut b = InstanceModelBuilder::new();
        let top_c = b.add_classifier("Top", ComponentCategory::System);
        let sub_c = b.add_classifier("Sub", ComponentCategory::System);
        let out_port = b.add_feature(sub_c, "out_port");
        b.add_feature(sub_c, "in_port");
        b.add_point(sub_c, "out_port_out", Direction::Out, Some(out_port));
        b.add_point(sub_c, "access_in", Direction::In, None);

        let top = b.add_root("top", top_c);
        let a = b.add_child(top, "a", sub_c);
        let bb = b.add_child(top, "b", sub_c);
        let a_inner = b.add_child(a, "inner", sub_c);
        let src = b.port(a, "out_port").unwrap();
        let dst = b.port(bb, "in_port").unwrap();
        b.add_connection(
            top,
            "a_to_b",
            false,
            vec![ConnectionReference {
                source: src,
                destination: dst,
            }],
        );
        b.add_connection(a, "inner_conn", false, Vec::new());
        Fixture {
            model: b.build(),
            top,
            a,
            b: bb,
            a_inner,
            out_port,
        }
    }

    #[test]
    fn paths_and_parents() {
        let f = fixture();
        assert_eq!(f.model.node(f.a_inner).path, "top.a.inner");
        assert_eq!(f.model.node_by_path("top.b"), Some(f.b));
        assert_eq!(f.model.node(f.a_inner).parent, Some(f.a));
        assert_eq!(f.model.root(), Some(f.top));
        assert!(f.model.node(f.top).parent.is_none());
    }

    #[test]
    fn feature_instances_follow_classifier() {
        let f = fixture();
        assert_eq!(f.model.node(f.a).features.len(), 2);
        let fi_a = f.model.find_feature_instance(f.a, f.out_port).unwrap();
        let fi_b = f.model.find_feature_instance(f.b, f.out_port).unwrap();
        assert_ne!(fi_a, fi_b);
        assert_eq!(f.model.owner_of(Endpoint::Feature(fi_b)), f.b);
        assert_eq!(
            f.model.describe_endpoint(Endpoint::Feature(fi_a)),
            "top.a.out_port"
        );
    }

    #[test]
    fn points_filtered_by_direction() {
        let f = fixture();
        let sub = f.model.node(f.a).classifier;
        let out: Vec<_> = f.model.points_of(sub, Direction::Out).collect();
        let inc: Vec<_> = f.model.points_of(sub, Direction::In).collect();
        assert_eq!(out.len(), 1);
        assert_eq!(inc.len(), 1);
        assert!(f.model.point(inc[0]).is_access());
        assert!(f.model.classifier(sub).has_error_annex);
        assert!(!f.model.classifier_of(f.top).has_error_annex);
    }

    #[test]
    fn descendants_are_preorder_without_root() {
        let f = fixture();
        assert_eq!(f.model.descendants(f.top), vec![f.a, f.a_inner, f.b]);
        assert_eq!(f.model.descendants(f.a), vec![f.a_inner]);
        assert!(f.model.descendants(f.b).is_empty());
    }

    #[test]
    fn connections_under_respects_containment() {
        let f = fixture();
        assert_eq!(f.model.connections_under(f.top).len(), 2);
        let under_a = f.model.connections_under(f.a);
        assert_eq!(under_a.len(), 1);
        assert_eq!(f.model.connection(under_a[0]).name, "inner_conn");
        assert!(f.model.connections_under(f.b).is_empty());
    }

    #[test]
    fn classifier_redeclaration_returns_same_handle() {
        let mut b = InstanceModelBuilder::new();
        let first = b.add_classifier("Cpu", ComponentCategory::Processor);
        let second = b.add_classifier("Cpu", ComponentCategory::Processor);
        assert_eq!(first, second);
        assert_eq!(b.model().classifier_by_name("Cpu"), Some(first));
    }
}
