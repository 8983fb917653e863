//! Analysis model construction.
//!
//! Built once per analysis run from a root node: every connection instance
//! under the root yields one path record, then (in default mode) processor
//! bindings are expanded into synthesized paths. Construction is eager and
//! single-threaded; the finished model is read-only and `Send + Sync`, so it
//! can be shared across query threads.

use std::fmt;
use std::sync::Arc;

use fpa_common::model::{ConnectionId, InstanceModel, NodeId};
use static_assertions::assert_impl_all;

use crate::binding::{self, BindingStep};
use crate::path::{PathEnd, PropagationPath};
use crate::populate::{self, PopulationPolicy};
use crate::registry::NodeRegistry;
use crate::trace::{TraceEvent, TraceSink, TracingSink};

// ─── AnalysisMode ───────────────────────────────────────────────────

/// How paths are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Deepest policy plus binding synthesis.
    #[default]
    Default,
    /// Chosen policy, connections only.
    Restricted(PopulationPolicy),
}

impl AnalysisMode {
    pub fn policy(self) -> PopulationPolicy {
        match self {
            Self::Default => PopulationPolicy::Deepest,
            Self::Restricted(policy) => policy,
        }
    }

    pub fn synthesizes_bindings(self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Restricted(policy) => write!(f, "restricted/{policy}"),
        }
    }
}

// ─── AnalysisModel ──────────────────────────────────────────────────

/// Propagation paths derived from an instance model.
pub struct AnalysisModel<'m> {
    pub(crate) model: &'m InstanceModel,
    root: NodeId,
    mode: AnalysisMode,
    pub(crate) paths: Vec<PropagationPath>,
    registry: NodeRegistry,
    pub(crate) sink: Arc<dyn TraceSink>,
}

assert_impl_all!(AnalysisModel<'static>: Send, Sync);

impl<'m> AnalysisModel<'m> {
    /// Default mode over everything beneath `root`.
    pub fn new(model: &'m InstanceModel, root: NodeId) -> Self {
        Self::with_sink(model, root, AnalysisMode::Default, Arc::new(TracingSink))
    }

    /// Restricted mode: `policy` over connections only.
    pub fn with_policy(model: &'m InstanceModel, root: NodeId, policy: PopulationPolicy) -> Self {
        Self::with_sink(
            model,
            root,
            AnalysisMode::Restricted(policy),
            Arc::new(TracingSink),
        )
    }

    /// Any mode, with an injected trace sink.
    pub fn with_sink(
        model: &'m InstanceModel,
        root: NodeId,
        mode: AnalysisMode,
        sink: Arc<dyn TraceSink>,
    ) -> Self {
        let connections = model.connections_under(root);
        let nodes = model.descendants(root);
        Self::build(model, root, &connections, &nodes, mode, sink)
    }

    /// Build from explicit connection and node lists.
    ///
    /// `nodes` is only consulted for binding synthesis.
    pub fn build(
        model: &'m InstanceModel,
        root: NodeId,
        connections: &[ConnectionId],
        nodes: &[NodeId],
        mode: AnalysisMode,
        sink: Arc<dyn TraceSink>,
    ) -> Self {
        let mut analysis = Self {
            model,
            root,
            mode,
            paths: Vec::with_capacity(connections.len()),
            registry: NodeRegistry::new(),
            sink,
        };

        let policy = mode.policy();
        for &connection in connections {
            let path = populate::populate_connection(model, connection, policy);
            analysis
                .sink
                .record(&TraceEvent::PathPopulated { path, policy });
            analysis.register_end(path.source);
            analysis.register_end(path.destination);
            analysis.paths.push(path);
        }

        if mode.synthesizes_bindings() {
            for step in binding::binding_steps(model, nodes) {
                analysis.add_binding(step);
            }
        }

        tracing::debug!(
            root = %model.node(root).path,
            %mode,
            paths = analysis.paths.len(),
            nodes = analysis.registry.len(),
            "analysis model built"
        );
        analysis
    }

    fn add_binding(&mut self, step: BindingStep) {
        let synthesized = binding::synthesize(self.model, step);
        self.sink.record(&TraceEvent::BindingSynthesized {
            step,
            paths: synthesized.len(),
        });
        self.paths.extend(synthesized);
        self.register(step.platform);
        self.register(step.hosted);
    }

    fn register_end(&mut self, end: Option<PathEnd>) {
        if let Some(end) = end {
            self.register(end.node);
        }
    }

    fn register(&mut self, node: NodeId) {
        if self.registry.insert(node) {
            self.sink.record(&TraceEvent::NodeRegistered { node });
        }
    }

    // ── Accessors ──

    /// Instance model the analysis borrows from.
    pub fn instance_model(&self) -> &'m InstanceModel {
        self.model
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// All path records: connection-derived first, then synthesized.
    pub fn paths(&self) -> &[PropagationPath] {
        &self.paths
    }

    /// Nodes participating in at least one path, in registration order.
    pub fn nodes(&self) -> &[NodeId] {
        self.registry.as_slice()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.registry.contains(node)
    }

    /// Path record derived from `connection`, if it was processed.
    pub fn path_for_connection(&self, connection: ConnectionId) -> Option<&PropagationPath> {
        self.paths
            .iter()
            .find(|p| p.connection == Some(connection))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl fmt::Debug for AnalysisModel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisModel")
            .field("root", &self.root)
            .field("mode", &self.mode)
            .field("paths", &self.paths.len())
            .field("nodes", &self.registry.len())
            .finish_non_exhaustive()
    }
}
