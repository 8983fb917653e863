//! Binding path synthesis.
//!
//! Processor bindings are not connections, yet a failing platform
//! propagates into everything it hosts. For every annexed process bound to
//! an execution platform:
//!
//! 1. If the platform is a virtual processor, each physical processor it is
//!    bound to yields a `physical -> virtual` step.
//! 2. The platform itself yields a `platform -> process` step.
//!
//! Each step expands to the cross product of the platform's outgoing points
//! and the hosted node's incoming points. A step with no points on either
//! side expands to nothing, but both nodes still participate.
//!
//! A step is emitted once even when several processes share the same
//! virtual processor.

use std::collections::HashSet;

use fpa_common::model::{ComponentCategory, InstanceModel, NodeId};

use crate::path::{PathEnd, PropagationPath};

/// One platform-to-hosted relationship to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingStep {
    pub platform: NodeId,
    pub hosted: NodeId,
}

/// Distinct binding steps for `nodes`, in discovery order.
pub fn binding_steps(model: &InstanceModel, nodes: &[NodeId]) -> Vec<BindingStep> {
    let mut steps = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |step: BindingStep| {
        if seen.insert(step) {
            steps.push(step);
        }
    };
    for &node in nodes {
        let classifier = model.classifier_of(node);
        if !classifier.has_error_annex || classifier.category != ComponentCategory::Process {
            continue;
        }
        for &platform in &model.node(node).processor_binding {
            if model.category(platform) == ComponentCategory::VirtualProcessor {
                model
                    .node(platform)
                    .processor_binding
                    .iter()
                    .filter(|p| model.category(**p) == ComponentCategory::Processor)
                    .for_each(|&physical| {
                        push(BindingStep {
                            platform: physical,
                            hosted: platform,
                        })
                    });
            }
            push(BindingStep {
                platform,
                hosted: node,
            });
        }
    }
    steps
}

/// Expand a step into paths: platform outgoing x hosted incoming.
pub fn synthesize(model: &InstanceModel, step: BindingStep) -> Vec<PropagationPath> {
    let platform_classifier = model.node(step.platform).classifier;
    let hosted_classifier = model.node(step.hosted).classifier;
    let incoming: Vec<_> = model.incoming_points(hosted_classifier).collect();

    model
        .outgoing_points(platform_classifier)
        .flat_map(|out| {
            incoming.iter().map(move |&inc| {
                PropagationPath::from_binding(
                    PathEnd::new(step.platform, out),
                    PathEnd::new(step.hosted, inc),
                )
            })
        })
        .collect()
}
