//! Name-based view of an analysis for the `fpa` driver.
//!
//! Handles are only meaningful next to their instance model, so the summary
//! resolves everything to dotted paths and point names before serializing.

use std::fmt::Write as _;

use fpa_common::model::NodeId;
use serde::Serialize;

use crate::analysis::AnalysisModel;
use crate::path::{PathEnd, PropagationPath};

/// One resolved path end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndSummary {
    pub node: String,
    pub point: String,
}

/// One path record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSummary {
    /// Originating connection, absent for binding paths.
    pub connection: Option<String>,
    pub bidirectional: bool,
    pub source: Option<EndSummary>,
    pub destination: Option<EndSummary>,
}

/// Forward reach of one outgoing point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointReach {
    pub point: String,
    pub reaches: Vec<EndSummary>,
}

/// Forward reach of every outgoing point of a registered node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReach {
    pub node: String,
    pub outgoing: Vec<PointReach>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub root: String,
    pub mode: String,
    pub paths: Vec<PathSummary>,
    pub nodes: Vec<NodeReach>,
}

impl AnalysisSummary {
    pub fn from_analysis(analysis: &AnalysisModel<'_>) -> Self {
        let model = analysis.instance_model();
        Self {
            root: model.node(analysis.root()).path.clone(),
            mode: analysis.mode().to_string(),
            paths: analysis
                .paths()
                .iter()
                .map(|p| summarize_path(analysis, p))
                .collect(),
            nodes: analysis
                .nodes()
                .iter()
                .map(|&n| node_reach(analysis, n))
                .collect(),
        }
    }

    /// Paths with both ends resolved.
    pub fn complete_paths(&self) -> usize {
        self.paths
            .iter()
            .filter(|p| p.source.is_some() && p.destination.is_some())
            .count()
    }

    /// Plain-text rendering.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "root: {} ({})", self.root, self.mode);
        let _ = writeln!(
            out,
            "paths: {} ({} complete)",
            self.paths.len(),
            self.complete_paths()
        );
        for path in &self.paths {
            let arrow = if path.bidirectional { "<->" } else { "->" };
            let origin = path.connection.as_deref().unwrap_or("binding");
            let _ = writeln!(
                out,
                "  {} {arrow} {}  [{origin}]",
                render_end(path.source.as_ref()),
                render_end(path.destination.as_ref()),
            );
        }
        let _ = writeln!(out, "nodes: {}", self.nodes.len());
        for node in &self.nodes {
            let _ = writeln!(out, "  {}", node.node);
            for reach in &node.outgoing {
                let targets: Vec<String> = reach
                    .reaches
                    .iter()
                    .map(|e| format!("{}.{}", e.node, e.point))
                    .collect();
                let _ = writeln!(out, "    {} -> [{}]", reach.point, targets.join(", "));
            }
        }
        out
    }
}

fn render_end(end: Option<&EndSummary>) -> String {
    end.map_or_else(|| "?".to_string(), |e| format!("{}.{}", e.node, e.point))
}

fn summarize_end(analysis: &AnalysisModel<'_>, end: PathEnd) -> EndSummary {
    let model = analysis.instance_model();
    EndSummary {
        node: model.node(end.node).path.clone(),
        point: model.point(end.point).name.clone(),
    }
}

fn summarize_path(analysis: &AnalysisModel<'_>, path: &PropagationPath) -> PathSummary {
    let model = analysis.instance_model();
    PathSummary {
        connection: path.connection.map(|c| model.connection(c).name.clone()),
        bidirectional: path.bidirectional,
        source: path.source.map(|e| summarize_end(analysis, e)),
        destination: path.destination.map(|e| summarize_end(analysis, e)),
    }
}

fn node_reach(analysis: &AnalysisModel<'_>, node: NodeId) -> NodeReach {
    let model = analysis.instance_model();
    let classifier = model.node(node).classifier;
    NodeReach {
        node: model.node(node).path.clone(),
        outgoing: model
            .outgoing_points(classifier)
            .map(|point| PointReach {
                point: model.point(point).name.clone(),
                reaches: analysis
                    .destination_ends(node, point)
                    .into_iter()
                    .map(|e| summarize_end(analysis, e))
                    .collect(),
            })
            .collect(),
    }
}
