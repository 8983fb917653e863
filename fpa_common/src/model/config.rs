//! Declarative model description.
//!
//! Deserialized from a `model.toml` and resolved into an
//! [`InstanceModel`]. Resolution only checks what is needed to mint
//! handles (names exist, paths are unique, parents come first); it does not
//! judge whether propagation declarations make sense.
//!
//! ```toml
//! [classifier.Sensor]
//! category = "device"
//! features = ["reading"]
//! propagations = [
//!   { name = "reading_out", direction = "out", feature = "reading" },
//!   { name = "power_in", direction = "in" },
//! ]
//!
//! [[component]]
//! path = "top"
//! classifier = "Top"
//!
//! [[component]]
//! path = "top.sensor"
//! classifier = "Sensor"
//!
//! [[connection]]
//! owner = "top"
//!
//! [[connection.references]]
//! source = { component = "top.sensor", feature = "reading" }
//! destination = { component = "top.ctrl", feature = "input" }
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::category::{ComponentCategory, Direction};
use super::instance::{
    ConnectionReference, Endpoint, InstanceModel, InstanceModelBuilder, NodeId,
};
use crate::consts::PATH_SEPARATOR;

// ─── Error Types ────────────────────────────────────────────────────

/// Model description resolution error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelConfigError {
    #[error("model declares no components")]
    NoComponents,

    #[error("multiple root components: '{first}' and '{second}'")]
    MultipleRoots { first: String, second: String },

    #[error("component path '{path}' is declared twice")]
    DuplicateComponent { path: String },

    #[error("component path '{path}' has an empty segment")]
    MalformedPath { path: String },

    #[error("parent '{parent}' of '{path}' is not declared before it")]
    MissingParent { path: String, parent: String },

    #[error("component '{component}' uses unknown classifier '{classifier}'")]
    UnknownClassifier {
        component: String,
        classifier: String,
    },

    #[error("classifier '{classifier}' declares feature '{feature}' twice")]
    DuplicateFeature { classifier: String, feature: String },

    #[error("propagation '{propagation}' of classifier '{classifier}' names unknown feature '{feature}'")]
    UnknownPropagationFeature {
        classifier: String,
        propagation: String,
        feature: String,
    },

    #[error("{context} refers to unknown component '{path}'")]
    UnknownComponent { path: String, context: String },

    #[error("component '{component}' has no feature '{feature}'")]
    UnknownFeature { component: String, feature: String },

    #[error("connection '{name}' has no references")]
    EmptyConnection { name: String },
}

// ─── Description Structs ────────────────────────────────────────────

/// Top-level model description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Classifiers keyed by name.
    #[serde(default)]
    pub classifier: BTreeMap<String, ClassifierConfig>,
    /// Component instances; parents before children.
    #[serde(default)]
    pub component: Vec<ComponentConfig>,
    #[serde(default)]
    pub connection: Vec<ConnectionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    pub category: ComponentCategory,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub propagations: Vec<PropagationConfig>,
    /// Defaults to "declares at least one propagation".
    #[serde(default)]
    pub has_error_annex: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropagationConfig {
    pub name: String,
    pub direction: Direction,
    /// Omitted for component-level access points.
    #[serde(default)]
    pub feature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    pub path: String,
    pub classifier: String,
    /// Paths of the execution platforms this component is bound to.
    #[serde(default)]
    pub processor_binding: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub owner: String,
    #[serde(default)]
    pub bidirectional: bool,
    pub references: Vec<ReferenceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceConfig {
    pub source: EndpointConfig,
    pub destination: EndpointConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub component: String,
    /// Omitted for access endpoints (the component itself).
    #[serde(default)]
    pub feature: Option<String>,
}

impl ModelConfig {
    /// Parse from TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

// ─── Resolution ─────────────────────────────────────────────────────

impl InstanceModel {
    /// Resolve a model description into an instance graph.
    ///
    /// Returns the first resolution error encountered.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelConfigError> {
        let mut builder = InstanceModelBuilder::new();

        for (name, decl) in &config.classifier {
            let classifier = builder.add_classifier(name, decl.category);
            let mut seen = HashSet::new();
            for feature in &decl.features {
                if !seen.insert(feature.as_str()) {
                    return Err(ModelConfigError::DuplicateFeature {
                        classifier: name.clone(),
                        feature: feature.clone(),
                    });
                }
                builder.add_feature(classifier, feature);
            }
            for prop in &decl.propagations {
                let feature = match &prop.feature {
                    Some(f) => Some(builder.model().feature_by_name(classifier, f).ok_or_else(
                        || ModelConfigError::UnknownPropagationFeature {
                            classifier: name.clone(),
                            propagation: prop.name.clone(),
                            feature: f.clone(),
                        },
                    )?),
                    None => None,
                };
                builder.add_point(classifier, &prop.name, prop.direction, feature);
            }
            let annex = decl.has_error_annex.unwrap_or(!decl.propagations.is_empty());
            builder.set_error_annex(classifier, annex);
        }

        if config.component.is_empty() {
            return Err(ModelConfigError::NoComponents);
        }

        let mut root_path: Option<&str> = None;
        for comp in &config.component {
            if comp.path.split(PATH_SEPARATOR).any(str::is_empty) {
                return Err(ModelConfigError::MalformedPath {
                    path: comp.path.clone(),
                });
            }
            if builder.model().node_by_path(&comp.path).is_some() {
                return Err(ModelConfigError::DuplicateComponent {
                    path: comp.path.clone(),
                });
            }
            let classifier = builder
                .model()
                .classifier_by_name(&comp.classifier)
                .ok_or_else(|| ModelConfigError::UnknownClassifier {
                    component: comp.path.clone(),
                    classifier: comp.classifier.clone(),
                })?;

            match comp.path.rsplit_once(PATH_SEPARATOR) {
                None => {
                    if let Some(first) = root_path {
                        return Err(ModelConfigError::MultipleRoots {
                            first: first.to_string(),
                            second: comp.path.clone(),
                        });
                    }
                    root_path = Some(comp.path.as_str());
                    builder.add_root(&comp.path, classifier);
                }
                Some((parent_path, name)) => {
                    let parent = builder.model().node_by_path(parent_path).ok_or_else(|| {
                        ModelConfigError::MissingParent {
                            path: comp.path.clone(),
                            parent: parent_path.to_string(),
                        }
                    })?;
                    builder.add_child(parent, name, classifier);
                }
            }
        }

        for comp in &config.component {
            let Some(node) = builder.model().node_by_path(&comp.path) else {
                continue;
            };
            for platform_path in &comp.processor_binding {
                let platform = lookup_node(&builder, platform_path, || {
                    format!("processor binding of '{}'", comp.path)
                })?;
                builder.bind_processor(node, platform);
            }
        }

        for (idx, conn) in config.connection.iter().enumerate() {
            let name = conn
                .name
                .clone()
                .unwrap_or_else(|| format!("connection_{idx}"));
            if conn.references.is_empty() {
                return Err(ModelConfigError::EmptyConnection { name });
            }
            let owner = lookup_node(&builder, &conn.owner, || {
                format!("owner of connection '{name}'")
            })?;
            let mut references = Vec::with_capacity(conn.references.len());
            for reference in &conn.references {
                references.push(ConnectionReference {
                    source: resolve_endpoint(&builder, &reference.source, &name)?,
                    destination: resolve_endpoint(&builder, &reference.destination, &name)?,
                });
            }
            builder.add_connection(owner, &name, conn.bidirectional, references);
        }

        let model = builder.build();
        debug!(
            nodes = model.node_count(),
            connections = model.connection_count(),
            "instance model resolved"
        );
        Ok(model)
    }
}

fn lookup_node(
    builder: &InstanceModelBuilder,
    path: &str,
    context: impl FnOnce() -> String,
) -> Result<NodeId, ModelConfigError> {
    builder
        .model()
        .node_by_path(path)
        .ok_or_else(|| ModelConfigError::UnknownComponent {
            path: path.to_string(),
            context: context(),
        })
}

fn resolve_endpoint(
    builder: &InstanceModelBuilder,
    endpoint: &EndpointConfig,
    connection: &str,
) -> Result<Endpoint, ModelConfigError> {
    let node = lookup_node(builder, &endpoint.component, || {
        format!("connection '{connection}'")
    })?;
    match &endpoint.feature {
        None => Ok(Endpoint::Component(node)),
        Some(feature) => {
            builder
                .port(node, feature)
                .ok_or_else(|| ModelConfigError::UnknownFeature {
                    component: endpoint.component.clone(),
                    feature: feature.clone(),
                })
        }
    }
}
