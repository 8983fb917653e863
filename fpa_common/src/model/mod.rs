//! Component instance model.
//!
//! The analysis never owns any of this: it holds handles into an
//! [`InstanceModel`] that outlives it.
//!
//! - [`category`] - Component categories and propagation directions
//! - [`instance`] - Arena store, handles, and the programmatic builder
//! - [`config`] - TOML model description and its resolution

pub mod category;
pub mod config;
pub mod instance;

pub use category::{ComponentCategory, Direction};
pub use config::{ModelConfig, ModelConfigError};
pub use instance::{
    Classifier, ClassifierId, ConnectionId, ConnectionInstance, ConnectionReference, Endpoint,
    FeatureDecl, FeatureId, FeatureInstance, FeatureInstanceId, InstanceModel,
    InstanceModelBuilder, Node, NodeId, PointId, PropagationPoint,
};
