//! Prelude module for common re-exports.
//!
//! Consumers can `use fpa_common::prelude::*;` and get the instance model
//! handles and configuration types without listing individual paths.
//!
//! # Usage
//!
//! ```rust
//! use fpa_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Instance Model ─────────────────────────────────────────────────
pub use crate::model::config::{ModelConfig, ModelConfigError};
pub use crate::model::{
    ClassifierId, ComponentCategory, ConnectionId, ConnectionReference, Direction, Endpoint,
    FeatureId, FeatureInstanceId, InstanceModel, InstanceModelBuilder, NodeId, PointId,
};
