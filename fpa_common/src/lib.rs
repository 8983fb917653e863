//! FPA Common Library
//!
//! Shared building blocks for the fault propagation analysis (FPA)
//! workspace: the externally owned instance model that the analysis
//! borrows from, its declarative TOML description, and configuration
//! loading utilities.
//!
//! # Module Structure
//!
//! - [`model`] - Arena-backed component instance graph with typed handles
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use fpa_common::prelude::*;
//!
//! let mut builder = InstanceModelBuilder::new();
//! let top = builder.add_classifier("Top", ComponentCategory::System);
//! let root = builder.add_root("top", top);
//! let model = builder.build();
//! assert_eq!(model.root(), Some(root));
//! ```

pub mod config;
pub mod consts;
pub mod model;
pub mod prelude;
