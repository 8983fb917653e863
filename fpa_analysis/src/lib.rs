//! # FPA Analysis Library
//!
//! Derives fault propagation paths from an instantiated architecture model
//! and answers directional queries over them.
//!
//! ## Pipeline
//!
//! 1. **Resolver**: maps a connection endpoint to its declared
//!    propagation point and owning node ([`resolver`]).
//! 2. **Populator**: walks each connection's reference chain with the
//!    deepest or shortest policy, one path record per connection
//!    ([`populate`]).
//! 3. **Binding synthesis**: turns processor bindings (through one level
//!    of virtualization) into extra paths ([`binding`]).
//! 4. **Queries**: forward/backward lookups honoring bidirectional
//!    connections ([`query`]).
//!
//! The [`AnalysisModel`] borrows the [`InstanceModel`](fpa_common::model::InstanceModel);
//! it only owns path records and the registry of participating nodes. It is
//! built eagerly and is read-only afterward.

pub mod analysis;
pub mod binding;
pub mod config;
pub mod path;
pub mod populate;
pub mod query;
pub mod registry;
pub mod resolver;
pub mod summary;
pub mod trace;

pub use analysis::{AnalysisMode, AnalysisModel};
pub use path::{PathEnd, PropagationPath};
pub use populate::PopulationPolicy;
pub use query::SourceEndSelection;
pub use registry::NodeRegistry;
pub use trace::{NullSink, RecordingSink, TraceEvent, TraceSink, TracingSink};
