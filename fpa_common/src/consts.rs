//! Workspace-wide constants for FPA.
//!
//! Single source of truth for default file names and naming conventions.

/// Separator between segments of a component instance path (`top.cpu.core0`).
pub const PATH_SEPARATOR: char = '.';

/// Default analysis configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "fpa.toml";

/// Default service name reported in logs when no configuration is given.
pub const DEFAULT_SERVICE_NAME: &str = "fpa";
