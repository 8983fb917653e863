//! Component categories and propagation directions.
//!
//! Parsed from lowercase strings in the model description, the same way
//! point types are spelled in hand-written TOML.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

// ─── ComponentCategory ──────────────────────────────────────────────

/// Category of a component classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    System,
    Process,
    Thread,
    ThreadGroup,
    Processor,
    VirtualProcessor,
    Memory,
    Bus,
    VirtualBus,
    Device,
    Data,
    Subprogram,
    Abstract,
}

impl ComponentCategory {
    const ALL: [Self; 13] = [
        Self::System,
        Self::Process,
        Self::Thread,
        Self::ThreadGroup,
        Self::Processor,
        Self::VirtualProcessor,
        Self::Memory,
        Self::Bus,
        Self::VirtualBus,
        Self::Device,
        Self::Data,
        Self::Subprogram,
        Self::Abstract,
    ];

    /// Lowercase spelling used in model descriptions.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Process => "process",
            Self::Thread => "thread",
            Self::ThreadGroup => "thread_group",
            Self::Processor => "processor",
            Self::VirtualProcessor => "virtual_processor",
            Self::Memory => "memory",
            Self::Bus => "bus",
            Self::VirtualBus => "virtual_bus",
            Self::Device => "device",
            Self::Data => "data",
            Self::Subprogram => "subprogram",
            Self::Abstract => "abstract",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown ComponentCategory: {s:?}"))
    }
}

// ─── Direction ──────────────────────────────────────────────────────

/// Direction of a declared propagation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Fault entry.
    #[serde(rename = "in")]
    In,
    /// Fault exit.
    #[serde(rename = "out")]
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            _ => Err(format!("unknown Direction: {s:?}, expected \"in\" or \"out\"")),
        }
    }
}
