//! Connection path population.
//!
//! A connection instance is realized by an ordered chain of references
//! that may descend into and climb out of the containment hierarchy.
//! Each policy walks the chain once and yields exactly one path record,
//! even when neither end resolves.
//!
//! | Policy     | Source end                 | Destination end            |
//! |------------|----------------------------|----------------------------|
//! | `Deepest`  | first outgoing point found | last incoming point found  |
//! | `Shortest` | last outgoing point found  | first incoming point found |

use core::fmt;
use core::str::FromStr;

use fpa_common::model::{ConnectionId, InstanceModel};
use serde::{Deserialize, Serialize};

use crate::path::PropagationPath;
use crate::resolver::PointResolver;

// ─── PopulationPolicy ───────────────────────────────────────────────

/// Endpoint selection policy along a reference chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationPolicy {
    /// Ends lowest in the containment hierarchy.
    #[default]
    Deepest,
    /// Ends highest in the containment hierarchy.
    Shortest,
}

impl fmt::Display for PopulationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deepest => write!(f, "deepest"),
            Self::Shortest => write!(f, "shortest"),
        }
    }
}

impl FromStr for PopulationPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deepest" => Ok(Self::Deepest),
            "shortest" => Ok(Self::Shortest),
            _ => Err(format!(
                "unknown PopulationPolicy: {s:?}, expected \"deepest\" or \"shortest\""
            )),
        }
    }
}

// ─── Population ─────────────────────────────────────────────────────

/// Derive the path record for one connection instance.
pub fn populate_connection(
    model: &InstanceModel,
    connection: ConnectionId,
    policy: PopulationPolicy,
) -> PropagationPath {
    let conn = model.connection(connection);
    let resolver = PointResolver::new(model);
    let mut source = None;
    let mut destination = None;

    match policy {
        PopulationPolicy::Deepest => {
            for reference in &conn.references {
                if source.is_none() {
                    source = resolver.outgoing(reference.source);
                }
                if let Some(found) = resolver.incoming(reference.destination) {
                    destination = Some(found);
                }
            }
        }
        PopulationPolicy::Shortest => {
            for reference in &conn.references {
                if let Some(found) = resolver.outgoing(reference.source) {
                    source = Some(found);
                }
                if destination.is_none() {
                    destination = resolver.incoming(reference.destination);
                }
            }
        }
    }

    PropagationPath::from_connection(connection, conn.bidirectional, source, destination)
}
