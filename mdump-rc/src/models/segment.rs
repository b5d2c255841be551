//! Segment catalog types and derived per-segment metadata

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog sentinel meaning "show the entire system, not one segment"
pub const SENTINEL: &str = "SIMULATION";

/// One entry of the segment catalog, or the whole-system sentinel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Segment {
    /// The whole simulated system (wire form `"SIMULATION"`)
    Simulation,
    /// A named sub-structure within the simulated system
    Named(String),
}

impl Segment {
    /// Parse a wire segment id, mapping the sentinel to `Simulation`
    pub fn parse(id: &str) -> Self {
        if id == SENTINEL {
            Segment::Simulation
        } else {
            Segment::Named(id.to_string())
        }
    }

    /// Wire form of this segment
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Simulation => SENTINEL,
            Segment::Named(id) => id,
        }
    }

    /// Whether this is the whole-system sentinel
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Segment::Simulation)
    }
}

impl From<String> for Segment {
    fn from(id: String) -> Self {
        Segment::parse(&id)
    }
}

impl From<Segment> for String {
    fn from(segment: Segment) -> Self {
        segment.as_str().to_string()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four per-segment metadata fields the aggregator fans out over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentField {
    Name,
    Confidence,
    DbCrosslink,
    Identifier,
}

impl SegmentField {
    /// URL path component of this field
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentField::Name => "name",
            SegmentField::Confidence => "confidence",
            SegmentField::DbCrosslink => "db_crosslink",
            SegmentField::Identifier => "identifier",
        }
    }
}

impl fmt::Display for SegmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived metadata for one segment
///
/// Rebuilt on every selection change, never cached across selections. A field
/// whose fetch failed degrades to `None` without failing the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    /// Human-readable biomolecule name
    pub name: Option<String>,
    /// Identification confidence in [0, 1]
    pub confidence: Option<f64>,
    /// Reference database URL
    pub db_crosslink: Option<String>,
    /// Chemical identifier (PDB ID, InChIKey, ...)
    pub identifier: Option<String>,
}

impl SegmentInfo {
    /// All-null info, the state shown for the sentinel selection
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether every field is null
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.confidence.is_none()
            && self.db_crosslink.is_none()
            && self.identifier.is_none()
    }
}

/// Visual representation style for one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Protein segments
    Cartoon,
    /// Everything else
    BallAndStick,
}

/// Instruction describing how one segment should be visually represented
///
/// Exactly one directive per concrete catalog segment, recomputed whenever
/// the catalog or the active selection changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDirective {
    /// Segment this directive applies to
    pub segment: String,
    /// Style: cartoon for protein, ball_and_stick otherwise
    pub representation: Representation,
    /// 1.0 for the active selection (or all segments in whole-system view),
    /// 0.05 for de-emphasized segments
    pub opacity: f64,
}
