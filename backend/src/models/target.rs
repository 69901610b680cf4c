//! Deep-sky target records.

use qtty::{Arcminutes, Degrees};
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id_type!(TargetId);

/// Kind of deep-sky object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Galaxy,
    EmissionNebula,
    PlanetaryNebula,
    ReflectionNebula,
    DarkNebula,
    SupernovaRemnant,
    OpenCluster,
    GlobularCluster,
    Star,
    DoubleStar,
    Asterism,
    MilkyWayRegion,
}

impl TargetType {
    pub const ALL: [TargetType; 12] = [
        TargetType::Galaxy,
        TargetType::EmissionNebula,
        TargetType::PlanetaryNebula,
        TargetType::ReflectionNebula,
        TargetType::DarkNebula,
        TargetType::SupernovaRemnant,
        TargetType::OpenCluster,
        TargetType::GlobularCluster,
        TargetType::Star,
        TargetType::DoubleStar,
        TargetType::Asterism,
        TargetType::MilkyWayRegion,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TargetType::Galaxy => "Galaxy",
            TargetType::EmissionNebula => "Emission Nebula",
            TargetType::PlanetaryNebula => "Planetary Nebula",
            TargetType::ReflectionNebula => "Reflection Nebula",
            TargetType::DarkNebula => "Dark Nebula",
            TargetType::SupernovaRemnant => "Supernova Remnant",
            TargetType::OpenCluster => "Open Cluster",
            TargetType::GlobularCluster => "Globular Cluster",
            TargetType::Star => "Star",
            TargetType::DoubleStar => "Double Star",
            TargetType::Asterism => "Asterism",
            TargetType::MilkyWayRegion => "Milky Way Region",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recommended focal-length band for framing a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocalLengthBand {
    /// 14-50mm camera lenses
    Wide,
    /// 200-400mm
    Short,
    /// 400-800mm
    Medium,
    /// 800mm and longer
    Long,
}

impl FocalLengthBand {
    pub fn label(&self) -> &'static str {
        match self {
            FocalLengthBand::Wide => "Wide Field (14-50mm)",
            FocalLengthBand::Short => "Short (200-400mm)",
            FocalLengthBand::Medium => "Medium (400-800mm)",
            FocalLengthBand::Long => "Long (800mm+)",
        }
    }
}

impl fmt::Display for FocalLengthBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Imaging difficulty, from surface brightness and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Challenging,
    Expert,
}

/// Apparent extent of a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularSize {
    pub width: Arcminutes,
    pub height: Arcminutes,
}

impl AngularSize {
    pub fn new(width_arcmin: f64, height_arcmin: f64) -> Self {
        Self {
            width: Arcminutes::new(width_arcmin),
            height: Arcminutes::new(height_arcmin),
        }
    }

    /// Smaller of the two dimensions.
    pub fn minor_axis(&self) -> Arcminutes {
        Arcminutes::new(self.width.value().min(self.height.value()))
    }
}

/// Catalog entry for a deep-sky object.
///
/// Targets are loaded once from static data and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub name: String,
    #[serde(default)]
    pub alt_names: Vec<String>,
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub constellation: String,
    /// Right ascension in decimal hours, [0, 24)
    pub ra: f64,
    /// Declination, [-90, 90]
    pub dec: Degrees,
    /// Visual magnitude (lower is brighter)
    pub magnitude: f64,
    pub size: AngularSize,
    /// Calendar months (1-12) in which the target is best placed
    #[serde(default)]
    pub best_months: Vec<u32>,
    pub focal_length: FocalLengthBand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Target {
    /// Whether `month` (1-12) is one of the target's best months.
    pub fn is_in_season(&self, month: u32) -> bool {
        self.best_months.contains(&month)
    }

    /// Case-insensitive match against the id, display name and alternate names.
    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.trim();
        self.id.as_str().eq_ignore_ascii_case(query)
            || self.name.eq_ignore_ascii_case(query)
            || self.alt_names.iter().any(|n| n.eq_ignore_ascii_case(query))
    }
}
