//! Public API surface of the planner.
//!
//! This file consolidates the input and result types exchanged with callers.
//! All types derive Serialize/Deserialize so an outer service can hand them
//! straight to its JSON layer.

pub use crate::models::{
    AngularSize, Camera, CameraId, CustomSetup, Difficulty, FieldOfView, FocalLengthBand,
    GearCatalog, JulianDate, MeasuredOptics, Optic, OpticId, OpticalSetup, SetupCategory,
    SetupId, SetupSource, Target, TargetCatalog, TargetId, TargetType,
};
pub use crate::services::session_plan::{PlannedEntry, PlannedTarget, SetupGroup};

use chrono::{DateTime, Datelike, Utc};
use qtty::{Degrees, Hours};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::PlannerError;

/// Geographic location of the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicLocation {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180), east positive
    pub longitude: f64,
    /// Elevation in meters above sea level (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_m: Option<f64>,
}

impl GeographicLocation {
    pub fn new(
        latitude: f64,
        longitude: f64,
        elevation_m: Option<f64>,
    ) -> Result<Self, PlannerError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(PlannerError::InvalidLocation(
                "Latitude must be between -90 and 90 degrees".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(PlannerError::InvalidLocation(
                "Longitude must be between -180 and 180 degrees".to_string(),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
            elevation_m,
        })
    }
}

/// Where and when the sky is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverContext {
    pub location: GeographicLocation,
    pub instant: DateTime<Utc>,
}

impl ObserverContext {
    pub fn new(location: GeographicLocation, instant: DateTime<Utc>) -> Self {
        Self { location, instant }
    }

    pub fn julian_date(&self) -> JulianDate {
        JulianDate::from_datetime(self.instant)
    }

    /// Calendar month (1-12) of the instant, in UTC.
    pub fn month(&self) -> u32 {
        self.instant.month()
    }
}

/// Observer-relative position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalPosition {
    /// Degrees above the horizon, [-90, 90]
    pub altitude: Degrees,
    /// Compass bearing, [0, 360), north = 0, east = 90
    pub azimuth: Degrees,
}

/// Rise, transit and set of a target relative to a minimum altitude.
///
/// `rise` and `set` are `None` whenever `never_rises` or `never_sets` is true, and
/// `transit` is `None` when the target never rises. Check the flags before using
/// the times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiseTransitSet {
    pub rise: Option<DateTime<Utc>>,
    pub transit: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
    /// Altitude at upper culmination
    pub max_altitude: Degrees,
    pub never_sets: bool,
    pub never_rises: bool,
}

/// Eight-way lunar phase classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhaseName {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhaseName {
    pub fn label(&self) -> &'static str {
        match self {
            MoonPhaseName::NewMoon => "New Moon",
            MoonPhaseName::WaxingCrescent => "Waxing Crescent",
            MoonPhaseName::FirstQuarter => "First Quarter",
            MoonPhaseName::WaxingGibbous => "Waxing Gibbous",
            MoonPhaseName::FullMoon => "Full Moon",
            MoonPhaseName::WaningGibbous => "Waning Gibbous",
            MoonPhaseName::LastQuarter => "Last Quarter",
            MoonPhaseName::WaningCrescent => "Waning Crescent",
        }
    }
}

impl fmt::Display for MoonPhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Phase of the moon at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonPhase {
    /// Fraction of the synodic month elapsed, [0, 1); 0 = new, 0.5 = full
    pub phase_fraction: f64,
    /// Illuminated percentage, [0, 100]
    pub illumination_percent: f64,
    pub phase_name: MoonPhaseName,
}

/// Moon snapshot used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoonState {
    pub phase_fraction: f64,
    pub illumination_percent: f64,
    pub phase_name: MoonPhaseName,
    /// Right ascension in decimal hours
    pub ra: f64,
    pub dec: Degrees,
}

/// Visibility of one target for one observer, instant and moon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityResult {
    pub target_id: TargetId,
    pub altitude: Degrees,
    pub azimuth: Degrees,
    /// 16-point compass direction of the azimuth
    pub direction: String,
    pub rise: Option<DateTime<Utc>>,
    pub transit: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
    pub max_altitude: Degrees,
    pub never_rises: bool,
    pub never_sets: bool,
    pub moon_separation: Degrees,
    pub hours_above_30: Hours,
    pub is_in_season: bool,
    /// Recommendation score, 0-100
    pub score: u8,
}

/// How a target frames in a setup's field of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FovRating {
    TooLarge,
    TightFit,
    Excellent,
    Good,
    Small,
    TooSmall,
}

impl FovRating {
    pub fn label(&self) -> &'static str {
        match self {
            FovRating::TooLarge => "Too Large",
            FovRating::TightFit => "Tight Fit",
            FovRating::Excellent => "Excellent",
            FovRating::Good => "Good",
            FovRating::Small => "Small",
            FovRating::TooSmall => "Too Small",
        }
    }
}

/// How well a setup samples a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRating {
    Excellent,
    VeryGood,
    Good,
    Marginal,
    Undersampled,
    LowRes,
}

impl ResolutionRating {
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionRating::Excellent => "Excellent",
            ResolutionRating::VeryGood => "Very Good",
            ResolutionRating::Good => "Good",
            ResolutionRating::Marginal => "Marginal",
            ResolutionRating::Undersampled => "Undersampled",
            ResolutionRating::LowRes => "Low Res",
        }
    }
}

/// Qualitative verdict for a target/setup pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupRecommendation {
    HighlyRecommended,
    GoodMatch,
    Workable,
    Challenging,
    NotRecommended,
}

impl SetupRecommendation {
    pub fn label(&self) -> &'static str {
        match self {
            SetupRecommendation::HighlyRecommended => "Highly Recommended",
            SetupRecommendation::GoodMatch => "Good Match",
            SetupRecommendation::Workable => "Workable",
            SetupRecommendation::Challenging => "Challenging",
            SetupRecommendation::NotRecommended => "Not Recommended",
        }
    }
}

impl fmt::Display for SetupRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field-of-view fit of a target in a setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FovFit {
    pub score: u8,
    pub rating: FovRating,
    pub details: String,
    /// Percentage of the frame filled along the tighter axis
    pub fill_percent: f64,
}

/// Sampling fit of a target in a setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionFit {
    pub score: u8,
    pub rating: ResolutionRating,
    pub details: String,
    /// Pixels across the target's minor axis, rounded
    pub pixels_across: u32,
}

/// Score of one target against one setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearFitResult {
    pub setup_id: SetupId,
    pub setup_name: String,
    pub fov_fit: FovFit,
    pub resolution_fit: ResolutionFit,
    /// 60% field-of-view fit, 40% resolution fit
    pub combined_score: u8,
    pub recommendation: SetupRecommendation,
}

/// All setups ranked for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearCompatibility {
    pub best: Option<GearFitResult>,
    /// Ranked by combined score, descending; ties keep setup order
    pub all: Vec<GearFitResult>,
    /// Combined score of the best setup (0 without setups)
    pub overall_score: u8,
    pub has_good_option: bool,
}

/// A recommended target with its visibility and gear annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub target: Target,
    pub visibility: VisibilityResult,
    /// Combined score of `best_setup`
    pub gear_score: u8,
    pub best_setup: Option<GearFitResult>,
    pub all_gear_scores: Vec<GearFitResult>,
}

impl Recommendation {
    pub fn score(&self) -> u8 {
        self.visibility.score
    }

    /// Gear fit against a specific setup, if it was scored.
    pub fn gear_score_for(&self, setup_id: &SetupId) -> Option<&GearFitResult> {
        self.all_gear_scores.iter().find(|s| &s.setup_id == setup_id)
    }
}

fn default_min_altitude() -> Degrees {
    Degrees::new(-90.0)
}

/// Options narrowing a recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationFilters {
    /// Target types to keep; empty keeps every type
    #[serde(default)]
    pub types: HashSet<TargetType>,
    #[serde(default)]
    pub focal_length: Option<FocalLengthBand>,
    #[serde(default)]
    pub min_score: u8,
    /// Minimum current altitude; -90 disables the check
    #[serde(default = "default_min_altitude")]
    pub min_altitude: Degrees,
    /// Only keep targets this setup frames well, and report its score
    #[serde(default)]
    pub gear_setup_id: Option<SetupId>,
    /// Restrict gear scoring to these setups
    #[serde(default)]
    pub setup_ids: Option<Vec<SetupId>>,
}

impl Default for RecommendationFilters {
    fn default() -> Self {
        Self {
            types: HashSet::new(),
            focal_length: None,
            min_score: 0,
            min_altitude: default_min_altitude(),
            gear_setup_id: None,
            setup_ids: None,
        }
    }
}

impl RecommendationFilters {
    pub fn with_types(mut self, types: impl IntoIterator<Item = TargetType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_focal_length(mut self, band: FocalLengthBand) -> Self {
        self.focal_length = Some(band);
        self
    }

    pub fn with_min_score(mut self, min_score: u8) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_min_altitude(mut self, min_altitude: Degrees) -> Self {
        self.min_altitude = min_altitude;
        self
    }

    pub fn with_gear_setup(mut self, setup_id: impl Into<SetupId>) -> Self {
        self.gear_setup_id = Some(setup_id.into());
        self
    }

    pub fn with_setups(mut self, setup_ids: impl IntoIterator<Item = SetupId>) -> Self {
        self.setup_ids = Some(setup_ids.into_iter().collect());
        self
    }
}
