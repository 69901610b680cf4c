//! Recommendation pipeline.
//!
//! Combines the target catalog, visibility scoring and gear fit into a filtered list
//! ordered by visibility score. The engine holds its catalogs behind `Arc` and never
//! mutates them, so one engine can serve concurrent requests.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::Arc;

use crate::api::{
    GearCompatibility, GearFitResult, MoonState, ObserverContext, Recommendation,
    RecommendationFilters,
};
use crate::config::PlannerConfig;
use crate::models::{
    ensure_unique_setup_ids, GearCatalog, OpticalSetup, SetupId, SetupSource, Target,
    TargetCatalog,
};
use crate::services::gear_fit;
use crate::services::visibility::score_target;

/// Ranks catalog targets for an observer and a set of imaging setups.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Arc<TargetCatalog>,
    setups: Arc<Vec<OpticalSetup>>,
    min_score: u8,
    gear_match_threshold: u8,
    suitable_setup_min_score: u8,
}

impl RecommendationEngine {
    /// Engine over explicit catalogs with default thresholds.
    pub fn new(catalog: Arc<TargetCatalog>, setups: Vec<OpticalSetup>) -> Self {
        let defaults = PlannerConfig::default().recommendation;
        Self {
            catalog,
            setups: Arc::new(setups),
            min_score: defaults.min_score,
            gear_match_threshold: defaults.gear_match_threshold,
            suitable_setup_min_score: defaults.suitable_setup_min_score,
        }
    }

    /// Engine over the bundled target and gear catalogs.
    pub fn bundled() -> Result<Self> {
        Self::from_config(&PlannerConfig::default())
    }

    /// Load the configured (or bundled) catalogs and apply the configured thresholds.
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let catalog = match &config.catalog.targets {
            Some(path) => TargetCatalog::from_file(path)?,
            None => TargetCatalog::bundled()?,
        };
        let gear = match &config.catalog.gear {
            Some(path) => GearCatalog::from_file(path)?,
            None => GearCatalog::bundled()?,
        };

        let mut setups = gear
            .builtin_setups()
            .context("Failed to resolve catalog setups")?;
        let custom: Vec<SetupSource> = config
            .custom_setups
            .iter()
            .cloned()
            .map(SetupSource::Custom)
            .collect();
        setups.extend(
            gear.resolve_all(&custom)
                .context("Failed to resolve custom setups")?,
        );
        ensure_unique_setup_ids(setups.iter().map(OpticalSetup::id))
            .context("Custom setup ids must not repeat catalog setups")?;

        debug!(
            "Recommendation engine ready: {} targets (sha256 {}), {} setups",
            catalog.len(),
            catalog.checksum(),
            setups.len()
        );

        let settings = &config.recommendation;
        Ok(Self {
            catalog: Arc::new(catalog),
            setups: Arc::new(setups),
            min_score: settings.min_score,
            gear_match_threshold: settings.gear_match_threshold,
            suitable_setup_min_score: settings.suitable_setup_min_score,
        })
    }

    pub fn with_gear_match_threshold(mut self, threshold: u8) -> Self {
        self.gear_match_threshold = threshold;
        self
    }

    pub fn catalog(&self) -> &TargetCatalog {
        &self.catalog
    }

    pub fn setups(&self) -> &[OpticalSetup] {
        &self.setups
    }

    pub fn setup(&self, id: &SetupId) -> Option<&OpticalSetup> {
        self.setups.iter().find(|s| s.id() == id)
    }

    pub fn gear_match_threshold(&self) -> u8 {
        self.gear_match_threshold
    }

    /// Filters carrying the configured minimum score.
    pub fn default_filters(&self) -> RecommendationFilters {
        RecommendationFilters::default().with_min_score(self.min_score)
    }

    /// All engine setups ranked for one target.
    pub fn gear_compatibility(&self, target: &Target) -> GearCompatibility {
        gear_fit::gear_compatibility(target, &self.setups)
    }

    /// Setups reaching the configured suitability score for one target.
    pub fn suitable_setups(&self, target: &Target) -> Vec<GearFitResult> {
        gear_fit::suitable_setups(target, &self.setups, self.suitable_setup_min_score)
    }

    /// Setups to rank targets against: the engine's, or the requested subset in
    /// engine order. Unknown ids are ignored.
    fn scoring_setups(&self, filters: &RecommendationFilters) -> Vec<OpticalSetup> {
        match &filters.setup_ids {
            None => self.setups.to_vec(),
            Some(ids) => {
                for id in ids {
                    if self.setup(id).is_none() {
                        warn!("Ignoring unknown setup '{}' in setup selection", id);
                    }
                }
                self.setups
                    .iter()
                    .filter(|s| ids.contains(s.id()))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Recommend targets for an observer and moon state.
    ///
    /// Targets that never rise above the rise horizon are always dropped, as are
    /// those below `filters.min_score` or `filters.min_altitude`. With a gear filter
    /// set, a target must also fit that setup with at least the gear match threshold
    /// and its reported gear score is the filtered setup's. The result is ordered by
    /// visibility score, descending; ties keep catalog order.
    pub fn recommend(
        &self,
        observer: &ObserverContext,
        moon: &MoonState,
        filters: &RecommendationFilters,
    ) -> Vec<Recommendation> {
        let gear_filter = match &filters.gear_setup_id {
            Some(id) => match self.setup(id) {
                Some(setup) => Some(setup),
                None => {
                    warn!("Gear filter references unknown setup '{}'", id);
                    return Vec::new();
                }
            },
            None => None,
        };

        let setups = self.scoring_setups(filters);
        let candidates: Vec<&Target> = self
            .catalog
            .filter(&filters.types, filters.focal_length)
            .collect();

        let mut recommendations: Vec<Recommendation> = candidates
            .iter()
            .filter_map(|target| {
                let visibility = score_target(target, observer, moon);
                if visibility.never_rises
                    || visibility.score < filters.min_score
                    || visibility.altitude.value() < filters.min_altitude.value()
                {
                    return None;
                }

                let compatibility = gear_fit::gear_compatibility(target, &setups);
                let (gear_score, best_setup) = match gear_filter {
                    Some(setup) => {
                        let fit = gear_fit::score_setup(target, setup);
                        if fit.combined_score < self.gear_match_threshold {
                            return None;
                        }
                        (fit.combined_score, Some(fit))
                    }
                    None => (compatibility.overall_score, compatibility.best),
                };

                Some(Recommendation {
                    target: (*target).clone(),
                    visibility,
                    gear_score,
                    best_setup,
                    all_gear_scores: compatibility.all,
                })
            })
            .collect();

        // sort_by is stable: ties keep catalog order
        recommendations.sort_by(|a, b| b.visibility.score.cmp(&a.visibility.score));

        debug!(
            "Recommended {} of {} candidate targets ({} excluded)",
            recommendations.len(),
            candidates.len(),
            candidates.len() - recommendations.len()
        );

        recommendations
    }
}

#[cfg(test)]
#[path = "recommendation_tests.rs"]
mod recommendation_tests;
