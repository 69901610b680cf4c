//! Imaging session planning.
//!
//! A [`SessionPlan`] is the user's ordered shortlist of recommended targets. Grouping
//! assigns each target to one of the setups in use tonight and orders each group by
//! priority, then transit time.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use qtty::Degrees;

use crate::api::{GearFitResult, ObserverContext, Recommendation, RiseTransitSet};
use crate::models::{SetupId, Target, TargetId};
use crate::services::rise_set::{rise_transit_set, IMAGING_ALTITUDE_DEG};

/// Group name for targets without any setup score.
pub const UNASSIGNED_GROUP_NAME: &str = "Other";

/// A selected target with its user priority (1 = shoot first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedTarget {
    pub recommendation: Recommendation,
    pub priority: u32,
}

impl PlannedTarget {
    pub fn target(&self) -> &Target {
        &self.recommendation.target
    }
}

/// A target placed in a setup group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedEntry {
    pub target: Target,
    pub priority: u32,
    pub visibility_score: u8,
    /// Setup the target was assigned to, with its fit
    pub assigned_setup: Option<GearFitResult>,
    /// Rise/transit/set above the imaging altitude
    pub rise_transit_set: RiseTransitSet,
}

/// Targets sharing an assigned setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupGroup {
    /// `None` for targets that could not be assigned to any setup
    pub setup_id: Option<SetupId>,
    pub setup_name: String,
    pub entries: Vec<PlannedEntry>,
}

/// Ordered shortlist of targets for one night.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    targets: Vec<PlannedTarget>,
}

impl SessionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[PlannedTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn contains(&self, id: &TargetId) -> bool {
        self.targets.iter().any(|t| &t.target().id == id)
    }

    /// Append a recommendation at the lowest priority. Returns `false` if the target
    /// is already planned.
    pub fn add(&mut self, recommendation: Recommendation) -> bool {
        if self.contains(&recommendation.target.id) {
            return false;
        }
        let priority = self.targets.len() as u32 + 1;
        self.targets.push(PlannedTarget {
            recommendation,
            priority,
        });
        true
    }

    /// Change a target's priority (minimum 1) and re-order the list by priority.
    ///
    /// Other priorities are left as they are, so duplicates are possible until the
    /// next [`SessionPlan::reprioritize`].
    pub fn set_priority(&mut self, id: &TargetId, priority: u32) -> bool {
        let Some(entry) = self.targets.iter_mut().find(|t| &t.target().id == id) else {
            return false;
        };
        entry.priority = priority.max(1);
        self.targets.sort_by_key(|t| t.priority);
        true
    }

    /// Remove a target and renumber the remaining priorities.
    pub fn remove(&mut self, id: &TargetId) -> Option<PlannedTarget> {
        let index = self.targets.iter().position(|t| &t.target().id == id)?;
        let removed = self.targets.remove(index);
        self.reprioritize();
        Some(removed)
    }

    /// Renumber priorities 1..n in list order.
    pub fn reprioritize(&mut self) {
        reprioritize(&mut self.targets);
    }

    /// Group the plan by the setups in use tonight.
    pub fn group_by_setup(
        &self,
        active_setups: &[SetupId],
        observer: &ObserverContext,
    ) -> Vec<SetupGroup> {
        plan_session(&self.targets, active_setups, observer)
    }
}

/// Renumber priorities 1..n in slice order.
pub fn reprioritize(targets: &mut [PlannedTarget]) {
    for (index, target) in targets.iter_mut().enumerate() {
        target.priority = index as u32 + 1;
    }
}

/// Best-scoring active setup for a target, falling back to its overall best setup.
fn assign_setup(planned: &PlannedTarget, active_setups: &[SetupId]) -> Option<GearFitResult> {
    let rec = &planned.recommendation;
    let mut best: Option<&GearFitResult> = None;
    let mut best_score = 0;

    for setup_id in active_setups {
        if let Some(fit) = rec.gear_score_for(setup_id) {
            if fit.combined_score > best_score {
                best_score = fit.combined_score;
                best = Some(fit);
            }
        }
    }

    best.or(rec.best_setup.as_ref()).cloned()
}

fn by_priority_then_transit(a: &PlannedEntry, b: &PlannedEntry) -> Ordering {
    a.priority.cmp(&b.priority).then_with(|| {
        match (a.rise_transit_set.transit, b.rise_transit_set.transit) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

/// Group planned targets by assigned setup.
///
/// With no active setups, each target's own best setup ids are used. Groups appear
/// in the order their first target appears; within a group entries are sorted by
/// priority, then transit time, with targets lacking a transit after the others.
pub fn plan_session(
    targets: &[PlannedTarget],
    active_setups: &[SetupId],
    observer: &ObserverContext,
) -> Vec<SetupGroup> {
    let fallback: Vec<SetupId>;
    let setups_to_use = if active_setups.is_empty() {
        let mut ids: Vec<SetupId> = Vec::new();
        for planned in targets {
            if let Some(best) = &planned.recommendation.best_setup {
                if !ids.contains(&best.setup_id) {
                    ids.push(best.setup_id.clone());
                }
            }
        }
        fallback = ids;
        fallback.as_slice()
    } else {
        active_setups
    };

    let mut groups: Vec<SetupGroup> = Vec::new();
    for planned in targets {
        let assigned = assign_setup(planned, setups_to_use);
        let setup_id = assigned.as_ref().map(|a| a.setup_id.clone());
        let setup_name = assigned
            .as_ref()
            .map_or_else(|| UNASSIGNED_GROUP_NAME.to_string(), |a| a.setup_name.clone());

        let target = planned.target();
        let entry = PlannedEntry {
            target: target.clone(),
            priority: planned.priority,
            visibility_score: planned.recommendation.visibility.score,
            assigned_setup: assigned,
            rise_transit_set: rise_transit_set(
                target.ra,
                target.dec,
                observer,
                Degrees::new(IMAGING_ALTITUDE_DEG),
            ),
        };

        match groups.iter_mut().find(|g| g.setup_id == setup_id) {
            Some(group) => group.entries.push(entry),
            None => groups.push(SetupGroup {
                setup_id,
                setup_name,
                entries: vec![entry],
            }),
        }
    }

    for group in &mut groups {
        group.entries.sort_by(by_priority_then_transit);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GeographicLocation, MoonState, RecommendationFilters};
    use crate::services::recommendation::RecommendationEngine;
    use chrono::{TimeZone, Utc};

    fn observer() -> ObserverContext {
        ObserverContext::new(
            GeographicLocation::new(45.0, 0.0, None).unwrap(),
            Utc.with_ymd_and_hms(2024, 10, 15, 4, 0, 0).unwrap(),
        )
    }

    fn recommendations(ids: &[&str]) -> Vec<Recommendation> {
        let engine = RecommendationEngine::bundled().unwrap();
        let obs = observer();
        let all = engine.recommend(
            &obs,
            &MoonState::at(obs.instant),
            &RecommendationFilters::default(),
        );
        ids.iter()
            .map(|id| {
                all.iter()
                    .find(|r| r.target.id.as_str() == *id)
                    .cloned()
                    .unwrap()
            })
            .collect()
    }

    fn plan(ids: &[&str]) -> SessionPlan {
        let mut plan = SessionPlan::new();
        for rec in recommendations(ids) {
            assert!(plan.add(rec));
        }
        plan
    }

    #[test]
    fn test_add_assigns_increasing_priority() {
        let mut plan = plan(&["M31", "M57", "M27"]);
        let priorities: Vec<u32> = plan.targets().iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);

        let duplicate = plan.targets()[0].recommendation.clone();
        assert!(!plan.add(duplicate));
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_remove_renumbers() {
        let mut plan = plan(&["M31", "M57", "M27"]);
        let removed = plan.remove(&TargetId::from("M57")).unwrap();
        assert_eq!(removed.target().id.as_str(), "M57");

        let order: Vec<(&str, u32)> = plan
            .targets()
            .iter()
            .map(|t| (t.target().id.as_str(), t.priority))
            .collect();
        assert_eq!(order, vec![("M31", 1), ("M27", 2)]);
        assert!(plan.remove(&TargetId::from("M57")).is_none());
    }

    #[test]
    fn test_set_priority_reorders() {
        let mut plan = plan(&["M31", "M57", "M27"]);
        assert!(plan.set_priority(&TargetId::from("M31"), 5));

        let order: Vec<&str> = plan.targets().iter().map(|t| t.target().id.as_str()).collect();
        assert_eq!(order, vec!["M57", "M27", "M31"]);

        plan.reprioritize();
        let priorities: Vec<u32> = plan.targets().iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);

        // Priorities never drop below 1
        assert!(plan.set_priority(&TargetId::from("M31"), 0));
        assert_eq!(plan.targets()[0].priority, 1);
        assert!(!plan.set_priority(&TargetId::from("M1000"), 1));
    }

    #[test]
    fn test_groups_follow_best_setups_without_active_list() {
        let plan = plan(&["M31", "M57", "M27", "M45"]);
        let groups = plan.group_by_setup(&[], &observer());

        let total: usize = groups.iter().map(|g| g.entries.len()).sum();
        assert_eq!(total, 4);
        for group in &groups {
            for entry in &group.entries {
                let assigned = entry.assigned_setup.as_ref().unwrap();
                assert_eq!(Some(&assigned.setup_id), group.setup_id.as_ref());
                assert_eq!(assigned.setup_name, group.setup_name);
            }
        }
        // Group order follows first appearance
        let first_best = plan.targets()[0]
            .recommendation
            .best_setup
            .as_ref()
            .map(|b| b.setup_id.clone());
        assert_eq!(groups[0].setup_id, first_best);
    }

    #[test]
    fn test_single_active_setup_collects_everything() {
        let plan = plan(&["M31", "M57", "M27"]);
        let active = [SetupId::from("askar-v60-asi533")];
        let groups = plan.group_by_setup(&active, &observer());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].setup_id, Some(SetupId::from("askar-v60-asi533")));
        let priorities: Vec<u32> = groups[0].entries.iter().map(|e| e.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
    }

    #[test]
    fn test_assignment_prefers_strictly_higher_score() {
        let plan = plan(&["M57"]);
        let rec = &plan.targets()[0].recommendation;
        let active = [
            SetupId::from("seestar-integrated"),
            SetupId::from("askar-v80-asi533"),
        ];
        let expected = active
            .iter()
            .filter_map(|id| rec.gear_score_for(id))
            .fold(None::<&GearFitResult>, |best, fit| match best {
                Some(b) if b.combined_score >= fit.combined_score => Some(b),
                _ => Some(fit),
            })
            .unwrap();

        let groups = plan.group_by_setup(&active, &observer());
        let assigned = groups[0].entries[0].assigned_setup.as_ref().unwrap();
        assert_eq!(assigned.setup_id, expected.setup_id);
    }

    #[test]
    fn test_unknown_active_setup_falls_back_to_best() {
        let plan = plan(&["M31"]);
        let groups = plan.group_by_setup(&[SetupId::from("not-owned")], &observer());
        let best = plan.targets()[0].recommendation.best_setup.clone();
        assert_eq!(groups[0].entries[0].assigned_setup, best);
    }

    #[test]
    fn test_entries_sorted_by_priority_then_transit() {
        let mut plan = plan(&["M31", "M57", "M27", "M45"]);
        // Everything at the same priority: transit decides
        for id in ["M31", "M57", "M27", "M45"] {
            plan.set_priority(&TargetId::from(id), 1);
        }
        let active = [SetupId::from("askar-v60-asi533")];
        let groups = plan.group_by_setup(&active, &observer());
        let transits: Vec<_> = groups[0]
            .entries
            .iter()
            .filter_map(|e| e.rise_transit_set.transit)
            .collect();
        assert_eq!(transits.len(), 4);
        assert!(transits.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_target_without_setups_goes_to_other() {
        let mut recs = recommendations(&["M31"]);
        let mut rec = recs.remove(0);
        rec.best_setup = None;
        rec.all_gear_scores.clear();

        let mut plan = SessionPlan::new();
        plan.add(rec);
        let groups = plan.group_by_setup(&[], &observer());
        assert_eq!(groups.len(), 1);
        assert!(groups[0].setup_id.is_none());
        assert_eq!(groups[0].setup_name, UNASSIGNED_GROUP_NAME);
    }
}
