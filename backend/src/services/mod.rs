//! Service layer: positional astronomy, scoring and planning.
//!
//! Modules are layered leaves first: coordinates and rise/set sit on the time
//! helpers in [`crate::models`], visibility and gear fit score single targets, and
//! the recommendation engine and session planner orchestrate them.

pub mod coordinates;
pub mod gear_fit;
pub mod lunar;
pub mod recommendation;
pub mod rise_set;
pub mod session_plan;
pub mod visibility;

pub use coordinates::{
    angular_separation, cardinal_direction, equatorial_to_horizontal, format_dec, format_ra,
};
pub use gear_fit::{
    fov_fit, gear_compatibility, rank_setups, recommendation_label, resolution_fit, score_setup,
    suitable_setups,
};
pub use lunar::{illumination, moon_phase, moon_position, phase_fraction, phase_name, MoonPosition};
pub use recommendation::RecommendationEngine;
pub use rise_set::{hours_above_altitude, rise_transit_set, transit_time};
pub use session_plan::{plan_session, reprioritize, SessionPlan};
pub use visibility::score_target;
