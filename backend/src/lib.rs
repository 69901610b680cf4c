//! # Astro Planner
//!
//! Target visibility and gear-compatibility scoring for astrophotography sessions.
//!
//! Given an observer location and time, a moon snapshot, a catalog of deep-sky targets
//! and the user's imaging setups, the planner ranks what is worth shooting tonight and
//! which setup frames each target best.
//!
//! ## Features
//!
//! - **Time Handling**: Julian Date and Greenwich/local mean sidereal time
//! - **Coordinates**: equatorial to horizontal transforms, angular separation
//! - **Rise/Transit/Set**: circumpolar and never-rises detection, hours above altitude
//! - **Moon**: low-order position, phase fraction, illumination and phase name
//! - **Scoring**: 0-100 visibility score, field-of-view and sampling fit per setup
//! - **Planning**: filtered recommendations and per-setup session groups
//!
//! ## Architecture
//!
//! - [`api`]: public input and result types
//! - [`models`]: catalog records, gear, ids and time primitives
//! - [`services`]: astronomy, scoring and orchestration
//! - [`config`]: TOML configuration
//! - [`error`]: error types
//!
//! The numeric core never fails; errors only come from location validation,
//! configuration and catalog loading.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use api::{
    GeographicLocation, MoonState, ObserverContext, Recommendation, RecommendationFilters,
    VisibilityResult,
};
pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use services::RecommendationEngine;
