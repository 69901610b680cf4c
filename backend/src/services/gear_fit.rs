//! Field-of-view and sampling fit of targets against imaging setups.

use crate::api::{
    FovFit, FovRating, GearCompatibility, GearFitResult, ResolutionFit, ResolutionRating,
    SetupRecommendation,
};
use crate::models::{OpticalSetup, Target, TargetType};

const FOV_WEIGHT: f64 = 0.6;
const RESOLUTION_WEIGHT: f64 = 0.4;

/// Overall score at which a target counts as having a good setup option.
pub const GOOD_OPTION_SCORE: u8 = 60;

/// Targets narrower than this (arcminutes) are judged on the small-target scale.
const SMALL_TARGET_ARCMIN: f64 = 5.0;

fn clamp_score(score: f64) -> u8 {
    score.clamp(0.0, 100.0).round() as u8
}

/// How well the target frames in the setup's field of view.
pub fn fov_fit(target: &Target, setup: &OpticalSetup) -> FovFit {
    let fov = setup.fov();
    let width_fill = target.size.width.value() / fov.width.value() * 100.0;
    let height_fill = target.size.height.value() / fov.height.value() * 100.0;
    let max_fill = width_fill.max(height_fill);

    let (score, rating, details) = if max_fill > 100.0 {
        let overflow = max_fill - 100.0;
        (
            (50.0 - overflow).max(0.0),
            FovRating::TooLarge,
            format!("Target exceeds FOV by {}%. Consider mosaic.", overflow.round()),
        )
    } else if max_fill > 70.0 {
        (
            70.0 + (100.0 - max_fill),
            FovRating::TightFit,
            format!("Fills {}% of FOV. Limited framing options.", max_fill.round()),
        )
    } else if max_fill >= 30.0 {
        (
            90.0 + (max_fill - 30.0) / 4.0,
            FovRating::Excellent,
            format!("Fills {}% of FOV. Ideal framing.", max_fill.round()),
        )
    } else if max_fill >= 15.0 {
        (
            60.0 + max_fill,
            FovRating::Good,
            format!("Fills {}% of FOV. Room for context.", max_fill.round()),
        )
    } else if max_fill >= 5.0 {
        (
            30.0 + max_fill * 2.0,
            FovRating::Small,
            format!(
                "Only fills {}% of FOV. Consider longer focal length.",
                max_fill.round()
            ),
        )
    } else {
        (
            max_fill * 6.0,
            FovRating::TooSmall,
            format!("Fills only {:.1}% of FOV. Much longer FL needed.", max_fill),
        )
    };

    FovFit {
        score: clamp_score(score),
        rating,
        details,
        fill_percent: max_fill,
    }
}

/// How many pixels the setup puts across the target's minor axis.
pub fn resolution_fit(target: &Target, setup: &OpticalSetup) -> ResolutionFit {
    let minor_arcsec = target.size.minor_axis().value() * 60.0;
    let pixels_across = minor_arcsec / setup.pixel_scale();
    let px = pixels_across.round();

    let is_small = target.target_type == TargetType::PlanetaryNebula
        || target.size.width.value() < SMALL_TARGET_ARCMIN;

    let (score, rating, details) = if is_small {
        if pixels_across >= 200.0 {
            (95, ResolutionRating::Excellent, format!("{} pixels across. Great resolution.", px))
        } else if pixels_across >= 100.0 {
            (75, ResolutionRating::Good, format!("{} pixels across. Adequate detail.", px))
        } else if pixels_across >= 50.0 {
            (
                50,
                ResolutionRating::Marginal,
                format!("Only {} pixels across. Limited detail.", px),
            )
        } else {
            (
                20,
                ResolutionRating::Undersampled,
                format!("Only {} pixels. Need longer FL.", px),
            )
        }
    } else if pixels_across >= 500.0 {
        (
            95,
            ResolutionRating::Excellent,
            format!("{} pixels across. Great detail potential.", px),
        )
    } else if pixels_across >= 200.0 {
        (90, ResolutionRating::VeryGood, format!("{} pixels across. Good resolution.", px))
    } else if pixels_across >= 100.0 {
        (75, ResolutionRating::Good, format!("{} pixels across. Adequate.", px))
    } else {
        (50, ResolutionRating::LowRes, format!("{} pixels. Fine for context shots.", px))
    };

    ResolutionFit {
        score,
        rating,
        details,
        pixels_across: px.max(0.0) as u32,
    }
}

/// Verdict for a combined score.
pub fn recommendation_label(combined_score: u8) -> SetupRecommendation {
    match combined_score {
        85..=u8::MAX => SetupRecommendation::HighlyRecommended,
        70..=84 => SetupRecommendation::GoodMatch,
        50..=69 => SetupRecommendation::Workable,
        30..=49 => SetupRecommendation::Challenging,
        _ => SetupRecommendation::NotRecommended,
    }
}

/// Score one target against one setup.
pub fn score_setup(target: &Target, setup: &OpticalSetup) -> GearFitResult {
    let fov_fit = fov_fit(target, setup);
    let resolution_fit = resolution_fit(target, setup);
    let combined = clamp_score(
        fov_fit.score as f64 * FOV_WEIGHT + resolution_fit.score as f64 * RESOLUTION_WEIGHT,
    );

    GearFitResult {
        setup_id: setup.id().clone(),
        setup_name: setup.name().to_string(),
        fov_fit,
        resolution_fit,
        combined_score: combined,
        recommendation: recommendation_label(combined),
    }
}

/// Score every setup and order them best first. Ties keep the order of `setups`.
pub fn rank_setups(target: &Target, setups: &[OpticalSetup]) -> Vec<GearFitResult> {
    let mut scores: Vec<GearFitResult> = setups.iter().map(|s| score_setup(target, s)).collect();
    // sort_by is stable
    scores.sort_by(|a, b| b.combined_score.cmp(&a.combined_score));
    scores
}

/// Ranked setups plus the best option for a target.
pub fn gear_compatibility(target: &Target, setups: &[OpticalSetup]) -> GearCompatibility {
    let all = rank_setups(target, setups);
    let best = all.first().cloned();
    let overall_score = best.as_ref().map_or(0, |b| b.combined_score);

    GearCompatibility {
        best,
        all,
        overall_score,
        has_good_option: overall_score >= GOOD_OPTION_SCORE,
    }
}

/// Setups scoring at least `min_score`, best first.
pub fn suitable_setups(
    target: &Target,
    setups: &[OpticalSetup],
    min_score: u8,
) -> Vec<GearFitResult> {
    rank_setups(target, setups)
        .into_iter()
        .filter(|s| s.combined_score >= min_score)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AngularSize, FieldOfView, FocalLengthBand, MeasuredOptics, SetupCategory, SetupId,
        TargetId,
    };
    use qtty::Degrees;

    fn target(target_type: TargetType, width: f64, height: f64) -> Target {
        Target {
            id: TargetId::from("T"),
            name: "Test".to_string(),
            alt_names: vec![],
            target_type,
            constellation: "Test".to_string(),
            ra: 1.0,
            dec: Degrees::new(10.0),
            magnitude: 8.0,
            size: AngularSize::new(width, height),
            best_months: vec![],
            focal_length: FocalLengthBand::Medium,
            difficulty: None,
            description: String::new(),
            tags: vec![],
        }
    }

    fn setup(id: &str, pixel_scale: f64, fov_w: f64, fov_h: f64) -> OpticalSetup {
        OpticalSetup::with_measured(
            SetupId::from(id),
            id.to_uppercase(),
            400.0,
            MeasuredOptics {
                pixel_scale,
                fov: FieldOfView::new(fov_w, fov_h),
            },
            SetupCategory::MainRig,
        )
    }

    #[test]
    fn test_fov_fit_ideal_framing() {
        let s = setup("a", 2.0, 90.0, 90.0);
        let fit = fov_fit(&target(TargetType::Galaxy, 60.0, 60.0), &s);
        assert!((fit.fill_percent - 66.666).abs() < 0.01);
        assert_eq!(fit.score, 99);
        assert_eq!(fit.rating, FovRating::Excellent);
        assert_eq!(fit.details, "Fills 67% of FOV. Ideal framing.");
    }

    #[test]
    fn test_fov_fit_bands() {
        let s = setup("a", 2.0, 100.0, 100.0);
        let cases = [
            (250.0, 0, FovRating::TooLarge),
            (120.0, 30, FovRating::TooLarge),
            (80.0, 90, FovRating::TightFit),
            (50.0, 95, FovRating::Excellent),
            (20.0, 80, FovRating::Good),
            (10.0, 50, FovRating::Small),
            (2.0, 12, FovRating::TooSmall),
        ];
        for (size, score, rating) in cases {
            let fit = fov_fit(&target(TargetType::Galaxy, size, 1.0), &s);
            assert_eq!(fit.score, score, "size {}", size);
            assert_eq!(fit.rating, rating, "size {}", size);
        }
    }

    #[test]
    fn test_fov_fit_details() {
        let s = setup("a", 2.0, 100.0, 100.0);
        let fit = fov_fit(&target(TargetType::Galaxy, 190.0, 60.0), &s);
        assert_eq!(fit.details, "Target exceeds FOV by 90%. Consider mosaic.");
        let fit = fov_fit(&target(TargetType::Galaxy, 2.5, 1.0), &s);
        assert_eq!(fit.details, "Fills only 2.5% of FOV. Much longer FL needed.");
    }

    #[test]
    fn test_fov_fit_uses_tighter_axis() {
        // Wide sensor: height fills more
        let s = setup("a", 2.0, 76.8, 43.2);
        let fit = fov_fit(&target(TargetType::Galaxy, 40.0, 40.0), &s);
        assert!((fit.fill_percent - 92.59).abs() < 0.01);
        assert_eq!(fit.rating, FovRating::TightFit);
    }

    #[test]
    fn test_resolution_fit_large_target() {
        let s = setup("a", 2.0, 90.0, 90.0);
        let fit = resolution_fit(&target(TargetType::Galaxy, 20.0, 10.0), &s);
        assert_eq!(fit.pixels_across, 300);
        assert_eq!(fit.score, 90);
        assert_eq!(fit.rating, ResolutionRating::VeryGood);
        assert_eq!(fit.details, "300 pixels across. Good resolution.");

        let fit = resolution_fit(&target(TargetType::Galaxy, 60.0, 60.0), &s);
        assert_eq!(fit.score, 95);
        let fit = resolution_fit(&target(TargetType::Galaxy, 6.0, 6.0), &s);
        assert_eq!(fit.rating, ResolutionRating::Good);
        let fit = resolution_fit(&target(TargetType::Galaxy, 6.0, 3.0), &s);
        assert_eq!(fit.rating, ResolutionRating::LowRes);
        assert_eq!(fit.score, 50);
    }

    #[test]
    fn test_resolution_fit_small_target() {
        // Ring Nebula at 1.54"/px
        let fit = resolution_fit(
            &target(TargetType::PlanetaryNebula, 1.4, 1.0),
            &setup("a", 1.54, 77.3, 77.3),
        );
        assert_eq!(fit.pixels_across, 39);
        assert_eq!(fit.rating, ResolutionRating::Undersampled);
        assert_eq!(fit.score, 20);
        assert_eq!(fit.details, "Only 39 pixels. Need longer FL.");

        // Planetary nebulae use the small scale regardless of size
        let fit = resolution_fit(
            &target(TargetType::PlanetaryNebula, 16.0, 12.0),
            &setup("a", 2.0, 90.0, 90.0),
        );
        assert_eq!(fit.pixels_across, 360);
        assert_eq!(fit.rating, ResolutionRating::Excellent);

        // Narrow non-planetary targets too
        let s = setup("a", 1.0, 90.0, 90.0);
        let fit = resolution_fit(&target(TargetType::Galaxy, 4.0, 3.0), &s);
        assert_eq!(fit.rating, ResolutionRating::Good);
        assert_eq!(fit.score, 75);
    }

    #[test]
    fn test_combined_score_and_label() {
        let s = setup("a", 2.0, 90.0, 90.0);
        let result = score_setup(&target(TargetType::Galaxy, 60.0, 10.0), &s);
        assert_eq!(result.fov_fit.score, 99);
        assert_eq!(result.resolution_fit.score, 90);
        assert_eq!(result.combined_score, 95);
        assert_eq!(result.recommendation, SetupRecommendation::HighlyRecommended);
        assert_eq!(result.setup_name, "A");
    }

    #[test]
    fn test_recommendation_labels() {
        assert_eq!(recommendation_label(100), SetupRecommendation::HighlyRecommended);
        assert_eq!(recommendation_label(85), SetupRecommendation::HighlyRecommended);
        assert_eq!(recommendation_label(84), SetupRecommendation::GoodMatch);
        assert_eq!(recommendation_label(70), SetupRecommendation::GoodMatch);
        assert_eq!(recommendation_label(50), SetupRecommendation::Workable);
        assert_eq!(recommendation_label(30), SetupRecommendation::Challenging);
        assert_eq!(recommendation_label(29), SetupRecommendation::NotRecommended);
    }

    #[test]
    fn test_rank_setups_stable_on_ties() {
        let t = target(TargetType::Galaxy, 60.0, 10.0);
        let setups = vec![
            setup("wide", 10.0, 1000.0, 1000.0),
            setup("first", 2.0, 90.0, 90.0),
            setup("second", 2.0, 90.0, 90.0),
        ];
        let ranked = rank_setups(&t, &setups);
        let ids: Vec<&str> = ranked.iter().map(|r| r.setup_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "wide"]);
    }

    #[test]
    fn test_gear_compatibility_summary() {
        let t = target(TargetType::Galaxy, 60.0, 10.0);
        let setups = vec![setup("wide", 10.0, 1000.0, 1000.0), setup("fit", 2.0, 90.0, 90.0)];

        let compat = gear_compatibility(&t, &setups);
        assert_eq!(compat.best.as_ref().map(|b| b.setup_id.as_str()), Some("fit"));
        assert_eq!(compat.overall_score, 95);
        assert!(compat.has_good_option);
        assert_eq!(compat.all.len(), 2);

        let empty = gear_compatibility(&t, &[]);
        assert!(empty.best.is_none());
        assert_eq!(empty.overall_score, 0);
        assert!(!empty.has_good_option);
    }

    #[test]
    fn test_suitable_setups_threshold() {
        let t = target(TargetType::Galaxy, 60.0, 10.0);
        let setups = vec![setup("wide", 10.0, 1000.0, 1000.0), setup("fit", 2.0, 90.0, 90.0)];
        // wide: fill 6% -> 42, 60 px -> 50; combined 45
        let suitable = suitable_setups(&t, &setups, 50);
        assert_eq!(suitable.len(), 1);
        assert_eq!(suitable[0].setup_id.as_str(), "fit");
        assert_eq!(suitable_setups(&t, &setups, 0).len(), 2);
    }
}
