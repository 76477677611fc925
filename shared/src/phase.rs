//! Crop growth phase classification
//!
//! Heat accumulation is approximated as `days_since * max(avg_temp - base, 0)`,
//! using the simulated day's temperature for the whole season.

use crate::models::{Crop, GrowthPhase, PhaseEstimate};

/// Ascending GDD upper bounds (exclusive) for every phase before maturation
fn phase_ladder(crop: Crop) -> &'static [(f64, GrowthPhase)] {
    match crop {
        Crop::Maize => &[
            (100.0, GrowthPhase::Germination),
            (600.0, GrowthPhase::VegetativeStage),
            (1100.0, GrowthPhase::Flowering),
            (1600.0, GrowthPhase::GrainFilling),
        ],
        Crop::Wheat => &[
            (200.0, GrowthPhase::SeedlingStage),
            (700.0, GrowthPhase::StemElongation),
            (1100.0, GrowthPhase::Flowering),
            (1500.0, GrowthPhase::GrainFilling),
        ],
    }
}

/// Approximate growing degree days since sowing
pub fn approximate_gdd(crop: Crop, days_since: i64, avg_temp: f64) -> f64 {
    let daily = (avg_temp - crop.base_temperature_c()).max(0.0);
    days_since.max(0) as f64 * daily
}

/// Classify the phenological phase of `crop`
pub fn classify_phase(crop: Crop, days_since: i64, avg_temp: f64) -> PhaseEstimate {
    let gdd = approximate_gdd(crop, days_since, avg_temp);
    let ladder = phase_ladder(crop);

    // Too early to leave the first phase, however warm it has been
    let phase = if days_since < crop.establishment_days() {
        ladder[0].1
    } else {
        ladder
            .iter()
            .find(|(upper, _)| gdd < *upper)
            .map(|(_, phase)| *phase)
            .unwrap_or(GrowthPhase::Maturation)
    };

    PhaseEstimate {
        phase,
        gdd,
        progress: (gdd / crop.gdd_to_maturity()).clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maize_ladder() {
        // 20 days at 20°C → 10 GDD/day
        assert_eq!(classify_phase(Crop::Maize, 20, 20.0).phase, GrowthPhase::VegetativeStage);
        assert_eq!(classify_phase(Crop::Maize, 9, 20.0).phase, GrowthPhase::Germination);
        assert_eq!(classify_phase(Crop::Maize, 60, 20.0).phase, GrowthPhase::Flowering);
        assert_eq!(classify_phase(Crop::Maize, 110, 20.0).phase, GrowthPhase::GrainFilling);
        assert_eq!(classify_phase(Crop::Maize, 160, 20.0).phase, GrowthPhase::Maturation);
    }

    #[test]
    fn test_wheat_ladder() {
        // 10 GDD/day at 14°C
        assert_eq!(classify_phase(Crop::Wheat, 19, 40.0).phase, GrowthPhase::SeedlingStage);
        assert_eq!(classify_phase(Crop::Wheat, 20, 14.0).phase, GrowthPhase::StemElongation);
        assert_eq!(classify_phase(Crop::Wheat, 70, 14.0).phase, GrowthPhase::Flowering);
        assert_eq!(classify_phase(Crop::Wheat, 110, 14.0).phase, GrowthPhase::GrainFilling);
        assert_eq!(classify_phase(Crop::Wheat, 150, 14.0).phase, GrowthPhase::Maturation);
    }

    #[test]
    fn test_boundaries_are_exclusive_upper_bounds() {
        // gdd == 100 leaves germination, gdd == 600 leaves vegetative
        assert_eq!(classify_phase(Crop::Maize, 10, 20.0).phase, GrowthPhase::VegetativeStage);
        assert_eq!(classify_phase(Crop::Maize, 60, 20.0).gdd, 600.0);
        assert_eq!(classify_phase(Crop::Maize, 60, 20.0).phase, GrowthPhase::Flowering);
    }

    #[test]
    fn test_establishment_floor_overrides_heat() {
        let estimate = classify_phase(Crop::Maize, 5, 40.0);
        assert_eq!(estimate.gdd, 150.0);
        assert_eq!(estimate.phase, GrowthPhase::Germination);
    }

    #[test]
    fn test_cold_weather_accumulates_nothing() {
        let estimate = classify_phase(Crop::Maize, 90, 8.0);
        assert_eq!(estimate.gdd, 0.0);
        assert_eq!(estimate.progress, 0.0);
        assert_eq!(estimate.phase, GrowthPhase::Germination);
    }

    #[test]
    fn test_progress_saturates() {
        let estimate = classify_phase(Crop::Wheat, 400, 30.0);
        assert_eq!(estimate.progress, 1.0);
        assert_eq!(estimate.phase, GrowthPhase::Maturation);
    }

    #[test]
    fn test_default_weather_scenarios() {
        let maize = classify_phase(Crop::Maize, 10, 25.0);
        assert_eq!(maize.gdd, 150.0);
        assert_eq!(maize.phase, GrowthPhase::VegetativeStage);

        let wheat = classify_phase(Crop::Wheat, 10, 25.0);
        assert_eq!(wheat.gdd, 210.0);
        assert_eq!(wheat.phase, GrowthPhase::SeedlingStage);
    }
}
