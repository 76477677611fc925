//! Property-based tests for the agronomic core
//!
//! - Day counters follow the request dates
//! - Phase progress stays within [0, 1] and never decreases over the season
//! - Uncovered dates use the whole default weather tuple

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use shared::{
    classify_phase, derive_features, resolve_weather, Crop, GrowthPhase, IrrigationRequest,
    WeatherAggregates, WeatherReading, WeatherSource, WeatherTable,
};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn crop_strategy() -> impl Strategy<Value = Crop> {
    prop_oneof![Just(Crop::Maize), Just(Crop::Wheat)]
}

fn reading_on(date: NaiveDate, hour: u32, temp: f64) -> WeatherReading {
    WeatherReading {
        timestamp: NaiveDateTime::new(date, chrono::NaiveTime::from_hms_opt(hour, 0, 0).unwrap()),
        temperature_c: Some(temp),
        et0_mm: Some(0.3),
        wind_speed_mps: Some(1.5),
        soil_moisture: Some(0.2),
        precipitation_mm: Some(0.4),
    }
}

proptest! {
    #[test]
    fn prop_day_counters_follow_dates(
        sowing_offset in 0i64..400,
        season in 0i64..300,
        watering_back in proptest::option::of(0i64..300),
        crop in crop_strategy(),
    ) {
        let sowing = base_date() + Duration::days(sowing_offset);
        let simulated = sowing + Duration::days(season);
        let watering = watering_back.map(|back| simulated - Duration::days(back));

        let request = IrrigationRequest::new(sowing, simulated, watering, crop).unwrap();
        let derived = derive_features(&request, None);

        prop_assert_eq!(derived.days_since, season);
        prop_assert_eq!(derived.days_since_last_water, watering_back.unwrap_or(season));
        prop_assert!(derived.days_since >= 0 && derived.days_since_last_water >= 0);
    }

    #[test]
    fn prop_inverted_dates_are_rejected(
        gap in 1i64..500,
        crop in crop_strategy(),
    ) {
        let simulated = base_date();
        prop_assert!(IrrigationRequest::new(simulated + Duration::days(gap), simulated, None, crop).is_err());
        prop_assert!(
            IrrigationRequest::new(simulated, simulated, Some(simulated + Duration::days(gap)), crop).is_err()
        );
    }

    #[test]
    fn prop_progress_bounded_and_monotonic(
        days in 0i64..1000,
        step in 0i64..100,
        temp in -20.0f64..50.0,
        crop in crop_strategy(),
    ) {
        let earlier = classify_phase(crop, days, temp);
        let later = classify_phase(crop, days + step, temp);

        prop_assert!((0.0..=1.0).contains(&earlier.progress));
        prop_assert!((0.0..=1.0).contains(&later.progress));
        prop_assert!(later.progress >= earlier.progress);
        prop_assert!(later.phase >= earlier.phase);
    }

    #[test]
    fn prop_first_phase_until_established(
        temp in -20.0f64..60.0,
        crop in crop_strategy(),
    ) {
        let days = crop.establishment_days() - 1;
        let expected = match crop {
            Crop::Maize => GrowthPhase::Germination,
            Crop::Wheat => GrowthPhase::SeedlingStage,
        };
        prop_assert_eq!(classify_phase(crop, days, temp).phase, expected);
    }

    #[test]
    fn prop_uncovered_date_never_mixes_defaults(
        covered in proptest::collection::btree_set(0i64..60, 1..30),
        probe in 0i64..60,
        temp in 0.0f64..40.0,
    ) {
        let readings = covered
            .iter()
            .map(|offset| reading_on(base_date() + Duration::days(*offset), 12, temp));
        let table = WeatherTable::from_readings(readings);
        let date = base_date() + Duration::days(probe);

        let (weather, source) = resolve_weather(Some(&table), date);
        if covered.contains(&probe) {
            prop_assert_eq!(source, WeatherSource::Observed);
            prop_assert_eq!(weather.et0, 0.3);
            prop_assert_eq!(weather.soil_moisture, 0.2);
        } else {
            prop_assert_eq!(source, WeatherSource::DateNotFound);
            prop_assert_eq!(weather, WeatherAggregates::default());
        }
    }
}

#[test]
fn scenario_maize_with_uncovered_date() {
    let request = IrrigationRequest::new(
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 11).unwrap(),
        None,
        Crop::Maize,
    )
    .unwrap();
    let table = WeatherTable::from_readings(vec![reading_on(
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        0,
        3.0,
    )]);

    let derived = derive_features(&request, Some(&table));
    assert_eq!(derived.weather_source, WeatherSource::DateNotFound);
    assert_eq!(
        derived.vector.values(),
        [25.0, 5.0, 0.0, 3.0, 0.25, 10.0, 10.0, 0.0]
    );

    let phase = classify_phase(request.crop, derived.days_since, derived.weather.avg_temp);
    assert_eq!(phase.phase, GrowthPhase::VegetativeStage);
    assert_eq!(shared::round_half_even(phase.progress, 2), 0.08);
}
