use airq_core::mocks::FixedClock;
use airq_core::{CorrectionModel, NormalizedFields, Reading, pm_to_aqi, to_category};
use proptest::prelude::*;

fn reading(pm25: f64, model: CorrectionModel) -> Reading {
    Reading::new(
        NormalizedFields {
            sensor_id: "p".into(),
            pm25,
            pm25_cf1: pm25,
            pm25_alt: pm25,
            humidity: None,
            temperature: None,
            voc: None,
        },
        model,
        &FixedClock(0),
    )
}

proptest! {
    /// AQI (and therefore category) never decreases as PM2.5 increases.
    #[test]
    fn aqi_is_monotone_in_pm25(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let aqi_lo = reading(lo, CorrectionModel::None).aqi().unwrap();
        let aqi_hi = reading(hi, CorrectionModel::None).aqi().unwrap();
        prop_assert!(aqi_lo <= aqi_hi);
        prop_assert!(to_category(Some(aqi_lo)) <= to_category(Some(aqi_hi)));
    }

    /// The category is a pure function of the AQI.
    #[test]
    fn category_is_deterministic(aqi in 0.0f64..600.0) {
        prop_assert_eq!(to_category(Some(aqi)), to_category(Some(aqi)));
    }

    /// LRAPA can correct small concentrations below zero; those must map to
    /// AQI 0, never to a negative index.
    #[test]
    fn negative_corrections_clamp_to_zero(pm in 0.0f64..1.3) {
        let aqi = reading(pm, CorrectionModel::Lrapa).aqi().unwrap();
        prop_assert_eq!(aqi, 0.0);
    }

    /// Category 0 is reserved for "no data"; real AQIs always land in 1..=5.
    #[test]
    fn real_aqi_never_reports_the_sentinel(pm in 0.0f64..2000.0) {
        let aqi = reading(pm, CorrectionModel::None).aqi().unwrap();
        let category = to_category(Some(aqi));
        prop_assert!((1..=5).contains(&category));
    }
}

/// The published band boundaries. The EPA table is quantized (… 50|51,
/// 100|101 …), so crossing a boundary may step the rounded AQI by at most
/// one point; it must never step down.
#[test]
fn band_boundaries_are_continuous_to_within_rounding() {
    for boundary in [12.1, 35.5, 55.5, 150.5, 250.5, 350.5] {
        let below = pm_to_aqi(boundary);
        let above = pm_to_aqi(boundary + 1e-9);
        assert!(above >= below, "AQI steps down at {boundary}");
        assert!(
            above - below <= 1.0,
            "AQI jumps by {} at {boundary}",
            above - below
        );
    }
}

#[test]
fn interpolation_matches_the_epa_formula_inside_a_band() {
    // Hand-computed point inside the 35.5..55.4 band.
    // AQI = (150-101)/(55.4-35.5) * (45.0-35.5) + 101 = 124.39 -> 124
    assert_eq!(pm_to_aqi(45.0), 124.0);
}
