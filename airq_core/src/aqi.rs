//! AQI derivation: correction models, EPA breakpoint interpolation, and the
//! 5-level display category.
//!
//! Each correction model is a one-line linear transform over the reading's
//! stored concentrations; all of them feed the same breakpoint mapping.

use crate::error::AqiError;
use crate::reading::Reading;

/// Which published correction is applied to the stored concentration before
/// the breakpoint mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrectionModel {
    /// Manufacturer default: the primary value as reported.
    #[default]
    None,
    /// AQ&U (University of Utah) correction.
    AqAndU,
    /// Lane Regional Air Protection Agency correction.
    Lrapa,
    /// EPA correction; needs relative humidity.
    Epa,
    /// EPA woodsmoke correction.
    Woodsmoke,
    /// Use the alternate-channel value as-is.
    Alt,
}

impl std::str::FromStr for CorrectionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" | "none" => Ok(Self::None),
            "AQandU" => Ok(Self::AqAndU),
            "LRAPA" => Ok(Self::Lrapa),
            "EPA" => Ok(Self::Epa),
            "WOODSMOKE" | "Woodsmoke" => Ok(Self::Woodsmoke),
            "ALT" | "ALT-CF3" => Ok(Self::Alt),
            other => Err(format!(
                "unknown conversion `{other}` (expected None|AQandU|LRAPA|EPA|WOODSMOKE|ALT-CF3)"
            )),
        }
    }
}

/// What to do when the EPA model is asked for a reading without humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HumidityPolicy {
    /// Surface [`AqiError::MissingHumidity`].
    #[default]
    Fail,
    /// Degrade to the uncorrected primary value.
    FallbackToRaw,
}

/// Concentration after the reading's correction model has been applied.
///
/// The result may be negative; the breakpoint mapping clamps to AQI 0,
/// not this function.
pub fn corrected_concentration(reading: &Reading) -> Result<f64, AqiError> {
    corrected_with(reading, HumidityPolicy::Fail)
}

fn corrected_with(reading: &Reading, policy: HumidityPolicy) -> Result<f64, AqiError> {
    let c = match reading.model {
        CorrectionModel::None => reading.pm25,
        CorrectionModel::AqAndU => 0.778 * reading.pm25 + 2.65,
        CorrectionModel::Lrapa => 0.5 * reading.pm25_cf1 - 0.66,
        CorrectionModel::Epa => match (reading.humidity, policy) {
            (Some(h), _) => 0.534 * reading.pm25_cf1 - 0.0844 * h + 5.604,
            (None, HumidityPolicy::Fail) => return Err(AqiError::MissingHumidity),
            (None, HumidityPolicy::FallbackToRaw) => reading.pm25,
        },
        CorrectionModel::Woodsmoke => 0.55 * reading.pm25_cf1 + 0.53,
        CorrectionModel::Alt => reading.pm25_alt,
    };
    Ok(c)
}

/// AQI for a reading under its correction model, failing when the EPA model
/// lacks humidity.
pub fn compute_aqi(reading: &Reading) -> Result<f64, AqiError> {
    compute_aqi_with(reading, HumidityPolicy::Fail)
}

/// AQI with an explicit missing-humidity policy.
pub fn compute_aqi_with(reading: &Reading, policy: HumidityPolicy) -> Result<f64, AqiError> {
    Ok(pm_to_aqi(corrected_with(reading, policy)?))
}

/// One row of the EPA PM2.5 breakpoint table: concentrations in
/// `c_lo..=c_hi` map linearly onto AQI `i_lo..=i_hi`.
struct Band {
    cut: f64,
    c_lo: f64,
    c_hi: f64,
    i_lo: f64,
    i_hi: f64,
}

/// EPA PM2.5 breakpoints, highest band first; a concentration belongs to the
/// first band whose cut it exceeds. Values above the top band extrapolate
/// along the top band's slope.
#[rustfmt::skip]
const BANDS: [Band; 6] = [
    Band { cut: 350.5, c_lo: 350.5, c_hi: 500.0, i_lo: 401.0, i_hi: 500.0 },
    Band { cut: 250.5, c_lo: 250.5, c_hi: 350.4, i_lo: 301.0, i_hi: 400.0 },
    Band { cut: 150.5, c_lo: 150.5, c_hi: 250.4, i_lo: 201.0, i_hi: 300.0 },
    Band { cut:  55.5, c_lo:  55.5, c_hi: 150.4, i_lo: 151.0, i_hi: 200.0 },
    Band { cut:  35.5, c_lo:  35.5, c_hi:  55.4, i_lo: 101.0, i_hi: 150.0 },
    Band { cut:  12.1, c_lo:  12.1, c_hi:  35.4, i_lo:  51.0, i_hi: 100.0 },
];

/// Lowest band: 0..=12 ug/m3 maps onto AQI 0..=50.
const FLOOR: Band = Band { cut: 0.0, c_lo: 0.0, c_hi: 12.0, i_lo: 0.0, i_hi: 50.0 };

/// Piecewise-linear EPA mapping from a PM2.5 concentration (ug/m3) to an
/// AQI, rounded half away from zero. Negative and non-finite inputs map
/// to AQI 0.
pub fn pm_to_aqi(concentration: f64) -> f64 {
    if !concentration.is_finite() || concentration < 0.0 {
        return 0.0;
    }
    let band = BANDS
        .iter()
        .find(|b| concentration > b.cut)
        .unwrap_or(&FLOOR);
    interpolate(concentration, band).round()
}

/// AQI = (I_hi - I_lo) / (C_hi - C_lo) * (C - C_lo) + I_lo
fn interpolate(c: f64, b: &Band) -> f64 {
    (b.i_hi - b.i_lo) / (b.c_hi - b.c_lo) * (c - b.c_lo) + b.i_lo
}

/// Map an AQI onto the 5-level consumer display category (1 = excellent,
/// 5 = poor; the two most severe EPA categories collapse into 5).
///
/// `None` and non-finite values report the "no data" sentinel 0, which is
/// distinct from every real category.
pub fn to_category(aqi: Option<f64>) -> u8 {
    let Some(aqi) = aqi else { return 0 };
    if !aqi.is_finite() {
        return 0;
    }
    if aqi <= 50.0 {
        1
    } else if aqi <= 100.0 {
        2
    } else if aqi <= 150.0 {
        3
    } else if aqi <= 200.0 {
        4
    } else {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_map_to_zero() {
        assert_eq!(pm_to_aqi(0.0), 0.0);
        assert_eq!(pm_to_aqi(-3.2), 0.0);
        assert_eq!(pm_to_aqi(f64::NAN), 0.0);
    }

    #[test]
    fn band_anchor_values() {
        assert_eq!(pm_to_aqi(12.0), 50.0);
        assert_eq!(pm_to_aqi(35.4), 100.0);
        assert_eq!(pm_to_aqi(55.4), 150.0);
        assert_eq!(pm_to_aqi(150.4), 200.0);
        assert_eq!(pm_to_aqi(250.4), 300.0);
        assert_eq!(pm_to_aqi(350.4), 400.0);
        assert_eq!(pm_to_aqi(500.0), 500.0);
    }

    #[test]
    fn extrapolates_above_the_top_band() {
        assert!(pm_to_aqi(600.0) > 500.0);
    }

    #[test]
    fn category_bands() {
        assert_eq!(to_category(None), 0);
        assert_eq!(to_category(Some(f64::NAN)), 0);
        assert_eq!(to_category(Some(0.0)), 1);
        assert_eq!(to_category(Some(50.0)), 1);
        assert_eq!(to_category(Some(51.0)), 2);
        assert_eq!(to_category(Some(100.0)), 2);
        assert_eq!(to_category(Some(150.0)), 3);
        assert_eq!(to_category(Some(200.0)), 4);
        assert_eq!(to_category(Some(201.0)), 5);
        assert_eq!(to_category(Some(500.0)), 5);
    }

    #[test]
    fn model_strings_round_trip_from_config() {
        assert_eq!("AQandU".parse::<CorrectionModel>().unwrap(), CorrectionModel::AqAndU);
        assert_eq!("ALT-CF3".parse::<CorrectionModel>().unwrap(), CorrectionModel::Alt);
        assert!("AQI".parse::<CorrectionModel>().is_err());
    }
}
