use std::cmp::Ordering;

use crate::models::{ForecastRecord, RiskBand, RiskRecord};

/// Per-district banding thresholds over all of that district's forecast values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandThresholds {
    pub q75: f64,
    pub q90: f64,
}

/// Linear-interpolation quantile over an ascending-sorted slice:
/// rank = p * (n - 1), interpolated between the bracketing values.
pub fn quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Thresholds are computed per district in isolation; one district's values
/// never shift another's bands. Non-finite forecasts are left out.
pub fn district_thresholds(
    forecasts: &[ForecastRecord],
) -> std::collections::HashMap<String, BandThresholds> {
    let mut by_district: std::collections::HashMap<String, Vec<f64>> =
        std::collections::HashMap::new();

    for forecast in forecasts {
        if forecast.yhat.is_finite() {
            by_district
                .entry(forecast.district.clone())
                .or_default()
                .push(forecast.yhat);
        }
    }

    by_district
        .into_iter()
        .map(|(district, mut values)| {
            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            let thresholds = BandThresholds {
                q75: quantile(&values, 0.75),
                q90: quantile(&values, 0.90),
            };
            (district, thresholds)
        })
        .collect()
}

/// Ties route to the higher band; a value equal to q90 is Red.
pub fn band_for(yhat: f64, thresholds: BandThresholds) -> RiskBand {
    if yhat >= thresholds.q90 {
        RiskBand::Red
    } else if yhat >= thresholds.q75 {
        RiskBand::Amber
    } else {
        RiskBand::Green
    }
}

/// Assign a band to every well-formed forecast, preserving input order.
/// Records whose `yhat` is non-finite are dropped rather than banded.
pub fn classify(forecasts: &[ForecastRecord]) -> Vec<RiskRecord> {
    let thresholds = district_thresholds(forecasts);

    forecasts
        .iter()
        .filter(|forecast| forecast.yhat.is_finite())
        .filter_map(|forecast| {
            thresholds.get(&forecast.district).map(|t| RiskRecord {
                week_start: forecast.week_start,
                state: forecast.state.clone(),
                district: forecast.district.clone(),
                yhat: forecast.yhat,
                risk_band: band_for(forecast.yhat, *t),
            })
        })
        .collect()
}
