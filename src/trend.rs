use crate::models::{DistrictTrend, HistoricalRecord, HistoryPoint, RiskRecord, TrendPoint};

/// How many trailing weeks of actuals to keep under the forecast layer.
const TRAILING_WEEKS: usize = 40;

/// Compose one district's forecast series with its optional historical
/// actuals. Districts missing from the historical dataset simply get an
/// empty overlay.
pub fn compose(
    risk: &[RiskRecord],
    historical: Option<&[HistoricalRecord]>,
    district: &str,
) -> DistrictTrend {
    let mut forecast: Vec<TrendPoint> = risk
        .iter()
        .filter(|record| record.district == district)
        .map(|record| TrendPoint {
            week_start: record.week_start,
            yhat: record.yhat,
            risk_band: record.risk_band,
        })
        .collect();
    forecast.sort_by_key(|point| point.week_start);

    let mut actuals: Vec<HistoryPoint> = historical
        .unwrap_or_default()
        .iter()
        .filter(|record| record.district == district)
        .map(|record| HistoryPoint {
            week_start: record.week_start,
            cases: record.cases,
        })
        .collect();
    actuals.sort_by_key(|point| point.week_start);
    if actuals.len() > TRAILING_WEEKS {
        actuals.drain(..actuals.len() - TRAILING_WEEKS);
    }

    DistrictTrend {
        district: district.to_string(),
        forecast,
        historical: actuals,
    }
}
