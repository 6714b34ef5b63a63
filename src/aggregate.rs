use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::{BandWeekCount, KpiSummary, RiskBand, RiskRecord};

/// Distinct-district counts per (week, band). Every week present in the view
/// reports all three bands in the fixed Green/Amber/Red order, zero-filled,
/// so downstream stacking and color mapping stay stable.
pub fn band_by_week(view: &[RiskRecord]) -> Vec<BandWeekCount> {
    let mut weeks: BTreeSet<NaiveDate> = BTreeSet::new();
    let mut districts: BTreeMap<(NaiveDate, RiskBand), BTreeSet<&str>> = BTreeMap::new();

    for record in view {
        weeks.insert(record.week_start);
        districts
            .entry((record.week_start, record.risk_band))
            .or_default()
            .insert(record.district.as_str());
    }

    let mut counts = Vec::with_capacity(weeks.len() * RiskBand::ORDERED.len());
    for week in weeks {
        for band in RiskBand::ORDERED {
            counts.push(BandWeekCount {
                week_start: week,
                risk_band: band,
                district_count: districts.get(&(week, band)).map_or(0, BTreeSet::len),
            });
        }
    }
    counts
}

/// Scalar summary of a view. An empty view degrades to zeros rather than
/// reporting an undefined median.
pub fn kpis(view: &[RiskRecord]) -> KpiSummary {
    let states: BTreeSet<&str> = view.iter().map(|record| record.state.as_str()).collect();
    let districts: BTreeSet<&str> = view.iter().map(|record| record.district.as_str()).collect();
    let values: Vec<f64> = view.iter().map(|record| record.yhat).collect();

    KpiSummary {
        state_count: states.len(),
        district_count: districts.len(),
        median_yhat: (median(&values) * 10.0).round() / 10.0,
        red_count: view
            .iter()
            .filter(|record| record.risk_band == RiskBand::Red)
            .count(),
    }
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(district: &str, week: i64, yhat: f64, band: RiskBand) -> RiskRecord {
        let first = NaiveDate::from_ymd_opt(2025, 11, 16).unwrap();
        RiskRecord {
            week_start: first + Duration::weeks(week),
            state: "Tamil Nadu".to_string(),
            district: district.to_string(),
            yhat,
            risk_band: band,
        }
    }

    #[test]
    fn absent_bands_report_zero_counts() {
        let view = vec![record("Chennai", 0, 60.0, RiskBand::Green)];
        let counts = band_by_week(&view);

        assert_eq!(counts.len(), 3);
        let bands: Vec<RiskBand> = counts.iter().map(|c| c.risk_band).collect();
        assert_eq!(bands, vec![RiskBand::Green, RiskBand::Amber, RiskBand::Red]);
        let totals: Vec<usize> = counts.iter().map(|c| c.district_count).collect();
        assert_eq!(totals, vec![1, 0, 0]);
    }

    #[test]
    fn counts_are_distinct_districts() {
        // a duplicated input row must not inflate the chart
        let view = vec![
            record("Chennai", 0, 60.0, RiskBand::Green),
            record("Chennai", 0, 60.0, RiskBand::Green),
            record("Coimbatore", 0, 70.0, RiskBand::Green),
        ];
        let counts = band_by_week(&view);
        assert_eq!(counts[0].district_count, 2);
    }

    #[test]
    fn weeks_come_out_ascending() {
        let view = vec![
            record("Chennai", 2, 60.0, RiskBand::Green),
            record("Chennai", 0, 70.0, RiskBand::Amber),
        ];
        let counts = band_by_week(&view);
        assert_eq!(counts.len(), 6);
        assert!(counts[0].week_start < counts[3].week_start);
    }

    #[test]
    fn empty_view_degrades_to_zeros() {
        let summary = kpis(&[]);
        assert_eq!(summary.state_count, 0);
        assert_eq!(summary.district_count, 0);
        assert_eq!(summary.median_yhat, 0.0);
        assert_eq!(summary.red_count, 0);
    }

    #[test]
    fn median_of_three_values() {
        let view = vec![
            record("Chennai", 0, 10.0, RiskBand::Green),
            record("Chennai", 1, 20.0, RiskBand::Green),
            record("Chennai", 2, 30.0, RiskBand::Red),
        ];
        let summary = kpis(&view);
        assert_eq!(summary.median_yhat, 20.0);
        assert_eq!(summary.red_count, 1);
    }

    #[test]
    fn median_rounds_to_one_decimal() {
        let view = vec![record("Chennai", 0, 33.33, RiskBand::Green)];
        assert_eq!(kpis(&view).median_yhat, 33.3);
    }

    #[test]
    fn distinct_counts_ignore_repeats() {
        let view = vec![
            record("Chennai", 0, 60.0, RiskBand::Green),
            record("Chennai", 1, 70.0, RiskBand::Amber),
            record("Coimbatore", 0, 80.0, RiskBand::Red),
        ];
        let summary = kpis(&view);
        assert_eq!(summary.state_count, 1);
        assert_eq!(summary.district_count, 2);
    }
}
