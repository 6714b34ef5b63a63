use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::{FilterSelection, RiskRecord};

/// Records satisfying every active constraint. Unset axes match everything,
/// so an all-unset selection returns the full input.
pub fn apply(records: &[RiskRecord], selection: &FilterSelection) -> Vec<RiskRecord> {
    records
        .iter()
        .filter(|record| matches(record, selection))
        .cloned()
        .collect()
}

fn matches(record: &RiskRecord, selection: &FilterSelection) -> bool {
    selection
        .state
        .as_deref()
        .map_or(true, |state| record.state == state)
        && selection
            .district
            .as_deref()
            .map_or(true, |district| record.district == district)
        && selection
            .week
            .map_or(true, |week| record.week_start == week)
}

pub fn state_options(records: &[RiskRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.state.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// District options are scoped by the state constraint alone, never by an
/// already-chosen district or week, so a state change refreshes the list
/// without being narrowed by stale downstream picks.
pub fn district_options(records: &[RiskRecord], state: Option<&str>) -> Vec<String> {
    records
        .iter()
        .filter(|record| state.map_or(true, |s| record.state == s))
        .map(|record| record.district.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Week options come from the full dataset, independent of any selection.
pub fn week_options(records: &[RiskRecord]) -> Vec<NaiveDate> {
    records
        .iter()
        .map(|record| record.week_start)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Display order for view tables: week, then state, then district.
pub fn sort_for_display(view: &mut [RiskRecord]) {
    view.sort_by(|a, b| {
        (a.week_start, &a.state, &a.district).cmp(&(b.week_start, &b.state, &b.district))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskBand;
    use chrono::Duration;

    fn record(state: &str, district: &str, week: i64, band: RiskBand) -> RiskRecord {
        let first = NaiveDate::from_ymd_opt(2025, 11, 16).unwrap();
        RiskRecord {
            week_start: first + Duration::weeks(week),
            state: state.to_string(),
            district: district.to_string(),
            yhat: 100.0,
            risk_band: band,
        }
    }

    fn sample() -> Vec<RiskRecord> {
        vec![
            record("Tamil Nadu", "Chennai", 0, RiskBand::Green),
            record("Tamil Nadu", "Coimbatore", 0, RiskBand::Amber),
            record("Karnataka", "Bengaluru Urban", 0, RiskBand::Red),
            record("Tamil Nadu", "Chennai", 1, RiskBand::Red),
            record("Karnataka", "Mysuru", 1, RiskBand::Green),
        ]
    }

    fn keys(view: &[RiskRecord]) -> Vec<(String, NaiveDate)> {
        view.iter()
            .map(|r| (r.district.clone(), r.week_start))
            .collect()
    }

    #[test]
    fn unset_selection_returns_everything() {
        let records = sample();
        let view = apply(&records, &FilterSelection::default());
        assert_eq!(view.len(), records.len());
    }

    #[test]
    fn constraints_combine_with_and() {
        let records = sample();
        let selection = FilterSelection {
            state: Some("Tamil Nadu".to_string()),
            district: None,
            week: Some(NaiveDate::from_ymd_opt(2025, 11, 23).unwrap()),
        };
        let view = apply(&records, &selection);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].district, "Chennai");
    }

    #[test]
    fn filtering_is_idempotent() {
        let records = sample();
        let selection = FilterSelection {
            state: Some("Karnataka".to_string()),
            ..FilterSelection::default()
        };
        let once = apply(&records, &selection);
        let twice = apply(&once, &selection);
        assert_eq!(keys(&once), keys(&twice));
    }

    #[test]
    fn district_options_scoped_by_state_alone() {
        let records = sample();
        assert_eq!(
            district_options(&records, Some("Tamil Nadu")),
            vec!["Chennai".to_string(), "Coimbatore".to_string()]
        );
        assert_eq!(
            district_options(&records, None),
            vec![
                "Bengaluru Urban".to_string(),
                "Chennai".to_string(),
                "Coimbatore".to_string(),
                "Mysuru".to_string()
            ]
        );
    }

    #[test]
    fn week_options_cover_the_full_dataset() {
        let records = sample();
        let weeks = week_options(&records);
        assert_eq!(
            weeks,
            vec![
                NaiveDate::from_ymd_opt(2025, 11, 16).unwrap(),
                NaiveDate::from_ymd_opt(2025, 11, 23).unwrap()
            ]
        );
    }

    #[test]
    fn incompatible_state_and_district_yield_empty_view() {
        let records = sample();
        let selection = FilterSelection {
            state: Some("Karnataka".to_string()),
            district: Some("Chennai".to_string()),
            week: None,
        };
        assert!(apply(&records, &selection).is_empty());
    }

    #[test]
    fn display_sort_orders_week_then_state_then_district() {
        let mut view = sample();
        sort_for_display(&mut view);
        let districts: Vec<&str> = view.iter().map(|r| r.district.as_str()).collect();
        assert_eq!(
            districts,
            vec!["Bengaluru Urban", "Chennai", "Coimbatore", "Mysuru", "Chennai"]
        );
    }
}
