use std::fmt::Write;

use crate::aggregate;
use crate::models::{RiskBand, RiskRecord};

pub fn build_report(scope: Option<&str>, view: &[RiskRecord]) -> String {
    let kpis = aggregate::kpis(view);
    let counts = aggregate::band_by_week(view);

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all districts");

    let _ = writeln!(output, "# OutbreakCast Risk Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} district-weeks)",
        scope_label,
        view.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Figures");
    let _ = writeln!(output, "- States: {}", kpis.state_count);
    let _ = writeln!(output, "- Districts: {}", kpis.district_count);
    let _ = writeln!(output, "- Median forecast: {:.1}", kpis.median_yhat);
    let _ = writeln!(output, "- Red district-weeks: {}", kpis.red_count);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Band Mix by Week");

    if counts.is_empty() {
        let _ = writeln!(output, "No rows for current filters.");
    } else {
        for week_counts in counts.chunks(RiskBand::ORDERED.len()) {
            let cells: Vec<String> = week_counts
                .iter()
                .map(|count| format!("{} {}", count.risk_band, count.district_count))
                .collect();
            let _ = writeln!(output, "- {}: {}", week_counts[0].week_start, cells.join(", "));
        }
    }

    let mut red_rows: Vec<&RiskRecord> = view
        .iter()
        .filter(|record| record.risk_band == RiskBand::Red)
        .collect();
    red_rows.sort_by(|a, b| b.yhat.partial_cmp(&a.yhat).unwrap_or(std::cmp::Ordering::Equal));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Red Forecasts");

    if red_rows.is_empty() {
        let _ = writeln!(output, "No red district-weeks in this view.");
    } else {
        for record in red_rows.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}) week {}: forecast {:.1}",
                record.district, record.state, record.week_start, record.yhat
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

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
    fn report_renders_key_sections() {
        let view = vec![
            record("Chennai", 0, 60.0, RiskBand::Green),
            record("Chennai", 1, 200.0, RiskBand::Red),
        ];
        let report = build_report(Some("Chennai"), &view);

        assert!(report.contains("# OutbreakCast Risk Report"));
        assert!(report.contains("Generated for Chennai (2 district-weeks)"));
        assert!(report.contains("- 2025-11-16: Green 1, Amber 0, Red 0"));
        assert!(report.contains("- Chennai (Tamil Nadu) week 2025-11-23: forecast 200.0"));
    }

    #[test]
    fn empty_view_renders_placeholders() {
        let report = build_report(None, &[]);
        assert!(report.contains("Generated for all districts (0 district-weeks)"));
        assert!(report.contains("No rows for current filters."));
        assert!(report.contains("No red district-weeks in this view."));
    }
}
