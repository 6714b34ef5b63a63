use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declaration order doubles as the fixed reporting order for charts and tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Green,
    Amber,
    Red,
}

impl RiskBand {
    pub const ORDERED: [RiskBand; 3] = [RiskBand::Green, RiskBand::Amber, RiskBand::Red];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskBand::Green => "Green",
            RiskBand::Amber => "Amber",
            RiskBand::Red => "Red",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub week_start: NaiveDate,
    pub state: String,
    pub district: String,
    pub yhat: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRecord {
    pub week_start: NaiveDate,
    pub state: String,
    pub district: String,
    pub yhat: f64,
    pub risk_band: RiskBand,
}

#[derive(Debug, Clone)]
pub struct HistoricalRecord {
    pub week_start: NaiveDate,
    pub district: String,
    pub cases: f64,
}

/// `None` on an axis means "no constraint", not "match nothing".
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub state: Option<String>,
    pub district: Option<String>,
    pub week: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BandWeekCount {
    pub week_start: NaiveDate,
    pub risk_band: RiskBand,
    pub district_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct KpiSummary {
    pub state_count: usize,
    pub district_count: usize,
    pub median_yhat: f64,
    pub red_count: usize,
}

#[derive(Debug, Clone)]
pub struct TrendPoint {
    pub week_start: NaiveDate,
    pub yhat: f64,
    pub risk_band: RiskBand,
}

#[derive(Debug, Clone)]
pub struct HistoryPoint {
    pub week_start: NaiveDate,
    pub cases: f64,
}

/// Forecast and historical layers share a week axis but are never merged;
/// actuals and projections are plotted side by side.
#[derive(Debug, Clone)]
pub struct DistrictTrend {
    pub district: String,
    pub forecast: Vec<TrendPoint>,
    pub historical: Vec<HistoryPoint>,
}
