use std::fs::File;
use std::path::Path;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use thiserror::Error;

use crate::models::{ForecastRecord, HistoricalRecord, RiskRecord};
use crate::risk;

pub const FORECAST_COLUMNS: [&str; 4] = ["week_start", "state", "district", "yhat"];
pub const RISK_COLUMNS: [&str; 5] = ["week_start", "state", "district", "yhat", "risk_band"];

/// Candidate names for the historical case-count column, tried in order.
pub const CASE_COLUMN_CANDIDATES: [&str; 2] = ["dengue_cases", "cases"];

/// Schema failures are hard errors; parse failures let the caller fall back.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{table} file is missing required column `{column}`")]
    Schema { table: &'static str, column: String },
    #[error("could not parse {table} file: {source}")]
    Parse {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
}

/// In-memory record store for one run. Populated once, read-only afterwards.
/// The risk records embed the forecast columns, so they are the single table
/// every query runs against.
pub struct Dataset {
    pub risk: Vec<RiskRecord>,
    pub historical: Option<Vec<HistoricalRecord>>,
}

/// Load policy: supplied risk bands are trusted as-is; bare forecasts are run
/// through the classifier; with neither (or nothing parseable) the synthetic
/// demo dataset stands in so every command has a valid input.
pub fn load(
    forecasts_path: Option<&Path>,
    risk_path: Option<&Path>,
    historical_path: Option<&Path>,
) -> anyhow::Result<Dataset> {
    let risk = load_required(forecasts_path, risk_path)?;

    let historical = match historical_path {
        Some(path) => match load_historical(path) {
            Ok(rows) => rows,
            Err(err) => {
                eprintln!("warning: could not parse historical file: {err}");
                None
            }
        },
        None => None,
    };

    Ok(Dataset { risk, historical })
}

fn load_required(
    forecasts_path: Option<&Path>,
    risk_path: Option<&Path>,
) -> anyhow::Result<Vec<RiskRecord>> {
    if forecasts_path.is_none() && risk_path.is_none() {
        eprintln!("no input files supplied; using a small synthetic demo dataset");
        return Ok(synthetic()?.1);
    }

    let forecasts = match forecasts_path {
        Some(path) => load_or_warn(load_forecasts(path))?,
        None => None,
    };
    let risk = match risk_path {
        Some(path) => load_or_warn(load_risk_bands(path))?,
        None => None,
    };

    match (forecasts, risk) {
        // pre-banded rows bypass the classifier and are trusted as-is
        (_, Some(risk)) => Ok(risk),
        (Some(forecasts), None) => Ok(risk::classify(&forecasts)),
        (None, None) => {
            eprintln!("falling back to the synthetic demo dataset");
            Ok(synthetic()?.1)
        }
    }
}

/// Schema errors abort; parse errors degrade to `None` with a warning.
fn load_or_warn<T>(result: Result<Vec<T>, LoadError>) -> anyhow::Result<Option<Vec<T>>> {
    match result {
        Ok(rows) => Ok(Some(rows)),
        Err(err @ LoadError::Schema { .. }) => Err(err.into()),
        Err(err) => {
            eprintln!("warning: {err}");
            Ok(None)
        }
    }
}

pub fn load_forecasts(path: &Path) -> Result<Vec<ForecastRecord>, LoadError> {
    read_forecasts(open(path, "forecasts")?)
}

pub fn load_risk_bands(path: &Path) -> Result<Vec<RiskRecord>, LoadError> {
    read_risk_bands(open(path, "risk_bands")?)
}

pub fn load_historical(path: &Path) -> Result<Option<Vec<HistoricalRecord>>, LoadError> {
    read_historical(open(path, "historical")?)
}

fn open(path: &Path, table: &'static str) -> Result<csv::Reader<File>, LoadError> {
    csv::Reader::from_path(path).map_err(|source| LoadError::Parse { table, source })
}

fn read_forecasts<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<ForecastRecord>, LoadError> {
    check_headers(&mut reader, "forecasts", &FORECAST_COLUMNS)?;
    Ok(read_rows(&mut reader, "forecasts"))
}

fn read_risk_bands<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<RiskRecord>, LoadError> {
    check_headers(&mut reader, "risk_bands", &RISK_COLUMNS)?;
    Ok(read_rows(&mut reader, "risk_bands"))
}

/// The historical table is optional end to end: missing key columns or an
/// unresolvable case-count column mean "no overlay", never an error.
fn read_historical<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Option<Vec<HistoricalRecord>>, LoadError> {
    let headers = reader
        .headers()
        .map_err(|source| LoadError::Parse {
            table: "historical",
            source,
        })?
        .clone();

    let week_idx = headers.iter().position(|h| h == "week_start");
    let district_idx = headers.iter().position(|h| h == "district");
    let (Some(week_idx), Some(district_idx)) = (week_idx, district_idx) else {
        eprintln!("warning: historical file lacks week_start/district columns; overlay skipped");
        return Ok(None);
    };

    let Some(case_idx) = CASE_COLUMN_CANDIDATES
        .iter()
        .find_map(|candidate| headers.iter().position(|h| h == *candidate))
    else {
        return Ok(None);
    };

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let Ok(record) = result else {
            skipped += 1;
            continue;
        };
        let week_start = record.get(week_idx).and_then(|v| v.parse::<NaiveDate>().ok());
        let district = record.get(district_idx);
        let cases = record.get(case_idx).and_then(|v| v.parse::<f64>().ok());
        match (week_start, district, cases) {
            (Some(week_start), Some(district), Some(cases)) => rows.push(HistoricalRecord {
                week_start,
                district: district.to_string(),
                cases,
            }),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        eprintln!("warning: skipped {skipped} malformed rows in historical file");
    }

    Ok(Some(rows))
}

fn check_headers<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
    table: &'static str,
    required: &[&str],
) -> Result<(), LoadError> {
    let headers = reader
        .headers()
        .map_err(|source| LoadError::Parse { table, source })?;
    for column in required {
        if !headers.iter().any(|header| header == *column) {
            return Err(LoadError::Schema {
                table,
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Rows that fail to parse are skipped, not fatal; the header check has
/// already run, so a bad row is a data problem confined to that row.
fn read_rows<R: std::io::Read, T: serde::de::DeserializeOwned>(
    reader: &mut csv::Reader<R>,
    table: &'static str,
) -> Vec<T> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize::<T>() {
        match result {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        eprintln!("warning: skipped {skipped} malformed rows in {table} file");
    }
    rows
}

const SYNTH_PAIRS: [(&str, &str); 3] = [
    ("Karnataka", "Bengaluru Urban"),
    ("Tamil Nadu", "Chennai"),
    ("Delhi", "New Delhi"),
];
const SYNTH_WEEKS: usize = 4;

/// Small fixed demo dataset: three state/district pairs over four Sunday
/// weeks, per-district base level with weekly jitter, clamped at zero, then
/// banded by the classifier.
pub fn synthetic() -> anyhow::Result<(Vec<ForecastRecord>, Vec<RiskRecord>)> {
    let mut rng = rand::thread_rng();
    let first_week = NaiveDate::from_ymd_opt(2025, 11, 16).context("invalid first week")?;

    let mut forecasts = Vec::with_capacity(SYNTH_PAIRS.len() * SYNTH_WEEKS);
    for (state, district) in SYNTH_PAIRS {
        let base: f64 = rng.gen_range(60.0..160.0);
        for week in 0..SYNTH_WEEKS {
            forecasts.push(ForecastRecord {
                week_start: first_week + Duration::weeks(week as i64),
                state: state.to_string(),
                district: district.to_string(),
                yhat: (base + rng.gen_range(-10.0..10.0)).max(0.0),
            });
        }
    }
    forecasts.sort_by(|a, b| {
        (&a.state, &a.district, a.week_start).cmp(&(&b.state, &b.district, b.week_start))
    });

    let risk = risk::classify(&forecasts);
    Ok((forecasts, risk))
}

pub fn export_risk_csv(path: &Path, records: &[RiskRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("could not create {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
