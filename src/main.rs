use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

mod aggregate;
mod filter;
mod models;
mod report;
mod risk;
mod store;
mod trend;

use models::FilterSelection;

#[derive(Parser)]
#[command(name = "outbreakcast")]
#[command(about = "District-week fever forecast risk banding and query engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Forecast CSV (week_start,state,district,yhat)
    #[arg(long)]
    forecasts: Option<PathBuf>,
    /// Pre-banded risk CSV; bypasses classification when supplied
    #[arg(long)]
    risk_bands: Option<PathBuf>,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    district: Option<String>,
    /// Week start date, e.g. 2025-11-16
    #[arg(long)]
    week: Option<NaiveDate>,
}

impl FilterArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection {
            state: self.state.clone(),
            district: self.district.clone(),
            week: self.week,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Derive per-district risk bands from a forecast CSV
    Classify {
        #[arg(long)]
        forecasts: PathBuf,
        #[arg(long, default_value = "risk_bands.csv")]
        out: PathBuf,
    },
    /// Print the filtered view, optionally exporting it as CSV
    View {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// KPI row and band-by-week counts for the filtered view
    Summary {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Selector option lists; districts are scoped by --state
    Options {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        state: Option<String>,
    },
    /// Forecast trend for one district with optional historical actuals
    Trend {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        district: String,
        #[arg(long)]
        historical: Option<PathBuf>,
    },
    /// Generate a markdown report for the filtered view
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { forecasts, out } => {
            let rows = store::load_forecasts(&forecasts)?;
            let risk = risk::classify(&rows);
            store::export_risk_csv(&out, &risk)?;
            println!("Wrote {} banded rows to {}.", risk.len(), out.display());
        }
        Commands::View { input, filters, out } => {
            let dataset = store::load(
                input.forecasts.as_deref(),
                input.risk_bands.as_deref(),
                None,
            )?;
            let mut view = filter::apply(&dataset.risk, &filters.selection());
            filter::sort_for_display(&mut view);

            if view.is_empty() {
                println!("No rows for current filters.");
            } else {
                for record in &view {
                    println!(
                        "{} {} / {} yhat {:.1} [{}]",
                        record.week_start, record.state, record.district, record.yhat,
                        record.risk_band
                    );
                }
            }
            if let Some(out) = out {
                store::export_risk_csv(&out, &view)?;
                println!("Exported {} rows to {}.", view.len(), out.display());
            }
        }
        Commands::Summary { input, filters, json } => {
            let dataset = store::load(
                input.forecasts.as_deref(),
                input.risk_bands.as_deref(),
                None,
            )?;
            let view = filter::apply(&dataset.risk, &filters.selection());
            let kpis = aggregate::kpis(&view);
            let counts = aggregate::band_by_week(&view);

            if json {
                let doc = serde_json::json!({ "kpis": kpis, "band_counts": counts });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("States: {}", kpis.state_count);
                println!("Districts: {}", kpis.district_count);
                println!("Median forecast (yhat): {:.1}", kpis.median_yhat);
                println!("Red (count): {}", kpis.red_count);
                println!();
                if counts.is_empty() {
                    println!("No rows for current filters.");
                }
                for week_counts in counts.chunks(models::RiskBand::ORDERED.len()) {
                    let cells: Vec<String> = week_counts
                        .iter()
                        .map(|count| format!("{} {}", count.risk_band, count.district_count))
                        .collect();
                    println!("{}: {}", week_counts[0].week_start, cells.join(", "));
                }
            }
        }
        Commands::Options { input, state } => {
            let dataset = store::load(
                input.forecasts.as_deref(),
                input.risk_bands.as_deref(),
                None,
            )?;
            println!("States:");
            for option in filter::state_options(&dataset.risk) {
                println!("- {option}");
            }
            println!("Districts:");
            for option in filter::district_options(&dataset.risk, state.as_deref()) {
                println!("- {option}");
            }
            println!("Weeks:");
            for option in filter::week_options(&dataset.risk) {
                println!("- {option}");
            }
        }
        Commands::Trend {
            input,
            district,
            historical,
        } => {
            let dataset = store::load(
                input.forecasts.as_deref(),
                input.risk_bands.as_deref(),
                historical.as_deref(),
            )?;
            let composed = trend::compose(&dataset.risk, dataset.historical.as_deref(), &district);

            println!("District trend: {}", composed.district);
            println!();
            if !composed.historical.is_empty() {
                println!("Historical actuals ({} weeks):", composed.historical.len());
                for point in &composed.historical {
                    println!("- {} cases {:.1}", point.week_start, point.cases);
                }
                println!();
            }
            if composed.forecast.is_empty() {
                println!("No forecasts for this district.");
            } else {
                println!("Forecast:");
                for point in &composed.forecast {
                    println!(
                        "- {} yhat {:.1} [{}]",
                        point.week_start, point.yhat, point.risk_band
                    );
                }
            }
        }
        Commands::Report { input, filters, out } => {
            let dataset = store::load(
                input.forecasts.as_deref(),
                input.risk_bands.as_deref(),
                None,
            )?;
            let view = filter::apply(&dataset.risk, &filters.selection());
            let scope = filters.district.as_deref().or(filters.state.as_deref());
            let report = report::build_report(scope, &view);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
