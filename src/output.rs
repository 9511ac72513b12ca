//! Hand-off to the presentation surface: console previews and file exports.

use crate::alerts::Status;
use crate::kpi::{FormatKind, KpiCardRow, KpiResult};
use crate::metrics::MetricValue;
use crate::reports::{Report, Screen};
use crate::util::format_number;
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Print every screen present in `report`, in screen order.
pub fn print_report(report: &Report, currency: &str, max_rows: usize) {
    for screen in Screen::ALL {
        match screen {
            Screen::Executive => {
                let Some(s) = &report.executive else { continue };
                println!("== {} ==\n", screen.title());
                let cards: Vec<KpiCardRow> = s
                    .kpis
                    .iter()
                    .map(|k| KpiCardRow::from_result(k, currency))
                    .collect();
                preview_table("Key Performance Indicators", None, &cards, cards.len());
                preview_table("Monthly Revenue Trend", None, &s.monthly_revenue, max_rows);
                preview_table("Month-over-Month Growth", None, &s.revenue_growth, max_rows);
            }
            Screen::Financial => {
                let Some(s) = &report.financial else { continue };
                println!("== {} ==\n", screen.title());
                preview_table("Revenue by Service", None, &s.revenue_by_service, max_rows);
                preview_table("Expense Breakdown", None, &s.expense_breakdown, max_rows);
            }
            Screen::Sales => {
                let Some(s) = &report.sales else { continue };
                println!("== {} ==\n", screen.title());
                preview_table("Clients by City", None, &s.clients_by_city, max_rows);
                preview_table("Clients by Industry", None, &s.clients_by_industry, max_rows);
            }
            Screen::Marketing => {
                let Some(s) = &report.marketing else { continue };
                println!("== {} ==\n", screen.title());
                preview_table("Channel Performance", None, &s.channels, max_rows);
            }
            Screen::Seo => {
                let Some(s) = &report.seo else { continue };
                println!("== {} ==\n", screen.title());
                preview_table("Website Visitors and Organic Traffic", None, &s.months, max_rows);
            }
            Screen::Training => {
                let Some(s) = &report.training else { continue };
                println!("== {} ==\n", screen.title());
                let note = format!(
                    "Total profit: {} {}",
                    currency,
                    format_number(s.total_profit, 0)
                );
                preview_table(
                    "Training Profitability",
                    Some(note.as_str()),
                    &s.trainings,
                    max_rows,
                );
            }
            Screen::Renewals => {
                let Some(s) = &report.renewals else { continue };
                println!("== {} ==\n", screen.title());
                let title = format!("Renewals Due in {} Days", s.horizon_days);
                let note = format!("as of {}, lapsed renewals included", s.today);
                preview_table(&title, Some(note.as_str()), &s.at_risk, s.at_risk.len());
            }
        }
    }
}

/// Write `report.json` plus one CSV per series into `dir`. Returns the
/// files written.
pub fn export_report(report: &Report, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let mut written = Vec::new();

    if let Some(s) = &report.executive {
        export_csv(dir, "kpis.csv", &kpi_rows(&s.kpis), &mut written)?;
        export_csv(dir, "monthly_revenue.csv", &s.monthly_revenue, &mut written)?;
        export_csv(dir, "revenue_growth.csv", &s.revenue_growth, &mut written)?;
    }
    if let Some(s) = &report.financial {
        export_csv(dir, "revenue_by_service.csv", &s.revenue_by_service, &mut written)?;
        export_csv(dir, "expense_breakdown.csv", &s.expense_breakdown, &mut written)?;
    }
    if let Some(s) = &report.sales {
        export_csv(dir, "clients_by_city.csv", &s.clients_by_city, &mut written)?;
        export_csv(dir, "clients_by_industry.csv", &s.clients_by_industry, &mut written)?;
    }
    if let Some(s) = &report.marketing {
        export_csv(dir, "marketing_channels.csv", &s.channels, &mut written)?;
    }
    if let Some(s) = &report.seo {
        export_csv(dir, "seo.csv", &s.months, &mut written)?;
    }
    if let Some(s) = &report.training {
        export_csv(dir, "training_profitability.csv", &s.trainings, &mut written)?;
    }
    if let Some(s) = &report.renewals {
        export_csv(dir, "renewals_at_risk.csv", &s.at_risk, &mut written)?;
    }

    let json_path = dir.join("report.json");
    write_json(&json_path, report)?;
    info!("wrote {}", json_path.display());
    written.push(json_path);

    Ok(written)
}

fn export_csv<T: Serialize>(
    dir: &Path,
    name: &str,
    rows: &[T],
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let path = dir.join(name);
    write_csv(&path, rows)?;
    info!("wrote {} ({} rows)", path.display(), rows.len());
    written.push(path);
    Ok(())
}

/// Flat KPI row for CSV; the nested trend does not fit a CSV record.
#[derive(Serialize)]
struct KpiCsvRow<'a> {
    key: &'a str,
    name: &'a str,
    value: MetricValue,
    format_kind: FormatKind,
    trend: Option<MetricValue>,
    status: Status,
}

fn kpi_rows(kpis: &[KpiResult]) -> Vec<KpiCsvRow<'_>> {
    kpis.iter()
        .map(|k| KpiCsvRow {
            key: k.key,
            name: k.name,
            value: k.value,
            format_kind: k.format,
            trend: k.trend.map(|t| t.value),
            status: k.status,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::FinancialScreen;
    use crate::types::CategoryTotal;

    #[test]
    fn exports_only_present_screens() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let report = Report {
            financial: Some(FinancialScreen {
                revenue_by_service: vec![CategoryTotal {
                    category: "Audit".to_string(),
                    total: 1200.5,
                }],
                expense_breakdown: vec![],
            }),
            ..Default::default()
        };

        let written = export_report(&report, dir.path()).expect("export");
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["revenue_by_service.csv", "expense_breakdown.csv", "report.json"]);

        let csv = std::fs::read_to_string(dir.path().join("revenue_by_service.csv")).unwrap();
        assert_eq!(csv, "category,total\nAudit,1200.5\n");
    }
}
