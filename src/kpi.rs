//! The executive KPI catalog.
//!
//! Each KPI is one [`KpiDef`] entry: a pure function of [`CoreFigures`], a
//! display format and an optional trend. Adding a KPI means adding an entry.

use crate::alerts::{classify_metric, Status, Thresholds};
use crate::metrics::{CoreFigures, MetricValue};
use crate::util::format_number;
use log::warn;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use tabled::Tabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Currency,
    Percentage,
    Count,
}

impl FormatKind {
    /// Human-readable text for `value`; undefined values render as `N/A`.
    pub fn render(self, value: MetricValue, currency: &str) -> String {
        let Some(v) = value.value() else {
            return "N/A".to_string();
        };
        match self {
            FormatKind::Currency => format!("{} {}", currency, format_number(v, 0)),
            FormatKind::Percentage => format!("{:.1} %", v),
            FormatKind::Count => format_number(v, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendKind {
    /// Month-over-month change in percent.
    Percent,
    /// Signed amount in the KPI's own unit.
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub value: MetricValue,
    pub kind: TrendKind,
}

impl Trend {
    pub fn render(&self, currency: &str) -> String {
        let Some(v) = self.value.value() else {
            return "N/A".to_string();
        };
        let arrow = if v > 0.0 {
            "▲"
        } else if v < 0.0 {
            "▼"
        } else {
            "–"
        };
        match self.kind {
            TrendKind::Percent => format!("{} {:.1}% vs previous month", arrow, v.abs()),
            TrendKind::Absolute => format!("{} {} {}", arrow, currency, format_number(v.abs(), 0)),
        }
    }
}

pub struct KpiDef {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub format: FormatKind,
    pub compute: fn(&CoreFigures) -> MetricValue,
    pub trend: Option<fn(&CoreFigures) -> Trend>,
}

fn total_revenue(f: &CoreFigures) -> MetricValue {
    MetricValue::from_f64(f.total_revenue)
}

fn total_expenses(f: &CoreFigures) -> MetricValue {
    MetricValue::from_f64(f.total_expenses)
}

fn net_profit(f: &CoreFigures) -> MetricValue {
    MetricValue::from_f64(f.net_profit)
}

fn total_clients(f: &CoreFigures) -> MetricValue {
    MetricValue::from_f64(f.total_clients as f64)
}

fn ebitda(f: &CoreFigures) -> MetricValue {
    MetricValue::from_f64(f.ebitda())
}

fn revenue_trend(f: &CoreFigures) -> Trend {
    Trend {
        value: f.latest_growth(),
        kind: TrendKind::Percent,
    }
}

fn net_profit_trend(f: &CoreFigures) -> Trend {
    Trend {
        value: MetricValue::from_f64(f.net_profit),
        kind: TrendKind::Absolute,
    }
}

/// Display order of the executive summary cards.
pub static KPI_CATALOG: [KpiDef; 7] = [
    KpiDef {
        key: "total_revenue",
        label: "Total Revenue",
        description: "Sum of all invoiced gross amounts.",
        format: FormatKind::Currency,
        compute: total_revenue,
        trend: Some(revenue_trend),
    },
    KpiDef {
        key: "total_expenses",
        label: "Total Expenses",
        description: "All operating costs such as salaries, rent and utilities.",
        format: FormatKind::Currency,
        compute: total_expenses,
        trend: None,
    },
    KpiDef {
        key: "net_profit",
        label: "Net Profit",
        description: "Total revenue minus total expenses.",
        format: FormatKind::Currency,
        compute: net_profit,
        trend: Some(net_profit_trend),
    },
    KpiDef {
        key: "total_clients",
        label: "Total Clients",
        description: "Number of distinct client ids.",
        format: FormatKind::Count,
        compute: total_clients,
        trend: None,
    },
    KpiDef {
        key: "ebitda",
        label: "EBITDA",
        description: "Net profit plus depreciation, interest and taxes.",
        format: FormatKind::Currency,
        compute: ebitda,
        trend: None,
    },
    KpiDef {
        key: "gross_margin",
        label: "Gross Margin",
        description: "(Revenue - COGS) / Revenue * 100.",
        format: FormatKind::Percentage,
        compute: CoreFigures::gross_margin,
        trend: None,
    },
    KpiDef {
        key: "profit_margin",
        label: "Profit Margin",
        description: "Net profit / Revenue * 100.",
        format: FormatKind::Percentage,
        compute: CoreFigures::profit_margin,
        trend: None,
    },
];

static KPI_INDEX: Lazy<HashMap<&'static str, &'static KpiDef>> =
    Lazy::new(|| KPI_CATALOG.iter().map(|def| (def.key, def)).collect());

pub fn find_kpi(key: &str) -> Option<&'static KpiDef> {
    KPI_INDEX.get(key).copied()
}

/// One evaluated KPI, ready for a dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiResult {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub value: MetricValue,
    #[serde(rename = "format_kind")]
    pub format: FormatKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    pub status: Status,
}

impl KpiResult {
    pub fn display_value(&self, currency: &str) -> String {
        self.format.render(self.value, currency)
    }
}

/// Console row for a KPI card.
#[derive(Debug, Clone, Tabled)]
pub struct KpiCardRow {
    #[tabled(rename = "KPI")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Trend")]
    pub trend: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl KpiCardRow {
    pub fn from_result(kpi: &KpiResult, currency: &str) -> Self {
        Self {
            name: kpi.name.to_string(),
            value: kpi.display_value(currency),
            trend: kpi.trend.map(|t| t.render(currency)).unwrap_or_default(),
            status: if kpi.status.is_alert() {
                format!("{} (!)", kpi.status)
            } else {
                kpi.status.to_string()
            },
        }
    }
}

/// Status of a KPI: thresholds (when configured) judge the value, otherwise
/// the sign of the trend (or of the value when there is no trend) decides.
fn kpi_status(
    value: MetricValue,
    trend: Option<&Trend>,
    thresholds: Option<&Thresholds>,
) -> Status {
    match thresholds {
        Some(t) => classify_metric(value, Some(t)),
        None => classify_metric(trend.map(|t| t.value).unwrap_or(value), None),
    }
}

pub fn evaluate_one(
    def: &'static KpiDef,
    figures: &CoreFigures,
    thresholds: Option<&Thresholds>,
) -> KpiResult {
    let value = (def.compute)(figures);
    let trend = def.trend.map(|f| f(figures));
    if value.is_undefined() {
        warn!("KPI '{}' is undefined for this dataset", def.key);
    }
    KpiResult {
        key: def.key,
        name: def.label,
        description: def.description,
        value,
        format: def.format,
        trend,
        status: kpi_status(value, trend.as_ref(), thresholds),
    }
}

/// Evaluate the whole catalog in display order.
pub fn evaluate(figures: &CoreFigures, thresholds: &HashMap<String, Thresholds>) -> Vec<KpiResult> {
    KPI_CATALOG
        .iter()
        .map(|def| evaluate_one(def, figures, thresholds.get(def.key)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExpenseRecord, RevenueRecord};
    use chrono::NaiveDate;

    fn figures(revenue: &[(u32, f64)], expense: f64, cogs: f64) -> CoreFigures {
        let revenue: Vec<RevenueRecord> = revenue
            .iter()
            .map(|(month, amount)| RevenueRecord {
                invoice_date: NaiveDate::from_ymd_opt(2024, *month, 10).unwrap(),
                gross_amount: *amount,
                service_category: "Certification".to_string(),
            })
            .collect();
        let expenses = vec![ExpenseRecord {
            category: "Ops".to_string(),
            amount: expense,
            cogs,
            ..Default::default()
        }];
        CoreFigures::compute(&revenue, &expenses, &[])
    }

    fn by_key<'a>(results: &'a [KpiResult], key: &str) -> &'a KpiResult {
        results.iter().find(|r| r.key == key).expect("kpi present")
    }

    #[test]
    fn catalog_keys_are_unique_and_indexed() {
        assert_eq!(KPI_INDEX.len(), KPI_CATALOG.len());
        assert_eq!(find_kpi("ebitda").map(|d| d.label), Some("EBITDA"));
        assert!(find_kpi("churn").is_none());
    }

    #[test]
    fn evaluates_in_display_order() {
        let figures = figures(&[(1, 1000.0), (2, 1500.0)], 500.0, 200.0);
        let results = evaluate(&figures, &HashMap::new());
        let keys: Vec<&str> = results.iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            vec![
                "total_revenue",
                "total_expenses",
                "net_profit",
                "total_clients",
                "ebitda",
                "gross_margin",
                "profit_margin"
            ]
        );

        let revenue = by_key(&results, "total_revenue");
        assert_eq!(revenue.value, MetricValue::Defined(2500.0));
        assert_eq!(revenue.trend.map(|t| t.value), Some(MetricValue::Defined(50.0)));
        assert_eq!(revenue.status, Status::Up);
        let margin = by_key(&results, "gross_margin").value.value().expect("defined");
        assert!((margin - 92.0).abs() < 1e-9);
    }

    #[test]
    fn thresholds_override_trend_status() {
        let mut thresholds = HashMap::new();
        thresholds.insert("gross_margin".to_string(), Thresholds::new(Some(95.0), None));
        thresholds.insert("total_revenue".to_string(), Thresholds::new(None, Some(10_000.0)));
        let results = evaluate(&figures(&[(1, 1000.0), (2, 500.0)], 100.0, 200.0), &thresholds);

        assert_eq!(by_key(&results, "gross_margin").status, Status::BelowLow);
        assert_eq!(by_key(&results, "total_revenue").status, Status::Normal);
        assert_eq!(by_key(&results, "profit_margin").status, Status::Up);
    }

    #[test]
    fn zero_revenue_margins_render_as_not_available() {
        let results = evaluate(&figures(&[], 300.0, 0.0), &HashMap::new());
        let margin = by_key(&results, "profit_margin");
        assert!(margin.value.is_undefined());
        assert_eq!(margin.status, Status::Undefined);
        assert_eq!(margin.display_value("PKR"), "N/A");

        let net = by_key(&results, "net_profit");
        assert_eq!(net.status, Status::Down);
        assert_eq!(net.display_value("PKR"), "PKR -300");
    }

    #[test]
    fn card_rows_mark_alerts() {
        let figures = figures(&[(1, 1000.0)], 1500.0, 0.0);
        let results = evaluate(&figures, &HashMap::new());

        let net = KpiCardRow::from_result(by_key(&results, "net_profit"), "PKR");
        assert_eq!(net.status, "down (!)");
        assert_eq!(net.trend, "▼ PKR 500");
        let revenue = KpiCardRow::from_result(by_key(&results, "total_revenue"), "PKR");
        assert_eq!(revenue.status, "flat");
        assert_eq!(revenue.value, "PKR 1,000");
    }

    #[test]
    fn result_json_names_the_format_kind() {
        let results = evaluate(&figures(&[], 0.0, 0.0), &HashMap::new());
        let json = serde_json::to_value(by_key(&results, "gross_margin")).unwrap();
        assert_eq!(json["format_kind"], "percentage");
        assert!(json.get("format").is_none());
        assert!(json.get("trend").is_none());
    }

    #[test]
    fn formats_by_kind() {
        let render = |kind: FormatKind, v: f64| kind.render(MetricValue::Defined(v), "PKR");
        assert_eq!(render(FormatKind::Currency, 1234567.4), "PKR 1,234,567");
        assert_eq!(render(FormatKind::Percentage, 92.0), "92.0 %");
        assert_eq!(render(FormatKind::Count, 1200.0), "1,200");
        assert_eq!(render(FormatKind::Percentage, 0.0), "0.0 %");
    }
}
