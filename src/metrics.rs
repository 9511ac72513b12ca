//! Metric derivation: totals, margins, monthly trend and growth, and the
//! per-domain breakdowns behind each screen.
//!
//! Every division goes through [`ratio`] so a zero denominator yields
//! [`MetricValue::Undefined`] instead of `inf`/`NaN`. A degenerate metric
//! never stops the others from being computed.

use crate::types::{
    CategoryCount, CategoryTotal, ChannelMetrics, ClientRecord, ExpenseRecord, MarketingRecord,
    MonthlyAggregate, MonthlyGrowth, RevenueRecord, SeoPoint, SeoRecord, TrainingProfit,
    TrainingRecord, YearMonth,
};
use crate::util::format_number;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A computed number, or the marker for "no defined result".
///
/// Serializes as a JSON number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Defined(f64),
    Undefined,
}

impl MetricValue {
    /// Wraps `v`, mapping non-finite values to `Undefined`.
    pub fn from_f64(v: f64) -> Self {
        if v.is_finite() {
            MetricValue::Defined(v)
        } else {
            MetricValue::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            MetricValue::Defined(v) => Some(v),
            MetricValue::Undefined => None,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, MetricValue::Undefined)
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            MetricValue::Defined(v) => MetricValue::from_f64(f(v)),
            MetricValue::Undefined => MetricValue::Undefined,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Defined(v) => f.write_str(&format_number(*v, 2)),
            MetricValue::Undefined => f.write_str("N/A"),
        }
    }
}

/// `numerator / denominator`, undefined when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> MetricValue {
    if denominator == 0.0 {
        return MetricValue::Undefined;
    }
    MetricValue::from_f64(numerator / denominator)
}

/// `numerator / denominator × 100`, undefined when the denominator is zero.
pub fn percent(numerator: f64, denominator: f64) -> MetricValue {
    ratio(numerator, denominator).map(|v| v * 100.0)
}

/// Period-over-period change in percent.
///
/// From zero to zero is no change (0); from zero to anything else has no
/// defined percentage.
pub fn growth(previous: f64, current: f64) -> MetricValue {
    if previous == 0.0 && current == 0.0 {
        return MetricValue::Defined(0.0);
    }
    percent(current - previous, previous)
}

/// Growth for each element of `values`; the first element is 0 by convention.
pub fn growth_series(values: &[f64]) -> Vec<MetricValue> {
    let mut out = Vec::with_capacity(values.len());
    if !values.is_empty() {
        out.push(MetricValue::Defined(0.0));
    }
    out.extend(values.windows(2).map(|w| growth(w[0], w[1])));
    out
}

/// Revenue summed per calendar month, oldest first. Months without invoices
/// are not filled in.
pub fn monthly_revenue_trend(revenue: &[RevenueRecord]) -> Vec<MonthlyAggregate> {
    let mut by_month: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for r in revenue {
        *by_month.entry(YearMonth::of(r.invoice_date)).or_insert(0.0) += r.gross_amount;
    }
    by_month
        .into_iter()
        .map(|(period, total)| MonthlyAggregate { period, total })
        .collect()
}

/// Month-over-month growth between consecutive entries of `monthly`.
pub fn revenue_growth(monthly: &[MonthlyAggregate]) -> Vec<MonthlyGrowth> {
    let totals: Vec<f64> = monthly.iter().map(|m| m.total).collect();
    monthly
        .iter()
        .zip(growth_series(&totals))
        .map(|(m, growth)| MonthlyGrowth {
            period: m.period,
            growth,
        })
        .collect()
}

/// Growth of the most recent month; undefined with no months at all.
pub fn latest_growth(growth: &[MonthlyGrowth]) -> MetricValue {
    growth
        .last()
        .map(|g| g.growth)
        .unwrap_or(MetricValue::Undefined)
}

/// Distinct non-blank client ids.
pub fn distinct_clients(clients: &[ClientRecord]) -> usize {
    clients
        .iter()
        .map(|c| c.client_id.as_str())
        .filter(|id| !id.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Group-and-sum, keys in lexical order.
pub fn sum_by_category<T>(
    items: &[T],
    key: impl Fn(&T) -> &str,
    value: impl Fn(&T) -> f64,
) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for item in items {
        *totals.entry(key(item)).or_insert(0.0) += value(item);
    }
    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect()
}

/// Group-and-count rows, keys in lexical order. Rows with a blank key are
/// not counted.
pub fn count_by_category<T>(items: &[T], key: impl Fn(&T) -> &str) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        let k = key(item);
        if k.is_empty() {
            continue;
        }
        *counts.entry(k).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect()
}

/// Client rows per category. Rows without a client id are skipped.
pub fn clients_by(
    clients: &[ClientRecord],
    key: impl Fn(&ClientRecord) -> &str,
) -> Vec<CategoryCount> {
    let identified: Vec<ClientRecord> = clients
        .iter()
        .filter(|c| !c.client_id.is_empty())
        .cloned()
        .collect();
    count_by_category(&identified, key)
}

/// Totals per marketing channel with cost-per-lead, cost-per-acquisition and
/// return on ad spend. Each ratio is undefined on its own zero denominator.
pub fn channel_metrics(marketing: &[MarketingRecord]) -> Vec<ChannelMetrics> {
    #[derive(Default)]
    struct Acc {
        spend: f64,
        leads: f64,
        conversions: f64,
        revenue: f64,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in marketing {
        let e = map.entry(r.channel.as_str()).or_default();
        e.spend += r.spend;
        e.leads += r.leads;
        e.conversions += r.conversions;
        e.revenue += r.revenue_generated;
    }
    map.into_iter()
        .map(|(channel, acc)| ChannelMetrics {
            channel: channel.to_string(),
            spend: acc.spend,
            leads: acc.leads,
            conversions: acc.conversions,
            revenue_generated: acc.revenue,
            cpl: ratio(acc.spend, acc.leads),
            cpa: ratio(acc.spend, acc.conversions),
            roas: ratio(acc.revenue, acc.spend),
        })
        .collect()
}

/// SEO rows in sheet order with organic share and visitor growth.
pub fn seo_series(seo: &[SeoRecord]) -> Vec<SeoPoint> {
    let visitors: Vec<f64> = seo.iter().map(|r| r.website_visitors).collect();
    seo.iter()
        .zip(growth_series(&visitors))
        .map(|(r, visitor_growth)| SeoPoint {
            month: r.month.clone(),
            website_visitors: r.website_visitors,
            organic_traffic: r.organic_traffic,
            organic_share: percent(r.organic_traffic, r.website_visitors),
            visitor_growth,
        })
        .collect()
}

/// Per-row training profit. Losses stay negative.
pub fn training_profitability(training: &[TrainingRecord]) -> Vec<TrainingProfit> {
    training
        .iter()
        .map(|r| {
            let profit = r.revenue - r.cost;
            TrainingProfit {
                training_type: r.training_type.clone(),
                revenue: r.revenue,
                cost: r.cost,
                profit,
                margin: percent(profit, r.revenue),
            }
        })
        .collect()
}

/// The figures every executive KPI is derived from, computed once per pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreFigures {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub total_clients: usize,
    pub depreciation: f64,
    pub interest: f64,
    pub taxes: f64,
    pub cogs: f64,
    pub monthly_revenue: Vec<MonthlyAggregate>,
    pub revenue_growth: Vec<MonthlyGrowth>,
}

impl CoreFigures {
    pub fn compute(
        revenue: &[RevenueRecord],
        expenses: &[ExpenseRecord],
        clients: &[ClientRecord],
    ) -> Self {
        let total_revenue: f64 = revenue.iter().map(|r| r.gross_amount).sum();
        let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
        let monthly_revenue = monthly_revenue_trend(revenue);
        let revenue_growth = revenue_growth(&monthly_revenue);

        Self {
            total_revenue,
            total_expenses,
            net_profit: total_revenue - total_expenses,
            total_clients: distinct_clients(clients),
            depreciation: expenses.iter().map(|e| e.depreciation).sum(),
            interest: expenses.iter().map(|e| e.interest).sum(),
            taxes: expenses.iter().map(|e| e.taxes).sum(),
            cogs: expenses.iter().map(|e| e.cogs).sum(),
            monthly_revenue,
            revenue_growth,
        }
    }

    pub fn ebitda(&self) -> f64 {
        self.net_profit + self.depreciation + self.interest + self.taxes
    }

    pub fn gross_margin(&self) -> MetricValue {
        percent(self.total_revenue - self.cogs, self.total_revenue)
    }

    pub fn profit_margin(&self) -> MetricValue {
        percent(self.net_profit, self.total_revenue)
    }

    pub fn latest_growth(&self) -> MetricValue {
        latest_growth(&self.revenue_growth)
    }
}
