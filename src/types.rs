use crate::metrics::MetricValue;
use crate::util::format_number;
use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use tabled::Tabled;

// ---------------------------------------------------------------------------
// Input records (one per sheet row)
// ---------------------------------------------------------------------------

/// Row of the `Revenue` sheet. Negative amounts are refunds and are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRecord {
    pub invoice_date: NaiveDate,
    pub gross_amount: f64,
    pub service_category: String,
}

/// Row of the `Expenses` sheet. The four breakdown fields are 0.0 when the
/// sheet has no such column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpenseRecord {
    pub category: String,
    pub amount: f64,
    pub depreciation: f64,
    pub interest: f64,
    pub taxes: f64,
    pub cogs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub client_id: String,
    pub company_name: Option<String>,
    pub city: String,
    pub industry: String,
    pub renewal_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketingRecord {
    pub channel: String,
    pub spend: f64,
    pub leads: f64,
    pub conversions: f64,
    pub revenue_generated: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeoRecord {
    pub month: String,
    pub website_visitors: f64,
    pub organic_traffic: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub training_type: String,
    pub revenue: f64,
    pub cost: f64,
}

// ---------------------------------------------------------------------------
// Derived series
// ---------------------------------------------------------------------------

/// Calendar month. Orders chronologically (year first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn display_money(v: &f64) -> String {
    format_number(*v, 2)
}

fn display_name(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MonthlyAggregate {
    #[tabled(rename = "Month")]
    pub period: YearMonth,
    #[tabled(rename = "Total", display_with = "display_money")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MonthlyGrowth {
    #[tabled(rename = "Month")]
    pub period: YearMonth,
    #[tabled(rename = "Growth %")]
    pub growth: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CategoryTotal {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Total", display_with = "display_money")]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CategoryCount {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Clients")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ChannelMetrics {
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[tabled(rename = "Spend", display_with = "display_money")]
    pub spend: f64,
    #[tabled(rename = "Leads")]
    pub leads: f64,
    #[tabled(rename = "Conversions")]
    pub conversions: f64,
    #[tabled(rename = "Revenue", display_with = "display_money")]
    pub revenue_generated: f64,
    #[tabled(rename = "CPL")]
    pub cpl: MetricValue,
    #[tabled(rename = "CPA")]
    pub cpa: MetricValue,
    #[tabled(rename = "ROAS")]
    pub roas: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct SeoPoint {
    #[tabled(rename = "Month")]
    pub month: String,
    #[tabled(rename = "Visitors")]
    pub website_visitors: f64,
    #[tabled(rename = "Organic")]
    pub organic_traffic: f64,
    #[tabled(rename = "Organic %")]
    pub organic_share: MetricValue,
    #[tabled(rename = "Visitor Growth %")]
    pub visitor_growth: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct TrainingProfit {
    #[tabled(rename = "Training")]
    pub training_type: String,
    #[tabled(rename = "Revenue", display_with = "display_money")]
    pub revenue: f64,
    #[tabled(rename = "Cost", display_with = "display_money")]
    pub cost: f64,
    #[tabled(rename = "Profit", display_with = "display_money")]
    pub profit: f64,
    #[tabled(rename = "Margin %")]
    pub margin: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct RenewalRisk {
    #[tabled(rename = "Client")]
    pub client_id: String,
    #[tabled(rename = "Company", display_with = "display_name")]
    pub company_name: Option<String>,
    #[tabled(rename = "Renewal Date")]
    pub renewal_date: NaiveDate,
    #[tabled(rename = "Days Left")]
    pub days_left: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_orders_by_year_then_month() {
        let dec = YearMonth { year: 2023, month: 12 };
        let jan = YearMonth { year: 2024, month: 1 };
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2024-01");
        assert_eq!(serde_json::to_string(&jan).unwrap(), "\"2024-01\"");
    }
}
