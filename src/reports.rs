//! Screen builders.
//!
//! Each dashboard screen gets one plain struct of computed values; a
//! [`Report`] bundles the screens requested for a pass. Which screens are
//! built is decided by the caller, never by shared state.

use crate::config::Settings;
use crate::error::LoadError;
use crate::kpi::{self, KpiResult};
use crate::loader::{self, Dataset, LoadReport, Sheet};
use crate::metrics::{self, CoreFigures};
use crate::renewals;
use crate::source::DataSource;
use crate::types::{
    CategoryCount, CategoryTotal, ChannelMetrics, MonthlyAggregate, MonthlyGrowth, RenewalRisk,
    SeoPoint, TrainingProfit,
};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Executive,
    Financial,
    Sales,
    Marketing,
    Seo,
    Training,
    Renewals,
}

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Executive,
        Screen::Financial,
        Screen::Sales,
        Screen::Marketing,
        Screen::Seo,
        Screen::Training,
        Screen::Renewals,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Executive => "Executive Summary",
            Screen::Financial => "Financial Dashboard",
            Screen::Sales => "Sales Dashboard",
            Screen::Marketing => "Marketing Dashboard",
            Screen::Seo => "SEO Performance Dashboard",
            Screen::Training => "Training Performance Dashboard",
            Screen::Renewals => "Certification Renewal Monitor",
        }
    }

    /// Sheets the screen reads.
    pub fn sheets(self) -> &'static [Sheet] {
        match self {
            Screen::Executive => &[Sheet::Revenue, Sheet::Expenses, Sheet::Clients],
            Screen::Financial => &[Sheet::Revenue, Sheet::Expenses],
            Screen::Sales => &[Sheet::Clients],
            Screen::Marketing => &[Sheet::Marketing],
            Screen::Seo => &[Sheet::Seo],
            Screen::Training => &[Sheet::Training],
            Screen::Renewals => &[Sheet::Clients],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub kpis: Vec<KpiResult>,
    pub monthly_revenue: Vec<MonthlyAggregate>,
    pub revenue_growth: Vec<MonthlyGrowth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialScreen {
    pub revenue_by_service: Vec<CategoryTotal>,
    pub expense_breakdown: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesScreen {
    pub clients_by_city: Vec<CategoryCount>,
    pub clients_by_industry: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingScreen {
    pub channels: Vec<ChannelMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoScreen {
    pub months: Vec<SeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingScreen {
    pub trainings: Vec<TrainingProfit>,
    pub total_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenewalScreen {
    pub today: NaiveDate,
    pub horizon_days: i64,
    pub at_risk: Vec<RenewalRisk>,
}

/// Output of one reporting pass. Screens that were not requested are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive: Option<ExecutiveSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial: Option<FinancialScreen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales: Option<SalesScreen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing: Option<MarketingScreen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo: Option<SeoScreen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training: Option<TrainingScreen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewals: Option<RenewalScreen>,
}

pub fn generate_executive(data: &Dataset, settings: &Settings) -> ExecutiveSummary {
    let figures = CoreFigures::compute(&data.revenue, &data.expenses, &data.clients);
    debug!(
        "core figures: revenue={} expenses={} clients={} months={}",
        figures.total_revenue,
        figures.total_expenses,
        figures.total_clients,
        figures.monthly_revenue.len()
    );
    let kpis = kpi::evaluate(&figures, &settings.thresholds);
    ExecutiveSummary {
        kpis,
        monthly_revenue: figures.monthly_revenue,
        revenue_growth: figures.revenue_growth,
    }
}

pub fn generate_financial(data: &Dataset) -> FinancialScreen {
    FinancialScreen {
        revenue_by_service: metrics::sum_by_category(
            &data.revenue,
            |r| r.service_category.as_str(),
            |r| r.gross_amount,
        ),
        expense_breakdown: metrics::sum_by_category(
            &data.expenses,
            |e| e.category.as_str(),
            |e| e.amount,
        ),
    }
}

pub fn generate_sales(data: &Dataset) -> SalesScreen {
    SalesScreen {
        clients_by_city: metrics::clients_by(&data.clients, |c| c.city.as_str()),
        clients_by_industry: metrics::clients_by(&data.clients, |c| c.industry.as_str()),
    }
}

pub fn generate_marketing(data: &Dataset) -> MarketingScreen {
    MarketingScreen {
        channels: metrics::channel_metrics(&data.marketing),
    }
}

pub fn generate_seo(data: &Dataset) -> SeoScreen {
    SeoScreen {
        months: metrics::seo_series(&data.seo),
    }
}

pub fn generate_training(data: &Dataset) -> TrainingScreen {
    let trainings = metrics::training_profitability(&data.training);
    let total_profit = trainings.iter().map(|t| t.profit).sum();
    TrainingScreen {
        trainings,
        total_profit,
    }
}

pub fn generate_renewals(data: &Dataset, settings: &Settings) -> RenewalScreen {
    RenewalScreen {
        today: settings.today,
        horizon_days: settings.horizon_days,
        at_risk: renewals::at_risk(&data.clients, settings.today, settings.horizon_days),
    }
}

/// Build the requested screens from already loaded data.
pub fn generate_report(data: &Dataset, screens: &[Screen], settings: &Settings) -> Report {
    let mut report = Report::default();
    for screen in screens {
        debug!("building screen '{}'", screen.title());
        match screen {
            Screen::Executive => report.executive = Some(generate_executive(data, settings)),
            Screen::Financial => report.financial = Some(generate_financial(data)),
            Screen::Sales => report.sales = Some(generate_sales(data)),
            Screen::Marketing => report.marketing = Some(generate_marketing(data)),
            Screen::Seo => report.seo = Some(generate_seo(data)),
            Screen::Training => report.training = Some(generate_training(data)),
            Screen::Renewals => report.renewals = Some(generate_renewals(data, settings)),
        }
    }
    report
}

/// One full pass: load the sheets the screens need, then compute them.
pub fn run_pass(
    source: &dyn DataSource,
    screens: &[Screen],
    settings: &Settings,
) -> Result<(Report, LoadReport), LoadError> {
    let sheets: Vec<Sheet> = screens.iter().flat_map(|s| s.sheets()).copied().collect();
    let (data, load_report) = loader::load_sheets(source, &sheets)?;
    Ok((generate_report(&data, screens, settings), load_report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::Status;
    use crate::metrics::MetricValue;
    use crate::source::InMemorySource;
    use std::collections::HashMap;

    fn settings() -> Settings {
        Settings {
            currency: "PKR".to_string(),
            today: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            horizon_days: 90,
            thresholds: HashMap::new(),
        }
    }

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with_rows(
                "Revenue",
                &["Invoice_Date", "Gross_Amount", "Service_Category"],
                &[
                    &["2024-01-15", "1000", "Certification"],
                    &["2024-02-03", "1500", "Audit"],
                ],
            )
            .with_rows(
                "Expenses",
                &["Category", "Amount", "COGS"],
                &[&["Operations", "500", "200"]],
            )
            .with_rows(
                "Clients",
                &["Client_ID", "Company_Name", "City", "Industry", "Renewal_Date"],
                &[
                    &["C-1", "Crescent Foods", "Lahore", "Food", "2024-03-01"],
                    &["C-2", "Indus Pharma", "Karachi", "Pharma", "2024-05-01"],
                    &["C-3", "Ravi Meats", "Lahore", "Food", "2023-12-01"],
                ],
            )
    }

    #[test]
    fn executive_pass_only_needs_core_sheets() {
        let (report, load_report) =
            run_pass(&source(), &[Screen::Executive], &settings()).expect("executive pass");
        let executive = report.executive.expect("executive built");
        assert!(report.marketing.is_none());
        assert_eq!(load_report.rows_per_sheet.len(), 3);

        let net = executive.kpis.iter().find(|k| k.key == "net_profit").unwrap();
        assert_eq!(net.value, MetricValue::Defined(2000.0));
        assert_eq!(net.status, Status::Up);
        assert_eq!(executive.monthly_revenue.len(), 2);
        assert_eq!(executive.revenue_growth[1].growth, MetricValue::Defined(50.0));
    }

    #[test]
    fn renewal_screen_lists_lapsed_and_due() {
        let (report, _) = run_pass(&source(), &[Screen::Renewals, Screen::Sales], &settings())
            .expect("renewal pass");
        let renewals = report.renewals.expect("renewals built");
        let ids: Vec<&str> = renewals.at_risk.iter().map(|r| r.client_id.as_str()).collect();
        assert_eq!(ids, vec!["C-1", "C-3"]);

        let sales = report.sales.expect("sales built");
        assert_eq!(sales.clients_by_city[0].category, "Karachi");
        assert_eq!(sales.clients_by_city[1].count, 2);
    }

    #[test]
    fn missing_sheet_aborts_only_screens_that_need_it() {
        let screens = [Screen::Executive, Screen::Training];
        let err = run_pass(&source(), &screens, &settings()).unwrap_err();
        assert!(matches!(err, LoadError::MissingTable(name) if name == "Training"));
    }

    #[test]
    fn training_total_includes_losses() {
        let source = InMemorySource::new().with_rows(
            "Training",
            &["Training_Type", "Revenue", "Cost"],
            &[&["Halal Awareness", "5000", "2000"], &["Internal Auditor", "1000", "1500"]],
        );
        let (report, _) =
            run_pass(&source, &[Screen::Training], &settings()).expect("training pass");
        let training = report.training.expect("training built");
        assert_eq!(training.total_profit, 2500.0);
        assert_eq!(training.trainings[1].profit, -500.0);
    }

    #[test]
    fn unrequested_screens_are_left_out_of_json() {
        let report = generate_report(&Dataset::default(), &[Screen::Financial], &settings());
        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["financial"]);
    }
}
