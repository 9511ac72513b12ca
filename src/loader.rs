//! Typed loading of the workbook sheets.
//!
//! Column names are part of the contract: a required column that is missing
//! fails the load, while the optional expense breakdown columns resolve to
//! zero here, once, so the metric code never has to branch on presence.

use crate::error::LoadError;
use crate::source::{DataSource, Table};
use crate::types::{
    ClientRecord, ExpenseRecord, MarketingRecord, RevenueRecord, SeoRecord, TrainingRecord,
};
use crate::util::{parse_date_safe, parse_numeric, NumericCell};
use chrono::NaiveDate;
use log::{info, warn};

pub const REVENUE: &str = "Revenue";
pub const EXPENSES: &str = "Expenses";
pub const CLIENTS: &str = "Clients";
pub const MARKETING: &str = "Marketing";
pub const SEO: &str = "SEO";
pub const TRAINING: &str = "Training";

/// Optional numeric columns of the `Expenses` sheet.
pub const EXPENSE_OPTIONAL_COLUMNS: [&str; 4] = ["Depreciation", "Interest", "Taxes", "COGS"];

/// Diagnostics collected while loading, for the console summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// `(sheet, rows)` in load order.
    pub rows_per_sheet: Vec<(String, usize)>,
    /// Optional columns that were absent and therefore zero-filled.
    pub defaulted_columns: Vec<String>,
    /// Blank numeric cells that were read as 0.
    pub blank_cells: usize,
}

impl LoadReport {
    fn record_sheet(&mut self, table: &Table) {
        info!("loaded sheet '{}' ({} rows)", table.name, table.len());
        self.rows_per_sheet.push((table.name.clone(), table.len()));
    }

    pub fn total_rows(&self) -> usize {
        self.rows_per_sheet.iter().map(|(_, n)| n).sum()
    }
}

/// Every sheet of the workbook, decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub revenue: Vec<RevenueRecord>,
    pub expenses: Vec<ExpenseRecord>,
    pub clients: Vec<ClientRecord>,
    pub marketing: Vec<MarketingRecord>,
    pub seo: Vec<SeoRecord>,
    pub training: Vec<TrainingRecord>,
}

/// Cell decoding for one sheet with error context attached.
struct SheetReader<'a> {
    table: &'a Table,
    blank_cells: usize,
}

impl<'a> SheetReader<'a> {
    fn new(table: &'a Table) -> Self {
        Self {
            table,
            blank_cells: 0,
        }
    }

    fn text(&self, row: usize, col: usize) -> String {
        self.table.cell(row, col).trim().to_string()
    }

    fn number(&mut self, row: usize, col: usize) -> Result<f64, LoadError> {
        let raw = self.table.cell(row, col);
        match parse_numeric(raw) {
            NumericCell::Value(v) => Ok(v),
            NumericCell::Blank => {
                self.blank_cells += 1;
                Ok(0.0)
            }
            NumericCell::Invalid => Err(LoadError::InvalidNumber {
                table: self.table.name.clone(),
                row: sheet_row(row),
                column: self.table.headers[col].clone(),
                value: raw.to_string(),
            }),
        }
    }

    fn optional_number(&mut self, row: usize, col: Option<usize>) -> Result<f64, LoadError> {
        match col {
            Some(col) => self.number(row, col),
            None => Ok(0.0),
        }
    }

    fn date(&self, row: usize, col: usize) -> Result<NaiveDate, LoadError> {
        let raw = self.table.cell(row, col);
        parse_date_safe(raw).ok_or_else(|| LoadError::InvalidDate {
            table: self.table.name.clone(),
            row: sheet_row(row),
            column: self.table.headers[col].clone(),
            value: raw.to_string(),
        })
    }
}

/// Spreadsheet row number of a data row (row 1 is the header).
fn sheet_row(index: usize) -> usize {
    index + 2
}

pub fn load_revenue(
    source: &dyn DataSource,
    report: &mut LoadReport,
) -> Result<Vec<RevenueRecord>, LoadError> {
    let table = source.table(REVENUE)?;
    let date_col = table.require("Invoice_Date")?;
    let amount_col = table.require("Gross_Amount")?;
    let category_col = table.require("Service_Category")?;

    let mut reader = SheetReader::new(&table);
    let mut out = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        out.push(RevenueRecord {
            invoice_date: reader.date(row, date_col)?,
            gross_amount: reader.number(row, amount_col)?,
            service_category: reader.text(row, category_col),
        });
    }
    report.blank_cells += reader.blank_cells;
    report.record_sheet(&table);
    Ok(out)
}

pub fn load_expenses(
    source: &dyn DataSource,
    report: &mut LoadReport,
) -> Result<Vec<ExpenseRecord>, LoadError> {
    let table = source.table(EXPENSES)?;
    let category_col = table.require("Category")?;
    let amount_col = table.require("Amount")?;

    let [depreciation_col, interest_col, taxes_col, cogs_col] =
        EXPENSE_OPTIONAL_COLUMNS.map(|name| {
            let idx = table.column_index(name);
            if idx.is_none() {
                warn!("sheet '{}' has no '{}' column; using 0", table.name, name);
                report.defaulted_columns.push(name.to_string());
            }
            idx
        });

    let mut reader = SheetReader::new(&table);
    let mut out = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        out.push(ExpenseRecord {
            category: reader.text(row, category_col),
            amount: reader.number(row, amount_col)?,
            depreciation: reader.optional_number(row, depreciation_col)?,
            interest: reader.optional_number(row, interest_col)?,
            taxes: reader.optional_number(row, taxes_col)?,
            cogs: reader.optional_number(row, cogs_col)?,
        });
    }
    report.blank_cells += reader.blank_cells;
    report.record_sheet(&table);
    Ok(out)
}

pub fn load_clients(
    source: &dyn DataSource,
    report: &mut LoadReport,
) -> Result<Vec<ClientRecord>, LoadError> {
    let table = source.table(CLIENTS)?;
    let id_col = table.require("Client_ID")?;
    let city_col = table.require("City")?;
    let industry_col = table.require("Industry")?;
    let renewal_col = table.require("Renewal_Date")?;
    let name_col = table.column_index("Company_Name");

    let reader = SheetReader::new(&table);
    let mut out = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        out.push(ClientRecord {
            client_id: reader.text(row, id_col),
            company_name: name_col
                .map(|col| reader.text(row, col))
                .filter(|name| !name.is_empty()),
            city: reader.text(row, city_col),
            industry: reader.text(row, industry_col),
            renewal_date: reader.date(row, renewal_col)?,
        });
    }
    report.record_sheet(&table);
    Ok(out)
}

pub fn load_marketing(
    source: &dyn DataSource,
    report: &mut LoadReport,
) -> Result<Vec<MarketingRecord>, LoadError> {
    let table = source.table(MARKETING)?;
    let channel_col = table.require("Channel")?;
    let spend_col = table.require("Spend")?;
    let leads_col = table.require("Leads")?;
    let conversions_col = table.require("Conversions")?;
    let revenue_col = table.require("Revenue_Generated")?;

    let mut reader = SheetReader::new(&table);
    let mut out = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        out.push(MarketingRecord {
            channel: reader.text(row, channel_col),
            spend: reader.number(row, spend_col)?,
            leads: reader.number(row, leads_col)?,
            conversions: reader.number(row, conversions_col)?,
            revenue_generated: reader.number(row, revenue_col)?,
        });
    }
    report.blank_cells += reader.blank_cells;
    report.record_sheet(&table);
    Ok(out)
}

pub fn load_seo(
    source: &dyn DataSource,
    report: &mut LoadReport,
) -> Result<Vec<SeoRecord>, LoadError> {
    let table = source.table(SEO)?;
    let month_col = table.require("Month")?;
    let visitors_col = table.require("Website_Visitors")?;
    let organic_col = table.require("Organic_Traffic")?;

    let mut reader = SheetReader::new(&table);
    let mut out = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        out.push(SeoRecord {
            month: reader.text(row, month_col),
            website_visitors: reader.number(row, visitors_col)?,
            organic_traffic: reader.number(row, organic_col)?,
        });
    }
    report.blank_cells += reader.blank_cells;
    report.record_sheet(&table);
    Ok(out)
}

pub fn load_training(
    source: &dyn DataSource,
    report: &mut LoadReport,
) -> Result<Vec<TrainingRecord>, LoadError> {
    let table = source.table(TRAINING)?;
    let type_col = table.require("Training_Type")?;
    let revenue_col = table.require("Revenue")?;
    let cost_col = table.require("Cost")?;

    let mut reader = SheetReader::new(&table);
    let mut out = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        out.push(TrainingRecord {
            training_type: reader.text(row, type_col),
            revenue: reader.number(row, revenue_col)?,
            cost: reader.number(row, cost_col)?,
        });
    }
    report.blank_cells += reader.blank_cells;
    report.record_sheet(&table);
    Ok(out)
}

/// The workbook sheets, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sheet {
    Revenue,
    Expenses,
    Clients,
    Marketing,
    Seo,
    Training,
}

impl Sheet {
    pub const ALL: [Sheet; 6] = [
        Sheet::Revenue,
        Sheet::Expenses,
        Sheet::Clients,
        Sheet::Marketing,
        Sheet::Seo,
        Sheet::Training,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Sheet::Revenue => REVENUE,
            Sheet::Expenses => EXPENSES,
            Sheet::Clients => CLIENTS,
            Sheet::Marketing => MARKETING,
            Sheet::Seo => SEO,
            Sheet::Training => TRAINING,
        }
    }
}

/// Load only the listed sheets (each at most once, in [`Sheet::ALL`] order).
/// Sheets that are not listed stay empty. Any load error aborts the pass.
pub fn load_sheets(
    source: &dyn DataSource,
    sheets: &[Sheet],
) -> Result<(Dataset, LoadReport), LoadError> {
    let mut report = LoadReport::default();
    let mut data = Dataset::default();
    for sheet in Sheet::ALL.into_iter().filter(|s| sheets.contains(s)) {
        match sheet {
            Sheet::Revenue => data.revenue = load_revenue(source, &mut report)?,
            Sheet::Expenses => data.expenses = load_expenses(source, &mut report)?,
            Sheet::Clients => data.clients = load_clients(source, &mut report)?,
            Sheet::Marketing => data.marketing = load_marketing(source, &mut report)?,
            Sheet::Seo => data.seo = load_seo(source, &mut report)?,
            Sheet::Training => data.training = load_training(source, &mut report)?,
        }
    }
    Ok((data, report))
}

/// Load all six sheets.
pub fn load_all(source: &dyn DataSource) -> Result<(Dataset, LoadReport), LoadError> {
    load_sheets(source, &Sheet::ALL)
}
