//! HACI business-intelligence reporting.
//!
//! Loads the workbook sheets (revenue, expenses, clients, marketing, SEO,
//! training), derives the executive KPIs and per-screen breakdowns, and
//! hands plain serializable structs to whatever renders them.
//!
//! Data flows one way: `source` → `loader` → `metrics`/`kpi` →
//! (`alerts`, `renewals`) → `reports` → `output`.

pub mod alerts;
pub mod config;
pub mod error;
pub mod kpi;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod renewals;
pub mod reports;
pub mod source;
pub mod types;
pub mod util;

pub use error::LoadError;
pub use metrics::MetricValue;
pub use reports::{run_pass, Report, Screen};
