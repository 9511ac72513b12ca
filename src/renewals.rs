//! Certification renewal monitor.

use crate::types::{ClientRecord, RenewalRisk};
use crate::util::days_between;
use chrono::NaiveDate;

pub const DEFAULT_HORIZON_DAYS: i64 = 90;

/// Days from `today` until each client's renewal date. Lapsed renewals are
/// negative.
pub fn days_left(clients: &[ClientRecord], today: NaiveDate) -> Vec<RenewalRisk> {
    clients
        .iter()
        .map(|c| RenewalRisk {
            client_id: c.client_id.clone(),
            company_name: c.company_name.clone(),
            renewal_date: c.renewal_date,
            days_left: days_between(today, c.renewal_date),
        })
        .collect()
}

/// Clients whose renewal is due within `horizon_days` of `today`, including
/// every renewal that has already lapsed. The result keeps the input order.
pub fn at_risk(clients: &[ClientRecord], today: NaiveDate, horizon_days: i64) -> Vec<RenewalRisk> {
    days_left(clients, today)
        .into_iter()
        .filter(|r| r.days_left <= horizon_days)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str, renewal: (i32, u32, u32)) -> ClientRecord {
        ClientRecord {
            client_id: id.to_string(),
            company_name: Some(format!("{id} Foods")),
            city: "Lahore".to_string(),
            industry: "Food".to_string(),
            renewal_date: NaiveDate::from_ymd_opt(renewal.0, renewal.1, renewal.2).unwrap(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn window_is_one_sided() {
        let clients = vec![
            client("soon", (2024, 3, 1)),
            client("later", (2024, 5, 1)),
            client("lapsed", (2023, 12, 1)),
        ];
        let risk = at_risk(&clients, today(), DEFAULT_HORIZON_DAYS);

        let ids: Vec<&str> = risk.iter().map(|r| r.client_id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "lapsed"]);
        assert_eq!(risk[0].days_left, 60);
        assert_eq!(risk[1].days_left, -31);
    }

    #[test]
    fn horizon_is_inclusive() {
        let clients = vec![client("edge", (2024, 3, 31)), client("past-edge", (2024, 4, 1))];
        let risk = at_risk(&clients, today(), 90);
        assert_eq!(risk.len(), 1);
        assert_eq!(risk[0].client_id, "edge");
        assert_eq!(risk[0].days_left, 90);
    }

    #[test]
    fn keeps_input_order_not_urgency() {
        let clients = vec![client("b", (2024, 2, 1)), client("a", (2024, 1, 2))];
        let risk = at_risk(&clients, today(), 90);
        assert_eq!(risk[0].client_id, "b");
        assert_eq!(risk[1].client_id, "a");
    }

    #[test]
    fn zero_horizon_keeps_due_today_and_lapsed() {
        let clients = vec![client("today", (2024, 1, 1)), client("tomorrow", (2024, 1, 2))];
        let risk = at_risk(&clients, today(), 0);
        assert_eq!(risk.len(), 1);
        assert_eq!(risk[0].days_left, 0);
    }
}
