//! Aggregates computed for the read-only resources

use chrono::NaiveDate;
use serde::Serialize;

/// Count and sum of a set of documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub count: usize,
    pub amount: f64,
}

impl PeriodTotals {
    pub fn add(&mut self, amount: f64) {
        self.count += 1;
        self.amount += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub organization_name: String,
    pub currency_code: Option<String>,
    /// Outstanding balance of overdue invoices.
    pub overdue: PeriodTotals,
    /// Outstanding balance of every unpaid invoice.
    pub unpaid: PeriodTotals,
    /// Paid invoices dated this month.
    pub revenue_month_to_date: PeriodTotals,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Paid invoices in the period.
    pub inflow: PeriodTotals,
    /// Expenses in the period.
    pub outflow: PeriodTotals,
}

impl CashFlowSummary {
    #[must_use]
    pub fn net(&self) -> f64 {
        self.inflow.amount - self.outflow.amount
    }
}
