//! Read-only aggregates behind the MCP resources

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{
    CashFlowSummary, DashboardSummary, InvoiceStatus, ListExpensesRequest, ListInvoicesRequest,
    ListOptions, MAX_PAGE_SIZE, PeriodTotals, ResourceKind, SortOrder,
};
use crate::utils::datetime::{days_before, month_start, zoho_date};

/// Window of `recent_payments`.
pub const RECENT_PAYMENT_DAYS: u64 = 30;

const REPORT_LIST_SIZE: u32 = 100;
const PAYMENT_LIST_SIZE: u32 = 50;

pub struct ReportService {
    ctx: Arc<ServiceContext>,
}

impl ReportService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Organization name, outstanding balances and revenue of the month so far.
    pub async fn dashboard_summary(&self, as_of: NaiveDate) -> CoreResult<DashboardSummary> {
        let (organization, overdue, unpaid, paid) = futures::try_join!(
            self.organization(),
            self.invoices(InvoiceStatus::Overdue, None, MAX_PAGE_SIZE, None),
            self.invoices(InvoiceStatus::Unpaid, None, MAX_PAGE_SIZE, None),
            self.invoices(
                InvoiceStatus::Paid,
                Some((month_start(as_of), as_of)),
                MAX_PAGE_SIZE,
                None
            ),
        )?;

        let organization_name = organization
            .as_ref()
            .and_then(|o| o.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        let currency_code = organization
            .as_ref()
            .and_then(|o| o.get("currency_code"))
            .and_then(Value::as_str)
            .map(ToString::to_string);

        Ok(DashboardSummary {
            organization_name,
            currency_code,
            overdue: totals(&overdue, "balance"),
            unpaid: totals(&unpaid, "balance"),
            revenue_month_to_date: totals(&paid, "total"),
            as_of,
        })
    }

    /// Overdue invoices, oldest due date first.
    pub async fn overdue_invoices(&self) -> CoreResult<Vec<Value>> {
        self.invoices(
            InvoiceStatus::Overdue,
            None,
            REPORT_LIST_SIZE,
            Some(("due_date", SortOrder::Ascending)),
        )
        .await
    }

    /// Unpaid invoices, newest first.
    pub async fn unpaid_invoices(&self) -> CoreResult<Vec<Value>> {
        self.invoices(
            InvoiceStatus::Unpaid,
            None,
            REPORT_LIST_SIZE,
            Some(("date", SortOrder::Descending)),
        )
        .await
    }

    /// Customer payments of the last 30 days, newest first.
    pub async fn recent_payments(&self, as_of: NaiveDate) -> CoreResult<Vec<Value>> {
        let params = [
            ("date_start", zoho_date(days_before(as_of, RECENT_PAYMENT_DAYS))),
            ("date_end", zoho_date(as_of)),
            ("sort_column", "date".to_string()),
            ("sort_order", SortOrder::Descending.as_api().to_string()),
            ("per_page", PAYMENT_LIST_SIZE.to_string()),
        ]
        .map(|(name, value)| (name.to_string(), value));

        let response = self.ctx.api.get("/customerpayments", &params).await?;
        Ok(match response.get("customerpayments") {
            Some(Value::Array(payments)) => payments.clone(),
            _ => Vec::new(),
        })
    }

    /// Paid invoices against expenses, from the first of the month to `as_of`.
    pub async fn cash_flow(&self, as_of: NaiveDate) -> CoreResult<CashFlowSummary> {
        let period_start = month_start(as_of);
        let expenses = ListExpensesRequest {
            date_from: Some(zoho_date(period_start)),
            date_to: Some(zoho_date(as_of)),
            options: page_of(MAX_PAGE_SIZE, None),
            ..ListExpensesRequest::default()
        };

        let (paid, spent) = futures::try_join!(
            self.invoices(
                InvoiceStatus::Paid,
                Some((period_start, as_of)),
                MAX_PAGE_SIZE,
                None
            ),
            self.ctx.list_records(
                ResourceKind::Expense,
                &expenses.options,
                expenses.filters()
            ),
        )?;

        Ok(CashFlowSummary {
            period_start,
            period_end: as_of,
            inflow: totals(&paid, "total"),
            outflow: totals(&spent.items, "total"),
        })
    }

    /// The configured organization, or the first one the token can see.
    async fn organization(&self) -> CoreResult<Option<Value>> {
        let response = self.ctx.api.get("/organizations", &[]).await?;
        let Some(Value::Array(organizations)) = response.get("organizations") else {
            return Ok(None);
        };
        let wanted = self.ctx.api.organization_id();
        Ok(organizations
            .iter()
            .find(|o| o.get("organization_id").and_then(Value::as_str) == Some(wanted))
            .or_else(|| organizations.first())
            .cloned())
    }

    async fn invoices(
        &self,
        status: InvoiceStatus,
        period: Option<(NaiveDate, NaiveDate)>,
        page_size: u32,
        sort: Option<(&str, SortOrder)>,
    ) -> CoreResult<Vec<Value>> {
        let request = ListInvoicesRequest {
            status: Some(status),
            date_from: period.map(|(start, _)| zoho_date(start)),
            date_to: period.map(|(_, end)| zoho_date(end)),
            options: page_of(page_size, sort),
            ..ListInvoicesRequest::default()
        };
        let page = self
            .ctx
            .list_records(ResourceKind::Invoice, &request.options, request.filters())
            .await?;
        Ok(page.items)
    }
}

fn page_of(page_size: u32, sort: Option<(&str, SortOrder)>) -> ListOptions {
    ListOptions {
        page_size: Some(page_size),
        sort_column: sort.map(|(column, _)| column.to_string()),
        sort_order: sort.map(|(_, order)| order),
        ..ListOptions::default()
    }
}

fn totals(records: &[Value], field: &str) -> PeriodTotals {
    records.iter().fold(PeriodTotals::default(), |mut acc, r| {
        acc.add(record_amount(r, field));
        acc
    })
}

/// Zoho sends amounts as numbers, occasionally as numeric strings.
pub fn record_amount(record: &Value, field: &str) -> f64 {
    match record.get(field) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    }
}
