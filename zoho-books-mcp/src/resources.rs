//! Read-only MCP resources rendered as markdown.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;
use rmcp::model::{AnnotateAble, RawResource, Resource, ResourceTemplate};
use serde_json::{Value, json};
use zoho_books_core::error::CoreResult;
use zoho_books_core::services::{
    ContactService, ExpenseService, InvoiceService, ItemService, RECENT_PAYMENT_DAYS,
    ReportService, ServiceContext, record_amount,
};
use zoho_books_core::types::{
    ListContactsRequest, ListExpensesRequest, ListInvoicesRequest, ListItemsRequest, ListOptions,
    ListPage,
};

const MARKDOWN: &str = "text/markdown";
const CONTACT_LIST_SIZE: u32 = 100;
const INVOICE_LIST_SIZE: u32 = 50;
const EXPENSE_LIST_SIZE: u32 = 50;
const ITEM_LIST_SIZE: u32 = 100;
const DESCRIPTION_WIDTH: usize = 50;

/// A resource address the server knows how to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    Dashboard,
    OverdueInvoices,
    UnpaidInvoices,
    RecentPayments,
    Contacts,
    Contact(String),
    Invoices,
    Expenses,
    Items,
    CashFlow,
}

impl ResourceUri {
    pub fn parse(uri: &str) -> Option<Self> {
        let parsed = match uri {
            "dashboard://summary" => Self::Dashboard,
            "invoice://overdue" => Self::OverdueInvoices,
            "invoice://unpaid" => Self::UnpaidInvoices,
            "invoice://list" => Self::Invoices,
            "payment://recent" => Self::RecentPayments,
            "contact://list" => Self::Contacts,
            "expense://list" => Self::Expenses,
            "item://list" => Self::Items,
            "report://cash_flow" => Self::CashFlow,
            _ => {
                let id = uri.strip_prefix("contact://")?.trim();
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Self::Contact(id.to_string())
            }
        };
        Some(parsed)
    }
}

/// Fixed resources, in listing order: (uri, name, description).
const STATIC_RESOURCES: &[(&str, &str, &str)] = &[
    (
        "dashboard://summary",
        "Dashboard Summary",
        "Organization overview: overdue and unpaid balances, revenue this month",
    ),
    (
        "invoice://overdue",
        "Overdue Invoices",
        "Overdue invoices, oldest due date first",
    ),
    (
        "invoice://unpaid",
        "Unpaid Invoices",
        "Unpaid invoices, newest first",
    ),
    (
        "payment://recent",
        "Recent Payments",
        "Customer payments received in the last 30 days",
    ),
    ("contact://list", "Contact List", "Customers and vendors"),
    ("invoice://list", "Invoice List", "Most recent invoices"),
    ("expense://list", "Expense List", "Most recent expenses"),
    (
        "item://list",
        "Item List",
        "Products and services with their rates",
    ),
    (
        "report://cash_flow",
        "Cash Flow",
        "Paid invoices against expenses for the current month",
    ),
];

pub fn catalog() -> Vec<Resource> {
    STATIC_RESOURCES
        .iter()
        .map(|(uri, name, description)| {
            let mut raw = RawResource::new(*uri, *name);
            raw.description = Some((*description).to_string());
            raw.mime_type = Some(MARKDOWN.to_string());
            raw.no_annotation()
        })
        .collect()
}

pub fn templates() -> serde_json::Result<Vec<ResourceTemplate>> {
    let contact = serde_json::from_value(json!({
        "uriTemplate": "contact://{contact_id}",
        "name": "Contact Details",
        "description": "Contact information, balances and addresses of one contact",
        "mimeType": MARKDOWN,
    }))?;
    Ok(vec![contact])
}

/// Fetches and renders resources.
pub struct ResourceReader {
    contacts: Arc<ContactService>,
    invoices: Arc<InvoiceService>,
    expenses: Arc<ExpenseService>,
    items: Arc<ItemService>,
    reports: ReportService,
}

impl ResourceReader {
    pub fn new(
        ctx: &Arc<ServiceContext>,
        contacts: Arc<ContactService>,
        invoices: Arc<InvoiceService>,
        expenses: Arc<ExpenseService>,
        items: Arc<ItemService>,
    ) -> Self {
        Self {
            contacts,
            invoices,
            expenses,
            items,
            reports: ReportService::new(Arc::clone(ctx)),
        }
    }

    /// Markdown body of `uri` as of `today`.
    pub async fn read(&self, uri: &ResourceUri, today: NaiveDate) -> CoreResult<String> {
        match uri {
            ResourceUri::Dashboard => self.dashboard(today).await,
            ResourceUri::OverdueInvoices => {
                let invoices = self.reports.overdue_invoices().await?;
                Ok(render_overdue(&invoices, today))
            }
            ResourceUri::UnpaidInvoices => {
                let invoices = self.reports.unpaid_invoices().await?;
                Ok(render_unpaid(&invoices))
            }
            ResourceUri::RecentPayments => {
                let payments = self.reports.recent_payments(today).await?;
                Ok(render_payments(&payments))
            }
            ResourceUri::Contacts => {
                let page = self
                    .contacts
                    .list_contacts(&ListContactsRequest {
                        options: first_page(CONTACT_LIST_SIZE),
                        ..ListContactsRequest::default()
                    })
                    .await?;
                Ok(render_contacts(&page))
            }
            ResourceUri::Contact(id) => {
                let response = self.contacts.get_contact(id).await?;
                Ok(response.record.as_ref().map_or_else(
                    || format!("# Contact Not Found\n\nContact ID: {id}\n"),
                    render_contact,
                ))
            }
            ResourceUri::Invoices => {
                let page = self
                    .invoices
                    .list_invoices(&ListInvoicesRequest {
                        options: first_page(INVOICE_LIST_SIZE),
                        ..ListInvoicesRequest::default()
                    })
                    .await?;
                Ok(render_invoices(&page))
            }
            ResourceUri::Expenses => {
                let page = self
                    .expenses
                    .list_expenses(&ListExpensesRequest {
                        options: first_page(EXPENSE_LIST_SIZE),
                        ..ListExpensesRequest::default()
                    })
                    .await?;
                Ok(render_expenses(&page))
            }
            ResourceUri::Items => {
                let page = self
                    .items
                    .list_items(&ListItemsRequest {
                        options: first_page(ITEM_LIST_SIZE),
                        ..ListItemsRequest::default()
                    })
                    .await?;
                Ok(render_items(&page))
            }
            ResourceUri::CashFlow => {
                let summary = self.reports.cash_flow(today).await?;
                let mut out = String::from("# Cash Flow Summary\n\n");
                let _ = writeln!(
                    out,
                    "**Period**: {} to {}\n",
                    summary.period_start, summary.period_end
                );
                out.push_str("| | Count | Amount |\n|---|---|---|\n");
                let _ = writeln!(
                    out,
                    "| Income (paid invoices) | {} | {} |",
                    summary.inflow.count,
                    money(summary.inflow.amount)
                );
                let _ = writeln!(
                    out,
                    "| Expenses | {} | {} |",
                    summary.outflow.count,
                    money(summary.outflow.amount)
                );
                let _ = writeln!(out, "\n**Net Cash Flow**: {}", money(summary.net()));
                Ok(out)
            }
        }
    }

    async fn dashboard(&self, today: NaiveDate) -> CoreResult<String> {
        let summary = self.reports.dashboard_summary(today).await?;
        let currency = summary
            .currency_code
            .as_deref()
            .map(|c| format!(" {c}"))
            .unwrap_or_default();

        let mut out = String::from("# Zoho Books Dashboard Summary\n\n");
        let _ = writeln!(out, "**Organization**: {}", summary.organization_name);
        let _ = writeln!(out, "**Date**: {}\n", summary.as_of);
        out.push_str("## Key Metrics\n\n");
        let _ = writeln!(
            out,
            "- **Overdue Invoices**: {} ({}{currency} outstanding)",
            summary.overdue.count,
            money(summary.overdue.amount)
        );
        let _ = writeln!(
            out,
            "- **Unpaid Invoices**: {} ({}{currency} outstanding)",
            summary.unpaid.count,
            money(summary.unpaid.amount)
        );
        let _ = writeln!(
            out,
            "- **Revenue This Month**: {}{currency} from {} paid invoice(s) ({})",
            money(summary.revenue_month_to_date.amount),
            summary.revenue_month_to_date.count,
            summary.as_of.format("%B %Y")
        );
        out.push_str(
            "\n## Quick Links\n\n\
             - Overdue invoices: invoice://overdue\n\
             - Unpaid invoices: invoice://unpaid\n\
             - Recent payments: payment://recent\n\
             - Cash flow: report://cash_flow\n",
        );
        Ok(out)
    }
}

fn first_page(page_size: u32) -> ListOptions {
    ListOptions {
        page_size: Some(page_size),
        ..ListOptions::default()
    }
}

fn render_overdue(invoices: &[Value], today: NaiveDate) -> String {
    let mut out = format!("# Overdue Invoices\n\nTotal: {}\n\n", invoices.len());
    if invoices.is_empty() {
        out.push_str("*No overdue invoices found.*\n");
        return out;
    }
    out.push_str("| Invoice # | Customer | Balance | Due Date | Days Overdue |\n");
    out.push_str("|---|---|---|---|---|\n");
    for invoice in invoices {
        let days_overdue = text(invoice, "due_date")
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map_or_else(|| "-".to_string(), |due| (today - due).num_days().to_string());
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {days_overdue} |",
            cell(invoice, "invoice_number"),
            cell(invoice, "customer_name"),
            money(record_amount(invoice, "balance")),
            cell(invoice, "due_date"),
        );
    }
    out
}

fn render_unpaid(invoices: &[Value]) -> String {
    let mut out = format!("# Unpaid Invoices\n\nTotal: {}\n\n", invoices.len());
    if invoices.is_empty() {
        out.push_str("*No unpaid invoices found.*\n");
        return out;
    }
    out.push_str("| Invoice # | Customer | Balance | Date | Due Date | Status |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for invoice in invoices {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            cell(invoice, "invoice_number"),
            cell(invoice, "customer_name"),
            money(record_amount(invoice, "balance")),
            cell(invoice, "date"),
            cell(invoice, "due_date"),
            status(invoice),
        );
    }
    out
}

fn render_payments(payments: &[Value]) -> String {
    let mut out = format!(
        "# Recent Payments (Last {RECENT_PAYMENT_DAYS} Days)\n\nTotal: {}\n\n",
        payments.len()
    );
    if payments.is_empty() {
        out.push_str("*No recent payments found.*\n");
        return out;
    }
    out.push_str("| Date | Customer | Amount | Reference # | Invoice # |\n");
    out.push_str("|---|---|---|---|---|\n");
    for payment in payments {
        let invoices = payment
            .get("invoices")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|i| text(i, "invoice_number"))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {invoices} |",
            cell(payment, "date"),
            cell(payment, "customer_name"),
            money(record_amount(payment, "amount")),
            cell(payment, "reference_number"),
        );
    }
    let total: f64 = payments.iter().map(|p| record_amount(p, "amount")).sum();
    let _ = writeln!(out, "\n**Total Received**: {}", money(total));
    out
}

fn render_contacts(page: &ListPage) -> String {
    let mut out = format!("# Contact List\n\nTotal: {}\n\n", page_total(page));
    if page.items.is_empty() {
        out.push_str("*No contacts found.*\n");
        return out;
    }
    out.push_str("| Name | Type | Email | Phone | Receivable |\n");
    out.push_str("|---|---|---|---|---|\n");
    for contact in &page.items {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            cell(contact, "contact_name"),
            cell(contact, "contact_type"),
            cell(contact, "email"),
            cell(contact, "phone"),
            money(record_amount(contact, "outstanding_receivable_amount")),
        );
    }
    more_hint(&mut out, page, "list_contacts");
    out
}

fn render_contact(contact: &Value) -> String {
    let mut out = String::from("# Contact Details\n\n");
    let _ = writeln!(out, "**Name**: {}", cell(contact, "contact_name"));
    let _ = writeln!(out, "**Type**: {}", cell(contact, "contact_type"));
    let _ = writeln!(out, "**Status**: {}\n", cell(contact, "status"));
    out.push_str("## Contact Information\n\n");
    for (label, field) in [("Email", "email"), ("Phone", "phone"), ("Mobile", "mobile")] {
        let _ = writeln!(out, "- **{label}**: {}", cell(contact, field));
    }
    out.push_str("\n## Financial Summary\n\n");
    let _ = writeln!(
        out,
        "- **Outstanding Receivable**: {}",
        money(record_amount(contact, "outstanding_receivable_amount"))
    );
    let _ = writeln!(
        out,
        "- **Outstanding Payable**: {}",
        money(record_amount(contact, "outstanding_payable_amount"))
    );
    let _ = writeln!(out, "- **Currency**: {}", cell(contact, "currency_code"));

    let billing = contact.get("billing_address").filter(|a| a.is_object());
    let shipping = contact
        .get("shipping_address")
        .filter(|a| a.is_object() && Some(*a) != billing);
    if billing.is_some() || shipping.is_some() {
        out.push_str("\n## Addresses\n");
    }
    for (heading, address) in [("Billing", billing), ("Shipping", shipping)] {
        if let Some(address) = address {
            let _ = write!(out, "\n### {heading} Address\n\n{}\n", render_address(address));
        }
    }
    out
}

fn render_address(address: &Value) -> String {
    let part = |field: &str| text(address, field).unwrap_or_default();
    let locality = [part("city"), part("state"), part("zip")]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    [part("address"), locality.as_str(), part("country")]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_invoices(page: &ListPage) -> String {
    let mut out = format!("# Invoice List\n\nTotal: {}\n\n", page_total(page));
    if page.items.is_empty() {
        out.push_str("*No invoices found.*\n");
        return out;
    }
    out.push_str("| Invoice # | Customer | Date | Total | Balance | Status |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for invoice in &page.items {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            cell(invoice, "invoice_number"),
            cell(invoice, "customer_name"),
            cell(invoice, "date"),
            money(record_amount(invoice, "total")),
            money(record_amount(invoice, "balance")),
            status(invoice),
        );
    }
    more_hint(&mut out, page, "list_invoices");
    out
}

fn render_expenses(page: &ListPage) -> String {
    let mut out = format!("# Expense List\n\nTotal: {}\n\n", page_total(page));
    if page.items.is_empty() {
        out.push_str("*No expenses found.*\n");
        return out;
    }
    out.push_str("| Date | Description | Account | Amount | Status |\n");
    out.push_str("|---|---|---|---|---|\n");
    for expense in &page.items {
        let description: String = cell(expense, "description")
            .chars()
            .take(DESCRIPTION_WIDTH)
            .collect();
        let _ = writeln!(
            out,
            "| {} | {description} | {} | {} | {} |",
            cell(expense, "date"),
            cell(expense, "account_name"),
            money(record_amount(expense, "total")),
            cell(expense, "status"),
        );
    }
    more_hint(&mut out, page, "list_expenses");
    out
}

fn render_items(page: &ListPage) -> String {
    let mut out = format!(
        "# Item List (Products & Services)\n\nTotal: {}\n\n",
        page_total(page)
    );
    if page.items.is_empty() {
        out.push_str("*No items found.*\n");
        return out;
    }
    out.push_str("| Name | Type | SKU | Rate | Stock | Status |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for item in &page.items {
        let active = if text(item, "status") == Some("active") {
            "Active"
        } else {
            "Inactive"
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {active} |",
            cell(item, "name"),
            cell(item, "product_type"),
            cell(item, "sku"),
            money(record_amount(item, "rate")),
            cell(item, "stock_on_hand"),
        );
    }
    more_hint(&mut out, page, "list_items");
    out
}

fn page_total(page: &ListPage) -> String {
    page.total
        .map_or_else(|| page.items.len().to_string(), |t| t.to_string())
}

fn more_hint(out: &mut String, page: &ListPage, tool: &str) {
    if page.has_more_page {
        let _ = writeln!(
            out,
            "\n*Showing the first {} records. Use the `{tool}` tool to page through the rest.*",
            page.items.len()
        );
    }
}

fn status(record: &Value) -> String {
    match text(record, "status") {
        Some("overdue") => "**Overdue**".to_string(),
        _ => cell(record, "status"),
    }
}

fn text<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Table cell for `field`; `-` when absent, pipes escaped.
fn cell(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.replace('|', "\\|").replace('\n', " "),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => "-".to_string(),
    }
}

fn money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", amount.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}{grouped}.{fraction}")
}
