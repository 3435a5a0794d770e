//! Invoice requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{LineItem, ListOptions};
use crate::error::{CoreError, CoreResult};
use crate::utils::validation::{
    Validate, check_date_range, check_email, check_line_items, optional_date, optional_id,
    optional_non_negative, require_id, require_text,
};

/// Invoice status as Zoho filters it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Viewed,
    Overdue,
    Paid,
    PartiallyPaid,
    Unpaid,
    Void,
}

impl InvoiceStatus {
    #[must_use]
    pub const fn as_api(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Overdue => "overdue",
            Self::Paid => "paid",
            Self::PartiallyPaid => "partially_paid",
            Self::Unpaid => "unpaid",
            Self::Void => "void",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ListInvoicesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InvoiceStatus>,
    /// Only invoices of this customer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Invoice date lower bound, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    /// Invoice date upper bound, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(flatten)]
    pub options: ListOptions,
}

impl Validate for ListInvoicesRequest {
    fn validate(&self) -> CoreResult<()> {
        optional_id("customer_id", self.customer_id.as_deref())?;
        check_date_range(
            "date_from",
            self.date_from.as_deref(),
            "date_to",
            self.date_to.as_deref(),
        )
    }
}

impl ListInvoicesRequest {
    pub fn filters(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.as_api().to_string()));
        }
        if let Some(customer_id) = &self.customer_id {
            params.push(("customer_id".to_string(), customer_id.clone()));
        }
        if let Some(from) = &self.date_from {
            params.push(("date_start".to_string(), from.clone()));
        }
        if let Some(to) = &self.date_to {
            params.push(("date_end".to_string(), to.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateInvoiceRequest {
    /// Customer being billed (required)
    pub customer_id: String,
    /// Lines of the invoice, at least one
    pub line_items: Vec<LineItem>,
    /// Invoice number; Zoho assigns one when auto-numbering is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    /// Invoice date, YYYY-MM-DD (default today)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Due date, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Payment terms in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_discount_before_tax: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesperson_name: Option<String>,
    /// Notes printed on the invoice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Terms and conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl Validate for CreateInvoiceRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("customer_id", &self.customer_id)?;
        check_line_items(&self.line_items)?;
        if let Some(number) = &self.invoice_number {
            require_text("invoice_number", number)?;
        }
        optional_date("date", self.date.as_deref())?;
        optional_date("due_date", self.due_date.as_deref())?;
        optional_non_negative("discount", self.discount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UpdateInvoiceRequest {
    /// Invoice to update
    #[serde(skip_serializing)]
    pub invoice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Replaces every line of the invoice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl Validate for UpdateInvoiceRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("invoice_id", &self.invoice_id)?;
        optional_id("customer_id", self.customer_id.as_deref())?;
        if let Some(lines) = &self.line_items {
            check_line_items(lines)?;
        }
        optional_date("date", self.date.as_deref())?;
        optional_date("due_date", self.due_date.as_deref())?;
        optional_non_negative("discount", self.discount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct EmailInvoiceRequest {
    /// Invoice to send
    #[serde(skip_serializing)]
    pub invoice_id: String,
    /// Recipients; Zoho falls back to the customer's primary contact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_mail_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc_mail_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Email body (HTML allowed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Validate for EmailInvoiceRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("invoice_id", &self.invoice_id)?;
        let recipients = [
            ("to_mail_ids", &self.to_mail_ids),
            ("cc_mail_ids", &self.cc_mail_ids),
        ];
        for (field, list) in recipients {
            for address in list.iter().flatten() {
                check_email(field, address)?;
            }
        }
        if matches!(&self.to_mail_ids, Some(list) if list.is_empty()) {
            return Err(CoreError::ValidationError(
                "to_mail_ids must not be empty when given".to_string(),
            ));
        }
        Ok(())
    }
}
