//! Expense requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::ListOptions;
use crate::error::CoreResult;
use crate::utils::validation::{
    Validate, check_date, check_date_range, check_positive, optional_date, optional_id,
    require_id,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Unbilled,
    Invoiced,
    Reimbursed,
    Billable,
    NonBillable,
}

impl ExpenseStatus {
    #[must_use]
    pub const fn as_api(self) -> &'static str {
        match self {
            Self::Unbilled => "Status.Unbilled",
            Self::Invoiced => "Status.Invoiced",
            Self::Reimbursed => "Status.Reimbursed",
            Self::Billable => "Status.Billable",
            Self::NonBillable => "Status.Nonbillable",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ListExpensesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExpenseStatus>,
    /// Only expenses paid to this vendor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    /// Only expenses billable to this customer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Expense date lower bound, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    /// Expense date upper bound, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(flatten)]
    pub options: ListOptions,
}

impl Validate for ListExpensesRequest {
    fn validate(&self) -> CoreResult<()> {
        optional_id("vendor_id", self.vendor_id.as_deref())?;
        optional_id("customer_id", self.customer_id.as_deref())?;
        check_date_range(
            "date_from",
            self.date_from.as_deref(),
            "date_to",
            self.date_to.as_deref(),
        )
    }
}

impl ListExpensesRequest {
    pub fn filters(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("filter_by".to_string(), status.as_api().to_string()));
        }
        if let Some(vendor_id) = &self.vendor_id {
            params.push(("vendor_id".to_string(), vendor_id.clone()));
        }
        if let Some(customer_id) = &self.customer_id {
            params.push(("customer_id".to_string(), customer_id.clone()));
        }
        if let Some(from) = &self.date_from {
            params.push(("date.from".to_string(), from.clone()));
        }
        if let Some(to) = &self.date_to {
            params.push(("date.to".to_string(), to.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateExpenseRequest {
    /// Expense account (required)
    pub account_id: String,
    /// Cash, bank or card account the expense was paid from (required)
    pub paid_through_account_id: String,
    /// Expense date, YYYY-MM-DD (required)
    pub date: String,
    /// Amount, greater than 0 (required)
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    /// Whether the expense can be billed to a customer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_billable: Option<bool>,
    /// Customer to bill when is_billable is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl Validate for CreateExpenseRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("account_id", &self.account_id)?;
        require_id("paid_through_account_id", &self.paid_through_account_id)?;
        check_date("date", &self.date)?;
        check_positive("amount", self.amount)?;
        optional_id("vendor_id", self.vendor_id.as_deref())?;
        optional_id("customer_id", self.customer_id.as_deref())?;
        optional_id("project_id", self.project_id.as_deref())?;
        optional_id("tax_id", self.tax_id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UpdateExpenseRequest {
    /// Expense to update
    #[serde(skip_serializing)]
    pub expense_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_through_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_billable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl Validate for UpdateExpenseRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("expense_id", &self.expense_id)?;
        optional_id("account_id", self.account_id.as_deref())?;
        optional_id(
            "paid_through_account_id",
            self.paid_through_account_id.as_deref(),
        )?;
        optional_date("date", self.date.as_deref())?;
        if let Some(amount) = self.amount {
            check_positive("amount", amount)?;
        }
        optional_id("vendor_id", self.vendor_id.as_deref())?;
        optional_id("customer_id", self.customer_id.as_deref())
    }
}
