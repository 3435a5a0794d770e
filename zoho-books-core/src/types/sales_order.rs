//! Sales order requests

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{LineItem, ListOptions};
use crate::error::CoreResult;
use crate::utils::validation::{
    Validate, check_date_range, check_line_items, optional_date, optional_id,
    optional_non_negative, require_id, require_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum SalesOrderStatus {
    Draft,
    Open,
    Invoiced,
    PartiallyInvoiced,
    Void,
    Overdue,
}

impl SalesOrderStatus {
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Draft => "Status.Draft",
            Self::Open => "Status.Open",
            Self::Invoiced => "Status.Invoiced",
            Self::PartiallyInvoiced => "Status.PartiallyInvoiced",
            Self::Void => "Status.Void",
            Self::Overdue => "Status.Overdue",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ListSalesOrdersRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SalesOrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Order date lower bound, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,
    /// Order date upper bound, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<String>,
    #[serde(flatten)]
    pub options: ListOptions,
}

impl Validate for ListSalesOrdersRequest {
    fn validate(&self) -> CoreResult<()> {
        optional_id("customer_id", self.customer_id.as_deref())?;
        check_date_range(
            "date_start",
            self.date_start.as_deref(),
            "date_end",
            self.date_end.as_deref(),
        )
    }
}

impl ListSalesOrdersRequest {
    pub fn filters(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("filter_by".to_string(), status.as_filter().to_string()));
        }
        if let Some(customer_id) = &self.customer_id {
            params.push(("customer_id".to_string(), customer_id.clone()));
        }
        if let Some(start) = &self.date_start {
            params.push(("date_start".to_string(), start.clone()));
        }
        if let Some(end) = &self.date_end {
            params.push(("date_end".to_string(), end.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct CreateSalesOrderRequest {
    /// Customer placing the order (required)
    pub customer_id: String,
    /// Ordered lines, at least one
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesorder_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    /// Order date, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Expected shipment date, YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl Validate for CreateSalesOrderRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("customer_id", &self.customer_id)?;
        check_line_items(&self.line_items)?;
        optional_date("date", self.date.as_deref())?;
        optional_date("shipment_date", self.shipment_date.as_deref())?;
        optional_non_negative("discount", self.discount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct UpdateSalesOrderRequest {
    /// Sales order to update
    #[serde(skip_serializing)]
    pub salesorder_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Replaces every line of the order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Value>,
}

impl Validate for UpdateSalesOrderRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("salesorder_id", &self.salesorder_id)?;
        optional_id("customer_id", self.customer_id.as_deref())?;
        if let Some(lines) = &self.line_items {
            check_line_items(lines)?;
        }
        optional_date("date", self.date.as_deref())?;
        optional_date("shipment_date", self.shipment_date.as_deref())?;
        optional_non_negative("discount", self.discount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ConvertToInvoiceRequest {
    /// Sales order to invoice
    #[serde(skip_serializing)]
    pub salesorder_id: String,
    /// Number for the new invoice; Zoho assigns one when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

impl Validate for ConvertToInvoiceRequest {
    fn validate(&self) -> CoreResult<()> {
        require_id("salesorder_id", &self.salesorder_id)?;
        if let Some(number) = &self.invoice_number {
            require_text("invoice_number", number)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_needs_customer_and_lines() {
        let request: CreateSalesOrderRequest = serde_json::from_value(json!({
            "customer_id": "",
            "line_items": [{"item_id": "1", "quantity": 3}],
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request = CreateSalesOrderRequest {
            customer_id: "982000000567001".into(),
            ..request
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn status_filter_and_dates() {
        let request = ListSalesOrdersRequest {
            status: Some(SalesOrderStatus::PartiallyInvoiced),
            date_start: Some("2024-04-01".into()),
            ..ListSalesOrdersRequest::default()
        };
        let filters = request.filters();
        assert!(filters.contains(&("filter_by".into(), "Status.PartiallyInvoiced".into())));
        assert!(filters.contains(&("date_start".into(), "2024-04-01".into())));
    }

    #[test]
    fn convert_body_only_has_invoice_number() {
        let request = ConvertToInvoiceRequest {
            salesorder_id: "1".into(),
            invoice_number: Some("INV-00042".into()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"invoice_number": "INV-00042"})
        );
    }
}
