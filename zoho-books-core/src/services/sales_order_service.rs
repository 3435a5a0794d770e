//! Sales order service

use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::{ServiceContext, zoho_message};
use crate::types::{
    ActionResponse, ConvertToInvoiceRequest, CreateSalesOrderRequest, ListPage,
    ListSalesOrdersRequest, RecordResponse, ResourceKind, UpdateSalesOrderRequest,
};
use crate::utils::validation::{Validate, update_body};

const KIND: ResourceKind = ResourceKind::SalesOrder;

pub struct SalesOrderService {
    ctx: Arc<ServiceContext>,
}

impl SalesOrderService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn list_sales_orders(
        &self,
        request: &ListSalesOrdersRequest,
    ) -> CoreResult<ListPage> {
        request.validate()?;
        self.ctx
            .list_records(KIND, &request.options, request.filters())
            .await
    }

    pub async fn create_sales_order(
        &self,
        request: &CreateSalesOrderRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = serde_json::to_value(request)?;
        self.ctx.create_record(KIND, &body).await
    }

    pub async fn get_sales_order(&self, salesorder_id: &str) -> CoreResult<RecordResponse> {
        self.ctx.get_record(KIND, salesorder_id).await
    }

    pub async fn update_sales_order(
        &self,
        request: &UpdateSalesOrderRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = update_body(request, "At least one field must be provided")?;
        self.ctx
            .update_record(KIND, &request.salesorder_id, &body)
            .await
    }

    pub async fn delete_sales_order(&self, salesorder_id: &str) -> CoreResult<ActionResponse> {
        self.ctx.delete_record(KIND, salesorder_id).await
    }

    /// Create an invoice from the order. The result carries the new invoice.
    pub async fn convert_to_invoice(
        &self,
        request: &ConvertToInvoiceRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = serde_json::to_value(request)?;
        let body = body
            .as_object()
            .is_some_and(|fields| !fields.is_empty())
            .then_some(&body);

        let response = self
            .ctx
            .record_action(KIND, &request.salesorder_id, "convert", body)
            .await?;

        let invoice = ResourceKind::Invoice;
        let record = response
            .get(invoice.api_singular())
            .filter(|v| !v.is_null())
            .cloned();
        log::info!(
            "[{}] Converted {} to an invoice",
            KIND.plural(),
            request.salesorder_id
        );
        Ok(RecordResponse {
            key: invoice.singular(),
            record,
            message: zoho_message(&response)
                .unwrap_or_else(|| "Sales order converted to invoice successfully".to_string()),
        })
    }
}
