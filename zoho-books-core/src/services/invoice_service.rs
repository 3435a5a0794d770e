//! Invoice service

use std::sync::Arc;

use serde_json::Value;

use crate::error::CoreResult;
use crate::services::{ServiceContext, zoho_message};
use crate::types::{
    ActionResponse, CreateInvoiceRequest, EmailInvoiceRequest, ListInvoicesRequest, ListPage,
    RecordResponse, ResourceKind, UpdateInvoiceRequest,
};
use crate::utils::validation::{Validate, update_body};

const KIND: ResourceKind = ResourceKind::Invoice;

pub struct InvoiceService {
    ctx: Arc<ServiceContext>,
}

impl InvoiceService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn list_invoices(&self, request: &ListInvoicesRequest) -> CoreResult<ListPage> {
        request.validate()?;
        self.ctx
            .list_records(KIND, &request.options, request.filters())
            .await
    }

    pub async fn create_invoice(
        &self,
        request: &CreateInvoiceRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = serde_json::to_value(request)?;
        self.ctx.create_record(KIND, &body).await
    }

    pub async fn get_invoice(&self, invoice_id: &str) -> CoreResult<RecordResponse> {
        self.ctx.get_record(KIND, invoice_id).await
    }

    pub async fn update_invoice(
        &self,
        request: &UpdateInvoiceRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = update_body(request, "At least one invoice field must be provided")?;
        self.ctx
            .update_record(KIND, &request.invoice_id, &body)
            .await
    }

    pub async fn delete_invoice(&self, invoice_id: &str) -> CoreResult<ActionResponse> {
        self.ctx.delete_record(KIND, invoice_id).await
    }

    /// Email the invoice; without recipients Zoho uses the customer's contacts.
    pub async fn email_invoice(&self, request: &EmailInvoiceRequest) -> CoreResult<ActionResponse> {
        request.validate()?;
        let body = serde_json::to_value(request)?;
        let body = body
            .as_object()
            .is_some_and(|fields| !fields.is_empty())
            .then_some(&body);

        let response = self
            .ctx
            .record_action(KIND, &request.invoice_id, "email", body)
            .await?;
        Ok(action(
            &request.invoice_id,
            &response,
            "Invoice emailed successfully",
        ))
    }

    pub async fn mark_invoice_as_sent(&self, invoice_id: &str) -> CoreResult<ActionResponse> {
        let response = self
            .ctx
            .record_action(KIND, invoice_id, "status/sent", None)
            .await?;
        Ok(action(invoice_id, &response, "Invoice marked as sent"))
    }

    pub async fn void_invoice(&self, invoice_id: &str) -> CoreResult<ActionResponse> {
        let response = self
            .ctx
            .record_action(KIND, invoice_id, "status/void", None)
            .await?;
        Ok(action(invoice_id, &response, "Invoice voided"))
    }
}

fn action(invoice_id: &str, response: &Value, fallback: &str) -> ActionResponse {
    ActionResponse {
        kind: KIND,
        id: invoice_id.to_string(),
        message: zoho_message(response).unwrap_or_else(|| fallback.to_string()),
    }
}
