//! Expense service

use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{
    ActionResponse, CreateExpenseRequest, ListExpensesRequest, ListPage, RecordResponse,
    ResourceKind, UpdateExpenseRequest,
};
use crate::utils::validation::{Validate, update_body};

const KIND: ResourceKind = ResourceKind::Expense;

pub struct ExpenseService {
    ctx: Arc<ServiceContext>,
}

impl ExpenseService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn list_expenses(&self, request: &ListExpensesRequest) -> CoreResult<ListPage> {
        request.validate()?;
        self.ctx
            .list_records(KIND, &request.options, request.filters())
            .await
    }

    pub async fn create_expense(
        &self,
        request: &CreateExpenseRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = serde_json::to_value(request)?;
        self.ctx.create_record(KIND, &body).await
    }

    pub async fn get_expense(&self, expense_id: &str) -> CoreResult<RecordResponse> {
        self.ctx.get_record(KIND, expense_id).await
    }

    pub async fn update_expense(
        &self,
        request: &UpdateExpenseRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = update_body(request, "At least one expense field must be provided")?;
        self.ctx
            .update_record(KIND, &request.expense_id, &body)
            .await
    }

    pub async fn delete_expense(&self, expense_id: &str) -> CoreResult<ActionResponse> {
        self.ctx.delete_record(KIND, expense_id).await
    }
}
