//! Business logic services

mod api_client;
mod contact_service;
mod expense_service;
mod invoice_service;
mod item_service;
mod report_service;
mod sales_order_service;
mod token_service;

pub use api_client::ApiClient;
pub use contact_service::ContactService;
pub use expense_service::ExpenseService;
pub use invoice_service::InvoiceService;
pub use item_service::ItemService;
pub use report_service::{RECENT_PAYMENT_DAYS, ReportService, record_amount};
pub use sales_order_service::SalesOrderService;
pub use token_service::{DEFAULT_SAFETY_MARGIN, TokenManager};

use std::sync::Arc;

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::types::{ActionResponse, ListOptions, ListPage, PageCursor, RecordResponse, ResourceKind};
use crate::utils::validation::require_id;

/// Service context - holds every dependency
///
/// The binary builds one context and shares it between all services.
pub struct ServiceContext {
    pub api: ApiClient,
}

impl ServiceContext {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        self.api.tokens()
    }

    /// One page of `kind`, with the list options and resource filters applied.
    pub(crate) async fn list_records(
        &self,
        kind: ResourceKind,
        options: &ListOptions,
        filters: Vec<(String, String)>,
    ) -> CoreResult<ListPage> {
        let position = options.resolve()?;
        let mut params = options.query_params(position)?;
        params.extend(filters);

        let response = self
            .api
            .get(kind.path(), &params)
            .await
            .inspect_err(|e| log_failure("list", kind, e))?;

        let items = match response.get(kind.api_plural()) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        let page_context = response.get("page_context");
        let has_more_page = page_context
            .and_then(|c| c.get("has_more_page"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let total = page_context
            .and_then(|c| c.get("total"))
            .and_then(Value::as_u64);

        log::debug!(
            "[{}] page {} returned {} record(s), more: {has_more_page}",
            kind.plural(),
            position.page,
            items.len()
        );

        Ok(ListPage {
            kind,
            items,
            page: position.page,
            page_size: position.page_size,
            has_more_page,
            total,
            next_cursor: has_more_page.then(|| PageCursor::encode(position.next())),
            message: format!("{} retrieved successfully", kind.label_plural()),
        })
    }

    pub(crate) async fn get_record(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> CoreResult<RecordResponse> {
        require_id(kind.id_field(), id)?;
        let response = self
            .api
            .get(&record_path(kind, id), &[])
            .await
            .inspect_err(|e| log_failure("get", kind, e))?;

        let record = take_record(&response, kind.api_singular());
        let message = if record.is_some() {
            format!("{} retrieved successfully", kind.label())
        } else {
            format!("{} not found", kind.label())
        };
        Ok(RecordResponse {
            key: kind.singular(),
            record,
            message,
        })
    }

    pub(crate) async fn create_record(
        &self,
        kind: ResourceKind,
        body: &Value,
    ) -> CoreResult<RecordResponse> {
        let response = self
            .api
            .post(kind.path(), Some(body))
            .await
            .inspect_err(|e| log_failure("create", kind, e))?;

        let record = take_record(&response, kind.api_singular());
        if let Some(id) = record
            .as_ref()
            .and_then(|r| r.get(kind.id_field()))
            .and_then(Value::as_str)
        {
            log::info!("[{}] Created {id}", kind.plural());
        }
        Ok(RecordResponse {
            key: kind.singular(),
            record,
            message: zoho_message(&response)
                .unwrap_or_else(|| format!("{} created successfully", kind.label())),
        })
    }

    pub(crate) async fn update_record(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Value,
    ) -> CoreResult<RecordResponse> {
        require_id(kind.id_field(), id)?;
        let response = self
            .api
            .put(&record_path(kind, id), body)
            .await
            .inspect_err(|e| log_failure("update", kind, e))?;

        Ok(RecordResponse {
            key: kind.singular(),
            record: take_record(&response, kind.api_singular()),
            message: zoho_message(&response)
                .unwrap_or_else(|| format!("{} updated successfully", kind.label())),
        })
    }

    pub(crate) async fn delete_record(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> CoreResult<ActionResponse> {
        require_id(kind.id_field(), id)?;
        let response = self
            .api
            .delete(&record_path(kind, id))
            .await
            .inspect_err(|e| log_failure("delete", kind, e))?;

        log::info!("[{}] Deleted {id}", kind.plural());
        Ok(ActionResponse {
            kind,
            id: id.to_string(),
            message: zoho_message(&response)
                .unwrap_or_else(|| format!("{} deleted successfully", kind.label())),
        })
    }

    /// POST to `{kind}/{id}/{action}`, returning the raw response body.
    pub(crate) async fn record_action(
        &self,
        kind: ResourceKind,
        id: &str,
        action: &str,
        body: Option<&Value>,
    ) -> CoreResult<Value> {
        require_id(kind.id_field(), id)?;
        let path = format!("{}/{action}", record_path(kind, id));
        self.api
            .post(&path, body)
            .await
            .inspect_err(|e| log_failure(action, kind, e))
    }
}

fn record_path(kind: ResourceKind, id: &str) -> String {
    format!("{}/{id}", kind.path())
}

/// The record under `key`, unless it is absent or null.
fn take_record(response: &Value, key: &str) -> Option<Value> {
    response.get(key).filter(|v| !v.is_null()).cloned()
}

/// Zoho's own message when it says more than "success".
pub(crate) fn zoho_message(response: &Value) -> Option<String> {
    response
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("success"))
        .map(ToString::to_string)
}

fn log_failure(operation: &str, kind: ResourceKind, err: &CoreError) {
    if err.is_expected() {
        log::warn!("[{}] {operation} failed: {err}", kind.plural());
    } else {
        log::error!("[{}] {operation} failed: {err}", kind.plural());
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_utils::Harness;

    #[test]
    fn zoho_message_skips_bare_success() {
        assert_eq!(zoho_message(&json!({"message": "success"})), None);
        assert_eq!(zoho_message(&json!({"message": ""})), None);
        assert_eq!(zoho_message(&json!({})), None);
        assert_eq!(
            zoho_message(&json!({"message": "The contact has been added."})).as_deref(),
            Some("The contact has been added.")
        );
    }

    #[tokio::test]
    async fn list_sets_cursor_only_when_more_pages_exist() {
        let h = Harness::new().await;
        h.backend
            .reply_json(&json!({
                "items": [{"item_id": "1"}],
                "page_context": {"page": 1, "per_page": 1, "has_more_page": true}
            }))
            .reply_json(&json!({
                "items": [{"item_id": "2"}],
                "page_context": {"page": 2, "per_page": 1, "has_more_page": false, "total": 2}
            }));

        let options = ListOptions {
            page_size: Some(1),
            ..ListOptions::default()
        };
        let first = h
            .ctx
            .list_records(ResourceKind::Item, &options, Vec::new())
            .await
            .unwrap();
        assert!(first.has_more_page);
        assert_eq!(first.total, None);
        let cursor = first.next_cursor.clone().unwrap();

        let next = ListOptions {
            cursor: Some(cursor),
            ..ListOptions::default()
        };
        let second = h
            .ctx
            .list_records(ResourceKind::Item, &next, Vec::new())
            .await
            .unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(second.page_size, 1);
        assert_eq!(second.total, Some(2));
        assert!(second.next_cursor.is_none());
        assert_eq!(second.message, "Items retrieved successfully");

        let requests = h.backend.requests();
        assert_eq!(requests[1].query_value("page"), Some("2"));
        assert_eq!(requests[1].query_value("per_page"), Some("1"));
    }

    #[tokio::test]
    async fn missing_record_is_reported_as_not_found() {
        let h = Harness::new().await;
        h.backend.reply_json(&json!({"code": 0, "message": "success"}));

        let response = h.ctx.get_record(ResourceKind::SalesOrder, "12345").await.unwrap();
        assert_eq!(response.record, None);
        assert_eq!(response.message, "Sales order not found");
        assert_eq!(response.key, "sales_order");
    }

    #[tokio::test]
    async fn bad_cursor_is_rejected_before_any_request() {
        let h = Harness::new().await;
        let options = ListOptions {
            cursor: Some("not a cursor!".into()),
            ..ListOptions::default()
        };
        let err = h
            .ctx
            .list_records(ResourceKind::Contact, &options, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(h.backend.request_count(), 0);
    }
}
