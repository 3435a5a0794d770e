//! Item service

use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{
    ActionResponse, CreateItemRequest, ListItemsRequest, ListPage, RecordResponse, ResourceKind,
    UpdateItemRequest,
};
use crate::utils::validation::{Validate, update_body};

const KIND: ResourceKind = ResourceKind::Item;

pub struct ItemService {
    ctx: Arc<ServiceContext>,
}

impl ItemService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn list_items(&self, request: &ListItemsRequest) -> CoreResult<ListPage> {
        request.validate()?;
        self.ctx
            .list_records(KIND, &request.options, request.filters())
            .await
    }

    pub async fn create_item(&self, request: &CreateItemRequest) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = serde_json::to_value(request)?;
        self.ctx.create_record(KIND, &body).await
    }

    pub async fn get_item(&self, item_id: &str) -> CoreResult<RecordResponse> {
        self.ctx.get_record(KIND, item_id).await
    }

    pub async fn update_item(&self, request: &UpdateItemRequest) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = update_body(request, "At least one item field must be provided")?;
        self.ctx.update_record(KIND, &request.item_id, &body).await
    }

    pub async fn delete_item(&self, item_id: &str) -> CoreResult<ActionResponse> {
        self.ctx.delete_record(KIND, item_id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use zoho_books_provider::{HttpMethod, RequestBody};

    use super::*;
    use crate::error::ErrorKind;
    use crate::test_utils::Harness;
    use crate::types::{ItemStatus, ItemType, ProductType};

    #[tokio::test]
    async fn create_item_with_zero_rate_is_allowed() {
        let h = Harness::new().await;
        h.backend.reply(
            201,
            &json!({
                "code": 0,
                "message": "The item has been added.",
                "item": {"item_id": "982000000030049", "name": "Consulting", "rate": 0}
            })
            .to_string(),
        );

        let response = ItemService::new(h.ctx.clone())
            .create_item(&CreateItemRequest {
                name: "Consulting".into(),
                rate: 0.0,
                product_type: Some(ProductType::Service),
                unit: Some("hrs".into()),
                ..CreateItemRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(response.id("item_id"), Some("982000000030049"));

        let RequestBody::Json(body) = &h.backend.requests()[0].body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["product_type"], "service");
        assert!(body.get("sku").is_none());
    }

    #[tokio::test]
    async fn negative_rate_and_conflicting_filters_are_rejected() {
        let h = Harness::new().await;
        let svc = ItemService::new(h.ctx.clone());

        let err = svc
            .create_item(&CreateItemRequest {
                name: "Widget".into(),
                rate: -1.0,
                ..CreateItemRequest::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let err = svc
            .list_items(&ListItemsRequest {
                item_type: Some(ItemType::Sales),
                status: Some(ItemStatus::Active),
                ..ListItemsRequest::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let err = svc
            .update_item(&UpdateItemRequest {
                item_id: "1".into(),
                ..UpdateItemRequest::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(h.backend.request_count(), 0);
    }

    #[tokio::test]
    async fn list_by_type_uses_filter_by() {
        let h = Harness::new().await;
        h.backend.reply_json(&json!({"code": 0, "items": []}));

        let page = ItemService::new(h.ctx.clone())
            .list_items(&ListItemsRequest {
                item_type: Some(ItemType::SalesAndPurchases),
                ..ListItemsRequest::default()
            })
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_more_page);
        assert_eq!(
            h.backend.requests()[0].query_value("filter_by"),
            Some("ItemType.SalesAndPurchases")
        );
    }

    #[tokio::test]
    async fn get_then_update_round_trip() {
        let h = Harness::new().await;
        h.backend
            .reply_json(&json!({"code": 0, "item": {"item_id": "5", "rate": 10.0}}))
            .reply_json(&json!({
                "code": 0,
                "message": "Item details have been saved.",
                "item": {"item_id": "5", "rate": 12.5}
            }));
        let svc = ItemService::new(h.ctx.clone());

        let fetched = svc.get_item("5").await.unwrap();
        assert_eq!(fetched.message, "Item retrieved successfully");

        let updated = svc
            .update_item(&UpdateItemRequest {
                item_id: "5".into(),
                rate: Some(12.5),
                ..UpdateItemRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.record.unwrap()["rate"], 12.5);
        assert_eq!(updated.message, "Item details have been saved.");

        let requests = h.backend.requests();
        assert_eq!(requests[1].method, HttpMethod::Put);
        assert!(requests[1].url.ends_with("/items/5"));
    }
}
