//! Contact management service

use std::sync::Arc;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::types::{
    ActionResponse, ContactType, CreateContactRequest, ListContactsRequest, ListPage, NewContact,
    RecordResponse, ResourceKind, UpdateContactRequest,
};
use crate::utils::validation::{Validate, update_body};

const KIND: ResourceKind = ResourceKind::Contact;

/// Customers and vendors
pub struct ContactService {
    ctx: Arc<ServiceContext>,
}

impl ContactService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Active contacts unless `filter_by` says otherwise.
    pub async fn list_contacts(&self, request: &ListContactsRequest) -> CoreResult<ListPage> {
        self.ctx
            .list_records(KIND, &request.options, request.filters())
            .await
    }

    pub async fn create_contact(
        &self,
        request: &CreateContactRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = serde_json::to_value(request)?;
        self.ctx.create_record(KIND, &body).await
    }

    pub async fn create_customer(&self, contact: NewContact) -> CoreResult<RecordResponse> {
        self.create_typed(ContactType::Customer, contact, "Customer")
            .await
    }

    pub async fn create_vendor(&self, contact: NewContact) -> CoreResult<RecordResponse> {
        self.create_typed(ContactType::Vendor, contact, "Vendor")
            .await
    }

    pub async fn get_contact(&self, contact_id: &str) -> CoreResult<RecordResponse> {
        self.ctx.get_record(KIND, contact_id).await
    }

    pub async fn update_contact(
        &self,
        request: &UpdateContactRequest,
    ) -> CoreResult<RecordResponse> {
        request.validate()?;
        let body = update_body(request, "At least one contact field must be provided")?;
        self.ctx
            .update_record(KIND, &request.contact_id, &body)
            .await
    }

    pub async fn delete_contact(&self, contact_id: &str) -> CoreResult<ActionResponse> {
        self.ctx.delete_record(KIND, contact_id).await
    }

    async fn create_typed(
        &self,
        contact_type: ContactType,
        contact: NewContact,
        label: &str,
    ) -> CoreResult<RecordResponse> {
        let request = CreateContactRequest {
            contact_type,
            contact,
        };
        let mut response = self.create_contact(&request).await?;
        if response.message == format!("{} created successfully", KIND.label()) {
            response.message = format!("{label} created successfully");
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use zoho_books_provider::{HttpMethod, RequestBody};

    use super::*;
    use crate::error::CoreError;
    use crate::test_utils::Harness;
    use crate::types::ContactStatusFilter;

    fn service(h: &Harness) -> ContactService {
        ContactService::new(h.ctx.clone())
    }

    fn sent_json(h: &Harness, index: usize) -> Value {
        match &h.backend.requests()[index].body {
            RequestBody::Json(value) => value.clone(),
            other => panic!("expected a JSON body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_contact_echoes_name_and_email() {
        let h = Harness::new().await;
        h.backend.reply(
            201,
            &json!({
                "code": 0,
                "message": "The contact has been added.",
                "contact": {
                    "contact_id": "460000000026049",
                    "contact_name": "Bowman & Co",
                    "email": "ops@bowman.example",
                    "contact_type": "customer"
                }
            })
            .to_string(),
        );

        let response = service(&h)
            .create_customer(NewContact {
                contact_name: "Bowman & Co".into(),
                email: Some("ops@bowman.example".into()),
                ..NewContact::default()
            })
            .await
            .unwrap();

        let record = response.record.as_ref().unwrap();
        assert_eq!(record["contact_name"], "Bowman & Co");
        assert_eq!(record["email"], "ops@bowman.example");
        assert!(!response.id("contact_id").unwrap().is_empty());
        assert_eq!(response.message, "The contact has been added.");

        let requests = h.backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert!(requests[0].url.ends_with("/contacts"));
        let body = sent_json(&h, 0);
        assert_eq!(body["contact_type"], "customer");
        assert_eq!(body["contact_name"], "Bowman & Co");
    }

    #[tokio::test]
    async fn vendor_default_message_names_the_type() {
        let h = Harness::new().await;
        h.backend
            .reply_json(&json!({"code": 0, "contact": {"contact_id": "7"}}));

        let response = service(&h)
            .create_vendor(NewContact {
                contact_name: "Acme Supplies".into(),
                ..NewContact::default()
            })
            .await
            .unwrap();
        assert_eq!(response.message, "Vendor created successfully");
        assert_eq!(sent_json(&h, 0)["contact_type"], "vendor");
    }

    #[tokio::test]
    async fn invalid_contact_issues_no_request() {
        let h = Harness::new().await;
        let contacts = service(&h);

        let blank = contacts
            .create_customer(NewContact::default())
            .await
            .unwrap_err();
        assert!(matches!(blank, CoreError::ValidationError(_)));

        let bad_email = contacts
            .create_customer(NewContact {
                contact_name: "Bowman & Co".into(),
                email: Some("not-an-email".into()),
                ..NewContact::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(bad_email, CoreError::ValidationError(_)));

        let empty_update = contacts
            .update_contact(&UpdateContactRequest {
                contact_id: "460000000026049".into(),
                ..UpdateContactRequest::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(empty_update, CoreError::ValidationError(_)));

        assert!(contacts.get_contact("").await.is_err());
        assert!(contacts.delete_contact("1/2").await.is_err());
        assert_eq!(h.backend.request_count(), 0);
    }

    #[tokio::test]
    async fn list_applies_defaults_and_filters() {
        let h = Harness::new().await;
        h.backend.reply_json(&json!({
            "code": 0,
            "contacts": [{"contact_id": "1"}, {"contact_id": "2"}],
            "page_context": {"page": 1, "per_page": 25, "has_more_page": false}
        }));

        let page = service(&h)
            .list_contacts(&ListContactsRequest {
                contact_type: Some(ContactType::Vendor),
                filter_by: Some(ContactStatusFilter::All),
                ..ListContactsRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_none());

        let request = &h.backend.requests()[0];
        assert_eq!(request.query_value("filter_by"), Some("Status.All"));
        assert_eq!(request.query_value("contact_type"), Some("vendor"));
        assert_eq!(request.query_value("sort_column"), Some("created_time"));
        assert_eq!(request.query_value("sort_order"), Some("A"));
        assert_eq!(request.query_value("per_page"), Some("25"));
    }

    #[tokio::test]
    async fn update_sends_only_changed_fields() {
        let h = Harness::new().await;
        h.backend.reply_json(&json!({
            "code": 0,
            "message": "Contact information has been saved.",
            "contact": {"contact_id": "42", "phone": "+1 555 0100"}
        }));

        service(&h)
            .update_contact(&UpdateContactRequest {
                contact_id: "42".into(),
                phone: Some("+1 555 0100".into()),
                ..UpdateContactRequest::default()
            })
            .await
            .unwrap();

        let request = &h.backend.requests()[0];
        assert_eq!(request.method, HttpMethod::Put);
        assert!(request.url.ends_with("/contacts/42"));
        assert_eq!(sent_json(&h, 0), json!({"phone": "+1 555 0100"}));
    }

    #[tokio::test]
    async fn delete_reports_contact_id() {
        let h = Harness::new().await;
        h.backend
            .reply_json(&json!({"code": 0, "message": "The contact has been deleted."}));

        let response = service(&h).delete_contact("42").await.unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "message": "The contact has been deleted.",
                "contact_id": "42"
            })
        );
        assert_eq!(h.backend.requests()[0].method, HttpMethod::Delete);
    }
}
